//! Registry and source-control credentials
//!
//! Credentials are assembled once at run start, held immutable, and never
//! persisted. The Debug rendering redacts every secret field so credential
//! values cannot leak through logs or error messages.

use std::fmt;

/// A process-scoped credential for a registry or source-control host
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Source-control API access
    GitSource {
        host: String,
        username: String,
        password: String,
    },
    /// NuGet feed access; token is `user:secret`
    NugetFeed { url: String, token: Option<String> },
    /// Maven repository access
    MavenRepository {
        url: String,
        username: Option<String>,
        password: Option<String>,
    },
    /// npm registry access; token is `user:secret`
    NpmRegistry {
        registry: String,
        url: Option<String>,
        token: Option<String>,
    },
}

impl Credential {
    /// The credential type tag, matching the external configuration vocabulary
    pub fn type_tag(&self) -> &'static str {
        match self {
            Credential::GitSource { .. } => "git_source",
            Credential::NugetFeed { .. } => "nuget_feed",
            Credential::MavenRepository { .. } => "maven_repository",
            Credential::NpmRegistry { .. } => "npm_registry",
        }
    }

    /// The feed/registry URL this credential applies to, when it has one
    pub fn url(&self) -> Option<&str> {
        match self {
            Credential::GitSource { .. } => None,
            Credential::NugetFeed { url, .. } => Some(url),
            Credential::MavenRepository { url, .. } => Some(url),
            Credential::NpmRegistry { url, registry, .. } => {
                url.as_deref().or(Some(registry.as_str()))
            }
        }
    }

    /// Returns true when this credential carries a secret
    pub fn has_secret(&self) -> bool {
        match self {
            Credential::GitSource { password, .. } => !password.is_empty(),
            Credential::NugetFeed { token, .. } => token.is_some(),
            Credential::MavenRepository { password, .. } => password.is_some(),
            Credential::NpmRegistry { token, .. } => token.is_some(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::GitSource { host, username, .. } => f
                .debug_struct("GitSource")
                .field("host", host)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credential::NugetFeed { url, token } => f
                .debug_struct("NugetFeed")
                .field("url", url)
                .field("token", &token.as_ref().map(|_| "<redacted>"))
                .finish(),
            Credential::MavenRepository { url, username, password } => f
                .debug_struct("MavenRepository")
                .field("url", url)
                .field("username", username)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .finish(),
            Credential::NpmRegistry { registry, url, token } => f
                .debug_struct("NpmRegistry")
                .field("registry", registry)
                .field("url", url)
                .field("token", &token.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

/// Policy for collapsing feed entries that share a URL
///
/// When the same feed URL appears both with and without credentials the
/// original intent is ambiguous, so the precedence is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepositoryDedup {
    /// The entry carrying credentials wins over a bare entry (default)
    #[default]
    PreferAuthenticated,
    /// The first entry in scan order wins regardless of credentials
    KeepFirst,
}

/// Collapse credentials sharing a URL according to the dedup policy
///
/// Entries without a URL (git sources) are always kept as-is.
pub fn dedup_credentials(credentials: &[Credential], policy: RepositoryDedup) -> Vec<Credential> {
    let mut result: Vec<Credential> = Vec::new();

    for cred in credentials {
        let Some(url) = cred.url().map(str::to_string) else {
            result.push(cred.clone());
            continue;
        };

        match result
            .iter()
            .position(|kept| kept.url() == Some(url.as_str()))
        {
            None => result.push(cred.clone()),
            Some(idx) => {
                if policy == RepositoryDedup::PreferAuthenticated
                    && cred.has_secret()
                    && !result[idx].has_secret()
                {
                    result[idx] = cred.clone();
                }
            }
        }
    }

    result
}
