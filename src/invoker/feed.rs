//! Feed credential bundle for the external tool
//!
//! The tool authenticates against private feeds through a single environment
//! variable carrying a JSON object of endpoint credentials. Tokens are
//! expected as `user:secret`; a token without the delimiter cannot be split
//! into an identity and a secret and is skipped rather than passed through
//! malformed.

use crate::domain::Credential;
use serde::Serialize;

/// Environment variable the credential bundle is passed in
pub const FEED_ENDPOINTS_ENV: &str = "VSS_NUGET_EXTERNAL_FEED_ENDPOINTS";

#[derive(Debug, Serialize)]
struct EndpointCredential {
    endpoint: String,
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct EndpointCredentialBundle {
    #[serde(rename = "endpointCredentials")]
    endpoint_credentials: Vec<EndpointCredential>,
}

/// Build the JSON credential bundle for credentials of the given feed type
///
/// Returns None when no credential produced a usable entry, in which case
/// the environment variable is not set at all.
pub fn feed_credentials_json(credentials: &[Credential], feed_type: &str) -> Option<String> {
    let mut entries = Vec::new();

    for cred in credentials.iter().filter(|c| c.type_tag() == feed_type) {
        let Credential::NugetFeed { url, token } = cred else {
            continue;
        };
        let Some(token) = token else {
            continue;
        };

        match token.split_once(':') {
            Some((username, password)) => entries.push(EndpointCredential {
                endpoint: url.clone(),
                username: username.to_string(),
                password: password.to_string(),
            }),
            None => {
                // Identity and secret are not separable; skipping is safer
                // than guessing which half the token is.
                eprintln!("__ feed credential for {} is malformed, skipping", url);
            }
        }
    }

    if entries.is_empty() {
        return None;
    }

    serde_json::to_string(&EndpointCredentialBundle {
        endpoint_credentials: entries,
    })
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(url: &str, token: Option<&str>) -> Credential {
        Credential::NugetFeed {
            url: url.to_string(),
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_well_formed_token_yields_one_entry() {
        let json =
            feed_credentials_json(&[feed("https://feed/v3", Some("user:secret"))], "nuget_feed")
                .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let creds = value["endpointCredentials"].as_array().unwrap();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0]["endpoint"], "https://feed/v3");
        assert_eq!(creds[0]["username"], "user");
        assert_eq!(creds[0]["password"], "secret");
    }

    #[test]
    fn test_secret_containing_colon_splits_on_first() {
        let json = feed_credentials_json(&[feed("https://feed", Some("u:p:q"))], "nuget_feed")
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["endpointCredentials"][0]["username"], "u");
        assert_eq!(value["endpointCredentials"][0]["password"], "p:q");
    }

    #[test]
    fn test_token_without_colon_is_skipped() {
        let result = feed_credentials_json(&[feed("https://feed", Some("bare-token"))], "nuget_feed");
        assert!(result.is_none());
    }

    #[test]
    fn test_skipped_token_never_reaches_json() {
        let json = feed_credentials_json(
            &[
                feed("https://feed/a", Some("malformed-token")),
                feed("https://feed/b", Some("user:ok")),
            ],
            "nuget_feed",
        )
        .unwrap();
        assert!(!json.contains("malformed-token"));
        assert!(!json.contains("feed/a"));
    }

    #[test]
    fn test_tokenless_and_foreign_credentials_ignored() {
        let git = Credential::GitSource {
            host: "github.com".to_string(),
            username: "x".to_string(),
            password: "p".to_string(),
        };
        assert!(feed_credentials_json(&[feed("https://feed", None), git], "nuget_feed").is_none());
    }
}
