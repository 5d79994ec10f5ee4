//! Version-ceiling resolution from central package declaration files
//!
//! Central declarations look like:
//!
//! ```xml
//! <Project>
//!   <ItemGroup>
//!     <PackageVersion Include="Sentry" Version="3.0.0" MaxVersion="$(SentryCeiling)" />
//!   </ItemGroup>
//! </Project>
//! ```
//!
//! The scan produces a map from lowercased package name to the maximum
//! version an update may select (exclusive bound). Entries from later files
//! overwrite earlier ones for the same name.

use super::property::{item_regex, PropertyResolver};
use super::xml::Element;
use crate::domain::{Dependency, DependencyFile, PackageVersion};
use crate::error::ConstraintError;
use regex::Regex;
use std::cell::OnceCell;
use std::collections::HashMap;

/// File-name convention for directory-level central package files
const PACKAGES_PROPS_PATTERN: &str = r"[Dd]irectory\.[Pp]ackages\.props";

/// Element carrying a central version declaration
const PACKAGE_VERSION_TAG: &str = "PackageVersion";

/// Parent element the declarations must sit under
const ITEM_GROUP_TAG: &str = "ItemGroup";

/// Ceiling attribute (or child element) name
const MAX_VERSION_ATTRIBUTE: &str = "MaxVersion";

/// Mapping from lowercase dependency name to its maximum allowed version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintMap {
    ceilings: HashMap<String, PackageVersion>,
}

impl ConstraintMap {
    /// The ceiling for a dependency name, looked up case-insensitively
    pub fn ceiling(&self, name: &str) -> Option<&PackageVersion> {
        self.ceilings.get(&name.to_lowercase())
    }

    /// Returns true when the candidate version stays strictly below the
    /// ceiling (or no ceiling is declared for the name)
    pub fn permits(&self, name: &str, candidate: &PackageVersion) -> bool {
        match self.ceiling(name) {
            Some(max) => candidate < max,
            None => true,
        }
    }

    /// Number of declared ceilings
    pub fn len(&self) -> usize {
        self.ceilings.len()
    }

    /// Returns true when no ceilings are declared
    pub fn is_empty(&self) -> bool {
        self.ceilings.is_empty()
    }

    /// Insert a ceiling; a later insert for the same name overwrites
    pub fn insert(&mut self, name: &str, version: PackageVersion) {
        self.ceilings.insert(name.to_lowercase(), version);
    }

    /// Attach resolved ceilings to each matching dependency's requirements
    pub fn annotate(&self, dependencies: &mut [Dependency]) {
        for dep in dependencies.iter_mut() {
            let Some(max) = self.ceiling(&dep.name) else {
                continue;
            };
            for req in &mut dep.requirements {
                req.metadata.max_version = Some(max.clone());
            }
        }
    }
}

/// Scans ceiling declarations out of a fetched file set
///
/// The scan runs at most once per resolver instance; the computed map is
/// memoized for the resolver's lifetime.
pub struct ConstraintResolver<'a> {
    files: &'a [DependencyFile],
    properties: PropertyResolver,
    cache: OnceCell<ConstraintMap>,
}

impl<'a> ConstraintResolver<'a> {
    /// Creates a resolver over the fetched file set
    pub fn new(files: &'a [DependencyFile]) -> Self {
        Self {
            files,
            properties: PropertyResolver::new(files),
            cache: OnceCell::new(),
        }
    }

    /// The resolved ceiling map; computed on first call, memoized after
    pub fn resolve(&self) -> Result<&ConstraintMap, ConstraintError> {
        if let Some(map) = self.cache.get() {
            return Ok(map);
        }
        let map = self.scan()?;
        Ok(self.cache.get_or_init(|| map))
    }

    fn scan(&self) -> Result<ConstraintMap, ConstraintError> {
        let props_file_re = Regex::new(PACKAGES_PROPS_PATTERN).expect("static regex");
        let item_re = item_regex();
        let mut map = ConstraintMap::default();

        for file in self
            .files
            .iter()
            .filter(|f| props_file_re.is_match(&f.name))
        {
            let root = Element::parse(&file.content)
                .map_err(|message| ConstraintError::xml_parse_error(&file.name, message))?;

            let mut item_groups = Vec::new();
            root.descendants(ITEM_GROUP_TAG, &mut item_groups);

            for group in item_groups {
                for node in group.children_named(PACKAGE_VERSION_TAG) {
                    let Some(raw_name) = node
                        .attribute_or_child("Include")
                        .or_else(|| node.attribute_or_child("Update"))
                    else {
                        continue;
                    };

                    // @(ItemGroup) references update element sets, not a
                    // concrete package name.
                    if item_re.is_match(&raw_name) {
                        continue;
                    }

                    let name = self.properties.evaluate(&raw_name);

                    let Some(raw_max) = node.attribute_or_child(MAX_VERSION_ATTRIBUTE) else {
                        continue;
                    };
                    let max_value = self.properties.evaluate(&raw_max);

                    if self.properties.has_reference(&max_value) {
                        // Unresolved property; the cap is declared but not
                        // computable, so keep the entry out of the map rather
                        // than guessing a value.
                        eprintln!(
                            "__ ceiling for {} left unresolved ({}) in {}",
                            name, max_value, file.name
                        );
                        continue;
                    }

                    match PackageVersion::parse(&max_value) {
                        Some(version) => map.insert(&name, version),
                        None => {
                            return Err(ConstraintError::invalid_ceiling(
                                &file.name, &name, &max_value,
                            ))
                        }
                    }
                }
            }
        }

        Ok(map)
    }
}
