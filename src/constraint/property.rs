//! MSBuild-style property resolution
//!
//! Ceiling declarations may be written through property indirection
//! (`Include="$(SentryPackages)"`). Declarations live in `PropertyGroup`
//! elements anywhere in the file set and may themselves reference further
//! properties, so resolution follows the chain with a depth guard.
//! Unresolved references leave the original token untouched.

use crate::domain::DependencyFile;
use regex::Regex;
use std::collections::HashMap;

/// Maximum declaration-chain depth before resolution gives up
const MAX_CHAIN_DEPTH: usize = 10;

/// Pattern for property references: `$(Name)`
pub fn property_regex() -> Regex {
    Regex::new(r"\$\((?<property>.*?)\)").expect("static regex")
}

/// Pattern for item-group references: `@(Name)`
pub fn item_regex() -> Regex {
    Regex::new(r"@\((?<property>.*?)\)").expect("static regex")
}

/// Resolves `$(Name)` references against property declarations in the file set
pub struct PropertyResolver {
    /// Lowercased property name -> raw declared value (last declaration wins)
    declarations: HashMap<String, String>,
    property_re: Regex,
}

impl PropertyResolver {
    /// Collect property declarations from every file in the set
    ///
    /// Property names are case-insensitive; a later file's declaration
    /// overwrites an earlier one, matching the last-writer-wins rule used for
    /// the ceiling map itself.
    pub fn new(files: &[DependencyFile]) -> Self {
        let mut declarations = HashMap::new();

        for file in files {
            let Ok(root) = super::xml::Element::parse(&file.content) else {
                // Non-XML files in the set (nuget.config variants, solution
                // files) are simply not property sources.
                continue;
            };
            let mut groups = Vec::new();
            root.descendants("PropertyGroup", &mut groups);
            for group in groups {
                for child in &group.children {
                    let value = child.text.trim();
                    if !value.is_empty() {
                        declarations.insert(child.name.to_lowercase(), value.to_string());
                    }
                }
            }
        }

        Self {
            declarations,
            property_re: property_regex(),
        }
    }

    /// Resolved value for a property name, following declaration chains
    pub fn value_of(&self, name: &str) -> Option<String> {
        self.value_of_depth(name, 0)
    }

    fn value_of_depth(&self, name: &str, depth: usize) -> Option<String> {
        if depth >= MAX_CHAIN_DEPTH {
            return None;
        }
        let raw = self.declarations.get(&name.to_lowercase())?;
        match self.property_re.captures(raw) {
            None => Some(raw.clone()),
            Some(caps) => {
                let inner = self.value_of_depth(&caps["property"], depth + 1)?;
                Some(self.property_re.replace_all(raw, inner.as_str()).to_string())
            }
        }
    }

    /// Substitute `$(Name)` references in a value
    ///
    /// When the referenced property has no discoverable value the original
    /// text is returned unchanged rather than erroring.
    pub fn evaluate(&self, value: &str) -> String {
        let Some(caps) = self.property_re.captures(value) else {
            return value.to_string();
        };
        match self.value_of(&caps["property"]) {
            Some(resolved) => self
                .property_re
                .replace_all(value, resolved.as_str())
                .to_string(),
            None => value.to_string(),
        }
    }

    /// Returns true when the value still contains a property reference
    pub fn has_reference(&self, value: &str) -> bool {
        self.property_re.is_match(value)
    }
}
