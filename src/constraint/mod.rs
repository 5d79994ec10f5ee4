//! Version-ceiling constraint resolution
//!
//! This module provides:
//! - A minimal XML element tree for MSBuild-style files
//! - `$(Name)` property resolution across the file set
//! - The ceiling scan producing the per-run ConstraintMap

mod property;
mod resolver;
mod xml;

pub use property::PropertyResolver;
pub use resolver::{ConstraintMap, ConstraintResolver};
pub use xml::Element;
