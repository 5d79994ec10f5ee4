//! Update batching into change-set groups

mod engine;

pub use engine::{group_candidates, group_key, longest_common_substring, package_prefix};
