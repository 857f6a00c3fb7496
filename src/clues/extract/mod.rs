pub mod legacy;
pub mod markup;
pub mod script_json;

use super::CluesByDirection;

pub type Strategy = fn(&str) -> Option<CluesByDirection>;

/// Extraction strategies in priority order.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("legacy_arrays", legacy::extract as Strategy),
    ("markup", markup::extract as Strategy),
    ("script_json", script_json::extract as Strategy),
];
