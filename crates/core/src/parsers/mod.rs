pub mod json;

pub use json::{JsonFrameError, Resolution, hierarchy_from_json, property_tree_from_json};
