//! Codec for mod settings files: a versioned header around a binary
//! property tree, plus a lossless JSON view of the same data.

mod error;
mod json;
pub mod process;
mod settings;
mod string;
mod tree;

pub use error::{ModSettingsError, Result};
pub use json::{
    Document, MOD_SETTINGS_TYPE, TYPE_FIELD, settings_to_json, tree_from_json, tree_to_json,
};
pub use settings::{ModSettings, Version};
pub use string::{LENGTH_ESCAPE, VarString};
pub use tree::{MAX_DEPTH, PropertyTree, PropertyValue, TreeType};
