use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};
use std::io::{Read, Write};
use std::str::FromStr;

use crate::error::{ModSettingsError, Result};
use crate::settings::{ModSettings, Version};
use crate::string::VarString;
use crate::tree::{MAX_DEPTH, PropertyTree, PropertyValue};

/// Reserved field marking a top-level object as an envelope.
pub const TYPE_FIELD: &str = "!type";
pub const MOD_SETTINGS_TYPE: &str = "ModSettings";

const INDENT: &[u8] = b"    ";

// === PropertyTree -> JSON ===

pub fn tree_to_json(tree: &PropertyTree) -> Result<Value> {
    match &tree.value {
        PropertyValue::Null => Ok(Value::Null),
        PropertyValue::Bool(b) => Ok(Value::Bool(*b)),
        PropertyValue::Number(n) => Number::from_f64(*n)
            .map(Value::Number)
            .ok_or(ModSettingsError::NonFiniteNumber(*n)),
        PropertyValue::String(s) => Ok(s.to_text()?.map_or(Value::Null, Value::String)),
        PropertyValue::List(items) => items
            .iter()
            .map(tree_to_json)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        PropertyValue::Dictionary(items) => {
            let mut map = Map::with_capacity(items.len());
            for item in items {
                let key = item.key.to_text()?.ok_or(ModSettingsError::NullKey)?;
                // Duplicate keys collapse, the last value wins
                map.insert(key, tree_to_json(item)?);
            }
            Ok(Value::Object(map))
        }
    }
}

pub fn settings_to_json(settings: &ModSettings) -> Result<Value> {
    let version: [u16; 4] = settings.version.into();

    let mut map = Map::new();
    map.insert(TYPE_FIELD.to_owned(), Value::from(MOD_SETTINGS_TYPE));
    map.insert("version".to_owned(), Value::from(version.to_vec()));
    map.insert("has_quality".to_owned(), Value::Bool(settings.has_quality));
    map.insert("data".to_owned(), tree_to_json(&settings.data)?);
    Ok(Value::Object(map))
}

// === JSON -> PropertyTree ===

/// Converts any JSON value into a tree. Objects are always dictionaries here,
/// the `"!type"` field gets no special treatment.
pub fn tree_from_json(value: &Value) -> Result<PropertyTree> {
    Ok(PropertyTree::new(value_from_json(value, 0)?))
}

fn value_from_json(value: &Value, depth: usize) -> Result<PropertyValue> {
    let value = match value {
        Value::Null => PropertyValue::Null,
        Value::Bool(b) => PropertyValue::Bool(*b),
        Value::Number(n) => PropertyValue::Number(
            n.as_f64()
                .ok_or_else(|| ModSettingsError::InvalidFormat(format!("bad number {}", n)))?,
        ),
        Value::String(s) => PropertyValue::String(VarString::from(s.as_str())),
        Value::Array(items) => {
            check_depth(depth + 1)?;
            let children = items
                .iter()
                .map(|item| -> Result<PropertyTree> {
                    Ok(PropertyTree::new(value_from_json(item, depth + 1)?).with_key(""))
                })
                .collect::<Result<Vec<_>>>()?;
            PropertyValue::List(children)
        }
        Value::Object(map) => {
            check_depth(depth + 1)?;
            let children = map
                .iter()
                .map(|(key, item)| -> Result<PropertyTree> {
                    let child = PropertyTree::new(value_from_json(item, depth + 1)?);
                    Ok(child.with_key(key.as_str()))
                })
                .collect::<Result<Vec<_>>>()?;
            PropertyValue::Dictionary(children)
        }
    };
    Ok(value)
}

fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(ModSettingsError::DepthLimit(MAX_DEPTH));
    }
    Ok(())
}

fn settings_from_json(map: &Map<String, Value>) -> Result<ModSettings> {
    let version = match map.get("version") {
        Some(Value::Array(parts)) if parts.len() == 4 => {
            let mut out = [0u16; 4];
            for (slot, part) in out.iter_mut().zip(parts) {
                *slot = part
                    .as_u64()
                    .and_then(|n| u16::try_from(n).ok())
                    .ok_or_else(|| {
                        ModSettingsError::InvalidFormat(format!("bad version component {}", part))
                    })?;
            }
            Version::from(out)
        }
        _ => {
            return Err(ModSettingsError::InvalidFormat(
                "\"version\" must be an array of 4 integers".into(),
            ));
        }
    };
    if !version.is_supported() {
        return Err(ModSettingsError::UnsupportedVersion(version));
    }

    let has_quality = match map.get("has_quality") {
        Some(Value::Bool(b)) => *b,
        None => false,
        Some(other) => {
            return Err(ModSettingsError::InvalidFormat(format!(
                "\"has_quality\" must be a boolean, got {}",
                other
            )));
        }
    };

    let data = map
        .get("data")
        .ok_or_else(|| ModSettingsError::InvalidFormat("missing \"data\" field".into()))?;

    Ok(ModSettings::new(version, has_quality, tree_from_json(data)?))
}

// === Documents ===

/// A decoded textual document: an envelope if the top-level object says so,
/// otherwise a bare tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Settings(ModSettings),
    Tree(PropertyTree),
}

impl Document {
    pub fn from_json(value: &Value) -> Result<Self> {
        if let Value::Object(map) = value
            && let Some(tag) = map.get(TYPE_FIELD)
        {
            return match tag.as_str() {
                Some(MOD_SETTINGS_TYPE) => Ok(Document::Settings(settings_from_json(map)?)),
                _ => Err(ModSettingsError::InvalidFormat(format!(
                    "unknown object type {}",
                    tag
                ))),
            };
        }
        Ok(Document::Tree(tree_from_json(value)?))
    }

    pub fn to_json(&self) -> Result<Value> {
        match self {
            Document::Settings(settings) => settings_to_json(settings),
            Document::Tree(tree) => tree_to_json(tree),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        Document::from_json(&value)
    }

    pub fn to_string_pretty(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.to_writer_pretty(&mut buf)?;
        // serde_json only emits UTF-8
        Ok(String::from_utf8(buf)?)
    }

    pub fn to_writer_pretty<W: Write>(&self, writer: W) -> Result<()> {
        let value = self.to_json()?;
        let formatter = PrettyFormatter::with_indent(INDENT);
        let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
        value.serialize(&mut ser)?;
        Ok(())
    }

    /// Writes the binary form. A bare tree is written without a header.
    pub fn write_binary<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Document::Settings(settings) => settings.write(writer),
            Document::Tree(tree) => tree.write(writer),
        }
    }
}

impl FromStr for Document {
    type Err = ModSettingsError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Document::from_json(&value)
    }
}

impl From<ModSettings> for Document {
    fn from(settings: ModSettings) -> Self {
        Document::Settings(settings)
    }
}

impl From<PropertyTree> for Document {
    fn from(tree: PropertyTree) -> Self {
        Document::Tree(tree)
    }
}
