use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::io::{Read, Write};

use crate::error::{ModSettingsError, Result};
use crate::string::VarString;

/// Maximum number of nested List/Dictionary levels accepted when decoding.
pub const MAX_DEPTH: usize = 100;

// Child counts beyond this are grown on demand instead of reserved up front
const MAX_PREALLOC: usize = 1024;

#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum TreeType {
    Null = 0,
    Bool = 1,
    Number = 2,
    String = 3,
    List = 4,
    Dictionary = 5,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(VarString),
    List(Vec<PropertyTree>),
    Dictionary(Vec<PropertyTree>),
}

impl PropertyValue {
    pub fn tree_type(&self) -> TreeType {
        match self {
            PropertyValue::Null => TreeType::Null,
            PropertyValue::Bool(_) => TreeType::Bool,
            PropertyValue::Number(_) => TreeType::Number,
            PropertyValue::String(_) => TreeType::String,
            PropertyValue::List(_) => TreeType::List,
            PropertyValue::Dictionary(_) => TreeType::Dictionary,
        }
    }
}

/// A node of the settings tree.
///
/// The key belongs to the parent's entry on the wire: it is written before
/// the node body and is null for the root.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTree {
    pub key: VarString,
    pub value: PropertyValue,
    pub any_type: bool,
}

impl PropertyTree {
    pub fn new(value: PropertyValue) -> Self {
        PropertyTree {
            key: VarString::null(),
            value,
            any_type: false,
        }
    }

    pub fn with_key(self, key: impl Into<VarString>) -> Self {
        PropertyTree {
            key: key.into(),
            ..self
        }
    }

    pub fn with_any_type(self, any_type: bool) -> Self {
        PropertyTree { any_type, ..self }
    }

    pub fn tree_type(&self) -> TreeType {
        self.value.tree_type()
    }

    /// Children of a List or Dictionary node.
    pub fn children(&self) -> Option<&[PropertyTree]> {
        match &self.value {
            PropertyValue::List(items) | PropertyValue::Dictionary(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a dictionary entry. With duplicate keys the last one wins.
    pub fn get(&self, key: &str) -> Option<&PropertyTree> {
        match &self.value {
            PropertyValue::Dictionary(items) => items
                .iter()
                .rev()
                .find(|item| item.key.as_bytes() == Some(key.as_bytes())),
            _ => None,
        }
    }

    /// Reads a tree whose root carries no key.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let (value, any_type) = read_body(reader, 0)?;
        Ok(PropertyTree {
            key: VarString::null(),
            value,
            any_type,
        })
    }

    /// Writes the node body. The key is only written by the enclosing container.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.tree_type().into())?;
        writer.write_u8(self.any_type as u8)?;

        match &self.value {
            PropertyValue::Null => {}
            PropertyValue::Bool(b) => writer.write_u8(*b as u8)?,
            PropertyValue::Number(n) => writer.write_f64::<LE>(*n)?,
            PropertyValue::String(s) => s.write(writer)?,
            PropertyValue::List(items) | PropertyValue::Dictionary(items) => {
                let count = u32::try_from(items.len())
                    .map_err(|_| ModSettingsError::LengthOverflow(items.len()))?;
                writer.write_u32::<LE>(count)?;
                for item in items {
                    item.key.write(writer)?;
                    item.write(writer)?;
                }
            }
        }
        Ok(())
    }
}

// Decodes type tag, flag and payload. Keys are paired with the body by the caller.
fn read_body<R: Read>(reader: &mut R, depth: usize) -> Result<(PropertyValue, bool)> {
    let tag = reader.read_u8()?;
    let tree_type = TreeType::try_from(tag)
        .map_err(|_| ModSettingsError::InvalidFormat(format!("unknown type tag {:#04x}", tag)))?;
    let any_type = reader.read_u8()? != 0;

    let value = match tree_type {
        TreeType::Null => PropertyValue::Null,
        TreeType::Bool => PropertyValue::Bool(reader.read_u8()? != 0),
        TreeType::Number => PropertyValue::Number(reader.read_f64::<LE>()?),
        TreeType::String => PropertyValue::String(VarString::read(reader)?),
        TreeType::List => PropertyValue::List(read_children(reader, depth + 1)?),
        TreeType::Dictionary => PropertyValue::Dictionary(read_children(reader, depth + 1)?),
    };

    Ok((value, any_type))
}

fn read_children<R: Read>(reader: &mut R, depth: usize) -> Result<Vec<PropertyTree>> {
    if depth > MAX_DEPTH {
        return Err(ModSettingsError::DepthLimit(MAX_DEPTH));
    }

    let count = reader.read_u32::<LE>()? as usize;
    log::trace!("reading {} entries at depth {}", count, depth);

    let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        let key = VarString::read(reader)?;
        let (value, any_type) = read_body(reader, depth)?;
        items.push(PropertyTree {
            key,
            value,
            any_type,
        });
    }
    Ok(items)
}
