use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Read, Write};

use crate::error::{ModSettingsError, Result};

/// Length byte that announces a following u32 length.
pub const LENGTH_ESCAPE: u8 = 0xFF;

/// Nullable, length-prefixed byte string.
///
/// A null string and an empty string are distinct values and are encoded
/// differently on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VarString(pub Option<Vec<u8>>);

impl VarString {
    pub fn null() -> Self {
        VarString(None)
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        VarString(Some(bytes.into()))
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }

    /// Decodes the bytes as UTF-8. A null string yields `None`.
    pub fn to_text(&self) -> Result<Option<String>> {
        match &self.0 {
            Some(bytes) => Ok(Some(String::from_utf8(bytes.clone())?)),
            None => Ok(None),
        }
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let is_null = reader.read_u8()? != 0;
        if is_null {
            return Ok(VarString(None));
        }

        let mut len = reader.read_u8()? as u64;
        if len == LENGTH_ESCAPE as u64 {
            len = reader.read_u32::<LE>()? as u64;
        }

        // Don't trust the declared length for the allocation
        let mut buf = Vec::new();
        reader.by_ref().take(len).read_to_end(&mut buf)?;
        if (buf.len() as u64) < len {
            return Err(ModSettingsError::TruncatedInput);
        }

        Ok(VarString(Some(buf)))
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.is_null() as u8)?;

        if let Some(bytes) = &self.0 {
            // 0xFF itself is the escape marker, so it must take the long form
            if bytes.len() >= LENGTH_ESCAPE as usize {
                let len = u32::try_from(bytes.len())
                    .map_err(|_| ModSettingsError::LengthOverflow(bytes.len()))?;
                writer.write_u8(LENGTH_ESCAPE)?;
                writer.write_u32::<LE>(len)?;
            } else {
                writer.write_u8(bytes.len() as u8)?;
            }
            writer.write_all(bytes)?;
        }
        Ok(())
    }
}

impl From<&str> for VarString {
    fn from(s: &str) -> Self {
        VarString(Some(s.as_bytes().to_vec()))
    }
}

impl From<String> for VarString {
    fn from(s: String) -> Self {
        VarString(Some(s.into_bytes()))
    }
}

impl fmt::Display for VarString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            None => write!(f, "null"),
        }
    }
}
