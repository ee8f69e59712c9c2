use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Cursor, Read, Write};

use crate::error::{ModSettingsError, Result};
use crate::tree::{PropertyTree, PropertyValue};

/// Game version stored in the settings header. Game release 1.1.110 is `1.1.110.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub build: u16,
}

impl Version {
    /// Oldest version whose settings layout is understood.
    pub const MINIMUM: Version = Version::new(0, 18, 0, 0);

    pub const fn new(major: u16, minor: u16, patch: u16, build: u16) -> Self {
        Version {
            major,
            minor,
            patch,
            build,
        }
    }

    pub fn is_supported(&self) -> bool {
        *self >= Version::MINIMUM
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Version {
            major: reader.read_u16::<LE>()?,
            minor: reader.read_u16::<LE>()?,
            patch: reader.read_u16::<LE>()?,
            build: reader.read_u16::<LE>()?,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for part in <[u16; 4]>::from(*self) {
            writer.write_u16::<LE>(part)?;
        }
        Ok(())
    }
}

impl From<[u16; 4]> for Version {
    fn from([major, minor, patch, build]: [u16; 4]) -> Self {
        Version::new(major, minor, patch, build)
    }
}

impl From<Version> for [u16; 4] {
    fn from(v: Version) -> Self {
        [v.major, v.minor, v.patch, v.build]
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.build)
    }
}

/// Versioned envelope around the root settings tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ModSettings {
    pub version: Version,
    pub has_quality: bool,
    pub data: PropertyTree,
}

impl ModSettings {
    pub fn new(version: Version, has_quality: bool, data: PropertyTree) -> Self {
        ModSettings {
            version,
            has_quality,
            data,
        }
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let version = Version::read(reader)?;
        // Rejected before the body is read, so a truncated old file reports the version
        if !version.is_supported() {
            return Err(ModSettingsError::UnsupportedVersion(version));
        }
        let has_quality = reader.read_u8()? != 0;
        log::debug!("settings version {}, has_quality={}", version, has_quality);

        let data = PropertyTree::read(reader)?;
        if !matches!(data.value, PropertyValue::Dictionary(_)) {
            log::debug!("settings root is {:?}, not a dictionary", data.tree_type());
        }

        Ok(ModSettings {
            version,
            has_quality,
            data,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.version.write(writer)?;
        writer.write_u8(self.has_quality as u8)?;
        self.data.write(writer)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ModSettings::read(&mut Cursor::new(bytes))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }
}
