use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::{Document, ModSettings};

/// On-disk representation, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Dat,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("dat") {
            Some(Format::Dat)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Format::Json)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Dat => "dat",
            Format::Json => "json",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Format::Dat => Format::Json,
            Format::Json => Format::Dat,
        }
    }
}

pub fn read_document(input: &Path, format: Format) -> Result<Document> {
    let mut reader = BufReader::new(fs::File::open(input)?);
    match format {
        Format::Dat => Ok(Document::Settings(ModSettings::read(&mut reader)?)),
        Format::Json => Document::from_reader(reader),
    }
}

pub fn write_document(document: &Document, output: &Path, format: Format) -> Result<()> {
    let mut writer = BufWriter::new(fs::File::create(output)?);
    match format {
        Format::Dat => document.write_binary(&mut writer)?,
        Format::Json => document.to_writer_pretty(&mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

pub fn dat_to_json(input: &Path, output: &Option<PathBuf>) -> Result<PathBuf> {
    // Decode DAT -> JSON
    let document = read_document(input, Format::Dat)?;

    let out_path = match output {
        Some(p) => p.clone(),
        None => input.with_extension(Format::Json.extension()),
    };

    write_document(&document, &out_path, Format::Json)?;
    Ok(out_path)
}

pub fn json_to_dat(input: &Path, output: &Option<PathBuf>) -> Result<PathBuf> {
    // Encode JSON -> DAT
    let document = read_document(input, Format::Json)?;

    let out_path = match output {
        Some(p) => p.clone(),
        None => input.with_extension(Format::Dat.extension()),
    };

    write_document(&document, &out_path, Format::Dat)?;
    Ok(out_path)
}
