use anyhow::{Context, Result, bail};
use clap::Parser;
use modsettings::process::{Format, dat_to_json, json_to_dat, read_document, write_document};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "modsettings")]
#[command(about = "Converts mod settings between `.dat` and JSON", long_about = None)]
struct Cli {
    /// Input file (.dat or .json)
    input: PathBuf,
    /// Output file (.json or .dat), defaults to the input name with the other extension
    output: Option<PathBuf>,
    /// Print debug output
    #[arg(short, long)]
    verbose: bool,
}

fn format_of(path: &Path, role: &str) -> Result<Format> {
    match Format::from_path(path) {
        Some(format) => Ok(format),
        None => bail!(
            "{} filename '{}' does not end with .dat or .json",
            role,
            path.display()
        ),
    }
}

fn label(format: Format) -> &'static str {
    match format {
        Format::Dat => "DAT",
        Format::Json => "JSON",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let input_format = format_of(&cli.input, "Input")?;
    let output = match cli.output {
        Some(p) => p,
        None => cli.input.with_extension(input_format.other().extension()),
    };
    let output_format = format_of(&output, "Output")?;

    log::info!(
        "Converting {} file {:?} to {} file {:?}...",
        label(input_format),
        cli.input,
        label(output_format),
        output
    );
    let context = || {
        format!(
            "Failed to convert {} file {:?} to {}",
            label(input_format),
            cli.input,
            label(output_format)
        )
    };

    let written = match (input_format, output_format) {
        (Format::Dat, Format::Json) => {
            dat_to_json(&cli.input, &Some(output)).with_context(context)?
        }
        (Format::Json, Format::Dat) => {
            json_to_dat(&cli.input, &Some(output)).with_context(context)?
        }
        // Same format on both sides re-encodes the document
        (format, _) => {
            let document = read_document(&cli.input, format).with_context(context)?;
            write_document(&document, &output, format).with_context(context)?;
            output
        }
    };
    log::info!("Wrote {:?}", written);

    Ok(())
}
