pub mod convert;
pub mod parse;
pub mod validate;
pub mod version;

pub use convert::ConvertCommand;
pub use parse::ParseCommand;
pub use validate::ValidateCommand;
pub use version::VersionCommand;

use anyhow::Result;
use clap::ValueEnum;
use fhirgate_core::FhirServices;
use serde::Serialize;
use std::io::Write;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Shared state handed to every command
pub struct Context {
    pub services: FhirServices,
    pub output: OutputFormat,
}

pub(crate) fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
