use anyhow::Result;
use clap::Args;
use fhirgate_core::FhirVersion;
use serde_json::json;
use std::io::Write;

use super::{write_json, Context, OutputFormat};

#[derive(Args)]
pub struct VersionCommand {}

impl VersionCommand {
    pub fn execute<W: Write>(&self, ctx: &Context, out: &mut W) -> Result<bool> {
        let current = ctx.services.validation.current_fhir_version();
        let supported: Vec<&str> = FhirVersion::ALL.iter().map(|v| v.as_str()).collect();

        match ctx.output {
            OutputFormat::Json => write_json(
                out,
                &json!({ "fhirVersion": current, "supportedVersions": supported }),
            )?,
            OutputFormat::Text => {
                writeln!(out, "FHIR version: {} ({})", current, current.fhir_release())?;
                writeln!(out, "Supported versions: {}", supported.join(", "))?;
            }
        }
        Ok(true)
    }
}
