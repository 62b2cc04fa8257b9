use anyhow::Result;
use clap::Args;
use fhirgate_core::{ParseRequest, ResourceFormat};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use super::{write_json, Context, OutputFormat};
use crate::input::{detect_format, parse_format, read_input};

#[derive(Args)]
pub struct ParseCommand {
    /// Resource file, or `-` for stdin
    pub input: PathBuf,

    /// Input format (json or xml); detected when omitted
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<ResourceFormat>,

    /// Print the re-serialized resource after the metadata
    #[arg(long)]
    pub show_resource: bool,
}

impl ParseCommand {
    /// Returns whether the resource parsed
    pub async fn execute<W: Write>(&self, ctx: &Context, out: &mut W) -> Result<bool> {
        let content = read_input(&self.input)?;
        let format = detect_format(self.format, &self.input, &content);
        debug!(input = %self.input.display(), %format, "Parsing");

        let request = ParseRequest::new(content, format);
        let result = ctx.services.parser.parse(&request).await;

        match ctx.output {
            OutputFormat::Json => write_json(out, &result)?,
            OutputFormat::Text if result.success => {
                writeln!(
                    out,
                    "✓ Parsed {} ({})",
                    result.resource_type.as_deref().unwrap_or("resource"),
                    result.fhir_version
                )?;
                if let Some(id) = &result.resource_id {
                    writeln!(out, "  id: {}", id)?;
                }
                let details = result
                    .metadata
                    .iter()
                    .filter(|(k, _)| !matches!(k.as_str(), "id" | "resourceType"));
                for (key, value) in details {
                    if let Some(value) = value {
                        writeln!(out, "  {}: {}", key, value)?;
                    }
                }
                if self.show_resource {
                    if let Some(serialized) = &result.serialized_resource {
                        writeln!(out, "{}", serialized)?;
                    }
                }
            }
            OutputFormat::Text => {
                writeln!(
                    out,
                    "✗ Parse failed: {}",
                    result.error_message.as_deref().unwrap_or("unknown error")
                )?;
            }
        }

        Ok(result.success)
    }
}
