use anyhow::{Context as _, Result};
use clap::Args;
use fhirgate_core::ResourceFormat;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::{write_json, Context, OutputFormat};
use crate::input::{detect_format, parse_format, read_input};

#[derive(Args)]
pub struct ConvertCommand {
    /// Resource file, or `-` for stdin
    pub input: PathBuf,

    /// Source format (json or xml); detected when omitted
    #[arg(long, value_parser = parse_format)]
    pub from: Option<ResourceFormat>,

    /// Target format (json or xml)
    #[arg(long, value_parser = parse_format)]
    pub to: ResourceFormat,

    /// Write the converted resource here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl ConvertCommand {
    pub async fn execute<W: Write>(&self, ctx: &Context, out: &mut W) -> Result<bool> {
        let content = read_input(&self.input)?;
        let from = detect_format(self.from, &self.input, &content);

        let converted = ctx
            .services
            .parser
            .convert_format(&content, from.as_str(), self.to.as_str())
            .await
            .with_context(|| format!("Failed to convert {} to {}", from, self.to))?;

        if let Some(path) = &self.out {
            std::fs::write(path, &converted)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(output = %path.display(), "Converted {} to {}", from, self.to);
            return Ok(true);
        }

        match ctx.output {
            OutputFormat::Json => write_json(
                out,
                &json!({
                    "fromFormat": from.as_str(),
                    "toFormat": self.to.as_str(),
                    "convertedContent": converted,
                }),
            )?,
            OutputFormat::Text => writeln!(out, "{}", converted)?,
        }
        Ok(true)
    }
}
