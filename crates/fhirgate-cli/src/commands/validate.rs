use anyhow::Result;
use clap::Args;
use fhirgate_core::{ResourceFormat, ValidationIssue, ValidationRequest};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use super::{write_json, Context, OutputFormat};
use crate::input::{detect_format, parse_format, read_input};

#[derive(Args)]
pub struct ValidateCommand {
    /// Resource file, or `-` for stdin
    pub input: PathBuf,

    /// Input format (json or xml); detected when omitted
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<ResourceFormat>,

    /// Profile canonical URL (reported, not evaluated)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Hide warnings and information in text output
    #[arg(short, long)]
    pub quiet: bool,
}

impl ValidateCommand {
    /// Returns whether the resource is valid
    pub async fn execute<W: Write>(&self, ctx: &Context, out: &mut W) -> Result<bool> {
        let content = read_input(&self.input)?;
        let format = detect_format(self.format, &self.input, &content);
        debug!(input = %self.input.display(), %format, "Validating");

        let mut request = ValidationRequest::new(content, format);
        request.profile_url = self.profile.clone();
        let result = ctx.services.validation.validate(&request).await;

        if ctx.output == OutputFormat::Json {
            write_json(out, &result)?;
            return Ok(result.is_valid());
        }

        let resource_type = result.resource_type.as_deref().unwrap_or("Resource");
        if result.is_valid() {
            writeln!(out, "✓ {} is valid ({})", resource_type, result.fhir_version)?;
        } else {
            writeln!(
                out,
                "✗ {} is invalid: {} error(s), {} warning(s)",
                resource_type,
                result.errors.len(),
                result.warnings.len()
            )?;
        }

        for issue in result.issues().filter(|i| !self.quiet || i.is_error()) {
            print_issue(out, issue)?;
        }

        Ok(result.is_valid())
    }
}

fn print_issue<W: Write>(out: &mut W, issue: &ValidationIssue) -> Result<()> {
    write!(out, "  [{}]", issue.severity)?;
    if let Some(location) = &issue.location {
        write!(out, " {}:", location)?;
    }
    write!(out, " {}", issue.message)?;
    if let Some(code) = &issue.code {
        write!(out, " ({})", code)?;
    }
    writeln!(out)?;
    Ok(())
}
