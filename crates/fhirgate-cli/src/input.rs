//! Reading resources from files or stdin

use anyhow::{Context, Result};
use fhirgate_core::ResourceFormat;
use std::io::Read;
use std::path::Path;

/// Path that stands for standard input
pub const STDIN: &str = "-";

/// Read the whole input, from stdin when the path is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read resource from stdin")?;
        return Ok(content);
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read resource from {}", path.display()))
}

/// Pick the input format: explicit flag, then file extension, then content
pub fn detect_format(
    explicit: Option<ResourceFormat>,
    path: &Path,
    content: &str,
) -> ResourceFormat {
    if let Some(format) = explicit {
        return format;
    }
    if let Some(format) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ResourceFormat::parse)
    {
        return format;
    }
    if content.trim_start().starts_with('<') {
        ResourceFormat::Xml
    } else {
        ResourceFormat::Json
    }
}

/// clap value parser for `json`/`xml`
pub fn parse_format(s: &str) -> Result<ResourceFormat, String> {
    ResourceFormat::parse(s).ok_or_else(|| format!("unsupported format '{}' (expected json or xml)", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_format() {
        let json = PathBuf::from("patient.json");
        let xml = PathBuf::from("patient.xml");
        let stdin = PathBuf::from(STDIN);

        assert_eq!(detect_format(Some(ResourceFormat::Xml), &json, "{}"), ResourceFormat::Xml);
        assert_eq!(detect_format(None, &xml, "{}"), ResourceFormat::Xml);
        assert_eq!(detect_format(None, &stdin, "  <Patient/>"), ResourceFormat::Xml);
        assert_eq!(detect_format(None, &stdin, "{}"), ResourceFormat::Json);
    }

    #[test]
    fn test_parse_format_rejects_unknown() {
        assert_eq!(parse_format("XML"), Ok(ResourceFormat::Xml));
        assert!(parse_format("turtle").is_err());
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read resource"));
    }
}
