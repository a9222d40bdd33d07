//! Presentation of normalized results
//!
//! Markdown output is the combined document as-is, JSON output is the
//! pretty-printed structured payload, and HTML output renders both (plus the
//! screenshot) into one standalone page.

mod html;

pub use html::to_html;

use crate::normalize::NormalizedResult;
use crate::Result;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Output formats offered by the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Markdown,
    Json,
    Html,
}

impl RenderFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The combined document
pub fn to_markdown(result: &NormalizedResult) -> String {
    result.document.clone()
}

/// The structured payload, pretty-printed
pub fn to_json(result: &NormalizedResult) -> String {
    result.structured_json()
}

pub fn render(result: &NormalizedResult, format: RenderFormat) -> String {
    match format {
        RenderFormat::Markdown => to_markdown(result),
        RenderFormat::Json => to_json(result),
        RenderFormat::Html => to_html(result),
    }
}

/// Renders a result and writes it to a file, or stdout when no path is given
///
/// # Arguments
///
/// * `result` - The normalized result
/// * `format` - Output format
/// * `output_path` - Destination file, `None` for stdout
pub fn write_result(
    result: &NormalizedResult,
    format: RenderFormat,
    output_path: Option<&Path>,
) -> Result<()> {
    let mut rendered = render(result, format);
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match output_path {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(rendered.as_bytes())?;
            tracing::info!(path = %path.display(), format = %format, "Wrote result");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(rendered.as_bytes())?;
            handle.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> NormalizedResult {
        NormalizedResult {
            document: "# Title\n\nBody".to_string(),
            structured_payload: json!({"markdown": "# Title"}),
            screenshot_url: None,
            links: Vec::new(),
        }
    }

    #[test]
    fn test_render_format_from_str() {
        assert_eq!("md".parse::<RenderFormat>().unwrap(), RenderFormat::Markdown);
        assert_eq!("Markdown".parse::<RenderFormat>().unwrap(), RenderFormat::Markdown);
        assert_eq!("json".parse::<RenderFormat>().unwrap(), RenderFormat::Json);
        assert_eq!("HTML".parse::<RenderFormat>().unwrap(), RenderFormat::Html);
        assert!("pdf".parse::<RenderFormat>().is_err());
    }

    #[test]
    fn test_markdown_and_json() {
        let result = sample();
        assert_eq!(to_markdown(&result), "# Title\n\nBody");
        assert_eq!(to_json(&result), "{\n  \"markdown\": \"# Title\"\n}");
    }

    #[test]
    fn test_write_result_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_result(&sample(), RenderFormat::Json, Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("}\n"));
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["markdown"], "# Title");
    }
}
