use crate::normalize::links::{collect_links, Link};
use crate::normalize::NormalizedResult;
use crate::{AppError, Result};
use serde_json::Value;
use std::fmt::Write;

/// Normalizes a scrape or extract response
pub fn normalize_page(payload: &Value) -> Result<NormalizedResult> {
    let data = payload
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| AppError::malformed("Invalid response from API"))?;

    let source_url = data
        .pointer("/metadata/sourceURL")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());

    let links = collect_links(data.get("links"), source_url);

    let mut document = links_section(&links);
    if let Some(markdown) = data.get("markdown").and_then(Value::as_str) {
        document.push_str(markdown);
    }

    Ok(NormalizedResult {
        document,
        structured_payload: data.clone(),
        screenshot_url: screenshot(data),
        links,
    })
}

fn links_section(links: &[Link]) -> String {
    if links.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Links\n\n");
    for link in links {
        let _ = writeln!(section, "- [{}]({})", link.text, link.href);
    }
    section.push_str("\n\n");
    section
}

/// Direct `screenshot` field first, then the first action screenshot
fn screenshot(data: &Value) -> Option<String> {
    let direct = data.get("screenshot").and_then(Value::as_str);
    let from_actions = || {
        data.pointer("/actions/screenshots/0")
            .and_then(Value::as_str)
    };

    direct
        .filter(|s| !s.is_empty())
        .or_else(from_actions)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_layout() {
        let result = normalize_page(&json!({
            "data": {
                "links": ["https://a", {"url": "https://b", "title": "B"}],
                "markdown": "# Title"
            }
        }))
        .unwrap();

        assert_eq!(
            result.document,
            "## Links\n\n- [https://a](https://a)\n- [B](https://b)\n\n\n# Title"
        );
        assert_eq!(result.links.len(), 2);
    }

    #[test]
    fn test_no_links_no_section() {
        let result = normalize_page(&json!({"data": {"links": [], "markdown": "text"}})).unwrap();
        assert_eq!(result.document, "text");

        let result = normalize_page(&json!({"data": {"links": [1, 2]}})).unwrap();
        assert_eq!(result.document, "");
    }

    #[test]
    fn test_structured_payload_is_result_object() {
        let data = json!({"markdown": "m", "metadata": {"title": "T", "sourceURL": "https://s"}});
        let result = normalize_page(&json!({"data": data.clone(), "success": true})).unwrap();
        assert_eq!(result.structured_payload, data);
    }

    #[test]
    fn test_links_carry_source() {
        let result = normalize_page(&json!({
            "data": {"links": ["/a"], "metadata": {"sourceURL": "https://s"}}
        }))
        .unwrap();
        assert_eq!(result.links[0].source_url.as_deref(), Some("https://s"));
    }

    #[test]
    fn test_screenshot_priority() {
        let both = json!({"data": {
            "screenshot": "https://direct.png",
            "actions": {"screenshots": ["https://action.png"]}
        }});
        assert_eq!(
            normalize_page(&both).unwrap().screenshot_url.as_deref(),
            Some("https://direct.png")
        );

        let actions_only = json!({"data": {"actions": {"screenshots": ["https://action.png"]}}});
        assert_eq!(
            normalize_page(&actions_only).unwrap().screenshot_url.as_deref(),
            Some("https://action.png")
        );

        let empty_list = json!({"data": {"actions": {"screenshots": []}}});
        assert_eq!(normalize_page(&empty_list).unwrap().screenshot_url, None);
    }
}
