//! Crawl results: a fold over pages in input order

use crate::normalize::links::{collect_links, Link};
use crate::normalize::NormalizedResult;
use crate::{AppError, Result};
use serde_json::{json, Value};
use std::fmt::Write;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_URL: &str = "Unknown URL";

const SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Default)]
struct Accumulator {
    sections: String,
    records: Vec<Value>,
    links: Vec<Link>,
}

fn metadata<'a>(page: &'a Value, key: &str, default: &'a str) -> &'a str {
    page.get("metadata")
        .and_then(|m| m.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
}

fn fold_page(mut acc: Accumulator, (index, page): (usize, &Value)) -> Accumulator {
    let title = metadata(page, "title", UNTITLED);
    let source_url = metadata(page, "sourceURL", UNKNOWN_URL);

    acc.links
        .extend(collect_links(page.get("links"), Some(source_url)));

    if let Some(markdown) = page
        .get("markdown")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
    {
        let _ = write!(
            acc.sections,
            "## Page {}: {}\n\nURL: {}\n\n{}{}",
            index + 1,
            title,
            source_url,
            markdown,
            SEPARATOR
        );
    }

    acc.records.push(json!({
        "url": source_url,
        "title": title,
        "data": page,
    }));

    acc
}

fn all_links_section(links: &[Link]) -> String {
    if links.is_empty() {
        return String::new();
    }

    let mut section = String::from("## All Links\n\n");
    for link in links {
        let source = link.source_url.as_deref().unwrap_or(UNKNOWN_URL);
        let _ = writeln!(
            section,
            "- [{}]({}) - from [{}]({})",
            link.text, link.href, source, source
        );
    }
    section.push_str(SEPARATOR);
    section
}

/// Normalizes a completed crawl status payload
pub fn normalize_pages(payload: &Value) -> Result<NormalizedResult> {
    let pages = payload
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::malformed("Invalid crawl results from API"))?;

    let acc = pages
        .iter()
        .enumerate()
        .fold(Accumulator::default(), fold_page);

    let mut document = all_links_section(&acc.links);
    document.push_str(&acc.sections);

    Ok(NormalizedResult {
        document,
        structured_payload: Value::Array(acc.records),
        screenshot_url: None,
        links: acc.links,
    })
}
