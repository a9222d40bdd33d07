use crate::normalize::{NormalizedResult, View};
use pulldown_cmark::escape::{escape_href, escape_html};
use pulldown_cmark::{html, Options, Parser};

fn markdown_section(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::from("<section class=\"markdown\">\n");
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out.push_str("</section>\n");
    out
}

fn json_section(json: &str) -> String {
    let mut out = String::from("<section class=\"json\">\n<pre><code class=\"language-json\">");
    let _ = escape_html(&mut out, json);
    out.push_str("</code></pre>\n</section>\n");
    out
}

fn screenshot_section(url: &str) -> String {
    let mut out = String::from("<section class=\"screenshot\">\n<img src=\"");
    let _ = escape_href(&mut out, url);
    out.push_str("\" alt=\"Screenshot\">\n</section>\n");
    out
}

/// Renders a result as a standalone HTML page
///
/// The initially selected view comes first.
pub fn to_html(result: &NormalizedResult) -> String {
    let document = (!result.document.is_empty()).then(|| markdown_section(&result.document));
    let structured = (!result.structured_payload.is_null())
        .then(|| json_section(&result.structured_json()));

    let mut body = String::new();
    match result.initial_view() {
        View::Structured => {
            body.extend(structured);
            body.extend(document);
        }
        View::Document | View::Empty => {
            body.extend(document);
            body.extend(structured);
        }
    }
    if let Some(url) = &result.screenshot_url {
        body.push_str(&screenshot_section(url));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Scrapedeck result</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        body
    )
}
