use crate::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Which kind of extraction the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Single page
    Scrape,
    /// Multi-page job, polled to completion
    Crawl,
    /// Single page constrained by a prompt and/or schema
    Extract,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scrape => "scrape",
            Self::Crawl => "crawl",
            Self::Extract => "extract",
        }
    }

    /// Backend path the request body is posted to
    ///
    /// Extract requests are scrapes with a structured-data format.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Scrape | Self::Extract => "/v1/scrape",
            Self::Crawl => "/v1/crawl",
        }
    }

    /// Returns true if results arrive through an asynchronous job
    pub fn is_batched(&self) -> bool {
        matches!(self, Self::Crawl)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format tags understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "markdown")]
    Markdown,
    #[serde(rename = "html")]
    Html,
    #[serde(rename = "rawHtml")]
    RawHtml,
    #[serde(rename = "links")]
    Links,
    #[serde(rename = "screenshot")]
    Screenshot,
    #[serde(rename = "screenshot@fullPage")]
    ScreenshotFullPage,
    #[serde(rename = "json")]
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::RawHtml => "rawHtml",
            Self::Links => "links",
            Self::Screenshot => "screenshot",
            Self::ScreenshotFullPage => "screenshot@fullPage",
            Self::Json => "json",
        }
    }

    pub fn all() -> [Self; 7] {
        [
            Self::Markdown,
            Self::Html,
            Self::RawHtml,
            Self::Links,
            Self::Screenshot,
            Self::ScreenshotFullPage,
            Self::Json,
        ]
    }

    pub fn is_screenshot(&self) -> bool {
        matches!(self, Self::Screenshot | Self::ScreenshotFullPage)
    }
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::all()
            .into_iter()
            .find(|format| format.as_str() == tag)
            .ok_or_else(|| ValidationError::UnknownFormat(tag.to_string()))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a single-page scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub only_main_content: bool,
    pub remove_base64_images: bool,
    /// Milliseconds to wait for the page before extracting
    pub wait_for: u64,
    /// Request timeout in milliseconds
    pub timeout: u64,
}

/// Options for a multi-page crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    pub max_depth: u64,
    pub limit: u64,
    pub ignore_sitemap: bool,
    pub allow_external_links: bool,
    /// `None` means "no filter"; never an empty list
    pub include_paths: Option<Vec<String>>,
    pub exclude_paths: Option<Vec<String>>,
    /// Applied to every crawled page
    pub only_main_content: bool,
}

/// Options for schema-guided extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub prompt: Option<String>,
    pub schema: Option<Value>,
    pub wait_for: u64,
}

/// Mode-specific request options
#[derive(Debug, Clone, PartialEq)]
pub enum ModeOptions {
    Scrape(ScrapeOptions),
    Crawl(CrawlOptions),
    Extract(ExtractOptions),
}

/// A validated request ready to be sent to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    /// Absolute http(s) URL, already validated
    pub url: String,
    pub formats: Vec<OutputFormat>,
    pub options: ModeOptions,
}

impl ExtractionRequest {
    pub fn mode(&self) -> Mode {
        match self.options {
            ModeOptions::Scrape(_) => Mode::Scrape,
            ModeOptions::Crawl(_) => Mode::Crawl,
            ModeOptions::Extract(_) => Mode::Extract,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.mode().endpoint()
    }

    /// Returns true if any requested format asks for a screenshot
    pub fn wants_screenshot(&self) -> bool {
        self.formats.iter().any(OutputFormat::is_screenshot)
    }

    /// Builds the JSON body posted to the backend
    pub fn body(&self) -> RequestBody {
        let url = self.url.clone();
        let formats = self.formats.clone();

        match &self.options {
            ModeOptions::Scrape(opts) => RequestBody::Scrape(ScrapeBody {
                url,
                formats,
                only_main_content: opts.only_main_content,
                remove_base64_images: opts.remove_base64_images,
                wait_for: opts.wait_for,
                timeout: opts.timeout,
            }),
            ModeOptions::Crawl(opts) => RequestBody::Crawl(CrawlBody {
                url,
                max_depth: opts.max_depth,
                limit: opts.limit,
                ignore_sitemap: opts.ignore_sitemap,
                allow_external_links: opts.allow_external_links,
                include_paths: opts.include_paths.clone(),
                exclude_paths: opts.exclude_paths.clone(),
                scrape_options: CrawlScrapeOptions {
                    formats,
                    only_main_content: opts.only_main_content,
                },
            }),
            ModeOptions::Extract(opts) => {
                let json_options = JsonOptions {
                    prompt: opts.prompt.clone(),
                    schema: opts.schema.clone(),
                };
                RequestBody::Extract(ExtractBody {
                    url,
                    formats,
                    json_options: (!json_options.is_empty()).then_some(json_options),
                    wait_for: opts.wait_for,
                })
            }
        }
    }
}

/// Wire body for any mode
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Scrape(ScrapeBody),
    Crawl(CrawlBody),
    Extract(ExtractBody),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeBody {
    pub url: String,
    pub formats: Vec<OutputFormat>,
    pub only_main_content: bool,
    pub remove_base64_images: bool,
    pub wait_for: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlBody {
    pub url: String,
    pub max_depth: u64,
    pub limit: u64,
    pub ignore_sitemap: bool,
    pub allow_external_links: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_paths: Option<Vec<String>>,
    pub scrape_options: CrawlScrapeOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlScrapeOptions {
    pub formats: Vec<OutputFormat>,
    pub only_main_content: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractBody {
    pub url: String,
    pub formats: Vec<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_options: Option<JsonOptions>,
    pub wait_for: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl JsonOptions {
    fn is_empty(&self) -> bool {
        self.prompt.is_none() && self.schema.is_none()
    }
}
