//! Scrapedeck main entry point
//!
//! This is the command-line interface: `serve` runs the gateway, while
//! `scrape`, `crawl` and `extract` run one operation against the API and
//! print the result.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use scrapedeck::config::{load_config, validate, Config};
use scrapedeck::orchestrator::Orchestrator;
use scrapedeck::render::{write_result, RenderFormat};
use scrapedeck::{Mode, RawInput};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Scrapedeck: a front end for a remote content-extraction service
///
/// Runs a gateway that forwards browser calls to the extraction backend,
/// and a client that submits scrape, crawl and extract requests and renders
/// their results.
#[derive(Parser, Debug)]
#[command(name = "scrapedeck")]
#[command(version)]
#[command(about = "Scrape, crawl and extract web content through a gateway", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the gateway and serve the web application
    Serve {
        /// Address to listen on
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Do not open a browser on startup
        #[arg(long)]
        no_open: bool,
    },

    /// Scrape a single page
    Scrape {
        url: String,

        /// Output format tag to request (repeatable)
        #[arg(long = "format", value_name = "FORMAT", default_value = "markdown")]
        formats: Vec<String>,

        /// Keep only the main content of the page
        #[arg(long)]
        main_content: bool,

        /// Remove base64-encoded images
        #[arg(long)]
        strip_images: bool,

        /// Milliseconds to wait for the page before extracting
        #[arg(long, value_name = "MS")]
        wait_for: Option<String>,

        /// Request timeout in milliseconds
        #[arg(long, value_name = "MS")]
        timeout: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Crawl a site and combine its pages
    Crawl {
        url: String,

        #[arg(long, value_name = "N")]
        max_depth: Option<String>,

        /// Maximum number of pages
        #[arg(long, value_name = "N")]
        limit: Option<String>,

        #[arg(long)]
        ignore_sitemap: bool,

        #[arg(long)]
        allow_external_links: bool,

        /// Comma-separated path patterns to include
        #[arg(long, value_name = "CSV")]
        include_paths: Option<String>,

        /// Comma-separated path patterns to exclude
        #[arg(long, value_name = "CSV")]
        exclude_paths: Option<String>,

        /// Output format tag to request per page (repeatable)
        #[arg(long = "format", value_name = "FORMAT", default_value = "markdown")]
        formats: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract structured data from a page
    Extract {
        url: String,

        /// What to extract, in plain language
        #[arg(long)]
        prompt: Option<String>,

        /// JSON schema, inline or as @path/to/schema.json
        #[arg(long, value_name = "JSON|@FILE")]
        schema: Option<String>,

        #[arg(long, value_name = "MS")]
        wait_for: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// API base URL (defaults to the local gateway)
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Output format: md, json or html
    #[arg(long, default_value = "md")]
    output: RenderFormat,

    /// Write the result to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Environment first, so LOG_LEVEL from .env applies to logging too
    let _ = dotenvy::dotenv();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Serve {
            host,
            port,
            no_open,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if no_open {
                config.server.open_browser = false;
            }
            validate(&config).context("Invalid command-line options")?;

            scrapedeck::gateway::serve(&config).await?;
        }
        Command::Scrape {
            url,
            formats,
            main_content,
            strip_images,
            wait_for,
            timeout,
            output,
        } => {
            let input = RawInput {
                url,
                formats,
                only_main_content: main_content,
                remove_base64_images: strip_images,
                wait_for,
                timeout,
                ..Default::default()
            };
            run_operation(&mut config, Mode::Scrape, input, output).await?;
        }
        Command::Crawl {
            url,
            max_depth,
            limit,
            ignore_sitemap,
            allow_external_links,
            include_paths,
            exclude_paths,
            formats,
            output,
        } => {
            let input = RawInput {
                url,
                formats,
                max_depth,
                limit,
                ignore_sitemap,
                allow_external_links,
                include_paths,
                exclude_paths,
                ..Default::default()
            };
            run_operation(&mut config, Mode::Crawl, input, output).await?;
        }
        Command::Extract {
            url,
            prompt,
            schema,
            wait_for,
            output,
        } => {
            let schema = schema.map(read_schema).transpose()?;
            let input = RawInput {
                url,
                prompt,
                schema,
                wait_for,
                ..Default::default()
            };
            run_operation(&mut config, Mode::Extract, input, output).await?;
        }
    }

    Ok(())
}

/// Runs one client operation and writes its rendered result
async fn run_operation(
    config: &mut Config,
    mode: Mode,
    input: RawInput,
    output: OutputArgs,
) -> anyhow::Result<()> {
    if let Some(api_base) = output.api_base {
        config.client.api_base = api_base;
        validate(config).context("Invalid command-line options")?;
    }

    let mut orchestrator = Orchestrator::from_config(&config.client, config.gateway.credential())?;

    match orchestrator.client().gateway_config().await {
        Ok(info) => tracing::debug!(
            api_endpoint = %info.api_endpoint,
            credential = info.api_key,
            "Gateway configuration"
        ),
        Err(e) => tracing::debug!(error = %e, "Gateway configuration unavailable"),
    }

    let result = orchestrator
        .run_input(mode, &input, |progress| eprintln!("{}", progress))
        .await?;

    write_result(&result, output.output, output.out.as_deref())?;
    Ok(())
}

/// Reads a schema argument: inline JSON, or `@path` for a file
fn read_schema(arg: String) -> anyhow::Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path)),
        None => Ok(arg),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Without -v/-q, `LOG_LEVEL` or `RUST_LOG` may set the filter.
fn setup_logging(verbose: u8, quiet: bool) {
    let from_env = || {
        std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
    };

    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => from_env().unwrap_or_else(|| EnvFilter::new("scrapedeck=info,warn")),
            1 => EnvFilter::new("scrapedeck=debug,tower_http=debug,info"),
            2 => EnvFilter::new("scrapedeck=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
