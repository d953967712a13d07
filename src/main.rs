use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use cover_finder::config::{
    default_config_path, find_config_file, get_config, load_config, Config, ENV_PREFIX,
    LOCAL_CONFIG_FILE,
};
use cover_finder::lookup::{resolve_thumbnails, LookupError, ThumbnailResolver};
use cover_finder::mcp::McpServer;
use cover_finder::models::{Candidate, LookupRequest};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Cover Finder - Resolve book cover thumbnails by title, ISBN, or product link
#[derive(Parser, Debug)]
#[command(name = "cover-finder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve book cover thumbnails by title, ISBN, or product link", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides the configuration)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up cover thumbnails
    #[command(alias = "l")]
    Lookup {
        /// Book title
        title: Option<String>,

        /// ISBN-10 or ISBN-13 (takes precedence over the title)
        #[arg(long, short)]
        isbn: Option<String>,

        /// Product detail link (takes precedence over ISBN and title)
        #[arg(long, short)]
        url: Option<String>,

        /// Maximum number of candidates for a title search
        #[arg(long, short = 'n')]
        max_results: Option<usize>,

        /// Reorder title results by similarity to the title
        #[arg(long)]
        rank: bool,

        /// Print only the best thumbnail URL
        #[arg(long, short)]
        single: bool,
    },

    /// Run the MCP server (for desktop MCP clients)
    Serve {
        /// Run in stdio mode (for MCP clients)
        #[arg(long, default_value_t = true)]
        stdio: bool,

        /// Run in streamable HTTP mode (overrides --stdio)
        #[arg(long)]
        http: bool,

        /// Port for HTTP mode (defaults to the configured port)
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to for HTTP mode (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the effective catalog, retry, and extraction settings
    Info,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a configuration file with every default spelled out
    Init {
        /// Target path (defaults to the user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

fn print_env_vars() {
    println!("Cover Finder - Environment Variables");
    println!();
    println!("Every configuration key can be overridden with {}_<SECTION>__<KEY>:", ENV_PREFIX);
    println!();
    println!("Catalog:");
    println!("  {}_CATALOG__BASE_URL              Catalog host (default: https://www.amazon.co.jp)", ENV_PREFIX);
    println!("  {}_CATALOG__CATEGORY              Search index (default: stripbooks)", ENV_PREFIX);
    println!("  {}_CATALOG__NODE                  Browse node refinement (default: n:465392)", ENV_PREFIX);
    println!();
    println!("HTTP:");
    println!("  {}_HTTP__USER_AGENT               Browser user agent", ENV_PREFIX);
    println!("  {}_HTTP__ACCEPT_LANGUAGE          Accept-Language header", ENV_PREFIX);
    println!("  {}_HTTP__TIMEOUT_SECS             Search request timeout (default: 30)", ENV_PREFIX);
    println!("  {}_HTTP__PRODUCT_TIMEOUT_SECS     Product page timeout (default: 30)", ENV_PREFIX);
    println!();
    println!("Retry:");
    println!("  {}_RETRY__MAX_ATTEMPTS            Attempts on 503 (default: 3)", ENV_PREFIX);
    println!("  {}_RETRY__BASE_DELAY_SECS         First backoff delay, doubled per attempt (default: 5)", ENV_PREFIX);
    println!();
    println!("Extraction:");
    println!("  {}_EXTRACTION__MODE               structured or regex (default: structured)", ENV_PREFIX);
    println!("  {}_EXTRACTION__OVERFETCH_FACTOR   Raw candidates per requested result (default: 3)", ENV_PREFIX);
    println!();
    println!("Server:");
    println!("  {}_SERVER__HOST                   HTTP bind host (default: 127.0.0.1)", ENV_PREFIX);
    println!("  {}_SERVER__PORT                   HTTP bind port (default: 3000)", ENV_PREFIX);
    println!();
    println!("Proxy:");
    println!("  HTTP_PROXY / HTTPS_PROXY / NO_PROXY  Standard proxy settings");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    // stdout carries MCP traffic and results, logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("cover_finder={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        get_config()?
    };

    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
        config.http.product_timeout_secs = timeout;
    }

    match cli.command {
        Some(Commands::Lookup {
            title,
            isbn,
            url,
            max_results,
            rank,
            single,
        }) => {
            let request = LookupRequest {
                title,
                isbn,
                url,
                max_results,
                rank,
            };
            let resolver = ThumbnailResolver::from_config(&config)?;

            if single {
                let query = request
                    .query()
                    .ok_or_else(|| anyhow!("one of TITLE, --isbn or --url is required"))?;

                match resolver.thumbnail(&query).await? {
                    Some(thumbnail) => println!("{}", thumbnail),
                    None => not_found(cli.quiet),
                }
            } else {
                match resolve_thumbnails(&resolver, request).await {
                    Ok(response) => output_candidates(&response.candidates, cli.output)?,
                    Err(LookupError::NotFound) => not_found(cli.quiet),
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Some(Commands::Serve {
            stdio,
            http,
            port,
            host,
        }) => {
            let resolver = Arc::new(ThumbnailResolver::from_config(&config)?);
            let server = McpServer::new(resolver)?;

            // Use HTTP mode if --http flag is provided, otherwise use --stdio flag
            let use_http = http || !stdio;

            if use_http {
                let addr = format!(
                    "{}:{}",
                    host.unwrap_or(config.server.host),
                    port.unwrap_or(config.server.port)
                );
                let (bound_addr, handle) = server.run_http(&addr).await?;
                tracing::info!("MCP server listening on {}", bound_addr);

                handle
                    .await
                    .map_err(|e| anyhow!("Server task failed: {}", e))?;
            } else {
                server.run().await?;
            }
        }

        Some(Commands::Info) => output_info(&config, cli.output)?,

        Some(Commands::Config {
            command: ConfigCommands::Init { path, force },
        }) => {
            let path = path
                .or_else(default_config_path)
                .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));

            if path.exists() && !force {
                return Err(anyhow!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ));
            }

            Config::default().save(&path)?;
            if !cli.quiet {
                println!("Wrote {}", path.display());
            }
        }

        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn not_found(quiet: bool) -> ! {
    if !quiet {
        eprintln!("No thumbnail found");
    }
    std::process::exit(1);
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format != OutputFormat::Auto {
        return format;
    }
    if std::io::stdout().is_terminal() {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    }
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn output_candidates(candidates: &[Candidate], format: OutputFormat) -> Result<()> {
    match resolve_format(format) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "candidates": candidates }))?
            );
        }
        OutputFormat::Plain => {
            for candidate in candidates {
                println!("{} ({})", candidate.title, candidate.identifier);
                println!("  URL: {}", candidate.link);
                if let Some(ref thumbnail) = candidate.thumbnail_url {
                    println!("  Thumbnail: {}", thumbnail);
                }
                println!();
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Title", "Identifier", "Thumbnail"]);

            for candidate in candidates {
                table.add_row(vec![
                    Cell::new(shorten(&candidate.title, 50)).add_attribute(Attribute::Bold),
                    Cell::new(&candidate.identifier),
                    Cell::new(candidate.thumbnail_url.as_deref().unwrap_or("-")),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn output_info(config: &Config, format: OutputFormat) -> Result<()> {
    match resolve_format(format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Plain => print!("{}", toml::to_string_pretty(config)?),
        OutputFormat::Table | OutputFormat::Auto => {
            use comfy_table::Table;
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Setting", "Value"]);

            let rows = [
                ("Search URL", config.catalog.search_url()),
                ("Category", config.catalog.category.clone()),
                ("Node", config.catalog.node.clone()),
                ("Search timeout", format!("{}s", config.http.timeout_secs)),
                (
                    "Product page timeout",
                    format!("{}s", config.http.product_timeout_secs),
                ),
                ("Max attempts", config.retry.max_attempts.to_string()),
                ("Base delay", format!("{}s", config.retry.base_delay_secs)),
                ("Extraction mode", config.extraction.mode.to_string()),
                (
                    "Overfetch factor",
                    config.extraction.overfetch_factor.to_string(),
                ),
                (
                    "Server",
                    format!("{}:{}", config.server.host, config.server.port),
                ),
            ];
            for (name, value) in rows {
                table.add_row(vec![name.to_string(), value]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["cover-finder"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert_eq!(cli.output, OutputFormat::Auto);
        assert!(cli.timeout.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["cover-finder", "-vv"]);
        assert_eq!(cli.verbose, 2);

        let cli = Cli::parse_from(["cover-finder", "--verbose"]);
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_output_and_timeout() {
        let cli = Cli::parse_from(["cover-finder", "-o", "json", "--timeout", "60"]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.timeout, Some(60));
    }

    #[test]
    fn test_cli_lookup_title() {
        let cli = Cli::parse_from([
            "cover-finder",
            "lookup",
            "リーダブルコード",
            "-n",
            "3",
            "--rank",
        ]);
        match cli.command {
            Some(Commands::Lookup {
                title,
                isbn,
                max_results,
                rank,
                single,
                ..
            }) => {
                assert_eq!(title.as_deref(), Some("リーダブルコード"));
                assert!(isbn.is_none());
                assert_eq!(max_results, Some(3));
                assert!(rank);
                assert!(!single);
            }
            _ => panic!("Expected Lookup command"),
        }
    }

    #[test]
    fn test_cli_lookup_isbn_single() {
        let cli = Cli::parse_from([
            "cover-finder",
            "lookup",
            "--isbn",
            "978-4798161916",
            "--single",
        ]);
        match cli.command {
            Some(Commands::Lookup {
                title, isbn, single, ..
            }) => {
                assert!(title.is_none());
                assert_eq!(isbn.as_deref(), Some("978-4798161916"));
                assert!(single);
            }
            _ => panic!("Expected Lookup command"),
        }
    }

    #[test]
    fn test_cli_serve_command() {
        let cli = Cli::parse_from(["cover-finder", "serve"]);
        match &cli.command {
            Some(Commands::Serve {
                stdio,
                http,
                port,
                host,
            }) => {
                assert!(*stdio);
                assert!(!*http);
                assert!(port.is_none());
                assert!(host.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_serve_http_mode() {
        let cli = Cli::parse_from(["cover-finder", "serve", "--http", "--port", "8080"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Serve {
                http: true,
                port: Some(8080),
                ..
            })
        ));
    }

    #[test]
    fn test_cli_config_init() {
        let cli = Cli::parse_from(["cover-finder", "config", "init", "/tmp/cf.toml", "--force"]);
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Init { path, force },
            }) => {
                assert_eq!(path, Some(PathBuf::from("/tmp/cf.toml")));
                assert!(force);
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_shorten_counts_characters() {
        assert_eq!(shorten("短いタイトル", 50), "短いタイトル");
        assert_eq!(shorten(&"長".repeat(60), 10), format!("{}...", "長".repeat(7)));
    }
}
