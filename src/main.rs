//! headersec - HTTP security header scanner CLI

use clap::{ArgAction, Parser};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;

use headersec::config::{self, CliOverrides};
use headersec::error::Result;
use headersec::http::HttpClient;
use headersec::models::{OutputMode, ScanConfig};
use headersec::scanner::{HttpProber, ScanEngine, ScanSummary};

/// Checks HTTP response headers for recommended, information-leaking, and deprecated headers
#[derive(Parser)]
#[command(name = "headersec", version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// URL to check
    #[arg(short, long, help_heading = "Target selection")]
    url: Option<String>,

    /// Text file with one URL per line
    #[arg(long, help_heading = "Target selection")]
    url_file: Option<PathBuf>,

    /// Override port
    #[arg(short, long, help_heading = "Target selection")]
    port: Option<u16>,

    /// Proxy URL, e.g. http://127.0.0.1:8080
    #[arg(long, help_heading = "Target selection")]
    proxy: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, help_heading = "Target selection")]
    insecure: bool,

    /// HTTP method to use [default: HEAD]
    #[arg(short, long, help_heading = "Request customization")]
    method: Option<String>,

    /// Cookie in the format k=v
    #[arg(long, help_heading = "Request customization")]
    cookie: Option<String>,

    /// Custom User-Agent string
    #[arg(long, help_heading = "Request customization")]
    user_agent: Option<String>,

    /// Extra headers, format: 'K: V;K2: V2'
    #[arg(short = 'H', long = "header", help_heading = "Request customization")]
    header: Vec<String>,

    /// Follow HTTP redirects [default: true]
    #[arg(long, action = ArgAction::Set, help_heading = "Redirect and timeout")]
    follow_redirects: Option<bool>,

    /// Maximum number of redirects to follow [default: 10]
    #[arg(long, help_heading = "Redirect and timeout")]
    max_redirects: Option<usize>,

    /// Request timeout in seconds [default: 10]
    #[arg(short, long, help_heading = "Redirect and timeout")]
    timeout: Option<u64>,

    /// Number of concurrent workers [default: 20]
    #[arg(long, help_heading = "Scan behavior")]
    concurrency: Option<usize>,

    /// Include only recommended headers check
    #[arg(long, help_heading = "Scan behavior")]
    rec: bool,

    /// Include only info-leaking headers check
    #[arg(long, help_heading = "Scan behavior")]
    leak: bool,

    /// Include only deprecated headers check
    #[arg(long, help_heading = "Scan behavior")]
    depr: bool,

    /// Print only the status of recommended headers, without the recommended values
    #[arg(long, visible_alias = "no-recommended", help_heading = "Scan behavior")]
    no_raccomanded: bool,

    /// Output JSON file ('-' for stdout)
    #[arg(long, value_name = "PATH", help_heading = "Output")]
    json: Option<String>,

    /// Write one JSON file per target instead of a single array
    #[arg(long, requires = "json", help_heading = "Output")]
    json_split: bool,

    /// Don't print the ASCII banner at start-up
    #[arg(long, help_heading = "Output")]
    no_banner: bool,

    /// Disable ANSI colours in output
    #[arg(long, help_heading = "Output")]
    no_color: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for CliOverrides {
    fn from(cli: Cli) -> Self {
        Self {
            url: cli.url,
            url_file: cli.url_file,
            port: cli.port,
            proxy: cli.proxy,
            insecure: cli.insecure,
            method: cli.method,
            cookie: cli.cookie,
            user_agent: cli.user_agent,
            headers: cli.header,
            follow_redirects: cli.follow_redirects,
            max_redirects: cli.max_redirects,
            timeout_secs: cli.timeout,
            concurrency: cli.concurrency,
            rec: cli.rec,
            leak: cli.leak,
            depr: cli.depr,
            no_recommended: cli.no_raccomanded,
            json: cli.json,
            json_split: cli.json_split,
            no_banner: cli.no_banner,
            no_color: cli.no_color,
            verbose: cli.verbose,
        }
    }
}

const BANNER: &str = r#"
  _   _                _           ____
 | | | | ___  __ _  __| | ___ _ __/ ___|  ___  ___
 | |_| |/ _ \/ _` |/ _` |/ _ \ '__\___ \ / _ \/ __|
 |  _  |  __/ (_| | (_| |  __/ |   ___) |  __/ (__
 |_| |_|\___|\__,_|\__,_|\___|_|  |____/ \___|\___|
"#;

fn print_banner() {
    println!("{}", BANNER.cyan());
    println!("  v{}\n", env!("CARGO_PKG_VERSION"));
}

fn init_logging(verbose: bool, color: bool) {
    let filter = if verbose {
        "headersec=debug"
    } else {
        "headersec=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(summary: &ScanSummary, requests: u64) {
    let mut builder = Builder::default();
    builder.push_record(["Targets", "Scanned", "Failed", "Missing", "Different", "Requests"]);
    builder.push_record([
        summary.targets.to_string(),
        summary.scanned.to_string(),
        summary.failed.to_string(),
        summary.missing.to_string(),
        summary.different.to_string(),
        requests.to_string(),
    ]);

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", "  Scan Summary".bold());
    println!("{table}");
}

async fn run(cli: Cli) -> Result<()> {
    let no_color = cli.no_color;
    let mut scan_config = match cli.config {
        Some(ref path) => config::load_config(path)?,
        None => ScanConfig::default(),
    };
    config::merge_cli_args(&mut scan_config, CliOverrides::from(cli))?;

    if scan_config.banner {
        print_banner();
    }
    init_logging(scan_config.verbose, !no_color);

    let client = HttpClient::from_config(&scan_config.transport)?;
    let prober = Arc::new(HttpProber::new(client));
    let engine = ScanEngine::new(prober.clone(), scan_config.concurrency);

    let request = Arc::new(scan_config.request);
    let summary = engine.run(Arc::clone(&request), &scan_config.targets).await;

    if matches!(request.output, OutputMode::Console { .. }) {
        print_summary(&summary, prober.request_count());
    }
    if !request.output.writes_json_to_stdout() {
        println!("{}", "Done.".green());
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}
