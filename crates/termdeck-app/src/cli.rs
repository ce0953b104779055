use clap::Parser;
use tracing_subscriber::filter::{Directive, LevelFilter};

/// termdeck: up to four shell sessions side by side.
#[derive(Parser, Debug)]
#[command(name = "termdeck", version, about)]
pub struct Args {
    /// Working directory for new terminals.
    #[arg(short = 'd', long)]
    pub directory: Option<String>,

    /// Shell program to run instead of the configured one.
    #[arg(short = 's', long)]
    pub shell: Option<String>,

    /// Terminals to open at startup.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub sessions: usize,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

/// Log directive from `--log-level`, else the configured level for the
/// termdeck crates. An unparsable override falls back to the config, and
/// that to `info`.
pub fn log_directive(override_level: Option<&str>, config_level: &str) -> Directive {
    override_level
        .and_then(|level| level.parse().ok())
        .or_else(|| format!("termdeck={config_level}").parse().ok())
        .unwrap_or_else(|| LevelFilter::INFO.into())
}
