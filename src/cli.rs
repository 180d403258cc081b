use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Root folder containing browser profiles (e.g. user data directories)
    #[arg(short, long)]
    pub root: PathBuf,

    /// Output directory for extracted records and the run summary
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Optional path to config file (YAML)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Identifier stamped onto every record (overrides config)
    #[arg(long)]
    pub user_profile: Option<String>,

    /// Worker threads per artefact category (overrides config)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Busy timeout for locked databases, in milliseconds (overrides config)
    #[arg(long)]
    pub open_timeout_ms: Option<u64>,

    /// Time budget for reading one database, in milliseconds, 0 for none (overrides config)
    #[arg(long)]
    pub query_timeout_ms: Option<u64>,

    /// Do not follow symbolic links while scanning
    #[arg(long)]
    pub no_follow_symlinks: bool,

    /// Stop starting new files after this many seconds
    #[arg(long)]
    pub max_runtime_secs: Option<u64>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
