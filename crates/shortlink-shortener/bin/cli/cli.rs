use clap::{Parser, Subcommand, ValueEnum};
use shortlink_core::DeletePolicy;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATABASE_ENV: &str = "SHORTLINK_DATABASE";
pub const CODE_LENGTH_ENV: &str = "SHORTLINK_CODE_LENGTH";
pub const MAX_ATTEMPTS_ENV: &str = "SHORTLINK_MAX_ATTEMPTS";
pub const GENERATOR_ENV: &str = "SHORTLINK_GENERATOR";
pub const DELETE_POLICY_ENV: &str = "SHORTLINK_DELETE_POLICY";
pub const BASE_URL_ENV: &str = "SHORTLINK_BASE_URL";
pub const LOG_FORMAT_ENV: &str = "SHORTLINK_LOG_FORMAT";

pub const DEFAULT_DATABASE: &str = "shortlink.db";
pub const DEFAULT_CODE_LENGTH: &str = "6";
pub const DEFAULT_MAX_ATTEMPTS: &str = "8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeneratorArg {
    #[value(name = "random")]
    Random,
    #[value(name = "seq")]
    Seq,
}

impl Display for GeneratorArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorArg::Random => write!(f, "random"),
            GeneratorArg::Seq => write!(f, "seq"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeletePolicyArg {
    #[value(name = "tombstone")]
    Tombstone,
    #[value(name = "release")]
    Release,
}

impl Display for DeletePolicyArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletePolicyArg::Tombstone => write!(f, "tombstone"),
            DeletePolicyArg::Release => write!(f, "release"),
        }
    }
}

impl From<DeletePolicyArg> for DeletePolicy {
    fn from(value: DeletePolicyArg) -> Self {
        match value {
            DeletePolicyArg::Tombstone => DeletePolicy::Tombstone,
            DeletePolicyArg::Release => DeletePolicy::Release,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shorten a URL and print the new link as JSON.
    Create { url: String },
    /// Print the target URL of a short code.
    Resolve { code: String },
    /// Delete a short link.
    Delete { code: String },
}

#[derive(Debug, Parser)]
#[command(name = "shortlink", about = "Create and resolve short links")]
pub struct CLI {
    /// SQLite database file, created if missing.
    #[arg(long, env = DATABASE_ENV, default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Symbols per random code.
    #[arg(long, env = CODE_LENGTH_ENV, default_value = DEFAULT_CODE_LENGTH)]
    pub code_length: usize,

    /// Candidate codes tried per create before giving up.
    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value = DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    /// Lengthen random codes by one symbol every N consecutive collisions.
    #[arg(long)]
    pub grow_every: Option<u32>,

    #[arg(
        long,
        env = GENERATOR_ENV,
        value_enum,
        default_value_t = GeneratorArg::Random
    )]
    pub generator: GeneratorArg,

    /// Counter start for the seq generator.
    #[arg(long, default_value_t = 0)]
    pub seq_offset: u64,

    #[arg(
        long,
        env = DELETE_POLICY_ENV,
        value_enum,
        default_value_t = DeletePolicyArg::Tombstone
    )]
    pub delete_policy: DeletePolicyArg,

    /// Public base URL used to print full short URLs.
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}
