use clap::Parser;
use std::path::PathBuf;

/// JSON Form - renders, validates and stores forms described by a JSON schema
#[derive(Parser, Debug, Clone)]
#[command(name = "jsonform", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "JSONFORM_CONFIG", default_value = "jsonform.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "JSONFORM_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "JSONFORM_PORT")]
    pub port: Option<u16>,

    /// Path to the form schema (JSON object of field definitions)
    #[arg(long, env = "JSONFORM_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Path to the submission history file
    #[arg(long, env = "JSONFORM_HISTORY")]
    pub history: Option<PathBuf>,
}
