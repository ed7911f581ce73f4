pub mod storage;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::{BucketStatus, ConfigProvider};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "precast-tracker")]
#[command(about = "Track precast components through manufacturing, delivery and installation")]
pub struct CliConfig {
    #[arg(long, env = "PRECAST_API_URL", default_value = "http://localhost:3000/api")]
    pub api_url: String,

    #[arg(long, env = "PRECAST_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username to verify before changing a status
    #[arg(short, long, env = "PRECAST_USERNAME")]
    pub username: Option<String>,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "http://localhost:3000")]
    pub qr_link_base: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// TOML config file; replaces the connection flags above when given
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Advance a component to its next status
    Advance { id: String },
    /// Reject a component
    Reject { id: String },
    /// Show which status changes are currently possible
    Actions { id: String },
    /// Show a component's recorded status changes
    History { id: String },
    /// List the projects the user may open
    Projects,
    /// Move a quantity of an aggregate component between statuses
    Move {
        id: String,
        #[arg(long)]
        from: BucketStatus,
        #[arg(long)]
        to: BucketStatus,
        #[arg(long)]
        quantity: String,
    },
    /// Status breakdown of a project or an aggregate component
    Stats {
        #[arg(long, conflicts_with = "aggregate", required_unless_present = "aggregate")]
        project: Option<String>,
        #[arg(long)]
        aggregate: Option<String>,
    },
    /// Write a project's status breakdown as CSV
    Report { project: String },
    /// Print the QR payload for a component
    Qr {
        id: String,
        /// Also print label text using this project's names
        #[arg(long)]
        project: Option<String>,
    },
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_url
    }

    fn api_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn qr_link_base(&self) -> &str {
        &self.qr_link_base
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_provider(self)
    }
}
