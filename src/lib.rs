pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::{storage::LocalStorage, toml_config::TomlConfig};

pub use adapters::http::HttpComponentApi;
pub use core::service::StatusService;
pub use domain::model::{
    AggregateComponent, BucketMove, BucketStatus, Buckets, Component, ComponentStatus, Project,
    ProjectSummary, Section, StatusEntry,
};
pub use domain::session::{Actor, Role, Session};
pub use utils::error::{DashboardError, Result, TransitionError};
