use crate::domain::model::{BucketStatus, ComponentStatus};
use thiserror::Error;

/// Refusals produced by the status rules. Nothing is mutated when one of
/// these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: String },

    #[error("Insufficient quantity in {status}: requested {requested}, available {available}")]
    InsufficientQuantity {
        status: BucketStatus,
        requested: u64,
        available: u64,
    },

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: BucketStatus, to: BucketStatus },

    #[error("Unauthorized: only an elevated actor can advance a component at {status}")]
    Unauthorized { status: ComponentStatus },

    #[error("No next status after {status}")]
    NoNextStatus { status: ComponentStatus },

    #[error("Component is already rejected")]
    AlreadyRejected,

    #[error("Count in {status} would overflow")]
    CountOverflow { status: BucketStatus },
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status} for {url}")]
    ApiStatusError { status: u16, url: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("User '{username}' could not be verified")]
    UserNotVerified { username: String },

    #[error("Project {project} is not assigned to '{username}'")]
    ProjectNotAssigned { project: String, username: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Rule,
    Network,
    Auth,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::Transition(TransitionError::Unauthorized { .. }) => ErrorCategory::Auth,
            DashboardError::Transition(_) => ErrorCategory::Rule,
            DashboardError::ApiError(_) | DashboardError::ApiStatusError { .. } => {
                ErrorCategory::Network
            }
            DashboardError::UserNotVerified { .. } | DashboardError::ProjectNotAssigned { .. } => {
                ErrorCategory::Auth
            }
            DashboardError::NotFound { .. }
            | DashboardError::CsvError(_)
            | DashboardError::SerializationError(_) => ErrorCategory::Data,
            DashboardError::ConfigError { .. }
            | DashboardError::MissingConfigError { .. }
            | DashboardError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            DashboardError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Rule => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Auth | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashboardError::Transition(TransitionError::InvalidQuantity { quantity }) => {
                format!("'{}' is not a valid quantity", quantity)
            }
            DashboardError::Transition(TransitionError::InsufficientQuantity {
                status,
                requested,
                available,
            }) => format!(
                "Only {} units are {}, cannot move {}",
                available, status, requested
            ),
            DashboardError::Transition(TransitionError::InvalidTransition { from, to }) => {
                format!("Units cannot move from {} to {}", from, to)
            }
            DashboardError::Transition(TransitionError::Unauthorized { .. }) => {
                "You can only accept components that have been transported".to_string()
            }
            DashboardError::Transition(TransitionError::NoNextStatus { status }) => {
                format!("Component is {} and cannot be advanced", status)
            }
            DashboardError::Transition(TransitionError::AlreadyRejected) => {
                "Component has already been rejected".to_string()
            }
            DashboardError::ApiError(_) | DashboardError::ApiStatusError { .. } => {
                "Could not reach the dashboard API".to_string()
            }
            DashboardError::NotFound { resource } => format!("{} was not found", resource),
            DashboardError::UserNotVerified { username } => {
                format!("User '{}' is not a valid user", username)
            }
            DashboardError::ProjectNotAssigned { project, .. } => {
                format!("You are not assigned to project {}", project)
            }
            DashboardError::ConfigError { .. }
            | DashboardError::MissingConfigError { .. }
            | DashboardError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Rule => "Refresh the component and pick a transition allowed from its current status",
            ErrorCategory::Network => "Check the API URL and your network connection, then retry",
            ErrorCategory::Auth => "Verify the username, or ask an administrator to perform this step",
            ErrorCategory::Data => "Check the identifier and the data returned by the API",
            ErrorCategory::Configuration => "Fix the flag or the config file value and run again",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
