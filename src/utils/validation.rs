use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DashboardError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> DashboardError {
    DashboardError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Only http(s) endpoints are reachable by the API client and the scanner.
fn check_http_url(field: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, raw, format!("Unsupported URL scheme: {}", scheme))),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| DashboardError::MissingConfigError {
        field: field_name.to_string(),
    })
}

/// Checks shared by every config source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    check_http_url("api.base_url", config.api_base_url())?;
    check_http_url("qr.link_base", config.qr_link_base())?;

    let output_path = config.output_path();
    if output_path.trim().is_empty() || output_path.contains('\0') {
        return Err(invalid("report.output_path", output_path, "Not a usable directory path"));
    }

    if config.timeout_seconds() == 0 {
        return Err(invalid("api.timeout_seconds", 0, "Timeout must be at least 1 second"));
    }

    if let Some(username) = config.username() {
        if username.trim().is_empty() {
            return Err(invalid("session.username", username, "Username cannot be blank"));
        }
    }

    Ok(())
}
