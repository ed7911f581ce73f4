//! QR payloads printed on component labels and read back by the scanner.

use crate::domain::model::{Component, Project, Section};
use crate::utils::error::{DashboardError, Result};
use percent_encoding::percent_decode_str;
use url::Url;

const CARD_PATH: &str = "forms/form-component-card";

/// Deep link to a component's status card.
pub fn component_link(base: &str, component_id: &str) -> Result<String> {
    let mut url = Url::parse(base).map_err(|e| DashboardError::InvalidConfigValueError {
        field: "qr.link_base".to_string(),
        value: base.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    url.path_segments_mut()
        .map_err(|_| DashboardError::InvalidConfigValueError {
            field: "qr.link_base".to_string(),
            value: base.to_string(),
            reason: "URL cannot carry a path".to_string(),
        })?
        .pop_if_empty()
        .extend(CARD_PATH.split('/'))
        .push(component_id);

    Ok(url.to_string())
}

/// Component id carried by a scanned payload. Accepts a full card link or a
/// bare id.
pub fn parse_component_link(payload: &str) -> Option<String> {
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    let url = match Url::parse(payload) {
        Ok(url) => url,
        Err(_) if !payload.contains('/') && !payload.contains(char::is_whitespace) => {
            return Some(payload.to_string());
        }
        Err(_) => return None,
    };

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let card: Vec<&str> = CARD_PATH.split('/').collect();
    match segments.as_slice() {
        [.., a, b, id] if [*a, *b] == card[..] => percent_decode_str(id)
            .decode_utf8()
            .ok()
            .map(|id| id.into_owned()),
        _ => None,
    }
}

/// Text printed under the code.
pub fn label_lines(project: &Project, section: Option<&Section>, component: &Component) -> Vec<String> {
    vec![
        format!("Project: {}", project.name),
        format!("Section: {}", section.map(|s| s.name.as_str()).unwrap_or("-")),
        format!("Component: {}", component.name),
    ]
}
