use crate::domain::model::{
    AggregateComponent, BucketMove, Buckets, Component, ComponentStatus, Project, ProjectSummary,
};
use crate::domain::ports::{ComponentApi, ConfigProvider};
use crate::domain::session::UserCheck;
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// `ComponentApi` over the dashboard's REST endpoints.
pub struct HttpComponentApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(Serialize)]
struct StatusUpdate<'a> {
    status: ComponentStatus,
    username: &'a str,
}

#[derive(Serialize)]
struct AggregateUpdate<'a> {
    #[serde(flatten)]
    movement: BucketMove,
    statuses: &'a Buckets,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    username: &'a str,
}

impl HttpComponentApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let invalid = |reason: String| DashboardError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(format!("Invalid URL format: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.api_base_url(),
            config.api_token().map(str::to_string),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    /// Base URL extended by `segments`, each percent-encoded as a single
    /// path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        tracing::debug!("API response status for {}: {}", resource, response.status());

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(DashboardError::NotFound {
                resource: resource.to_string(),
            }),
            status => Err(DashboardError::ApiStatusError {
                status: status.as_u16(),
                url: response.url().to_string(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], resource: &str) -> Result<T> {
        let url = self.url(segments);
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(url), resource).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ComponentApi for HttpComponentApi {
    async fn fetch_component(&self, id: &str) -> Result<Component> {
        self.get_json(&["components", id], &format!("component {}", id))
            .await
    }

    async fn update_component_status(
        &self,
        id: &str,
        status: ComponentStatus,
        username: &str,
    ) -> Result<()> {
        let url = self.url(&["components", id, "status"]);
        tracing::debug!("PUT {} -> {}", url, status);
        let request = self
            .client
            .put(url)
            .json(&StatusUpdate { status, username });
        self.send(request, &format!("component {}", id)).await?;
        Ok(())
    }

    async fn fetch_aggregate(&self, id: &str) -> Result<AggregateComponent> {
        self.get_json(&["other-components", id], &format!("other component {}", id))
            .await
    }

    async fn update_aggregate_status(
        &self,
        id: &str,
        movement: BucketMove,
        statuses: &Buckets,
    ) -> Result<()> {
        let url = self.url(&["other-components", id, "status"]);
        tracing::debug!(
            "PUT {} ({} x {} -> {})",
            url,
            movement.quantity,
            movement.from_status,
            movement.to_status
        );
        let request = self
            .client
            .put(url)
            .json(&AggregateUpdate { movement, statuses });
        self.send(request, &format!("other component {}", id)).await?;
        Ok(())
    }

    async fn fetch_project(&self, id: &str) -> Result<Project> {
        self.get_json(&["projects", id], &format!("project {}", id))
            .await
    }

    async fn fetch_projects(&self) -> Result<Vec<ProjectSummary>> {
        self.get_json(&["projects"], "project list").await
    }

    async fn fetch_user_projects(&self, username: &str) -> Result<Vec<ProjectSummary>> {
        self.get_json(
            &["users", username, "projects"],
            &format!("projects of {}", username),
        )
        .await
    }

    async fn verify_user(&self, username: &str) -> Result<UserCheck> {
        let url = self.url(&["users", "verify"]);
        let request = self.client.post(url).json(&VerifyRequest { username });
        let response = self.send(request, &format!("user {}", username)).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpComponentApi {
        HttpComponentApi::new(base, None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_ids_stay_inside_their_path_segment() {
        let api = api("https://pcs.example.com/api/");
        assert_eq!(
            api.url(&["components", "17/status", "status"]).as_str(),
            "https://pcs.example.com/api/components/17%2Fstatus/status"
        );
        assert_eq!(
            api.url(&["other-components", "B 7"]).as_str(),
            "https://pcs.example.com/api/other-components/B%207"
        );
    }

    #[test]
    fn test_base_without_path() {
        assert_eq!(
            api("http://localhost:3000").url(&["projects"]).as_str(),
            "http://localhost:3000/projects"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        for base in ["not a url", "mailto:ops@example.com"] {
            assert!(matches!(
                HttpComponentApi::new(base, None, Duration::from_secs(5)),
                Err(DashboardError::InvalidConfigValueError { .. })
            ));
        }
    }
}
