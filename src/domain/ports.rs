use crate::domain::model::{
    AggregateComponent, BucketMove, Buckets, Component, ComponentStatus, Project, ProjectSummary,
};
use crate::domain::session::UserCheck;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote dashboard API. Fetches snapshots and persists transitions the
/// core has already validated.
#[async_trait]
pub trait ComponentApi: Send + Sync {
    async fn fetch_component(&self, id: &str) -> Result<Component>;
    async fn update_component_status(
        &self,
        id: &str,
        status: ComponentStatus,
        username: &str,
    ) -> Result<()>;
    async fn fetch_aggregate(&self, id: &str) -> Result<AggregateComponent>;
    async fn update_aggregate_status(
        &self,
        id: &str,
        movement: BucketMove,
        statuses: &Buckets,
    ) -> Result<()>;
    async fn fetch_project(&self, id: &str) -> Result<Project>;
    async fn fetch_projects(&self) -> Result<Vec<ProjectSummary>>;
    /// Projects a user is assigned to.
    async fn fetch_user_projects(&self, username: &str) -> Result<Vec<ProjectSummary>>;
    async fn verify_user(&self, username: &str) -> Result<UserCheck>;
}

pub trait ReportStorage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn username(&self) -> Option<&str>;
    fn qr_link_base(&self) -> &str;
    fn output_path(&self) -> &str;
}
