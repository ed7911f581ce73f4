use crate::core::{ledger, lifecycle, stats};
use crate::domain::model::{
    AggregateComponent, BucketMove, BucketStatus, Component, ComponentStatus, Project, ProjectSummary,
};
use crate::domain::ports::{ComponentApi, ReportStorage};
use crate::domain::session::{Role, Session};
use crate::adapters::report;
use crate::utils::error::{DashboardError, Result};

/// Fetch a snapshot, run it through the status rules, persist the result.
///
/// The rules themselves are pure; this is the only place that talks to the
/// API. Concurrent updates to the same component are not detected here.
pub struct StatusService<A: ComponentApi> {
    api: A,
}

impl<A: ComponentApi> StatusService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn verify_user(&self, username: &str) -> Result<Session> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DashboardError::UserNotVerified {
                username: username.to_string(),
            });
        }

        let check = self.api.verify_user(username).await?;
        if !check.is_valid {
            tracing::warn!("Username check failed for '{}'", username);
            return Err(DashboardError::UserNotVerified {
                username: username.to_string(),
            });
        }

        let role = Role::parse(check.role.as_deref().unwrap_or_default());
        tracing::debug!("Verified '{}' as {:?}", username, role);
        Ok(Session::verified(username, role))
    }

    pub async fn advance(&self, id: &str, session: &Session) -> Result<Component> {
        let current = self.api.fetch_component(id).await?;
        let updated = lifecycle::advance(&current, session.actor()).inspect_err(|e| {
            tracing::warn!("Advance of component {} refused: {}", id, e);
        })?;

        self.api
            .update_component_status(id, updated.status, session.username())
            .await?;
        tracing::info!(
            "Component {} moved {} -> {} by {}",
            id,
            current.status,
            updated.status,
            session.username()
        );
        Ok(updated)
    }

    pub async fn reject(&self, id: &str, session: &Session) -> Result<Component> {
        let current = self.api.fetch_component(id).await?;
        let updated = lifecycle::reject(&current).inspect_err(|e| {
            tracing::warn!("Reject of component {} refused: {}", id, e);
        })?;

        self.api
            .update_component_status(id, ComponentStatus::Rejected, session.username())
            .await?;
        tracing::info!(
            "Component {} rejected (was {}) by {}",
            id,
            current.status,
            session.username()
        );
        Ok(updated)
    }

    pub async fn move_quantity(
        &self,
        id: &str,
        from: BucketStatus,
        to: BucketStatus,
        quantity: i64,
    ) -> Result<AggregateComponent> {
        let current = self.api.fetch_aggregate(id).await?;
        let statuses = ledger::move_quantity(&current, from, to, quantity).inspect_err(|e| {
            tracing::warn!("Move on aggregate {} refused: {}", id, e);
        })?;

        // move_quantity only succeeds for positive quantities
        let movement = BucketMove {
            from_status: from,
            to_status: to,
            quantity: quantity as u64,
        };
        self.api.update_aggregate_status(id, movement, &statuses).await?;
        tracing::info!("Aggregate {}: moved {} from {} to {}", id, quantity, from, to);

        Ok(AggregateComponent {
            statuses,
            ..current
        })
    }

    /// Projects the session may open. Project-scoped roles get only the
    /// projects they are assigned to.
    pub async fn visible_projects(&self, session: &Session) -> Result<Vec<ProjectSummary>> {
        let mut projects = self.api.fetch_projects().await?;
        if session.role().is_project_scoped() {
            let assigned = self.assigned_project_ids(session).await?;
            projects.retain(|project| assigned.contains(&project.id));
        }
        Ok(projects)
    }

    pub async fn open_project(&self, project_id: &str, session: &Session) -> Result<Project> {
        if session.role().is_project_scoped()
            && !self
                .assigned_project_ids(session)
                .await?
                .iter()
                .any(|id| id == project_id)
        {
            tracing::warn!("'{}' is not assigned to project {}", session.username(), project_id);
            return Err(DashboardError::ProjectNotAssigned {
                project: project_id.to_string(),
                username: session.username().to_string(),
            });
        }
        self.api.fetch_project(project_id).await
    }

    async fn assigned_project_ids(&self, session: &Session) -> Result<Vec<String>> {
        let assigned = self.api.fetch_user_projects(session.username()).await?;
        tracing::debug!("'{}' is assigned to {} projects", session.username(), assigned.len());
        Ok(assigned.into_iter().map(|project| project.id).collect())
    }

    pub async fn project_stats(
        &self,
        project_id: &str,
        session: &Session,
    ) -> Result<Vec<stats::StatusStat<ComponentStatus>>> {
        let project = self.open_project(project_id, session).await?;
        tracing::debug!(
            "Project {} has {} sections, {} components",
            project.id,
            project.sections.len(),
            project.components().count()
        );
        Ok(stats::project_stats(&project))
    }

    pub async fn aggregate_stats(&self, id: &str) -> Result<Vec<stats::StatusStat<BucketStatus>>> {
        let ledger = self.api.fetch_aggregate(id).await?;
        Ok(stats::bucket_stats(&ledger))
    }

    /// Write a project's status breakdown as CSV and return where it landed.
    pub async fn write_project_report<S: ReportStorage>(
        &self,
        project_id: &str,
        session: &Session,
        storage: &S,
    ) -> Result<String> {
        let rows = self.project_stats(project_id, session).await?;
        let data = report::stats_csv(&rows)?;
        let filename = format!("project_{}_status.csv", project_id);

        tracing::debug!("Writing report ({} bytes) to storage", data.len());
        let location = storage.write_file(&filename, &data).await?;
        tracing::info!("Status report for project {} written to {}", project_id, location);
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Buckets;
    use crate::domain::session::UserCheck;
    use crate::utils::error::TransitionError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockApi {
        components: Mutex<HashMap<String, Component>>,
        aggregates: Mutex<HashMap<String, AggregateComponent>>,
        users: HashMap<String, String>,
        projects: Vec<ProjectSummary>,
        assignments: HashMap<String, Vec<String>>,
        status_updates: Mutex<Vec<(String, ComponentStatus, String)>>,
        moves: Mutex<Vec<(String, BucketMove, Buckets)>>,
    }

    impl MockApi {
        fn with_component(self, id: &str, status: ComponentStatus) -> Self {
            self.components.lock().unwrap().insert(
                id.to_string(),
                Component {
                    id: id.to_string(),
                    name: format!("Column {}", id),
                    status,
                    section_id: None,
                    project_id: None,
                    files: vec![],
                    updated_at: Utc::now(),
                    status_history: vec![],
                },
            );
            self
        }

        fn with_user(mut self, username: &str, role: &str) -> Self {
            self.users.insert(username.to_string(), role.to_string());
            self
        }

        fn with_project(mut self, id: &str, assigned_to: &[&str]) -> Self {
            self.projects.push(ProjectSummary {
                id: id.to_string(),
                name: format!("Project {}", id),
                code: None,
            });
            for username in assigned_to {
                self.assignments
                    .entry(username.to_string())
                    .or_default()
                    .push(id.to_string());
            }
            self
        }
    }

    #[async_trait]
    impl ComponentApi for MockApi {
        async fn fetch_component(&self, id: &str) -> Result<Component> {
            self.components
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| DashboardError::NotFound {
                    resource: format!("component {}", id),
                })
        }

        async fn update_component_status(
            &self,
            id: &str,
            status: ComponentStatus,
            username: &str,
        ) -> Result<()> {
            self.status_updates
                .lock()
                .unwrap()
                .push((id.to_string(), status, username.to_string()));
            Ok(())
        }

        async fn fetch_aggregate(&self, id: &str) -> Result<AggregateComponent> {
            self.aggregates
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| DashboardError::NotFound {
                    resource: format!("aggregate {}", id),
                })
        }

        async fn update_aggregate_status(
            &self,
            id: &str,
            movement: BucketMove,
            statuses: &Buckets,
        ) -> Result<()> {
            self.moves
                .lock()
                .unwrap()
                .push((id.to_string(), movement, statuses.clone()));
            Ok(())
        }

        async fn fetch_project(&self, id: &str) -> Result<Project> {
            self.projects
                .iter()
                .find(|project| project.id == id)
                .map(|project| Project {
                    id: project.id.clone(),
                    name: project.name.clone(),
                    code: None,
                    sections: vec![],
                })
                .ok_or_else(|| DashboardError::NotFound {
                    resource: format!("project {}", id),
                })
        }

        async fn fetch_projects(&self) -> Result<Vec<ProjectSummary>> {
            Ok(self.projects.clone())
        }

        async fn fetch_user_projects(&self, username: &str) -> Result<Vec<ProjectSummary>> {
            let assigned = self.assignments.get(username).cloned().unwrap_or_default();
            Ok(self
                .projects
                .iter()
                .filter(|project| assigned.contains(&project.id))
                .cloned()
                .collect())
        }

        async fn verify_user(&self, username: &str) -> Result<UserCheck> {
            Ok(match self.users.get(username) {
                Some(role) => UserCheck {
                    is_valid: true,
                    role: Some(role.clone()),
                },
                None => UserCheck {
                    is_valid: false,
                    role: None,
                },
            })
        }
    }

    #[test]
    fn test_site_user_accepts_transported_component() {
        tokio_test::block_on(async {
            let api = MockApi::default()
                .with_component("5", ComponentStatus::Transported)
                .with_user("narin", "Site User");
            let service = StatusService::new(api);

            let session = service.verify_user("narin").await.unwrap();
            let updated = service.advance("5", &session).await.unwrap();

            assert_eq!(updated.status, ComponentStatus::Accepted);
            let updates = service.api().status_updates.lock().unwrap();
            assert_eq!(
                *updates,
                vec![("5".to_string(), ComponentStatus::Accepted, "narin".to_string())]
            );
        });
    }

    #[test]
    fn test_refused_advance_is_not_persisted() {
        tokio_test::block_on(async {
            let api = MockApi::default()
                .with_component("6", ComponentStatus::Planning)
                .with_user("narin", "Site User");
            let service = StatusService::new(api);

            let session = service.verify_user("narin").await.unwrap();
            let err = service.advance("6", &session).await.unwrap_err();

            assert!(matches!(
                err,
                DashboardError::Transition(TransitionError::Unauthorized { .. })
            ));
            assert!(service.api().status_updates.lock().unwrap().is_empty());
        });
    }

    #[test]
    fn test_unknown_user_is_not_verified() {
        tokio_test::block_on(async {
            let service = StatusService::new(MockApi::default());
            assert!(matches!(
                service.verify_user("ghost").await,
                Err(DashboardError::UserNotVerified { .. })
            ));
            assert!(matches!(
                service.verify_user("   ").await,
                Err(DashboardError::UserNotVerified { .. })
            ));
        });
    }

    #[test]
    fn test_move_quantity_persists_new_buckets() {
        tokio_test::block_on(async {
            let api = MockApi::default();
            api.aggregates.lock().unwrap().insert(
                "9".to_string(),
                AggregateComponent {
                    id: "9".to_string(),
                    name: "Lifting anchor".to_string(),
                    total: 10,
                    statuses: Buckets::new().with(BucketStatus::Planning, 10),
                },
            );
            let service = StatusService::new(api);

            let updated = service
                .move_quantity("9", BucketStatus::Planning, BucketStatus::Manufactured, 4)
                .await
                .unwrap();

            assert_eq!(updated.total, 10);
            assert_eq!(updated.statuses.get(BucketStatus::Planning), 6);
            let moves = service.api().moves.lock().unwrap();
            assert_eq!(moves.len(), 1);
            assert_eq!(moves[0].1.quantity, 4);
            assert_eq!(moves[0].2, updated.statuses);
        });
    }

    #[test]
    fn test_reject_transported_component() {
        tokio_test::block_on(async {
            let api = MockApi::default()
                .with_component("7", ComponentStatus::Transported)
                .with_user("narin", "Site User");
            let service = StatusService::new(api);

            let session = service.verify_user("narin").await.unwrap();
            let rejected = service.reject("7", &session).await.unwrap();

            assert_eq!(rejected.status, ComponentStatus::Rejected);
            assert_eq!(rejected.status_history.len(), 1);
            let updates = service.api().status_updates.lock().unwrap();
            assert_eq!(
                *updates,
                vec![("7".to_string(), ComponentStatus::Rejected, "narin".to_string())]
            );
        });
    }

    #[test]
    fn test_site_user_sees_only_assigned_projects() {
        tokio_test::block_on(async {
            let api = MockApi::default()
                .with_user("narin", "Site User")
                .with_user("somchai", "Admin")
                .with_project("1", &["narin"])
                .with_project("2", &[])
                .with_project("3", &["narin"]);
            let service = StatusService::new(api);

            let site = service.verify_user("narin").await.unwrap();
            let ids: Vec<String> = service
                .visible_projects(&site)
                .await
                .unwrap()
                .into_iter()
                .map(|p| p.id)
                .collect();
            assert_eq!(ids, vec!["1".to_string(), "3".to_string()]);

            let admin = service.verify_user("somchai").await.unwrap();
            assert_eq!(service.visible_projects(&admin).await.unwrap().len(), 3);
        });
    }

    #[test]
    fn test_unassigned_project_is_refused_for_site_user() {
        tokio_test::block_on(async {
            let api = MockApi::default()
                .with_user("narin", "Site User")
                .with_user("somchai", "Admin")
                .with_project("1", &["narin"])
                .with_project("2", &[]);
            let service = StatusService::new(api);

            let site = service.verify_user("narin").await.unwrap();
            assert!(service.open_project("1", &site).await.is_ok());
            assert!(matches!(
                service.project_stats("2", &site).await,
                Err(DashboardError::ProjectNotAssigned { ref project, .. }) if project == "2"
            ));

            let admin = service.verify_user("somchai").await.unwrap();
            let stats = service.project_stats("2", &admin).await.unwrap();
            assert!(stats.iter().all(|s| s.count == 0));
        });
    }
}
