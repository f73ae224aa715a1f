//! Project client methods

use super::{ClientError, ScmClient};
use crate::types::{NewProject, Project, ProjectDeactivation};
use reqwest::Method;

impl ScmClient {
    /// Every project, active or not
    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        let request = self.request(Method::GET, "/api/projects/management");
        Ok(self.execute::<Option<Vec<Project>>>(request).await?.unwrap_or_default())
    }

    /// Add a project; the name is trimmed and must not be blank
    pub async fn create_project(&self, name: &str) -> Result<(), ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::BadRequest("project name is required".into()));
        }

        let request = self.request(Method::POST, "/api/projects").json(&NewProject { name });
        self.execute_empty(request).await
    }

    /// Deactivate a project, returning the updated record when the backend sends one
    pub async fn deactivate_project(&self, id: i64) -> Result<Option<Project>, ClientError> {
        let request = self.request(Method::PATCH, &format!("/api/projects/{id}/deactivate"));
        let body: Option<ProjectDeactivation> = self.execute(request).await?;
        Ok(body.and_then(|b| b.project))
    }
}
