//! Reporting client methods

use super::{ClientError, ScmClient};
use reqwest::Method;
use serde_json::Value as JsonValue;

impl ScmClient {
    /// Dashboard summary figures
    pub async fn dashboard_summary(&self) -> Result<JsonValue, ClientError> {
        let request = self.request(Method::GET, "/api/dashboard/summary");
        self.execute(request).await
    }

    /// Monthly spending per department for `year`
    pub async fn department_spending(&self, year: i32) -> Result<Vec<JsonValue>, ClientError> {
        let request = self
            .request(Method::GET, "/api/dashboard/department-spending")
            .query(&[("year", year)]);
        Ok(self.execute::<Option<Vec<JsonValue>>>(request).await?.unwrap_or_default())
    }

    /// Open request counts per assignee
    pub async fn workload(&self) -> Result<JsonValue, ClientError> {
        let request = self.request(Method::GET, "/api/dashboard/workload");
        self.execute(request).await
    }

    /// Requests that finished their lifecycle
    pub async fn closed_requests(&self) -> Result<Vec<JsonValue>, ClientError> {
        let request = self.request(Method::GET, "/api/requests/closed");
        Ok(self.execute::<Option<Vec<JsonValue>>>(request).await?.unwrap_or_default())
    }
}
