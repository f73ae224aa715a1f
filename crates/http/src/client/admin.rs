//! User, organisation and admin-tool client methods

use super::{ClientError, ScmClient};
use crate::types::{
    AccountRequest, AccountRequestList, ActionResponse, AdminLogList, ApprovalRoute,
    DeactivateUserRequest, Department, NewDepartment, NewSection, RejectRequest, User,
    UserAssignment,
};
use reqwest::Method;
use serde_json::Value as JsonValue;

impl ScmClient {
    /// List users
    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        let request = self.request(Method::GET, "/api/users");
        Ok(self.execute::<Option<Vec<User>>>(request).await?.unwrap_or_default())
    }

    /// Get a single user
    pub async fn get_user(&self, id: i64) -> Result<User, ClientError> {
        let request = self.request(Method::GET, &format!("/api/users/{id}"));
        self.execute(request).await
    }

    /// Deactivate a user account
    pub async fn deactivate_user(&self, id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::PATCH, &format!("/api/users/{id}/deactivate"));
        self.execute_empty(request).await
    }

    /// Assign role, department and section to a user
    pub async fn assign_user(
        &self,
        id: i64,
        assignment: &UserAssignment,
    ) -> Result<(), ClientError> {
        let request = self
            .request(Method::PATCH, &format!("/api/users/{id}/assign"))
            .json(assignment);
        self.execute_empty(request).await
    }

    /// List roles
    pub async fn list_roles(&self) -> Result<Vec<JsonValue>, ClientError> {
        let request = self.request(Method::GET, "/api/roles");
        Ok(self.execute::<Option<Vec<JsonValue>>>(request).await?.unwrap_or_default())
    }

    /// List departments
    pub async fn list_departments(&self) -> Result<Vec<Department>, ClientError> {
        let request = self.request(Method::GET, "/api/departments");
        Ok(self.execute::<Option<Vec<Department>>>(request).await?.unwrap_or_default())
    }

    /// Create a department
    pub async fn create_department(&self, department: &NewDepartment) -> Result<(), ClientError> {
        let request = self.request(Method::POST, "/api/departments").json(department);
        self.execute_empty(request).await
    }

    /// Add a section to a department
    pub async fn create_section(&self, department_id: i64, name: &str) -> Result<(), ClientError> {
        let request = self
            .request(Method::POST, &format!("/api/departments/{department_id}/sections"))
            .json(&NewSection {
                name: name.to_string(),
            });
        self.execute_empty(request).await
    }

    /// List approval routes
    pub async fn list_approval_routes(&self) -> Result<Vec<ApprovalRoute>, ClientError> {
        let request = self.request(Method::GET, "/api/approval-routes");
        Ok(self.execute::<Option<Vec<ApprovalRoute>>>(request).await?.unwrap_or_default())
    }

    /// Create a route, or update it when it already has an id
    pub async fn save_approval_route(&self, route: &ApprovalRoute) -> Result<(), ClientError> {
        let request = match route.id {
            Some(id) => self.request(Method::PUT, &format!("/api/approval-routes/{id}")),
            None => self.request(Method::POST, "/api/approval-routes"),
        };
        self.execute_empty(request.json(route)).await
    }

    /// Delete an approval route
    pub async fn delete_approval_route(&self, id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &format!("/api/approval-routes/{id}"));
        self.execute_empty(request).await
    }

    /// List pending self-registration requests
    pub async fn list_account_requests(&self) -> Result<Vec<AccountRequest>, ClientError> {
        let request = self.request(Method::GET, "/auth/register-requests");
        let list: Option<AccountRequestList> = self.execute(request).await?;
        Ok(list.unwrap_or_default().requests)
    }

    /// Approve a registration request
    pub async fn approve_account_request(&self, id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::POST, &format!("/auth/register-requests/{id}/approve"));
        self.execute_empty(request).await
    }

    /// Reject a registration request; a blank reason is omitted
    pub async fn reject_account_request(
        &self,
        id: i64,
        reason: Option<&str>,
    ) -> Result<(), ClientError> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let request = self
            .request(Method::POST, &format!("/auth/register-requests/{id}/reject"))
            .json(&RejectRequest { reason });
        self.execute_empty(request).await
    }

    /// Move every pending approval to its current approver
    pub async fn reassign_approvals(&self) -> Result<ActionResponse, ClientError> {
        let request = self.request(Method::POST, "/api/admin-tools/reassign-approvals");
        Ok(self.execute::<Option<ActionResponse>>(request).await?.unwrap_or_default())
    }

    /// Deactivate a user by email address
    pub async fn deactivate_user_by_email(
        &self,
        email: &str,
    ) -> Result<ActionResponse, ClientError> {
        let request = self
            .request(Method::POST, "/api/admin-tools/deactivate-user")
            .json(&DeactivateUserRequest { email });
        Ok(self.execute::<Option<ActionResponse>>(request).await?.unwrap_or_default())
    }

    /// Fetch the system log entries
    pub async fn admin_logs(&self) -> Result<Vec<JsonValue>, ClientError> {
        let request = self.request(Method::GET, "/api/admin-tools/logs");
        let list: Option<AdminLogList> = self.execute(request).await?;
        Ok(list.unwrap_or_default().logs)
    }
}

/// Keep log entries whose JSON text contains `keyword`, ignoring case.
/// A blank keyword keeps everything.
pub fn filter_logs<'a>(logs: &'a [JsonValue], keyword: &str) -> Vec<&'a JsonValue> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return logs.iter().collect();
    }

    logs.iter()
        .filter(|log| log.to_string().to_lowercase().contains(&keyword))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let logs = vec![
            json!({ "action": "LOGIN", "user": "ops@acme.com" }),
            json!({ "action": "deactivate", "user": "j.doe@acme.com" }),
        ];

        let hits = filter_logs(&logs, "Login");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["user"], "ops@acme.com");

        assert_eq!(filter_logs(&logs, "acme.com").len(), 2);
        assert_eq!(filter_logs(&logs, "  ").len(), 2);
        assert!(filter_logs(&logs, "approve").is_empty());
    }
}
