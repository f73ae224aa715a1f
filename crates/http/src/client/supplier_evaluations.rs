//! Supplier evaluation client methods

use super::{ClientError, ScmClient};
use crate::types::SupplierEvaluation;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value as JsonValue;

const RESOURCE: &str = "/api/supplier-evaluations";

impl ScmClient {
    /// List supplier evaluations; a non-array response is treated as empty
    pub async fn list_supplier_evaluations<Q: Serialize + ?Sized>(
        &self,
        params: &Q,
    ) -> Result<Vec<SupplierEvaluation>, ClientError> {
        let request = self.request(Method::GET, RESOURCE).query(params);
        let body: JsonValue = self.execute(request).await?;

        match body {
            JsonValue::Array(_) => Ok(serde_json::from_value(body)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Get a single supplier evaluation
    pub async fn get_supplier_evaluation(
        &self,
        id: i64,
    ) -> Result<SupplierEvaluation, ClientError> {
        let request = self.request(Method::GET, &format!("{RESOURCE}/{id}"));
        self.execute(request).await
    }

    /// Create a supplier evaluation
    pub async fn create_supplier_evaluation(
        &self,
        evaluation: &SupplierEvaluation,
    ) -> Result<SupplierEvaluation, ClientError> {
        let request = self.request(Method::POST, RESOURCE).json(evaluation);
        self.execute(request).await
    }

    /// Update a supplier evaluation
    pub async fn update_supplier_evaluation(
        &self,
        id: i64,
        evaluation: &SupplierEvaluation,
    ) -> Result<SupplierEvaluation, ClientError> {
        let request = self
            .request(Method::PUT, &format!("{RESOURCE}/{id}"))
            .json(evaluation);
        self.execute(request).await
    }

    /// Delete a supplier evaluation
    pub async fn delete_supplier_evaluation(&self, id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &format!("{RESOURCE}/{id}"));
        self.execute_empty(request).await
    }
}
