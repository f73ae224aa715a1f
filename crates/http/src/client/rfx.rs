//! RFx sourcing client methods

use super::{ClientError, ScmClient};
use crate::types::{
    NewRfxEvent, RfxAnalysisRequest, RfxAward, RfxEvent, RfxQuotation, RfxResponse,
    RfxResponseSubmission, RfxStatusUpdate,
};
use reqwest::Method;
use serde_json::Value as JsonValue;

const RESOURCE: &str = "/api/rfx-events";

impl ScmClient {
    /// List sourcing events
    pub async fn list_rfx_events(&self) -> Result<Vec<RfxEvent>, ClientError> {
        let request = self.request(Method::GET, RESOURCE);
        Ok(self.execute::<Option<Vec<RfxEvent>>>(request).await?.unwrap_or_default())
    }

    /// Publish an event. The title is required; the type is sent lower-case
    /// and blank line items are dropped.
    pub async fn create_rfx_event(&self, event: &NewRfxEvent) -> Result<RfxEvent, ClientError> {
        let event = event.normalized();
        if event.title.is_empty() {
            return Err(ClientError::BadRequest("RFx title is required".into()));
        }

        let request = self.request(Method::POST, RESOURCE).json(&event);
        self.execute(request).await
    }

    /// Responses submitted for an event
    pub async fn list_rfx_responses(&self, event_id: i64) -> Result<Vec<RfxResponse>, ClientError> {
        let request = self.request(Method::GET, &format!("{RESOURCE}/{event_id}/responses"));
        Ok(self.execute::<Option<Vec<RfxResponse>>>(request).await?.unwrap_or_default())
    }

    /// Submit a supplier response to an event
    pub async fn submit_rfx_response(
        &self,
        event_id: i64,
        response: &RfxResponseSubmission,
    ) -> Result<(), ClientError> {
        let request = self
            .request(Method::POST, &format!("{RESOURCE}/{event_id}/responses"))
            .json(response);
        self.execute_empty(request).await
    }

    /// Compare quotations for an event. Blank quotations are skipped, and at
    /// least one must remain.
    pub async fn analyze_rfx_quotations(
        &self,
        event_id: i64,
        quotations: &[RfxQuotation],
    ) -> Result<JsonValue, ClientError> {
        let quotations: Vec<&RfxQuotation> = quotations.iter().filter(|q| !q.is_blank()).collect();
        if quotations.is_empty() {
            return Err(ClientError::BadRequest(
                "at least one quotation is required for analysis".into(),
            ));
        }

        let request = self
            .request(Method::POST, &format!("{RESOURCE}/{event_id}/analyze"))
            .json(&RfxAnalysisRequest { quotations });
        self.execute(request).await
    }

    /// Open or close an event
    pub async fn update_rfx_status(&self, event_id: i64, status: &str) -> Result<(), ClientError> {
        let request = self
            .request(Method::PATCH, &format!("{RESOURCE}/{event_id}/status"))
            .json(&RfxStatusUpdate { status });
        self.execute_empty(request).await
    }

    /// Award an event to one of its responses
    pub async fn award_rfx_response(
        &self,
        event_id: i64,
        award: &RfxAward,
    ) -> Result<JsonValue, ClientError> {
        let request = self
            .request(Method::POST, &format!("{RESOURCE}/{event_id}/award"))
            .json(award);
        self.execute(request).await
    }
}
