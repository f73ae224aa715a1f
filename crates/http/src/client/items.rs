//! Requested item and attachment client methods

use super::{ClientError, ScmClient};
use crate::types::{
    Attachment, AttachmentContent, ProcurementStatusUpdate, PurchasedQuantityUpdate,
    UnitCostUpdate,
};
use reqwest::Method;
use reqwest::multipart::{Form, Part};

impl ScmClient {
    /// Set the unit cost of a requested item
    pub async fn update_item_cost(&self, item_id: i64, unit_cost: f64) -> Result<(), ClientError> {
        let request = self
            .request(Method::PUT, &format!("/api/requested-items/{item_id}/cost"))
            .json(&UnitCostUpdate { unit_cost });
        self.execute_empty(request).await
    }

    /// Set how much of a requested item was purchased
    pub async fn update_purchased_quantity(
        &self,
        item_id: i64,
        purchased_quantity: f64,
    ) -> Result<(), ClientError> {
        let request = self
            .request(
                Method::PUT,
                &format!("/api/requested-items/{item_id}/purchased-quantity"),
            )
            .json(&PurchasedQuantityUpdate { purchased_quantity });
        self.execute_empty(request).await
    }

    /// Record procurement progress for a requested item
    pub async fn update_procurement_status(
        &self,
        item_id: i64,
        update: &ProcurementStatusUpdate,
    ) -> Result<(), ClientError> {
        let request = self
            .request(
                Method::PUT,
                &format!("/api/requested-items/{item_id}/procurement-status"),
            )
            .json(update);
        self.execute_empty(request).await
    }

    /// List attachments of a requested item
    pub async fn item_attachments(&self, item_id: i64) -> Result<Vec<Attachment>, ClientError> {
        let request = self.request(Method::GET, &format!("/api/attachments/item/{item_id}"));
        Ok(self.execute::<Option<Vec<Attachment>>>(request).await?.unwrap_or_default())
    }

    /// Upload a file as a multipart `file` field
    pub async fn upload_item_attachment(
        &self,
        item_id: i64,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<(), ClientError> {
        let form = Form::new().part("file", Part::bytes(content).file_name(file_name.to_string()));
        let request = self
            .request(Method::POST, &format!("/api/attachments/item/{item_id}"))
            .multipart(form);
        self.execute_empty(request).await
    }

    /// Download an attachment's content
    pub async fn download_attachment(
        &self,
        attachment: &Attachment,
    ) -> Result<AttachmentContent, ClientError> {
        let path = attachment
            .download_path()
            .ok_or_else(|| ClientError::NotFound("attachment file is missing".into()))?;
        let request = self.request(Method::GET, &path);
        let (content_type, bytes) = self.execute_bytes(request).await?;
        Ok(AttachmentContent {
            content_type,
            bytes,
        })
    }
}
