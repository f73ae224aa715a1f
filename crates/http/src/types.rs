//! Wire types for the SCM backend
//!
//! The backend owns these schemas; fields the client does not read are kept
//! in `extra` so nothing is lost when a record is sent back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Supplier evaluation record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierEvaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub supplier_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_score: Option<f64>,
    /// Weighted score computed by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Portal user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub section_id: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Role and placement assigned to a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAssignment {
    pub role: String,
    pub department_id: Option<i64>,
    pub section_id: Option<i64>,
    #[serde(default)]
    pub can_request_medication: bool,
}

/// Organisational department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Department creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Section creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSection {
    pub name: String,
}

/// One step of an approval chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRoute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub request_type: String,
    pub department_type: String,
    pub approval_level: Option<u32>,
    pub role: String,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Pending self-registration awaiting approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRequest {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AccountRequestList {
    #[serde(default)]
    pub requests: Vec<AccountRequest>,
}

/// Account request rejection body
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct RejectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `{ message, data }` envelope used by admin actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeactivateUserRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AdminLogList {
    #[serde(default)]
    pub logs: Vec<JsonValue>,
}

/// Unit cost update for a requested item
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UnitCostUpdate {
    pub unit_cost: f64,
}

/// Purchased quantity update for a requested item
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PurchasedQuantityUpdate {
    pub purchased_quantity: f64,
}

/// Procurement status update for a requested item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcurementStatusUpdate {
    pub procurement_status: String,
    #[serde(default)]
    pub procurement_comment: Option<String>,
    #[serde(default)]
    pub po_issuance_method: Option<String>,
    pub po_number: Option<String>,
    pub invoice_number: Option<String>,
    pub currency: Option<String>,
    pub committed_cost: Option<f64>,
    pub paid_cost: Option<f64>,
    pub savings_driver: Option<String>,
    pub savings_notes: Option<String>,
    pub contract_id: Option<i64>,
    pub contract_value_snapshot: Option<f64>,
}

/// Sourcing event (RFQ, RFP or RFI) published to suppliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfxEvent {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rfx_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub request_id: Option<i64>,
    #[serde(default)]
    pub response_count: Option<i64>,
    #[serde(default)]
    pub details: Option<RfxDetails>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Line items an event asks suppliers to quote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfxDetails {
    #[serde(default)]
    pub items: Vec<RfxItem>,
}

/// One requested line of an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfxItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<String>,
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RfxItem {
    /// Trim text fields, dropping the ones left empty
    fn normalized(&self) -> Self {
        let clean = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            item_name: clean(&self.item_name),
            specs: clean(&self.specs),
            quantity: self.quantity,
            notes: clean(&self.notes),
        }
    }

    fn is_blank(&self) -> bool {
        self.item_name.is_none()
            && self.specs.is_none()
            && self.quantity.is_none_or(|q| q == 0.0)
            && self.notes.is_none()
    }
}

/// Event creation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRfxEvent {
    pub title: String,
    pub rfx_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<RfxDetails>,
}

impl NewRfxEvent {
    /// Lower-case the type and drop blank line items; no items means no `details`
    pub fn normalized(&self) -> Self {
        let items: Vec<RfxItem> = self
            .details
            .iter()
            .flat_map(|d| d.items.iter())
            .map(RfxItem::normalized)
            .filter(|item| !item.is_blank())
            .collect();

        Self {
            title: self.title.trim().to_string(),
            rfx_type: self.rfx_type.trim().to_lowercase(),
            details: (!items.is_empty()).then_some(RfxDetails { items }),
            ..self.clone()
        }
    }
}

/// A supplier's quoted line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfxItemResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_quantity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Totals sent alongside a supplier response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfxResponseTotals {
    pub total_cost: f64,
    pub total_quantity: f64,
    pub total_free_quantity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfxResponseData {
    #[serde(default)]
    pub items: Vec<RfxItemResponse>,
    #[serde(default)]
    pub totals: RfxResponseTotals,
}

/// Supplier response submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfxResponseSubmission {
    pub supplier_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub response_data: RfxResponseData,
}

impl RfxResponseSubmission {
    /// Build a submission, totalling the quoted lines; missing numbers count as zero
    pub fn new(
        supplier_name: impl Into<String>,
        bid_amount: Option<f64>,
        notes: Option<String>,
        items: Vec<RfxItemResponse>,
    ) -> Self {
        let totals = items.iter().fold(RfxResponseTotals::default(), |mut t, item| {
            let quantity = item.quantity.unwrap_or_default();
            t.total_cost += quantity * item.unit_cost.unwrap_or_default();
            t.total_quantity += quantity;
            t.total_free_quantity += item.free_quantity.unwrap_or_default();
            t
        });

        Self {
            supplier_name: supplier_name.into(),
            bid_amount,
            notes,
            response_data: RfxResponseData { items, totals },
        }
    }
}

/// Submitted supplier response as listed for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfxResponse {
    pub id: i64,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub bid_amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Quotation fed to the comparison analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfxQuotation {
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jci_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl RfxQuotation {
    /// A quotation with no supplier and no figures carries nothing to compare
    pub fn is_blank(&self) -> bool {
        self.supplier_name.as_deref().is_none_or(|n| n.trim().is_empty())
            && [self.bid_amount, self.safety_score, self.value_score, self.jci_score]
                .iter()
                .all(|v| v.is_none_or(|v| v == 0.0))
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RfxAnalysisRequest<'a> {
    pub quotations: Vec<&'a RfxQuotation>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RfxStatusUpdate<'a> {
    pub status: &'a str,
}

/// Award of an event to one response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfxAward {
    pub response_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RfxAward {
    /// Award `response_id`; blank PO number and notes are omitted
    pub fn new(response_id: i64, po_number: Option<&str>, notes: Option<&str>) -> Self {
        let clean = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            response_id,
            po_number: clean(po_number),
            notes: clean(notes),
        }
    }
}

/// Project requests can be charged to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewProject<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProjectDeactivation {
    #[serde(default)]
    pub project: Option<Project>,
}

/// File attached to a requested item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Attachment {
    /// File name component of the stored path, split on either separator
    pub fn stored_file_name(&self) -> Option<&str> {
        self.file_path.as_deref().and_then(last_component)
    }

    /// Name to save a download under.
    ///
    /// Only the final component of the server-supplied name is used, so the
    /// result never points outside the directory it is joined onto.
    pub fn display_name(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .and_then(last_component)
            .or_else(|| self.stored_file_name())
    }

    /// Endpoint the file can be fetched from: the server-provided URL, else
    /// the download route for the stored file name
    pub fn download_path(&self) -> Option<String> {
        if let Some(url) = self.download_url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_string());
        }
        self.stored_file_name()
            .map(|name| format!("/api/attachments/download/{}", urlencoding::encode(name)))
    }
}

/// Final path component of `path`; empty, `.` and `..` yield nothing
fn last_component(path: &str) -> Option<&str> {
    path.rsplit(['/', '\\', ':'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Downloaded attachment content
#[derive(Debug, Clone)]
pub struct AttachmentContent {
    pub content_type: String,
    pub bytes: bytes::Bytes,
}
