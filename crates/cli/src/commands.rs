//! CLI commands

use anyhow::{Context as _, Result, anyhow};
use clap::Subcommand;
use scm_core::base::{browser_base, configured_base};
use scm_core::{BrowserLocation, ClientSettings};
use scm_http::client::admin::filter_logs;
use scm_http::session::{FileTokenStore, Navigator, TokenStore};
use scm_http::types::{
    ApprovalRoute, Attachment, NewDepartment, NewRfxEvent, RfxAward, RfxQuotation,
    RfxResponseSubmission, SupplierEvaluation, UserAssignment,
};
use scm_http::ScmClient;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config;

/// Everything a command needs, resolved once at startup
pub struct Context {
    pub state_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub settings: ClientSettings,
    pub location: Option<BrowserLocation>,
}

impl Context {
    fn token_store(&self) -> FileTokenStore {
        FileTokenStore::new(config::session_file(&self.state_dir), &self.settings.token_key)
    }

    /// Build an API client; an expired session is reported instead of navigating
    fn client(&self) -> Result<ScmClient> {
        let base = self.settings.resolve(self.location.as_ref());
        let navigator: Arc<dyn Navigator> = Arc::new(|route: &str| {
            warn!(route, "Session expired; run `scm token set <TOKEN>` to log in again");
        });

        ScmClient::builder()
            .base(base)
            .token_store(Arc::new(self.token_store()))
            .navigator(navigator)
            .login_route(self.settings.login_route.clone())
            .timeout(self.settings.timeout())
            .build()
            .context("Failed to build API client")
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how the API base resolves
    Resolve {
        /// Request path to show the final URL for
        path: Option<String>,
    },

    /// Manage the stored bearer token
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Settings file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Supplier evaluations
    Evaluations {
        #[command(subcommand)]
        command: EvaluationCommands,
    },

    /// Users and roles
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Departments and sections
    Departments {
        #[command(subcommand)]
        command: DepartmentCommands,
    },

    /// Approval routes
    Routes {
        #[command(subcommand)]
        command: RouteCommands,
    },

    /// Self-registration requests
    Accounts {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Admin tools
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Reporting dashboards
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommands,
    },

    /// Requested item attachments
    Attachments {
        #[command(subcommand)]
        command: AttachmentCommands,
    },

    /// RFx sourcing events
    Rfx {
        #[command(subcommand)]
        command: RfxCommands,
    },

    /// Projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Store a bearer token
    Set { token: String },
    /// Forget the stored token
    Clear,
    /// Report whether a token is stored
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show,
    /// Write a default settings file
    Generate {
        /// Output file path (defaults to SCM_STATE_DIR/config.toml)
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum EvaluationCommands {
    /// List evaluations
    List {
        /// Query parameters as key=value
        #[arg(short, long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Show one evaluation
    Get { id: i64 },
    /// Create an evaluation from a JSON file
    Create { file: PathBuf },
    /// Replace an evaluation from a JSON file
    Update { id: i64, file: PathBuf },
    /// Delete an evaluation
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users
    List,
    /// Show one user
    Get { id: i64 },
    /// Deactivate a user
    Deactivate { id: i64 },
    /// Assign role and placement
    Assign {
        id: i64,
        #[arg(long)]
        role: String,
        #[arg(long)]
        department: Option<i64>,
        #[arg(long)]
        section: Option<i64>,
        #[arg(long)]
        can_request_medication: bool,
    },
    /// List roles
    Roles,
}

#[derive(Subcommand)]
pub enum DepartmentCommands {
    /// List departments
    List,
    /// Create a department
    Create {
        name: String,
        #[arg(long = "type", default_value = "operational")]
        kind: String,
    },
    /// Add a section to a department
    AddSection { department: i64, name: String },
}

#[derive(Subcommand)]
pub enum RouteCommands {
    /// List approval routes
    List,
    /// Create or update a route from a JSON file
    Save { file: PathBuf },
    /// Delete a route
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// List pending requests
    List,
    /// Approve a request
    Approve { id: i64 },
    /// Reject a request
    Reject {
        id: i64,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Reassign pending approvals
    Reassign,
    /// Deactivate a user by email
    DeactivateUser { email: String },
    /// Show system logs
    Logs {
        /// Case-insensitive text filter
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum DashboardCommands {
    /// Summary figures
    Summary,
    /// Department spending for a year
    Spending { year: i32 },
    /// Workload per assignee
    Workload,
    /// Closed requests
    Closed,
}

#[derive(Subcommand)]
pub enum AttachmentCommands {
    /// List an item's attachments
    List { item: i64 },
    /// Upload a file to an item
    Upload { item: i64, file: PathBuf },
    /// Download one of an item's attachments
    Download {
        item: i64,
        id: i64,
        /// Output path (defaults to the attachment's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RfxCommands {
    /// List events
    List,
    /// Publish an event from a JSON file
    Create { file: PathBuf },
    /// List responses to an event
    Responses { event: i64 },
    /// Submit a supplier response from a JSON file
    Respond { event: i64, file: PathBuf },
    /// Compare quotations read from a JSON array file
    Analyze { event: i64, file: PathBuf },
    /// Set an event's status
    Status {
        event: i64,
        #[arg(value_parser = ["open", "closed"])]
        status: String,
    },
    /// Award an event to a response
    Award {
        event: i64,
        response: i64,
        #[arg(long)]
        po_number: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects
    List,
    /// Add a project
    Create { name: String },
    /// Deactivate a project
    Deactivate { id: i64 },
}

impl Commands {
    pub async fn execute(self, ctx: Context) -> Result<()> {
        match self {
            Commands::Resolve { path } => resolve(&ctx, path.as_deref()),
            Commands::Token { command } => command.execute(&ctx),
            Commands::Config { command } => command.execute(&ctx),
            Commands::Evaluations { command } => command.execute(&ctx.client()?).await,
            Commands::Users { command } => command.execute(&ctx.client()?).await,
            Commands::Departments { command } => command.execute(&ctx.client()?).await,
            Commands::Routes { command } => command.execute(&ctx.client()?).await,
            Commands::Accounts { command } => command.execute(&ctx.client()?).await,
            Commands::Admin { command } => command.execute(&ctx.client()?).await,
            Commands::Dashboard { command } => command.execute(&ctx.client()?).await,
            Commands::Attachments { command } => command.execute(&ctx.client()?).await,
            Commands::Rfx { command } => command.execute(&ctx.client()?).await,
            Commands::Projects { command } => command.execute(&ctx.client()?).await,
        }
    }
}

fn resolve(ctx: &Context, path: Option<&str>) -> Result<()> {
    let settings = &ctx.settings;
    let configured = configured_base(settings.configured_base(), settings.policy);
    let browser = ctx
        .location
        .as_ref()
        .map(|loc| browser_base(loc, settings.local_backend_port));
    let base = settings.resolve(ctx.location.as_ref());

    print_json(&json!({
        "configured": settings.configured_base(),
        "policy": settings.policy,
        "configured_origin": configured.origin,
        "browser_primary": browser.as_ref().map(|b| &b.primary),
        "browser_fallback": browser.as_ref().map(|b| &b.fallback),
        "origin": base.origin(),
        "path_prefix": base.path_prefix(),
        "url": path.and_then(|p| base.url_for(p)),
    }))
}

impl TokenCommands {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let store = ctx.token_store();
        match self {
            TokenCommands::Set { token } => {
                store.set_token(token.trim());
                info!(path = %store.path().display(), "Token stored");
            }
            TokenCommands::Clear => {
                store.clear_token();
                info!("Token cleared");
            }
            TokenCommands::Status => {
                let status = if store.token().is_some() { "present" } else { "absent" };
                println!("token: {status}");
            }
        }
        Ok(())
    }
}

impl ConfigCommands {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            ConfigCommands::Show => print_json(&ctx.settings),
            ConfigCommands::Generate { output } => {
                let path = output
                    .or_else(|| ctx.config_path.clone())
                    .unwrap_or_else(|| config::default_config_path(&ctx.state_dir));
                config::generate_default_config(&path)?;
                println!("Generated settings file at: {}", path.display());
                Ok(())
            }
        }
    }
}

impl EvaluationCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            EvaluationCommands::List { params } => {
                print_json(&client.list_supplier_evaluations(&params).await?)
            }
            EvaluationCommands::Get { id } => {
                print_json(&client.get_supplier_evaluation(id).await?)
            }
            EvaluationCommands::Create { file } => {
                let evaluation: SupplierEvaluation = read_json(&file).await?;
                print_json(&client.create_supplier_evaluation(&evaluation).await?)
            }
            EvaluationCommands::Update { id, file } => {
                let evaluation: SupplierEvaluation = read_json(&file).await?;
                print_json(&client.update_supplier_evaluation(id, &evaluation).await?)
            }
            EvaluationCommands::Delete { id } => {
                client.delete_supplier_evaluation(id).await?;
                info!(id, "Supplier evaluation deleted");
                Ok(())
            }
        }
    }
}

impl UserCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            UserCommands::List => print_json(&client.list_users().await?),
            UserCommands::Get { id } => print_json(&client.get_user(id).await?),
            UserCommands::Deactivate { id } => {
                client.deactivate_user(id).await?;
                info!(id, "User deactivated");
                Ok(())
            }
            UserCommands::Assign {
                id,
                role,
                department,
                section,
                can_request_medication,
            } => {
                let assignment = UserAssignment {
                    role,
                    department_id: department,
                    section_id: section,
                    can_request_medication,
                };
                client.assign_user(id, &assignment).await?;
                info!(id, "User assignment updated");
                Ok(())
            }
            UserCommands::Roles => print_json(&client.list_roles().await?),
        }
    }
}

impl DepartmentCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            DepartmentCommands::List => print_json(&client.list_departments().await?),
            DepartmentCommands::Create { name, kind } => {
                client
                    .create_department(&NewDepartment { name, kind })
                    .await?;
                info!("Department created");
                Ok(())
            }
            DepartmentCommands::AddSection { department, name } => {
                client.create_section(department, &name).await?;
                info!(department, "Section created");
                Ok(())
            }
        }
    }
}

impl RouteCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            RouteCommands::List => print_json(&client.list_approval_routes().await?),
            RouteCommands::Save { file } => {
                let route: ApprovalRoute = read_json(&file).await?;
                client.save_approval_route(&route).await?;
                info!(id = ?route.id, "Approval route saved");
                Ok(())
            }
            RouteCommands::Delete { id } => {
                client.delete_approval_route(id).await?;
                info!(id, "Approval route deleted");
                Ok(())
            }
        }
    }
}

impl AccountCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            AccountCommands::List => print_json(&client.list_account_requests().await?),
            AccountCommands::Approve { id } => {
                client.approve_account_request(id).await?;
                info!(id, "Account request approved");
                Ok(())
            }
            AccountCommands::Reject { id, reason } => {
                client.reject_account_request(id, reason.as_deref()).await?;
                info!(id, "Account request rejected");
                Ok(())
            }
        }
    }
}

impl AdminCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            AdminCommands::Reassign => print_json(&client.reassign_approvals().await?),
            AdminCommands::DeactivateUser { email } => {
                print_json(&client.deactivate_user_by_email(&email).await?)
            }
            AdminCommands::Logs { filter } => {
                let logs = client.admin_logs().await?;
                print_json(&filter_logs(&logs, filter.as_deref().unwrap_or_default()))
            }
        }
    }
}

impl DashboardCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            DashboardCommands::Summary => print_json(&client.dashboard_summary().await?),
            DashboardCommands::Spending { year } => {
                print_json(&client.department_spending(year).await?)
            }
            DashboardCommands::Workload => print_json(&client.workload().await?),
            DashboardCommands::Closed => print_json(&client.closed_requests().await?),
        }
    }
}

impl AttachmentCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            AttachmentCommands::List { item } => print_json(&client.item_attachments(item).await?),
            AttachmentCommands::Upload { item, file } => {
                let file_name = file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| anyhow!("Invalid file name: {}", file.display()))?
                    .to_string();
                let content = tokio::fs::read(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                client.upload_item_attachment(item, &file_name, content).await?;
                info!(item, file = %file_name, "Attachment uploaded");
                Ok(())
            }
            AttachmentCommands::Download { item, id, output } => {
                let attachments = client.item_attachments(item).await?;
                let attachment = attachments
                    .iter()
                    .find(|a| a.id == id)
                    .ok_or_else(|| anyhow!("Item {item} has no attachment {id}"))?;

                let output = download_target(output, attachment)?;
                let content = client.download_attachment(attachment).await?;
                tokio::fs::write(&output, &content.bytes).await?;
                info!(
                    path = %output.display(),
                    content_type = %content.content_type,
                    bytes = content.bytes.len(),
                    "Attachment downloaded"
                );
                Ok(())
            }
        }
    }
}

impl RfxCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            RfxCommands::List => print_json(&client.list_rfx_events().await?),
            RfxCommands::Create { file } => {
                let event: NewRfxEvent = read_json(&file).await?;
                print_json(&client.create_rfx_event(&event).await?)
            }
            RfxCommands::Responses { event } => {
                print_json(&client.list_rfx_responses(event).await?)
            }
            RfxCommands::Respond { event, file } => {
                let response: RfxResponseSubmission = read_json(&file).await?;
                let response = RfxResponseSubmission::new(
                    response.supplier_name,
                    response.bid_amount,
                    response.notes,
                    response.response_data.items,
                );
                client.submit_rfx_response(event, &response).await?;
                info!(event, "RFx response submitted");
                Ok(())
            }
            RfxCommands::Analyze { event, file } => {
                let quotations: Vec<RfxQuotation> = read_json(&file).await?;
                print_json(&client.analyze_rfx_quotations(event, &quotations).await?)
            }
            RfxCommands::Status { event, status } => {
                client.update_rfx_status(event, &status).await?;
                info!(event, %status, "RFx status updated");
                Ok(())
            }
            RfxCommands::Award {
                event,
                response,
                po_number,
                notes,
            } => {
                let award = RfxAward::new(response, po_number.as_deref(), notes.as_deref());
                print_json(&client.award_rfx_response(event, &award).await?)
            }
        }
    }
}

impl ProjectCommands {
    pub async fn execute(self, client: &ScmClient) -> Result<()> {
        match self {
            ProjectCommands::List => print_json(&client.list_projects().await?),
            ProjectCommands::Create { name } => {
                client.create_project(&name).await?;
                info!(name = name.trim(), "Project created");
                Ok(())
            }
            ProjectCommands::Deactivate { id } => {
                if let Some(project) = client.deactivate_project(id).await? {
                    print_json(&project)?;
                }
                info!(id, "Project deactivated");
                Ok(())
            }
        }
    }
}

/// Where a download is written: the explicit output, else the attachment's
/// bare file name in the working directory
fn download_target(output: Option<PathBuf>, attachment: &Attachment) -> Result<PathBuf> {
    output
        .or_else(|| attachment.display_name().map(PathBuf::from))
        .ok_or_else(|| anyhow!("Attachment {} has no usable file name", attachment.id))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_pairs_parse() {
        assert_eq!(
            parse_key_value("supplier = Acme"),
            Ok(("supplier".to_string(), "Acme".to_string()))
        );
        assert!(parse_key_value("supplier").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn downloads_stay_in_working_directory() {
        let attachment: Attachment = serde_json::from_value(json!({
            "id": 8,
            "file_name": "../../.bashrc"
        }))
        .unwrap();
        let target = download_target(None, &attachment).unwrap();
        assert_eq!(target, PathBuf::from(".bashrc"));
        assert_eq!(target.components().count(), 1);

        let explicit = download_target(Some(PathBuf::from("out/q.pdf")), &attachment).unwrap();
        assert_eq!(explicit, PathBuf::from("out/q.pdf"));

        let nameless: Attachment = serde_json::from_value(json!({ "id": 9, "file_name": ".." }))
            .unwrap();
        assert!(download_target(None, &nameless).is_err());
    }
}
