//! Projects collection and project mutations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{member_chips, ListRow, Member};
use crate::api::{ActionError, ApiClient, ApiError, PageEnvelope};
use crate::collection::{CollectionController, PageRequest, PageSource};
use crate::filters::FilterKey;

/// Filter keys `GET /projects` understands
pub const PROJECT_FILTERS: [FilterKey; 2] = [FilterKey::CreatedAtAfter, FilterKey::CreatedAtBefore];

/// Project record as returned by `GET /projects`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawProject {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "memberNames")]
    pub team_member_names: Vec<String>,
    #[serde(default)]
    pub task_count: u32,
}

/// Project list item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub members: Vec<Member>,
    pub task_count: u32,
    /// Time the list was fetched; the list endpoint has no creation time
    pub created_at: DateTime<Utc>,
}

impl ProjectSummary {
    pub fn from_raw(raw: RawProject, fetched_at: DateTime<Utc>) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            description: raw.description.unwrap_or_default(),
            members: Member::from_names(raw.team_member_names),
            task_count: raw.task_count,
            created_at: fetched_at,
        }
    }
}

impl ListRow for ProjectSummary {
    fn row(&self) -> String {
        format!(
            "#{:<5} {:<32} {:>3} task(s)  [{}]",
            self.id,
            self.title,
            self.task_count,
            member_chips(&self.members, 4)
        )
    }
}

/// `GET /projects`
#[derive(Debug, Clone)]
pub struct ProjectsSource {
    client: Arc<ApiClient>,
}

impl ProjectsSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl PageSource for ProjectsSource {
    type Raw = RawProject;

    fn name(&self) -> &'static str {
        "projects"
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> Result<PageEnvelope<RawProject>, ApiError> {
        self.client
            .get_page("/projects", &request.query_pairs(&PROJECT_FILTERS))
            .await
    }
}

pub type ProjectsController = CollectionController<ProjectsSource, ProjectSummary>;

/// Projects controller stamping each item with the fetch time
pub fn projects_controller(client: Arc<ApiClient>, page_size: usize) -> ProjectsController {
    CollectionController::with_mapper(ProjectsSource::new(client), |raw| {
        ProjectSummary::from_raw(raw, Utc::now())
    })
    .with_page_size(page_size)
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /projects`
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
struct InviteBody<'a> {
    email: &'a str,
}

/// Create a project
pub async fn create_project(
    client: &ApiClient,
    project: &NewProject,
) -> Result<RawProject, ActionError> {
    if project.title.trim().is_empty() {
        return Err(ActionError {
            message: "Project title is required.".to_string(),
            cause: ApiError::Http {
                status: 400,
                message: None,
            },
        });
    }

    let created: RawProject = client.post_json("/projects", project).await?;
    tracing::info!("Created project #{} ({})", created.id, created.title);
    Ok(created)
}

/// Invite a user to a project by email
pub async fn invite_to_project(
    client: &ApiClient,
    project_id: u64,
    email: &str,
) -> Result<(), ActionError> {
    client
        .post_ack(
            &format!("/projects/{}/invite", project_id),
            &InviteBody { email: email.trim() },
        )
        .await?;
    tracing::info!("Invited {} to project #{}", email.trim(), project_id);
    Ok(())
}

/// Add every member of a team to a project
pub async fn import_team_into_project(
    client: &ApiClient,
    project_id: u64,
    team_id: u64,
) -> Result<(), ActionError> {
    client
        .post_empty(&format!("/projects/{}/import-team/{}", project_id, team_id))
        .await?;
    tracing::info!("Imported team #{} into project #{}", team_id, project_id);
    Ok(())
}
