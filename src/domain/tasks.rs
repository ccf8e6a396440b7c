//! Tasks collection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{parse_timestamp, ListRow};
use crate::api::{ApiClient, ApiError, PageEnvelope};
use crate::collection::{CollectionController, PageRequest, PageSource};
use crate::filters::{FilterKey, TaskStatus};

/// Project reference nested in a task record
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProjectRef {
    pub id: u64,
    pub title: String,
}

/// Task record as returned by `GET /tasks`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub project: ProjectRef,
}

/// User assigned to a task (not populated by the list endpoint)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskAssignment {
    pub user_id: u64,
    pub name: String,
}

/// Task list item with the project reference flattened
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: u64,
    pub project_name: String,
    pub created_at: DateTime<Utc>,
    pub assignments: Vec<TaskAssignment>,
}

impl TaskSummary {
    pub fn from_raw(raw: RawTask, fetched_at: DateTime<Utc>) -> Self {
        let created_at = raw
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(fetched_at);

        Self {
            id: raw.id,
            title: raw.title,
            description: raw.description.unwrap_or_default(),
            status: raw.status,
            due_date: raw.due_date.as_deref().and_then(parse_timestamp),
            project_id: raw.project.id,
            project_name: raw.project.title,
            created_at,
            assignments: Vec::new(),
        }
    }

    /// Past its due date and not done
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Done && self.due_date.is_some_and(|due| due < now)
    }
}

impl ListRow for TaskSummary {
    fn row(&self) -> String {
        let due = self
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let flag = if self.is_overdue(Utc::now()) { "!" } else { " " };
        format!(
            "#{:<5} {:<11} {} due {:<10}  {:<32} ({})",
            self.id,
            self.status.as_str(),
            flag,
            due,
            self.title,
            self.project_name
        )
    }
}

/// `GET /tasks`
#[derive(Debug, Clone)]
pub struct TasksSource {
    client: Arc<ApiClient>,
}

impl TasksSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl PageSource for TasksSource {
    type Raw = RawTask;

    fn name(&self) -> &'static str {
        "tasks"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<PageEnvelope<RawTask>, ApiError> {
        self.client
            .get_page("/tasks", &request.query_pairs(&FilterKey::ALL))
            .await
    }
}

pub type TasksController = CollectionController<TasksSource, TaskSummary>;

pub fn tasks_controller(client: Arc<ApiClient>, page_size: usize) -> TasksController {
    CollectionController::with_mapper(TasksSource::new(client), |raw| {
        TaskSummary::from_raw(raw, Utc::now())
    })
    .with_page_size(page_size)
}
