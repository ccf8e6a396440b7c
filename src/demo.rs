// Demo mode: an in-process mock of the TeamTacles REST API
//
// Serves seeded projects, tasks, teams and members on 127.0.0.1 with the same
// paging envelope, filters, bearer check and error bodies as the real backend.
// Used by `teamtacles --demo` and as the fixture for transport tests.

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::filters::{TaskStatus, DATE_FORMAT};

/// Bearer token the demo server accepts
pub const DEMO_TOKEN: &str = "teamtacles-demo-token";

const DEFAULT_SIZE: usize = 20;
const MAX_SIZE: usize = 100;

type Params = HashMap<String, String>;
type SharedData = Arc<Mutex<DemoData>>;

#[derive(Debug, Clone)]
struct DemoUser {
    id: u64,
    name: &'static str,
    email: &'static str,
}

#[derive(Debug, Clone)]
struct DemoProject {
    id: u64,
    title: String,
    description: String,
    created: NaiveDate,
    member_ids: Vec<u64>,
}

#[derive(Debug, Clone)]
struct DemoTask {
    id: u64,
    title: &'static str,
    status: TaskStatus,
    created: NaiveDate,
    due: NaiveDate,
    concluded: Option<NaiveDate>,
    project_id: u64,
    assignee_ids: Vec<u64>,
}

#[derive(Debug, Clone)]
struct DemoTeam {
    id: u64,
    name: &'static str,
    description: &'static str,
    created: NaiveDate,
    /// (user id, role)
    members: Vec<(u64, &'static str)>,
}

#[derive(Debug, Default)]
struct DemoData {
    users: Vec<DemoUser>,
    projects: Vec<DemoProject>,
    tasks: Vec<DemoTask>,
    teams: Vec<DemoTeam>,
    /// (resource path, email)
    invitations: Vec<(String, String)>,
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn timestamp(date: NaiveDate) -> String {
    format!("{}T09:00:00", date.format(DATE_FORMAT))
}

impl DemoData {
    fn seeded() -> Self {
        let users = [
            "Ada Lovelace:ada@teamtacles.dev",
            "Grace Hopper:grace@teamtacles.dev",
            "Alan Turing:alan@teamtacles.dev",
            "Linus Torvalds:linus@teamtacles.dev",
            "Margaret Hamilton:margaret@teamtacles.dev",
            "Ken Thompson:ken@teamtacles.dev",
            "Barbara Liskov:barbara@teamtacles.dev",
            "Donald Knuth:donald@teamtacles.dev",
            "Frances Allen:frances@teamtacles.dev",
            "Edsger Dijkstra:edsger@teamtacles.dev",
            "Radia Perlman:radia@teamtacles.dev",
            "John Backus:john@teamtacles.dev",
            "Hedy Lamarr:hedy@teamtacles.dev",
            "Dennis Ritchie:dennis@teamtacles.dev",
            "Katherine Johnson:katherine@teamtacles.dev",
            "Someone Else:someone@example.com",
            "New Person:new.person@example.com",
        ]
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let (name, email) = entry.split_once(':')?;
            Some(DemoUser {
                id: i as u64 + 1,
                name,
                email,
            })
        })
        .collect();

        let projects = [
            (
                1,
                "Website Redesign",
                "New marketing site and docs portal",
                day(2024, 1, 15),
                vec![1, 2, 3],
            ),
            (2, "Mobile App", "iOS and Android clients", day(2024, 2, 3), vec![2, 4, 5, 6]),
            (3, "Data Platform", "Warehouse and ingestion pipelines", day(2024, 2, 20), vec![3, 7]),
            (4, "Billing Revamp", "", day(2024, 3, 11), vec![1, 8, 9]),
            (
                5,
                "Security Audit",
                "Quarterly review of access policies",
                day(2024, 4, 2),
                vec![10, 11],
            ),
            (
                6,
                "Onboarding Flow",
                "First-run experience for new teams",
                day(2024, 5, 18),
                vec![12, 13, 14, 1, 2],
            ),
            (7, "Design System", "Shared components and tokens", day(2024, 6, 7), vec![5]),
        ]
        .into_iter()
        .map(|(id, title, description, created, member_ids)| DemoProject {
            id,
            title: title.to_string(),
            description: description.to_string(),
            created,
            member_ids,
        })
        .collect();

        use TaskStatus::{Done, InProgress, ToDo};
        let tasks = [
            (
                1,
                "Draft sitemap",
                Done,
                day(2024, 1, 16),
                day(2024, 1, 30),
                Some(day(2024, 1, 28)),
                1,
                vec![1],
            ),
            (
                2,
                "Build landing page",
                InProgress,
                day(2024, 1, 20),
                day(2099, 3, 1),
                None,
                1,
                vec![2],
            ),
            (3, "Migrate blog posts", ToDo, day(2024, 2, 1), day(2024, 3, 15), None, 1, vec![3]),
            (
                4,
                "Push notifications",
                InProgress,
                day(2024, 2, 5),
                day(2099, 6, 1),
                None,
                2,
                vec![4, 5],
            ),
            (5, "Offline mode", ToDo, day(2024, 2, 10), day(2099, 9, 1), None, 2, vec![6]),
            (
                6,
                "App store listing",
                Done,
                day(2024, 2, 12),
                day(2024, 4, 1),
                Some(day(2024, 3, 20)),
                2,
                vec![2],
            ),
            (
                7,
                "Ingest clickstream",
                InProgress,
                day(2024, 2, 22),
                day(2024, 5, 1),
                None,
                3,
                vec![7],
            ),
            (8, "Partition fact tables", ToDo, day(2024, 3, 1), day(2099, 1, 10), None, 3, vec![3]),
            (
                9,
                "Invoice templates",
                Done,
                day(2024, 3, 12),
                day(2024, 4, 12),
                Some(day(2024, 4, 10)),
                4,
                vec![8],
            ),
            (10, "Proration rules", ToDo, day(2024, 3, 20), day(2099, 2, 1), None, 4, vec![9]),
            (
                11,
                "Rotate service keys",
                Done,
                day(2024, 4, 3),
                day(2024, 4, 20),
                Some(day(2024, 4, 19)),
                5,
                vec![10],
            ),
            (
                12,
                "Review IAM roles",
                InProgress,
                day(2024, 4, 5),
                day(2024, 6, 1),
                None,
                5,
                vec![11],
            ),
            (
                13,
                "Welcome checklist",
                ToDo,
                day(2024, 5, 20),
                day(2099, 7, 1),
                None,
                6,
                vec![12, 1],
            ),
            (
                14,
                "Button component",
                InProgress,
                day(2024, 6, 8),
                day(2099, 8, 15),
                None,
                7,
                vec![5],
            ),
        ]
        .into_iter()
        .map(
            |(id, title, status, created, due, concluded, project_id, assignee_ids)| DemoTask {
                id,
                title,
                status,
                created,
                due,
                concluded,
                project_id,
                assignee_ids,
            },
        )
        .collect();

        let mut core_members: Vec<(u64, &'static str)> = vec![(1, "OWNER"), (2, "ADMIN")];
        core_members.extend((3..=14).map(|id| (id, "MEMBER")));

        let teams = vec![
            DemoTeam {
                id: 1,
                name: "Platform Core",
                description: "Backend services and infrastructure",
                created: day(2023, 11, 2),
                members: core_members,
            },
            DemoTeam {
                id: 2,
                name: "Mobile",
                description: "Native clients",
                created: day(2024, 1, 9),
                members: vec![(4, "OWNER"), (5, "MEMBER"), (6, "MEMBER")],
            },
            DemoTeam {
                id: 3,
                name: "Platform Web",
                description: "Frontend and design system",
                created: day(2024, 3, 27),
                members: vec![(5, "OWNER"), (13, "MEMBER")],
            },
            DemoTeam {
                id: 4,
                name: "Security",
                description: "",
                created: day(2024, 6, 30),
                members: vec![(10, "OWNER"), (11, "ADMIN")],
            },
        ];

        Self {
            users,
            projects,
            tasks,
            teams,
            invitations: Vec::new(),
        }
    }

    fn user_name(&self, id: u64) -> &str {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name)
            .unwrap_or("Unknown")
    }

    fn project_json(&self, project: &DemoProject) -> Value {
        let names: Vec<&str> = project.member_ids.iter().map(|id| self.user_name(*id)).collect();
        let task_count = self.tasks.iter().filter(|t| t.project_id == project.id).count();
        json!({
            "id": project.id,
            "title": project.title,
            "description": project.description,
            "teamMemberNames": names,
            "taskCount": task_count,
            "createdAt": timestamp(project.created),
        })
    }

    fn task_json(&self, task: &DemoTask) -> Value {
        let project_title = self
            .projects
            .iter()
            .find(|p| p.id == task.project_id)
            .map(|p| p.title.as_str())
            .unwrap_or_default();
        json!({
            "id": task.id,
            "title": task.title,
            "description": "",
            "status": task.status,
            "dueDate": timestamp(task.due),
            "createdAt": timestamp(task.created),
            "project": { "id": task.project_id, "title": project_title },
        })
    }

    fn team_json(&self, team: &DemoTeam) -> Value {
        let names: Vec<&str> = team.members.iter().map(|(id, _)| self.user_name(*id)).collect();
        json!({
            "id": team.id,
            "name": team.name,
            "description": team.description,
            "memberNames": names,
            "createdAt": timestamp(team.created),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum DemoError {
    Unauthorized,
    BadRequest(String),
    Domain {
        status: StatusCode,
        code: &'static str,
        message: &'static str,
    },
}

impl DemoError {
    fn not_found(code: &'static str, message: &'static str) -> Self {
        Self::Domain {
            status: StatusCode::NOT_FOUND,
            code,
            message,
        }
    }

    fn conflict(code: &'static str, message: &'static str) -> Self {
        Self::Domain {
            status: StatusCode::CONFLICT,
            code,
            message,
        }
    }
}

impl IntoResponse for DemoError {
    fn into_response(self) -> Response {
        match self {
            DemoError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" })))
                    .into_response()
            }
            DemoError::BadRequest(message) => {
                tracing::debug!("Demo API bad request: {}", message);
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            DemoError::Domain {
                status,
                code,
                message,
            } => (status, Json(json!({ "errorCode": code, "message": message }))).into_response(),
        }
    }
}

type DemoResult<T> = std::result::Result<T, DemoError>;

// ─────────────────────────────────────────────────────────────────────────────
// Request helpers
// ─────────────────────────────────────────────────────────────────────────────

fn authorize(headers: &HeaderMap) -> DemoResult<()> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(DEMO_TOKEN) => Ok(()),
        _ => Err(DemoError::Unauthorized),
    }
}

fn lock(data: &SharedData) -> MutexGuard<'_, DemoData> {
    data.lock().unwrap_or_else(|e| e.into_inner())
}

fn param_date(params: &Params, key: &str) -> DemoResult<Option<NaiveDate>> {
    params
        .get(key)
        .map(|v| {
            NaiveDate::parse_from_str(v, DATE_FORMAT)
                .map_err(|_| DemoError::BadRequest(format!("Invalid date for {}: {}", key, v)))
        })
        .transpose()
}

fn param_usize(params: &Params, key: &str, default: usize) -> DemoResult<usize> {
    match params.get(key) {
        Some(v) => v
            .parse()
            .map_err(|_| DemoError::BadRequest(format!("Invalid {}: {}", key, v))),
        None => Ok(default),
    }
}

fn title_matches(params: &Params, title: &str) -> bool {
    match params.get("title").map(|q| q.trim().to_lowercase()) {
        Some(q) if !q.is_empty() => title.to_lowercase().contains(&q),
        _ => true,
    }
}

fn within(date: NaiveDate, after: Option<NaiveDate>, before: Option<NaiveDate>) -> bool {
    after.map_or(true, |a| date >= a) && before.map_or(true, |b| date <= b)
}

/// Slice `items` per `page`/`size` into a Spring-style page object
fn paged(items: Vec<Value>, params: &Params) -> DemoResult<Json<Value>> {
    let page = param_usize(params, "page", 0)?;
    let size = param_usize(params, "size", DEFAULT_SIZE)?.clamp(1, MAX_SIZE);
    let total = items.len();
    let start = page.saturating_mul(size).min(total);
    let end = (start + size).min(total);

    Ok(Json(json!({
        "content": &items[start..end],
        "number": page,
        "size": size,
        "totalElements": total,
        "last": end >= total,
    })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn list_projects(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> DemoResult<Json<Value>> {
    authorize(&headers)?;
    let after = param_date(&params, "createdAtAfter")?;
    let before = param_date(&params, "createdAtBefore")?;

    let data = lock(&data);
    let items = data
        .projects
        .iter()
        .filter(|p| title_matches(&params, &p.title) && within(p.created, after, before))
        .map(|p| data.project_json(p))
        .collect();
    paged(items, &params)
}

async fn list_tasks(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> DemoResult<Json<Value>> {
    authorize(&headers)?;
    let status = params
        .get("status")
        .map(|s| s.parse::<TaskStatus>())
        .transpose()
        .map_err(|e| DemoError::BadRequest(e.to_string()))?;
    let overdue = params
        .get("isOverdue")
        .map(|v| v.parse::<bool>())
        .transpose()
        .map_err(|e| DemoError::BadRequest(e.to_string()))?;
    let assignee = params
        .get("assignedUserId")
        .map(|v| v.parse::<u64>())
        .transpose()
        .map_err(|e| DemoError::BadRequest(e.to_string()))?;
    let created = (
        param_date(&params, "createdAtAfter")?,
        param_date(&params, "createdAtBefore")?,
    );
    let due = (
        param_date(&params, "dueDateAfter")?,
        param_date(&params, "dueDateBefore")?,
    );
    let concluded = (
        param_date(&params, "conclusionDateAfter")?,
        param_date(&params, "conclusionDateBefore")?,
    );
    let today = Utc::now().date_naive();

    let data = lock(&data);
    let items = data
        .tasks
        .iter()
        .filter(|t| title_matches(&params, t.title))
        .filter(|t| status.map_or(true, |s| t.status == s))
        .filter(|t| {
            overdue.map_or(true, |o| (t.status != TaskStatus::Done && t.due < today) == o)
        })
        .filter(|t| assignee.map_or(true, |id| t.assignee_ids.contains(&id)))
        .filter(|t| within(t.created, created.0, created.1))
        .filter(|t| within(t.due, due.0, due.1))
        .filter(|t| {
            (concluded.0.is_none() && concluded.1.is_none())
                || t.concluded.is_some_and(|c| within(c, concluded.0, concluded.1))
        })
        .map(|t| data.task_json(t))
        .collect();
    paged(items, &params)
}

async fn list_teams(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> DemoResult<Json<Value>> {
    authorize(&headers)?;
    let after = param_date(&params, "createdAtAfter")?;
    let before = param_date(&params, "createdAtBefore")?;

    let data = lock(&data);
    let items = data
        .teams
        .iter()
        .filter(|t| title_matches(&params, t.name) && within(t.created, after, before))
        .map(|t| data.team_json(t))
        .collect();
    paged(items, &params)
}

async fn list_team_members(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Path(team_id): Path<u64>,
    Query(params): Query<Params>,
) -> DemoResult<Json<Value>> {
    authorize(&headers)?;
    let data = lock(&data);
    let team = data
        .teams
        .iter()
        .find(|t| t.id == team_id)
        .ok_or_else(|| DemoError::not_found("TEAM_NOT_FOUND", "Team not found"))?;

    let items = team
        .members
        .iter()
        .filter_map(|(id, role)| {
            let user = data.users.iter().find(|u| u.id == *id)?;
            Some(json!({
                "userId": user.id,
                "username": user.name,
                "email": user.email,
                "teamRole": role,
            }))
        })
        .collect();
    paged(items, &params)
}

#[derive(Debug, Deserialize)]
struct CreateProjectBody {
    title: String,
    #[serde(default)]
    description: String,
}

async fn create_project(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Json(body): Json<CreateProjectBody>,
) -> DemoResult<(StatusCode, Json<Value>)> {
    authorize(&headers)?;
    let title = body.title.trim();
    if title.is_empty() {
        return Err(DemoError::BadRequest("Title is required".to_string()));
    }

    let mut data = lock(&data);
    if data
        .projects
        .iter()
        .any(|p| p.title.eq_ignore_ascii_case(title))
    {
        return Err(DemoError::conflict(
            "PROJECT_TITLE_ALREADY_EXISTS",
            "Project title already exists",
        ));
    }

    let project = DemoProject {
        id: data.projects.iter().map(|p| p.id).max().unwrap_or(0) + 1,
        title: title.to_string(),
        description: body.description,
        created: Utc::now().date_naive(),
        member_ids: vec![1],
    };
    let body = data.project_json(&project);
    data.projects.push(project);
    tracing::info!("Demo API created project: {}", title);
    Ok((StatusCode::CREATED, Json(body)))
}

#[derive(Debug, Deserialize)]
struct InviteBody {
    email: String,
}

/// Record an invitation for `email`, rejecting unknown users and existing members
fn invite(
    data: &mut DemoData,
    resource: String,
    member_ids: Vec<u64>,
    email: &str,
) -> DemoResult<()> {
    let email = email.trim();
    if !email.contains('@') {
        return Err(DemoError::Domain {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_EMAIL",
            message: "Invalid email",
        });
    }
    let user_id = data
        .users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(email))
        .map(|u| u.id)
        .ok_or_else(|| DemoError::not_found("USER_NOT_FOUND", "User not found"))?;

    if member_ids.contains(&user_id) {
        return Err(DemoError::conflict("USER_ALREADY_MEMBER", "User is already a member"));
    }
    let key = (resource, email.to_lowercase());
    if data.invitations.contains(&key) {
        return Err(DemoError::conflict(
            "INVITATION_ALREADY_SENT",
            "Invitation already sent",
        ));
    }
    data.invitations.push(key);
    Ok(())
}

async fn invite_to_project(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Path(project_id): Path<u64>,
    Json(body): Json<InviteBody>,
) -> DemoResult<Json<Value>> {
    authorize(&headers)?;
    let mut data = lock(&data);
    let member_ids = data
        .projects
        .iter()
        .find(|p| p.id == project_id)
        .map(|p| p.member_ids.clone())
        .ok_or_else(|| DemoError::not_found("PROJECT_NOT_FOUND", "Project not found"))?;
    invite(
        &mut data,
        format!("projects/{}", project_id),
        member_ids,
        &body.email,
    )?;
    Ok(Json(json!({ "email": body.email.trim(), "status": "INVITED" })))
}

async fn invite_to_team(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Path(team_id): Path<u64>,
    Json(body): Json<InviteBody>,
) -> DemoResult<StatusCode> {
    authorize(&headers)?;
    let mut data = lock(&data);
    let member_ids = data
        .teams
        .iter()
        .find(|t| t.id == team_id)
        .map(|t| t.members.iter().map(|(id, _)| *id).collect())
        .ok_or_else(|| DemoError::not_found("TEAM_NOT_FOUND", "Team not found"))?;
    invite(&mut data, format!("teams/{}", team_id), member_ids, &body.email)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_team(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Path((project_id, team_id)): Path<(u64, u64)>,
) -> DemoResult<StatusCode> {
    authorize(&headers)?;
    let mut data = lock(&data);
    let team_members: Vec<u64> = data
        .teams
        .iter()
        .find(|t| t.id == team_id)
        .map(|t| t.members.iter().map(|(id, _)| *id).collect())
        .ok_or_else(|| DemoError::not_found("TEAM_NOT_FOUND", "Team not found"))?;
    let project = data
        .projects
        .iter_mut()
        .find(|p| p.id == project_id)
        .ok_or_else(|| DemoError::not_found("PROJECT_NOT_FOUND", "Project not found"))?;

    for id in team_members {
        if !project.member_ids.contains(&id) {
            project.member_ids.push(id);
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

fn router(data: SharedData) -> Router {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id/invite", post(invite_to_project))
        .route("/projects/:id/import-team/:team_id", post(import_team))
        .route("/tasks", get(list_tasks))
        .route("/teams", get(list_teams))
        .route("/teams/:id/members", get(list_team_members))
        .route("/teams/:id/invite", post(invite_to_team))
        .with_state(data)
}

// ─────────────────────────────────────────────────────────────────────────────
// Server handle
// ─────────────────────────────────────────────────────────────────────────────

/// Running demo API; shuts down when dropped
#[derive(Debug)]
pub struct DemoServer {
    addr: SocketAddr,
    data: SharedData,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl DemoServer {
    /// Bind an ephemeral localhost port and start serving seeded data
    pub async fn spawn() -> Result<Self> {
        let data: SharedData = Arc::new(Mutex::new(DemoData::seeded()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind demo API")?;
        let addr = listener
            .local_addr()
            .context("Failed to read demo API address")?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = router(data.clone());
        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_rx.await.ok();
                })
                .await;
            if let Err(e) = served {
                tracing::error!("Demo API error: {}", e);
            }
            tracing::debug!("Demo API shut down");
        });

        tracing::info!("Demo API listening on {}", addr);
        Ok(Self {
            addr,
            data,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn project_count(&self) -> usize {
        lock(&self.data).projects.len()
    }
}

impl Drop for DemoServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
