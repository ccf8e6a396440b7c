//! Teams collection, team-member sub-lists and team invitations

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{initials, member_chips, parse_timestamp, ListRow, Member};
use crate::api::{ActionError, ApiClient, ApiError, PageEnvelope};
use crate::collection::{CollectionController, PageRequest, PageSource};
use crate::filters::{FilterCriteria, FilterKey};

/// Filter keys `GET /teams` understands
pub const TEAM_FILTERS: [FilterKey; 2] = [FilterKey::CreatedAtAfter, FilterKey::CreatedAtBefore];

/// Team record as returned by `GET /teams`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_names: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Team list item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub members: Vec<Member>,
    /// Server creation time, or the fetch time when the server sent none
    pub created_at: DateTime<Utc>,
    /// False when `created_at` is the fetch-time fallback
    #[serde(skip)]
    pub created_at_reported: bool,
}

impl TeamSummary {
    pub fn from_raw(raw: RawTeam, fetched_at: DateTime<Utc>) -> Self {
        let reported = raw.created_at.as_deref().and_then(parse_timestamp);
        Self {
            id: raw.id,
            title: raw.name,
            description: raw.description.unwrap_or_default(),
            members: Member::from_names(raw.member_names),
            created_at: reported.unwrap_or(fetched_at),
            created_at_reported: reported.is_some(),
        }
    }
}

impl ListRow for TeamSummary {
    fn row(&self) -> String {
        format!(
            "#{:<5} {:<32} {:>2} member(s)  [{}]",
            self.id,
            self.title,
            self.members.len(),
            member_chips(&self.members, 4)
        )
    }

    fn locally_visible(&self, title_query: &str, filters: &FilterCriteria) -> bool {
        LocalTeamFilter::new(title_query, filters).matches(self)
    }
}

/// Client-side re-filter of already fetched teams
///
/// Case-insensitive title substring plus inclusive creation-date bounds.
/// Teams without a server creation time always pass the date bounds.
/// Display-time only; never alters the controller's items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalTeamFilter {
    title: String,
    created_after: Option<NaiveDate>,
    created_before: Option<NaiveDate>,
}

impl LocalTeamFilter {
    pub fn new(title_query: &str, filters: &FilterCriteria) -> Self {
        Self {
            title: title_query.trim().to_lowercase(),
            created_after: filters.created_at_after,
            created_before: filters.created_at_before,
        }
    }

    pub fn matches(&self, team: &TeamSummary) -> bool {
        if !self.title.is_empty() && !team.title.to_lowercase().contains(&self.title) {
            return false;
        }
        if !team.created_at_reported {
            return true;
        }
        let created = team.created_at.date_naive();
        if self.created_after.is_some_and(|after| created < after) {
            return false;
        }
        if self.created_before.is_some_and(|before| created > before) {
            return false;
        }
        true
    }
}

/// `GET /teams`
#[derive(Debug, Clone)]
pub struct TeamsSource {
    client: Arc<ApiClient>,
}

impl TeamsSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl PageSource for TeamsSource {
    type Raw = RawTeam;

    fn name(&self) -> &'static str {
        "teams"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<PageEnvelope<RawTeam>, ApiError> {
        self.client
            .get_page("/teams", &request.query_pairs(&TEAM_FILTERS))
            .await
    }
}

pub type TeamsController = CollectionController<TeamsSource, TeamSummary>;

pub fn teams_controller(client: Arc<ApiClient>, page_size: usize) -> TeamsController {
    CollectionController::with_mapper(TeamsSource::new(client), |raw| {
        TeamSummary::from_raw(raw, Utc::now())
    })
    .with_page_size(page_size)
}

// ─────────────────────────────────────────────────────────────────────────────
// Team members
// ─────────────────────────────────────────────────────────────────────────────

/// Member record as returned by `GET /teams/{id}/members`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTeamMember {
    pub user_id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub team_role: Option<String>,
}

/// Team member list item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMember {
    pub user_id: u64,
    pub name: String,
    pub initials: String,
    pub email: String,
    pub role: String,
}

impl From<RawTeamMember> for TeamMember {
    fn from(raw: RawTeamMember) -> Self {
        Self {
            user_id: raw.user_id,
            initials: initials(&raw.username),
            name: raw.username,
            email: raw.email.unwrap_or_default(),
            role: raw.team_role.unwrap_or_else(|| "MEMBER".to_string()),
        }
    }
}

impl ListRow for TeamMember {
    fn row(&self) -> String {
        format!(
            "({:<2}) {:<24} {:<10} {}",
            self.initials, self.name, self.role, self.email
        )
    }
}

/// `GET /teams/{id}/members`
#[derive(Debug, Clone)]
pub struct TeamMembersSource {
    client: Arc<ApiClient>,
    team_id: u64,
}

impl TeamMembersSource {
    pub fn new(client: Arc<ApiClient>, team_id: u64) -> Self {
        Self { client, team_id }
    }
}

impl PageSource for TeamMembersSource {
    type Raw = RawTeamMember;

    fn name(&self) -> &'static str {
        "team-members"
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> Result<PageEnvelope<RawTeamMember>, ApiError> {
        self.client
            .get_page(
                &format!("/teams/{}/members", self.team_id),
                &request.query_pairs(&[]),
            )
            .await
    }
}

pub type TeamMembersController = CollectionController<TeamMembersSource, TeamMember>;

pub fn team_members_controller(
    client: Arc<ApiClient>,
    team_id: u64,
    page_size: usize,
) -> TeamMembersController {
    CollectionController::with_mapper(TeamMembersSource::new(client, team_id), TeamMember::from)
        .with_page_size(page_size)
}

#[derive(Debug, Serialize)]
struct InviteBody<'a> {
    email: &'a str,
}

/// Invite a user to a team by email
pub async fn invite_to_team(
    client: &ApiClient,
    team_id: u64,
    email: &str,
) -> Result<(), ActionError> {
    client
        .post_ack(
            &format!("/teams/{}/invite", team_id),
            &InviteBody { email: email.trim() },
        )
        .await?;
    tracing::info!("Invited {} to team #{}", email.trim(), team_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryTokenStore, Session};
    use crate::collection::MEMBER_PAGE_SIZE;
    use crate::demo::{DemoServer, DEMO_TOKEN};
    use chrono::TimeZone;
    use std::time::Duration;

    fn team(id: u64, name: &str, created: (i32, u32, u32)) -> TeamSummary {
        TeamSummary {
            id,
            title: name.to_string(),
            description: String::new(),
            members: Vec::new(),
            created_at: Utc
                .with_ymd_and_hms(created.0, created.1, created.2, 15, 0, 0)
                .unwrap(),
            created_at_reported: true,
        }
    }

    #[test]
    fn test_from_raw_maps_name_to_title() {
        let raw: RawTeam = serde_json::from_value(serde_json::json!({
            "id": 2,
            "name": "Platform",
            "memberNames": ["Ada Lovelace", "Linus Torvalds"],
            "createdAt": "2024-02-03T04:05:06Z"
        }))
        .unwrap();
        let team = TeamSummary::from_raw(raw, Utc::now());

        assert_eq!(team.title, "Platform");
        assert_eq!(team.members[1].initials, "LT");
        assert_eq!(team.created_at.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
    }

    #[test]
    fn test_local_filter_title_and_dates() {
        let teams = vec![
            team(1, "Platform Core", (2024, 1, 10)),
            team(2, "Mobile", (2024, 3, 1)),
            team(3, "platform web", (2024, 5, 20)),
        ];

        let by_title = LocalTeamFilter::new("PLATFORM", &FilterCriteria::default());
        let ids: Vec<u64> = teams
            .iter()
            .filter(|t| by_title.matches(t))
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);

        let filters = FilterCriteria {
            created_at_after: NaiveDate::from_ymd_opt(2024, 1, 10),
            created_at_before: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        let by_date = LocalTeamFilter::new("", &filters);
        let ids: Vec<u64> = teams
            .iter()
            .filter(|t| by_date.matches(t))
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![1, 2], "bounds are inclusive");

        assert!(!teams[2].locally_visible("", &filters));
        assert!(teams[2].locally_visible("web", &FilterCriteria::default()));
    }

    #[test]
    fn test_missing_created_at_passes_date_bounds() {
        let raw: RawTeam = serde_json::from_value(serde_json::json!({
            "id": 9,
            "name": "Legacy"
        }))
        .unwrap();
        let fetched_at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let team = TeamSummary::from_raw(raw, fetched_at);
        assert_eq!(team.created_at, fetched_at);
        assert!(!team.created_at_reported);

        let past = FilterCriteria {
            created_at_before: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(team.locally_visible("", &past));
        assert!(!team.locally_visible("platform", &past));
    }

    #[test]
    fn test_member_mapping_defaults() {
        let member = TeamMember::from(RawTeamMember {
            user_id: 5,
            username: "grace hopper".into(),
            email: None,
            team_role: None,
        });
        assert_eq!(member.initials, "GH");
        assert_eq!(member.role, "MEMBER");
        assert_eq!(member.email, "");
    }

    #[tokio::test]
    async fn test_team_members_use_member_page_size() {
        let server = DemoServer::spawn().await.unwrap();
        let session = Arc::new(Session::new(MemoryTokenStore::with_token(DEMO_TOKEN)));
        let client =
            Arc::new(ApiClient::new(server.base_url(), Duration::from_secs(5), session).unwrap());

        let controller = team_members_controller(client.clone(), 1, MEMBER_PAGE_SIZE);
        controller.set_authenticated(true).await;
        assert_eq!(controller.len(), MEMBER_PAGE_SIZE);
        assert!(controller.has_more());

        controller.load_more().await;
        assert!(controller.len() > MEMBER_PAGE_SIZE);
        assert!(!controller.has_more());

        invite_to_team(&client, 1, "someone@example.com").await.unwrap();
        let err = invite_to_team(&client, 1, "ada@teamtacles.dev")
            .await
            .unwrap_err();
        assert_eq!(err.message, "This user is already a member.");
    }
}
