//! Command runners: wire config, session, transport and controllers together

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use std::sync::Arc;

use crate::api::{
    ActionError, ApiClient, FileTokenStore, MemoryTokenStore, Session, SubscriptionId,
};
use crate::browse;
use crate::cli::{BrowseTarget, Cli, Commands, ListArgs, OutputArgs};
use crate::collection::{CollectionController, FetchOutcome, PageSource};
use crate::config::Config;
use crate::demo::{DemoServer, DEMO_TOKEN};
use crate::domain::projects::{self, NewProject};
use crate::domain::tasks::tasks_controller;
use crate::domain::teams::{self, team_members_controller, teams_controller};
use crate::domain::ListRow;
use crate::filters::FilterCriteria;

const SIGNED_OUT_HINT: &str = "Not signed in. Run `teamtacles login --token <TOKEN>` first.";

/// Everything a command needs: resolved config and a client bound to a session
pub struct Context {
    config: Config,
    client: Arc<ApiClient>,
    /// Keeps the demo API alive for the duration of the command
    _demo: Option<DemoServer>,
}

impl Context {
    /// Connect to the configured API, or to a fresh demo server
    pub async fn connect(config: Config, demo: bool) -> Result<Self> {
        let (base_url, session, demo_server) = if demo {
            let server = DemoServer::spawn().await?;
            let session = Session::new(MemoryTokenStore::with_token(DEMO_TOKEN));
            (server.base_url(), session, Some(server))
        } else {
            let session = Session::new(FileTokenStore::new(&config.token_path));
            (config.api_url.clone(), session, None)
        };

        let client = ApiClient::new(base_url, config.request_timeout(), Arc::new(session))?;
        Ok(Self {
            config,
            client: Arc::new(client),
            _demo: demo_server,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        self.client.session()
    }

    fn require_session(&self) -> Result<()> {
        if !self.session().is_authenticated() {
            bail!(SIGNED_OUT_HINT);
        }
        Ok(())
    }
}

/// Signs a controller out when the server rejects the session; unsubscribes on drop
pub struct SessionWatch {
    session: Arc<Session>,
    id: SubscriptionId,
}

impl SessionWatch {
    pub fn new<S, T>(session: &Arc<Session>, controller: &Arc<CollectionController<S, T>>) -> Self
    where
        S: PageSource + 'static,
        T: Send + 'static,
    {
        let controller = controller.clone();
        let id = session.subscribe(move || controller.sign_out());
        Self {
            session: session.clone(),
            id,
        }
    }
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        self.session.unsubscribe(self.id);
    }
}

/// Run any command other than `config`
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let ctx = Context::connect(config, cli.demo).await?;
    let page_size = ctx.config.collections.page_size;

    match cli.command {
        Commands::Config { .. } => Ok(()),
        Commands::Login { token } => login(&ctx, &token, cli.demo),
        Commands::Logout => logout(&ctx, cli.demo),
        Commands::Projects(args) => {
            let controller = Arc::new(projects::projects_controller(ctx.client.clone(), page_size));
            list(&ctx, controller, &args, args.criteria(), false).await
        }
        Commands::Tasks(args) => {
            let controller = Arc::new(tasks_controller(ctx.client.clone(), page_size));
            list(&ctx, controller, &args.list, args.criteria(), false).await
        }
        Commands::Teams(args) => {
            let controller = Arc::new(teams_controller(ctx.client.clone(), page_size));
            let local = ctx.config.collections.teams_local_filter;
            list(&ctx, controller, &args, args.criteria(), local).await
        }
        Commands::Members { team_id, output } => {
            let controller = Arc::new(team_members_controller(
                ctx.client.clone(),
                team_id,
                ctx.config.collections.member_page_size,
            ));
            let args = ListArgs {
                title: None,
                created_after: None,
                created_before: None,
                output,
            };
            list(&ctx, controller, &args, FilterCriteria::default(), false).await
        }
        Commands::Browse { collection } => browse_collection(&ctx, collection).await,
        Commands::CreateProject { title, description } => {
            ctx.require_session()?;
            let created = projects::create_project(&ctx.client, &NewProject { title, description })
                .await
                .map_err(action_failed)?;
            println!("Created project #{} \"{}\"", created.id, created.title);
            Ok(())
        }
        Commands::Invite {
            project,
            team,
            email,
        } => {
            ctx.require_session()?;
            match (project, team) {
                (Some(project_id), _) => {
                    projects::invite_to_project(&ctx.client, project_id, &email)
                        .await
                        .map_err(action_failed)?;
                    println!("Invitation sent to {} for project #{}", email, project_id);
                }
                (None, Some(team_id)) => {
                    teams::invite_to_team(&ctx.client, team_id, &email)
                        .await
                        .map_err(action_failed)?;
                    println!("Invitation sent to {} for team #{}", email, team_id);
                }
                (None, None) => bail!("Pass --project or --team"),
            }
            Ok(())
        }
        Commands::ImportTeam { project, team } => {
            ctx.require_session()?;
            projects::import_team_into_project(&ctx.client, project, team)
                .await
                .map_err(action_failed)?;
            println!("Imported team #{} into project #{}", team, project);
            Ok(())
        }
    }
}

/// Mutation failures surface their user-facing message only
fn action_failed(err: ActionError) -> anyhow::Error {
    tracing::debug!(status = ?err.cause.status(), "Action failed: {}", err.cause);
    anyhow::anyhow!(err.message)
}

fn login(ctx: &Context, token: &str, demo: bool) -> Result<()> {
    if demo {
        bail!("Demo mode signs in automatically; login is not needed");
    }
    ctx.session().sign_in(token)?;
    println!("Signed in. Token stored at {}", ctx.config.token_path.display());
    Ok(())
}

fn logout(ctx: &Context, demo: bool) -> Result<()> {
    if demo {
        bail!("Demo mode has no stored token");
    }
    ctx.session().sign_out()?;
    println!("Signed out.");
    Ok(())
}

/// Load `pages` pages into `controller`, stopping early at the end or on failure
async fn load_pages<S, T>(controller: &CollectionController<S, T>, pages: usize) -> FetchOutcome
where
    S: PageSource,
{
    let mut outcome = controller
        .set_authenticated(true)
        .await
        .unwrap_or(FetchOutcome::Superseded);

    for _ in 1..pages.max(1) {
        if !matches!(outcome, FetchOutcome::Loaded { .. }) || !controller.has_more() {
            break;
        }
        outcome = controller.load_more().await;
    }
    outcome
}

async fn list<S, T>(
    ctx: &Context,
    controller: Arc<CollectionController<S, T>>,
    args: &ListArgs,
    filters: FilterCriteria,
    local_filter: bool,
) -> Result<()>
where
    S: PageSource + 'static,
    T: ListRow + Serialize + Clone + Send + 'static,
{
    ctx.require_session()?;
    let _watch = SessionWatch::new(ctx.session(), &controller);
    let output: &OutputArgs = &args.output;

    // Signed out, so these only record the query for the first load
    controller.apply_filters(filters).await;
    if let Some(title) = &args.title {
        controller.search_by_title(title.trim()).await;
    }

    let outcome = load_pages(&controller, output.pages).await;

    if !ctx.session().is_authenticated() {
        bail!("Your session has expired. Run `teamtacles login --token <TOKEN>` again.");
    }
    if outcome == FetchOutcome::Failed && controller.is_empty() {
        bail!(
            "Could not load {} from {}",
            controller.source().name(),
            ctx.client.base_url()
        );
    }

    if output.json {
        let state = controller.snapshot();
        let shown =
            browse::visible(&state.items, &state.title_query, &state.filters, local_filter);
        let rendered = serde_json::to_string_pretty(&shown)
            .context("Failed to serialize items")?;
        println!("{}", rendered);
    } else {
        browse::print_listing(&controller, local_filter);
    }
    Ok(())
}

async fn browse_collection(ctx: &Context, target: BrowseTarget) -> Result<()> {
    ctx.require_session()?;
    let collections = &ctx.config.collections;
    let debounce = collections.search_debounce();
    let client = ctx.client.clone();

    match target {
        BrowseTarget::Projects => {
            let controller = Arc::new(projects::projects_controller(client, collections.page_size));
            browse_with(ctx, controller, debounce, false).await
        }
        BrowseTarget::Tasks => {
            let controller = Arc::new(tasks_controller(client, collections.page_size));
            browse_with(ctx, controller, debounce, false).await
        }
        BrowseTarget::Teams => {
            let controller = Arc::new(teams_controller(client, collections.page_size));
            browse_with(ctx, controller, debounce, collections.teams_local_filter).await
        }
    }
}

async fn browse_with<S, T>(
    ctx: &Context,
    controller: Arc<CollectionController<S, T>>,
    debounce: std::time::Duration,
    local_filter: bool,
) -> Result<()>
where
    S: PageSource + 'static,
    T: ListRow + Clone + Send + 'static,
{
    let _watch = SessionWatch::new(ctx.session(), &controller);
    controller.set_authenticated(true).await;
    browse::run(controller, debounce, local_filter).await
}
