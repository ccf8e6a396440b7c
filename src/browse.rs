//! Interactive collection browser
//!
//! Reads commands from stdin and drives one [`CollectionController`].
//! `search` input is debounced: each new search restarts the quiet period and
//! only the last query is sent once it elapses.

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{sleep_until, Instant};

use crate::collection::{CollectionController, FetchOutcome, PageSource, SkipReason};
use crate::domain::ListRow;
use crate::filters::FilterCriteria;
use crate::util::Debouncer;

const HELP: &str = "\
Commands:
  more | m                 load the next page
  refresh | r              reload from the first page
  search <text>            search by title (empty text clears the search)
  filter key=value ...     set filters, e.g. status=DONE dueDateBefore=2024-06-30
  clear                    drop all filters and the search
  show | s                 print the current list
  help | ?                 this text
  quit | q                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    More,
    Refresh,
    Search(String),
    Filter(Vec<String>),
    Clear,
    Show,
    Help,
    Quit,
}

/// Parse one input line; blank lines mean `Show`
pub fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" | "show" | "s" => BrowseCommand::Show,
        "more" | "m" => BrowseCommand::More,
        "refresh" | "r" => BrowseCommand::Refresh,
        "search" | "/" => BrowseCommand::Search(rest.to_string()),
        "filter" | "f" => {
            if rest.is_empty() {
                return Err("filter needs at least one key=value".to_string());
            }
            BrowseCommand::Filter(rest.split_whitespace().map(str::to_string).collect())
        }
        "clear" => BrowseCommand::Clear,
        "help" | "?" => BrowseCommand::Help,
        "quit" | "q" | "exit" => BrowseCommand::Quit,
        other => return Err(format!("Unknown command '{}' (try help)", other)),
    };
    Ok(command)
}

/// Items to display, re-filtered locally when enabled
pub fn visible<'a, T: ListRow>(
    items: &'a [T],
    title_query: &str,
    filters: &FilterCriteria,
    local_filter: bool,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| !local_filter || item.locally_visible(title_query, filters))
        .collect()
}

/// Print the current state of a controller
pub fn print_listing<S, T>(controller: &CollectionController<S, T>, local_filter: bool)
where
    S: PageSource,
    T: ListRow + Clone,
{
    let state = controller.snapshot();
    let shown = visible(&state.items, &state.title_query, &state.filters, local_filter);

    for item in &shown {
        println!("{}", item.row());
    }

    let mut footer = format!(
        "-- {}: {} shown",
        controller.source().name(),
        shown.len()
    );
    if shown.len() != state.items.len() {
        footer.push_str(&format!(" of {} loaded", state.items.len()));
    }
    if !state.title_query.is_empty() {
        footer.push_str(&format!(", title~{:?}", state.title_query));
    }
    if !state.filters.is_empty() {
        footer.push_str(&format!(", filters: {}", state.filters));
    }
    footer.push_str(if state.has_more {
        ", more available"
    } else {
        ", end of list"
    });
    println!("{}", footer);
}

fn report(outcome: FetchOutcome) {
    match outcome {
        FetchOutcome::Loaded { .. } | FetchOutcome::Superseded => {}
        FetchOutcome::Skipped(SkipReason::Exhausted) => println!("Already at the end of the list."),
        FetchOutcome::Skipped(SkipReason::Busy) => println!("Still loading, try again."),
        FetchOutcome::Skipped(SkipReason::NotAuthenticated) => {
            println!("Signed out. Run `teamtacles login --token <TOKEN>`.")
        }
        FetchOutcome::Failed => println!("Request failed; see log output."),
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn prompt(name: &str) {
    print!("{}> ", name);
    let _ = std::io::stdout().flush();
}

/// Run the browse loop on stdin until `quit`, end of input or sign-out
pub async fn run<S, T>(
    controller: Arc<CollectionController<S, T>>,
    debounce: Duration,
    local_filter: bool,
) -> Result<()>
where
    S: PageSource,
    T: ListRow + Clone,
{
    let input = BufReader::new(tokio::io::stdin());
    drive(controller, input, debounce, local_filter).await
}

/// Browse loop over any line-oriented input
async fn drive<S, T, R>(
    controller: Arc<CollectionController<S, T>>,
    input: R,
    debounce: Duration,
    local_filter: bool,
) -> Result<()>
where
    S: PageSource,
    T: ListRow + Clone,
    R: AsyncBufRead + Unpin,
{
    let name = controller.source().name();
    let mut lines = input.lines();
    let mut pending_search: Debouncer<String> = Debouncer::new(debounce);

    print_listing(&controller, local_filter);
    println!("Type `help` for commands.");

    loop {
        if !controller.is_authenticated() {
            println!("Session ended. Run `teamtacles login --token <TOKEN>` to sign in again.");
            return Ok(());
        }
        if !pending_search.is_pending() {
            prompt(name);
        }

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = wait_until(pending_search.deadline()) => {
                if let Some(query) = pending_search.take_due(Instant::now()) {
                    tracing::debug!("{}: debounced search {:?}", name, query);
                    println!();
                    report(controller.search_by_title(query).await);
                    print_listing(&controller, local_filter);
                }
                continue;
            }
        };

        let Some(line) = line else {
            return Ok(());
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            BrowseCommand::Quit => return Ok(()),
            BrowseCommand::Help => println!("{}", HELP),
            BrowseCommand::Show => print_listing(&controller, local_filter),
            BrowseCommand::Search(query) => {
                pending_search.push(query, Instant::now());
            }
            BrowseCommand::More => {
                report(controller.load_more().await);
                print_listing(&controller, local_filter);
            }
            BrowseCommand::Refresh => {
                report(controller.refresh().await);
                print_listing(&controller, local_filter);
            }
            BrowseCommand::Clear => {
                pending_search.flush();
                report(controller.clear_filters().await);
                print_listing(&controller, local_filter);
            }
            BrowseCommand::Filter(assignments) => {
                let mut filters = controller.filters();
                let parsed: Result<()> = assignments
                    .iter()
                    .try_for_each(|assignment| filters.set_from_str(assignment));
                match parsed {
                    Ok(()) => {
                        report(controller.apply_filters(filters).await);
                        print_listing(&controller, local_filter);
                    }
                    Err(e) => println!("{:#}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, PageEnvelope};
    use crate::collection::PageRequest;
    use std::sync::Mutex;
    use tokio::io::AsyncWriteExt;

    #[derive(Debug, Clone)]
    struct Row(&'static str);

    /// Records the title of every request and answers with one final page
    #[derive(Default)]
    struct TitleLog {
        titles: Mutex<Vec<String>>,
    }

    impl TitleLog {
        fn titles(&self) -> Vec<String> {
            self.titles.lock().unwrap().clone()
        }
    }

    impl PageSource for TitleLog {
        type Raw = Row;

        fn name(&self) -> &'static str {
            "log"
        }

        async fn fetch_page(&self, request: &PageRequest) -> Result<PageEnvelope<Row>, ApiError> {
            self.titles.lock().unwrap().push(request.title.clone());
            Ok(PageEnvelope::new(vec![Row("only")], true))
        }
    }

    async fn signed_in() -> Arc<CollectionController<TitleLog, Row>> {
        let controller = Arc::new(CollectionController::new(TitleLog::default()));
        controller.set_authenticated(true).await;
        controller
    }

    impl ListRow for Row {
        fn row(&self) -> String {
            self.0.to_string()
        }

        fn locally_visible(&self, title_query: &str, _filters: &FilterCriteria) -> bool {
            self.0.contains(title_query)
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  more "), Ok(BrowseCommand::More));
        assert_eq!(parse_command("R"), Ok(BrowseCommand::Refresh));
        assert_eq!(parse_command(""), Ok(BrowseCommand::Show));
        assert_eq!(
            parse_command("search  web  redesign "),
            Ok(BrowseCommand::Search("web  redesign".to_string()))
        );
        assert_eq!(
            parse_command("search"),
            Ok(BrowseCommand::Search(String::new()))
        );
        assert_eq!(
            parse_command("filter status=DONE createdAtAfter=2024-01-01"),
            Ok(BrowseCommand::Filter(vec![
                "status=DONE".to_string(),
                "createdAtAfter=2024-01-01".to_string()
            ]))
        );
        assert_eq!(parse_command("q"), Ok(BrowseCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("filter").is_err());
        assert!(parse_command("delete everything").is_err());
    }

    #[test]
    fn test_visible_respects_local_filter_flag() {
        let rows = [Row("alpha"), Row("beta"), Row("alphabet")];
        let filters = FilterCriteria::default();

        let on: Vec<&str> = visible(&rows, "alpha", &filters, true)
            .iter()
            .map(|r| r.0)
            .collect();
        assert_eq!(on, vec!["alpha", "alphabet"]);

        assert_eq!(visible(&rows, "alpha", &filters, false).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_burst_sends_one_request_with_last_query() {
        let controller = signed_in().await;
        let (mut input, reader) = tokio::io::duplex(256);

        let typist = tokio::spawn(async move {
            input
                .write_all(b"search w\nsearch web\nsearch website\n")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            input.write_all(b"quit\n").await.unwrap();
        });

        drive(
            controller.clone(),
            BufReader::new(reader),
            Duration::from_millis(500),
            false,
        )
        .await
        .unwrap();
        typist.await.unwrap();

        assert_eq!(controller.source().titles(), vec!["", "website"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_searches_each_fire() {
        let controller = signed_in().await;
        let (mut input, reader) = tokio::io::duplex(256);

        let typist = tokio::spawn(async move {
            input.write_all(b"search alpha\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            input.write_all(b"search beta\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            input.write_all(b"q\n").await.unwrap();
        });

        drive(
            controller.clone(),
            BufReader::new(reader),
            Duration::from_millis(500),
            false,
        )
        .await
        .unwrap();
        typist.await.unwrap();

        assert_eq!(controller.source().titles(), vec!["", "alpha", "beta"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_pending_search() {
        let controller = signed_in().await;
        let (mut input, reader) = tokio::io::duplex(256);

        let typist = tokio::spawn(async move {
            input.write_all(b"search stale\nclear\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            input.write_all(b"quit\n").await.unwrap();
        });

        drive(
            controller.clone(),
            BufReader::new(reader),
            Duration::from_millis(500),
            false,
        )
        .await
        .unwrap();
        typist.await.unwrap();

        // Initial load, then the refetch from `clear`
        assert_eq!(controller.source().titles(), vec!["", ""]);
    }
}
