// CLI module - command-line argument parsing and config handlers
//
// Collection and mutation commands are dispatched to `commands`; the config
// subcommands are handled here synchronously:
// - config --show: Display effective configuration
// - config --reset: Regenerate config file with defaults
// - config --path: Show config file path

use crate::config::{Config, VERSION};
use crate::filters::{FilterCriteria, TaskStatus};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;

/// TeamTacles - projects, tasks and teams from the terminal
#[derive(Debug, Parser)]
#[command(name = "teamtacles")]
#[command(version = VERSION)]
#[command(about = "Browse TeamTacles projects, tasks and teams", long_about = None)]
pub struct Cli {
    /// Run against a local demo API with seeded data
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Store a bearer token for later commands
    Login {
        #[arg(long)]
        token: String,
    },

    /// Forget the stored token
    Logout,

    /// List projects
    Projects(ListArgs),

    /// List tasks
    Tasks(TaskListArgs),

    /// List teams
    Teams(ListArgs),

    /// List the members of a team
    Members {
        team_id: u64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Interactive list with paging, search and filters
    Browse {
        #[arg(value_enum)]
        collection: BrowseTarget,
    },

    /// Create a project
    CreateProject {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Invite a user by email to a project or a team
    Invite {
        #[arg(long, conflicts_with = "team", required_unless_present = "team")]
        project: Option<u64>,

        #[arg(long)]
        team: Option<u64>,

        #[arg(long)]
        email: String,
    },

    /// Add every member of a team to a project
    ImportTeam {
        #[arg(long)]
        project: u64,

        #[arg(long)]
        team: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BrowseTarget {
    Projects,
    Tasks,
    Teams,
}

/// Paging and output format
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    /// Print items as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options shared by every list command
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Title substring to search for
    #[arg(long)]
    pub title: Option<String>,

    /// Only items created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub created_after: Option<NaiveDate>,

    /// Only items created on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub created_before: Option<NaiveDate>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl ListArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            created_at_after: self.created_after,
            created_at_before: self.created_before,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TaskListArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// TO_DO, IN_PROGRESS or DONE
    #[arg(long)]
    pub status: Option<TaskStatus>,

    /// Only tasks past their due date
    #[arg(long)]
    pub overdue: bool,

    /// Only tasks assigned to this user id
    #[arg(long)]
    pub assigned: Option<u64>,

    #[arg(long)]
    pub due_after: Option<NaiveDate>,

    #[arg(long)]
    pub due_before: Option<NaiveDate>,

    #[arg(long)]
    pub concluded_after: Option<NaiveDate>,

    #[arg(long)]
    pub concluded_before: Option<NaiveDate>,
}

impl TaskListArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            status: self.status,
            is_overdue: self.overdue.then_some(true),
            assigned_user_id: self.assigned,
            due_date_after: self.due_after,
            due_date_before: self.due_before,
            conclusion_date_after: self.concluded_after,
            conclusion_date_before: self.concluded_before,
            ..self.list.criteria()
        }
    }
}

/// Handle the config subcommand. Returns true if it was handled (exit after).
pub fn handle_config_command(command: &Commands) -> bool {
    let Commands::Config { show, reset, path } = command else {
        return false;
    };

    if *path {
        handle_config_path();
    } else if *show {
        handle_config_show();
    } else if *reset {
        handle_config_reset();
    } else {
        println!("Usage: teamtacles config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
    }
    true
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    let rendered = config.to_toml();
    for line in rendered.lines().filter(|l| !l.trim_start().starts_with('#')) {
        println!("{}", line);
    }

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}
