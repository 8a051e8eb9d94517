/*
[INPUT]:  Parsed subcommand, loaded ConsoleConfig
[OUTPUT]: Command dispatch onto the API client, board, wizard and renderers
[POS]:    CLI layer - subcommand definitions and handlers
[UPDATE]: When adding subcommands or changing their output
*/

pub mod init;
pub mod interactive;

use anyhow::{Context, Result, anyhow};
use clap::Subcommand;
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::path::PathBuf;
use tracing::{info, warn};

use searchwatch_adapter::{DisplayStatus, SearchwatchClient};
use searchwatch_console::board::{Freshness, TaskBoard, TaskFilter, TaskSort};
use searchwatch_console::config::ConsoleConfig;
use searchwatch_console::preview::{self, PreviewOutcome};
use searchwatch_console::render;
use searchwatch_console::wizard::TaskWizard;

const DEFAULT_HISTORY_LIMIT: u32 = 20;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List tasks with their derived status
    List {
        #[arg(long, value_name = "STATUS")]
        status: Option<DisplayStatus>,
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = TaskSort::Created)]
        sort: TaskSort,
    },
    /// Show one task in full
    Show { id: String },
    /// Create a task with the step-by-step wizard
    Create,
    /// Edit a task with the wizard
    Edit { id: String },
    /// Stop scheduled runs for a task
    Pause { id: String },
    /// Resume scheduled runs for a task
    Resume { id: String },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Run a task now without sending notifications and show the result
    Run { id: String },
    /// Execution timeline for a task
    History {
        id: String,
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
    /// Changelog of runs that sent a notification
    Notifications {
        id: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Templates available to the wizard
    Templates,
    /// Public capacity figures
    Stats,
    /// Write a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::List { .. } => "list",
            Command::Show { .. } => "show",
            Command::Create => "create",
            Command::Edit { .. } => "edit",
            Command::Pause { .. } => "pause",
            Command::Resume { .. } => "resume",
            Command::Delete { .. } => "delete",
            Command::Run { .. } => "run",
            Command::History { .. } => "history",
            Command::Notifications { .. } => "notifications",
            Command::Templates => "templates",
            Command::Stats => "stats",
            Command::Init { .. } => "init",
        }
    }
}

pub async fn execute(command: Command, config: &ConsoleConfig) -> Result<()> {
    let client = config.build_client()?;
    info!(command = command.name(), base_url = %client.base_url(), "running command");

    match command {
        Command::List {
            status,
            search,
            sort,
        } => list(&client, TaskFilter { status, search }, sort).await,
        Command::Show { id } => {
            let task = client.get_task(&id).await.context("fetch task")?;
            println!("{}", render::task_detail(&task));
            Ok(())
        }
        Command::Create => create(&client, config).await,
        Command::Edit { id } => edit(&client, config, &id).await,
        Command::Pause { id } => set_active(&client, &id, false).await,
        Command::Resume { id } => set_active(&client, &id, true).await,
        Command::Delete { id, yes } => delete(&client, &id, yes).await,
        Command::Run { id } => run_now(&client, config, &id).await,
        Command::History { id, limit } => {
            let executions = client
                .list_executions(&id, Some(limit))
                .await
                .context("fetch executions")?;
            if executions.is_empty() {
                println!("{}", style("No executions yet.").yellow());
            }
            for execution in &executions {
                println!("{}", render::execution_line(execution));
            }
            Ok(())
        }
        Command::Notifications { id, limit } => {
            let entries = client
                .list_notifications(&id, limit)
                .await
                .context("fetch notifications")?;
            if entries.is_empty() {
                println!("{}", style("No notifications sent yet.").yellow());
            }
            for entry in &entries {
                println!("{}", render::changelog_entry(entry));
            }
            Ok(())
        }
        Command::Templates => {
            let templates = client.list_templates().await.context("fetch templates")?;
            for template in &templates {
                println!("{}", render::template_row(template));
            }
            Ok(())
        }
        Command::Stats => {
            let stats = client.public_stats().await.context("fetch stats")?;
            println!("{}", render::stats(&stats));
            Ok(())
        }
        Command::Init { output } => init::run_init(output),
    }
}

async fn list(client: &SearchwatchClient, filter: TaskFilter, sort: TaskSort) -> Result<()> {
    let board = TaskBoard::new(client);
    board.refresh().await.context("fetch tasks")?;

    let tasks = board.view(&filter, sort);
    if tasks.is_empty() {
        println!("{}", style("No tasks found.").yellow());
    }
    for task in &tasks {
        println!("{}", render::task_row(task));
    }
    println!("\n{}", render::counts(&board.counts()));
    Ok(())
}

async fn set_active(client: &SearchwatchClient, id: &str, is_active: bool) -> Result<()> {
    let board = TaskBoard::new(client);
    let freshness = board.set_active(id, is_active).await?;
    let verb = if is_active { "resumed" } else { "paused" };
    match (&freshness, board.get(id)) {
        (Freshness::Current, Some(task)) => println!("{}", render::task_row(&task)),
        (Freshness::Current, None) => warn!(task_id = id, "task missing from refreshed list"),
        (Freshness::Stale { .. }, _) => println!("{}", style(format!("Task {verb}.")).green()),
    }
    print_stale(&freshness);
    Ok(())
}

async fn delete(client: &SearchwatchClient, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete task '{id}'?"))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }

    let board = TaskBoard::new(client);
    let freshness = board.delete(id).await?;
    println!("{}", style("Task deleted.").green());
    print_stale(&freshness);
    Ok(())
}

fn print_stale(freshness: &Freshness) {
    if let Freshness::Stale { reason } = freshness {
        println!(
            "{} {reason}",
            style("Saved, but the task list could not be reloaded:").yellow()
        );
    }
}

async fn run_now(client: &SearchwatchClient, config: &ConsoleConfig, id: &str) -> Result<()> {
    let cancel = preview::interrupt_token();
    println!("{}", style("Running task (notifications suppressed)...").dim());
    let outcome = preview::run_preview(client, id, config.poll_config(), &cancel).await;
    if let PreviewOutcome::RequestFailed { message } = &outcome {
        return Err(anyhow!(message.clone()));
    }
    println!("{}", render::preview_outcome(&outcome));
    Ok(())
}

async fn create(client: &SearchwatchClient, config: &ConsoleConfig) -> Result<()> {
    let templates = match client.list_templates().await {
        Ok(templates) => templates,
        Err(err) => {
            warn!(error = %err, "templates unavailable; starting from scratch");
            Vec::new()
        }
    };
    let wizard = TaskWizard::create();
    if let Some(task) =
        interactive::run_wizard(client, wizard, &templates, config.poll_config()).await?
    {
        println!("{}", style("Task created.").green());
        println!("{}", render::task_row(&task));
    }
    Ok(())
}

async fn edit(client: &SearchwatchClient, config: &ConsoleConfig, id: &str) -> Result<()> {
    let task = client.get_task(id).await.context("fetch task")?;
    let wizard = TaskWizard::edit(&task);
    if let Some(task) = interactive::run_wizard(client, wizard, &[], config.poll_config()).await?
    {
        println!("{}", style("Task updated.").green());
        println!("{}", render::task_row(&task));
    }
    Ok(())
}
