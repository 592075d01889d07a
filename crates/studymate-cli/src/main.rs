//! StudyMate CLI - command line front end for the StudyMate backend.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use studymate_client::{ClientConfig, StudyClient};
use studymate_core::{
    PeerFilter, Status, SubtaskId, TaskFilter, TaskId, WorksessionDraft, WorksessionId,
};

mod output;
mod session_file;

use session_file::FileCredentials;

/// StudyMate CLI - tasks, worksessions and peers
#[derive(Parser)]
#[command(name = "studymate")]
#[command(about = "CLI for the StudyMate study planner", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(short, long, env = "STUDYMATE_API_URL")]
    api_url: Option<String>,

    /// Where the login session is kept
    #[arg(long, env = "STUDYMATE_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user's profile
    Whoami,

    /// List your tasks
    Tasks {
        /// all, active, completed, or a status (todo, doing, done, expired)
        #[arg(short, long, default_value = "all")]
        filter: TaskFilter,
    },

    /// Work with a single task
    #[command(subcommand)]
    Task(TaskCommand),

    /// Work with subtasks
    #[command(subcommand)]
    Subtask(SubtaskCommand),

    /// Browse people and groups
    Peers {
        /// all, friend, group or person
        #[arg(short = 't', long = "type", default_value = "all")]
        filter: PeerFilter,
    },

    /// Show the week's worksessions (Monday to Sunday)
    Week {
        /// Any date in the week, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Work with worksessions
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Show a task and its subtasks
    Show { id: String },

    /// Create a task assigned to you
    Create { title: String },

    /// Toggle a task between DONE and TODO (applies to all subtasks)
    Toggle { id: String },

    /// Delete a task
    Delete { id: String },
}

#[derive(Subcommand)]
enum SubtaskCommand {
    /// Append a subtask
    Add { task: String, title: String },

    /// Toggle a subtask between DONE and TODO
    Toggle { task: String, subtask: String },

    /// Set a subtask's status explicitly
    Set {
        task: String,
        subtask: String,
        #[arg(value_parser = parse_status)]
        status: Status,
    },

    /// Remove a subtask
    Rm { task: String, subtask: String },
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Show one worksession
    Show { id: String },

    /// Schedule a worksession on one of your tasks
    Create {
        #[arg(long)]
        title: String,

        /// Task the session is for
        #[arg(long)]
        task: String,

        /// Start, e.g. 2025-03-05T14:00
        #[arg(long, value_parser = parse_start)]
        start: NaiveDateTime,

        /// Duration in hours (0.5 to 8)
        #[arg(long, default_value = "1")]
        hours: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load config
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url.clone() {
        config = config.with_api_url(url);
    }
    let session_path = cli
        .session_file
        .clone()
        .unwrap_or_else(FileCredentials::default_path);
    debug!(api_url = %config.api_url, session = %session_path.display(), "Config loaded");

    let client = StudyClient::new(&config, Arc::new(FileCredentials::new(session_path)))?;
    let json = cli.json;

    match cli.command {
        Commands::Login { email, password } => {
            let session = client.auth.login(&email, &password).await?;
            match session.user_id {
                Some(id) => println!("Logged in as user {}", id),
                None => println!("Logged in (backend did not report a user id)"),
            }
        }
        Commands::Logout => {
            client.auth.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => {
            let user = client.users.me().await?;
            emit(json, &user, output::print_user)?;
        }
        Commands::Tasks { filter } => {
            let tasks = client.tasks.list_filtered(filter).await?;
            emit(json, &tasks, |t| output::print_tasks(t))?;
        }
        Commands::Task(cmd) => task_command(&client, cmd, json).await?,
        Commands::Subtask(cmd) => subtask_command(&client, cmd, json).await?,
        Commands::Peers { filter } => {
            let peers = client.peers(filter).await?;
            emit(json, &peers, |p| output::print_peers(p))?;
        }
        Commands::Week { date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let week = client.worksessions.week(date).await?;
            emit(json, &week, |w| output::print_week(w))?;
        }
        Commands::Session(cmd) => session_command(&client, cmd, json).await?,
    }

    Ok(())
}

async fn task_command(
    client: &StudyClient,
    cmd: TaskCommand,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        TaskCommand::Show { id } => {
            let task = client.tasks.get_task(&TaskId::new(id)).await?;
            emit(json, &task, output::print_task)?;
        }
        TaskCommand::Create { title } => {
            let task = client.tasks.create_task(&title).await?;
            emit_with_heading(
                &mut io::stdout(),
                json,
                "Task created:",
                &task,
                output::print_task,
            )?;
        }
        TaskCommand::Toggle { id } => {
            let board = client.task_board();
            board.refresh().await?;
            let task = board.toggle_task(&TaskId::new(id)).await?;
            emit(json, &task, output::print_task)?;
        }
        TaskCommand::Delete { id } => {
            let board = client.task_board();
            board.refresh().await?;
            board.delete_task(&TaskId::new(id.clone())).await?;
            println!("Task {} deleted", id);
        }
    }
    Ok(())
}

async fn subtask_command(
    client: &StudyClient,
    cmd: SubtaskCommand,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let board = client.task_board();
    board.refresh().await?;

    let task_id = match &cmd {
        SubtaskCommand::Add { task, .. }
        | SubtaskCommand::Toggle { task, .. }
        | SubtaskCommand::Set { task, .. }
        | SubtaskCommand::Rm { task, .. } => TaskId::new(task.clone()),
    };

    match cmd {
        SubtaskCommand::Add { title, .. } => {
            let subtask = board.add_subtask(&task_id, &title).await?;
            println!("Subtask {} added", subtask.id);
        }
        SubtaskCommand::Toggle { subtask, .. } => {
            board
                .toggle_subtask(&task_id, &SubtaskId::new(subtask))
                .await?;
        }
        SubtaskCommand::Set {
            subtask, status, ..
        } => {
            board
                .set_subtask_status(&task_id, &SubtaskId::new(subtask), status)
                .await?;
        }
        SubtaskCommand::Rm { subtask, .. } => {
            board
                .remove_subtask(&task_id, &SubtaskId::new(subtask.clone()))
                .await?;
            println!("Subtask {} removed", subtask);
        }
    }

    if let Some(task) = board.task(&task_id) {
        emit(json, &task, output::print_task)?;
    }
    Ok(())
}

async fn session_command(
    client: &StudyClient,
    cmd: SessionCommand,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        SessionCommand::Show { id } => {
            let session = client.worksessions.get(&WorksessionId::new(id)).await?;
            emit(json, &session, output::print_session)?;
        }
        SessionCommand::Create {
            title,
            task,
            start,
            hours,
        } => {
            let draft = WorksessionDraft {
                title,
                subject_id: Some(TaskId::new(task)),
                start,
                duration_hours: hours,
                collaborator_id: client.auth.session().and_then(|s| s.user_id),
            };
            let session = client
                .worksessions
                .create(&draft, Local::now().naive_local())
                .await?;
            emit_with_heading(
                &mut io::stdout(),
                json,
                "Worksession created:",
                &session,
                output::print_session,
            )?;
        }
    }
    Ok(())
}

/// Print `value` as JSON or through the table renderer.
fn emit<T, F>(json: bool, value: &T, render: F) -> Result<(), serde_json::Error>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        render(value);
    }
    Ok(())
}

/// Like [`emit`], with a heading line that only appears in text mode so
/// `--json` output stays parseable.
fn emit_with_heading<W, T, F>(
    out: &mut W,
    json: bool,
    heading: &str,
    value: &T,
    render: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    } else {
        writeln!(out, "{}", heading)?;
        out.flush()?;
        render(value);
    }
    Ok(())
}

fn parse_status(s: &str) -> Result<Status, String> {
    s.to_ascii_uppercase().parse().map_err(|e| format!("{}", e))
}

fn parse_start(s: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .ok_or_else(|| format!("invalid start '{}', expected YYYY-MM-DDTHH:MM", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_start() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        assert_eq!(parse_start("2025-03-05T14:00").unwrap(), expected);
        assert_eq!(parse_start("2025-03-05 14:00:00").unwrap(), expected);
        assert!(parse_start("tomorrow").is_err());
    }

    #[test]
    fn test_json_output_has_no_heading() {
        let task = studymate_core::Task::new("Essay", studymate_core::UserId::new("u1"));
        let mut out = Vec::new();
        emit_with_heading(&mut out, true, "Task created:", &task, |_| {}).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["title"], "Essay");
    }

    #[test]
    fn test_text_output_starts_with_heading() {
        let mut out = Vec::new();
        emit_with_heading(&mut out, false, "Task created:", &1u8, |_| {}).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Task created:\n");
    }

    #[test]
    fn test_parse_status_case_insensitive() {
        assert_eq!(parse_status("done").unwrap(), Status::Done);
        assert!(parse_status("paused").is_err());
    }

    #[test]
    fn test_parse_filters() {
        let cli = Cli::try_parse_from(["studymate", "tasks", "--filter", "doing"]).unwrap();
        match cli.command {
            Commands::Tasks { filter } => assert_eq!(filter, TaskFilter::Status(Status::Doing)),
            _ => panic!("expected tasks command"),
        }

        let cli = Cli::try_parse_from(["studymate", "peers", "--type", "group"]).unwrap();
        match cli.command {
            Commands::Peers { filter } => assert_eq!(filter, PeerFilter::Group),
            _ => panic!("expected peers command"),
        }
    }
}
