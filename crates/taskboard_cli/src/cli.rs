//! Argument parsing and command dispatch.

use crate::{render, shell};
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::warn;
use std::path::{Path, PathBuf};
use taskboard_core::{
    config, init_logging, Board, BoardConfig, BoardEffects, Column, Priority, PriorityFilter,
    SortMode, TaskDraft, TaskId, TaskIntent, TaskOutcome, TaskUpdate,
};

/// Shortest id prefix accepted in place of a full task id.
const MIN_ID_PREFIX_LEN: usize = 4;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "Local kanban task board")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the board database and logs
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Commands accepted both on the command line and inside `shell`.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in with the demo account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Keep the session after this process exits
        #[arg(long)]
        remember_me: bool,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create a task
    Add(AddArgs),
    /// Change fields of an existing task
    Edit(EditArgs),
    /// Move a task to another column
    Move {
        /// Task id or unique id prefix
        id: String,
        #[arg(value_parser = parse_column)]
        column: Column,
    },
    /// Delete a task
    Delete {
        /// Task id or unique id prefix
        id: String,
    },
    /// Delete every task and the whole activity log
    Reset {
        /// Confirm the destructive reset
        #[arg(long)]
        yes: bool,
    },
    /// Show the board
    List(ListArgs),
    /// Show recent activity, newest first
    Log {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Interactive session; session-scoped logins last until exit
    Shell,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    title: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_parser = parse_priority, default_value = "Medium")]
    priority: Priority,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    due: Option<String>,
    /// Tag to attach; repeat for several
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long, value_parser = parse_column, default_value = "Todo")]
    column: Column,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Task id or unique id prefix
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_parser = parse_priority)]
    priority: Option<Priority>,
    #[arg(long)]
    due: Option<String>,
    /// Replacement tag list; repeat for several
    #[arg(long = "tag")]
    tags: Option<Vec<String>>,
    #[arg(long, value_parser = parse_column)]
    column: Option<Column>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Case-insensitive title search
    #[arg(long)]
    search: Option<String>,
    /// All, Low, Medium or High
    #[arg(long, value_parser = parse_priority_filter)]
    priority: Option<PriorityFilter>,
    /// due-date or created-at
    #[arg(long, value_parser = parse_sort_mode)]
    sort: Option<SortMode>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Err(err) = init_logging(&config.log_level, &config.effective_log_dir()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let mut board = Board::open(&config).with_context(|| {
        format!("failed to open board at {}", config.data_dir.display())
    })?;

    match cli.command {
        Command::Shell => shell::run(&mut board),
        command => execute(&mut board, command),
    }
}

fn resolve_config(cli: &Cli) -> Result<BoardConfig> {
    let mut config = config::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.data_dir = absolutize(&config.data_dir)?;
    config.log_dir = config.log_dir.as_deref().map(absolutize).transpose()?;
    Ok(config)
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    Ok(cwd.join(path))
}

/// Runs one command against an open board.
pub fn execute<E: BoardEffects>(board: &mut Board<E>, command: Command) -> Result<()> {
    match command {
        Command::Login {
            email,
            password,
            remember_me,
        } => {
            let report = board.login(&email, &password, remember_me)?;
            warn_on_persist_failure(report.persist_error.as_ref());
            let scope = if remember_me { "remembered" } else { "this session" };
            println!("signed in as {} ({scope})", email.trim());
        }
        Command::Logout => {
            let report = board.logout();
            warn_on_persist_failure(report.persist_error.as_ref());
            println!("signed out");
        }
        Command::Whoami => match board.session().user() {
            Some(user) => println!("{}", user.email),
            None => println!("not signed in"),
        },
        Command::Add(args) => {
            board.require_session()?;
            let mut draft = TaskDraft::new(args.title)
                .with_priority(args.priority)
                .with_column(args.column)
                .with_tags(args.tags);
            draft.description = args.description;
            draft.due_date = args.due;
            dispatch(board, TaskIntent::AddTask(draft))?;
        }
        Command::Edit(args) => {
            board.require_session()?;
            let id = resolve_task_id(board, &args.id)?;
            let update = TaskUpdate {
                title: args.title,
                description: args.description,
                priority: args.priority,
                due_date: args.due,
                tags: args.tags,
                column: args.column,
            };
            if update == TaskUpdate::default() {
                bail!("nothing to change; pass at least one field flag");
            }
            dispatch(board, TaskIntent::UpdateTask { id, update })?;
        }
        Command::Move { id, column } => {
            board.require_session()?;
            let id = resolve_task_id(board, &id)?;
            dispatch(board, TaskIntent::MoveTask { id, column })?;
        }
        Command::Delete { id } => {
            board.require_session()?;
            let id = resolve_task_id(board, &id)?;
            dispatch(board, TaskIntent::DeleteTask(id))?;
        }
        Command::Reset { yes } => {
            board.require_session()?;
            if !yes {
                bail!("reset deletes every task and the activity log; rerun with --yes");
            }
            dispatch(board, TaskIntent::ResetBoard)?;
        }
        Command::List(args) => {
            board.require_session()?;
            if let Some(search) = args.search {
                dispatch(board, TaskIntent::SetSearchQuery(search))?;
            }
            if let Some(filter) = args.priority {
                dispatch(board, TaskIntent::SetFilterPriority(filter))?;
            }
            if let Some(mode) = args.sort {
                dispatch(board, TaskIntent::SetSortBy(mode))?;
            }
            print!("{}", render::board(board.task_state(), Utc::now()));
        }
        Command::Log { limit } => {
            board.require_session()?;
            print!(
                "{}",
                render::activity(&board.task_state().logs, limit, Utc::now())
            );
        }
        Command::Shell => bail!("already in a shell"),
    }
    Ok(())
}

fn dispatch<E: BoardEffects>(board: &mut Board<E>, intent: TaskIntent) -> Result<()> {
    let report = board.dispatch_task(intent);
    warn_on_persist_failure(report.persist_error.as_ref());
    match report.outcome {
        TaskOutcome::Added(id) => println!("added {}", render::short_id(id)),
        TaskOutcome::Updated(id) => println!("updated {}", render::short_id(id)),
        TaskOutcome::Moved(id) => println!("moved {}", render::short_id(id)),
        TaskOutcome::Deleted(id) => println!("deleted {}", render::short_id(id)),
        TaskOutcome::Reset => println!("board reset"),
        TaskOutcome::ViewChanged => {}
        TaskOutcome::NotFound(id) => println!("no task with id {id}; nothing changed"),
        TaskOutcome::Rejected(err) => return Err(anyhow!(err)),
    }
    Ok(())
}

fn warn_on_persist_failure(err: Option<&taskboard_core::StorageError>) {
    if let Some(err) = err {
        warn!("event=cli_persist module=cli status=error error={err}");
        eprintln!("warning: change kept in memory but not saved: {err}");
    }
}

/// Accepts a full id, or a prefix of at least [`MIN_ID_PREFIX_LEN`]
/// characters matching exactly one task.
fn resolve_task_id<E: BoardEffects>(board: &Board<E>, raw: &str) -> Result<TaskId> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("task id must not be empty");
    }
    if let Ok(id) = raw.parse::<TaskId>() {
        return Ok(id);
    }
    if raw.chars().count() < MIN_ID_PREFIX_LEN {
        bail!("id prefix `{raw}` is too short; give at least {MIN_ID_PREFIX_LEN} characters");
    }

    let prefix = raw.to_ascii_lowercase();
    let mut matches = board
        .task_state()
        .tasks
        .iter()
        .filter(|task| task.id.to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id),
        (None, _) => bail!("no task matches id `{raw}`"),
        (Some(_), Some(_)) => bail!("id prefix `{raw}` is ambiguous"),
    }
}

fn parse_column(value: &str) -> Result<Column, String> {
    Column::parse(value).ok_or_else(|| format!("unknown column `{value}`; expected Todo, Doing or Done"))
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value)
        .ok_or_else(|| format!("unknown priority `{value}`; expected Low, Medium or High"))
}

fn parse_priority_filter(value: &str) -> Result<PriorityFilter, String> {
    PriorityFilter::parse(value)
        .ok_or_else(|| format!("unknown priority filter `{value}`; expected All, Low, Medium or High"))
}

fn parse_sort_mode(value: &str) -> Result<SortMode, String> {
    SortMode::parse(value)
        .ok_or_else(|| format!("unknown sort `{value}`; expected due-date or created-at"))
}

#[cfg(test)]
mod tests {
    use super::{execute, Cli, Command};
    use chrono::{TimeZone, Utc};
    use clap::{CommandFactory, Parser};
    use taskboard_core::service::credentials::{DEMO_EMAIL, DEMO_PASSWORD};
    use taskboard_core::storage::TASKS_KEY;
    use taskboard_core::{
        Board, BoardError, Column, FixedEffects, Priority, StorageBackends, StorageKind, Task,
        TaskDraft,
    };
    use uuid::Uuid;

    const FIRST_A: &str = "aaaa1111-0000-4000-8000-000000000001";
    const SECOND_A: &str = "aaaa2222-0000-4000-8000-000000000002";
    const ONLY_B: &str = "bbbb3333-0000-4000-8000-000000000003";

    fn command(args: &[&str]) -> Command {
        let argv = std::iter::once("taskboard").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().command
    }

    fn board_with_tasks(signed_in: bool) -> Board<FixedEffects> {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let tasks: Vec<Task> = [FIRST_A, SECOND_A, ONLY_B]
            .iter()
            .map(|raw| {
                let id = Uuid::parse_str(raw).unwrap();
                Task::from_draft(id, created_at, TaskDraft::new(format!("task {raw}")))
            })
            .collect();

        let mut storage = StorageBackends::in_memory();
        storage
            .write_json(StorageKind::Durable, TASKS_KEY, &tasks)
            .unwrap();
        let mut board = Board::with_storage(storage, FixedEffects::starting_at(created_at));
        if signed_in {
            board.login(DEMO_EMAIL, DEMO_PASSWORD, false).unwrap();
        }
        board
    }

    fn task_ids(board: &Board<FixedEffects>) -> Vec<String> {
        board
            .task_state()
            .tasks
            .iter()
            .map(|task| task.id.to_string())
            .collect()
    }

    #[test]
    fn board_commands_refuse_without_session() {
        let mut board = board_with_tasks(false);
        let guarded: &[&[&str]] = &[
            &["add", "new task"],
            &["edit", ONLY_B, "--title", "renamed"],
            &["move", ONLY_B, "Done"],
            &["delete", ONLY_B],
            &["reset", "--yes"],
            &["list"],
            &["log"],
        ];

        for args in guarded {
            let err = execute(&mut board, command(args)).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<BoardError>(), Some(BoardError::NotAuthenticated)),
                "{args:?} ran without a session"
            );
        }
        assert_eq!(task_ids(&board).len(), 3);
        assert!(board.task_state().logs.is_empty());

        execute(&mut board, command(&["whoami"])).unwrap();
        execute(&mut board, command(&["logout"])).unwrap();
    }

    #[test]
    fn reset_without_confirmation_keeps_board() {
        let mut board = board_with_tasks(true);

        let err = execute(&mut board, command(&["reset"])).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert_eq!(task_ids(&board).len(), 3);

        execute(&mut board, command(&["reset", "--yes"])).unwrap();
        assert!(board.task_state().tasks.is_empty());
    }

    #[test]
    fn unique_prefix_selects_one_task() {
        let mut board = board_with_tasks(true);

        execute(&mut board, command(&["move", "BBBB", "Done"])).unwrap();
        execute(&mut board, command(&["delete", "aaaa2"])).unwrap();

        assert_eq!(task_ids(&board), vec![FIRST_A, ONLY_B]);
        assert_eq!(board.task_state().tasks[1].column, Column::Done);
    }

    #[test]
    fn ambiguous_missing_and_short_prefixes_change_nothing() {
        let mut board = board_with_tasks(true);

        let ambiguous = execute(&mut board, command(&["delete", "aaaa"])).unwrap_err();
        assert!(ambiguous.to_string().contains("ambiguous"));
        let missing = execute(&mut board, command(&["delete", "cccc"])).unwrap_err();
        assert!(missing.to_string().contains("no task matches"));
        let short = execute(&mut board, command(&["delete", "bb"])).unwrap_err();
        assert!(short.to_string().contains("too short"));

        assert_eq!(task_ids(&board).len(), 3);
    }

    #[test]
    fn blank_id_never_matches_a_task() {
        let mut board = board_with_tasks(true);

        for blank in ["", "   "] {
            assert!(execute(&mut board, command(&["delete", blank])).is_err());
            assert!(execute(&mut board, command(&["move", blank, "Done"])).is_err());
        }

        assert_eq!(task_ids(&board).len(), 3);
        assert!(board.task_state().logs.is_empty());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_defaults_and_tags() {
        let cli = Cli::try_parse_from(["taskboard", "add", "Ship it", "--tag", "a", "--tag", "b"])
            .unwrap();
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.title, "Ship it");
        assert_eq!(args.priority, Priority::Medium);
        assert_eq!(args.column, Column::Todo);
        assert_eq!(args.tags, vec!["a", "b"]);
    }

    #[test]
    fn parses_move_with_case_insensitive_column() {
        let cli = Cli::try_parse_from(["taskboard", "move", "abc", "doing"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Move { column: Column::Doing, .. }
        ));
    }

    #[test]
    fn rejects_unknown_priority() {
        assert!(Cli::try_parse_from(["taskboard", "add", "x", "--priority", "urgent"]).is_err());
    }
}
