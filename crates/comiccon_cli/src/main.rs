//! Command-line adapter for the registration core.
//!
//! # Responsibility
//! - Map command-line arguments to core registration and schedule calls.
//! - Keep all business rules in `comiccon_core`; this binary only formats.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comiccon_core::db::open_db;
use log::{error, info};
use comiccon_core::{
    default_log_level, init_file_logging, init_logging, resolve_db_path, KvRegistrationStore,
    LogTarget, RegisterError, RegistrationInput, RegistrationService, RegistrationStore,
    ScheduleView, Session, SqliteKeyValueStore, TimeSlot,
};
use std::path::PathBuf;
use std::process::ExitCode;

const STDERR_DEFAULT_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "comiccon", version, about = "Conference registration and schedule")]
struct Cli {
    /// SQLite database path (falls back to COMICCON_DB_PATH, then the temp dir).
    #[arg(long, global = true)]
    db: Option<String>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rotating log files; logs go to stderr otherwise.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register an attendee for a session.
    Register(RegisterArgs),
    /// Print the schedule table.
    Schedule(ViewArgs),
    /// Delete the registration shown at a 1-based row of the schedule.
    Delete {
        row: usize,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Delete every registration.
    Clear,
    /// Write the schedule as pretty JSON.
    Export {
        #[command(flatten)]
        view: ViewArgs,
        /// Directory for the export file (current directory by default).
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// List session and time-slot keys.
    Sessions,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::Schedule(_) => "schedule",
            Self::Delete { .. } => "delete",
            Self::Clear => "clear",
            Self::Export { .. } => "export",
            Self::Sessions => "sessions",
        }
    }
}

#[derive(Debug, Args)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// Session key, see `comiccon sessions`.
    #[arg(long)]
    session: String,
    #[arg(long, default_value = "")]
    slot: String,
    #[arg(long, default_value = "")]
    fandom: String,
    #[arg(long, default_value = "")]
    notes: String,
}

impl From<RegisterArgs> for RegistrationInput {
    fn from(args: RegisterArgs) -> Self {
        Self {
            attendee_name: args.name,
            email: args.email,
            session_title: args.session,
            time_slot: args.slot,
            fandom_category: args.fandom,
            cosplay_notes: args.notes,
        }
    }
}

#[derive(Debug, Args)]
struct ViewArgs {
    /// Show only this fandom category.
    #[arg(long)]
    fandom: Option<String>,
    /// Order rows by time slot.
    #[arg(long, value_enum)]
    sort: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortOrder {
    Asc,
    Desc,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    start_logging(cli.log_level.as_deref(), cli.log_dir.as_deref())?;

    let command = cli.command.name();
    info!("event=cli_command module=cli status=start command={command}");
    let result = dispatch(cli);
    match &result {
        Ok(()) => info!("event=cli_command module=cli status=ok command={command}"),
        Err(err) => {
            error!("event=cli_command module=cli status=error command={command} error={err}")
        }
    }
    result
}

fn dispatch(cli: Cli) -> Result<()> {

    if let Command::Sessions = cli.command {
        print_catalog();
        return Ok(());
    }

    let db_path = resolve_db_path(cli.db.as_deref());
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let store = KvRegistrationStore::new(SqliteKeyValueStore::try_new(&conn)?);

    match cli.command {
        Command::Register(args) => register(RegistrationService::new(store), args.into()),
        Command::Schedule(view_args) => {
            let view = open_view(store, &view_args)?;
            print_schedule(&view);
            Ok(())
        }
        Command::Delete { row, view } => {
            let index = row
                .checked_sub(1)
                .ok_or_else(|| anyhow!("rows are numbered from 1"))?;
            let mut view = open_view(store, &view)?;
            let deleted = view.delete(index)?;
            info!(
                "event=cli_delete module=cli status=ok row={row} id={}",
                deleted.id
            );
            println!("Deleted registration {}.", deleted.id);
            print_schedule(&view);
            Ok(())
        }
        Command::Clear => {
            RegistrationService::new(store).clear_all()?;
            println!("All registrations cleared.");
            Ok(())
        }
        Command::Export { view, out_dir } => {
            let view = open_view(store, &view)?;
            let dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
            let path = view
                .export_to_file(&dir)
                .with_context(|| format!("failed to export into `{}`", dir.display()))?;
            println!("Exported {} registrations to {}", view.total(), path.display());
            Ok(())
        }
        Command::Sessions => Ok(()),
    }
}

fn start_logging(level: Option<&str>, log_dir: Option<&str>) -> Result<()> {
    match log_dir {
        Some(dir) => init_file_logging(level.unwrap_or(default_log_level()), dir)?,
        None => init_logging(level.unwrap_or(STDERR_DEFAULT_LEVEL), LogTarget::Stderr)?,
    }
    Ok(())
}

fn register(
    service: RegistrationService<KvRegistrationStore<SqliteKeyValueStore<'_>>>,
    input: RegistrationInput,
) -> Result<()> {
    match service.submit(&input) {
        Ok(created) => {
            println!("Registration saved (id {}).", created.id);
            Ok(())
        }
        Err(RegisterError::Invalid(errors)) => {
            for error in errors.iter() {
                eprintln!("{}: {}", error.field.as_str(), error.message);
            }
            Err(anyhow!("registration rejected"))
        }
        Err(err) => Err(err.into()),
    }
}

fn open_view<'conn>(
    store: KvRegistrationStore<SqliteKeyValueStore<'conn>>,
    args: &ViewArgs,
) -> Result<ScheduleView<KvRegistrationStore<SqliteKeyValueStore<'conn>>>> {
    let mut view = ScheduleView::open(store)?;
    view.set_fandom_filter(args.fandom.as_deref());
    match args.sort {
        Some(SortOrder::Asc) => view.sort(true),
        Some(SortOrder::Desc) => view.sort(false),
        None => {}
    }
    Ok(view)
}

fn print_schedule<S: RegistrationStore>(view: &ScheduleView<S>) {
    println!("{}", view.render());
    println!("Total: {}", view.total());
}

fn print_catalog() {
    println!("Sessions:");
    for session in Session::ALL {
        println!("  {:<28} {}", session.key(), session.title());
    }
    println!("Time slots:");
    for slot in TimeSlot::ALL {
        println!("  {}", slot.key());
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn command_names_match_subcommands() {
        let cases = [
            (vec!["comiccon", "sessions"], "sessions"),
            (vec!["comiccon", "clear"], "clear"),
            (vec!["comiccon", "delete", "2", "--fandom", "anime"], "delete"),
            (vec!["comiccon", "--db", "x.sqlite3", "schedule"], "schedule"),
            (vec!["comiccon", "export", "--sort", "asc"], "export"),
            (
                vec!["comiccon", "register", "--name", "Al", "--email", "a@b.co", "--session", "s"],
                "register",
            ),
        ];
        for (args, expected) in cases {
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.command.name(), expected);
        }
    }
}
