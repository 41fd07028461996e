//! Command-line front end for the interview scorecard.
//!
//! # Responsibility
//! - Map subcommands onto one `ScorecardService` session per invocation.
//! - Print warnings without failing the command.
//!
//! # Invariants
//! - Record and section positions on the command line are 1-based.
//! - A storage backend that cannot be opened degrades to an in-memory
//!   session with a warning.

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use log::info;
use scorecard_core::db::open_db;
use scorecard_core::{
    core_version, init_logging, DateBucket, DecisionStatus, KeyValueStore, MemoryKeyValueStore,
    Outcome, RecordDraft, ScorecardConfig, ScorecardService, ScorecardWarning, SectionSchema,
    SortColumn, SqliteKeyValueStore, DEFAULT_ICON, EXPORT_MIME_TYPE, ICON_CHOICES,
};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "scorecard.json";

#[derive(Debug, Parser)]
#[command(name = "scorecard", version, about = "Interview scorecard recorder")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// SQLite database file (overrides the configuration).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log directory (overrides the configuration).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides the configuration).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the core version.
    Version,
    /// Customize rating sections.
    #[command(subcommand)]
    Sections(SectionsCommand),
    /// Create, edit, delete or show interview records.
    #[command(subcommand)]
    Records(RecordsCommand),
    /// Show the dashboard, optionally filtered and sorted.
    List(ListArgs),
    /// Export every record to a dated CSV file.
    Export {
        /// Target directory (defaults to the configured export directory).
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum SectionsCommand {
    List,
    Add {
        name: String,
        #[arg(long, default_value = DEFAULT_ICON)]
        icon: String,
    },
    Rename {
        position: usize,
        name: String,
    },
    Icon {
        position: usize,
        icon: String,
    },
    Remove {
        position: usize,
    },
    /// Restore the built-in sections.
    Reset,
}

#[derive(Debug, Subcommand)]
enum RecordsCommand {
    Add(RecordArgs),
    Edit {
        position: usize,
        #[command(flatten)]
        record: RecordArgs,
    },
    Delete {
        position: usize,
    },
    Show {
        position: usize,
    },
}

#[derive(Debug, Args)]
struct RecordArgs {
    /// Candidate name (required for `add`, optional for `edit`).
    #[arg(long)]
    name: Option<String>,
    /// `SECTION=SCORE`, repeatable.
    #[arg(long = "score", value_name = "SECTION=SCORE")]
    scores: Vec<String>,
    /// `SECTION=TEXT`, repeatable.
    #[arg(long = "comment", value_name = "SECTION=TEXT")]
    comments: Vec<String>,
    /// Selected|Rejected|Pending, or empty to leave unset.
    #[arg(long)]
    decision: Option<String>,
    #[arg(long)]
    final_comment: Option<String>,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    /// Selected|Rejected|Pending.
    #[arg(long)]
    status: Option<String>,
    /// today|week|month.
    #[arg(long)]
    date: Option<DateBucket>,
    /// name|score|date|status; repeating a column flips its direction.
    #[arg(long)]
    sort: Vec<SortColumn>,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli);
    start_logging(&config);

    if let Command::Version = cli.command {
        println!("scorecard_core version={}", core_version());
        return Ok(());
    }

    let db_path = config.db_path();
    let connection = open_db(&db_path);
    let memory = MemoryKeyValueStore::new();
    let sqlite;
    let backend: &dyn KeyValueStore = match &connection {
        Ok(conn) => {
            sqlite = SqliteKeyValueStore::new(conn);
            &sqlite
        }
        Err(err) => {
            eprintln!(
                "warning: could not open `{}` ({err}); changes will not be saved",
                db_path.display()
            );
            &memory
        }
    };

    let (mut service, warnings) = ScorecardService::open(backend);
    print_warnings(&warnings);
    info!(
        "event=cli_command module=cli status=start command={} warnings={}",
        command_name(&cli.command),
        warnings.len()
    );

    match cli.command {
        Command::Version => Ok(()),
        Command::Sections(command) => run_sections(&mut service, command),
        Command::Records(command) => run_records(&mut service, command),
        Command::List(args) => run_list(&mut service, args),
        Command::Export { out_dir } => {
            let dir = out_dir.unwrap_or_else(|| config.export_dir());
            let path = service
                .write_export(&dir, &Local::now())
                .map_err(|err| err.to_string())?;
            println!("exported {} ({EXPORT_MIME_TYPE})", path.display());
            Ok(())
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Version => "version",
        Command::Sections(_) => "sections",
        Command::Records(_) => "records",
        Command::List(_) => "list",
        Command::Export { .. } => "export",
    }
}

fn resolve_config(cli: &Cli) -> ScorecardConfig {
    let mut config = ScorecardConfig::load(&cli.config);
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = Some(level.clone());
    }
    config
}

fn start_logging(config: &ScorecardConfig) {
    let log_dir = absolute(&config.log_dir());
    if let Err(err) = init_logging(config.log_level(), &log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn run_sections<S: KeyValueStore>(
    service: &mut ScorecardService<S>,
    command: SectionsCommand,
) -> Result<(), String> {
    match command {
        SectionsCommand::List => {}
        SectionsCommand::Add { name, icon } => {
            report(service.add_section(&name, &icon).map_err(|err| err.to_string())?);
        }
        SectionsCommand::Rename { position, name } => {
            let outcome = service
                .rename_section(to_index(position)?, &name)
                .map_err(|err| err.to_string())?;
            if !outcome.value {
                println!("blank name ignored");
            }
            report(outcome);
        }
        SectionsCommand::Icon { position, icon } => {
            if !ICON_CHOICES.iter().any(|(value, _)| *value == icon) {
                eprintln!("warning: `{icon}` is not one of the built-in icons");
            }
            report(
                service
                    .set_section_icon(to_index(position)?, &icon)
                    .map_err(|err| err.to_string())?,
            );
        }
        SectionsCommand::Remove { position } => {
            report(
                service
                    .remove_section(to_index(position)?)
                    .map_err(|err| err.to_string())?,
            );
        }
        SectionsCommand::Reset => report(service.reset_sections()),
    }

    for (index, section) in service.schema().iter().enumerate() {
        println!("{:>3}  {:<24} {}", index + 1, section.name, section.icon);
    }
    Ok(())
}

fn run_records<S: KeyValueStore>(
    service: &mut ScorecardService<S>,
    command: RecordsCommand,
) -> Result<(), String> {
    match command {
        RecordsCommand::Add(args) => {
            let name = args
                .name
                .clone()
                .ok_or_else(|| "--name is required".to_string())?;
            let draft = apply_record_args(RecordDraft::new(name), &args, service.schema())?;
            let outcome = service
                .create_record(&draft)
                .map_err(|err| err.to_string())?;
            let position = service.records().position(outcome.value).unwrap_or(0) + 1;
            println!("saved record #{position}");
            report(outcome);
        }
        RecordsCommand::Edit { position, record } => {
            let index = to_index(position)?;
            let existing = service
                .records()
                .get_at(index)
                .ok_or_else(|| format!("no record at position {position}"))?;
            let mut draft = existing.to_draft();
            if let Some(name) = &record.name {
                draft.candidate_name = name.clone();
            }
            let draft = apply_record_args(draft, &record, service.schema())?;
            report(
                service
                    .update_record_at(index, &draft)
                    .map_err(|err| err.to_string())?,
            );
            println!("updated record #{position}");
        }
        RecordsCommand::Delete { position } => {
            let outcome = service
                .delete_record_at(to_index(position)?)
                .map_err(|err| err.to_string())?;
            println!("deleted record #{position}");
            report(outcome);
        }
        RecordsCommand::Show { position } => {
            let record = service
                .records()
                .get_at(to_index(position)?)
                .ok_or_else(|| format!("no record at position {position}"))?;
            let average = service
                .average(record.id)
                .map(|average| average.to_string())
                .unwrap_or_default();
            println!("{}", record.name);
            println!(
                "  date      {}",
                record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
            println!("  average   {average}");
            for section in service.schema().iter() {
                let entry = record.entry(section.id);
                let score = entry
                    .and_then(|entry| entry.score)
                    .map_or_else(|| "N/A".to_string(), |score| score.to_string());
                let comment = entry
                    .map(|entry| entry.comment.as_str())
                    .filter(|comment| !comment.is_empty())
                    .unwrap_or("No comments");
                println!("  {:<20} {score}/5  {comment}", section.name);
            }
            println!("  decision  {}", record.status());
            if !record.final_comment.is_empty() {
                println!("  comments  {}", record.final_comment);
            }
        }
    }
    Ok(())
}

fn run_list<S: KeyValueStore>(
    service: &mut ScorecardService<S>,
    args: ListArgs,
) -> Result<(), String> {
    let query = service.query_mut();
    if let Some(term) = args.search {
        query.set_search_term(term);
    }
    if let Some(status) = args.status {
        query.set_status_filter(parse_decision(&status)?);
    }
    if let Some(bucket) = args.date {
        query.set_date_filter(Some(bucket));
    }
    for column in args.sort {
        query.toggle_sort(column);
    }

    let rows = service.dashboard(&Local::now());
    if rows.is_empty() {
        println!("no interviews to show");
        return Ok(());
    }
    for row in rows {
        println!(
            "#{:<3} {:<28} {:<10} {:<9} {}",
            row.position + 1,
            row.record.name,
            row.average.to_string(),
            row.record.status().as_str(),
            row.record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn apply_record_args(
    mut draft: RecordDraft,
    args: &RecordArgs,
    schema: &SectionSchema,
) -> Result<RecordDraft, String> {
    for pair in &args.scores {
        let (section, value) = split_pair(pair)?;
        let id = section_id(schema, section)?;
        draft.sections.entry(id).or_default().score = value.to_string();
    }
    for pair in &args.comments {
        let (section, value) = split_pair(pair)?;
        let id = section_id(schema, section)?;
        draft.sections.entry(id).or_default().comment = value.to_string();
    }
    if let Some(decision) = &args.decision {
        draft.final_decision = parse_decision(decision)?;
    }
    if let Some(comment) = &args.final_comment {
        draft.final_comment = comment.clone();
    }
    Ok(draft)
}

fn split_pair(pair: &str) -> Result<(&str, &str), String> {
    pair.split_once('=')
        .ok_or_else(|| format!("expected SECTION=VALUE, got `{pair}`"))
}

fn section_id(schema: &SectionSchema, name: &str) -> Result<scorecard_core::SectionId, String> {
    schema
        .find_by_name(name)
        .map(|section| section.id)
        .ok_or_else(|| format!("unknown section `{name}`"))
}

fn parse_decision(value: &str) -> Result<Option<DecisionStatus>, String> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    value
        .parse::<DecisionStatus>()
        .map(Some)
        .map_err(|err| err.to_string())
}

fn to_index(position: usize) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| "positions start at 1".to_string())
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn report<T>(outcome: Outcome<T>) {
    if let Some(warning) = outcome.warning {
        print_warnings(&[warning]);
    }
}

fn print_warnings(warnings: &[ScorecardWarning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}
