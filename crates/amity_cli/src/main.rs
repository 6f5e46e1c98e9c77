//! Command-line front end for the allocation core.
//!
//! # Responsibility
//! - Map subcommands onto `AllocationService` calls.
//! - Restore the working state before a command and persist it after
//!   mutating commands, so separate invocations share one model.

use amity_core::db::open_db;
use amity_core::service::bulk_load::parse_accommodation_flag;
use amity_core::{
    default_log_level, init_logging, AllocationService, AllocationSystem, Role,
    SequentialIdGenerator, SqliteStateRepository, StateRepoError, StateRepository,
    UniformPlacement,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Amity - office and living-space allocation
#[derive(Parser, Debug)]
#[command(name = "amity", version, about)]
struct Cli {
    /// State database file
    #[arg(long, env = "AMITY_DB", default_value = "amity.sqlite3")]
    db: PathBuf,

    /// Working state restored before and saved after each command
    #[arg(long, env = "AMITY_STATE", default_value = "default")]
    state: String,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "AMITY_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AMITY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Seed for reproducible room placement
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create one or more rooms (office unless --living-space is given)
    CreateRoom {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(long, visible_alias = "ls", conflicts_with = "office")]
        living_space: bool,
        #[arg(long)]
        office: bool,
    },
    /// Add a fellow or staff member and allocate rooms
    AddPerson {
        role: Role,
        first_name: String,
        surname: String,
        /// Y to request a living space
        accommodate: Option<String>,
    },
    /// Move a person into another room
    Reallocate { person_id: String, room: String },
    /// Add people from a text file of `ROLE FIRST SURNAME [Y|N]` lines
    LoadPeople { file: PathBuf },
    /// List the occupants of one room
    PrintRoom { room: String },
    /// List every occupied room
    PrintAllocations {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List everyone waiting for an office or living space
    PrintUnallocated {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Look up a person's id by full name
    PersonId {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Save the working state under another name
    SaveState { name: String },
    /// Replace the working state with a saved one
    LoadState { name: String },
    /// List saved states
    ListStates,
}

impl Command {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Self::CreateRoom { .. }
                | Self::AddPerson { .. }
                | Self::Reallocate { .. }
                | Self::LoadPeople { .. }
                | Self::LoadState { .. }
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let conn = open_db(&cli.db)?;
    let repo = SqliteStateRepository::try_new(&conn)?;

    let placement = match cli.seed {
        Some(seed) => UniformPlacement::seeded(seed),
        None => UniformPlacement::new(),
    };
    let mut service = AllocationService::new(AllocationSystem::with_parts(
        Box::new(SequentialIdGenerator::new()),
        Box::new(placement),
    ));

    match service.load_state(&repo, &cli.state) {
        Ok(()) | Err(StateRepoError::SnapshotNotFound(_)) => {}
        Err(err) => return Err(err.into()),
    }

    let mutates = cli.command.mutates();
    execute(&mut service, &repo, cli.command)?;

    if mutates {
        service.save_state(&repo, &cli.state)?;
        info!("event=cli_command module=cli status=ok state={}", cli.state);
    }
    Ok(())
}

fn execute(
    service: &mut AllocationService,
    repo: &SqliteStateRepository<'_>,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::CreateRoom {
            names,
            living_space,
            office,
        } => {
            let flag = match (living_space, office) {
                (true, _) => Some("livingspace"),
                (false, true) => Some("office"),
                (false, false) => None,
            };
            let report = service.create_rooms(&names[..], flag)?;
            for duplicate in &report.duplicates {
                println!(
                    "The room {duplicate} already exists; duplicate rooms cannot be created"
                );
            }
            match report.created_count() {
                0 => println!("No rooms were created"),
                1 => println!(
                    "The {} {} has been created successfully!",
                    report.category, report.created[0]
                ),
                count => println!(
                    "{count} {} rooms have been created successfully",
                    report.category
                ),
            }
        }
        Command::AddPerson {
            role,
            first_name,
            surname,
            accommodate,
        } => {
            let wants_accommodation = match accommodate.as_deref() {
                None => false,
                Some(flag) => parse_accommodation_flag(flag)
                    .ok_or_else(|| format!("accommodation must be Y or N, got `{flag}`"))?,
            };
            let report =
                service.add_person(role, &format!("{first_name} {surname}"), wants_accommodation)?;
            println!("{report}");
        }
        Command::Reallocate { person_id, room } => {
            let relocation = service.reallocate(&person_id, &room)?;
            println!("{relocation}");
        }
        Command::LoadPeople { file } => {
            let report = service.load_people_file(&file)?;
            for onboarded in &report.onboarded {
                println!("{onboarded}\n");
            }
            for failure in &report.failures {
                eprintln!("{failure}");
            }
            println!(
                "{} people loaded, {} line(s) skipped",
                report.onboarded.len(),
                report.failures.len()
            );
        }
        Command::PrintRoom { room } => println!("{}", service.room_occupants(&room)),
        Command::PrintAllocations { output } => {
            let listing = service.allocations_report(output.as_deref())?;
            match output {
                Some(path) => println!("Allocations saved to: {}", path.display()),
                None => print!("{listing}"),
            }
        }
        Command::PrintUnallocated { output } => {
            let listing = service.unallocated_report(output.as_deref())?;
            match output {
                Some(path) => println!("Unallocated people saved to: {}", path.display()),
                None => print!("{listing}"),
            }
        }
        Command::PersonId { name } => {
            let found = service.person_id_by_name(&name.join(" "))?;
            println!("ID: {} ROLE: {} NAME: {}", found.id, found.role, found.name);
        }
        Command::SaveState { name } => {
            service.save_state(repo, &name)?;
            println!("State saved as `{}`", name.trim());
        }
        Command::LoadState { name } => {
            service.load_state(repo, &name)?;
            println!("State `{}` loaded", name.trim());
        }
        Command::ListStates => {
            let summaries = repo.list_snapshots()?;
            if summaries.is_empty() {
                println!("No saved states");
            }
            for summary in summaries {
                println!(
                    "{}\trooms={}\tpeople={}\tsaved_at={}",
                    summary.name, summary.room_count, summary.person_count, summary.saved_at
                );
            }
        }
    }
    Ok(())
}
