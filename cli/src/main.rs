use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rowkit_core::split_statements;
use rowkit_sqlite::{
    DirScriptSource, MigrationOptions, Migrator, MissingUpgrade, execute_script,
};

#[derive(Debug, Parser)]
#[command(name = "rowkit")]
#[command(about = "Migration and script tooling for rowkit databases")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or upgrade a database to the target schema version.
    Migrate(MigrateArgs),
    /// Show the stored schema version of a database.
    Status(StatusArgs),
    /// Split a SQL script into statements and print them.
    Split(SplitArgs),
    /// Execute a SQL script file against a database.
    Exec(ExecArgs),
}

#[derive(Debug, Args)]
struct MigrateArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Directory holding create_schema.sql and upgrade_schema_<v>.sql files.
    #[arg(long)]
    scripts: PathBuf,
    /// Target schema version.
    #[arg(long)]
    target: u32,
    /// Fail on a missing upgrade script instead of skipping the version.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Target schema version to compare against.
    #[arg(long)]
    target: u32,
}

#[derive(Debug, Args)]
struct SplitArgs {
    /// SQL script file to split.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct ExecArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// SQL script file to execute.
    #[arg(long)]
    script: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate(args) => run_migrate(args),
        Command::Status(args) => run_status(args),
        Command::Split(args) => run_split(args),
        Command::Exec(args) => run_exec(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_migrate(args: MigrateArgs) -> Result<(), String> {
    if args.target == 0 {
        return Err("--target must be >= 1".to_string());
    }
    let options = MigrationOptions {
        on_missing_upgrade: if args.strict {
            MissingUpgrade::Fail
        } else {
            MissingUpgrade::Skip
        },
    };
    let migrator =
        Migrator::new(DirScriptSource::new(&args.scripts), args.target).with_options(options);
    let conn = migrator
        .open_file(&args.db)
        .map_err(|e| format!("Migration failed: {e}"))?;
    let status = migrator
        .status(&conn)
        .map_err(|e| format!("Failed to read status: {e}"))?;
    println!(
        "Database '{}' is at schema version {}.",
        args.db.display(),
        status.stored_version
    );
    Ok(())
}

fn run_status(args: StatusArgs) -> Result<(), String> {
    if args.target == 0 {
        return Err("--target must be >= 1".to_string());
    }
    let conn = rusqlite::Connection::open(&args.db)
        .map_err(|e| format!("Failed to open database '{}': {e}", args.db.display()))?;
    // The script source is never consulted for a status read.
    let migrator = Migrator::new(DirScriptSource::new("."), args.target);
    let status = migrator
        .status(&conn)
        .map_err(|e| format!("Failed to read status: {e}"))?;
    println!("stored version: {}", status.stored_version);
    println!("target version: {}", status.target_version);
    println!(
        "up to date:     {}",
        if status.is_current() { "yes" } else { "no" }
    );
    println!(
        "foreign keys:   {}",
        if status.foreign_keys { "on" } else { "off" }
    );
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<(), String> {
    let script = fs::read_to_string(&args.input)
        .map_err(|e| format!("Failed to read '{}': {e}", args.input.display()))?;
    let statements = split_statements(&script);
    for (index, statement) in statements.iter().enumerate() {
        println!("-- statement {}", index + 1);
        println!("{statement}");
    }
    println!("-- {} statement(s)", statements.len());
    Ok(())
}

fn run_exec(args: ExecArgs) -> Result<(), String> {
    let script = fs::read_to_string(&args.script)
        .map_err(|e| format!("Failed to read '{}': {e}", args.script.display()))?;
    let conn = rusqlite::Connection::open(&args.db)
        .map_err(|e| format!("Failed to open database '{}': {e}", args.db.display()))?;
    let statements = split_statements(&script);
    let count = statements.len();
    execute_script(&conn, &script).map_err(|e| format!("Script failed: {e}"))?;
    println!(
        "Executed {count} statement(s) from '{}' against '{}'.",
        args.script.display(),
        args.db.display()
    );
    Ok(())
}
