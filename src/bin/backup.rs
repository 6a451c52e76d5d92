//! Dump the database with pg_dump into `BACKUP_DIR`.
//!
//! `--dry-run` prints the planned command and touches nothing.

use std::path::PathBuf;

use car_logistics_server::{config::Config, db, init_tracing, services::backup_service};
use chrono::Utc;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "backup", version)]
#[command(about = "Back up the car logistics database with pg_dump")]
struct Cli {
    /// Print what would run without running it
    #[arg(long)]
    dry_run: bool,

    /// Overrides BACKUP_DIR
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let backup_dir = cli
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.backup_dir));

    let plan = backup_service::plan_backup(
        &config.pg_dump_bin,
        &config.database_url,
        &backup_dir,
        Utc::now(),
    );

    if cli.dry_run {
        println!("Dry run: would write {}", plan.output_path.display());
        println!("  {}", plan.display_command());
        return Ok(());
    }

    let size_bytes = backup_service::execute_plan(&plan).await?;

    let pool = db::create_pool(&config.database_url, 1).await?;
    let backup = backup_service::record_backup(&pool, &plan.output_path, size_bytes).await?;

    println!("Backup {} written to {} ({} bytes)", backup.id, backup.path, backup.size_bytes);

    Ok(())
}
