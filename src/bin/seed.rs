//! Bootstrap a fresh database: run migrations, ensure the default roles and
//! an admin login. Safe to run repeatedly.

use car_logistics_server::{config::Config, db, init_tracing, services::user_service};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "seed", version)]
#[command(about = "Create default roles and the admin user")]
struct Cli {
    #[arg(long, default_value = "admin@example.com")]
    email: String,

    #[arg(long, default_value = "admin123")]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url, 1).await?;
    db::run_migrations(&pool).await?;

    let roles_created = user_service::ensure_default_roles(&pool).await?;
    tracing::info!("{} roles created", roles_created);

    if user_service::ensure_admin(&pool, &cli.email, &cli.password).await? {
        println!("Admin user {} created", cli.email);
    } else {
        println!("Admin user {} already exists", cli.email);
    }

    Ok(())
}
