use anyhow::{bail, Context};

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgUserStore, UserStore};

/// Seed an administrator so they can complete the Google sign-in.
pub async fn add_admin(config: AppConfig, email: &str, name: &str) -> anyhow::Result<()> {
    if !email.contains('@') {
        bail!("'{}' is not an email address", email);
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("add-admin needs DATABASE_URL pointing at Postgres")?;

    let user = PgUserStore::new(pool)
        .upsert_admin(email, name)
        .await
        .with_context(|| format!("failed to save administrator {}", email))?;

    println!("Administrator {} ({}) is ready", user.email, user.id);
    Ok(())
}
