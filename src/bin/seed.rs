//! One-time admin account seeding. Reads ADMIN_EMAIL, ADMIN_PASSWORD and
//! ADMIN_NAME from the environment and upserts the single admin user.

use std::env;

use chrono::Utc;
use uuid::Uuid;

use portfolio_api::{
    auth::password::hash_password,
    db::postgres::create_pool,
    entities::user::UserInsert,
    repositories::{sqlx_repo::SqlxUserRepo, user::UserRepository},
    settings::AppConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::new().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let email = env::var("ADMIN_EMAIL").map_err(|_| anyhow::anyhow!("ADMIN_EMAIL must be set"))?;
    let password =
        env::var("ADMIN_PASSWORD").map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD must be set"))?;
    let name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string());

    if password.len() < 6 {
        anyhow::bail!("ADMIN_PASSWORD must be at least 6 characters");
    }

    let pool = create_pool(&config.database_url).await?;
    let repo = SqlxUserRepo::new(pool);

    let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let now = Utc::now();
    let user = repo
        .upsert_user(&UserInsert {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            created_at: now,
            updated_at: now,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to seed admin user: {}", e))?;

    tracing::info!("Seeded admin account {} ({})", user.email, user.id);
    Ok(())
}
