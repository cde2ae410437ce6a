use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moodreel_auth::{
    config::Config, db::connection::create_pool, repositories::session as session_repo,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodreel_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let deleted_sessions = session_repo::cleanup_expired_sessions(&pool, Utc::now()).await?;
    if deleted_sessions > 0 {
        tracing::info!("Deleted {} expired sessions", deleted_sessions);
    }

    sqlx::query("VACUUM (ANALYZE) sessions")
        .execute(&*pool)
        .await?;

    Ok(())
}
