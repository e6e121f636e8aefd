use sqlx::MySqlPool;
use tracing::info;

use crate::error::Result;

/// Connect to MySQL. Callers decide how a failed connection is surfaced;
/// nothing here panics.
pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url).await?;
    info!("Database pool ready");
    Ok(pool)
}
