use crate::err_from;
use crate::error::SweeperError;
use crate::error::*;
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::env;
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!();

pub async fn create_sqlite_connection(
    file_name: Option<&str>,
    memory_name: Option<&str>,
    run_migrations: bool,
) -> Result<SqlitePool, SweeperError> {
    let url = if let Some(file_name) = file_name {
        format!("sqlite://{file_name}")
    } else {
        format!("file:{}?mode=memory", memory_name.unwrap_or("mem"))
    };

    let journal_mode = match env::var("TRC20_SWEEPER_SQLITE_JOURNAL_MODE") {
        Ok(val) => sqlx::sqlite::SqliteJournalMode::from_str(&val).map_err(err_from!())?,
        Err(_) => sqlx::sqlite::SqliteJournalMode::Wal,
    };

    let conn_opt = SqliteConnectOptions::from_str(&url)
        .map_err(err_from!())?
        .journal_mode(journal_mode)
        // The tx_record -> transfer_rule foreign key is referential only: per
        // spec, deleting a rule keeps its history (not cascading). sqlx enables
        // `PRAGMA foreign_keys = ON` by default, which would block that delete,
        // so disable enforcement to match the documented schema semantics.
        .foreign_keys(false)
        .create_if_missing(true);

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(conn_opt)
        .await
        .map_err(err_from!())?;

    if run_migrations {
        MIGRATOR.run(&pool).await.map_err(err_from!())?;
    }

    Ok(pool)
}
