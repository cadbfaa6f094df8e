use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;
    Ok(db)
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

#[cfg(test)]
pub use testing::TestDb;

#[cfg(test)]
mod testing {
    use sqlx::{
        postgres::{PgConnectOptions, PgPoolOptions},
        PgPool,
    };

    /// A migrated, throwaway schema on the server named by `TEST_DATABASE_URL`.
    ///
    /// Each instance gets its own schema as the pool's search path, so tests
    /// can run in parallel against one database.
    pub struct TestDb {
        pub pool: PgPool,
        admin: PgPool,
        schema: String,
    }

    impl TestDb {
        /// `None` when `TEST_DATABASE_URL` is unset; callers skip.
        pub async fn open() -> Option<Self> {
            let url = std::env::var("TEST_DATABASE_URL").ok()?;
            let admin = PgPoolOptions::new()
                .max_connections(1)
                .connect(&url)
                .await
                .expect("connect to TEST_DATABASE_URL");

            let schema = format!("snippetbox_test_{:016x}", rand::random::<u64>());
            sqlx::query(&format!("CREATE SCHEMA {schema}"))
                .execute(&admin)
                .await
                .expect("create test schema");

            let options = url
                .parse::<PgConnectOptions>()
                .expect("parse TEST_DATABASE_URL")
                .options([("search_path", schema.as_str())]);
            let pool = PgPoolOptions::new()
                .max_connections(4)
                .connect_with(options)
                .await
                .expect("connect to test schema");
            super::migrate(&pool).await.expect("migrate test schema");

            Some(Self {
                pool,
                admin,
                schema,
            })
        }

        pub async fn close(self) {
            self.pool.close().await;
            sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
                .execute(&self.admin)
                .await
                .expect("drop test schema");
        }
    }
}
