//! Pooled PostgreSQL and MySQL connections for ordinary job/job-log and
//! task-layer CRUD. The runner and task layer both talk to MySQL directly
//! for the MySQL-dialect jobs (`srcf_sql::mysql`), alongside Postgres for
//! everything else (`srcf_protocol`'s member/society tables, job/job-log
//! rows, and `srcf_sql::pgsql`).

use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::{MySql, Pool, Postgres};

use crate::error::Result;

pub type DbPool = Pool<Postgres>;
pub type MySqlDbPool = Pool<MySql>;

/// Connection configuration for the ordinary (pooled) database handle.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

/// Open a pooled connection to PostgreSQL.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;
    Ok(pool)
}

/// Open a pooled connection to MySQL. Shares `DbConfig`'s shape since the
/// only thing that differs is the connection string scheme.
pub async fn create_mysql_pool(config: &DbConfig) -> Result<MySqlDbPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_ten_connections() {
        let config = DbConfig::from_url("postgres://localhost/srcf");
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn with_max_connections_overrides_default() {
        let config = DbConfig::from_url("postgres://localhost/srcf").with_max_connections(2);
        assert_eq!(config.max_connections, 2);
    }
}
