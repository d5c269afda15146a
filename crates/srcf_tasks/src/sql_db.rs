//! Account/database provisioning jobs for the two managed SQL dialects.
//! Grounded on `srcflib.tasks.mysql.create_user_database`/
//! `srcflib.tasks.pgsql.create_user_database` and their society
//! equivalents, both of which just ensure the login exists and ensure the
//! identically-named database exists owned by it.

use srcf_task::{ResultBuilder, TaskResult};

use crate::context::TaskContext;
use crate::error::Result;

pub async fn create_mysql_database(ctx: &TaskContext, owner_name: &str) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    builder.step(
        "ensure_user",
        srcf_sql::mysql::ensure_user(&ctx.mysql_pool, owner_name).await?.map(|_| ()),
    );
    builder.step(
        "create_database",
        srcf_sql::mysql::create_database(&ctx.mysql_pool, owner_name, Some(owner_name)).await?,
    );
    Ok(builder.finish("create_mysql_database", ()))
}

pub async fn create_postgres_database(ctx: &TaskContext, owner_name: &str) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    builder.step(
        "ensure_user",
        srcf_sql::pgsql::ensure_user(&ctx.pg_pool, owner_name).await?.map(|_| ()),
    );
    builder.step(
        "create_database",
        srcf_sql::pgsql::create_database(&ctx.pg_pool, owner_name, Some(owner_name)).await?,
    );
    Ok(builder.finish("create_postgres_database", ()))
}
