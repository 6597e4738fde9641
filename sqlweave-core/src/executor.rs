//! Statement execution over a connection pool

use std::future::Future;
use std::time::Duration;

use futures::TryStreamExt;
use indexmap::IndexMap;
use serde::Serialize;
use sqlx::any::{AnyArguments, AnyPoolOptions, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Column, Row as _};

use crate::config::ConnectionConfig;
use crate::{
    DeleteBuilder, DialectRef, Error, InsertBuilder, Literal, PlaceholderStyle, QueryBuilder,
    Result, SelectBuilder, Sql, Statement, UpdateBuilder, Value,
};

/// A fetched row: column name → value, in select-list order
pub type Row = IndexMap<String, serde_json::Value>;

/// Outcome of a statement that returns no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Generated key, when the driver reports one (MySQL, SQLite)
    pub last_insert_id: Option<i64>,
}

/// Anything that can run a rendered statement
pub trait Executor: Send + Sync {
    /// Execute a statement that returns no results (INSERT, UPDATE, DELETE)
    fn execute(&self, statement: &Statement) -> impl Future<Output = Result<ExecResult>> + Send;

    /// Execute a statement that returns multiple rows
    fn fetch_all(&self, statement: &Statement) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Execute a statement that returns at most one row
    fn fetch_optional(
        &self,
        statement: &Statement,
    ) -> impl Future<Output = Result<Option<Row>>> + Send;
}

/// Connection pool over sqlx's runtime-selected driver
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    dialect: DialectRef,
    placeholder_style: PlaceholderStyle,
    statement_timeout: Option<Duration>,
}

impl Database {
    /// Open a pool for `config`
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let url = config.to_url()?;
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&url)
            .await
            .map_err(log_failure)?;

        tracing::debug!(
            target: "sqlweave::sql",
            driver = config.driver.scheme(),
            host = %config.host,
            database = %config.database,
            "connection pool opened"
        );

        Ok(Self {
            pool,
            dialect: config.dialect(),
            placeholder_style: config.placeholder_style(),
            statement_timeout: config.statement_timeout(),
        })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: AnyPool, dialect: DialectRef, placeholder_style: PlaceholderStyle) -> Self {
        Self {
            pool,
            dialect,
            placeholder_style,
            statement_timeout: None,
        }
    }

    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    /// Builders bound to this database's dialect
    pub fn sql(&self) -> Sql {
        Sql::new(self.dialect.clone())
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn prepare(&self, statement: &Statement) -> Result<(String, Vec<Value>)> {
        let (sql, values) = statement.to_positional(self.dialect.as_ref(), self.placeholder_style)?;
        tracing::debug!(
            target: "sqlweave::sql",
            sql = %sql,
            params = values.len(),
            "executing statement"
        );
        Ok((sql, values))
    }

    async fn with_timeout<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        let result = match self.statement_timeout {
            Some(limit) => match tokio::time::timeout(limit, future).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(target: "sqlweave::sql", timeout = ?limit, "statement timed out");
                    return Err(Error::Timeout(limit));
                }
            },
            None => future.await,
        };
        result.map_err(log_failure)
    }
}

impl Executor for Database {
    async fn execute(&self, statement: &Statement) -> Result<ExecResult> {
        let (sql, values) = self.prepare(statement)?;
        let query = bind_values(sqlx::query(&sql), values);
        let result = self.with_timeout(query.execute(&self.pool)).await?;
        Ok(ExecResult {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }

    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>> {
        let (sql, values) = self.prepare(statement)?;
        let query = bind_values(sqlx::query(&sql), values);
        let rows = self
            .with_timeout(async {
                let mut stream = query.fetch(&self.pool);
                let mut rows = Vec::new();
                while let Some(row) = stream.try_next().await? {
                    rows.push(row);
                }
                Ok::<_, sqlx::Error>(rows)
            })
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn fetch_optional(&self, statement: &Statement) -> Result<Option<Row>> {
        let (sql, values) = self.prepare(statement)?;
        let query = bind_values(sqlx::query(&sql), values);
        let row = self.with_timeout(query.fetch_optional(&self.pool)).await?;
        row.as_ref().map(decode_row).transpose()
    }
}

fn log_failure(err: sqlx::Error) -> Error {
    tracing::warn!(target: "sqlweave::sql", error = %err, "statement failed");
    Error::Database(err)
}

/// Bind values positionally. JSON travels as text since not every driver has a JSON type.
fn bind_values<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    values: Vec<Value>,
) -> Query<'q, Any, AnyArguments<'q>> {
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<i32>),
            Value::Bool(b) => query.bind(b),
            Value::I32(i) => query.bind(i),
            Value::I64(i) => query.bind(i),
            Value::F32(f) => query.bind(f),
            Value::F64(f) => query.bind(f),
            Value::String(s) => query.bind(s),
            Value::Bytes(b) => query.bind(b),
            Value::Json(j) => query.bind(j.to_string()),
        };
    }
    query
}

fn decode_row(row: &AnyRow) -> Result<Row> {
    let mut decoded = Row::with_capacity(row.columns().len());
    for column in row.columns() {
        let value = decode_column(row, column.ordinal())?;
        decoded.insert(column.name().to_string(), value);
    }
    Ok(decoded)
}

// Tries each type the Any driver can produce; NULL decodes as None on the first attempt.
fn decode_column(row: &AnyRow, index: usize) -> Result<serde_json::Value> {
    use serde_json::Value as Json;

    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return Ok(v.map(Json::from).unwrap_or(Json::Null));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return Ok(v
            .and_then(serde_json::Number::from_f64)
            .map(Json::Number)
            .unwrap_or(Json::Null));
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return Ok(v.map(Json::Bool).unwrap_or(Json::Null));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return Ok(v.map(Json::String).unwrap_or(Json::Null));
    }
    let bytes: Option<Vec<u8>> = row.try_get(index)?;
    Ok(bytes
        .map(|b| Json::Array(b.into_iter().map(Json::from).collect()))
        .unwrap_or(Json::Null))
}

/// Extension trait for row-returning builders
pub trait ExecutableQuery: QueryBuilder + Sync {
    /// Render and return all rows
    fn fetch_all<E: Executor>(&self, executor: &E) -> impl Future<Output = Result<Vec<Row>>> + Send {
        async move {
            let statement = self.render()?;
            executor.fetch_all(&statement).await
        }
    }

    /// Render and return the first row, if any
    fn fetch_optional<E: Executor>(
        &self,
        executor: &E,
    ) -> impl Future<Output = Result<Option<Row>>> + Send {
        async move {
            let statement = self.render()?;
            executor.fetch_optional(&statement).await
        }
    }
}

/// Extension trait for modification statements (INSERT, UPDATE, DELETE)
pub trait ExecutableModification: QueryBuilder + Sync {
    /// Render and execute, returning the affected-row count
    fn execute<E: Executor>(&self, executor: &E) -> impl Future<Output = Result<ExecResult>> + Send {
        async move {
            let statement = self.render()?;
            executor.execute(&statement).await
        }
    }
}

impl ExecutableQuery for SelectBuilder {}
impl ExecutableQuery for Literal {}

impl ExecutableModification for InsertBuilder {}
impl ExecutableModification for UpdateBuilder {}
impl ExecutableModification for DeleteBuilder {}
impl ExecutableModification for Literal {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dialect, op};
    use serde_json::json;
    use std::sync::Mutex;

    // Mock executor recording every statement it receives
    #[derive(Default)]
    struct MockExecutor {
        should_fail: bool,
        rows: Vec<Row>,
        seen: Mutex<Vec<Statement>>,
    }

    impl MockExecutor {
        fn with_rows(rows: Vec<serde_json::Value>) -> Self {
            let rows = rows
                .into_iter()
                .map(|row| match row {
                    serde_json::Value::Object(map) => map.into_iter().collect(),
                    _ => Row::new(),
                })
                .collect();
            Self {
                rows,
                ..Self::default()
            }
        }

        fn with_failure() -> Self {
            Self {
                should_fail: true,
                ..Self::default()
            }
        }

        fn record(&self, statement: &Statement) -> Result<()> {
            if self.should_fail {
                return Err(Error::Database(sqlx::Error::PoolTimedOut));
            }
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(statement.clone());
            }
            Ok(())
        }

        fn last(&self) -> Option<Statement> {
            self.seen.lock().ok().and_then(|seen| seen.last().cloned())
        }
    }

    impl Executor for MockExecutor {
        async fn execute(&self, statement: &Statement) -> Result<ExecResult> {
            self.record(statement)?;
            Ok(ExecResult {
                rows_affected: 1,
                last_insert_id: Some(42),
            })
        }

        async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>> {
            self.record(statement)?;
            Ok(self.rows.clone())
        }

        async fn fetch_optional(&self, statement: &Statement) -> Result<Option<Row>> {
            self.record(statement)?;
            Ok(self.rows.first().cloned())
        }
    }

    #[tokio::test]
    async fn test_select_fetch_all() {
        let executor = MockExecutor::with_rows(vec![
            json!({"id": 1, "name": "John"}),
            json!({"id": 2, "name": "Jane"}),
        ]);
        let query = SelectBuilder::new(dialect::mysql())
            .from("users")
            .unwrap()
            .columns(("id", "name"))
            .where_(("age", op::GT, 18))
            .unwrap();

        let rows = query.fetch_all(&executor).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], json!("Jane"));

        let seen = executor.last().unwrap();
        assert_eq!(seen.sql, "SELECT `id`, `name` FROM `users` WHERE `age` > :p0");
        assert_eq!(seen.params["p0"], Value::I32(18));
    }

    #[tokio::test]
    async fn test_select_fetch_optional() {
        let executor = MockExecutor::with_rows(vec![json!({"id": 1})]);
        let query = SelectBuilder::new(dialect::generic())
            .from("users")
            .unwrap()
            .where_(("id", 1))
            .unwrap()
            .limit(1);

        let row = query.fetch_optional(&executor).await.unwrap().unwrap();
        assert_eq!(row["id"], json!(1));

        let empty = MockExecutor::default();
        assert!(query.fetch_optional(&empty).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_modifications_execute() {
        let executor = MockExecutor::default();

        let insert = InsertBuilder::new(dialect::mysql())
            .into("users")
            .unwrap()
            .set("name", "Test");
        let result = insert.execute(&executor).await.unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.last_insert_id, Some(42));

        let update = UpdateBuilder::new(dialect::mysql())
            .table("users")
            .unwrap()
            .set("name", "Updated")
            .where_(("id", 1))
            .unwrap();
        update.execute(&executor).await.unwrap();
        assert_eq!(
            executor.last().unwrap().sql,
            "UPDATE `users` SET `name` = :name WHERE `id` = :p0"
        );

        let delete = DeleteBuilder::new(dialect::mysql())
            .from("users")
            .unwrap()
            .where_(("age", op::LT, 13))
            .unwrap();
        delete.execute(&executor).await.unwrap();
        assert_eq!(executor.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_literal_statement() {
        let executor = MockExecutor::default();
        let literal = Literal::new("DELETE FROM sessions WHERE expires_at < :now").bind("now", 100);
        literal.execute(&executor).await.unwrap();
        assert_eq!(executor.last().unwrap().params["now"], Value::I32(100));
    }

    #[tokio::test]
    async fn test_render_failure_never_reaches_executor() {
        let executor = MockExecutor::default();
        let update = UpdateBuilder::new(dialect::mysql()).table("users").unwrap();

        let err = update.execute(&executor).await.unwrap_err();
        assert!(err.is_logic());
        assert!(executor.last().is_none());
    }

    #[tokio::test]
    async fn test_executor_failure_is_passed_through() {
        let executor = MockExecutor::with_failure();
        let query = SelectBuilder::new(dialect::mysql()).from("users").unwrap();

        let err = query.fetch_all(&executor).await.unwrap_err();
        assert!(matches!(err, Error::Database(sqlx::Error::PoolTimedOut)));
    }

    #[test]
    fn test_blocking_on_executor() {
        let executor = MockExecutor::default();
        let delete = DeleteBuilder::new(dialect::generic()).from("jobs").unwrap();
        let result = tokio_test::block_on(delete.execute(&executor)).unwrap();
        assert_eq!(result.rows_affected, 1);
    }

    #[test]
    fn test_exec_result_serializes() {
        let result = ExecResult {
            rows_affected: 3,
            last_insert_id: None,
        };
        assert_eq!(
            serde_json::to_value(result).unwrap(),
            json!({"rows_affected": 3, "last_insert_id": null})
        );
    }
}
