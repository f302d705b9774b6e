//! The PostgreSQL pool and connections, on top of sqlx.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use sqlx::encode::IsNull;
use sqlx::pool::PoolConnection;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgPool, PgRow, PgTypeInfo, Postgres};
use sqlx::{Column, Either, Row, TypeInfo};
use uuid::Uuid;

use crate::error::BoxError;
use crate::pool::{Connection, ConnectionPool};
use crate::result::{BatchResult, ResultSet, UpdateResult};
use crate::value::Value;

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

#[derive(Debug, Clone)]
pub struct PostgresPool(PgPool);

impl PostgresPool {
    pub fn new(pool: PgPool) -> Self {
        Self(pool)
    }

    pub fn inner(&self) -> &PgPool {
        &self.0
    }
}

impl From<PgPool> for PostgresPool {
    fn from(pool: PgPool) -> Self {
        Self::new(pool)
    }
}

#[async_trait]
impl ConnectionPool for PostgresPool {
    type Connection = PostgresConnection;

    async fn acquire(&self) -> Result<PostgresConnection, BoxError> {
        let connection = self.0.acquire().await?;
        Ok(PostgresConnection {
            connection: Some(connection),
        })
    }
}

/// A pooled connection. Dropping the inner connection returns it to the pool.
pub struct PostgresConnection {
    connection: Option<PoolConnection<Postgres>>,
}

impl PostgresConnection {
    fn live(&mut self) -> Result<&mut PoolConnection<Postgres>, BoxError> {
        self.connection
            .as_mut()
            .ok_or_else(|| BoxError::from("the connection was already released"))
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, BoxError> {
        let connection = self.live()?;
        let rows = bind_all(sqlx::query(sql), params)
            .fetch_all(&mut **connection)
            .await?;
        Ok(rows_to_result_set(&rows)?)
    }

    async fn update(&mut self, sql: &str, params: &[Value]) -> Result<UpdateResult, BoxError> {
        let connection = self.live()?;
        let mut result = UpdateResult::default();
        // `execute` drops the rows of `RETURNING`, `fetch_all` drops the counts.
        #[allow(deprecated)]
        let mut steps = bind_all(sqlx::query(sql), params).fetch_many(&mut **connection);
        while let Some(step) = steps.try_next().await? {
            match step {
                Either::Left(done) => result.updated += done.rows_affected(),
                // rows returned by e.g. `RETURNING id`
                Either::Right(row) => {
                    if !row.columns().is_empty() {
                        result.keys.push(decode_value(&row, 0)?);
                    }
                }
            }
        }
        Ok(result)
    }

    async fn batch(&mut self, sql: &str, batch: &[Vec<Value>]) -> Result<BatchResult, BoxError> {
        let connection = self.live()?;
        let mut counts = Vec::with_capacity(batch.len());
        for params in batch {
            let done = bind_all(sqlx::query(sql), params)
                .execute(&mut **connection)
                .await?;
            counts.push(done.rows_affected());
        }
        Ok(counts)
    }

    fn release(&mut self) {
        if self.connection.take().is_some() {
            tracing::trace!("returned connection to the pool");
        }
    }
}

/// An untyped null. The server infers the parameter type from the statement.
#[derive(Debug, Clone, Copy)]
struct Null;

impl sqlx::Type<Postgres> for Null {
    fn type_info() -> PgTypeInfo {
        // OID 0 leaves the parameter type unspecified in the Parse message.
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl sqlx::Encode<'_, Postgres> for Null {
    fn encode_by_ref(&self, _: &mut PgArgumentBuffer) -> IsNull {
        IsNull::Yes
    }
}

fn bind_all<'q>(query: PgQuery<'q>, params: &[Value]) -> PgQuery<'q> {
    // Statements are cached by their text, and the types inferred for an
    // untyped null must not leak into later executions with typed values.
    let persistent = !params.iter().any(|value| matches!(value, Value::Null));
    params
        .iter()
        .fold(query, bind_value)
        .persistent(persistent)
}

fn bind_value<'q>(query: PgQuery<'q>, value: &Value) -> PgQuery<'q> {
    match value {
        Value::Null => query.bind(Null),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Numeric(n) => query.bind(*n),
        Value::String(s) => query.bind(s.clone()),
        Value::Bytes(b) => query.bind(b.clone()),
        Value::Uuid(u) => query.bind(*u),
        Value::Date(d) => query.bind(*d),
        Value::Time(t) => query.bind(*t),
        Value::Timestamp(t) => query.bind(*t),
        Value::TimestampTz(t) => query.bind(*t),
        Value::Json(j) => query.bind(j.clone()),
    }
}

fn rows_to_result_set(rows: &[PgRow]) -> Result<ResultSet, sqlx::Error> {
    let columns: Vec<String> = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| {
            (0..row.columns().len())
                .map(|index| decode_value(row, index))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResultSet::new(columns, rows))
}

fn decode_value(row: &PgRow, index: usize) -> Result<Value, sqlx::Error> {
    let type_name = row.column(index).type_info().name();
    match type_name {
        "BOOL" => get::<bool>(row, index),
        "INT2" => get::<i16>(row, index),
        "INT4" => get::<i32>(row, index),
        "INT8" => get::<i64>(row, index),
        "FLOAT4" => get::<f32>(row, index),
        "FLOAT8" => get::<f64>(row, index),
        "NUMERIC" => get::<Decimal>(row, index),
        "DATE" => get::<NaiveDate>(row, index),
        "TIME" => get::<NaiveTime>(row, index),
        "TIMESTAMP" => get::<NaiveDateTime>(row, index),
        "TIMESTAMPTZ" => get::<DateTime<Utc>>(row, index),
        "UUID" => get::<Uuid>(row, index),
        "BYTEA" => get::<Vec<u8>>(row, index),
        "JSON" | "JSONB" => get::<serde_json::Value>(row, index),
        "TEXT" | "VARCHAR" | "CHAR" | "NAME" | "UNKNOWN" => get::<String>(row, index),
        other => Err(sqlx::Error::ColumnDecode {
            index: row.column(index).name().to_string(),
            source: format!("unsupported column type {other}").into(),
        }),
    }
}

fn get<'r, T>(row: &'r PgRow, index: usize) -> Result<Value, sqlx::Error>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres> + Into<Value>,
{
    Ok(Value::from(row.try_get::<Option<T>, _>(index)?))
}
