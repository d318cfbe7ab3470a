use async_trait::async_trait;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde_json::Value;
use sqlx::{postgres::PgRow, Column, PgPool, Row, TypeInfo, ValueRef};

use crate::{middleware::error_handling::Result, models::query::Record};

/// Runs generated SQL against the data store.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute `sql` verbatim and return every row as a record.
    async fn execute(&self, sql: &str) -> Result<Vec<Record>>;
}

pub struct PgQueryExecutor {
    db_pool: PgPool,
}

impl PgQueryExecutor {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl QueryExecutor for PgQueryExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<Record>> {
        let rows = sqlx::query(sql).fetch_all(&self.db_pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(row_to_record(row)?);
        }
        Ok(records)
    }
}

/// Convert a PgRow into a JSON record, keeping column order
fn row_to_record(row: &PgRow) -> std::result::Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info().name())?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn decode_column(
    row: &PgRow,
    index: usize,
    type_name: &str,
) -> std::result::Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" | "CITEXT" => {
            Value::String(row.try_get::<String, _>(index)?)
        }
        "INT2" => Value::from(row.try_get::<i16, _>(index)?),
        "INT4" => Value::from(row.try_get::<i32, _>(index)?),
        "INT8" => Value::from(row.try_get::<i64, _>(index)?),
        "FLOAT4" => float_value(f64::from(row.try_get::<f32, _>(index)?)),
        "FLOAT8" => float_value(row.try_get::<f64, _>(index)?),
        "NUMERIC" => decimal_value(row.try_get::<Decimal, _>(index)?),
        "BOOL" => Value::Bool(row.try_get::<bool, _>(index)?),
        "DATE" => Value::String(row.try_get::<chrono::NaiveDate, _>(index)?.to_string()),
        "TIMESTAMP" => Value::String(
            row.try_get::<chrono::NaiveDateTime, _>(index)?
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
        ),
        "TIMESTAMPTZ" => Value::String(
            row.try_get::<chrono::DateTime<chrono::Utc>, _>(index)?
                .to_rfc3339(),
        ),
        "UUID" => Value::String(row.try_get::<uuid::Uuid, _>(index)?.to_string()),
        "JSON" | "JSONB" => row.try_get::<Value, _>(index)?,
        other => match row.try_get::<String, _>(index) {
            Ok(text) => Value::String(text),
            Err(_) => {
                tracing::debug!(column_type = other, "Unsupported column type, returning null");
                Value::Null
            }
        },
    };

    Ok(value)
}

fn float_value(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// NUMERIC becomes a JSON number when it fits an f64, otherwise its text form.
fn decimal_value(d: Decimal) -> Value {
    d.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(d.to_string()))
}
