// File: src/db/mod.rs
// Purpose: Prepared-statement query layer over a shared SQLite pool

pub mod error;
pub mod value;

use std::str::FromStr;

use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, Sqlite, Statement};

pub use error::QueryError;
pub use value::{Row, SqlValue};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Open the database, creating the file if needed.
///
/// One pool per process; per-request connection scoping is the caller's
/// responsibility.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Apply the booking-site schema (idempotent).
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            birthdate TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            adults INTEGER NOT NULL,
            children INTEGER NOT NULL,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            room_id INTEGER NOT NULL REFERENCES rooms(id),
            checkin TEXT NOT NULL,
            checkout TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// SQL text plus its bound values, validated against the type signature at
/// construction. One code per value: `i` integer, `d` float, `s` string,
/// `b` blob.
#[derive(Debug, Clone)]
pub struct BoundQuery {
    pub sql: String,
    pub values: Vec<SqlValue>,
    pub types: String,
}

impl BoundQuery {
    /// Rejects a signature that does not describe `values`, before any
    /// connection is involved.
    pub fn new(
        sql: impl Into<String>,
        values: Vec<SqlValue>,
        types: impl Into<String>,
    ) -> Result<Self, QueryError> {
        let types = types.into();
        value::check_signature(&values, &types)?;
        Ok(Self {
            sql: sql.into(),
            values,
            types,
        })
    }
}

/// Runs every statement as a prepared statement with positionally bound
/// values. One call is one prepare/bind/execute/release cycle; the statement
/// handle never outlives the call. No transactions, retries, or partial
/// failure handling here; any such policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    pool: SqlitePool,
}

impl QueryExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run an unparameterized `SELECT *` over a whole table.
    ///
    /// `table` is interpolated into the SQL unescaped, because identifiers
    /// cannot be parameter-bound. It must be a trusted, non-user-controlled
    /// identifier; never route user input here without an allow-list.
    pub async fn select_all(&self, table: &str) -> Result<Vec<Row>, QueryError> {
        let query = BoundQuery::new(format!("SELECT * FROM {table}"), Vec::new(), "")?;
        self.fetch(&query).await
    }

    /// Run a parameterized read and materialize the result set.
    pub async fn select(
        &self,
        sql: &str,
        values: &[SqlValue],
        types: &str,
    ) -> Result<Vec<Row>, QueryError> {
        let query = BoundQuery::new(sql, values.to_vec(), types)?;
        self.fetch(&query).await
    }

    /// Run a parameterized `INSERT`; returns the affected-row count.
    pub async fn insert(
        &self,
        sql: &str,
        values: &[SqlValue],
        types: &str,
    ) -> Result<u64, QueryError> {
        let query = BoundQuery::new(sql, values.to_vec(), types)?;
        self.execute(&query).await
    }

    /// Run a parameterized `UPDATE`; returns the affected-row count.
    pub async fn update(
        &self,
        sql: &str,
        values: &[SqlValue],
        types: &str,
    ) -> Result<u64, QueryError> {
        let query = BoundQuery::new(sql, values.to_vec(), types)?;
        self.execute(&query).await
    }

    /// Run a parameterized `DELETE`; returns the affected-row count
    /// (matching zero rows is `Ok(0)`, not an error).
    pub async fn delete(
        &self,
        sql: &str,
        values: &[SqlValue],
        types: &str,
    ) -> Result<u64, QueryError> {
        let query = BoundQuery::new(sql, values.to_vec(), types)?;
        self.execute(&query).await
    }

    async fn fetch(&self, query: &BoundQuery) -> Result<Vec<Row>, QueryError> {
        let mut conn = self.pool.acquire().await.map_err(QueryError::Acquire)?;

        let statement = (&mut *conn)
            .prepare(query.sql.as_str())
            .await
            .map_err(|e| {
                tracing::error!(sql = %query.sql, error = %e, "statement preparation failed");
                QueryError::Prepare(e)
            })?;

        let rows = bind_all(statement.query(), &query.values)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                tracing::error!(sql = %query.sql, error = %e, "statement execution failed");
                QueryError::Execute(e)
            })?;

        tracing::debug!(sql = %query.sql, rows = rows.len(), "select completed");
        rows.iter()
            .map(value::decode_row)
            .collect::<Result<Vec<Row>, sqlx::Error>>()
            .map_err(QueryError::Execute)
    }

    async fn execute(&self, query: &BoundQuery) -> Result<u64, QueryError> {
        let mut conn = self.pool.acquire().await.map_err(QueryError::Acquire)?;

        let statement = (&mut *conn)
            .prepare(query.sql.as_str())
            .await
            .map_err(|e| {
                tracing::error!(sql = %query.sql, error = %e, "statement preparation failed");
                QueryError::Prepare(e)
            })?;

        let result = bind_all(statement.query(), &query.values)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                tracing::error!(sql = %query.sql, error = %e, "statement execution failed");
                QueryError::Execute(e)
            })?;

        tracing::debug!(sql = %query.sql, rows_affected = result.rows_affected(), "write completed");
        Ok(result.rows_affected())
    }
}

fn bind_all<'q>(mut query: SqliteQuery<'q>, values: &[SqlValue]) -> SqliteQuery<'q> {
    for value in values {
        query = match value {
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Blob(v) => query.bind(v.clone()),
            // Unreachable: the signature check rejects Null binds.
            SqlValue::Null => query.bind(Option::<i64>::None),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every new in-memory connection is a fresh database, so the test pool
    // must hold exactly one connection.
    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    async fn executor() -> QueryExecutor {
        let pool = memory_pool().await;
        init_schema(&pool).await.unwrap();
        QueryExecutor::new(pool)
    }

    async fn seed_room(db: &QueryExecutor) -> u64 {
        db.insert(
            "INSERT INTO rooms (name, price, adults, children, description) VALUES (?, ?, ?, ?, ?)",
            &[
                SqlValue::from("Simple Room"),
                SqlValue::from(5000.0),
                SqlValue::from(10_i64),
                SqlValue::from(8_i64),
                SqlValue::from("Exquisite furnishing"),
            ],
            "sdiis",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_connect() {
        let pool = connect("sqlite::memory:").await.unwrap();
        assert!(!pool.is_closed());
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let pool = memory_pool().await;
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_returns_affected_rows() {
        let db = executor().await;
        assert_eq!(seed_room(&db).await, 1);
    }

    #[tokio::test]
    async fn test_select_returns_typed_rows() {
        let db = executor().await;
        seed_room(&db).await;
        db.insert(
            "INSERT INTO rooms (name, price, adults, children) VALUES (?, ?, ?, ?)",
            &[
                SqlValue::from("Attic Single"),
                SqlValue::from(1250.5),
                SqlValue::from(1_i64),
                SqlValue::from(0_i64),
            ],
            "sdii",
        )
        .await
        .unwrap();

        let rows = db
            .select(
                "SELECT name, price, adults, description FROM rooms WHERE price > ? ORDER BY id",
                &[SqlValue::from(1000.0)],
                "d",
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"].as_text(), Some("Simple Room"));
        assert_eq!(rows[0]["price"].as_float(), Some(5000.0));
        assert_eq!(rows[0]["adults"].as_int(), Some(10));
        // description omitted in the second insert comes back as SQL NULL.
        assert!(rows[1]["description"].is_null());
    }

    #[tokio::test]
    async fn test_select_all_trusted_table() {
        let db = executor().await;
        seed_room(&db).await;
        let rows = db.select_all("rooms").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains_key("id"));
    }

    #[tokio::test]
    async fn test_update_and_delete_counts() {
        let db = executor().await;
        seed_room(&db).await;

        let updated = db
            .update(
                "UPDATE rooms SET price = ? WHERE name = ?",
                &[SqlValue::from(5500.0), SqlValue::from("Simple Room")],
                "ds",
            )
            .await
            .unwrap();
        assert_eq!(updated, 1);

        // Deleting rows that do not exist is Ok(0), not an error.
        let deleted = db
            .delete(
                "DELETE FROM rooms WHERE name = ?",
                &[SqlValue::from("No Such Room")],
                "s",
            )
            .await
            .unwrap();
        assert_eq!(deleted, 0);

        let deleted = db
            .delete(
                "DELETE FROM rooms WHERE name = ?",
                &[SqlValue::from("Simple Room")],
                "s",
            )
            .await
            .unwrap();
        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn test_blob_round_trip() {
        let db = executor().await;
        db.insert(
            "INSERT INTO users (name, email, password) VALUES (?, ?, ?)",
            &[
                SqlValue::from("Kari"),
                SqlValue::from("kari@hotel.no"),
                SqlValue::from(vec![0x73, 0x65, 0x63]),
            ],
            "ssb",
        )
        .await
        .unwrap();

        let rows = db
            .select(
                "SELECT password FROM users WHERE email = ?",
                &[SqlValue::from("kari@hotel.no")],
                "s",
            )
            .await
            .unwrap();
        assert_eq!(rows[0]["password"].as_blob(), Some(&[0x73, 0x65, 0x63][..]));
    }

    #[tokio::test]
    async fn test_preparation_failure_is_fatal_for_request() {
        let db = executor().await;
        let err = db
            .select("SELECT * FROM no_such_table WHERE id = ?", &[SqlValue::from(1_i64)], "i")
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Prepare(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_execution_failure_is_fatal_for_request() {
        let db = executor().await;
        let insert = |email: &str| {
            let values = [
                SqlValue::from("Ola"),
                SqlValue::from(email.to_string()),
                SqlValue::from("hunter22"),
            ];
            let db = db.clone();
            async move {
                db.insert(
                    "INSERT INTO users (name, email, password) VALUES (?, ?, ?)",
                    &values,
                    "sss",
                )
                .await
            }
        };

        insert("ola@hotel.no").await.unwrap();
        let err = insert("ola@hotel.no").await.unwrap_err();
        assert!(matches!(err, QueryError::Execute(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_signature_mismatch_rejected_before_connection() {
        let db = executor().await;
        // Close the pool: any attempt to touch the connection would surface
        // as an acquire error, so a Signature error proves the precondition
        // check ran first.
        db.pool.close().await;

        let values = [SqlValue::from(1_i64), SqlValue::from("x")];
        for types in ["i", "iss", "si", ""] {
            let err = db
                .select("SELECT * FROM rooms WHERE id = ? AND name = ?", &values, types)
                .await
                .unwrap_err();
            assert!(matches!(err, QueryError::Signature(_)), "types {types:?} gave {err:?}");
        }
        for op in ["insert", "update", "delete"] {
            let err = match op {
                "insert" => {
                    db.insert("INSERT INTO rooms (id, name) VALUES (?, ?)", &values, "ss")
                        .await
                }
                "update" => {
                    db.update("UPDATE rooms SET name = ? WHERE id = ?", &values, "ss")
                        .await
                }
                _ => {
                    db.delete("DELETE FROM rooms WHERE id = ? AND name = ?", &values, "ss")
                        .await
                }
            }
            .unwrap_err();
            assert!(matches!(err, QueryError::Signature(_)), "{op} gave {err:?}");
        }
    }

    #[test]
    fn test_bound_query_validates_on_construction() {
        assert!(BoundQuery::new("SELECT 1", vec![SqlValue::from(1_i64)], "i").is_ok());
        assert!(BoundQuery::new("SELECT 1", vec![SqlValue::from(1_i64)], "s").is_err());
    }
}
