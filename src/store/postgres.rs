use super::{NewUser, StoreError, User, UserPatch, UserStore};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, Connection, PgPool, Row};
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// PostgreSQL-backed store. Email uniqueness is enforced by the
/// `users_email_key` unique index.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// # Errors
    /// Returns an error if the pool cannot connect.
    pub async fn connect(dsn: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await?;

        Ok(Self { pool })
    }

    /// Apply `sql/schema.sql`. Every statement is idempotent.
    ///
    /// # Errors
    /// Returns an error if a statement fails.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        name: row.get("name"),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = r"
            SELECT id, email, password_hash, name
            FROM users
            WHERE email = $1
            LIMIT 1
        ";
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = r"
            SELECT id, email, password_hash, name
            FROM users
            WHERE id = $1
            LIMIT 1
        ";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        // ON CONFLICT makes the uniqueness check and the insert one statement.
        let query = r"
            INSERT INTO users (id, email, password_hash, name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, name
        ";
        let result = sqlx::query(query)
            .bind(Uuid::now_v7())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(row)) => Ok(user_from_row(&row)),
            Ok(None) => {
                debug!("email already registered");
                Err(StoreError::Conflict(user.email))
            }
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict(user.email)),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, StoreError> {
        let query = r"
            UPDATE users
            SET
                name = COALESCE($1, name),
                password_hash = COALESCE($2, password_hash),
                updated_at = NOW()
            WHERE id = $3
            RETURNING id, email, password_hash, name
        ";
        let row = sqlx::query(query)
            .bind(patch.name)
            .bind(patch.password_hash)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(user_from_row)
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let query = r"
            SELECT id, email, password_hash, name
            FROM users
            ORDER BY created_at, id
        ";
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
