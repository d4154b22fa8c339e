use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::connection::models::QboConnection;
use crate::connection::repositories::ConnectionRepository;
use ledgersync_common::error::{LedgerError, LedgerResult};

#[derive(Clone)]
pub struct PgConnectionRepository {
    pool: PgPool,
}

impl PgConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionRepository for PgConnectionRepository {
    async fn get_by_company(&self, company_id: &str) -> LedgerResult<Option<QboConnection>> {
        let row = sqlx::query(
            "select company_id, realm_id, access_token, updated_at
             from qbo_connections where company_id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(row.map(|r| QboConnection {
            company_id: r.get("company_id"),
            realm_id: r.get("realm_id"),
            access_token: r.get("access_token"),
            updated_at: r.get("updated_at"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;
    use uuid::Uuid;

    async fn test_repo() -> Option<(PgConnectionRepository, PgPool)> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = create_pool(&url).await.expect("db should connect");

        sqlx::query(
            "create table if not exists qbo_connections (
               company_id text primary key,
               realm_id text not null,
               access_token text not null,
               updated_at timestamptz not null default now()
             )",
        )
        .execute(&pool)
        .await
        .ok()?;

        Some((PgConnectionRepository::new(pool.clone()), pool))
    }

    #[tokio::test]
    async fn missing_company_returns_none() {
        let Some((repo, _pool)) = test_repo().await else {
            return;
        };
        let found = repo
            .get_by_company(&format!("test-{}", Uuid::new_v4()))
            .await
            .expect("query");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn existing_company_returns_realm_and_token() {
        let Some((repo, pool)) = test_repo().await else {
            return;
        };
        let company = format!("test-{}", Uuid::new_v4());
        sqlx::query(
            "insert into qbo_connections (company_id, realm_id, access_token) values ($1, $2, $3)",
        )
        .bind(&company)
        .bind("9130357")
        .bind("token-abc")
        .execute(&pool)
        .await
        .expect("insert");

        let conn = repo
            .get_by_company(&company)
            .await
            .expect("query")
            .expect("row");
        assert_eq!(conn.realm_id, "9130357");
        assert_eq!(conn.access_token, "token-abc");
    }
}
