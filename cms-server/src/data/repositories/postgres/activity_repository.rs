use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::activity_repository::ActivityRepository;
use crate::domain::activity::{Activity, ActivityKind, NewActivity};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresActivityRepository {
    pool: PgPool,
}

impl PostgresActivityRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ActivityRow {
    id: i64,
    user_id: i64,
    activity_type: String,
    post_id: Option<i64>,
    ip_address: Option<String>,
    user_agent: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct KindCountRow {
    activity_type: String,
    count: i64,
}

#[async_trait]
impl ActivityRepository for PostgresActivityRepository {
    async fn record(&self, input: NewActivity) -> Result<Activity, DomainError> {
        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            INSERT INTO user_activities (user_id, activity_type, post_id, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, activity_type, post_id, ip_address, user_agent, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.kind.as_str())
        .bind(input.post_id)
        .bind(&input.client.ip_address)
        .bind(&input.client.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(map_activity_db_error)?;

        map_row_to_activity(row)
    }

    async fn recent_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Activity>, DomainError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, user_id, activity_type, post_id, ip_address, user_agent, created_at
            FROM user_activities
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_activity_db_error)?;

        rows.into_iter().map(map_row_to_activity).collect()
    }

    async fn count_by_kind(&self, user_id: i64) -> Result<Vec<(ActivityKind, i64)>, DomainError> {
        let rows = sqlx::query_as::<_, KindCountRow>(
            r#"
            SELECT activity_type, COUNT(*) AS count
            FROM user_activities
            WHERE user_id = $1
            GROUP BY activity_type
            ORDER BY activity_type
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_activity_db_error)?;

        rows.into_iter()
            .map(|row| Ok((row.activity_type.parse()?, row.count)))
            .collect()
    }
}

fn map_row_to_activity(row: ActivityRow) -> Result<Activity, DomainError> {
    Ok(Activity {
        id: row.id,
        user_id: row.user_id,
        kind: row.activity_type.parse()?,
        post_id: row.post_id,
        ip_address: row.ip_address,
        user_agent: row.user_agent,
        created_at: row.created_at,
    })
}

fn map_activity_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("user or post".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
