use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::comment_repository::{CommentRepository, CommentWithPost, NewComment};
use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    content: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CommentWithPostRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    post_author_id: i64,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (post_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, user_id, content, status, created_at, updated_at
            "#,
        )
        .bind(input.post_id)
        .bind(input.user_id)
        .bind(&input.content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        map_row_to_comment(row)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<CommentWithPost>, DomainError> {
        let row = sqlx::query_as::<_, CommentWithPostRow>(
            r#"
            SELECT
                c.id,
                c.post_id,
                c.user_id,
                c.content,
                c.status,
                c.created_at,
                c.updated_at,
                p.author_id AS post_author_id
            FROM comments c
            JOIN posts p ON p.id = c.post_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        row.map(|row| {
            Ok(CommentWithPost {
                comment: map_row_to_comment(row.comment)?,
                post_author_id: row.post_author_id,
            })
        })
        .transpose()
    }

    async fn save_status(&self, comment: &Comment) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE comments
            SET status = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, post_id, user_id, content, status, created_at, updated_at
            "#,
        )
        .bind(comment.id)
        .bind(comment.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_post(
        &self,
        post_id: i64,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, user_id, content, status, created_at, updated_at
            FROM comments
            WHERE post_id = $1
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(post_id)
        .bind(status.map(CommentStatus::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, user_id, content, status, created_at, updated_at
            FROM comments
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }

    async fn set_status_bulk(&self, ids: &[i64], status: CommentStatus) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET status = $2,
                updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(result.rows_affected())
    }

    async fn count_for_author(&self, author_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM comments c
            JOIN posts p ON p.id = c.post_id
            WHERE p.author_id = $1
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)
    }
}

fn map_row_to_comment(row: CommentRow) -> Result<Comment, DomainError> {
    Ok(Comment {
        id: row.id,
        post_id: row.post_id,
        user_id: row.user_id,
        content: row.content,
        status: row.status.parse()?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("post".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
