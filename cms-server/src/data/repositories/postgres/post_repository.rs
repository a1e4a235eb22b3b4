use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::data::post_repository::{NewPost, Pagination, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostSearch};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_SELECT: &str = r#"
    SELECT
        p.id,
        p.title,
        p.slug,
        p.excerpt,
        p.content,
        p.author_id,
        p.category_id,
        ARRAY(
            SELECT pt.tag_id FROM post_tags pt WHERE pt.post_id = p.id ORDER BY pt.tag_id
        ) AS tag_ids,
        p.status,
        p.views_count,
        p.created_at,
        p.updated_at,
        p.published_at
    FROM posts p
"#;

const PUBLISHED_FILTER: &str = r#"
    WHERE p.status = 'published'
      AND ($1::text IS NULL OR p.title ILIKE $1 OR p.content ILIKE $1 OR p.excerpt ILIKE $1)
      AND ($2::bigint IS NULL OR p.category_id = $2)
      AND ($3::bigint IS NULL OR EXISTS (
            SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = $3
      ))
"#;

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    slug: String,
    excerpt: String,
    content: String,
    author_id: i64,
    category_id: Option<i64>,
    tag_ids: Vec<i64>,
    status: String,
    views_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts
                (title, slug, excerpt, content, author_id, category_id, status, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(input.author_id)
        .bind(input.category_id)
        .bind(input.status.as_str())
        .bind(input.published_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        replace_tags(&mut tx, id, &input.tag_ids).await?;
        tx.commit().await.map_err(map_post_db_error)?;

        self.get_post(id)
            .await?
            .ok_or_else(|| DomainError::Unexpected(format!("post {id} vanished after insert")))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let sql = format!("{POST_SELECT} WHERE p.slug = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2,
                excerpt = $3,
                content = $4,
                category_id = $5,
                status = $6,
                published_at = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(post.category_id)
        .bind(post.status.as_str())
        .bind(post.published_at)
        .execute(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        replace_tags(&mut tx, post.id, &post.tag_ids).await?;
        tx.commit().await.map_err(map_post_db_error)?;

        self.get_post(post.id).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_views(&self, id: i64) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE posts
            SET views_count = views_count + 1
            WHERE id = $1
            RETURNING views_count
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)
    }

    async fn list_published(
        &self,
        search: &PostSearch,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let (limit, offset) = pagination.limit_offset();
        let sql = format!(
            "{POST_SELECT} {PUBLISHED_FILTER} ORDER BY p.published_at DESC, p.id DESC LIMIT $4 OFFSET $5"
        );

        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(search.query.as_deref().map(like_pattern))
            .bind(search.category_id)
            .bind(search.tag_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_published(&self, search: &PostSearch) -> Result<i64, DomainError> {
        let sql = format!("SELECT COUNT(*) FROM posts p {PUBLISHED_FILTER}");
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(search.query.as_deref().map(like_pattern))
            .bind(search.category_id)
            .bind(search.tag_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn popular_posts(&self, limit: i64) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            "{POST_SELECT} WHERE p.status = 'published' ORDER BY p.views_count DESC, p.id DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn related_posts(&self, post: &Post, limit: i64) -> Result<Vec<Post>, DomainError> {
        let Some(category_id) = post.category_id else {
            return Ok(Vec::new());
        };
        let sql = format!(
            "{POST_SELECT} WHERE p.status = 'published' AND p.category_id = $1 AND p.id <> $2 \
             ORDER BY p.published_at DESC, p.id DESC LIMIT $3"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(category_id)
            .bind(post.id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>, DomainError> {
        let sql = format!("{POST_SELECT} WHERE p.author_id = $1 ORDER BY p.created_at DESC, p.id DESC");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }
}

async fn replace_tags(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    tag_ids: &[i64],
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut **tx)
        .await
        .map_err(map_post_db_error)?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO post_tags (post_id, tag_id)
        SELECT $1, UNNEST($2::bigint[])
        "#,
    )
    .bind(post_id)
    .bind(tag_ids)
    .execute(&mut **tx)
    .await
    .map_err(map_post_db_error)?;

    Ok(())
}

/// `%query%` with LIKE metacharacters escaped.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let status = row
        .status
        .parse()
        .map_err(|err: DomainError| DomainError::Unexpected(err.to_string()))?;
    Ok(Post {
        id: row.id,
        title: row.title,
        slug: row.slug,
        excerpt: row.excerpt,
        content: row.content,
        author_id: row.author_id,
        category_id: row.category_id,
        tag_ids: row.tag_ids,
        status,
        views_count: row.views_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
        published_at: row.published_at,
    })
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23503") => {
                let resource = match db_err.constraint() {
                    Some("posts_category_id_fkey") => "category",
                    Some("post_tags_tag_id_fkey") => "tag",
                    _ => "author",
                };
                return DomainError::NotFound(resource.to_string());
            }
            Some("23505") => return DomainError::AlreadyExists("post slug".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_done\\"), "%100\\%\\_done\\\\%");
    }
}
