use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::taxonomy_repository::TaxonomyRepository;
use crate::domain::error::DomainError;
use crate::domain::taxonomy::{Category, CreateCategoryRequest, CreateTagRequest, Tag, TagUsage};

#[derive(Debug, Clone)]
pub(crate) struct PostgresTaxonomyRepository {
    pool: PgPool,
}

impl PostgresTaxonomyRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct TagRow {
    id: i64,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct TagUsageRow {
    #[sqlx(flatten)]
    tag: TagRow,
    post_count: i64,
}

#[async_trait]
impl TaxonomyRepository for PostgresTaxonomyRepository {
    async fn create_category(&self, input: CreateCategoryRequest) -> Result<Category, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, description, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_taxonomy_db_error)?;

        Ok(row.into())
    }

    async fn create_tag(&self, input: CreateTagRequest) -> Result<Tag, DomainError> {
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            INSERT INTO tags (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(map_taxonomy_db_error)?;

        Ok(row.into())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_taxonomy_db_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_taxonomy_db_error)?;

        Ok(row.map(Category::from))
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError> {
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT id, name, slug, created_at
            FROM tags
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_taxonomy_db_error)?;

        Ok(row.map(Tag::from))
    }

    async fn popular_tags(&self, limit: i64) -> Result<Vec<TagUsage>, DomainError> {
        let rows = sqlx::query_as::<_, TagUsageRow>(
            r#"
            SELECT t.id, t.name, t.slug, t.created_at, COUNT(pt.post_id) AS post_count
            FROM tags t
            LEFT JOIN post_tags pt ON pt.tag_id = t.id
            GROUP BY t.id
            ORDER BY post_count DESC, t.name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_taxonomy_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| TagUsage {
                tag: row.tag.into(),
                post_count: row.post_count,
            })
            .collect())
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
        }
    }
}

fn map_taxonomy_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("categories_name_key") => "category name",
            Some("categories_slug_key") => "category slug",
            Some("tags_name_key") => "tag name",
            Some("tags_slug_key") => "tag slug",
            _ => "taxonomy entry",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
