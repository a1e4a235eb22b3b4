use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::taxonomy::{Category, CreateCategoryRequest, CreateTagRequest, Tag, TagUsage};

#[async_trait]
pub(crate) trait TaxonomyRepository: Send + Sync {
    async fn create_category(&self, input: CreateCategoryRequest) -> Result<Category, DomainError>;
    async fn create_tag(&self, input: CreateTagRequest) -> Result<Tag, DomainError>;
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError>;
    async fn popular_tags(&self, limit: i64) -> Result<Vec<TagUsage>, DomainError>;
}
