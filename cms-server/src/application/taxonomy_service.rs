use tracing::info;

use crate::application::blog_service::ListPostsResult;
use crate::data::post_repository::{Pagination, PostRepository};
use crate::data::taxonomy_repository::TaxonomyRepository;
use crate::domain::authz::{Action, Actor, Resource, ensure};
use crate::domain::error::DomainError;
use crate::domain::post::PostSearch;
use crate::domain::taxonomy::{Category, CreateCategoryRequest, CreateTagRequest, Tag, TagUsage};

const POPULAR_TAGS: i64 = 10;

pub(crate) struct TaxonomyService<T: TaxonomyRepository, P: PostRepository> {
    taxonomy: T,
    posts: P,
}

impl<T: TaxonomyRepository, P: PostRepository> TaxonomyService<T, P> {
    pub(crate) fn new(taxonomy: T, posts: P) -> Self {
        Self { taxonomy, posts }
    }

    pub(crate) async fn create_category(
        &self,
        actor: &Actor,
        req: CreateCategoryRequest,
    ) -> Result<Category, DomainError> {
        ensure(actor, Action::ManageTaxonomy, Resource::None)?;
        let category = self.taxonomy.create_category(req.validate()?).await?;
        info!(category_id = category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    pub(crate) async fn create_tag(
        &self,
        actor: &Actor,
        req: CreateTagRequest,
    ) -> Result<Tag, DomainError> {
        ensure(actor, Action::ManageTaxonomy, Resource::None)?;
        let tag = self.taxonomy.create_tag(req.validate()?).await?;
        info!(tag_id = tag.id, slug = %tag.slug, "tag created");
        Ok(tag)
    }

    pub(crate) async fn categories(&self) -> Result<Vec<Category>, DomainError> {
        self.taxonomy.list_categories().await
    }

    pub(crate) async fn popular_tags(&self) -> Result<Vec<TagUsage>, DomainError> {
        self.taxonomy.popular_tags(POPULAR_TAGS).await
    }

    pub(crate) async fn posts_in_category(
        &self,
        slug: &str,
        page: u32,
        page_size: u32,
    ) -> Result<(Category, ListPostsResult), DomainError> {
        let category = self
            .taxonomy
            .find_category_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("category slug: {slug}")))?;
        let search = PostSearch {
            category_id: Some(category.id),
            ..PostSearch::default()
        };
        let result = self.published(search, page, page_size).await?;
        Ok((category, result))
    }

    pub(crate) async fn posts_with_tag(
        &self,
        slug: &str,
        page: u32,
        page_size: u32,
    ) -> Result<(Tag, ListPostsResult), DomainError> {
        let tag = self
            .taxonomy
            .find_tag_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("tag slug: {slug}")))?;
        let search = PostSearch {
            tag_id: Some(tag.id),
            ..PostSearch::default()
        };
        let result = self.published(search, page, page_size).await?;
        Ok((tag, result))
    }

    async fn published(
        &self,
        search: PostSearch,
        page: u32,
        page_size: u32,
    ) -> Result<ListPostsResult, DomainError> {
        let pagination = Pagination { page, page_size };
        let posts = self.posts.list_published(&search, pagination).await?;
        let total = self.posts.count_published(&search).await?;
        Ok(ListPostsResult {
            posts,
            page,
            page_size,
            total,
        })
    }
}
