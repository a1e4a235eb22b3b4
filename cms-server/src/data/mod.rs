pub(crate) mod activity_repository;
pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod taxonomy_repository;
pub(crate) mod user_repository;
