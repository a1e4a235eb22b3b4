pub(crate) mod activity_service;
pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod comment_service;
pub(crate) mod profile_service;
pub(crate) mod publication;
pub(crate) mod taxonomy_service;

#[cfg(test)]
pub(crate) mod test_support;
