pub(crate) mod activity;
pub(crate) mod authz;
pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod post;
pub(crate) mod profile;
pub(crate) mod slug;
pub(crate) mod taxonomy;
pub(crate) mod user;
