pub(crate) mod activity;
pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod dashboard;
pub(crate) mod health;
pub(crate) mod posts;
pub(crate) mod profile;
pub(crate) mod taxonomy;
