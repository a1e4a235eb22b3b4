pub(crate) mod auth;
pub(crate) mod client;
pub(crate) mod cors;
pub(crate) mod trace;
