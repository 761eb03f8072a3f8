pub(crate) mod access;
pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod health;
pub(crate) mod likes;
pub(crate) mod posts;
pub(crate) mod uploads;
