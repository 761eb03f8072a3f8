pub(crate) mod comment_repository;
pub(crate) mod like_repository;
pub(crate) mod object_storage;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod storage;
pub(crate) mod user_repository;
