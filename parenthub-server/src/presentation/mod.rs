use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::interaction_service::InteractionService;
use crate::application::post_service::PostService;
use crate::application::upload_service::UploadService;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::like_repository::PostgresLikeRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::data::storage::StorageBackend;
use crate::infrastructure::oauth::OAuthClient;

pub(crate) mod http;

pub(crate) type AppAuthService = AuthService<PostgresUserRepository>;
pub(crate) type AppPostService =
    PostService<PostgresPostRepository, PostgresLikeRepository, StorageBackend>;
pub(crate) type AppInteractionService =
    InteractionService<PostgresPostRepository, PostgresLikeRepository, PostgresCommentRepository>;
pub(crate) type AppUploadService = UploadService<StorageBackend>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AppAuthService>,
    pub(crate) post_service: Arc<AppPostService>,
    pub(crate) interaction_service: Arc<AppInteractionService>,
    pub(crate) upload_service: Arc<AppUploadService>,
    pub(crate) oauth: Arc<OAuthClient>,
}
