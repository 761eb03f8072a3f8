use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use application::image_normalizer::ImageLimits;
use application::interaction_service::InteractionService;
use application::post_service::PostService;
use application::upload_service::UploadService;
use data::repositories::postgres::comment_repository::PostgresCommentRepository;
use data::repositories::postgres::like_repository::PostgresLikeRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use data::storage::StorageBackend;
use data::storage::local::LocalStorage;
use data::storage::supabase::SupabaseStorage;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::oauth::OAuthClient;
use infrastructure::settings::{Settings, StorageSettings};
use presentation::AppState;

/// Outbound calls to storage and OAuth providers.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let http_client = reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let storage = Arc::new(build_storage(&settings, http_client.clone()));

    let posts = PostgresPostRepository::new(pool.clone());
    let likes = PostgresLikeRepository::new(pool.clone());
    let comments = PostgresCommentRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool);

    let jwt = JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds);
    let limits = ImageLimits {
        max_bytes: settings.upload_max_bytes,
        max_dimension: settings.upload_max_dimension,
    };

    let state = AppState {
        auth_service: Arc::new(AuthService::new(users, jwt)),
        post_service: Arc::new(PostService::new(
            posts.clone(),
            likes.clone(),
            Arc::clone(&storage),
        )),
        interaction_service: Arc::new(InteractionService::new(posts, likes, comments)),
        upload_service: Arc::new(UploadService::new(storage, limits)),
        oauth: Arc::new(OAuthClient::new(
            http_client,
            &settings.google_userinfo_url,
            &settings.kakao_userinfo_url,
        )),
    };

    server::run_http(&settings, state).await
}

fn build_storage(settings: &Settings, client: reqwest::Client) -> StorageBackend {
    match &settings.storage {
        StorageSettings::Local { dir } => {
            info!(%dir, "using local object storage");
            StorageBackend::Local(LocalStorage::new(dir, &settings.public_base_url))
        }
        StorageSettings::Supabase {
            url,
            service_role_key,
        } => {
            info!(%url, bucket = %settings.storage_bucket, "using supabase object storage");
            StorageBackend::Supabase(SupabaseStorage::new(
                client,
                url,
                &settings.storage_bucket,
                service_role_key,
            ))
        }
    }
}
