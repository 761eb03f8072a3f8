//! Клиентская библиотека для работы с parenthub-server по HTTP.
//!
//! Предоставляет типизированный API (`ParentHubClient`) поверх REST-эндпоинтов
//! сервера: авторизация, колонки и сообщество, лайки, комментарии, загрузка
//! изображений и проверка доступа к страницам.
//!
//! Клиент хранит JWT-токен после `register`/`login`/`oauth_sign_in` и
//! автоматически использует его в защищённых операциях.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{ParentHubClientError, ParentHubClientResult};
pub use models::{
    AccessDecision, AddedComment, AuthResponse, Board, Comment, CommentAuthor, LikeToggle,
    ListPostsParams, ListPostsResponse, Pagination, Post, PostCounters, PostDetail, UploadedImage,
    User,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент REST API parenthub-server.
pub struct ParentHubClient {
    http: HttpClient,
    token: Option<String>,
}

impl ParentHubClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> ParentHubClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        nickname: &str,
    ) -> ParentHubClientResult<AuthResponse> {
        let result = self.http.register(email, password, nickname).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Выполняет вход пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(&mut self, email: &str, password: &str) -> ParentHubClientResult<AuthResponse> {
        let result = self.http.login(email, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Входит через Google или Kakao и сохраняет полученный JWT-токен.
    pub async fn oauth_sign_in(
        &mut self,
        provider: &str,
        provider_access_token: &str,
    ) -> ParentHubClientResult<AuthResponse> {
        let result = self
            .http
            .oauth_sign_in(provider, provider_access_token)
            .await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Выходит из аккаунта и забывает токен.
    pub async fn logout(&mut self) -> ParentHubClientResult<()> {
        self.http.logout(self.token.as_deref()).await?;
        self.token = None;
        Ok(())
    }

    /// Проверяет, занят ли никнейм.
    pub async fn nickname_exists(&self, nickname: &str) -> ParentHubClientResult<bool> {
        self.http.nickname_exists(nickname).await
    }

    /// Возвращает страницу постов раздела.
    pub async fn list_posts(
        &self,
        board: Board,
        params: &ListPostsParams,
    ) -> ParentHubClientResult<ListPostsResponse> {
        self.http.list_posts(board, params).await
    }

    /// Возвращает пост по идентификатору.
    ///
    /// Если токен установлен, сервер засчитывает просмотр и сообщает `liked`.
    pub async fn get_post(&self, board: Board, id: i64) -> ParentHubClientResult<PostDetail> {
        self.http.get_post(self.token.as_deref(), board, id).await
    }

    /// Создаёт пост.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(
        &self,
        board: Board,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> ParentHubClientResult<Post> {
        let token = self.require_token()?;
        self.http
            .create_post(token, board, title, content, image_url)
            .await
    }

    /// Обновляет пост по идентификатору.
    ///
    /// Требует установленный JWT-токен.
    pub async fn update_post(
        &self,
        board: Board,
        id: i64,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> ParentHubClientResult<Post> {
        let token = self.require_token()?;
        self.http
            .update_post(token, board, id, title, content, image_url)
            .await
    }

    /// Удаляет пост по идентификатору.
    ///
    /// Требует установленный JWT-токен.
    pub async fn delete_post(&self, board: Board, id: i64) -> ParentHubClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, board, id).await
    }

    /// Ставит или снимает лайк.
    pub async fn toggle_like(&self, board: Board, post_id: i64) -> ParentHubClientResult<LikeToggle> {
        let token = self.require_token()?;
        self.http.toggle_like(token, board, post_id).await
    }

    /// Проверяет, лайкнул ли текущий пользователь пост.
    pub async fn like_status(&self, board: Board, post_id: i64) -> ParentHubClientResult<bool> {
        let token = self.require_token()?;
        self.http.like_status(token, board, post_id).await
    }

    /// Возвращает комментарии поста.
    pub async fn list_comments(
        &self,
        board: Board,
        post_id: i64,
    ) -> ParentHubClientResult<Vec<Comment>> {
        self.http.list_comments(board, post_id).await
    }

    /// Добавляет комментарий к посту.
    pub async fn add_comment(
        &self,
        board: Board,
        post_id: i64,
        content: &str,
    ) -> ParentHubClientResult<AddedComment> {
        let token = self.require_token()?;
        self.http.add_comment(token, board, post_id, content).await
    }

    /// Удаляет комментарий. Доступно автору и администратору.
    pub async fn delete_comment(&self, id: i64) -> ParentHubClientResult<Option<i64>> {
        let token = self.require_token()?;
        self.http.delete_comment(token, id).await
    }

    /// Загружает изображение и возвращает его публичный URL.
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ParentHubClientResult<UploadedImage> {
        let token = self.require_token()?;
        self.http
            .upload_image(token, file_name, content_type, bytes)
            .await
    }

    /// Пересчитывает счётчики лайков и комментариев поста.
    pub async fn recount(&self, board: Board, id: i64) -> ParentHubClientResult<PostCounters> {
        let token = self.require_token()?;
        self.http.recount(token, board, id).await
    }

    /// Проверяет доступ к странице фронтенда для текущего пользователя.
    pub async fn check_access(&self, page_path: &str) -> ParentHubClientResult<AccessDecision> {
        self.http
            .check_access(self.token.as_deref(), page_path)
            .await
    }

    fn require_token(&self) -> ParentHubClientResult<&str> {
        self.token
            .as_deref()
            .ok_or(ParentHubClientError::Unauthorized)
    }
}
