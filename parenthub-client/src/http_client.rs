use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{ParentHubClientError, ParentHubClientResult};
use crate::models::{
    AccessDecision, AddedComment, AuthResponse, Board, Comment, LikeToggle, ListPostsParams,
    ListPostsResponse, Post, PostCounters, PostDetail, UploadedImage,
};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    email: &'a str,
    password: &'a str,
    nickname: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OAuthRequestDto<'a> {
    access_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostRequestDto<'a> {
    title: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostTargetDto {
    post_id: i64,
    post_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentDto<'a> {
    content: &'a str,
    post_id: i64,
    post_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckNicknameResponseDto {
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct LikeStatusResponseDto {
    liked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteCommentResponseDto {
    comment_count: Option<i64>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `parenthub-server`.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub fn new(base_url: impl Into<String>) -> ParentHubClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> ParentHubClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .error
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        ParentHubClientError::from_http_status(status, Some(message))
    }

    async fn send(request: RequestBuilder) -> ParentHubClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(ParentHubClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    /// отправляет запрос и разбирает json-ответ
    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> ParentHubClientResult<T> {
        Self::send(request)
            .await?
            .json::<T>()
            .await
            .map_err(ParentHubClientError::from_reqwest)
    }

    /// Регистрирует пользователя по email и паролю.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        nickname: &str,
    ) -> ParentHubClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            email,
            password,
            nickname,
        };
        Self::fetch(
            self.request(Method::POST, "/api/auth/register", None)
                .json(&payload),
        )
        .await
    }

    /// Выполняет вход по email и паролю.
    pub async fn login(&self, email: &str, password: &str) -> ParentHubClientResult<AuthResponse> {
        let payload = LoginRequestDto { email, password };
        Self::fetch(self.request(Method::POST, "/api/auth/login", None).json(&payload)).await
    }

    /// Сообщает серверу о выходе; токен хранится только на клиенте.
    pub async fn logout(&self, token: Option<&str>) -> ParentHubClientResult<()> {
        Self::send(self.request(Method::POST, "/api/auth/logout", token)).await?;
        Ok(())
    }

    /// Проверяет, занят ли никнейм.
    pub async fn nickname_exists(&self, nickname: &str) -> ParentHubClientResult<bool> {
        let dto: CheckNicknameResponseDto = Self::fetch(
            self.request(Method::GET, "/api/auth/check-nickname", None)
                .query(&[("nickname", nickname)]),
        )
        .await?;
        Ok(dto.exists)
    }

    /// Входит через OAuth-провайдера (`google` или `kakao`) по его access token.
    pub async fn oauth_sign_in(
        &self,
        provider: &str,
        access_token: &str,
    ) -> ParentHubClientResult<AuthResponse> {
        let payload = OAuthRequestDto { access_token };
        Self::fetch(
            self.request(Method::POST, &format!("/api/auth/oauth/{provider}"), None)
                .json(&payload),
        )
        .await
    }

    /// Возвращает страницу постов раздела.
    pub async fn list_posts(
        &self,
        board: Board,
        params: &ListPostsParams,
    ) -> ParentHubClientResult<ListPostsResponse> {
        Self::fetch(
            self.request(Method::GET, board.collection_path(), None)
                .query(params),
        )
        .await
    }

    /// Получает пост; с токеном засчитывает просмотр и возвращает `liked`.
    pub async fn get_post(
        &self,
        token: Option<&str>,
        board: Board,
        id: i64,
    ) -> ParentHubClientResult<PostDetail> {
        let path = format!("{}/{id}", board.collection_path());
        Self::fetch(self.request(Method::GET, &path, token)).await
    }

    /// Создаёт пост. Для колонок нужна роль `expert` или `admin`.
    pub async fn create_post(
        &self,
        token: &str,
        board: Board,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> ParentHubClientResult<Post> {
        let payload = PostRequestDto {
            title,
            content,
            image_url,
        };
        Self::fetch(
            self.request(Method::POST, board.collection_path(), Some(token))
                .json(&payload),
        )
        .await
    }

    /// Обновляет пост. Доступно автору и администратору.
    pub async fn update_post(
        &self,
        token: &str,
        board: Board,
        id: i64,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> ParentHubClientResult<Post> {
        let payload = PostRequestDto {
            title,
            content,
            image_url,
        };
        let path = format!("{}/{id}", board.collection_path());
        Self::fetch(self.request(Method::PUT, &path, Some(token)).json(&payload)).await
    }

    /// Удаляет пост вместе с лайками и комментариями.
    pub async fn delete_post(&self, token: &str, board: Board, id: i64) -> ParentHubClientResult<()> {
        let path = format!("{}/{id}", board.collection_path());
        Self::send(self.request(Method::DELETE, &path, Some(token))).await?;
        Ok(())
    }

    /// Ставит или снимает лайк.
    pub async fn toggle_like(
        &self,
        token: &str,
        board: Board,
        post_id: i64,
    ) -> ParentHubClientResult<LikeToggle> {
        let payload = PostTargetDto {
            post_id,
            post_type: board.as_str(),
        };
        Self::fetch(
            self.request(Method::POST, "/api/likes", Some(token))
                .json(&payload),
        )
        .await
    }

    /// Проверяет, лайкнул ли пользователь пост.
    pub async fn like_status(
        &self,
        token: &str,
        board: Board,
        post_id: i64,
    ) -> ParentHubClientResult<bool> {
        let query = PostTargetDto {
            post_id,
            post_type: board.as_str(),
        };
        let dto: LikeStatusResponseDto = Self::fetch(
            self.request(Method::GET, "/api/likes", Some(token))
                .query(&query),
        )
        .await?;
        Ok(dto.liked)
    }

    /// Возвращает комментарии поста, старые первыми.
    pub async fn list_comments(
        &self,
        board: Board,
        post_id: i64,
    ) -> ParentHubClientResult<Vec<Comment>> {
        let query = PostTargetDto {
            post_id,
            post_type: board.as_str(),
        };
        Self::fetch(
            self.request(Method::GET, "/api/comments", None)
                .query(&query),
        )
        .await
    }

    /// Добавляет комментарий.
    pub async fn add_comment(
        &self,
        token: &str,
        board: Board,
        post_id: i64,
        content: &str,
    ) -> ParentHubClientResult<AddedComment> {
        let payload = CreateCommentDto {
            content,
            post_id,
            post_type: board.as_str(),
        };
        Self::fetch(
            self.request(Method::POST, "/api/comments", Some(token))
                .json(&payload),
        )
        .await
    }

    /// Удаляет комментарий и возвращает новый счётчик комментариев.
    ///
    /// `None`, если сервер не смог обновить счётчик.
    pub async fn delete_comment(&self, token: &str, id: i64) -> ParentHubClientResult<Option<i64>> {
        let dto: DeleteCommentResponseDto = Self::fetch(self.request(
            Method::DELETE,
            &format!("/api/comments/{id}"),
            Some(token),
        ))
        .await?;
        Ok(dto.comment_count)
    }

    /// Загружает изображение; сервер сжимает его перед сохранением.
    pub async fn upload_image(
        &self,
        token: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ParentHubClientResult<UploadedImage> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);
        Self::fetch(
            self.request(Method::POST, "/api/uploads", Some(token))
                .multipart(form),
        )
        .await
    }

    /// Пересчитывает счётчики поста. Только для администратора.
    pub async fn recount(
        &self,
        token: &str,
        board: Board,
        id: i64,
    ) -> ParentHubClientResult<PostCounters> {
        let path = format!("/api/admin/posts/{}/{id}/recount", board.as_str());
        Self::fetch(self.request(Method::POST, &path, Some(token))).await
    }

    /// Спрашивает у сервера, можно ли открыть страницу фронтенда.
    pub async fn check_access(
        &self,
        token: Option<&str>,
        page_path: &str,
    ) -> ParentHubClientResult<AccessDecision> {
        Self::fetch(
            self.request(Method::GET, "/api/access", token)
                .query(&[("path", page_path)]),
        )
        .await
    }
}
