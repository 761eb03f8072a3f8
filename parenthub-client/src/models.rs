use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Раздел сайта: колонки экспертов или сообщество.
pub enum Board {
    /// Колонки (`/api/columns`).
    Column,
    /// Сообщество (`/api/community`).
    Community,
}

impl Board {
    /// Значение `postType` в API.
    pub fn as_str(self) -> &'static str {
        match self {
            Board::Column => "column",
            Board::Community => "community",
        }
    }

    pub(crate) fn collection_path(self) -> &'static str {
        match self {
            Board::Column => "/api/columns",
            Board::Community => "/api/community",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Email; у OAuth-аккаунтов может отсутствовать.
    pub email: Option<String>,
    /// Никнейм.
    pub nickname: String,
    /// Роль: `user`, `expert` или `admin`.
    pub role: String,
    /// Статус: `active` или `banned`.
    pub status: String,
    /// Способ входа: `email`, `google` или `kakao`.
    pub provider: String,
    /// Дата и время создания пользователя (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT access token.
    pub access_token: String,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель поста (колонки или записи сообщества).
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// `column` или `community`.
    pub post_type: String,
    /// Заголовок.
    pub title: String,
    /// HTML-содержимое.
    pub content: String,
    /// URL обложки.
    pub image_url: Option<String>,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Счётчик просмотров.
    pub view_count: i64,
    /// Счётчик лайков.
    pub like_count: i64,
    /// Счётчик комментариев.
    pub comment_count: i64,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост вместе с признаком лайка текущего пользователя.
pub struct PostDetail {
    /// Сам пост.
    #[serde(flatten)]
    pub post: Post,
    /// Лайкнул ли пост текущий пользователь.
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Параметры пагинации в ответе списка.
pub struct Pagination {
    /// Номер страницы, начиная с 1.
    pub page: u32,
    /// Размер страницы.
    pub limit: u32,
    /// Общее количество постов.
    pub total_items: u64,
    /// Общее количество страниц.
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ списка постов с параметрами пагинации.
pub struct ListPostsResponse {
    /// Список постов на текущей странице.
    pub posts: Vec<Post>,
    /// Пагинация.
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Параметры запроса списка постов; `None` означает значение по умолчанию сервера.
pub struct ListPostsParams {
    /// Номер страницы.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Размер страницы (1..=100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Поле сортировки, например `like_count`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// `asc` или `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Поиск по заголовку и содержимому.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Результат переключения лайка.
pub struct LikeToggle {
    /// `added` или `removed`.
    pub action: String,
    /// Состояние лайка после операции.
    pub liked: bool,
    /// Новое значение счётчика лайков.
    pub like_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Краткие данные автора комментария.
pub struct CommentAuthor {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Никнейм.
    pub nickname: String,
    /// Роль.
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Текст.
    pub content: String,
    /// Идентификатор поста.
    pub post_id: i64,
    /// `column` или `community`.
    pub post_type: String,
    /// Автор.
    pub author: CommentAuthor,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Результат добавления комментария.
pub struct AddedComment {
    /// Созданный комментарий.
    pub comment: Comment,
    /// Новое значение счётчика комментариев.
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Загруженное изображение.
pub struct UploadedImage {
    /// Публичный URL.
    pub url: String,
    /// Путь объекта в хранилище.
    pub path: String,
    /// Итоговый content-type после сжатия.
    pub content_type: String,
    /// Размер в байтах после сжатия.
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Пересчитанные счётчики поста.
pub struct PostCounters {
    /// Количество лайков.
    pub like_count: i64,
    /// Количество комментариев.
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Решение о доступе к странице фронтенда.
pub struct AccessDecision {
    /// `allow`, `login` или `unauthorized`.
    pub decision: String,
    /// Куда перенаправить пользователя, если доступ запрещён.
    pub redirect_to: Option<String>,
}
