use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// The two content types that carry likes and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostKind {
    Column,
    Community,
}

impl PostKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PostKind::Column => "column",
            PostKind::Community => "community",
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            PostKind::Column => "columns",
            PostKind::Community => "community_posts",
        }
    }

    /// Parses a `postType` coming from a client.
    pub(crate) fn parse(value: &str) -> Result<Self, DomainError> {
        value.trim().parse().map_err(|_| DomainError::Validation {
            field: "postType",
            message: "must be column or community",
        })
    }
}

impl FromStr for PostKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "column" => Ok(PostKind::Column),
            "community" => Ok(PostKind::Community),
            other => Err(DomainError::Unexpected(format!("unknown post type: {other}"))),
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite (post_id, post_type) reference used by the interaction ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PostRef {
    pub(crate) kind: PostKind,
    pub(crate) id: i64,
}

impl PostRef {
    pub(crate) fn new(kind: PostKind, id: i64) -> Result<Self, DomainError> {
        validate_positive_i64("postId", id)?;
        Ok(Self { kind, id })
    }
}

impl fmt::Display for PostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} id: {}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) kind: PostKind,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
    pub(crate) author_id: i64,
    pub(crate) view_count: i64,
    pub(crate) like_count: i64,
    pub(crate) comment_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    /// Checks the invariants a stored row must satisfy.
    pub(crate) fn validated(self) -> Result<Self, DomainError> {
        validate_positive_i64("id", self.id)?;
        validate_positive_i64("author_id", self.author_id)?;
        for (field, value) in [
            ("view_count", self.view_count),
            ("like_count", self.like_count),
            ("comment_count", self.comment_count),
        ] {
            if value < 0 {
                return Err(DomainError::Validation {
                    field,
                    message: "must be >= 0",
                });
            }
        }
        if self.updated_at < self.created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }
        Ok(self)
    }

    pub(crate) fn post_ref(&self) -> PostRef {
        PostRef {
            kind: self.kind,
            id: self.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            image_url: normalize_image_url(self.image_url)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            image_url: normalize_image_url(self.image_url)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    ViewCount,
    LikeCount,
    CommentCount,
}

impl SortField {
    pub(crate) fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::ViewCount => "view_count",
            SortField::LikeCount => "like_count",
            SortField::CommentCount => "comment_count",
        }
    }

    fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim() {
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "view_count" => Ok(SortField::ViewCount),
            "like_count" => Ok(SortField::LikeCount),
            "comment_count" => Ok(SortField::CommentCount),
            _ => Err(DomainError::Validation {
                field: "sort",
                message: "unsupported sort field",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Validated list parameters for the column and community boards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListQuery {
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) sort: SortField,
    pub(crate) order: SortOrder,
    pub(crate) search: Option<String>,
}

impl ListQuery {
    pub(crate) const DEFAULT_LIMIT: u32 = 9;
    pub(crate) const MAX_LIMIT: u32 = 100;

    pub(crate) fn parse(
        page: Option<u32>,
        limit: Option<u32>,
        sort: Option<&str>,
        order: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, DomainError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(DomainError::Validation {
                field: "page",
                message: "must be >= 1",
            });
        }

        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(DomainError::Validation {
                field: "limit",
                message: "must be 1..100",
            });
        }

        let sort = match sort {
            Some(value) if !value.trim().is_empty() => SortField::parse(value)?,
            _ => SortField::CreatedAt,
        };

        let order = match order.map(|value| value.trim().to_ascii_lowercase()) {
            None => SortOrder::Desc,
            Some(value) if value.is_empty() || value == "desc" => SortOrder::Desc,
            Some(value) if value == "asc" => SortOrder::Asc,
            Some(_) => {
                return Err(DomainError::Validation {
                    field: "order",
                    message: "must be asc or desc",
                });
            }
        };

        let search = search
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        if search.as_ref().is_some_and(|value| value.chars().count() > 100) {
            return Err(DomainError::Validation {
                field: "q",
                message: "must be at most 100 chars",
            });
        }

        Ok(Self {
            page,
            limit,
            sort,
            order,
            search,
        })
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    pub(crate) fn total_pages(&self, total_items: i64) -> i64 {
        let limit = i64::from(self.limit);
        (total_items.max(0) + limit - 1) / limit
    }
}

/// Collects `src` attributes of `<img>` tags found in rich-text content.
pub(crate) fn extract_image_sources(html: &str) -> Vec<String> {
    let mut sources = Vec::new();
    let lower = html.to_ascii_lowercase();
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find("<img") {
        let tag_start = cursor + found;
        let tag_end = lower[tag_start..]
            .find('>')
            .map_or(lower.len(), |end| tag_start + end);
        let tag = &lower[tag_start..tag_end];

        if let Some(attr) = tag.find("src=") {
            let value_start = tag_start + attr + "src=".len();
            let quote = html[value_start..].chars().next();
            if let Some(quote @ ('"' | '\'')) = quote {
                let value_start = value_start + 1;
                if let Some(len) = html[value_start..tag_end].find(quote) {
                    let src = html[value_start..value_start + len].trim();
                    if !src.is_empty() {
                        sources.push(src.to_string());
                    }
                }
            }
        }
        cursor = tag_end;
    }

    sources
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}

fn normalize_image_url(image_url: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(url) = image_url else {
        return Ok(None);
    };
    let url = url.trim();
    if url.is_empty() {
        return Ok(None);
    }
    let allowed = url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/');
    if !allowed || url.len() > 2048 {
        return Err(DomainError::Validation {
            field: "imageUrl",
            message: "must be an absolute http(s) URL or a site path",
        });
    }
    Ok(Some(url.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{
        CreatePostRequest, DomainError, ListQuery, Post, PostKind, PostRef, SortField, SortOrder,
        UpdatePostRequest, extract_image_sources,
    };

    #[test]
    fn create_post_request_validate_rejects_empty_title() {
        let req = CreatePostRequest {
            title: "   ".to_string(),
            content: "valid content".to_string(),
            image_url: None,
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn update_post_request_validate_rejects_empty_content() {
        let req = UpdatePostRequest {
            title: "valid title".to_string(),
            content: "   ".to_string(),
            image_url: None,
        };

        let err = req.validate().expect_err("content must be rejected");
        assert_validation_field(err, "content");
    }

    #[test]
    fn create_post_request_validate_normalizes_fields() {
        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            content: "  <p>content</p>  ".to_string(),
            image_url: Some("   ".to_string()),
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.content, "<p>content</p>");
        assert_eq!(validated.image_url, None);
    }

    #[test]
    fn create_post_request_rejects_script_urls() {
        let req = CreatePostRequest {
            title: "title".to_string(),
            content: "content".to_string(),
            image_url: Some("javascript:alert(1)".to_string()),
        };

        let err = req.validate().expect_err("image url must be rejected");
        assert_validation_field(err, "imageUrl");
    }

    #[test]
    fn post_validated_rejects_negative_counters() {
        let mut post = sample_post();
        post.like_count = -1;

        let err = post.validated().expect_err("negative counter must fail");
        assert_validation_field(err, "like_count");
    }

    #[test]
    fn post_validated_rejects_updated_before_created() {
        let mut post = sample_post();
        post.created_at = post.updated_at + Duration::seconds(1);

        let err = post.validated().expect_err("updated_at < created_at must fail");
        assert_validation_field(err, "updated_at");
    }

    #[test]
    fn post_kind_parse_reports_post_type_field() {
        assert_eq!(PostKind::parse(" column ").expect("known"), PostKind::Column);
        assert_eq!(PostKind::Community.table(), "community_posts");
        let err = PostKind::parse("notice").expect_err("unknown kind");
        assert_validation_field(err, "postType");
    }

    #[test]
    fn post_ref_requires_positive_id() {
        assert!(PostRef::new(PostKind::Column, 0).is_err());
        assert!(PostRef::new(PostKind::Column, 3).is_ok());
    }

    #[test]
    fn list_query_defaults() {
        let query = ListQuery::parse(None, None, None, None, Some("   ")).expect("defaults");
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, ListQuery::DEFAULT_LIMIT);
        assert_eq!(query.sort, SortField::CreatedAt);
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.search, None);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn list_query_rejects_unknown_sort_and_order() {
        let err = ListQuery::parse(None, None, Some("password"), None, None)
            .expect_err("sort must be whitelisted");
        assert_validation_field(err, "sort");

        let err = ListQuery::parse(None, None, None, Some("sideways"), None)
            .expect_err("order must be asc/desc");
        assert_validation_field(err, "order");
    }

    #[test]
    fn list_query_computes_offset_and_pages() {
        let query = ListQuery::parse(Some(3), Some(10), Some("like_count"), Some("ASC"), None)
            .expect("valid query");
        assert_eq!(query.offset(), 20);
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.total_pages(0), 0);
        assert_eq!(query.total_pages(10), 1);
        assert_eq!(query.total_pages(21), 3);
    }

    #[test]
    fn extract_image_sources_finds_quoted_sources() {
        let html = r#"<p>intro</p><IMG alt="a" SRC="https://cdn.example.com/a.jpg"><img src='/uploads/b.png' /><img alt="no source">"#;
        assert_eq!(
            extract_image_sources(html),
            vec![
                "https://cdn.example.com/a.jpg".to_string(),
                "/uploads/b.png".to_string()
            ]
        );
    }

    fn sample_post() -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            kind: PostKind::Column,
            title: "title".to_string(),
            content: "content".to_string(),
            image_url: None,
            author_id: 10,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
