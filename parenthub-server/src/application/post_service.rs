use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::data::like_repository::LikeRepository;
use crate::data::object_storage::ObjectStorage;
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::access::{Identity, Requirement, authorize};
use crate::domain::error::DomainError;
use crate::domain::post::{
    CreatePostRequest, ListQuery, Post, PostKind, PostRef, UpdatePostRequest,
    extract_image_sources,
};

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<Post>,
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total_items: i64,
    pub(crate) total_pages: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) liked: bool,
}

/// Column and community board CRUD.
pub(crate) struct PostService<P: PostRepository, L: LikeRepository, S: ObjectStorage> {
    posts: P,
    likes: L,
    storage: Arc<S>,
}

impl<P, L, S> PostService<P, L, S>
where
    P: PostRepository,
    L: LikeRepository,
    S: ObjectStorage,
{
    pub(crate) fn new(posts: P, likes: L, storage: Arc<S>) -> Self {
        Self {
            posts,
            likes,
            storage,
        }
    }

    pub(crate) fn create_requirement(kind: PostKind) -> Requirement {
        match kind {
            PostKind::Column => Requirement::ColumnAuthor,
            PostKind::Community => Requirement::Authenticated,
        }
    }

    pub(crate) async fn list_posts(
        &self,
        kind: PostKind,
        query: ListQuery,
    ) -> Result<ListPostsResult, DomainError> {
        let total_items = self
            .posts
            .count_posts(kind, query.search.as_deref())
            .await?;
        let posts = self
            .posts
            .list_posts(kind, &query)
            .await?
            .into_iter()
            .map(Post::validated)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListPostsResult {
            posts,
            page: query.page,
            limit: query.limit,
            total_items,
            total_pages: query.total_pages(total_items),
        })
    }

    /// Loads a post for display; an authenticated viewer other than the
    /// author bumps the view counter.
    pub(crate) async fn get_post(
        &self,
        target: PostRef,
        viewer: Option<&Identity>,
    ) -> Result<PostDetail, DomainError> {
        let mut post = self.load(target).await?;

        let Some(viewer) = viewer else {
            return Ok(PostDetail { post, liked: false });
        };

        if viewer.user_id != post.author_id
            && let Some(view_count) = self.posts.increment_view_count(target).await?
        {
            post.view_count = view_count;
        }
        let liked = self.likes.find_like(viewer.user_id, target).await?.is_some();

        Ok(PostDetail { post, liked })
    }

    /// Owner lookup without touching the view counter.
    pub(crate) async fn author_of(&self, target: PostRef) -> Result<i64, DomainError> {
        Ok(self.load(target).await?.author_id)
    }

    pub(crate) async fn create_post(
        &self,
        identity: &Identity,
        kind: PostKind,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        authorize(Some(identity), Self::create_requirement(kind))?;
        let req = req.validate()?;

        let post = self
            .posts
            .create_post(NewPost {
                kind,
                title: req.title,
                content: req.content,
                image_url: req.image_url,
                author_id: identity.user_id,
            })
            .await?
            .validated()?;
        info!(post = %post.post_ref(), author_id = identity.user_id, "post created");
        Ok(post)
    }

    pub(crate) async fn update_post(
        &self,
        identity: &Identity,
        target: PostRef,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let existing = self.load(target).await?;
        authorize(
            Some(identity),
            Requirement::OwnerOrAdmin {
                owner_id: existing.author_id,
            },
        )?;

        let patch = PostPatch {
            title: req.title,
            content: req.content,
            image_url: req.image_url,
        };
        self.posts
            .update_post(target, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(target.to_string()))?
            .validated()
    }

    /// Removes the post with its likes and comments, then best-effort
    /// deletes the stored images it referenced.
    pub(crate) async fn delete_post(
        &self,
        identity: &Identity,
        target: PostRef,
    ) -> Result<(), DomainError> {
        let existing = self.load(target).await?;
        authorize(
            Some(identity),
            Requirement::OwnerOrAdmin {
                owner_id: existing.author_id,
            },
        )?;

        if !self.posts.delete_post(target).await? {
            return Err(DomainError::NotFound(target.to_string()));
        }
        info!(post = %target, deleted_by = identity.user_id, "post deleted");

        self.remove_images(&existing).await;
        Ok(())
    }

    /// Runs after the row is gone, so only other posts keep an image alive.
    async fn remove_images(&self, post: &Post) {
        let mut objects: Vec<(String, String)> = Vec::new();
        let urls = post
            .image_url
            .iter()
            .cloned()
            .chain(extract_image_sources(&post.content));
        for url in urls {
            match self.storage.object_path(&url) {
                Some(path) if !objects.iter().any(|(known, _)| *known == path) => {
                    objects.push((path, url))
                }
                Some(_) => {}
                None => debug!(%url, "image is not in our storage, skipping"),
            }
        }

        for (path, url) in objects {
            match self.posts.image_in_use(&url).await {
                Ok(false) => {}
                Ok(true) => {
                    debug!(%path, "image still used by another post, keeping");
                    continue;
                }
                Err(err) => {
                    warn!(post = %post.post_ref(), %path, error = %err, "failed to check image usage, keeping");
                    continue;
                }
            }
            if let Err(err) = self.storage.remove_object(&path).await {
                warn!(post = %post.post_ref(), %path, error = %err, "failed to remove post image");
            }
        }
    }

    async fn load(&self, target: PostRef) -> Result<Post, DomainError> {
        self.posts
            .get_post(target)
            .await?
            .ok_or_else(|| DomainError::NotFound(target.to_string()))?
            .validated()
    }
}
