use tracing::{error, info, warn};

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::like_repository::LikeRepository;
use crate::data::post_repository::{Counter, PostCounters, PostRepository};
use crate::domain::access::{Identity, Requirement, authorize};
use crate::domain::comment::{CommentWithAuthor, normalize_comment_content};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LikeAction {
    Added,
    Removed,
}

impl LikeAction {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            LikeAction::Added => "added",
            LikeAction::Removed => "removed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LikeToggle {
    pub(crate) action: LikeAction,
    pub(crate) liked: bool,
    pub(crate) like_count: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct AddedComment {
    pub(crate) comment: CommentWithAuthor,
    pub(crate) comment_count: i64,
}

/// Likes and comments plus the denormalized counters on the post row.
///
/// Counters move only when a ledger row was actually inserted or deleted. Likes
/// and new comments commit the row and the counter together; a comment deletion
/// only logs a failed decrement.
pub(crate) struct InteractionService<P, L, C>
where
    P: PostRepository,
    L: LikeRepository,
    C: CommentRepository,
{
    posts: P,
    likes: L,
    comments: C,
}

impl<P, L, C> InteractionService<P, L, C>
where
    P: PostRepository,
    L: LikeRepository,
    C: CommentRepository,
{
    pub(crate) fn new(posts: P, likes: L, comments: C) -> Self {
        Self {
            posts,
            likes,
            comments,
        }
    }

    pub(crate) async fn toggle_like(
        &self,
        identity: &Identity,
        target: PostRef,
    ) -> Result<LikeToggle, DomainError> {
        authorize(Some(identity), Requirement::Authenticated)?;
        let current = self.require_post(target).await?.like_count;

        let (action, like_count) = match self.likes.find_like(identity.user_id, target).await? {
            Some(like_id) => (
                LikeAction::Removed,
                self.likes.delete_like(like_id, target).await?,
            ),
            None => (
                LikeAction::Added,
                self.likes.insert_like(identity.user_id, target).await?,
            ),
        };
        // `None`: a concurrent request already applied the same transition
        let like_count = like_count.unwrap_or(current);

        Ok(LikeToggle {
            action,
            liked: action == LikeAction::Added,
            like_count,
        })
    }

    pub(crate) async fn like_status(
        &self,
        identity: &Identity,
        target: PostRef,
    ) -> Result<bool, DomainError> {
        Ok(self
            .likes
            .find_like(identity.user_id, target)
            .await?
            .is_some())
    }

    pub(crate) async fn list_comments(
        &self,
        target: PostRef,
    ) -> Result<Vec<CommentWithAuthor>, DomainError> {
        self.comments.list_comments(target).await
    }

    pub(crate) async fn add_comment(
        &self,
        identity: &Identity,
        target: PostRef,
        content: &str,
    ) -> Result<AddedComment, DomainError> {
        authorize(Some(identity), Requirement::Authenticated)?;
        let content = normalize_comment_content(content)?;
        self.require_post(target).await?;

        let (comment, comment_count) = self
            .comments
            .create_comment(NewComment {
                content,
                author_id: identity.user_id,
                post: target,
            })
            .await?;

        Ok(AddedComment {
            comment,
            comment_count,
        })
    }

    /// Deletes a comment and returns the post's new comment count.
    ///
    /// `None` means the row is gone but the counter could not be decremented;
    /// an admin recount repairs it.
    pub(crate) async fn delete_comment(
        &self,
        identity: &Identity,
        comment_id: i64,
    ) -> Result<Option<i64>, DomainError> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;
        authorize(
            Some(identity),
            Requirement::OwnerOrAdmin {
                owner_id: comment.author_id,
            },
        )?;

        if !self.comments.delete_comment(comment_id).await? {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }

        match self
            .posts
            .adjust_counter(comment.post, Counter::Comments, -1)
            .await
        {
            Ok(Some(count)) => Ok(Some(count)),
            Ok(None) => {
                warn!(post = %comment.post, comment_id, "comment deleted but its post is gone");
                Ok(None)
            }
            Err(err) => {
                error!(post = %comment.post, comment_id, error = %err, "failed to decrement comment count");
                Ok(None)
            }
        }
    }

    /// Recomputes both counters from the ledger rows.
    pub(crate) async fn recount(
        &self,
        identity: &Identity,
        target: PostRef,
    ) -> Result<PostCounters, DomainError> {
        authorize(Some(identity), Requirement::Admin)?;
        let counters = self
            .posts
            .recount(target)
            .await?
            .ok_or_else(|| DomainError::NotFound(target.to_string()))?;
        info!(
            post = %target,
            like_count = counters.like_count,
            comment_count = counters.comment_count,
            "counters recomputed"
        );
        Ok(counters)
    }

    async fn require_post(&self, target: PostRef) -> Result<Post, DomainError> {
        self.posts
            .get_post(target)
            .await?
            .ok_or_else(|| DomainError::NotFound(target.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{InteractionService, LikeAction};
    use crate::application::test_support::{FakeStore, banned, identity};
    use crate::domain::error::DomainError;
    use crate::domain::post::{PostKind, PostRef};
    use crate::domain::user::Role;

    fn service(store: &FakeStore) -> InteractionService<FakeStore, FakeStore, FakeStore> {
        InteractionService::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn toggling_twice_restores_state_and_count() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Column, 1);
        let service = service(&store);
        let member = identity(2, Role::User);

        let first = service.toggle_like(&member, target).await.expect("like");
        assert_eq!(first.action, LikeAction::Added);
        assert!(first.liked);
        assert_eq!(first.like_count, 1);

        let second = service.toggle_like(&member, target).await.expect("unlike");
        assert_eq!(second.action, LikeAction::Removed);
        assert!(!second.liked);
        assert_eq!(second.like_count, 0);
        assert!(!service.like_status(&member, target).await.expect("status"));
    }

    #[tokio::test]
    async fn like_count_matches_ledger_after_many_toggles() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Community, 1);
        let other = store.seed_post(PostKind::Community, 1);
        let service = service(&store);

        for (user_id, toggles) in [(10, 1), (11, 2), (12, 3), (13, 5), (14, 4)] {
            let member = identity(user_id, Role::User);
            for _ in 0..toggles {
                service.toggle_like(&member, target).await.expect("toggle");
            }
        }
        service
            .toggle_like(&identity(10, Role::User), other)
            .await
            .expect("toggle other post");

        let state = store.state();
        assert_eq!(state.like_rows(target), 3);
        assert_eq!(state.posts[&target].like_count, state.like_rows(target));
        assert_eq!(state.posts[&other].like_count, 1);
    }

    #[tokio::test]
    async fn like_on_missing_post_is_not_found() {
        let store = FakeStore::default();
        let service = service(&store);
        let missing = PostRef {
            kind: PostKind::Column,
            id: 404,
        };

        let err = service
            .toggle_like(&identity(1, Role::User), missing)
            .await
            .expect_err("no post");
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(store.state().likes.is_empty());
    }

    #[tokio::test]
    async fn banned_members_cannot_like_or_comment() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Column, 1);
        let service = service(&store);
        let banned_admin = banned(9, Role::Admin);

        let err = service
            .toggle_like(&banned_admin, target)
            .await
            .expect_err("banned");
        assert!(matches!(err, DomainError::Forbidden));
        let err = service
            .add_comment(&banned_admin, target, "hi")
            .await
            .expect_err("banned");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn comments_move_the_counter_by_exactly_one() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Column, 1);
        let service = service(&store);
        let member = identity(2, Role::User);

        let first = service
            .add_comment(&member, target, "  첫 댓글  ")
            .await
            .expect("comment");
        assert_eq!(first.comment.comment.content, "첫 댓글");
        assert_eq!(first.comment.author.id, 2);
        assert_eq!(first.comment_count, 1);
        let second = service
            .add_comment(&member, target, "두번째")
            .await
            .expect("comment");
        assert_eq!(second.comment_count, 2);

        let count = service
            .delete_comment(&member, first.comment.comment.id)
            .await
            .expect("author can delete");
        assert_eq!(count, Some(1));
        assert_eq!(store.post(target).comment_count, 1);

        let listed = service.list_comments(target).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].comment.content, "두번째");
    }

    #[tokio::test]
    async fn comment_validation_and_missing_post() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Column, 1);
        let service = service(&store);
        let member = identity(2, Role::User);

        let err = service
            .add_comment(&member, target, "   ")
            .await
            .expect_err("blank comment");
        assert!(matches!(err, DomainError::Validation { field: "content", .. }));

        let missing = PostRef {
            kind: PostKind::Community,
            id: 999,
        };
        let err = service
            .add_comment(&member, missing, "hello")
            .await
            .expect_err("missing post");
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(store.state().comments.is_empty());
    }

    #[tokio::test]
    async fn comment_deletion_requires_author_or_admin() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Column, 1);
        let service = service(&store);
        let added = service
            .add_comment(&identity(2, Role::User), target, "hello")
            .await
            .expect("comment");
        let comment_id = added.comment.comment.id;

        let err = service
            .delete_comment(&identity(3, Role::Expert), comment_id)
            .await
            .expect_err("stranger");
        assert!(matches!(err, DomainError::Forbidden));

        let count = service
            .delete_comment(&identity(4, Role::Admin), comment_id)
            .await
            .expect("admin can delete");
        assert_eq!(count, Some(0));

        let err = service
            .delete_comment(&identity(4, Role::Admin), comment_id)
            .await
            .expect_err("already gone");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_decrement_keeps_the_deletion() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Column, 1);
        let service = service(&store);
        let member = identity(2, Role::User);
        let added = service
            .add_comment(&member, target, "hello")
            .await
            .expect("comment");
        store.fail_counter_updates();

        let count = service
            .delete_comment(&member, added.comment.comment.id)
            .await
            .expect("deletion is not rolled back");
        assert_eq!(count, None);
        assert!(store.state().comments.is_empty());
        assert_eq!(store.post(target).comment_count, 1);
    }

    #[tokio::test]
    async fn failed_counter_update_leaves_no_ledger_rows() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Community, 1);
        let service = service(&store);
        let member = identity(2, Role::User);
        store.fail_counter_updates();

        let err = service
            .add_comment(&member, target, "hello")
            .await
            .expect_err("counter update fails");
        assert!(matches!(err, DomainError::Upstream(_)));
        let err = service
            .toggle_like(&member, target)
            .await
            .expect_err("counter update fails");
        assert!(matches!(err, DomainError::Upstream(_)));

        let state = store.state();
        assert_eq!(state.comment_rows(target), 0);
        assert_eq!(state.like_rows(target), 0);
        assert_eq!(state.posts[&target].comment_count, 0);
        assert_eq!(state.posts[&target].like_count, 0);
    }

    #[tokio::test]
    async fn failed_unlike_keeps_the_like() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Column, 1);
        let service = service(&store);
        let member = identity(2, Role::User);
        service.toggle_like(&member, target).await.expect("like");
        store.fail_counter_updates();

        service
            .toggle_like(&member, target)
            .await
            .expect_err("counter update fails");
        assert!(service.like_status(&member, target).await.expect("status"));
        assert_eq!(store.post(target).like_count, 1);
    }

    #[tokio::test]
    async fn recount_repairs_drift_and_is_admin_only() {
        let store = FakeStore::default();
        let target = store.seed_post(PostKind::Column, 1);
        let service = service(&store);
        let member = identity(2, Role::User);
        service.toggle_like(&member, target).await.expect("like");
        let added = service
            .add_comment(&member, target, "hello")
            .await
            .expect("comment");
        service
            .add_comment(&member, target, "again")
            .await
            .expect("comment");
        store.fail_counter_updates();
        service
            .delete_comment(&member, added.comment.comment.id)
            .await
            .expect("delete");
        assert_eq!(store.post(target).comment_count, 2);

        let err = service
            .recount(&identity(3, Role::Expert), target)
            .await
            .expect_err("experts cannot recount");
        assert!(matches!(err, DomainError::Forbidden));

        let counters = service
            .recount(&identity(4, Role::Admin), target)
            .await
            .expect("admin recount");
        assert_eq!(counters.like_count, 1);
        assert_eq!(counters.comment_count, 1);
        assert_eq!(store.post(target).comment_count, 1);
    }
}
