//! Comment Use Cases
//!
//! Anyone signed in may comment on a post they can see. New comments are
//! held for moderation; only admins see them before approval.

use std::sync::Arc;

use auth::models::email::Email;
use chrono::Utc;
use kernel::id::{CommentId, PostId};

use crate::application::validate::required_text;
use crate::domain::entity::comment::{Comment, NewComment};
use crate::domain::repository::{CommentRepository, PostRepository};
use crate::domain::viewer::Viewer;
use crate::error::{BlogError, BlogResult};

pub const MAX_AUTHOR_LENGTH: usize = 100;
pub const MAX_COMMENT_LENGTH: usize = 5000;

async fn ensure_visible_post<R>(repo: &R, post_id: PostId, viewer: &Viewer) -> BlogResult<()>
where
    R: PostRepository,
{
    repo.find_post(post_id)
        .await?
        .filter(|d| d.post.is_visible_to(viewer))
        .map(|_| ())
        .ok_or(BlogError::PostNotFound)
}

pub struct ListCommentsUseCase<R>
where
    R: PostRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> ListCommentsUseCase<R>
where
    R: PostRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Newest first; unapproved comments only for admins
    pub async fn execute(&self, post_id: PostId, viewer: &Viewer) -> BlogResult<Vec<Comment>> {
        ensure_visible_post(self.repo.as_ref(), post_id, viewer).await?;
        self.repo.list_comments(post_id, viewer.is_admin).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateCommentInput {
    pub author: String,
    pub email: String,
    pub content: String,
}

pub struct CreateCommentUseCase<R>
where
    R: PostRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> CreateCommentUseCase<R>
where
    R: PostRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        post_id: PostId,
        viewer: &Viewer,
        input: CreateCommentInput,
    ) -> BlogResult<Comment> {
        let author = required_text("Author", &input.author, MAX_AUTHOR_LENGTH)?;
        let email = Email::new(&input.email)?;
        let content = required_text("Content", &input.content, MAX_COMMENT_LENGTH)?;

        ensure_visible_post(self.repo.as_ref(), post_id, viewer).await?;

        let comment = self
            .repo
            .create_comment(&NewComment {
                post_id,
                author,
                email: email.into_db(),
                content,
                approved: false,
            })
            .await?;

        tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment submitted for moderation");
        Ok(comment)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCommentInput {
    pub content: Option<String>,
    pub approved: Option<bool>,
}

pub struct UpdateCommentUseCase<R>
where
    R: CommentRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateCommentUseCase<R>
where
    R: CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: CommentId, input: UpdateCommentInput) -> BlogResult<Comment> {
        let mut comment = self
            .repo
            .find_comment(id)
            .await?
            .ok_or(BlogError::CommentNotFound)?;

        if let Some(content) = input.content {
            comment.content = required_text("Content", &content, MAX_COMMENT_LENGTH)?;
        }
        if let Some(approved) = input.approved {
            comment.approved = approved;
        }

        comment.updated_at = Utc::now();
        self.repo.update_comment(&comment).await?;

        tracing::info!(comment_id = %id, approved = comment.approved, "Comment updated");
        Ok(comment)
    }
}

pub struct DeleteCommentUseCase<R>
where
    R: CommentRepository,
{
    repo: Arc<R>,
}

impl<R> DeleteCommentUseCase<R>
where
    R: CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: CommentId) -> BlogResult<()> {
        if !self.repo.delete_comment(id).await? {
            return Err(BlogError::CommentNotFound);
        }
        tracing::info!(comment_id = %id, "Comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::post::{CreatePostInput, CreatePostUseCase};
    use crate::testing::InMemoryBlogRepository;
    use kernel::id::UserId;

    async fn setup(published: bool) -> (Arc<InMemoryBlogRepository>, UserId, PostId) {
        let repo = Arc::new(InMemoryBlogRepository::default());
        let author = repo.add_author(1, "alice").await;
        let post = CreatePostUseCase::new(repo.clone())
            .execute(
                author,
                CreatePostInput {
                    title: "Commented".to_string(),
                    content: "Body".to_string(),
                    published,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (repo, author, post.post.id)
    }

    fn input() -> CreateCommentInput {
        CreateCommentInput {
            author: " Reader ".to_string(),
            email: "Reader@Example.com".to_string(),
            content: "Nice post".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_comments_await_approval() {
        let (repo, _, post_id) = setup(true).await;
        let reader = Viewer::user(UserId::new(2), false);

        let comment = CreateCommentUseCase::new(repo.clone())
            .execute(post_id, &reader, input())
            .await
            .unwrap();
        assert!(!comment.approved);
        assert_eq!(comment.author, "Reader");
        assert_eq!(comment.email, "reader@example.com");

        let list = ListCommentsUseCase::new(repo.clone());
        assert!(list.execute(post_id, &Viewer::anonymous()).await.unwrap().is_empty());
        let admin = Viewer::user(UserId::new(9), true);
        assert_eq!(list.execute(post_id, &admin).await.unwrap().len(), 1);

        UpdateCommentUseCase::new(repo.clone())
            .execute(
                comment.id,
                UpdateCommentInput {
                    approved: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(list.execute(post_id, &Viewer::anonymous()).await.unwrap().len(), 1);

        let delete = DeleteCommentUseCase::new(repo.clone());
        delete.execute(comment.id).await.unwrap();
        assert!(matches!(delete.execute(comment.id).await, Err(BlogError::CommentNotFound)));
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let (repo, _, post_id) = setup(true).await;
        let create = CreateCommentUseCase::new(repo.clone());
        let viewer = Viewer::user(UserId::new(2), false);

        let err = create
            .execute(
                post_id,
                &viewer,
                CreateCommentInput {
                    email: "not-an-email".to_string(),
                    ..input()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::Validation(ref m) if m == "Invalid email format"));

        let err = create
            .execute(
                post_id,
                &viewer,
                CreateCommentInput {
                    content: "  ".to_string(),
                    ..input()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::Validation(ref m) if m == "Content is required"));

        let err = create
            .execute(PostId::new(404), &viewer, input())
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::PostNotFound));
        assert_eq!(repo.comment_count().await, 0);
    }

    #[tokio::test]
    async fn test_drafts_hide_their_comments() {
        let (repo, author, post_id) = setup(false).await;

        let stranger = Viewer::user(UserId::new(2), false);
        let err = CreateCommentUseCase::new(repo.clone())
            .execute(post_id, &stranger, input())
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::PostNotFound));

        let owner = Viewer::user(author, false);
        CreateCommentUseCase::new(repo.clone())
            .execute(post_id, &owner, input())
            .await
            .unwrap();
        assert!(matches!(
            ListCommentsUseCase::new(repo).execute(post_id, &Viewer::anonymous()).await,
            Err(BlogError::PostNotFound)
        ));
    }
}
