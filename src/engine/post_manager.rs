// Posts with embedded likes and comments

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::errors::AppError;
use crate::core::models::{AuthorSnapshot, Comment, Like, Post, User};
use crate::state::{modify_post, PostStore};

pub const POST_NOT_FOUND_MESSAGE: &str = "Post not found...";
pub const COMMENT_NOT_FOUND_MESSAGE: &str = "Comment does not exist...";

fn post_not_found() -> AppError {
    AppError::NotFound(POST_NOT_FOUND_MESSAGE.to_string())
}

fn require_text(text: Option<&str>, message: &str) -> Result<String, AppError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t.to_string()),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

/// Ownership-checked operations over posts
///
/// Author name and avatar are copied into posts and comments when they are
/// written; later account edits do not reach them.
pub struct PostManager {
    posts: Arc<dyn PostStore>,
}

impl PostManager {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    pub async fn create_post(&self, author: &User, text: Option<&str>) -> Result<Post, AppError> {
        let text = require_text(text, "Text is required")?;
        let snapshot = AuthorSnapshot::from(author);

        let post = Post {
            id: Uuid::new_v4(),
            user: snapshot.user,
            name: snapshot.name,
            avatar: snapshot.avatar,
            text,
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc::now(),
        };
        self.posts.insert_post(&post).await?;

        info!(post_id = %post.id, author = %author.id, "Post created");
        Ok(post)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, AppError> {
        self.posts.find_post(id).await?.ok_or_else(post_not_found)
    }

    /// All posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        self.posts.list_posts().await
    }

    pub async fn delete_post(&self, id: Uuid, caller: Uuid) -> Result<(), AppError> {
        let post = self.get_post(id).await?;
        if post.user != caller {
            return Err(AppError::not_owner("Unauthorized request"));
        }

        if !self.posts.delete_post(id).await? {
            return Err(post_not_found());
        }
        info!(post_id = %id, "Post deleted");
        Ok(())
    }

    /// Prepend `caller` to the likes; a second like is a conflict
    pub async fn like(&self, id: Uuid, caller: Uuid) -> Result<Vec<Like>, AppError> {
        let (post, ()) = modify_post(self.posts.as_ref(), id, |post| {
            if post.is_liked_by(caller) {
                return Err(AppError::Conflict("You already like this...".to_string()));
            }
            post.likes.insert(0, Like { user: caller });
            Ok(())
        })
        .await?;
        Ok(post.likes)
    }

    /// Remove `caller` from the likes; unliking without a like is a conflict
    pub async fn unlike(&self, id: Uuid, caller: Uuid) -> Result<Vec<Like>, AppError> {
        let (post, ()) = modify_post(self.posts.as_ref(), id, |post| {
            if !post.is_liked_by(caller) {
                return Err(AppError::Conflict("Post has not yet been liked...".to_string()));
            }
            post.likes.retain(|like| like.user != caller);
            Ok(())
        })
        .await?;
        Ok(post.likes)
    }

    pub async fn add_comment(
        &self,
        id: Uuid,
        author: &User,
        text: Option<&str>,
    ) -> Result<Vec<Comment>, AppError> {
        let text = require_text(text, "Text is required")?;
        let snapshot = AuthorSnapshot::from(author);
        let comment = Comment {
            id: Uuid::new_v4(),
            user: snapshot.user,
            name: snapshot.name,
            avatar: snapshot.avatar,
            text,
            date: Utc::now(),
        };

        let (post, ()) = modify_post(self.posts.as_ref(), id, move |post| {
            post.comments.insert(0, comment);
            Ok(())
        })
        .await?;
        Ok(post.comments)
    }

    /// Remove one of the caller's comments, returning its id
    pub async fn delete_comment(
        &self,
        id: Uuid,
        comment_id: &str,
        caller: Uuid,
    ) -> Result<Uuid, AppError> {
        let (_, removed) = modify_post(self.posts.as_ref(), id, |post| {
            let pos = find_comment(post, comment_id)?;
            if post.comments[pos].user != caller {
                return Err(AppError::not_owner("Not Authorized to delete this comment..."));
            }
            Ok(post.comments.remove(pos).id)
        })
        .await?;

        info!(post_id = %id, comment_id = %removed, "Comment deleted");
        Ok(removed)
    }

    /// Replace the text of one of the caller's comments and refresh its date
    ///
    /// Text is checked before the post is even loaded.
    pub async fn edit_comment(
        &self,
        id: Uuid,
        comment_id: &str,
        caller: Uuid,
        text: Option<&str>,
    ) -> Result<Comment, AppError> {
        let text = require_text(text, "An edit must contain some text...")?;

        let (_, edited) = modify_post(self.posts.as_ref(), id, |post| {
            let pos = find_comment(post, comment_id)?;
            let comment = &mut post.comments[pos];
            if comment.user != caller {
                return Err(AppError::not_owner("Not Authorized to edit this comment..."));
            }
            comment.text = text;
            comment.date = Utc::now();
            Ok(comment.clone())
        })
        .await?;
        Ok(edited)
    }
}

/// Position of the comment with `comment_id`; an id that is not a UUID
/// matches nothing
fn find_comment(post: &Post, comment_id: &str) -> Result<usize, AppError> {
    let target = Uuid::parse_str(comment_id.trim()).ok();
    target
        .and_then(|id| post.comments.iter().position(|c| c.id == id))
        .ok_or_else(|| AppError::NotFound(COMMENT_NOT_FOUND_MESSAGE.to_string()))
}
