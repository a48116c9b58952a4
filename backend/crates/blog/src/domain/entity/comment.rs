//! Comment Entity
//!
//! Comments start unapproved and only become public once an admin
//! approves them.

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, PostId};

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: String,
    pub email: String,
    pub content: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub author: String,
    pub email: String,
    pub content: String,
    pub approved: bool,
}
