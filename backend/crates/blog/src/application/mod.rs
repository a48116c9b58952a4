//! Application Layer
//!
//! Use cases for posts, categories, tags, comments and uploads.

pub mod category;
pub mod comment;
pub mod config;
pub mod post;
pub mod seed;
pub mod tag;
pub mod upload;
mod validate;

// Re-exports
pub use category::{
    CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, GetCategoryUseCase,
    ListCategoriesUseCase, UpdateCategoryInput, UpdateCategoryUseCase,
};
pub use comment::{
    CreateCommentInput, CreateCommentUseCase, DeleteCommentUseCase, ListCommentsUseCase,
    UpdateCommentInput, UpdateCommentUseCase,
};
pub use config::BlogConfig;
pub use post::{
    CreatePostInput, CreatePostUseCase, DeletePostUseCase, GetPostUseCase, ListPostsQuery,
    ListPostsUseCase, UpdatePostInput, UpdatePostUseCase,
};
pub use tag::{
    CreateTagInput, CreateTagUseCase, DeleteTagUseCase, GetTagUseCase, ListTagsUseCase,
    UpdateTagInput, UpdateTagUseCase,
};
pub use upload::{UploadFileUseCase, UploadedFile};
