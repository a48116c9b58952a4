//! HTTP Handlers

use std::str::FromStr;
use std::sync::Arc;

use auth::{CurrentUser, MaybeUser};
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use kernel::id::{CategoryId, CommentId, Id, PostId, TagId};
use kernel::response::ApiResponse;

use crate::application::{
    BlogConfig, CreateCategoryUseCase, CreateCommentUseCase, CreatePostUseCase, CreateTagUseCase,
    DeleteCategoryUseCase, DeleteCommentUseCase, DeletePostUseCase, DeleteTagUseCase,
    GetCategoryUseCase, GetPostUseCase, GetTagUseCase, ListCategoriesUseCase,
    ListCommentsUseCase, ListPostsUseCase, ListTagsUseCase, UpdateCategoryUseCase,
    UpdateCommentUseCase, UpdatePostUseCase, UpdateTagUseCase, UploadFileUseCase,
};
use crate::domain::repository::BlogRepository;
use crate::domain::storage::FileStore;
use crate::domain::viewer::Viewer;
use crate::error::{BlogError, BlogResult};
use crate::presentation::dto::{
    CategoryResponse, CommentResponse, CreateCategoryRequest, CreateCommentRequest,
    CreatePostRequest, CreateTagRequest, ListPostsParams, PostResponse, TagResponse,
    UpdateCategoryRequest, UpdateCommentRequest, UpdatePostRequest, UpdateTagRequest,
    UploadResponse,
};

/// Name of the multipart field carrying the upload
pub const UPLOAD_FIELD: &str = "file";

/// Shared state for blog handlers
pub struct BlogAppState<R, S>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub store: Arc<S>,
    pub config: Arc<BlogConfig>,
}

impl<R, S> Clone for BlogAppState<R, S>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

impl From<&CurrentUser> for Viewer {
    fn from(user: &CurrentUser) -> Self {
        Viewer::user(user.user_id, user.is_admin())
    }
}

impl From<&MaybeUser> for Viewer {
    fn from(user: &MaybeUser) -> Self {
        user.0.as_ref().map_or_else(Viewer::anonymous, Viewer::from)
    }
}

/// Positive integer path segment
fn parse_id<T>(raw: &str, resource: &str) -> BlogResult<Id<T>> {
    Id::<T>::from_str(raw).map_err(|_| BlogError::Validation(format!("Invalid {resource} ID")))
}

// ============================================================================
// Posts
// ============================================================================

/// GET /api/posts
pub async fn list_posts<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: MaybeUser,
    Query(params): Query<ListPostsParams>,
) -> BlogResult<ApiResponse<Vec<PostResponse>>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let use_case = ListPostsUseCase::new(state.repo.clone());
    let (posts, pagination) = use_case
        .execute(params.into(), &Viewer::from(&user))
        .await?;

    Ok(ApiResponse::paginated(
        posts.iter().map(PostResponse::from).collect(),
        pagination,
    ))
}

/// GET /api/posts/{id}
pub async fn get_post<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> BlogResult<ApiResponse<PostResponse>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let id: PostId = parse_id(&id, "post")?;
    let details = GetPostUseCase::new(state.repo.clone())
        .by_id(id, &Viewer::from(&user))
        .await?;

    Ok(ApiResponse::ok(PostResponse::from(&details)))
}

/// GET /api/posts/slug/{slug}
pub async fn get_post_by_slug<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: MaybeUser,
    Path(slug): Path<String>,
) -> BlogResult<ApiResponse<PostResponse>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let details = GetPostUseCase::new(state.repo.clone())
        .by_slug(&slug, &Viewer::from(&user))
        .await?;

    Ok(ApiResponse::ok(PostResponse::from(&details)))
}

/// POST /api/posts
pub async fn create_post<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let details = CreatePostUseCase::new(state.repo.clone())
        .execute(user.user_id, req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(PostResponse::from(&details)).with_message("Post created successfully"),
    ))
}

/// PUT /api/posts/{id}
pub async fn update_post<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> BlogResult<ApiResponse<PostResponse>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let id: PostId = parse_id(&id, "post")?;
    let details = UpdatePostUseCase::new(state.repo.clone())
        .execute(id, &Viewer::from(&user), req.into())
        .await?;

    Ok(ApiResponse::ok(PostResponse::from(&details)).with_message("Post updated successfully"))
}

/// DELETE /api/posts/{id}
pub async fn delete_post<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> BlogResult<ApiResponse<()>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let id: PostId = parse_id(&id, "post")?;
    DeletePostUseCase::new(state.repo.clone())
        .execute(id, &Viewer::from(&user))
        .await?;

    Ok(ApiResponse::message("Post deleted successfully"))
}

// ============================================================================
// Categories
// ============================================================================

/// GET /api/categories
pub async fn list_categories<R, S>(
    State(state): State<BlogAppState<R, S>>,
) -> BlogResult<ApiResponse<Vec<CategoryResponse>>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let categories = ListCategoriesUseCase::new(state.repo.clone()).execute().await?;
    Ok(ApiResponse::ok(
        categories.iter().map(CategoryResponse::from).collect(),
    ))
}

/// GET /api/categories/{id_or_slug}
pub async fn get_category<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: MaybeUser,
    Path(id_or_slug): Path<String>,
) -> BlogResult<ApiResponse<CategoryResponse>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let (category, post_count) = GetCategoryUseCase::new(state.repo.clone())
        .execute(&id_or_slug, &Viewer::from(&user))
        .await?;

    Ok(ApiResponse::ok(
        CategoryResponse::from(&category).with_post_count(post_count),
    ))
}

/// POST /api/categories
pub async fn create_category<R, S>(
    State(state): State<BlogAppState<R, S>>,
    Json(req): Json<CreateCategoryRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let category = CreateCategoryUseCase::new(state.repo.clone())
        .execute(req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(CategoryResponse::from(&category))
            .with_message("Category created successfully"),
    ))
}

/// PUT /api/categories/{id}
pub async fn update_category<R, S>(
    State(state): State<BlogAppState<R, S>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCategoryRequest>,
) -> BlogResult<ApiResponse<CategoryResponse>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let id: CategoryId = parse_id(&id, "category")?;
    let category = UpdateCategoryUseCase::new(state.repo.clone())
        .execute(id, req.into())
        .await?;

    Ok(ApiResponse::ok(CategoryResponse::from(&category))
        .with_message("Category updated successfully"))
}

/// DELETE /api/categories/{id}
pub async fn delete_category<R, S>(
    State(state): State<BlogAppState<R, S>>,
    Path(id): Path<String>,
) -> BlogResult<ApiResponse<()>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let id: CategoryId = parse_id(&id, "category")?;
    DeleteCategoryUseCase::new(state.repo.clone()).execute(id).await?;

    Ok(ApiResponse::message("Category deleted successfully"))
}

// ============================================================================
// Tags
// ============================================================================

/// GET /api/tags
pub async fn list_tags<R, S>(
    State(state): State<BlogAppState<R, S>>,
) -> BlogResult<ApiResponse<Vec<TagResponse>>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let tags = ListTagsUseCase::new(state.repo.clone()).execute().await?;
    Ok(ApiResponse::ok(tags.iter().map(TagResponse::from).collect()))
}

/// GET /api/tags/{id_or_slug}
pub async fn get_tag<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: MaybeUser,
    Path(id_or_slug): Path<String>,
) -> BlogResult<ApiResponse<TagResponse>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let (tag, post_count) = GetTagUseCase::new(state.repo.clone())
        .execute(&id_or_slug, &Viewer::from(&user))
        .await?;

    Ok(ApiResponse::ok(
        TagResponse::from(&tag).with_post_count(post_count),
    ))
}

/// POST /api/tags
pub async fn create_tag<R, S>(
    State(state): State<BlogAppState<R, S>>,
    Json(req): Json<CreateTagRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let tag = CreateTagUseCase::new(state.repo.clone())
        .execute(req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(TagResponse::from(&tag)).with_message("Tag created successfully"),
    ))
}

/// PUT /api/tags/{id}
pub async fn update_tag<R, S>(
    State(state): State<BlogAppState<R, S>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTagRequest>,
) -> BlogResult<ApiResponse<TagResponse>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let id: TagId = parse_id(&id, "tag")?;
    let tag = UpdateTagUseCase::new(state.repo.clone())
        .execute(id, req.into())
        .await?;

    Ok(ApiResponse::ok(TagResponse::from(&tag)).with_message("Tag updated successfully"))
}

/// DELETE /api/tags/{id}
pub async fn delete_tag<R, S>(
    State(state): State<BlogAppState<R, S>>,
    Path(id): Path<String>,
) -> BlogResult<ApiResponse<()>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let id: TagId = parse_id(&id, "tag")?;
    DeleteTagUseCase::new(state.repo.clone()).execute(id).await?;

    Ok(ApiResponse::message("Tag deleted successfully"))
}

// ============================================================================
// Comments
// ============================================================================

/// GET /api/posts/{id}/comments
pub async fn list_comments<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: MaybeUser,
    Path(post_id): Path<String>,
) -> BlogResult<ApiResponse<Vec<CommentResponse>>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let post_id: PostId = parse_id(&post_id, "post")?;
    let comments = ListCommentsUseCase::new(state.repo.clone())
        .execute(post_id, &Viewer::from(&user))
        .await?;

    Ok(ApiResponse::ok(
        comments.iter().map(CommentResponse::from).collect(),
    ))
}

/// POST /api/posts/{id}/comments
pub async fn create_comment<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: CurrentUser,
    Path(post_id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let post_id: PostId = parse_id(&post_id, "post")?;
    let comment = CreateCommentUseCase::new(state.repo.clone())
        .execute(post_id, &Viewer::from(&user), req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(CommentResponse::from(&comment))
            .with_message("Comment created successfully"),
    ))
}

/// PUT /api/comments/{id}
pub async fn update_comment<R, S>(
    State(state): State<BlogAppState<R, S>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCommentRequest>,
) -> BlogResult<ApiResponse<CommentResponse>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let id: CommentId = parse_id(&id, "comment")?;
    let comment = UpdateCommentUseCase::new(state.repo.clone())
        .execute(id, req.into())
        .await?;

    Ok(ApiResponse::ok(CommentResponse::from(&comment))
        .with_message("Comment updated successfully"))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment<R, S>(
    State(state): State<BlogAppState<R, S>>,
    Path(id): Path<String>,
) -> BlogResult<ApiResponse<()>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let id: CommentId = parse_id(&id, "comment")?;
    DeleteCommentUseCase::new(state.repo.clone()).execute(id).await?;

    Ok(ApiResponse::message("Comment deleted successfully"))
}

// ============================================================================
// Upload
// ============================================================================

fn multipart_error(err: MultipartError, max_bytes: u64) -> BlogError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        BlogError::FileTooLarge { max_bytes }
    } else {
        BlogError::Validation(err.body_text())
    }
}

/// POST /api/upload
pub async fn upload<R, S>(
    State(state): State<BlogAppState<R, S>>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> BlogResult<ApiResponse<UploadResponse>>
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let max_bytes = state.config.upload_max_bytes;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            if (bytes.len() + chunk.len()) as u64 > max_bytes {
                return Err(BlogError::FileTooLarge { max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(user_id = %user.user_id, file_name = %file_name, "Upload received");

        let file = UploadFileUseCase::new(state.store.clone(), (*state.config).clone())
            .execute(&file_name, &bytes, Utc::now())
            .await?;

        return Ok(ApiResponse::ok(UploadResponse::from(file))
            .with_message("File uploaded successfully"));
    }

    Err(BlogError::NoFile)
}
