use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::post,
};

use crate::{
    dto::files::UploadResponse,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::media_service,
    state::AppState,
};

// Videos may be up to 100MB; leave headroom for the multipart framing.
const UPLOAD_BODY_LIMIT: usize = 110 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{kind}", post(upload_file))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

#[utoipa::path(
    post,
    path = "/api/files/{kind}",
    params(
        ("kind" = String, Path, description = "Upload kind: product, restaurant, video, or menu-pdf")
    ),
    responses(
        (status = 200, description = "File stored; images are resized to <=800px width and re-encoded as WebP", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Unknown kind, unsupported type, or file too large"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Files"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let resp = media_service::handle_upload(&state, &user, &kind, multipart).await?;
    Ok(Json(resp))
}
