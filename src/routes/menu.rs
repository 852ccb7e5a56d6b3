use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::menu::PublicMenu,
    error::AppResult,
    response::ApiResponse,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{slug}", get(public_menu))
}

#[utoipa::path(
    get,
    path = "/api/menu/{slug}",
    params(("slug" = String, Path, description = "Restaurant slug")),
    responses(
        (status = 200, description = "Public menu for a restaurant", body = ApiResponse<PublicMenu>),
        (status = 404, description = "Restaurant not found")
    ),
    tag = "Menu"
)]
pub async fn public_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<PublicMenu>>> {
    let resp = menu_service::get_public_menu(&state, &slug).await?;
    Ok(Json(resp))
}
