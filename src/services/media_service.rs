use std::io::Cursor;

use axum::extract::Multipart;
use image::imageops::FilterType;
use uuid::Uuid;

use crate::{
    dto::files::UploadResponse,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Uploaded images are normalized to at most this width before storage.
const MAX_IMAGE_WIDTH: u32 = 800;

const MB: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Product,
    Restaurant,
    Video,
    MenuPdf,
}

impl UploadKind {
    pub fn from_path(kind: &str) -> Option<Self> {
        match kind {
            "product" => Some(UploadKind::Product),
            "restaurant" => Some(UploadKind::Restaurant),
            "video" => Some(UploadKind::Video),
            "menu-pdf" => Some(UploadKind::MenuPdf),
            _ => None,
        }
    }

    fn allowed_types(self) -> &'static [&'static str] {
        match self {
            UploadKind::Product | UploadKind::Restaurant => {
                &["image/jpeg", "image/png", "image/webp"]
            }
            UploadKind::Video => &["video/mp4", "video/webm"],
            UploadKind::MenuPdf => &["application/pdf"],
        }
    }

    fn limit_mb(self) -> usize {
        match self {
            UploadKind::Product | UploadKind::Restaurant => 5,
            UploadKind::MenuPdf => 10,
            UploadKind::Video => 100,
        }
    }

    fn dir(self) -> &'static str {
        match self {
            UploadKind::Product => "products",
            UploadKind::Restaurant => "restaurants",
            UploadKind::Video => "videos",
            UploadKind::MenuPdf => "menus",
        }
    }

    fn is_image(self) -> bool {
        matches!(self, UploadKind::Product | UploadKind::Restaurant)
    }
}

fn validate(kind: UploadKind, content_type: &str, len: usize) -> AppResult<()> {
    if !kind.allowed_types().contains(&content_type) {
        return Err(AppError::UnsupportedFileType(content_type.to_string()));
    }
    if len > kind.limit_mb() * MB {
        return Err(AppError::FileTooLarge {
            limit_mb: kind.limit_mb(),
        });
    }
    Ok(())
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

/// Decode, clamp to `MAX_IMAGE_WIDTH`, re-encode as WebP. Re-encoding also
/// drops any embedded metadata from the original file.
fn optimize_image(data: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(data).map_err(AppError::ImageOptimization)?;

    let img = if img.width() > MAX_IMAGE_WIDTH {
        let height = ((u64::from(img.height()) * u64::from(MAX_IMAGE_WIDTH))
            / u64::from(img.width()))
        .max(1) as u32;
        img.resize(MAX_IMAGE_WIDTH, height, FilterType::Lanczos3)
    } else {
        img
    };

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut cursor);
        img.to_rgba8()
            .write_with_encoder(encoder)
            .map_err(AppError::ImageOptimization)?;
    }

    Ok(buffer)
}

/// Accept one multipart `file` field, validate it for the kind, optimize
/// images, and forward the bytes to object storage. Returns the public URL.
pub async fn handle_upload(
    state: &AppState,
    user: &AuthUser,
    kind: &str,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let restaurant_id = user.tenant_id()?;
    let kind = UploadKind::from_path(kind)
        .ok_or_else(|| AppError::Validation("Unknown upload kind".into()))?;

    let mut file_data: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart request: {e}")))?
    {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .map(str::to_string)
                .ok_or_else(|| AppError::Validation("File content type is required".into()))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
            file_data = Some((content_type, bytes.to_vec()));
            break;
        }
    }

    let (content_type, data) =
        file_data.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::Validation("Empty file provided".into()));
    }

    validate(kind, &content_type, data.len())?;

    let (bytes, content_type, extension) = if kind.is_image() {
        (optimize_image(&data)?, "image/webp".to_string(), "webp")
    } else {
        let extension = extension_for(&content_type);
        (data, content_type, extension)
    };

    let path = format!("{}/{}/{}.{}", kind.dir(), restaurant_id, Uuid::new_v4(), extension);
    let url = state.storage.upload(&path, &content_type, bytes).await?;

    tracing::info!(%restaurant_id, %path, "file uploaded");

    Ok(ApiResponse::success(
        "File uploaded",
        UploadResponse { url },
        Some(Meta::empty()),
    ))
}
