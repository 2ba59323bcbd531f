//! `POST /api/pollution/analyze`: citizen photo → decision + legal draft.
//!
//! Multipart form with either a `file` part or an `image_url` text part.
//! When both are present the upload wins.

use axum::extract::{Multipart, State};
use axum::http::header::USER_AGENT;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config::MAX_IMAGE_BYTES;
use crate::pipeline::detection::PollutionReport;

/// Some image hosts reject non-browser agents.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
Chrome/120.0 Safari/537.36";

/// Filename hint used for fetched images.
const URL_FILENAME_HINT: &str = "unknown.jpg";

struct ImageInput {
    bytes: Vec<u8>,
    filename: String,
}

pub async fn analyze(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<PollutionReport>, ApiError> {
    let mut upload: Option<ImageInput> = None;
    let mut image_url: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or(URL_FILENAME_HINT).to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {e}")))?;
                if !bytes.is_empty() {
                    upload = Some(ImageInput {
                        bytes: bytes.to_vec(),
                        filename,
                    });
                }
            }
            Some("image_url") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Could not read image_url: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    image_url = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let input = match (upload, image_url) {
        (Some(upload), _) => upload,
        (None, Some(url)) => ImageInput {
            bytes: fetch_image(&ctx.http, &url, MAX_IMAGE_BYTES).await?,
            filename: URL_FILENAME_HINT.to_string(),
        },
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Provide either an image file or an image_url".into(),
            ))
        }
    };

    tracing::info!(
        filename = %input.filename,
        bytes = input.bytes.len(),
        "Pollution analysis requested"
    );

    let detector = ctx.detector.clone();
    let report = tokio::task::spawn_blocking(move || {
        let decision = detector.decide(&input.bytes, &input.filename);
        PollutionReport::from_decision(decision, chrono::Local::now().date_naive())
    })
    .await?;

    Ok(Json(report))
}

/// Download `url`, refusing bodies larger than `limit` bytes.
async fn fetch_image(http: &reqwest::Client, url: &str, limit: usize) -> Result<Vec<u8>, ApiError> {
    let mut response = http
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            tracing::warn!(%url, error = %e, "Image download failed");
            ApiError::BadRequest(format!("Could not download image from URL: {e}"))
        })?;

    let too_large = || ApiError::BadRequest(format!("Image at URL exceeds {limit} bytes"));

    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Could not read image from URL: {e}")))?
    {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
