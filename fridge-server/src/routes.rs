use crate::{
    cache::{CacheQuery, CacheValue, FridgeCache},
    database::Database,
    errors::{WebError, WebResult},
    models::{ImageRecord, ScanRecord},
};
use anyhow::{anyhow, Context};
use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Photos and generated pictures travel as base64, so allow large bodies.
const MAX_BODY_BYTES: usize = 32 << 20;

#[derive(Clone)]
pub struct AllStates {
    pub db: Database,
    pub cache: FridgeCache,
}

pub fn app(states: AllStates) -> Router {
    Router::new()
        // `GET /health` goes to `health`
        .route("/health", get(health))
        // `POST /get-recipes` goes to `get_recipes`
        .route("/get-recipes", post(get_recipes))
        // `POST /save-recipes` goes to `save_recipes`
        .route("/save-recipes", post(save_recipes))
        // `GET /get-image?id=` goes to `get_image`
        .route("/get-image", get(get_image))
        // `POST /upload-image` goes to `upload_image`
        .route("/upload-image", post(upload_image))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            tower_http::compression::CompressionLayer::new()
                .quality(tower_http::CompressionLevel::Fastest),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(states)
}

// Just reply that everything is okay
async fn health() -> StatusCode {
    StatusCode::OK
}

fn require(field: &str, value: &str) -> WebResult<()> {
    if value.trim().is_empty() {
        Err(WebError::BadRequest(format!("`{field}` must not be empty")))
    } else {
        Ok(())
    }
}

/// Read through the in-memory cache to the database.
async fn find_scan(allstates: &AllStates, hash: &str) -> WebResult<Option<String>> {
    let query = CacheQuery::Scan {
        hash: hash.to_string(),
    };
    match allstates.cache.get_value_or_guard_async(&query).await {
        Ok(CacheValue::Scan { payload }) => Ok(Some(payload)),
        Ok(other) => Err(anyhow!("Scan {} cached as {:?}", hash, other).into()),
        Err(guard) => {
            let Some(record) = ScanRecord::get(&allstates.db, hash)? else {
                return Ok(None);
            };
            let _ = guard.insert(CacheValue::Scan {
                payload: record.payload.clone(),
            });
            Ok(Some(record.payload))
        }
    }
}

async fn find_image(allstates: &AllStates, image_id: &str) -> WebResult<Option<String>> {
    let query = CacheQuery::Image {
        image_id: image_id.to_string(),
    };
    match allstates.cache.get_value_or_guard_async(&query).await {
        Ok(CacheValue::Image { url }) => Ok(Some(url)),
        Ok(other) => Err(anyhow!("Image {} cached as {:?}", image_id, other).into()),
        Err(guard) => {
            let Some(record) = ImageRecord::get(&allstates.db, image_id)? else {
                return Ok(None);
            };
            let _ = guard.insert(CacheValue::Image {
                url: record.url.clone(),
            });
            Ok(Some(record.url))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScanLookup {
    hash: String,
}

/// A miss is still a 200, with `success: false`.
async fn get_recipes(
    State(allstates): State<AllStates>,
    Json(lookup): Json<ScanLookup>,
) -> WebResult<Json<Value>> {
    require("hash", &lookup.hash)?;
    match find_scan(&allstates, &lookup.hash).await? {
        Some(payload) => {
            let data: Value =
                serde_json::from_str(&payload).context("Stored scan is not valid JSON")?;
            tracing::info!("Scan hit for {}", lookup.hash);
            Ok(Json(json!({ "success": true, "data": data })))
        }
        None => Ok(Json(json!({ "success": false }))),
    }
}

#[derive(Debug, Deserialize)]
struct ScanUpload {
    hash: String,
    data: Value,
}

async fn save_recipes(
    State(allstates): State<AllStates>,
    Json(upload): Json<ScanUpload>,
) -> WebResult<Json<Value>> {
    require("hash", &upload.hash)?;
    let payload = serde_json::to_string(&upload.data).context("Serializing scan")?;
    ScanRecord::push(&allstates.db, &upload.hash, &payload)?;
    allstates.cache.insert(
        CacheQuery::Scan { hash: upload.hash },
        CacheValue::Scan { payload },
    );
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct ImageLookup {
    id: String,
}

async fn get_image(
    State(allstates): State<AllStates>,
    Query(lookup): Query<ImageLookup>,
) -> WebResult<Json<Value>> {
    require("id", &lookup.id)?;
    let url = find_image(&allstates, &lookup.id)
        .await?
        .ok_or(WebError::NotFound)?;
    Ok(Json(json!({ "url": url })))
}

#[derive(Debug, Deserialize)]
struct ImageUpload {
    id: String,
    image: String,
}

async fn upload_image(
    State(allstates): State<AllStates>,
    Json(upload): Json<ImageUpload>,
) -> WebResult<Json<Value>> {
    require("id", &upload.id)?;
    require("image", &upload.image)?;
    ImageRecord::push(&allstates.db, &upload.id, &upload.image)?;
    allstates.cache.insert(
        CacheQuery::Image {
            image_id: upload.id,
        },
        CacheValue::Image { url: upload.image },
    );
    Ok(Json(json!({ "success": true })))
}
