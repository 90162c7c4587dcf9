//! Dataset and knowledge base handlers.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use alphamind_storage::{DataType, Dataset, DatasetStatus, KbDocument, KnowledgeBase};

use super::agents::format_timestamp;
use super::common::{
    ok, ok_with_message, optional_str, require_str, user_id_or_default, HandlerResult,
};
use super::ServerState;
use crate::models::ErrorResponse;

/// Dataset info for API responses.
#[derive(Debug, Serialize)]
pub struct DatasetDto {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub size_bytes: u64,
    pub record_count: u64,
    pub status: DatasetStatus,
    pub user_id: String,
    pub created_at: String,
    pub last_processed: Option<String>,
}

impl From<Dataset> for DatasetDto {
    fn from(dataset: Dataset) -> Self {
        Self {
            id: dataset.id,
            name: dataset.name,
            description: dataset.description,
            data_type: dataset.data_type,
            size_bytes: dataset.size_bytes,
            record_count: dataset.record_count,
            status: dataset.status,
            user_id: dataset.user_id,
            created_at: format_timestamp(dataset.created_at),
            last_processed: dataset.last_processed.map(format_timestamp),
        }
    }
}

/// Knowledge base info for API responses.
#[derive(Debug, Serialize)]
pub struct KnowledgeBaseDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub embedding_model: String,
    pub vector_store: String,
    pub document_count: usize,
    pub status: alphamind_storage::KbStatus,
    pub user_id: String,
    pub datasets: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<KnowledgeBase> for KnowledgeBaseDto {
    fn from(kb: KnowledgeBase) -> Self {
        Self {
            id: kb.id,
            name: kb.name,
            description: kb.description,
            embedding_model: kb.embedding_model,
            vector_store: kb.vector_store,
            document_count: kb.documents.len(),
            status: kb.status,
            user_id: kb.user_id,
            datasets: kb.datasets,
            created_at: format_timestamp(kb.created_at),
            updated_at: format_timestamp(kb.updated_at),
        }
    }
}

fn parse_data_type(s: &str) -> Result<DataType, ErrorResponse> {
    match s {
        "text" => Ok(DataType::Text),
        "image" => Ok(DataType::Image),
        "video" => Ok(DataType::Video),
        "structured" => Ok(DataType::Structured),
        other => Err(ErrorResponse::bad_request(format!(
            "unknown data type '{}'",
            other
        ))),
    }
}

fn parse_dataset_status(s: &str) -> Result<DatasetStatus, ErrorResponse> {
    match s {
        "uploading" => Ok(DatasetStatus::Uploading),
        "processing" => Ok(DatasetStatus::Processing),
        "ready" => Ok(DatasetStatus::Ready),
        "error" => Ok(DatasetStatus::Error),
        other => Err(ErrorResponse::bad_request(format!(
            "unknown dataset status '{}'",
            other
        ))),
    }
}

/// Query parameters for listing datasets.
#[derive(Debug, Deserialize)]
pub struct DatasetListQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
}

/// List datasets for a user.
///
/// GET /api/alphamind/data/datasets
pub async fn list_datasets_handler(
    Query(query): Query<DatasetListQuery>,
    State(state): State<ServerState>,
) -> HandlerResult<Vec<DatasetDto>> {
    let status = query.status.as_deref().map(parse_dataset_status).transpose()?;
    let user_id = query.user_id.unwrap_or_else(|| "default_user".to_string());

    let datasets = state.data.list_datasets(&user_id, status).await?;
    ok_with_message(
        datasets.into_iter().map(DatasetDto::from).collect(),
        "Datasets retrieved successfully",
    )
}

/// Create a new dataset.
///
/// POST /api/alphamind/data/datasets
pub async fn create_dataset_handler(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> HandlerResult<DatasetDto> {
    let name = require_str(&body, "name")?;
    let description = require_str(&body, "description")?;
    let data_type = parse_data_type(optional_str(&body, "data_type").unwrap_or("text"))?;

    let mut dataset = Dataset::new(user_id_or_default(&body), name, data_type);
    dataset.description = description.to_string();

    state.data.create_dataset(&dataset).await?;
    ok_with_message(DatasetDto::from(dataset), "Dataset created successfully")
}

/// Get a specific dataset.
///
/// GET /api/alphamind/data/datasets/:id
pub async fn get_dataset_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<DatasetDto> {
    let dataset = state
        .data
        .get_dataset(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Dataset"))?;

    ok(DatasetDto::from(dataset))
}

/// Upload material into a dataset.
///
/// POST /api/alphamind/data/datasets/:id/upload (multipart)
pub async fn upload_dataset_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> HandlerResult<Value> {
    state
        .data
        .get_dataset(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Dataset"))?;

    let mut files = 0u64;
    let mut bytes = 0u64;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ErrorResponse::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let data = field
            .bytes()
            .await
            .map_err(|e| ErrorResponse::bad_request(format!("Failed to read upload: {}", e)))?;
        files += 1;
        bytes += data.len() as u64;
    }

    if files == 0 {
        return Err(ErrorResponse::bad_request("No file provided"));
    }

    let dataset = state.data.record_upload(&id, bytes, files).await?;
    ok_with_message(
        json!({
            "dataset_id": dataset.id,
            "files_received": files,
            "bytes_received": bytes,
            "record_count": dataset.record_count,
        }),
        "File uploaded successfully",
    )
}

/// Kick off dataset processing.
///
/// POST /api/alphamind/data/datasets/:id/process
pub async fn process_dataset_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> HandlerResult<Value> {
    let _config = body
        .as_ref()
        .and_then(|Json(body)| body.get("config").cloned())
        .unwrap_or_else(|| json!({}));

    let dataset = state.data.mark_processing(&id).await.map_err(|e| match e {
        alphamind_storage::Error::NotFound(_) => ErrorResponse::not_found("Dataset"),
        other => other.into(),
    })?;

    ok_with_message(
        json!({
            "dataset_id": dataset.id,
            "status": dataset.status,
        }),
        "Dataset processing started",
    )
}

/// Query parameters for listing knowledge bases.
#[derive(Debug, Deserialize)]
pub struct KbListQuery {
    pub user_id: Option<String>,
}

/// List knowledge bases for a user.
///
/// GET /api/alphamind/data/knowledge-bases
pub async fn list_knowledge_bases_handler(
    Query(query): Query<KbListQuery>,
    State(state): State<ServerState>,
) -> HandlerResult<Vec<KnowledgeBaseDto>> {
    let user_id = query.user_id.unwrap_or_else(|| "default_user".to_string());
    let kbs = state.data.list_knowledge_bases(&user_id).await?;

    ok_with_message(
        kbs.into_iter().map(KnowledgeBaseDto::from).collect(),
        "Knowledge bases retrieved successfully",
    )
}

/// Create a new knowledge base.
///
/// POST /api/alphamind/data/knowledge-bases
pub async fn create_knowledge_base_handler(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> HandlerResult<KnowledgeBaseDto> {
    let name = require_str(&body, "name")?;

    let mut kb = KnowledgeBase::new(user_id_or_default(&body), name);
    if let Some(description) = optional_str(&body, "description") {
        kb.description = description.to_string();
    }
    if let Some(embedding_model) = optional_str(&body, "embedding_model") {
        kb.embedding_model = embedding_model.to_string();
    }
    if let Some(datasets) = body.get("datasets") {
        kb.datasets = serde_json::from_value(datasets.clone()).unwrap_or_default();
    }

    state.data.create_knowledge_base(&kb).await?;
    ok_with_message(
        KnowledgeBaseDto::from(kb),
        "Knowledge base created successfully",
    )
}

/// Get a specific knowledge base.
///
/// GET /api/alphamind/data/knowledge-bases/:id
pub async fn get_knowledge_base_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<KnowledgeBaseDto> {
    let kb = state
        .data
        .get_knowledge_base(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Knowledge base"))?;

    ok(KnowledgeBaseDto::from(kb))
}

/// Add a document to a knowledge base.
///
/// POST /api/alphamind/data/knowledge-bases/:id/documents
pub async fn add_document_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HandlerResult<Value> {
    let title = require_str(&body, "title")?;
    let content = require_str(&body, "content")?;

    let document = KbDocument {
        id: uuid::Uuid::new_v4().to_string(),
        title: title.to_string(),
        content: content.to_string(),
        metadata: body.get("metadata").cloned(),
        created_at: chrono::Utc::now().timestamp(),
    };
    let document_id = document.id.clone();

    let kb = state.data.add_document(&id, document).await.map_err(|e| match e {
        alphamind_storage::Error::NotFound(_) => ErrorResponse::not_found("Knowledge base"),
        other => other.into(),
    })?;

    ok_with_message(
        json!({
            "id": document_id,
            "knowledge_base_id": kb.id,
            "document_count": kb.documents.len(),
        }),
        "Document added successfully",
    )
}

/// Search a knowledge base.
///
/// POST /api/alphamind/data/knowledge-bases/:id/search
pub async fn search_knowledge_base_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HandlerResult<Value> {
    let query = require_str(&body, "query")?;
    let limit = body.get("limit").and_then(Value::as_u64).unwrap_or(10) as usize;
    let threshold = body.get("threshold").and_then(Value::as_f64).unwrap_or(0.7);

    let hits = state
        .data
        .search(&id, query, limit, threshold)
        .await
        .map_err(|e| match e {
            alphamind_storage::Error::NotFound(_) => ErrorResponse::not_found("Knowledge base"),
            other => other.into(),
        })?;

    ok_with_message(
        json!({ "query": query, "results": hits }),
        "Search completed successfully",
    )
}

/// Query parameters for analytics endpoints.
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub user_id: Option<String>,
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    30
}

/// Data overview counters.
///
/// GET /api/alphamind/data/analytics/overview
pub async fn analytics_overview_handler(
    Query(query): Query<AnalyticsQuery>,
    State(state): State<ServerState>,
) -> HandlerResult<Value> {
    let user_id = query.user_id.unwrap_or_else(|| "default_user".to_string());
    let (datasets, knowledge_bases, total_documents) = state.data.overview(&user_id).await?;

    ok(json!({
        "datasets": datasets,
        "knowledge_bases": knowledge_bases,
        "total_documents": total_documents,
    }))
}

/// Usage analytics. Static shape; a real deployment would aggregate events.
///
/// GET /api/alphamind/data/analytics/usage
pub async fn analytics_usage_handler(
    Query(query): Query<AnalyticsQuery>,
) -> HandlerResult<Value> {
    ok(json!({
        "period_days": query.days,
        "queries": 0,
        "uploads": 0,
        "processing_time": 0,
    }))
}
