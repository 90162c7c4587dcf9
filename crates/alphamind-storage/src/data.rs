//! Dataset and knowledge base storage.
//!
//! Datasets track uploaded raw material and its processing status.
//! Knowledge bases are named collections of embedded documents; documents
//! are kept inline on the knowledge base row, and search is a naive
//! substring match standing in for similarity scoring.

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Error;

const DATASETS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("datasets");
const KNOWLEDGE_BASES_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("knowledge_bases");

/// Store for datasets and knowledge bases.
pub struct DataStore {
    db: Arc<Database>,
}

/// A dataset of uploaded material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Unique dataset ID
    pub id: String,
    /// Dataset name
    pub name: String,
    /// User-provided description
    #[serde(default)]
    pub description: String,
    /// Kind of data held
    pub data_type: DataType,
    /// Total uploaded bytes
    #[serde(default)]
    pub size_bytes: u64,
    /// Number of records/files
    #[serde(default)]
    pub record_count: u64,
    /// Processing status
    pub status: DatasetStatus,
    /// Owning user reference
    pub user_id: String,
    /// Creation timestamp
    pub created_at: i64,
    /// Last processing timestamp
    pub last_processed: Option<i64>,
}

/// Kind of data a dataset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Image,
    Video,
    Structured,
}

/// Dataset processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    /// Created, waiting for material
    Uploading,
    /// Processing in progress
    Processing,
    /// Ready for use
    Ready,
    /// Processing failed
    Error,
}

/// A knowledge base of embedded documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Unique knowledge base ID
    pub id: String,
    /// Knowledge base name
    pub name: String,
    /// User-provided description
    #[serde(default)]
    pub description: String,
    /// Embedding model identifier
    pub embedding_model: String,
    /// Backing vector store name
    pub vector_store: String,
    /// Knowledge base status
    pub status: KbStatus,
    /// Owning user reference
    pub user_id: String,
    /// Source dataset references
    #[serde(default)]
    pub datasets: Vec<String>,
    /// Embedded documents
    #[serde(default)]
    pub documents: Vec<KbDocument>,
    /// Creation timestamp
    pub created_at: i64,
    /// Last update timestamp
    pub updated_at: i64,
}

/// Knowledge base status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KbStatus {
    /// Index under construction
    Building,
    /// Searchable
    Active,
    /// Build failed
    Error,
}

/// A document held inside a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbDocument {
    /// Unique document ID
    pub id: String,
    /// Document title
    pub title: String,
    /// Document content
    pub content: String,
    /// Optional extra metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Creation timestamp
    pub created_at: i64,
}

/// One search hit with its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: String,
    pub title: String,
    pub snippet: String,
    pub score: f64,
}

impl Dataset {
    /// Create a new dataset in `uploading` state.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            data_type,
            size_bytes: 0,
            record_count: 0,
            status: DatasetStatus::Uploading,
            user_id: user_id.into(),
            created_at: chrono::Utc::now().timestamp(),
            last_processed: None,
        }
    }
}

impl KnowledgeBase {
    /// Create a new knowledge base in `building` state.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            embedding_model: "text-embedding-ada-002".to_string(),
            vector_store: "builtin".to_string(),
            status: KbStatus::Building,
            user_id: user_id.into(),
            datasets: Vec::new(),
            documents: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl DataStore {
    /// Open or create a data store at the given path.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Arc<Self>, Error> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        write_txn.open_table(DATASETS_TABLE)?;
        write_txn.open_table(KNOWLEDGE_BASES_TABLE)?;
        write_txn.commit()?;
        Ok(Arc::new(Self { db: Arc::new(db) }))
    }

    /// Create an in-memory data store for testing.
    pub fn memory() -> Result<Arc<Self>, Error> {
        let temp_path =
            std::env::temp_dir().join(format!("data_test_{}.redb", uuid::Uuid::new_v4()));
        Self::open(temp_path)
    }

    // ========== Datasets ==========

    /// Insert a new dataset.
    pub async fn create_dataset(&self, dataset: &Dataset) -> Result<(), Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DATASETS_TABLE)?;
            let value = serde_json::to_vec(dataset)?;
            table.insert(dataset.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a dataset by ID.
    pub async fn get_dataset(&self, id: &str) -> Result<Option<Dataset>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DATASETS_TABLE)?;
        match table.get(id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// List datasets for a user, optionally filtered by status.
    pub async fn list_datasets(
        &self,
        user_id: &str,
        status: Option<DatasetStatus>,
    ) -> Result<Vec<Dataset>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DATASETS_TABLE)?;

        let mut datasets = Vec::new();
        for item in table.iter()? {
            let (_id, bytes) = item?;
            let dataset: Dataset = serde_json::from_slice(bytes.value())?;
            if dataset.user_id != user_id {
                continue;
            }
            if let Some(status) = status {
                if dataset.status != status {
                    continue;
                }
            }
            datasets.push(dataset);
        }

        datasets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(datasets)
    }

    /// Record uploaded material against a dataset.
    pub async fn record_upload(&self, id: &str, bytes: u64, records: u64) -> Result<Dataset, Error> {
        let mut dataset = self
            .get_dataset(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Dataset {} not found", id)))?;
        dataset.size_bytes += bytes;
        dataset.record_count += records;
        self.put_dataset(&dataset).await?;
        Ok(dataset)
    }

    /// Flip a dataset into `processing` and stamp `last_processed`.
    pub async fn mark_processing(&self, id: &str) -> Result<Dataset, Error> {
        let mut dataset = self
            .get_dataset(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Dataset {} not found", id)))?;
        dataset.status = DatasetStatus::Processing;
        dataset.last_processed = Some(chrono::Utc::now().timestamp());
        self.put_dataset(&dataset).await?;
        Ok(dataset)
    }

    /// Update a dataset's status.
    pub async fn set_dataset_status(&self, id: &str, status: DatasetStatus) -> Result<bool, Error> {
        let mut dataset = match self.get_dataset(id).await? {
            Some(dataset) => dataset,
            None => return Ok(false),
        };
        dataset.status = status;
        self.put_dataset(&dataset).await?;
        Ok(true)
    }

    async fn put_dataset(&self, dataset: &Dataset) -> Result<(), Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DATASETS_TABLE)?;
            let value = serde_json::to_vec(dataset)?;
            table.insert(dataset.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Knowledge bases ==========

    /// Insert a new knowledge base.
    pub async fn create_knowledge_base(&self, kb: &KnowledgeBase) -> Result<(), Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KNOWLEDGE_BASES_TABLE)?;
            let value = serde_json::to_vec(kb)?;
            table.insert(kb.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a knowledge base by ID.
    pub async fn get_knowledge_base(&self, id: &str) -> Result<Option<KnowledgeBase>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KNOWLEDGE_BASES_TABLE)?;
        match table.get(id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// List knowledge bases for a user.
    pub async fn list_knowledge_bases(&self, user_id: &str) -> Result<Vec<KnowledgeBase>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KNOWLEDGE_BASES_TABLE)?;

        let mut kbs = Vec::new();
        for item in table.iter()? {
            let (_id, bytes) = item?;
            let kb: KnowledgeBase = serde_json::from_slice(bytes.value())?;
            if kb.user_id == user_id {
                kbs.push(kb);
            }
        }

        kbs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(kbs)
    }

    /// Add a document to a knowledge base. The first document flips the
    /// knowledge base from `building` to `active`.
    pub async fn add_document(&self, kb_id: &str, document: KbDocument) -> Result<KnowledgeBase, Error> {
        let mut kb = self
            .get_knowledge_base(kb_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Knowledge base {} not found", kb_id)))?;

        kb.documents.push(document);
        if kb.status == KbStatus::Building {
            kb.status = KbStatus::Active;
        }
        kb.updated_at = chrono::Utc::now().timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KNOWLEDGE_BASES_TABLE)?;
            let value = serde_json::to_vec(&kb)?;
            table.insert(kb_id, value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(kb)
    }

    /// Search a knowledge base. Scores are keyword-overlap based; hits below
    /// the threshold are dropped.
    pub async fn search(
        &self,
        kb_id: &str,
        query: &str,
        limit: usize,
        threshold: f64,
    ) -> Result<Vec<SearchHit>, Error> {
        let kb = self
            .get_knowledge_base(kb_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Knowledge base {} not found", kb_id)))?;

        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<SearchHit> = kb
            .documents
            .iter()
            .filter_map(|doc| {
                let haystack = format!("{} {}", doc.title, doc.content).to_lowercase();
                let matched = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                let score = matched as f64 / terms.len() as f64;
                if score >= threshold {
                    Some(SearchHit {
                        document_id: doc.id.clone(),
                        title: doc.title.clone(),
                        snippet: doc.content.chars().take(200).collect(),
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    /// Counters for the analytics overview endpoint.
    pub async fn overview(&self, user_id: &str) -> Result<(usize, usize, usize), Error> {
        let datasets = self.list_datasets(user_id, None).await?;
        let kbs = self.list_knowledge_bases(user_id).await?;
        let total_documents = kbs.iter().map(|kb| kb.documents.len()).sum();
        Ok((datasets.len(), kbs.len(), total_documents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> Arc<DataStore> {
        DataStore::memory().unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_datasets() {
        let store = test_store();

        let dataset = Dataset::new("user-1", "Logs", DataType::Text);
        store.create_dataset(&dataset).await.unwrap();

        let listed = store.list_datasets("user-1", None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, DatasetStatus::Uploading);

        let filtered = store
            .list_datasets("user-1", Some(DatasetStatus::Ready))
            .await
            .unwrap();
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn test_record_upload_accumulates() {
        let store = test_store();

        let dataset = Dataset::new("user-1", "Corpus", DataType::Text);
        store.create_dataset(&dataset).await.unwrap();

        store.record_upload(&dataset.id, 1024, 10).await.unwrap();
        let updated = store.record_upload(&dataset.id, 512, 5).await.unwrap();
        assert_eq!(updated.size_bytes, 1536);
        assert_eq!(updated.record_count, 15);
    }

    #[tokio::test]
    async fn test_mark_processing() {
        let store = test_store();

        let dataset = Dataset::new("user-1", "Corpus", DataType::Structured);
        store.create_dataset(&dataset).await.unwrap();

        let updated = store.mark_processing(&dataset.id).await.unwrap();
        assert_eq!(updated.status, DatasetStatus::Processing);
        assert!(updated.last_processed.is_some());
    }

    #[tokio::test]
    async fn test_add_document_activates_kb() {
        let store = test_store();

        let kb = KnowledgeBase::new("user-1", "Docs");
        store.create_knowledge_base(&kb).await.unwrap();
        assert_eq!(kb.status, KbStatus::Building);

        let doc = KbDocument {
            id: uuid::Uuid::new_v4().to_string(),
            title: "Intro".to_string(),
            content: "Getting started with AlphaMind".to_string(),
            metadata: None,
            created_at: chrono::Utc::now().timestamp(),
        };
        let updated = store.add_document(&kb.id, doc).await.unwrap();
        assert_eq!(updated.status, KbStatus::Active);
        assert_eq!(updated.documents.len(), 1);
    }

    #[tokio::test]
    async fn test_search_scores_and_threshold() {
        let store = test_store();

        let kb = KnowledgeBase::new("user-1", "Docs");
        store.create_knowledge_base(&kb).await.unwrap();

        for (title, content) in [
            ("Billing", "How invoices and billing cycles work"),
            ("Agents", "Agents automate workflows against datasets"),
        ] {
            let doc = KbDocument {
                id: uuid::Uuid::new_v4().to_string(),
                title: title.to_string(),
                content: content.to_string(),
                metadata: None,
                created_at: chrono::Utc::now().timestamp(),
            };
            store.add_document(&kb.id, doc).await.unwrap();
        }

        let hits = store.search(&kb.id, "billing invoices", 10, 0.5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Billing");
        assert!((hits[0].score - 1.0).abs() < 1e-9);

        let none = store.search(&kb.id, "unrelated topic", 10, 0.5).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_missing_kb_is_not_found() {
        let store = test_store();
        let err = store.search("missing", "q", 10, 0.5).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_overview_counts() {
        let store = test_store();

        store
            .create_dataset(&Dataset::new("user-1", "D1", DataType::Text))
            .await
            .unwrap();
        let kb = KnowledgeBase::new("user-1", "K1");
        store.create_knowledge_base(&kb).await.unwrap();

        let (datasets, kbs, documents) = store.overview("user-1").await.unwrap();
        assert_eq!((datasets, kbs, documents), (1, 1, 0));
    }
}
