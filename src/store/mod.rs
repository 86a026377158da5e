pub mod catalog;
pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::TransactionError;
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub users: sled::Tree,
    pub courses: sled::Tree,
    pub course_titles: sled::Tree,
    pub ratings: sled::Tree,
    pub ratings_by_course: sled::Tree,
    pub meta: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("conflict: entity={entity}, key={key}")]
    Conflict { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("corrupt record in {tree}: {message}")]
    Corrupt { tree: String, message: String },
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl StoreError {
    pub(crate) fn not_found(entity: &str, key: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let users = db.open_tree(trees::USERS)?;
        let courses = db.open_tree(trees::COURSES)?;
        let course_titles = db.open_tree(trees::COURSE_TITLES)?;
        let ratings = db.open_tree(trees::RATINGS)?;
        let ratings_by_course = db.open_tree(trees::RATINGS_BY_COURSE)?;
        let meta = db.open_tree(trees::META)?;

        Ok(Self {
            db,
            users,
            courses,
            course_titles,
            ratings,
            ratings_by_course,
            meta,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn raw_db(&self) -> &Db {
        &self.db
    }

    /// Allocates the next id of a sequence. Ids start at 1 and never repeat.
    pub fn next_id(&self, sequence: &str) -> Result<u64, StoreError> {
        let key = keys::sequence_key(sequence);
        let updated = self.meta.update_and_fetch(key.as_bytes(), |old| {
            let current = old.and_then(keys::decode_u64).unwrap_or(0);
            Some(current.saturating_add(1).to_be_bytes().to_vec())
        })?;
        updated
            .as_deref()
            .and_then(keys::decode_u64)
            .ok_or_else(|| StoreError::Corrupt {
                tree: trees::META.to_string(),
                message: format!("sequence {sequence} is not a u64"),
            })
    }

    /// Number of rating mutations applied so far.
    pub fn ratings_revision(&self) -> Result<u64, StoreError> {
        Ok(self
            .meta
            .get(keys::RATINGS_REVISION_KEY.as_bytes())?
            .as_deref()
            .and_then(keys::decode_u64)
            .unwrap_or(0))
    }

    pub(crate) fn bump_ratings_revision(&self) -> Result<u64, StoreError> {
        let updated = self
            .meta
            .update_and_fetch(keys::RATINGS_REVISION_KEY.as_bytes(), |old| {
                let current = old.and_then(keys::decode_u64).unwrap_or(0);
                Some(current.saturating_add(1).to_be_bytes().to_vec())
            })?;
        Ok(updated.as_deref().and_then(keys::decode_u64).unwrap_or(0))
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Maps a multi-tree transaction failure; aborts are reported as a conflict on `entity`.
pub(crate) fn map_transaction_error(
    err: TransactionError<()>,
    entity: &str,
    key: impl ToString,
) -> StoreError {
    match err {
        TransactionError::Abort(()) => StoreError::Conflict {
            entity: entity.to_string(),
            key: key.to_string(),
        },
        TransactionError::Storage(e) => StoreError::Sled(e),
    }
}
