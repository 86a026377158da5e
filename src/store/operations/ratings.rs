use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::ConflictableTransactionError;
use sled::Transactional;

use crate::constants::{MAX_RATING, MIN_RATING};
use crate::store::keys;
use crate::store::{map_transaction_error, Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: u64,
    pub course_id: u64,
    pub score: u8,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingWrite {
    Created,
    Updated,
}

impl Store {
    /// Creates or replaces the rating of `user_id` for `course_id`.
    ///
    /// The user lookup and both rating trees share one transaction, so a rating
    /// can never land after its owner has been deleted. The ratings revision is
    /// bumped afterwards.
    pub fn upsert_rating(
        &self,
        user_id: u64,
        course_id: u64,
        score: u8,
    ) -> Result<RatingWrite, StoreError> {
        if !(MIN_RATING..=MAX_RATING).contains(&score) {
            return Err(StoreError::Validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {score}"
            )));
        }

        let rating = Rating {
            user_id,
            course_id,
            score,
            updated_at: Utc::now(),
        };
        let bytes = Self::serialize(&rating)?;
        let user_key = keys::user_key(user_id);
        let primary_key = keys::rating_key(user_id, course_id);
        let index_key = keys::course_rating_key(course_id, user_id);

        let outcome = (&self.users, &self.ratings, &self.ratings_by_course)
            .transaction(|(users, ratings, by_course)| {
                if users.get(user_key.as_bytes())?.is_none() {
                    return Ok(None);
                }
                let previous = ratings.insert(primary_key.as_bytes(), bytes.as_slice())?;
                by_course.insert(index_key.as_bytes(), bytes.as_slice())?;
                Ok::<_, ConflictableTransactionError<()>>(Some(previous.is_some()))
            })
            .map_err(|e| map_transaction_error(e, "rating", &primary_key))?;

        let Some(replaced) = outcome else {
            return Err(StoreError::not_found("user", user_id));
        };

        self.bump_ratings_revision()?;

        Ok(if replaced {
            RatingWrite::Updated
        } else {
            RatingWrite::Created
        })
    }

    /// Returns `false` when there was nothing to delete.
    pub fn delete_rating(&self, user_id: u64, course_id: u64) -> Result<bool, StoreError> {
        let primary_key = keys::rating_key(user_id, course_id);
        let index_key = keys::course_rating_key(course_id, user_id);

        let removed = (&self.ratings, &self.ratings_by_course)
            .transaction(|(ratings, by_course)| {
                let removed = ratings.remove(primary_key.as_bytes())?;
                by_course.remove(index_key.as_bytes())?;
                Ok::<_, ConflictableTransactionError<()>>(removed.is_some())
            })
            .map_err(|e| map_transaction_error(e, "rating", &primary_key))?;

        if removed {
            self.bump_ratings_revision()?;
        }
        Ok(removed)
    }

    pub fn get_rating(&self, user_id: u64, course_id: u64) -> Result<Option<Rating>, StoreError> {
        let key = keys::rating_key(user_id, course_id);
        match self.ratings.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Ratings of one user, ascending course id.
    pub fn ratings_for_user(&self, user_id: u64) -> Result<Vec<Rating>, StoreError> {
        let prefix = keys::rating_prefix(user_id);
        let mut out = Vec::new();
        for item in self.ratings.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            out.push(Self::deserialize(&value)?);
        }
        Ok(out)
    }

    /// Ratings of one course, ascending user id.
    pub fn ratings_for_course(&self, course_id: u64) -> Result<Vec<Rating>, StoreError> {
        let prefix = keys::course_rating_prefix(course_id);
        let mut out = Vec::new();
        for item in self.ratings_by_course.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            out.push(Self::deserialize(&value)?);
        }
        Ok(out)
    }

    /// Every rating, ordered by user then course.
    pub fn all_ratings(&self) -> Result<Vec<Rating>, StoreError> {
        let mut out = Vec::with_capacity(self.ratings.len());
        for item in self.ratings.iter() {
            let (_, value) = item?;
            out.push(Self::deserialize(&value)?);
        }
        Ok(out)
    }

    pub fn count_ratings(&self) -> usize {
        self.ratings.len()
    }
}
