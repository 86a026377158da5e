use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::ConflictableTransactionError;
use sled::Transactional;

use crate::store::keys;
use crate::store::{map_transaction_error, Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub time_per_week: u32,
    pub created_at: DateTime<Utc>,
}

/// Profile fields as submitted by the setup form, already validated.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub time_per_week: u32,
}

impl Store {
    pub fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = User {
            id: self.next_id("users")?,
            name: new_user.name,
            interests: new_user.interests,
            skills: new_user.skills,
            time_per_week: new_user.time_per_week,
            created_at: Utc::now(),
        };

        let key = keys::user_key(user.id);
        self.users.insert(key.as_bytes(), Self::serialize(&user)?)?;
        Ok(user)
    }

    pub fn get_user(&self, user_id: u64) -> Result<Option<User>, StoreError> {
        let key = keys::user_key(user_id);
        match self.users.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn user_exists(&self, user_id: u64) -> Result<bool, StoreError> {
        Ok(self.users.contains_key(keys::user_key(user_id).as_bytes())?)
    }

    pub fn count_users(&self) -> usize {
        self.users.len()
    }

    fn rated_course_ids(&self, user_id: u64) -> Result<Vec<u64>, StoreError> {
        let mut course_ids = Vec::new();
        for item in self.ratings.scan_prefix(keys::rating_prefix(user_id).as_bytes()) {
            let (key, _) = item?;
            if let Some((_, course_id)) = keys::parse_pair_key(&key) {
                course_ids.push(course_id);
            }
        }
        Ok(course_ids)
    }

    /// Removes the profile together with every rating it owns.
    /// Returns how many ratings were removed.
    pub fn delete_user(&self, user_id: u64) -> Result<usize, StoreError> {
        let user_key = keys::user_key(user_id);
        if !self.users.contains_key(user_key.as_bytes())? {
            return Err(StoreError::not_found("user", user_id));
        }

        let course_ids = self.rated_course_ids(user_id)?;

        (&self.users, &self.ratings, &self.ratings_by_course)
            .transaction(|(users, ratings, by_course)| {
                users.remove(user_key.as_bytes())?;
                for course_id in &course_ids {
                    ratings.remove(keys::rating_key(user_id, *course_id).as_bytes())?;
                    by_course.remove(keys::course_rating_key(*course_id, user_id).as_bytes())?;
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e| map_transaction_error(e, "user", user_id))?;

        // Ratings committed between the scan and the transaction are swept here;
        // later writes fail the user lookup in `upsert_rating`.
        let mut removed = course_ids.len();
        for course_id in self.rated_course_ids(user_id)? {
            (&self.ratings, &self.ratings_by_course)
                .transaction(|(ratings, by_course)| {
                    ratings.remove(keys::rating_key(user_id, course_id).as_bytes())?;
                    by_course.remove(keys::course_rating_key(course_id, user_id).as_bytes())?;
                    Ok::<(), ConflictableTransactionError<()>>(())
                })
                .map_err(|e| map_transaction_error(e, "rating", user_id))?;
            removed += 1;
        }

        if removed > 0 {
            self.bump_ratings_revision()?;
        }

        tracing::info!(user_id, removed_ratings = removed, "User deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn sample(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            interests: vec!["Data Science".to_string()],
            skills: vec!["Python".to_string()],
            time_per_week: 6,
        }
    }

    #[test]
    fn create_and_get_user() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("users-db").to_str().unwrap()).unwrap();

        let created = store.create_user(sample("Ada")).unwrap();
        assert_eq!(created.id, 1);

        let got = store.get_user(created.id).unwrap().unwrap();
        assert_eq!(got, created);
        assert_eq!(got.interests, vec!["Data Science".to_string()]);
    }

    #[test]
    fn ids_are_sequential() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("users-db2").to_str().unwrap()).unwrap();

        let a = store.create_user(sample("A")).unwrap();
        let b = store.create_user(sample("B")).unwrap();
        assert_eq!(b.id, a.id + 1);
        assert_eq!(store.count_users(), 2);
    }

    #[test]
    fn delete_missing_user_is_not_found() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("users-db3").to_str().unwrap()).unwrap();

        let err = store.delete_user(99).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
