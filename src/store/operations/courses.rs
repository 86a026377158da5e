use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
}

impl Store {
    /// Inserts a course under a fresh id. Titles are unique; a duplicate is a `Conflict`.
    pub fn insert_course(
        &self,
        title: &str,
        description: &str,
        category: &str,
    ) -> Result<Course, StoreError> {
        let title_key = keys::course_title_key(title);
        if self.course_titles.contains_key(title_key.as_bytes())? {
            return Err(StoreError::Conflict {
                entity: "course_title".to_string(),
                key: title.to_string(),
            });
        }

        let course = Course {
            id: self.next_id("courses")?,
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
        };

        // Claim the title first so two concurrent inserts cannot both win.
        let claimed = self.course_titles.compare_and_swap(
            title_key.as_bytes(),
            None::<&[u8]>,
            Some(course.id.to_be_bytes().to_vec()),
        )?;
        if claimed.is_err() {
            return Err(StoreError::Conflict {
                entity: "course_title".to_string(),
                key: title.to_string(),
            });
        }

        let key = keys::course_key(course.id);
        if let Err(e) = self.courses.insert(key.as_bytes(), Self::serialize(&course)?) {
            if let Err(rollback) = self.course_titles.remove(title_key.as_bytes()) {
                tracing::error!(
                    error = %rollback,
                    course_id = course.id,
                    title,
                    "Failed to release course title after insert failure"
                );
            }
            return Err(StoreError::Sled(e));
        }
        Ok(course)
    }

    pub fn get_course(&self, course_id: u64) -> Result<Option<Course>, StoreError> {
        let key = keys::course_key(course_id);
        match self.courses.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn course_exists(&self, course_id: u64) -> Result<bool, StoreError> {
        Ok(self.courses.contains_key(keys::course_key(course_id).as_bytes())?)
    }

    pub fn has_course_title(&self, title: &str) -> Result<bool, StoreError> {
        Ok(self
            .course_titles
            .contains_key(keys::course_title_key(title).as_bytes())?)
    }

    /// All courses in ascending id order.
    pub fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let mut courses = Vec::with_capacity(self.courses.len());
        for item in self.courses.iter() {
            let (_, value) = item?;
            courses.push(Self::deserialize::<Course>(&value)?);
        }
        Ok(courses)
    }

    pub fn count_courses(&self) -> u64 {
        self.courses.len() as u64
    }

    /// Up to `limit` courses of `category` other than `exclude`, lowest ids first.
    pub fn courses_in_category(
        &self,
        category: &str,
        exclude: u64,
        limit: usize,
    ) -> Result<Vec<Course>, StoreError> {
        let mut out = Vec::new();
        for item in self.courses.iter() {
            if out.len() >= limit {
                break;
            }
            let (_, value) = item?;
            let course: Course = Self::deserialize(&value)?;
            if course.id != exclude && course.category == category {
                out.push(course);
            }
        }
        Ok(out)
    }
}
