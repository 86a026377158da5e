use std::collections::HashSet;

use serde::Serialize;

use crate::constants::{
    EXPLANATION_RATER_LIMIT, EXPLANATION_RATER_SAMPLE, EXPLANATION_SIMILAR_COURSES,
    RELEVANT_RATING,
};
use crate::store::operations::courses::Course;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationKind {
    SimilarUsers,
    SimilarItems,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    #[serde(rename = "type")]
    pub kind: ExplanationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Explanation {
    fn similar_users(count: usize) -> Self {
        Self {
            kind: ExplanationKind::SimilarUsers,
            message: "Users with similar preferences rated this course highly".to_string(),
            count: Some(count),
        }
    }

    fn similar_items(category: &str, count: usize) -> Self {
        Self {
            kind: ExplanationKind::SimilarItems,
            message: format!("Similar courses in {category} category"),
            count: Some(count),
        }
    }

    fn general() -> Self {
        Self {
            kind: ExplanationKind::General,
            message: "Recommended based on your profile".to_string(),
            count: None,
        }
    }
}

/// Why `course` is shown to a user who has rated `user_rated`.
///
/// Checks, in order: raters who liked the course and overlap with the user,
/// other courses of the same category, then a generic message.
pub fn explain(
    store: &Store,
    course: &Course,
    user_rated: &HashSet<u64>,
) -> Result<Explanation, StoreError> {
    let fans: Vec<u64> = store
        .ratings_for_course(course.id)?
        .into_iter()
        .filter(|r| f64::from(r.score) >= RELEVANT_RATING)
        .take(EXPLANATION_RATER_LIMIT)
        .map(|r| r.user_id)
        .collect();

    let mut overlapping = 0;
    for fan in fans.iter().take(EXPLANATION_RATER_SAMPLE) {
        let shares_a_course = store
            .ratings_for_user(*fan)?
            .iter()
            .any(|r| user_rated.contains(&r.course_id));
        if shares_a_course {
            overlapping += 1;
        }
    }
    if overlapping > 0 {
        return Ok(Explanation::similar_users(overlapping));
    }

    let siblings = store.courses_in_category(&course.category, course.id, EXPLANATION_SIMILAR_COURSES)?;
    if !siblings.is_empty() {
        return Ok(Explanation::similar_items(&course.category, siblings.len()));
    }

    Ok(Explanation::general())
}
