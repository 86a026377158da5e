use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::model::SvdModel;
use crate::constants::DEFAULT_CATEGORY_SCORE;
use crate::store::operations::courses::Course;
use crate::store::operations::ratings::Rating;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredCourse {
    pub course_id: u64,
    pub predicted_rating: f64,
    pub title: String,
    pub description: String,
    pub category: String,
}

impl ScoredCourse {
    fn new(course: &Course, score: f64) -> Self {
        Self {
            course_id: course.id,
            predicted_rating: score,
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
        }
    }
}

/// Courses the user has not rated, in catalog order.
pub fn unrated<'a>(catalog: &'a [Course], rated: &HashSet<u64>) -> Vec<&'a Course> {
    catalog.iter().filter(|c| !rated.contains(&c.id)).collect()
}

pub fn rank_with_model(model: &SvdModel, user_id: u64, candidates: &[&Course]) -> Vec<ScoredCourse> {
    candidates
        .iter()
        .map(|course| ScoredCourse::new(course, model.predict(user_id, course.id)))
        .collect()
}

/// Scores each candidate with the user's mean rating in its category.
/// Categories the user never rated score [`DEFAULT_CATEGORY_SCORE`].
pub fn rank_by_category(
    user_ratings: &[Rating],
    catalog: &[Course],
    candidates: &[&Course],
) -> Vec<ScoredCourse> {
    let category_of: HashMap<u64, &str> = catalog
        .iter()
        .map(|c| (c.id, c.category.as_str()))
        .collect();

    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for rating in user_ratings {
        if let Some(category) = category_of.get(&rating.course_id) {
            let entry = totals.entry(category).or_insert((0.0, 0));
            entry.0 += f64::from(rating.score);
            entry.1 += 1;
        }
    }

    candidates
        .iter()
        .map(|course| {
            let score = match totals.get(course.category.as_str()) {
                Some((sum, n)) if *n > 0 => sum / *n as f64,
                _ => DEFAULT_CATEGORY_SCORE,
            };
            ScoredCourse::new(course, score)
        })
        .collect()
}

/// Highest scores first. Ties keep their input order.
pub fn top_n(mut scored: Vec<ScoredCourse>, n: usize) -> Vec<ScoredCourse> {
    scored.sort_by(|a, b| b.predicted_rating.total_cmp(&a.predicted_rating));
    scored.truncate(n);
    scored
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn course(id: u64, category: &str) -> Course {
        Course {
            id,
            title: format!("Course {id}"),
            description: String::new(),
            category: category.to_string(),
        }
    }

    fn rating(course_id: u64, score: u8) -> Rating {
        Rating {
            user_id: 1,
            course_id,
            score,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unrated_filters_rated_ids() {
        let catalog = vec![course(1, "A"), course(2, "A"), course(3, "B")];
        let rated: HashSet<u64> = [2].into_iter().collect();
        let ids: Vec<u64> = unrated(&catalog, &rated).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn category_fallback_uses_category_mean_or_default() {
        let catalog = vec![
            course(1, "Data"),
            course(2, "Data"),
            course(3, "Data"),
            course(4, "Web"),
        ];
        let ratings = vec![rating(1, 5), rating(2, 2)];
        let rated: HashSet<u64> = [1, 2].into_iter().collect();
        let candidates = unrated(&catalog, &rated);

        let scored = rank_by_category(&ratings, &catalog, &candidates);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].course_id, 3);
        assert!((scored[0].predicted_rating - 3.5).abs() < 1e-12);
        assert_eq!(scored[1].course_id, 4);
        assert_eq!(scored[1].predicted_rating, DEFAULT_CATEGORY_SCORE);
    }

    #[test]
    fn top_n_sorts_descending_and_is_stable() {
        let catalog = vec![course(1, "A"), course(2, "A"), course(3, "A"), course(4, "A")];
        let scores = [3.0, 4.5, 3.0, 1.0];
        let scored: Vec<ScoredCourse> = catalog
            .iter()
            .zip(scores)
            .map(|(c, s)| ScoredCourse::new(c, s))
            .collect();

        let ids: Vec<u64> = top_n(scored, 3).iter().map(|s| s.course_id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn serializes_with_client_field_names() {
        let value = serde_json::to_value(ScoredCourse::new(&course(7, "Web"), 4.25)).unwrap();
        assert_eq!(value["course_id"], 7);
        assert_eq!(value["predicted_rating"], 4.25);
        assert_eq!(value["category"], "Web");
    }
}
