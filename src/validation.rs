//! Input checks shared by the profile and rating routes.

use crate::constants::{
    MAX_NAME_CHARS, MAX_RATING, MAX_TAGS, MAX_TAG_CHARS, MAX_TIME_PER_WEEK, MIN_RATING,
};

/// Name must be non-empty after trimming and at most 100 characters.
pub fn validate_name(name: &str) -> Result<String, &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name is required");
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err("Name must be at most 100 characters");
    }
    Ok(trimmed.to_string())
}

/// Trims each tag, drops empties and duplicates (first occurrence wins).
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, &'static str> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.chars().count() > MAX_TAG_CHARS {
            return Err("Each tag must be at most 50 characters");
        }
        if !out.iter().any(|t| t == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    if out.len() > MAX_TAGS {
        return Err("At most 20 tags are allowed");
    }
    Ok(out)
}

pub fn validate_time_per_week(hours: i64) -> Result<u32, &'static str> {
    if hours < 0 || hours > i64::from(MAX_TIME_PER_WEEK) {
        return Err("time_per_week must be between 0 and 168");
    }
    Ok(hours as u32)
}

/// Accepts integral JSON numbers in 1..=5 (`4` and `4.0` both pass).
pub fn validate_rating(raw: f64) -> Result<u8, &'static str> {
    if !raw.is_finite() || raw.fract() != 0.0 {
        return Err("Rating must be a whole number between 1 and 5");
    }
    if raw < f64::from(MIN_RATING) || raw > f64::from(MAX_RATING) {
        return Err("Rating must be a whole number between 1 and 5");
    }
    Ok(raw as u8)
}
