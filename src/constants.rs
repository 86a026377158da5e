/// Lowest accepted rating score
pub const MIN_RATING: u8 = 1;

/// Highest accepted rating score
pub const MAX_RATING: u8 = 5;

/// Ratings at or above this count as "liked" for explanations and Precision@k
pub const RELEVANT_RATING: f64 = 4.0;

/// Score assumed for a category the user has never rated
pub const DEFAULT_CATEGORY_SCORE: f64 = 3.0;

/// Minimum ratings before a model is trained at all
pub const MIN_TRAIN_RATINGS: usize = 3;

/// Minimum non-zero residual cells before latent factors are learned
pub const MIN_NONZERO_RESIDUALS: usize = 5;

/// Minimum ratings before evaluation metrics are reported
pub const MIN_EVAL_RATINGS: usize = 10;

/// The seed catalog is (re)applied while fewer courses than this exist
pub const MIN_CATALOG_SIZE: u64 = 50;

/// Candidate high raters looked up per explanation
pub const EXPLANATION_RATER_LIMIT: usize = 5;

/// High raters actually compared against the requesting user
pub const EXPLANATION_RATER_SAMPLE: usize = 3;

/// Same-category courses counted for a "similar items" explanation
pub const EXPLANATION_SIMILAR_COURSES: usize = 3;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_CHARS: usize = 50;

/// Hours in a week; upper bound for `time_per_week`
pub const MAX_TIME_PER_WEEK: u32 = 168;
