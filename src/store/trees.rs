pub const USERS: &str = "users";
pub const COURSES: &str = "courses";
pub const COURSE_TITLES: &str = "course_titles";
pub const RATINGS: &str = "ratings";
pub const META: &str = "meta";

// Secondary index trees
pub const RATINGS_BY_COURSE: &str = "ratings_by_course";
