use course_recommender::store::operations::courses::Course;
use course_recommender::store::operations::users::{NewUser, User};
use course_recommender::store::Store;

pub fn seed_user(store: &Store, name: &str) -> User {
    store
        .create_user(NewUser {
            name: name.to_string(),
            interests: vec!["data".to_string()],
            skills: vec!["python".to_string()],
            time_per_week: 5,
        })
        .expect("create seed user")
}

pub fn seed_users(store: &Store, count: usize) -> Vec<User> {
    (0..count).map(|i| seed_user(store, &format!("learner-{i}"))).collect()
}

pub fn seed_courses(store: &Store, count: usize, category: &str) -> Vec<Course> {
    (0..count)
        .map(|i| {
            store
                .insert_course(&format!("{category} {i}"), "seeded", category)
                .expect("insert seed course")
        })
        .collect()
}

/// Every user rates every course; scores cycle through 1..=5 so the
/// matrix has both taste signal and residual variance.
pub fn seed_dense_ratings(store: &Store, users: &[User], courses: &[Course]) -> usize {
    let mut n = 0;
    for (i, user) in users.iter().enumerate() {
        for (j, course) in courses.iter().enumerate() {
            let score = 1 + ((i * 2 + j * 3) % 5) as u8;
            store
                .upsert_rating(user.id, course.id, score)
                .expect("seed rating");
            n += 1;
        }
    }
    n
}
