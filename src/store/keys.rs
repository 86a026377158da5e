// Numeric ids are zero-padded so lexicographic key order equals numeric order.

pub const SCHEMA_VERSION_KEY: &str = "_meta:version";
pub const RATINGS_REVISION_KEY: &str = "ratings:revision";

pub fn sequence_key(sequence: &str) -> String {
    format!("seq:{}", sequence)
}

pub fn user_key(user_id: u64) -> String {
    format!("{:020}", user_id)
}

pub fn course_key(course_id: u64) -> String {
    format!("{:020}", course_id)
}

pub fn course_title_key(title: &str) -> String {
    title.to_string()
}

pub fn rating_key(user_id: u64, course_id: u64) -> String {
    format!("{:020}:{:020}", user_id, course_id)
}

pub fn rating_prefix(user_id: u64) -> String {
    format!("{:020}:", user_id)
}

pub fn course_rating_key(course_id: u64, user_id: u64) -> String {
    format!("{:020}:{:020}", course_id, user_id)
}

pub fn course_rating_prefix(course_id: u64) -> String {
    format!("{:020}:", course_id)
}

/// Splits a `{a:020}:{b:020}` pair key back into its two ids.
pub fn parse_pair_key(key: &[u8]) -> Option<(u64, u64)> {
    let text = std::str::from_utf8(key).ok()?;
    let (a, b) = text.split_once(':')?;
    Some((a.parse().ok()?, b.parse().ok()?))
}

pub fn decode_u64(bytes: &[u8]) -> Option<u64> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_keys_order_numerically() {
        assert!(user_key(9) < user_key(10));
        assert!(rating_key(2, 100) < rating_key(10, 1));
    }

    #[test]
    fn rating_prefix_matches_only_that_user() {
        let prefix = rating_prefix(1);
        assert!(rating_key(1, 42).starts_with(&prefix));
        assert!(!rating_key(11, 42).starts_with(&prefix));
    }

    #[test]
    fn pair_key_round_trips() {
        let key = course_rating_key(7, 3);
        assert_eq!(parse_pair_key(key.as_bytes()), Some((7, 3)));
        assert_eq!(parse_pair_key(b"garbage"), None);
    }

    #[test]
    fn decode_rejects_wrong_width() {
        assert_eq!(decode_u64(&5u64.to_be_bytes()), Some(5));
        assert_eq!(decode_u64(&[1, 2, 3]), None);
    }
}
