pub mod rate_limit;
pub mod request_id;
