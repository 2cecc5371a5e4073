pub mod claims;
pub mod identity;
pub mod middleware;
pub mod rate_limit;
