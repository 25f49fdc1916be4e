pub mod filter;
pub mod policy;
pub mod rate_tracker;
