pub mod duration;
pub mod permissions;
