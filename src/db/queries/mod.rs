pub mod actions;
pub mod warnings;
