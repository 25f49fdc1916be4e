pub mod executor;
pub mod modlog;
pub mod mute_scheduler;
