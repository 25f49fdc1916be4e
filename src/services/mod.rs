pub mod automod;
pub mod moderation;
pub mod platform;
