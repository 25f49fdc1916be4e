pub mod ban;
pub mod kick;
pub mod mute;
pub mod purge;
pub mod warn;
