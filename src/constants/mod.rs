pub mod defaults;
pub mod embeds;
