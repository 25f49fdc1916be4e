mod moderation;
mod settings;

pub use moderation::ModerationConfig;
pub use settings::Settings;
