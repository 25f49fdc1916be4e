use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub database_url: String,
    /// Register commands in a single guild instead of globally (faster for dev)
    pub guild_id: Option<u64>,
    /// Path to the moderation config JSON file (defaults apply if unset)
    pub moderation_config_path: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN environment variable not set")?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set")?;

        let guild_id = env::var("GUILD_ID")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());

        let moderation_config_path = env::var("MODERATION_CONFIG")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            discord_token,
            database_url,
            guild_id,
            moderation_config_path,
        })
    }
}
