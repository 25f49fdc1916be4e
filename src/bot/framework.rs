use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, GuildId};
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::commands;
use crate::config::{ModerationConfig, Settings};
use crate::db::store::{ModerationStore, PgModerationStore};
use crate::handlers::event_handler::event_handler;
use crate::services::automod::filter::ContentFilter;
use crate::services::automod::rate_tracker;
use crate::services::moderation::mute_scheduler;
use crate::services::platform::{DiscordPlatform, Platform};

pub async fn run(settings: Settings, config: ModerationConfig, pool: PgPool) -> Result<(), Error> {
    let config = Arc::new(config);
    let filter = ContentFilter::new(&config)?;
    let store: Arc<dyn ModerationStore> = Arc::new(PgModerationStore::new(pool));
    let token = settings.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::moderation::kick::kick(),
                commands::moderation::ban::ban(),
                commands::moderation::mute::mute(),
                commands::moderation::mute::unmute(),
                commands::moderation::warn::warn(),
                commands::moderation::warn::warnings(),
                commands::moderation::purge::purge(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None, // Slash commands only
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let _ = ctx.say(format!("Error: {}", error)).await;
                        }
                        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
                            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
                        }
                        poise::FrameworkError::UnknownCommand { .. } => {
                            // Bot only registers slash commands; ignore
                        }
                        err => {
                            error!("Framework error: {:?}", err);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);

                let platform: Arc<dyn Platform> =
                    Arc::new(DiscordPlatform::new(ctx.http.clone()));
                let data = Arc::new(Data::new(settings, config, store, platform, filter));
                data.set_bot_user_id(ready.user.id.get());

                // Re-arm expiry tasks for mutes that outlived the last run
                match mute_scheduler::restore_pending(data.store.as_ref(), &data.platform).await {
                    Ok(restored) if restored > 0 => {
                        info!("Restored {} mute expiries from the store", restored);
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Failed to restore pending mutes: {:?}", e),
                }

                rate_tracker::spawn_window_reaper(data.clone());

                match data.settings.guild_id {
                    Some(guild_id) => {
                        let guild_id = GuildId::new(guild_id);
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            guild_id,
                        )
                        .await
                        .map_err(Error::Serenity)?;
                        info!(
                            "Registered {} commands in guild {}",
                            framework.options().commands.len(),
                            guild_id
                        );
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await
                            .map_err(Error::Serenity)?;
                        info!(
                            "Registered {} commands globally (may take up to an hour to appear)",
                            framework.options().commands.len()
                        );
                    }
                }

                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, stopping shards");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Starting Discord client...");
    client.start().await.map_err(Error::Serenity)
}
