//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use tourcore::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "список экскурсий")]
    Start,
    #[command(description = "список экскурсий")]
    Excursions,
    #[command(description = "прервать редактирование")]
    Cancel,
    #[command(description = "помощь")]
    Help,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, HTTP client setup)
pub fn create_bot() -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;

    let bot = if let Some(bot_api_url) = config::bot_api::get_url() {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        Bot::from_env_with_client(client).set_api_url(url)
    } else {
        Bot::from_env_with_client(client)
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("excursions", "список экскурсий"),
        BotCommand::new("cancel", "прервать редактирование"),
        BotCommand::new("help", "помощь"),
    ])
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_and_without_mention() {
        assert_eq!(Command::parse("/cancel", "tour_bot").ok(), Some(Command::Cancel));
        assert_eq!(Command::parse("/excursions@tour_bot", "tour_bot").ok(), Some(Command::Excursions));
        assert!(Command::parse("/publish", "tour_bot").is_err());
    }
}
