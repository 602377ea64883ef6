mod appsettings;
mod broadcast;
mod commands;
mod detect;
mod engine;
mod store;
mod telegram_bot;
mod timezone;

use teloxide::Bot;

use crate::engine::MessageEngine;
use crate::store::PreferenceStore;
use crate::telegram_bot::TelegramInteractionInterface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::get();
    let store = PreferenceStore::load(settings.storage.data_file.clone())?;
    let engine = MessageEngine::new(store);

    let bot = Bot::new(settings.telegram.token.clone());
    TelegramInteractionInterface::start(bot, engine).await;

    Ok(())
}
