use std::sync::Arc;

use teloxide::prelude::*;
use tokio::sync::Mutex;

use crate::commands::CommandContext;
use crate::engine::MessageEngine;

type HandlerResult = anyhow::Result<()>;
type SharedEngine = Arc<Mutex<MessageEngine>>;

pub struct TelegramInteractionInterface;

impl TelegramInteractionInterface {
    pub async fn start(bot: Bot, engine: MessageEngine) {
        log::info!("Starting Telegram interaction interface");

        let schema = Update::filter_message().branch(dptree::endpoint(handle_message));

        Dispatcher::builder(bot, schema)
            .dependencies(dptree::deps![Arc::new(Mutex::new(engine))])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await
    }
}

async fn handle_message(bot: Bot, engine: SharedEngine, msg: Message) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let ctx = CommandContext {
        user_id: user.id.0,
        user_name: user.full_name(),
        chat_id: msg.chat.id.0,
    };

    // One message is fully handled before the next; the lock also guards the
    // preference store inside the engine.
    let replies = engine.lock().await.handle_message(&ctx, text)?;
    for reply in replies {
        bot.send_message(msg.chat.id, reply).await?;
    }

    Ok(())
}
