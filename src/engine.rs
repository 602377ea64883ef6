use chrono::Utc;

use crate::broadcast;
use crate::commands::{CommandContext, CommandDispatcher};
use crate::detect::{self, MeridiemConversion};
use crate::store::PreferenceStore;
use crate::timezone;

/// Per-message pipeline: the time-broadcast check runs first, then every
/// matching command handler. One message is fully processed before the next.
pub struct MessageEngine {
    store: PreferenceStore,
    dispatcher: CommandDispatcher,
    conversion: MeridiemConversion,
}

impl MessageEngine {
    pub fn new(store: PreferenceStore) -> Self {
        Self {
            store,
            dispatcher: CommandDispatcher::new(),
            conversion: MeridiemConversion::default(),
        }
    }

    pub fn with_conversion(store: PreferenceStore, conversion: MeridiemConversion) -> Self {
        Self {
            store,
            dispatcher: CommandDispatcher::new(),
            conversion,
        }
    }

    /// Produces the replies for one inbound message, in send order. An empty
    /// vec means nothing gets sent.
    pub fn handle_message(
        &mut self,
        ctx: &CommandContext,
        text: &str,
    ) -> anyhow::Result<Vec<String>> {
        let mut replies = Vec::new();

        if let Some(reply) = self.time_broadcast_reply(ctx, text) {
            replies.push(reply);
        }

        replies.extend(self.dispatcher.dispatch(text, ctx, &mut self.store)?);
        Ok(replies)
    }

    /// The automatic broadcast only fires for senders with a saved timezone
    /// in channels that have a roster configured.
    fn time_broadcast_reply(&self, ctx: &CommandContext, text: &str) -> Option<String> {
        let saved = self.store.user_timezone(ctx.user_id)?;
        let roster = self.store.channel_roster(ctx.chat_id)?;
        let time = detect::detect_with(text, self.conversion)?;

        let Some(speaker) = timezone::resolve(saved) else {
            log::warn!("User {} has an unresolvable saved timezone {saved:?}", ctx.user_id);
            return None;
        };

        let reply = broadcast::compose(time, speaker, roster, Utc::now());
        if reply.is_empty() { None } else { Some(reply) }
    }
}
