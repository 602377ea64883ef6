use crate::store::PreferenceStore;
use crate::timezone;

/// Who sent the message and where, as the handlers need it.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub user_id: u64,
    pub user_name: String,
    pub chat_id: i64,
}

type CommandHandler = fn(&str, &CommandContext, &mut PreferenceStore) -> anyhow::Result<String>;

/// Fixed keyword → handler table.
///
/// Dispatch deliberately walks the whole table and fires every entry whose
/// keyword prefixes the message, so overlapping keywords each get their turn.
/// Do not replace this with a first-match lookup.
pub struct CommandDispatcher {
    commands: Vec<(&'static str, CommandHandler)>,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self {
            commands: vec![
                ("tzsearch", search_timezones as CommandHandler),
                ("tzset", set_local_timezone),
                ("tzdelete", remove_local_timezone),
                ("tzchadd", add_timezone_to_channel),
                ("tzchdelete", remove_timezone_from_channel),
                ("tzchlist", list_channel_timezones),
                ("tzchtoggle", toggle_channel),
                ("tzcommands", list_commands),
            ],
        }
    }

    /// Runs every matching handler and collects the non-empty replies.
    pub fn dispatch(
        &self,
        text: &str,
        ctx: &CommandContext,
        store: &mut PreferenceStore,
    ) -> anyhow::Result<Vec<String>> {
        let mut replies = Vec::new();
        for (keyword, handler) in &self.commands {
            if let Some(rest) = text.strip_prefix(keyword) {
                let args = rest.trim();
                log::debug!("Dispatching {keyword} for user {}", ctx.user_id);
                let reply = handler(args, ctx, store)?;
                if !reply.is_empty() {
                    replies.push(reply);
                }
            }
        }
        Ok(replies)
    }
}

fn search_timezones(
    args: &str,
    _ctx: &CommandContext,
    _store: &mut PreferenceStore,
) -> anyhow::Result<String> {
    Ok(timezone::format_search_results(&timezone::search(args)))
}

fn set_local_timezone(
    args: &str,
    ctx: &CommandContext,
    store: &mut PreferenceStore,
) -> anyhow::Result<String> {
    match timezone::resolve(args) {
        Some(tz) => {
            store.set_user_timezone(ctx.user_id, tz.name().to_string());
            store.flush()?;
            log::info!("User {} set timezone to {}", ctx.user_id, tz.name());
            Ok(format!(
                "**{}**: set your timezone to *{}*",
                ctx.user_name, tz
            ))
        }
        None => Ok(format!(
            "**{}**: unable to set your timezone to *{}*. Use *tzsearch* to find a correct timezone.",
            ctx.user_name, args
        )),
    }
}

fn remove_local_timezone(
    _args: &str,
    ctx: &CommandContext,
    store: &mut PreferenceStore,
) -> anyhow::Result<String> {
    if store.remove_user_timezone(ctx.user_id) {
        store.flush()?;
        Ok(format!("**{}**: your timezone was deleted.", ctx.user_name))
    } else {
        Ok(format!(
            "**{}**: you do not have a timezone saved.",
            ctx.user_name
        ))
    }
}

fn add_timezone_to_channel(
    args: &str,
    ctx: &CommandContext,
    store: &mut PreferenceStore,
) -> anyhow::Result<String> {
    match timezone::resolve(args) {
        Some(tz) => {
            store.add_channel_timezone(ctx.chat_id, tz.name().to_string());
            store.flush()?;
            log::info!("Added {} to channel {}", tz.name(), ctx.chat_id);
            Ok(format!(
                "**{}**: added *{}* to this channel",
                ctx.user_name, tz
            ))
        }
        None => Ok(format!(
            "**{}**: unable to add *{}* to the channel timezones. Use *tzsearch* to find a correct timezone.",
            ctx.user_name, args
        )),
    }
}

fn remove_timezone_from_channel(
    args: &str,
    ctx: &CommandContext,
    store: &mut PreferenceStore,
) -> anyhow::Result<String> {
    if store.channel_roster(ctx.chat_id).is_none() {
        return Ok(String::new());
    }
    let not_found = format!(
        "**{}**: could not find *{}*. Use *tzsearch* to find a correct timezone.",
        ctx.user_name, args
    );
    match timezone::resolve(args) {
        Some(tz) => {
            let removed = store.remove_channel_timezone(ctx.chat_id, tz.name());
            store.flush()?;
            if removed > 0 {
                Ok(format!(
                    "**{}**: *{}* was removed from this channel.",
                    ctx.user_name, args
                ))
            } else {
                Ok(not_found)
            }
        }
        None => Ok(not_found),
    }
}

fn list_channel_timezones(
    _args: &str,
    ctx: &CommandContext,
    store: &mut PreferenceStore,
) -> anyhow::Result<String> {
    match store.channel_roster(ctx.chat_id) {
        Some(roster) => Ok(format!("Channel timezones:\n{}", roster.join(", "))),
        None => Ok(String::new()),
    }
}

fn toggle_channel(
    _args: &str,
    _ctx: &CommandContext,
    _store: &mut PreferenceStore,
) -> anyhow::Result<String> {
    Ok("This command is not yet implemented.".to_string())
}

fn list_commands(
    _args: &str,
    _ctx: &CommandContext,
    _store: &mut PreferenceStore,
) -> anyhow::Result<String> {
    Ok("Commands:
tzsearch <query> - search for a valid timezone
tzset <timezone> - set your local timezone
tzdelete - remove your local timezone (you will no longer get an automatic reply when messaging a time)
tzchadd <timezone> - add a timezone to the current channel
tzchdelete <timezone> - remove a timezone from the current channel
tzchlist - lists the timezones assigned to the current channel
tzchtoggle - enable/disable the bot for the current channel (not yet implemented)"
        .to_string())
}
