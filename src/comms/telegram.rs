//! Telegram comms channel — the bot's command surface.
//!
//! Receives commands and plain-text expense entries via the Telegram API,
//! runs them against the shared [`BotState`], and replies in (legacy)
//! Markdown. Most replies are scheduled for auto-deletion so the chat stays
//! readable; logged-transaction confirmations are kept.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::utils::command::{BotCommands, ParseError as CommandParseError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::ledger::{self, ParseError, Period};
use super::format;
use super::state::BotState;

const GENERIC_ERROR: &str = "Internal error processing message.";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    Help,
    Sum,
    Today,
    Week,
    Month,
    Top,
    #[command(parse_with = rest_of_line)]
    Detail(String),
    #[command(parse_with = rest_of_line)]
    Delete(String),
    Clear,
}

/// Keep the whole argument text — categories may contain spaces, and an
/// empty argument must reach the handler so it can reply with usage.
fn rest_of_line(input: String) -> Result<(String,), CommandParseError> {
    Ok((input.trim().to_string(),))
}

// ── channel run-loop ─────────────────────────────────────────────────────────

/// Run the Telegram channel until `shutdown` is cancelled.
///
/// A missing `TELEGRAM_BOT_TOKEN` is not an error: the channel logs a
/// warning and exits cleanly so the rest of the process can keep running.
pub async fn run(
    channel_id: String,
    state: Arc<BotState>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let token = match env::var("TELEGRAM_BOT_TOKEN") {
        Ok(t) => t,
        Err(_) => {
            warn!(%channel_id, "TELEGRAM_BOT_TOKEN not set, telegram channel exiting");
            return Ok(());
        }
    };

    info!(%channel_id, "telegram channel starting");

    let bot = Bot::new(token);

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(dptree::endpoint(handle_text)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|_| async {})
        .build();

    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!(%channel_id, "shutdown signal received — closing telegram channel");
        }
        _ = dispatcher.dispatch() => {
            warn!(%channel_id, "telegram dispatcher exited unexpectedly");
        }
    }

    Ok(())
}

// ── command handling ─────────────────────────────────────────────────────────

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let chat = msg.chat.id;
    match cmd {
        Command::Help => {
            reply_ephemeral(&bot, chat, &format::help_text(), state.autodelete).await?;
        }
        Command::Sum => match state.totals(None).await {
            Ok(totals) if totals.is_empty() => {
                reply_ephemeral(&bot, chat, format::NO_EXPENSES, state.autodelete).await?;
            }
            Ok(totals) => {
                reply_ephemeral(&bot, chat, &format::sum_message(&totals), state.autodelete).await?;
            }
            Err(e) => {
                warn!("sum failed: {e}");
                reply_ephemeral(&bot, chat, GENERIC_ERROR, state.autodelete).await?;
            }
        },
        Command::Today => period_summary(&bot, chat, &state, Period::Today).await?,
        Command::Week => period_summary(&bot, chat, &state, Period::Week).await?,
        Command::Month => period_summary(&bot, chat, &state, Period::Month).await?,
        Command::Top => match state.totals(None).await {
            Ok(totals) if totals.is_empty() => {
                reply_ephemeral(&bot, chat, format::NO_EXPENSES, state.autodelete).await?;
            }
            Ok(totals) => {
                reply_ephemeral(&bot, chat, &format::top_message(&totals), state.autodelete).await?;
            }
            Err(e) => {
                warn!("top failed: {e}");
                reply_ephemeral(&bot, chat, GENERIC_ERROR, state.autodelete).await?;
            }
        },
        Command::Detail(arg) => detail(&bot, chat, &state, arg.trim()).await?,
        Command::Delete(arg) => delete(&bot, chat, &state, arg.trim()).await?,
        Command::Clear => {
            let kb = InlineKeyboardMarkup::new([[
                InlineKeyboardButton::callback("✅ Confirm", "clear_confirm"),
                InlineKeyboardButton::callback("❌ Cancel", "clear_cancel"),
            ]]);
            // Deliberately not auto-deleted: the user must get to answer it.
            bot.send_message(chat, format::CLEAR_PROMPT).reply_markup(kb).await?;
        }
    }
    Ok(())
}

async fn period_summary(
    bot: &Bot,
    chat: ChatId,
    state: &Arc<BotState>,
    period: Period,
) -> ResponseResult<()> {
    match state.totals(Some(period)).await {
        Ok(totals) if totals.is_empty() => {
            reply_ephemeral(bot, chat, &format::empty_period_message(period.title()), state.autodelete).await?;
        }
        Ok(totals) => {
            reply_ephemeral(bot, chat, &format::period_message(period.title(), &totals), state.autodelete)
                .await?;
        }
        Err(e) => {
            warn!("period summary failed: {e}");
            reply_ephemeral(bot, chat, GENERIC_ERROR, state.autodelete).await?;
        }
    }
    Ok(())
}

async fn detail(bot: &Bot, chat: ChatId, state: &Arc<BotState>, arg: &str) -> ResponseResult<()> {
    if arg.is_empty() {
        reply_ephemeral(bot, chat, format::DETAIL_USAGE, state.autodelete).await?;
        return Ok(());
    }
    match state.category_detail(arg.to_lowercase()).await {
        Ok((_, entries)) if entries.is_empty() => {
            reply_ephemeral(bot, chat, &format::missing_category_message(arg), state.autodelete).await?;
        }
        Ok((total, entries)) => {
            reply_ephemeral(bot, chat, &format::detail_message(arg, total, &entries), state.autodelete)
                .await?;
        }
        Err(e) => {
            warn!("detail failed: {e}");
            reply_ephemeral(bot, chat, GENERIC_ERROR, state.autodelete).await?;
        }
    }
    Ok(())
}

async fn delete(bot: &Bot, chat: ChatId, state: &Arc<BotState>, arg: &str) -> ResponseResult<()> {
    if arg.is_empty() {
        reply_ephemeral(bot, chat, format::DELETE_USAGE, state.autodelete).await?;
        return Ok(());
    }
    let text = match arg.parse::<i64>() {
        Ok(id) => match state.delete_entry(id).await {
            Ok(deleted) => format::delete_result_message(id, deleted),
            Err(e) => {
                warn!("delete failed: {e}");
                GENERIC_ERROR.to_string()
            }
        },
        Err(_) => format::INVALID_ID.to_string(),
    };
    reply_ephemeral(bot, chat, &text, state.autodelete).await?;
    Ok(())
}

// ── plain-text entries ───────────────────────────────────────────────────────

async fn handle_text(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    // Unknown commands fall through the command filter; ignore them rather
    // than logging them as expenses named "/something".
    if text.starts_with('/') {
        return Ok(());
    }

    let chat = msg.chat.id;
    let parsed = match ledger::parse_entry(text) {
        Ok(parsed) => parsed,
        Err(ParseError::MissingFields) => {
            reply_ephemeral(&bot, chat, format::ENTRY_HINT_MISSING_FIELDS, state.error_autodelete)
                .await?;
            return Ok(());
        }
        Err(ParseError::BadAmount) => {
            reply_ephemeral(&bot, chat, format::ENTRY_HINT_BAD_AMOUNT, state.error_autodelete).await?;
            return Ok(());
        }
    };

    let user = msg
        .from
        .as_ref()
        .and_then(|u| u.username.clone())
        .unwrap_or_default();
    debug!(category = %parsed.category, amount = parsed.amount, "logging expense");

    match state.log_expense(parsed.clone(), user).await {
        Ok((id, sum)) => {
            // Confirmation stays in the chat — it is the user's receipt.
            bot.send_message(chat, format::logged_message(id, &parsed.category, sum))
                .await?;
        }
        Err(e) => {
            warn!("log expense failed: {e}");
            reply_ephemeral(&bot, chat, GENERIC_ERROR, state.autodelete).await?;
        }
    }
    Ok(())
}

// ── clear confirmation ───────────────────────────────────────────────────────

async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    let outcome = match q.data.as_deref() {
        Some("clear_confirm") => match state.clear_all().await {
            Ok(removed) => {
                info!(removed, "ledger cleared");
                format::CLEARED
            }
            Err(e) => {
                warn!("clear failed: {e}");
                GENERIC_ERROR
            }
        },
        Some("clear_cancel") => format::CLEAR_CANCELLED,
        _ => return Ok(()),
    };

    if let Some(message) = q.message.as_ref() {
        bot.edit_message_text(message.chat().id, message.id(), outcome).await?;
    }
    bot.answer_callback_query(q.id).await?;
    Ok(())
}

// ── replies ──────────────────────────────────────────────────────────────────

/// Send `text` in Markdown chunks and schedule every sent message for
/// deletion after `after`.
async fn reply_ephemeral(
    bot: &Bot,
    chat: ChatId,
    text: &str,
    after: Duration,
) -> ResponseResult<()> {
    for chunk in format::chunk_message(text) {
        let sent = bot
            .send_message(chat, chunk)
            .parse_mode(ParseMode::Markdown)
            .await?;
        schedule_autodelete(bot.clone(), chat, sent.id, after);
    }
    Ok(())
}

/// Delete `message_id` from `chat` after `after`. Failures are ignored —
/// the user may have deleted the message first.
fn schedule_autodelete(bot: Bot, chat: ChatId, message_id: MessageId, after: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        let _ = bot.delete_message(chat, message_id).await;
    });
}
