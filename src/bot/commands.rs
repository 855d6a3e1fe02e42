use anyhow::Error;
use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};

use super::registration::start_handler;

pub(super) fn commands_handler() -> UpdateHandler<Error> {
    teloxide::filter_command::<Command, _>().branch(
        dptree::filter(|msg: Message| msg.chat.is_private())
            .branch(dptree::case![Command::Start].endpoint(start_handler)),
    )
}

/// Поддерживаются следующие команды:
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub(super) enum Command {
    /// Начать работу с ботом.
    Start,
}
