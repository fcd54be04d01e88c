// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::dispatch::{CommandKind, TicketCommand};
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;
use twilight_util::builder::command::{CommandBuilder, StringBuilder, UserBuilder};

pub const MAX_TRADE_DESCRIPTION_LENGTH: u16 = 1000;

fn guild_command(name: &str, description: &str) -> CommandBuilder {
	CommandBuilder::new(name, description, CommandType::ChatInput).contexts([InteractionContextType::Guild])
}

pub fn command_definitions() -> Vec<Command> {
	let trader = UserBuilder::new("trader", "The user you're trading with")
		.required(true)
		.build();
	let description = StringBuilder::new("description", "What's being traded")
		.required(true)
		.max_length(MAX_TRADE_DESCRIPTION_LENGTH)
		.build();
	let add_user = UserBuilder::new("user", "The user to add to this ticket")
		.required(true)
		.build();
	let remove_user = UserBuilder::new("user", "The user to remove from this ticket")
		.required(true)
		.build();
	let name = StringBuilder::new("name", "The new name for this ticket")
		.required(true)
		.build();

	vec![
		guild_command("trade", "Offer a trade through a middleman")
			.option(trader)
			.option(description)
			.build(),
		guild_command("claim", "Claim this ticket as its middleman").build(),
		guild_command("unclaim", "Release your claim on this ticket").build(),
		guild_command("add", "Add a user to this ticket").option(add_user).build(),
		guild_command("remove", "Remove a user from this ticket")
			.option(remove_user)
			.build(),
		guild_command("rename", "Rename this ticket").option(name).build(),
		guild_command("close", "Close this ticket").build(),
		guild_command("mminfo", "Learn how the middleman service works").build(),
	]
}

fn user_option(command_data: &CommandData, name: &str) -> Option<Id<UserMarker>> {
	command_data
		.options
		.iter()
		.find(|option| option.name == name)
		.and_then(|option| match &option.value {
			CommandOptionValue::User(user_id) => Some(*user_id),
			_ => None,
		})
}

fn string_option<'a>(command_data: &'a CommandData, name: &str) -> Option<&'a str> {
	command_data
		.options
		.iter()
		.find(|option| option.name == name)
		.and_then(|option| match &option.value {
			CommandOptionValue::String(value) => Some(value.as_str()),
			_ => None,
		})
}

/// Builds the ticket command for a slash command's data. Gives `None` for kinds that have no slash command.
pub fn ticket_command(kind: CommandKind, command_data: &CommandData) -> Option<TicketCommand> {
	let command = match kind {
		CommandKind::Create => {
			let other_trader = user_option(command_data, "trader");
			let other_trader_is_bot = other_trader
				.and_then(|user_id| command_data.resolved.as_ref()?.users.get(&user_id))
				.is_some_and(|user| user.bot);
			TicketCommand::Create {
				other_trader,
				other_trader_is_bot,
				description: string_option(command_data, "description").unwrap_or_default().to_string(),
			}
		}
		CommandKind::Claim => TicketCommand::Claim,
		CommandKind::Unclaim => TicketCommand::Unclaim,
		CommandKind::AddParticipant => TicketCommand::AddParticipant {
			target: user_option(command_data, "user"),
		},
		CommandKind::RemoveParticipant => TicketCommand::RemoveParticipant {
			target: user_option(command_data, "user"),
		},
		CommandKind::Rename => TicketCommand::Rename {
			name: string_option(command_data, "name").unwrap_or_default().to_string(),
		},
		CommandKind::Close => TicketCommand::Close,
		CommandKind::Info => TicketCommand::Info,
		CommandKind::AcceptTrade | CommandKind::DeclineTrade => return None,
	};
	Some(command)
}

#[cfg(test)]
mod tests {
	use super::command_definitions;
	use crate::dispatch::command_kind;

	#[test]
	fn every_slash_command_is_a_ticket_command() {
		let definitions = command_definitions();
		assert_eq!(definitions.len(), 8);
		for definition in definitions {
			assert!(command_kind(&definition.name).is_some(), "{}", definition.name);
		}
	}
}
