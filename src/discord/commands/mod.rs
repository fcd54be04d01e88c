// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::connection::BotState;
use super::presentation::respond_to_interaction;
use crate::dispatch::command_kind;
use miette::bail;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;

mod settings;
mod tickets;

pub fn command_definitions() -> Vec<Command> {
	let mut commands = tickets::command_definitions();
	commands.push(settings::command_definition());
	commands
}

pub async fn route_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	bot_state: &BotState,
) -> miette::Result<()> {
	if command_data.name == "settings" {
		return settings::handle_command(interaction, command_data, bot_state).await;
	}
	let Some(kind) = command_kind(&command_data.name) else {
		bail!("Unknown command encountered: {}\n{:?}", command_data.name, command_data);
	};
	let Some(command) = tickets::ticket_command(kind, command_data) else {
		bail!("Command has no slash command form: {}", command_data.name);
	};
	respond_to_interaction(interaction, command, bot_state).await
}
