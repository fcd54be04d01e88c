// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::connection::BotState;
use super::presentation::respond_to_interaction;
use crate::dispatch::TicketCommand;
use miette::bail;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;

/// Maps a component's custom ID to the ticket command it triggers.
fn component_command(custom_id: &str) -> Option<TicketCommand> {
	let custom_id_path: Vec<&str> = custom_id.split('/').collect();
	match custom_id_path.as_slice() {
		["ticket", "claim"] => Some(TicketCommand::Claim),
		["ticket", "close"] => Some(TicketCommand::Close),
		["trade", "accept", request_id] => request_id
			.parse()
			.ok()
			.map(|request_id| TicketCommand::AcceptTrade { request_id }),
		["trade", "decline", request_id] => request_id
			.parse()
			.ok()
			.map(|request_id| TicketCommand::DeclineTrade { request_id }),
		_ => None,
	}
}

pub async fn route_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(command) = component_command(&interaction_data.custom_id) else {
		bail!("Unknown component interaction: {}", interaction_data.custom_id);
	};
	respond_to_interaction(interaction, command, bot_state).await
}
