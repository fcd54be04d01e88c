// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::connection::BotState;
use super::presentation::run_ticket_command;
use crate::dispatch::{Invocation, TicketCommand, parse_text_command};
use crate::tickets::Actor;
use miette::IntoDiagnostic;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::gateway::payload::incoming::MessageCreate;

pub async fn handle_message(message: &MessageCreate, bot_state: &BotState) -> miette::Result<()> {
	if message.author.bot {
		return Ok(());
	}
	let Some(guild_id) = message.guild_id else {
		return Ok(());
	};
	let Some(mut command) = parse_text_command(&bot_state.command_prefix, &message.content) else {
		return Ok(());
	};

	// Slash commands get this from resolved data; for text commands the mention list carries it.
	if let TicketCommand::Create {
		other_trader: Some(other_trader),
		other_trader_is_bot,
		..
	} = &mut command
	{
		*other_trader_is_bot = message
			.mentions
			.iter()
			.any(|mention| mention.id == *other_trader && mention.bot);
	}

	let role_ids = message
		.member
		.as_ref()
		.map(|member| member.roles.clone())
		.unwrap_or_default();
	let invocation = Invocation {
		guild_id,
		channel_id: message.channel_id,
		actor: Actor::new(message.author.id, role_ids),
	};
	tracing::debug!(channel = %message.channel_id, command = ?command.kind(), "text command received");

	let reply = run_ticket_command(bot_state, &invocation, command).await?;
	let mut allowed_mentions = AllowedMentions::default();
	allowed_mentions.users = reply.mentioned_users;
	bot_state
		.http_client
		.create_message(message.channel_id)
		.content(&reply.content)
		.embeds(&reply.embeds)
		.components(&reply.components)
		.allowed_mentions(Some(&allowed_mentions))
		.reply(message.id)
		.await
		.into_diagnostic()?;

	Ok(())
}
