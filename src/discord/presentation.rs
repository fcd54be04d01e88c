// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::connection::BotState;
use super::utils::responses::{info_embed, outcome_message, rejection_message, ticket_status_embed};
use super::utils::shared_components::{ticket_status_buttons, trade_request_buttons};
use crate::dispatch::{CommandOutcome, Invocation, TicketCommand, dispatch};
use crate::tickets::{Actor, Ticket, TicketError};
use miette::{IntoDiagnostic, bail};
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::embed::Embed;
use twilight_model::channel::message::{AllowedMentions, Component, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};
use twilight_util::builder::InteractionResponseDataBuilder;

/// What to send back to the user after a command
pub struct CommandReply {
	pub content: String,
	pub embeds: Vec<Embed>,
	pub components: Vec<Component>,
	/// Users the reply may ping
	pub mentioned_users: Vec<Id<UserMarker>>,
	/// Whether only the user should see the reply, where the platform allows it
	pub ephemeral: bool,
	/// Whether the reply takes the place of the message whose button was pressed
	pub replaces_message: bool,
}

impl CommandReply {
	fn notice(content: String) -> Self {
		Self {
			content,
			embeds: Vec::new(),
			components: Vec::new(),
			mentioned_users: Vec::new(),
			ephemeral: true,
			replaces_message: false,
		}
	}

	pub fn rejection(error: &TicketError) -> Self {
		Self::notice(rejection_message(error))
	}

	/// Reply for interactions that don't come from a member in a server channel.
	pub fn outside_guild() -> Self {
		Self::notice(String::from(
			"Ticket commands can only be used by server members in a server channel.",
		))
	}
}

/// Gets the guild, channel, and acting member of an interaction.
pub fn interaction_invocation(interaction: &InteractionCreate) -> miette::Result<Invocation> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Ticket command was used outside of a guild");
	};
	let Some(channel) = interaction.channel.as_ref() else {
		bail!("Ticket command interaction has no channel");
	};
	let Some(member) = &interaction.member else {
		bail!("Interaction isn't from a guild member");
	};
	let Some(user) = &member.user else {
		bail!("Interaction member is not a user");
	};
	Ok(Invocation {
		guild_id,
		channel_id: channel.id,
		actor: Actor::new(user.id, member.roles.clone()),
	})
}

/// Runs a ticket command and builds the reply for it, carrying out the display side of the outcome (posting or
/// refreshing the ticket's status message) along the way.
pub async fn run_ticket_command(
	bot_state: &BotState,
	invocation: &Invocation,
	command: TicketCommand,
) -> miette::Result<CommandReply> {
	let outcome = match dispatch(&bot_state.service, invocation, command).await {
		Ok(outcome) => outcome,
		Err(error) => {
			if let TicketError::ExternalFailure(source) = &error {
				tracing::warn!(source = ?source, channel = %invocation.channel_id, "ticket command failed on a channel operation");
			} else {
				tracing::debug!(channel = %invocation.channel_id, reason = %error, "ticket command rejected");
			}
			return Ok(CommandReply::rejection(&error));
		}
	};

	let mut reply = CommandReply {
		content: outcome_message(&outcome),
		embeds: Vec::new(),
		components: Vec::new(),
		mentioned_users: Vec::new(),
		ephemeral: false,
		replaces_message: false,
	};
	match &outcome {
		CommandOutcome::TradeRequested(request) => {
			reply.components.push(trade_request_buttons(request.id));
			reply.mentioned_users.push(request.other_trader_id);
		}
		CommandOutcome::TradeDeclined { .. } => reply.replaces_message = true,
		CommandOutcome::Created(ticket) => {
			reply.replaces_message = true;
			if let Err(error) = post_status_message(bot_state, ticket).await {
				tracing::warn!(source = ?error, channel = %ticket.channel_id, "failed to post ticket status message");
			}
		}
		CommandOutcome::Claimed(ticket) | CommandOutcome::Unclaimed(ticket) => {
			if let Err(error) = refresh_status_message(bot_state, ticket.channel_id).await {
				tracing::warn!(source = ?error, channel = %ticket.channel_id, "failed to update ticket status message");
			}
		}
		CommandOutcome::Info => reply.embeds.push(info_embed().into_diagnostic()?),
		_ => (),
	}
	Ok(reply)
}

/// Runs a ticket command for an interaction and responds to the interaction with the result.
pub async fn respond_to_interaction(
	interaction: &InteractionCreate,
	command: TicketCommand,
	bot_state: &BotState,
) -> miette::Result<()> {
	let reply = match interaction_invocation(interaction) {
		Ok(invocation) => run_ticket_command(bot_state, &invocation, command).await?,
		Err(error) => {
			tracing::warn!(source = ?error, interaction = %interaction.id, "ticket command used outside a guild channel");
			CommandReply::outside_guild()
		}
	};
	let response = interaction_response(reply);
	let interaction_client = bot_state.http_client.interaction(bot_state.application_id);
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

fn interaction_response(reply: CommandReply) -> InteractionResponse {
	let mut allowed_mentions = AllowedMentions::default();
	allowed_mentions.users = reply.mentioned_users;
	let mut response = InteractionResponseDataBuilder::new()
		.content(reply.content)
		.embeds(reply.embeds)
		.components(reply.components)
		.allowed_mentions(allowed_mentions);
	if reply.ephemeral {
		response = response.flags(MessageFlags::EPHEMERAL);
	}
	let kind = if reply.replaces_message {
		InteractionResponseType::UpdateMessage
	} else {
		InteractionResponseType::ChannelMessageWithSource
	};
	InteractionResponse {
		kind,
		data: Some(response.build()),
	}
}

async fn post_status_message(bot_state: &BotState, ticket: &Ticket) -> miette::Result<()> {
	let settings = bot_state.service.settings().snapshot().await;
	let embed = ticket_status_embed(ticket, &settings.ticket_message).into_diagnostic()?;
	let components = [ticket_status_buttons(ticket)];
	let content = format!("{} {}", ticket.requester_id.mention(), ticket.other_trader_id.mention());
	let mut allowed_mentions = AllowedMentions::default();
	allowed_mentions.users.push(ticket.requester_id);
	allowed_mentions.users.push(ticket.other_trader_id);

	let message = bot_state
		.http_client
		.create_message(ticket.channel_id)
		.content(&content)
		.embeds(&[embed])
		.components(&components)
		.allowed_mentions(Some(&allowed_mentions))
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()?;

	bot_state
		.service
		.attach_status_message(ticket.channel_id, message.id)
		.await?;
	Ok(())
}

/// Redraws the status message from the ticket's current state, which may have moved on since the command ran.
async fn refresh_status_message(bot_state: &BotState, channel_id: Id<ChannelMarker>) -> miette::Result<()> {
	let Some((message_id, ticket)) = bot_state.service.status_message_ticket(channel_id).await else {
		return Ok(());
	};
	let settings = bot_state.service.settings().snapshot().await;
	let embed = ticket_status_embed(&ticket, &settings.ticket_message).into_diagnostic()?;
	let embeds = [embed];
	let components = [ticket_status_buttons(&ticket)];

	bot_state
		.http_client
		.update_message(channel_id, message_id)
		.embeds(Some(embeds.as_slice()))
		.components(Some(components.as_slice()))
		.await
		.into_diagnostic()?;
	Ok(())
}
