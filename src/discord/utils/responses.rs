// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::timestamp::{discord_timestamp, timestamp_from_datetime};
use crate::dispatch::CommandOutcome;
use crate::settings::Settings;
use crate::tickets::{ClosedTicket, InvalidTraderReason, Ticket, TicketAction, TicketError};
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};
use twilight_validate::embed::{DESCRIPTION_LENGTH, EmbedValidationError};

pub const TICKET_COLOR: u32 = 0xFFA500;
pub const CLOSED_TICKET_COLOR: u32 = 0xE74C3C;

/// Short message telling the user why their command didn't go through.
pub fn rejection_message(error: &TicketError) -> String {
	match error {
		TicketError::NotFound => String::from("This channel isn't an active middleman ticket."),
		TicketError::DuplicateTicket => String::from("A ticket already exists for this channel."),
		TicketError::AlreadyClaimed { claimer } => {
			format!("This ticket has already been claimed by {}.", claimer.mention())
		}
		TicketError::NotClaimed => String::from("This ticket hasn't been claimed."),
		TicketError::RequestNotFound => String::from("This trade request is no longer pending."),
		TicketError::PermissionDenied {
			action: TicketAction::Claim,
		} => String::from("You need the middleman role to claim tickets."),
		TicketError::PermissionDenied {
			action: TicketAction::AcceptTrade,
		} => String::from("Only the user this trade was offered to can accept it."),
		TicketError::PermissionDenied {
			action: TicketAction::DeclineTrade,
		} => String::from("Only the two traders can decline this trade request."),
		TicketError::PermissionDenied { action } => format!(
			"Only the middleman who claimed this ticket or staff can {} this ticket.",
			action
		),
		TicketError::NotConfigured(setting) => format!(
			"The `{}` setting hasn't been configured yet. An administrator can set it with `/settings`.",
			setting
		),
		TicketError::MissingTarget => String::from("You need to say who or what this command applies to."),
		TicketError::MissingDescription => String::from("Please describe what's being traded."),
		TicketError::InvalidTrader(InvalidTraderReason::SelfTrade) => {
			String::from("You can't open a trade with yourself.")
		}
		TicketError::InvalidTrader(InvalidTraderReason::Bot) => String::from("You can't open a trade with a bot."),
		TicketError::ExternalFailure(_) => {
			String::from("Something went wrong while updating the ticket channel. Please try again.")
		}
	}
}

/// Message describing what a successful command did.
pub fn outcome_message(outcome: &CommandOutcome) -> String {
	match outcome {
		CommandOutcome::TradeRequested(request) => format!(
			"{}, {} wants to trade with you through a middleman.\n**Trade:** {}\nAccept to open a ticket, or decline the request.",
			request.other_trader_id.mention(),
			request.requester_id.mention(),
			request.trade_description
		),
		CommandOutcome::TradeDeclined { request, declined_by } => {
			if *declined_by == request.requester_id {
				format!("{} withdrew their trade request.", declined_by.mention())
			} else {
				format!("{} declined the trade request.", declined_by.mention())
			}
		}
		CommandOutcome::Created(ticket) => format!(
			"{} accepted the trade. Your ticket has been created: {}",
			ticket.other_trader_id.mention(),
			ticket.channel_id.mention()
		),
		CommandOutcome::Claimed(ticket) => match ticket.claimer_id {
			Some(claimer) => format!("{} has claimed this ticket and will be your middleman.", claimer.mention()),
			None => String::from("This ticket has been claimed."),
		},
		CommandOutcome::Unclaimed(_) => {
			String::from("This ticket has been unclaimed. Another middleman can now claim it.")
		}
		CommandOutcome::ParticipantAdded { user_id } => format!("{} has been added to this ticket.", user_id.mention()),
		CommandOutcome::ParticipantRemoved { user_id } => {
			format!("{} has been removed from this ticket.", user_id.mention())
		}
		CommandOutcome::Renamed { name } => format!("This ticket has been renamed to **{}**.", name),
		CommandOutcome::Closed(closed) => format!(
			"This ticket has been closed by {}. This channel will be deleted in {} seconds.",
			closed.closed_by.mention(),
			closed.deletion_delay.as_secs()
		),
		CommandOutcome::Info => String::from("Here's how our middleman service works:"),
	}
}

/// Fills in the ticket message template for a ticket.
pub fn render_ticket_message(template: &str, ticket: &Ticket) -> String {
	template
		.replace("{requester}", &ticket.requester_id.mention().to_string())
		.replace("{other}", &ticket.other_trader_id.mention().to_string())
		.replace("{description}", &ticket.trade_description)
}

fn claim_status(ticket: &Ticket) -> String {
	match ticket.claimer_id {
		Some(claimer) => format!("Claimed by {}", claimer.mention()),
		None => String::from("Waiting for a middleman"),
	}
}

/// Cuts text down to fit in an embed description.
fn fit_description(text: String) -> String {
	if text.chars().count() <= DESCRIPTION_LENGTH {
		return text;
	}
	let mut fitted: String = text.chars().take(DESCRIPTION_LENGTH - 1).collect();
	fitted.push('…');
	fitted
}

/// The embed posted at the top of each ticket channel.
pub fn ticket_status_embed(ticket: &Ticket, template: &str) -> Result<Embed, EmbedValidationError> {
	let mut embed = EmbedBuilder::new()
		.title("Middleman Ticket")
		.description(fit_description(render_ticket_message(template, ticket)))
		.color(TICKET_COLOR)
		.field(EmbedFieldBuilder::new("Status", claim_status(ticket)).build());
	if let Ok(timestamp) = timestamp_from_datetime(&ticket.created_at) {
		embed = embed.timestamp(timestamp);
	}
	Ok(embed.validate()?.build())
}

/// The embed posted to the log channel when a ticket is closed, containing the ticket's final state.
pub fn audit_embed(closed: &ClosedTicket) -> Result<Embed, EmbedValidationError> {
	let ticket = &closed.ticket;
	let claimer = match ticket.claimer_id {
		Some(claimer) => claimer.mention().to_string(),
		None => String::from("Unclaimed"),
	};
	let mut embed = EmbedBuilder::new()
		.title("Middleman Ticket Closed")
		.description(fit_description(ticket.trade_description.clone()))
		.color(CLOSED_TICKET_COLOR)
		.field(EmbedFieldBuilder::new("Channel", format!("{}", ticket.channel_id)).inline().build())
		.field(EmbedFieldBuilder::new("Requester", ticket.requester_id.mention().to_string()).inline().build())
		.field(EmbedFieldBuilder::new("Other Trader", ticket.other_trader_id.mention().to_string()).inline().build())
		.field(EmbedFieldBuilder::new("Middleman", claimer).inline().build())
		.field(EmbedFieldBuilder::new("Closed By", closed.closed_by.mention().to_string()).inline().build())
		.field(EmbedFieldBuilder::new("Opened", discord_timestamp(&ticket.created_at)).inline().build())
		.field(EmbedFieldBuilder::new("Closed", discord_timestamp(&closed.closed_at)).inline().build());
	if let Ok(timestamp) = timestamp_from_datetime(&closed.closed_at) {
		embed = embed.timestamp(timestamp);
	}
	Ok(embed.validate()?.build())
}

/// Explains the middleman process to traders.
pub fn info_embed() -> Result<Embed, EmbedValidationError> {
	let description = "Our middlemen hold both sides of a trade so neither trader has to go first.\n\n\
		**How it works:**\n\
		1. Offer a trade with `/trade`, naming the other trader and what's being traded. Once they accept, a ticket is opened.\n\
		2. A middleman claims the ticket and confirms the trade with both of you.\n\
		3. The middleman collects the items from the first trader, then from the second.\n\
		4. Once the middleman holds everything, each trader receives the other's items.\n\
		5. The ticket is closed and its channel is deleted shortly after.";
	Ok(EmbedBuilder::new()
		.title("Middleman Info")
		.description(description)
		.color(TICKET_COLOR)
		.validate()?
		.build())
}

/// Describes the current settings for administrators.
pub fn settings_summary(settings: &Settings) -> String {
	let middleman_role = match settings.middleman_role {
		Some(role) => role.mention().to_string(),
		None => String::from("not set"),
	};
	let override_roles = if settings.override_roles.is_empty() {
		String::from("none")
	} else {
		settings
			.override_roles
			.iter()
			.map(|role| role.mention().to_string())
			.collect::<Vec<String>>()
			.join(", ")
	};
	let log_channel = match settings.log_channel {
		Some(channel) => channel.mention().to_string(),
		None => String::from("not set"),
	};
	let ticket_category = match settings.ticket_category {
		Some(channel) => channel.mention().to_string(),
		None => String::from("not set"),
	};
	format!(
		"**Middleman role:** {}\n**Override roles:** {}\n**Log channel:** {}\n**Ticket category:** {}\n**Ticket message:** {}",
		middleman_role, override_roles, log_channel, ticket_category, settings.ticket_message
	)
}
