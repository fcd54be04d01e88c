// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, RoleMarker, UserMarker};

/// One active middleman trade session, bound to the channel hosting it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ticket {
	/// The channel hosting the ticket. Unique among live tickets.
	pub channel_id: Id<ChannelMarker>,
	/// The guild in which the ticket channel lives.
	pub guild_id: Id<GuildMarker>,
	/// The user who opened the ticket.
	pub requester_id: Id<UserMarker>,
	/// The user on the other side of the trade.
	pub other_trader_id: Id<UserMarker>,
	/// The middleman currently responsible for the ticket, if any.
	pub claimer_id: Option<Id<UserMarker>>,
	/// The trade as described by the requester.
	pub trade_description: String,
	pub created_at: DateTime<Utc>,
	/// The status message posted in the ticket channel.
	///
	/// This is only ever stored and handed back; the ticket logic doesn't look at it.
	pub status_message: Option<Id<MessageMarker>>,
}

impl Ticket {
	pub fn state(&self) -> TicketState {
		match self.claimer_id {
			Some(claimer) => TicketState::Claimed(claimer),
			None => TicketState::Open,
		}
	}

	/// Whether the user is one of the two traders
	pub fn is_trader(&self, user_id: Id<UserMarker>) -> bool {
		self.requester_id == user_id || self.other_trader_id == user_id
	}
}

/// Claim state of a live ticket. Closed tickets aren't tracked at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketState {
	Open,
	Claimed(Id<UserMarker>),
}

/// The user performing an action, along with the roles they currently hold.
#[derive(Clone, Debug)]
pub struct Actor {
	pub user_id: Id<UserMarker>,
	pub role_ids: Vec<Id<RoleMarker>>,
}

impl Actor {
	pub fn new(user_id: Id<UserMarker>, role_ids: Vec<Id<RoleMarker>>) -> Self {
		Self { user_id, role_ids }
	}

	pub fn has_role(&self, role_id: Id<RoleMarker>) -> bool {
		self.role_ids.contains(&role_id)
	}
}

/// A request to open a ticket.
#[derive(Clone, Debug)]
pub struct NewTicket {
	pub guild_id: Id<GuildMarker>,
	pub requester_id: Id<UserMarker>,
	pub other_trader_id: Id<UserMarker>,
	/// Whether the other trader is a bot account, as reported by the platform
	pub other_trader_is_bot: bool,
	pub trade_description: String,
}

/// The final record of a ticket that has been closed.
#[derive(Clone, Debug)]
pub struct ClosedTicket {
	pub ticket: Ticket,
	pub closed_by: Id<UserMarker>,
	pub closed_at: DateTime<Utc>,
	/// How long until the ticket channel gets deleted
	pub deletion_delay: Duration,
	/// Whether the close entry made it to the log channel
	pub audit_logged: bool,
}

/// Ticket actions that are gated by authorization.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketAction {
	Claim,
	Unclaim,
	AddParticipant,
	RemoveParticipant,
	Rename,
	AcceptTrade,
	DeclineTrade,
}

impl fmt::Display for TicketAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Claim => write!(f, "claim"),
			Self::Unclaim => write!(f, "unclaim"),
			Self::AddParticipant => write!(f, "add a user to"),
			Self::RemoveParticipant => write!(f, "remove a user from"),
			Self::Rename => write!(f, "rename"),
			Self::AcceptTrade => write!(f, "accept"),
			Self::DeclineTrade => write!(f, "decline"),
		}
	}
}
