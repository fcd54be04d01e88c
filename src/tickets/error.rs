// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::model::TicketAction;
use miette::Diagnostic;
use std::error::Error;
use std::fmt;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

/// Reasons a user can't be the other side of a trade
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvalidTraderReason {
	SelfTrade,
	Bot,
}

/// Everything a ticket operation can be rejected with
#[derive(Debug, Diagnostic)]
pub enum TicketError {
	/// The channel doesn't host a live ticket.
	NotFound,
	/// The channel already hosts a ticket.
	DuplicateTicket,
	/// The trade request was already answered, or never existed.
	RequestNotFound,
	AlreadyClaimed { claimer: Id<UserMarker> },
	NotClaimed,
	PermissionDenied { action: TicketAction },
	/// A required setting has no value. Holds the setting name.
	NotConfigured(&'static str),
	/// The command needed a target (a user or a name) and didn't get one.
	MissingTarget,
	MissingDescription,
	InvalidTrader(InvalidTraderReason),
	ExternalFailure(ChannelError),
}

impl From<ChannelError> for TicketError {
	fn from(error: ChannelError) -> Self {
		Self::ExternalFailure(error)
	}
}

impl Error for TicketError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::ExternalFailure(error) => Some(error),
			_ => None,
		}
	}
}

impl fmt::Display for TicketError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotFound => write!(f, "channel is not a tracked ticket"),
			Self::DuplicateTicket => write!(f, "channel already hosts a ticket"),
			Self::RequestNotFound => write!(f, "trade request is not pending"),
			Self::AlreadyClaimed { claimer } => write!(f, "ticket is already claimed by {}", claimer),
			Self::NotClaimed => write!(f, "ticket is not claimed"),
			Self::PermissionDenied {
				action: action @ (TicketAction::AcceptTrade | TicketAction::DeclineTrade),
			} => write!(f, "not permitted to {} the trade request", action),
			Self::PermissionDenied { action } => write!(f, "not permitted to {} the ticket", action),
			Self::NotConfigured(setting) => write!(f, "setting {} is not configured", setting),
			Self::MissingTarget => write!(f, "no target was given"),
			Self::MissingDescription => write!(f, "no trade description was given"),
			Self::InvalidTrader(InvalidTraderReason::SelfTrade) => write!(f, "cannot open a trade with yourself"),
			Self::InvalidTrader(InvalidTraderReason::Bot) => write!(f, "cannot open a trade with a bot"),
			Self::ExternalFailure(error) => write!(f, "channel operation failed: {}", error),
		}
	}
}

// Collaborator errors come from whatever backs the channel operations, so they're carried boxed.
#[derive(Debug, Diagnostic)]
pub struct ChannelError(pub Box<dyn Error + Send + Sync>);

impl ChannelError {
	pub fn new(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
		Self(error.into())
	}
}

impl fmt::Display for ChannelError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

impl Error for ChannelError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		self.0.source()
	}
}
