// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::ChannelError;
use super::model::ClosedTicket;
use async_trait::async_trait;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker};

/// Everything needed to provision the channel for a new ticket
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChannelRequest {
	pub guild_id: Id<GuildMarker>,
	pub name: String,
	pub topic: String,
	/// The category to create the channel in, if any
	pub category_id: Option<Id<ChannelMarker>>,
	/// The two traders, who get access to the channel
	pub traders: [Id<UserMarker>; 2],
	/// Roles that get access to the channel alongside the traders
	pub staff_roles: Vec<Id<RoleMarker>>,
}

/// The channel operations tickets depend on.
///
/// Every call may take a while and may fail. Implementations report failures as [ChannelError]s and never touch
/// ticket state.
#[async_trait]
pub trait TicketChannels: Send + Sync {
	/// Creates a private channel for a ticket, returning the new channel's ID.
	async fn create_ticket_channel(&self, request: &ChannelRequest) -> Result<Id<ChannelMarker>, ChannelError>;

	/// Lets the user see and talk in the channel.
	async fn grant_access(&self, channel_id: Id<ChannelMarker>, user_id: Id<UserMarker>) -> Result<(), ChannelError>;

	/// Takes away access previously granted to the user.
	async fn revoke_access(&self, channel_id: Id<ChannelMarker>, user_id: Id<UserMarker>) -> Result<(), ChannelError>;

	async fn rename_channel(&self, channel_id: Id<ChannelMarker>, name: &str) -> Result<(), ChannelError>;

	/// Deletes the channel. A channel that's already gone counts as deleted.
	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), ChannelError>;

	/// Posts the record of a closed ticket to the log channel.
	async fn send_audit_log(&self, log_channel_id: Id<ChannelMarker>, closed: &ClosedTicket)
	-> Result<(), ChannelError>;
}
