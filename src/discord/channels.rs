// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::responses::audit_embed;
use crate::tickets::{ChannelError, ChannelRequest, ClosedTicket, TicketChannels};
use async_trait::async_trait;
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_http::error::ErrorType;
use twilight_http::request::AuditLogReason;
use twilight_http::response::StatusCode;
use twilight_model::channel::ChannelType;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::guild::Permissions;
use twilight_model::channel::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::http::permission_overwrite::{
	PermissionOverwrite as HttpPermissionOverwrite, PermissionOverwriteType as HttpPermissionOverwriteType,
};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GenericMarker, RoleMarker, UserMarker};

/// Permissions given to everyone who belongs in a ticket channel
pub fn ticket_participant_permissions() -> Permissions {
	Permissions::VIEW_CHANNEL
		| Permissions::READ_MESSAGE_HISTORY
		| Permissions::SEND_MESSAGES
		| Permissions::ATTACH_FILES
		| Permissions::EMBED_LINKS
}

fn member_access_overwrite(user_id: Id<UserMarker>) -> HttpPermissionOverwrite {
	HttpPermissionOverwrite {
		allow: Some(ticket_participant_permissions()),
		deny: None,
		id: user_id.cast(),
		kind: HttpPermissionOverwriteType::Member,
	}
}

fn channel_overwrite(
	id: Id<GenericMarker>,
	kind: PermissionOverwriteType,
	allow: Permissions,
	deny: Permissions,
) -> PermissionOverwrite {
	PermissionOverwrite { allow, deny, id, kind }
}

/// Builds the permission overwrites for a new ticket channel.
///
/// The channel is hidden from everyone, then opened up to the traders, the staff roles, and the bot itself.
pub fn ticket_channel_overwrites(request: &ChannelRequest, bot_user_id: Id<UserMarker>) -> Vec<PermissionOverwrite> {
	let everyone_role_id: Id<RoleMarker> = request.guild_id.cast();
	let mut overwrites = vec![channel_overwrite(
		everyone_role_id.cast(),
		PermissionOverwriteType::Role,
		Permissions::empty(),
		Permissions::VIEW_CHANNEL,
	)];
	for trader in request.traders {
		overwrites.push(channel_overwrite(
			trader.cast(),
			PermissionOverwriteType::Member,
			ticket_participant_permissions(),
			Permissions::empty(),
		));
	}
	for role_id in request.staff_roles.iter() {
		overwrites.push(channel_overwrite(
			role_id.cast(),
			PermissionOverwriteType::Role,
			ticket_participant_permissions(),
			Permissions::empty(),
		));
	}
	overwrites.push(channel_overwrite(
		bot_user_id.cast(),
		PermissionOverwriteType::Member,
		ticket_participant_permissions() | Permissions::MANAGE_CHANNELS | Permissions::MANAGE_ROLES,
		Permissions::empty(),
	));
	overwrites
}

/// Ticket channel operations carried out through the Discord HTTP API
pub struct DiscordChannels {
	http_client: Arc<Client>,
	bot_user_id: Id<UserMarker>,
}

impl DiscordChannels {
	pub fn new(http_client: Arc<Client>, bot_user_id: Id<UserMarker>) -> Self {
		Self {
			http_client,
			bot_user_id,
		}
	}
}

#[async_trait]
impl TicketChannels for DiscordChannels {
	async fn create_ticket_channel(&self, request: &ChannelRequest) -> Result<Id<ChannelMarker>, ChannelError> {
		let overwrites = ticket_channel_overwrites(request, self.bot_user_id);
		let mut create_channel = self
			.http_client
			.create_guild_channel(request.guild_id, &request.name)
			.kind(ChannelType::GuildText)
			.topic(&request.topic)
			.permission_overwrites(&overwrites);
		if let Some(category_id) = request.category_id {
			create_channel = create_channel.parent_id(category_id);
		}
		let channel = create_channel
			.reason("Middleman ticket opened")
			.await
			.map_err(ChannelError::new)?
			.model()
			.await
			.map_err(ChannelError::new)?;
		Ok(channel.id)
	}

	async fn grant_access(&self, channel_id: Id<ChannelMarker>, user_id: Id<UserMarker>) -> Result<(), ChannelError> {
		let overwrite = member_access_overwrite(user_id);
		self.http_client
			.update_channel_permission(channel_id, &overwrite)
			.reason("User added to middleman ticket")
			.await
			.map_err(ChannelError::new)?;
		Ok(())
	}

	async fn revoke_access(&self, channel_id: Id<ChannelMarker>, user_id: Id<UserMarker>) -> Result<(), ChannelError> {
		self.http_client
			.delete_channel_permission(channel_id)
			.member(user_id)
			.reason("User removed from middleman ticket")
			.await
			.map_err(ChannelError::new)?;
		Ok(())
	}

	async fn rename_channel(&self, channel_id: Id<ChannelMarker>, name: &str) -> Result<(), ChannelError> {
		self.http_client
			.update_channel(channel_id)
			.name(name)
			.reason("Middleman ticket renamed")
			.await
			.map_err(ChannelError::new)?;
		Ok(())
	}

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), ChannelError> {
		let delete_result = self
			.http_client
			.delete_channel(channel_id)
			.reason("Middleman ticket closed")
			.await;
		match delete_result {
			Ok(_) => Ok(()),
			Err(error) => {
				if let ErrorType::Response { status, .. } = error.kind() {
					if *status == StatusCode::NOT_FOUND {
						tracing::debug!(channel = %channel_id, "closed ticket channel was already deleted");
						return Ok(());
					}
				}
				Err(ChannelError::new(error))
			}
		}
	}

	async fn send_audit_log(
		&self,
		log_channel_id: Id<ChannelMarker>,
		closed: &ClosedTicket,
	) -> Result<(), ChannelError> {
		let embed = audit_embed(closed).map_err(ChannelError::new)?;
		self.http_client
			.create_message(log_channel_id)
			.embeds(&[embed])
			.allowed_mentions(Some(&AllowedMentions::default()))
			.await
			.map_err(ChannelError::new)?;
		Ok(())
	}
}
