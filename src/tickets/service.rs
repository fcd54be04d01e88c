// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::channels::{ChannelRequest, TicketChannels};
use super::error::{InvalidTraderReason, TicketError};
use super::model::{Actor, ClosedTicket, NewTicket, Ticket, TicketAction};
use super::policy::{can_act, has_middleman_capability};
use super::registry::TicketRegistry;
use super::requests::{TradeRequest, TradeRequests};
use crate::settings::SettingsStore;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::sleep;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker, UserMarker};

pub const NEW_TICKET_CHANNEL_PREFIX: &str = "ticket-";
pub const RENAMED_TICKET_CHANNEL_PREFIX: &str = "mm-";
pub const MIDDLEMAN_ROLE_SETTING: &str = "middleman_role";

const MAX_CHANNEL_NAME_LENGTH: usize = 100;
const MAX_CHANNEL_TOPIC_LENGTH: usize = 1024;

/// Builds the name a ticket channel gets when it's renamed. Gives `None` if the supplied text has nothing usable
/// in it.
pub fn renamed_channel_name(fragment: &str) -> Option<String> {
	let words: Vec<String> = fragment.split_whitespace().map(|word| word.to_lowercase()).collect();
	if words.is_empty() {
		return None;
	}
	let name = format!("{}{}", RENAMED_TICKET_CHANNEL_PREFIX, words.join("-"));
	Some(name.chars().take(MAX_CHANNEL_NAME_LENGTH).collect())
}

/// Checks the traders and description of a new trade, giving the trimmed description.
fn validated_description(request: &NewTicket) -> Result<&str, TicketError> {
	if request.requester_id == request.other_trader_id {
		return Err(TicketError::InvalidTrader(InvalidTraderReason::SelfTrade));
	}
	if request.other_trader_is_bot {
		return Err(TicketError::InvalidTrader(InvalidTraderReason::Bot));
	}
	let description = request.trade_description.trim();
	if description.is_empty() {
		return Err(TicketError::MissingDescription);
	}
	Ok(description)
}

/// Runs the ticket lifecycle: opening, claiming, participant and name changes, and closing.
///
/// Every operation checks its preconditions and authorization before anything changes. Channel operations go
/// through the [TicketChannels] collaborator; the registry is only updated once the channel side has succeeded for
/// creation, and is updated before the channel is deleted for closing.
pub struct TicketService {
	registry: TicketRegistry,
	trade_requests: TradeRequests,
	settings: Arc<SettingsStore>,
	channels: Arc<dyn TicketChannels>,
	close_delay: Duration,
	ticket_counter: AtomicU64,
	pending_deletions: Arc<Mutex<HashMap<Id<ChannelMarker>, AbortHandle>>>,
}

impl TicketService {
	pub fn new(settings: Arc<SettingsStore>, channels: Arc<dyn TicketChannels>, close_delay: Duration) -> Self {
		Self {
			registry: TicketRegistry::new(),
			trade_requests: TradeRequests::new(),
			settings,
			channels,
			close_delay,
			ticket_counter: AtomicU64::new(0),
			pending_deletions: Arc::new(Mutex::new(HashMap::new())),
		}
	}

	pub fn registry(&self) -> &TicketRegistry {
		&self.registry
	}

	pub fn trade_requests(&self) -> &TradeRequests {
		&self.trade_requests
	}

	pub fn settings(&self) -> &Arc<SettingsStore> {
		&self.settings
	}

	pub fn close_delay(&self) -> Duration {
		self.close_delay
	}

	pub async fn ticket(&self, channel_id: Id<ChannelMarker>) -> Result<Ticket, TicketError> {
		self.registry.get(channel_id).await
	}

	/// Opens a ticket: provisions its channel, then starts tracking it.
	///
	/// If the channel can't be created, nothing is tracked. If the channel is created but its ID is somehow already
	/// tracked, the new channel is left behind for manual cleanup and the error is returned.
	pub async fn create_ticket(&self, request: NewTicket) -> Result<Ticket, TicketError> {
		let description = validated_description(&request)?;
		let settings = self.settings.snapshot().await;
		let ticket_number = self.ticket_counter.fetch_add(1, Ordering::Relaxed) + 1;
		let channel_request = ChannelRequest {
			guild_id: request.guild_id,
			name: format!("{}{:04}", NEW_TICKET_CHANNEL_PREFIX, ticket_number),
			topic: format!("Trade: {}", description)
				.chars()
				.take(MAX_CHANNEL_TOPIC_LENGTH)
				.collect(),
			category_id: settings.ticket_category,
			traders: [request.requester_id, request.other_trader_id],
			staff_roles: settings.staff_roles(),
		};
		let channel_id = self.channels.create_ticket_channel(&channel_request).await?;

		let result = self
			.registry
			.create(
				channel_id,
				request.guild_id,
				request.requester_id,
				request.other_trader_id,
				description.to_string(),
			)
			.await;
		match result {
			Ok(ticket) => {
				tracing::info!(
					channel = %channel_id,
					requester = %ticket.requester_id,
					other_trader = %ticket.other_trader_id,
					"ticket opened"
				);
				Ok(ticket)
			}
			Err(error) => {
				tracing::error!(
					channel = %channel_id,
					"provisioned ticket channel is already tracked; the channel is orphaned and needs manual cleanup"
				);
				Err(error)
			}
		}
	}

	/// Offers a trade to the other trader. No channel is made until they accept.
	pub async fn request_trade(
		&self,
		channel_id: Id<ChannelMarker>,
		request: NewTicket,
	) -> Result<TradeRequest, TicketError> {
		let description = validated_description(&request)?.to_string();
		let trade_request = self
			.trade_requests
			.open(
				request.guild_id,
				channel_id,
				request.requester_id,
				request.other_trader_id,
				description,
			)
			.await;
		tracing::info!(
			request = trade_request.id,
			requester = %trade_request.requester_id,
			other_trader = %trade_request.other_trader_id,
			"trade requested"
		);
		Ok(trade_request)
	}

	/// Accepts a pending trade request, opening its ticket. Only the user the trade was offered to may accept.
	///
	/// If the ticket channel can't be made, the request stays pending so it can be accepted again.
	pub async fn accept_trade(&self, request_id: u64, actor_id: Id<UserMarker>) -> Result<Ticket, TicketError> {
		let trade_request = self
			.trade_requests
			.take(request_id, |trade_request| {
				if trade_request.other_trader_id == actor_id {
					Ok(())
				} else {
					Err(TicketError::PermissionDenied {
						action: TicketAction::AcceptTrade,
					})
				}
			})
			.await?;
		let new_ticket = NewTicket {
			guild_id: trade_request.guild_id,
			requester_id: trade_request.requester_id,
			other_trader_id: trade_request.other_trader_id,
			other_trader_is_bot: false,
			trade_description: trade_request.trade_description.clone(),
		};
		match self.create_ticket(new_ticket).await {
			Ok(ticket) => Ok(ticket),
			Err(error @ TicketError::ExternalFailure(_)) => {
				self.trade_requests.restore(trade_request).await;
				Err(error)
			}
			Err(error) => Err(error),
		}
	}

	/// Drops a pending trade request. Either trader may decline it.
	pub async fn decline_trade(&self, request_id: u64, actor_id: Id<UserMarker>) -> Result<TradeRequest, TicketError> {
		let trade_request = self
			.trade_requests
			.take(request_id, |trade_request| {
				if trade_request.other_trader_id == actor_id || trade_request.requester_id == actor_id {
					Ok(())
				} else {
					Err(TicketError::PermissionDenied {
						action: TicketAction::DeclineTrade,
					})
				}
			})
			.await?;
		tracing::info!(request = request_id, declined_by = %actor_id, "trade request declined");
		Ok(trade_request)
	}

	/// Makes the actor the ticket's middleman. The actor must have the middleman role right now.
	pub async fn claim(&self, channel_id: Id<ChannelMarker>, actor: &Actor) -> Result<Ticket, TicketError> {
		self.registry.get(channel_id).await?;

		let settings = self.settings.snapshot().await;
		let Some(middleman_role) = settings.middleman_role else {
			return Err(TicketError::NotConfigured(MIDDLEMAN_ROLE_SETTING));
		};
		if !has_middleman_capability(&actor.role_ids, middleman_role) {
			return Err(TicketError::PermissionDenied {
				action: TicketAction::Claim,
			});
		}

		let ticket = self
			.registry
			.update(channel_id, |ticket| {
				if let Some(claimer) = ticket.claimer_id {
					return Err(TicketError::AlreadyClaimed { claimer });
				}
				ticket.claimer_id = Some(actor.user_id);
				Ok(ticket.clone())
			})
			.await?;
		tracing::info!(channel = %channel_id, claimer = %actor.user_id, "ticket claimed");
		Ok(ticket)
	}

	/// Releases the ticket's claim, making it claimable again.
	pub async fn unclaim(&self, channel_id: Id<ChannelMarker>, actor: &Actor) -> Result<Ticket, TicketError> {
		let settings = self.settings.snapshot().await;
		let ticket = self
			.registry
			.update(channel_id, |ticket| {
				if ticket.claimer_id.is_none() {
					return Err(TicketError::NotClaimed);
				}
				if !can_act(ticket, actor.user_id, &actor.role_ids, &settings.override_roles) {
					return Err(TicketError::PermissionDenied {
						action: TicketAction::Unclaim,
					});
				}
				ticket.claimer_id = None;
				Ok(ticket.clone())
			})
			.await?;
		tracing::info!(channel = %channel_id, actor = %actor.user_id, "ticket unclaimed");
		Ok(ticket)
	}

	/// Gives the target user access to the ticket channel. Returns the user who was added.
	pub async fn add_participant(
		&self,
		channel_id: Id<ChannelMarker>,
		actor: &Actor,
		target: Option<Id<UserMarker>>,
	) -> Result<Id<UserMarker>, TicketError> {
		self.authorize(channel_id, actor, TicketAction::AddParticipant).await?;
		let target = target.ok_or(TicketError::MissingTarget)?;
		self.channels.grant_access(channel_id, target).await?;
		tracing::info!(channel = %channel_id, actor = %actor.user_id, user = %target, "user added to ticket");
		Ok(target)
	}

	/// Takes the target user's access to the ticket channel away. Returns the user who was removed.
	pub async fn remove_participant(
		&self,
		channel_id: Id<ChannelMarker>,
		actor: &Actor,
		target: Option<Id<UserMarker>>,
	) -> Result<Id<UserMarker>, TicketError> {
		self.authorize(channel_id, actor, TicketAction::RemoveParticipant).await?;
		let target = target.ok_or(TicketError::MissingTarget)?;
		self.channels.revoke_access(channel_id, target).await?;
		tracing::info!(channel = %channel_id, actor = %actor.user_id, user = %target, "user removed from ticket");
		Ok(target)
	}

	/// Renames the ticket channel. Returns the channel's new name.
	pub async fn rename(
		&self,
		channel_id: Id<ChannelMarker>,
		actor: &Actor,
		name_fragment: &str,
	) -> Result<String, TicketError> {
		self.authorize(channel_id, actor, TicketAction::Rename).await?;
		let name = renamed_channel_name(name_fragment).ok_or(TicketError::MissingTarget)?;
		self.channels.rename_channel(channel_id, &name).await?;
		tracing::info!(channel = %channel_id, actor = %actor.user_id, name = %name, "ticket renamed");
		Ok(name)
	}

	/// Closes the ticket.
	///
	/// Anyone in the ticket may close it; there's no claim check. The ticket stops being tracked first, then the
	/// closing record is sent to the log channel (failures there are only logged), and the channel is deleted once
	/// the close delay has passed.
	pub async fn close(
		&self,
		channel_id: Id<ChannelMarker>,
		closed_by: Id<UserMarker>,
	) -> Result<ClosedTicket, TicketError> {
		let ticket = self.registry.remove(channel_id).await?;
		let mut closed = ClosedTicket {
			ticket,
			closed_by,
			closed_at: Utc::now(),
			deletion_delay: self.close_delay,
			audit_logged: false,
		};
		tracing::info!(channel = %channel_id, closed_by = %closed_by, "ticket closed");

		let settings = self.settings.snapshot().await;
		if let Some(log_channel) = settings.log_channel {
			match self.channels.send_audit_log(log_channel, &closed).await {
				Ok(()) => closed.audit_logged = true,
				Err(error) => tracing::warn!(source = ?error, channel = %channel_id, "failed to log closed ticket"),
			}
		}

		self.schedule_deletion(channel_id).await;
		Ok(closed)
	}

	/// Records the status message posted for the ticket.
	pub async fn attach_status_message(
		&self,
		channel_id: Id<ChannelMarker>,
		message_id: Id<MessageMarker>,
	) -> Result<Ticket, TicketError> {
		self.registry.set_status_message(channel_id, message_id).await
	}

	/// The ticket as it stands now along with its status message, for redrawing the message. Gives nothing once the
	/// ticket is closed or if no status message was posted.
	pub async fn status_message_ticket(&self, channel_id: Id<ChannelMarker>) -> Option<(Id<MessageMarker>, Ticket)> {
		let ticket = self.registry.get(channel_id).await.ok()?;
		let message_id = ticket.status_message?;
		Some((message_id, ticket))
	}

	/// Number of closed ticket channels still waiting to be deleted
	pub async fn pending_deletions(&self) -> usize {
		self.pending_deletions.lock().await.len()
	}

	/// Cancels every deletion that hasn't happened yet. Returns how many were cancelled.
	///
	/// Channels whose deletion is cancelled stay on the server with no ticket attached.
	pub async fn cancel_pending_deletions(&self) -> usize {
		let mut pending = self.pending_deletions.lock().await;
		let count = pending.len();
		for (channel_id, deletion) in pending.drain() {
			deletion.abort();
			tracing::warn!(channel = %channel_id, "cancelled deletion of closed ticket channel");
		}
		count
	}

	async fn authorize(
		&self,
		channel_id: Id<ChannelMarker>,
		actor: &Actor,
		action: TicketAction,
	) -> Result<Ticket, TicketError> {
		let ticket = self.registry.get(channel_id).await?;
		let settings = self.settings.snapshot().await;
		if can_act(&ticket, actor.user_id, &actor.role_ids, &settings.override_roles) {
			Ok(ticket)
		} else {
			Err(TicketError::PermissionDenied { action })
		}
	}

	async fn schedule_deletion(&self, channel_id: Id<ChannelMarker>) {
		let channels = Arc::clone(&self.channels);
		let pending_deletions = Arc::clone(&self.pending_deletions);
		let delay = self.close_delay;

		// The task removes its own entry when done, so the entry must be in place before the task can look for it.
		let mut pending = self.pending_deletions.lock().await;
		let deletion = tokio::spawn(async move {
			sleep(delay).await;
			match channels.delete_channel(channel_id).await {
				Ok(()) => tracing::info!(channel = %channel_id, "deleted closed ticket channel"),
				Err(error) => tracing::warn!(source = ?error, channel = %channel_id, "failed to delete closed ticket channel"),
			}
			pending_deletions.lock().await.remove(&channel_id);
		});
		pending.insert(channel_id, deletion.abort_handle());
	}
}
