// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::TicketError;
use super::model::Ticket;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};

// A slot is emptied when its ticket is removed, so anyone still holding the slot sees the ticket as gone.
type TicketSlot = Arc<Mutex<Option<Ticket>>>;

/// In-memory store of all live tickets, keyed by channel.
///
/// Each ticket sits behind its own lock, so operations on one ticket are serialized while different tickets don't
/// contend with each other. Nothing here is persisted; a restart starts with an empty registry.
#[derive(Debug, Default)]
pub struct TicketRegistry {
	tickets: RwLock<HashMap<Id<ChannelMarker>, TicketSlot>>,
}

impl TicketRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts tracking a new, unclaimed ticket for the channel.
	pub async fn create(
		&self,
		channel_id: Id<ChannelMarker>,
		guild_id: Id<GuildMarker>,
		requester_id: Id<UserMarker>,
		other_trader_id: Id<UserMarker>,
		trade_description: String,
	) -> Result<Ticket, TicketError> {
		let mut tickets = self.tickets.write().await;
		if tickets.contains_key(&channel_id) {
			return Err(TicketError::DuplicateTicket);
		}
		let ticket = Ticket {
			channel_id,
			guild_id,
			requester_id,
			other_trader_id,
			claimer_id: None,
			trade_description,
			created_at: Utc::now(),
			status_message: None,
		};
		tickets.insert(channel_id, Arc::new(Mutex::new(Some(ticket.clone()))));
		Ok(ticket)
	}

	pub async fn get(&self, channel_id: Id<ChannelMarker>) -> Result<Ticket, TicketError> {
		let slot = self.slot(channel_id).await?;
		let ticket = slot.lock().await;
		ticket.clone().ok_or(TicketError::NotFound)
	}

	/// Runs `update` against the ticket while holding that ticket's lock.
	///
	/// This is the critical section for check-and-set changes: whatever `update` reads, nobody else can change until
	/// it returns. Changes made before an error is returned are kept, so check before writing.
	pub async fn update<T>(
		&self,
		channel_id: Id<ChannelMarker>,
		update: impl FnOnce(&mut Ticket) -> Result<T, TicketError>,
	) -> Result<T, TicketError> {
		let slot = self.slot(channel_id).await?;
		let mut ticket = slot.lock().await;
		match ticket.as_mut() {
			Some(ticket) => update(ticket),
			None => Err(TicketError::NotFound),
		}
	}

	/// Sets or clears the claimer with no checks. Callers are responsible for authorization.
	pub async fn set_claimer(
		&self,
		channel_id: Id<ChannelMarker>,
		claimer_id: Option<Id<UserMarker>>,
	) -> Result<Ticket, TicketError> {
		self.update(channel_id, |ticket| {
			ticket.claimer_id = claimer_id;
			Ok(ticket.clone())
		})
		.await
	}

	pub async fn set_status_message(
		&self,
		channel_id: Id<ChannelMarker>,
		message_id: Id<MessageMarker>,
	) -> Result<Ticket, TicketError> {
		self.update(channel_id, |ticket| {
			ticket.status_message = Some(message_id);
			Ok(ticket.clone())
		})
		.await
	}

	/// Stops tracking the ticket, returning its final state.
	pub async fn remove(&self, channel_id: Id<ChannelMarker>) -> Result<Ticket, TicketError> {
		let slot = {
			let mut tickets = self.tickets.write().await;
			tickets.remove(&channel_id).ok_or(TicketError::NotFound)?
		};
		let mut ticket = slot.lock().await;
		ticket.take().ok_or(TicketError::NotFound)
	}

	pub async fn contains(&self, channel_id: Id<ChannelMarker>) -> bool {
		self.tickets.read().await.contains_key(&channel_id)
	}

	pub async fn len(&self) -> usize {
		self.tickets.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.tickets.read().await.is_empty()
	}

	async fn slot(&self, channel_id: Id<ChannelMarker>) -> Result<TicketSlot, TicketError> {
		let tickets = self.tickets.read().await;
		tickets.get(&channel_id).cloned().ok_or(TicketError::NotFound)
	}
}
