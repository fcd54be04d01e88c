// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::TicketError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

/// A trade offered to another user, waiting for them to accept or decline it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeRequest {
	pub id: u64,
	pub guild_id: Id<GuildMarker>,
	/// The channel the request was made in.
	pub channel_id: Id<ChannelMarker>,
	pub requester_id: Id<UserMarker>,
	pub other_trader_id: Id<UserMarker>,
	pub trade_description: String,
	pub created_at: DateTime<Utc>,
}

/// Trade requests that haven't been answered yet, keyed by request ID
pub struct TradeRequests {
	next_id: AtomicU64,
	pending: Mutex<HashMap<u64, TradeRequest>>,
}

impl TradeRequests {
	pub fn new() -> Self {
		Self {
			next_id: AtomicU64::new(1),
			pending: Mutex::new(HashMap::new()),
		}
	}

	/// Stores a new request, giving it the next request ID.
	pub async fn open(
		&self,
		guild_id: Id<GuildMarker>,
		channel_id: Id<ChannelMarker>,
		requester_id: Id<UserMarker>,
		other_trader_id: Id<UserMarker>,
		trade_description: String,
	) -> TradeRequest {
		let request = TradeRequest {
			id: self.next_id.fetch_add(1, Ordering::Relaxed),
			guild_id,
			channel_id,
			requester_id,
			other_trader_id,
			trade_description,
			created_at: Utc::now(),
		};
		self.pending.lock().await.insert(request.id, request.clone());
		request
	}

	pub async fn get(&self, id: u64) -> Result<TradeRequest, TicketError> {
		self.pending
			.lock()
			.await
			.get(&id)
			.cloned()
			.ok_or(TicketError::RequestNotFound)
	}

	/// Removes the request if `check` allows it. The check and the removal happen together, so only one caller can
	/// ever take a given request.
	pub async fn take(
		&self,
		id: u64,
		check: impl FnOnce(&TradeRequest) -> Result<(), TicketError>,
	) -> Result<TradeRequest, TicketError> {
		let mut pending = self.pending.lock().await;
		let request = pending.get(&id).ok_or(TicketError::RequestNotFound)?;
		check(request)?;
		pending.remove(&id).ok_or(TicketError::RequestNotFound)
	}

	/// Puts a taken request back so it can be answered again.
	pub async fn restore(&self, request: TradeRequest) {
		self.pending.lock().await.insert(request.id, request);
	}

	pub async fn len(&self) -> usize {
		self.pending.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.pending.lock().await.is_empty()
	}
}

impl Default for TradeRequests {
	fn default() -> Self {
		Self::new()
	}
}
