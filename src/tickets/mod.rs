// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod channels;
mod error;
mod model;
mod policy;
mod registry;
mod requests;
mod service;

pub use channels::{ChannelRequest, TicketChannels};
pub use error::{ChannelError, InvalidTraderReason, TicketError};
pub use model::{Actor, ClosedTicket, NewTicket, Ticket, TicketAction, TicketState};
pub use policy::{can_act, has_middleman_capability};
pub use registry::TicketRegistry;
pub use requests::{TradeRequest, TradeRequests};
pub use service::{
	MIDDLEMAN_ROLE_SETTING, NEW_TICKET_CHANNEL_PREFIX, RENAMED_TICKET_CHANNEL_PREFIX, TicketService,
	renamed_channel_name,
};
