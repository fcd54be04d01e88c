// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::Ticket;
use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};

pub const CLAIM_BUTTON_ID: &str = "ticket/claim";
pub const CLOSE_BUTTON_ID: &str = "ticket/close";

pub fn accept_trade_button_id(request_id: u64) -> String {
	format!("trade/accept/{}", request_id)
}

pub fn decline_trade_button_id(request_id: u64) -> String {
	format!("trade/decline/{}", request_id)
}

/// Buttons the other trader uses to answer a trade request.
pub fn trade_request_buttons(request_id: u64) -> Component {
	let accept_button = Button {
		custom_id: Some(accept_trade_button_id(request_id)),
		disabled: false,
		emoji: None,
		label: Some(String::from("Accept")),
		style: ButtonStyle::Success,
		url: None,
		sku_id: None,
	};
	let decline_button = Button {
		custom_id: Some(decline_trade_button_id(request_id)),
		disabled: false,
		emoji: None,
		label: Some(String::from("Decline")),
		style: ButtonStyle::Secondary,
		url: None,
		sku_id: None,
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::Button(accept_button), Component::Button(decline_button)],
	})
}

/// The buttons shown under a ticket's status message. Claiming is disabled while the ticket is claimed.
pub fn ticket_status_buttons(ticket: &Ticket) -> Component {
	let claim_button = Button {
		custom_id: Some(String::from(CLAIM_BUTTON_ID)),
		disabled: ticket.claimer_id.is_some(),
		emoji: None,
		label: Some(String::from("Claim")),
		style: ButtonStyle::Success,
		url: None,
		sku_id: None,
	};
	let close_button = Button {
		custom_id: Some(String::from(CLOSE_BUTTON_ID)),
		disabled: false,
		emoji: None,
		label: Some(String::from("Close")),
		style: ButtonStyle::Danger,
		url: None,
		sku_id: None,
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::Button(claim_button), Component::Button(close_button)],
	})
}
