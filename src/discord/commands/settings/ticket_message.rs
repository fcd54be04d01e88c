// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{save_settings, string_option};
use crate::settings::SettingsStore;
use twilight_model::application::command::CommandOption;
use twilight_model::application::interaction::application_command::CommandDataOption;
use twilight_util::builder::command::{StringBuilder, SubCommandBuilder};

// Embed descriptions max out at 4096 characters, and the placeholders expand once filled in.
const MAX_TICKET_MESSAGE_LENGTH: u16 = 3000;

pub fn subcommand_definition() -> CommandOption {
	let message = StringBuilder::new(
		"message",
		"The message text; {requester}, {other}, and {description} are filled in",
	)
	.max_length(MAX_TICKET_MESSAGE_LENGTH)
	.required(true)
	.build();
	SubCommandBuilder::new("ticket_message", "Sets the message shown at the top of new tickets")
		.option(message)
		.build()
}

pub async fn set_ticket_message(options: &[CommandDataOption], store: &SettingsStore) -> miette::Result<String> {
	let ticket_message = string_option(options, "message")?.replace("\\n", "\n");
	let message = save_settings(
		store,
		|settings| settings.ticket_message = ticket_message,
		String::from("Updated the ticket message."),
	)
	.await;
	Ok(message)
}
