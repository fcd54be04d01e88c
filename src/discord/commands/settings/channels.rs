// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{channel_option, save_settings};
use crate::settings::SettingsStore;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::CommandOption;
use twilight_model::application::interaction::application_command::CommandDataOption;
use twilight_model::channel::ChannelType;
use twilight_util::builder::command::{ChannelBuilder, SubCommandBuilder};

pub fn log_channel_subcommand_definition() -> CommandOption {
	let channel = ChannelBuilder::new("channel", "The channel closed tickets are logged to")
		.channel_types([ChannelType::GuildText])
		.required(true)
		.build();
	SubCommandBuilder::new("log_channel", "Sets the channel closed tickets are logged to")
		.option(channel)
		.build()
}

pub fn ticket_category_subcommand_definition() -> CommandOption {
	let category = ChannelBuilder::new("category", "The category new ticket channels go in")
		.channel_types([ChannelType::GuildCategory])
		.required(true)
		.build();
	SubCommandBuilder::new("ticket_category", "Sets the category new ticket channels are created in")
		.option(category)
		.build()
}

pub async fn set_log_channel(options: &[CommandDataOption], store: &SettingsStore) -> miette::Result<String> {
	let channel_id = channel_option(options, "channel")?;
	let message = save_settings(
		store,
		|settings| settings.log_channel = Some(channel_id),
		format!("Closed tickets will be logged to {}.", channel_id.mention()),
	)
	.await;
	Ok(message)
}

pub async fn set_ticket_category(options: &[CommandDataOption], store: &SettingsStore) -> miette::Result<String> {
	let category_id = channel_option(options, "category")?;
	let message = save_settings(
		store,
		|settings| settings.ticket_category = Some(category_id),
		format!("New tickets will be created in {}.", category_id.mention()),
	)
	.await;
	Ok(message)
}
