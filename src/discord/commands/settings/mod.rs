// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::connection::BotState;
use crate::discord::utils::responses::settings_summary;
use crate::settings::{Settings, SettingsStore};
use miette::{IntoDiagnostic, bail};
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption, CommandOptionValue};
use twilight_model::channel::message::{AllowedMentions, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, RoleMarker};
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::{CommandBuilder, SubCommandBuilder};

mod channels;
mod roles;
mod ticket_message;

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"settings",
		"View or modify the middleman settings for your server",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.default_member_permissions(Permissions::MANAGE_GUILD)
	.option(SubCommandBuilder::new("show", "Shows the current settings").build())
	.option(roles::middleman_role_subcommand_definition())
	.option(roles::override_role_add_subcommand_definition())
	.option(roles::override_role_remove_subcommand_definition())
	.option(channels::log_channel_subcommand_definition())
	.option(channels::ticket_category_subcommand_definition())
	.option(ticket_message::subcommand_definition())
	.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(subcommand_data) = command_data.options.first() else {
		bail!("Settings command invoked with no subcommand");
	};
	let CommandOptionValue::SubCommand(options) = &subcommand_data.value else {
		bail!(
			"Command data is malformed; expected `/settings {}` to get subcommand data",
			subcommand_data.name
		);
	};
	let store = bot_state.service.settings();

	let message = match subcommand_data.name.as_str() {
		"show" => settings_summary(&store.snapshot().await),
		"middleman_role" => roles::set_middleman_role(options, store).await?,
		"override_role_add" => roles::add_override_role(options, store).await?,
		"override_role_remove" => roles::remove_override_role(options, store).await?,
		"log_channel" => channels::set_log_channel(options, store).await?,
		"ticket_category" => channels::set_ticket_category(options, store).await?,
		"ticket_message" => ticket_message::set_ticket_message(options, store).await?,
		_ => bail!(
			"Unknown settings subcommand encountered: {}\n{:?}",
			subcommand_data.name,
			command_data
		),
	};

	let interaction_client = bot_state.http_client.interaction(bot_state.application_id);
	let response = InteractionResponseDataBuilder::new()
		.content(message)
		.allowed_mentions(AllowedMentions::default())
		.flags(MessageFlags::EPHEMERAL)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

/// Applies and saves a settings change, giving the message to show the administrator.
async fn save_settings(store: &SettingsStore, change: impl FnOnce(&mut Settings), success_message: String) -> String {
	match store.update(change).await {
		Ok(_) => success_message,
		Err(error) => {
			tracing::error!(source = ?error, "Failed to save settings");
			String::from("An internal error caused the update to fail.")
		}
	}
}

fn find_option<'a>(options: &'a [CommandDataOption], name: &str) -> miette::Result<&'a CommandOptionValue> {
	match options.iter().find(|option| option.name == name) {
		Some(option) => Ok(&option.value),
		None => bail!("Command data is malformed; expected required option `{}`", name),
	}
}

fn role_option(options: &[CommandDataOption], name: &str) -> miette::Result<Id<RoleMarker>> {
	let CommandOptionValue::Role(role_id) = find_option(options, name)? else {
		bail!("Command data is malformed; expected option `{}` to be a role", name);
	};
	Ok(*role_id)
}

fn channel_option(options: &[CommandDataOption], name: &str) -> miette::Result<Id<ChannelMarker>> {
	let CommandOptionValue::Channel(channel_id) = find_option(options, name)? else {
		bail!("Command data is malformed; expected option `{}` to be a channel", name);
	};
	Ok(*channel_id)
}

fn string_option<'a>(options: &'a [CommandDataOption], name: &str) -> miette::Result<&'a str> {
	let CommandOptionValue::String(value) = find_option(options, name)? else {
		bail!("Command data is malformed; expected option `{}` to be a string", name);
	};
	Ok(value.as_str())
}
