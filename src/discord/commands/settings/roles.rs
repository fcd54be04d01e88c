// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{role_option, save_settings};
use crate::settings::SettingsStore;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::CommandOption;
use twilight_model::application::interaction::application_command::CommandDataOption;
use twilight_util::builder::command::{RoleBuilder, SubCommandBuilder};

pub fn middleman_role_subcommand_definition() -> CommandOption {
	let role = RoleBuilder::new("role", "The role middlemen have").required(true).build();
	SubCommandBuilder::new("middleman_role", "Sets the role a user needs to claim tickets")
		.option(role)
		.build()
}

pub fn override_role_add_subcommand_definition() -> CommandOption {
	let role = RoleBuilder::new("role", "The role to give access to all tickets")
		.required(true)
		.build();
	SubCommandBuilder::new(
		"override_role_add",
		"Lets a role act on any ticket without claiming it",
	)
	.option(role)
	.build()
}

pub fn override_role_remove_subcommand_definition() -> CommandOption {
	let role = RoleBuilder::new("role", "The role to stop giving access to all tickets")
		.required(true)
		.build();
	SubCommandBuilder::new("override_role_remove", "Removes a role's access to all tickets")
		.option(role)
		.build()
}

pub async fn set_middleman_role(options: &[CommandDataOption], store: &SettingsStore) -> miette::Result<String> {
	let role_id = role_option(options, "role")?;
	let message = save_settings(
		store,
		|settings| settings.middleman_role = Some(role_id),
		format!("Updated the middleman role to {}.", role_id.mention()),
	)
	.await;
	Ok(message)
}

pub async fn add_override_role(options: &[CommandDataOption], store: &SettingsStore) -> miette::Result<String> {
	let role_id = role_option(options, "role")?;
	if store.snapshot().await.override_roles.contains(&role_id) {
		return Ok(format!("{} is already an override role.", role_id.mention()));
	}
	let message = save_settings(
		store,
		|settings| {
			if !settings.override_roles.contains(&role_id) {
				settings.override_roles.push(role_id);
			}
		},
		format!("{} can now act on any ticket.", role_id.mention()),
	)
	.await;
	Ok(message)
}

pub async fn remove_override_role(options: &[CommandDataOption], store: &SettingsStore) -> miette::Result<String> {
	let role_id = role_option(options, "role")?;
	if !store.snapshot().await.override_roles.contains(&role_id) {
		return Ok(format!("{} isn't an override role.", role_id.mention()));
	}
	let message = save_settings(
		store,
		|settings| settings.override_roles.retain(|role| *role != role_id),
		format!("{} is no longer an override role.", role_id.mention()),
	)
	.await;
	Ok(message)
}
