// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kdl::{KdlDocument, KdlValue};
use miette::{IntoDiagnostic, miette};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::fs::read_to_string;
use tracing::Level;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_COMMAND_PREFIX: &str = "$";
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_secs(5);

pub async fn parse_config(config_path: &str) -> miette::Result<ConfigData> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	parse_config_document(&config_file_contents)
}

/// Parses the KDL text of a config file.
pub fn parse_config_document(contents: &str) -> miette::Result<ConfigData> {
	let document: KdlDocument = contents.parse()?;

	let discord_document = document
		.get("discord")
		.and_then(|node| node.children())
		.ok_or_else(|| miette!("Config is missing the discord block"))?;
	let bot_token = discord_document
		.get_arg("bot_token")
		.and_then(KdlValue::as_string)
		.ok_or_else(|| miette!("Config is missing discord.bot_token"))?
		.to_string();

	let settings_path = match document.get_arg("settings_file") {
		Some(value) => {
			let path = value
				.as_string()
				.ok_or_else(|| miette!("settings_file must be a string"))?;
			PathBuf::from(path)
		}
		None => PathBuf::from(DEFAULT_SETTINGS_FILE),
	};

	let command_prefix = match document.get_arg("command_prefix") {
		Some(value) => {
			let prefix = value
				.as_string()
				.ok_or_else(|| miette!("command_prefix must be a string"))?;
			if prefix.is_empty() {
				return Err(miette!("command_prefix may not be empty"));
			}
			prefix.to_string()
		}
		None => String::from(DEFAULT_COMMAND_PREFIX),
	};

	let close_delay = match document.get_arg("close_delay_seconds") {
		Some(value) => {
			let seconds = value
				.as_integer()
				.ok_or_else(|| miette!("close_delay_seconds must be an integer"))?;
			Duration::from_secs(u64::try_from(seconds).into_diagnostic()?)
		}
		None => DEFAULT_CLOSE_DELAY,
	};

	let log_level = match document.get_arg("log_level") {
		Some(value) => {
			let level = value.as_string().ok_or_else(|| miette!("log_level must be a string"))?;
			Level::from_str(level).into_diagnostic()?
		}
		None => Level::INFO,
	};

	Ok(ConfigData {
		discord: DiscordConfig { bot_token },
		settings_path,
		command_prefix,
		close_delay,
		log_level,
	})
}

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	/// The file holding the settings that can be changed from Discord.
	pub settings_path: PathBuf,
	/// The prefix for text commands.
	pub command_prefix: String,
	/// How long a closed ticket's channel stays around before it's deleted.
	pub close_delay: Duration,
	pub log_level: Level,
}

#[derive(Debug)]
pub struct DiscordConfig {
	pub bot_token: String,
}
