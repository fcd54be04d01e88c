// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::IntoDiagnostic;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, RoleMarker};

pub const DEFAULT_TICKET_MESSAGE: &str =
	"{requester} has opened a trade with {other}.\n**Trade:** {description}\nA middleman will claim this ticket shortly.";

/// Server settings that can be changed while the bot is running.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
	/// The role a user needs in order to claim tickets.
	pub middleman_role: Option<Id<RoleMarker>>,
	/// Roles that may act on any ticket without having claimed it.
	pub override_roles: Vec<Id<RoleMarker>>,
	/// The channel closed tickets are logged to. Logging is skipped if this isn't set.
	pub log_channel: Option<Id<ChannelMarker>>,
	/// The category new ticket channels are created under.
	pub ticket_category: Option<Id<ChannelMarker>>,
	/// Text of the status message posted in new tickets.
	///
	/// `{requester}`, `{other}`, and `{description}` are filled in for each ticket.
	pub ticket_message: String,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			middleman_role: None,
			override_roles: Vec::new(),
			log_channel: None,
			ticket_category: None,
			ticket_message: String::from(DEFAULT_TICKET_MESSAGE),
		}
	}
}

impl Settings {
	/// Roles that can see every ticket channel: the middleman role and all override roles
	pub fn staff_roles(&self) -> Vec<Id<RoleMarker>> {
		let mut roles = self.override_roles.clone();
		if let Some(middleman_role) = self.middleman_role {
			if !roles.contains(&middleman_role) {
				roles.insert(0, middleman_role);
			}
		}
		roles
	}
}

/// Holds the current [Settings] and writes the whole document back to disk on every change.
#[derive(Debug)]
pub struct SettingsStore {
	path: Option<PathBuf>,
	settings: RwLock<Settings>,
}

impl SettingsStore {
	/// Creates a store that only lives in memory.
	pub fn new(settings: Settings) -> Self {
		Self {
			path: None,
			settings: RwLock::new(settings),
		}
	}

	/// Loads settings from the file at the given path. A missing file gives the default settings; the file is
	/// created on the first change.
	pub async fn load(path: impl AsRef<Path>) -> miette::Result<Self> {
		let path = path.as_ref().to_path_buf();
		let settings = match fs::read_to_string(&path).await {
			Ok(contents) => serde_json::from_str(&contents).into_diagnostic()?,
			Err(error) if error.kind() == ErrorKind::NotFound => {
				tracing::info!(path = %path.display(), "no settings file found; using defaults");
				Settings::default()
			}
			Err(error) => return Err(error).into_diagnostic(),
		};
		Ok(Self {
			path: Some(path),
			settings: RwLock::new(settings),
		})
	}

	pub async fn snapshot(&self) -> Settings {
		self.settings.read().await.clone()
	}

	/// Applies a change and persists the result. Returns the updated settings.
	///
	/// The write lock is held through the file write so that concurrent changes hit the disk in order.
	pub async fn update(&self, change: impl FnOnce(&mut Settings)) -> miette::Result<Settings> {
		let mut settings = self.settings.write().await;
		let mut updated = settings.clone();
		change(&mut updated);
		if let Some(path) = &self.path {
			let contents = serde_json::to_string_pretty(&updated).into_diagnostic()?;
			fs::write(path, contents).await.into_diagnostic()?;
		}
		*settings = updated.clone();
		Ok(updated)
	}
}

#[cfg(test)]
mod tests {
	use super::{DEFAULT_TICKET_MESSAGE, Settings, SettingsStore};
	use twilight_model::id::Id;

	#[test]
	fn missing_keys_fall_back_to_defaults() {
		let settings: Settings = serde_json::from_str(r#"{"middleman_role": "700"}"#).expect("valid settings");
		assert_eq!(settings.middleman_role, Some(Id::new(700)));
		assert!(settings.override_roles.is_empty());
		assert_eq!(settings.ticket_message, DEFAULT_TICKET_MESSAGE);
	}

	#[test]
	fn staff_roles_lists_middleman_role_once() {
		let settings = Settings {
			middleman_role: Some(Id::new(700)),
			override_roles: vec![Id::new(800), Id::new(700)],
			..Settings::default()
		};
		assert_eq!(settings.staff_roles(), vec![Id::new(800), Id::new(700)]);

		let settings = Settings {
			middleman_role: Some(Id::new(700)),
			override_roles: vec![Id::new(800)],
			..Settings::default()
		};
		assert_eq!(settings.staff_roles(), vec![Id::new(700), Id::new(800)]);
	}

	#[tokio::test]
	async fn changes_are_written_and_reloaded() {
		let path = std::env::temp_dir().join(format!("trade-middleman-settings-{}.json", std::process::id()));
		let _ = tokio::fs::remove_file(&path).await;

		let store = SettingsStore::load(&path).await.expect("defaults load");
		assert_eq!(store.snapshot().await, Settings::default());

		store
			.update(|settings| {
				settings.log_channel = Some(Id::new(900));
				settings.override_roles.push(Id::new(800));
			})
			.await
			.expect("settings saved");

		let reloaded = SettingsStore::load(&path).await.expect("settings reload");
		let settings = reloaded.snapshot().await;
		assert_eq!(settings.log_channel, Some(Id::new(900)));
		assert_eq!(settings.override_roles, vec![Id::new(800)]);

		let _ = tokio::fs::remove_file(&path).await;
	}
}
