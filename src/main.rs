// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use trade_middleman::config::parse_config;
use trade_middleman::discord::{run_bot, set_up_client};
use trade_middleman::settings::SettingsStore;

#[tokio::main]
async fn main() -> miette::Result<()> {
	let config = parse_config("config.kdl").await?;
	tracing_subscriber::fmt().with_max_level(config.log_level).init();

	let settings = Arc::new(SettingsStore::load(&config.settings_path).await?);
	tracing::info!(path = %config.settings_path.display(), "Loaded server settings");

	let http_client = set_up_client(&config);
	run_bot(Arc::new(config), settings, http_client).await
}
