// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::channels::DiscordChannels;
use super::commands::{command_definitions, route_command};
use super::interactions::route_interaction;
use super::messages::handle_message;
use crate::config::ConfigData;
use crate::settings::SettingsStore;
use crate::tickets::TicketService;
use miette::IntoDiagnostic;
use std::sync::Arc;
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::client::Client;
use twilight_model::application::interaction::InteractionData;
use twilight_model::gateway::event::Event;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

/// Everything event handlers need, shared between all of them
pub struct BotState {
	pub http_client: Arc<Client>,
	pub application_id: Id<ApplicationMarker>,
	pub service: Arc<TicketService>,
	pub command_prefix: String,
}

pub fn set_up_client(config: &ConfigData) -> Arc<Client> {
	Arc::new(Client::new(config.discord.bot_token.clone()))
}

pub async fn run_bot(config: Arc<ConfigData>, settings: Arc<SettingsStore>, http_client: Arc<Client>) -> miette::Result<()> {
	let intents = Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT;

	let mut shard = Shard::new(ShardId::ONE, config.discord.bot_token.clone(), intents);

	let application_id = {
		let application_response = http_client.current_user_application().await.into_diagnostic()?;
		application_response.model().await.into_diagnostic()?.id
	};
	let bot_user_id = {
		let user_response = http_client.current_user().await.into_diagnostic()?;
		user_response.model().await.into_diagnostic()?.id
	};

	{
		let interaction_client = http_client.interaction(application_id);
		let commands = command_definitions();
		interaction_client
			.set_global_commands(&commands)
			.await
			.into_diagnostic()?;
	}

	let channels = Arc::new(DiscordChannels::new(Arc::clone(&http_client), bot_user_id));
	let service = Arc::new(TicketService::new(settings, channels, config.close_delay));
	let bot_state = Arc::new(BotState {
		http_client,
		application_id,
		service: Arc::clone(&service),
		command_prefix: config.command_prefix.clone(),
	});

	loop {
		tokio::select! {
			event = shard.next_event(EventTypeFlags::all()) => {
				let Some(event) = event else {
					break;
				};
				let event = match event {
					Ok(event) => event,
					Err(error) => {
						tracing::warn!(source = ?error, "error receiving event");
						continue;
					}
				};
				tokio::spawn(handle_event(event, Arc::clone(&bot_state)));
			}
			signal = tokio::signal::ctrl_c() => {
				if let Err(error) = signal {
					tracing::error!(source = ?error, "failed to listen for shutdown signal");
				}
				tracing::info!("Shutting down");
				break;
			}
		}
	}

	let cancelled = service.cancel_pending_deletions().await;
	if cancelled > 0 {
		tracing::warn!(cancelled, "closed ticket channels were left undeleted at shutdown");
	}

	Ok(())
}

async fn handle_event(event: Event, bot_state: Arc<BotState>) {
	let event_result = handle_event_route(event, &bot_state).await;
	if let Err(error) = event_result {
		tracing::error!(source = ?error, "An error occurred handling a gateway event");
	}
}

async fn handle_event_route(event: Event, bot_state: &BotState) -> miette::Result<()> {
	tracing::debug!("Incoming gateway message: {:?}", event);
	match event {
		Event::InteractionCreate(interaction) => match &interaction.data {
			Some(InteractionData::ApplicationCommand(command_data)) => {
				route_command(&interaction, command_data, bot_state).await?;
			}
			Some(InteractionData::MessageComponent(interaction_data)) => {
				route_interaction(&interaction, interaction_data, bot_state).await?;
			}
			_ => (),
		},
		Event::MessageCreate(message) => handle_message(&message, bot_state).await?,
		Event::Ready(_) => {
			tracing::info!("Discord gateway is ready");
		}
		_ => (),
	}
	Ok(())
}
