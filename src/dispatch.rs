// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::{Actor, ClosedTicket, NewTicket, Ticket, TicketError, TicketService, TradeRequest};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

/// The kinds of ticket commands, without their arguments
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommandKind {
	Create,
	Claim,
	Unclaim,
	AddParticipant,
	RemoveParticipant,
	Rename,
	Close,
	Info,
	AcceptTrade,
	DeclineTrade,
}

/// Command names, shared by slash commands and text commands. Answering a trade request is only done with buttons.
pub const COMMAND_NAMES: &[(&str, CommandKind)] = &[
	("trade", CommandKind::Create),
	("claim", CommandKind::Claim),
	("unclaim", CommandKind::Unclaim),
	("add", CommandKind::AddParticipant),
	("remove", CommandKind::RemoveParticipant),
	("rename", CommandKind::Rename),
	("close", CommandKind::Close),
	("mminfo", CommandKind::Info),
];

pub fn command_kind(name: &str) -> Option<CommandKind> {
	COMMAND_NAMES
		.iter()
		.find(|(command_name, _)| *command_name == name)
		.map(|(_, kind)| *kind)
}

/// A ticket command with its arguments.
///
/// Slash commands, text commands, and buttons all get turned into one of these, so the ticket logic never needs to
/// know where a command came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TicketCommand {
	Create {
		other_trader: Option<Id<UserMarker>>,
		other_trader_is_bot: bool,
		description: String,
	},
	Claim,
	Unclaim,
	AddParticipant {
		target: Option<Id<UserMarker>>,
	},
	RemoveParticipant {
		target: Option<Id<UserMarker>>,
	},
	Rename {
		name: String,
	},
	Close,
	Info,
	AcceptTrade {
		request_id: u64,
	},
	DeclineTrade {
		request_id: u64,
	},
}

impl TicketCommand {
	pub fn kind(&self) -> CommandKind {
		match self {
			Self::Create { .. } => CommandKind::Create,
			Self::Claim => CommandKind::Claim,
			Self::Unclaim => CommandKind::Unclaim,
			Self::AddParticipant { .. } => CommandKind::AddParticipant,
			Self::RemoveParticipant { .. } => CommandKind::RemoveParticipant,
			Self::Rename { .. } => CommandKind::Rename,
			Self::Close => CommandKind::Close,
			Self::Info => CommandKind::Info,
			Self::AcceptTrade { .. } => CommandKind::AcceptTrade,
			Self::DeclineTrade { .. } => CommandKind::DeclineTrade,
		}
	}
}

/// Where a command was used and who used it
#[derive(Clone, Debug)]
pub struct Invocation {
	pub guild_id: Id<GuildMarker>,
	pub channel_id: Id<ChannelMarker>,
	pub actor: Actor,
}

/// What a successful command did, for the reply to describe
#[derive(Clone, Debug)]
pub enum CommandOutcome {
	TradeRequested(TradeRequest),
	TradeDeclined {
		request: TradeRequest,
		declined_by: Id<UserMarker>,
	},
	Created(Ticket),
	Claimed(Ticket),
	Unclaimed(Ticket),
	ParticipantAdded { user_id: Id<UserMarker> },
	ParticipantRemoved { user_id: Id<UserMarker> },
	Renamed { name: String },
	Closed(ClosedTicket),
	Info,
}

/// Runs a command against the ticket service.
pub async fn dispatch(
	service: &TicketService,
	invocation: &Invocation,
	command: TicketCommand,
) -> Result<CommandOutcome, TicketError> {
	let channel_id = invocation.channel_id;
	let actor = &invocation.actor;
	tracing::debug!(channel = %channel_id, actor = %actor.user_id, command = ?command.kind(), "dispatching ticket command");

	match command {
		TicketCommand::Create {
			other_trader,
			other_trader_is_bot,
			description,
		} => {
			let other_trader_id = other_trader.ok_or(TicketError::MissingTarget)?;
			let request = NewTicket {
				guild_id: invocation.guild_id,
				requester_id: actor.user_id,
				other_trader_id,
				other_trader_is_bot,
				trade_description: description,
			};
			service
				.request_trade(channel_id, request)
				.await
				.map(CommandOutcome::TradeRequested)
		}
		TicketCommand::Claim => service.claim(channel_id, actor).await.map(CommandOutcome::Claimed),
		TicketCommand::Unclaim => service.unclaim(channel_id, actor).await.map(CommandOutcome::Unclaimed),
		TicketCommand::AddParticipant { target } => {
			let user_id = service.add_participant(channel_id, actor, target).await?;
			Ok(CommandOutcome::ParticipantAdded { user_id })
		}
		TicketCommand::RemoveParticipant { target } => {
			let user_id = service.remove_participant(channel_id, actor, target).await?;
			Ok(CommandOutcome::ParticipantRemoved { user_id })
		}
		TicketCommand::Rename { name } => {
			let name = service.rename(channel_id, actor, &name).await?;
			Ok(CommandOutcome::Renamed { name })
		}
		TicketCommand::Close => service.close(channel_id, actor.user_id).await.map(CommandOutcome::Closed),
		TicketCommand::Info => Ok(CommandOutcome::Info),
		TicketCommand::AcceptTrade { request_id } => service
			.accept_trade(request_id, actor.user_id)
			.await
			.map(CommandOutcome::Created),
		TicketCommand::DeclineTrade { request_id } => {
			let request = service.decline_trade(request_id, actor.user_id).await?;
			Ok(CommandOutcome::TradeDeclined {
				request,
				declined_by: actor.user_id,
			})
		}
	}
}

/// Reads a user from a mention (`<@id>` or `<@!id>`) or a bare ID.
pub fn parse_user_mention(text: &str) -> Option<Id<UserMarker>> {
	let id = match text.strip_prefix("<@") {
		Some(rest) => {
			let rest = rest.strip_suffix('>')?;
			rest.strip_prefix('!').unwrap_or(rest)
		}
		None => text,
	};
	id.parse::<u64>().ok().and_then(Id::new_checked)
}

/// Parses a text command, e.g. `$add <@123>`. Gives `None` for messages that aren't ticket commands.
pub fn parse_text_command(prefix: &str, content: &str) -> Option<TicketCommand> {
	let content = content.trim_start().strip_prefix(prefix)?;
	let (name, arguments) = match content.split_once(char::is_whitespace) {
		Some((name, arguments)) => (name, arguments.trim()),
		None => (content, ""),
	};
	let kind = command_kind(&name.to_lowercase())?;
	let first_user = || arguments.split_whitespace().next().and_then(parse_user_mention);

	let command = match kind {
		CommandKind::Create => {
			let (other_trader, description) = match arguments.split_once(char::is_whitespace) {
				Some((trader, description)) => (parse_user_mention(trader), description.trim()),
				None => (parse_user_mention(arguments), ""),
			};
			TicketCommand::Create {
				other_trader,
				other_trader_is_bot: false,
				description: description.to_string(),
			}
		}
		CommandKind::Claim => TicketCommand::Claim,
		CommandKind::Unclaim => TicketCommand::Unclaim,
		CommandKind::AddParticipant => TicketCommand::AddParticipant { target: first_user() },
		CommandKind::RemoveParticipant => TicketCommand::RemoveParticipant { target: first_user() },
		CommandKind::Rename => TicketCommand::Rename {
			name: arguments.to_string(),
		},
		CommandKind::Close => TicketCommand::Close,
		CommandKind::Info => TicketCommand::Info,
		CommandKind::AcceptTrade | CommandKind::DeclineTrade => return None,
	};
	Some(command)
}

#[cfg(test)]
mod tests {
	use super::{
		COMMAND_NAMES, CommandKind, CommandOutcome, Invocation, TicketCommand, command_kind, dispatch,
		parse_text_command, parse_user_mention,
	};
	use crate::settings::{Settings, SettingsStore};
	use crate::tickets::{
		Actor, ChannelError, ChannelRequest, ClosedTicket, TicketChannels, TicketError, TicketService,
	};
	use async_trait::async_trait;
	use std::sync::Arc;
	use std::time::Duration;
	use twilight_model::id::Id;
	use twilight_model::id::marker::{ChannelMarker, UserMarker};

	struct FixedChannel;

	#[async_trait]
	impl TicketChannels for FixedChannel {
		async fn create_ticket_channel(&self, _request: &ChannelRequest) -> Result<Id<ChannelMarker>, ChannelError> {
			Ok(Id::new(100))
		}

		async fn grant_access(&self, _: Id<ChannelMarker>, _: Id<UserMarker>) -> Result<(), ChannelError> {
			Ok(())
		}

		async fn revoke_access(&self, _: Id<ChannelMarker>, _: Id<UserMarker>) -> Result<(), ChannelError> {
			Ok(())
		}

		async fn rename_channel(&self, _: Id<ChannelMarker>, _: &str) -> Result<(), ChannelError> {
			Ok(())
		}

		async fn delete_channel(&self, _: Id<ChannelMarker>) -> Result<(), ChannelError> {
			Ok(())
		}

		async fn send_audit_log(&self, _: Id<ChannelMarker>, _: &ClosedTicket) -> Result<(), ChannelError> {
			Ok(())
		}
	}

	fn service() -> TicketService {
		let settings = Settings {
			middleman_role: Some(Id::new(700)),
			..Settings::default()
		};
		TicketService::new(
			Arc::new(SettingsStore::new(settings)),
			Arc::new(FixedChannel),
			Duration::from_secs(5),
		)
	}

	fn invocation(channel: u64, user: u64, roles: &[u64]) -> Invocation {
		Invocation {
			guild_id: Id::new(1),
			channel_id: Id::new(channel),
			actor: Actor::new(Id::new(user), roles.iter().copied().map(Id::new).collect()),
		}
	}

	#[test]
	fn every_command_name_resolves() {
		for (name, kind) in COMMAND_NAMES {
			assert_eq!(command_kind(name), Some(*kind));
		}
		assert!(
			COMMAND_NAMES
				.iter()
				.all(|(_, kind)| !matches!(kind, CommandKind::AcceptTrade | CommandKind::DeclineTrade))
		);
		assert_eq!(command_kind("mminfosab"), None);
	}

	#[test]
	fn mentions_and_bare_ids_parse() {
		assert_eq!(parse_user_mention("<@123>"), Some(Id::new(123)));
		assert_eq!(parse_user_mention("<@!123>"), Some(Id::new(123)));
		assert_eq!(parse_user_mention("123"), Some(Id::new(123)));
		assert_eq!(parse_user_mention("<@&123>"), None);
		assert_eq!(parse_user_mention("<@0>"), None);
		assert_eq!(parse_user_mention("someone"), None);
	}

	#[test]
	fn text_commands_parse_arguments() {
		assert_eq!(parse_text_command("$", "$claim"), Some(TicketCommand::Claim));
		assert_eq!(parse_text_command("$", "$CLOSE now"), Some(TicketCommand::Close));
		assert_eq!(
			parse_text_command("$", "$add <@55>"),
			Some(TicketCommand::AddParticipant {
				target: Some(Id::new(55))
			})
		);
		assert_eq!(
			parse_text_command("$", "$remove"),
			Some(TicketCommand::RemoveParticipant { target: None })
		);
		assert_eq!(
			parse_text_command("$", "$rename Larry Harry"),
			Some(TicketCommand::Rename {
				name: String::from("Larry Harry")
			})
		);
		assert_eq!(
			parse_text_command("$", "$trade <@11> Brainrot for Brainrot"),
			Some(TicketCommand::Create {
				other_trader: Some(Id::new(11)),
				other_trader_is_bot: false,
				description: String::from("Brainrot for Brainrot"),
			})
		);
		assert_eq!(parse_text_command("$", "$mminfo"), Some(TicketCommand::Info));
	}

	#[test]
	fn other_messages_are_not_commands() {
		assert_eq!(parse_text_command("$", "claim"), None);
		assert_eq!(parse_text_command("$", "$unknown"), None);
		assert_eq!(parse_text_command("!", "$claim"), None);
		assert_eq!(parse_text_command("$", ""), None);
	}

	#[test]
	fn command_kinds_match_variants() {
		assert_eq!(TicketCommand::Close.kind(), CommandKind::Close);
		assert_eq!(
			TicketCommand::AcceptTrade { request_id: 1 }.kind(),
			CommandKind::AcceptTrade
		);
		assert_eq!(
			TicketCommand::Rename {
				name: String::new()
			}
			.kind(),
			CommandKind::Rename
		);
	}

	#[tokio::test]
	async fn create_without_other_trader_is_missing_target() {
		let service = service();
		let result = dispatch(
			&service,
			&invocation(50, 10, &[]),
			TicketCommand::Create {
				other_trader: None,
				other_trader_is_bot: false,
				description: String::from("Brainrot for Brainrot"),
			},
		)
		.await;
		assert!(matches!(result, Err(TicketError::MissingTarget)));
		assert!(service.registry().is_empty().await);
	}

	#[tokio::test]
	async fn commands_route_to_the_ticket() {
		let service = service();
		let requested = dispatch(
			&service,
			&invocation(50, 10, &[]),
			TicketCommand::Create {
				other_trader: Some(Id::new(11)),
				other_trader_is_bot: false,
				description: String::from("Brainrot for Brainrot"),
			},
		)
		.await
		.expect("trade requested");
		let request_id = match requested {
			CommandOutcome::TradeRequested(request) => {
				assert_eq!(request.channel_id, Id::new(50));
				request.id
			}
			other => panic!("expected a trade request, got {:?}", other),
		};
		assert!(service.registry().is_empty().await);

		let created = dispatch(&service, &invocation(50, 11, &[]), TicketCommand::AcceptTrade { request_id })
			.await
			.expect("trade accepted");
		match created {
			CommandOutcome::Created(ticket) => {
				assert_eq!(ticket.channel_id, Id::new(100));
				assert_eq!(ticket.requester_id, Id::new(10));
			}
			other => panic!("expected a created ticket, got {:?}", other),
		}

		let claimed = dispatch(&service, &invocation(100, 20, &[700]), TicketCommand::Claim)
			.await
			.expect("ticket claimed");
		assert!(matches!(claimed, CommandOutcome::Claimed(ticket) if ticket.claimer_id == Some(Id::new(20))));

		let info = dispatch(&service, &invocation(100, 10, &[]), TicketCommand::Info)
			.await
			.expect("info always works");
		assert!(matches!(info, CommandOutcome::Info));

		let closed = dispatch(&service, &invocation(100, 10, &[]), TicketCommand::Close)
			.await
			.expect("ticket closed");
		assert!(matches!(closed, CommandOutcome::Closed(closed) if closed.closed_by == Id::new(10)));
	}

	#[tokio::test]
	async fn declined_trades_open_nothing() {
		let service = service();
		let requested = dispatch(
			&service,
			&invocation(50, 10, &[]),
			TicketCommand::Create {
				other_trader: Some(Id::new(11)),
				other_trader_is_bot: false,
				description: String::from("Brainrot for Brainrot"),
			},
		)
		.await
		.expect("trade requested");
		let CommandOutcome::TradeRequested(request) = requested else {
			panic!("expected a trade request");
		};

		let declined = dispatch(
			&service,
			&invocation(50, 11, &[]),
			TicketCommand::DeclineTrade { request_id: request.id },
		)
		.await
		.expect("trade declined");
		assert!(
			matches!(declined, CommandOutcome::TradeDeclined { declined_by, .. } if declined_by == Id::new(11))
		);

		let accepted = dispatch(
			&service,
			&invocation(50, 11, &[]),
			TicketCommand::AcceptTrade { request_id: request.id },
		)
		.await;
		assert!(matches!(accepted, Err(TicketError::RequestNotFound)));
		assert!(service.registry().is_empty().await);
	}
}
