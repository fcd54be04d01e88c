// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use trade_middleman::settings::{Settings, SettingsStore};
use trade_middleman::tickets::{
	Actor, ChannelError, ChannelRequest, ClosedTicket, InvalidTraderReason, NewTicket, TicketAction,
	TicketChannels, TicketError, TicketService, TicketState,
};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker};

const GUILD: Id<GuildMarker> = Id::new(1);
const MIDDLEMAN_ROLE: Id<RoleMarker> = Id::new(10);
const OVERRIDE_ROLE: Id<RoleMarker> = Id::new(11);
const LOG_CHANNEL: Id<ChannelMarker> = Id::new(50);
const REQUESTER: Id<UserMarker> = Id::new(1001);
const OTHER_TRADER: Id<UserMarker> = Id::new(1002);
const MIDDLEMAN: Id<UserMarker> = Id::new(2001);
const SECOND_MIDDLEMAN: Id<UserMarker> = Id::new(2002);
const OUTSIDER: Id<UserMarker> = Id::new(3001);
const CLOSE_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, Eq, PartialEq)]
enum ChannelEvent {
	Created { channel_id: Id<ChannelMarker>, name: String },
	Granted(Id<ChannelMarker>, Id<UserMarker>),
	Revoked(Id<ChannelMarker>, Id<UserMarker>),
	Renamed(Id<ChannelMarker>, String),
	Deleted(Id<ChannelMarker>),
	AuditLogged { log_channel: Id<ChannelMarker>, ticket_channel: Id<ChannelMarker> },
}

/// Records every channel operation, handing out channel IDs from 100 upward
#[derive(Default)]
struct RecordingChannels {
	events: Mutex<Vec<ChannelEvent>>,
	next_channel: AtomicU64,
	fail_create: bool,
	fail_audit: bool,
	/// Hands out the same channel ID every time
	reuse_channel: bool,
}

impl RecordingChannels {
	fn events(&self) -> Vec<ChannelEvent> {
		self.events.lock().unwrap().clone()
	}

	fn record(&self, event: ChannelEvent) {
		self.events.lock().unwrap().push(event);
	}
}

#[async_trait]
impl TicketChannels for RecordingChannels {
	async fn create_ticket_channel(&self, request: &ChannelRequest) -> Result<Id<ChannelMarker>, ChannelError> {
		if self.fail_create {
			return Err(ChannelError::new("missing permissions"));
		}
		let channel_id = if self.reuse_channel {
			Id::new(100)
		} else {
			Id::new(100 + self.next_channel.fetch_add(1, Ordering::SeqCst))
		};
		self.record(ChannelEvent::Created {
			channel_id,
			name: request.name.clone(),
		});
		Ok(channel_id)
	}

	async fn grant_access(&self, channel_id: Id<ChannelMarker>, user_id: Id<UserMarker>) -> Result<(), ChannelError> {
		self.record(ChannelEvent::Granted(channel_id, user_id));
		Ok(())
	}

	async fn revoke_access(&self, channel_id: Id<ChannelMarker>, user_id: Id<UserMarker>) -> Result<(), ChannelError> {
		self.record(ChannelEvent::Revoked(channel_id, user_id));
		Ok(())
	}

	async fn rename_channel(&self, channel_id: Id<ChannelMarker>, name: &str) -> Result<(), ChannelError> {
		self.record(ChannelEvent::Renamed(channel_id, name.to_string()));
		Ok(())
	}

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), ChannelError> {
		self.record(ChannelEvent::Deleted(channel_id));
		Ok(())
	}

	async fn send_audit_log(
		&self,
		log_channel_id: Id<ChannelMarker>,
		closed: &ClosedTicket,
	) -> Result<(), ChannelError> {
		if self.fail_audit {
			return Err(ChannelError::new("log channel is gone"));
		}
		self.record(ChannelEvent::AuditLogged {
			log_channel: log_channel_id,
			ticket_channel: closed.ticket.channel_id,
		});
		Ok(())
	}
}

fn configured_settings() -> Settings {
	Settings {
		middleman_role: Some(MIDDLEMAN_ROLE),
		override_roles: vec![OVERRIDE_ROLE],
		log_channel: Some(LOG_CHANNEL),
		..Settings::default()
	}
}

fn service_with(settings: Settings, channels: Arc<RecordingChannels>) -> TicketService {
	TicketService::new(Arc::new(SettingsStore::new(settings)), channels, CLOSE_DELAY)
}

fn middleman(user_id: Id<UserMarker>) -> Actor {
	Actor::new(user_id, vec![MIDDLEMAN_ROLE])
}

fn member(user_id: Id<UserMarker>) -> Actor {
	Actor::new(user_id, Vec::new())
}

fn trade_request() -> NewTicket {
	NewTicket {
		guild_id: GUILD,
		requester_id: REQUESTER,
		other_trader_id: OTHER_TRADER,
		other_trader_is_bot: false,
		trade_description: String::from("Trading a dragon for 500 coins"),
	}
}

#[tokio::test]
async fn full_ticket_lifecycle() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));

	let ticket = service.create_ticket(trade_request()).await.unwrap();
	assert_eq!(ticket.state(), TicketState::Open);
	assert_eq!(ticket.trade_description, "Trading a dragon for 500 coins");
	assert_eq!(
		channels.events(),
		vec![ChannelEvent::Created {
			channel_id: ticket.channel_id,
			name: String::from("ticket-0001"),
		}]
	);

	let claimed = service.claim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();
	assert_eq!(claimed.state(), TicketState::Claimed(MIDDLEMAN));

	let second_claim = service.claim(ticket.channel_id, &middleman(SECOND_MIDDLEMAN)).await;
	assert!(matches!(second_claim, Err(TicketError::AlreadyClaimed { claimer }) if claimer == MIDDLEMAN));

	let unclaimed = service.unclaim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();
	assert_eq!(unclaimed.state(), TicketState::Open);

	let closed = service.close(ticket.channel_id, REQUESTER).await.unwrap();
	assert_eq!(closed.closed_by, REQUESTER);
	assert_eq!(closed.deletion_delay, CLOSE_DELAY);
	assert!(closed.audit_logged);
	assert!(!service.registry().contains(ticket.channel_id).await);
	assert_eq!(service.pending_deletions().await, 1);
	assert!(channels.events().contains(&ChannelEvent::AuditLogged {
		log_channel: LOG_CHANNEL,
		ticket_channel: ticket.channel_id,
	}));
}

#[tokio::test]
async fn ticket_channels_are_numbered_in_order() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));

	service.create_ticket(trade_request()).await.unwrap();
	service.create_ticket(trade_request()).await.unwrap();

	let names: Vec<String> = channels
		.events()
		.into_iter()
		.filter_map(|event| match event {
			ChannelEvent::Created { name, .. } => Some(name),
			_ => None,
		})
		.collect();
	assert_eq!(names, vec![String::from("ticket-0001"), String::from("ticket-0002")]);
	assert_eq!(service.registry().len().await, 2);
}

#[tokio::test]
async fn invalid_trades_are_rejected_before_provisioning() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));

	let mut self_trade = trade_request();
	self_trade.other_trader_id = REQUESTER;
	assert!(matches!(
		service.create_ticket(self_trade).await,
		Err(TicketError::InvalidTrader(InvalidTraderReason::SelfTrade))
	));

	let mut bot_trade = trade_request();
	bot_trade.other_trader_is_bot = true;
	assert!(matches!(
		service.create_ticket(bot_trade).await,
		Err(TicketError::InvalidTrader(InvalidTraderReason::Bot))
	));

	let mut blank = trade_request();
	blank.trade_description = String::from("   ");
	assert!(matches!(
		service.create_ticket(blank).await,
		Err(TicketError::MissingDescription)
	));

	assert!(channels.events().is_empty());
	assert!(service.registry().is_empty().await);
}

#[tokio::test]
async fn failed_provisioning_tracks_nothing() {
	let channels = Arc::new(RecordingChannels {
		fail_create: true,
		..RecordingChannels::default()
	});
	let service = service_with(configured_settings(), Arc::clone(&channels));

	let result = service.create_ticket(trade_request()).await;
	assert!(matches!(result, Err(TicketError::ExternalFailure(_))));
	assert!(service.registry().is_empty().await);
}

#[tokio::test]
async fn outsiders_are_denied_without_side_effects() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();
	service.claim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();
	let events_before = channels.events();

	let outsider = member(OUTSIDER);
	assert!(matches!(
		service.add_participant(ticket.channel_id, &outsider, Some(OUTSIDER)).await,
		Err(TicketError::PermissionDenied {
			action: TicketAction::AddParticipant
		})
	));
	assert!(matches!(
		service.remove_participant(ticket.channel_id, &outsider, Some(OTHER_TRADER)).await,
		Err(TicketError::PermissionDenied {
			action: TicketAction::RemoveParticipant
		})
	));
	assert!(matches!(
		service.rename(ticket.channel_id, &outsider, "mine now").await,
		Err(TicketError::PermissionDenied {
			action: TicketAction::Rename
		})
	));
	assert!(matches!(
		service.unclaim(ticket.channel_id, &outsider).await,
		Err(TicketError::PermissionDenied {
			action: TicketAction::Unclaim
		})
	));

	// Holding the middleman role isn't enough to act on someone else's claim.
	assert!(matches!(
		service.unclaim(ticket.channel_id, &middleman(SECOND_MIDDLEMAN)).await,
		Err(TicketError::PermissionDenied { .. })
	));

	assert_eq!(channels.events(), events_before);
	let unchanged = service.ticket(ticket.channel_id).await.unwrap();
	assert_eq!(unchanged.claimer_id, Some(MIDDLEMAN));
}

#[tokio::test]
async fn claimer_and_overrides_manage_participants() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();
	service.claim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();

	let added = service
		.add_participant(ticket.channel_id, &middleman(MIDDLEMAN), Some(OUTSIDER))
		.await
		.unwrap();
	assert_eq!(added, OUTSIDER);

	let admin = Actor::new(Id::new(4001), vec![OVERRIDE_ROLE]);
	let removed = service
		.remove_participant(ticket.channel_id, &admin, Some(OUTSIDER))
		.await
		.unwrap();
	assert_eq!(removed, OUTSIDER);

	let name = service
		.rename(ticket.channel_id, &middleman(MIDDLEMAN), "Dragon Deal")
		.await
		.unwrap();
	assert_eq!(name, "mm-dragon-deal");

	assert!(matches!(
		service.add_participant(ticket.channel_id, &middleman(MIDDLEMAN), None).await,
		Err(TicketError::MissingTarget)
	));
	assert!(matches!(
		service.rename(ticket.channel_id, &middleman(MIDDLEMAN), "  ").await,
		Err(TicketError::MissingTarget)
	));

	let events = channels.events();
	assert!(events.contains(&ChannelEvent::Granted(ticket.channel_id, OUTSIDER)));
	assert!(events.contains(&ChannelEvent::Revoked(ticket.channel_id, OUTSIDER)));
	assert!(events.contains(&ChannelEvent::Renamed(ticket.channel_id, String::from("mm-dragon-deal"))));
}

#[tokio::test]
async fn claimers_keep_authority_after_losing_the_middleman_role() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();
	service.claim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();

	let former_middleman = member(MIDDLEMAN);
	assert_eq!(
		service.ticket(ticket.channel_id).await.unwrap().state(),
		TicketState::Claimed(MIDDLEMAN)
	);
	let added = service
		.add_participant(ticket.channel_id, &former_middleman, Some(OUTSIDER))
		.await
		.unwrap();
	assert_eq!(added, OUTSIDER);
	let name = service
		.rename(ticket.channel_id, &former_middleman, "still mine")
		.await
		.unwrap();
	assert_eq!(name, "mm-still-mine");
	let released = service.unclaim(ticket.channel_id, &former_middleman).await.unwrap();
	assert_eq!(released.claimer_id, None);

	let events = channels.events();
	assert!(events.contains(&ChannelEvent::Granted(ticket.channel_id, OUTSIDER)));
	assert!(events.contains(&ChannelEvent::Renamed(ticket.channel_id, String::from("mm-still-mine"))));
}

#[tokio::test]
async fn provisioning_an_already_tracked_channel_keeps_the_original_ticket() {
	let channels = Arc::new(RecordingChannels {
		reuse_channel: true,
		..RecordingChannels::default()
	});
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let original = service.create_ticket(trade_request()).await.unwrap();
	service.claim(original.channel_id, &middleman(MIDDLEMAN)).await.unwrap();

	let mut second_request = trade_request();
	second_request.trade_description = String::from("A different trade");
	let duplicate = service.create_ticket(second_request).await;
	assert!(matches!(duplicate, Err(TicketError::DuplicateTicket)));

	let kept = service.ticket(original.channel_id).await.unwrap();
	assert_eq!(kept.claimer_id, Some(MIDDLEMAN));
	assert_eq!(kept.trade_description, "Trading a dragon for 500 coins");
	assert_eq!(service.registry().len().await, 1);
}

#[tokio::test]
async fn claiming_needs_the_middleman_role() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();

	assert!(matches!(
		service.claim(ticket.channel_id, &member(REQUESTER)).await,
		Err(TicketError::PermissionDenied {
			action: TicketAction::Claim
		})
	));
	// Override roles grant authority over claimed tickets, not the ability to claim.
	assert!(matches!(
		service
			.claim(ticket.channel_id, &Actor::new(OUTSIDER, vec![OVERRIDE_ROLE]))
			.await,
		Err(TicketError::PermissionDenied { .. })
	));
	assert_eq!(service.ticket(ticket.channel_id).await.unwrap().state(), TicketState::Open);
}

#[tokio::test]
async fn claiming_without_a_middleman_role_configured() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(Settings::default(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();

	assert!(matches!(
		service.claim(ticket.channel_id, &middleman(MIDDLEMAN)).await,
		Err(TicketError::NotConfigured("middleman_role"))
	));
}

#[tokio::test]
async fn unknown_channels_are_not_tickets() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let channel_id = Id::new(999);

	assert!(matches!(
		service.claim(channel_id, &middleman(MIDDLEMAN)).await,
		Err(TicketError::NotFound)
	));
	assert!(matches!(
		service.close(channel_id, REQUESTER).await,
		Err(TicketError::NotFound)
	));
	assert!(matches!(
		service.add_participant(channel_id, &middleman(MIDDLEMAN), Some(OUTSIDER)).await,
		Err(TicketError::NotFound)
	));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_have_one_winner() {
	let channels = Arc::new(RecordingChannels::default());
	let service = Arc::new(service_with(configured_settings(), Arc::clone(&channels)));
	let ticket = service.create_ticket(trade_request()).await.unwrap();

	let mut claims = Vec::new();
	for user in 0..8 {
		let service = Arc::clone(&service);
		let channel_id = ticket.channel_id;
		claims.push(tokio::spawn(async move {
			service.claim(channel_id, &middleman(Id::new(5000 + user))).await
		}));
	}

	let mut winners = Vec::new();
	for claim in claims {
		match claim.await.unwrap() {
			Ok(ticket) => winners.push(ticket.claimer_id),
			Err(TicketError::AlreadyClaimed { .. }) => (),
			Err(error) => panic!("unexpected claim error: {error}"),
		}
	}
	assert_eq!(winners.len(), 1);
	let stored = service.ticket(ticket.channel_id).await.unwrap();
	assert_eq!(stored.claimer_id, winners[0]);
}

#[tokio::test]
async fn unclaimed_tickets_can_be_claimed_again() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();

	assert!(matches!(
		service.unclaim(ticket.channel_id, &middleman(MIDDLEMAN)).await,
		Err(TicketError::NotClaimed)
	));

	service.claim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();
	service.unclaim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();
	let reclaimed = service
		.claim(ticket.channel_id, &middleman(SECOND_MIDDLEMAN))
		.await
		.unwrap();
	assert_eq!(reclaimed.state(), TicketState::Claimed(SECOND_MIDDLEMAN));
}

#[tokio::test]
async fn overrides_can_release_a_claim() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();
	service.claim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();

	let admin = Actor::new(OUTSIDER, vec![OVERRIDE_ROLE]);
	let released = service.unclaim(ticket.channel_id, &admin).await.unwrap();
	assert_eq!(released.claimer_id, None);
}

#[tokio::test]
async fn closed_tickets_are_gone() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();

	service.close(ticket.channel_id, OTHER_TRADER).await.unwrap();
	assert!(matches!(
		service.close(ticket.channel_id, OTHER_TRADER).await,
		Err(TicketError::NotFound)
	));
	assert!(matches!(
		service.claim(ticket.channel_id, &middleman(MIDDLEMAN)).await,
		Err(TicketError::NotFound)
	));
	assert_eq!(service.pending_deletions().await, 1);
}

#[tokio::test]
async fn audit_failures_do_not_stop_closing() {
	let channels = Arc::new(RecordingChannels {
		fail_audit: true,
		..RecordingChannels::default()
	});
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();

	let closed = service.close(ticket.channel_id, REQUESTER).await.unwrap();
	assert!(!closed.audit_logged);
	assert!(!service.registry().contains(ticket.channel_id).await);
	assert_eq!(service.pending_deletions().await, 1);
}

#[tokio::test]
async fn closing_without_a_log_channel_skips_the_audit() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(Settings::default(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();

	let closed = service.close(ticket.channel_id, REQUESTER).await.unwrap();
	assert!(!closed.audit_logged);
	assert!(
		!channels
			.events()
			.iter()
			.any(|event| matches!(event, ChannelEvent::AuditLogged { .. }))
	);
}

#[tokio::test(start_paused = true)]
async fn closed_channels_are_deleted_after_the_delay() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();

	service.close(ticket.channel_id, REQUESTER).await.unwrap();
	assert!(!channels.events().contains(&ChannelEvent::Deleted(ticket.channel_id)));

	tokio::time::sleep(CLOSE_DELAY + Duration::from_secs(1)).await;
	assert!(channels.events().contains(&ChannelEvent::Deleted(ticket.channel_id)));
	assert_eq!(service.pending_deletions().await, 0);
}

#[tokio::test(start_paused = true)]
async fn cancelled_deletions_never_happen() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));
	let ticket = service.create_ticket(trade_request()).await.unwrap();

	service.close(ticket.channel_id, REQUESTER).await.unwrap();
	assert_eq!(service.cancel_pending_deletions().await, 1);

	tokio::time::sleep(CLOSE_DELAY * 2).await;
	assert!(!channels.events().contains(&ChannelEvent::Deleted(ticket.channel_id)));
	assert_eq!(service.pending_deletions().await, 0);
}

#[tokio::test]
async fn accepted_trade_requests_open_a_ticket() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));

	let request = service.request_trade(Id::new(60), trade_request()).await.unwrap();
	assert!(channels.events().is_empty());
	assert_eq!(service.trade_requests().len().await, 1);

	let by_requester = service.accept_trade(request.id, REQUESTER).await;
	assert!(matches!(
		by_requester,
		Err(TicketError::PermissionDenied {
			action: TicketAction::AcceptTrade
		})
	));
	let by_outsider = service.accept_trade(request.id, OUTSIDER).await;
	assert!(matches!(by_outsider, Err(TicketError::PermissionDenied { .. })));
	assert!(channels.events().is_empty());

	let ticket = service.accept_trade(request.id, OTHER_TRADER).await.unwrap();
	assert_eq!(ticket.requester_id, REQUESTER);
	assert_eq!(ticket.other_trader_id, OTHER_TRADER);
	assert_eq!(ticket.trade_description, "Trading a dragon for 500 coins");
	assert!(service.registry().contains(ticket.channel_id).await);
	assert!(service.trade_requests().is_empty().await);

	let accepted_again = service.accept_trade(request.id, OTHER_TRADER).await;
	assert!(matches!(accepted_again, Err(TicketError::RequestNotFound)));
	assert_eq!(service.registry().len().await, 1);
}

#[tokio::test]
async fn either_trader_can_decline_a_trade_request() {
	let channels = Arc::new(RecordingChannels::default());
	let service = service_with(configured_settings(), Arc::clone(&channels));

	let first = service.request_trade(Id::new(60), trade_request()).await.unwrap();
	let second = service.request_trade(Id::new(60), trade_request()).await.unwrap();

	let by_outsider = service.decline_trade(first.id, OUTSIDER).await;
	assert!(matches!(
		by_outsider,
		Err(TicketError::PermissionDenied {
			action: TicketAction::DeclineTrade
		})
	));
	assert_eq!(service.decline_trade(first.id, OTHER_TRADER).await.unwrap().id, first.id);
	assert_eq!(service.decline_trade(second.id, REQUESTER).await.unwrap().id, second.id);

	let accept_declined = service.accept_trade(first.id, OTHER_TRADER).await;
	assert!(matches!(accept_declined, Err(TicketError::RequestNotFound)));
	assert!(channels.events().is_empty());
	assert!(service.registry().is_empty().await);
}

#[tokio::test]
async fn invalid_trade_requests_are_never_stored() {
	let service = service_with(configured_settings(), Arc::new(RecordingChannels::default()));

	let mut self_trade = trade_request();
	self_trade.other_trader_id = REQUESTER;
	let result = service.request_trade(Id::new(60), self_trade).await;
	assert!(matches!(result, Err(TicketError::InvalidTrader(InvalidTraderReason::SelfTrade))));

	let mut no_description = trade_request();
	no_description.trade_description = String::from("   ");
	let result = service.request_trade(Id::new(60), no_description).await;
	assert!(matches!(result, Err(TicketError::MissingDescription)));

	assert!(service.trade_requests().is_empty().await);
}

#[tokio::test]
async fn trade_requests_survive_failed_provisioning() {
	let channels = Arc::new(RecordingChannels {
		fail_create: true,
		..RecordingChannels::default()
	});
	let service = service_with(configured_settings(), channels);

	let request = service.request_trade(Id::new(60), trade_request()).await.unwrap();
	let result = service.accept_trade(request.id, OTHER_TRADER).await;
	assert!(matches!(result, Err(TicketError::ExternalFailure(_))));
	assert_eq!(service.trade_requests().get(request.id).await.unwrap(), request);
	assert!(service.registry().is_empty().await);
}

#[tokio::test]
async fn status_message_ticket_reflects_the_latest_state() {
	let service = service_with(configured_settings(), Arc::new(RecordingChannels::default()));
	let ticket = service.create_ticket(trade_request()).await.unwrap();
	assert!(service.status_message_ticket(ticket.channel_id).await.is_none());

	service.attach_status_message(ticket.channel_id, Id::new(900)).await.unwrap();
	let claimed = service.claim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();
	service.unclaim(ticket.channel_id, &middleman(MIDDLEMAN)).await.unwrap();

	// A redraw for the older claim must see the ticket as unclaimed.
	assert_eq!(claimed.claimer_id, Some(MIDDLEMAN));
	let (message_id, current) = service.status_message_ticket(ticket.channel_id).await.unwrap();
	assert_eq!(message_id, Id::new(900));
	assert_eq!(current.claimer_id, None);

	service.close(ticket.channel_id, REQUESTER).await.unwrap();
	assert!(service.status_message_ticket(ticket.channel_id).await.is_none());
}
