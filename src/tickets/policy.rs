// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::model::Ticket;
use twilight_model::id::Id;
use twilight_model::id::marker::{RoleMarker, UserMarker};

/// Determines whether a user may perform a privileged action on a ticket.
///
/// The current claimer may always act. Anyone holding one of the override roles may act on any ticket, claimed or
/// not. Nobody else may act; in particular, an unclaimed ticket can only be acted on through an override role.
pub fn can_act(
	ticket: &Ticket,
	actor_id: Id<UserMarker>,
	actor_role_ids: &[Id<RoleMarker>],
	override_role_ids: &[Id<RoleMarker>],
) -> bool {
	if ticket.claimer_id == Some(actor_id) {
		return true;
	}
	actor_role_ids.iter().any(|role| override_role_ids.contains(role))
}

/// Determines whether a user holds the middleman role required to claim tickets.
///
/// This is only consulted when claiming. Losing the role afterward doesn't affect an existing claim.
pub fn has_middleman_capability(actor_role_ids: &[Id<RoleMarker>], middleman_role_id: Id<RoleMarker>) -> bool {
	actor_role_ids.contains(&middleman_role_id)
}
