// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use twilight_model::util::datetime::{Timestamp, TimestampParseError};

/// Gets a [Timestamp] object for embeds from a [DateTime].
pub fn timestamp_from_datetime(datetime: &DateTime<Utc>) -> Result<Timestamp, TimestampParseError> {
	Timestamp::from_micros(datetime.timestamp_micros())
}

/// Formats a [DateTime] as Discord timestamp markup, which each client shows in its own time zone.
pub fn discord_timestamp(datetime: &DateTime<Utc>) -> String {
	format!("<t:{}:f>", datetime.timestamp())
}
