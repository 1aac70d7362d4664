//! Engine configuration.
//!
//! Every field has a default so a config file only needs to name what it
//! changes. Binaries layer their own sources (files, environment) on top and
//! deserialize into [`EngineConfig`].

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{Result, ScheduleError};

/// Settings that shape how calendars are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA timezone that lecture dates and times are expressed in.
    pub timezone: String,
    /// How lecture times that fall into a DST gap are placed.
    pub dst_policy: DstPolicy,
    /// Half-width of the window around a reminder lead, in seconds.
    pub reminder_tolerance_seconds: i64,
    /// Slot length used when a caller does not ask for one.
    pub default_slot_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            dst_policy: DstPolicy::default(),
            reminder_tolerance_seconds: 30,
            default_slot_minutes: 60,
        }
    }
}

impl EngineConfig {
    /// Config for an institution in the given timezone, other fields default.
    pub fn with_timezone(timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            ..Self::default()
        }
    }

    /// Parse the configured timezone.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTimezone` if the name is not a valid IANA identifier.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| ScheduleError::InvalidTimezone(self.timezone.clone()))
    }
}
