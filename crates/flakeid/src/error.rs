use core::fmt;

/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The construction parameter a [`Error::Config`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigField {
    /// The worker identifier.
    WorkerId,
    /// The datacenter identifier.
    DatacenterId,
    /// The bit widths of the packed fields.
    Layout,
    /// The reference epoch.
    Epoch,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WorkerId => "worker_id",
            Self::DatacenterId => "datacenter_id",
            Self::Layout => "layout",
            Self::Epoch => "epoch",
        };
        fmt.write_str(name)
    }
}

/// All error variants that `flakeid` can emit.
///
/// Construction only ever fails with [`Error::Config`]. Generation fails
/// with [`Error::ClockMovedBackwards`] when the clock is observed behind the
/// last timestamp used, or [`Error::TimestampOutOfRange`] when the clock
/// cannot be represented relative to the epoch. In every generation failure
/// the generator state is left untouched, so a later call can succeed once
/// the clock recovers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A construction parameter is outside its valid range.
    #[error("invalid {field}: {reason}")]
    Config {
        /// The offending parameter.
        field: ConfigField,
        /// Why the value was rejected.
        reason: String,
    },

    /// The clock reported a time earlier than the last timestamp used to
    /// mint an ID.
    ///
    /// The generator never corrects for this. Whether to retry, pause or
    /// abort is up to the caller.
    #[error(
        "clock moved backwards, refusing to generate id for {drift} milliseconds",
        drift = .last_timestamp.saturating_sub(*.now)
    )]
    ClockMovedBackwards {
        /// Timestamp of the most recent ID, in milliseconds since the Unix
        /// epoch.
        last_timestamp: u64,
        /// The clock reading that was behind it.
        now: u64,
    },

    /// The clock reading is before the epoch, or too far past it to fit in
    /// the timestamp field.
    #[error("timestamp {timestamp} cannot be encoded relative to epoch {epoch}")]
    TimestampOutOfRange {
        /// The clock reading, in milliseconds since the Unix epoch.
        timestamp: u64,
        /// The generator epoch, in milliseconds since the Unix epoch.
        epoch: u64,
    },

    /// A thread panicked while holding the generator lock.
    ///
    /// Only reachable with the standard library mutex. With the
    /// `parking-lot` feature the lock does not poison and this variant does
    /// not exist.
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    pub(crate) fn config(field: ConfigField, reason: impl Into<String>) -> Self {
        Self::Config {
            field,
            reason: reason.into(),
        }
    }

    /// Magnitude of a backward clock jump in milliseconds, if this is a
    /// [`Error::ClockMovedBackwards`].
    pub fn drift(&self) -> Option<u64> {
        match self {
            Self::ClockMovedBackwards {
                last_timestamp,
                now,
            } => Some(last_timestamp.saturating_sub(*now)),
            _ => None,
        }
    }
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_error_reports_drift() {
        let err = Error::ClockMovedBackwards {
            last_timestamp: 1_000,
            now: 993,
        };
        assert_eq!(err.drift(), Some(7));
        assert_eq!(
            err.to_string(),
            "clock moved backwards, refusing to generate id for 7 milliseconds"
        );
    }

    #[test]
    fn clock_error_with_forward_reading_reports_zero_drift() {
        let err = Error::ClockMovedBackwards {
            last_timestamp: 1,
            now: 2,
        };
        assert_eq!(err.drift(), Some(0));
        assert_eq!(
            err.to_string(),
            "clock moved backwards, refusing to generate id for 0 milliseconds"
        );
    }

    #[test]
    fn config_error_names_field() {
        let err = Error::config(ConfigField::WorkerId, "must be at most 31, got 32");
        assert_eq!(err.to_string(), "invalid worker_id: must be at most 31, got 32");
        assert_eq!(err.drift(), None);
    }
}
