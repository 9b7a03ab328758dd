//! The two-tier polling cadence.
//!
//! Every watched file starts on the [`PollTier::Normal`] cadence. The first
//! time a modification is observed, the file is promoted to
//! [`PollTier::Fast`] and stays there for the rest of its watch lifetime;
//! there is no demotion. Edits tend to arrive in bursts, so the first edit
//! pays the coarse-interval latency and every subsequent edit in the burst
//! is caught at the fast cadence.
//!
//! A file that is deleted and later re-created starts over as a fresh entry
//! on the normal tier.

use std::time::Duration;

use sw_core::FAST_POLL_INTERVAL_MS;

/// Polling interval for fast-tier files.
///
/// Not configurable; see [`sw_core::FAST_POLL_INTERVAL_MS`].
pub const FAST_POLL_INTERVAL: Duration = Duration::from_millis(FAST_POLL_INTERVAL_MS);

/// The polling tier of a watched file.
///
/// Two states with a single one-way transition, `Normal → Fast`, applied by
/// [`WatchRegistry::escalate`](crate::WatchRegistry::escalate) on the first
/// observed modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollTier {
    /// Coarse cadence for files that have not changed since registration.
    Normal,
    /// Fine cadence for files that have been observed changing.
    Fast,
}

impl PollTier {
    /// Returns the polling interval for this tier.
    ///
    /// The normal-tier interval is configurable; the fast-tier interval is
    /// the fixed [`FAST_POLL_INTERVAL`].
    #[inline]
    #[must_use]
    pub const fn interval(self, normal: Duration) -> Duration {
        match self {
            Self::Normal => normal,
            Self::Fast => FAST_POLL_INTERVAL,
        }
    }

    /// Returns `true` if this is the fast tier.
    #[inline]
    #[must_use]
    pub const fn is_fast(self) -> bool {
        matches!(self, Self::Fast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_tier_uses_configured_interval() {
        let normal = Duration::from_millis(2000);
        assert_eq!(PollTier::Normal.interval(normal), normal);
    }

    #[test]
    fn test_fast_tier_ignores_configured_interval() {
        let normal = Duration::from_millis(2000);
        assert_eq!(PollTier::Fast.interval(normal), FAST_POLL_INTERVAL);
    }

    #[test]
    fn test_is_fast() {
        assert!(!PollTier::Normal.is_fast());
        assert!(PollTier::Fast.is_fast());
    }
}
