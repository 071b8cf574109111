//! Observable presentation state and the policy knobs that shape it.

use crate::error::FetchError;
use crate::types::CoinRecord;

/// What the list view renders: the current coins and the current error.
#[derive(Debug, Clone, Default)]
pub struct PresentationState {
    /// In server response order.
    pub coins: Vec<CoinRecord>,
    pub error: Option<FetchError>,
}

impl PresentationState {
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

/// How the model treats stale errors and overlapping fetches.
///
/// The default keeps both historical behaviors: a success leaves an old
/// error in place, and overlapping fetches all apply (last completion wins).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Reset `error` to `None` when a fetch succeeds.
    pub clear_error_on_success: bool,
    /// Starting a fetch cancels the one still in flight, whose result is
    /// then discarded.
    pub supersede_in_flight: bool,
}

impl RefreshPolicy {
    /// Both fixes enabled.
    pub fn strict() -> Self {
        Self {
            clear_error_on_success: true,
            supersede_in_flight: true,
        }
    }
}
