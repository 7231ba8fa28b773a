//! Booking Engine
//!
//! Availability and assignment logic for physical restaurant tables:
//!
//! - [`catalog`] - validated snapshot of the table catalog and its pair groups
//! - [`conflict`] - half-open interval overlap checks (Conflict Resolver)
//! - [`matcher`] - best single table / combinable pair selection (Table Matcher)
//! - [`scanner`] - per-day bookable slot enumeration (Slot Scanner)
//! - [`coordinator`] - the transactional write/read boundary (Booking Coordinator)
//!
//! Capacity and availability failures are expected outcomes and travel as
//! [`RejectReason`]; storage and catalog problems are faults. Retry policy
//! lives solely in the coordinator.

pub mod catalog;
pub mod conflict;
pub mod coordinator;
pub mod matcher;
pub mod scanner;

pub use catalog::{Catalog, PairGroup};
pub use matcher::{Assignment, NoMatch};

use crate::db::repository::RepoError;

/// Expected, recoverable rejection reasons.
///
/// Each carries a stable machine-readable code so the conversational layer
/// can translate rejections without re-querying the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Sufficient-capacity candidates exist but all are time-conflicted
    FullyBooked,
    /// No table or pair group can seat the party at any time
    InsufficientCapacity,
    /// end <= start, non-positive party size, or outside every service window
    InvalidWindow,
    /// Cancellation target does not exist
    ReservationNotFound,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullyBooked => "fully_booked",
            Self::InsufficientCapacity => "insufficient_capacity",
            Self::InvalidWindow => "invalid_window",
            Self::ReservationNotFound => "reservation_not_found",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<NoMatch> for RejectReason {
    fn from(no_match: NoMatch) -> Self {
        match no_match {
            NoMatch::FullyBooked => Self::FullyBooked,
            NoMatch::InsufficientCapacity => Self::InsufficientCapacity,
        }
    }
}

/// Engine error: typed rejections plus the two fault kinds
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("booking rejected: {0}")]
    Rejected(RejectReason),

    #[error("catalog inconsistency: {0}")]
    Catalog(String),

    #[error("storage fault: {0}")]
    Database(String),
}

impl EngineError {
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected(reason)
    }
}

impl From<RepoError> for EngineError {
    fn from(err: RepoError) -> Self {
        EngineError::Database(err.to_string())
    }
}

impl From<EngineError> for crate::utils::AppError {
    fn from(err: EngineError) -> Self {
        use crate::utils::AppError;
        match err {
            // reason codes travel verbatim in the response message
            EngineError::Rejected(RejectReason::ReservationNotFound) => {
                AppError::NotFound(RejectReason::ReservationNotFound.as_str().into())
            }
            EngineError::Rejected(RejectReason::InvalidWindow) => {
                AppError::Validation(RejectReason::InvalidWindow.as_str().into())
            }
            EngineError::Rejected(reason) => AppError::BusinessRule(reason.as_str().into()),
            EngineError::Catalog(msg) => AppError::Internal(format!("catalog inconsistency: {msg}")),
            EngineError::Database(msg) => AppError::Database(msg),
        }
    }
}
