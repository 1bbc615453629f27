//! Core data model.
//!
//! A run drives one queue shape with a fixed number of workers. Each worker
//! takes one item, transforms it, and puts it back. Reports carry only the
//! aggregates that do not depend on scheduling order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value every queue item starts with.
pub const SEED_VALUE: u64 = 1;

/// Number of items the list-backed queue is seeded with.
pub const LIST_SEED_ITEMS: usize = 1000;

// ---------------------------------------------------------------------------
// Worker count
// ---------------------------------------------------------------------------

/// Number of concurrent workers for a run. Never below [`WorkerCount::MIN`].
///
/// Deserializing goes through [`WorkerCount::clamped`] like the CLI does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64")]
pub struct WorkerCount(usize);

impl WorkerCount {
    pub const MIN: usize = 100;

    /// Raise `requested` to [`WorkerCount::MIN`] if it falls short.
    pub fn clamped(requested: i64) -> Self {
        let n = usize::try_from(requested).unwrap_or(0);
        Self(n.max(Self::MIN))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl From<i64> for WorkerCount {
    fn from(requested: i64) -> Self {
        Self::clamped(requested)
    }
}

impl std::fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Run identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short display: first 8 chars of UUID
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Which queue shape a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Growable list plus read cursor, one lock around each worker's turn.
    List,
    /// Bounded channel, no external lock.
    Channel,
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Variant::List => "list",
            Variant::Channel => "channel",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Variant::List),
            "channel" => Ok(Variant::Channel),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Worker state
// ---------------------------------------------------------------------------

/// Lifecycle of a single worker. Every worker ends in `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Spawned,
    /// Holding the lock, or holding an item taken from the channel.
    AcquiredAccess,
    Mutated,
    ReleasedAccess,
    Completed,
}

impl WorkerState {
    /// Can transition from self to `to`?
    pub fn can_transition_to(self, to: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, to),
            (Spawned, AcquiredAccess)
                | (Spawned, Completed)  // channel closed and empty
                | (AcquiredAccess, Mutated)
                | (Mutated, ReleasedAccess)
                | (ReleasedAccess, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WorkerState::Completed)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkerState::Spawned => "spawned",
            WorkerState::AcquiredAccess => "acquired_access",
            WorkerState::Mutated => "mutated",
            WorkerState::ReleasedAccess => "released_access",
            WorkerState::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for WorkerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spawned" => Ok(WorkerState::Spawned),
            "acquired_access" => Ok(WorkerState::AcquiredAccess),
            "mutated" => Ok(WorkerState::Mutated),
            "released_access" => Ok(WorkerState::ReleasedAccess),
            "completed" => Ok(WorkerState::Completed),
            other => Err(format!("unknown worker state: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Final state of a list-backed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListReport {
    pub workers: usize,
    pub seed_items: usize,
    /// Final read cursor. Equals `workers`.
    pub cursor: usize,
    /// Final queue length. Equals `seed_items + workers`.
    pub length: usize,
}

/// Final state of a channel-backed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub workers: usize,
    pub capacity: usize,
    /// Items drained from the channel after it was closed.
    pub remaining_items: usize,
    /// Sum of `value - SEED_VALUE` over the remaining items.
    pub total_increments: u64,
    /// Largest channel length any worker observed after reinserting.
    pub peak_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Outcome {
    List(ListReport),
    Channel(ChannelReport),
}

/// Everything known about a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: Outcome,
}

impl RunReport {
    pub fn variant(&self) -> Variant {
        match self.outcome {
            Outcome::List(_) => Variant::List,
            Outcome::Channel(_) => Variant::Channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_clamps_to_minimum() {
        assert_eq!(WorkerCount::clamped(50).get(), 100);
        assert_eq!(WorkerCount::clamped(-1).get(), 100);
        assert_eq!(WorkerCount::clamped(100).get(), 100);
        assert_eq!(WorkerCount::clamped(2500).get(), 2500);
    }

    #[test]
    fn worker_count_deserializes_through_clamp() {
        let low: WorkerCount = serde_json::from_str("5").unwrap();
        assert_eq!(low.get(), WorkerCount::MIN);
        let negative: WorkerCount = serde_json::from_str("-20").unwrap();
        assert_eq!(negative.get(), WorkerCount::MIN);
        let high: WorkerCount = serde_json::from_str("750").unwrap();
        assert_eq!(high.get(), 750);
        assert_eq!(serde_json::to_string(&high).unwrap(), "750");
    }

    #[test]
    fn worker_state_display_roundtrips_through_from_str() {
        for state in [
            WorkerState::Spawned,
            WorkerState::AcquiredAccess,
            WorkerState::Mutated,
            WorkerState::ReleasedAccess,
            WorkerState::Completed,
        ] {
            assert_eq!(state.to_string().parse::<WorkerState>(), Ok(state));
        }
        assert!("running".parse::<WorkerState>().is_err());
    }

    #[test]
    fn worker_lifecycle_only_moves_forward() {
        use WorkerState::*;
        assert!(Spawned.can_transition_to(AcquiredAccess));
        assert!(Spawned.can_transition_to(Completed));
        assert!(ReleasedAccess.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Spawned));
        assert!(!Mutated.can_transition_to(AcquiredAccess));
        assert!(Completed.is_terminal());
        assert!(!ReleasedAccess.is_terminal());
    }

    #[test]
    fn outcome_serializes_with_variant_tag() {
        let outcome = Outcome::List(ListReport {
            workers: 100,
            seed_items: LIST_SEED_ITEMS,
            cursor: 100,
            length: 1100,
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["variant"], "list");
        assert_eq!(json["length"], 1100);
    }
}
