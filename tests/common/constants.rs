//! Shared constants for end-to-end tests
//!
//! The fixture databases are created fresh for every server, so the
//! autoincrement ids below are stable.

// ============================================================================
// Test Users
// ============================================================================

/// Main test user
pub const TEST_USER: &str = "alice";

/// Second user, for cross-user aggregates
pub const OTHER_USER: &str = "bob";

// ============================================================================
// Test Catalog IDs
// ============================================================================

/// "The Expanse", order 2, artwork "expanse.jpg"
pub const EXPANSE_SHOW_ID: i64 = 1;

/// "Andor", order 4
pub const ANDOR_SHOW_ID: i64 = 2;

/// The Expanse season 1, three episodes
pub const EXPANSE_S1_ID: i64 = 1;

/// The Expanse season 2, two episodes
pub const EXPANSE_S2_ID: i64 = 2;

/// Andor season 1, two episodes
pub const ANDOR_S1_ID: i64 = 3;

/// The Expanse S1 episodes 1..=3
pub const EXPANSE_S1_EPISODE_IDS: [i64; 3] = [1, 2, 3];

/// The Expanse S2 episodes 1..=2
pub const EXPANSE_S2_EPISODE_IDS: [i64; 2] = [4, 5];

/// Andor S1 episodes 1..=2
pub const ANDOR_S1_EPISODE_IDS: [i64; 2] = [6, 7];

/// "Arrival", order 1
pub const ARRIVAL_MOVIE_ID: i64 = 1;

/// "Dune", order 3
pub const DUNE_MOVIE_ID: i64 = 2;

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

pub const REQUEST_TIMEOUT_SECS: u64 = 5;
