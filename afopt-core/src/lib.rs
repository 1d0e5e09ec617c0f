/// afopt-core: Pure-computation Average Finish optimizer engine.
///
/// Leaderboard standings → climb tiers → ranked opportunities → overtake
/// plans. No IO, no HTTP, no filesystem — just math. Bring your own
/// leaderboard snapshot.
///
/// Every duration is an integer count of centiseconds; the Average Finish
/// metric (mean leaderboard position across all scored track variants,
/// lower is better) is the only floating-point quantity. Inputs are treated
/// as an immutable snapshot: a computation run never mutates them, and every
/// run is a plain synchronous call.
///
/// # Quick start
///
/// ```rust
/// use std::collections::HashMap;
/// use afopt_core::{compute_opportunities, LeaderboardEntry, PlayerStanding, TrackVariant};
///
/// let variant = TrackVariant {
///     track_slug: "ancient-lake".to_string(),
///     vehicle: "car".to_string(),
///     category: "standard".to_string(),
///     laps: "3-laps".to_string(),
/// };
///
/// let entries = vec![
///     LeaderboardEntry {
///         rank: 1,
///         username: "ace".to_string(),
///         display_name: "Ace".to_string(),
///         time_cs: 9000,
///         is_default: false,
///     },
///     LeaderboardEntry {
///         rank: 2,
///         username: "you".to_string(),
///         display_name: "You".to_string(),
///         time_cs: 9200,
///         is_default: false,
///     },
/// ];
///
/// let standing = PlayerStanding {
///     variant: variant.clone(),
///     track_name: "Ancient Lake".to_string(),
///     time_cs: 9200,
///     rank: 2,
///     is_na: false,
/// };
///
/// let mut leaderboards = HashMap::new();
/// leaderboards.insert(variant, entries);
///
/// let opportunities = compute_opportunities(&[standing], &leaderboards, 1, "you");
/// assert_eq!(opportunities[0].tiers[0].target_rank, 1);
/// assert_eq!(opportunities[0].tiers[0].time_delta_cs, 201);
/// ```

pub mod constants;
pub mod opportunity;
pub mod planner;
pub mod tiers;
pub mod time;
pub mod types;

// Re-export primary public API at crate root.
pub use opportunity::compute_opportunities;
pub use planner::{
    build_plan_options, compute_overtake_plan, compute_overtake_plan_min_tracks,
    difficulty_weight, OvertakeParams, PlanOptionSet,
};
pub use tiers::derive_tiers;
pub use time::{format_time, parse_time, TimeParseError};
pub use types::{
    Efficiency, LeaderboardEntry, Opportunity, OvertakePlan, OvertakePlanItem, PlayerStanding,
    Tier, TrackVariant,
};
