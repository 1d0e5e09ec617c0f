use std::cmp::Ordering;
use std::fmt;

/// Identity key for one scored track variant.
///
/// A variant is the atomic unit of ranking: the same track scored separately
/// per vehicle, category, and lap count. The "total tracks in scope"
/// denominator of the Average Finish metric is the number of distinct
/// variants that actually have a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackVariant {
    pub track_slug: String,
    /// car, hover, plane
    pub vehicle: String,
    /// standard, shortcut
    pub category: String,
    /// 3-laps, 1-lap
    pub laps: String,
}

impl TrackVariant {
    pub fn leaderboard_url(&self) -> String {
        format!(
            "https://www.dkr64.com/tracks/{}/{}/{}/{}",
            self.track_slug, self.vehicle, self.category, self.laps
        )
    }
}

impl fmt::Display for TrackVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.track_slug, self.vehicle, self.category, self.laps
        )
    }
}

/// The player's recorded state on one track variant. Immutable input —
/// the engine never mutates standings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerStanding {
    pub variant: TrackVariant,
    pub track_name: String,
    /// Centiseconds; 0 when `is_na`.
    pub time_cs: i64,
    /// 1 = best; 0 when unranked.
    pub rank: u32,
    pub is_na: bool,
}

/// One row of a variant's leaderboard, in page order (non-decreasing rank,
/// ties sharing a rank number).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    pub display_name: String,
    pub time_cs: i64,
    /// Synthetic "Default Time" placeholder row. Excluded from competitive
    /// analysis, retained in the raw list for context.
    pub is_default: bool,
}

/// Average Finish improvement per centisecond of time investment.
///
/// `Infinite` is the dedicated sentinel for N/A tracks, where any submitted
/// time at all counts as the improvement. It sorts ahead of every finite
/// value, so going from unranked to ranked always dominates shaving time off
/// an existing run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Efficiency {
    Infinite,
    Finite(f64),
}

impl Efficiency {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Efficiency::Infinite)
    }

    /// The finite value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Efficiency::Finite(v) => Some(*v),
            Efficiency::Infinite => None,
        }
    }

    /// Total order: `Infinite` above every finite value, finite values by
    /// `f64::total_cmp`.
    pub fn total_cmp(&self, other: &Efficiency) -> Ordering {
        match (self, other) {
            (Efficiency::Infinite, Efficiency::Infinite) => Ordering::Equal,
            (Efficiency::Infinite, Efficiency::Finite(_)) => Ordering::Greater,
            (Efficiency::Finite(_), Efficiency::Infinite) => Ordering::Less,
            (Efficiency::Finite(a), Efficiency::Finite(b)) => a.total_cmp(b),
        }
    }
}

/// One candidate leaderboard-climb outcome on a single variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tier {
    /// Rank taken over if the climb lands.
    pub target_rank: u32,
    /// The opponent's recorded time at that rank.
    pub opponent_time_cs: i64,
    /// Time the player must achieve: the opponent's time minus one
    /// centisecond (strictly beating, not tying).
    pub target_time_cs: i64,
    pub positions_gained: u32,
    /// positions_gained / total tracks in scope.
    pub af_improvement: f64,
    /// Required improvement: current time minus target time.
    pub time_delta_cs: i64,
    pub efficiency: Efficiency,
}

/// One variant's full tier set plus the best pick.
///
/// Tiers are ordered by increasing positions gained. An empty tier set means
/// no improvement is possible: the player is already rank 1, the board has
/// nobody above them, or every nominal target was dropped as inconsistent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opportunity {
    pub variant: TrackVariant,
    pub track_name: String,
    pub current_rank: u32,
    /// 0 for N/A tracks.
    pub current_time_cs: i64,
    pub is_na: bool,
    pub tiers: Vec<Tier>,
    pub best_efficiency: Efficiency,
    pub best_tier_idx: usize,
}

/// One selected climb inside an overtake plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OvertakePlanItem {
    pub variant: TrackVariant,
    pub track_name: String,
    pub is_na: bool,
    pub current_rank: u32,
    pub current_time_cs: i64,
    pub new_rank: u32,
    pub target_time_cs: i64,
    pub opponent_time_cs: i64,
    pub positions_gained: u32,
    pub af_improvement: f64,
    pub time_delta_cs: i64,
    pub efficiency: Efficiency,
}

/// A cross-variant selection of climbs sufficient to overtake a rival,
/// at most one per variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OvertakePlan {
    /// Label only — never used for computation.
    pub target_username: String,
    pub target_af: f64,
    pub current_af: f64,
    pub af_gap: f64,
    pub total_positions_needed: u32,
    pub total_positions_gained: u32,
    /// Ranked items only; N/A tracks cost nothing.
    pub total_time_investment_cs: i64,
    pub new_af: f64,
    pub items: Vec<OvertakePlanItem>,
    pub feasible: bool,
}
