/// Per-variant opportunity building and aggregate ranking.
use std::collections::HashMap;

use crate::constants::TIER_TARGETS;
use crate::tiers::derive_tiers;
use crate::types::{
    Efficiency, LeaderboardEntry, Opportunity, PlayerStanding, Tier, TrackVariant,
};

/// Compute ranked improvement opportunities across every variant the player
/// has data for.
///
/// Variants missing from `leaderboards` have no board at all — they are
/// outside the scoring scope and skipped entirely, not treated as zero
/// positions. The result is sorted by best efficiency descending, infinite
/// (N/A) opportunities first; zero-tier opportunities are retained and sort
/// last.
pub fn compute_opportunities(
    standings: &[PlayerStanding],
    leaderboards: &HashMap<TrackVariant, Vec<LeaderboardEntry>>,
    total_tracks: usize,
    player_username: &str,
) -> Vec<Opportunity> {
    let mut opportunities = Vec::new();

    for standing in standings {
        let Some(entries) = leaderboards.get(&standing.variant) else {
            continue;
        };
        if entries.is_empty() {
            continue;
        }

        let opportunity = if standing.is_na {
            na_opportunity(standing, entries, total_tracks)
        } else {
            existing_time_opportunity(standing, entries, total_tracks, player_username)
        };
        opportunities.push(opportunity);
    }

    opportunities.sort_by(|a, b| b.best_efficiency.total_cmp(&a.best_efficiency));
    opportunities
}

/// The player's rank, time, and above-set on one board.
///
/// Prefers the player's own row, found by case-insensitive username match in
/// the real entries; the above-set is then everything before that row. If
/// the row is missing despite the player having a time, the supplied
/// standing is trusted and the above-set is rebuilt from strictly faster
/// entries.
pub(crate) fn player_position<'a>(
    standing: &PlayerStanding,
    real: &[&'a LeaderboardEntry],
    player_username: &str,
) -> (u32, i64, Vec<&'a LeaderboardEntry>) {
    match real
        .iter()
        .position(|e| e.username.eq_ignore_ascii_case(player_username))
    {
        Some(idx) => (real[idx].rank, real[idx].time_cs, real[..idx].to_vec()),
        None => {
            let above = real
                .iter()
                .filter(|e| e.time_cs < standing.time_cs)
                .copied()
                .collect();
            (standing.rank, standing.time_cs, above)
        }
    }
}

/// A track with no recorded time.
///
/// The player's effective position is one past the raw board bottom.
/// Submitting any time at all is modeled as landing just below the worst
/// real entry, leapfrogging the span of Default Time placeholders in
/// between — which makes the single synthetic tier free and infinitely
/// efficient.
fn na_opportunity(
    standing: &PlayerStanding,
    entries: &[LeaderboardEntry],
    total_tracks: usize,
) -> Opportunity {
    let worst_real = entries.iter().rev().find(|e| !e.is_default);

    let Some(worst_real) = worst_real else {
        // A board of placeholders only: nothing to analyze.
        return Opportunity {
            variant: standing.variant.clone(),
            track_name: standing.track_name.clone(),
            current_rank: 0,
            current_time_cs: 0,
            is_na: true,
            tiers: Vec::new(),
            best_efficiency: Efficiency::Finite(0.0),
            best_tier_idx: 0,
        };
    };

    // Caller guarantees entries is non-empty.
    let board_bottom = entries.last().map(|e| e.rank).unwrap_or(0);
    let effective_rank = board_bottom + 1;
    let estimated_new_rank = worst_real.rank + 1;
    let positions_gained = effective_rank.saturating_sub(estimated_new_rank);
    let af_improvement = positions_gained as f64 / total_tracks as f64;

    let tier = Tier {
        target_rank: estimated_new_rank,
        opponent_time_cs: worst_real.time_cs,
        target_time_cs: worst_real.time_cs,
        positions_gained,
        af_improvement,
        time_delta_cs: 0,
        efficiency: Efficiency::Infinite,
    };

    Opportunity {
        variant: standing.variant.clone(),
        track_name: standing.track_name.clone(),
        current_rank: effective_rank,
        current_time_cs: 0,
        is_na: true,
        tiers: vec![tier],
        best_efficiency: Efficiency::Infinite,
        best_tier_idx: 0,
    }
}

fn existing_time_opportunity(
    standing: &PlayerStanding,
    entries: &[LeaderboardEntry],
    total_tracks: usize,
    player_username: &str,
) -> Opportunity {
    let real: Vec<&LeaderboardEntry> = entries.iter().filter(|e| !e.is_default).collect();
    let (player_rank, player_time_cs, above) = player_position(standing, &real, player_username);

    if above.is_empty() || player_rank <= 1 {
        // Already first place, or nobody ahead: no improvement possible.
        return Opportunity {
            variant: standing.variant.clone(),
            track_name: standing.track_name.clone(),
            current_rank: player_rank,
            current_time_cs: player_time_cs,
            is_na: false,
            tiers: Vec::new(),
            best_efficiency: Efficiency::Finite(0.0),
            best_tier_idx: 0,
        };
    }

    let tiers = derive_tiers(player_time_cs, &above, total_tracks, &TIER_TARGETS);
    let (best_efficiency, best_tier_idx) = best_tier(&tiers);

    Opportunity {
        variant: standing.variant.clone(),
        track_name: standing.track_name.clone(),
        current_rank: player_rank,
        current_time_cs: player_time_cs,
        is_na: false,
        tiers,
        best_efficiency,
        best_tier_idx,
    }
}

/// Index and efficiency of the best tier; first wins ties, and a fully
/// dropped tier set leaves the efficiency at 0.
fn best_tier(tiers: &[Tier]) -> (Efficiency, usize) {
    let mut best = Efficiency::Finite(0.0);
    let mut best_idx = 0;

    for (idx, tier) in tiers.iter().enumerate() {
        if tier.efficiency.total_cmp(&best) == std::cmp::Ordering::Greater {
            best = tier.efficiency;
            best_idx = idx;
        }
    }

    (best, best_idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(slug: &str) -> TrackVariant {
        TrackVariant {
            track_slug: slug.to_string(),
            vehicle: "car".to_string(),
            category: "standard".to_string(),
            laps: "3-laps".to_string(),
        }
    }

    fn standing(slug: &str, time_cs: i64, rank: u32, is_na: bool) -> PlayerStanding {
        PlayerStanding {
            variant: variant(slug),
            track_name: slug.to_string(),
            time_cs,
            rank,
            is_na,
        }
    }

    fn entry(rank: u32, username: &str, time_cs: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            username: username.to_string(),
            display_name: username.to_string(),
            time_cs,
            is_default: false,
        }
    }

    fn default_entry(rank: u32, time_cs: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            username: format!("default{rank}"),
            display_name: format!("Default {rank}"),
            time_cs,
            is_default: true,
        }
    }

    #[test]
    fn test_na_track_leapfrogs_placeholder_span() {
        // Worst real entry at rank 3, two Default Time rows below it: the
        // unranked player sits at effective rank 6 and submitting lands at 4.
        let entries = vec![
            entry(1, "a", 9000),
            entry(2, "b", 9100),
            entry(3, "c", 9200),
            default_entry(4, 20000),
            default_entry(5, 20000),
        ];
        let mut leaderboards = HashMap::new();
        leaderboards.insert(variant("lake"), entries);

        let opps =
            compute_opportunities(&[standing("lake", 0, 0, true)], &leaderboards, 10, "me");
        assert_eq!(opps.len(), 1);
        let opp = &opps[0];
        assert!(opp.is_na);
        assert_eq!(opp.current_rank, 6);
        assert_eq!(opp.tiers.len(), 1);
        assert_eq!(opp.tiers[0].target_rank, 4);
        assert_eq!(opp.tiers[0].positions_gained, 2);
        assert_eq!(opp.tiers[0].time_delta_cs, 0);
        assert!(opp.tiers[0].efficiency.is_infinite());
        assert!(opp.best_efficiency.is_infinite());
    }

    #[test]
    fn test_na_track_without_real_entries_has_no_tiers() {
        let mut leaderboards = HashMap::new();
        leaderboards.insert(variant("lake"), vec![default_entry(1, 20000)]);

        let opps =
            compute_opportunities(&[standing("lake", 0, 0, true)], &leaderboards, 10, "me");
        assert_eq!(opps.len(), 1);
        assert!(opps[0].tiers.is_empty());
    }

    #[test]
    fn test_missing_leaderboard_excludes_variant() {
        let leaderboards = HashMap::new();
        let opps =
            compute_opportunities(&[standing("lake", 9000, 3, false)], &leaderboards, 10, "me");
        assert!(opps.is_empty());
    }

    #[test]
    fn test_rank_one_yields_zero_tiers() {
        let entries = vec![entry(1, "me", 9000), entry(2, "b", 9100)];
        let mut leaderboards = HashMap::new();
        leaderboards.insert(variant("lake"), entries);

        let opps =
            compute_opportunities(&[standing("lake", 9000, 1, false)], &leaderboards, 10, "me");
        assert_eq!(opps.len(), 1);
        assert!(opps[0].tiers.is_empty());
        assert_eq!(opps[0].best_efficiency.value(), Some(0.0));
    }

    #[test]
    fn test_player_located_case_insensitively() {
        let entries = vec![entry(1, "a", 9000), entry(2, "MyName", 9500)];
        let mut leaderboards = HashMap::new();
        leaderboards.insert(variant("lake"), entries);

        let opps = compute_opportunities(
            &[standing("lake", 9500, 2, false)],
            &leaderboards,
            10,
            "myname",
        );
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].current_rank, 2);
        assert_eq!(opps[0].tiers.len(), 1);
        assert_eq!(opps[0].tiers[0].target_rank, 1);
    }

    #[test]
    fn test_fallback_when_player_missing_from_board() {
        // Player claims rank 3 at 9300 but has no row; the above-set is
        // rebuilt from strictly faster entries.
        let entries = vec![entry(1, "a", 9000), entry(2, "b", 9200), entry(3, "c", 9400)];
        let mut leaderboards = HashMap::new();
        leaderboards.insert(variant("lake"), entries);

        let opps = compute_opportunities(
            &[standing("lake", 9300, 3, false)],
            &leaderboards,
            10,
            "me",
        );
        assert_eq!(opps.len(), 1);
        let opp = &opps[0];
        assert_eq!(opp.current_rank, 3);
        assert_eq!(opp.current_time_cs, 9300);
        // Two entries are faster than 9300; the nearest is rank 2.
        assert_eq!(opp.tiers[0].target_rank, 2);
        assert_eq!(opp.tiers[0].time_delta_cs, 9300 - 9199);
    }

    #[test]
    fn test_aggregate_sorted_infinite_first_then_efficiency() {
        let mut leaderboards = HashMap::new();
        // N/A board with a placeholder below the worst real entry.
        leaderboards.insert(
            variant("na-track"),
            vec![entry(1, "a", 9000), default_entry(2, 20000)],
        );
        // Cheap climb: +1 for 101cs.
        leaderboards.insert(
            variant("cheap"),
            vec![entry(1, "a", 9900), entry(2, "me", 10000)],
        );
        // Expensive climb: +1 for 1001cs.
        leaderboards.insert(
            variant("dear"),
            vec![entry(1, "a", 9000), entry(2, "me", 10000)],
        );
        // No improvement possible.
        leaderboards.insert(variant("done"), vec![entry(1, "me", 9000)]);

        let standings = [
            standing("done", 9000, 1, false),
            standing("dear", 10000, 2, false),
            standing("cheap", 10000, 2, false),
            standing("na-track", 0, 0, true),
        ];
        let opps = compute_opportunities(&standings, &leaderboards, 10, "me");

        assert_eq!(opps.len(), 4);
        assert_eq!(opps[0].variant.track_slug, "na-track");
        assert!(opps[0].best_efficiency.is_infinite());
        assert_eq!(opps[1].variant.track_slug, "cheap");
        assert_eq!(opps[2].variant.track_slug, "dear");
        assert_eq!(opps[3].variant.track_slug, "done");
        assert!(opps[3].tiers.is_empty());
    }

    #[test]
    fn test_best_tier_prefers_max_efficiency() {
        // Nearest climb is mispriced expensive; the bigger jump wins best.
        let entries = vec![
            entry(1, "a", 9998),
            entry(2, "b", 9999),
            entry(3, "me", 10000),
        ];
        let mut leaderboards = HashMap::new();
        leaderboards.insert(variant("lake"), entries);

        let opps = compute_opportunities(
            &[standing("lake", 10000, 3, false)],
            &leaderboards,
            10,
            "me",
        );
        let opp = &opps[0];
        assert_eq!(opp.tiers.len(), 2);
        // +1 for 2cs vs +2 for 3cs: 0.05 vs ~0.066 per cs — the +2 tier wins.
        assert_eq!(opp.best_tier_idx, 1);
    }
}
