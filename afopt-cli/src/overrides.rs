/// Manual time overrides: splice times not yet on dkr64.com into the
/// fetched snapshot, before any analysis runs. This is the only mutation the
/// snapshot ever sees; the engine itself treats its inputs as read-only.
use std::collections::HashMap;

use afopt_core::{format_time, parse_time, LeaderboardEntry, PlayerStanding, TrackVariant};

use crate::config::TimeOverride;

pub struct OverrideOutcome {
    /// Sum of rank changes across affected tracks; negative = improvement.
    pub rank_delta: i64,
    pub tracks_affected: usize,
}

/// Apply overrides to the standings and leaderboards in place.
///
/// Each override rewrites (or inserts) the player's leaderboard row, then
/// re-sorts and re-ranks the board, and updates the matching standing.
/// Overrides for unknown tracks warn and are skipped.
pub fn apply_time_overrides(
    standings: &mut [PlayerStanding],
    leaderboards: &mut HashMap<TrackVariant, Vec<LeaderboardEntry>>,
    overrides: &[TimeOverride],
    username: &str,
) -> Result<OverrideOutcome, String> {
    let mut rank_delta = 0_i64;
    let mut tracks_affected = 0_usize;

    for ovr in overrides {
        let new_time_cs = parse_time(&ovr.time)
            .map_err(|e| format!("Override for {}/{}: {e}", ovr.track, ovr.vehicle))?;
        let variant = TrackVariant {
            track_slug: ovr.track.clone(),
            vehicle: ovr.vehicle.clone(),
            category: ovr.category.clone(),
            laps: ovr.laps.clone(),
        };

        let Some(standing) = standings.iter_mut().find(|s| s.variant == variant) else {
            eprintln!("  WARNING: Override for {variant} has no matching player track");
            continue;
        };
        let Some(entries) = leaderboards.get_mut(&variant) else {
            eprintln!("  WARNING: No leaderboard for {variant}");
            continue;
        };

        let old_time = standing.time_cs;

        let player_idx = entries
            .iter()
            .position(|e| e.username.eq_ignore_ascii_case(username));
        let old_rank = match player_idx {
            Some(idx) => entries[idx].rank as i64,
            None => standing.rank as i64,
        };

        match player_idx {
            Some(idx) => entries[idx].time_cs = new_time_cs,
            None => entries.push(LeaderboardEntry {
                rank: 0,
                username: username.to_string(),
                display_name: username.to_string(),
                time_cs: new_time_cs,
                is_default: false,
            }),
        }

        resort_and_rerank(entries);

        let new_rank = entries
            .iter()
            .find(|e| e.username.eq_ignore_ascii_case(username))
            .map(|e| e.rank)
            .unwrap_or(0);

        standing.time_cs = new_time_cs;
        standing.rank = new_rank;
        standing.is_na = false;

        rank_delta += new_rank as i64 - old_rank;
        tracks_affected += 1;
        eprintln!(
            "  {variant}: {} -> {}, rank {} -> {}",
            format_time(old_time),
            format_time(new_time_cs),
            old_rank,
            new_rank
        );
    }

    Ok(OverrideOutcome {
        rank_delta,
        tracks_affected,
    })
}

/// Real entries sort by time ahead of Default Time rows; tied times share a
/// rank number, and defaults absorb the next unclaimed rank without
/// consuming it.
fn resort_and_rerank(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| (a.is_default, a.time_cs).cmp(&(b.is_default, b.time_cs)));

    let mut rank = 1_u32;
    for i in 0..entries.len() {
        if entries[i].is_default {
            entries[i].rank = rank;
        } else {
            let tied = i > 0
                && !entries[i - 1].is_default
                && entries[i - 1].time_cs == entries[i].time_cs;
            entries[i].rank = if tied { entries[i - 1].rank } else { rank };
            rank += 1;
        }
    }
}
