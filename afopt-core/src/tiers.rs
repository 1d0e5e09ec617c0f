/// Tier derivation: which positions above the player are reachable on one
/// variant, and what each climb costs.
use crate::types::{Efficiency, LeaderboardEntry, Tier};

/// Derive climb tiers for one variant.
///
/// `above` is the ordered sub-list of real (non-placeholder) entries ranked
/// better than the player, furthest ahead first. Each requested climb size
/// `n` targets the entry exactly `n` array positions ahead of the player —
/// by position, not rank number, so tied competitors remain individually
/// climbable. `climb_sizes` must be in increasing order; sizes beyond the
/// above-set clamp to it and duplicates after clamping are computed once.
///
/// A tier whose computed investment is not positive is dropped without
/// comment: rank ties and stale snapshots can produce nominal targets the
/// player's recorded time already beats.
pub fn derive_tiers(
    player_time_cs: i64,
    above: &[&LeaderboardEntry],
    total_tracks: usize,
    climb_sizes: &[usize],
) -> Vec<Tier> {
    let mut tiers = Vec::new();
    let mut last_climb = 0_usize;

    for &requested in climb_sizes {
        let climb = requested.min(above.len());
        if climb == 0 {
            break;
        }
        if climb == last_climb {
            continue;
        }
        last_climb = climb;

        let target = above[above.len() - climb];
        let target_time_cs = target.time_cs - 1;
        let time_delta = player_time_cs - target_time_cs;
        if time_delta <= 0 {
            continue;
        }

        let af_improvement = climb as f64 / total_tracks as f64;
        tiers.push(Tier {
            target_rank: target.rank,
            opponent_time_cs: target.time_cs,
            target_time_cs,
            positions_gained: climb as u32,
            af_improvement,
            time_delta_cs: time_delta,
            efficiency: Efficiency::Finite(af_improvement / time_delta as f64),
        });
    }

    tiers
}
