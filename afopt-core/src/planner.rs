/// Overtake planning: pick per-track climbs that close an Average Finish gap
/// to a named rival.
///
/// Two modes run over one shared option table. The cost-minimizing mode is a
/// bounded multi-choice knapsack (least total time to shave, steered by a
/// difficulty weight); the track-minimizing mode is a greedy pass (fewest
/// tracks to practice). They serve different preferences and are offered
/// side by side.
use std::collections::HashMap;

use crate::constants::{DIFFICULTY_STEEPNESS, REQUIREMENT_EPSILON};
use crate::opportunity::player_position;
use crate::tiers::derive_tiers;
use crate::types::{
    Efficiency, LeaderboardEntry, OvertakePlan, OvertakePlanItem, PlayerStanding, Tier,
    TrackVariant,
};

/// Inputs shared by both planning modes.
#[derive(Debug, Clone)]
pub struct OvertakeParams<'a> {
    pub current_af: f64,
    pub target_af: f64,
    /// Label carried into the plan — never used for computation.
    pub target_username: &'a str,
}

/// One ranked variant's mutually exclusive climb options.
struct PlanGroup {
    variant: TrackVariant,
    track_name: String,
    current_rank: u32,
    current_time_cs: i64,
    /// Full climb range 1..=N, ordered by increasing positions gained.
    options: Vec<Tier>,
}

/// Per-track option sets, built once and reused by both planning modes.
pub struct PlanOptionSet {
    total_tracks: usize,
    /// N/A tracks: free, no-regret gains, always included in full by the
    /// cost-minimizing mode.
    na_items: Vec<OvertakePlanItem>,
    groups: Vec<PlanGroup>,
}

/// Build the planner inputs from the snapshot.
///
/// `exclude` lists (track_slug, vehicle) pairs to keep out of plans
/// entirely; excluded variants contribute neither groups nor N/A items.
pub fn build_plan_options(
    standings: &[PlayerStanding],
    leaderboards: &HashMap<TrackVariant, Vec<LeaderboardEntry>>,
    total_tracks: usize,
    player_username: &str,
    exclude: &[(String, String)],
) -> PlanOptionSet {
    let mut na_items = Vec::new();
    let mut groups = Vec::new();

    for standing in standings {
        let excluded = exclude.iter().any(|(track, vehicle)| {
            *track == standing.variant.track_slug && *vehicle == standing.variant.vehicle
        });
        if excluded {
            continue;
        }
        let Some(entries) = leaderboards.get(&standing.variant) else {
            continue;
        };
        if entries.is_empty() {
            continue;
        }

        if standing.is_na {
            if let Some(item) = na_plan_item(standing, entries, total_tracks) {
                na_items.push(item);
            }
            continue;
        }

        let real: Vec<&LeaderboardEntry> = entries.iter().filter(|e| !e.is_default).collect();
        let (player_rank, player_time_cs, above) =
            player_position(standing, &real, player_username);
        if above.is_empty() || player_rank <= 1 {
            continue;
        }

        let climb_range: Vec<usize> = (1..=above.len()).collect();
        let options = derive_tiers(player_time_cs, &above, total_tracks, &climb_range);
        if options.is_empty() {
            continue;
        }

        groups.push(PlanGroup {
            variant: standing.variant.clone(),
            track_name: standing.track_name.clone(),
            current_rank: player_rank,
            current_time_cs: player_time_cs,
            options,
        });
    }

    PlanOptionSet {
        total_tracks,
        na_items,
        groups,
    }
}

/// The single synthetic item for an N/A track: jump from one past the raw
/// board bottom to just below the worst real entry, at zero time cost.
fn na_plan_item(
    standing: &PlayerStanding,
    entries: &[LeaderboardEntry],
    total_tracks: usize,
) -> Option<OvertakePlanItem> {
    let worst_real = entries.iter().rev().find(|e| !e.is_default)?;

    let board_bottom = entries.last().map(|e| e.rank).unwrap_or(0);
    let effective_rank = board_bottom + 1;
    let estimated_new_rank = worst_real.rank + 1;
    let positions_gained = effective_rank.saturating_sub(estimated_new_rank);

    Some(OvertakePlanItem {
        variant: standing.variant.clone(),
        track_name: standing.track_name.clone(),
        is_na: true,
        current_rank: effective_rank,
        current_time_cs: 0,
        new_rank: estimated_new_rank,
        target_time_cs: worst_real.time_cs,
        opponent_time_cs: worst_real.time_cs,
        positions_gained,
        af_improvement: positions_gained as f64 / total_tracks as f64,
        time_delta_cs: 0,
        efficiency: Efficiency::Infinite,
    })
}

/// Exponential cost multiplier penalizing deep climbs.
///
/// 1.0 when the target equals the current rank, growing toward
/// exp(DIFFICULTY_STEEPNESS) as the target approaches rank 1: a climb to the
/// top costs far more, per centisecond, than a climb to just below the
/// current rank.
pub fn difficulty_weight(target_rank: u32, current_rank: u32) -> f64 {
    (DIFFICULTY_STEEPNESS * (1.0 - target_rank as f64 / current_rank as f64)).exp()
}

/// Positions that must be gained to close `af_gap`, over `total_tracks`
/// scored variants. 0 when the gap is already closed.
fn positions_required(af_gap: f64, total_tracks: usize) -> u32 {
    if af_gap <= 0.0 {
        return 0;
    }
    (af_gap * total_tracks as f64 + REQUIREMENT_EPSILON).ceil() as u32
}

/// Cost-minimizing overtake plan: the cheapest combination of at most one
/// climb per ranked variant whose gains, together with the always-included
/// N/A items, meet the requirement.
///
/// Costs entering the search are difficulty-weighted; the reported
/// investment sums raw centiseconds only.
pub fn compute_overtake_plan(options: &PlanOptionSet, params: &OvertakeParams) -> OvertakePlan {
    let af_gap = params.current_af - params.target_af;
    let needed = positions_required(af_gap, options.total_tracks);

    // Already ahead: nothing to do.
    if needed == 0 {
        return assemble(options, params, af_gap, 0, Vec::new(), true);
    }

    let mut items: Vec<OvertakePlanItem> = options.na_items.clone();
    let na_gained: u32 = items.iter().map(|i| i.positions_gained).sum();
    if na_gained >= needed {
        return assemble(options, params, af_gap, needed, items, true);
    }
    let remaining = needed - na_gained;

    let max_total: u32 = options
        .groups
        .iter()
        .map(|g| group_max_gain(g))
        .sum();
    if max_total < remaining {
        // Not enough board to climb even taking every group's biggest
        // option: infeasible, no search.
        return assemble(options, params, af_gap, needed, items, false);
    }

    for (group_idx, option_idx) in knapsack_min_cost(&options.groups, remaining, max_total) {
        let group = &options.groups[group_idx];
        items.push(ranked_plan_item(group, &group.options[option_idx]));
    }

    assemble(options, params, af_gap, needed, items, true)
}

/// Track-minimizing overtake plan: one candidate per ranked variant — the
/// climb with the best difficulty-adjusted return, not the largest raw
/// climb — consumed in descending gain order until the requirement is met.
///
/// Provably non-optimal on time; optimal-ish on the number of tracks to
/// practice. On exhaustion the full consumed set is returned with
/// `feasible = false`.
pub fn compute_overtake_plan_min_tracks(
    options: &PlanOptionSet,
    params: &OvertakeParams,
) -> OvertakePlan {
    let af_gap = params.current_af - params.target_af;
    let needed = positions_required(af_gap, options.total_tracks);

    if needed == 0 {
        return assemble(options, params, af_gap, 0, Vec::new(), true);
    }

    let mut candidates: Vec<OvertakePlanItem> = options.na_items.clone();
    for group in &options.groups {
        let best = group.options.iter().max_by(|a, b| {
            let return_a =
                a.positions_gained as f64 / difficulty_weight(a.target_rank, group.current_rank);
            let return_b =
                b.positions_gained as f64 / difficulty_weight(b.target_rank, group.current_rank);
            return_a.total_cmp(&return_b)
        });
        if let Some(tier) = best {
            candidates.push(ranked_plan_item(group, tier));
        }
    }

    candidates.sort_by(|a, b| b.positions_gained.cmp(&a.positions_gained));

    let mut items = Vec::new();
    let mut gained = 0_u32;
    for candidate in candidates {
        if gained >= needed {
            break;
        }
        gained += candidate.positions_gained;
        items.push(candidate);
    }

    let feasible = gained >= needed;
    assemble(options, params, af_gap, needed, items, feasible)
}

fn group_max_gain(group: &PlanGroup) -> u32 {
    group
        .options
        .iter()
        .map(|t| t.positions_gained)
        .max()
        .unwrap_or(0)
}

/// Bounded multi-choice knapsack over "positions gained so far": at most one
/// option per group, minimizing difficulty-weighted cost subject to a gain
/// floor. Overshooting the floor is allowed when cheaper.
///
/// One flat cost row plus one choice row per group, indexed by gain count;
/// the choice rows drive backtracking in reverse group order.
///
/// # Panics
///
/// Panics if no state reaches the floor. The caller verifies attainability
/// beforehand, so that branch means the option table is corrupt.
fn knapsack_min_cost(groups: &[PlanGroup], required: u32, max_total: u32) -> Vec<(usize, usize)> {
    let states = max_total as usize + 1;
    let mut cost = vec![f64::INFINITY; states];
    cost[0] = 0.0;

    // choices[g][s]: option taken at group g to arrive at state s, if any;
    // None means the state carried through unchanged.
    let mut choices: Vec<Vec<Option<usize>>> = Vec::with_capacity(groups.len());

    for group in groups {
        let mut next_cost = cost.clone();
        let mut choice_row = vec![None; states];

        for state in 0..states {
            if cost[state].is_infinite() {
                continue;
            }
            for (option_idx, option) in group.options.iter().enumerate() {
                let weight = difficulty_weight(option.target_rank, group.current_rank);
                let candidate = cost[state] + option.time_delta_cs as f64 * weight;
                let landing = state + option.positions_gained as usize;
                if candidate < next_cost[landing] {
                    next_cost[landing] = candidate;
                    choice_row[landing] = Some(option_idx);
                }
            }
        }

        cost = next_cost;
        choices.push(choice_row);
    }

    let mut best_state = None;
    let mut best_cost = f64::INFINITY;
    for state in required as usize..states {
        if cost[state] < best_cost {
            best_cost = cost[state];
            best_state = Some(state);
        }
    }
    let Some(mut state) = best_state else {
        panic!(
            "overtake knapsack found no state covering {required} positions \
             after the attainability check passed"
        );
    };

    let mut picks = Vec::new();
    for (group_idx, choice_row) in choices.iter().enumerate().rev() {
        if let Some(option_idx) = choice_row[state] {
            picks.push((group_idx, option_idx));
            state -= groups[group_idx].options[option_idx].positions_gained as usize;
        }
    }
    debug_assert_eq!(state, 0, "knapsack backtrack did not return to the origin");
    picks
}

fn ranked_plan_item(group: &PlanGroup, tier: &Tier) -> OvertakePlanItem {
    OvertakePlanItem {
        variant: group.variant.clone(),
        track_name: group.track_name.clone(),
        is_na: false,
        current_rank: group.current_rank,
        current_time_cs: group.current_time_cs,
        new_rank: tier.target_rank,
        target_time_cs: tier.target_time_cs,
        opponent_time_cs: tier.opponent_time_cs,
        positions_gained: tier.positions_gained,
        af_improvement: tier.af_improvement,
        time_delta_cs: tier.time_delta_cs,
        efficiency: tier.efficiency,
    }
}

/// Plan bookkeeping: totals, resulting AF, and the gain-descending item
/// order.
fn assemble(
    options: &PlanOptionSet,
    params: &OvertakeParams,
    af_gap: f64,
    needed: u32,
    mut items: Vec<OvertakePlanItem>,
    feasible: bool,
) -> OvertakePlan {
    let total_gained: u32 = items.iter().map(|i| i.positions_gained).sum();
    let total_investment: i64 = items
        .iter()
        .filter(|i| !i.is_na)
        .map(|i| i.time_delta_cs)
        .sum();
    items.sort_by(|a, b| b.af_improvement.total_cmp(&a.af_improvement));

    OvertakePlan {
        target_username: params.target_username.to_string(),
        target_af: params.target_af,
        current_af: params.current_af,
        af_gap,
        total_positions_needed: needed,
        total_positions_gained: total_gained,
        total_time_investment_cs: total_investment,
        new_af: params.current_af - total_gained as f64 / options.total_tracks as f64,
        items,
        feasible,
    }
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

    fn default_entry(rank: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            username: format!("default{rank}"),
            display_name: format!("Default {rank}"),
            time_cs: 20000,
            is_default: true,
        }
    }

    fn tier(target_rank: u32, positions_gained: u32, time_delta_cs: i64) -> Tier {
        Tier {
            target_rank,
            opponent_time_cs: 10000 - time_delta_cs,
            target_time_cs: 10000 - time_delta_cs - 1,
            positions_gained,
            af_improvement: positions_gained as f64 / 10.0,
            time_delta_cs,
            efficiency: Efficiency::Finite(
                positions_gained as f64 / 10.0 / time_delta_cs as f64,
            ),
        }
    }

    fn group(slug: &str, current_rank: u32, options: Vec<Tier>) -> PlanGroup {
        PlanGroup {
            variant: variant(slug),
            track_name: slug.to_string(),
            current_rank,
            current_time_cs: 10000,
            options,
        }
    }

    fn option_set(na_items: Vec<OvertakePlanItem>, groups: Vec<PlanGroup>) -> PlanOptionSet {
        PlanOptionSet {
            total_tracks: 10,
            na_items,
            groups,
        }
    }

    fn params<'a>(current_af: f64, target_af: f64) -> OvertakeParams<'a> {
        OvertakeParams {
            current_af,
            target_af,
            target_username: "rival",
        }
    }

    #[test]
    fn test_difficulty_weight_is_one_for_zero_climb() {
        assert!((difficulty_weight(10, 10) - 1.0).abs() < 1e-12);
        assert!((difficulty_weight(3, 3) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_difficulty_weight_grows_toward_rank_one() {
        let w9 = difficulty_weight(9, 10);
        let w5 = difficulty_weight(5, 10);
        let w1 = difficulty_weight(1, 10);
        assert!(w9 > 1.0);
        assert!(w5 > w9);
        assert!(w1 > w5);
        // Full climb from rank 10 to rank 1 approaches exp(K).
        assert!((w1 - (DIFFICULTY_STEEPNESS * 0.9).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_requirement_ceiling() {
        assert_eq!(positions_required(0.25, 10), 3); // 2.5 -> 3
        // A dead-even gap is a tie; one extra position breaks it.
        assert_eq!(positions_required(0.25, 12), 4);
        assert_eq!(positions_required(0.0, 10), 0);
        assert_eq!(positions_required(-0.5, 10), 0);
    }

    #[test]
    fn test_closed_gap_is_trivially_feasible() {
        let set = option_set(Vec::new(), vec![group("a", 5, vec![tier(4, 1, 100)])]);
        let plan = compute_overtake_plan(&set, &params(4.0, 4.5));
        assert!(plan.feasible);
        assert!(plan.items.is_empty());
        assert_eq!(plan.total_positions_needed, 0);
        assert_eq!(plan.total_time_investment_cs, 0);
    }

    /// End-to-end through `build_plan_options`: a 3-position requirement met
    /// by an N/A track worth +2 and one ranked climb worth +1 for 50cs.
    #[test]
    fn test_na_plus_single_ranked_tier() {
        let mut leaderboards = HashMap::new();
        // N/A variant: worst real at rank 2, placeholders at 3 and 4 below
        // it — submitting anything gains 2 positions for free.
        leaderboards.insert(
            variant("na-track"),
            vec![
                entry(1, "a", 9000),
                entry(2, "b", 9500),
                default_entry(3),
                default_entry(4),
            ],
        );
        // Ranked variant: +1 position for 50cs.
        leaderboards.insert(
            variant("ranked"),
            vec![entry(1, "a", 10001), entry(2, "me", 10050)],
        );

        let standings = [
            standing("na-track", 0, 0, true),
            standing("ranked", 10050, 2, false),
        ];
        let set = build_plan_options(&standings, &leaderboards, 10, "me", &[]);

        // Gap of 0.25 over 10 tracks: 3 positions required.
        let plan = compute_overtake_plan(&set, &params(5.0, 4.75));

        assert!(plan.feasible);
        assert_eq!(plan.total_positions_needed, 3);
        assert_eq!(plan.total_positions_gained, 3);
        assert_eq!(plan.total_time_investment_cs, 50);
        assert_eq!(plan.items.len(), 2);

        let ranked_item = plan.items.iter().find(|i| !i.is_na).unwrap();
        assert_eq!(ranked_item.positions_gained, 1);
        assert_eq!(ranked_item.time_delta_cs, 50);
        assert_eq!(ranked_item.new_rank, 1);

        assert!((plan.new_af - 4.7).abs() < 1e-9);
    }

    #[test]
    fn test_na_gains_alone_short_circuit() {
        let mut leaderboards = HashMap::new();
        leaderboards.insert(
            variant("na-track"),
            vec![
                entry(1, "a", 9000),
                default_entry(2),
                default_entry(3),
                default_entry(4),
            ],
        );
        leaderboards.insert(
            variant("ranked"),
            vec![entry(1, "a", 9000), entry(2, "me", 10000)],
        );

        let standings = [
            standing("na-track", 0, 0, true),
            standing("ranked", 10000, 2, false),
        ];
        let set = build_plan_options(&standings, &leaderboards, 10, "me", &[]);

        // 2 positions required, the N/A track alone grants 3.
        let plan = compute_overtake_plan(&set, &params(5.0, 4.85));
        assert!(plan.feasible);
        assert_eq!(plan.items.len(), 1);
        assert!(plan.items[0].is_na);
        assert_eq!(plan.total_positions_gained, 3);
        assert_eq!(plan.total_time_investment_cs, 0);
    }

    #[test]
    fn test_infeasible_requirement_returns_na_only_without_search() {
        let na = OvertakePlanItem {
            variant: variant("na-track"),
            track_name: "na-track".to_string(),
            is_na: true,
            current_rank: 4,
            current_time_cs: 0,
            new_rank: 3,
            target_time_cs: 9500,
            opponent_time_cs: 9500,
            positions_gained: 1,
            af_improvement: 0.1,
            time_delta_cs: 0,
            efficiency: Efficiency::Infinite,
        };
        let set = option_set(
            vec![na],
            vec![
                group("a", 5, vec![tier(4, 1, 100), tier(3, 2, 300)]),
                group("b", 4, vec![tier(3, 1, 200)]),
            ],
        );

        // 10 required; 1 (N/A) + at most 3 (groups) falls short.
        let plan = compute_overtake_plan(&set, &params(5.0, 4.05));
        assert!(!plan.feasible);
        assert_eq!(plan.items.len(), 1);
        assert!(plan.items[0].is_na);
        assert_eq!(plan.total_positions_gained, 1);
        assert_eq!(plan.total_time_investment_cs, 0);
    }

    #[test]
    fn test_knapsack_prefers_cheap_small_climbs() {
        // 2 positions required. One deep climb on track a (+2) is raw-cheap
        // but difficulty-weighted expensive; two shallow climbs win.
        let set = option_set(
            Vec::new(),
            vec![
                group("a", 10, vec![tier(9, 1, 100), tier(1, 2, 300)]),
                group("b", 10, vec![tier(9, 1, 100)]),
            ],
        );
        let plan = compute_overtake_plan(&set, &params(5.0, 4.85));

        assert!(plan.feasible);
        assert_eq!(plan.total_positions_gained, 2);
        assert_eq!(plan.items.len(), 2);
        assert!(plan.items.iter().all(|i| i.positions_gained == 1));
        assert_eq!(plan.total_time_investment_cs, 200);
    }

    #[test]
    fn test_knapsack_reports_raw_investment() {
        // A single group forced to its deep option: the difficulty weight
        // steers the search but the reported cost stays raw.
        let set = option_set(Vec::new(), vec![group("a", 10, vec![tier(1, 2, 300)])]);
        let plan = compute_overtake_plan(&set, &params(5.0, 4.85));
        assert!(plan.feasible);
        assert_eq!(plan.total_time_investment_cs, 300);
    }

    #[test]
    fn test_knapsack_matches_brute_force() {
        let groups = vec![
            group("a", 8, vec![tier(7, 1, 120), tier(5, 3, 500), tier(2, 6, 900)]),
            group("b", 5, vec![tier(4, 1, 80), tier(3, 2, 260), tier(1, 4, 400)]),
            group("c", 12, vec![tier(11, 1, 40), tier(9, 3, 700), tier(6, 6, 2000)]),
            group("d", 3, vec![tier(2, 1, 150), tier(1, 2, 220)]),
        ];

        for required in 1..=10_u32 {
            let max_total: u32 = groups.iter().map(group_max_gain).sum();
            let picks = knapsack_min_cost(&groups, required, max_total);

            // At most one option per group.
            let mut seen_groups: Vec<usize> = picks.iter().map(|&(g, _)| g).collect();
            seen_groups.sort_unstable();
            seen_groups.dedup();
            assert_eq!(seen_groups.len(), picks.len());

            let gain: u32 = picks
                .iter()
                .map(|&(g, o)| groups[g].options[o].positions_gained)
                .sum();
            assert!(gain >= required, "required {required}, gained {gain}");

            let weighted = |g: usize, o: usize| {
                let opt = &groups[g].options[o];
                opt.time_delta_cs as f64
                    * difficulty_weight(opt.target_rank, groups[g].current_rank)
            };
            let dp_cost: f64 = picks.iter().map(|&(g, o)| weighted(g, o)).sum();

            // Brute force over every combination of skip-or-pick-one.
            let mut best = f64::INFINITY;
            let counts: Vec<usize> = groups.iter().map(|g| g.options.len() + 1).collect();
            let mut selection = vec![0_usize; groups.len()];
            loop {
                let mut gain = 0_u32;
                let mut cost = 0.0;
                for (g, &pick) in selection.iter().enumerate() {
                    if pick > 0 {
                        gain += groups[g].options[pick - 1].positions_gained;
                        cost += weighted(g, pick - 1);
                    }
                }
                if gain >= required && cost < best {
                    best = cost;
                }

                let mut idx = 0;
                loop {
                    if idx == selection.len() {
                        break;
                    }
                    selection[idx] += 1;
                    if selection[idx] < counts[idx] {
                        break;
                    }
                    selection[idx] = 0;
                    idx += 1;
                }
                if idx == selection.len() {
                    break;
                }
            }

            assert!(
                (dp_cost - best).abs() < 1e-6,
                "required {required}: dp {dp_cost}, brute force {best}"
            );
        }
    }

    #[test]
    fn test_min_tracks_meets_requirement_with_fewest_items() {
        let na = OvertakePlanItem {
            variant: variant("na-track"),
            track_name: "na-track".to_string(),
            is_na: true,
            current_rank: 6,
            current_time_cs: 0,
            new_rank: 4,
            target_time_cs: 9500,
            opponent_time_cs: 9500,
            positions_gained: 2,
            af_improvement: 0.2,
            time_delta_cs: 0,
            efficiency: Efficiency::Infinite,
        };
        let set = option_set(
            vec![na],
            vec![
                group("a", 5, vec![tier(2, 3, 900)]),
                group("b", 5, vec![tier(3, 2, 400)]),
            ],
        );

        // 4 required: the +3 candidate then the +2 N/A suffice.
        let plan = compute_overtake_plan_min_tracks(&set, &params(5.0, 4.65));
        assert!(plan.feasible);
        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.total_positions_gained, 5);
        // Only the ranked climb costs time.
        assert_eq!(plan.total_time_investment_cs, 900);
    }

    #[test]
    fn test_min_tracks_candidate_maximizes_adjusted_return() {
        // Raw gains prefer the deep climb, but its difficulty weight from
        // rank 10 to rank 1 crushes the return; the shallow climb is the
        // group's candidate.
        let deep = tier(1, 9, 200);
        let shallow = tier(9, 1, 200);
        let set = option_set(Vec::new(), vec![group("a", 10, vec![shallow, deep])]);

        let plan = compute_overtake_plan_min_tracks(&set, &params(5.0, 4.95));
        assert!(plan.feasible);
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].positions_gained, 1);
        assert_eq!(plan.items[0].new_rank, 9);
    }

    /// Infeasibility: 10 positions required, 6 attainable — the greedy plan
    /// returns the best attainable subset, never an error.
    #[test]
    fn test_min_tracks_exhaustion_returns_best_attainable() {
        let set = option_set(
            Vec::new(),
            vec![
                group("a", 5, vec![tier(2, 3, 900)]),
                group("b", 4, vec![tier(2, 2, 500)]),
                group("c", 3, vec![tier(2, 1, 100)]),
            ],
        );

        let plan = compute_overtake_plan_min_tracks(&set, &params(5.0, 4.05));
        assert!(!plan.feasible);
        assert_eq!(plan.total_positions_needed, 10);
        assert_eq!(plan.total_positions_gained, 6);
        assert_eq!(plan.items.len(), 3);
        assert_eq!(plan.total_time_investment_cs, 1500);
    }

    #[test]
    fn test_exclude_removes_variant_from_plans() {
        let mut leaderboards = HashMap::new();
        leaderboards.insert(
            variant("keep"),
            vec![entry(1, "a", 9000), entry(2, "me", 10000)],
        );
        leaderboards.insert(
            variant("drop"),
            vec![entry(1, "a", 9000), entry(2, "me", 10000)],
        );

        let standings = [
            standing("keep", 10000, 2, false),
            standing("drop", 10000, 2, false),
        ];
        let exclude = vec![("drop".to_string(), "car".to_string())];
        let set = build_plan_options(&standings, &leaderboards, 10, "me", &exclude);

        assert_eq!(set.groups.len(), 1);
        assert_eq!(set.groups[0].variant.track_slug, "keep");
    }

    #[test]
    fn test_plan_items_sorted_by_af_improvement() {
        let set = option_set(
            Vec::new(),
            vec![
                group("small", 5, vec![tier(4, 1, 100)]),
                group("big", 5, vec![tier(2, 3, 200)]),
            ],
        );
        let plan = compute_overtake_plan(&set, &params(5.0, 4.62));
        assert!(plan.feasible);
        assert_eq!(plan.items.len(), 2);
        assert!(plan.items[0].af_improvement >= plan.items[1].af_improvement);
        assert_eq!(plan.items[0].variant.track_slug, "big");
    }
}
