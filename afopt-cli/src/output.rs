/// Report rendering: terminal summary and the machine-readable report.json.
use std::path::{Path, PathBuf};

use afopt_core::{format_time, Efficiency, Opportunity, OvertakePlan, OvertakePlanItem};
use serde::Serialize;
use serde_json::Value;

use crate::parse::PlayerProfile;

#[derive(Serialize)]
struct JsonReport {
    metadata: JsonMetadata,
    player: JsonPlayer,
    summary: JsonSummary,
    opportunities: Vec<JsonOpportunity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overtake_min_time: Option<JsonPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overtake_min_tracks: Option<JsonPlan>,
}

#[derive(Serialize)]
struct JsonMetadata {
    generated_at: String,
    total_tracks_in_scope: usize,
}

#[derive(Serialize)]
struct JsonPlayer {
    username: String,
    country: String,
    combined_rank: u32,
    current_af: f64,
}

#[derive(Serialize)]
struct JsonSummary {
    tracks_with_times: usize,
    tracks_na: usize,
    tracks_with_improvement_possible: usize,
    tracks_at_first_place: usize,
}

#[derive(Serialize)]
struct JsonOpportunity {
    track_slug: String,
    track_name: String,
    vehicle: String,
    category: String,
    laps: String,
    current_rank: u32,
    current_time: String,
    current_time_cs: i64,
    is_na: bool,
    leaderboard_url: String,
    best_efficiency: Value,
    tiers: Vec<JsonTier>,
}

#[derive(Serialize)]
struct JsonTier {
    target_rank: u32,
    opponent_time: String,
    opponent_time_cs: i64,
    target_time: String,
    target_time_cs: i64,
    positions_gained: u32,
    af_improvement: f64,
    time_delta_cs: i64,
    time_delta: String,
    efficiency: Value,
}

#[derive(Serialize)]
struct JsonPlan {
    target_username: String,
    target_af: f64,
    current_af: f64,
    af_gap: f64,
    total_positions_needed: u32,
    total_positions_gained: u32,
    total_time_investment_cs: i64,
    total_time_investment: String,
    new_af: f64,
    feasible: bool,
    items: Vec<JsonPlanItem>,
}

#[derive(Serialize)]
struct JsonPlanItem {
    track_slug: String,
    track_name: String,
    vehicle: String,
    category: String,
    laps: String,
    is_na: bool,
    current_rank: u32,
    current_time: String,
    new_rank: u32,
    target_time: String,
    opponent_time: String,
    positions_gained: u32,
    af_improvement: f64,
    time_delta_cs: i64,
    time_delta: String,
    efficiency: Value,
    leaderboard_url: String,
}

/// Infinite efficiency serializes as the string "inf", finite as a number —
/// mixed-type on purpose, matching how consumers already read the report.
fn efficiency_value(efficiency: Efficiency) -> Value {
    match efficiency {
        Efficiency::Infinite => Value::from("inf"),
        Efficiency::Finite(v) => serde_json::json!(v),
    }
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}

/// "N/A" for the zero sentinel, formatted time otherwise.
fn time_or_na(cs: i64) -> String {
    if cs == 0 {
        "N/A".to_string()
    } else {
        format_time(cs)
    }
}

fn opportunity_json(opp: &Opportunity) -> JsonOpportunity {
    JsonOpportunity {
        track_slug: opp.variant.track_slug.clone(),
        track_name: opp.track_name.clone(),
        vehicle: opp.variant.vehicle.clone(),
        category: opp.variant.category.clone(),
        laps: opp.variant.laps.clone(),
        current_rank: opp.current_rank,
        current_time: time_or_na(opp.current_time_cs),
        current_time_cs: opp.current_time_cs,
        is_na: opp.is_na,
        leaderboard_url: opp.variant.leaderboard_url(),
        best_efficiency: efficiency_value(opp.best_efficiency),
        tiers: opp
            .tiers
            .iter()
            .map(|tier| JsonTier {
                target_rank: tier.target_rank,
                opponent_time: format_time(tier.opponent_time_cs),
                opponent_time_cs: tier.opponent_time_cs,
                target_time: format_time(tier.target_time_cs),
                target_time_cs: tier.target_time_cs,
                positions_gained: tier.positions_gained,
                af_improvement: round4(tier.af_improvement),
                time_delta_cs: tier.time_delta_cs,
                time_delta: format_time(tier.time_delta_cs),
                efficiency: efficiency_value(tier.efficiency),
            })
            .collect(),
    }
}

fn plan_item_json(item: &OvertakePlanItem) -> JsonPlanItem {
    JsonPlanItem {
        track_slug: item.variant.track_slug.clone(),
        track_name: item.track_name.clone(),
        vehicle: item.variant.vehicle.clone(),
        category: item.variant.category.clone(),
        laps: item.variant.laps.clone(),
        is_na: item.is_na,
        current_rank: item.current_rank,
        current_time: time_or_na(item.current_time_cs),
        new_rank: item.new_rank,
        target_time: format_time(item.target_time_cs),
        opponent_time: format_time(item.opponent_time_cs),
        positions_gained: item.positions_gained,
        af_improvement: round4(item.af_improvement),
        time_delta_cs: item.time_delta_cs,
        time_delta: time_or_na(item.time_delta_cs),
        efficiency: efficiency_value(item.efficiency),
        leaderboard_url: item.variant.leaderboard_url(),
    }
}

fn plan_json(plan: &OvertakePlan) -> JsonPlan {
    JsonPlan {
        target_username: plan.target_username.clone(),
        target_af: plan.target_af,
        current_af: plan.current_af,
        af_gap: round4(plan.af_gap),
        total_positions_needed: plan.total_positions_needed,
        total_positions_gained: plan.total_positions_gained,
        total_time_investment_cs: plan.total_time_investment_cs,
        total_time_investment: format_time(plan.total_time_investment_cs),
        new_af: round4(plan.new_af),
        feasible: plan.feasible,
        items: plan.items.iter().map(plan_item_json).collect(),
    }
}

/// Write report.json into `output_dir`, returning its path.
#[allow(clippy::too_many_arguments)]
pub fn write_json_report(
    output_dir: &Path,
    profile: &PlayerProfile,
    current_af: f64,
    current_rank: u32,
    opportunities: &[Opportunity],
    total_tracks: usize,
    overtake_min_time: Option<&OvertakePlan>,
    overtake_min_tracks: Option<&OvertakePlan>,
) -> Result<PathBuf, String> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Failed to create {}: {e}", output_dir.display()))?;

    let na_count = opportunities.iter().filter(|o| o.is_na).count();
    let improvable = opportunities
        .iter()
        .filter(|o| !o.is_na && !o.tiers.is_empty())
        .count();
    let at_first = opportunities
        .iter()
        .filter(|o| !o.is_na && o.tiers.is_empty())
        .count();

    let report = JsonReport {
        metadata: JsonMetadata {
            generated_at: chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
            total_tracks_in_scope: total_tracks,
        },
        player: JsonPlayer {
            username: profile.username.clone(),
            country: profile.country.clone(),
            combined_rank: current_rank,
            current_af,
        },
        summary: JsonSummary {
            tracks_with_times: improvable + at_first,
            tracks_na: na_count,
            tracks_with_improvement_possible: improvable,
            tracks_at_first_place: at_first,
        },
        opportunities: opportunities.iter().map(opportunity_json).collect(),
        overtake_min_time: overtake_min_time.map(plan_json),
        overtake_min_tracks: overtake_min_tracks.map(plan_json),
    };

    let path = output_dir.join("report.json");
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("Failed to serialize report: {e}"))?;
    std::fs::write(&path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;

    Ok(path)
}

/// Terminal summary: the headline numbers plus the top recommendations.
pub fn print_summary(
    username: &str,
    current_rank: u32,
    current_af: f64,
    opportunities: &[Opportunity],
    json_path: &Path,
) {
    let na_opps: Vec<&Opportunity> = opportunities.iter().filter(|o| o.is_na).collect();
    let ranked_opps: Vec<&Opportunity> = opportunities
        .iter()
        .filter(|o| !o.is_na && !o.tiers.is_empty())
        .collect();

    println!("\n{}", "=".repeat(60));
    println!("  Player:         {username}");
    println!("  Combined Rank:  #{current_rank}");
    println!("  Average Finish: {current_af}");
    println!(
        "  N/A tracks:     {} (submit any time for big AF boost)",
        na_opps.len()
    );
    println!("  Improvable:     {} tracks", ranked_opps.len());
    println!("{}", "=".repeat(60));

    if !na_opps.is_empty() {
        println!("\n  Top priority - submit times for:");
        for opp in na_opps.iter().take(5) {
            println!(
                "    - {} ({}/{}/{})",
                opp.track_name, opp.variant.vehicle, opp.variant.category, opp.variant.laps
            );
        }
    }

    if !ranked_opps.is_empty() {
        println!("\n  Best efficiency improvements:");
        for opp in ranked_opps.iter().take(5) {
            let tier = &opp.tiers[opp.best_tier_idx];
            println!(
                "    - {} ({}/{}/{}): rank {} -> {}, need {} faster, AF -{:.4}",
                opp.track_name,
                opp.variant.vehicle,
                opp.variant.category,
                opp.variant.laps,
                opp.current_rank,
                tier.target_rank,
                format_time(tier.time_delta_cs),
                tier.af_improvement,
            );
        }
    }

    println!("\n  JSON report: {}", json_path.display());
}
