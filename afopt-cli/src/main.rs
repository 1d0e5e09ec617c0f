mod config;
mod output;
mod overrides;
mod parse;
mod scrape;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use afopt_core::{
    build_plan_options, compute_opportunities, compute_overtake_plan,
    compute_overtake_plan_min_tracks, format_time, LeaderboardEntry, OvertakeParams, TrackVariant,
};
use clap::Parser;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(
    name = "afopt",
    version,
    about = "Find the best time improvements for your dkr64.com Average Finish"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Fetch standings and compute improvement opportunities and overtake plans
    Run(RunArgs),
    /// Create a default config file at ~/.config/afopt/config.toml
    Init,
}

#[derive(Parser)]
struct RunArgs {
    /// Player username (overrides the config file)
    #[arg(long)]
    user: Option<String>,

    /// Clear cached pages before running
    #[arg(long)]
    clear_cache: bool,

    /// Cache TTL in hours
    #[arg(long)]
    cache_ttl: Option<f64>,

    /// Delay between requests, in milliseconds
    #[arg(long)]
    request_delay: Option<u64>,

    /// Directory for report output
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Path to config file (default: ~/.config/afopt/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show per-leaderboard fetch progress
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Init => {
            let path = config::create_default_config();
            println!("Created config at {}", path.display());
            println!("Edit it to set your username, cache TTL, and overrides.");
        }
    }
}

async fn run(args: RunArgs) {
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let username = args.user.clone().or(cfg.username).unwrap_or_else(|| {
        bail(format!(
            "No username specified. Pass --user or set it in {}",
            config_path.display()
        ));
    });
    let cache_ttl = args.cache_ttl.or(cfg.cache_ttl_hours).unwrap_or(24.0);
    let delay_ms = args.request_delay.or(cfg.request_delay_ms).unwrap_or(500);
    let output_dir = args
        .output_dir
        .clone()
        .or(cfg.output_dir.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("output"));

    let mut fetcher = scrape::Fetcher::new("cache", cache_ttl, Duration::from_millis(delay_ms))
        .unwrap_or_else(|e| bail(e));

    if args.clear_cache {
        eprintln!("Clearing cache...");
        fetcher.clear_cache().unwrap_or_else(|e| bail(e));
    }

    // Step 1: player page
    eprintln!("Fetching player page for {username}...");
    let player_html = fetcher
        .fetch(&scrape::player_url(&username))
        .await
        .unwrap_or_else(|e| bail(e))
        .unwrap_or_else(|| bail(format!("No player page found for {username}")));
    let (profile, mut standings) =
        parse::parse_player_page(&player_html).unwrap_or_else(|e| bail(e));
    eprintln!("  Combined rank: #{}", profile.combined_rank);
    let na_count = standings.iter().filter(|s| s.is_na).count();
    eprintln!(
        "  Track times: {} submitted, {} N/A",
        standings.len() - na_count,
        na_count
    );

    // Step 2: combined ranking
    eprintln!("Fetching combined ranking...");
    let ranking_html = fetcher
        .fetch(&scrape::combined_ranking_url())
        .await
        .unwrap_or_else(|e| bail(e))
        .unwrap_or_else(|| bail("Combined ranking page not found"));
    let ranking = parse::parse_combined_ranking(&ranking_html).unwrap_or_else(|e| bail(e));

    let (mut current_af, current_rank) = match ranking
        .iter()
        .find(|r| r.username.eq_ignore_ascii_case(&username))
    {
        Some(found) => {
            eprintln!("  AF: {}, Rank: #{}", found.af, found.rank);
            (found.af, found.rank)
        }
        None => {
            eprintln!(
                "  Player not found in combined ranking, using profile data: AF={}",
                profile.current_af
            );
            (profile.current_af, profile.combined_rank)
        }
    };

    // Steps 3+4: one leaderboard per variant on the player page. Variants
    // whose page doesn't exist are excluded from scope entirely.
    eprintln!("\nFetching {} leaderboards...", standings.len());
    let mut leaderboards: HashMap<TrackVariant, Vec<LeaderboardEntry>> = HashMap::new();
    let mut skipped = 0_usize;
    for (i, standing) in standings.iter().enumerate() {
        let url = scrape::leaderboard_url(&standing.variant);
        let progress = format!("[{}/{}]", i + 1, standings.len());

        match fetcher.fetch(&url).await.unwrap_or_else(|e| bail(e)) {
            Some(html) => {
                let entries = parse::parse_leaderboard(&html)
                    .unwrap_or_else(|e| bail(format!("{}: {e}", standing.variant)));
                if args.verbose {
                    let real = entries.iter().filter(|e| !e.is_default).count();
                    eprintln!("  {progress} {} - {} entries", standing.variant, real);
                }
                leaderboards.insert(standing.variant.clone(), entries);
            }
            None => {
                skipped += 1;
                if args.verbose {
                    eprintln!("  {progress} {} - n/a (no leaderboard)", standing.variant);
                }
            }
        }
    }
    eprintln!(
        "  Fetched: {} leaderboards, skipped: {} non-existent",
        leaderboards.len(),
        skipped
    );

    let total_tracks = leaderboards.len();
    eprintln!("  Track variants in scope: {total_tracks}");
    if total_tracks == 0 {
        bail("No leaderboards in scope - nothing to analyze");
    }

    // Step 4b: manual time overrides, applied before the engine sees the
    // snapshot.
    if !cfg.time_overrides.is_empty() {
        eprintln!("\nApplying {} time overrides...", cfg.time_overrides.len());
        let outcome = overrides::apply_time_overrides(
            &mut standings,
            &mut leaderboards,
            &cfg.time_overrides,
            &username,
        )
        .unwrap_or_else(|e| bail(e));
        if outcome.tracks_affected > 0 {
            let af_delta = outcome.rank_delta as f64 / total_tracks as f64;
            let old_af = current_af;
            current_af += af_delta;
            eprintln!("  AF adjusted: {old_af} -> {current_af:.3} (delta {af_delta:+.4})");
        }
    }

    // Step 5: opportunities
    eprintln!("\nComputing optimization opportunities...");
    let opportunities = compute_opportunities(&standings, &leaderboards, total_tracks, &username);

    // Step 6: overtake plans against the player one combined rank above
    let exclude: Vec<(String, String)> = cfg
        .exclude_from_plans
        .iter()
        .map(|e| (e.track.clone(), e.vehicle.clone()))
        .collect();

    let mut overtake_min_time = None;
    let mut overtake_min_tracks = None;
    if current_rank > 1 {
        if let Some(target) = ranking.iter().find(|r| r.rank == current_rank - 1) {
            eprintln!(
                "\nComputing overtake plans to beat #{} {} (AF {})...",
                target.rank, target.username, target.af
            );
            if !exclude.is_empty() {
                eprintln!("  Excluding {} track/vehicle combos from plans", exclude.len());
            }

            let plan_options =
                build_plan_options(&standings, &leaderboards, total_tracks, &username, &exclude);
            let params = OvertakeParams {
                current_af,
                target_af: target.af,
                target_username: &target.username,
            };

            let min_time = compute_overtake_plan(&plan_options, &params);
            let min_tracks = compute_overtake_plan_min_tracks(&plan_options, &params);

            if min_time.feasible {
                eprintln!(
                    "  Min time:   {} tracks, {} total improvement",
                    min_time.items.len(),
                    format_time(min_time.total_time_investment_cs)
                );
                eprintln!(
                    "  Min tracks: {} tracks, {} total improvement",
                    min_tracks.items.len(),
                    format_time(min_tracks.total_time_investment_cs)
                );
            } else {
                eprintln!("  Not enough improvement available to overtake.");
            }

            overtake_min_time = Some(min_time);
            overtake_min_tracks = Some(min_tracks);
        }
    }

    // Step 7: reports
    eprintln!("\nGenerating report...");
    let json_path = output::write_json_report(
        &output_dir,
        &profile,
        current_af,
        current_rank,
        &opportunities,
        total_tracks,
        overtake_min_time.as_ref(),
        overtake_min_tracks.as_ref(),
    )
    .unwrap_or_else(|e| bail(e));

    output::print_summary(&username, current_rank, current_af, &opportunities, &json_path);
}
