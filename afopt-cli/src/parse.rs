/// HTML record extraction for dkr64.com pages: player profile and track
/// times, per-variant leaderboards, and the combined Average Finish ranking.
use afopt_core::{parse_time, LeaderboardEntry, PlayerStanding, TrackVariant};
use scraper::{ElementRef, Html, Selector};

/// Column order of the 6 time cells in each player-page row.
const CELL_MAPPING: [(&str, &str); 6] = [
    ("car", "3-laps"),
    ("car", "1-lap"),
    ("hover", "3-laps"),
    ("hover", "1-lap"),
    ("plane", "3-laps"),
    ("plane", "1-lap"),
];

pub struct PlayerProfile {
    pub username: String,
    pub combined_rank: u32,
    pub current_af: f64,
    pub country: String,
}

pub struct CombinedRankingEntry {
    pub rank: u32,
    pub username: String,
    pub display_name: String,
    pub af: f64,
    pub gap: f64,
}

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse a player profile page, returning profile info and all track times.
pub fn parse_player_page(html: &str) -> Result<(PlayerProfile, Vec<PlayerStanding>), String> {
    let doc = Html::parse_document(html);

    let rank_el = doc
        .select(&sel("div.player-name strong.text-primary"))
        .next()
        .ok_or_else(|| "Player page: missing combined rank".to_string())?;
    let combined_rank: u32 = text_of(&rank_el)
        .trim_start_matches('#')
        .trim()
        .parse()
        .map_err(|_| "Player page: unparseable combined rank".to_string())?;

    let username = doc
        .select(&sel("ol.breadcrumb li.active"))
        .next()
        .map(|el| text_of(&el))
        .ok_or_else(|| "Player page: missing username breadcrumb".to_string())?;

    let mut country = String::new();
    if let Some(flag) = doc.select(&sel("div.player-country span.flag-icon")).next() {
        for class in flag.value().classes() {
            if let Some(code) = class.strip_prefix("flag-icon-") {
                country = code.to_string();
                break;
            }
        }
    }

    // AF from the statistics tab if available.
    let row_sel = sel("tbody tr");
    let mut current_af = 0.0;
    if let Some(standard_tab) = doc.select(&sel("#standard")).next() {
        for row in standard_tab.select(&row_sel) {
            let text = text_of(&row);
            if text.contains("Average Finish") && text.contains("Combined") {
                if let Some(af) = find_decimal(&text) {
                    current_af = af;
                    break;
                }
            }
        }
    }

    let profile = PlayerProfile {
        username,
        combined_rank,
        current_af,
        country,
    };

    // All track times from the #times tab: per track, a standard row
    // followed by a shortcut row, each carrying 6 vehicle/laps cells.
    let times_tab = doc
        .select(&sel("#times"))
        .next()
        .ok_or_else(|| "Player page: missing times tab".to_string())?;

    let h3_sel = sel("h3.h4");
    let track_link_sel = sel("td.track-image-td a");
    let cell_sel = sel("td.times-td-border-left");
    let a_sel = sel("a");
    let popover_sel = sel(".popover-body");
    let strong_sel = sel("strong");

    let mut standings = Vec::new();

    for table in times_tab.select(&sel("table.table-times")) {
        let rows: Vec<ElementRef> = table.select(&row_sel).collect();
        let mut i = 0;
        while i < rows.len() {
            let row = rows[i];
            let Some(track_el) = row.select(&h3_sel).next() else {
                i += 1;
                continue;
            };
            let track_name = text_of(&track_el);

            let track_slug = row
                .select(&track_link_sel)
                .next()
                .and_then(|link| link.value().attr("href"))
                .map(|href| {
                    href.trim_end_matches('/')
                        .rsplit('/')
                        .next()
                        .unwrap_or("")
                        .to_string()
                })
                .ok_or_else(|| format!("Player page: no track link for {track_name}"))?;

            for cat_idx in 0..2 {
                if i + cat_idx >= rows.len() {
                    break;
                }
                let cat_row = rows[i + cat_idx];
                let category = if cat_idx == 0 { "standard" } else { "shortcut" };

                for (cell_idx, cell) in cat_row.select(&cell_sel).enumerate() {
                    if cell_idx >= CELL_MAPPING.len() {
                        break;
                    }
                    let (vehicle, laps) = CELL_MAPPING[cell_idx];
                    let is_na = cell.value().classes().any(|c| c == "text-muted");

                    let mut time_cs = 0;
                    let mut rank = 0;

                    if !is_na {
                        if let Some(a_tag) = cell.select(&a_sel).next() {
                            let time_str = text_of(&a_tag);
                            time_cs = parse_time(&time_str).map_err(|e| {
                                format!(
                                    "Player page time for {track_slug} \
                                     ({vehicle}/{category}/{laps}): {e}"
                                )
                            })?;
                            rank = rank_from_popover(&cell, &popover_sel, &strong_sel);
                        }
                    }

                    standings.push(PlayerStanding {
                        variant: TrackVariant {
                            track_slug: track_slug.clone(),
                            vehicle: vehicle.to_string(),
                            category: category.to_string(),
                            laps: laps.to_string(),
                        },
                        track_name: track_name.clone(),
                        time_cs,
                        rank,
                        is_na,
                    });
                }
            }

            i += 2;
        }
    }

    Ok((profile, standings))
}

/// The rank shown in a time cell's popover: the span following the "Rank"
/// label. 0 when absent or non-numeric.
fn rank_from_popover(cell: &ElementRef, popover_sel: &Selector, strong_sel: &Selector) -> u32 {
    let Some(popover) = cell.select(popover_sel).next() else {
        return 0;
    };
    for strong in popover.select(strong_sel) {
        if !text_of(&strong).contains("Rank") {
            continue;
        }
        for sibling in strong.next_siblings() {
            if let Some(el) = ElementRef::wrap(sibling) {
                if el.value().name() == "span" {
                    return text_of(&el).parse().unwrap_or(0);
                }
            }
        }
        return 0;
    }
    0
}

/// Parse a track leaderboard page, returning all entries in page order.
/// Rows without a rank number are ties and carry the previous rank forward.
pub fn parse_leaderboard(html: &str) -> Result<Vec<LeaderboardEntry>, String> {
    let doc = Html::parse_document(html);

    let Some(table) = doc.select(&sel("table.table-striped")).next() else {
        return Ok(Vec::new());
    };

    let rank_sel = sel("th.id-field");
    let player_sel = sel("a.reset-link-color");
    let time_sel = sel("td.time-field");
    let default_icon_sel = sel(r#"i.fa-info[title="Default Time"]"#);
    let top_time_sel = sel("strong.top-time");

    let mut entries = Vec::new();
    let mut prev_rank = 0_u32;

    for row in table.select(&sel("tbody tr")) {
        let rank_text = row
            .select(&rank_sel)
            .next()
            .map(|el| text_of(&el))
            .unwrap_or_default();
        let rank = match rank_text.parse::<u32>() {
            Ok(r) => {
                prev_rank = r;
                r
            }
            Err(_) => prev_rank,
        };

        let Some(player_a) = row.select(&player_sel).next() else {
            continue;
        };
        let Some(href) = player_a.value().attr("href") else {
            continue;
        };
        let username = href
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("")
            .to_string();
        let display_name = text_of(&player_a);

        let Some(time_cell) = row.select(&time_sel).next() else {
            continue;
        };
        let is_default = time_cell.select(&default_icon_sel).next().is_some();

        let time_str = match time_cell.select(&top_time_sel).next() {
            Some(strong) => text_of(&strong),
            None => extract_time_from_cell(&time_cell).unwrap_or_default(),
        };
        if time_str.is_empty() {
            continue;
        }

        let time_cs = parse_time(&time_str)
            .map_err(|e| format!("Leaderboard row for {username}: {e}"))?;

        entries.push(LeaderboardEntry {
            rank,
            username,
            display_name,
            time_cs,
            is_default,
        });
    }

    Ok(entries)
}

/// Parse the combined Average Finish ranking page.
pub fn parse_combined_ranking(html: &str) -> Result<Vec<CombinedRankingEntry>, String> {
    let doc = Html::parse_document(html);

    let Some(table) = doc.select(&sel("table.table-striped")).next() else {
        return Ok(Vec::new());
    };

    let rank_sel = sel("th.id-field");
    let player_sel = sel("a.reset-link-color");
    let field_sel = sel("td.time-field");

    let mut entries = Vec::new();
    let mut prev_rank = 0_u32;

    for row in table.select(&sel("tbody tr")) {
        let rank_text = row
            .select(&rank_sel)
            .next()
            .map(|el| text_of(&el))
            .unwrap_or_default();
        let rank = match rank_text.parse::<u32>() {
            Ok(r) => {
                prev_rank = r;
                r
            }
            Err(_) => prev_rank,
        };

        let Some(player_a) = row.select(&player_sel).next() else {
            continue;
        };
        let Some(href) = player_a.value().attr("href") else {
            continue;
        };
        let username = href
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("")
            .to_string();
        let display_name = text_of(&player_a);

        let fields: Vec<ElementRef> = row.select(&field_sel).collect();
        let Some(af_cell) = fields.first() else {
            continue;
        };
        let Ok(af) = text_of(af_cell).parse::<f64>() else {
            continue;
        };

        let gap = fields
            .get(1)
            .and_then(|cell| find_decimal(&text_of(cell).replace(',', "")))
            .unwrap_or(0.0);

        entries.push(CombinedRankingEntry {
            rank,
            username,
            display_name,
            af,
            gap,
        });
    }

    Ok(entries)
}

/// Extract an MM:SS:CC time string from a cell, preferring direct text
/// children over the full descendant text.
fn extract_time_from_cell(cell: &ElementRef) -> Option<String> {
    for child in cell.children() {
        if let scraper::Node::Text(text) = child.value() {
            if let Some(found) = find_time_pattern(text) {
                return Some(found.to_string());
            }
        }
    }
    let full = cell.text().collect::<String>();
    find_time_pattern(&full).map(|s| s.to_string())
}

/// First `dd:dd:dd` shaped substring in `text`.
fn find_time_pattern(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.len() < 8 {
        return None;
    }
    for start in 0..=bytes.len() - 8 {
        let w = &bytes[start..start + 8];
        let matches = w[0].is_ascii_digit()
            && w[1].is_ascii_digit()
            && w[2] == b':'
            && w[3].is_ascii_digit()
            && w[4].is_ascii_digit()
            && w[5] == b':'
            && w[6].is_ascii_digit()
            && w[7].is_ascii_digit();
        if matches {
            return Some(&text[start..start + 8]);
        }
    }
    None
}

/// First decimal number (optional sign, `digits.digits`) embedded in `text`.
fn find_decimal(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let mut end = i;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
                end += 1;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                let start = if i > 0 && (bytes[i - 1] == b'-' || bytes[i - 1] == b'+') {
                    i - 1
                } else {
                    i
                };
                return text[start..end].parse().ok();
            }
            i = end;
        } else {
            i += 1;
        }
    }
    None
}
