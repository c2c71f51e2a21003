use crate::analysis::{MatchSummary, ScoredMatch};
use crate::api::models::{Charity, LeaderboardEntry, UserProfile};
use crate::api::CharityBackend;
use crate::selection::{BranchState, CharitySelectionController, SelectionWarning};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "#")]
    number: String,
    #[tabled(rename = "match")]
    match_id: String,
    result: String,
    kills: String,
    deaths: String,
    assists: String,
    #[tabled(rename = "charity points")]
    points: String,
}

#[derive(Tabled)]
struct CharityRow {
    #[tabled(rename = "")]
    marker: String,
    name: String,
    description: String,
    founded: String,
    location: String,
}

#[derive(Tabled)]
struct LeaderRow {
    rank: String,
    player: String,
    #[tabled(rename = "charity points")]
    points: String,
}

fn plural(count: u32, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_warning(message: &str) {
    eprintln!("{} {}", "⚠️ ".yellow(), message);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_match_history(game: &str, matches: &[ScoredMatch], summary: &MatchSummary) {
    println!(
        "\n{}",
        format!("🎮 {} (Last {} matches)", game, matches.len()).bold().cyan()
    );
    println!("{}\n", "=".repeat(80).cyan());

    if matches.is_empty() {
        println!("{}", "No matches played yet.".yellow());
        return;
    }

    println!(
        "{} {} W / {} L ({:.1}% WR)   {} +{} CP\n",
        "📈 Overall:".bold(),
        summary.wins.to_string().green(),
        summary.losses().to_string().red(),
        summary.win_rate() * 100.0,
        "💚 Earned:".bold(),
        summary.total_points.to_string().green().bold()
    );

    let rows: Vec<MatchRow> = matches
        .iter()
        .enumerate()
        .map(|(idx, m)| MatchRow {
            number: format!("{}", idx + 1),
            match_id: m.match_id.clone().unwrap_or_else(|| "-".to_string()),
            result: if m.stats.win {
                "VICTORY".green().to_string()
            } else {
                "DEFEAT".red().to_string()
            },
            kills: plural(m.stats.kills, "kill"),
            deaths: plural(m.stats.deaths, "death"),
            assists: plural(m.stats.assists, "assist"),
            points: format!("+ {} CP", m.charity_points),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

fn charity_rows(charities: &[Charity], is_selected: impl Fn(&Charity) -> bool) -> Vec<CharityRow> {
    charities
        .iter()
        .map(|charity| CharityRow {
            marker: if is_selected(charity) {
                "★ Selected".green().bold().to_string()
            } else {
                String::new()
            },
            name: charity.name.clone(),
            description: charity.description.clone(),
            founded: charity
                .founded_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string()),
            location: charity.location.clone(),
        })
        .collect()
}

/// Renders the charity list the way the dashboard shows it: branch errors
/// first, then the filtered rows with the selection marked.
pub fn display_charities<B: CharityBackend>(controller: &CharitySelectionController<B>) {
    println!("\n{}", "💝 Charities List".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    if let BranchState::Failed(e) = controller.catalog_state() {
        display_error(&format!("Could not load charities: {}", e));
    }
    if let BranchState::Failed(e) = controller.profile_state() {
        display_warning(&format!("Could not load your current charity: {}", e));
    }
    if controller.catalog_state().is_loading() {
        println!("{}", "Loading...".yellow());
        return;
    }

    if !controller.search_term().is_empty() {
        println!("🔍 Search: {}\n", controller.search_term().bold());
    }

    if controller.visible().is_empty() {
        println!("{}", "No results found.".yellow());
    } else {
        let mut table = Table::new(charity_rows(controller.visible(), |c| controller.is_selected(c)));
        table.with(Style::rounded());
        println!("{}", table);
    }

    match controller.selected() {
        Some(selected) => println!("\n{} {}\n", "Your charity:".bold(), selected.as_str().green()),
        None => println!("\n{}\n", "No charity selected yet.".yellow()),
    }
}

pub fn display_profile(profile: &UserProfile) {
    let handle = profile.gamer_handle().unwrap_or("unknown player");
    let points = profile
        .charity_points()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{} {} ({} CP)", "👤".cyan(), handle.bold(), points);
}

pub fn display_selection_warnings(warnings: &[SelectionWarning]) {
    for warning in warnings {
        display_warning(&format!(
            "{} is selected here but could not be saved: {}",
            warning.charity, warning.error
        ));
    }
}

pub fn display_leaderboard(game: &str, leaders: &[LeaderboardEntry]) {
    println!("\n{}", format!("🏆 {} Leaderboard", game).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    if leaders.is_empty() {
        println!("{}", "Nobody has earned charity points yet.".yellow());
        return;
    }

    let rows: Vec<LeaderRow> = leaders
        .iter()
        .enumerate()
        .map(|(idx, leader)| LeaderRow {
            rank: format!("#{}", idx + 1),
            player: leader.player.clone(),
            points: leader.charity_points.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}
