use anyhow::{Context, Result};
use charitable_gaming::analysis::{MatchSummary, ScoringEngine};
use charitable_gaming::api::models::{CharityKey, LeaderboardSize};
use charitable_gaming::api::{BackendClient, CharityBackend, Retrying};
use charitable_gaming::config::{validate_user, Config};
use charitable_gaming::display::output::{
    display_charities, display_error, display_info, display_leaderboard, display_match_history,
    display_profile, display_selection_warnings, display_success,
};
use charitable_gaming::selection::CharitySelectionController;
use charitable_gaming::session::Session;
use charitable_gaming::telemetry;
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

type Backend = Retrying<BackendClient>;

#[derive(Parser, Debug)]
#[command(name = "Charitable Gaming")]
#[command(about = "Turn your recent matches into charity points", long_about = None)]
struct Args {
    /// Backend base URL (overrides CHARITY_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// User the dashboard acts for (overrides CHARITY_USER)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Retry failed network requests this many times (default: no retries)
    #[arg(long, global = true, default_value = "0")]
    retries: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show recent matches and the charity points they earned
    Matches,

    /// List charities, optionally filtered by name
    Charities {
        /// Case-insensitive part of a charity name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Choose the charity your points go to
    Select {
        /// Charity name, as listed by `charities`
        name: String,
    },

    /// Show the players with the most charity points
    Leaderboard {
        /// Show every player instead of the top 3
        #[arg(long)]
        complete: bool,
    },

    /// Interactive charity browser (search, select, list, quit)
    Browse,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(user) = args.user {
        config.user = validate_user(&user)?;
    }

    telemetry::init(&config.log_level).context("failed to initialise logging")?;

    let session = Session::new(config.user.clone());
    let game = config.game.clone();
    let backend = Arc::new(Retrying::new(
        BackendClient::new(config),
        args.retries,
        Duration::from_millis(500),
    ));

    match args.command {
        Command::Matches => show_matches(&backend, &session, &game),
        Command::Charities { search } => show_charities(backend, session, search.as_deref()),
        Command::Select { name } => select_charity(backend, session, &name),
        Command::Leaderboard { complete } => {
            let size = if complete {
                LeaderboardSize::Complete
            } else {
                LeaderboardSize::Mini
            };
            let leaders = backend
                .fetch_leaderboard(size)
                .context("failed to fetch leaderboard")?;
            display_leaderboard(&game, &leaders);
            Ok(())
        }
        Command::Browse => browse(backend, session),
    }
}

fn show_matches(backend: &Backend, session: &Session, game: &str) -> Result<()> {
    display_info("Fetching your recent matches...");
    let history = backend
        .fetch_match_history(session)
        .context("failed to fetch match history")?;

    let scored = ScoringEngine::score_all(&history);
    let summary = MatchSummary::from_matches(&scored);
    display_match_history(game, &scored, &summary);
    Ok(())
}

/// Starts the controller and shows a spinner until both initial fetches settle.
fn load_controller(backend: Arc<Backend>, session: Session) -> CharitySelectionController<Backend> {
    let mut controller = CharitySelectionController::new(backend, session);
    controller.initialize();

    let pb = ProgressBar::new_spinner();
    pb.set_message("Loading charities");
    pb.enable_steady_tick(Duration::from_millis(100));
    controller.wait_for_load();
    pb.finish_and_clear();

    if let Some(profile) = controller.profile() {
        display_profile(profile);
    }
    controller
}

fn show_charities(backend: Arc<Backend>, session: Session, search: Option<&str>) -> Result<()> {
    let mut controller = load_controller(backend, session);
    if let Some(term) = search {
        controller.search(term);
    }
    display_charities(&controller);
    controller.dispose();
    Ok(())
}

fn select_charity(backend: Arc<Backend>, session: Session, name: &str) -> Result<()> {
    let mut controller = load_controller(backend, session);
    if let Some(e) = controller.catalog_state().error() {
        anyhow::bail!("cannot select a charity without the catalog: {}", e);
    }

    let charity = resolve_name(&controller, name);
    controller.select(charity.clone())?;
    display_success(&format!("Selected {}", charity));

    controller.wait_idle();
    let warnings = controller.take_warnings();
    if warnings.is_empty() {
        display_success("Saved to your profile");
    } else {
        display_selection_warnings(&warnings);
    }
    controller.dispose();
    Ok(())
}

// Typed names are matched case-insensitively against the catalog; anything
// else is passed through and rejected by the controller.
fn resolve_name(controller: &CharitySelectionController<Backend>, typed: &str) -> CharityKey {
    let typed = typed.trim();
    controller
        .catalog()
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(typed))
        .map(|c| c.key())
        .unwrap_or_else(|| CharityKey::new(typed))
}

fn browse(backend: Arc<Backend>, session: Session) -> Result<()> {
    let mut controller = load_controller(backend, session);
    display_charities(&controller);
    display_info("Commands: search <term>, select <name>, list, quit");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush().ok();

        let Some(line) = lines.next() else { break };
        let line = line.context("failed to read command")?;

        // Apply whatever finished while we were waiting for input.
        controller.poll();
        display_selection_warnings(&controller.take_warnings());

        let (command, rest) = match line.trim().split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "search" => {
                controller.search(rest);
                display_charities(&controller);
            }
            "select" => {
                let charity = resolve_name(&controller, rest);
                match controller.select(charity.clone()) {
                    Ok(()) => display_success(&format!("Selected {}", charity)),
                    Err(e) => display_error(&e.to_string()),
                }
            }
            "list" | "" => display_charities(&controller),
            "quit" | "exit" => break,
            other => display_error(&format!("Unknown command '{}'", other)),
        }
    }

    controller.wait_idle();
    display_selection_warnings(&controller.take_warnings());
    controller.dispose();
    Ok(())
}
