//! Headless match-3 runner (default binary).
//!
//! Plays one level to completion with seeded random move selection and
//! reports what happened, either as human-readable lines or as JSON objects
//! for replay tooling. The same `--seed` always replays the same game.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use tracing_subscriber::EnvFilter;

use tilematch::core::SimpleRng;
use tilematch::engine::{GameSession, SessionEvent, SessionGoal, SessionStatus, SwapError};
use tilematch::level::{load_level, LevelSpec, RoundRecordDto};

/// Board regenerations allowed per run before giving up
const MAX_RESHUFFLES: u32 = 3;

const USAGE: &str = "\
tilematch - play one match-3 level headlessly

USAGE:
    tilematch [OPTIONS]

OPTIONS:
    --level FILE    level JSON file (built-in level when omitted)
    --seed N        session seed (default 1)
    --moves N       override the level's move budget
    --json          emit JSON lines instead of text
    --verbose       debug-level logs to stderr
    -h, --help      print this help
";

#[derive(Debug, Clone, PartialEq, Eq)]
struct DriverConfig {
    level: Option<PathBuf>,
    seed: u32,
    moves: Option<u32>,
    json: bool,
    verbose: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            level: None,
            seed: 1,
            moves: None,
            json: false,
            verbose: false,
        }
    }
}

/// `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<DriverConfig>> {
    let mut config = DriverConfig::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--level" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --level"))?;
                config.level = Some(PathBuf::from(v));
            }
            "--seed" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --seed"))?;
                config.seed = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --seed value: {}", v))?;
            }
            "--moves" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --moves"))?;
                let moves = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --moves value: {}", v))?;
                if moves == 0 {
                    return Err(anyhow!("--moves must be positive"));
                }
                config.moves = Some(moves);
            }
            "--json" => config.json = true,
            "--verbose" => config.verbose = true,
            "--help" | "-h" => return Ok(None),
            other => {
                return Err(anyhow!("unknown argument: {}", other));
            }
        }
        i += 1;
    }
    Ok(Some(config))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Logs go to stderr so --json output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_args(&args)? {
        Some(config) => config,
        None => {
            print!("{}", USAGE);
            return Ok(());
        }
    };
    init_tracing(config.verbose);
    run(&config)
}

fn run(config: &DriverConfig) -> Result<()> {
    let spec = match &config.level {
        Some(path) => load_level(path)?,
        None => LevelSpec::default_level(),
    };
    let mut rules = spec.rules()?;
    if let Some(moves) = config.moves {
        rules.moves = moves;
    }

    if !config.json {
        println!(
            "level {} ({}): {}x{}, {} moves, target {}, seed {}",
            spec.id,
            spec.name.as_deref().unwrap_or("unnamed"),
            rules.rows,
            rules.cols,
            rules.moves,
            rules.target_score,
            config.seed
        );
    }

    let mut session = GameSession::new(rules, config.seed);
    // A separate stream for move picking keeps the session's refills
    // byte-identical to a replay that feeds the same swaps directly.
    let mut pick_rng = SimpleRng::new(config.seed.wrapping_add(0x5EED));

    while session.status() == SessionStatus::Playing {
        if !session.has_moves() {
            if session.reshuffles() >= MAX_RESHUFFLES {
                bail!("no legal moves after {} reshuffles", session.reshuffles());
            }
            session.reshuffle();
            if let Some(SessionEvent::Reshuffled { attempts, fallback }) = session.take_last_event()
            {
                if !config.json {
                    println!("reshuffled (attempts {}, fallback {})", attempts, fallback);
                }
            }
            continue;
        }

        let moves = session.possible_moves();
        let pick = pick_rng.next_range(moves.len() as u32) as usize;
        let (from, to) = (moves[pick].from, moves[pick].to);

        match session.request_swap(from, to) {
            Ok(outcome) => {
                if config.json {
                    let rounds: Vec<RoundRecordDto> =
                        outcome.rounds.iter().map(RoundRecordDto::from).collect();
                    let line = serde_json::json!({
                        "move": session.moves_made(),
                        "from": { "row": from.row, "col": from.col },
                        "to": { "row": to.row, "col": to.col },
                        "gained": outcome.gained,
                        "total": outcome.total,
                        "rounds": rounds,
                    });
                    println!("{}", line);
                } else {
                    println!(
                        "move {}: ({},{})<->({},{}) settled in {} round(s), +{} -> {}",
                        session.moves_made(),
                        from.row,
                        from.col,
                        to.row,
                        to.col,
                        outcome.rounds.len(),
                        outcome.gained,
                        outcome.total
                    );
                }
            }
            Err(SwapError::CascadeOverflow { rounds }) => {
                if session.reshuffles() >= MAX_RESHUFFLES {
                    bail!("cascade still running after {} rounds, reshuffles exhausted", rounds);
                }
                if !config.json {
                    println!("cascade overflow after {} rounds, reshuffling", rounds);
                }
                session.reshuffle();
                let _ = session.take_last_event();
            }
            Err(err) => bail!("swap rejected: {}", err.message()),
        }
    }

    report(&session, config);
    Ok(())
}

fn report(session: &GameSession, config: &DriverConfig) {
    let status = match session.status() {
        SessionStatus::Completed => "completed",
        SessionStatus::Failed => "failed",
        SessionStatus::Playing => "playing",
    };
    if config.json {
        let line = serde_json::json!({
            "status": status,
            "seed": session.seed(),
            "score": session.score(),
            "stars": session.stars(),
            "movesMade": session.moves_made(),
            "movesRemaining": session.moves_remaining(),
            "reshuffles": session.reshuffles(),
        });
        println!("{}", line);
        return;
    }

    println!(
        "{}: score {} ({} stars), {} moves made, {} remaining, {} reshuffles",
        status,
        session.score(),
        session.stars(),
        session.moves_made(),
        session.moves_remaining(),
        session.reshuffles()
    );
    for progress in session.goal_progress() {
        let mark = if progress.done { "done" } else { "open" };
        match progress.goal {
            SessionGoal::Score { target } => {
                println!("  goal score {}/{} [{}]", progress.current, target, mark);
            }
            SessionGoal::Collect { kind, target } => {
                println!(
                    "  goal collect {} {}/{} [{}]",
                    kind.as_str(),
                    progress.current,
                    target,
                    mark
                );
            }
        }
    }
}
