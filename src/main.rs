use std::io::{self, BufRead};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use number_prefix::NumberPrefix;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom as _};
use tile_match::{
    board::Position,
    command::Command,
    engine::{GameState, Session, TapOutcome},
    rules::{DEFAULT_KINDS, DEFAULT_MOVES, DEFAULT_SIZE, Rules},
    tui,
};

#[derive(Parser, Debug)]
#[command(
    name = "tile-match",
    version,
    about = "Match-three puzzle in the terminal"
)]
struct Cli {
    #[command(flatten)]
    rules: RuleArgs,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Args, Debug)]
struct RuleArgs {
    /// Board width and height
    #[arg(long, default_value_t = DEFAULT_SIZE, global = true)]
    size: usize,
    /// Number of block colours in play
    #[arg(long, default_value_t = DEFAULT_KINDS, global = true)]
    kinds: u8,
    /// Moves per level
    #[arg(long, default_value_t = DEFAULT_MOVES, global = true)]
    moves: u32,
    /// Seed for the board generator, random when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl RuleArgs {
    fn rules(&self) -> Rules {
        Rules {
            size: self.size,
            kinds: self.kinds,
            base_moves: self.moves,
            ..Rules::default()
        }
    }

    fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play interactively (the default)
    Play,
    /// Read commands such as `tap 3 4` or `bomb` from stdin
    Script,
    /// Play random swaps and report how far they get
    Simulate {
        /// Number of games to play
        #[arg(short, long, default_value_t = 100)]
        games: u64,
        /// Give up on a game after this many attempted swaps
        #[arg(long, default_value_t = 10_000)]
        max_turns: u32,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let rules = cli.rules.rules();
    let seed = cli.rules.seed();
    log::info!("Seed {seed}, rules {rules:?}");

    match cli.mode.unwrap_or(Mode::Play) {
        Mode::Play => {
            let mut session = Session::new(rules, seed).context("invalid rules")?;
            tui::play(&mut session).context("terminal error")?;
            println!(
                "Level {}, score {}/{}",
                session.level(),
                session.score(),
                session.target()
            );
        }
        Mode::Script => script(rules, seed)?,
        Mode::Simulate { games, max_turns } => simulate(rules, seed, games, max_turns)?,
    }

    Ok(())
}

fn script(rules: Rules, seed: u64) -> anyhow::Result<()> {
    let mut session = Session::new(rules, seed).context("invalid rules")?;
    show(&session);

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            command => {
                command.apply(&mut session);
                show(&session);
            }
        }
    }

    Ok(())
}

fn show(session: &Session) {
    println!("{}", session.grid());
    println!(
        "level {}  score {}/{}  moves {}  {:?}",
        session.level(),
        session.score(),
        session.target(),
        session.moves(),
        session.state()
    );
    println!("{}", session.inventory());
    println!("{}", session.hint());
}

#[derive(Debug, Default)]
struct Totals {
    levels: u64,
    points: u64,
    cleared: u64,
    swaps: u64,
    deepest_cascade: usize,
}

fn simulate(rules: Rules, seed: u64, games: u64, max_turns: u32) -> anyhow::Result<()> {
    rules.validate().context("invalid rules")?;

    let pb = ProgressBar::new(games);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})",
        )?
        .progress_chars("=>-"),
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let mut totals = Totals::default();

    for game in 0..games {
        let mut session = Session::new(rules.clone(), rng.random())?;

        for _ in 0..max_turns {
            match session.state() {
                GameState::Playing => {}
                GameState::LevelComplete => {
                    totals.levels += 1;
                    session.next_level();
                    continue;
                }
                GameState::Paused | GameState::GameOver => break,
            }

            let size = session.grid().size();
            let a = Position::new(rng.random_range(0..size), rng.random_range(0..size));
            let neighbours = [(0, 1), (1, 0), (0, -1), (-1, 0)]
                .into_iter()
                .filter_map(|(dr, dc)| a.offset(dr, dc, size))
                .collect::<Vec<_>>();
            let Some(&b) = neighbours.choose(&mut rng) else {
                continue;
            };

            if let TapOutcome::Resolved(summary) = session.swap(a, b) {
                totals.swaps += 1;
                totals.points += summary.points as u64;
                totals.cleared += summary.cleared as u64;
                totals.deepest_cascade = totals.deepest_cascade.max(summary.rounds);
            }
        }

        log::debug!(
            "Game {game} ended on level {} with {} points",
            session.level(),
            session.score()
        );
        pb.inc(1);
    }

    pb.finish_and_clear();

    println!("games:           {games}");
    println!("levels cleared:  {}", human(totals.levels));
    println!("matching swaps:  {}", human(totals.swaps));
    println!("blocks cleared:  {}", human(totals.cleared));
    println!("points:          {}", human(totals.points));
    println!("deepest cascade: {}", totals.deepest_cascade);

    Ok(())
}

fn human(n: u64) -> String {
    match NumberPrefix::decimal(n as f64) {
        NumberPrefix::Standalone(n) => format!("{n}"),
        NumberPrefix::Prefixed(prefix, n) => format!("{n:.1}{prefix}"),
    }
}
