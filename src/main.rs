use std::ops::AddAssign;

use anyhow::{Context, Result};
use clap::Parser;
use gammon_core::{
    backgammon::{wire, MatchObserver, TracingObserver},
    Color, Match, MatchConfig, Phase, WinKind,
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Plays random matches against itself, or lists the legal moves of a server snapshot.
#[derive(Parser, Debug)]
#[command(name = "gammon")]
#[command(version)]
struct Args {
    /// Points needed to win a match
    #[arg(short, long, default_value_t = 5)]
    length: u32,

    /// Seed for dice and move choice; match `i` uses `seed + i`
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of matches to play
    #[arg(short, long, default_value_t = 100)]
    matches: u64,

    /// Parse this board snapshot and print its legal moves instead of playing
    #[arg(long)]
    snapshot: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match args.snapshot.as_deref() {
        Some(line) => print_snapshot_moves(line),
        None => run_matches(&args),
    }
}

fn print_snapshot_moves(line: &str) -> Result<()> {
    let m = wire::parse_snapshot(line).context("could not parse snapshot")?;
    println!("{}", m.board());
    match m.color_to_move_next() {
        Some(color) => println!("{color} to move with {:?}", m.initial_dice()),
        None => println!("nobody to move"),
    }
    for full_move in m.legal_full_moves() {
        println!("{}", wire::encode_moves(full_move));
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
struct Stats {
    matches: [u64; 2],
    games: u64,
    wins: [[u64; 3]; 2],
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Stats) {
        self.games += other.games;
        for color in 0..2 {
            self.matches[color] += other.matches[color];
            for kind in 0..3 {
                self.wins[color][kind] += other.wins[color][kind];
            }
        }
    }
}

fn run_matches(args: &Args) -> Result<()> {
    let base_seed = args.seed.unwrap_or_else(|| rand::rng().random());
    info!(matches = args.matches, length = args.length, base_seed, "starting self-play");

    let start = std::time::Instant::now();
    let stats = (0..args.matches)
        .into_par_iter()
        .map(|i| play_match(MatchConfig::new(args.length).with_seed(base_seed.wrapping_add(i))))
        .try_reduce(Stats::default, |mut a, b| {
            a += b;
            Ok(a)
        })?;
    let duration = start.elapsed();

    println!("============================================");
    println!("Matches: {}, Games: {}, took {:?}", args.matches, stats.games, duration);
    for color in Color::ALL {
        let [normal, gammon, backgammon] = stats.wins[color_index(color)];
        println!(
            "{color}: {} matches won, games won: {normal} normal, {gammon} gammons, {backgammon} backgammons",
            stats.matches[color_index(color)]
        );
    }
    println!("============================================");
    Ok(())
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

fn kind_index(kind: WinKind) -> usize {
    match kind {
        WinKind::Normal => 0,
        WinKind::Gammon => 1,
        WinKind::Backgammon => 2,
    }
}

/// Plays one match with a random policy. Doubles are offered now and then and always taken.
fn play_match(config: MatchConfig) -> Result<Stats> {
    let mut policy = StdRng::seed_from_u64(config.seed.unwrap_or_default() ^ 0x5eed);
    let mut m = Match::with_observers(config, vec![Box::new(TracingObserver) as Box<dyn MatchObserver>]);
    let mut stats = Stats::default();

    loop {
        match m.phase() {
            Phase::MatchOver(winner) => {
                stats.matches[color_index(winner)] += 1;
                debug!(?winner, "match finished");
                return Ok(stats);
            }
            Phase::AwaitingDiceRoll(color) => {
                if m.doubling_possible(color) && policy.random_bool(0.05) {
                    m.double(color)?;
                    m.accept_open_offer(color.opponent())?;
                }
                m.roll(color)?;
            }
            Phase::MidTurn(color) => {
                let full_move = m
                    .legal_full_moves()
                    .choose(&mut policy)
                    .copied()
                    .context("mid turn without a legal move")?;
                for half_move in full_move.iter() {
                    m.execute_move(half_move.from(), half_move.to(), color)?;
                }
            }
            Phase::AwaitingCommit(color) => {
                if let Some(win) = m.board().get_winner() {
                    stats.games += 1;
                    stats.wins[color_index(win.winner)][kind_index(win.kind)] += 1;
                }
                m.commit(color)?;
            }
            phase => anyhow::bail!("self-play reached unexpected phase {phase:?}"),
        }
    }
}
