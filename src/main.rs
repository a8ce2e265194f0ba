use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use penney_sim::card::{Combo, Deck, Matchup};
use penney_sim::config::SimulationConfig;
use penney_sim::simulation::report::render_report;
use penney_sim::simulation::{
    score, score_decks, simulate, summarize, write_deck_file, DeckError, DeckReader, ResultsFile,
    SeededDeck,
};
use std::fmt::Display;

#[derive(Parser)]
#[command(name = "penney-sim")]
#[command(about = "Penney's Game win probability simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shuffled decks and score every matchup
    Run {
        /// JSON config file; flags below override its values
        #[arg(short, long)]
        config: Option<String>,

        /// Seed for the deck shuffler (for reproducibility)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of decks to simulate
        #[arg(short, long)]
        num_decks: Option<usize>,

        /// Cards of each colour per deck
        #[arg(long)]
        half_deck: Option<usize>,

        /// Decks scored per batch
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Save the totals to this results file
        #[arg(short, long)]
        output: Option<String>,

        /// Append the generated decks to this deck file
        #[arg(long)]
        decks_out: Option<String>,
    },

    /// Score a single deck for one matchup
    Score {
        /// Deck as R/B or 0/1 symbols
        #[arg(short, long)]
        deck: String,

        /// Player 1's combo
        #[arg(long)]
        p1: String,

        /// Player 2's combo
        #[arg(long)]
        p2: String,
    },

    /// Score every matchup over the decks in a deck file
    Decks {
        /// Deck file, one "[SEED] SYMBOLS" line per deck
        file: String,

        /// Save the totals to this results file
        #[arg(short, long)]
        output: Option<String>,

        /// Decks scored per batch
        #[arg(long, default_value = "10000")]
        chunk_size: usize,
    },

    /// Add more decks to a saved run, continuing from its next unused seed
    Extend {
        /// Results file to extend (rewritten in place unless --output is given)
        results: String,

        /// Number of additional decks
        #[arg(short, long, default_value = "10000")]
        num_decks: usize,

        /// Decks scored per batch
        #[arg(long, default_value = "10000")]
        chunk_size: usize,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// Sum two results files
    Merge {
        first: String,
        second: String,

        #[arg(short, long)]
        output: String,
    },

    /// Print the win(tie) tables of a results file
    Show {
        results: String,
    },
}

fn fail(context: &str, err: impl Display) -> ! {
    eprintln!("✗ {}: {}", context, err);
    std::process::exit(1);
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "  scoring decks [{bar:40}] {pos}/{len} [{elapsed} < {eta}, {per_sec}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

fn deck_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  scoring decks {spinner} {pos} [{elapsed}, {per_sec}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seed,
            num_decks,
            half_deck,
            chunk_size,
            output,
            decks_out,
        } => {
            let mut config = match config {
                Some(path) => SimulationConfig::from_file(&path)
                    .unwrap_or_else(|e| fail(&format!("Failed to load config '{}'", path), e)),
                None => SimulationConfig::default(),
            };
            config.seed = seed.unwrap_or(config.seed);
            config.n_decks = num_decks.unwrap_or(config.n_decks);
            config.half_deck_size = half_deck.unwrap_or(config.half_deck_size);
            config.chunk_size = chunk_size.unwrap_or(config.chunk_size);
            run_simulation(&config, output.as_deref(), decks_out.as_deref());
        }
        Commands::Score { deck, p1, p2 } => score_single(&deck, &p1, &p2),
        Commands::Decks {
            file,
            output,
            chunk_size,
        } => score_deck_file(&file, output.as_deref(), chunk_size),
        Commands::Extend {
            results,
            num_decks,
            chunk_size,
            output,
        } => extend_results(&results, num_decks, chunk_size, output.as_deref()),
        Commands::Merge {
            first,
            second,
            output,
        } => merge_results(&first, &second, &output),
        Commands::Show { results } => {
            let file = ResultsFile::load(&results)
                .unwrap_or_else(|e| fail(&format!("Failed to load '{}'", results), e));
            print_results(&file);
        }
    }
}

fn print_results(file: &ResultsFile) {
    println!(
        "Decks: {} ({} cards, seeds {}..{})",
        file.decks,
        file.half_deck_size * 2,
        file.seed_start,
        file.next_seed
    );
    println!();
    println!("{}", render_report(&summarize(file.totals.totals())));
}

fn save_results(file: &ResultsFile, path: Option<&str>) {
    if let Some(path) = path {
        match file.save(path) {
            Ok(()) => println!("Results saved to: {}", path),
            Err(e) => fail(&format!("Failed to save results to '{}'", path), e),
        }
    }
}

fn run_simulation(config: &SimulationConfig, output: Option<&str>, decks_out: Option<&str>) {
    println!("\n=== Penney's Game Simulator ===\n");
    println!("Decks: {} ({} cards each)", config.n_decks, config.half_deck_size * 2);
    println!("Seed: {}", config.seed);
    println!();

    let start = std::time::Instant::now();
    let pb = progress_bar(config.n_decks);
    let mut write_error: Option<DeckError> = None;

    let result = simulate(config, |chunk: &[SeededDeck]| {
        pb.inc(chunk.len() as u64);
        if let Some(path) = decks_out {
            if write_error.is_none() {
                if let Err(e) = write_deck_file(path, chunk) {
                    write_error = Some(e);
                }
            }
        }
    });
    pb.finish_and_clear();

    if let Some(e) = write_error {
        fail("Failed to write decks", e);
    }
    let file = result.unwrap_or_else(|e| fail("Simulation failed", e));
    let elapsed = start.elapsed();

    print_results(&file);
    println!(
        "Simulation completed in {:.2?} ({:.0} decks/sec)",
        elapsed,
        config.n_decks as f64 / elapsed.as_secs_f64()
    );
    save_results(&file, output);
}

fn score_single(deck: &str, p1: &str, p2: &str) {
    let deck: Deck = deck
        .parse()
        .unwrap_or_else(|e| fail("Invalid deck", e));
    let p1: Combo = p1.parse().unwrap_or_else(|e| fail("Invalid P1 combo", e));
    let p2: Combo = p2.parse().unwrap_or_else(|e| fail("Invalid P2 combo", e));
    let matchup = Matchup::new(p1, p2).unwrap_or_else(|e| fail("Invalid matchup", e));

    let result = score(&deck, matchup);

    println!("\n=== {} ===\n", matchup);
    println!("Deck: {} ({} cards)", deck, deck.len());
    println!();
    println!("{:10} {:>8} {:>8}", "", "Tricks", "Cards");
    println!("{:-<28}", "");
    println!("{:10} {:>8} {:>8}", "Player 1", result.p1_tricks, result.p1_cards);
    println!("{:10} {:>8} {:>8}", "Player 2", result.p2_tricks, result.p2_cards);
    println!("{:10} {:>8} {:>8}", "Unclaimed", "", result.unclaimed_cards);
    println!();
    println!(
        "Tricks: {}",
        match result.trick_winner() {
            Some(p) => format!("{} wins", p),
            None => "tie".to_string(),
        }
    );
    println!(
        "Cards:  {}",
        match result.card_winner() {
            Some(p) => format!("{} wins", p),
            None => "tie".to_string(),
        }
    );
}

fn score_deck_file(path: &str, output: Option<&str>, chunk_size: usize) {
    let reader = DeckReader::open(path)
        .unwrap_or_else(|e| fail(&format!("Failed to open deck file '{}'", path), e));

    println!("\n=== Penney's Game Simulator ===\n");
    println!("Deck file: {}", path);
    println!();

    let pb = deck_spinner();
    let result = score_decks(reader, chunk_size, |chunk| pb.inc(chunk.len() as u64));
    pb.finish_and_clear();
    let file: ResultsFile =
        result.unwrap_or_else(|e: DeckError| fail(&format!("Failed to score '{}'", path), e));

    print_results(&file);
    save_results(&file, output);
}

fn extend_results(path: &str, num_decks: usize, chunk_size: usize, output: Option<&str>) {
    let mut file = ResultsFile::load(path)
        .unwrap_or_else(|e| fail(&format!("Failed to load '{}'", path), e));

    println!("\n=== Penney's Game Simulator ===\n");
    println!(
        "Extending {} ({} decks) with {} decks from seed {}",
        path, file.decks, num_decks, file.next_seed
    );
    println!();

    let pb = progress_bar(num_decks);
    let result = file.extend(num_decks, chunk_size, |chunk| pb.inc(chunk.len() as u64));
    pb.finish_and_clear();
    if let Err(e) = result {
        fail("Simulation failed", e);
    }

    print_results(&file);
    save_results(&file, Some(output.unwrap_or(path)));
}

fn merge_results(first: &str, second: &str, output: &str) {
    let mut merged = ResultsFile::load(first)
        .unwrap_or_else(|e| fail(&format!("Failed to load '{}'", first), e));
    let other = ResultsFile::load(second)
        .unwrap_or_else(|e| fail(&format!("Failed to load '{}'", second), e));

    if let Err(e) = merged.merge(&other) {
        fail("Failed to merge results", e);
    }

    print_results(&merged);
    save_results(&merged, Some(output));
}
