use std::path::PathBuf;

use clap::Parser;

use triad_bench::config::HarnessConfig;
use triad_bench::harness::Harness;
use triad_bench::logging::init_logging;

/// Self-play harness for the move solver.
#[derive(Debug, Parser)]
#[command(
    name = "triad-bench",
    author,
    version,
    about = "Deterministic self-play harness for the triad move solver"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/harness.yaml")]
    config: PathBuf,

    /// Override the run identifier.
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of matches played against each opponent.
    #[arg(long, value_name = "COUNT")]
    matches: Option<usize>,

    /// Override the RNG seed for deck draws and rollouts.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no matches are played).
    #[arg(long)]
    validate_only: bool,

    /// Log at debug level unless RUST_LOG overrides it.
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = HarnessConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.matches.per_opponent = matches;
    }

    if let Some(seed) = cli.seed {
        config.matches.seed = Some(seed);
    }

    config.validate()?;

    let run_id = config.run_id.clone();
    let opponent_count = config.opponents.len();
    let per_opponent = config.matches.per_opponent;
    println!(
        "Loaded configuration '{run_id}' with {opponent_count} opponent{} ({per_opponent} matches each)",
        if opponent_count == 1 { "" } else { "s" }
    );

    let harness = Harness::new(config)?;

    if cli.validate_only {
        println!("Validation-only mode: no matches played.");
        return Ok(());
    }

    let report = harness.run()?;

    println!(
        "Run '{run_id}' complete: {} matches recorded",
        report.matches_recorded
    );
    for block in &report.opponents {
        println!(
            "  vs {}: {}/{} won ({:.0}%), next-match prediction {:.2}",
            block.name,
            block.wins,
            block.matches,
            block.realized_rate * 100.0,
            block.predicted_next
        );
        if let Some(profile) = &block.profile {
            println!(
                "    profile: win rate {:.2}, avg think {:.0}ms, {} preferred cards",
                profile.win_rate_against,
                profile.average_think_time_ms,
                profile.preferred_cards.len()
            );
            if let Some(distribution) = profile.position_distribution() {
                let favorite = distribution
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .map(|(pos, share)| (pos, *share));
                if let Some((pos, share)) = favorite {
                    println!("    favorite cell: {pos} ({:.0}% of moves)", share * 100.0);
                }
            }
        }
    }
    if !report.top_cards.is_empty() {
        let ranked: Vec<String> = report
            .top_cards
            .iter()
            .map(|(card, score)| format!("{card} ({score:.2})"))
            .collect();
        println!("  top learned cards: {}", ranked.join(", "));
    }
    if let Some(path) = &report.export_path {
        println!("History export: {}", path.display());
    }

    Ok(())
}
