use clap::Parser;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use vote_tally::formats::parse_election;
use vote_tally::model::ElectionKind;
use vote_tally::report;
use vote_tally::tabulator::tabulate;

#[derive(Parser)]
#[clap(name = "vote-tally", about = "Tabulate IR and OPL election files")]
struct Opts {
    /// Election file; reads standard input when omitted.
    path: Option<PathBuf>,
    /// Seed for tie-break randomness, for reproducible runs.
    #[clap(long)]
    seed: Option<u64>,
    /// Emit the full audit trail and result as JSON instead of tables.
    #[clap(long)]
    json: bool,
}

fn main() {
    let opts = Opts::parse();
    if let Err(e) = run(&opts) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(opts: &Opts) -> Result<(), Box<dyn std::error::Error>> {
    let election = match &opts.path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
            parse_election(BufReader::new(file))?
        }
        None => parse_election(io::stdin().lock())?,
    };

    let method = match &election.kind {
        ElectionKind::InstantRunoff { .. } => "instant-runoff",
        ElectionKind::OpenPartyList { .. } => "open party list",
    };
    if !opts.json {
        println!(
            "Tabulating {} ballots ({}) for {} candidates",
            election.total_ballots().to_string().cyan(),
            method,
            election.candidates.len().to_string().cyan()
        );
    }

    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let tabulation = tabulate(election, &mut rng)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&tabulation)?);
    } else {
        print!("{}", report::render(&tabulation));
    }
    Ok(())
}
