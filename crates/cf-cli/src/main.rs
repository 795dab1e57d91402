//! CaseForge command line
//!
//! Usage:
//!   caseforge cases                     - List the case book
//!   caseforge open food --count 3       - Open cases on a simulated clock
//!   caseforge simulate weapons -n 100000 - Tier distribution of a case
//!   caseforge trace legendary --seed 7  - Record one spin as a JSON trace

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cf_roulette::{
    CaseBook, CaseBookParser, CaseDefinition, HeadlessRunner, NullSink, PlayerProfile,
    ProfileError, RouletteConfig, SpinController, SpinTiming, TimingProfile,
    simulate_tiers,
};
use cf_stage::SpinTrace;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "caseforge", about = "CaseForge case opener", version)]
struct Cli {
    /// Case book to load (JSON or YAML); the built-in book when omitted
    #[arg(short, long, global = true)]
    book: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Speed {
    Normal,
    Turbo,
    Studio,
}

impl From<Speed> for TimingProfile {
    fn from(speed: Speed) -> Self {
        match speed {
            Speed::Normal => TimingProfile::Normal,
            Speed::Turbo => TimingProfile::Turbo,
            Speed::Studio => TimingProfile::Studio,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List cases with their prices and odds
    Cases,
    /// Open cases with a fresh profile
    Open {
        /// Case id
        case: String,
        /// How many to open
        #[arg(short, long, default_value_t = 1)]
        count: u32,
        /// Fixed RNG seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Starting balance
        #[arg(long, default_value_t = cf_roulette::STARTING_BALANCE)]
        balance: u64,
        /// Animation timing
        #[arg(long, value_enum, default_value = "normal")]
        speed: Speed,
        /// Sell every item right after it drops
        #[arg(long)]
        sell: bool,
    },
    /// Sample a case many times and compare against its weights
    Simulate {
        /// Case id
        case: String,
        /// Number of draws
        #[arg(short = 'n', long, default_value_t = 100_000)]
        draws: u64,
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record one spin and print its trace
    Trace {
        /// Case id
        case: String,
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        #[arg(long, value_enum, default_value = "studio")]
        speed: Speed,
        /// Include every frame instead of the summary
        #[arg(long)]
        full: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let book = load_book(cli.book.as_deref())?;

    match cli.command {
        Commands::Cases => list_cases(&book),
        Commands::Open {
            case,
            count,
            seed,
            balance,
            speed,
            sell,
        } => open_cases(&book, &case, count, seed, balance, speed, sell),
        Commands::Simulate {
            case,
            draws,
            seed,
            json,
        } => simulate(&book, &case, draws, seed, json),
        Commands::Trace {
            case,
            seed,
            speed,
            full,
        } => trace(&book, &case, seed, speed, full),
    }
}

fn load_book(path: Option<&Path>) -> Result<CaseBook> {
    let Some(path) = path else {
        return Ok(CaseBook::standard());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let book = CaseBookParser::new()
        .parse_with_extension(extension, &source)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    log::info!("Loaded {} cases from {}", book.cases.len(), path.display());
    Ok(book)
}

fn find_case<'a>(book: &'a CaseBook, id: &str) -> Result<&'a CaseDefinition> {
    book.require(id)
        .with_context(|| format!("Available cases: {}", book.case_ids().join(", ")))
}

fn config_for(speed: Speed) -> RouletteConfig {
    RouletteConfig::default().with_timing(SpinTiming::from_profile(speed.into()))
}

fn list_cases(book: &CaseBook) -> Result<()> {
    let runner = HeadlessRunner::default();
    let mut controller = runner.controller(RouletteConfig::default(), NullSink)?;

    for case in &book.cases {
        let icons: Vec<String> = controller
            .preview_icons(case, &book.catalog)
            .into_iter()
            .map(|item| item.entry.icon)
            .collect();
        println!(
            "{} {} [{}] - {} coins  {}",
            case.icon,
            case.name,
            case.id,
            case.price,
            icons.join(" ")
        );

        let odds: Vec<String> = case
            .weights
            .positive_tiers()
            .into_iter()
            .map(|tier| {
                let percent = case.weights.probability(tier) * 100.0;
                format!("{} {:.0}%", tier.display_name(), percent)
            })
            .collect();
        println!("    {}", odds.join(", "));
    }
    Ok(())
}

fn open_cases(
    book: &CaseBook,
    case_id: &str,
    count: u32,
    seed: Option<u64>,
    balance: u64,
    speed: Speed,
    sell: bool,
) -> Result<()> {
    let case = find_case(book, case_id)?;
    let config = config_for(speed);
    let runner = HeadlessRunner::for_config(&config);
    let mut controller: SpinController = runner.controller(config, NullSink)?;
    if let Some(seed) = seed {
        controller.reseed(seed);
    }
    let mut profile = PlayerProfile::with_balance(balance);

    for n in 1..=count {
        let receipt = match profile.begin_opening(case) {
            Ok(receipt) => receipt,
            Err(e @ ProfileError::InsufficientFunds { .. }) => {
                println!("Stopped after {} openings: {}", n - 1, e);
                break;
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = match runner.open_case(&mut controller, case, &book.catalog) {
            Ok(outcome) => outcome,
            Err(e) => {
                profile.refund(&receipt)?;
                return Err(e).context("Spin failed; price refunded");
            }
        };

        let settlement = profile.complete_opening(&receipt, &outcome)?;
        println!(
            "#{:<3} {} {} ({}) worth {}  +{} exp{}",
            n,
            outcome.item.entry.icon,
            outcome.item.name(),
            outcome.item.tier.display_name(),
            outcome.item.entry.base_price,
            settlement.experience_gained,
            if settlement.leveled_up {
                format!("  LEVEL {}", settlement.level)
            } else {
                String::new()
            }
        );

        if sell {
            let sale = profile.sell(settlement.inventory_id)?;
            println!("     sold for {}", sale.price);
        }
    }

    println!(
        "Balance {}  Level {} ({} exp)  Inventory {} items worth {}",
        profile.balance,
        profile.level,
        profile.experience,
        profile.inventory.len(),
        profile.inventory_value()
    );
    Ok(())
}

fn simulate(book: &CaseBook, case_id: &str, draws: u64, seed: u64, json: bool) -> Result<()> {
    let case = find_case(book, case_id)?;
    let report = simulate_tiers(case, &book.catalog, draws, seed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} - {} draws, seed {}", case.name, report.draws, report.seed);
    for stats in &report.tiers {
        if stats.count == 0 && stats.expected == 0.0 {
            continue;
        }
        println!(
            "  {:<10} {:>8}  {:>6.2}%  (expected {:>6.2}%)",
            stats.tier.display_name(),
            stats.count,
            stats.frequency * 100.0,
            stats.expected * 100.0
        );
    }
    println!(
        "  Mean drop value {:.1} for a {} coin case ({:.1}% return)",
        report.mean_value,
        case.price,
        report.return_ratio * 100.0
    );
    Ok(())
}

fn trace(book: &CaseBook, case_id: &str, seed: u64, speed: Speed, full: bool) -> Result<()> {
    let case = find_case(book, case_id)?;
    let config = config_for(speed);
    let runner = HeadlessRunner::for_config(&config);
    let sink = SpinTrace::new(format!("{}-{}", case.id, seed)).with_case(&case.id);
    let mut controller = runner.controller(config, sink)?.with_seed(seed);

    runner.open_case(&mut controller, case, &book.catalog)?;
    let trace = controller.into_sink();

    let validation = trace.validate();
    for warning in validation.warnings() {
        log::warn!("Trace {}: {}", trace.trace_id, warning);
    }

    if full {
        println!("{}", serde_json::to_string_pretty(&trace)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&trace.summary())?);
    }
    Ok(())
}
