use bmi_core::bmi::REFERENCE_BANDS;
use bmi_core::*;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bmi")]
#[command(about = "BMI tracker with per-user history and trends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate BMI and save it to a user's history
    Add {
        #[arg(long)]
        user: String,

        /// Weight in kg
        #[arg(long, allow_hyphen_values = true)]
        weight: String,

        /// Height in cm
        #[arg(long, allow_hyphen_values = true)]
        height: String,
    },

    /// List users with saved history
    Users,

    /// Show a user's history
    History {
        #[arg(long)]
        user: String,

        /// List oldest entries first
        #[arg(long)]
        oldest_first: bool,
    },

    /// Delete a single entry
    Delete {
        #[arg(long)]
        user: String,

        /// Timestamp of the entry ("YYYY-MM-DD HH:MM:SS")
        #[arg(long, conflicts_with = "index", required_unless_present = "index")]
        date: Option<String>,

        /// Entry number as shown in the history table
        #[arg(long)]
        index: Option<usize>,

        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Delete all history for a user
    Clear {
        #[arg(long)]
        user: String,

        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Show summary statistics and BMI trend
    Stats {
        #[arg(long)]
        user: String,
    },

    /// Export a user's history to CSV
    Export {
        #[arg(long)]
        user: String,

        #[arg(long)]
        output: PathBuf,
    },

    /// Show the BMI category reference
    Reference,
}

fn main() -> ExitCode {
    bmi_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_persistence() {
                eprintln!("Error: failed to save data: {}", e);
            } else if matches!(e, Error::NotFound(_)) {
                eprintln!("Warning: {}", e);
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default();
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let mut sink = JsonFileSink::new(config.data.store_path_in(&data_dir));
    let mut store = sink.load();

    match cli.command {
        Commands::Add {
            user,
            weight,
            height,
        } => cmd_add(&mut store, &mut sink, &user, &weight, &height),
        Commands::Users => {
            cmd_users(&store);
            Ok(())
        }
        Commands::History { user, oldest_first } => {
            cmd_history(&store, &user, oldest_first || !config.display.newest_first)
        }
        Commands::Delete {
            user,
            date,
            index,
            yes,
        } => cmd_delete(&mut store, &mut sink, &user, date, index, yes),
        Commands::Clear { user, yes } => cmd_clear(&mut store, &mut sink, &user, yes),
        Commands::Stats { user } => {
            cmd_stats(&store, &user);
            Ok(())
        }
        Commands::Export { user, output } => cmd_export(&store, &user, output),
        Commands::Reference => {
            display_reference();
            Ok(())
        }
    }
}

fn cmd_add(
    store: &mut Store,
    sink: &mut JsonFileSink,
    user: &str,
    weight: &str,
    height: &str,
) -> Result<()> {
    let input = MeasurementInput::parse(user, weight, height)?;
    let now = chrono::Local::now().naive_local();
    let record = MeasurementRecord::new(input.weight_kg, input.height_cm, now);

    println!();
    println!("  BMI: {:.2}", record.bmi);
    println!(
        "  Category: {} [{}]",
        record.category,
        record.category.reference_color()
    );
    println!();
    println!("  {}", record.category.advice());
    println!();

    bmi_core::history::append(store, sink, &input.username, record)?;

    println!("✓ BMI calculated and saved for '{}'", input.username);
    Ok(())
}

fn cmd_users(store: &Store) {
    if store.is_empty() {
        println!("No users recorded yet.");
        return;
    }
    for name in store.usernames() {
        let count = store.history(name).map_or(0, Vec::len);
        println!("{} ({} entries)", name, count);
    }
}

fn cmd_history(store: &Store, user: &str, oldest_first: bool) -> Result<()> {
    let history = store
        .history(user)
        .ok_or_else(|| Error::NotFound(format!("user '{}'", user)))?;

    println!(
        "{:>4}  {:<19}  {:>11}  {:>11}  {:>6}  {}",
        "#", "Date & Time", "Weight (kg)", "Height (cm)", "BMI", "Category"
    );

    let mut rows: Vec<(usize, &MeasurementRecord)> =
        history.iter().enumerate().map(|(i, r)| (i + 1, r)).collect();
    if !oldest_first {
        rows.reverse();
    }

    for (number, record) in rows {
        println!(
            "{:>4}  {:<19}  {:>11}  {:>11}  {:>6.2}  {}",
            number,
            record.timestamp_label(),
            record.weight_kg,
            record.height_cm,
            record.bmi,
            record.category
        );
    }
    Ok(())
}

fn cmd_delete(
    store: &mut Store,
    sink: &mut JsonFileSink,
    user: &str,
    date: Option<String>,
    index: Option<usize>,
    yes: bool,
) -> Result<()> {
    if !store.contains_user(user) {
        return Err(Error::NotFound(format!("user '{}'", user)));
    }
    if !yes && !confirm("Delete selected entry?")? {
        println!("Cancelled.");
        return Ok(());
    }

    match (date, index) {
        (Some(date), _) => {
            let timestamp = parse_timestamp(&date)?;
            bmi_core::history::delete_one(store, sink, user, timestamp)?;
            println!("✓ Entry deleted successfully");
        }
        (None, Some(number)) => {
            let position = number.checked_sub(1).ok_or_else(|| Error::Validation {
                field: "index",
                reason: "entry numbers start at 1".into(),
            })?;
            let record = bmi_core::history::delete_at(store, sink, user, position)?;
            println!("✓ Deleted entry from {}", record.timestamp_label());
        }
        (None, None) => {
            return Err(Error::Validation {
                field: "entry",
                reason: "pass --date or --index".into(),
            });
        }
    }
    Ok(())
}

fn cmd_clear(store: &mut Store, sink: &mut JsonFileSink, user: &str, yes: bool) -> Result<()> {
    if !store.contains_user(user) {
        return Err(Error::NotFound(format!("user '{}'", user)));
    }
    if !yes && !confirm(&format!("Delete all history for {}?", user))? {
        println!("Cancelled.");
        return Ok(());
    }

    let removed = bmi_core::history::clear(store, sink, user)?;
    println!("✓ History cleared successfully ({} entries)", removed.len());
    Ok(())
}

fn cmd_stats(store: &Store, user: &str) {
    let history = store.history(user).map(Vec::as_slice).unwrap_or_default();

    let Some(summary) = summarize(history) else {
        println!("No data available");
        return;
    };

    println!("Summary Statistics for {}", user);
    println!("─────────────────────────────────────────");
    println!("{}", summary);
    println!();

    match trend_series(history) {
        Ok(points) => display_trend(&points),
        Err(e) => {
            tracing::debug!("Trend unavailable: {}", e);
            println!("Need at least 2 entries to show trends");
        }
    }
}

fn cmd_export(store: &Store, user: &str, output: PathBuf) -> Result<()> {
    let history = store
        .history(user)
        .ok_or_else(|| Error::NotFound(format!("user '{}'", user)))?;

    let count = bmi_core::export::export_history_csv(&output, history)?;
    println!("✓ Exported {} entries", count);
    println!("  CSV: {}", output.display());
    Ok(())
}

fn display_trend(points: &[TrendPoint]) {
    println!("BMI Trend Over Time");
    println!("─────────────────────────────────────────");
    for point in points {
        println!("  {}  {:>6.2}  {}", point.date_label, point.bmi, bar(point.bmi));
    }
    println!();
    for line in reference_lines() {
        println!("  - - {:>5} ({} below)", line.bmi, line.below);
    }
}

/// Horizontal bar scaled at two BMI points per cell, capped for wide values
fn bar(bmi: f64) -> String {
    let cells = (bmi / 2.0).round().clamp(0.0, 30.0) as usize;
    "█".repeat(cells)
}

fn display_reference() {
    println!("BMI Reference");
    for band in REFERENCE_BANDS {
        println!("  ● {}: {}", band.category, band.range);
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
