use clap::{Parser, Subcommand};
use herb_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "siqi")]
#[command(about = "Herbal prescription energetics analyzer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a catalog TOML file instead of the built-in catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a prescription line (e.g. "fu zi 6, gan jiang 6, zhi gan cao 6")
    Analyze {
        /// The prescription: herb names with dosages, comma separated
        prescription: Vec<String>,

        /// Emit the full analysis as JSON
        #[arg(long)]
        json: bool,

        /// Don't append this analysis to the history log
        #[arg(long)]
        no_log: bool,
    },

    /// Roll up logged analyses to CSV
    Rollup {
        /// Clean up processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },

    /// Show recently analyzed prescriptions
    History {
        /// How many days back to look
        #[arg(long, default_value_t = 7)]
        days: i64,
    },

    /// List the herb catalog, or show one herb in detail
    Catalog {
        /// Herb name to show (aliases and partial names work)
        herb: Vec<String>,
    },
}

fn main() -> Result<()> {
    herb_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let catalog = load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Analyze {
            prescription,
            json,
            no_log,
        } => cmd_analyze(&catalog, &config, data_dir, &prescription.join(" "), json, no_log),
        Commands::Rollup { cleanup } => cmd_rollup(data_dir, cleanup),
        Commands::History { days } => cmd_history(data_dir, days),
        Commands::Catalog { herb } => cmd_catalog(&catalog, &herb.join(" ")),
    }
}

fn cmd_analyze(
    catalog: &Catalog,
    config: &Config,
    data_dir: PathBuf,
    line: &str,
    json: bool,
    no_log: bool,
) -> Result<()> {
    if line.trim().is_empty() {
        eprintln!("Nothing to analyze. Example: siqi analyze \"ma huang 6, gui zhi 9\"");
        return Ok(());
    }

    let parsed = parse_prescription(line);
    let analysis = analyze(catalog, &parsed.herbs, config);

    // Optional constitution post-processing; absence or a malformed file
    // just means no adjustment.
    let profile = load_profile(&data_dir.join("profile.json"))?;
    let adjusted = profile
        .as_ref()
        .map(|p| constitution::apply(&analysis, p, &config.classifier));

    if json {
        let output = serde_json::json!({
            "analysis": analysis,
            "tokenizer_notes": parsed.notes,
            "adjusted": adjusted,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        display_analysis(line, &analysis, &parsed.notes, adjusted.as_ref());
    }

    if !no_log {
        let record = AnalysisRecord::from_analysis(line, &analysis);
        let mut sink = JsonlSink::new(data_dir.join("analyses.jsonl"));
        sink.append(&record)?;
    }

    Ok(())
}

fn cmd_rollup(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let log_path = data_dir.join("analyses.jsonl");
    let csv_path = data_dir.join("analyses.csv");

    if !log_path.exists() {
        println!("No analysis log found - nothing to roll up.");
        return Ok(());
    }

    let count = herb_core::csv_rollup::log_to_csv_and_archive(&log_path, &csv_path)?;

    println!("✓ Rolled up {} analyses to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = herb_core::csv_rollup::cleanup_processed_logs(&data_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}

fn cmd_history(data_dir: PathBuf, days: i64) -> Result<()> {
    let log_path = data_dir.join("analyses.jsonl");
    let csv_path = data_dir.join("analyses.csv");

    let records = load_recent_records(&log_path, &csv_path, days)?;

    if records.is_empty() {
        println!("No analyses in the last {} days.", days);
        return Ok(());
    }

    println!("Analyses from the last {} days:\n", days);
    for record in records {
        println!(
            "  {}  {:>6.2}  {:<16}  {}",
            record.analyzed_at.format("%Y-%m-%d %H:%M"),
            record.total_index,
            record.label.to_string(),
            record.prescription
        );
    }

    Ok(())
}

fn cmd_catalog(catalog: &Catalog, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        let mut entries: Vec<&CatalogEntry> = catalog.herbs.values().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));

        println!("{} herbs in catalog:\n", entries.len());
        for entry in entries {
            println!(
                "  {:<14} {:<32} {:?}, {} g",
                entry.id,
                entry.name,
                entry.thermal,
                entry
                    .default_dosage
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into())
            );
        }
        return Ok(());
    }

    let input = RawHerbInput {
        name: query.to_string(),
        dosage_grams: 0.0,
        processing: None,
    };
    let resolved = resolver::resolve(catalog, &input);

    match resolved.entry {
        Some(entry) => {
            println!("{} ({})", entry.name, entry.id);
            if resolved.via_alias {
                println!("  resolved via alias");
            }
            if let Some(token) = &resolved.processing {
                println!("  processing: {}", token);
            }
            println!("  thermal:   {:?}", entry.thermal);
            println!("  flavors:   {:?}", entry.flavors);
            println!("  channels:  {:?}", entry.channels);
            println!("  direction: {:?}", entry.direction);
            if let Some(dosage) = entry.default_dosage {
                println!("  reference dosage: {} g", dosage);
            }
            if let Some(note) = &entry.note {
                println!("  note: {}", note);
            }
        }
        None => {
            println!("'{}' not found in catalog.", query);
        }
    }

    Ok(())
}

fn display_analysis(
    line: &str,
    analysis: &PrescriptionAnalysis,
    tokenizer_notes: &[String],
    adjusted: Option<&constitution::AdjustedReading>,
) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", analysis.label.to_string().to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", line);
    println!();
    println!(
        "  Total index: {:+.2}   Reference dosage: {:.0} g",
        analysis.total_index, analysis.total_reference_dosage
    );

    if let Some(reading) = adjusted {
        println!(
            "  Adjusted for {:?} constitution: {:+.2} ({})",
            reading.constitution, reading.adjusted_index, reading.adjusted_label
        );
    }

    println!("\n  Herbs:");
    for c in &analysis.contributions {
        let mut flags = String::new();
        if !c.resolved {
            flags.push_str("  [unresolved]");
        }
        if c.via_alias {
            flags.push_str("  [alias]");
        }
        if let Some(token) = &c.processing {
            flags.push_str(&format!("  [{}]", token));
        }
        println!(
            "    {:<20} {:>5.1} g   heat {:+}   index {:+.2}{}",
            c.display_name, c.dosage_grams, c.corrected_heat, c.index_contribution, flags
        );
    }

    println!("\n  Regions:");
    print_region("upper", analysis.regions.upper);
    print_region("middle", analysis.regions.middle);
    print_region("lower", analysis.regions.lower);

    println!(
        "\n  Net vector: magnitude {:.2}, angle {:.0}°  ({})",
        analysis.net_vector.magnitude,
        analysis.net_vector.angle_degrees,
        describe_vector(&analysis.net_vector)
    );

    if !analysis.interactions.is_empty() {
        println!("\n  Interactions:");
        for m in &analysis.interactions {
            println!("    {:?}: {} — {}", m.kind, m.label, m.effect);
        }
    }

    println!("\n  Energy over 120 min:");
    println!("    upper   {}", sparkline(analysis.kinetics.iter().map(|f| f.upper)));
    println!("    middle  {}", sparkline(analysis.kinetics.iter().map(|f| f.middle)));
    println!("    lower   {}", sparkline(analysis.kinetics.iter().map(|f| f.lower)));

    if !analysis.diagnostics.is_empty() || !tokenizer_notes.is_empty() {
        println!("\n  Notes:");
        for note in tokenizer_notes {
            println!("    • {}", note);
        }
        for note in &analysis.diagnostics {
            println!("    • {}", note);
        }
    }

    println!();
}

fn print_region(name: &str, energy: RegionEnergy) {
    let bar_len = (energy.percent / 5.0).round() as usize;
    println!(
        "    {:<7} {:>6.1}%  {:+.2}  {}",
        name,
        energy.percent,
        energy.total,
        "█".repeat(bar_len)
    );
}

fn describe_vector(net: &NetVector) -> &'static str {
    if net.magnitude < 0.05 {
        return "balanced";
    }
    let horizontal = if net.x > 0.1 {
        Some("dispersing")
    } else if net.x < -0.1 {
        Some("collecting")
    } else {
        None
    };
    let vertical = if net.y > 0.1 {
        Some("ascending")
    } else if net.y < -0.1 {
        Some("descending")
    } else {
        None
    };
    match (horizontal, vertical) {
        (Some("dispersing"), Some("ascending")) => "dispersing and ascending",
        (Some("dispersing"), Some("descending")) => "dispersing and descending",
        (Some("collecting"), Some("ascending")) => "collecting and ascending",
        (Some("collecting"), Some("descending")) => "collecting and descending",
        (Some("dispersing"), None) => "dispersing",
        (Some("collecting"), None) => "collecting",
        (None, Some("ascending")) => "ascending",
        (None, Some("descending")) => "descending",
        _ => "balanced",
    }
}

/// Render a series as a unicode sparkline, scaled to its own maximum.
fn sparkline(values: impl Iterator<Item = f64>) -> String {
    const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let values: Vec<f64> = values.collect();
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return "▁".repeat(values.len());
    }
    values
        .iter()
        .map(|v| {
            let idx = ((v / max) * (BLOCKS.len() - 1) as f64).round() as usize;
            BLOCKS[idx.min(BLOCKS.len() - 1)]
        })
        .collect()
}
