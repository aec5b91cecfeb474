use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::bail;
use clap::{Parser, Subcommand};

use spell_import::import::{self, ImportReport};
use spell_import::normalize::Normalizer;
use spell_import::settings::{FailurePolicy, Settings};
use spell_import::{compendium, db};

#[derive(Parser)]
#[command(name = "spell_import", about = "Load a spell compendium into SQLite")]
struct Cli {
    /// SQLite database path (overrides SPELLS_DATABASE)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Compendium XML file (overrides SPELLS_COMPENDIUM)
    #[arg(short, long)]
    compendium: Option<PathBuf>,
    /// Reject components with an unclosed material description
    #[arg(long)]
    strict_components: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Erase the database and create an empty schema
    Init {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Erase the database and import the compendium
    Import {
        #[command(flatten)]
        convert: ConvertArgs,
        /// What to do when a spell fails to convert
        #[arg(long, value_enum)]
        on_error: Option<FailurePolicy>,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Convert the compendium without touching the database
    Check {
        #[command(flatten)]
        convert: ConvertArgs,
    },
    /// Print converted spells as JSON lines
    Export {
        #[command(flatten)]
        convert: ConvertArgs,
        #[arg(long, value_enum)]
        on_error: Option<FailurePolicy>,
    },
    /// Show database statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(path) = cli.db {
        settings.database = path;
    }

    let result = match cli.command {
        Commands::Init { yes } => {
            if !yes && !confirm()? {
                bail!("Aborted; database left unchanged");
            }
            let conn = db::connect(&settings.database)?;
            let tx = conn.unchecked_transaction()?;
            db::init_schema(&tx)?;
            tx.commit()?;
            println!("Initialized {:?}", settings.database);
            Ok(())
        }
        Commands::Import {
            convert,
            on_error,
            yes,
        } => {
            apply_convert_args(&mut settings, convert);
            let policy = on_error.unwrap_or(settings.on_error);
            if !yes && !confirm()? {
                bail!("Aborted; database left unchanged");
            }
            let entries = compendium::read_compendium(&settings.compendium)?;
            let conn = db::connect(&settings.database)?;
            println!("Importing {} spells into {:?}...", entries.len(), settings.database);
            let report: ImportReport = import::run_import(
                &conn,
                &entries,
                &Normalizer::new(settings.strict_components),
                policy,
            )?;
            report.print();
            Ok(())
        }
        Commands::Check { convert } => {
            apply_convert_args(&mut settings, convert);
            let entries = compendium::read_compendium(&settings.compendium)?;
            let normalizer = Normalizer::new(settings.strict_components);
            let results = import::convert_all(&entries, &normalizer);

            let mut per_source: BTreeMap<&str, usize> = BTreeMap::new();
            let mut failed = 0usize;
            for (entry, result) in entries.iter().zip(&results) {
                match result {
                    Ok(n) => *per_source.entry(n.spell.source.abbreviation()).or_default() += 1,
                    Err(e) => {
                        failed += 1;
                        println!("  {:?}: {}", entry.name, e);
                    }
                }
            }
            for (source, count) in &per_source {
                println!("{:<5} {}", source, count);
            }
            println!("{} entries, {} ok, {} failed", entries.len(), entries.len() - failed, failed);
            if failed > 0 {
                bail!("{} entries failed to convert", failed);
            }
            Ok(())
        }
        Commands::Export { convert, on_error } => {
            apply_convert_args(&mut settings, convert);
            let policy = on_error.unwrap_or(settings.on_error);
            let entries = compendium::read_compendium(&settings.compendium)?;
            let results =
                import::convert_all(&entries, &Normalizer::new(settings.strict_components));
            let (spells, _) = import::apply_policy(&entries, results, policy)?;

            let mut out = io::stdout().lock();
            for n in &spells {
                serde_json::to_writer(&mut out, n)?;
                writeln!(out)?;
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::open_existing(&settings.database)?;
            let s = db::get_stats(&conn)?;
            println!("Spells:       {}", s.spells);
            println!("Classes:      {}", s.classes);
            println!("Class links:  {}", s.associations);
            println!("\n--- By source ---");
            for (source, count) in &s.by_source {
                println!("  {:<14} {}", source, count);
            }
            println!("\n--- By school ---");
            for (school, count) in &s.by_school {
                println!("  {:<14} {}", school, count);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn apply_convert_args(settings: &mut Settings, args: ConvertArgs) {
    if let Some(path) = args.compendium {
        settings.compendium = path;
    }
    if args.strict_components {
        settings.strict_components = true;
    }
}

/// Ask before wiping the database. Anything but y/Y (including EOF) declines.
fn confirm() -> anyhow::Result<bool> {
    println!("WARNING: All data in database will be erased and replaced with starting data.");
    print!("Are you sure you want to continue? [y/N] ");
    io::stdout().flush()?;

    let mut resp = String::new();
    io::stdin().lock().read_line(&mut resp)?;
    Ok(accepts(&resp))
}

fn accepts(resp: &str) -> bool {
    matches!(resp.trim(), "y" | "Y")
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
