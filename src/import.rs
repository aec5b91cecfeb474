use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db;
use crate::error::ConvertError;
use crate::normalize::{Normalized, Normalizer, RawEntry};
use crate::settings::FailurePolicy;

const CHUNK: usize = 200;

/// An entry left out of the run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub name: String,
    pub error: ConvertError,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub spells: usize,
    pub associations: usize,
    pub skipped: Vec<Skipped>,
}

impl ImportReport {
    pub fn print(&self) {
        println!(
            "Saved {} spells, {} class links, skipped {}.",
            self.spells,
            self.associations,
            self.skipped.len()
        );
        for s in &self.skipped {
            println!("  skipped {:?}: {}", s.name, s.error);
        }
    }
}

/// Normalize every entry. Result order matches entry order.
pub fn convert_all(
    entries: &[RawEntry],
    normalizer: &Normalizer,
) -> Vec<Result<Normalized, ConvertError>> {
    entries
        .par_iter()
        .map(|entry| normalizer.normalize(entry))
        .collect()
}

/// Split conversion results into records to keep and entries to skip.
/// Under `Abort` the first failure ends the run.
pub fn apply_policy(
    entries: &[RawEntry],
    results: Vec<Result<Normalized, ConvertError>>,
    policy: FailurePolicy,
) -> Result<(Vec<Normalized>, Vec<Skipped>)> {
    let mut kept = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();

    for (entry, result) in entries.iter().zip(results) {
        match result {
            Ok(n) => kept.push(n),
            Err(error) => match policy {
                FailurePolicy::Abort => {
                    return Err(error)
                        .with_context(|| format!("Failed to convert spell {:?}", entry.name));
                }
                FailurePolicy::Skip => {
                    warn!("Skipping {:?}: {}", entry.name, error);
                    skipped.push(Skipped {
                        name: entry.name.clone(),
                        error,
                    });
                }
            },
        }
    }

    Ok((kept, skipped))
}

/// Wipe the database and load `entries` into it. Conversion happens before
/// anything is written; schema reset and inserts share one transaction.
pub fn run_import(
    conn: &Connection,
    entries: &[RawEntry],
    normalizer: &Normalizer,
    policy: FailurePolicy,
) -> Result<ImportReport> {
    let results = convert_all(entries, normalizer);
    let (spells, skipped) = apply_policy(entries, results, policy)?;
    info!(
        "Converted {} of {} entries ({} skipped)",
        spells.len(),
        entries.len(),
        skipped.len()
    );

    let pb = ProgressBar::new(spells.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
            .progress_chars("=> "),
    );

    let tx = conn.unchecked_transaction()?;
    db::init_schema(&tx)?;

    let mut report = ImportReport {
        skipped,
        ..Default::default()
    };
    for chunk in spells.chunks(CHUNK) {
        let counts = db::save_spells(&tx, chunk)?;
        report.spells += counts.spells;
        report.associations += counts.associations;
        pb.inc(chunk.len() as u64);
    }

    tx.commit()?;
    pb.finish_and_clear();
    Ok(report)
}
