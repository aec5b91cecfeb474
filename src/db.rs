use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OpenFlags};

use crate::normalize::classes::CLASSES;
use crate::normalize::Normalized;

const SCHEMA_SQL: &str = include_str!("../data/schema.sql");

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Open a database that must already exist. Never creates a file.
pub fn open_existing(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        bail!("Database {:?} not found; run 'import' or 'init' first", path);
    }
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)
        .with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Drop every table, recreate the schema and seed sources + classes.
/// Runs inside whatever transaction the caller holds.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)
        .context("Failed to run schema script")?;
    seed_classes(conn)?;
    Ok(())
}

fn seed_classes(conn: &Connection) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO class (id, name, base_class_id, source_id) VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut count = 0;
    for c in CLASSES {
        count += stmt.execute(params![c.id, c.name, c.base_class, c.source.id()])?;
    }
    Ok(count)
}

// ── Spells ──

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveCounts {
    pub spells: usize,
    pub associations: usize,
}

/// Insert spells in order. Each class link is written against the id
/// SQLite hands back for its spell.
pub fn save_spells(conn: &Connection, spells: &[Normalized]) -> Result<SaveCounts> {
    let mut spell_stmt = conn.prepare(
        "INSERT INTO spell
         (name, level, school, cast_time, duration, \"range\", comp_verbal, comp_somatic,
          comp_material, material_desc, concentration, ritual, description, source_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )?;
    let mut link_stmt = conn.prepare(
        "INSERT OR IGNORE INTO class_spells (spell_id, class_id) VALUES (?1, ?2)",
    )?;

    let mut counts = SaveCounts::default();
    for n in spells {
        let s = &n.spell;
        let spell_id = spell_stmt
            .insert(params![
                s.name, s.level, s.school.name(), s.cast_time, s.duration, s.range,
                s.verbal, s.somatic, s.material, s.material_desc, s.concentration,
                s.ritual, s.description, s.source.id(),
            ])
            .with_context(|| format!("Failed to insert spell {:?}", s.name))?;
        counts.spells += 1;

        for class in &n.classes {
            counts.associations += link_stmt.execute(params![spell_id, class.class_id])?;
        }
    }
    Ok(counts)
}

// ── Stats ──

pub struct Stats {
    pub spells: usize,
    pub classes: usize,
    pub associations: usize,
    pub by_source: Vec<(String, usize)>,
    pub by_school: Vec<(String, usize)>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let spells: usize = conn.query_row("SELECT COUNT(*) FROM spell", [], |r| r.get(0))?;
    let classes: usize = conn.query_row("SELECT COUNT(*) FROM class", [], |r| r.get(0))?;
    let associations: usize =
        conn.query_row("SELECT COUNT(*) FROM class_spells", [], |r| r.get(0))?;

    let mut stmt = conn.prepare(
        "SELECT so.abbreviation, COUNT(sp.id)
         FROM source so
         LEFT JOIN spell sp ON sp.source_id = so.id
         GROUP BY so.id
         ORDER BY so.id",
    )?;
    let by_source: Vec<(String, usize)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt =
        conn.prepare("SELECT school, COUNT(*) FROM spell GROUP BY school ORDER BY school")?;
    let by_school: Vec<(String, usize)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stats {
        spells,
        classes,
        associations,
        by_source,
        by_school,
    })
}
