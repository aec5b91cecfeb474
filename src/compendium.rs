use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::info;

use crate::normalize::RawEntry;

/// Child elements of `<spell>` that we keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Level,
    School,
    Ritual,
    Time,
    Range,
    Components,
    Duration,
    Classes,
    Text,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        Some(match tag {
            b"name" => Field::Name,
            b"level" => Field::Level,
            b"school" => Field::School,
            b"ritual" => Field::Ritual,
            b"time" => Field::Time,
            b"range" => Field::Range,
            b"components" => Field::Components,
            b"duration" => Field::Duration,
            b"classes" => Field::Classes,
            b"text" => Field::Text,
            _ => return None,
        })
    }
}

fn set_field(entry: &mut RawEntry, field: Field, value: String) {
    match field {
        Field::Name => entry.name = value,
        Field::Level => entry.level = value,
        Field::School => entry.school = value,
        Field::Ritual => entry.ritual = value,
        Field::Time => entry.time = value,
        Field::Range => entry.range = value,
        Field::Components => entry.components = value,
        Field::Duration => entry.duration = value,
        Field::Classes => entry.classes = value,
        Field::Text => entry.texts.push(value),
    }
}

pub fn read_compendium(path: &Path) -> Result<Vec<RawEntry>> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read compendium {:?}", path))?;
    let entries = parse_compendium(&xml)
        .with_context(|| format!("Failed to parse compendium {:?}", path))?;
    info!("Read {} spells from {:?}", entries.len(), path);
    Ok(entries)
}

/// Parse a `<compendium>` document into raw spell entries, in document order.
/// Non-spell elements are skipped; `<text/>` yields an empty fragment.
pub fn parse_compendium(xml: &str) -> Result<Vec<RawEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut field: Option<Field> = None;
    let mut value = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"spell" => current = Some(RawEntry::default()),
                tag if current.is_some() && field.is_none() => {
                    field = Field::from_tag(tag);
                    value.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match (current.as_mut(), field) {
                // `<spell/>` is an entry with every field empty
                (None, _) if e.name().as_ref() == b"spell" => {
                    entries.push(RawEntry::default());
                }
                (Some(entry), None) => {
                    if let Some(f) = Field::from_tag(e.name().as_ref()) {
                        set_field(entry, f, String::new());
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) if field.is_some() => {
                value.push_str(&e.unescape()?);
            }
            Ok(Event::CData(e)) if field.is_some() => {
                value.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"spell" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    field = None;
                }
                tag => {
                    if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                        if Field::from_tag(tag) == Some(f) {
                            set_field(entry, f, std::mem::take(&mut value));
                            field = None;
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Malformed XML at byte {}", reader.buffer_position())
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_compendium() {
        let entries = read_compendium(Path::new("tests/fixtures/compendium.xml")).unwrap();
        assert_eq!(entries.len(), 5);

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Bless",
                "Detect Magic",
                "Aganazzar's Scorcher (EE)",
                "Booming Blade (SCAG)",
                "Produce Flame",
            ]
        );

        let detect = &entries[1];
        assert_eq!(detect.ritual, "YES");
        assert_eq!(detect.school, "D");
        assert_eq!(detect.components, "V, S");
    }

    #[test]
    fn empty_text_elements_become_breaks() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<compendium version="5">
  <spell>
    <name>Light</name>
    <text>First.</text>
    <text/>
    <text></text>
    <text>Second.</text>
  </spell>
</compendium>"#;
        let entries = parse_compendium(xml).unwrap();
        assert_eq!(entries[0].texts, vec!["First.", "", "", "Second."]);
    }

    #[test]
    fn unescapes_entities() {
        let xml = "<compendium><spell><name>Tasha&apos;s Hideous Laughter</name>\
                   <text>1 &amp; 2 &lt; 3</text></spell></compendium>";
        let entries = parse_compendium(xml).unwrap();
        assert_eq!(entries[0].name, "Tasha's Hideous Laughter");
        assert_eq!(entries[0].texts, vec!["1 & 2 < 3"]);
    }

    #[test]
    fn skips_other_elements() {
        let xml = "<compendium>\
                   <item><name>Longsword</name><text>Martial.</text></item>\
                   <spell><name>Shield</name><school>A</school><roll>1d4</roll></spell>\
                   <monster><name>Goblin</name></monster>\
                   </compendium>";
        let entries = parse_compendium(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Shield");
        assert_eq!(entries[0].school, "A");
        assert!(entries[0].texts.is_empty());
    }

    #[test]
    fn missing_children_default_to_empty() {
        let entries = parse_compendium("<compendium><spell><name>Mending</name></spell></compendium>")
            .unwrap();
        assert_eq!(entries[0].ritual, "");
        assert_eq!(entries[0].classes, "");
    }

    #[test]
    fn self_closing_spell_is_kept_as_empty_entry() {
        let xml = "<compendium><spell/>\
                   <spell><name>Shield</name><school>A</school><classes>Wizard</classes></spell>\
                   </compendium>";
        let entries = parse_compendium(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], RawEntry::default());
        assert_eq!(entries[1].name, "Shield");
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = parse_compendium("<compendium><spell><name>Oops</spell></compendium>")
            .unwrap_err();
        assert!(err.to_string().contains("Malformed XML"));
    }
}
