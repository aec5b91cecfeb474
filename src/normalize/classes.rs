use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use super::source::Source;
use super::source::Source::{PlayersHandbook as PHB, SwordCoast as SCAG};
use crate::error::ConvertError;

const CLASS_SEPARATOR: &str = ", ";

/// One row of the static class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassEntry {
    pub id: i64,
    pub name: &'static str,
    pub base_class: Option<i64>,
    pub source: Source,
}

const fn base(id: i64, name: &'static str) -> ClassEntry {
    ClassEntry {
        id,
        name,
        base_class: None,
        source: Source::PlayersHandbook,
    }
}

const fn sub(id: i64, name: &'static str, base_class: i64, source: Source) -> ClassEntry {
    ClassEntry {
        id,
        name,
        base_class: Some(base_class),
        source,
    }
}

/// Every class name the compendium uses. Base classes come first so a
/// subclass row can always reference an already-seeded base.
pub static CLASSES: &[ClassEntry] = &[
    base(1, "Bard"),
    base(2, "Cleric"),
    base(3, "Druid"),
    base(4, "Fighter"),
    base(5, "Paladin"),
    base(6, "Ranger"),
    base(7, "Rogue"),
    base(8, "Sorcerer"),
    base(9, "Warlock"),
    base(10, "Wizard"),
    // Cleric domains
    sub(11, "Cleric (Arcana)", 2, SCAG),
    sub(12, "Cleric (Knowledge)", 2, PHB),
    sub(13, "Cleric (Life)", 2, PHB),
    sub(14, "Cleric (Light)", 2, PHB),
    sub(15, "Cleric (Nature)", 2, PHB),
    sub(16, "Cleric (Tempest)", 2, PHB),
    sub(17, "Cleric (Trickery)", 2, PHB),
    sub(18, "Cleric (War)", 2, PHB),
    // Circle of the Land terrains
    sub(19, "Druid (Arctic)", 3, PHB),
    sub(20, "Druid (Coast)", 3, PHB),
    sub(21, "Druid (Desert)", 3, PHB),
    sub(22, "Druid (Forest)", 3, PHB),
    sub(23, "Druid (Grassland)", 3, PHB),
    sub(24, "Druid (Mountain)", 3, PHB),
    sub(25, "Druid (Swamp)", 3, PHB),
    sub(26, "Druid (Underdark)", 3, PHB),
    sub(27, "Fighter (Eldritch Knight)", 4, PHB),
    // Paladin oaths
    sub(28, "Paladin (Ancients)", 5, PHB),
    sub(29, "Paladin (Crown)", 5, SCAG),
    sub(30, "Paladin (Devotion)", 5, PHB),
    sub(31, "Paladin (Vengeance)", 5, PHB),
    sub(32, "Rogue (Arcane Trickster)", 7, PHB),
    // Warlock patrons
    sub(33, "Warlock (Archfey)", 9, PHB),
    sub(34, "Warlock (Fiend)", 9, PHB),
    sub(35, "Warlock (Great Old One)", 9, PHB),
    sub(36, "Warlock (Undying)", 9, SCAG),
];

static BY_NAME: LazyLock<HashMap<&'static str, &'static ClassEntry>> =
    LazyLock::new(|| CLASSES.iter().map(|c| (c.name, c)).collect());

pub fn lookup(name: &str) -> Option<&'static ClassEntry> {
    BY_NAME.get(name).copied()
}

/// A class that may learn a spell. The spell side of the link is filled in
/// by whoever stores the spell and learns its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassAssociation {
    pub class_id: i64,
    pub name: &'static str,
    pub base_class_id: Option<i64>,
    pub source: Source,
}

impl From<&ClassEntry> for ClassAssociation {
    fn from(c: &ClassEntry) -> Self {
        ClassAssociation {
            class_id: c.id,
            name: c.name,
            base_class_id: c.base_class,
            source: c.source,
        }
    }
}

/// Resolve a ", "-separated class list. All or nothing: one unknown name
/// rejects the whole list.
pub fn parse_classes(raw: &str) -> Result<Vec<ClassAssociation>, ConvertError> {
    raw.split(CLASS_SEPARATOR)
        .map(|name| {
            lookup(name)
                .map(ClassAssociation::from)
                .ok_or_else(|| ConvertError::UnknownClass {
                    name: name.to_string(),
                    classes: raw.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn resolves_in_input_order() {
        let classes = parse_classes("Wizard, Sorcerer").unwrap();
        let names: Vec<&str> = classes.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Wizard", "Sorcerer"]);
        assert_eq!(classes[0].class_id, 10);
        assert_eq!(classes[1].class_id, 8);
        assert!(classes.iter().all(|c| c.base_class_id.is_none()));
    }

    #[test]
    fn one_unknown_rejects_everything() {
        assert_eq!(
            parse_classes("Wizard, Nonexistent"),
            Err(ConvertError::UnknownClass {
                name: "Nonexistent".to_string(),
                classes: "Wizard, Nonexistent".to_string(),
            })
        );
    }

    #[test]
    fn subclass_points_at_base() {
        let classes = parse_classes("Warlock (Undying), Cleric (Life)").unwrap();
        assert_eq!(classes[0].base_class_id, Some(9));
        assert_eq!(classes[0].source, Source::SwordCoast);
        assert_eq!(classes[1].base_class_id, Some(2));
        assert_eq!(classes[1].source, Source::PlayersHandbook);
    }

    #[test]
    fn separator_must_include_space() {
        assert!(parse_classes("Wizard,Sorcerer").is_err());
        assert!(parse_classes("Wizard, sorcerer").is_err());
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(matches!(
            parse_classes(""),
            Err(ConvertError::UnknownClass { name, .. }) if name.is_empty()
        ));
    }

    #[test]
    fn table_ids_and_names_are_unique() {
        let ids: HashSet<i64> = CLASSES.iter().map(|c| c.id).collect();
        let names: HashSet<&str> = CLASSES.iter().map(|c| c.name).collect();
        assert_eq!(ids.len(), CLASSES.len());
        assert_eq!(names.len(), CLASSES.len());
    }

    #[test]
    fn bases_precede_their_subclasses() {
        for (i, class) in CLASSES.iter().enumerate() {
            if let Some(base_id) = class.base_class {
                let base_pos = CLASSES.iter().position(|c| c.id == base_id).unwrap();
                assert!(base_pos < i, "{} listed before its base", class.name);
                assert!(CLASSES[base_pos].base_class.is_none());
                assert!(class.name.starts_with(CLASSES[base_pos].name));
            }
        }
    }
}
