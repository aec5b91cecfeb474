use std::fmt;

use serde::Serialize;

use crate::error::ConvertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum School {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
}

/// Compendium abbreviations. Closed set; anything else is rejected.
const SCHOOLS: [(&str, School); 8] = [
    ("A", School::Abjuration),
    ("C", School::Conjuration),
    ("D", School::Divination),
    ("EN", School::Enchantment),
    ("EV", School::Evocation),
    ("I", School::Illusion),
    ("N", School::Necromancy),
    ("T", School::Transmutation),
];

impl School {
    /// Resolve a compendium school code (exact, case-sensitive).
    pub fn from_code(code: &str) -> Result<Self, ConvertError> {
        SCHOOLS
            .iter()
            .find(|&&(c, _)| c == code)
            .map(|&(_, school)| school)
            .ok_or_else(|| ConvertError::UnknownSchool {
                code: code.to_string(),
            })
    }

    pub fn code(self) -> &'static str {
        SCHOOLS
            .iter()
            .find(|&&(_, s)| s == self)
            .map(|&(c, _)| c)
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            School::Abjuration => "Abjuration",
            School::Conjuration => "Conjuration",
            School::Divination => "Divination",
            School::Enchantment => "Enchantment",
            School::Evocation => "Evocation",
            School::Illusion => "Illusion",
            School::Necromancy => "Necromancy",
            School::Transmutation => "Transmutation",
        }
    }
}

impl fmt::Display for School {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
