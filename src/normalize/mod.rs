pub mod classes;
pub mod components;
pub mod description;
pub mod school;
pub mod source;

use serde::Serialize;

use crate::error::ConvertError;
pub use classes::{parse_classes, ClassAssociation};
pub use components::{parse_components, parse_components_strict, Components};
pub use description::{assemble_description, Description};
pub use school::School;
pub use source::{strip_source, Source};

const RITUAL_TOKEN: &str = "YES";

/// One `<spell>` element as it appears in the compendium.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub level: String,
    pub school: String,
    pub ritual: String,
    pub time: String,
    pub range: String,
    pub components: String,
    pub duration: String,
    pub classes: String,
    pub texts: Vec<String>,
}

/// Storage-ready spell row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedSpell {
    pub name: String,
    pub level: String,
    pub school: School,
    pub cast_time: String,
    pub duration: String,
    pub range: String,
    pub verbal: bool,
    pub somatic: bool,
    pub material: bool,
    pub material_desc: Option<String>,
    pub concentration: bool,
    pub ritual: bool,
    pub description: String,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized {
    pub spell: NormalizedSpell,
    pub classes: Vec<ClassAssociation>,
}

/// Converts raw entries. Holds no state besides the parenthesis policy,
/// so one instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Reject components with an unclosed material parenthesis instead of
    /// truncating the description.
    pub strict_components: bool,
}

impl Normalizer {
    pub fn new(strict_components: bool) -> Self {
        Normalizer { strict_components }
    }

    pub fn normalize(&self, entry: &RawEntry) -> Result<Normalized, ConvertError> {
        let school = School::from_code(&entry.school)?;
        let source = Source::classify(&entry.name);
        let components = if self.strict_components {
            parse_components_strict(&entry.components)?
        } else {
            parse_components(&entry.components)
        };
        let description = assemble_description(entry.texts.as_slice());
        let classes = parse_classes(&entry.classes)?;

        let spell = NormalizedSpell {
            name: strip_source(&entry.name),
            level: entry.level.clone(),
            school,
            cast_time: entry.time.clone(),
            duration: entry.duration.clone(),
            range: entry.range.clone(),
            verbal: components.verbal,
            somatic: components.somatic,
            material: components.material,
            material_desc: components.material_desc,
            concentration: description.concentration,
            ritual: is_ritual(&entry.ritual),
            description: description.text,
            source,
        };

        Ok(Normalized { spell, classes })
    }
}

/// Convert one entry with the default (lenient) component handling.
pub fn normalize(entry: &RawEntry) -> Result<Normalized, ConvertError> {
    Normalizer::default().normalize(entry)
}

/// The compendium writes either "YES" or nothing.
pub fn is_ritual(token: &str) -> bool {
    token == RITUAL_TOKEN
}
