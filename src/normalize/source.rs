use serde::Serialize;

const EE_MARKER: &str = "(EE)";
const SCAG_MARKER: &str = "(SCAG)";

/// The book a spell was published in. Ids match the `source` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    #[serde(rename = "PHB")]
    PlayersHandbook,
    #[serde(rename = "EE")]
    ElementalEvil,
    #[serde(rename = "SCAG")]
    SwordCoast,
}

impl Source {
    pub const ALL: [Source; 3] = [
        Source::PlayersHandbook,
        Source::ElementalEvil,
        Source::SwordCoast,
    ];

    /// Detect the source book from the suffix markers in a raw spell name.
    /// A SCAG marker wins over an EE marker; no marker means the PHB.
    pub fn classify(name: &str) -> Self {
        let mut source = Source::PlayersHandbook;
        if name.contains(EE_MARKER) {
            source = Source::ElementalEvil;
        }
        if name.contains(SCAG_MARKER) {
            source = Source::SwordCoast;
        }
        source
    }

    pub fn id(self) -> i64 {
        match self {
            Source::PlayersHandbook => 1,
            Source::ElementalEvil => 2,
            Source::SwordCoast => 3,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Source::PlayersHandbook => "PHB",
            Source::ElementalEvil => "EE",
            Source::SwordCoast => "SCAG",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Source::PlayersHandbook => "Player's Handbook",
            Source::ElementalEvil => "Elemental Evil Player's Companion",
            Source::SwordCoast => "Sword Coast Adventurer's Guide",
        }
    }
}

/// Remove both source suffixes from a raw name.
pub fn strip_source(name: &str) -> String {
    name.replace(" (EE)", "").replace(" (SCAG)", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elemental_evil_suffix() {
        assert_eq!(Source::classify("Fireball (EE)"), Source::ElementalEvil);
        assert_eq!(strip_source("Fireball (EE)"), "Fireball");
    }

    #[test]
    fn sword_coast_suffix() {
        assert_eq!(Source::classify("Produce Flame (SCAG)"), Source::SwordCoast);
        assert_eq!(strip_source("Produce Flame (SCAG)"), "Produce Flame");
    }

    #[test]
    fn no_suffix_defaults_to_players_handbook() {
        assert_eq!(Source::classify("Fireball"), Source::PlayersHandbook);
        assert_eq!(strip_source("Fireball"), "Fireball");
    }

    #[test]
    fn strip_is_idempotent() {
        let once = strip_source("Booming Blade (SCAG)");
        assert_eq!(strip_source(&once), once);
    }

    #[test]
    fn scag_wins_when_both_markers_present() {
        let name = "Odd Spell (EE) (SCAG)";
        assert_eq!(Source::classify(name), Source::SwordCoast);
        assert_eq!(strip_source(name), "Odd Spell");
    }

    #[test]
    fn marker_without_leading_space_classifies_but_is_kept() {
        assert_eq!(Source::classify("Glitch(EE)"), Source::ElementalEvil);
        assert_eq!(strip_source("Glitch(EE)"), "Glitch(EE)");
    }

    #[test]
    fn ids_are_stable() {
        let ids: Vec<i64> = Source::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
