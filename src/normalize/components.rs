use crate::error::ConvertError;

/// Component flags parsed out of the one-line compendium field,
/// e.g. "V, S, M (a pinch of sulfur)".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Components {
    pub verbal: bool,
    pub somatic: bool,
    pub material: bool,
    pub material_desc: Option<String>,
}

pub fn parse_components(raw: &str) -> Components {
    Components {
        verbal: has_verbal(raw),
        somatic: has_somatic(raw),
        material: has_material(raw),
        material_desc: material_description(raw),
    }
}

/// Like [`parse_components`], but rejects an opening parenthesis that the
/// string does not close at its end.
pub fn parse_components_strict(raw: &str) -> Result<Components, ConvertError> {
    if let Some(open) = raw.find('(') {
        if !raw[open + 1..].ends_with(')') {
            return Err(ConvertError::MalformedComponents {
                components: raw.to_string(),
            });
        }
    }
    Ok(parse_components(raw))
}

// Material descriptions are lower case in the compendium, so a bare
// letter check is enough for the flags.

pub fn has_verbal(raw: &str) -> bool {
    raw.contains('V')
}

pub fn has_somatic(raw: &str) -> bool {
    raw.contains('S')
}

pub fn has_material(raw: &str) -> bool {
    raw.contains('M')
}

/// Text between the first `(` and the last character of the string,
/// first letter capitalized. Empty text is no description at all.
pub fn material_description(raw: &str) -> Option<String> {
    let open = raw.find('(')?;
    let mut inner = raw[open + 1..].chars();
    inner.next_back();
    capitalize_first(inner.as_str())
}

/// Upper-cases the first character only when it has a single-character
/// upper-case form; `ß` and similar are left alone so the length is kept.
fn capitalize_first(s: &str) -> Option<String> {
    let mut chars = s.chars();
    let first = chars.next()?;
    let mut upper = first.to_uppercase();
    let first = match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => first,
    };
    Some(std::iter::once(first).chain(chars).collect())
}
