use quick_xml::escape::escape;

const PARAGRAPH_BREAK: &str = "\n\n";
const CONCENTRATION: &str = "concentration";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    pub text: String,
    pub concentration: bool,
}

/// Join `<text>` fragments into one description. Empty fragments are the
/// compendium's paragraph separators; everything else is HTML-escaped.
pub fn assemble_description<S: AsRef<str>>(fragments: &[S]) -> Description {
    let mut text = String::new();
    for fragment in fragments {
        let fragment = fragment.as_ref();
        if fragment.is_empty() {
            text.push_str(PARAGRAPH_BREAK);
        } else {
            text.push_str(&escape(fragment));
        }
    }

    Description {
        text,
        concentration: requires_concentration(fragments),
    }
}

/// There is no concentration field in the compendium; the prose is the only signal.
pub fn requires_concentration<S: AsRef<str>>(fragments: &[S]) -> bool {
    fragments
        .iter()
        .any(|f| f.as_ref().contains(CONCENTRATION))
}
