use thiserror::Error;

/// Why a single compendium entry could not be turned into a spell record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("unknown school code {code:?}")]
    UnknownSchool { code: String },

    #[error("unknown class {name:?} in class list {classes:?}")]
    UnknownClass { name: String, classes: String },

    #[error("unbalanced parentheses in components {components:?}")]
    MalformedComponents { components: String },
}
