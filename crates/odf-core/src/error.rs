/// Errors that abort a resolution batch.
///
/// Structural absence (missing parent, missing link target) and inheritance
/// cycles are not errors; only malformed input is.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The identifier passed to the resolver is not in the store.
    #[error("unknown identifier '{identifier}'")]
    UnknownIdentifier { identifier: String },

    /// A `classLabel` property holds a value that cannot name a parent.
    #[error("classLabel in section '{section}' of '{identifier}' is a {found}, expected a string")]
    MalformedClassLabel {
        identifier: String,
        section: String,
        found: &'static str,
    },
}
