use crate::key::FieldKey;

/// Category of a mapping error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid type declaration: a programmer mistake, fail at definition time.
    Config,
    /// Malformed document text or config source.
    Format,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Format => f.write_str("format"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("opaque field {0} requires an explicit output key")]
    OpaqueKeyWithoutName(FieldKey),

    #[error("duplicate output key: {0}")]
    DuplicateOutputKey(String),

    #[error("field {0} is not in the inherited map")]
    UnknownField(FieldKey),

    #[error("type '{0}' is already in use, its field map is frozen")]
    Frozen(String),

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("type already declared: {0}")]
    TypeAlreadyDeclared(String),

    #[error("document parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl MapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::Parse(_) | MapError::Config(_) => ErrorKind::Format,
            _ => ErrorKind::Config,
        }
    }

    /// Add context to the error.
    ///
    /// Only message-carrying variants change; the rest are returned as-is so
    /// that callers can still match on the offending key.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            MapError::Config(msg) => MapError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_names_the_key() {
        let err = MapError::DuplicateOutputKey("serialize_me".into());
        assert_eq!(err.to_string(), "duplicate output key: serialize_me");
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn config_context_is_prepended() {
        let err = MapError::Config("bad indent".into()).with_context("fieldbind.toml");
        assert_eq!(err.to_string(), "config error: fieldbind.toml: bad indent");
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
