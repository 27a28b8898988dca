use std::sync::Arc;

use serde_json::Value;

use crate::error::MapError;
use crate::key::FieldKey;

/// Field-level value conversion.
///
/// Solves one task: turn a document value into another document value, in one
/// direction. Without a strategy a field passes its value through unchanged.
pub trait ValueStrategy: Send + Sync {
    fn apply(&self, value: Value) -> Value;
}

impl<F> ValueStrategy for F
where
    F: Fn(Value) -> Value + Send + Sync,
{
    fn apply(&self, value: Value) -> Value {
        self(value)
    }
}

pub type Strategy = Arc<dyn ValueStrategy>;

/// Normalized options of one registered field.
#[derive(Clone)]
pub struct FieldOptions {
    pub output_key: String,
    /// Applied to the field's value when building a document.
    pub to_document: Option<Strategy>,
    /// Applied to the incoming document value before it is stored.
    pub from_document: Option<Strategy>,
}

impl FieldOptions {
    pub fn new(output_key: impl Into<String>) -> Self {
        Self {
            output_key: output_key.into(),
            to_document: None,
            from_document: None,
        }
    }

    pub(crate) fn encode(&self, value: Value) -> Value {
        match &self.to_document {
            Some(strategy) => strategy.apply(value),
            None => value,
        }
    }

    pub(crate) fn decode(&self, value: Value) -> Value {
        match &self.from_document {
            Some(strategy) => strategy.apply(value),
            None => value,
        }
    }
}

impl std::fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldOptions")
            .field("output_key", &self.output_key)
            .field("to_document", &self.to_document.is_some())
            .field("from_document", &self.from_document.is_some())
            .finish()
    }
}

/// Options as supplied at registration time, before normalization.
///
/// - `()` / `BindSpec::default()`: no options, key derived from the field name.
/// - `"key"`: shorthand for an explicit output key.
/// - builder form: explicit key and/or strategies.
#[derive(Clone, Default)]
pub struct BindSpec {
    output_key: Option<String>,
    to_document: Option<Strategy>,
    from_document: Option<Strategy>,
}

impl BindSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, output_key: impl Into<String>) -> Self {
        self.output_key = Some(output_key.into());
        self
    }

    pub fn to_document<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.to_document_strategy(Arc::new(f))
    }

    pub fn from_document<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.from_document_strategy(Arc::new(f))
    }

    pub fn to_document_strategy(mut self, strategy: Strategy) -> Self {
        self.to_document = Some(strategy);
        self
    }

    pub fn from_document_strategy(mut self, strategy: Strategy) -> Self {
        self.from_document = Some(strategy);
        self
    }

    /// Resolve against the field it is registered for.
    pub fn normalize(self, field: &FieldKey) -> Result<FieldOptions, MapError> {
        let output_key = match (self.output_key, field) {
            (Some(key), _) => key,
            (None, FieldKey::Named(name)) => name.to_string(),
            (None, FieldKey::Opaque(_)) => {
                return Err(MapError::OpaqueKeyWithoutName(field.clone()));
            }
        };
        Ok(FieldOptions {
            output_key,
            to_document: self.to_document,
            from_document: self.from_document,
        })
    }
}

impl From<()> for BindSpec {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<&str> for BindSpec {
    fn from(key: &str) -> Self {
        Self::new().key(key)
    }
}

impl From<String> for BindSpec {
    fn from(key: String) -> Self {
        Self::new().key(key)
    }
}

impl From<FieldOptions> for BindSpec {
    fn from(options: FieldOptions) -> Self {
        Self {
            output_key: Some(options.output_key),
            to_document: options.to_document,
            from_document: options.from_document,
        }
    }
}
