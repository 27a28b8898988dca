use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::RenderConfig;
use crate::error::MapError;
use crate::field_map::FieldMap;
use crate::key::FieldKey;

/// Field access on an instance, addressed by [`FieldKey`].
///
/// - `get_field()`: current value of the field, `None` if it holds nothing
///   (the field is then left out of the document).
/// - `set_field()`: store a value; returns `false` when the field cannot hold
///   it, leaving the previous value in place.
pub trait Instance {
    fn get_field(&self, key: &FieldKey) -> Option<Value>;
    fn set_field(&mut self, key: &FieldKey, value: Value) -> bool;
}

/// Incoming document: JSON text or an already parsed value.
#[derive(Debug, Clone)]
pub enum Document<'a> {
    Text(Cow<'a, str>),
    Value(Value),
}

impl Document<'_> {
    pub fn into_value(self) -> Result<Value, MapError> {
        match self {
            Document::Text(text) => Ok(serde_json::from_str(&text)?),
            Document::Value(value) => Ok(value),
        }
    }
}

impl<'a> From<&'a str> for Document<'a> {
    fn from(text: &'a str) -> Self {
        Document::Text(Cow::Borrowed(text))
    }
}

impl From<String> for Document<'_> {
    fn from(text: String) -> Self {
        Document::Text(Cow::Owned(text))
    }
}

impl From<Value> for Document<'_> {
    fn from(value: Value) -> Self {
        Document::Value(value)
    }
}

impl From<Map<String, Value>> for Document<'_> {
    fn from(map: Map<String, Value>) -> Self {
        Document::Value(Value::Object(map))
    }
}

/// Build a document from `instance`, walking `map` in forward order.
///
/// A later entry writing an output key that is already present replaces the
/// value but keeps the key's original position.
pub fn serialize<I: Instance + ?Sized>(map: &FieldMap, instance: &I) -> Value {
    let mut document = Map::new();
    for (key, options) in map.iter() {
        let Some(raw) = instance.get_field(key) else {
            tracing::trace!(field = %key, "field holds no value, skipped");
            continue;
        };
        document.insert(options.output_key.clone(), options.encode(raw));
    }
    Value::Object(document)
}

/// Populate `instance` from `document`.
///
/// Keys not owned by any field are ignored. Each key reaches exactly one
/// field, the one `map` resolves it to. A document that is not an object
/// carries no keys and changes nothing.
pub fn deserialize<I: Instance + ?Sized>(map: &FieldMap, instance: &mut I, document: Value) {
    let Value::Object(entries) = document else {
        tracing::trace!("document is not an object, nothing to assign");
        return;
    };
    for (output_key, incoming) in entries {
        let Some((key, options)) = map.resolve(&output_key) else {
            tracing::trace!(%output_key, "unknown document key ignored");
            continue;
        };
        if !instance.set_field(key, options.decode(incoming)) {
            tracing::warn!(field = %key, %output_key, "value does not fit field, dropped");
        }
    }
}

/// Render a document to JSON text.
pub fn render(document: &Value, config: &RenderConfig) -> Result<String, MapError> {
    if !config.pretty {
        return Ok(document.to_string());
    }
    let indent = " ".repeat(config.indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    document.serialize(&mut ser)?;
    String::from_utf8(out).map_err(|e| MapError::Config(e.to_string()))
}

/// A type with a static field map.
///
/// Usually implemented with `#[derive(Mapped)]`.
pub trait Mapped: Instance + Sized {
    fn field_map() -> &'static FieldMap;

    fn to_document(&self) -> Value {
        serialize(Self::field_map(), self)
    }

    fn to_json(&self) -> String {
        self.to_document().to_string()
    }

    fn to_json_with(&self, config: &RenderConfig) -> Result<String, MapError> {
        render(&self.to_document(), config)
    }

    /// Assign from JSON text or a parsed value. Returns `self` for chaining.
    fn from_json<'a>(
        &mut self,
        document: impl Into<Document<'a>>,
    ) -> Result<&mut Self, MapError> {
        let document = document.into().into_value()?;
        Ok(self.from_document(document))
    }

    fn from_document(&mut self, document: Value) -> &mut Self {
        deserialize(Self::field_map(), self, document);
        self
    }
}
