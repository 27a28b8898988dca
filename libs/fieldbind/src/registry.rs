use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::RenderConfig;
use crate::engine::{self, Document, Instance};
use crate::error::MapError;
use crate::field_map::{FieldMap, FieldMapBuilder};
use crate::key::FieldKey;
use crate::options::BindSpec;
use crate::value::IntoValue;

enum TypeState {
    /// Declaration pass still open. The builder is created on the first
    /// registration, seeded from the parent's finalized map.
    Declaring {
        parent: Option<Arc<FieldMap>>,
        builder: Option<FieldMapBuilder>,
    },
    Finalized(Arc<FieldMap>),
}

/// Types declared at runtime, by name, each with an optional parent.
///
/// A type's map is finalized the first time it is used: asked for its map,
/// instantiated, or extended by a child type. After that, registration
/// against it fails with [`MapError::Frozen`].
#[derive(Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeState>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(
        &mut self,
        name: impl Into<String>,
        parent: Option<&str>,
    ) -> Result<(), MapError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(MapError::TypeAlreadyDeclared(name));
        }
        let parent = parent.map(|p| self.field_map(p)).transpose()?;
        tracing::debug!(type_name = %name, has_parent = parent.is_some(), "type declared");
        self.types.insert(name, TypeState::Declaring { parent, builder: None });
        Ok(())
    }

    /// Register a field on a type still being declared.
    ///
    /// A configuration error aborts the declaration: the type is removed and
    /// has to be declared again.
    pub fn register(
        &mut self,
        type_name: &str,
        key: impl Into<FieldKey>,
        spec: impl Into<BindSpec>,
    ) -> Result<(), MapError> {
        self.declaring(type_name, |builder| builder.register(key, spec).map(|_| ()))
    }

    /// Move an inherited field of a type still being declared to a new
    /// binding. Fails with [`MapError::UnknownField`] if the parent chain
    /// never registered `key`, aborting the declaration like
    /// [`register`](Self::register).
    pub fn rebind(
        &mut self,
        type_name: &str,
        key: impl Into<FieldKey>,
        spec: impl Into<BindSpec>,
    ) -> Result<(), MapError> {
        self.declaring(type_name, |builder| builder.rebind(key, spec).map(|_| ()))
    }

    fn declaring(
        &mut self,
        type_name: &str,
        apply: impl FnOnce(&mut FieldMapBuilder) -> Result<(), MapError>,
    ) -> Result<(), MapError> {
        let result = match self.types.get_mut(type_name) {
            None => return Err(MapError::UnknownType(type_name.to_string())),
            Some(TypeState::Finalized(_)) => return Err(MapError::Frozen(type_name.to_string())),
            Some(TypeState::Declaring { parent, builder }) => {
                apply(builder.get_or_insert_with(|| match parent {
                    Some(parent) => parent.inherit(),
                    None => FieldMapBuilder::new(),
                }))
            }
        };
        if let Err(e) = &result {
            tracing::debug!(%type_name, error = %e, "declaration aborted");
            self.types.remove(type_name);
        }
        result
    }

    /// Finalized map of a type, freezing it on first call.
    pub fn field_map(&mut self, type_name: &str) -> Result<Arc<FieldMap>, MapError> {
        let state = self
            .types
            .get_mut(type_name)
            .ok_or_else(|| MapError::UnknownType(type_name.to_string()))?;
        let map = match state {
            TypeState::Finalized(map) => return Ok(Arc::clone(map)),
            TypeState::Declaring { parent, builder } => match (builder.take(), parent.take()) {
                (Some(builder), _) => Arc::new(builder.finish()),
                (None, Some(parent)) => parent,
                (None, None) => Arc::new(FieldMap::default()),
            },
        };
        tracing::debug!(%type_name, fields = map.len(), "type frozen");
        *state = TypeState::Finalized(Arc::clone(&map));
        Ok(map)
    }

    pub fn instantiate(&mut self, type_name: &str) -> Result<Record, MapError> {
        Ok(Record::new(self.field_map(type_name)?))
    }

    pub fn is_declared(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn is_frozen(&self, type_name: &str) -> bool {
        matches!(self.types.get(type_name), Some(TypeState::Finalized(_)))
    }
}

/// Dynamic instance of a registry type.
///
/// Holds any field, registered or not; only registered ones take part in
/// conversion.
#[derive(Debug, Clone)]
pub struct Record {
    map: Arc<FieldMap>,
    values: HashMap<FieldKey, Value>,
}

impl Record {
    pub fn new(map: Arc<FieldMap>) -> Self {
        Self {
            map,
            values: HashMap::new(),
        }
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.map
    }

    pub fn get(&self, key: &FieldKey) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<FieldKey>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn to_document(&self) -> Value {
        engine::serialize(&self.map, self)
    }

    pub fn to_json(&self) -> String {
        self.to_document().to_string()
    }

    pub fn to_json_with(&self, config: &RenderConfig) -> Result<String, MapError> {
        engine::render(&self.to_document(), config)
    }

    pub fn from_json<'a>(
        &mut self,
        document: impl Into<Document<'a>>,
    ) -> Result<&mut Self, MapError> {
        let document = document.into().into_value()?;
        Ok(self.from_document(document))
    }

    pub fn from_document(&mut self, document: Value) -> &mut Self {
        let map = Arc::clone(&self.map);
        engine::deserialize(&map, self, document);
        self
    }
}

impl Instance for Record {
    fn get_field(&self, key: &FieldKey) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_field(&mut self, key: &FieldKey, value: Value) -> bool {
        self.values.insert(key.clone(), value);
        true
    }
}

impl IntoValue for Record {
    fn into_value(&self) -> Value {
        self.to_document()
    }
}
