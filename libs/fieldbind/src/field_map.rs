use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::MapError;
use crate::key::FieldKey;
use crate::options::{BindSpec, FieldOptions};

/// Per-type table of registered fields.
///
/// - `forward`: ordered `FieldKey → FieldOptions`: inherited entries in the
///   parent's order, then the type's own entries in declaration order.
/// - `reverse`: `output key → FieldKey`, the field that claimed the key last.
///
/// A finished map is immutable. Child types start from a clone of it via
/// [`FieldMap::inherit`], never from a live reference to the parent.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    forward: IndexMap<FieldKey, FieldOptions>,
    reverse: HashMap<String, FieldKey>,
}

impl FieldMap {
    pub fn builder() -> FieldMapBuilder {
        FieldMapBuilder::new()
    }

    /// Start a child type's declaration, seeded with this map's entries.
    pub fn inherit(&self) -> FieldMapBuilder {
        FieldMapBuilder::inheriting(self)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Entries in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldOptions)> + '_ {
        self.forward.iter()
    }

    pub fn get(&self, key: &FieldKey) -> Option<&FieldOptions> {
        self.forward.get(key)
    }

    /// Field that currently owns `output_key`.
    pub fn owner_of(&self, output_key: &str) -> Option<&FieldKey> {
        self.reverse.get(output_key)
    }

    /// Owning field and its options for an incoming document key.
    pub fn resolve(&self, output_key: &str) -> Option<(&FieldKey, &FieldOptions)> {
        let key = self.reverse.get(output_key)?;
        self.get(key).map(|opts| (key, opts))
    }
}

/// Declaration pass of a single type.
///
/// Tracks which output keys the type itself claimed so far; only those take
/// part in the duplicate check; inherited keys may be shadowed freely.
#[derive(Debug, Default)]
pub struct FieldMapBuilder {
    map: FieldMap,
    own: HashMap<String, FieldKey>,
}

impl FieldMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inheriting(parent: &FieldMap) -> Self {
        Self {
            map: parent.clone(),
            own: HashMap::new(),
        }
    }

    /// Register one field. Called once per field, in declaration order.
    ///
    /// Registering the same `FieldKey` again rebinds it in place.
    pub fn register(
        &mut self,
        key: impl Into<FieldKey>,
        spec: impl Into<BindSpec>,
    ) -> Result<&mut Self, MapError> {
        let key = key.into();
        let options = spec.into().normalize(&key)?;
        let output_key = options.output_key.clone();

        if let Some(owner) = self.own.get(&output_key)
            && owner != &key
        {
            return Err(MapError::DuplicateOutputKey(output_key));
        }

        if let Some(slot) = self.map.forward.get_mut(&key) {
            let previous = std::mem::replace(slot, options);
            if previous.output_key != output_key {
                self.release(&key, &previous.output_key);
            }
            tracing::debug!(
                field = %key,
                from = %previous.output_key,
                to = %output_key,
                "field rebound"
            );
        } else {
            self.map.forward.insert(key.clone(), options);
            tracing::debug!(field = %key, output_key = %output_key, "field registered");
        }

        if let Some(shadowed) = self.map.reverse.insert(output_key.clone(), key.clone())
            && shadowed != key
        {
            tracing::debug!(
                field = %key,
                %shadowed,
                output_key = %output_key,
                "inherited output key shadowed"
            );
        }
        self.own.insert(output_key, key);
        Ok(self)
    }

    /// Move a field that is already in the map to a new binding.
    ///
    /// Unlike [`register`](Self::register), never adds a field: a key the map
    /// does not hold yet is rejected with [`MapError::UnknownField`].
    pub fn rebind(
        &mut self,
        key: impl Into<FieldKey>,
        spec: impl Into<BindSpec>,
    ) -> Result<&mut Self, MapError> {
        let key = key.into();
        if !self.map.forward.contains_key(&key) {
            return Err(MapError::UnknownField(key));
        }
        self.register(key, spec)
    }

    /// Drop `key`'s claim on an output key it no longer uses.
    ///
    /// If another field still emits under that key (an inherited field the
    /// released one had shadowed), the key routes back to it; the latest such
    /// field in map order wins.
    fn release(&mut self, key: &FieldKey, output_key: &str) {
        if self.own.get(output_key) == Some(key) {
            self.own.remove(output_key);
        }
        if self.map.reverse.get(output_key) != Some(key) {
            return;
        }
        let fallback = self
            .map
            .forward
            .iter()
            .rev()
            .find(|(other, opts)| *other != key && opts.output_key == output_key)
            .map(|(other, _)| other.clone());
        match fallback {
            Some(owner) => {
                tracing::debug!(
                    field = %owner,
                    output_key = %output_key,
                    "shadowed output key restored"
                );
                self.map.reverse.insert(output_key.to_string(), owner);
            }
            None => {
                self.map.reverse.remove(output_key);
            }
        }
    }

    pub fn finish(self) -> FieldMap {
        tracing::debug!(fields = self.map.len(), own = self.own.len(), "field map finalized");
        self.map
    }
}
