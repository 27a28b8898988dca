//! Per-field mapping between Rust values and JSON-shaped documents.
//!
//! A type declares, field by field, which document key the field maps to and
//! how its value converts in each direction. The resulting [`FieldMap`] then
//! drives [`serialize`](engine::serialize) and
//! [`deserialize`](engine::deserialize).

extern crate self as fieldbind;

pub mod config;
pub mod engine;
pub mod error;
pub mod field_map;
pub mod key;
pub mod options;
pub mod registry;
pub mod value;

pub use fieldbind_derive::Mapped;

pub use config::{EngineConfig, RenderConfig};
pub use engine::{Document, Instance, Mapped};
pub use error::{ErrorKind, MapError};
pub use field_map::{FieldMap, FieldMapBuilder};
pub use key::{FieldKey, OpaqueKey};
pub use options::{BindSpec, FieldOptions, Strategy, ValueStrategy};
pub use registry::{Record, TypeRegistry};
pub use value::{FromValue, IntoValue};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;

    use crate::{FieldMapBuilder, MapError};

    /// Outcome of one derived declaration step. Duplicate own keys are
    /// rejected at compile time; a `rebind` of a field the parent never
    /// registered is left out of the map and logged.
    pub fn declared(type_name: &str, result: Result<&mut FieldMapBuilder, MapError>) {
        if let Err(error) = result {
            tracing::error!(type_name, %error, "field binding skipped");
        }
    }
}
