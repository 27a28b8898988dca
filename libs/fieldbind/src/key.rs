use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OPAQUE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a field that has no textual form.
///
/// Every call to [`OpaqueKey::new`] yields a distinct key, even for equal
/// descriptions. The description only shows up in `Debug`/`Display` output
/// and is never used as an output key.
#[derive(Debug, Clone)]
pub struct OpaqueKey {
    id: u64,
    description: Option<Cow<'static, str>>,
}

impl OpaqueKey {
    pub fn new(description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: NEXT_OPAQUE_ID.fetch_add(1, Ordering::Relaxed),
            description: Some(description.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: NEXT_OPAQUE_ID.fetch_add(1, Ordering::Relaxed),
            description: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for OpaqueKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OpaqueKey {}

impl Hash for OpaqueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Stable identity of a declared field within a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// Field addressed by name. The name doubles as the default output key.
    Named(Cow<'static, str>),
    /// Field without a textual form; needs an explicit output key.
    Opaque(OpaqueKey),
}

impl FieldKey {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        FieldKey::Named(name.into())
    }

    pub fn opaque(description: impl Into<Cow<'static, str>>) -> Self {
        FieldKey::Opaque(OpaqueKey::new(description))
    }

    /// Textual form, if the key has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            FieldKey::Named(name) => Some(name),
            FieldKey::Opaque(_) => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, FieldKey::Opaque(_))
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKey::Named(name) => f.write_str(name),
            FieldKey::Opaque(key) => match key.description() {
                Some(desc) => write!(f, "opaque#{}({desc})", key.id()),
                None => write!(f, "opaque#{}", key.id()),
            },
        }
    }
}

impl From<&'static str> for FieldKey {
    fn from(name: &'static str) -> Self {
        FieldKey::Named(Cow::Borrowed(name))
    }
}

impl From<String> for FieldKey {
    fn from(name: String) -> Self {
        FieldKey::Named(Cow::Owned(name))
    }
}

impl From<OpaqueKey> for FieldKey {
    fn from(key: OpaqueKey) -> Self {
        FieldKey::Opaque(key)
    }
}
