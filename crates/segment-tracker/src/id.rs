use std::fmt;
use std::sync::Arc;

/// Identifier of a track (one adaptation set) inside a presentation.
///
/// Cheap to clone; events and notifications carry it by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(Arc<str>);

impl TrackId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}
