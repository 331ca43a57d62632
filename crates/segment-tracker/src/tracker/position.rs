use std::fmt;
use std::sync::{Arc, Weak};

use crate::playlist::Representation;

/// Delivery progress within one representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionState {
    /// Initialization data has not been handed out yet
    #[default]
    NeedsInit,
    /// Initialization done, index data still pending
    NeedsIndex,
    Streaming,
}

/// Cursor into a representation's segment list.
///
/// Holds the representation weakly: once the catalog drops it the position
/// stops being valid instead of keeping stale segments alive.
#[derive(Debug, Clone, Default)]
pub struct Position {
    representation: Option<Weak<dyn Representation>>,
    pub number: u64,
    pub state: PositionState,
}

impl Position {
    /// Position at segment `number` of `representation`, before its
    /// initialization data.
    pub fn new(representation: &Arc<dyn Representation>, number: u64) -> Self {
        Self {
            representation: Some(Arc::downgrade(representation)),
            number,
            state: PositionState::NeedsInit,
        }
    }

    pub fn with_state(mut self, state: PositionState) -> Self {
        self.state = state;
        self
    }

    pub fn representation(&self) -> Option<Arc<dyn Representation>> {
        self.representation.as_ref()?.upgrade()
    }

    pub fn is_valid(&self) -> bool {
        self.representation
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// The position referenced a representation that has since been dropped.
    pub fn is_expired(&self) -> bool {
        self.representation
            .as_ref()
            .is_some_and(|weak| weak.strong_count() == 0)
    }

    #[inline]
    pub fn init_sent(&self) -> bool {
        self.state != PositionState::NeedsInit
    }

    #[inline]
    pub fn index_sent(&self) -> bool {
        self.state == PositionState::Streaming
    }

    /// Step past whatever this position currently points at.
    pub fn advance(&mut self) -> &mut Self {
        match self.state {
            PositionState::NeedsInit => self.state = PositionState::NeedsIndex,
            PositionState::NeedsIndex => self.state = PositionState::Streaming,
            PositionState::Streaming => self.number += 1,
        }
        self
    }

    /// Like [`advance`](Self::advance) but returns a copy.
    pub fn next(&self) -> Self {
        let mut next = self.clone();
        next.advance();
        next
    }

    /// Whether both positions reference the same live representation.
    pub fn same_representation(&self, other: &Self) -> bool {
        match (&self.representation, &other.representation) {
            (Some(a), Some(b)) => Weak::ptr_eq(a, b) && a.strong_count() > 0,
            _ => false,
        }
    }

    pub(crate) fn points_to(&self, representation: &Arc<dyn Representation>) -> bool {
        self.representation
            .as_ref()
            .is_some_and(|weak| std::ptr::addr_eq(weak.as_ptr(), Arc::as_ptr(representation)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.representation() {
            Some(rep) => write!(f, "{}#{} ({:?})", rep.id(), self.number, self.state),
            None => f.write_str("<invalid>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::SegmentListRepresentation;
    use std::time::Duration;

    fn representation(id: &str) -> Arc<dyn Representation> {
        Arc::new(
            SegmentListRepresentation::builder(id)
                .segments(4, Duration::from_secs(1))
                .build(),
        )
    }

    #[test]
    fn test_default_is_invalid() {
        let position = Position::default();
        assert!(!position.is_valid());
        assert!(position.representation().is_none());
        assert_eq!(position.to_string(), "<invalid>");
    }

    #[test]
    fn test_advance_walks_states_then_numbers() {
        let rep = representation("v");
        let mut position = Position::new(&rep, 3);
        assert!(!position.init_sent());

        position.advance();
        assert_eq!(position.state, PositionState::NeedsIndex);
        assert!(position.init_sent());
        assert!(!position.index_sent());

        position.advance();
        assert_eq!(position.state, PositionState::Streaming);
        assert_eq!(position.number, 3);

        position.advance().advance();
        assert_eq!(position.number, 5);
        assert!(position.index_sent());
        assert_eq!(position.to_string(), "v#5 (Streaming)");
    }

    #[test]
    fn test_dropped_representation_invalidates() {
        let rep = representation("gone");
        let position = Position::new(&rep, 0);
        assert!(position.is_valid());
        drop(rep);
        assert!(!position.is_valid());
        assert!(position.is_expired());
        assert!(position.representation().is_none());
    }

    #[test]
    fn test_same_representation() {
        let a = representation("a");
        let b = representation("b");
        let pa = Position::new(&a, 0);
        assert!(pa.same_representation(&Position::new(&a, 7)));
        assert!(!pa.same_representation(&Position::new(&b, 0)));
        assert!(!pa.same_representation(&Position::default()));
        assert!(pa.points_to(&a));
        assert!(!pa.points_to(&b));
    }
}
