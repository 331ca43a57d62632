use std::sync::Arc;

use media_types::{TrackCategory, TrackRole};

use super::Representation;
use crate::TrackId;

/// Interchangeable representations of one track.
#[derive(Debug, Clone)]
pub struct AdaptationSet {
    id: TrackId,
    category: TrackCategory,
    role: TrackRole,
    language: Option<String>,
    segment_aligned: bool,
    representations: Vec<Arc<dyn Representation>>,
}

impl AdaptationSet {
    pub fn new(id: impl Into<TrackId>, category: TrackCategory) -> Self {
        Self {
            id: id.into(),
            category,
            role: TrackRole::default(),
            language: None,
            segment_aligned: true,
            representations: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: TrackRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Whether segment boundaries line up across representations, which is
    /// what makes switching at a boundary seamless.
    pub fn with_segment_aligned(mut self, aligned: bool) -> Self {
        self.segment_aligned = aligned;
        self
    }

    pub fn with_representation(mut self, representation: Arc<dyn Representation>) -> Self {
        self.representations.push(representation);
        self
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn category(&self) -> TrackCategory {
        self.category
    }

    pub fn role(&self) -> TrackRole {
        self.role
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_segment_aligned(&self) -> bool {
        self.segment_aligned
    }

    pub fn representations(&self) -> &[Arc<dyn Representation>] {
        &self.representations
    }

    pub fn is_empty(&self) -> bool {
        self.representations.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Arc<dyn Representation>> {
        self.representations.iter().find(|r| r.id() == id)
    }

    /// Highest declared bandwidth; the first one listed wins ties.
    pub fn best(&self) -> Option<&Arc<dyn Representation>> {
        self.representations
            .iter()
            .rev()
            .max_by_key(|r| r.bandwidth())
    }

    /// Lowest declared bandwidth; the first one listed wins ties.
    pub fn lowest(&self) -> Option<&Arc<dyn Representation>> {
        self.representations.iter().min_by_key(|r| r.bandwidth())
    }
}
