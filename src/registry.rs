//! Source registry.
//!
//! The registry is the ordered list of monitored sources, built once at
//! startup. Its order is significant: pairs are enumerated as `(i, j)` with
//! `i < j` over this order, which fixes both which offsets are computed and
//! how they are named (`first_vs_second`).

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a source in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(usize);

impl SourceId {
    /// Position of the source in the registry.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A configured source: its name and the external address it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub address: String,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// A source whose address is its own name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            address: name.clone(),
            name,
        }
    }
}

/// Ordered, immutable set of sources.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<SourceSpec>,
    by_name: HashMap<String, SourceId>,
}

impl SourceRegistry {
    /// Build a registry, keeping the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, a name is repeated, or a name
    /// is empty. Names are otherwise opaque; `SR:BPM01:X` is fine.
    pub fn new(sources: Vec<SourceSpec>) -> Result<Self> {
        if sources.is_empty() {
            return Err(SyncError::EmptyRegistry);
        }

        let mut by_name = HashMap::with_capacity(sources.len());
        for (i, spec) in sources.iter().enumerate() {
            validate_name(&spec.name)?;
            if by_name.insert(spec.name.clone(), SourceId(i)).is_some() {
                return Err(SyncError::DuplicateSource(spec.name.clone()));
            }
        }

        Ok(Self { sources, by_name })
    }

    /// Build a registry where every address equals the source name.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(SourceSpec::named).collect())
    }

    /// Look up a source by name.
    pub fn id(&self, name: &str) -> Option<SourceId> {
        self.by_name.get(name).copied()
    }

    /// Look up a source by name, failing on unknown names.
    pub fn require(&self, name: &str) -> Result<SourceId> {
        self.id(name)
            .ok_or_else(|| SyncError::UnknownSource(name.to_string()))
    }

    pub fn name(&self, id: SourceId) -> &str {
        &self.sources[id.0].name
    }

    pub fn address(&self, id: SourceId) -> &str {
        &self.sources[id.0].address
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Always false for a constructed registry; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Source ids in registry order.
    pub fn ids(&self) -> impl Iterator<Item = SourceId> {
        (0..self.sources.len()).map(SourceId)
    }

    /// Source specs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &SourceSpec)> {
        self.sources.iter().enumerate().map(|(i, s)| (SourceId(i), s))
    }

    /// Every pair `(i, j)` with `i < j`, ordered by `i` then `j`.
    pub fn pairs(&self) -> impl Iterator<Item = (SourceId, SourceId)> {
        let n = self.sources.len();
        (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (SourceId(i), SourceId(j))))
    }

    /// Number of pairs, C(n, 2).
    pub fn pair_count(&self) -> usize {
        let n = self.sources.len();
        n * n.saturating_sub(1) / 2
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SyncError::InvalidSourceName {
            name: name.to_string(),
            reason: "name is empty".to_string(),
        });
    }
    Ok(())
}
