//! Metric names and handles.
//!
//! Every derived scalar is addressed by a [`MetricName`]. Its display form
//! is the externally visible name:
//!
//! | Target | Form | Stats |
//! |--------|------|-------|
//! | source | `<source>:<Stat>` | `InstantFreq`, `AvgFreq`, `MinFreq`, `MaxFreq`, `StdFreq`, `Timestamp` |
//! | pair   | `<first>_vs_<second>:<Stat>` | `CurrentDiff`, `AvgDiff`, `MinDiff`, `MaxDiff`, `StdDiff` |
//!
//! All handles are built once from the registry into a [`MetricTable`], so a
//! recomputation pass never formats names.

use crate::registry::{SourceId, SourceRegistry};
use std::fmt;

/// Statistic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    InstantFreq,
    AvgFreq,
    MinFreq,
    MaxFreq,
    StdFreq,
    Timestamp,
    CurrentDiff,
    AvgDiff,
    MinDiff,
    MaxDiff,
    StdDiff,
}

impl Stat {
    /// Stats published per source.
    pub const SOURCE: [Stat; 6] = [
        Stat::InstantFreq,
        Stat::AvgFreq,
        Stat::MinFreq,
        Stat::MaxFreq,
        Stat::StdFreq,
        Stat::Timestamp,
    ];

    /// Stats published per pair.
    pub const PAIR: [Stat; 5] = [
        Stat::CurrentDiff,
        Stat::AvgDiff,
        Stat::MinDiff,
        Stat::MaxDiff,
        Stat::StdDiff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::InstantFreq => "InstantFreq",
            Stat::AvgFreq => "AvgFreq",
            Stat::MinFreq => "MinFreq",
            Stat::MaxFreq => "MaxFreq",
            Stat::StdFreq => "StdFreq",
            Stat::Timestamp => "Timestamp",
            Stat::CurrentDiff => "CurrentDiff",
            Stat::AvgDiff => "AvgDiff",
            Stat::MinDiff => "MinDiff",
            Stat::MaxDiff => "MaxDiff",
            Stat::StdDiff => "StdDiff",
        }
    }

    /// Short lowercase label (`instant`, `avg`, ..., `timestamp`, `current`).
    pub fn label(&self) -> &'static str {
        match self {
            Stat::InstantFreq => "instant",
            Stat::CurrentDiff => "current",
            Stat::AvgFreq | Stat::AvgDiff => "avg",
            Stat::MinFreq | Stat::MinDiff => "min",
            Stat::MaxFreq | Stat::MaxDiff => "max",
            Stat::StdFreq | Stat::StdDiff => "std",
            Stat::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a metric describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricTarget {
    Source { source: String },
    Pair { first: String, second: String },
}

impl MetricTarget {
    /// Prefix of the metric name (`<source>` or `<first>_vs_<second>`).
    pub fn prefix(&self) -> String {
        match self {
            MetricTarget::Source { source } => source.clone(),
            MetricTarget::Pair { first, second } => format!("{}_vs_{}", first, second),
        }
    }
}

/// Name of one derived scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricName {
    target: MetricTarget,
    stat: Stat,
    full: String,
}

impl MetricName {
    pub fn source(source: impl Into<String>, stat: Stat) -> Self {
        Self::new(
            MetricTarget::Source {
                source: source.into(),
            },
            stat,
        )
    }

    pub fn pair(first: impl Into<String>, second: impl Into<String>, stat: Stat) -> Self {
        Self::new(
            MetricTarget::Pair {
                first: first.into(),
                second: second.into(),
            },
            stat,
        )
    }

    fn new(target: MetricTarget, stat: Stat) -> Self {
        let full = format!("{}:{}", target.prefix(), stat);
        Self { target, stat, full }
    }

    pub fn target(&self) -> &MetricTarget {
        &self.target
    }

    pub fn stat(&self) -> Stat {
        self.stat
    }

    /// Full external name, e.g. `A_vs_B:AvgDiff`.
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// Handles for one source.
#[derive(Debug, Clone)]
pub struct SourceMetrics {
    pub instant: MetricName,
    pub avg: MetricName,
    pub min: MetricName,
    pub max: MetricName,
    pub std: MetricName,
    pub timestamp: MetricName,
}

impl SourceMetrics {
    fn new(source: &str) -> Self {
        Self {
            instant: MetricName::source(source, Stat::InstantFreq),
            avg: MetricName::source(source, Stat::AvgFreq),
            min: MetricName::source(source, Stat::MinFreq),
            max: MetricName::source(source, Stat::MaxFreq),
            std: MetricName::source(source, Stat::StdFreq),
            timestamp: MetricName::source(source, Stat::Timestamp),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricName> {
        [
            &self.instant,
            &self.avg,
            &self.min,
            &self.max,
            &self.std,
            &self.timestamp,
        ]
        .into_iter()
    }
}

/// Handles for one pair.
#[derive(Debug, Clone)]
pub struct PairMetrics {
    pub first: SourceId,
    pub second: SourceId,
    pub current: MetricName,
    pub avg: MetricName,
    pub min: MetricName,
    pub max: MetricName,
    pub std: MetricName,
}

impl PairMetrics {
    fn new(first: SourceId, second: SourceId, registry: &SourceRegistry) -> Self {
        let (a, b) = (registry.name(first), registry.name(second));
        Self {
            first,
            second,
            current: MetricName::pair(a, b, Stat::CurrentDiff),
            avg: MetricName::pair(a, b, Stat::AvgDiff),
            min: MetricName::pair(a, b, Stat::MinDiff),
            max: MetricName::pair(a, b, Stat::MaxDiff),
            std: MetricName::pair(a, b, Stat::StdDiff),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricName> {
        [&self.current, &self.avg, &self.min, &self.max, &self.std].into_iter()
    }
}

/// All metric handles, in registry order.
#[derive(Debug, Clone)]
pub struct MetricTable {
    sources: Vec<SourceMetrics>,
    pairs: Vec<PairMetrics>,
}

impl MetricTable {
    pub fn new(registry: &SourceRegistry) -> Self {
        let sources = registry
            .ids()
            .map(|id| SourceMetrics::new(registry.name(id)))
            .collect();
        let pairs = registry
            .pairs()
            .map(|(i, j)| PairMetrics::new(i, j, registry))
            .collect();
        Self { sources, pairs }
    }

    pub fn source(&self, id: SourceId) -> &SourceMetrics {
        &self.sources[id.index()]
    }

    /// Per-source handles, indexed like the registry.
    pub fn sources(&self) -> &[SourceMetrics] {
        &self.sources
    }

    /// Per-pair handles, in pair enumeration order.
    pub fn pairs(&self) -> &[PairMetrics] {
        &self.pairs
    }

    /// Every metric name the engine can publish.
    pub fn names(&self) -> impl Iterator<Item = &MetricName> {
        self.sources
            .iter()
            .flat_map(|s| s.iter())
            .chain(self.pairs.iter().flat_map(|p| p.iter()))
    }

    pub fn len(&self) -> usize {
        self.sources.len() * Stat::SOURCE.len() + self.pairs.len() * Stat::PAIR.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
