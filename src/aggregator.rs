//! Aggregator - event recording and recomputation passes.
//!
//! The [`Aggregator`] owns one [`SampleWindow`] per registered source. Each
//! call to [`Aggregator::record_event`] appends the arrival to its source's
//! window and then runs a full recomputation pass: frequency statistics for
//! every source and offset statistics for every pair are recomputed from the
//! current windows and published. Nothing is coalesced or deferred; the pass
//! is complete when `record_event` returns.
//!
//! Work per event is O(N + N²) in the number of sources, which is fine for
//! tens of sources.
//!
//! The aggregator takes `&mut self` for every mutation and is meant to have
//! a single owner. Concurrent producers must funnel events through that
//! owner (one lock, or one consumer of a channel).

use crate::config::EngineConfig;
use crate::error::{Result, SyncError};
use crate::frequency::{FrequencyStats, FrequencyStatsCalculator};
use crate::metric::MetricTable;
use crate::pairwise::{PairDiffStats, PairwiseDiffCalculator};
use crate::registry::{SourceId, SourceRegistry};
use crate::sink::MetricsSink;
use crate::window::{Arrival, SampleWindow};

/// Lifecycle of an aggregator. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Running,
    Stopped,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Running => "running",
            EngineState::Stopped => "stopped",
        }
    }
}

/// Result of one recorded event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassReport {
    pub source: SourceId,
    pub arrival: Arrival,
    /// Number of scalars published by the pass.
    pub published: usize,
}

/// Owner of all source windows; drives recomputation and publication.
#[derive(Debug)]
pub struct Aggregator {
    registry: SourceRegistry,
    windows: Vec<SampleWindow>,
    metrics: MetricTable,
    frequency: FrequencyStatsCalculator,
    pairwise: PairwiseDiffCalculator,
    config: EngineConfig,
    state: EngineState,

    // Counters
    events_recorded: u64,
    events_rejected: u64,
    passes: u64,
}

impl Aggregator {
    /// Create an aggregator with one empty window per registered source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(registry: SourceRegistry, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let windows = registry
            .ids()
            .map(|_| SampleWindow::new(config.window_capacity, config.delta_policy))
            .collect();
        let metrics = MetricTable::new(&registry);

        log::debug!(
            "aggregator created: {} sources, {} pairs, capacity {}",
            registry.len(),
            registry.pair_count(),
            config.window_capacity
        );

        Ok(Self {
            registry,
            windows,
            metrics,
            frequency: FrequencyStatsCalculator::new(),
            pairwise: PairwiseDiffCalculator::new(),
            config,
            state: EngineState::Uninitialized,
            events_recorded: 0,
            events_rejected: 0,
            passes: 0,
        })
    }

    /// Start accepting events. No effect once stopped.
    pub fn start(&mut self) {
        if self.state == EngineState::Uninitialized {
            self.state = EngineState::Running;
            log::info!("aggregator running");
        }
    }

    /// Stop accepting events. Windows are kept for inspection.
    pub fn stop(&mut self) {
        if self.state != EngineState::Stopped {
            self.state = EngineState::Stopped;
            log::info!(
                "aggregator stopped after {} events ({} rejected)",
                self.events_recorded,
                self.events_rejected
            );
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Record an arrival for `source` and run a full recomputation pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not registered or the engine is not
    /// running. The event is dropped and no pass is run; the caller decides
    /// how to report it.
    pub fn record_event<S>(
        &mut self,
        source: &str,
        timestamp: f64,
        sink: &mut S,
    ) -> Result<PassReport>
    where
        S: MetricsSink + ?Sized,
    {
        if self.state != EngineState::Running {
            self.events_rejected += 1;
            return Err(SyncError::NotRunning(self.state));
        }

        let id = match self.registry.require(source) {
            Ok(id) => id,
            Err(e) => {
                self.events_rejected += 1;
                return Err(e);
            }
        };

        let arrival = self.windows[id.index()].record_arrival(timestamp);
        if let Arrival::Dropped { delta } = arrival {
            log::debug!(
                "dropped arrival for {} at {} (delta {})",
                source,
                timestamp,
                delta
            );
        }
        self.events_recorded += 1;

        let published = self.recompute(sink);

        Ok(PassReport {
            source: id,
            arrival,
            published,
        })
    }

    /// Run a recomputation pass over every source and pair, publishing each
    /// non-empty result. Returns the number of scalars published.
    pub fn recompute<S>(&mut self, sink: &mut S) -> usize
    where
        S: MetricsSink + ?Sized,
    {
        let mut published = 0;

        for id in self.registry.ids() {
            let window = &self.windows[id.index()];
            let handles = self.metrics.source(id);

            if let Some(stats) = self.frequency.compute(window) {
                sink.publish(&handles.instant, stats.instant);
                sink.publish(&handles.avg, stats.avg);
                sink.publish(&handles.min, stats.min);
                sink.publish(&handles.max, stats.max);
                sink.publish(&handles.std, stats.std);
                published += 5;
            }
            if let Some(t) = window.last_timestamp() {
                sink.publish(&handles.timestamp, t);
                published += 1;
            }
        }

        for pair in self.metrics.pairs() {
            let a = &self.windows[pair.first.index()];
            let b = &self.windows[pair.second.index()];

            if let Some(stats) = self.pairwise.compute(a, b) {
                sink.publish(&pair.current, stats.current);
                sink.publish(&pair.avg, stats.avg);
                sink.publish(&pair.min, stats.min);
                sink.publish(&pair.max, stats.max);
                sink.publish(&pair.std, stats.std);
                published += 5;
            }
        }

        self.passes += 1;
        published
    }

    /// Current window of a source.
    pub fn window(&self, source: &str) -> Option<&SampleWindow> {
        self.registry
            .id(source)
            .map(|id| &self.windows[id.index()])
    }

    /// Frequency statistics of a source, without publishing.
    pub fn frequency_stats(&self, source: &str) -> Result<Option<FrequencyStats>> {
        let id = self.registry.require(source)?;
        Ok(self.frequency.compute(&self.windows[id.index()]))
    }

    /// Offset statistics of `a` relative to `b`, without publishing.
    ///
    /// Either order is accepted; the canonical published pair is the one
    /// with `a` before `b` in registry order.
    pub fn pair_diff(&self, a: &str, b: &str) -> Result<Option<PairDiffStats>> {
        let a = self.registry.require(a)?;
        let b = self.registry.require(b)?;
        Ok(self
            .pairwise
            .compute(&self.windows[a.index()], &self.windows[b.index()]))
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &MetricTable {
        &self.metrics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of events applied to a window (including dropped arrivals).
    pub fn events_recorded(&self) -> u64 {
        self.events_recorded
    }

    /// Number of events refused (unknown source or not running).
    pub fn events_rejected(&self) -> u64 {
        self.events_rejected
    }

    /// Number of recomputation passes run.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
