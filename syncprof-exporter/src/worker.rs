// Syncprof Exporter - Ingest worker
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Single-consumer ingest queue.
//!
//! The [`Worker`] owns the [`Aggregator`]. Producers hold cloned
//! [`IngestHandle`]s and never touch the engine directly. After each event
//! the worker copies the pass's outputs into the [`SharedView`] read by the
//! HTTP handlers.

use crate::error::{ExporterError, Result};
use crate::metrics::{PrometheusSink, EVENTS_REJECTED_TOTAL, EVENTS_TOTAL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use syncprof::{Aggregator, EngineState};
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, info, warn};

/// One source update entering the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEvent {
    pub source: String,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    /// Reported value. Carried for logging only.
    #[serde(default)]
    pub value: Option<f64>,
}

impl SourceEvent {
    pub fn new(source: impl Into<String>, timestamp: f64) -> Self {
        Self {
            source: source.into(),
            timestamp,
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

/// Sending side of the ingest queue.
#[derive(Debug, Clone)]
pub struct IngestHandle {
    tx: mpsc::Sender<SourceEvent>,
}

impl IngestHandle {
    /// Wrap an existing channel sender.
    pub fn from_sender(tx: mpsc::Sender<SourceEvent>) -> Self {
        Self { tx }
    }

    /// Queue an event, waiting for room if the queue is full.
    pub async fn send(&self, event: SourceEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| ExporterError::QueueClosed)
    }

    /// True once the worker has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// What the HTTP side can see of the engine.
#[derive(Debug, Clone, Serialize)]
pub struct EngineView {
    pub state: &'static str,
    pub events_recorded: u64,
    pub events_rejected: u64,
    pub passes: u64,
    /// Latest value per metric name.
    pub values: BTreeMap<String, f64>,
}

impl EngineView {
    fn of(aggregator: &Aggregator) -> Self {
        Self {
            state: aggregator.state().as_str(),
            events_recorded: aggregator.events_recorded(),
            events_rejected: aggregator.events_rejected(),
            passes: aggregator.passes(),
            values: BTreeMap::new(),
        }
    }

    fn refresh(&mut self, aggregator: &Aggregator) {
        self.state = aggregator.state().as_str();
        self.events_recorded = aggregator.events_recorded();
        self.events_rejected = aggregator.events_rejected();
        self.passes = aggregator.passes();
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running.as_str()
    }
}

/// Shared, read-mostly engine view.
pub type SharedView = Arc<RwLock<EngineView>>;

/// Queue consumer that owns the engine.
pub struct Worker {
    aggregator: Aggregator,
    rx: mpsc::Receiver<SourceEvent>,
    view: SharedView,
    sink: PrometheusSink,
}

impl Worker {
    /// Create a worker and its queue. The aggregator is started here.
    pub fn new(mut aggregator: Aggregator, queue_depth: usize) -> (Self, IngestHandle, SharedView) {
        aggregator.start();
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let view = Arc::new(RwLock::new(EngineView::of(&aggregator)));

        let worker = Self {
            aggregator,
            rx,
            view: Arc::clone(&view),
            sink: PrometheusSink::new(),
        };
        (worker, IngestHandle { tx }, view)
    }

    /// Publish the initial pass so `/values` is populated before any event.
    pub async fn prime(&mut self) {
        self.aggregator.recompute(&mut self.sink);
        self.flush_view().await;
    }

    /// Consume events until every handle is dropped or `shutdown` fires,
    /// then stop the engine. Returns the engine for inspection.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Aggregator {
        info!(
            "Ingest worker running ({} sources, {} pairs)",
            self.aggregator.registry().len(),
            self.aggregator.registry().pair_count()
        );

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = self.rx.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
            }
        }

        self.rx.close();
        self.aggregator.stop();
        self.flush_view().await;
        info!(
            "Ingest worker stopped: {} events recorded, {} rejected",
            self.aggregator.events_recorded(),
            self.aggregator.events_rejected()
        );
        self.aggregator
    }

    /// Apply one event.
    pub async fn handle(&mut self, event: SourceEvent) {
        match self
            .aggregator
            .record_event(&event.source, event.timestamp, &mut self.sink)
        {
            Ok(report) => {
                EVENTS_TOTAL.inc();
                debug!(
                    source = %event.source,
                    timestamp = event.timestamp,
                    value = ?event.value,
                    published = report.published,
                    "event recorded"
                );
            }
            Err(e) if e.is_rejected_event() => {
                EVENTS_REJECTED_TOTAL.inc();
                debug!("event rejected: {}", e);
            }
            Err(e) => {
                EVENTS_REJECTED_TOTAL.inc();
                warn!("event failed: {}", e);
            }
        }
        self.flush_view().await;
    }

    async fn flush_view(&mut self) {
        let updates = self.sink.take_updates();
        let mut view = self.view.write().await;
        view.refresh(&self.aggregator);
        view.values.extend(updates);
    }
}
