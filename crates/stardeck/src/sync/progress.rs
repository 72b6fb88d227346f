//! Progress reporting for sync runs.
//!
//! Many concurrent page workers produce progress increments; one logical
//! writer owns the outbound stream. [`CollectProgress`] serializes the
//! increments behind a mutex and holds it across the emit so reported
//! percentages can never go backwards, whatever order workers finish in.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Floor of the detail-collection percentage band.
///
/// The 0–10 band belongs to estimation, 10–80 to collection, 80–95 to
/// merge bookkeeping, and 95–100 to persistence and completion.
pub const COLLECT_FLOOR: usize = 10;

/// Ceiling of the detail-collection percentage band.
pub const COLLECT_CEILING: usize = 80;

/// Kind tag for a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    Start,
    Info,
    Progress,
    Error,
    Complete,
}

/// One progress message pushed to the interactive client.
///
/// Purely informational: consumers must treat the percentage as
/// monotonically non-decreasing within a run, and the type carries no
/// retry or resume semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub message: String,
    #[serde(rename = "progress")]
    pub percent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl ProgressEvent {
    /// The opening event of a sync run.
    #[must_use]
    pub fn start(message: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Start,
            message: message.into(),
            percent: 0,
            current: None,
            total: None,
        }
    }

    /// A phase-transition notice.
    #[must_use]
    pub fn info(percent: u8, message: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Info,
            message: message.into(),
            percent,
            current: None,
            total: None,
        }
    }

    /// A phase-transition notice carrying the known item total.
    #[must_use]
    pub fn info_with_total(percent: u8, message: impl Into<String>, total: usize) -> Self {
        Self {
            kind: ProgressKind::Info,
            message: message.into(),
            percent,
            current: None,
            total: Some(total),
        }
    }

    /// An incremental progress update with counts.
    #[must_use]
    pub fn progress(
        percent: u8,
        message: impl Into<String>,
        current: usize,
        total: usize,
    ) -> Self {
        Self {
            kind: ProgressKind::Progress,
            message: message.into(),
            percent,
            current: Some(current),
            total: Some(total),
        }
    }

    /// The terminal event for a failed run.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Error,
            message: message.into(),
            percent: 0,
            current: None,
            total: None,
        }
    }

    /// The terminal event for a successful run.
    #[must_use]
    pub fn complete(message: impl Into<String>, total: usize) -> Self {
        Self {
            kind: ProgressKind::Complete,
            message: message.into(),
            percent: 100,
            current: None,
            total: Some(total),
        }
    }
}

/// Outbound sink for progress events.
///
/// Delivery is best-effort: implementations swallow transport errors, since
/// a dropped client connection must not disturb the sync itself.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn send(&self, event: ProgressEvent);
}

/// Emit an event if a sink is present.
#[inline]
pub async fn emit(sink: Option<&Arc<dyn ProgressSink>>, event: ProgressEvent) {
    if let Some(sink) = sink {
        sink.send(event).await;
    }
}

/// Map a processed count onto the collection band.
///
/// `floor + processed/total * span`, clamped to the band ceiling.
#[must_use]
pub fn collect_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return COLLECT_CEILING as u8;
    }
    let scaled = COLLECT_FLOOR + processed * (COLLECT_CEILING - COLLECT_FLOOR) / total;
    scaled.min(COLLECT_CEILING) as u8
}

/// Shared progress state for the detail-collection phase.
///
/// Owned by one sync run; every page worker calls [`item_done`] after each
/// item, successful or degraded.
///
/// [`item_done`]: CollectProgress::item_done
pub struct CollectProgress {
    total: usize,
    processed: Mutex<usize>,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl CollectProgress {
    #[must_use]
    pub fn new(total: usize, sink: Option<Arc<dyn ProgressSink>>) -> Arc<Self> {
        Arc::new(Self {
            total,
            processed: Mutex::new(0),
            sink,
        })
    }

    /// Record one processed item and push a progress event.
    ///
    /// The counter lock is held across the emit so that event percentages
    /// leave in increment order.
    pub async fn item_done(&self) {
        let mut processed = self.processed.lock().await;
        *processed += 1;
        let current = *processed;

        if let Some(sink) = &self.sink {
            let percent = collect_percent(current, self.total);
            sink.send(ProgressEvent::progress(
                percent,
                format!("fetching repository details ({}/{})", current, self.total),
                current,
                self.total,
            ))
            .await;
        }
    }

    /// Items processed so far.
    pub async fn processed(&self) -> usize {
        *self.processed.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Sink that records every event it receives.
    #[derive(Default)]
    struct RecordingSink {
        events: StdMutex<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<ProgressEvent> {
            self.events
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn send(&self, event: ProgressEvent) {
            self.events
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event);
        }
    }

    #[test]
    fn collect_percent_stays_within_band() {
        assert_eq!(collect_percent(0, 200), 10);
        assert_eq!(collect_percent(100, 200), 45);
        assert_eq!(collect_percent(200, 200), 80);
        // Over-counting can never push past the ceiling.
        assert_eq!(collect_percent(500, 200), 80);
    }

    #[test]
    fn collect_percent_is_monotonic_over_processed_counts() {
        let total = 137;
        let mut last = 0;
        for processed in 0..=total {
            let percent = collect_percent(processed, total);
            assert!(percent >= last, "percent regressed at {processed}");
            assert!((10..=80).contains(&percent));
            last = percent;
        }
    }

    #[test]
    fn events_serialize_with_wire_field_names() {
        let event = ProgressEvent::progress(42, "working", 32, 100);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["progress"], 42);
        assert_eq!(json["message"], "working");
        assert_eq!(json["current"], 32);
        assert_eq!(json["total"], 100);
    }

    #[test]
    fn optional_counts_are_omitted_when_absent() {
        let json = serde_json::to_value(ProgressEvent::start("go")).unwrap();
        assert!(json.get("current").is_none());
        assert!(json.get("total").is_none());
        assert_eq!(json["type"], "start");
        assert_eq!(json["progress"], 0);
    }

    #[test]
    fn terminal_events_carry_expected_percentages() {
        assert_eq!(ProgressEvent::complete("done", 7).percent, 100);
        assert_eq!(ProgressEvent::error("boom").percent, 0);
    }

    #[tokio::test]
    async fn item_done_counts_and_emits_in_order() {
        let sink = Arc::new(RecordingSink::default());
        let progress = CollectProgress::new(4, Some(sink.clone() as Arc<dyn ProgressSink>));

        for _ in 0..4 {
            progress.item_done().await;
        }

        assert_eq!(progress.processed().await, 4);

        let events = sink.events();
        assert_eq!(events.len(), 4);
        let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
        let mut sorted = percents.clone();
        sorted.sort_unstable();
        assert_eq!(percents, sorted, "percentages must be non-decreasing");
        assert_eq!(events[3].current, Some(4));
        assert_eq!(events[3].total, Some(4));
        assert_eq!(events[3].percent, 80);
    }

    #[tokio::test]
    async fn item_done_without_sink_still_counts() {
        let progress = CollectProgress::new(2, None);
        progress.item_done().await;
        progress.item_done().await;
        assert_eq!(progress.processed().await, 2);
    }

    #[tokio::test]
    async fn concurrent_item_done_emissions_stay_monotonic() {
        let sink = Arc::new(RecordingSink::default());
        let progress = CollectProgress::new(50, Some(sink.clone() as Arc<dyn ProgressSink>));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let progress = Arc::clone(&progress);
            handles.push(tokio::spawn(async move { progress.item_done().await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let events = sink.events();
        assert_eq!(events.len(), 50);
        let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
        let mut sorted = percents.clone();
        sorted.sort_unstable();
        assert_eq!(percents, sorted);
        assert_eq!(*percents.last().unwrap(), 80);
    }
}
