//! Search Controller
//!
//! Owns the autocomplete input state and drives the search pipeline from
//! the rendering layer's events. States:
//!
//! - `Idle`: no active term or dropdown dismissed
//! - `Searching`: query in flight, dropdown hidden
//! - `Results`: dropdown visible with 0..=display_limit candidates
//!
//! Overlapping searches are resolved with an explicit request generation.
//! Every new query and every transition to `Idle` bumps it; a response is
//! applied only if its generation is still current, so the controller
//! always reflects the most recent query regardless of arrival order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tasting_common::config::SearchSettings;
use tokio::sync::watch;
use tracing::debug;

use crate::candidate::WineCandidate;
use crate::pipeline::{record_selection, SearchPipeline, UsageUpdate};
use crate::store::WineStore;

/// Receives the side effects of a selection
pub trait SelectionSink: Send + Sync {
    /// Fill the surrounding form from the full candidate
    fn fill_form(&self, candidate: &WineCandidate);

    /// Replace the input's display value
    fn display_value_changed(&self, name: &str);
}

/// [`SelectionSink`] built from two closures
pub struct CallbackSink<F, D> {
    fill: F,
    display: D,
}

impl<F, D> CallbackSink<F, D>
where
    F: Fn(&WineCandidate) + Send + Sync,
    D: Fn(&str) + Send + Sync,
{
    pub fn new(fill: F, display: D) -> Self {
        Self { fill, display }
    }
}

impl<F, D> SelectionSink for CallbackSink<F, D>
where
    F: Fn(&WineCandidate) + Send + Sync,
    D: Fn(&str) + Send + Sync,
{
    fn fill_form(&self, candidate: &WineCandidate) {
        (self.fill)(candidate)
    }

    fn display_value_changed(&self, name: &str) {
        (self.display)(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Searching,
    Results,
}

/// What the rendering layer draws
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub candidates: Vec<WineCandidate>,
    pub is_searching: bool,
    pub is_open: bool,
}

struct Inner {
    term: String,
    generation: u64,
    focus_epoch: u64,
    phase: Phase,
    /// Result set for the current term; kept while dismissed so focus can reopen it
    candidates: Vec<WineCandidate>,
    /// A query for `term` was dismissed before it answered; focus re-issues it
    interrupted: bool,
}

pub struct SearchController {
    pipeline: SearchPipeline,
    sink: Arc<dyn SelectionSink>,
    blur_grace: Duration,
    inner: Mutex<Inner>,
    view_tx: watch::Sender<ViewState>,
    /// Held for the whole of a selection; dismissal waits on it
    selection_gate: tokio::sync::Mutex<()>,
}

impl SearchController {
    pub fn new(pipeline: SearchPipeline, sink: Arc<dyn SelectionSink>, blur_grace: Duration) -> Self {
        let (view_tx, _) = watch::channel(ViewState::default());
        Self {
            pipeline,
            sink,
            blur_grace,
            inner: Mutex::new(Inner {
                term: String::new(),
                generation: 0,
                focus_epoch: 0,
                phase: Phase::Idle,
                candidates: Vec::new(),
                interrupted: false,
            }),
            view_tx,
            selection_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn from_settings(
        store: Arc<dyn WineStore>,
        settings: &SearchSettings,
        sink: Arc<dyn SelectionSink>,
    ) -> Self {
        Self::new(SearchPipeline::new(store, settings), sink, settings.blur_grace())
    }

    /// Subscribe to view updates
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    pub fn view(&self) -> ViewState {
        self.view_tx.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn term(&self) -> String {
        self.state().term.clone()
    }

    /// The input text changed.
    ///
    /// Short terms drop straight to `Idle`. Qualifying terms enter
    /// `Searching` and resolve to `Results` once both sources have answered,
    /// unless a newer event superseded this query in the meantime.
    pub async fn term_changed(&self, text: impl Into<String>) {
        let term = text.into();

        let generation = {
            let mut inner = self.state();
            inner.term = term.clone();

            if !self.pipeline.qualifies(&term) {
                inner.generation += 1;
                inner.candidates.clear();
                inner.interrupted = false;
                inner.phase = Phase::Idle;
                self.publish(&inner);
                return;
            }

            self.begin_search(&mut inner)
        };

        self.complete_search(&term, generation).await;
    }

    /// Input gained focus.
    ///
    /// Reopens a retained result set for the current term. If the last query
    /// was dismissed while still in flight there is nothing retained, so the
    /// query is issued again.
    pub async fn focus(&self) {
        let rerun = {
            let mut inner = self.state();
            inner.focus_epoch += 1;

            if inner.phase != Phase::Idle || !self.pipeline.qualifies(&inner.term) {
                None
            } else if inner.interrupted {
                let generation = self.begin_search(&mut inner);
                Some((inner.term.clone(), generation))
            } else {
                if !inner.candidates.is_empty() {
                    inner.phase = Phase::Results;
                    self.publish(&inner);
                }
                None
            }
        };

        if let Some((term, generation)) = rerun {
            debug!(term = %term, "Re-issuing search interrupted by dismissal");
            self.complete_search(&term, generation).await;
        }
    }

    /// Input lost focus.
    ///
    /// Waits out the grace delay so a pointer click on a dropdown entry can
    /// land first, then dismisses unless focus returned or a selection
    /// happened meanwhile.
    pub async fn blur(&self) {
        let epoch = self.state().focus_epoch;

        tokio::time::sleep(self.blur_grace).await;

        let mut inner = self.state();
        if inner.focus_epoch != epoch {
            debug!("Focus changed during blur grace period, keeping dropdown");
            return;
        }
        self.dismiss(&mut inner);
    }

    /// Pointer interaction outside the input and dropdown
    pub async fn click_outside(&self) {
        let _gate = self.selection_gate.lock().await;
        let mut inner = self.state();
        self.dismiss(&mut inner);
    }

    /// User picked a candidate.
    ///
    /// Hides the dropdown, records usage for catalog wines, then calls the
    /// form-fill and display-value callbacks. A failed usage update does not
    /// stop the callbacks.
    pub async fn select(&self, candidate: WineCandidate) -> UsageUpdate {
        let _gate = self.selection_gate.lock().await;

        {
            let mut inner = self.state();
            inner.generation += 1;
            inner.focus_epoch += 1;
            inner.phase = Phase::Idle;
            inner.candidates.clear();
            inner.interrupted = false;
            // The display value becomes the wine name; that is not a new query
            inner.term = candidate.name.clone();
            self.publish(&inner);
        }

        let usage = record_selection(self.pipeline.store().as_ref(), &candidate).await;

        self.sink.fill_form(&candidate);
        self.sink.display_value_changed(&candidate.name);
        usage
    }

    /// Enter `Searching` for the current term and return the new generation
    fn begin_search(&self, inner: &mut Inner) -> u64 {
        inner.generation += 1;
        inner.candidates.clear();
        inner.interrupted = false;
        inner.phase = Phase::Searching;
        self.publish(inner);
        inner.generation
    }

    /// Run the query and apply it if `generation` is still current
    async fn complete_search(&self, term: &str, generation: u64) {
        let candidates = self.pipeline.run(term).await;

        let mut inner = self.state();
        if inner.generation != generation {
            debug!(
                term = %term,
                generation,
                current = inner.generation,
                "Discarding stale search response"
            );
            return;
        }

        inner.phase = Phase::Results;
        inner.candidates = candidates;
        self.publish(&inner);
    }

    fn dismiss(&self, inner: &mut Inner) {
        if inner.phase == Phase::Idle {
            return;
        }
        inner.interrupted = inner.phase == Phase::Searching;
        inner.generation += 1;
        inner.phase = Phase::Idle;
        self.publish(inner);
    }

    fn state(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        let view = match inner.phase {
            Phase::Idle => ViewState::default(),
            Phase::Searching => ViewState {
                candidates: Vec::new(),
                is_searching: true,
                is_open: false,
            },
            Phase::Results => ViewState {
                candidates: inner.candidates.clone(),
                is_searching: false,
                is_open: true,
            },
        };
        self.view_tx.send_replace(view);
    }
}
