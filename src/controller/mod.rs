//! Typeahead lookup controller.
//!
//! [`LookupState`] is a synchronous state machine: every user event, timer
//! and provider completion is a [`Message`], and each transition returns a
//! [`Command`]. [`SearchController`] owns that state and executes the
//! commands: it arms the debouncers, spawns provider calls and feeds their
//! outcomes back in as messages. A UI shell drives it from one task:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(key) = keys.recv() => controller.on_input(key),
//!         _ = controller.next_event() => {}
//!     }
//! }
//! ```

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::info;

use crate::config::LookupConfig;
use crate::debounce::Debouncer;
use crate::domain::{ResultPage, SelectionChange, SelectionEvent};
use crate::error::ProviderError;
use crate::provider::{SearchProvider, SearchRequest};

pub mod commands;
pub mod events;
pub mod state;

#[cfg(test)]
mod state_test;

pub use commands::Command;
pub use events::{Message, PageRequest};
pub use state::{LookupSnapshot, LookupState};

pub struct SearchController<P: SearchProvider> {
    state: LookupState,
    provider: Arc<P>,
    search_debounce: Debouncer,
    close_debounce: Debouncer,
    events_tx: mpsc::UnboundedSender<Message>,
    events_rx: mpsc::UnboundedReceiver<Message>,
    snapshot_tx: watch::Sender<LookupSnapshot>,
    selection_tx: mpsc::UnboundedSender<SelectionChange>,
    selection_rx: Option<mpsc::UnboundedReceiver<SelectionChange>>,
    in_flight: usize,
    last_emitted: Option<SelectionEvent>,
}

impl<P: SearchProvider> SearchController<P> {
    pub fn new(provider: Arc<P>, config: LookupConfig) -> Self {
        let state = LookupState::new(config);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(state.snapshot());
        let (selection_tx, selection_rx) = mpsc::unbounded_channel();

        Self {
            state,
            provider,
            search_debounce: Debouncer::new(),
            close_debounce: Debouncer::new(),
            events_tx,
            events_rx,
            snapshot_tx,
            selection_tx,
            selection_rx: Some(selection_rx),
            in_flight: 0,
            last_emitted: None,
        }
    }

    pub fn on_input(&mut self, raw: impl Into<String>) {
        self.handle_message(Message::InputChanged(raw.into()));
    }

    pub fn on_focus(&mut self) {
        self.handle_message(Message::Focus);
    }

    pub fn on_blur(&mut self) {
        self.handle_message(Message::Blur);
    }

    /// Select a row by id. Returns the emitted event, or `None` when the id
    /// is not among the current results (nothing changes in that case).
    pub fn on_select(&mut self, id: &str) -> Option<SelectionEvent> {
        self.last_emitted = None;
        self.handle_message(Message::Select(id.to_string()));
        self.last_emitted.take()
    }

    pub fn clear_selection(&mut self) {
        self.handle_message(Message::ClearSelection);
    }

    pub fn next_page(&mut self) {
        self.handle_message(Message::PageRequested(PageRequest::Next));
    }

    pub fn previous_page(&mut self) {
        self.handle_message(Message::PageRequested(PageRequest::Previous));
    }

    pub fn go_to_page(&mut self, index: usize) {
        self.handle_message(Message::PageRequested(PageRequest::Goto(index)));
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.handle_message(Message::PageSizeChanged(size));
    }

    /// Cancel pending timers. Responses still in flight are ignored once
    /// they arrive.
    pub fn shutdown(&mut self) {
        self.handle_message(Message::Shutdown);
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn snapshot(&self) -> LookupSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn last_selection(&self) -> Option<&SelectionEvent> {
        self.state.last_selection.as_ref()
    }

    /// `Please select a ...` when the lookup is required and nothing is
    /// selected.
    pub fn validate(&self) -> Option<String> {
        self.state.validate()
    }

    /// Selections and clears, in order. Can be taken once.
    pub fn take_selections(&mut self) -> Option<mpsc::UnboundedReceiver<SelectionChange>> {
        self.selection_rx.take()
    }

    /// True while a debounce or blur timer is armed or a search is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0 || self.search_debounce.is_pending() || self.close_debounce.is_pending()
    }

    /// Apply every timer/provider message that is already queued.
    pub fn pump_ready(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.events_rx.try_recv() {
            self.handle_message(msg);
            handled += 1;
        }
        handled
    }

    /// Wait for the next timer or provider message and apply it.
    /// Cancel-safe, so it can sit in a `select!` next to input sources.
    pub async fn next_event(&mut self) {
        if let Some(msg) = self.events_rx.recv().await {
            self.handle_message(msg);
        }
    }

    /// Run until no timer is armed and no search is outstanding.
    pub async fn settle(&mut self) {
        loop {
            if !self.is_busy() && self.pump_ready() == 0 {
                break;
            }
            if self.is_busy() {
                self.next_event().await;
            }
        }
    }

    fn handle_message(&mut self, msg: Message) {
        if matches!(msg, Message::SearchCompleted { .. }) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        let command = self.state.update(msg);
        self.execute_command(command);
        self.snapshot_tx.send_replace(self.state.snapshot());
    }

    fn execute_command(&mut self, command: Command) {
        match command {
            Command::None => {}
            Command::ScheduleSearch { seq, delay_ms } => {
                let tx = self.events_tx.clone();
                self.search_debounce.schedule(
                    move || {
                        let _ = tx.send(Message::SearchSettled(seq));
                    },
                    Duration::from_millis(delay_ms),
                );
            }
            Command::CancelSearch => self.search_debounce.cancel(),
            Command::ExecuteSearch(request) => self.spawn_search(request),
            Command::ScheduleClose { token, delay_ms } => {
                let tx = self.events_tx.clone();
                self.close_debounce.schedule(
                    move || {
                        let _ = tx.send(Message::CloseElapsed(token));
                    },
                    Duration::from_millis(delay_ms),
                );
            }
            Command::CancelClose => self.close_debounce.cancel(),
            Command::EmitSelection(change) => {
                self.last_emitted = change.selected().cloned();
                let _ = self.selection_tx.send(change);
            }
            Command::Batch(commands) => {
                for command in commands {
                    self.execute_command(command);
                }
            }
        }
    }

    fn spawn_search(&mut self, request: SearchRequest) {
        let seq = request.query.seq;
        info!(seq, mode = ?request.query.mode, query = %request.query.text, "dispatching search");

        self.in_flight += 1;
        let provider = Arc::clone(&self.provider);
        let tx = self.events_tx.clone();
        let timeout = self.state.config().request_timeout();

        tokio::spawn(async move {
            let outcome = run_provider(provider.as_ref(), request, timeout).await;
            let _ = tx.send(Message::SearchCompleted { seq, outcome });
        });
    }
}

impl<P: SearchProvider> Drop for SearchController<P> {
    fn drop(&mut self) {
        if !self.state.is_shut_down() {
            self.shutdown();
        }
    }
}

/// Call the provider, turning a timeout or a panic into a `ProviderError`.
async fn run_provider<P: SearchProvider>(
    provider: &P,
    request: SearchRequest,
    timeout: Option<Duration>,
) -> Result<ResultPage, ProviderError> {
    let call = AssertUnwindSafe(provider.search(request)).catch_unwind();
    let caught = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ProviderError::Timeout(limit))?,
        None => call.await,
    };
    caught.unwrap_or_else(|panic| Err(ProviderError::Internal(panic_message(panic.as_ref()))))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "provider panicked".to_string()
    }
}
