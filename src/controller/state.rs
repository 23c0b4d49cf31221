use tracing::{debug, info, warn};

use super::commands::Command;
use super::events::{Message, PageRequest};
use crate::config::LookupConfig;
use crate::domain::{
    DropdownState, OpenState, Query, ResultPage, SearchMode, SearchResult, SelectionChange,
    SelectionEvent,
};
use crate::error::LookupError;
use crate::pagination::ResultSetPager;
use crate::provider::SearchRequest;
use crate::query::QueryClassifier;

/// Read-only view published after every transition.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupSnapshot {
    pub text: String,
    pub mode: Option<SearchMode>,
    pub dropdown: DropdownState,
    pub results: Vec<SearchResult>,
    pub page: ResultPage,
    /// Match count reported by the provider; may exceed `results.len()`
    /// when the provider capped its answer.
    pub reported_total: usize,
    pub error: Option<LookupError>,
    pub latest_seq: u64,
    pub last_selection: Option<SelectionEvent>,
}

/// All state of one lookup field. Transitions only happen in
/// [`update`](LookupState::update); side effects come back as [`Command`]s.
pub struct LookupState {
    config: LookupConfig,
    classifier: QueryClassifier,
    pub text: String,
    pub mode: Option<SearchMode>,
    pub dropdown: DropdownState,
    pub results: Vec<SearchResult>,
    pub reported_total: usize,
    pub page_index: usize,
    pub page_size: usize,
    pub error: Option<LookupError>,
    pub focused: bool,
    pub last_selection: Option<SelectionEvent>,
    latest_seq: u64,
    // Accepted query whose response has not arrived yet.
    pending: Option<Query>,
    // Query whose response is currently published.
    active: Option<Query>,
    close_token: u64,
    // Blur grace timer armed and not yet elapsed.
    close_pending: bool,
    // How the dropdown last opened for the published query.
    last_open: Option<OpenState>,
    shut_down: bool,
}

impl LookupState {
    pub fn new(config: LookupConfig) -> Self {
        Self {
            classifier: QueryClassifier::new(config.rules),
            page_size: config.page_size.max(1),
            config,
            text: String::new(),
            mode: None,
            dropdown: DropdownState::Closed,
            results: Vec::new(),
            reported_total: 0,
            page_index: 1,
            error: None,
            focused: false,
            last_selection: None,
            latest_seq: 0,
            pending: None,
            active: None,
            close_token: 0,
            close_pending: false,
            last_open: None,
            shut_down: false,
        }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn pending_query(&self) -> Option<&Query> {
        self.pending.as_ref()
    }

    pub fn active_query(&self) -> Option<&Query> {
        self.active.as_ref()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Message for a required lookup that has no selection yet.
    pub fn validate(&self) -> Option<String> {
        (self.config.required && self.last_selection.is_none())
            .then(|| format!("Please select a {}.", self.config.object_label))
    }

    pub fn current_page(&self) -> ResultPage {
        ResultSetPager::page(&self.results, self.page_index, self.page_size)
    }

    pub fn snapshot(&self) -> LookupSnapshot {
        LookupSnapshot {
            text: self.text.clone(),
            mode: self.mode,
            dropdown: self.dropdown,
            results: self.results.clone(),
            page: self.current_page(),
            reported_total: self.reported_total,
            error: self.error.clone(),
            latest_seq: self.latest_seq,
            last_selection: self.last_selection.clone(),
        }
    }

    pub fn update(&mut self, msg: Message) -> Command {
        if self.shut_down {
            return Command::None;
        }

        match msg {
            Message::InputChanged(raw) => self.on_input(raw),
            Message::Focus => {
                self.focused = true;
                self.close_token += 1;
                self.close_pending = false;
                if let Some(open) = self.last_open
                    && !self.text.trim().is_empty()
                    && self.dropdown != DropdownState::Loading
                {
                    self.dropdown = DropdownState::Open(open);
                }
                Command::CancelClose
            }
            Message::Blur => {
                self.focused = false;
                self.close_token += 1;
                self.close_pending = true;
                Command::ScheduleClose {
                    token: self.close_token,
                    delay_ms: self.config.blur_grace_ms,
                }
            }
            Message::CloseElapsed(token) => {
                if token == self.close_token && !self.focused {
                    self.close_pending = false;
                    self.dropdown = DropdownState::Closed;
                } else {
                    debug!(token, current = self.close_token, "ignoring superseded close");
                }
                Command::None
            }
            Message::Select(id) => self.on_select(&id),
            Message::ClearSelection => {
                self.reset_field();
                self.last_selection = None;
                info!("selection cleared");
                Command::Batch(vec![
                    Command::CancelSearch,
                    Command::CancelClose,
                    Command::EmitSelection(SelectionChange::Cleared),
                ])
            }
            Message::PageRequested(request) => {
                let page = match request {
                    PageRequest::Next => {
                        ResultSetPager::next_page(&self.results, self.page_index, self.page_size)
                    }
                    PageRequest::Previous => {
                        ResultSetPager::previous_page(&self.results, self.page_index, self.page_size)
                    }
                    PageRequest::Goto(index) => {
                        ResultSetPager::page(&self.results, index, self.page_size)
                    }
                };
                self.page_index = page.index;
                Command::None
            }
            Message::PageSizeChanged(size) => {
                self.page_size = size.max(1);
                self.page_index = 1;
                Command::None
            }
            Message::SearchSettled(seq) => match &self.pending {
                Some(query) if query.seq == seq => {
                    self.dropdown = DropdownState::Loading;
                    Command::ExecuteSearch(self.request_for(query.clone()))
                }
                _ => {
                    debug!(seq, latest = self.latest_seq, "discarding superseded settle");
                    Command::None
                }
            },
            Message::SearchCompleted { seq, outcome } => {
                let Some(query) = self.pending.take_if(|query| query.seq == seq) else {
                    debug!(seq, latest = self.latest_seq, "discarding stale response");
                    return Command::None;
                };

                match outcome {
                    Ok(page) => {
                        info!(seq, count = page.items.len(), total = page.total, "results published");
                        self.reported_total = page.total.max(page.items.len());
                        self.results = page.items;
                        self.page_index = 1;
                        self.error = None;
                        let open = if self.results.is_empty() {
                            OpenState::NoResults
                        } else {
                            OpenState::Results
                        };
                        self.last_open = Some(open);
                        // Once the blur grace has run out nothing would close it again.
                        self.dropdown = if self.focused || self.close_pending {
                            DropdownState::Open(open)
                        } else {
                            DropdownState::Closed
                        };
                    }
                    Err(e) => {
                        warn!(seq, error = %e, "search failed");
                        self.results.clear();
                        self.reported_total = 0;
                        self.page_index = 1;
                        self.last_open = None;
                        self.dropdown = DropdownState::Closed;
                        self.error = Some(e.into());
                    }
                }
                self.active = Some(query);
                Command::None
            }
            Message::Shutdown => {
                self.pending = None;
                self.shut_down = true;
                Command::Batch(vec![Command::CancelSearch, Command::CancelClose])
            }
        }
    }

    fn on_input(&mut self, raw: String) -> Command {
        let classification = self.classifier.classify(&raw);
        self.text = raw;
        self.mode = Some(classification.mode);

        // Typing means the field has focus, even without an explicit focus event.
        if !self.focused {
            self.focused = true;
            self.close_token += 1;
            self.close_pending = false;
        }

        if let Some(error) = classification.error {
            debug!(%error, "input rejected");
            // Retire any outstanding query so its response can't reopen the dropdown.
            self.pending = None;
            self.active = None;
            self.results.clear();
            self.reported_total = 0;
            self.page_index = 1;
            self.last_open = None;
            self.dropdown = DropdownState::Closed;
            self.error = Some(error.into());
            return Command::CancelSearch;
        }

        self.latest_seq += 1;
        let query = Query {
            text: classification.text,
            mode: classification.mode,
            seq: self.latest_seq,
        };
        debug!(seq = query.seq, mode = ?query.mode, "query accepted");
        self.pending = Some(query);
        self.error = None;

        Command::ScheduleSearch {
            seq: self.latest_seq,
            delay_ms: self.config.debounce_ms,
        }
    }

    fn on_select(&mut self, id: &str) -> Command {
        let Some(result) = self.results.iter().find(|result| result.id == id) else {
            debug!(id, "selected id is not in the current results");
            return Command::None;
        };

        let event = SelectionEvent::from(result);
        info!(id = %event.id, "result selected");
        self.reset_field();
        self.last_selection = Some(event.clone());

        Command::Batch(vec![
            Command::CancelSearch,
            Command::CancelClose,
            Command::EmitSelection(SelectionChange::Selected(event)),
        ])
    }

    fn reset_field(&mut self) {
        self.text.clear();
        self.mode = None;
        self.pending = None;
        self.active = None;
        self.results.clear();
        self.reported_total = 0;
        self.page_index = 1;
        self.error = None;
        self.last_open = None;
        self.dropdown = DropdownState::Closed;
        self.close_token += 1;
        self.close_pending = false;
    }

    fn request_for(&self, query: Query) -> SearchRequest {
        SearchRequest {
            query,
            filters: self.config.filters.clone(),
            max_results: self.config.max_results,
        }
    }
}
