use serde::{Deserialize, Serialize};

/// Which predicate a query was classified under.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Fixed-length digit identifier (ABN style, 11 digits by default).
    ExactIdentifierA,
    /// Fixed-length digit identifier (ACN style, 9 digits by default).
    ExactIdentifierB,
    FreeText,
}

impl SearchMode {
    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::ExactIdentifierA => "ABN",
            SearchMode::ExactIdentifierB => "ACN",
            SearchMode::FreeText => "NAME",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            SearchMode::ExactIdentifierA => "Enter 11-digit ABN number",
            SearchMode::ExactIdentifierB => "Enter 9-digit ACN number",
            SearchMode::FreeText => "Enter company or business name",
        }
    }

    pub fn is_exact(&self) -> bool {
        !matches!(self, SearchMode::FreeText)
    }
}

/// An accepted query. `seq` is the only thing used to tell latest from stale.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Query {
    pub text: String,
    pub mode: SearchMode,
    pub seq: u64,
}

/// A row returned by a provider. Only `id` and `label` are interpreted.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl SearchResult {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Emitted outward when a result row is picked.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct SelectionEvent {
    pub id: String,
    pub label: String,
    #[serde(rename = "rawPayload")]
    pub raw_payload: serde_json::Value,
}

impl From<&SearchResult> for SelectionEvent {
    fn from(result: &SearchResult) -> Self {
        Self {
            id: result.id.clone(),
            label: result.label.clone(),
            raw_payload: result.payload.clone(),
        }
    }
}

/// What the outside world hears about the field's selection.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionChange {
    Selected(SelectionEvent),
    /// The "change entity" action dropped the previous selection.
    Cleared,
}

impl SelectionChange {
    pub fn selected(&self) -> Option<&SelectionEvent> {
        match self {
            SelectionChange::Selected(event) => Some(event),
            SelectionChange::Cleared => None,
        }
    }
}

/// One page over a result set. `index` is 1-based.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ResultPage<T = SearchResult> {
    pub items: Vec<T>,
    pub index: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> ResultPage<T> {
    pub fn empty(size: usize) -> Self {
        Self {
            items: Vec::new(),
            index: 1,
            size: size.max(1),
            total: 0,
        }
    }

    pub fn total_pages(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.total.div_ceil(self.size.max(1))
        }
    }

    pub fn has_previous(&self) -> bool {
        self.index > 1
    }

    pub fn has_next(&self) -> bool {
        self.index < self.total_pages()
    }

    /// 1-based position of the first item on this page, 0 when empty.
    pub fn start_record(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.index.saturating_sub(1) * self.size + 1
        }
    }

    pub fn end_record(&self) -> usize {
        (self.index * self.size).min(self.total)
    }

    /// Page numbers to show as buttons, centred on the current page.
    pub fn page_numbers(&self, max_visible: usize) -> Vec<usize> {
        let total_pages = self.total_pages();
        if total_pages == 0 || max_visible == 0 {
            return Vec::new();
        }

        let current = self.index.clamp(1, total_pages);
        let mut start = current.saturating_sub(max_visible / 2).max(1);
        let end = (start + max_visible - 1).min(total_pages);
        if end + 1 - start < max_visible {
            start = (end + 1).saturating_sub(max_visible).max(1);
        }

        (start..=end).collect()
    }
}

/// What the dropdown shows while open.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenState {
    Results,
    NoResults,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropdownState {
    #[default]
    Closed,
    Loading,
    Open(OpenState),
}

impl DropdownState {
    pub fn is_open(&self) -> bool {
        matches!(self, DropdownState::Open(_))
    }
}
