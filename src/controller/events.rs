use crate::domain::ResultPage;
use crate::error::ProviderError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageRequest {
    Next,
    Previous,
    Goto(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    // Field events
    InputChanged(String),
    Focus,
    Blur,
    Select(String),
    ClearSelection,

    // Paging
    PageRequested(PageRequest),
    PageSizeChanged(usize),

    // Timer / async completions
    SearchSettled(u64),
    SearchCompleted {
        seq: u64,
        outcome: Result<ResultPage, ProviderError>,
    },
    CloseElapsed(u64),

    Shutdown,
}
