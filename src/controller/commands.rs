use crate::domain::SelectionChange;
use crate::provider::SearchRequest;

/// Side effects requested by [`LookupState::update`](super::state::LookupState::update).
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    None,
    ScheduleSearch { seq: u64, delay_ms: u64 },
    CancelSearch,
    ExecuteSearch(SearchRequest),
    ScheduleClose { token: u64, delay_ms: u64 },
    CancelClose,
    EmitSelection(SelectionChange),
    Batch(Vec<Command>),
}
