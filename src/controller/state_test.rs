use super::commands::Command;
use super::events::{Message, PageRequest};
use super::state::LookupState;
use crate::config::LookupConfig;
use crate::domain::{
    DropdownState, OpenState, ResultPage, SearchMode, SearchResult, SelectionChange,
};
use crate::error::{LookupError, ProviderError, ValidationError};

fn create_test_state() -> LookupState {
    LookupState::new(LookupConfig::default())
}

fn results(prefix: &str, n: usize) -> Vec<SearchResult> {
    (1..=n)
        .map(|i| SearchResult::new(format!("{prefix}-{i}"), format!("{prefix} entity {i}")))
        .collect()
}

fn page_of(items: Vec<SearchResult>) -> ResultPage {
    let total = items.len();
    ResultPage {
        items,
        index: 1,
        size: 50,
        total,
    }
}

/// Type `text`, let the debounce settle and return the dispatched seq.
fn accept_and_dispatch(state: &mut LookupState, text: &str) -> u64 {
    let command = state.update(Message::InputChanged(text.to_string()));
    let Command::ScheduleSearch { seq, .. } = command else {
        panic!("expected ScheduleSearch");
    };
    let command = state.update(Message::SearchSettled(seq));
    assert!(matches!(command, Command::ExecuteSearch(_)));
    seq
}

fn complete(state: &mut LookupState, seq: u64, items: Vec<SearchResult>) -> Command {
    state.update(Message::SearchCompleted {
        seq,
        outcome: Ok(page_of(items)),
    })
}

#[test]
fn test_initial_state() {
    let state = create_test_state();

    assert_eq!(state.text, "");
    assert_eq!(state.dropdown, DropdownState::Closed);
    assert!(state.results.is_empty());
    assert!(state.error.is_none());
    assert_eq!(state.latest_seq(), 0);
}

#[test]
fn test_valid_input_schedules_search() {
    let mut state = create_test_state();

    let command = state.update(Message::InputChanged("acme".to_string()));

    assert_eq!(
        command,
        Command::ScheduleSearch {
            seq: 1,
            delay_ms: 300
        }
    );
    assert_eq!(state.mode, Some(SearchMode::FreeText));
    assert_eq!(state.pending_query().map(|q| q.seq), Some(1));
    // Dropdown is untouched until the debounce settles.
    assert_eq!(state.dropdown, DropdownState::Closed);
}

#[test]
fn test_sequence_numbers_are_monotonic() {
    let mut state = create_test_state();

    for (i, text) in ["ac", "acm", "acme"].iter().enumerate() {
        state.update(Message::InputChanged(text.to_string()));
        assert_eq!(state.latest_seq(), i as u64 + 1);
    }
}

#[test]
fn test_invalid_input_closes_and_reports() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("a", 3));
    assert!(state.dropdown.is_open());

    let command = state.update(Message::InputChanged("a".to_string()));

    assert_eq!(command, Command::CancelSearch);
    assert_eq!(state.dropdown, DropdownState::Closed);
    assert!(state.results.is_empty());
    assert_eq!(
        state.error,
        Some(LookupError::Validation(ValidationError::TooShort {
            min: 2,
            actual: 1
        }))
    );
    assert_eq!(state.latest_seq(), seq);
}

#[test]
fn test_settle_moves_to_loading_with_request() {
    let mut state = create_test_state();
    state.update(Message::InputChanged("12345678901".to_string()));

    let command = state.update(Message::SearchSettled(1));

    let Command::ExecuteSearch(request) = command else {
        panic!("expected ExecuteSearch");
    };
    assert_eq!(request.query.text, "12345678901");
    assert_eq!(request.query.mode, SearchMode::ExactIdentifierA);
    assert_eq!(request.max_results, 50);
    assert_eq!(state.dropdown, DropdownState::Loading);
}

#[test]
fn test_superseded_settle_is_ignored() {
    let mut state = create_test_state();
    state.update(Message::InputChanged("ac".to_string()));
    state.update(Message::InputChanged("acm".to_string()));

    assert_eq!(state.update(Message::SearchSettled(1)), Command::None);
    assert_eq!(state.dropdown, DropdownState::Closed);
}

#[test]
fn test_stale_response_discarded_in_either_order() {
    for newer_first in [true, false] {
        let mut state = create_test_state();
        let a = accept_and_dispatch(&mut state, "alpha");
        let b = accept_and_dispatch(&mut state, "beta");

        if newer_first {
            complete(&mut state, b, results("beta", 2));
            complete(&mut state, a, results("alpha", 5));
        } else {
            complete(&mut state, a, results("alpha", 5));
            assert_eq!(state.dropdown, DropdownState::Loading);
            complete(&mut state, b, results("beta", 2));
        }

        assert_eq!(state.results, results("beta", 2));
        assert_eq!(state.active_query().map(|q| q.seq), Some(b));
        assert_eq!(state.dropdown, DropdownState::Open(OpenState::Results));
    }
}

#[test]
fn test_response_after_invalid_input_is_discarded() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    state.update(Message::InputChanged("a".to_string()));

    complete(&mut state, seq, results("acme", 3));

    assert!(state.results.is_empty());
    assert_eq!(state.dropdown, DropdownState::Closed);
    assert!(state.error.as_ref().is_some_and(LookupError::is_validation));
}

#[test]
fn test_empty_results_open_with_no_results_marker() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "12345678901");

    complete(&mut state, seq, Vec::new());

    assert_eq!(state.dropdown, DropdownState::Open(OpenState::NoResults));
    assert!(state.error.is_none());
}

#[test]
fn test_provider_error_closes_and_reports() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");

    state.update(Message::SearchCompleted {
        seq,
        outcome: Err(ProviderError::Unavailable("down".to_string())),
    });

    assert_eq!(state.dropdown, DropdownState::Closed);
    assert_eq!(
        state.error,
        Some(LookupError::Provider(ProviderError::Unavailable(
            "down".to_string()
        )))
    );

    // The next valid keystroke clears it.
    state.update(Message::InputChanged("acme co".to_string()));
    assert!(state.error.is_none());
}

#[test]
fn test_focus_reopens_existing_results() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 2));
    state.dropdown = DropdownState::Closed;

    let command = state.update(Message::Focus);

    assert_eq!(command, Command::CancelClose);
    assert_eq!(state.dropdown, DropdownState::Open(OpenState::Results));
}

#[test]
fn test_focus_without_results_leaves_dropdown() {
    let mut state = create_test_state();
    state.update(Message::Focus);
    assert_eq!(state.dropdown, DropdownState::Closed);
    assert!(state.focused);
}

#[test]
fn test_focus_does_not_interrupt_loading() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 2));
    accept_and_dispatch(&mut state, "acme corp");

    state.update(Message::Focus);
    assert_eq!(state.dropdown, DropdownState::Loading);
}

#[test]
fn test_blur_schedules_close_after_grace() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 2));

    let command = state.update(Message::Blur);
    let Command::ScheduleClose { token, delay_ms } = command else {
        panic!("expected ScheduleClose");
    };
    assert_eq!(delay_ms, 300);
    assert!(state.dropdown.is_open());

    state.update(Message::CloseElapsed(token));
    assert_eq!(state.dropdown, DropdownState::Closed);
}

#[test]
fn test_focus_cancels_pending_close() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 2));

    let Command::ScheduleClose { token, .. } = state.update(Message::Blur) else {
        panic!("expected ScheduleClose");
    };
    state.update(Message::Focus);
    state.update(Message::CloseElapsed(token));

    assert!(state.dropdown.is_open());
}

#[test]
fn test_select_emits_event_and_clears() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 3));
    state.update(Message::Blur);

    let command = state.update(Message::Select("acme-2".to_string()));

    let Command::Batch(commands) = command else {
        panic!("expected Batch");
    };
    assert!(commands.contains(&Command::CancelClose));
    assert!(commands.iter().any(|c| matches!(
        c,
        Command::EmitSelection(SelectionChange::Selected(event))
            if event.id == "acme-2" && event.label == "acme entity 2"
    )));
    assert_eq!(state.text, "");
    assert_eq!(state.dropdown, DropdownState::Closed);
    assert_eq!(
        state.last_selection.as_ref().map(|e| e.id.as_str()),
        Some("acme-2")
    );
}

#[test]
fn test_select_unknown_id_is_noop() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 3));
    let before = state.snapshot();

    let command = state.update(Message::Select("gone-7".to_string()));

    assert_eq!(command, Command::None);
    assert_eq!(state.snapshot(), before);
}

#[test]
fn test_select_after_results_replaced_is_noop() {
    let mut state = create_test_state();
    let a = accept_and_dispatch(&mut state, "alpha");
    complete(&mut state, a, results("alpha", 3));
    let b = accept_and_dispatch(&mut state, "beta");
    complete(&mut state, b, results("beta", 3));
    let before = state.snapshot();

    assert_eq!(
        state.update(Message::Select("alpha-1".to_string())),
        Command::None
    );
    assert_eq!(state.snapshot(), before);
}

#[test]
fn test_paging_through_results() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 25));
    assert_eq!(state.current_page().items.len(), 10);

    state.update(Message::PageRequested(PageRequest::Next));
    assert_eq!(state.page_index, 2);
    state.update(Message::PageRequested(PageRequest::Goto(999)));
    assert_eq!(state.page_index, 3);
    assert_eq!(state.current_page().items.len(), 5);
    state.update(Message::PageRequested(PageRequest::Next));
    assert_eq!(state.page_index, 3);
    state.update(Message::PageRequested(PageRequest::Goto(0)));
    assert_eq!(state.page_index, 1);
    state.update(Message::PageRequested(PageRequest::Previous));
    assert_eq!(state.page_index, 1);
}

#[test]
fn test_page_size_change_resets_to_first_page() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 25));
    state.update(Message::PageRequested(PageRequest::Goto(3)));

    state.update(Message::PageSizeChanged(20));

    assert_eq!(state.page_index, 1);
    assert_eq!(state.current_page().items.len(), 20);
}

#[test]
fn test_new_results_reset_page() {
    let mut state = create_test_state();
    let a = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, a, results("acme", 25));
    state.update(Message::PageRequested(PageRequest::Goto(3)));

    let b = accept_and_dispatch(&mut state, "acme co");
    complete(&mut state, b, results("acme co", 25));

    assert_eq!(state.page_index, 1);
}

#[test]
fn test_shutdown_ignores_later_messages() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");

    let command = state.update(Message::Shutdown);
    assert_eq!(
        command,
        Command::Batch(vec![Command::CancelSearch, Command::CancelClose])
    );

    assert_eq!(complete(&mut state, seq, results("acme", 2)), Command::None);
    assert!(state.results.is_empty());
    assert!(state.is_shut_down());
}

#[test]
fn test_clear_selection_resets_field() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 2));
    state.update(Message::Select("acme-1".to_string()));

    let command = state.update(Message::ClearSelection);

    assert!(state.last_selection.is_none());
    assert_eq!(state.text, "");
    assert_eq!(state.dropdown, DropdownState::Closed);
    let Command::Batch(commands) = command else {
        panic!("expected Batch");
    };
    assert!(commands.contains(&Command::EmitSelection(SelectionChange::Cleared)));
}

#[test]
fn test_late_response_after_grace_stays_closed() {
    let mut state = create_test_state();
    state.update(Message::Focus);
    let seq = accept_and_dispatch(&mut state, "acme");

    let Command::ScheduleClose { token, .. } = state.update(Message::Blur) else {
        panic!("expected ScheduleClose");
    };
    state.update(Message::CloseElapsed(token));
    assert_eq!(state.dropdown, DropdownState::Closed);

    complete(&mut state, seq, results("acme", 2));
    assert_eq!(state.dropdown, DropdownState::Closed);
    assert_eq!(state.results.len(), 2);

    // The stored results come back on refocus.
    state.update(Message::Focus);
    assert_eq!(state.dropdown, DropdownState::Open(OpenState::Results));
}

#[test]
fn test_response_within_grace_opens_until_close() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    let Command::ScheduleClose { token, .. } = state.update(Message::Blur) else {
        panic!("expected ScheduleClose");
    };

    complete(&mut state, seq, results("acme", 2));
    assert!(state.dropdown.is_open());

    state.update(Message::CloseElapsed(token));
    assert_eq!(state.dropdown, DropdownState::Closed);
}

#[test]
fn test_focus_reopens_no_results_view() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "12345678901");
    complete(&mut state, seq, Vec::new());
    let Command::ScheduleClose { token, .. } = state.update(Message::Blur) else {
        panic!("expected ScheduleClose");
    };
    state.update(Message::CloseElapsed(token));
    assert_eq!(state.dropdown, DropdownState::Closed);

    state.update(Message::Focus);
    assert_eq!(state.dropdown, DropdownState::Open(OpenState::NoResults));
}

#[test]
fn test_focus_after_invalid_input_stays_closed() {
    let mut state = create_test_state();
    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 2));
    state.update(Message::InputChanged("a".to_string()));
    state.update(Message::Blur);

    state.update(Message::Focus);
    assert_eq!(state.dropdown, DropdownState::Closed);
}

#[test]
fn test_required_lookup_needs_selection() {
    let mut state = LookupState::new(LookupConfig {
        required: true,
        object_label: "supplier".to_string(),
        ..LookupConfig::default()
    });
    assert_eq!(state.validate(), Some("Please select a supplier.".to_string()));

    let seq = accept_and_dispatch(&mut state, "acme");
    complete(&mut state, seq, results("acme", 2));
    state.update(Message::Select("acme-1".to_string()));
    assert_eq!(state.validate(), None);

    state.update(Message::ClearSelection);
    assert!(state.validate().is_some());
}

#[test]
fn test_optional_lookup_always_valid() {
    let state = create_test_state();
    assert_eq!(state.validate(), None);
}
