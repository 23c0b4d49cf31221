pub mod lookup_formatter;

pub use lookup_formatter::{
    dropdown_label, format_selection, format_snapshot, selection_json, snapshot_json, status_line,
};
