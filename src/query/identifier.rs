use crate::domain::SearchMode;

/// Group an identifier's digits for display: `51 824 753 556` for the
/// 11-digit form, `004 085 616` for the 9-digit form. Free text and inputs
/// that are not pure digits come back unchanged.
pub fn format_identifier(mode: SearchMode, value: &str) -> String {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }

    let groups: &[usize] = match mode {
        SearchMode::ExactIdentifierA => &[2, 3, 3, 3],
        SearchMode::ExactIdentifierB => &[3, 3, 3],
        SearchMode::FreeText => return value.to_string(),
    };

    let width: usize = groups.iter().sum();
    if digits.len() > width {
        return value.to_string();
    }
    let padded = format!("{digits:0>width$}");

    let mut out = String::with_capacity(width + groups.len());
    let mut offset = 0;
    for (i, len) in groups.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&padded[offset..offset + len]);
        offset += len;
    }
    out
}

/// Strip whitespace so `51 824 753 556` and `51824753556` compare equal.
pub fn normalize_identifier(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}
