//! Automatic product codes (`P001`, `P002`, ...).

/// Next code after `last_code` (the code of the most recently created product).
///
/// The number after the first `P` followed by digits is incremented. When the
/// last code does not follow that pattern, numbering falls back to
/// `product_count + 1`.
pub fn next_product_code(last_code: Option<&str>, product_count: usize) -> String {
    let Some(last_code) = last_code else {
        return format_code(1);
    };

    let number = embedded_number(last_code)
        .and_then(|n| n.checked_add(1))
        .unwrap_or(product_count as u64 + 1);
    format_code(number)
}

fn format_code(number: u64) -> String {
    format!("P{number:03}")
}

fn embedded_number(code: &str) -> Option<u64> {
    code.match_indices('P').find_map(|(idx, _)| {
        let digits: String = code[idx + 1..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            None
        } else {
            digits.parse().ok()
        }
    })
}
