//! Small shared helpers.

/// Format an amount with thousands separators, e.g. `12345` → `"12,345"`.
///
/// Amounts are in ten-thousands; callers append the 萬 unit themselves.
pub fn format_amount(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}
