//! Privacy masking for customer names.

/// Character substituted for the hidden part of a name.
const MASK_CHAR: char = 'O';

/// Mask a customer name for display, counting display characters:
/// one char is returned unchanged, two chars keep the first, three or more
/// keep the first and last with everything between replaced by `O`.
pub fn mask_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    match chars.len() {
        0 | 1 => name.to_string(),
        2 => format!("{}{}", chars[0], MASK_CHAR),
        n => {
            let mut masked = String::with_capacity(name.len());
            masked.push(chars[0]);
            for _ in 0..n - 2 {
                masked.push(MASK_CHAR);
            }
            masked.push(chars[n - 1]);
            masked
        }
    }
}
