//! Personal Identifiable Information protection.

use crate::consts::{CARD_NUMBER_VISIBLE_PREFIX, CARD_NUMBER_VISIBLE_SUFFIX};

/// Masks a card number to its first six and last four digits.
///
/// Numbers too short to keep both ends readable are masked entirely.
pub fn mask_card_number(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(|c| !c.is_whitespace()).collect();
    let visible = CARD_NUMBER_VISIBLE_PREFIX + CARD_NUMBER_VISIBLE_SUFFIX;
    if digits.len() <= visible {
        return "*".repeat(digits.len());
    }
    let hidden = digits.len() - visible;
    digits
        .iter()
        .enumerate()
        .map(|(index, digit)| {
            if index < CARD_NUMBER_VISIBLE_PREFIX || index >= CARD_NUMBER_VISIBLE_PREFIX + hidden {
                *digit
            } else {
                '*'
            }
        })
        .collect()
}
