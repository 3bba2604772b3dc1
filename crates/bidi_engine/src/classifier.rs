//! Text direction classification

use para_model::Direction;

/// Base direction of `text` from its first strong character.
///
/// Right-to-left when the first character of bidi class R or AL precedes
/// any class L character; left-to-right otherwise, including text with no
/// strong character at all.
pub fn classify(text: &str) -> Direction {
    match unicode_bidi::get_base_direction_full(text) {
        unicode_bidi::Direction::Rtl => Direction::Rtl,
        unicode_bidi::Direction::Ltr | unicode_bidi::Direction::Mixed => Direction::Ltr,
    }
}
