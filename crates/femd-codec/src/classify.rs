//! Fast-path frame classification: cheap predicates over raw words that
//! avoid a full walk of the frame body.

use crate::prefix::*;

/// True when `first_word` (the word immediately after the leading size
/// prefix) starts a data frame.
pub fn is_dframe(first_word: u16) -> bool {
    first_word & MASK_9BIT == START_OF_DFRAME
}

/// True when `first_word` starts a config-reply frame. The word following
/// it (not inspected here) carries a signed 16-bit error code.
pub fn is_cframe(first_word: u16) -> bool {
    first_word & MASK_9BIT == START_OF_CFRAME
}

/// True when `first_word` starts a monitoring frame.
pub fn is_mframe(first_word: u16) -> bool {
    first_word & MASK_9BIT == START_OF_MFRAME
}

/// True when a monitoring frame's body (the words after `START_OF_MFRAME`
/// and its header/size pair) opens with a `CMD_STATISTICS` sentinel.
pub fn is_msg_stat(first_word: u16, body_after_header: &[u16]) -> bool {
    is_mframe(first_word) && body_after_header.first().map(|&w| w & MASK_0BIT == CMD_STATISTICS).unwrap_or(false)
}

/// True when the last word of a frame's body matches `END_OF_EVENT`.
pub fn is_dframe_end_of_event(body: &[u16]) -> bool {
    matches!(body.last(), Some(&w) if w & MASK_4BIT == END_OF_EVENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_dframe_cframe_mframe() {
        assert!(is_dframe(START_OF_DFRAME | 0x05));
        assert!(is_cframe(START_OF_CFRAME | 0x05));
        assert!(is_mframe(START_OF_MFRAME | 0x05));
        assert!(!is_dframe(START_OF_CFRAME));
    }

    #[test]
    fn msg_stat_requires_mframe_then_cmd_statistics() {
        let body = [0x0000u16, CMD_STATISTICS];
        assert!(is_msg_stat(START_OF_MFRAME, &body));
        assert!(!is_msg_stat(START_OF_DFRAME, &body));
        assert!(!is_msg_stat(START_OF_MFRAME, &[0x0000, NULL_CONTENT]));
    }

    #[test]
    fn end_of_event_checks_last_word() {
        let body = [0x1234u16, END_OF_EVENT | 0x3];
        assert!(is_dframe_end_of_event(&body));
        assert!(!is_dframe_end_of_event(&[0x1234, 0x0000]));
        assert!(!is_dframe_end_of_event(&[]));
    }
}
