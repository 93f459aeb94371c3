//! Event envelope extraction: the handful of words that follow a
//! `START_OF_EVENT` sentinel and identify which logical event a data frame
//! belongs to.

use crate::error::{CodecError, Result};
use crate::item::combine_u32;

/// `(ev_ty, ev_nb, ts)` captured from a data frame's `START_OF_EVENT` header.
///
/// `ts` is the 48-bit timestamp held in a `u64`; the top 16 bits are always
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventEnvelope {
    pub ev_ty: u8,
    pub ev_nb: u32,
    pub ts: u64,
}

/// Number of 16-bit words the envelope occupies after `START_OF_EVENT`
/// itself: ts-low, ts-mid, ts-high, ev-count-low, ev-count-high.
pub const ENVELOPE_TAIL_WORDS: usize = 5;

/// Extract the envelope from the words following a `START_OF_EVENT` word.
///
/// `ev_ty` is passed in separately since it lives in the `START_OF_EVENT`
/// word itself (see [`crate::item::decode_word`]); `tail` holds the five
/// words that follow it.
pub fn extract_envelope(ev_ty: u8, tail: &[u16]) -> Result<(EventEnvelope, usize)> {
    if tail.len() < ENVELOPE_TAIL_WORDS {
        return Err(CodecError::TruncatedItem);
    }
    let ts_l = tail[0] as u64;
    let ts_m = tail[1] as u64;
    let ts_h = tail[2] as u64;
    let ts = ts_l | (ts_m << 16) | (ts_h << 32);
    let ev_nb = combine_u32(tail[3], tail[4]);
    Ok((EventEnvelope { ev_ty: ev_ty & 0x07, ev_nb, ts }, ENVELOPE_TAIL_WORDS))
}

/// Encode an envelope back to its five tail words (the caller prepends the
/// `START_OF_EVENT` word carrying `ev_ty`).
pub fn encode_envelope(env: &EventEnvelope) -> [u16; ENVELOPE_TAIL_WORDS] {
    let ts_l = (env.ts & 0xFFFF) as u16;
    let ts_m = ((env.ts >> 16) & 0xFFFF) as u16;
    let ts_h = ((env.ts >> 32) & 0xFFFF) as u16;
    let (nb_l, nb_h) = crate::item::split_u32(env.ev_nb);
    [ts_l, ts_m, ts_h, nb_l, nb_h]
}

/// Compare two timestamps under the ±1 tolerance rule: the low 32 bits may
/// differ by exactly 1, with wraparound at the 32-bit boundary tolerated;
/// the high 16 bits must otherwise match.
pub fn timestamps_match_within_tolerance(a: u64, b: u64) -> bool {
    let a_hi = (a >> 32) as u32;
    let b_hi = (b >> 32) as u32;
    let a_lo = (a & 0xFFFF_FFFF) as u32;
    let b_lo = (b & 0xFFFF_FFFF) as u32;

    if a_hi == b_hi {
        return a_lo.abs_diff(b_lo) <= 1;
    }
    // A rollover between the two low words is tolerated only when the high
    // words are adjacent and the low words sit at the boundary extremes.
    let (lo_hi, lo_lo, hi_hi, hi_lo) = if a_hi < b_hi { (a_hi, a_lo, b_hi, b_lo) } else { (b_hi, b_lo, a_hi, a_lo) };
    hi_hi == lo_hi + 1 && lo_lo == u32::MAX && hi_lo == 0
}
