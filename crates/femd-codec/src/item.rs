//! Tagged decode/encode of individual 16-bit words and the short family of
//! multi-word items that ride inside a frame body.
//!
//! Single-word items decode with [`decode_word`]; the handful of variable
//! length items (ASCII messages, pedestal/threshold lists, the built-event
//! size pair, and the two statistics blocks) have their own decoders that
//! consume a slice of the remaining stream and report how many words they
//! ate.

use crate::error::{CodecError, Result};
use crate::prefix::*;

/// One decoded unit from the word stream.
///
/// `Unknown` is the deliberate fallback for any 16-bit value that does not
/// match a recognised prefix, so a reader can walk a frame whose card
/// firmware is newer than this decoder without aborting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Word {
    CardChipChanHitIx { card: u8, chip: u8, chan: u8 },
    CardChipChanHitCnt { card: u8, chip: u8, chan: u8 },
    CardChipChanHisto { card: u8, chip: u8, chan: u8 },
    AdcSample { value: u16 },
    LatHistoBin { value: u16 },
    ChipLastCellRead { chip: u8, cell: u16 },
    TimeBinIx { bin: u16 },
    HistoBinIx { bin: u16 },
    PedThrListHeader { fem: u8, asic: u8, mode: u8, kind: u8 },
    StartOfDFrame { version: u8, fem_id: u8 },
    StartOfMFrame { version: u8, fem_id: u8 },
    StartOfCFrame { version: u8, fem_id: u8 },
    AsciiMsgLen { len: u8 },
    StartOfEvent { event_type: u8 },
    EndOfEvent { size_msbs: u8 },
    ChHitCntHisto { chip: u8 },
    EndOfFrame,
    DeadtimeHstatBins,
    PedestalHstat,
    PedestalHMd,
    ShistoBins,
    CmdStatistics,
    StartOfBuiltEvent,
    EndOfBuiltEvent,
    EvperiodHstatBins,
    SobeSize,
    NullContent,
    Unknown(u16),
}

/// Decode a single word against the prefix table, most-specific mask first.
///
/// This only resolves the fixed-width, single-word items; the words that
/// introduce a variable-length body ([`AsciiMsgLen`](Word::AsciiMsgLen),
/// [`PedThrListHeader`](Word::PedThrListHeader), [`SobeSize`](Word::SobeSize),
/// [`CmdStatistics`](Word::CmdStatistics)) are still returned here as their
/// header variant; the caller pairs them with the matching `read_*` function
/// below to consume the rest.
pub fn decode_word(w: u16) -> Word {
    if w & MASK_14BIT == CARD_CHIP_CHAN_HIT_IX {
        return Word::CardChipChanHitIx { card: get_card_ix(w), chip: get_chip_ix(w), chan: get_chan_ix(w) };
    }
    if w & MASK_14BIT == CARD_CHIP_CHAN_HIT_CNT {
        return Word::CardChipChanHitCnt { card: get_card_ix(w), chip: get_chip_ix(w), chan: get_chan_ix(w) };
    }
    if w & MASK_14BIT == CARD_CHIP_CHAN_HISTO {
        return Word::CardChipChanHisto { card: get_card_ix(w), chip: get_chip_ix(w), chan: get_chan_ix(w) };
    }
    if w & MASK_12BIT == ADC_SAMPLE {
        return Word::AdcSample { value: get_adc_data(w) };
    }
    if w & MASK_12BIT == LAT_HISTO_BIN {
        return Word::LatHistoBin { value: get_lat_histo_bin(w) };
    }
    if w & MASK_12BIT == CHIP_LAST_CELL_READ {
        return Word::ChipLastCellRead { chip: get_last_read_cell_chip_ix(w), cell: get_last_read_cell(w) };
    }
    if w & MASK_9BIT == TIME_BIN_IX {
        return Word::TimeBinIx { bin: get_time_bin(w) };
    }
    if w & MASK_9BIT == HISTO_BIN_IX {
        return Word::HistoBinIx { bin: get_histo_bin(w) };
    }
    if w & MASK_9BIT == PEDTHR_LIST {
        return Word::PedThrListHeader {
            fem: get_pedthr_list_fem(w),
            asic: get_pedthr_list_asic(w),
            mode: get_pedthr_list_mode(w),
            kind: get_pedthr_list_type(w),
        };
    }
    if w & MASK_9BIT == START_OF_DFRAME {
        return Word::StartOfDFrame { version: get_framing_version(w), fem_id: get_fem_id(w) };
    }
    if w & MASK_9BIT == START_OF_MFRAME {
        return Word::StartOfMFrame { version: get_framing_version(w), fem_id: get_fem_id(w) };
    }
    if w & MASK_9BIT == START_OF_CFRAME {
        return Word::StartOfCFrame { version: get_framing_version(w), fem_id: get_fem_id(w) };
    }
    if w & MASK_8BIT == ASCII_MSG_LEN {
        return Word::AsciiMsgLen { len: get_ascii_len(w) };
    }
    if w & MASK_4BIT == START_OF_EVENT {
        return Word::StartOfEvent { event_type: get_event_type(w) };
    }
    if w & MASK_4BIT == END_OF_EVENT {
        return Word::EndOfEvent { size_msbs: get_eoe_size_msbs(w) };
    }
    if w & MASK_2BIT == CH_HIT_CNT_HISTO {
        return Word::ChHitCntHisto { chip: get_ch_hit_cnt_histo_chip_ix(w) };
    }
    match w & MASK_0BIT {
        END_OF_FRAME => Word::EndOfFrame,
        DEADTIME_HSTAT_BINS => Word::DeadtimeHstatBins,
        PEDESTAL_HSTAT => Word::PedestalHstat,
        PEDESTAL_H_MD => Word::PedestalHMd,
        SHISTO_BINS => Word::ShistoBins,
        CMD_STATISTICS => Word::CmdStatistics,
        START_OF_BUILT_EVENT => Word::StartOfBuiltEvent,
        END_OF_BUILT_EVENT => Word::EndOfBuiltEvent,
        EVPERIOD_HSTAT_BINS => Word::EvperiodHstatBins,
        SOBE_SIZE => Word::SobeSize,
        NULL_CONTENT => Word::NullContent,
        _ => Word::Unknown(w),
    }
}

/// Re-encode a [`Word`] back to its 16-bit wire form.
///
/// Round-trips everything `decode_word` produces; the caller is responsible
/// for appending the variable-length tail of multi-word items.
pub fn encode_word(item: &Word) -> u16 {
    match *item {
        Word::CardChipChanHitIx { card, chip, chan } => {
            CARD_CHIP_CHAN_HIT_IX | ((card as u16 & 0x1F) << 9) | ((chip as u16 & 0x03) << 7) | (chan as u16 & 0x7F)
        }
        Word::CardChipChanHitCnt { card, chip, chan } => {
            CARD_CHIP_CHAN_HIT_CNT | ((card as u16 & 0x1F) << 9) | ((chip as u16 & 0x03) << 7) | (chan as u16 & 0x7F)
        }
        Word::CardChipChanHisto { card, chip, chan } => {
            CARD_CHIP_CHAN_HISTO | ((card as u16 & 0x1F) << 9) | ((chip as u16 & 0x03) << 7) | (chan as u16 & 0x7F)
        }
        Word::AdcSample { value } => ADC_SAMPLE | (value & 0x0FFF),
        Word::LatHistoBin { value } => LAT_HISTO_BIN | (value & 0x0FFF),
        Word::ChipLastCellRead { chip, cell } => CHIP_LAST_CELL_READ | ((chip as u16 & 0x03) << 10) | (cell & 0x03FF),
        Word::TimeBinIx { bin } => TIME_BIN_IX | (bin & 0x01FF),
        Word::HistoBinIx { bin } => HISTO_BIN_IX | (bin & 0x01FF),
        Word::PedThrListHeader { fem, asic, mode, kind } => {
            PEDTHR_LIST
                | ((fem as u16 & 0x1F) << 4)
                | ((asic as u16 & 0x03) << 2)
                | ((mode as u16 & 0x01) << 1)
                | (kind as u16 & 0x01)
        }
        Word::StartOfDFrame { version, fem_id } => START_OF_DFRAME | ((version as u16 & 0x03) << 7) | (fem_id as u16 & 0x1F),
        Word::StartOfMFrame { version, fem_id } => START_OF_MFRAME | ((version as u16 & 0x03) << 7) | (fem_id as u16 & 0x1F),
        Word::StartOfCFrame { version, fem_id } => START_OF_CFRAME | ((version as u16 & 0x03) << 7) | (fem_id as u16 & 0x1F),
        Word::AsciiMsgLen { len } => ASCII_MSG_LEN | (len as u16 & 0x00FF),
        Word::StartOfEvent { event_type } => START_OF_EVENT | (event_type as u16 & 0x0007),
        Word::EndOfEvent { size_msbs } => END_OF_EVENT | (size_msbs as u16 & 0x000F),
        Word::ChHitCntHisto { chip } => CH_HIT_CNT_HISTO | (chip as u16 & 0x0003),
        Word::EndOfFrame => END_OF_FRAME,
        Word::DeadtimeHstatBins => DEADTIME_HSTAT_BINS,
        Word::PedestalHstat => PEDESTAL_HSTAT,
        Word::PedestalHMd => PEDESTAL_H_MD,
        Word::ShistoBins => SHISTO_BINS,
        Word::CmdStatistics => CMD_STATISTICS,
        Word::StartOfBuiltEvent => START_OF_BUILT_EVENT,
        Word::EndOfBuiltEvent => END_OF_BUILT_EVENT,
        Word::EvperiodHstatBins => EVPERIOD_HSTAT_BINS,
        Word::SobeSize => SOBE_SIZE,
        Word::NullContent => NULL_CONTENT,
        Word::Unknown(w) => w,
    }
}

/// Combine two consecutive words into a 32-bit value, low word first.
///
/// This ordering (`(hi << 16) | lo`, with `lo` read before `hi`) is used
/// throughout the wire format for every 32-bit quantity split across two
/// 16-bit words: event counts, built-event sizes, and every field in the
/// two statistics blocks below.
pub fn combine_u32(lo: u16, hi: u16) -> u32 {
    ((hi as u32) << 16) | (lo as u32)
}

pub fn split_u32(value: u32) -> (u16, u16) {
    ((value & 0xFFFF) as u16, ((value >> 16) & 0xFFFF) as u16)
}

/// The built-event size that follows a [`Word::SobeSize`] header: two words,
/// low word first.
pub fn read_sobe_size(rest: &[u16]) -> Result<(u32, usize)> {
    if rest.len() < 2 {
        return Err(CodecError::TruncatedItem);
    }
    Ok((combine_u32(rest[0], rest[1]), 2))
}

pub fn encode_sobe_size(size: u32) -> [u16; 2] {
    let (lo, hi) = split_u32(size);
    [lo, hi]
}

/// An ASCII text message: `AsciiMsgLen` carries the string length in bytes;
/// the body follows packed two bytes per word, NUL-terminated, padded to an
/// even byte count.
pub fn read_ascii_message(len: u8, rest: &[u16]) -> Result<(String, usize)> {
    let nbytes = len as usize;
    let nwords = (nbytes + 1) / 2;
    if rest.len() < nwords {
        return Err(CodecError::TruncatedItem);
    }
    let mut bytes = Vec::with_capacity(nbytes);
    for &w in &rest[..nwords] {
        bytes.push((w & 0x00FF) as u8);
        bytes.push(((w >> 8) & 0x00FF) as u8);
    }
    bytes.truncate(nbytes);
    if let Some(nul) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(nul);
    }
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok((text, nwords))
}

pub fn encode_ascii_message(text: &str) -> (Word, Vec<u16>) {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    if bytes.len() % 2 != 0 {
        bytes.push(0);
    }
    let len = bytes.len().min(0xFF) as u8;
    let mut words = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks(2) {
        let lo = pair[0] as u16;
        let hi = if pair.len() > 1 { pair[1] as u16 } else { 0 };
        words.push(lo | (hi << 8));
    }
    (Word::AsciiMsgLen { len }, words)
}

/// One pedestal/threshold entry: mean (pedestal) and sigma-derived threshold,
/// one word each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PedThrEntry {
    pub pedestal: u16,
    pub threshold: u16,
}

/// Read the fixed-size pedestal/threshold list that follows a
/// [`Word::PedThrListHeader`], length depending on the ASIC family carried
/// in the header's `mode` bit.
pub fn read_pedthr_list(mode: u8, rest: &[u16]) -> Result<(Vec<PedThrEntry>, usize)> {
    let n = crate::prefix::pedthr_entry_count(mode);
    let nwords = n * 2;
    if rest.len() < nwords {
        return Err(CodecError::TruncatedItem);
    }
    let mut entries = Vec::with_capacity(n);
    for i in 0..n {
        entries.push(PedThrEntry { pedestal: rest[2 * i], threshold: rest[2 * i + 1] });
    }
    Ok((entries, nwords))
}

pub fn encode_pedthr_list(entries: &[PedThrEntry]) -> Vec<u16> {
    let mut words = Vec::with_capacity(entries.len() * 2);
    for e in entries {
        words.push(e.pedestal);
        words.push(e.threshold);
    }
    words
}

/// The command-path statistics block that follows a [`Word::CmdStatistics`]
/// sentinel: nine 32-bit counters, each split low-word-first, in a fixed
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CmdStatistics {
    pub cmd_count: u32,
    pub daq_req: u32,
    pub daq_timeout: u32,
    pub daq_delayed: u32,
    pub daq_missing: u32,
    pub cmd_errors: u32,
    pub cmd_replies: u32,
    pub daq_replies: u32,
    pub daq_replies_resent: u32,
}

const CMD_STATISTICS_FIELD_COUNT: usize = 9;
const CMD_STATISTICS_WORD_COUNT: usize = CMD_STATISTICS_FIELD_COUNT * 2;

pub fn read_cmd_statistics(rest: &[u16]) -> Result<(CmdStatistics, usize)> {
    if rest.len() < CMD_STATISTICS_WORD_COUNT {
        return Err(CodecError::TruncatedItem);
    }
    let mut fields = [0u32; CMD_STATISTICS_FIELD_COUNT];
    for (i, field) in fields.iter_mut().enumerate() {
        *field = combine_u32(rest[2 * i], rest[2 * i + 1]);
    }
    Ok((
        CmdStatistics {
            cmd_count: fields[0],
            daq_req: fields[1],
            daq_timeout: fields[2],
            daq_delayed: fields[3],
            daq_missing: fields[4],
            cmd_errors: fields[5],
            cmd_replies: fields[6],
            daq_replies: fields[7],
            daq_replies_resent: fields[8],
        },
        CMD_STATISTICS_WORD_COUNT,
    ))
}

pub fn encode_cmd_statistics(s: &CmdStatistics) -> Vec<u16> {
    let fields = [
        s.cmd_count,
        s.daq_req,
        s.daq_timeout,
        s.daq_delayed,
        s.daq_missing,
        s.cmd_errors,
        s.cmd_replies,
        s.daq_replies,
        s.daq_replies_resent,
    ];
    let mut words = Vec::with_capacity(CMD_STATISTICS_WORD_COUNT);
    for f in fields {
        let (lo, hi) = split_u32(f);
        words.push(lo);
        words.push(hi);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_and_split_round_trip() {
        let value = 0xDEAD_BEEFu32;
        let (lo, hi) = split_u32(value);
        assert_eq!(combine_u32(lo, hi), value);
    }

    #[test]
    fn single_word_round_trips() {
        let words = [
            Word::AdcSample { value: 0x0ABC },
            Word::StartOfDFrame { version: 0, fem_id: 17 },
            Word::EndOfEvent { size_msbs: 5 },
            Word::CmdStatistics,
            Word::Unknown(0xFFF1),
        ];
        for w in words {
            let encoded = encode_word(&w);
            assert_eq!(decode_word(encoded), w);
        }
    }

    #[test]
    fn ascii_message_round_trip() {
        let (header, body) = encode_ascii_message("hello");
        let len = match header {
            Word::AsciiMsgLen { len } => len,
            _ => unreachable!(),
        };
        let (text, consumed) = read_ascii_message(len, &body).unwrap();
        assert_eq!(text, "hello");
        assert_eq!(consumed, body.len());
    }

    #[test]
    fn pedthr_list_round_trip_aget() {
        let entries: Vec<PedThrEntry> =
            (0..72).map(|i| PedThrEntry { pedestal: i, threshold: i * 2 }).collect();
        let words = encode_pedthr_list(&entries);
        let (decoded, consumed) = read_pedthr_list(0, &words).unwrap();
        assert_eq!(decoded, entries);
        assert_eq!(consumed, words.len());
    }

    #[test]
    fn pedthr_list_round_trip_after() {
        let entries: Vec<PedThrEntry> =
            (0..79).map(|i| PedThrEntry { pedestal: i, threshold: i + 1 }).collect();
        let words = encode_pedthr_list(&entries);
        let (decoded, consumed) = read_pedthr_list(1, &words).unwrap();
        assert_eq!(decoded, entries);
        assert_eq!(consumed, words.len());
    }

    #[test]
    fn cmd_statistics_round_trip() {
        let stats = CmdStatistics {
            cmd_count: 10,
            daq_req: 20,
            daq_timeout: 1,
            daq_delayed: 2,
            daq_missing: 0,
            cmd_errors: 3,
            cmd_replies: 9,
            daq_replies: 19,
            daq_replies_resent: 1,
        };
        let words = encode_cmd_statistics(&stats);
        let (decoded, consumed) = read_cmd_statistics(&words).unwrap();
        assert_eq!(decoded, stats);
        assert_eq!(consumed, words.len());
    }

    #[test]
    fn sobe_size_round_trip() {
        let size = 0x0001_2345u32;
        let words = encode_sobe_size(size);
        let (decoded, consumed) = read_sobe_size(&words).unwrap();
        assert_eq!(decoded, size);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn truncated_multi_word_items_error() {
        assert!(read_sobe_size(&[0x1234]).is_err());
        assert!(read_cmd_statistics(&[0; 17]).is_err());
        assert!(read_pedthr_list(0, &[0; 143]).is_err());
    }
}
