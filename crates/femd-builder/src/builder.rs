//! Multi-source event assembly: transparent passthrough or active
//! cross-source event building with optional consistency verification.

use crate::error::Result;
use crate::mode::EbMode;
use crate::queues::{EventQueues, InputItem, RecycleItem};
use femd_codec::classify::is_dframe_end_of_event;
use femd_codec::event::{extract_envelope, timestamps_match_within_tolerance, EventEnvelope};
use femd_codec::frame::parse as parse_frame;
use femd_codec::item::decode_word;
use femd_codec::Word;
use femd_sinks::Sink;

pub struct EventBuilder {
    mode: EbMode,
    queues: EventQueues,
    sinks: Vec<Box<dyn Sink>>,
    /// Participation mask: one bit per source expected to contribute to
    /// every built event.
    fem_proxy_set: u32,
    pnd_src: u32,
    had_sobe: bool,
    src_had_soe: u32,
    reference: Option<EventEnvelope>,
}

impl EventBuilder {
    pub fn new(source_count: usize, mode: EbMode, fem_proxy_set: u32, sinks: Vec<Box<dyn Sink>>) -> Self {
        Self {
            mode,
            queues: EventQueues::new(source_count),
            sinks,
            fem_proxy_set,
            pnd_src: 0,
            had_sobe: false,
            src_had_soe: 0,
            reference: None,
        }
    }

    pub fn set_mode(&mut self, mode: EbMode) {
        self.mode = mode;
    }

    pub fn queues(&self) -> &EventQueues {
        &self.queues
    }

    pub fn try_recv_recycled(&self) -> Option<RecycleItem> {
        self.queues.try_recv_recycled()
    }

    /// Run one pass of whichever mode is active, draining what is
    /// currently queued. Intended to be called from the builder's worker
    /// thread after it wakes on the wake-up semaphore.
    pub fn run_once(&mut self) -> Result<()> {
        if self.mode.is_active() {
            self.active_pass()
        } else {
            self.transparent_pass()
        }
    }

    fn transparent_pass(&mut self) -> Result<()> {
        for src in 0..self.queues.source_count() as u8 {
            while let Some(item) = self.queues.try_recv(src) {
                self.dispatch_and_recycle(src, item)?;
            }
        }
        Ok(())
    }

    fn active_pass(&mut self) -> Result<()> {
        if self.pnd_src == 0 {
            self.pnd_src = self.fem_proxy_set;
        }
        if !self.had_sobe {
            for sink in &mut self.sinks {
                sink.on_built_event_start()?;
            }
            self.had_sobe = true;
        }

        for src in 0..self.queues.source_count() as u8 {
            let bit = 1u32 << src;
            if self.pnd_src & bit == 0 {
                continue;
            }
            loop {
                let item = match self.queues.try_recv(src) {
                    Some(item) => item,
                    None => break,
                };
                let frame = parse_frame(&item.bytes)?;
                self.maybe_verify_envelope(src, &frame.words);
                let ends_event = is_dframe_end_of_event(&frame.words);
                self.dispatch_and_recycle(src, item)?;
                if ends_event {
                    self.pnd_src &= !bit;
                    break;
                }
            }
        }

        if self.pnd_src == 0 {
            for sink in &mut self.sinks {
                sink.on_built_event_end()?;
            }
            self.had_sobe = false;
            self.src_had_soe = 0;
            self.reference = None;
        }
        Ok(())
    }

    fn maybe_verify_envelope(&mut self, src: u8, words: &[u16]) {
        let bit = 1u32 << src;
        if self.src_had_soe & bit != 0 || words.is_empty() {
            return;
        }
        let Word::StartOfEvent { event_type } = decode_word(words[0]) else {
            return;
        };
        let Ok((env, _)) = extract_envelope(event_type, &words[1..]) else {
            return;
        };

        if self.src_had_soe == 0 {
            self.reference = Some(env);
        } else if let Some(reference) = self.reference {
            if self.mode.contains(EbMode::VERIFY_EVNB) && (env.ev_ty != reference.ev_ty || env.ev_nb != reference.ev_nb) {
                tracing::warn!(source = src, ev_ty = env.ev_ty, ev_nb = env.ev_nb, ref_ev_nb = reference.ev_nb, "event-number mismatch");
            } else if self.mode.contains(EbMode::VERIFY_TS_EXACT) && env.ts != reference.ts {
                tracing::warn!(source = src, ts = env.ts, ref_ts = reference.ts, "timestamp mismatch");
            } else if self.mode.contains(EbMode::VERIFY_TS_TOLERANT) && !timestamps_match_within_tolerance(env.ts, reference.ts) {
                tracing::warn!(source = src, ts = env.ts, ref_ts = reference.ts, "timestamp outside tolerance");
            }
        }
        self.src_had_soe |= bit;
    }

    fn dispatch_and_recycle(&mut self, src: u8, item: InputItem) -> Result<()> {
        let payload = if item.bytes.len() >= 2 { &item.bytes[2..] } else { &item.bytes[..] };
        for sink in &mut self.sinks {
            sink.on_frame(src, payload)?;
        }
        self.queues.recycle(RecycleItem { addr: item.addr, source: src, declared_len: item.bytes.len() as u16 });
        Ok(())
    }

    /// Post a received buffer onto its source's input queue.
    pub fn post(&self, item: InputItem) -> std::result::Result<(), InputItem> {
        self.queues.try_post(item)
    }

    /// Drain every queue back to the pool (via recycle), resetting all
    /// in-flight event state.
    pub fn flush(&mut self) -> Result<()> {
        for item in self.queues.flush_all() {
            self.queues.recycle(RecycleItem { addr: item.addr, source: item.source, declared_len: item.bytes.len() as u16 });
        }
        self.pnd_src = 0;
        self.had_sobe = false;
        self.src_had_soe = 0;
        self.reference = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use femd_codec::item::encode_word;
    use femd_sinks::{Sink as _, SinkError};
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct RecordingSink {
        frames: Arc<Mutex<Vec<(u8, Vec<u8>)>>>,
        starts: Arc<Mutex<u32>>,
        ends: Arc<Mutex<u32>>,
    }

    impl Sink for RecordingSink {
        fn on_frame(&mut self, source: u8, payload: &[u8]) -> std::result::Result<(), SinkError> {
            self.frames.lock().unwrap().push((source, payload.to_vec()));
            Ok(())
        }
        fn on_built_event_start(&mut self) -> std::result::Result<(), SinkError> {
            *self.starts.lock().unwrap() += 1;
            Ok(())
        }
        fn on_built_event_end(&mut self) -> std::result::Result<(), SinkError> {
            *self.ends.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn dframe_bytes(words: &[u16]) -> Vec<u8> {
        let mut out = vec![0u8; 2];
        let total = (words.len() * 2) as u16;
        out[0] = (total >> 8) as u8;
        out[1] = (total & 0xFF) as u8;
        for &w in words {
            out.push((w >> 8) as u8);
            out.push((w & 0xFF) as u8);
        }
        out
    }

    #[test]
    fn scenario_s2_two_card_active_event_building() {
        let recorder = RecordingSink::default();
        let mut builder = EventBuilder::new(2, EbMode::ACTIVE, 0b11, vec![Box::new(recorder.clone())]);

        let soe = encode_word(&Word::StartOfEvent { event_type: 1 });
        let eoe = encode_word(&Word::EndOfEvent { size_msbs: 0 });
        // ts_l, ts_m, ts_h, ev_nb_lo, ev_nb_hi
        let card0 = dframe_bytes(&[soe, 0x0001, 0x0000, 0x0000, 0x42, 0x0000, 0x1234, eoe]);
        let card1 = dframe_bytes(&[soe, 0x0001, 0x0000, 0x0000, 0x42, 0x0000, 0x5678, eoe]);

        builder.post(InputItem { source: 0, addr: 1, bytes: card0 }).unwrap();
        builder.post(InputItem { source: 1, addr: 2, bytes: card1 }).unwrap();

        builder.run_once().unwrap();

        assert_eq!(*recorder.starts.lock().unwrap(), 1);
        assert_eq!(*recorder.ends.lock().unwrap(), 1);
        let frames = recorder.frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0, 0);
        assert_eq!(frames[1].0, 1);
    }

    #[test]
    fn scenario_s7_verification_logs_once_and_completes() {
        let recorder = RecordingSink::default();
        let mode = EbMode::ACTIVE | EbMode::VERIFY_EVNB;
        let mut builder = EventBuilder::new(2, mode, 0b11, vec![Box::new(recorder.clone())]);

        let soe = encode_word(&Word::StartOfEvent { event_type: 1 });
        let eoe = encode_word(&Word::EndOfEvent { size_msbs: 0 });
        let card0 = dframe_bytes(&[soe, 0, 0, 0, 0x01, 0x00, eoe]);
        let card1 = dframe_bytes(&[soe, 0, 0, 0, 0x02, 0x00, eoe]); // differing ev_nb

        builder.post(InputItem { source: 0, addr: 1, bytes: card0 }).unwrap();
        builder.post(InputItem { source: 1, addr: 2, bytes: card1 }).unwrap();

        builder.run_once().unwrap();
        assert_eq!(*recorder.ends.lock().unwrap(), 1, "built event must still complete despite mismatch");
    }

    #[test]
    fn transparent_mode_dispatches_per_source_without_sentinels() {
        let recorder = RecordingSink::default();
        let mut builder = EventBuilder::new(1, EbMode::empty(), 0b1, vec![Box::new(recorder.clone())]);
        let frame = dframe_bytes(&[0x1234, 0x5678]);
        builder.post(InputItem { source: 0, addr: 1, bytes: frame }).unwrap();
        builder.run_once().unwrap();
        assert_eq!(recorder.frames.lock().unwrap().len(), 1);
        assert_eq!(*recorder.starts.lock().unwrap(), 0);
    }

    #[test]
    fn flush_drains_and_resets_event_state() {
        let recorder = RecordingSink::default();
        let mut builder = EventBuilder::new(2, EbMode::ACTIVE, 0b11, vec![Box::new(recorder)]);
        builder.post(InputItem { source: 0, addr: 1, bytes: dframe_bytes(&[0x1234]) }).unwrap();
        builder.flush().unwrap();
        assert!(builder.try_recv_recycled().is_some());
        assert_eq!(builder.pnd_src, 0);
    }
}
