//! The command fetcher's interpreter: a program counter over a flat list
//! of preprocessed lines, an explicit loop-frame stack (rather than
//! re-scanning for a matching `NEXT`), and the `$loop` substitution rule.

use crate::directive::{parse_directive, substitute_loop_token, Directive, DiskMode, FemSelector};
use crate::error::Result;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct LoopFrame {
    /// Program-counter index of the first line inside the loop body.
    head: usize,
    counter: u64,
    limit: u64,
}

/// One unit of work the driver thread must carry out; everything that
/// talks to the network, the sinks, or the filesystem is represented here
/// rather than performed by this crate directly, so the interpreter stays
/// testable without a live array.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SendCommand { card_mask: u32, text: String, is_daq: bool },
    Sleep(Duration),
    SetVerbose(u8),
    SetVFlags(u32),
    SinkOpen(DiskMode),
    SinkClose,
    SetPath(String),
    SetEventBuilder(u8),
    SetFileChunk(u64),
    CreditsShow,
    CreditsRestore(Option<String>),
    DropCredit,
    DelayCredit(Option<u64>),
    ListPed,
    ListThr,
    Exec(String),
    Terminate,
    /// The current program ran off its end (or hit `END`); the driver
    /// should go back to reading from stdin.
    ReturnToStdin,
}

/// Interpreter state. `card_count` bounds `fem *`; `card_mask` is the
/// selection subsequent commands fan out to.
pub struct Fetcher {
    program: Vec<String>,
    pc: usize,
    loop_stack: Vec<LoopFrame>,
    card_mask: u32,
    card_count: u32,
}

impl Fetcher {
    pub fn new(card_count: u32) -> Self {
        Self { program: Vec::new(), pc: 0, loop_stack: Vec::new(), card_mask: (1 << card_count) - 1, card_count }
    }

    /// Load a new preprocessed program, resetting the loop stack and
    /// program counter but keeping `card_mask`/`verbose` selections, as the
    /// original's `exec` does.
    pub fn load(&mut self, lines: Vec<String>) {
        self.program = lines;
        self.pc = 0;
        self.loop_stack.clear();
    }

    pub fn card_mask(&self) -> u32 {
        self.card_mask
    }

    /// Advance the interpreter until it produces one `Action`, looping
    /// internally over pure control directives (`LOOP`, `NEXT`, `fem`).
    /// `daq_size_left` lets an in-flight DAQ session's exhaustion break the
    /// enclosing loop early, per `spec.md` §4.6's rendezvous rule.
    pub fn next_action(&mut self, daq_size_left: u64) -> Result<Action> {
        loop {
            if self.pc >= self.program.len() {
                self.loop_stack.clear();
                return Ok(Action::ReturnToStdin);
            }
            let line = self.program[self.pc].clone();
            self.pc += 1;

            match parse_directive(&line)? {
                Directive::Loop { start, end } => {
                    self.loop_stack.push(LoopFrame { head: self.pc, counter: start, limit: end });
                }
                Directive::Next => {
                    let Some(frame) = self.loop_stack.last_mut() else { continue };
                    if daq_size_left == 0 {
                        self.loop_stack.pop();
                        continue;
                    }
                    frame.counter += 1;
                    if frame.counter <= frame.limit {
                        self.pc = frame.head;
                    } else {
                        self.loop_stack.pop();
                    }
                }
                Directive::End => {
                    self.loop_stack.clear();
                    return Ok(Action::ReturnToStdin);
                }
                Directive::Exit => return Ok(Action::Terminate),
                Directive::Sleep(n) => return Ok(Action::Sleep(Duration::from_secs(n))),
                Directive::Fem(sel) => self.card_mask = sel.to_mask(self.card_count),
                Directive::Verbose(l) => return Ok(Action::SetVerbose(l)),
                Directive::VFlags(bits) => return Ok(Action::SetVFlags(bits)),
                Directive::FOpen(mode) => return Ok(Action::SinkOpen(mode)),
                Directive::FClose => return Ok(Action::SinkClose),
                Directive::Path(dir) => return Ok(Action::SetPath(dir)),
                Directive::EventBuilder(mode) => return Ok(Action::SetEventBuilder(mode)),
                Directive::FileChunk(mib) => return Ok(Action::SetFileChunk(mib)),
                Directive::CreditsShow => return Ok(Action::CreditsShow),
                Directive::CreditsRestore(arg) => return Ok(Action::CreditsRestore(arg)),
                Directive::DropCredit => return Ok(Action::DropCredit),
                Directive::DelayCredit(ms) => return Ok(Action::DelayCredit(ms)),
                Directive::ListPed => return Ok(Action::ListPed),
                Directive::ListThr => return Ok(Action::ListThr),
                Directive::Exec(file) => return Ok(Action::Exec(file)),
                Directive::Command(text) => {
                    let loop_index = self.loop_stack.last().map(|f| f.counter);
                    let text = substitute_loop_token(&text, loop_index);
                    let is_daq = text.trim_start().starts_with("daq");
                    return Ok(Action::SendCommand { card_mask: self.card_mask, text, is_daq });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;

    #[test]
    fn loop_n_repeats_body_n_times() {
        let script = preprocess("LOOP 3\nwr 0x10\nNEXT\n", true);
        let mut fetcher = Fetcher::new(1);
        fetcher.load(script);
        let mut commands = 0;
        loop {
            match fetcher.next_action(u64::MAX).unwrap() {
                Action::SendCommand { .. } => commands += 1,
                Action::ReturnToStdin => break,
                _ => {}
            }
        }
        assert_eq!(commands, 3);
    }

    #[test]
    fn daq_exhaustion_breaks_the_enclosing_loop_early() {
        let script = preprocess("LOOP 10\ndaq 0x100 B\nNEXT\n", true);
        let mut fetcher = Fetcher::new(1);
        fetcher.load(script);
        let mut commands = 0;
        loop {
            // daq_size_left hits zero after the first iteration.
            let left = if commands == 0 { 1 } else { 0 };
            match fetcher.next_action(left).unwrap() {
                Action::SendCommand { is_daq, .. } => {
                    assert!(is_daq);
                    commands += 1;
                }
                Action::ReturnToStdin => break,
                _ => {}
            }
        }
        assert_eq!(commands, 1);
    }

    #[test]
    fn fem_selector_updates_mask_for_subsequent_commands() {
        let script = preprocess("fem 0x05\nini\n", true);
        let mut fetcher = Fetcher::new(4);
        fetcher.load(script);
        let action = fetcher.next_action(u64::MAX).unwrap();
        assert_eq!(action, Action::SendCommand { card_mask: 0x05, text: "ini".to_string(), is_daq: false });
    }

    #[test]
    fn loop_index_is_substituted_into_fourth_argument() {
        let script = preprocess("LOOP 2\nwr 0x1 0x2 $loop\nNEXT\n", true);
        let mut fetcher = Fetcher::new(1);
        fetcher.load(script);
        let first = fetcher.next_action(u64::MAX).unwrap();
        assert_eq!(first, Action::SendCommand { card_mask: 0b1, text: "wr 0x1 0x2 0x0".to_string(), is_daq: false });
        let second = fetcher.next_action(u64::MAX).unwrap();
        assert_eq!(second, Action::SendCommand { card_mask: 0b1, text: "wr 0x1 0x2 0x1".to_string(), is_daq: false });
    }

    #[test]
    fn exit_directive_terminates() {
        let script = preprocess("exit\n", true);
        let mut fetcher = Fetcher::new(1);
        fetcher.load(script);
        assert_eq!(fetcher.next_action(u64::MAX).unwrap(), Action::Terminate);
    }

    #[test]
    fn exec_directive_is_surfaced_for_the_driver_to_load() {
        let script = preprocess("exec ped\n", true);
        let mut fetcher = Fetcher::new(1);
        fetcher.load(script);
        assert_eq!(fetcher.next_action(u64::MAX).unwrap(), Action::Exec("ped".to_string()));
    }
}
