//! Per-card proxy state and frame-processing pipeline.

use crate::error::Result;
use crate::socket::{self, MTU};
use femd_codec::classify;
use socket2::Socket;
use std::net::SocketAddr;
use std::os::unix::io::{AsRawFd, RawFd};

fn be_u16(buf: &[u8], offset: usize) -> u16 {
    ((buf[offset] as u16) << 8) | (buf[offset + 1] as u16)
}

/// Outcome of processing one received datagram, used by the FEM array's
/// receive loop to decide what to do with the buffer next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Data frame: hand the buffer to the event builder's per-source queue.
    Data { declared_len: u16 },
    /// Config-reply frame: the embedded error code and whether it signalled failure.
    ConfigReply { declared_len: u16, error_code: i16, failed: bool },
    /// Monitoring frame; `is_stat` marks a statistics frame (also logged locally).
    Monitoring { declared_len: u16, is_stat: bool },
}

/// Per-card proxy: one UDP socket, its sequence/credit bookkeeping, and the
/// counters the command fetcher and disk sink read back.
pub struct FemProxy {
    pub fem_id: u8,
    socket: Socket,
    target: SocketAddr,

    exp_rep_nb: u8,
    pub daq_reply_loss_cnt: u64,
    pub daq_reply_cnt: u64,
    pub cmd_reply_cnt: u64,
    pub cmd_posted_cnt: u64,
    pub cmd_failed: u64,
    pub is_cmd_pending: bool,

    pub req_credit: u32,
    pub req_threshold: u32,
    pub pnd_recv: u32,
    pub req_seq_nb: u8,
    pub is_first_req: bool,
}

pub const DEFAULT_MAX_REQ_CREDIT_BYTES: u32 = 16 * 1024;
pub const DEFAULT_REQ_THRESHOLD_BYTES: u32 = 8 * 1024;

impl FemProxy {
    pub fn open(fem_id: u8, bind_addr: SocketAddr, target: SocketAddr) -> Result<Self> {
        let socket = socket::open(bind_addr, target)?;
        Ok(Self {
            fem_id,
            socket,
            target,
            exp_rep_nb: 0,
            daq_reply_loss_cnt: 0,
            daq_reply_cnt: 0,
            cmd_reply_cnt: 0,
            cmd_posted_cnt: 0,
            cmd_failed: 0,
            is_cmd_pending: false,
            req_credit: DEFAULT_MAX_REQ_CREDIT_BYTES,
            req_threshold: DEFAULT_REQ_THRESHOLD_BYTES,
            pnd_recv: 0,
            req_seq_nb: 0,
            is_first_req: true,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn exp_rep_nb(&self) -> u8 {
        self.exp_rep_nb
    }

    pub fn raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }

    pub fn send_command(&self, text: &str) -> std::io::Result<usize> {
        self.socket.send(text.as_bytes())
    }

    /// Read one datagram into `buf` (capped to [`MTU`]). Returns the number
    /// of bytes read, or `None` if nothing was ready (`WouldBlock`).
    pub fn try_recv(&self, buf: &mut [u8]) -> std::io::Result<Option<usize>> {
        let cap = buf.len().min(MTU);
        // SAFETY: `Socket::recv` requires `&mut [MaybeUninit<u8>]`; a `&mut [u8]`
        // slice reinterpreted this way is always already initialized.
        let uninit = unsafe { &mut *(&mut buf[..cap] as *mut [u8] as *mut [std::mem::MaybeUninit<u8>]) };
        match self.socket.recv(uninit) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Apply the §4.3 frame-processing pipeline to a just-received datagram
    /// occupying `buf[..n]`. Overwrites the leading sequence word with the
    /// datagram length, as the downstream codec expects.
    pub fn process_frame(&mut self, buf: &mut [u8], n: usize) -> Result<FrameOutcome> {
        if n < 4 {
            return Err(femd_codec::CodecError::TooShort { need: 4, have: n }.into());
        }
        let seq_word = be_u16(buf, 0);
        let content0 = be_u16(buf, 2);
        let rep_nb = (seq_word & 0xFF) as u8;
        let is_reset = seq_word & 0x0100 != 0;

        let outcome = if classify::is_dframe(content0) {
            self.account_sequence(rep_nb, is_reset);
            self.daq_reply_cnt += 1;
            FrameOutcome::Data { declared_len: n as u16 }
        } else if classify::is_cframe(content0) {
            let error_code = if n >= 6 { be_u16(buf, 4) as i16 } else { 0 };
            self.cmd_reply_cnt += 1;
            self.is_cmd_pending = false;
            let failed = error_code < 0;
            if failed {
                self.cmd_failed += 1;
            }
            FrameOutcome::ConfigReply { declared_len: n as u16, error_code, failed }
        } else {
            let body_after_header: Vec<u16> = (4..n.saturating_sub(1))
                .step_by(2)
                .skip(1)
                .map(|off| be_u16(buf, off))
                .collect();
            let is_stat = classify::is_msg_stat(content0, &body_after_header);
            self.cmd_reply_cnt += 1;
            self.is_cmd_pending = false;
            FrameOutcome::Monitoring { declared_len: n as u16, is_stat }
        };

        // The sequence number is not needed downstream; the codec uses this
        // leading word as the declared body length instead.
        buf[0] = (n >> 8) as u8;
        buf[1] = (n & 0xFF) as u8;

        Ok(outcome)
    }

    fn account_sequence(&mut self, rep_nb: u8, is_reset: bool) {
        if is_reset {
            self.exp_rep_nb = rep_nb;
        } else if rep_nb != self.exp_rep_nb {
            let lost = (rep_nb.wrapping_sub(self.exp_rep_nb)) as u16;
            let lost = if rep_nb >= self.exp_rep_nb { lost } else { 256 - (self.exp_rep_nb - rep_nb) as u16 };
            self.daq_reply_loss_cnt += lost as u64;
        }
        self.exp_rep_nb = rep_nb.wrapping_add(1);
    }
}
