//! Global DAQ session accounting shared across all cards.

/// Unit the credit protocol is denominated in, chosen once for the whole
/// array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredUnit {
    Bytes,
    Frames,
}

impl CredUnit {
    pub fn letter(&self) -> char {
        match self {
            CredUnit::Bytes => 'B',
            CredUnit::Frames => 'F',
        }
    }
}

/// Parsed form of a `DAQ <arg>` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaqArg {
    Stop,
    Unlimited,
    ProgressTick,
    NewSession(u64),
}

pub fn parse_daq_arg(arg: i64) -> DaqArg {
    match arg {
        0 => DaqArg::Stop,
        -1 => DaqArg::Unlimited,
        -2 => DaqArg::ProgressTick,
        n if n > 0 => DaqArg::NewSession(n as u64),
        _ => DaqArg::Stop,
    }
}

/// `daq_size_left`/`daq_size_rcv`/`daq_infinite` accounting. `daq_size_left`
/// saturates at 0 rather than underflowing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DaqAccounting {
    pub daq_size_left: u64,
    pub daq_size_rcv: u64,
    pub daq_infinite: bool,
    pub last_ack_sent: bool,
}

impl DaqAccounting {
    pub fn apply(&mut self, arg: DaqArg) {
        match arg {
            DaqArg::Stop => {
                self.daq_size_left = 0;
                self.daq_infinite = false;
                self.last_ack_sent = true;
            }
            DaqArg::Unlimited => {
                self.daq_infinite = true;
                self.daq_size_left = 0;
                self.daq_size_rcv = 0;
                self.last_ack_sent = false;
            }
            DaqArg::ProgressTick => {}
            DaqArg::NewSession(n) => {
                self.daq_size_left = n;
                self.daq_size_rcv = 0;
                self.daq_infinite = false;
                self.last_ack_sent = false;
            }
        }
    }

    /// Size a request should claim, per §4.4.2: `min(req_credit,
    /// daq_size_left)`, or `req_credit` if infinite, or 0 if nothing left.
    pub fn requestable(&self, req_credit: u32) -> u32 {
        if self.last_ack_sent {
            return 0;
        }
        if self.daq_infinite {
            return req_credit;
        }
        if self.daq_size_left == 0 {
            return 0;
        }
        req_credit.min(self.daq_size_left as u32)
    }

    /// Credit `daq_size_rcv` and debit `daq_size_left` by `n` bytes,
    /// flooring at 0.
    pub fn on_recycled(&mut self, n: u64) {
        self.daq_size_rcv += n;
        self.daq_size_left = self.daq_size_left.saturating_sub(n);
    }
}
