//! The FEM array: command fan-out, per-card DAQ credit accounting, and the
//! `select`-driven receive loop that feeds buffers to the event builder.

use crate::credit::{apply_request, format_command, plan_request};
use crate::daq::{CredUnit, DaqAccounting, DaqArg};
use crate::error::{ArrayError, Result};
use crate::select::select_readable;
use femd_buffer::{BufferPool, Owner};
use femd_builder::{EventBuilder, InputItem, RecycleItem};
use femd_os::Semaphore;
use femd_proxy::{FemProxy, FrameOutcome};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default `select` timeout, matching the 5 s poll interval used throughout
/// the command fetcher's rendezvous waits.
pub const SELECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns every card's [`FemProxy`], the shared buffer pool, and a handle to
/// the event builder's queues. One instance per running daemon.
pub struct FemArray {
    proxies: Mutex<Vec<FemProxy>>,
    pool: Mutex<BufferPool>,
    builder: Arc<Mutex<EventBuilder>>,
    daq: Mutex<DaqAccounting>,
    unit: CredUnit,
    /// Signalled once per card whose command reply (or failure) has been
    /// processed, so `send_command` callers can rendezvous on completion.
    sem_cur_cmd_done: Semaphore,
}

impl FemArray {
    pub fn new(proxies: Vec<FemProxy>, pool: BufferPool, builder: Arc<Mutex<EventBuilder>>, unit: CredUnit) -> Self {
        Self {
            proxies: Mutex::new(proxies),
            pool: Mutex::new(pool),
            builder,
            daq: Mutex::new(DaqAccounting::default()),
            unit,
            sem_cur_cmd_done: Semaphore::new(0),
        }
    }

    pub fn card_count(&self) -> usize {
        self.proxies.lock().unwrap().len()
    }

    /// Fan out `text` to every card selected by `card_mask` (bit *i* selects
    /// card *i*). Fails the whole call if any selected card already has a
    /// command in flight, leaving no card's `is_cmd_pending` touched.
    pub fn send_command(&self, card_mask: u32, text: &str) -> Result<()> {
        let mut proxies = self.proxies.lock().unwrap();
        for (i, proxy) in proxies.iter().enumerate() {
            if card_mask & (1 << i) != 0 && proxy.is_cmd_pending {
                return Err(ArrayError::CommandAlreadyPending(i as u8));
            }
        }
        for (i, proxy) in proxies.iter_mut().enumerate() {
            if card_mask & (1 << i) == 0 {
                continue;
            }
            proxy.send_command(text)?;
            proxy.is_cmd_pending = true;
            proxy.cmd_posted_cnt += 1;
        }
        Ok(())
    }

    /// Wait up to `timeout` for every card selected by `card_mask` to clear
    /// `is_cmd_pending`, polling the receive path in between.
    pub fn await_command_done(&self, card_mask: u32, timeout: Duration) -> Result<bool> {
        let deadline = timeout;
        let mut waited = Duration::ZERO;
        let step = Duration::from_millis(50);
        loop {
            self.poll_once(Duration::from_millis(0))?;
            let done = {
                let proxies = self.proxies.lock().unwrap();
                proxies.iter().enumerate().all(|(i, p)| card_mask & (1 << i) == 0 || !p.is_cmd_pending)
            };
            if done {
                return Ok(true);
            }
            if waited >= deadline {
                return Ok(false);
            }
            self.sem_cur_cmd_done.wait_timeout(step);
            waited += step;
        }
    }

    /// Apply a new `daq <arg>` directive and issue each eligible card's
    /// first request for this session.
    pub fn send_daq(&self, arg: DaqArg) -> Result<()> {
        {
            let mut daq = self.daq.lock().unwrap();
            daq.apply(arg);
        }
        self.issue_daq_requests()
    }

    /// Re-evaluate every card's credit against the shared DAQ accounting and
    /// issue a `daq` command to any card whose `req_credit` has crossed back
    /// above `req_threshold`. Called after `send_daq` and after each
    /// recycle drain.
    pub fn issue_daq_requests(&self) -> Result<()> {
        let daq = *self.daq.lock().unwrap();
        let mut proxies = self.proxies.lock().unwrap();
        for proxy in proxies.iter_mut() {
            if proxy.is_cmd_pending {
                continue;
            }
            let Some(req) = plan_request(proxy, &daq) else { continue };
            let text = format_command(&req, self.unit);
            proxy.send_command(&text)?;
            proxy.is_cmd_pending = true;
            proxy.cmd_posted_cnt += 1;
            apply_request(proxy, req);
        }
        Ok(())
    }

    /// One pass of the receive loop: `select` over every card's socket,
    /// process whatever arrived, and dispatch data frames to the builder.
    /// Returns the number of datagrams processed.
    pub fn poll_once(&self, timeout: Duration) -> Result<usize> {
        let fds: Vec<_> = {
            let proxies = self.proxies.lock().unwrap();
            proxies.iter().map(|p| p.raw_fd()).collect()
        };
        let ready = select_readable(&fds, timeout)?;
        if ready.is_empty() {
            return Ok(0);
        }

        let mut processed = 0;
        let mut proxies = self.proxies.lock().unwrap();
        for (i, proxy) in proxies.iter_mut().enumerate() {
            if !ready.contains(&proxy.raw_fd()) {
                continue;
            }
            processed += self.handle_readable(i as u8, proxy)?;
        }
        Ok(processed)
    }

    fn handle_readable(&self, source: u8, proxy: &mut FemProxy) -> Result<usize> {
        let mut count = 0;
        loop {
            let addr = {
                let mut pool = self.pool.lock().unwrap();
                match pool.give(Owner::AutoReturned) {
                    Ok(addr) => addr,
                    Err(_) => break,
                }
            };
            let n = {
                let mut pool = self.pool.lock().unwrap();
                let slot = pool.slot_bytes_mut(addr)?;
                match proxy.try_recv(slot)? {
                    Some(n) => n,
                    None => {
                        pool.give_back(addr)?;
                        break;
                    }
                }
            };

            let outcome = {
                let mut pool = self.pool.lock().unwrap();
                let slot = pool.slot_bytes_mut(addr)?;
                proxy.process_frame(slot, n)?
            };

            match outcome {
                FrameOutcome::Data { .. } => {
                    let bytes = {
                        let pool = self.pool.lock().unwrap();
                        pool.slot_bytes(addr)?[..n].to_vec()
                    };
                    let item = InputItem { source, addr, bytes };
                    let builder = self.builder.lock().unwrap();
                    if builder.post(item).is_err() {
                        let mut pool = self.pool.lock().unwrap();
                        pool.give_back(addr)?;
                    }
                }
                FrameOutcome::ConfigReply { .. } | FrameOutcome::Monitoring { .. } => {
                    let mut pool = self.pool.lock().unwrap();
                    pool.give_back(addr)?;
                    self.sem_cur_cmd_done.signal();
                }
            }
            count += 1;
        }
        Ok(count)
    }

    /// Drain buffers the builder has finished with: return them to the
    /// pool, credit the DAQ session accounting, and restore the
    /// originating card's request credit.
    pub fn drain_recycled(&self) -> Result<usize> {
        let mut drained = 0;
        loop {
            let item: RecycleItem = {
                let builder = self.builder.lock().unwrap();
                match builder.try_recv_recycled() {
                    Some(item) => item,
                    None => break,
                }
            };
            {
                let mut pool = self.pool.lock().unwrap();
                pool.give_back(item.addr)?;
            }
            {
                let mut daq = self.daq.lock().unwrap();
                daq.on_recycled(item.declared_len as u64);
            }
            {
                let mut proxies = self.proxies.lock().unwrap();
                if let Some(proxy) = proxies.get_mut(item.source as usize) {
                    proxy.req_credit += item.declared_len as u32;
                    proxy.pnd_recv = proxy.pnd_recv.saturating_sub(item.declared_len as u32);
                }
            }
            drained += 1;
        }
        if drained > 0 {
            self.issue_daq_requests()?;
        }
        Ok(drained)
    }
}
