//! Construction of the FEM array, event builder, and sinks from parsed CLI
//! arguments, and the two background worker threads (`T_rx`, `T_eb`) that
//! drive them. `T_cmd` stays on the main thread (`main.rs`), since it owns
//! the interactive stdin prompt.

use crate::cli::Cli;
use anyhow::{bail, Context, Result};
use femd_array::{CredUnit, FemArray, SELECT_TIMEOUT};
use femd_builder::{EbMode, EventBuilder};
use femd_buffer::BufferPool;
use femd_os::WorkerThread;
use femd_proxy::{target_for_card, FemProxy};
use femd_sinks::{CountersSink, DiskMode, DiskSink, NullSink, RunParams, Sink};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default pool sizing from `spec.md` §4.2 ("32×2048B default").
const DEFAULT_POOL_SLOTS: usize = 32;
const DEFAULT_POOL_SLOT_BYTES: usize = 2048;

pub struct Daemon {
    pub array: Arc<FemArray>,
    pub builder: Arc<Mutex<EventBuilder>>,
    rx_worker: Option<WorkerThread>,
    eb_worker: Option<WorkerThread>,
}

impl Daemon {
    pub fn build(cli: &Cli) -> Result<Self> {
        let IpAddr::V4(remote_v4) = cli.remote_ip else {
            bail!("--remote-ip must be an IPv4 address; the per-card addressing scheme adds the card index to the last octet");
        };

        let mut proxies = Vec::new();
        for card in 0u8..32 {
            if cli.card_mask & (1 << card) == 0 {
                continue;
            }
            let target: SocketAddr = target_for_card(remote_v4, card, cli.remote_port);
            let bind: SocketAddr = SocketAddr::new(cli.bind_ip, 0);
            let proxy = FemProxy::open(card, bind, target).with_context(|| format!("opening UDP socket for card {card}"))?;
            proxies.push(proxy);
        }
        if proxies.is_empty() {
            bail!("--card-mask selects no cards");
        }
        let card_count = proxies.len();
        let fem_proxy_set: u32 = proxies.iter().fold(0u32, |acc, p| acc | (1 << p.fem_id));

        let pool = BufferPool::new(DEFAULT_POOL_SLOTS, DEFAULT_POOL_SLOT_BYTES);

        std::fs::create_dir_all(&cli.out_dir).with_context(|| format!("creating output directory {:?}", cli.out_dir))?;
        let mut sinks: Vec<Box<dyn Sink>> = vec![Box::new(CountersSink::new())];
        if cli.read_only {
            sinks.push(Box::new(NullSink));
        } else {
            let start_unix_ts = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as u32).unwrap_or(0);
            let params = RunParams {
                run_number: 1,
                tag: "run".to_string(),
                vmesh: "0".to_string(),
                edrift: "0".to_string(),
                pressure: "0".to_string(),
                gain: "0".to_string(),
                shape: "0".to_string(),
                clock: "0".to_string(),
            };
            let disk = DiskSink::create(&cli.out_dir, params, DiskMode::Binary, 64 * 1024 * 1024, start_unix_ts)
                .context("creating disk sink")?;
            sinks.push(Box::new(disk));
        }

        let builder = Arc::new(Mutex::new(EventBuilder::new(card_count, EbMode::empty(), fem_proxy_set, sinks)));
        let array = Arc::new(FemArray::new(proxies, pool, builder.clone(), CredUnit::Bytes));

        let rx_array = array.clone();
        let rx_worker = WorkerThread::spawn("femd-rx", move |stop| {
            while !stop.is_stopped() {
                if let Err(e) = rx_array.poll_once(SELECT_TIMEOUT) {
                    tracing::warn!(error = %e, "receive loop poll failed");
                }
            }
        });

        let eb_array = array.clone();
        let eb_builder = builder.clone();
        let eb_worker = WorkerThread::spawn("femd-eb", move |stop| {
            while !stop.is_stopped() {
                if let Err(e) = eb_builder.lock().unwrap().run_once() {
                    tracing::warn!(error = %e, "event builder pass failed");
                }
                if let Err(e) = eb_array.drain_recycled() {
                    tracing::warn!(error = %e, "recycle drain failed");
                }
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
        });

        Ok(Self { array, builder, rx_worker: Some(rx_worker), eb_worker: Some(eb_worker) })
    }

    pub fn shutdown(mut self) {
        if let Some(w) = self.rx_worker.take() {
            w.request_stop();
            w.join();
        }
        if let Some(w) = self.eb_worker.take() {
            w.request_stop();
            w.join();
        }
        if let Ok(mut builder) = self.builder.lock() {
            let _ = builder.flush();
        }
    }
}
