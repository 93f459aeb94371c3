//! Command-line surface, parsed with `clap`'s derive API.

use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RootCompressionAlgorithm {
    Zlib,
    Lz4,
    Lzma,
}

/// Host-side DAQ core for a networked multi-board front-end electronics array.
#[derive(Debug, Parser)]
#[command(name = "femd", version, about)]
pub struct Cli {
    /// IP address the FEM/FEC cards are reachable at.
    #[arg(long)]
    pub remote_ip: IpAddr,

    /// UDP port the cards listen on.
    #[arg(long, default_value_t = femd_proxy::DEFAULT_PORT)]
    pub remote_port: u16,

    /// Bitmask of which card indices to open a proxy for; default is card 0 only.
    #[arg(long, value_parser = parse_mask, default_value = "0x1")]
    pub card_mask: u32,

    /// Local address to bind each card's UDP socket to.
    #[arg(long)]
    pub bind_ip: IpAddr,

    /// Script to run instead of reading commands from stdin.
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Directory sink output files are written to.
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Initial log verbosity (0 = warn, higher = more detail); overridden
    /// at runtime by the `verbose` script directive.
    #[arg(long, default_value_t = 0)]
    pub verbose: u8,

    /// Reserved for the original's POSIX shared-memory fan-out; accepted
    /// and stored but has no effect (external collaborator, not implemented).
    #[arg(long)]
    pub shared_buffer: bool,

    /// Disable the disk sink entirely; useful for benchmarking the receive
    /// path alone.
    #[arg(long)]
    pub read_only: bool,

    /// Accepted and stored but unused: ROOT tree writing is out of scope.
    #[arg(long, value_enum)]
    pub root_compression_algorithm: Option<RootCompressionAlgorithm>,
}

fn parse_mask(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).map_err(|e| e.to_string())
    } else {
        s.parse().map_err(|e: std::num::ParseIntError| e.to_string())
    }
}
