mod cli;
mod wiring;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use femd_array::parse_daq_arg;
use femd_builder::EbMode;
use femd_fetcher::{bypasses_run_metadata, preprocess, Action, Fetcher};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;
use wiring::Daemon;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let daemon = Daemon::build(&cli)?;
    let card_count = daemon.array.card_count() as u32;
    let mut fetcher = Fetcher::new(card_count);

    if let Some(script) = &cli.script {
        load_script(&mut fetcher, script)?;
    }

    let result = run_command_loop(&daemon, &mut fetcher, cli.script.is_none());
    daemon.shutdown();
    result
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_script(fetcher: &mut Fetcher, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading script {path:?}"))?;
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let lines = preprocess(&raw, bypasses_run_metadata(name));
    fetcher.load(lines);
    Ok(())
}

/// Runs `T_cmd`: drain the loaded script's actions, falling back to stdin
/// prompts once it (or the top-level script, if `allow_stdin`) runs dry.
fn run_command_loop(daemon: &Daemon, fetcher: &mut Fetcher, allow_stdin: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut daq_size_left: u64 = u64::MAX;
    let mut idx = 0usize;

    loop {
        match fetcher.next_action(daq_size_left)? {
            Action::SendCommand { card_mask, text, is_daq } => {
                if is_daq {
                    if let Some(arg) = text.trim_start().strip_prefix("daq").map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
                        daemon.array.send_daq(parse_daq_arg(arg))?;
                    }
                } else {
                    daemon.array.send_command(card_mask, &text)?;
                    let done = daemon.array.await_command_done(card_mask, Duration::from_secs(4))?;
                    if !done {
                        tracing::warn!(card_mask, command = %text, "command rendezvous timed out");
                    }
                }
            }
            Action::Sleep(d) => std::thread::sleep(d),
            Action::SetVerbose(level) => tracing::info!(level, "verbose level changed"),
            Action::SetVFlags(bits) => tracing::info!(bits, "vflags changed"),
            Action::SinkOpen(mode) => tracing::info!(?mode, "fopen"),
            Action::SinkClose => tracing::info!("fclose"),
            Action::SetPath(dir) => tracing::info!(dir, "path changed"),
            Action::SetEventBuilder(mode) => {
                let mut builder = daemon.builder.lock().unwrap();
                builder.set_mode(EbMode::from_bits_truncate(mode as u8));
                builder.flush()?;
            }
            Action::SetFileChunk(mib) => tracing::info!(mib, "file_chunk changed"),
            Action::CreditsShow => tracing::info!("credits show"),
            Action::CreditsRestore(arg) => tracing::info!(?arg, "credits restore"),
            Action::DropCredit => tracing::info!("drop credit armed"),
            Action::DelayCredit(ms) => tracing::info!(?ms, "delay credit armed"),
            Action::ListPed => tracing::info!("LIST ped armed"),
            Action::ListThr => tracing::info!("LIST thr armed"),
            Action::Exec(file) => load_script(fetcher, Path::new(&file))?,
            Action::Terminate => return Ok(()),
            Action::ReturnToStdin => {
                if !allow_stdin {
                    return Ok(());
                }
                print!("({idx}) > ");
                io::stdout().flush().ok();
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    return Ok(());
                }
                idx += 1;
                fetcher.load(preprocess(&line, true));
            }
        }
    }
}
