//! On-disk frame sink: binary `.aqs` and human-readable text, rotating at a
//! configurable per-file size threshold.

use crate::error::Result;
use crate::naming::RunParams;
use crate::sink::{Sink, SourceId};
use femd_codec::item::{encode_ascii_message, split_u32};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskMode {
    Binary,
    Text,
}

impl DiskMode {
    fn extension(&self) -> &'static str {
        match self {
            DiskMode::Binary => "aqs",
            DiskMode::Text => "txt",
        }
    }
}

pub struct DiskSink {
    dir: PathBuf,
    params: RunParams,
    mode: DiskMode,
    chunk_bytes: u64,
    start_unix_ts: u32,
    chunk_index: u32,
    current_size: u64,
    file: BufWriter<File>,
}

fn be16(v: u16) -> [u8; 2] {
    v.to_be_bytes()
}

impl DiskSink {
    pub fn create(dir: impl Into<PathBuf>, params: RunParams, mode: DiskMode, chunk_bytes: u64, start_unix_ts: u32) -> Result<Self> {
        let dir = dir.into();
        let file = Self::open_chunk(&dir, &params, mode, 0, start_unix_ts)?;
        Ok(Self { dir, params, mode, chunk_bytes, start_unix_ts, chunk_index: 0, current_size: 0, file })
    }

    fn open_chunk(dir: &PathBuf, params: &RunParams, mode: DiskMode, chunk: u32, start_unix_ts: u32) -> Result<BufWriter<File>> {
        let path = dir.join(params.chunk_file_name(chunk, mode.extension()));
        let file = File::create(path)?;
        let mut w = BufWriter::new(file);
        match mode {
            DiskMode::Binary => {
                let (header, body) = encode_ascii_message(&params.file_stem());
                let header_word = femd_codec::item::encode_word(&header);
                w.write_all(&be16(header_word))?;
                for word in body {
                    w.write_all(&be16(word))?;
                }
                let (lo, hi) = split_u32(start_unix_ts);
                w.write_all(&be16(lo))?;
                w.write_all(&be16(hi))?;
            }
            DiskMode::Text => {
                writeln!(w, "# run {} started at {}", params.file_stem(), start_unix_ts)?;
            }
        }
        Ok(w)
    }

    fn rotate(&mut self) -> Result<()> {
        self.file.flush()?;
        self.chunk_index += 1;
        self.file = Self::open_chunk(&self.dir, &self.params, self.mode, self.chunk_index, self.start_unix_ts)?;
        self.current_size = 0;
        Ok(())
    }

    fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        let frame_size = 2 + payload.len() as u64;
        if self.current_size > 0 && self.current_size + frame_size > self.chunk_bytes {
            self.rotate()?;
        }
        match self.mode {
            DiskMode::Binary => {
                self.file.write_all(&be16(payload.len() as u16))?;
                self.file.write_all(payload)?;
            }
            DiskMode::Text => {
                writeln!(self.file, "frame len={} bytes={:02x?}", payload.len(), payload)?;
            }
        }
        self.current_size += frame_size;
        Ok(())
    }

    pub fn chunk_index(&self) -> u32 {
        self.chunk_index
    }
}

impl Sink for DiskSink {
    fn on_frame(&mut self, _source: SourceId, payload: &[u8]) -> Result<()> {
        self.write_frame(payload)
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}
