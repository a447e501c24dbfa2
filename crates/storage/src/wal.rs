// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Amelia Authors

//! Append-only write-ahead log of [`WalOp`]s.
//!
//! Every durable mutation (workflow create/update, event append, settings
//! update, profile upsert/activation, token usage append) is written here
//! before [`crate::state::MaterializedState`] is updated, satisfying spec
//! §4.1's "transactional writes" requirement without an embedded SQL engine
//! (SPEC_FULL §2). One line of JSON per entry; corrupt tails are rotated out
//! rather than failing the daemon.

use crate::op::WalOp;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One durable record: the assigned sequence plus the operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub op: WalOp,
}

const FLUSH_ENTRY_THRESHOLD: usize = 100;
const FLUSH_INTERVAL: Duration = Duration::from_millis(250);
const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = std::fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = std::fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// Append-only log backed by a single file, opened once for the process
/// lifetime and appended to with line-buffered JSON.
pub struct Wal {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
    /// Byte offset of the first entry not yet returned by `next_unprocessed`.
    read_offset: u64,
    unflushed_entries: usize,
    last_flush: Instant,
}

impl Wal {
    /// Open (creating if absent) the WAL at `path`, replaying and validating
    /// its contents. `processed_seq` is the sequence the caller's last
    /// snapshot covers (0 if none); entries at or below it are skipped by
    /// [`Wal::next_unprocessed`] but still counted in `write_seq`.
    ///
    /// Any trailing line that fails to parse (truncated write, binary
    /// garbage from a partial flush) is treated as corruption: everything
    /// from that point on is cut and rotated into a `.bak` file rather than
    /// causing startup to fail (spec §9 "durable store as single source of
    /// truth" would be undermined by refusing to start over one bad line).
    pub fn open(path: &Path, processed_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let valid = Self::read_valid_entries(path)?;
        if let Some(byte_len) = valid.corrupt_at {
            let raw = std::fs::read(path)?;
            let bak = rotate_bak_path(path);
            std::fs::write(&bak, &raw)?;
            let mut clean = File::create(path)?;
            clean.write_all(&raw[..byte_len])?;
            clean.flush()?;
        }

        let write_seq = valid.entries.last().map(|e| e.seq).unwrap_or(0);

        let file = OpenOptions::new().read(true).append(true).create(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_seq,
            processed_seq,
            read_offset: 0,
            unflushed_entries: 0,
            last_flush: Instant::now(),
        })
    }

    fn read_valid_entries(path: &Path) -> Result<ValidEntries, WalError> {
        if !path.exists() {
            return Ok(ValidEntries { entries: Vec::new(), corrupt_at: None });
        }
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut entries = Vec::new();
        let mut offset: u64 = 0;
        loop {
            let mut line = Vec::new();
            let read = reader.read_until(b'\n', &mut line)?;
            if read == 0 {
                return Ok(ValidEntries { entries, corrupt_at: None });
            }
            match std::str::from_utf8(&line).ok().and_then(|s| serde_json::from_str::<WalEntry>(s.trim_end()).ok()) {
                Some(entry) => {
                    offset += read as u64;
                    entries.push(entry);
                }
                None => return Ok(ValidEntries { entries, corrupt_at: Some(offset) }),
            }
        }
    }

    /// Append `op`, assigning it the next sequence number. Buffered until
    /// [`Wal::flush`] or [`Wal::needs_flush`] triggers a write.
    pub fn append(&mut self, op: &WalOp) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, op: op.clone() };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.unflushed_entries += 1;
        Ok(entry.seq)
    }

    /// Force buffered writes to disk.
    pub fn flush(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.unflushed_entries = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// Whether enough unflushed entries or time has accumulated to warrant
    /// an explicit [`Wal::flush`] call from the caller's batching loop.
    pub fn needs_flush(&self) -> bool {
        self.unflushed_entries >= FLUSH_ENTRY_THRESHOLD
            || (self.unflushed_entries > 0 && self.last_flush.elapsed() >= FLUSH_INTERVAL)
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    pub fn mark_processed(&mut self, seq: u64) {
        if seq > self.processed_seq {
            self.processed_seq = seq;
        }
    }

    /// Return the next entry past `processed_seq` that hasn't already been
    /// returned, advancing an internal read cursor.
    ///
    /// A line that fails to parse but ends in a newline is complete garbage
    /// (a concurrent process corrupted it after the fact) and is skipped
    /// permanently. A line with no trailing newline is a writer's in-flight
    /// partial flush; it is left alone and `None` is returned so the caller
    /// can retry once the write completes.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        loop {
            let mut file = File::open(&self.path)?;
            file.seek(SeekFrom::Start(self.read_offset))?;
            let mut reader = BufReader::new(file);
            let mut line = Vec::new();
            let read = reader.read_until(b'\n', &mut line)?;
            if read == 0 {
                return Ok(None);
            }
            let complete = line.last() == Some(&b'\n');
            let parsed = std::str::from_utf8(&line)
                .ok()
                .and_then(|s| serde_json::from_str::<WalEntry>(s.trim_end()).ok());
            match parsed {
                Some(entry) => {
                    self.read_offset += read as u64;
                    if entry.seq <= self.processed_seq {
                        continue;
                    }
                    return Ok(Some(entry));
                }
                None if complete => {
                    self.read_offset += read as u64;
                    continue;
                }
                None => return Ok(None),
            }
        }
    }

    /// All valid entries with `seq > since`, in ascending order. Stops at
    /// the first corrupt or binary line rather than erroring, since a
    /// concurrent append can be mid-flush.
    pub fn entries_after(&self, since: u64) -> Result<Vec<WalEntry>, WalError> {
        let valid = Self::read_valid_entries(&self.path)?;
        Ok(valid.entries.into_iter().filter(|e| e.seq > since).collect())
    }

    /// Drop entries with `seq < keep_from` from the on-disk file, used after
    /// a snapshot has durably captured everything up to `keep_from - 1`.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), WalError> {
        let valid = Self::read_valid_entries(&self.path)?;
        let remaining: Vec<WalEntry> = valid.entries.into_iter().filter(|e| e.seq >= keep_from).collect();
        let mut buf = Vec::new();
        for entry in &remaining {
            serde_json::to_writer(&mut buf, entry)?;
            buf.push(b'\n');
        }
        std::fs::write(&self.path, &buf)?;
        self.file = OpenOptions::new().read(true).append(true).create(true).open(&self.path)?;
        self.read_offset = 0;
        Ok(())
    }
}

struct ValidEntries {
    entries: Vec<WalEntry>,
    corrupt_at: Option<u64>,
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
