//! Diagnostic sink for unrecognised messages.
//!
//! The decoders hand every unknown or known-but-opaque record to a sink so
//! schema work can happen offline. The default sink discards everything;
//! the file sink keeps a bounded number of raw samples per kind.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::PathBuf,
};

use log::{debug, warn};

use crate::demux::Direction;

/// Write-only store for raw bodies of unrecognised messages.
pub trait DiagnosticSink: Send {
    /// Record one raw message body.
    ///
    /// `kind` is a stable slug naming the record shape (for example
    /// `player-update-109`), `sequence` the lane sequence number when the
    /// message came off a TCP lane. Implementations must not fail the
    /// pipeline; storage errors are theirs to absorb.
    fn store(&mut self, kind: &str, raw: &[u8], direction: Direction, sequence: Option<u32>);
}

/// Sink that discards every sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn store(&mut self, _kind: &str, _raw: &[u8], _direction: Direction, _sequence: Option<u32>) {}
}

/// Sink dumping raw samples into a directory.
///
/// At most `max_per_kind` samples are written per `(direction, kind)` pair;
/// the rest are counted and dropped. Filenames are
/// `<kind>-<direction>-<n>.bin` with `n` the per-pair sample index.
#[derive(Debug)]
pub struct FileDumpSink {
    dir: PathBuf,
    max_per_kind: usize,
    counts: HashMap<(Direction, String), usize>,
}

impl FileDumpSink {
    /// Default number of samples kept per `(direction, kind)` pair.
    pub const DEFAULT_MAX_PER_KIND: usize = 10;

    /// Create a sink writing into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be
    /// created.
    pub fn new(dir: impl Into<PathBuf>, max_per_kind: usize) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            max_per_kind,
            counts: HashMap::new(),
        })
    }

    fn write_sample(&self, kind: &str, raw: &[u8], direction: Direction, index: usize) {
        let path = self
            .dir
            .join(format!("{kind}-{}-{index}.bin", direction.as_str()));
        let result = fs::File::create(&path).and_then(|mut file| file.write_all(raw));
        match result {
            Ok(()) => debug!("stored {} byte sample at {}", raw.len(), path.display()),
            Err(e) => warn!("failed to store sample at {}: {e}", path.display()),
        }
    }
}

impl DiagnosticSink for FileDumpSink {
    fn store(&mut self, kind: &str, raw: &[u8], direction: Direction, _sequence: Option<u32>) {
        let count = self
            .counts
            .entry((direction, kind.to_owned()))
            .or_insert(0);
        if *count >= self.max_per_kind {
            return;
        }
        let index = *count;
        *count += 1;
        self.write_sample(kind, raw, direction, index);
    }
}
