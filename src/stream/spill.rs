//! Spill-to-disk input stream
//!
//! The first `threshold` bytes of a body are held in memory. When the body is
//! longer, a background thread drains the rest of the source into a temporary
//! file while the consumer reads the in-memory prefix and then follows the
//! file as it grows.
//!
//! The consumer and the drain share one state behind a `Mutex` + `Condvar`
//! (bytes written, finished, failure) and one `AtomicBool` that records the
//! consumer giving up. The drain checks that flag at every read boundary, stops
//! writing once it is set, and drops the source exactly once on the way out.

use crate::config::WireConfig;
use crate::stream::Cleanup;
use bytes::Bytes;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// Spill parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpillOptions {
    /// Bytes held in memory before spilling
    pub threshold: usize,
    /// Directory for the spill file (None = system temp dir)
    pub dir: Option<PathBuf>,
    /// Read size of the background drain
    pub buffer_size: usize,
}

impl SpillOptions {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            dir: None,
            buffer_size: 64 * 1024,
        }
    }

    /// `None` when the configuration disables spilling
    pub fn from_config(config: &WireConfig) -> Option<Self> {
        config.spill_threshold.map(|threshold| Self {
            threshold,
            dir: config.spill_dir.clone(),
            buffer_size: config.drain_buffer_size.max(1),
        })
    }
}

#[derive(Debug, Default)]
struct DrainState {
    written: u64,
    finished: bool,
    failure: Option<(io::ErrorKind, String)>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<DrainState>,
    progress: Condvar,
    abandoned: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, DrainState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::Acquire)
    }

    fn abandon(&self) {
        // Held so a consumer between its flag check and its wait still wakes
        let _state = self.lock();
        self.abandoned.store(true, Ordering::Release);
        self.progress.notify_all();
    }

    fn wrote(&self, n: usize) {
        self.lock().written += n as u64;
        self.progress.notify_all();
    }

    fn finish(&self, failure: Option<&io::Error>) {
        let mut state = self.lock();
        state.finished = true;
        state.failure = failure.map(|e| (e.kind(), e.to_string()));
        drop(state);
        self.progress.notify_all();
    }

    /// Block until bytes past `read` exist or the drain has finished
    fn wait_past(&self, read: u64) -> io::Result<u64> {
        let mut state = self.lock();
        loop {
            if state.written > read {
                return Ok(state.written);
            }
            if state.finished {
                return match &state.failure {
                    Some((kind, message)) => Err(io::Error::new(*kind, message.clone())),
                    None => Ok(state.written),
                };
            }
            if self.is_abandoned() {
                return Ok(read);
            }
            state = match self.progress.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }
}

fn drain<R: Read>(mut source: R, mut writer: File, shared: &Shared, buffer_size: usize) {
    let mut buf = vec![0u8; buffer_size];
    let outcome = loop {
        if shared.is_abandoned() {
            break Ok(());
        }
        let n = match source.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        };
        // The consumer may have gone away during the blocking read
        if shared.is_abandoned() {
            break Ok(());
        }
        if let Err(e) = writer.write_all(&buf[..n]) {
            break Err(e);
        }
        shared.wrote(n);
    };
    drop(source);
    match &outcome {
        Ok(()) if shared.is_abandoned() => debug!("Spill drain abandoned by consumer"),
        Ok(()) => debug!("Spill drain finished"),
        Err(e) => warn!("Spill drain failed: {}", e),
    }
    shared.finish(outcome.as_ref().err());
}

struct Spill {
    file: File,
    read: u64,
    // Removes the file when dropped
    _path: TempPath,
}

/// Byte stream over a response body, spilling to a temporary file past a threshold
pub struct SpillReader {
    prefix: Bytes,
    pos: usize,
    spill: Option<Spill>,
    shared: Arc<Shared>,
}

impl SpillReader {
    /// Buffer the prefix and, if the source is longer, start the background drain
    pub fn open<R>(mut source: R, options: &SpillOptions) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let mut prefix = Vec::with_capacity(options.threshold.min(1 << 20));
        source
            .by_ref()
            .take(options.threshold as u64)
            .read_to_end(&mut prefix)?;

        let shared = Arc::new(Shared::default());
        if prefix.len() < options.threshold {
            drop(source);
            shared.finish(None);
            return Ok(Self {
                prefix: Bytes::from(prefix),
                pos: 0,
                spill: None,
                shared,
            });
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("nodewire-").suffix(".spill");
        let temp = match &options.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let writer = temp.reopen()?;
        let file = temp.reopen()?;
        let path = temp.into_temp_path();
        info!(
            "Response body exceeds {} bytes, spilling to {}",
            options.threshold,
            path.display()
        );

        let drain_shared = shared.clone();
        let buffer_size = options.buffer_size.max(1);
        let _drain = thread::Builder::new()
            .name("nodewire-spill".to_string())
            .spawn(move || drain(source, writer, &drain_shared, buffer_size))?;

        Ok(Self {
            prefix: Bytes::from(prefix),
            pos: 0,
            spill: Some(Spill {
                file,
                read: 0,
                _path: path,
            }),
            shared,
        })
    }

    /// Whether the body outgrew the in-memory prefix
    pub fn is_spilling(&self) -> bool {
        self.spill.is_some()
    }

    /// Stop consuming: the drain stops at its next read boundary and the spill file is removed
    pub fn close(&mut self) {
        self.shared.abandon();
        self.spill = None;
        self.pos = self.prefix.len();
    }

    /// Cleanup handle that abandons the drain without access to the reader
    pub fn abandon_handle(&self) -> Cleanup {
        let shared = self.shared.clone();
        Cleanup::new(move || shared.abandon())
    }

    /// Observer of the background drain
    pub fn drain_handle(&self) -> DrainHandle {
        DrainHandle {
            shared: self.shared.clone(),
        }
    }
}

impl Read for SpillReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.pos < self.prefix.len() {
            let n = out.len().min(self.prefix.len() - self.pos);
            out[..n].copy_from_slice(&self.prefix[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }
        let Some(spill) = self.spill.as_mut() else {
            return Ok(0);
        };
        let available = self.shared.wait_past(spill.read)?;
        if available <= spill.read {
            return Ok(0);
        }
        let want = out.len().min((available - spill.read) as usize);
        let n = spill.file.read(&mut out[..want])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "spill file shorter than recorded",
            ));
        }
        spill.read += n as u64;
        Ok(n)
    }
}

impl Drop for SpillReader {
    fn drop(&mut self) {
        if self.spill.is_some() {
            self.close();
        }
    }
}

/// Read-only view of a drain's progress
#[derive(Clone)]
pub struct DrainHandle {
    shared: Arc<Shared>,
}

impl DrainHandle {
    pub fn bytes_spilled(&self) -> u64 {
        self.shared.lock().written
    }

    pub fn is_finished(&self) -> bool {
        self.shared.lock().finished
    }

    /// Block until the drain thread has dropped the source
    pub fn wait_finished(&self) {
        let mut state = self.shared.lock();
        while !state.finished {
            state = match self.shared.progress.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }
}
