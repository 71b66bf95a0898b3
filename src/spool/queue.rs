//! The spool: a durable append queue with an atomic swap.
//!
//! # Protocol
//!
//! Producers and the drainer share one critical section (in-process mutex
//! plus `spool.lock`):
//!
//! - `enqueue` appends exactly one complete line to the active file
//! - the swap renames the active file to the processing name and creates a
//!   fresh, empty active file
//!
//! Everything else (decoding, sink delivery, deleting the processing file)
//! happens outside the lock. A processing file that exists when a drain
//! starts is always delivered and removed before the next swap, which is
//! how a crash between swap and delivery is recovered on restart.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::errors::{SpoolError, SpoolResult};
use super::layout::SpoolLayout;
use super::lock::SpoolLock;
use super::reader::{read_batch, DecodedBatch};
use crate::crash_point::{maybe_crash, points};
use crate::entry::LogEntry;
use crate::observability::MetricsRegistry;
use crate::sink::{Sink, SinkError};

/// Spool settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolConfig {
    /// Directory holding the spool files; created if missing
    pub data_dir: PathBuf,
    /// fsync every append before acknowledging it
    pub fsync: bool,
}

impl SpoolConfig {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            fsync: true,
        }
    }

    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }
}

/// Mutable state owned by one spool instance, touched only under its lock.
#[derive(Debug, Default)]
struct ActiveState {
    /// Lines appended by this instance since open
    appended: u64,
    /// Swaps performed by this instance since open
    swaps: u64,
}

/// File-backed durable queue of log entries.
///
/// `Spool` is `Send + Sync`; share it behind an `Arc` between producers and
/// the single drainer.
#[derive(Debug)]
pub struct Spool {
    layout: SpoolLayout,
    fsync: bool,
    state: Mutex<ActiveState>,
    lock: SpoolLock,
    metrics: Arc<MetricsRegistry>,
}

impl Spool {
    /// Opens (or creates) the spool in `config.data_dir`.
    pub fn open(config: SpoolConfig) -> SpoolResult<Self> {
        Self::open_with_metrics(config, Arc::new(MetricsRegistry::new()))
    }

    /// Opens the spool reporting into an existing metrics registry.
    pub fn open_with_metrics(
        config: SpoolConfig,
        metrics: Arc<MetricsRegistry>,
    ) -> SpoolResult<Self> {
        let layout = SpoolLayout::new(&config.data_dir);
        layout.ensure_dir()?;
        let lock = SpoolLock::open(&layout)?;

        if layout.processing_path().exists() {
            info!(
                file = %layout.processing_path().display(),
                "found processing file from a previous run; it will be delivered first"
            );
        }

        Ok(Self {
            layout,
            fsync: config.fsync,
            state: Mutex::new(ActiveState::default()),
            lock,
            metrics,
        })
    }

    pub fn layout(&self) -> &SpoolLayout {
        &self.layout
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Lines appended through this instance since it was opened.
    pub fn appended(&self) -> u64 {
        self.state.lock().map(|s| s.appended).unwrap_or(0)
    }

    /// Swaps performed through this instance since it was opened.
    pub fn swaps(&self) -> u64 {
        self.state.lock().map(|s| s.swaps).unwrap_or(0)
    }

    /// Runs `f` inside the append/swap critical section.
    fn with_exclusive<T>(
        &self,
        f: impl FnOnce(&mut ActiveState) -> SpoolResult<T>,
    ) -> SpoolResult<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SpoolError::Lock("spool mutex poisoned".to_string()))?;
        let _guard = self.lock.acquire()?;
        f(&mut state)
    }

    /// Durably appends one entry to the active file.
    ///
    /// Returns only after the line is written (and synced when fsync is
    /// enabled). On a failed write or sync the file is truncated back to
    /// its previous length. If that truncation fails too, the line may
    /// still be delivered, so callers must treat a failed submission as
    /// possibly stored and retry at-least-once.
    pub fn enqueue(&self, entry: &LogEntry) -> SpoolResult<()> {
        let line = entry.to_line()?;

        maybe_crash(points::SPOOL_BEFORE_APPEND);

        let result = self.with_exclusive(|state| {
            self.append_line(&line)?;
            state.appended += 1;
            Ok(())
        });

        match result {
            Ok(()) => {
                maybe_crash(points::SPOOL_AFTER_APPEND);
                self.metrics.record_enqueue(line.len() as u64);
                Ok(())
            }
            Err(e) => {
                self.metrics.increment_enqueue_failures();
                Err(e)
            }
        }
    }

    /// Appends `line` to the active file. Caller holds the lock.
    ///
    /// The file is opened per append: another process may have swapped it
    /// away since our last write.
    fn append_line(&self, line: &[u8]) -> SpoolResult<()> {
        let path = self.layout.active_path();
        let created = !path.exists();
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| SpoolError::io("open active file", &path, e))?;

        let len_before = file
            .metadata()
            .map_err(|e| SpoolError::io("stat active file", &path, e))?
            .len();

        let mut buffer = Vec::with_capacity(line.len() + 1);
        if len_before > 0 && !ends_with_newline(&mut file, &path)? {
            // A crash left half a line behind. Terminate it so the fragment
            // decodes as one corrupt line instead of swallowing ours.
            warn!(file = %path.display(), "terminating torn line at end of active file");
            self.metrics.increment_torn_tails();
            buffer.push(b'\n');
        }
        buffer.extend_from_slice(line);

        if let Err(e) = file.write_all(&buffer) {
            roll_back(&file, &path, len_before);
            return Err(SpoolError::io("append to active file", &path, e));
        }

        if self.fsync {
            if let Err(e) = file.sync_data() {
                roll_back(&file, &path, len_before);
                return Err(SpoolError::io("fsync active file", &path, e));
            }
            if created {
                self.layout.sync_dir()?;
            }
        }

        Ok(())
    }

    /// True when a processing file is waiting for delivery.
    pub fn has_pending(&self) -> bool {
        self.layout.processing_path().exists()
    }

    /// Bytes currently in the active file.
    pub fn pending_len(&self) -> SpoolResult<u64> {
        let path = self.layout.active_path();
        match fs::metadata(&path) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(SpoolError::io("stat active file", &path, e)),
        }
    }

    /// Detaches the active file into the processing file.
    ///
    /// Returns false when there was nothing to detach. Refuses to run while
    /// a processing file exists, so an undelivered batch is never
    /// overwritten.
    fn swap(&self) -> SpoolResult<bool> {
        let active = self.layout.active_path();
        let processing = self.layout.processing_path();

        let swapped = self.with_exclusive(|state| {
            if processing.exists() {
                return Ok(false);
            }

            let len = match fs::metadata(&active) {
                Ok(m) => m.len(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
                Err(e) => return Err(SpoolError::io("stat active file", &active, e)),
            };
            if len == 0 {
                return Ok(false);
            }

            fs::rename(&active, &processing)
                .map_err(|e| SpoolError::io("rename active file", &active, e))?;

            maybe_crash(points::SPOOL_MID_SWAP);

            let fresh = File::create(&active)
                .map_err(|e| SpoolError::io("create active file", &active, e))?;
            fresh
                .sync_all()
                .map_err(|e| SpoolError::io("fsync active file", &active, e))?;
            self.layout.sync_dir()?;

            state.swaps += 1;
            Ok(true)
        })?;

        if swapped {
            self.metrics.increment_swaps();
            debug!(file = %processing.display(), "active file detached");
            maybe_crash(points::SPOOL_AFTER_SWAP);
        }
        Ok(swapped)
    }

    /// Returns the next batch to deliver, if any.
    ///
    /// A leftover processing file (from a failed delivery or a crash) is
    /// returned as-is; otherwise the active file is swapped out and its
    /// snapshot returned. The batch stays on disk until
    /// [`PendingBatch::commit`].
    pub fn take_batch(&self) -> SpoolResult<Option<PendingBatch>> {
        let processing = self.layout.processing_path();

        let recovered = processing.exists();
        if !recovered && !self.swap()? {
            return Ok(None);
        }

        let decoded = read_batch(&processing)?;

        Ok(Some(PendingBatch {
            path: processing,
            layout: self.layout.clone(),
            decoded,
            recovered,
        }))
    }

    /// Delivers a processing file left over from a previous run or a
    /// failed cycle. Never swaps.
    pub fn recover(&self, sink: &dyn Sink) -> SpoolResult<DrainOutcome> {
        if !self.has_pending() {
            return Ok(DrainOutcome::Idle);
        }
        let batch = match self.take_batch()? {
            Some(batch) => batch,
            None => return Ok(DrainOutcome::Idle),
        };
        self.deliver(batch, sink)
    }

    /// Runs one drain: recovered batch first, then a fresh swap.
    ///
    /// If the recovered batch cannot be delivered the fresh swap is skipped
    /// and the active file keeps collecting entries.
    pub fn drain(&self, sink: &dyn Sink) -> SpoolResult<DrainOutcome> {
        let mut total: Option<DrainReport> = None;

        // At most one recovered batch and one fresh batch per drain.
        for _ in 0..2 {
            let batch = match self.take_batch()? {
                Some(batch) => batch,
                None => break,
            };
            let recovered = batch.is_recovered();

            match self.deliver(batch, sink)? {
                DrainOutcome::Delivered(report) => {
                    total = Some(total.unwrap_or_default().add(report));
                    if !recovered {
                        break;
                    }
                }
                DrainOutcome::SinkFailed {
                    report,
                    retained,
                    error,
                } => {
                    return Ok(DrainOutcome::SinkFailed {
                        report: total.unwrap_or_default().add(report),
                        retained,
                        error,
                    });
                }
                DrainOutcome::Idle => break,
            }
        }

        Ok(total.map_or(DrainOutcome::Idle, DrainOutcome::Delivered))
    }

    fn deliver(&self, batch: PendingBatch, sink: &dyn Sink) -> SpoolResult<DrainOutcome> {
        let report = DrainReport {
            delivered: batch.entries().len(),
            corrupt_lines: batch.corrupt_lines(),
            recovered_batches: usize::from(batch.is_recovered()),
        };

        if !batch.entries().is_empty() {
            if let Err(error) = sink.accept(batch.entries()) {
                self.metrics.increment_sink_failures();
                warn!(
                    sink = sink.name(),
                    entries = report.delivered,
                    code = error.code(),
                    error = %error,
                    "sink rejected batch; keeping processing file for retry"
                );
                return Ok(DrainOutcome::SinkFailed {
                    report: DrainReport::default(),
                    retained: report.delivered,
                    error,
                });
            }
        }

        maybe_crash(points::SPOOL_BEFORE_COMMIT);
        batch.commit()?;

        // Counted once, when the file is gone; retries re-read the same lines.
        self.metrics.add_corrupt_lines(report.corrupt_lines as u64);
        self.metrics.record_delivery(report.delivered as u64);
        if report.recovered_batches > 0 {
            self.metrics.increment_recoveries();
            info!(entries = report.delivered, "recovered batch delivered");
        }
        debug!(
            sink = sink.name(),
            entries = report.delivered,
            corrupt = report.corrupt_lines,
            "batch delivered"
        );

        Ok(DrainOutcome::Delivered(report))
    }
}

/// Truncates a failed append away. Best effort: the error being reported
/// is the one that caused the rollback.
fn roll_back(file: &File, path: &Path, len: u64) {
    let result = file.set_len(len).and_then(|()| file.sync_data());
    if let Err(e) = result {
        warn!(
            file = %path.display(),
            error = %e,
            "failed to roll back partial append"
        );
    }
}

fn ends_with_newline(file: &mut File, path: &Path) -> SpoolResult<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))
        .and_then(|_| file.read_exact(&mut last))
        .map_err(|e| SpoolError::io("read tail of active file", path, e))?;
    Ok(last[0] == b'\n')
}

/// A detached snapshot awaiting delivery.
///
/// Dropping it without [`commit`](Self::commit) leaves the processing file
/// in place; the next drain returns it again.
#[derive(Debug)]
pub struct PendingBatch {
    path: PathBuf,
    layout: SpoolLayout,
    decoded: DecodedBatch,
    recovered: bool,
}

impl PendingBatch {
    /// Parsed entries in file order
    pub fn entries(&self) -> &[LogEntry] {
        &self.decoded.entries
    }

    /// Lines skipped because they did not parse
    pub fn corrupt_lines(&self) -> usize {
        self.decoded.corrupt_lines
    }

    /// True if this batch was left behind by an earlier drain or process
    pub fn is_recovered(&self) -> bool {
        self.recovered
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the processing file. Call only after the sink succeeded.
    pub fn commit(self) -> SpoolResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(SpoolError::io("remove processing file", &self.path, e)),
        }
        self.layout.sync_dir()
    }
}

/// Counts for one drain
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Entries the sink accepted
    pub delivered: usize,
    /// Lines dropped as corrupt
    pub corrupt_lines: usize,
    /// Leftover processing files delivered
    pub recovered_batches: usize,
}

impl DrainReport {
    fn add(self, other: DrainReport) -> DrainReport {
        DrainReport {
            delivered: self.delivered + other.delivered,
            corrupt_lines: self.corrupt_lines + other.corrupt_lines,
            recovered_batches: self.recovered_batches + other.recovered_batches,
        }
    }
}

/// What a drain did
#[derive(Debug)]
pub enum DrainOutcome {
    /// Nothing pending and the active file was empty
    Idle,
    /// Every detached batch was delivered and removed
    Delivered(DrainReport),
    /// The sink failed; the processing file is kept for the next cycle
    SinkFailed {
        /// Batches delivered earlier in the same drain
        report: DrainReport,
        /// Entries left in the processing file
        retained: usize,
        error: SinkError,
    },
}

impl DrainOutcome {
    /// Entries delivered by this drain
    pub fn delivered(&self) -> usize {
        match self {
            DrainOutcome::Idle => 0,
            DrainOutcome::Delivered(report) => report.delivered,
            DrainOutcome::SinkFailed { report, .. } => report.delivered,
        }
    }

    /// Lines dropped as corrupt by this drain
    pub fn corrupt_lines(&self) -> usize {
        match self {
            DrainOutcome::Idle => 0,
            DrainOutcome::Delivered(report) => report.corrupt_lines,
            DrainOutcome::SinkFailed { report, .. } => report.corrupt_lines,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DrainOutcome::Idle)
    }

    pub fn is_sink_failure(&self) -> bool {
        matches!(self, DrainOutcome::SinkFailed { .. })
    }
}
