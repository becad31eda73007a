use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::JoinHandle;

use crate::encode::encoder::{EncoderConfig, MediaBlob, VideoEncoder};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::RasterFrame;

type WorkerResult = (Box<dyn VideoEncoder>, ReelResult<()>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Running,
    Finished,
    Aborted,
}

/// Feeds a [`VideoEncoder`] from a bounded queue on a dedicated encoder thread.
///
/// [`StreamingEncoder::add_frame`] blocks while `capacity` frames are already waiting, which
/// bounds the number of rendered-but-not-encoded frames. Encoder errors surface as
/// [`ReelError::Encoding`] on the next `add_frame` or `finish`.
///
/// After `finish` or `abort` no further frames are accepted, and `finish` is never called on
/// the wrapped encoder after `abort`. Dropping a running adapter aborts it.
pub struct StreamingEncoder {
    phase: Phase,
    tx: Option<SyncSender<RasterFrame>>,
    worker: Option<JoinHandle<Option<WorkerResult>>>,
    encoder: Option<Box<dyn VideoEncoder>>,
    aborting: Arc<AtomicBool>,
    encoded: Arc<AtomicU64>,
}

impl StreamingEncoder {
    /// Start `encoder` with `cfg` and spawn the encoder thread.
    pub fn start(
        encoder: Box<dyn VideoEncoder>,
        cfg: &EncoderConfig,
        capacity: usize,
    ) -> ReelResult<Self> {
        let builder = std::thread::Builder::new().name("fractalreel-encoder".to_string());
        Self::start_on(builder, encoder, cfg, capacity)
    }

    pub(crate) fn start_on(
        builder: std::thread::Builder,
        mut encoder: Box<dyn VideoEncoder>,
        cfg: &EncoderConfig,
        capacity: usize,
    ) -> ReelResult<Self> {
        if let Err(e) = encoder.start(cfg) {
            encoder.abort();
            return Err(as_encoding(e));
        }

        let (tx, rx) = mpsc::sync_channel::<RasterFrame>(capacity.max(1));
        let aborting = Arc::new(AtomicBool::new(false));
        let encoded = Arc::new(AtomicU64::new(0));

        // The encoder moves to the worker only once the thread exists, so a failed spawn can
        // still abort it.
        let (handoff_tx, handoff_rx) = mpsc::channel::<Box<dyn VideoEncoder>>();
        let spawned = {
            let aborting = aborting.clone();
            let encoded = encoded.clone();
            builder.spawn(move || {
                let mut encoder = handoff_rx.recv().ok()?;
                let res = drain(encoder.as_mut(), &rx, &aborting, &encoded);
                Some((encoder, res))
            })
        };
        let worker = match spawned {
            Ok(worker) => worker,
            Err(e) => {
                encoder.abort();
                return Err(ReelError::encoding(format!(
                    "failed to spawn encoder thread: {e}"
                )));
            }
        };
        if let Err(mpsc::SendError(mut encoder)) = handoff_tx.send(encoder) {
            encoder.abort();
            let _ = worker.join();
            return Err(ReelError::encoding("encoder thread exited before start"));
        }

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps,
            capacity,
            "encoder started"
        );
        Ok(Self {
            phase: Phase::Running,
            tx: Some(tx),
            worker: Some(worker),
            encoder: None,
            aborting,
            encoded,
        })
    }

    /// Queue one frame, blocking while the queue is full.
    pub fn add_frame(&mut self, frame: RasterFrame) -> ReelResult<()> {
        self.ensure_running("add_frame")?;
        let Some(tx) = self.tx.as_ref() else {
            return Err(ReelError::encoding("encoder queue is closed"));
        };
        if tx.send(frame).is_err() {
            // The encoder thread only hangs up after an error; report that error.
            self.tx = None;
            self.reclaim()?;
            return Err(ReelError::encoding("encoder stopped accepting frames"));
        }
        Ok(())
    }

    /// Wait for queued frames to be encoded, then finish the encoder.
    pub fn finish(&mut self) -> ReelResult<MediaBlob> {
        self.ensure_running("finish")?;
        self.tx = None;
        self.reclaim()?;

        self.phase = Phase::Finished;
        let mut encoder = self
            .encoder
            .take()
            .ok_or_else(|| ReelError::encoding("encoder was lost"))?;
        let blob = encoder.finish().map_err(as_encoding)?;
        tracing::debug!(frames = self.encoded_frames(), "encoder finished");
        Ok(blob)
    }

    /// Discard queued frames and abort the encoder. Idempotent; a no-op after `finish`.
    pub fn abort(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Aborted;
        self.aborting.store(true, Ordering::Release);
        self.tx = None;
        if let Err(e) = self.reclaim() {
            tracing::debug!(error = %e, "encoder thread had already failed");
        }
        if let Some(mut encoder) = self.encoder.take() {
            encoder.abort();
            tracing::warn!(frames = self.encoded_frames(), "encoder aborted");
        }
    }

    /// Frames the encoder has accepted so far.
    pub fn encoded_frames(&self) -> u64 {
        self.encoded.load(Ordering::Relaxed)
    }

    fn ensure_running(&self, op: &str) -> ReelResult<()> {
        match self.phase {
            Phase::Running => Ok(()),
            Phase::Finished => Err(ReelError::encoding(format!("{op} called after finish"))),
            Phase::Aborted => Err(ReelError::encoding(format!("{op} called after abort"))),
        }
    }

    /// Join the encoder thread and take back the encoder.
    fn reclaim(&mut self) -> ReelResult<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        match worker.join() {
            Ok(Some((encoder, res))) => {
                self.encoder = Some(encoder);
                res.map_err(as_encoding)
            }
            Ok(None) => Err(ReelError::encoding("encoder was never handed to its thread")),
            Err(_) => Err(ReelError::encoding("encoder thread panicked")),
        }
    }
}

impl Drop for StreamingEncoder {
    fn drop(&mut self) {
        self.abort();
    }
}

fn drain(
    encoder: &mut dyn VideoEncoder,
    rx: &Receiver<RasterFrame>,
    aborting: &AtomicBool,
    encoded: &AtomicU64,
) -> ReelResult<()> {
    while let Ok(frame) = rx.recv() {
        if aborting.load(Ordering::Acquire) {
            break;
        }
        encoder.add_frame(&frame)?;
        encoded.fetch_add(1, Ordering::Relaxed);
    }
    Ok(())
}

fn as_encoding(e: ReelError) -> ReelError {
    match e {
        ReelError::Encoding(_) => e,
        other => ReelError::encoding(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/stream.rs"]
mod tests;
