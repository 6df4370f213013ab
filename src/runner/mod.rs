//! Background Pipeline Runner
//!
//! Runs pipeline requests on worker threads for interactive callers. Only the
//! newest request matters: submitting a new one cancels the one in flight, and
//! a finished job publishes its image only if nothing newer has been published.

pub mod slot;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use image::RgbImage;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::input::Frame;
use crate::pipeline::Pipeline;
use crate::vision::OcrCapability;

pub use slot::OutputSlot;

type JobResult = Result<Arc<RgbImage>, PipelineError>;

/// Kind of work a job performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Detect candidates and outline them
    Detect,
    /// Detect, recognize and relabel
    Recognize,
}

struct ActiveJob {
    id: u64,
    token: CancellationToken,
}

/// Submits pipeline jobs and keeps the latest output
pub struct PipelineRunner {
    pipeline: Arc<Pipeline>,
    ocr: Arc<dyn OcrCapability>,
    next_id: AtomicU64,
    active: Mutex<Option<ActiveJob>>,
    output: Arc<RwLock<OutputSlot>>,
}

impl PipelineRunner {
    pub fn new(pipeline: Arc<Pipeline>, ocr: Arc<dyn OcrCapability>) -> Self {
        Self {
            pipeline,
            ocr,
            next_id: AtomicU64::new(0),
            active: Mutex::new(None),
            output: Arc::new(RwLock::new(OutputSlot::default())),
        }
    }

    /// Start a detect-and-box job, superseding any job in flight
    pub fn request_detect(&self, frame: Frame) -> JobHandle {
        self.submit(JobKind::Detect, frame)
    }

    /// Start a recognize-and-relabel job, superseding any job in flight
    pub fn request_recognize(&self, frame: Frame) -> JobHandle {
        self.submit(JobKind::Recognize, frame)
    }

    /// Latest published image
    pub fn output(&self) -> Option<Arc<RgbImage>> {
        self.output.read().image()
    }

    /// Id of the job that produced [`Self::output`], 0 if none
    pub fn output_generation(&self) -> u64 {
        self.output.read().generation()
    }

    /// Cancel the job in flight, if any
    pub fn cancel_active(&self) {
        if let Some(job) = self.active.lock().take() {
            debug!("Cancelling job {}", job.id);
            job.token.cancel();
        }
    }

    fn submit(&self, kind: JobKind, frame: Frame) -> JobHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();

        let previous = self.active.lock().replace(ActiveJob {
            id,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            debug!("Job {} superseded by job {}", previous.id, id);
            previous.token.cancel();
        }

        let (tx, rx) = bounded(1);
        let pipeline = self.pipeline.clone();
        let ocr = self.ocr.clone();
        let output = self.output.clone();
        let job_token = token.clone();

        let thread = std::thread::spawn(move || {
            let result = run_job(kind, id, &pipeline, ocr.as_ref(), &frame, &job_token, &output);
            match &result {
                Ok(_) => info!("{:?} job {} finished", kind, id),
                Err(PipelineError::Cancelled) => debug!("{:?} job {} cancelled", kind, id),
                Err(e) => warn!("{:?} job {} failed: {}", kind, id, e),
            }
            let _ = tx.send(result);
        });

        JobHandle {
            id,
            kind,
            token,
            receiver: rx,
            thread: Some(thread),
        }
    }
}

impl Drop for PipelineRunner {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

fn run_job(
    kind: JobKind,
    id: u64,
    pipeline: &Pipeline,
    ocr: &dyn OcrCapability,
    frame: &Frame,
    token: &CancellationToken,
    output: &RwLock<OutputSlot>,
) -> JobResult {
    let image = match kind {
        JobKind::Detect => pipeline.detect_and_box_cancellable(frame, token)?,
        JobKind::Recognize => {
            pipeline
                .recognize_and_overlay_cancellable(frame, ocr, token)?
                .0
        }
    };
    let image = Arc::new(image);

    let mut slot = output.write();
    if token.is_cancelled() || !slot.publish(id, image.clone()) {
        return Err(PipelineError::Cancelled);
    }
    Ok(image)
}

/// Handle to a submitted job
pub struct JobHandle {
    id: u64,
    kind: JobKind,
    token: CancellationToken,
    receiver: Receiver<JobResult>,
    thread: Option<JoinHandle<()>>,
}

impl JobHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Ask the job to stop at its next checkpoint
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Block until the job finishes
    pub fn wait(mut self) -> JobResult {
        let result = self.receiver.recv().unwrap_or(Err(PipelineError::WorkerLost));
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        result
    }

    /// Result of the job if it has finished
    pub fn try_wait(&mut self) -> Option<JobResult> {
        match self.receiver.try_recv() {
            Ok(result) => {
                if let Some(thread) = self.thread.take() {
                    let _ = thread.join();
                }
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(PipelineError::WorkerLost)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::OcrError;
    use crate::vision::detection::tests::synthetic_text_lines;
    use crate::vision::gate::tests::ScriptedOcr;
    use crate::vision::{OcrOutput, OcrRequest};
    use crossbeam_channel::Sender;
    use std::time::Duration;

    /// Blocks every call until the paired sender is dropped
    struct HeldOcr {
        release: Receiver<()>,
    }

    impl HeldOcr {
        fn new() -> (Self, Sender<()>) {
            let (tx, rx) = bounded(0);
            (Self { release: rx }, tx)
        }
    }

    impl OcrCapability for HeldOcr {
        fn recognize(&self, _request: &OcrRequest) -> Result<OcrOutput, OcrError> {
            let _ = self.release.recv_timeout(Duration::from_secs(10));
            Ok(OcrOutput::from_text("held"))
        }
    }

    fn pipeline() -> Arc<Pipeline> {
        Arc::new(Pipeline::new(AppConfig::default()).unwrap())
    }

    fn frame() -> Frame {
        Frame::from_rgb(synthetic_text_lines(200, 130, &[(10, 20), (55, 20), (100, 20)])).unwrap()
    }

    #[test]
    fn test_detect_job_publishes_output() {
        let pipeline = pipeline();
        let runner = PipelineRunner::new(pipeline.clone(), Arc::new(ScriptedOcr::returning("")));

        let handle = runner.request_detect(frame());
        let id = handle.id();
        let image = handle.wait().unwrap();

        assert_eq!(*image, pipeline.detect_and_box(&frame()));
        assert_eq!(runner.output_generation(), id);
        assert!(Arc::ptr_eq(&runner.output().unwrap(), &image));
    }

    #[test]
    fn test_new_request_supersedes_running_job() {
        let (ocr, release) = HeldOcr::new();
        let runner = PipelineRunner::new(pipeline(), Arc::new(ocr));

        let first = runner.request_recognize(frame());
        let second = runner.request_detect(frame());
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        let second_id = second.id();
        second.wait().unwrap();
        drop(release);

        assert!(matches!(first.wait(), Err(PipelineError::Cancelled)));
        assert_eq!(runner.output_generation(), second_id);
    }

    #[test]
    fn test_cancelled_job_publishes_nothing() {
        let (ocr, release) = HeldOcr::new();
        let runner = PipelineRunner::new(pipeline(), Arc::new(ocr));

        let handle = runner.request_recognize(frame());
        handle.cancel();
        drop(release);

        assert!(matches!(handle.wait(), Err(PipelineError::Cancelled)));
        assert!(runner.output().is_none());
    }

    #[test]
    fn test_dropping_runner_cancels_active_job() {
        let (ocr, release) = HeldOcr::new();
        let runner = PipelineRunner::new(pipeline(), Arc::new(ocr));

        let handle = runner.request_recognize(frame());
        drop(runner);
        assert!(handle.is_cancelled());
        drop(release);

        assert!(matches!(handle.wait(), Err(PipelineError::Cancelled)));
    }

    #[test]
    fn test_stale_result_is_not_reported_as_published() {
        let pipeline = pipeline();
        let output = RwLock::new(OutputSlot::default());
        let newer = Arc::new(pipeline.detect_and_box(&frame()));
        output.write().publish(5, newer.clone());

        let result = run_job(
            JobKind::Detect,
            3,
            &pipeline,
            &ScriptedOcr::returning(""),
            &frame(),
            &CancellationToken::new(),
            &output,
        );

        assert!(matches!(result, Err(PipelineError::Cancelled)));
        assert_eq!(output.read().generation(), 5);
        assert!(Arc::ptr_eq(&output.read().image().unwrap(), &newer));
    }

    #[test]
    fn test_try_wait_eventually_returns() {
        let runner = PipelineRunner::new(pipeline(), Arc::new(ScriptedOcr::returning("abc")));
        let mut handle = runner.request_recognize(frame());
        assert_eq!(handle.kind(), JobKind::Recognize);

        let result = loop {
            if let Some(result) = handle.try_wait() {
                break result;
            }
            std::thread::sleep(Duration::from_millis(5));
        };
        assert!(result.is_ok());
        assert!(runner.output().is_some());
    }
}
