//! Off-thread transform with last-request-wins semantics.
//!
//! The caller samples the image on its own thread and moves the resulting
//! [`SampleBuffer`] into a [`TransformRequest`]. A background thread runs
//! [`transform`] and sends back a [`TransformResponse`] tagged with the
//! request id. Only the response to the most recently issued id is applied;
//! anything older is dropped on arrival.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::ascii::CharacterGrid;
use crate::error::{Error, Result};
use crate::pipeline::{transform, TransformParams};
use crate::raster::SampleBuffer;

/// Render state exposed to the surrounding UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderStatus {
    /// A request is in flight (or nothing has rendered yet)
    #[default]
    Loading,
    /// The latest request rendered successfully
    Ready,
    /// The latest request failed; the previous grid, if any, is kept
    Error(String),
}

/// One unit of work for the worker thread.
#[derive(Debug)]
pub struct TransformRequest {
    pub id: u64,
    pub samples: SampleBuffer,
    pub params: TransformParams,
    pub seed: u32,
}

/// Worker reply, matched to its request by `id`.
#[derive(Debug)]
pub struct TransformResponse {
    pub id: u64,
    pub result: std::result::Result<CharacterGrid, String>,
}

enum WorkerMessage {
    Transform(TransformRequest),
    Stop,
}

/// Function the worker runs for each request.
pub type TransformFn =
    dyn Fn(TransformRequest) -> std::result::Result<CharacterGrid, String> + Send + 'static;

/// Caller-side handle to the worker thread.
pub struct WorkerHandle {
    tx: Sender<WorkerMessage>,
    rx: Receiver<TransformResponse>,
    thread: Option<JoinHandle<()>>,
    latest: u64,
    current: Option<CharacterGrid>,
    status: RenderStatus,
    shut_down: bool,
}

impl WorkerHandle {
    /// Spawn a worker running the standard [`transform`].
    pub fn spawn() -> Result<Self> {
        Self::spawn_with(Box::new(|req: TransformRequest| {
            Ok(transform(req.samples, &req.params, req.seed))
        }))
    }

    /// Spawn a worker running `work` for every request.
    pub fn spawn_with(work: Box<TransformFn>) -> Result<Self> {
        let (tx, worker_rx) = mpsc::channel::<WorkerMessage>();
        let (worker_tx, rx) = mpsc::channel::<TransformResponse>();

        let thread = thread::Builder::new()
            .name("glyphgrid-worker".to_string())
            .spawn(move || run_worker(work, worker_rx, worker_tx))?;

        Ok(Self {
            tx,
            rx,
            thread: Some(thread),
            latest: 0,
            current: None,
            status: RenderStatus::Loading,
            shut_down: false,
        })
    }

    /// Queue a transform. The samples are moved to the worker.
    ///
    /// Returns the request id; it becomes the only id whose response will be
    /// applied.
    pub fn submit(
        &mut self,
        samples: SampleBuffer,
        params: TransformParams,
        seed: u32,
    ) -> Result<u64> {
        if self.shut_down {
            return Err(Error::Worker("worker has been shut down".to_string()));
        }
        self.latest += 1;
        let id = self.latest;
        self.tx
            .send(WorkerMessage::Transform(TransformRequest {
                id,
                samples,
                params,
                seed,
            }))
            .map_err(|_| Error::Worker("worker thread exited".to_string()))?;
        self.status = RenderStatus::Loading;
        Ok(id)
    }

    /// Drain pending responses without blocking.
    ///
    /// Returns the new grid when the latest request's response was applied.
    pub fn poll(&mut self) -> Option<&CharacterGrid> {
        let mut applied = false;
        while let Ok(resp) = self.rx.try_recv() {
            applied |= self.apply(resp);
        }
        if applied {
            self.current.as_ref()
        } else {
            None
        }
    }

    /// Block until the latest request is answered or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<&CharacterGrid> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(resp) => {
                    let id = resp.id;
                    let applied = self.apply(resp);
                    if id == self.latest {
                        return if applied { self.current.as_ref() } else { None };
                    }
                }
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => {
                    self.status = RenderStatus::Error("worker thread exited".to_string());
                    return None;
                }
            }
        }
    }

    /// Most recent successfully applied grid.
    pub fn current(&self) -> Option<&CharacterGrid> {
        self.current.as_ref()
    }

    pub fn status(&self) -> &RenderStatus {
        &self.status
    }

    /// Id of the most recently issued request.
    pub fn latest_id(&self) -> u64 {
        self.latest
    }

    /// Stop the worker. Responses still in flight are never applied.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        let _ = self.tx.send(WorkerMessage::Stop);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("Worker thread panicked during shutdown");
            }
        }
    }

    fn apply(&mut self, resp: TransformResponse) -> bool {
        if self.shut_down {
            return false;
        }
        if resp.id != self.latest {
            log::trace!(
                "Dropping stale response #{} (latest #{})",
                resp.id,
                self.latest
            );
            return false;
        }
        match resp.result {
            Ok(grid) => {
                self.current = Some(grid);
                self.status = RenderStatus::Ready;
                true
            }
            Err(e) => {
                log::warn!("Transform #{} failed: {}", resp.id, e);
                self.status = RenderStatus::Error(e);
                false
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    work: Box<TransformFn>,
    rx: Receiver<WorkerMessage>,
    tx: Sender<TransformResponse>,
) {
    for msg in rx {
        let req = match msg {
            WorkerMessage::Transform(req) => req,
            WorkerMessage::Stop => break,
        };
        let id = req.id;
        let result = panic::catch_unwind(AssertUnwindSafe(|| work(req)))
            .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));
        if tx.send(TransformResponse { id, result }).is_err() {
            break;
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "transform panicked".to_string()
    }
}
