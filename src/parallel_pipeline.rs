// THEORY:
// Interactive front-ends fire a new request on every slider tick, far faster than a
// large image can be relit. `PreviewWorker` puts a `LightingPipeline` behind a
// message queue so async callers never block on filter work:
//
// - One dedicated worker thread owns the pipeline and drains an mpsc queue.
// - Each request carries a oneshot sender for its answer.
// - Render requests that pile up back to back are coalesced. Only the newest
//   vectors are rendered and every waiting caller receives that image.
// - Strength changes are applied strictly in queue order relative to renders.

use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::{LightingError, Result};
use crate::pipeline::{LightVectors, LightingPipeline};
use std::collections::VecDeque;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

type Reply = oneshot::Sender<Result<PixelBuffer>>;

enum PreviewTask {
    Strength { strength: f64, reply: Reply },
    Render { vectors: LightVectors, reply: Reply },
    Shutdown,
}

pub struct PreviewWorker {
    task_sender: mpsc::UnboundedSender<PreviewTask>,
    worker: Option<JoinHandle<()>>,
}

impl PreviewWorker {
    /// Moves `pipeline` onto a new worker thread.
    pub fn spawn(pipeline: LightingPipeline) -> Result<Self> {
        let (task_sender, task_receiver) = mpsc::unbounded_channel::<PreviewTask>();

        let worker = std::thread::Builder::new()
            .name("lighting-preview".to_string())
            .spawn(move || Self::run(pipeline, task_receiver))
            .map_err(|err| LightingError::ThreadPool(err.to_string()))?;

        Ok(Self {
            task_sender,
            worker: Some(worker),
        })
    }

    fn run(mut pipeline: LightingPipeline, mut task_receiver: mpsc::UnboundedReceiver<PreviewTask>) {
        let mut backlog = VecDeque::new();

        loop {
            let task = match backlog.pop_front() {
                Some(task) => task,
                None => match task_receiver.blocking_recv() {
                    Some(task) => task,
                    None => break,
                },
            };

            while let Ok(queued) = task_receiver.try_recv() {
                backlog.push_back(queued);
            }

            match task {
                PreviewTask::Strength { strength, reply } => {
                    let _ = reply.send(pipeline.set_strength(strength).cloned());
                }
                PreviewTask::Render { mut vectors, reply } => {
                    let mut replies = vec![reply];
                    while let Some(PreviewTask::Render { .. }) = backlog.front() {
                        if let Some(PreviewTask::Render { vectors: newer, reply }) = backlog.pop_front() {
                            vectors = newer;
                            replies.push(reply);
                        }
                    }
                    if replies.len() > 1 {
                        log::debug!("coalesced {} render requests", replies.len());
                    }

                    let result = pipeline.render(&vectors);
                    for reply in replies {
                        let _ = reply.send(result.clone());
                    }
                }
                PreviewTask::Shutdown => break,
            }
        }

        log::debug!("preview worker stopped");
    }

    async fn request(&self, task: impl FnOnce(Reply) -> PreviewTask) -> Result<PixelBuffer> {
        let (reply, result_receiver) = oneshot::channel();

        self.task_sender
            .send(task(reply))
            .map_err(|_| LightingError::WorkerUnavailable)?;

        result_receiver.await.map_err(|_| LightingError::WorkerUnavailable)?
    }

    /// Recomputes the normal map at `strength` and returns it.
    pub async fn set_strength(&self, strength: f64) -> Result<PixelBuffer> {
        self.request(|reply| PreviewTask::Strength { strength, reply }).await
    }

    /// Relights the source with `vectors`, or with newer vectors queued behind them.
    pub async fn render(&self, vectors: LightVectors) -> Result<PixelBuffer> {
        self.request(|reply| PreviewTask::Render { vectors, reply }).await
    }

    /// Asks the worker to stop after the task it is running. Queued requests and
    /// later calls fail with `WorkerUnavailable`.
    pub fn shutdown(&self) {
        let _ = self.task_sender.send(PreviewTask::Shutdown);
    }

    /// Stops the worker and waits for its thread to exit.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("preview worker panicked");
            }
        }
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        // Best effort; the thread exits on its own once the queue is gone.
        self.shutdown();
    }
}
