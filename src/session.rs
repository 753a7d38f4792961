use anyhow::Result;
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::JoinHandle;
use tracing::{debug, warn};

use crate::error::AnalysisResult;
use crate::models::{BoundingBox, Frame};
use crate::overlay::OverlaySink;
use crate::pipeline::{FrameBuffers, Pipeline};
use crate::source::FrameSource;

/// Counters over the lifetime of a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Frames that completed analysis
    pub processed: u64,
    /// Frames aborted by an analysis error
    pub failed: u64,
    /// Frames never analyzed because the worker was busy
    pub dropped: u64,
    /// Boxes handed to the sink in total
    pub boxes: u64,
}

/// Feeds frames through a pipeline into an overlay sink.
///
/// A failed frame clears the sink so no stale boxes stay on screen; the
/// next frame is analyzed from scratch.
pub struct FrameSession<S: OverlaySink> {
    pipeline: Pipeline,
    sink: S,
    buffers: FrameBuffers,
    stats: SessionStats,
}

impl<S: OverlaySink> FrameSession<S> {
    pub fn new(pipeline: Pipeline, sink: S) -> Self {
        Self {
            pipeline,
            sink,
            buffers: FrameBuffers::default(),
            stats: SessionStats::default(),
        }
    }

    pub fn process(&mut self, frame: &Frame) -> AnalysisResult<Vec<BoundingBox>> {
        match self.pipeline.run_with(frame, &mut self.buffers) {
            Ok(boxes) => {
                self.stats.processed += 1;
                self.stats.boxes += boxes.len() as u64;
                if let Err(e) = self.sink.draw(&boxes, &self.pipeline.config().paint) {
                    warn!("Overlay failed for frame {}: {:#}", frame.sequence, e);
                }
                Ok(boxes)
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!("Frame {} skipped: {}", frame.sequence, e);
                self.sink.clear();
                Err(e)
            }
        }
    }

    /// Drain a frame source. Analysis errors are counted, source errors abort.
    pub fn run(&mut self, source: &mut dyn FrameSource) -> Result<SessionStats> {
        while let Some(frame) = source.next_frame()? {
            let _ = self.process(&frame);
        }
        Ok(self.stats)
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Runs a session on its own thread so analysis stays off the caller's.
///
/// Frames arriving while the queue is full are dropped, never queued up.
pub struct FrameWorker<S: OverlaySink> {
    sender: SyncSender<Frame>,
    handle: JoinHandle<(SessionStats, S)>,
    dropped: u64,
}

impl<S: OverlaySink + Send + 'static> FrameWorker<S> {
    pub fn spawn(pipeline: Pipeline, sink: S, capacity: usize) -> Result<Self> {
        let (sender, receiver) = mpsc::sync_channel(capacity.max(1));
        let handle = std::thread::Builder::new()
            .name("frame-analysis".to_string())
            .spawn(move || work(FrameSession::new(pipeline, sink), receiver))?;
        Ok(Self {
            sender,
            handle,
            dropped: 0,
        })
    }

    /// Hand a frame over without blocking; `false` if it was dropped
    pub fn submit(&mut self, frame: Frame) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(frame)) => {
                self.dropped += 1;
                debug!("Worker busy, dropping frame {}", frame.sequence);
                false
            }
            Err(TrySendError::Disconnected(frame)) => {
                warn!("Worker gone, dropping frame {}", frame.sequence);
                self.dropped += 1;
                false
            }
        }
    }

    /// Wait for queued frames to finish and hand back the sink
    pub fn finish(self) -> Result<(SessionStats, S)> {
        drop(self.sender);
        let (mut stats, sink) = self
            .handle
            .join()
            .map_err(|_| anyhow::anyhow!("Frame worker panicked"))?;
        stats.dropped = self.dropped;
        Ok((stats, sink))
    }
}

fn work<S: OverlaySink>(
    mut session: FrameSession<S>,
    receiver: Receiver<Frame>,
) -> (SessionStats, S) {
    for frame in receiver {
        let _ = session.process(&frame);
    }
    (session.stats(), session.into_sink())
}
