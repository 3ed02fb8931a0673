use crate::error::RadarError;
use crate::Result;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A device session that can feed a [`FrameStream`].
pub trait FrameSource: Send + 'static {
    type Frame: Send + 'static;

    fn start_acquisition(&mut self) -> Result<()>;

    fn next_frame(&mut self, timeout: Option<Duration>) -> Result<Self::Frame>;

    fn close(&mut self);
}

/// Tuning for the reader thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Frames buffered before new ones are dropped.
    pub capacity: usize,
    /// Native wait per read; bounds how quickly a stop request is noticed.
    pub poll_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            poll_timeout: Duration::from_millis(100),
        }
    }
}

/// Handle to a running frame stream.
///
/// A background thread owns the device, reads frames and queues them. The
/// device is closed when the thread exits.
pub struct FrameStream<F> {
    receiver: Receiver<F>,
    stop_flag: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl<F: Send + 'static> FrameStream<F> {
    /// Start acquisition on `source` and spawn the reader thread.
    pub fn start<S>(mut source: S, config: StreamConfig) -> Result<FrameStream<F>>
    where
        S: FrameSource<Frame = F>,
    {
        source.start_acquisition()?;

        let (sender, receiver) = crossbeam_channel::bounded(config.capacity.max(1));
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();

        let thread = std::thread::Builder::new()
            .name("radar-frames".into())
            .spawn(move || {
                frame_reader_loop(source, sender, stop_clone, config.poll_timeout);
            })
            .map_err(RadarError::Spawn)?;

        Ok(FrameStream {
            receiver,
            stop_flag,
            thread: Some(thread),
        })
    }

    /// Receive the next frame (blocks until available).
    pub fn recv(&self) -> Result<F> {
        self.receiver.recv().map_err(|_| RadarError::StreamStopped)
    }

    /// Try to receive a frame without blocking.
    pub fn try_recv(&self) -> Option<F> {
        self.receiver.try_recv().ok()
    }

    /// Receive a frame with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<F> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => RadarError::NoFrame(timeout),
            crossbeam_channel::RecvTimeoutError::Disconnected => RadarError::StreamStopped,
        })
    }

    /// Check if the stream is still active.
    pub fn is_active(&self) -> bool {
        !self.stop_flag.load(Ordering::Relaxed)
            && self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the stream and wait for the reader thread to close the device.
    pub fn stop(mut self) {
        self.shutdown();
    }
}

impl<F> FrameStream<F> {
    fn shutdown(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl<F> Drop for FrameStream<F> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs on the reader thread until stopped, disconnected or a fatal error.
fn frame_reader_loop<S: FrameSource>(
    mut source: S,
    sender: Sender<S::Frame>,
    stop_flag: Arc<AtomicBool>,
    poll_timeout: Duration,
) {
    log::info!("Frame reader started");

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            log::info!("Frame reader stopping (stop flag set)");
            break;
        }

        let frame = match source.next_frame(Some(poll_timeout)) {
            Ok(frame) => frame,
            Err(RadarError::Timeout { .. }) => continue,
            Err(e @ RadarError::FifoOverflow { .. }) => {
                log::warn!("Frame read error: {}", e);
                continue;
            }
            Err(e) => {
                log::error!("Frame reader giving up: {}", e);
                break;
            }
        };

        if let Err(e) = sender.try_send(frame) {
            match e {
                crossbeam_channel::TrySendError::Full(_) => {
                    log::trace!("Frame channel full, dropping frame");
                }
                crossbeam_channel::TrySendError::Disconnected(_) => {
                    log::info!("Frame channel disconnected, stopping reader");
                    break;
                }
            }
        }
    }

    stop_flag.store(true, Ordering::Relaxed);
    source.close();
}
