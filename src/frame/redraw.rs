//! Redraw requests raised by render nodes and consumed by the frame loop

use tokio::sync::mpsc;

/// Why a node asked for another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawReason {
    /// Bricks finished loading for a view that changed since they were requested
    DataUpdated,
    /// Compositing was skipped because a fragment never became ready
    CompositeSkipped,
}

/// A request for one more frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedrawRequest {
    /// Frame that was current when the request was raised
    pub frame_id: u64,
    pub reason: RedrawReason,
}

/// Sending half, cloned into every render node
#[derive(Debug, Clone)]
pub struct RedrawNotifier {
    tx: mpsc::UnboundedSender<RedrawRequest>,
}

impl RedrawNotifier {
    /// Queue a request without blocking.
    ///
    /// Returns false once the scheduler has been dropped.
    pub fn request(&self, frame_id: u64, reason: RedrawReason) -> bool {
        match self.tx.send(RedrawRequest { frame_id, reason }) {
            Ok(()) => true,
            Err(_) => {
                log::debug!("redraw request for frame {} dropped, scheduler gone", frame_id);
                false
            }
        }
    }
}

/// Receiving half, owned by the application frame loop
#[derive(Debug)]
pub struct RedrawScheduler {
    rx: mpsc::UnboundedReceiver<RedrawRequest>,
    redraw: bool,
    animation: i32,
}

/// Create a connected notifier and scheduler
pub fn redraw_channel(animation: i32) -> (RedrawNotifier, RedrawScheduler) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        RedrawNotifier { tx },
        RedrawScheduler {
            rx,
            redraw: false,
            animation,
        },
    )
}

impl RedrawScheduler {
    /// Drain queued requests, returning how many arrived
    pub fn poll(&mut self) -> usize {
        let mut received = 0;
        while let Ok(request) = self.rx.try_recv() {
            log::trace!("redraw requested: {:?}", request);
            received += 1;
        }
        if received > 0 {
            self.redraw = true;
        }
        received
    }

    /// Block until the next request arrives
    pub async fn wait(&mut self) -> Option<RedrawRequest> {
        let request = self.rx.recv().await;
        if request.is_some() {
            self.redraw = true;
        }
        request
    }

    /// Force a redraw regardless of queued requests
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw || self.animation != 0
    }

    /// Clear the pending flag after a frame has been started
    pub fn frame_started(&mut self) {
        self.redraw = false;
    }

    pub fn set_animation(&mut self, animation: i32) {
        self.animation = animation;
    }

    pub fn animation(&self) -> i32 {
        self.animation
    }
}
