use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::foundation::core::DrawingSpace;
use crate::foundation::error::{ReelError, ReelResult};
use crate::surface::event::{DrawingSurface, RenderEvent};

/// Test double that records every dispatched event and serves a flat snapshot.
///
/// Snapshot failures and slow snapshots can be injected to exercise tick-skipping and stopping
/// in the capturer, and dispatch failures to exercise stall propagation.
pub struct RecordingSurface {
    space: DrawingSpace,
    events: Mutex<Vec<RenderEvent>>,
    snapshots: AtomicU64,
    fail_snapshots_every: Option<u64>,
    fail_first_snapshots: u64,
    snapshot_delay: Duration,
    fail_dispatch_after: Option<usize>,
}

impl RecordingSurface {
    pub fn new(space: DrawingSpace) -> Self {
        Self {
            space,
            events: Mutex::new(Vec::new()),
            snapshots: AtomicU64::new(0),
            fail_snapshots_every: None,
            fail_first_snapshots: 0,
            snapshot_delay: Duration::ZERO,
            fail_dispatch_after: None,
        }
    }

    /// Make every `n`-th snapshot (1-based) fail.
    pub fn failing_snapshots_every(mut self, n: u64) -> Self {
        self.fail_snapshots_every = Some(n.max(1));
        self
    }

    /// Make the first `n` snapshots fail.
    pub fn failing_first_snapshots(mut self, n: u64) -> Self {
        self.fail_first_snapshots = n;
        self
    }

    /// Sleep for `delay` inside every snapshot.
    pub fn with_snapshot_delay(mut self, delay: Duration) -> Self {
        self.snapshot_delay = delay;
        self
    }

    /// Accept `n` events, then fail every later dispatch.
    pub fn failing_dispatch_after(mut self, n: usize) -> Self {
        self.fail_dispatch_after = Some(n);
        self
    }

    /// Copy of all events received so far.
    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().clone()
    }

    /// Number of snapshot attempts, including failed ones.
    pub fn snapshot_attempts(&self) -> u64 {
        self.snapshots.load(Ordering::SeqCst)
    }
}

impl DrawingSurface for RecordingSurface {
    fn space(&self) -> DrawingSpace {
        self.space
    }

    fn dispatch(&self, event: RenderEvent) -> ReelResult<()> {
        let mut events = self.events.lock();
        if let Some(limit) = self.fail_dispatch_after
            && events.len() >= limit
        {
            return Err(ReelError::validation("recording surface refused event"));
        }
        events.push(event);
        Ok(())
    }

    fn snapshot(&self) -> ReelResult<image::RgbaImage> {
        let n = self.snapshots.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.snapshot_delay.is_zero() {
            std::thread::sleep(self.snapshot_delay);
        }
        let unlucky = self
            .fail_snapshots_every
            .is_some_and(|every| n.is_multiple_of(every));
        if unlucky || n <= self.fail_first_snapshots {
            return Err(ReelError::validation(format!(
                "snapshot {n} unavailable"
            )));
        }
        // Light gray that darkens slightly as events arrive.
        let shade = 255 - (self.events.lock().len() % 128) as u8;
        Ok(image::RgbaImage::from_pixel(
            self.space.width,
            self.space.height,
            image::Rgba([shade, shade, shade, 255]),
        ))
    }
}
