//! Latest-sample slot
//!
//! Single-producer (bridge) to single-consumer (classifier or calibrator)
//! hand-off of the newest FIFO batch. Newest wins: an unconsumed batch is
//! overwritten, and a batch is consumed at most once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::debug;
use motionguard_core::{MotionResult, SampleBatch};
use tokio::sync::Mutex;

use crate::lock::{lock_within, resource};

#[derive(Debug, Default)]
pub(crate) struct SampleSlot {
    latest: Mutex<Option<SampleBatch>>,
    ready: AtomicBool,
}

impl SampleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch is waiting; checked without taking the lock
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub async fn publish(&self, batch: SampleBatch, timeout: Duration) -> MotionResult<()> {
        let mut latest = lock_within(&self.latest, timeout, resource::SLOT).await?;
        if latest.replace(batch).is_some() {
            debug!("Unconsumed sample batch overwritten");
        }
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Consume the newest batch, if one arrived since the last take
    pub async fn take(&self, timeout: Duration) -> MotionResult<Option<SampleBatch>> {
        if !self.is_ready() {
            return Ok(None);
        }
        let mut latest = lock_within(&self.latest, timeout, resource::SLOT).await?;
        self.ready.store(false, Ordering::Release);
        Ok(latest.take())
    }

    /// Drop any pending batch
    pub async fn clear(&self, timeout: Duration) -> MotionResult<()> {
        let mut latest = lock_within(&self.latest, timeout, resource::SLOT).await?;
        self.ready.store(false, Ordering::Release);
        *latest = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motionguard_core::OrientationSample;

    const WAIT: Duration = Duration::from_millis(30);

    fn batch(roll: f32, ts: u64) -> SampleBatch {
        SampleBatch::from_slice(&[OrientationSample::at_rest(roll, 0.0, 0.0)], ts)
    }

    #[tokio::test]
    async fn newest_batch_wins() {
        let slot = SampleSlot::new();
        slot.publish(batch(1.0, 10), WAIT).await.unwrap();
        slot.publish(batch(2.0, 20), WAIT).await.unwrap();

        let taken = slot.take(WAIT).await.unwrap().unwrap();
        assert_eq!(taken.timestamp, 20);
    }

    #[tokio::test]
    async fn batch_consumed_once() {
        let slot = SampleSlot::new();
        slot.publish(batch(1.0, 10), WAIT).await.unwrap();

        assert!(slot.take(WAIT).await.unwrap().is_some());
        assert!(!slot.is_ready());
        assert!(slot.take(WAIT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_discards_pending() {
        let slot = SampleSlot::new();
        slot.publish(batch(1.0, 10), WAIT).await.unwrap();
        slot.clear(WAIT).await.unwrap();

        assert!(!slot.is_ready());
        assert!(slot.take(WAIT).await.unwrap().is_none());
    }
}
