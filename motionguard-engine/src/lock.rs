//! Bounded lock acquisition
//!
//! No task ever waits on a shared resource indefinitely. A timed-out
//! acquisition becomes [`MotionError::BusTimeout`] and the caller skips
//! the operation for this cycle.

use std::time::Duration;

use log::warn;
use motionguard_core::MotionError;
use tokio::sync::{Mutex, MutexGuard};

pub(crate) mod resource {
    pub const BUS: &str = "sensor bus";
    pub const SLOT: &str = "sample slot";
    pub const STATE: &str = "motion state";
    pub const CLASSIFIER: &str = "classifier";
}

pub(crate) async fn lock_within<'a, T>(
    mutex: &'a Mutex<T>,
    timeout: Duration,
    resource: &'static str,
) -> Result<MutexGuard<'a, T>, MotionError> {
    tokio::time::timeout(timeout, mutex.lock())
        .await
        .map_err(|_| {
            warn!("Lock on {} not acquired within {:?}", resource, timeout);
            MotionError::BusTimeout { resource }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn times_out_while_held() {
        let mutex = Mutex::new(0u8);
        let _held = mutex.lock().await;

        let result = lock_within(&mutex, Duration::from_millis(10), resource::BUS).await;
        assert_eq!(
            result.err(),
            Some(MotionError::BusTimeout { resource: resource::BUS })
        );
    }

    #[tokio::test]
    async fn acquires_when_free() {
        let mutex = Mutex::new(7u8);
        let guard = lock_within(&mutex, Duration::from_millis(10), resource::BUS)
            .await
            .unwrap();
        assert_eq!(*guard, 7);
    }
}
