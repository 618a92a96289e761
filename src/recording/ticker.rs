// Elapsed-time ticker for an in-progress recording.
//
// A tokio task adds 1 to a shared counter every tick period. The task is
// aborted when the ticker is cancelled or dropped, so a stopped recording can
// never keep counting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Shared elapsed-seconds counter
#[derive(Debug, Clone, Default)]
pub struct ElapsedCounter(Arc<AtomicU64>);

impl ElapsedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn tick(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

/// Running ticker task
#[derive(Debug)]
pub struct ElapsedTicker {
    handle: JoinHandle<()>,
}

impl ElapsedTicker {
    /// Spawn a ticker on the current tokio runtime.
    ///
    /// The first tick lands one full period after the call.
    pub fn spawn(counter: ElapsedCounter, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticks.tick().await;
                let elapsed = counter.tick();
                crate::trace!("Recording elapsed: {}s", elapsed);
            }
        });
        Self { handle }
    }

    /// Stop counting. The counter keeps its last value.
    pub fn cancel(self) {
        // Drop aborts the task
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let counter = ElapsedCounter::new();
        let ticker = ElapsedTicker::spawn(counter.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(counter.get(), 3);

        ticker.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.get(), 3, "cancelled ticker must not keep counting");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_ticker() {
        let counter = ElapsedCounter::new();
        {
            let _ticker = ElapsedTicker::spawn(counter.clone(), Duration::from_secs(1));
            tokio::time::sleep(Duration::from_millis(1500)).await;
        }
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_counter_reset() {
        let counter = ElapsedCounter::new();
        counter.tick();
        counter.tick();
        assert_eq!(counter.get(), 2);
        counter.reset();
        assert_eq!(counter.get(), 0);
    }
}
