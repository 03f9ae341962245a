//! Fixed-interval scheduler for the monitor cycle

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Runs a task immediately and then once per interval.
///
/// The task runs inline in the ticker loop, so a tick that arrives while a
/// run is still in progress is dropped rather than queued, and two runs never
/// overlap. Dropping the scheduler stops the loop after the current run.
pub struct Scheduler {
    period: Duration,
    running: Arc<AtomicBool>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() {
            Duration::from_secs(1)
        } else {
            period
        };
        Self {
            period,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start the background loop
    pub fn start<F, Fut>(&mut self, mut task: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);
        self.running.store(true, Ordering::SeqCst);

        let period = self.period;
        let running = Arc::clone(&self.running);

        tokio::spawn(async move {
            tracing::info!("Scheduler started with interval {:?}", period);

            // first tick completes immediately
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut last_finished: Option<Instant> = None;

            loop {
                tokio::select! {
                    scheduled = ticker.tick() => {
                        // the tick came due while the previous run was in progress
                        if last_finished.is_some_and(|finished| scheduled < finished) {
                            tracing::warn!("Previous run overran the interval, skipping tick");
                            continue;
                        }
                        task().await;
                        last_finished = Some(Instant::now());
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            running.store(false, Ordering::SeqCst);
            tracing::info!("Scheduler stopped");
        })
    }

    /// Stop the loop. A run already in progress finishes first.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }

    /// Wait for the loop to finish, stopping it once `signal` resolves.
    ///
    /// A signal that fails to install is logged and the loop keeps running.
    pub async fn run_until<S>(
        &mut self,
        mut handle: JoinHandle<()>,
        signal: S,
    ) -> Result<(), JoinError>
    where
        S: Future<Output = std::io::Result<()>>,
    {
        tokio::select! {
            result = &mut handle => return result,
            signal = signal => match signal {
                Ok(()) => {
                    tracing::info!("Shutdown requested");
                    self.stop().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for shutdown signal");
                }
            },
        }
        handle.await
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep_until;

    fn counting_task(count: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send {
        let count = Arc::clone(count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();
        let mut scheduler = Scheduler::new(Duration::from_secs(60));
        let handle = scheduler.start(counting_task(&count));

        sleep_until(start + Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(scheduler.is_running());

        sleep_until(start + Duration::from_secs(59)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep_until(start + Duration::from_secs(60) + Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        sleep_until(start + Duration::from_secs(120) + Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        scheduler.stop().await;
        handle.await.unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_runs_never_overlap() {
        let count = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let mut scheduler = Scheduler::new(Duration::from_secs(60));
        let handle = {
            let (count, active, max_active) =
                (Arc::clone(&count), Arc::clone(&active), Arc::clone(&max_active));
            scheduler.start(move || {
                let (count, active, max_active) =
                    (Arc::clone(&count), Arc::clone(&active), Arc::clone(&max_active));
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_active.fetch_max(now_active, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(150)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            })
        };

        // first run occupies 0..150s; the ticks at 60s and 120s are dropped
        sleep_until(start + Duration::from_secs(179)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep_until(start + Duration::from_secs(181)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(max_active.load(Ordering::SeqCst), 1);

        scheduler.stop().await;
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_runs() {
        let count = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();
        let mut scheduler = Scheduler::new(Duration::from_secs(10));
        let handle = scheduler.start(counting_task(&count));

        sleep_until(start + Duration::from_secs(1)).await;
        scheduler.stop().await;
        handle.await.unwrap();

        sleep_until(start + Duration::from_secs(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_signal_stops_loop() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new(Duration::from_secs(10));
        let handle = scheduler.start(counting_task(&count));

        scheduler
            .run_until(handle, std::future::ready(Ok(())))
            .await
            .unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_signal_keeps_loop_running() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new(Duration::from_secs(60));
        let handle = scheduler.start(counting_task(&count));

        let no_signal = std::future::ready(Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "signal handler unavailable",
        )));
        let waited = tokio::time::timeout(
            Duration::from_secs(121),
            scheduler.run_until(handle, no_signal),
        )
        .await;

        assert!(waited.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(scheduler.is_running());
        scheduler.stop().await;
    }

    #[test]
    fn test_zero_period_is_clamped() {
        assert_eq!(Scheduler::new(Duration::ZERO).period(), Duration::from_secs(1));
    }
}
