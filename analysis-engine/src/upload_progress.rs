//! Cosmetic upload progress bar driver.
//!
//! The percentage has no relation to real data transfer. A background ticker
//! advances it by a random step until it reaches 100. The ticker task is owned
//! by the [`UploadSimulator`] and is cancelled on completion, on
//! [`UploadSimulator::reset`], and when the simulator is dropped.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const TICK_INTERVAL: Duration = Duration::from_millis(300);
const MIN_STEP: f64 = 5.0;
const MAX_STEP: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UploadProgress {
    pub percent: f64,
    pub uploading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadStatus {
    Ready,
    Uploading,
    Paused,
    Complete,
}

impl UploadProgress {
    pub fn status(&self) -> UploadStatus {
        if self.uploading {
            UploadStatus::Uploading
        } else if self.percent <= 0.0 {
            UploadStatus::Ready
        } else if self.percent >= 100.0 {
            UploadStatus::Complete
        } else {
            UploadStatus::Paused
        }
    }

    /// Percentage rounded for display.
    pub fn rounded(&self) -> u32 {
        self.percent.round() as u32
    }
}

pub struct UploadSimulator {
    progress: Arc<watch::Sender<UploadProgress>>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl UploadSimulator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(UploadProgress::default());
        Self {
            progress: Arc::new(tx),
            handle: None,
            cancel_token: None,
        }
    }

    pub fn progress(&self) -> UploadProgress {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadProgress> {
        self.progress.subscribe()
    }

    /// Begin a new simulated upload from 0%.
    ///
    /// Returns `false` without doing anything while an upload is running or
    /// after one has completed. Must be called inside a Tokio runtime.
    pub fn start(&mut self) -> bool {
        let current = self.progress();
        if current.uploading || current.percent >= 100.0 {
            return false;
        }

        self.stop_ticker();
        self.progress.send_replace(UploadProgress {
            percent: 0.0,
            uploading: true,
        });

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(self.progress.clone(), cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        info!("Upload simulation started");
        true
    }

    pub fn reset(&mut self) {
        self.stop_ticker();
        self.progress.send_replace(UploadProgress::default());
        debug!("Upload simulation reset");
    }

    fn stop_ticker(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.handle = None;
    }
}

impl Default for UploadSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UploadSimulator {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

async fn tick_loop(progress: Arc<watch::Sender<UploadProgress>>, cancel_token: CancellationToken) {
    let mut rng = StdRng::from_entropy();
    let mut ticker = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let step = rng.gen_range(MIN_STEP..MAX_STEP);
                let mut finished = false;
                progress.send_modify(|p| {
                    p.percent += step;
                    if p.percent >= 100.0 {
                        p.percent = 100.0;
                        p.uploading = false;
                        finished = true;
                    }
                });
                if finished {
                    info!("Upload simulation complete");
                    break;
                }
            }
            _ = cancel_token.cancelled() => {
                debug!("Upload ticker cancelled");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_to_completion(rx: &mut watch::Receiver<UploadProgress>) -> Vec<f64> {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let p = *rx.borrow_and_update();
            seen.push(p.percent);
            if !p.uploading {
                break;
            }
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn completes_at_exactly_one_hundred() {
        let mut sim = UploadSimulator::new();
        let mut rx = sim.subscribe();
        assert_eq!(sim.progress().status(), UploadStatus::Ready);

        assert!(sim.start());
        assert_eq!(sim.progress().status(), UploadStatus::Uploading);

        let seen = run_to_completion(&mut rx).await;
        assert_eq!(sim.progress().percent, 100.0);
        assert_eq!(sim.progress().status(), UploadStatus::Complete);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{:?}", seen);
    }

    #[tokio::test(start_paused = true)]
    async fn each_tick_advances_between_five_and_twenty() {
        let mut sim = UploadSimulator::new();
        sim.start();

        time::sleep(TICK_INTERVAL + Duration::from_millis(1)).await;
        let first = sim.progress().percent;
        assert!((MIN_STEP..MAX_STEP).contains(&first), "{}", first);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_ignored_while_running_or_complete() {
        let mut sim = UploadSimulator::new();
        let mut rx = sim.subscribe();
        assert!(sim.start());
        assert!(!sim.start());

        run_to_completion(&mut rx).await;
        assert!(!sim.start());
        assert_eq!(sim.progress().percent, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_ticker() {
        let mut sim = UploadSimulator::new();
        sim.start();
        time::sleep(Duration::from_millis(650)).await;
        assert!(sim.progress().percent > 0.0);

        sim.reset();
        assert_eq!(sim.progress(), UploadProgress::default());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sim.progress().percent, 0.0);
        assert_eq!(sim.progress().status(), UploadStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_ticker() {
        let sim = {
            let mut sim = UploadSimulator::new();
            sim.start();
            sim
        };
        let mut rx = sim.subscribe();
        drop(sim);

        time::sleep(Duration::from_secs(1)).await;
        rx.borrow_and_update();
        assert!(rx.changed().await.is_err());
    }

    #[test]
    fn status_boundaries() {
        let paused = UploadProgress {
            percent: 42.4,
            uploading: false,
        };
        assert_eq!(paused.status(), UploadStatus::Paused);
        assert_eq!(paused.rounded(), 42);
    }
}
