///! Scheduled task manager
///!
///! Periodically scrapes the league page, refreshes the snapshot and rebuilds
///! the static artifacts. Triggers are aligned to interval boundaries (a
///! 30-minute interval fires at xx:00 and xx:30 UTC).

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::league::fetcher::page_source;
use super::league::LeagueUpdater;
use super::renderer::CardLayoutKind;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(60);
/// Allowance for rendering on top of the fetch budget
const RENDER_ALLOWANCE: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct ScheduledTaskConfig {
    pub rebuild_interval_minutes: u64,

    pub layout: CardLayoutKind,

    /// Rebuild once right away instead of waiting for the first boundary
    pub perform_initial_rebuild: bool,
}

impl Default for ScheduledTaskConfig {
    fn default() -> Self {
        Self {
            rebuild_interval_minutes: 60,
            layout: CardLayoutKind::default(),
            perform_initial_rebuild: true,
        }
    }
}

pub struct ScheduledTaskManager {
    config: ScheduledTaskConfig,
    updater: Arc<LeagueUpdater>,
    task_handles: Vec<JoinHandle<()>>,
}

impl ScheduledTaskManager {
    pub fn new(config: ScheduledTaskConfig, updater: Arc<LeagueUpdater>) -> Self {
        Self {
            config,
            updater,
            task_handles: Vec::new(),
        }
    }

    /// Start the rebuild task; an interval of zero schedules nothing.
    pub fn start_all(&mut self) {
        if self.config.rebuild_interval_minutes == 0 {
            tracing::info!("Scheduled rebuild disabled");
            return;
        }

        let updater = self.updater.clone();
        let config = self.config.clone();
        tracing::info!(
            "Scheduling rebuild task (interval: {} minutes, initial: {})",
            config.rebuild_interval_minutes,
            config.perform_initial_rebuild
        );

        let handle = tokio::spawn(async move {
            if config.perform_initial_rebuild {
                tracing::info!("Performing initial rebuild...");
                if let Err(e) = Self::run_rebuild(&updater, config.layout).await {
                    tracing::error!("Initial rebuild failed: {}", e);
                }
            }
            Self::rebuild_loop(updater, config).await;
        });
        self.task_handles.push(handle);
    }

    async fn rebuild_loop(updater: Arc<LeagueUpdater>, config: ScheduledTaskConfig) {
        loop {
            let now = Utc::now();
            let next_trigger = Self::calculate_next_rebuild_time(now, config.rebuild_interval_minutes);
            let sleep_duration = (next_trigger - now).to_std().unwrap_or(RETRY_DELAY);

            tracing::info!(
                "Next rebuild at: {} (in {:.1} min)",
                next_trigger.format("%Y-%m-%d %H:%M:%S UTC"),
                sleep_duration.as_secs_f64() / 60.0
            );
            tokio::time::sleep(sleep_duration).await;

            for attempt in 1..=MAX_RETRIES {
                match Self::run_rebuild(&updater, config.layout).await {
                    Ok(_) => {
                        tracing::info!("Rebuild completed successfully");
                        break;
                    }
                    Err(e) if attempt < MAX_RETRIES => {
                        tracing::warn!(
                            "Rebuild failed (attempt {}/{}): {}. Retrying in {}s...",
                            attempt,
                            MAX_RETRIES,
                            e,
                            RETRY_DELAY.as_secs()
                        );
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                    Err(e) => {
                        tracing::error!("Rebuild failed after {} attempts: {}", MAX_RETRIES, e);
                    }
                }
            }
        }
    }

    /// Next multiple of the interval since the Unix epoch, strictly after `now`.
    fn calculate_next_rebuild_time(now: DateTime<Utc>, interval_minutes: u64) -> DateTime<Utc> {
        let step = (interval_minutes.max(1) * 60) as i64;
        let next = (now.timestamp().div_euclid(step) + 1) * step;
        DateTime::from_timestamp(next, 0).unwrap_or_else(|| now + chrono::Duration::seconds(step))
    }

    async fn run_rebuild(updater: &LeagueUpdater, layout: CardLayoutKind) -> anyhow::Result<()> {
        let source = page_source(&updater.config().source)?;
        let budget = updater.config().source.fetch_timeout() + RENDER_ALLOWANCE;

        match tokio::time::timeout(budget, updater.refresh(source.as_ref(), layout)).await {
            Ok(result) => {
                let artifacts = result?;
                tracing::info!(
                    "Rebuilt {:?} and {:?} (png: {})",
                    artifacts.page,
                    artifacts.svg,
                    artifacts.png.is_some()
                );
                Ok(())
            }
            Err(_) => anyhow::bail!("Rebuild timed out after {} seconds", budget.as_secs()),
        }
    }

    /// Abort every running task.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down scheduled task manager...");
        for handle in self.task_handles {
            handle.abort();
        }
        tracing::info!("All scheduled tasks stopped");
    }
}
