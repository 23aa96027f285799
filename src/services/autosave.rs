use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::{errors::AppResult, services::answer_service::SaveOutcome};

/// Something that can push the current answer draft to storage.
#[async_trait]
pub trait DraftSaver: Send + Sync {
    async fn save_draft(&self) -> AppResult<SaveOutcome>;
}

/// Periodic best-effort save bound to one attempt. Aborted by `stop` or drop.
pub struct AutosaveTask {
    handle: Option<JoinHandle<()>>,
}

impl AutosaveTask {
    pub fn spawn(period: Duration, saver: Arc<dyn DraftSaver>) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; there is nothing to save yet.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match saver.save_draft().await {
                    Ok(outcome) => log::debug!("Autosave finished: {:?}", outcome),
                    Err(err) => log::warn!("Autosave failed, will retry next cycle: {}", err),
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("Autosave stopped");
        }
    }
}

impl Drop for AutosaveTask {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSaver {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl DraftSaver for CountingSaver {
        async fn save_draft(&self) -> AppResult<SaveOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::DatabaseError("offline".into()))
            } else {
                Ok(SaveOutcome::Saved { records: 1 })
            }
        }
    }

    fn saver(fail: bool) -> Arc<CountingSaver> {
        Arc::new(CountingSaver {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    #[tokio::test]
    async fn saves_periodically_until_stopped() {
        let saver = saver(false);
        let mut task = AutosaveTask::spawn(Duration::from_millis(20), saver.clone());

        tokio::time::sleep(Duration::from_millis(110)).await;
        assert!(task.is_running());
        task.stop();
        assert!(!task.is_running());

        let after_stop = saver.calls.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected several saves, got {}", after_stop);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(saver.calls.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn failures_do_not_end_the_loop() {
        let saver = saver(true);
        let task = AutosaveTask::spawn(Duration::from_millis(15), saver.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(task.is_running());
        assert!(saver.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_task() {
        let saver = saver(false);
        let task = AutosaveTask::spawn(Duration::from_millis(15), saver.clone());
        drop(task);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(saver.calls.load(Ordering::SeqCst), 0);
    }
}
