//! Runs a pipeline as a background job.
//!
//! The caller gets a job id right away. The pipeline itself runs on Tokio's
//! blocking pool because every store call is synchronous SQLite work; it reports
//! row progress through a callback, which a listener task turns into
//! `JobStatus::InProgress(percent)` updates for the job controller.

use super::state::{JobUpdate, JobsState};
use crate::error::AutomationError;
use common::jobs::JobStatus;
use log::{error, info};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Progress callback handed to a pipeline: `(rows_done, rows_total)`.
pub type Progress<'a> = &'a mut dyn FnMut(usize, usize);

pub fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (done.min(total) * 100 / total) as u32
    }
}

/// Registers a `Pending` job, spawns `work` and returns the job id.
///
/// `work` returns the completion message on success. Its error, or a panic,
/// becomes `JobStatus::Failed`.
pub async fn schedule_job<F>(state: &JobsState, kind: &'static str, work: F) -> String
where
    F: FnOnce(Progress<'_>) -> Result<String, AutomationError> + Send + 'static,
{
    let job_id = Uuid::new_v4().to_string();
    state
        .jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);

    let tx = state.tx.clone();
    let id = job_id.clone();
    tokio::spawn(async move {
        let (progress_tx, mut progress_rx) = mpsc::channel::<(usize, usize)>(100);

        let updater_tx = tx.clone();
        let updater_id = id.clone();
        let listener = tokio::spawn(async move {
            while let Some((done, total)) = progress_rx.recv().await {
                let _ = updater_tx
                    .send(JobUpdate {
                        job_id: updater_id.clone(),
                        status: JobStatus::InProgress(percent(done, total)),
                    })
                    .await;
            }
        });

        let handle = tokio::task::spawn_blocking(move || {
            let mut report = |done: usize, total: usize| {
                let _ = progress_tx.blocking_send((done, total));
            };
            work(&mut report)
        });

        let status = match handle.await {
            Ok(Ok(message)) => {
                info!("{} job {} finished: {}", kind, id, message);
                JobStatus::Completed(message)
            }
            Ok(Err(e)) => {
                error!("{} job {} failed: {}", kind, id, e);
                JobStatus::Failed(e.to_string())
            }
            Err(e) => {
                error!("{} job {} did not finish: {}", kind, id, e);
                JobStatus::Failed(format!("Task join error: {}", e))
            }
        };

        // The progress sender is gone with the closure; let the listener drain
        // so no late InProgress overwrites the final status.
        let _ = listener.await;
        let _ = tx.send(JobUpdate { job_id: id, status }).await;
    });

    job_id
}

#[cfg(test)]
mod tests {
    use super::super::state::start_job_updater;
    use super::*;
    use std::time::Duration;

    async fn wait_for_final(state: &JobsState, job_id: &str) -> JobStatus {
        for _ in 0..200 {
            match state.status(job_id).await {
                Some(status @ (JobStatus::Completed(_) | JobStatus::Failed(_))) => return status,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        panic!("job {} never finished", job_id);
    }

    #[test]
    fn percent_is_bounded() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 4), 25);
        assert_eq!(percent(4, 4), 100);
        assert_eq!(percent(9, 4), 100);
    }

    #[tokio::test]
    async fn successful_job_completes_with_message() {
        let (state, rx) = JobsState::new(16);
        tokio::spawn(start_job_updater(state.clone(), rx));

        let job_id = schedule_job(&state, "test", |progress| {
            progress(0, 2);
            progress(1, 2);
            progress(2, 2);
            Ok("done".to_string())
        })
        .await;

        assert_eq!(
            wait_for_final(&state, &job_id).await,
            JobStatus::Completed("done".to_string())
        );
    }

    #[tokio::test]
    async fn failing_job_reports_the_error() {
        let (state, rx) = JobsState::new(16);
        tokio::spawn(start_job_updater(state.clone(), rx));

        let job_id = schedule_job(&state, "test", |_| {
            Err(AutomationError::MissingPrecondition("no folder".to_string()))
        })
        .await;

        assert_eq!(
            wait_for_final(&state, &job_id).await,
            JobStatus::Failed("Missing precondition: no folder".to_string())
        );
    }
}
