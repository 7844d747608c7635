//! Polling of asynchronous indexing tasks.
//!
//! Writes return a task ID; the change becomes visible once the task is
//! `published`. The poller asks for the status with a slowly growing delay.

use crate::api::SearchIndex;
use crate::batch::BatchIndexingResponse;
use crate::config::WaitConfig;
use crate::error::{AlgoliaError, Result};
use crate::models::search::{TaskInfo, TaskStatus};
use std::future::Future;
use tokio::time::sleep;
use tracing::{debug, trace};

/// Poll `fetch_status` until it reports [`TaskStatus::Published`].
///
/// The first poll is immediate; poll `n` waits [`WaitConfig::delay_for`]`(n)`.
pub async fn wait_for_task<F, Fut>(task_id: i64, config: &WaitConfig, mut fetch_status: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TaskStatus>>,
{
    let mut retry: u32 = 1;

    loop {
        let status = fetch_status().await?;
        trace!(task_id, retry, ?status, "Polled task");

        if status == TaskStatus::Published {
            debug!(task_id, polls = retry, "Task published");
            return Ok(());
        }

        if config.max_retries.is_some_and(|max| retry >= max) {
            return Err(AlgoliaError::TaskTimeout {
                task_id,
                attempts: retry,
            });
        }

        retry += 1;
        sleep(config.delay_for(retry)).await;
    }
}

/// Answer of a write that produced one task.
#[derive(Debug, Clone)]
pub struct IndexingResponse {
    index: SearchIndex,
    info: TaskInfo,
}

impl IndexingResponse {
    pub(crate) fn new(index: SearchIndex, info: TaskInfo) -> Self {
        Self { index, info }
    }

    /// Raw answer.
    pub fn info(&self) -> &TaskInfo {
        &self.info
    }

    /// Task to wait on.
    pub fn task_id(&self) -> i64 {
        self.info.task_id
    }

    /// Wait until the task is published.
    pub async fn wait(&self) -> Result<()> {
        self.index.wait_task(self.info.task_id).await
    }
}

/// One step of a composite operation.
#[derive(Debug, Clone)]
pub enum IndexingStep {
    /// A write with a single task.
    Single(IndexingResponse),
    /// A set of batch writes.
    Batch(BatchIndexingResponse),
}

impl IndexingStep {
    /// Wait until the step is published.
    pub async fn wait(&self) -> Result<()> {
        match self {
            Self::Single(response) => response.wait().await,
            Self::Batch(response) => response.wait().await,
        }
    }
}

/// Answer of an operation made of several writes.
#[derive(Debug, Clone)]
pub struct MultiResponse {
    steps: Vec<IndexingStep>,
}

impl MultiResponse {
    pub(crate) fn new(steps: Vec<IndexingStep>) -> Self {
        Self { steps }
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[IndexingStep] {
        &self.steps
    }

    /// Wait until every step is published.
    pub async fn wait(&self) -> Result<()> {
        for step in &self.steps {
            step.wait().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast() -> WaitConfig {
        WaitConfig {
            time_before_retry: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            max_retries: None,
        }
    }

    #[tokio::test]
    async fn test_returns_once_published() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&polls);

        wait_for_task(7, &fast(), || {
            let c = Arc::clone(&counter);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 3 {
                    Ok(TaskStatus::NotPublished)
                } else {
                    Ok(TaskStatus::Published)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let config = WaitConfig {
            max_retries: Some(3),
            ..fast()
        };
        let polls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&polls);

        let err = wait_for_task(9, &config, || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(TaskStatus::NotPublished) }
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AlgoliaError::TaskTimeout {
                task_id: 9,
                attempts: 3
            }
        ));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_propagates_fetch_errors() {
        let result = wait_for_task(1, &fast(), || async {
            Err(AlgoliaError::Api {
                status: 404,
                message: "Task does not exist".to_string(),
            })
        })
        .await;

        assert!(result.unwrap_err().is_status(404));
    }
}
