//! Waiting for asynchronous remote tasks (UPIDs).

use crate::{
    core::domain::{
        error::{ProxmoxError, ProxmoxResult},
        model::RawRecord,
    },
    session::ClusterSession,
};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(300);

/// Extracts the task id from a mutating call's response.
///
/// Most endpoints return the UPID as a bare string; anything else is
/// rendered as JSON.
pub fn task_id(response: &Value) -> String {
    match response {
        Value::String(upid) => upid.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Polls `nodes/{node}/tasks/{upid}/status` until the task stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskWaiter {
    interval: Duration,
    timeout: Duration,
}

impl TaskWaiter {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Waits for the task to stop.
    ///
    /// # Errors
    /// `ProxmoxError::RemoteApi` if the task ends with an exit status other
    /// than `OK`, or if it is still running when the timeout elapses. Errors
    /// from the status call itself propagate.
    pub async fn wait(&self, session: &ClusterSession, node: &str, upid: &str) -> ProxmoxResult<()> {
        let status = session
            .node(node)
            .child("tasks")
            .child(upid)
            .child("status");
        let deadline = Instant::now() + self.timeout;

        loop {
            let raw = RawRecord::from_value(status.get().await?).unwrap_or_default();
            if raw.str_field("status") == Some("stopped") {
                let exit = raw.text_field("exitstatus").unwrap_or_default();
                debug!(%upid, %exit, "task finished");
                if exit == "OK" {
                    return Ok(());
                }
                return Err(ProxmoxError::RemoteApi {
                    status_code: 0,
                    message: format!("Task {upid} failed: {exit}"),
                });
            }

            if Instant::now() + self.interval > deadline {
                return Err(ProxmoxError::RemoteApi {
                    status_code: 0,
                    message: format!(
                        "Task {upid} did not finish within {}s",
                        self.timeout.as_secs()
                    ),
                });
            }
            sleep(self.interval).await;
        }
    }
}

impl Default for TaskWaiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_TASK_TIMEOUT)
    }
}
