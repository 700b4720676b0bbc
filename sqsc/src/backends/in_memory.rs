use std::{collections::HashMap, sync::Arc, time::Duration};

use svix_ksuid::{KsuidLike as _, KsuidMs};
use tokio::{
    sync::{Mutex, Notify},
    time::Instant,
};

use crate::{
    service::{QueueService, RawMessage, ReceiveRequest},
    QueueError, Result,
};

const BASE_URL: &str = "memory://sqsc/000000000000";

/// A process-local [`QueueService`].
///
/// Honors delivery delays, visibility timeouts, receipt handles and long polling. Clones share the
/// same queues.
#[derive(Clone, Default)]
pub struct InMemoryService {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    queues: Mutex<HashMap<String, Vec<Stored>>>,
    sent: Notify,
}

struct Stored {
    message_id: String,
    body: String,
    visible_at: Instant,
    // Only the handle from the latest receive can delete the message.
    receipt_handle: Option<String>,
}

fn new_id() -> String {
    KsuidMs::new(None, None).to_string()
}

fn no_such_queue() -> QueueError {
    QueueError::Generic("the specified queue does not exist".into())
}

fn after(start: Instant, duration: Duration) -> Result<Instant> {
    start
        .checked_add(duration)
        .ok_or_else(|| QueueError::Generic("duration out of range".into()))
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `name` if needed and returns its URL.
    pub async fn create_queue(&self, name: &str) -> String {
        let url = format!("{BASE_URL}/{name}");
        self.inner
            .queues
            .lock()
            .await
            .entry(url.clone())
            .or_default();
        url
    }

    /// Messages in the queue, visible or not.
    pub async fn message_count(&self, queue_url: &str) -> Result<usize> {
        let queues = self.inner.queues.lock().await;
        Ok(queues.get(queue_url).ok_or_else(no_such_queue)?.len())
    }
}

impl QueueService for InMemoryService {
    async fn get_queue_url(
        &self,
        queue_name: &str,
        _owner_account_id: Option<&str>,
    ) -> Result<Option<String>> {
        let url = format!("{BASE_URL}/{queue_name}");
        if self.inner.queues.lock().await.contains_key(&url) {
            Ok(Some(url))
        } else {
            Err(no_such_queue())
        }
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        delay: Duration,
    ) -> Result<Option<String>> {
        // SQS only takes whole seconds of delay.
        let delay = Duration::from_secs(delay.as_secs());
        let visible_at = after(Instant::now(), delay)?;

        let message_id = new_id();
        {
            let mut queues = self.inner.queues.lock().await;
            let queue = queues.get_mut(queue_url).ok_or_else(no_such_queue)?;
            queue.push(Stored {
                message_id: message_id.clone(),
                body: body.to_owned(),
                visible_at,
                receipt_handle: None,
            });
        }
        tracing::trace!(?delay, "in-memory message sent");
        self.inner.sent.notify_waiters();

        Ok(Some(message_id))
    }

    async fn receive_message(
        &self,
        request: ReceiveRequest<'_>,
    ) -> Result<Option<Vec<RawMessage>>> {
        let deadline = after(Instant::now(), request.wait_time)?;

        loop {
            // Registered before inspecting the queue so a concurrent send is not missed.
            let sent = self.inner.sent.notified();

            let wake_at = {
                let mut queues = self.inner.queues.lock().await;
                let queue = queues
                    .get_mut(request.queue_url)
                    .ok_or_else(no_such_queue)?;
                let now = Instant::now();
                let hidden_until = after(now, request.visibility_timeout)?;

                let out: Vec<RawMessage> = queue
                    .iter_mut()
                    .filter(|m| m.visible_at <= now)
                    .take(request.max_messages)
                    .map(|m| {
                        let receipt_handle = new_id();
                        m.receipt_handle = Some(receipt_handle.clone());
                        m.visible_at = hidden_until;
                        RawMessage {
                            message_id: Some(m.message_id.clone()),
                            body: Some(m.body.clone()),
                            receipt_handle: Some(receipt_handle),
                        }
                    })
                    .collect();

                if !out.is_empty() || now >= deadline {
                    return Ok(Some(out));
                }

                let next_visible = queue
                    .iter()
                    .map(|m| m.visible_at)
                    .filter(|t| *t > now)
                    .min();
                next_visible.map_or(deadline, |t| t.min(deadline))
            };

            // Either outcome means the queue is worth another look.
            let _ = tokio::time::timeout_at(wake_at, sent).await;
        }
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<Option<String>> {
        let mut queues = self.inner.queues.lock().await;
        let queue = queues.get_mut(queue_url).ok_or_else(no_such_queue)?;

        let pos = queue
            .iter()
            .position(|m| m.receipt_handle.as_deref() == Some(receipt_handle))
            .ok_or_else(|| QueueError::Generic("the receipt handle is not valid".into()))?;
        queue.remove(pos);

        Ok(None)
    }
}
