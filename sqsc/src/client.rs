use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::SqsConfig,
    service::{QueueService, RawMessage, ReceiveRequest},
    QueueError, Result,
};

#[cfg(feature = "sqs")]
use crate::backends::SqsService;

/// A client bound to a single queue.
///
/// Credentials and the queue URL are resolved once, at construction. After that every operation
/// is one round trip to the service and the client holds no per-call state, so it can be shared
/// freely (e.g. behind an `Arc`).
pub struct QueueClient<S> {
    service: S,
    config: SqsConfig,
    queue_url: String,
}

#[cfg(feature = "sqs")]
impl QueueClient<SqsService> {
    /// Connects to SQS and resolves the queue URL.
    ///
    /// If `config.queue_url` is unset this performs one `GetQueueUrl` call with the queue name
    /// (and owning account, if any).
    pub async fn new(config: SqsConfig) -> Result<Self> {
        config.validate()?;
        let service = SqsService::connect(&config).await?;
        Self::resolve(service, config).await
    }
}

impl<S: QueueService> QueueClient<S> {
    /// Creates a client over an arbitrary [`QueueService`].
    pub async fn with_service(service: S, config: SqsConfig) -> Result<Self> {
        config.validate()?;
        Self::resolve(service, config).await
    }

    // Expects a validated config.
    async fn resolve(service: S, config: SqsConfig) -> Result<Self> {
        let queue_url = match config.queue_url() {
            Some(url) => url.to_owned(),
            None => {
                let queue_name = config
                    .queue_name()
                    .ok_or(QueueError::InvalidConfig("queue name must be set"))?;
                service
                    .get_queue_url(queue_name, config.account_id())
                    .await?
                    .filter(|url| !url.is_empty())
                    .ok_or(QueueError::QueueUrlNotFound)?
            }
        };
        tracing::debug!(%queue_url, "queue client ready");

        Ok(Self {
            service,
            config,
            queue_url,
        })
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    /// The configuration this client was built with. See [`Self::queue_url`] for the resolved URL.
    pub fn config(&self) -> &SqsConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Sends `body`, which becomes visible to consumers after `delay`.
    ///
    /// Returns the id assigned by the service, or an empty string if it did not report one.
    pub async fn produce(&self, body: &str, delay: Duration) -> Result<String> {
        let message_id = self
            .service
            .send_message(&self.queue_url, body, delay)
            .await?
            .unwrap_or_default();
        tracing::trace!(%message_id, ?delay, "message produced");

        Ok(message_id)
    }

    pub async fn produce_serde_json<P: Serialize + Sync>(
        &self,
        payload: &P,
        delay: Duration,
    ) -> Result<String> {
        let body = serde_json::to_string(payload)?;
        self.produce(&body, delay).await
    }

    /// Receives up to `n` messages in a single call.
    ///
    /// Messages are hidden from other consumers for the configured visibility timeout. `n` is
    /// passed through as is; SQS itself rejects anything above 10.
    ///
    /// On failure the batch built so far is returned alongside the error. Processing stops at the
    /// first message missing its body or receipt handle, even if later ones are well formed.
    pub async fn receive(&self, n: usize) -> Result<Batch, (QueueError, Batch)> {
        let request = ReceiveRequest {
            queue_url: &self.queue_url,
            max_messages: n,
            visibility_timeout: Duration::from_secs(self.config.visibility_timeout.into()),
            wait_time: Duration::from_secs(self.config.wait_time.into()),
        };

        let messages = match self.service.receive_message(request).await {
            Ok(Some(messages)) => messages,
            Ok(None) => return Err((QueueError::NilResponse, Batch::default())),
            Err(e) => return Err((e, Batch::default())),
        };
        tracing::trace!(requested = n, received = messages.len(), "messages received");

        Batch::collect(messages)
    }

    /// Receives at most one message. `Ok(None)` means nothing was available.
    pub async fn consume(&self) -> Result<Option<ReceivedMessage>> {
        let batch = self.receive(1).await.map_err(|(e, _)| e)?;
        batch.into_first()
    }

    /// Deletes the delivery identified by `receipt_handle`.
    ///
    /// Returns an empty string on success, unless the service attached a payload to its answer.
    pub async fn delete(&self, receipt_handle: &str) -> Result<String> {
        let payload = self
            .service
            .delete_message(&self.queue_url, receipt_handle)
            .await?
            .unwrap_or_default();
        tracing::trace!("message deleted");

        Ok(payload)
    }
}

/// Message bodies and their receipt handles, index-aligned.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Batch {
    bodies: Vec<String>,
    receipt_handles: Vec<String>,
}

impl Batch {
    fn collect(messages: Vec<RawMessage>) -> Result<Self, (QueueError, Self)> {
        let mut batch = Self {
            bodies: Vec::with_capacity(messages.len()),
            receipt_handles: Vec::with_capacity(messages.len()),
        };

        for message in messages {
            let Some(body) = message.body else {
                return Err((QueueError::NilMessageBody, batch));
            };
            batch.bodies.push(body);

            let Some(receipt_handle) = message.receipt_handle else {
                return Err((QueueError::NilReceiptHandle, batch));
            };
            batch.receipt_handles.push(receipt_handle);
        }

        Ok(batch)
    }

    fn into_first(self) -> Result<Option<ReceivedMessage>> {
        if self.bodies.len() != self.receipt_handles.len() {
            return Err(QueueError::CountMismatch {
                bodies: self.bodies.len(),
                receipt_handles: self.receipt_handles.len(),
            });
        }
        Ok(self.into_messages().next())
    }

    pub fn bodies(&self) -> &[String] {
        &self.bodies
    }

    pub fn receipt_handles(&self) -> &[String] {
        &self.receipt_handles
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.bodies, self.receipt_handles)
    }

    /// Pairs up bodies with receipt handles. Unpaired trailing bodies are skipped.
    pub fn messages(&self) -> impl Iterator<Item = ReceivedMessage> + '_ {
        self.bodies
            .iter()
            .zip(&self.receipt_handles)
            .map(|(body, receipt_handle)| ReceivedMessage {
                body: body.clone(),
                receipt_handle: receipt_handle.clone(),
            })
    }

    pub fn into_messages(self) -> impl Iterator<Item = ReceivedMessage> {
        self.bodies
            .into_iter()
            .zip(self.receipt_handles)
            .map(|(body, receipt_handle)| ReceivedMessage {
                body,
                receipt_handle,
            })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReceivedMessage {
    pub body: String,
    /// Needed to delete this delivery. Not a message id, and useless once the visibility timeout
    /// expires.
    pub receipt_handle: String,
}

impl ReceivedMessage {
    pub fn payload_serde_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }
}
