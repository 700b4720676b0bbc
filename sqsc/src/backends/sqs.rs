use std::time::Duration;

use aws_sdk_sqs::{
    config::{retry::RetryConfig, Credentials, Region},
    types::Message,
    Client,
};

use crate::{
    identity::Identity,
    service::{QueueService, RawMessage, ReceiveRequest},
    QueueError, Result, SqsConfig,
};

/// [`QueueService`] backed by the AWS SDK.
#[derive(Clone, Debug)]
pub struct SqsService {
    client: Client,
}

impl SqsService {
    /// Builds an SDK client from `cfg`.
    ///
    /// Requests are signed with static credentials when both key and secret are set, and sent
    /// unsigned otherwise. `max_retries` is handed to the SDK's standard retry strategy.
    pub async fn connect(cfg: &SqsConfig) -> Result<Self> {
        let identity = cfg.identity();
        tracing::debug!(
            region = %cfg.region,
            anonymous = identity.is_anonymous(),
            endpoint = ?cfg.endpoint(),
            "building sqs client"
        );

        let mut loader = aws_config::from_env()
            .region(Region::new(cfg.region.clone()))
            .retry_config(
                RetryConfig::standard().with_max_attempts(cfg.max_retries.saturating_add(1)),
            );

        loader = match identity {
            Identity::Anonymous => loader.no_credentials(),
            Identity::Static { key, secret } => {
                loader.credentials_provider(Credentials::new(key, secret, None, None, "sqsc"))
            }
        };

        if let Some(endpoint) = cfg.endpoint() {
            loader = loader.endpoint_url(endpoint);
        }

        let aws_cfg = loader.load().await;
        Ok(Self::from_client(Client::new(&aws_cfg)))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn secs(duration: Duration) -> Result<i32> {
    duration.as_secs().try_into().map_err(QueueError::generic)
}

impl From<Message> for RawMessage {
    fn from(message: Message) -> Self {
        Self {
            message_id: message.message_id,
            body: message.body,
            receipt_handle: message.receipt_handle,
        }
    }
}

impl QueueService for SqsService {
    async fn get_queue_url(
        &self,
        queue_name: &str,
        owner_account_id: Option<&str>,
    ) -> Result<Option<String>> {
        let out = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .set_queue_owner_aws_account_id(owner_account_id.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(QueueError::generic)?;

        Ok(out.queue_url)
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        delay: Duration,
    ) -> Result<Option<String>> {
        let out = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .delay_seconds(secs(delay)?)
            .send()
            .await
            .map_err(QueueError::generic)?;

        Ok(out.message_id)
    }

    async fn receive_message(
        &self,
        request: ReceiveRequest<'_>,
    ) -> Result<Option<Vec<RawMessage>>> {
        let out = self
            .client
            .receive_message()
            .queue_url(request.queue_url)
            .visibility_timeout(secs(request.visibility_timeout)?)
            .wait_time_seconds(secs(request.wait_time)?)
            .max_number_of_messages(
                request
                    .max_messages
                    .try_into()
                    .map_err(QueueError::generic)?,
            )
            .send()
            .await
            .map_err(QueueError::generic)?;

        // An empty receive omits the list entirely.
        Ok(Some(
            out.messages
                .unwrap_or_default()
                .into_iter()
                .map(RawMessage::from)
                .collect(),
        ))
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<Option<String>> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(QueueError::generic)?;

        // DeleteMessage has no response payload.
        Ok(None)
    }
}
