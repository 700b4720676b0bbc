use serde::Deserialize;

use crate::{
    identity::{non_empty, Identity},
    QueueError, Result,
};

/// Configuration for a [`QueueClient`](crate::QueueClient).
///
/// Empty strings are treated the same as `None`. Either `queue_name` or `queue_url` must be set.
#[derive(Clone, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct SqsConfig {
    /// Owner of the queue, only used when resolving `queue_name`.
    pub account_id: Option<String>,
    /// Access key. Leave unset (or leave `secret` unset) for unsigned requests.
    pub key: Option<String>,
    pub secret: Option<String>,
    pub region: String,
    /// Not needed if `queue_url` is set.
    pub queue_name: Option<String>,
    /// Not needed if `queue_name` is set.
    pub queue_url: Option<String>,
    /// Overrides the service endpoint, e.g. for ElasticMQ or LocalStack.
    pub endpoint: Option<String>,
    pub max_retries: u32,
    /// Visibility timeout in seconds.
    pub visibility_timeout: u32,
    /// Long poll duration for receives, in seconds.
    pub wait_time: u32,
}

impl SqsConfig {
    pub fn identity(&self) -> Identity {
        Identity::resolve(self.key.as_deref(), self.secret.as_deref())
    }

    pub fn account_id(&self) -> Option<&str> {
        non_empty(self.account_id.as_deref())
    }

    pub fn queue_name(&self) -> Option<&str> {
        non_empty(self.queue_name.as_deref())
    }

    pub fn queue_url(&self) -> Option<&str> {
        non_empty(self.queue_url.as_deref())
    }

    pub fn endpoint(&self) -> Option<&str> {
        non_empty(self.endpoint.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(QueueError::InvalidConfig("region must be set"));
        }
        if self.queue_url().is_none() && self.queue_name().is_none() {
            return Err(QueueError::InvalidConfig(
                "either a queue name or a queue url must be set",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SqsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqsConfig")
            .field("account_id", &self.account_id)
            .field("identity", &self.identity())
            .field("region", &self.region)
            .field("queue_name", &self.queue_name)
            .field("queue_url", &self.queue_url)
            .field("endpoint", &self.endpoint)
            .field("max_retries", &self.max_retries)
            .field("visibility_timeout", &self.visibility_timeout)
            .field("wait_time", &self.wait_time)
            .finish()
    }
}
