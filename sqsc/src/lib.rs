//! # sqsc
//!
//! sqsc is a small client over Amazon SQS (or anything that speaks its API) exposing four
//! operations on a single queue:
//!
//!   * [`QueueClient::produce`] sends one message, optionally delayed
//!
//!   * [`QueueClient::consume`] receives at most one message
//!
//!   * [`QueueClient::receive`] receives up to `n` messages in one call
//!
//!   * [`QueueClient::delete`] acknowledges a delivery by its receipt handle
//!
//! Delivery guarantees, visibility timeouts, retries and transport all belong to the service and
//! its SDK. This crate only resolves credentials and the queue URL once, then shapes requests and
//! responses.
//!
//! ## Cargo Features
//!
//! * `sqs`: the AWS SDK backed [`backends::SqsService`]
//! * `in_memory`: [`backends::InMemoryService`], a local stand-in with the same semantics
//!
//! Both are enabled by default.
//!
//! ## How to Use sqsc
//!
//! ```no_run
//! # async {
//! use sqsc::{QueueClient, SqsConfig};
//!
//! let cfg = SqsConfig {
//!     region: "eu-west-1".to_owned(),
//!     queue_name: Some("jobs".to_owned()),
//!     max_retries: 3,
//!     visibility_timeout: 30,
//!     wait_time: 10,
//!     ..Default::default()
//! };
//!
//! // Resolves the queue URL by name, once.
//! let client = QueueClient::new(cfg).await?;
//!
//! let id = client.produce("hello", std::time::Duration::ZERO).await?;
//!
//! if let Some(msg) = client.consume().await? {
//!     println!("{id}: {}", msg.body);
//!     client.delete(&msg.receipt_handle).await?;
//! }
//! # anyhow::Ok(())
//! # };
//! ```
//!
//! Batches keep bodies and receipt handles index-aligned. A malformed entry aborts the batch, and
//! whatever was collected before it is handed back alongside the error:
//!
//! ```no_run
//! # use sqsc::{backends::SqsService, QueueClient};
//! # async {
//! # let client: QueueClient<SqsService> = todo!();
//! match client.receive(10).await {
//!     Ok(batch) => {
//!         for msg in batch.messages() {
//!             client.delete(&msg.receipt_handle).await?;
//!         }
//!     }
//!     Err((e, partial)) => eprintln!("{e}, kept {} bodies", partial.bodies().len()),
//! }
//! # anyhow::Ok(())
//! # };
//! ```
//!
//! ## Substituting the service
//!
//! [`QueueClient`] is generic over [`QueueService`], the narrow send/receive/delete/lookup
//! interface. Any implementation can be plugged in with [`QueueClient::with_service`]:
//!
//! ```no_run
//! # async {
//! use sqsc::{backends::InMemoryService, QueueClient, SqsConfig};
//!
//! let service = InMemoryService::new();
//! let url = service.create_queue("jobs").await;
//!
//! let client = QueueClient::with_service(
//!     service,
//!     SqsConfig {
//!         region: "local".to_owned(),
//!         queue_url: Some(url),
//!         ..Default::default()
//!     },
//! )
//! .await?;
//! # anyhow::Ok(())
//! # };
//! ```
#![warn(unreachable_pub)]

use thiserror::Error;

pub mod backends;
mod client;
mod config;
mod identity;
mod service;

pub use self::{
    client::{Batch, QueueClient, ReceivedMessage},
    config::SqsConfig,
    identity::Identity,
    service::{DynQueueService, QueueService, RawMessage, ReceiveRequest},
};

pub type Result<T, E = QueueError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("failed to get queue url")]
    QueueUrlNotFound,

    #[error("received nil response with no error")]
    NilResponse,
    #[error("received nil message body")]
    NilMessageBody,
    #[error("received nil receipt handle")]
    NilReceiptHandle,
    #[error("body count and receipt handle mismatch: {bodies} != {receipt_handles}")]
    CountMismatch {
        bodies: usize,
        receipt_handles: usize,
    },

    #[error("(de)serialization error")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Generic(Box<dyn std::error::Error + Send + Sync>),
}

impl QueueError {
    pub fn generic<E: 'static + std::error::Error + Send + Sync>(e: E) -> Self {
        Self::Generic(Box::new(e))
    }
}
