use std::{future::Future, pin::Pin, time::Duration};

use crate::Result;

/// A message as handed back by a [`QueueService`], before any validation.
///
/// Every field is optional because the service does not promise any of them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawMessage {
    pub message_id: Option<String>,
    pub body: Option<String>,
    pub receipt_handle: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReceiveRequest<'a> {
    pub queue_url: &'a str,
    /// Not clamped. The service decides what happens above its own cap.
    pub max_messages: usize,
    pub visibility_timeout: Duration,
    pub wait_time: Duration,
}

/// The primitives a [`QueueClient`](crate::QueueClient) needs from the queue service.
///
/// Each method is a single round trip. Transport level retries, if any, happen inside the
/// implementation.
pub trait QueueService: Send + Sync {
    /// Looks up a queue's URL by name. `Ok(None)` means the service answered without one.
    fn get_queue_url(
        &self,
        queue_name: &str,
        owner_account_id: Option<&str>,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Enqueues `body`, returning the assigned message id if the service reported one.
    fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        delay: Duration,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    /// `Ok(None)` stands for a response that carried neither messages nor an error.
    fn receive_message(
        &self,
        request: ReceiveRequest<'_>,
    ) -> impl Future<Output = Result<Option<Vec<RawMessage>>>> + Send;

    /// Returns whatever diagnostic payload the service attached to the deletion, normally none.
    fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    fn into_dyn(self) -> DynQueueService
    where
        Self: Sized + 'static,
    {
        DynQueueService::new(self)
    }
}

/// A type-erased [`QueueService`], for picking the backend at runtime.
pub struct DynQueueService(Box<dyn ErasedQueueService>);

impl DynQueueService {
    fn new(inner: impl QueueService + 'static) -> Self {
        let dyn_inner = DynQueueServiceInner { inner };
        Self(Box::new(dyn_inner))
    }
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

trait ErasedQueueService: Send + Sync {
    fn get_queue_url<'a>(
        &'a self,
        queue_name: &'a str,
        owner_account_id: Option<&'a str>,
    ) -> BoxFuture<'a, Option<String>>;

    fn send_message<'a>(
        &'a self,
        queue_url: &'a str,
        body: &'a str,
        delay: Duration,
    ) -> BoxFuture<'a, Option<String>>;

    fn receive_message<'a>(
        &'a self,
        request: ReceiveRequest<'a>,
    ) -> BoxFuture<'a, Option<Vec<RawMessage>>>;

    fn delete_message<'a>(
        &'a self,
        queue_url: &'a str,
        receipt_handle: &'a str,
    ) -> BoxFuture<'a, Option<String>>;
}

struct DynQueueServiceInner<S> {
    inner: S,
}

impl<S: QueueService> ErasedQueueService for DynQueueServiceInner<S> {
    fn get_queue_url<'a>(
        &'a self,
        queue_name: &'a str,
        owner_account_id: Option<&'a str>,
    ) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move { self.inner.get_queue_url(queue_name, owner_account_id).await })
    }

    fn send_message<'a>(
        &'a self,
        queue_url: &'a str,
        body: &'a str,
        delay: Duration,
    ) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move { self.inner.send_message(queue_url, body, delay).await })
    }

    fn receive_message<'a>(
        &'a self,
        request: ReceiveRequest<'a>,
    ) -> BoxFuture<'a, Option<Vec<RawMessage>>> {
        Box::pin(async move { self.inner.receive_message(request).await })
    }

    fn delete_message<'a>(
        &'a self,
        queue_url: &'a str,
        receipt_handle: &'a str,
    ) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move { self.inner.delete_message(queue_url, receipt_handle).await })
    }
}

impl QueueService for DynQueueService {
    async fn get_queue_url(
        &self,
        queue_name: &str,
        owner_account_id: Option<&str>,
    ) -> Result<Option<String>> {
        self.0.get_queue_url(queue_name, owner_account_id).await
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        delay: Duration,
    ) -> Result<Option<String>> {
        self.0.send_message(queue_url, body, delay).await
    }

    async fn receive_message(
        &self,
        request: ReceiveRequest<'_>,
    ) -> Result<Option<Vec<RawMessage>>> {
        self.0.receive_message(request).await
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<Option<String>> {
        self.0.delete_message(queue_url, receipt_handle).await
    }

    fn into_dyn(self) -> DynQueueService {
        self
    }
}
