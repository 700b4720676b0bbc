use std::time::{Duration, Instant};

use aws_sdk_sqs::Client;
use sqsc::{backends::SqsService, QueueClient, SqsConfig};

const ROOT_URL: &str = "http://localhost:9324";
const REGION: &str = "localhost";

/// Returns a [`QueueClient`] connected to an SQS compatible service (e.g. ElasticMQ) listening
/// on `ROOT_URL`.
///
/// Additionally this will make a temporary queue on that instance for the duration of the test
/// such as to ensure there is no stealing. The client resolves it by name.
async fn make_test_queue(wait_time: u32) -> QueueClient<SqsService> {
    let config = SqsConfig {
        key: Some("x".to_owned()),
        secret: Some("x".to_owned()),
        region: REGION.to_owned(),
        endpoint: Some(ROOT_URL.to_owned()),
        queue_name: Some("setup".to_owned()),
        visibility_timeout: 30,
        wait_time,
        ..Default::default()
    };

    let setup = SqsService::connect(&config).await.unwrap();
    let client: &Client = setup.client();

    let queue_name: String = std::iter::repeat_with(fastrand::alphanumeric)
        .take(8)
        .collect();
    client
        .create_queue()
        .queue_name(&queue_name)
        .send()
        .await
        .unwrap();

    QueueClient::new(SqsConfig {
        queue_name: Some(queue_name),
        ..config
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_produce_consume_delete() {
    let c = make_test_queue(1).await;

    let id = c.produce("hello", Duration::ZERO).await.unwrap();
    assert!(!id.is_empty());

    let msg = c.consume().await.unwrap().unwrap();
    assert_eq!(msg.body, "hello");
    assert!(!msg.receipt_handle.is_empty());

    assert_eq!(c.delete(&msg.receipt_handle).await.unwrap(), "");
}

#[tokio::test]
async fn test_delete_invalid_handle() {
    let c = make_test_queue(0).await;
    c.delete("not-a-receipt-handle").await.unwrap_err();
}

/// Receive returns what is there rather than waiting for a full batch.
#[tokio::test]
async fn test_receive_partial() {
    let c = make_test_queue(1).await;
    c.produce("a", Duration::ZERO).await.unwrap();

    let batch = c.receive(2).await.unwrap();
    assert_eq!(batch.bodies(), ["a"]);
    assert_eq!(batch.receipt_handles().len(), 1);
}

/// Receive waits out the configured wait time when the queue stays empty.
#[tokio::test]
async fn test_receive_long_poll() {
    let c = make_test_queue(1).await;

    let now = Instant::now();
    let batch = c.receive(2).await.unwrap();

    assert!(batch.is_empty());
    assert!(now.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_delayed_produce() {
    let c = make_test_queue(5).await;
    let delay = Duration::from_secs(2);

    let now = Instant::now();
    c.produce("later", delay).await.unwrap();
    let msg = c.consume().await.unwrap().unwrap();

    assert_eq!(msg.body, "later");
    assert!(now.elapsed() >= delay);
}
