use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sqsc::{backends::InMemoryService, QueueClient, QueueError, QueueService as _, SqsConfig};

async fn make_test_queue(wait_time: u32) -> QueueClient<InMemoryService> {
    let service = InMemoryService::new();
    service.create_queue("jobs").await;

    let config = SqsConfig {
        region: "local".to_owned(),
        queue_name: Some("jobs".to_owned()),
        visibility_timeout: 30,
        wait_time,
        ..Default::default()
    };

    QueueClient::with_service(service, config).await.unwrap()
}

#[tokio::test]
async fn test_produce_consume_delete() {
    let c = make_test_queue(0).await;

    let id = c.produce("hello", Duration::ZERO).await.unwrap();
    assert!(!id.is_empty());

    let msg = c.consume().await.unwrap().unwrap();
    assert_eq!(msg.body, "hello");
    assert!(!msg.receipt_handle.is_empty());

    assert_eq!(c.delete(&msg.receipt_handle).await.unwrap(), "");
    assert_eq!(c.service().message_count(c.queue_url()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_twice_fails() {
    let c = make_test_queue(0).await;
    c.produce("hello", Duration::ZERO).await.unwrap();

    let msg = c.consume().await.unwrap().unwrap();
    c.delete(&msg.receipt_handle).await.unwrap();

    let err = c.delete(&msg.receipt_handle).await.unwrap_err();
    assert!(matches!(err, QueueError::Generic(_)));
}

#[tokio::test]
async fn test_consume_empty_queue() {
    let c = make_test_queue(0).await;
    assert_eq!(c.consume().await.unwrap(), None);
}

#[tokio::test]
async fn test_receive_fewer_than_requested() {
    let c = make_test_queue(0).await;
    c.produce("a", Duration::ZERO).await.unwrap();
    c.produce("b", Duration::ZERO).await.unwrap();

    let batch = c.receive(10).await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.bodies(), ["a", "b"]);
    assert_eq!(batch.receipt_handles().len(), 2);

    for msg in batch.messages() {
        c.delete(&msg.receipt_handle).await.unwrap();
    }
}

#[tokio::test]
async fn test_receive_respects_batch_size() {
    let c = make_test_queue(0).await;
    for body in ["a", "b", "c"] {
        c.produce(body, Duration::ZERO).await.unwrap();
    }

    let first = c.receive(2).await.unwrap();
    assert_eq!(first.bodies(), ["a", "b"]);

    let second = c.receive(2).await.unwrap();
    assert_eq!(second.bodies(), ["c"]);
}

#[tokio::test]
async fn test_delayed_produce() {
    let c = make_test_queue(3).await;
    let delay = Duration::from_secs(1);

    let now = Instant::now();
    c.produce("later", delay).await.unwrap();

    let msg = c.consume().await.unwrap().unwrap();
    assert_eq!(msg.body, "later");
    assert!(now.elapsed() >= delay);
}

#[tokio::test]
async fn test_sub_second_delay_is_dropped() {
    let c = make_test_queue(0).await;
    c.produce("soon", Duration::from_millis(900)).await.unwrap();

    assert_eq!(c.consume().await.unwrap().unwrap().body, "soon");
}

#[tokio::test]
async fn test_out_of_range_delay() {
    let c = make_test_queue(0).await;
    c.produce("never", Duration::from_secs(u64::MAX))
        .await
        .unwrap_err();

    assert_eq!(c.consume().await.unwrap(), None);
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct ExType {
    a: u8,
}

#[tokio::test]
async fn test_serde_produce_consume() {
    let payload = ExType { a: 2 };
    let c = make_test_queue(0).await;

    c.produce_serde_json(&payload, Duration::ZERO).await.unwrap();

    let msg = c.consume().await.unwrap().unwrap();
    assert_eq!(msg.payload_serde_json::<ExType>().unwrap(), payload);
}

#[tokio::test]
async fn test_unknown_queue_name() {
    let config = SqsConfig {
        region: "local".to_owned(),
        queue_name: Some("missing".to_owned()),
        ..Default::default()
    };
    QueueClient::with_service(InMemoryService::new(), config)
        .await
        .err()
        .unwrap();
}

#[tokio::test]
async fn test_dynamic_service() {
    let service = InMemoryService::new();
    let url = service.create_queue("jobs").await;

    let config = SqsConfig {
        region: "local".to_owned(),
        queue_url: Some(url),
        ..Default::default()
    };
    let c = QueueClient::with_service(service.into_dyn(), config)
        .await
        .unwrap();

    c.produce("hello", Duration::ZERO).await.unwrap();
    assert_eq!(c.consume().await.unwrap().unwrap().body, "hello");
}
