//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_registry_client`] to get a client and the receiving end of
//! its mailbox, then use [`expect_create`] / [`expect_apply`] to assert which
//! requests arrive and answer them by hand.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::clients::RegistryClient;
use crate::domain::{Actor, ServiceEvent, ServiceRequest, ServiceRequestCreate};
use crate::error::RegistryError;
use crate::messages::RegistryRequest;
use crate::registry::Applied;

/// Creates a registry client whose requests land on a receiver the test owns.
pub fn create_mock_registry_client(buffer_size: usize) -> (RegistryClient, mpsc::Receiver<RegistryRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (RegistryClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create(
    receiver: &mut mpsc::Receiver<RegistryRequest>,
) -> Option<(
    Actor,
    ServiceRequestCreate,
    CancellationToken,
    oneshot::Sender<Result<ServiceRequest, RegistryError>>,
)> {
    match receiver.recv().await {
        Some(RegistryRequest::Create {
            customer,
            params,
            cancel,
            respond_to,
        }) => Some((customer, params, cancel, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Apply request
pub async fn expect_apply(
    receiver: &mut mpsc::Receiver<RegistryRequest>,
) -> Option<(String, Actor, ServiceEvent, oneshot::Sender<Result<Applied, RegistryError>>)> {
    match receiver.recv().await {
        Some(RegistryRequest::Apply {
            id,
            actor,
            event,
            respond_to,
        }) => Some((id, actor, event, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, ServiceStatus};
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn customer() -> Actor {
        Actor::register("c1", "Carla", "carla@example.com", Role::Customer)
    }

    fn params() -> ServiceRequestCreate {
        ServiceRequestCreate {
            title: "Deep clean kitchen".into(),
            description: "Oven and cabinets".into(),
            category: "Cleaning".into(),
            location: "Queens, NY".into(),
            date: "2023-07-01".into(),
        }
    }

    #[tokio::test]
    async fn test_deferred_submission_arrives_after_delay() {
        let (client, mut receiver) = create_mock_registry_client(10);
        let client = client.with_latency(Duration::from_millis(10));

        let deferred = client.create_request_deferred(customer(), params());

        let (actor, payload, cancel, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert!(!cancel.is_cancelled());
        assert_eq!(actor.id, "c1");
        assert_eq!(payload.title, "Deep clean kitchen");

        let created = ServiceRequest {
            id: "request_1".into(),
            title: payload.title,
            description: payload.description,
            category: payload.category,
            location: payload.location,
            date: payload.date,
            status: ServiceStatus::Open,
            customer_id: actor.id,
            worker_id: None,
            declined_by: BTreeSet::new(),
        };
        responder.send(Ok(created.clone())).unwrap();

        assert_eq!(deferred.outcome().await, Ok(created));
    }

    #[tokio::test]
    async fn test_cancelled_submission_never_reaches_registry() {
        let (client, mut receiver) = create_mock_registry_client(10);
        let client = client.with_latency(Duration::from_millis(50));

        client.create_request_deferred(customer(), params()).cancel();
        drop(client);

        // Every sender is gone and nothing was queued.
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_after_send_flags_the_queued_submission() {
        let (client, mut receiver) = create_mock_registry_client(10);
        let client = client.with_latency(Duration::from_millis(1));

        let deferred = client.create_request_deferred(customer(), params());
        let (_, _, cancel, responder) = expect_create(&mut receiver).await.expect("Expected Create request");

        deferred.cancel();

        assert!(cancel.is_cancelled());
        // The caller is gone, so any reply goes nowhere.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(responder.is_closed());
    }

    #[tokio::test]
    async fn test_typed_helpers_forward_events() {
        let (client, mut receiver) = create_mock_registry_client(10);

        let task = tokio::spawn(async move { client.cancel("request_3".into(), customer()).await });

        let (id, actor, event, responder) = expect_apply(&mut receiver).await.expect("Expected Apply request");
        assert_eq!(id, "request_3");
        assert_eq!(actor.role, Role::Customer);
        assert_eq!(event, ServiceEvent::Cancel);
        responder
            .send(Ok(Applied {
                request: None,
                notice: event.notice(),
            }))
            .unwrap();

        let applied = task.await.unwrap().unwrap();
        assert_eq!(applied.notice, "Service request cancelled");
    }

    #[tokio::test]
    async fn test_closed_mailbox_is_a_communication_error() {
        let (client, receiver) = create_mock_registry_client(1);
        drop(receiver);

        let result = client.get("request_1".into()).await;
        assert!(matches!(result, Err(RegistryError::ActorCommunicationError(_))));
    }
}
