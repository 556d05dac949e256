use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::clients::RegistryClient;
use crate::domain::{Actor, ServiceEvent, ServiceRequest, ServiceRequestCreate, ServiceStatus};
use crate::error::RegistryError;
use crate::messages::{RegistryRequest, ServiceResponse};
use crate::registry::{Applied, ServiceRegistry};

/// Hosts the [`ServiceRegistry`].
///
/// The mailbox serializes every read-modify-write on the collection: when two
/// workers accept the same request, the first message wins and the second sees
/// an in-progress request and gets `InvalidTransition`.
pub struct RegistryService {
    receiver: mpsc::Receiver<RegistryRequest>,
    registry: ServiceRegistry,
}

impl RegistryService {
    pub fn new(buffer_size: usize) -> (Self, RegistryClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            registry: ServiceRegistry::new(),
        };
        let client = RegistryClient::new(sender);
        (service, client)
    }

    #[instrument(name = "registry_service", skip(self))]
    pub async fn run(mut self) {
        info!("RegistryService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                RegistryRequest::Create {
                    customer,
                    params,
                    cancel,
                    respond_to,
                } => {
                    self.handle_create(customer, params, cancel, respond_to);
                }
                RegistryRequest::Apply {
                    id,
                    actor,
                    event,
                    respond_to,
                } => {
                    self.handle_apply(id, actor, event, respond_to);
                }
                RegistryRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.registry.get(&id).cloned()));
                }
                RegistryRequest::ByStatus { status, respond_to } => {
                    self.handle_by_status(status, respond_to);
                }
                RegistryRequest::VisibleTo { actor, respond_to } => {
                    let _ = respond_to.send(Ok(self.registry.visible_to(&actor)));
                }
                RegistryRequest::Dashboard { actor, respond_to } => {
                    let _ = respond_to.send(Ok(self.registry.dashboard(&actor)));
                }
                RegistryRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.registry.snapshot()));
                }
                RegistryRequest::Shutdown => {
                    info!("RegistryService shutting down");
                    break;
                }
            }
        }

        info!(request_count = self.registry.len(), "RegistryService stopped");
    }

    #[instrument(fields(customer_id = %customer.id), skip(self, customer, params, cancel, respond_to))]
    fn handle_create(
        &mut self,
        customer: Actor,
        params: ServiceRequestCreate,
        cancel: CancellationToken,
        respond_to: ServiceResponse<ServiceRequest, RegistryError>,
    ) {
        debug!("Processing create request");
        if cancel.is_cancelled() {
            info!("Submission cancelled by caller, discarding");
            let _ = respond_to.send(Err(RegistryError::Cancelled));
            return;
        }
        let _ = respond_to.send(self.registry.create(&customer, params));
    }

    #[instrument(fields(request_id = %id, actor_id = %actor.id, %event), skip(self, actor, respond_to))]
    fn handle_apply(
        &mut self,
        id: String,
        actor: Actor,
        event: ServiceEvent,
        respond_to: ServiceResponse<Applied, RegistryError>,
    ) {
        debug!("Processing apply request");
        let _ = respond_to.send(self.registry.apply(&id, &actor, event));
    }

    #[instrument(fields(%status), skip(self, respond_to))]
    fn handle_by_status(&self, status: ServiceStatus, respond_to: ServiceResponse<Vec<ServiceRequest>, RegistryError>) {
        let requests = self.registry.by_status(status);
        debug!(request_count = requests.len(), "Listed requests");
        let _ = respond_to.send(Ok(requests));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use std::time::Duration;

    fn worker(id: &str) -> Actor {
        let mut worker = Actor::register(id, "Worker", format!("{}@example.com", id), Role::Worker);
        worker.profile_complete = true;
        worker
    }

    #[tokio::test]
    async fn test_concurrent_accepts_have_one_winner() -> Result<(), Box<dyn std::error::Error>> {
        let (service, client) = RegistryService::new(10);
        let handle = tokio::spawn(service.run());

        let customer = Actor::register("c1", "Carla", "carla@example.com", Role::Customer);
        let request = client
            .create_request(
                customer,
                ServiceRequestCreate {
                    title: "Assemble wardrobe".into(),
                    description: "Flat-pack wardrobe, two doors".into(),
                    category: "Carpentry".into(),
                    location: "Manhattan, NY".into(),
                    date: "2023-06-15".into(),
                },
            )
            .await?;

        let (first, second) = tokio::join!(
            client.apply(request.id.clone(), worker("w1"), ServiceEvent::Accept),
            client.apply(request.id.clone(), worker("w2"), ServiceEvent::Accept),
        );

        let (winner, loser) = match (first, second) {
            (Ok(applied), Err(err)) => (applied, err),
            (Err(err), Ok(applied)) => (applied, err),
            other => panic!("expected exactly one winner, got {:?}", other),
        };
        assert!(matches!(loser, RegistryError::InvalidTransition { .. }));

        let stored = client.get(request.id.clone()).await?.expect("request exists");
        assert_eq!(stored.status, ServiceStatus::InProgress);
        assert_eq!(stored.worker_id, winner.request.and_then(|r| r.worker_id));

        client.shutdown().await?;
        handle.await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_submission_in_mailbox_is_not_committed() -> Result<(), Box<dyn std::error::Error>> {
        let (service, client) = RegistryService::new(10);
        let client = client.with_latency(Duration::from_millis(1));
        let customer = Actor::register("c1", "Carla", "carla@example.com", Role::Customer);

        let deferred = client.create_request_deferred(
            customer,
            ServiceRequestCreate {
                title: "Mount TV".into(),
                description: "65 inch, drywall".into(),
                category: "Mounting & Installation".into(),
                location: "Bronx, NY".into(),
                date: "2023-06-20".into(),
            },
        );
        // The service is not running yet, so the submission waits in the mailbox.
        tokio::time::sleep(Duration::from_millis(30)).await;
        deferred.cancel();

        let handle = tokio::spawn(service.run());
        assert!(client.snapshot().await?.is_empty());

        let kept = client
            .create_request(
                Actor::register("c1", "Carla", "carla@example.com", Role::Customer),
                ServiceRequestCreate {
                    title: "Mount shelves".into(),
                    description: "Three floating shelves".into(),
                    category: "Mounting & Installation".into(),
                    location: "Bronx, NY".into(),
                    date: "2023-06-21".into(),
                },
            )
            .await?;
        assert_eq!(kept.id, "request_1");

        client.shutdown().await?;
        handle.await?;
        Ok(())
    }
}
