use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::{Actor, ServiceEvent, ServiceRequest, ServiceRequestCreate, ServiceStatus};
use crate::error::RegistryError;
use crate::latency::Deferred;
use crate::messages::RegistryRequest;
use crate::registry::{Applied, Dashboard};

/// Handle to the [`RegistryService`](crate::actors::RegistryService).
#[derive(Clone)]
pub struct RegistryClient {
    sender: mpsc::Sender<RegistryRequest>,
    latency: Duration,
}

impl RegistryClient {
    pub fn new(sender: mpsc::Sender<RegistryRequest>) -> Self {
        Self {
            sender,
            latency: Duration::ZERO,
        }
    }

    /// Delay applied by [`create_request_deferred`](Self::create_request_deferred).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn create_request(
        &self,
        customer: Actor,
        params: ServiceRequestCreate,
    ) -> Result<ServiceRequest, RegistryError> {
        self.send_create(customer, params, CancellationToken::new()).await
    }

    /// Submission behind the simulated network delay. Cancelling before the
    /// registry commits it means the request is never stored.
    pub fn create_request_deferred(
        &self,
        customer: Actor,
        params: ServiceRequestCreate,
    ) -> Deferred<Result<ServiceRequest, RegistryError>> {
        let client = self.clone();
        Deferred::spawn(self.latency, move |cancel| async move {
            client.send_create(customer, params, cancel).await
        })
    }

    #[instrument(skip(self, cancel))]
    async fn send_create(
        &self,
        customer: Actor,
        params: ServiceRequestCreate,
        cancel: CancellationToken,
    ) -> Result<ServiceRequest, RegistryError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(RegistryRequest::Create {
                customer,
                params,
                cancel,
                respond_to,
            })
            .await
            .map_err(|_| RegistryError::ActorCommunicationError("Actor closed".to_string()))?;

        response
            .await
            .map_err(|_| RegistryError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    pub async fn cancel(&self, id: String, customer: Actor) -> Result<Applied, RegistryError> {
        self.apply(id, customer, ServiceEvent::Cancel).await
    }

    pub async fn accept(&self, id: String, worker: Actor) -> Result<Applied, RegistryError> {
        self.apply(id, worker, ServiceEvent::Accept).await
    }

    pub async fn pass(&self, id: String, worker: Actor) -> Result<Applied, RegistryError> {
        self.apply(id, worker, ServiceEvent::Pass).await
    }

    pub async fn complete(&self, id: String, worker: Actor) -> Result<Applied, RegistryError> {
        self.apply(id, worker, ServiceEvent::Complete).await
    }
}

client_method!(RegistryClient => fn apply(id: String, actor: Actor, event: ServiceEvent) -> Applied as RegistryRequest::Apply, Error = RegistryError);
client_method!(RegistryClient => fn get(id: String) -> Option<ServiceRequest> as RegistryRequest::Get, Error = RegistryError);
client_method!(RegistryClient => fn by_status(status: ServiceStatus) -> Vec<ServiceRequest> as RegistryRequest::ByStatus, Error = RegistryError);
client_method!(RegistryClient => fn visible_to(actor: Actor) -> Vec<ServiceRequest> as RegistryRequest::VisibleTo, Error = RegistryError);
client_method!(RegistryClient => fn dashboard(actor: Actor) -> Dashboard as RegistryRequest::Dashboard, Error = RegistryError);
client_method!(RegistryClient => fn snapshot() -> Vec<ServiceRequest> as RegistryRequest::Snapshot, Error = RegistryError);
client_shutdown!(RegistryClient => RegistryRequest, Error = RegistryError);
