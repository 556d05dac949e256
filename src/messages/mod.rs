use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::domain::{Actor, ActorCreate, ActorPatch, Redirect, ServiceEvent, ServiceRequest, ServiceRequestCreate, ServiceStatus};
use crate::error::{RegistryError, SessionError};
use crate::guard::GuardDecision;
use crate::registry::{Applied, Dashboard};
use crate::session::{AuthOutcome, SessionSnapshot};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for actor communication. Each variant includes parameters
/// and a oneshot channel for responses. Mutations that can be issued behind a
/// delay also carry the caller's cancellation token; the service drops them
/// unapplied once it is cancelled.

#[derive(Debug)]
pub enum SessionRequest {
    SignIn {
        email: String,
        password: String,
        cancel: CancellationToken,
        respond_to: ServiceResponse<AuthOutcome, SessionError>,
    },
    SignUp {
        params: ActorCreate,
        cancel: CancellationToken,
        respond_to: ServiceResponse<AuthOutcome, SessionError>,
    },
    SignOut {
        respond_to: ServiceResponse<Redirect, SessionError>,
    },
    UpdateProfile {
        patch: ActorPatch,
        respond_to: ServiceResponse<Actor, SessionError>,
    },
    CompleteProfile {
        patch: ActorPatch,
        respond_to: ServiceResponse<AuthOutcome, SessionError>,
    },
    Snapshot {
        respond_to: ServiceResponse<SessionSnapshot, SessionError>,
    },
    Authorize {
        path: String,
        respond_to: ServiceResponse<GuardDecision, SessionError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum RegistryRequest {
    Create {
        customer: Actor,
        params: ServiceRequestCreate,
        cancel: CancellationToken,
        respond_to: ServiceResponse<ServiceRequest, RegistryError>,
    },
    Apply {
        id: String,
        actor: Actor,
        event: ServiceEvent,
        respond_to: ServiceResponse<Applied, RegistryError>,
    },
    Get {
        id: String,
        respond_to: ServiceResponse<Option<ServiceRequest>, RegistryError>,
    },
    ByStatus {
        status: ServiceStatus,
        respond_to: ServiceResponse<Vec<ServiceRequest>, RegistryError>,
    },
    VisibleTo {
        actor: Actor,
        respond_to: ServiceResponse<Vec<ServiceRequest>, RegistryError>,
    },
    Dashboard {
        actor: Actor,
        respond_to: ServiceResponse<Dashboard, RegistryError>,
    },
    Snapshot {
        respond_to: ServiceResponse<Vec<ServiceRequest>, RegistryError>,
    },
    Shutdown,
}
