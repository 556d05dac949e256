use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::clients::SessionClient;
use crate::domain::{ActorCreate, ActorPatch};
use crate::error::SessionError;
use crate::guard::GuardDecision;
use crate::messages::{ServiceResponse, SessionRequest};
use crate::session::{AuthOutcome, SessionManager};

/// Hosts the [`SessionManager`]. Requests are handled one at a time, so
/// session operations never interleave.
pub struct SessionService {
    receiver: mpsc::Receiver<SessionRequest>,
    manager: SessionManager,
}

impl SessionService {
    pub fn new(buffer_size: usize, manager: SessionManager) -> (Self, SessionClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self { receiver, manager };
        let client = SessionClient::new(sender);
        (service, client)
    }

    /// Restores the persisted session before the first request is served.
    #[instrument(name = "session_service", skip(self))]
    pub async fn run(mut self) {
        info!("SessionService starting");

        let restored = self.manager.check_auth();
        info!(restored, "Startup session check complete");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SessionRequest::SignIn {
                    email,
                    password,
                    cancel,
                    respond_to,
                } => {
                    self.handle_sign_in(email, password, cancel, respond_to);
                }
                SessionRequest::SignUp {
                    params,
                    cancel,
                    respond_to,
                } => {
                    self.handle_sign_up(params, cancel, respond_to);
                }
                SessionRequest::SignOut { respond_to } => {
                    let _ = respond_to.send(self.manager.sign_out());
                }
                SessionRequest::UpdateProfile { patch, respond_to } => {
                    let _ = respond_to.send(self.manager.update_profile(patch));
                }
                SessionRequest::CompleteProfile { patch, respond_to } => {
                    self.handle_complete_profile(patch, respond_to);
                }
                SessionRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.manager.snapshot()));
                }
                SessionRequest::Authorize { path, respond_to } => {
                    self.handle_authorize(path, respond_to);
                }
                SessionRequest::Shutdown => {
                    info!("SessionService shutting down");
                    break;
                }
            }
        }

        info!("SessionService stopped");
    }

    #[instrument(fields(email = %email), skip(self, password, cancel, respond_to))]
    fn handle_sign_in(
        &mut self,
        email: String,
        password: String,
        cancel: CancellationToken,
        respond_to: ServiceResponse<AuthOutcome, SessionError>,
    ) {
        debug!("Processing sign_in request");
        if cancel.is_cancelled() {
            info!("Sign-in cancelled by caller, discarding");
            let _ = respond_to.send(Err(SessionError::Cancelled));
            return;
        }
        let _ = respond_to.send(self.manager.sign_in(&email, &password));
    }

    #[instrument(fields(email = %params.email, role = %params.role), skip(self, params, cancel, respond_to))]
    fn handle_sign_up(
        &mut self,
        params: ActorCreate,
        cancel: CancellationToken,
        respond_to: ServiceResponse<AuthOutcome, SessionError>,
    ) {
        debug!("Processing sign_up request");
        if cancel.is_cancelled() {
            info!("Sign-up cancelled by caller, discarding");
            let _ = respond_to.send(Err(SessionError::Cancelled));
            return;
        }
        let _ = respond_to.send(self.manager.sign_up(params));
    }

    #[instrument(skip(self, patch, respond_to))]
    fn handle_complete_profile(&mut self, patch: ActorPatch, respond_to: ServiceResponse<AuthOutcome, SessionError>) {
        debug!("Processing complete_profile request");
        let _ = respond_to.send(self.manager.complete_profile(patch));
    }

    #[instrument(fields(path = %path), skip(self, respond_to))]
    fn handle_authorize(&self, path: String, respond_to: ServiceResponse<GuardDecision, SessionError>) {
        let decision = self.manager.authorize(&path);
        if let Some(target) = decision.redirect() {
            info!(redirect = %target, "Navigation redirected");
        }
        let _ = respond_to.send(Ok(decision));
    }
}
