use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::{Actor, ActorCreate, ActorPatch, Redirect};
use crate::error::SessionError;
use crate::guard::GuardDecision;
use crate::latency::Deferred;
use crate::messages::SessionRequest;
use crate::session::{AuthOutcome, SessionSnapshot};

/// Handle to the [`SessionService`](crate::actors::SessionService).
#[derive(Clone)]
pub struct SessionClient {
    sender: mpsc::Sender<SessionRequest>,
    latency: Duration,
}

impl SessionClient {
    pub fn new(sender: mpsc::Sender<SessionRequest>) -> Self {
        Self {
            sender,
            latency: Duration::ZERO,
        }
    }

    /// Delay applied by the `*_deferred` methods.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn sign_in(&self, email: String, password: String) -> Result<AuthOutcome, SessionError> {
        self.send_sign_in(email, password, CancellationToken::new()).await
    }

    pub async fn sign_up(&self, params: ActorCreate) -> Result<AuthOutcome, SessionError> {
        self.send_sign_up(params, CancellationToken::new()).await
    }

    /// Sign-in behind the simulated network delay.
    pub fn sign_in_deferred(&self, email: String, password: String) -> Deferred<Result<AuthOutcome, SessionError>> {
        let client = self.clone();
        Deferred::spawn(self.latency, move |cancel| async move {
            client.send_sign_in(email, password, cancel).await
        })
    }

    /// Registration behind the simulated network delay.
    pub fn sign_up_deferred(&self, params: ActorCreate) -> Deferred<Result<AuthOutcome, SessionError>> {
        let client = self.clone();
        Deferred::spawn(self.latency, move |cancel| async move { client.send_sign_up(params, cancel).await })
    }

    /// Written by hand so the password never reaches a span.
    #[instrument(skip(self, password, cancel))]
    async fn send_sign_in(
        &self,
        email: String,
        password: String,
        cancel: CancellationToken,
    ) -> Result<AuthOutcome, SessionError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.request(SessionRequest::SignIn {
            email,
            password,
            cancel,
            respond_to,
        })
        .await?;
        response
            .await
            .map_err(|_| SessionError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    #[instrument(skip(self, cancel))]
    async fn send_sign_up(&self, params: ActorCreate, cancel: CancellationToken) -> Result<AuthOutcome, SessionError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.request(SessionRequest::SignUp {
            params,
            cancel,
            respond_to,
        })
        .await?;
        response
            .await
            .map_err(|_| SessionError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    async fn request(&self, msg: SessionRequest) -> Result<(), SessionError> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| SessionError::ActorCommunicationError("Actor closed".to_string()))
    }

    pub async fn current_actor(&self) -> Result<Option<Actor>, SessionError> {
        Ok(self.snapshot().await?.current_actor)
    }
}

client_method!(SessionClient => fn sign_out() -> Redirect as SessionRequest::SignOut, Error = SessionError);
client_method!(SessionClient => fn update_profile(patch: ActorPatch) -> Actor as SessionRequest::UpdateProfile, Error = SessionError);
client_method!(SessionClient => fn complete_profile(patch: ActorPatch) -> AuthOutcome as SessionRequest::CompleteProfile, Error = SessionError);
client_method!(SessionClient => fn snapshot() -> SessionSnapshot as SessionRequest::Snapshot, Error = SessionError);
client_method!(SessionClient => fn authorize(path: String) -> GuardDecision as SessionRequest::Authorize, Error = SessionError);
client_shutdown!(SessionClient => SessionRequest, Error = SessionError);
