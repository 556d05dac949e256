use tracing::{debug, error, info, instrument, warn};

use super::accounts::AccountDirectory;
use crate::domain::{Actor, ActorCreate, ActorPatch, Redirect};
use crate::error::{SessionError, StoreError};
use crate::guard::{self, GuardDecision};
use crate::store::IdentityStore;

/// Successful sign-in, sign-up or profile completion.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub actor: Actor,
    pub redirect: Redirect,
    pub notice: &'static str,
}

/// What the view layer needs to know about the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub current_actor: Option<Actor>,
    pub loading: bool,
}

/// Owns the current actor and keeps it in step with the identity store.
///
/// Every mutating operation persists the full actor record before returning.
/// When persisting fails the in-memory state is left as it was.
pub struct SessionManager {
    store: IdentityStore,
    accounts: AccountDirectory,
    current: Option<Actor>,
    loading: bool,
}

impl SessionManager {
    pub fn new(store: IdentityStore, accounts: AccountDirectory) -> Self {
        Self {
            store,
            accounts,
            current: None,
            loading: true,
        }
    }

    #[cfg(test)]
    pub fn current_actor(&self) -> Option<&Actor> {
        self.current.as_ref()
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_actor: self.current.clone(),
            loading: self.loading,
        }
    }

    /// Restores the persisted session. A payload that fails to decode is
    /// treated as absent and removed from the store.
    #[instrument(skip(self))]
    pub fn check_auth(&mut self) -> bool {
        self.current = match self.store.load() {
            Ok(actor) => actor,
            Err(StoreError::CorruptSessionData(reason)) => {
                warn!(%reason, "Stored session is corrupt, clearing it");
                if let Err(e) = self.store.clear() {
                    error!(error = %e, "Failed to clear corrupt session");
                }
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to read stored session");
                None
            }
        };
        self.loading = false;

        match &self.current {
            Some(actor) => info!(actor_id = %actor.id, role = %actor.role, "Session restored"),
            None => debug!("No session to restore"),
        }
        self.current.is_some()
    }

    /// Mock authentication: the email must belong to a known account and the
    /// password must not be blank. The password is not otherwise checked.
    #[instrument(skip(self, password))]
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<AuthOutcome, SessionError> {
        debug!("Processing sign_in request");

        if password.trim().is_empty() {
            warn!("Sign-in rejected: empty password");
            return Err(SessionError::InvalidCredentials);
        }
        let Some(actor) = self.accounts.find_by_email(email).cloned() else {
            warn!("Sign-in rejected: unknown email");
            return Err(SessionError::InvalidCredentials);
        };

        self.store.save(&actor)?;
        let redirect = actor.landing();
        info!(actor_id = %actor.id, role = %actor.role, %redirect, "Login successful");
        self.current = Some(actor.clone());

        Ok(AuthOutcome {
            actor,
            redirect,
            notice: "Login successful",
        })
    }

    /// Registers a new account and signs it in, discarding any previously
    /// persisted identity first.
    #[instrument(fields(email = %params.email, role = %params.role), skip(self, params))]
    pub fn sign_up(&mut self, params: ActorCreate) -> Result<AuthOutcome, SessionError> {
        debug!("Processing sign_up request");

        let required = [("name", &params.name), ("email", &params.email), ("password", &params.password)];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            warn!(field, "Sign-up rejected: missing field");
            return Err(SessionError::MalformedInput(format!("{} is required", field)));
        }

        self.store.clear()?;
        self.current = None;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let actor = Actor::register(id, params.name.trim(), params.email.trim(), params.role);
        self.store.save(&actor)?;
        self.accounts.register(actor.clone());

        let redirect = actor.landing();
        info!(actor_id = %actor.id, %redirect, "Registration successful");
        self.current = Some(actor.clone());

        Ok(AuthOutcome {
            actor,
            redirect,
            notice: "Registration successful",
        })
    }

    #[instrument(skip(self))]
    pub fn sign_out(&mut self) -> Result<Redirect, SessionError> {
        debug!("Processing sign_out request");
        self.store.clear()?;
        if let Some(actor) = self.current.take() {
            info!(actor_id = %actor.id, "Logged out successfully");
        }
        Ok(Redirect::Login)
    }

    /// Merges `patch` into the current actor and persists the result. An email
    /// that belongs to another account is rejected.
    #[instrument(skip(self, patch))]
    pub fn update_profile(&mut self, patch: ActorPatch) -> Result<Actor, SessionError> {
        debug!("Processing update_profile request");

        let Some(current) = self.current.as_ref() else {
            warn!("Profile update rejected: no active session");
            return Err(SessionError::NoActiveSession);
        };

        let mut updated = current.clone();
        updated.apply_patch(patch);
        if let Some(owner) = self.accounts.find_by_email(&updated.email) {
            if owner.id != updated.id {
                warn!(actor_id = %updated.id, "Profile update rejected: email belongs to another account");
                return Err(SessionError::MalformedInput("email already registered".to_string()));
            }
        }
        self.store.save(&updated)?;
        self.accounts.update(&updated);

        info!(actor_id = %updated.id, profile_complete = updated.profile_complete, "Profile updated successfully");
        self.current = Some(updated.clone());
        Ok(updated)
    }

    /// Saves the worker profile form and marks the profile complete.
    #[instrument(skip(self, patch))]
    pub fn complete_profile(&mut self, patch: ActorPatch) -> Result<AuthOutcome, SessionError> {
        let actor = self.update_profile(ActorPatch {
            profile_complete: Some(true),
            ..patch
        })?;
        let redirect = actor.landing();
        Ok(AuthOutcome {
            actor,
            redirect,
            notice: "Profile updated successfully",
        })
    }

    /// Runs the route guard against the current actor.
    pub fn authorize(&self, path: &str) -> GuardDecision {
        guard::evaluate(path, self.current.as_ref())
    }
}
