use serde::{Deserialize, Serialize};

use super::route::Redirect;

pub type ActorId = String;

/// Role fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Worker => "worker",
        }
    }

    /// Landing route for a signed-in actor of this role with a complete profile.
    pub fn home(&self) -> Redirect {
        match self {
            Role::Customer => Redirect::UserDashboard,
            Role::Worker => Redirect::WorkerDashboard,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user.
///
/// Serialized in the persisted session record shape (`profileComplete`,
/// `profilePicture`, ...), with absent optional attributes omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub profile_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

/// Payload for registering a new account.
#[derive(Clone)]
pub struct ActorCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl std::fmt::Debug for ActorCreate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorCreate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Partial profile update. `id` and `role` are not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_complete: Option<bool>,
    pub profile_picture: Option<String>,
    pub location: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl Actor {
    /// Builds a freshly registered actor. Workers start with an incomplete profile.
    pub fn register(id: impl Into<ActorId>, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            profile_complete: role == Role::Customer,
            profile_picture: None,
            location: None,
            skills: None,
        }
    }

    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }

    pub fn is_worker(&self) -> bool {
        self.role == Role::Worker
    }

    /// A worker who has not finished profile setup.
    pub fn needs_profile(&self) -> bool {
        self.is_worker() && !self.profile_complete
    }

    /// Where the actor lands after signing in or registering.
    pub fn landing(&self) -> Redirect {
        if self.needs_profile() {
            Redirect::WorkerProfile
        } else {
            self.role.home()
        }
    }

    /// Shallow field overwrite; a patched `skills` list replaces the old one.
    pub fn apply_patch(&mut self, patch: ActorPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(profile_complete) = patch.profile_complete {
            self.profile_complete = profile_complete;
        }
        if let Some(picture) = patch.profile_picture {
            self.profile_picture = Some(picture);
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(skills) = patch.skills {
            self.skills = Some(skills);
        }
    }
}
