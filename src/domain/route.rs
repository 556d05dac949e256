//! Navigation destinations and the fixed set of redirect targets.

use super::actor::Role;

/// The only paths the guard ever redirects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Redirect {
    Login,
    WorkerProfile,
    WorkerDashboard,
    UserDashboard,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::Login => "/login",
            Redirect::WorkerProfile => "/worker-profile",
            Redirect::WorkerDashboard => "/worker-dashboard",
            Redirect::UserDashboard => "/user-dashboard",
        }
    }
}

impl std::fmt::Display for Redirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Who may view a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Reachable only while signed out (login and registration forms).
    PublicOnly,
    Authenticated,
    Only(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    UserDashboard,
    ServiceRequestForm,
    WorkerDashboard,
    WorkerProfile,
    ServicesAvailable,
    WorkerRatings { worker_id: String },
    Chat { chat_id: Option<String> },
    ServiceDetails { id: String },
    NotFound,
}

impl Route {
    /// Resolves a requested path. Query strings, fragments and a trailing
    /// slash are ignored; anything unrecognized is `NotFound`.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["index"] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["user-dashboard"] => Route::UserDashboard,
            ["service-request"] => Route::ServiceRequestForm,
            ["worker-dashboard"] => Route::WorkerDashboard,
            ["worker-profile"] => Route::WorkerProfile,
            ["services-available"] => Route::ServicesAvailable,
            ["worker-ratings", worker_id] => Route::WorkerRatings {
                worker_id: worker_id.to_string(),
            },
            ["chat"] => Route::Chat { chat_id: None },
            ["chat", chat_id] => Route::Chat {
                chat_id: Some(chat_id.to_string()),
            },
            ["service", id] => Route::ServiceDetails { id: id.to_string() },
            _ => Route::NotFound,
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::NotFound => Access::Public,
            Route::Login | Route::Register => Access::PublicOnly,
            Route::UserDashboard | Route::ServiceRequestForm => Access::Only(Role::Customer),
            Route::WorkerDashboard | Route::WorkerProfile | Route::ServicesAvailable => {
                Access::Only(Role::Worker)
            }
            Route::WorkerRatings { .. } | Route::Chat { .. } | Route::ServiceDetails { .. } => {
                Access::Authenticated
            }
        }
    }
}
