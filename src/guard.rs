//! Route guard: decides, before a destination renders, whether the current
//! actor may view it.
//!
//! Rules, in order:
//! 1. A worker with an incomplete profile can only reach `/worker-profile`.
//! 2. Signed out + route needs an account: go to `/login`.
//! 3. Signed in + login/registration form: go to the actor's home route.
//! 4. Signed in + route reserved for the other role: go to the actor's home route.
//! 5. Otherwise allow.

use tracing::debug;

use crate::domain::{Access, Actor, Redirect, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow(Route),
    Redirect(Redirect),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }

    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            GuardDecision::Allow(_) => None,
            GuardDecision::Redirect(target) => Some(*target),
        }
    }
}

pub fn evaluate(path: &str, actor: Option<&Actor>) -> GuardDecision {
    let route = Route::parse(path);
    let decision = decide(route, actor);
    debug!(path, ?decision, "Route guard evaluated");
    decision
}

fn decide(route: Route, actor: Option<&Actor>) -> GuardDecision {
    let access = route.access();

    let Some(actor) = actor else {
        return match access {
            Access::Public | Access::PublicOnly => GuardDecision::Allow(route),
            Access::Authenticated | Access::Only(_) => GuardDecision::Redirect(Redirect::Login),
        };
    };

    if actor.needs_profile() {
        return match route {
            Route::WorkerProfile => GuardDecision::Allow(route),
            _ => GuardDecision::Redirect(Redirect::WorkerProfile),
        };
    }

    match access {
        Access::Public | Access::Authenticated => GuardDecision::Allow(route),
        Access::PublicOnly => GuardDecision::Redirect(actor.role.home()),
        Access::Only(role) if role == actor.role => GuardDecision::Allow(route),
        Access::Only(_) => GuardDecision::Redirect(actor.role.home()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    const ALL_PATHS: [&str; 16] = [
        "/",
        "/index",
        "/login",
        "/register",
        "/user-dashboard",
        "/service-request",
        "/worker-dashboard",
        "/worker-profile",
        "/services-available",
        "/worker-ratings/2",
        "/chat",
        "/chat/7",
        "/service/request_1",
        "/does-not-exist",
        "/worker-profile?step=2",
        "/user-dashboard/",
    ];

    fn customer() -> Actor {
        Actor::register("c1", "Carla", "carla@example.com", Role::Customer)
    }

    fn worker(complete: bool) -> Actor {
        let mut worker = Actor::register("w1", "Walt", "walt@example.com", Role::Worker);
        worker.profile_complete = complete;
        worker
    }

    #[test]
    fn test_signed_out() {
        let login = GuardDecision::Redirect(Redirect::Login);
        assert_eq!(evaluate("/user-dashboard", None), login);
        assert_eq!(evaluate("/worker-profile", None), login);
        assert_eq!(evaluate("/chat/7", None), login);
        assert_eq!(evaluate("/service/request_1", None), login);

        assert!(evaluate("/", None).is_allowed());
        assert!(evaluate("/login", None).is_allowed());
        assert!(evaluate("/register", None).is_allowed());
        assert_eq!(evaluate("/nowhere", None), GuardDecision::Allow(Route::NotFound));
    }

    #[test]
    fn test_incomplete_worker_only_reaches_profile_completion() {
        let worker = worker(false);
        for path in ALL_PATHS {
            let decision = evaluate(path, Some(&worker));
            if Route::parse(path) == Route::WorkerProfile {
                assert_eq!(decision, GuardDecision::Allow(Route::WorkerProfile), "path {}", path);
            } else {
                assert_eq!(decision, GuardDecision::Redirect(Redirect::WorkerProfile), "path {}", path);
            }
        }
    }

    #[test]
    fn test_role_mismatch_goes_home() {
        let customer = customer();
        let worker = worker(true);

        assert_eq!(
            evaluate("/worker-dashboard", Some(&customer)).redirect(),
            Some(Redirect::UserDashboard)
        );
        assert_eq!(
            evaluate("/worker-profile", Some(&customer)).redirect(),
            Some(Redirect::UserDashboard)
        );
        assert_eq!(
            evaluate("/service-request", Some(&worker)).redirect(),
            Some(Redirect::WorkerDashboard)
        );
        assert_eq!(
            evaluate("/user-dashboard", Some(&worker)).redirect(),
            Some(Redirect::WorkerDashboard)
        );
    }

    #[test]
    fn test_signed_in_is_sent_away_from_login_forms() {
        assert_eq!(evaluate("/login", Some(&customer())).redirect(), Some(Redirect::UserDashboard));
        assert_eq!(evaluate("/register", Some(&worker(true))).redirect(), Some(Redirect::WorkerDashboard));
    }

    #[test]
    fn test_allowed_destinations() {
        let customer = customer();
        let worker = worker(true);

        for path in ["/", "/user-dashboard", "/service-request", "/chat", "/service/request_1", "/worker-ratings/2"] {
            assert!(evaluate(path, Some(&customer)).is_allowed(), "customer {}", path);
        }
        for path in ["/", "/worker-dashboard", "/worker-profile", "/services-available", "/chat/3"] {
            assert!(evaluate(path, Some(&worker)).is_allowed(), "worker {}", path);
        }
    }

    #[test]
    fn test_redirect_targets_stay_in_fixed_set() {
        let actors = [None, Some(customer()), Some(worker(true)), Some(worker(false))];
        for actor in &actors {
            for path in ALL_PATHS {
                if let Some(target) = evaluate(path, actor.as_ref()).redirect() {
                    assert!(
                        ["/login", "/worker-profile", "/worker-dashboard", "/user-dashboard"]
                            .contains(&target.path())
                    );
                }
            }
        }
    }
}
