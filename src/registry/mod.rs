//! In-memory collection of service requests.
//!
//! The registry is the only owner of the records. Callers get clones and
//! mutate only through [`ServiceRegistry::apply`], which commits the whole
//! transition or nothing.

use tracing::{debug, info, instrument, warn};

use crate::domain::{
    Actor, ServiceEvent, ServiceRequest, ServiceRequestCreate, ServiceStatus, Transition,
};
use crate::error::RegistryError;

/// Requests grouped the way the dashboards show them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub open: Vec<ServiceRequest>,
    pub active: Vec<ServiceRequest>,
    pub completed: Vec<ServiceRequest>,
}

impl Dashboard {
    /// (open, active, completed)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.open.len(), self.active.len(), self.completed.len())
    }
}

/// Outcome of an applied event: the record after the change (`None` when it
/// was removed) and the confirmation text for the actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub request: Option<ServiceRequest>,
    pub notice: &'static str,
}

#[derive(Debug, Default)]
pub struct ServiceRegistry {
    requests: Vec<ServiceRequest>,
    next_id: u64,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[instrument(fields(customer_id = %customer.id, title = %params.title), skip(self, customer, params))]
    pub fn create(&mut self, customer: &Actor, params: ServiceRequestCreate) -> Result<ServiceRequest, RegistryError> {
        debug!("Processing create_request");

        let id = format!("request_{}", self.next_id);
        let request = ServiceRequest::open(id, customer, params).inspect_err(|e| {
            warn!(error = %e, "Service request rejected");
        })?;
        self.next_id += 1;
        self.requests.push(request.clone());

        info!(request_id = %request.id, "Service request submitted successfully");
        Ok(request)
    }

    #[instrument(fields(request_id = %id, actor_id = %actor.id, %event), skip(self, actor))]
    pub fn apply(&mut self, id: &str, actor: &Actor, event: ServiceEvent) -> Result<Applied, RegistryError> {
        debug!("Processing transition");

        let Some(index) = self.requests.iter().position(|r| r.id == id) else {
            warn!("Service request not found");
            return Err(RegistryError::NotFound(id.to_string()));
        };

        let transition = self.requests[index].apply(actor, event).inspect_err(|e| {
            warn!(error = %e, "Transition rejected");
        })?;

        let request = match transition {
            Transition::Updated(next) => {
                self.requests[index] = next.clone();
                Some(next)
            }
            Transition::Removed => {
                self.requests.remove(index);
                None
            }
        };

        info!("{}", event.notice());
        Ok(Applied {
            request,
            notice: event.notice(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&ServiceRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// All requests in `status`, in insertion order.
    pub fn by_status(&self, status: ServiceStatus) -> Vec<ServiceRequest> {
        self.requests.iter().filter(|r| r.status == status).cloned().collect()
    }

    /// Requests `actor` should see, in insertion order.
    pub fn visible_to(&self, actor: &Actor) -> Vec<ServiceRequest> {
        self.requests.iter().filter(|r| r.is_visible_to(actor)).cloned().collect()
    }

    pub fn dashboard(&self, actor: &Actor) -> Dashboard {
        let mut dashboard = Dashboard::default();
        for request in self.requests.iter().filter(|r| r.is_visible_to(actor)) {
            let column = match request.status {
                ServiceStatus::Open => &mut dashboard.open,
                ServiceStatus::InProgress => &mut dashboard.active,
                ServiceStatus::Completed => &mut dashboard.completed,
            };
            column.push(request.clone());
        }
        dashboard
    }

    pub fn snapshot(&self) -> Vec<ServiceRequest> {
        self.requests.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn customer(id: &str) -> Actor {
        Actor::register(id, "Customer", format!("{}@example.com", id), Role::Customer)
    }

    fn worker(id: &str) -> Actor {
        let mut worker = Actor::register(id, "Worker", format!("{}@example.com", id), Role::Worker);
        worker.profile_complete = true;
        worker
    }

    fn params(title: &str, category: &str) -> ServiceRequestCreate {
        ServiceRequestCreate {
            title: title.into(),
            description: "details".into(),
            category: category.into(),
            location: "Queens, NY".into(),
            date: "2023-05-28".into(),
        }
    }

    fn seeded() -> (ServiceRegistry, Actor, Actor) {
        let c1 = customer("c1");
        let w1 = worker("w1");
        let mut registry = ServiceRegistry::new();
        registry.create(&c1, params("Fix faucet", "Plumbing")).unwrap();
        registry.create(&c1, params("Paint walls", "Painting")).unwrap();
        registry.create(&c1, params("Replace light", "Electrical")).unwrap();
        (registry, c1, w1)
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let (registry, c1, _) = seeded();
        let ids: Vec<_> = registry.snapshot().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["request_1", "request_2", "request_3"]);
        assert!(registry.snapshot().iter().all(|r| r.customer_id == c1.id && r.worker_id.is_none()));
    }

    #[test]
    fn test_rejected_create_does_not_consume_an_id() {
        let (mut registry, c1, w1) = seeded();
        assert!(registry.create(&w1, params("Mount TV", "Mounting & Installation")).is_err());
        assert!(registry.create(&c1, params("", "Cleaning")).is_err());

        let created = registry.create(&c1, params("Mount TV", "Mounting & Installation")).unwrap();
        assert_eq!(created.id, "request_4");
    }

    #[test]
    fn test_rejected_accept_leaves_registry_unchanged() {
        let (mut registry, _, w1) = seeded();
        registry.apply("request_2", &w1, ServiceEvent::Accept).unwrap();
        registry.apply("request_2", &w1, ServiceEvent::Complete).unwrap();
        let before = registry.snapshot();

        let w2 = worker("w2");
        let err = registry.apply("request_2", &w2, ServiceEvent::Accept).unwrap_err();

        assert!(matches!(err, RegistryError::InvalidTransition { .. }));
        assert_eq!(registry.snapshot(), before);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let (mut registry, c1, _) = seeded();
        assert_eq!(
            registry.apply("request_9", &c1, ServiceEvent::Cancel),
            Err(RegistryError::NotFound("request_9".into()))
        );
    }

    #[test]
    fn test_cancel_removes_and_keeps_order() {
        let (mut registry, c1, _) = seeded();
        let applied = registry.apply("request_2", &c1, ServiceEvent::Cancel).unwrap();

        assert_eq!(applied.request, None);
        assert_eq!(applied.notice, "Service request cancelled");
        let titles: Vec<_> = registry.by_status(ServiceStatus::Open).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, ["Fix faucet", "Replace light"]);
    }

    #[test]
    fn test_by_status_is_insertion_ordered() {
        let (mut registry, _, w1) = seeded();
        registry.apply("request_3", &w1, ServiceEvent::Accept).unwrap();
        registry.apply("request_1", &w1, ServiceEvent::Accept).unwrap();

        let ids: Vec<_> = registry
            .by_status(ServiceStatus::InProgress)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["request_1", "request_3"]);
    }

    #[test]
    fn test_dashboards_per_actor() {
        let (mut registry, c1, w1) = seeded();
        let w2 = worker("w2");
        let c2 = customer("c2");
        registry.create(&c2, params("Mow lawn", "Landscaping")).unwrap();

        registry.apply("request_1", &w1, ServiceEvent::Accept).unwrap();
        registry.apply("request_2", &w1, ServiceEvent::Pass).unwrap();
        registry.apply("request_1", &w1, ServiceEvent::Complete).unwrap();

        assert_eq!(registry.dashboard(&c1).counts(), (2, 0, 1));
        assert_eq!(registry.dashboard(&c2).counts(), (1, 0, 0));
        // w1 passed on request_2
        assert_eq!(registry.dashboard(&w1).counts(), (2, 0, 1));
        assert_eq!(registry.dashboard(&w2).counts(), (3, 0, 0));
        assert_eq!(registry.visible_to(&w2).len(), 3);
    }
}
