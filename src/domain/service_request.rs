//! Service request lifecycle.
//!
//! ```text
//!  create (customer)
//!        │
//!        ▼
//!     [Open] ──accept (worker)──→ [InProgress] ──complete (assigned worker)──→ [Completed]
//!      │  │
//!      │  └── pass (worker) ──→ [Open], hidden from that worker only
//!      │
//!      └── cancel (owning customer) ──→ removed
//! ```
//!
//! [`ServiceRequest::apply`] is pure: it never touches `self` and returns the
//! record that should replace it, so a rejected event leaves nothing half-applied.

use std::collections::BTreeSet;

use crate::domain::actor::{Actor, ActorId, Role};
use crate::error::RegistryError;

/// Categories offered by the request form.
pub const SERVICE_CATEGORIES: [&str; 8] = [
    "Plumbing",
    "Electrical",
    "Cleaning",
    "Painting",
    "Carpentry",
    "Appliance Repair",
    "Landscaping",
    "Mounting & Installation",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    /// Created by a customer and awaiting a worker. Customers see it as
    /// "Pending", workers as "Available".
    Open,
    InProgress,
    Completed,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Open => "open",
            ServiceStatus::InProgress => "in-progress",
            ServiceStatus::Completed => "completed",
        }
    }

    pub fn label(&self, viewer: Role) -> &'static str {
        match (self, viewer) {
            (ServiceStatus::Open, Role::Customer) => "Pending",
            (ServiceStatus::Open, Role::Worker) => "Available",
            (ServiceStatus::InProgress, _) => "In Progress",
            (ServiceStatus::Completed, _) => "Completed",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceEvent {
    Cancel,
    Accept,
    Pass,
    Complete,
}

impl ServiceEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceEvent::Cancel => "cancel",
            ServiceEvent::Accept => "accept",
            ServiceEvent::Pass => "pass",
            ServiceEvent::Complete => "complete",
        }
    }

    /// Confirmation shown to the actor after the event is applied.
    pub fn notice(&self) -> &'static str {
        match self {
            ServiceEvent::Cancel => "Service request cancelled",
            ServiceEvent::Accept => "Service accepted",
            ServiceEvent::Pass => "Service request passed",
            ServiceEvent::Complete => "Service marked as complete",
        }
    }
}

impl std::fmt::Display for ServiceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub date: String,
    pub status: ServiceStatus,
    pub customer_id: ActorId,
    pub worker_id: Option<ActorId>,
    /// Workers who passed on this request; it stays open for everyone else.
    pub declined_by: BTreeSet<ActorId>,
}

/// Payload for submitting a new service request.
#[derive(Debug, Clone)]
pub struct ServiceRequestCreate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub date: String,
}

/// Result of applying an event to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Updated(ServiceRequest),
    Removed,
}

impl ServiceRequestCreate {
    pub fn validate(&self) -> Result<(), RegistryError> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("category", &self.category),
            ("location", &self.location),
            ("date", &self.date),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(RegistryError::MalformedInput(format!("{} is required", field)));
        }
        if !SERVICE_CATEGORIES.contains(&self.category.as_str()) {
            return Err(RegistryError::MalformedInput(format!(
                "unknown category: {}",
                self.category
            )));
        }
        Ok(())
    }
}

impl ServiceRequest {
    /// Creates an open request owned by `customer`.
    pub fn open(id: impl Into<String>, customer: &Actor, params: ServiceRequestCreate) -> Result<Self, RegistryError> {
        let id = id.into();
        if !customer.is_customer() {
            return Err(RegistryError::InvalidTransition {
                id,
                status: "new".to_string(),
                event: "create".to_string(),
            });
        }
        params.validate()?;

        Ok(Self {
            id,
            title: params.title,
            description: params.description,
            category: params.category,
            location: params.location,
            date: params.date,
            status: ServiceStatus::Open,
            customer_id: customer.id.clone(),
            worker_id: None,
            declined_by: BTreeSet::new(),
        })
    }

    pub fn is_assigned_to(&self, worker_id: &str) -> bool {
        self.worker_id.as_deref() == Some(worker_id)
    }

    /// Whether `actor` should see this request on their dashboard.
    pub fn is_visible_to(&self, actor: &Actor) -> bool {
        match actor.role {
            Role::Customer => self.customer_id == actor.id,
            Role::Worker => match self.status {
                ServiceStatus::Open => !self.declined_by.contains(&actor.id),
                ServiceStatus::InProgress | ServiceStatus::Completed => self.is_assigned_to(&actor.id),
            },
        }
    }

    /// Events `actor` may trigger on this request right now.
    pub fn allowed_events(&self, actor: &Actor) -> Vec<ServiceEvent> {
        [
            ServiceEvent::Cancel,
            ServiceEvent::Accept,
            ServiceEvent::Pass,
            ServiceEvent::Complete,
        ]
        .into_iter()
        .filter(|event| self.apply(actor, *event).is_ok())
        .collect()
    }

    /// The transition function. Returns the replacement record, or
    /// `InvalidTransition` when the role, ownership or source state is wrong.
    pub fn apply(&self, actor: &Actor, event: ServiceEvent) -> Result<Transition, RegistryError> {
        let permitted = match event {
            ServiceEvent::Cancel => {
                actor.is_customer() && self.customer_id == actor.id && self.status == ServiceStatus::Open
            }
            ServiceEvent::Accept | ServiceEvent::Pass => {
                actor.is_worker()
                    && self.status == ServiceStatus::Open
                    && !self.declined_by.contains(&actor.id)
            }
            ServiceEvent::Complete => {
                actor.is_worker() && self.status == ServiceStatus::InProgress && self.is_assigned_to(&actor.id)
            }
        };
        if !permitted {
            return Err(self.rejected(event));
        }

        let transition = match event {
            ServiceEvent::Cancel => Transition::Removed,
            ServiceEvent::Accept => {
                let mut next = self.clone();
                next.status = ServiceStatus::InProgress;
                next.worker_id = Some(actor.id.clone());
                Transition::Updated(next)
            }
            ServiceEvent::Pass => {
                let mut next = self.clone();
                next.declined_by.insert(actor.id.clone());
                Transition::Updated(next)
            }
            ServiceEvent::Complete => {
                let mut next = self.clone();
                next.status = ServiceStatus::Completed;
                Transition::Updated(next)
            }
        };
        Ok(transition)
    }

    fn rejected(&self, event: ServiceEvent) -> RegistryError {
        RegistryError::InvalidTransition {
            id: self.id.clone(),
            status: self.status.to_string(),
            event: event.to_string(),
        }
    }
}
