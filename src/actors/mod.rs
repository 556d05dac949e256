//! Long-running services. Each one owns its state and drains a single mailbox.

mod registry_service;
mod session_service;

pub use registry_service::RegistryService;
pub use session_service::SessionService;
