//! Cloneable handles to the services. Thin wrappers around message channels
//! with macro-generated, traced methods.

#[macro_use]
mod macros;
mod registry_client;
mod session_client;

pub use registry_client::RegistryClient;
pub use session_client::SessionClient;
