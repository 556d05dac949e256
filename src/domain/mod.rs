pub mod actor;
pub mod route;
pub mod service_request;

pub use actor::*;
pub use route::*;
pub use service_request::*;
