//! Deployment module

pub mod deployer;
pub mod error;
pub mod events;
pub mod poller;
pub mod request;
pub mod result;

pub use deployer::Deployer;
pub use error::DeployError;
pub use events::{DeployEvent, DeployEventSink, NoopEventSink, TracingEventSink};
pub use request::DeployRequest;
pub use result::{DeployResult, DeployStatus};
