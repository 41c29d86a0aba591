//! HTTP request handlers, one module per resource.

pub mod agencies;
pub mod campaigns;
pub mod clients;
pub mod creators;
pub mod deliverables;
pub mod members;
pub mod metering;
pub mod payments;
pub mod portal;
pub mod projects;
