pub mod address;
pub mod check;
pub mod identifier;
pub mod lifecycle;
pub mod orchestrator;
pub mod service;

pub use crate::domain::model::{
    JobSpec, RegistrationReport, ServiceRegistration, TeardownAction, TeardownList,
};
pub use crate::domain::ports::{JobSource, Registry};
pub use crate::utils::error::Result;
