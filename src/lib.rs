pub mod accumulator;
pub mod async_controller;
pub mod block;
pub mod config;
pub mod controller;
pub mod error;
pub mod estimate;
pub mod integrand;
pub mod scheduler;
pub mod worker;

pub use async_controller::estimate_pi_async;
pub use config::RunConfig;
pub use controller::{estimate_pi, Controller, ControllerState};
pub use error::{Error, Result};
pub use estimate::Estimate;
