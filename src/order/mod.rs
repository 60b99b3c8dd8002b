pub mod dispatcher;
pub mod error;
pub mod ports;
pub mod simulated;
pub mod types;
pub mod webhook;

pub use dispatcher::OrderDispatcher;
pub use error::{OrderError, OrderErrorKind};
pub use ports::{OrderBackend, OrderRequest};
pub use types::{
    ContactDetails, OrderBackendConfig, OrderConfig, PlacementOutcome, Platform, SimulationReason,
};
