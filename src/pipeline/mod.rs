pub mod cooldown;
pub mod coordinator;
pub mod profile;
pub mod types;
pub mod window;

pub use cooldown::CooldownGate;
pub use coordinator::Coordinator;
pub use profile::ProfileStore;
pub use types::{
    EventReport, PipelineConfig, PipelineState, PipelineStatus, TriggerReport,
};
pub use window::EventWindow;
