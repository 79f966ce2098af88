// Core engine exports
pub mod compat;
pub mod engine;
pub mod queue;
pub mod registry;

pub use compat::mutually_compatible;
pub use engine::{Engine, EngineError, EnterOutcome, LeaveOutcome};
pub use queue::WaitQueue;
pub use registry::PairingTable;
