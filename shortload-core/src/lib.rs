//! Core workload for shortload
//!
//! A run has two phases. Setup provisions a pool of tokens against the
//! target's admin endpoint, one request at a time. Load then hands that pool,
//! frozen behind an `Arc`, to every virtual user; each VU repeatedly samples a
//! token and checks that `GET {base}/{token}` answers with a 307.
//!
//! The handoff between the phases goes through [`PhaseGate`], so no VU can
//! observe the pool before setup has finished building it.

pub mod checks;
pub mod error;
pub mod gate;
pub mod iterate;
pub mod provision;
pub mod runner;
pub mod summary;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types at the crate root
pub use checks::{CheckOutcome, CheckRecorder, CheckSnapshot, CheckStats, STATUS_IS_201, STATUS_IS_307};
pub use error::{Result, WorkloadError};
pub use gate::{GateWaiter, PhaseGate};
pub use iterate::WorkloadIterator;
pub use provision::{provision, ProvisionReport, Provisioner};
pub use runner::LoadRunner;
pub use summary::{RunSummary, SetupSummary};
pub use token::{Token, TokenPool};
