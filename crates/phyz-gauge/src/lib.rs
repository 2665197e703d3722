//! Discrete lattice gauge theory with Metropolis sampling.
//!
//! Implements Z_N-type lattice gauge simulations with:
//! - Finite gauge groups given by multiplication tables (Z_N, Klein, Q_8, custom)
//! - Wilson plaquette action with delta, U(1)-cosine or custom weights
//! - Periodic D-dimensional lattices with precomputed plaquette tables
//! - Single-link Metropolis updates and full-lattice sweeps
//! - Observables: energy per plaquette, its fluctuations, hysteresis scans
//!
//! # Example
//!
//! ```
//! use phyz_gauge::{Action, FiniteGroup, GaugeField, InitPolicy};
//!
//! // Create a Z_2 field on a 4^3 lattice
//! let mut field = GaugeField::seeded(
//!     &[4, 4, 4],
//!     FiniteGroup::cyclic(2).unwrap(),
//!     Action::delta(),
//!     0.8,
//!     InitPolicy::Random,
//!     1,
//! )
//! .unwrap();
//!
//! // Thermalize
//! field.sweep(50);
//!
//! // Measure
//! let stats = field.stats(20, 2).unwrap();
//! println!("⟨E⟩ = {:.4} ± {:.4}", stats.mean, stats.std);
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod field;
pub mod group;
pub mod lattice;
pub mod metropolis;
pub mod observables;

pub use action::{Action, ActionKind};
pub use config::{GroupSpec, SimulationConfig};
pub use error::{GaugeError, Result};
pub use field::{GaugeField, InitPolicy};
pub use group::FiniteGroup;
pub use lattice::{Lattice, Sign};
pub use metropolis::{AcceptanceRule, MetropolisState, metropolis};
pub use observables::{BetaSchedule, EnergyStats, HysteresisParams, HysteresisScan, Status};
