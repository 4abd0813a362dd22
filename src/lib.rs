#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod assembly;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod member;
pub mod node;
pub mod partition;
pub mod solver;

pub use assembly::assemble;
pub use config::SolverConfig;
pub use errors::{PartitionMismatch, TrussError};
pub use geometry::{Displacement, Force, Point};
pub use member::{Member, MemberResponse};
pub use node::{global_dof, Axis, BoundaryValue, Node, DOF_PER_NODE};
pub use partition::Partition;
pub use solver::{Solution, TrussSolver};
