//! Error types produced while building or solving a truss system.

use thiserror::Error;

/// Error returned when a truss system cannot be built, partitioned or solved.
#[derive(Debug, Error, PartialEq)]
pub enum TrussError {
    /// Returned when a member's end nodes coincide.
    #[error("member {member} has zero length (nodes {start} and {end} coincide)")]
    DegenerateGeometry {
        /// Identifier of the offending member.
        member: usize,
        /// Start node identifier.
        start: usize,
        /// End node identifier.
        end: usize,
    },
    /// Returned when a member end has a NaN or infinite coordinate.
    #[error("member {member} has a non-finite length (nodes {start} and {end})")]
    NonFiniteGeometry {
        /// Identifier of the offending member.
        member: usize,
        /// Start node identifier.
        start: usize,
        /// End node identifier.
        end: usize,
    },
    /// Returned when a member's geometry differs from the nodes handed to the solver.
    #[error("member {member} was built from nodes that differ from the solver's nodes {start} and {end}")]
    GeometryMismatch {
        /// Identifier of the offending member.
        member: usize,
        /// Start node identifier.
        start: usize,
        /// End node identifier.
        end: usize,
    },
    /// Returned when a member's axial stiffness is not a positive finite number.
    #[error("member {member} has invalid axial stiffness {stiffness}")]
    InvalidStiffness {
        /// Identifier of the offending member.
        member: usize,
        /// Rejected stiffness value.
        stiffness: f64,
    },
    /// Returned when the node list is not the dense arena `0..N-1` in order.
    #[error("node at position {index} carries id {id}; ids must match their position")]
    NodeIdMismatch {
        /// Position of the node in the supplied list.
        index: usize,
        /// Identifier stored on the node.
        id: usize,
    },
    /// Returned when a member references a node that is not part of the system.
    #[error("member {member} references unknown node {node}")]
    UnknownNode {
        /// Identifier of the offending member.
        member: usize,
        /// Identifier of the missing node.
        node: usize,
    },
    /// Returned when the boundary conditions do not partition every degree of freedom.
    #[error("boundary conditions do not partition the degrees of freedom: {0}")]
    PartitionMismatch(#[from] PartitionMismatch),
    /// Returned when the block coupling the known-force degrees of freedom is singular.
    #[error("Kcc block ({size}x{size}) is singular; the structure is under-constrained")]
    SingularConstraintBlock {
        /// Number of rows (and columns) of the singular block.
        size: usize,
    },
    /// Returned when a solve is requested before an inverted partition is available.
    #[error("solve requested before the Kcc block was partitioned and inverted")]
    UninitializedSolve,
    /// Returned when the expected reaction vector has the wrong length.
    #[error("expected {expected} reaction entries, received {actual}")]
    ReactionLengthMismatch {
        /// Number of known-displacement degrees of freedom.
        expected: usize,
        /// Length of the supplied vector.
        actual: usize,
    },
}

/// Reason a pair of boundary-condition sets fails to partition the degrees of freedom.
///
/// Every global degree of freedom must be classified exactly once, either as a
/// known displacement or as a known force.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PartitionMismatch {
    /// A boundary value addresses a degree of freedom beyond the system size.
    #[error("degree of freedom {dof} is out of range (system has {dof_count})")]
    OutOfRange {
        /// Global degree-of-freedom index.
        dof: usize,
        /// Total number of degrees of freedom.
        dof_count: usize,
    },
    /// The same degree of freedom appears twice in one set.
    #[error("degree of freedom {dof} is listed more than once")]
    Duplicate {
        /// Global degree-of-freedom index.
        dof: usize,
    },
    /// The degree of freedom has both a known displacement and a known force.
    #[error("degree of freedom {dof} has both a known displacement and a known force")]
    Overlap {
        /// Global degree-of-freedom index.
        dof: usize,
    },
    /// The degree of freedom has neither a known displacement nor a known force.
    #[error("degree of freedom {dof} is unclassified")]
    Unclassified {
        /// Global degree-of-freedom index.
        dof: usize,
    },
}
