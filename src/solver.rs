//! Partitioned direct stiffness solver.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::assembly::assemble;
use crate::config::SolverConfig;
use crate::errors::TrussError;
use crate::geometry::{Displacement, Force};
use crate::member::{Member, MemberResponse};
use crate::node::{global_dof, Axis, BoundaryValue, Node};
use crate::partition::Partition;

/// Linear elastic solver for a planar truss.
///
/// The global stiffness matrix is assembled once on construction. A call to
/// [`TrussSolver::partition`] fixes the boundary-condition set and caches the
/// inverse of `Kcc`; any number of [`TrussSolver::solve`] calls can then reuse it.
#[derive(Clone, Debug)]
pub struct TrussSolver {
    /// Node arena indexed by id.
    nodes: Vec<Node>,
    /// Members referencing nodes by id.
    members: Vec<Member>,
    /// Assembled `2N x 2N` stiffness matrix.
    system_matrix: DMatrix<f64>,
    /// Blocks for the current boundary-condition set.
    partition: Option<Partition>,
    /// Tolerances.
    config: SolverConfig,
}

impl TrussSolver {
    /// Build a solver with the default [`SolverConfig`] and assemble the system.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::NodeIdMismatch`] when node ids do not match their
    /// position in `nodes` and [`TrussError::UnknownNode`] when a member refers
    /// to a node outside `nodes`. Each member is re-derived from `nodes`: ends
    /// that coincide there give [`TrussError::DegenerateGeometry`], and any
    /// other difference from the member's cached geometry gives
    /// [`TrussError::GeometryMismatch`].
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{Member, Node, TrussSolver};
    ///
    /// let nodes = vec![Node::new(0, "a", 0.0, 0.0), Node::new(1, "b", 1.0, 0.0)];
    /// let bar = Member::new(0, "ab", &nodes[0], &nodes[1], 10.0)?;
    /// let solver = TrussSolver::new(nodes, vec![bar])?;
    /// assert_eq!(solver.system_matrix().shape(), (4, 4));
    /// # Ok::<(), planar_truss::TrussError>(())
    /// ```
    pub fn new(nodes: Vec<Node>, members: Vec<Member>) -> Result<Self, TrussError> {
        Self::with_config(nodes, members, SolverConfig::default())
    }

    /// Build a solver with explicit tolerances.
    ///
    /// # Errors
    ///
    /// See [`TrussSolver::new`].
    pub fn with_config(
        nodes: Vec<Node>,
        members: Vec<Member>,
        config: SolverConfig,
    ) -> Result<Self, TrussError> {
        for (index, node) in nodes.iter().enumerate() {
            if node.id != index {
                return Err(TrussError::NodeIdMismatch { index, id: node.id });
            }
        }
        for member in &members {
            for node in [member.start(), member.end()] {
                if node >= nodes.len() {
                    return Err(TrussError::UnknownNode {
                        member: member.id(),
                        node,
                    });
                }
            }
            // geometry is cached at construction; it must come from these nodes
            let rebuilt = Member::new(
                member.id(),
                member.name(),
                &nodes[member.start()],
                &nodes[member.end()],
                member.stiffness(),
            )?;
            if rebuilt != *member {
                return Err(TrussError::GeometryMismatch {
                    member: member.id(),
                    start: member.start(),
                    end: member.end(),
                });
            }
        }
        let system_matrix = assemble(nodes.len(), &members);
        Ok(Self {
            nodes,
            members,
            system_matrix,
            partition: None,
            config,
        })
    }

    /// Nodes in id order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Members in the order they were supplied.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// The assembled global stiffness matrix.
    #[must_use]
    pub fn system_matrix(&self) -> &DMatrix<f64> {
        &self.system_matrix
    }

    /// Active tolerances.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Blocks for the current boundary-condition set, if one has been applied.
    #[must_use]
    pub fn current_partition(&self) -> Option<&Partition> {
        self.partition.as_ref()
    }

    /// Split the system for a new boundary-condition set.
    ///
    /// Any previous partition is discarded first, so a failure here leaves the
    /// solver without one. With `invert_now` the `Kcc` inverse is computed and
    /// cached immediately.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::PartitionMismatch`] when the sets do not cover each
    /// degree of freedom exactly once and [`TrussError::SingularConstraintBlock`]
    /// when `invert_now` is set and `Kcc` is singular.
    pub fn partition(
        &mut self,
        known_displacements: &[BoundaryValue],
        known_forces: &[BoundaryValue],
        invert_now: bool,
    ) -> Result<&Partition, TrussError> {
        self.partition = None;
        let mut partition = Partition::new(&self.system_matrix, known_displacements, known_forces)?;
        if invert_now {
            partition.invert(self.config.singularity_tolerance)?;
        }
        Ok(&*self.partition.insert(partition))
    }

    /// Invert `Kcc` for a partition created without `invert_now`.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::UninitializedSolve`] when no partition exists and
    /// [`TrussError::SingularConstraintBlock`] when `Kcc` is singular.
    pub fn invert_constraint_block(&mut self) -> Result<&DMatrix<f64>, TrussError> {
        let tolerance = self.config.singularity_tolerance;
        self.partition
            .as_mut()
            .ok_or(TrussError::UninitializedSolve)?
            .invert(tolerance)
    }

    /// Solve for unknown displacements and reactions.
    ///
    /// `fa` holds the expected reactions at the known-displacement degrees of
    /// freedom, ordered like [`Partition::id0`]. It only feeds the residual
    /// `fr = f0 - fa`.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::UninitializedSolve`] when no inverted partition is
    /// cached and [`TrussError::ReactionLengthMismatch`] when `fa` has the wrong
    /// length.
    pub fn solve(&self, fa: &DVector<f64>) -> Result<Solution, TrussError> {
        let partition = self
            .partition
            .as_ref()
            .ok_or(TrussError::UninitializedSolve)?;
        let kcc_inv = partition
            .kcc_inverse()
            .ok_or(TrussError::UninitializedSolve)?;
        let id0 = partition.id0();
        let idc = partition.idc();
        if fa.len() != id0.len() {
            return Err(TrussError::ReactionLengthMismatch {
                expected: id0.len(),
                actual: fa.len(),
            });
        }

        let d0 = partition.d0();
        let fc = partition.fc();
        let dc = kcc_inv * (fc - partition.kco() * d0);
        let f0 = partition.koc() * &dc + partition.koo() * d0;
        let fr = &f0 - fa;

        let dof = self.system_matrix.nrows();
        let mut displacements = DVector::zeros(dof);
        let mut forces = DVector::zeros(dof);
        for (k, &i) in id0.iter().enumerate() {
            displacements[i] = d0[k];
            forces[i] = f0[k];
        }
        for (k, &i) in idc.iter().enumerate() {
            displacements[i] = dc[k];
            forces[i] = fc[k];
        }

        let mut resultant_forces = vec![Force::default(); self.nodes.len()];
        let mut members = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let response = member.compute_stretch_and_force(&displacements, &mut resultant_forces);
            log::trace!(
                "member {} ({}): stretch {:.6e}, stress {:.6e}",
                member.id(),
                member.name(),
                response.stretch,
                response.stress
            );
            members.push(response);
        }

        let solution = Solution {
            dc,
            f0,
            fr,
            displacements,
            forces,
            members,
            resultant_forces,
        };
        log::info!(
            "solved {} unknown displacements and {} reactions",
            idc.len(),
            id0.len()
        );
        if self.config.check_statics {
            let residual = solution.equilibrium_residual();
            if residual > self.config.statics_tolerance {
                log::warn!(
                    "nodal resultants differ from the force vector by {residual:.3e} (tolerance {:.3e})",
                    self.config.statics_tolerance
                );
            }
        }
        Ok(solution)
    }
}

/// Output of one [`TrussSolver::solve`] call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Unknown displacements at the known-force degrees of freedom, ordered like `idc`.
    dc: DVector<f64>,
    /// Reactions at the known-displacement degrees of freedom, ordered like `id0`.
    f0: DVector<f64>,
    /// Difference between `f0` and the expected reactions.
    fr: DVector<f64>,
    /// Full displacement vector in global degree-of-freedom order.
    displacements: DVector<f64>,
    /// Full force vector in global degree-of-freedom order.
    forces: DVector<f64>,
    /// One response per member, in member order.
    members: Vec<MemberResponse>,
    /// Sum of member forces at each node, indexed by node id.
    resultant_forces: Vec<Force>,
}

impl Solution {
    /// Unknown displacements, ordered like [`Partition::idc`].
    #[must_use]
    pub fn dc(&self) -> &DVector<f64> {
        &self.dc
    }

    /// Reactions, ordered like [`Partition::id0`].
    #[must_use]
    pub fn f0(&self) -> &DVector<f64> {
        &self.f0
    }

    /// Reaction residual `f0 - fa`.
    #[must_use]
    pub fn fr(&self) -> &DVector<f64> {
        &self.fr
    }

    /// Full displacement vector of length `2N`.
    #[must_use]
    pub fn displacements(&self) -> &DVector<f64> {
        &self.displacements
    }

    /// Full force vector of length `2N`.
    #[must_use]
    pub fn forces(&self) -> &DVector<f64> {
        &self.forces
    }

    /// Member responses in member order.
    #[must_use]
    pub fn members(&self) -> &[MemberResponse] {
        &self.members
    }

    /// Response of the member at position `index`.
    #[must_use]
    pub fn member(&self, index: usize) -> Option<&MemberResponse> {
        self.members.get(index)
    }

    /// Resultant of member forces acting on node `node`.
    #[must_use]
    pub fn resultant_force(&self, node: usize) -> Option<Force> {
        self.resultant_forces.get(node).copied()
    }

    /// Resultant forces for every node, indexed by id.
    #[must_use]
    pub fn resultant_forces(&self) -> &[Force] {
        &self.resultant_forces
    }

    /// Displacement of node `node`.
    #[must_use]
    pub fn node_displacement(&self, node: usize) -> Option<Displacement> {
        (node < self.resultant_forces.len()).then(|| {
            Displacement::new(
                self.displacements[global_dof(node, Axis::X)],
                self.displacements[global_dof(node, Axis::Y)],
            )
        })
    }

    /// Applied or reaction force at node `node`.
    #[must_use]
    pub fn node_force(&self, node: usize) -> Option<Force> {
        (node < self.resultant_forces.len()).then(|| {
            Force::new(
                self.forces[global_dof(node, Axis::X)],
                self.forces[global_dof(node, Axis::Y)],
            )
        })
    }

    /// Largest absolute gap between a nodal resultant and the force vector.
    #[must_use]
    pub fn equilibrium_residual(&self) -> f64 {
        self.resultant_forces
            .iter()
            .enumerate()
            .flat_map(|(node, resultant)| {
                [
                    resultant.x - self.forces[global_dof(node, Axis::X)],
                    resultant.y - self.forces[global_dof(node, Axis::Y)],
                ]
            })
            .fold(0.0, |worst: f64, gap| worst.max(gap.abs()))
    }

    /// Consume the solution, keeping `(dc, f0, fr)`.
    #[must_use]
    pub fn into_parts(self) -> (DVector<f64>, DVector<f64>, DVector<f64>) {
        (self.dc, self.f0, self.fr)
    }
}
