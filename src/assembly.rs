//! Global stiffness matrix assembly.

use nalgebra::DMatrix;

use crate::member::Member;
use crate::node::DOF_PER_NODE;

/// Assemble the `2N x 2N` global stiffness matrix for `node_count` nodes.
///
/// Each member's local stiffness is scattered into the rows and columns of its
/// four degrees of freedom with `+=`, so members sharing a node accumulate.
///
/// # Panics
///
/// Panics if a member references a node id `>= node_count`.
#[must_use]
pub fn assemble(node_count: usize, members: &[Member]) -> DMatrix<f64> {
    let dof = node_count * DOF_PER_NODE;
    let mut matrix = DMatrix::zeros(dof, dof);
    for member in members {
        let local = member.local_stiffness();
        let dof_map = member.dofs();
        for (row_local, global_row) in dof_map.iter().enumerate() {
            for (col_local, global_col) in dof_map.iter().enumerate() {
                matrix[(*global_row, *global_col)] += local[(row_local, col_local)];
            }
        }
    }
    log::debug!(
        "assembled {dof}x{dof} stiffness matrix from {} members",
        members.len()
    );
    matrix
}
