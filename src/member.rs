//! Axial bar members and their stiffness contribution.

use nalgebra::{DVector, Matrix4, RowVector4, Vector2, Vector4};
use serde::{Deserialize, Serialize};

use crate::errors::TrussError;
use crate::geometry::Force;
use crate::node::{global_dof, Axis, Node};

/// A pin-ended bar connecting two nodes.
///
/// Geometry is captured when the member is created; the member refers to its
/// nodes by id only.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    /// Identifier of the member.
    id: usize,
    /// Human readable label.
    name: String,
    /// Id of the start node.
    start: usize,
    /// Id of the end node.
    end: usize,
    /// Axial stiffness `S` (modulus times area).
    stiffness: f64,
    /// Angle of the member axis measured from global X, in radians.
    direction: f64,
    /// Undeformed length.
    length: f64,
    /// Maps start-X, start-Y, end-X, end-Y displacements onto axial elongation.
    length_vector: RowVector4<f64>,
    /// Local stiffness `Dᵗ (S / L) D` in global orientation.
    local_stiffness: Matrix4<f64>,
}

/// Axial response of a member for one solved displacement field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberResponse {
    /// Identifier of the member.
    pub member: usize,
    /// Axial elongation, positive in tension.
    pub stretch: f64,
    /// Axial force `stretch * S / L`, positive in tension.
    pub stress: f64,
    /// Axial force resolved along the member axis.
    pub force: Force,
}

impl Member {
    /// Create a member from `start` to `end` with axial stiffness `stiffness`.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::DegenerateGeometry`] when both ends are the same
    /// node or share a position, [`TrussError::NonFiniteGeometry`] when a
    /// coordinate is NaN or infinite and [`TrussError::InvalidStiffness`] when
    /// `stiffness` is not a positive finite number.
    pub fn new(
        id: usize,
        name: impl Into<String>,
        start: &Node,
        end: &Node,
        stiffness: f64,
    ) -> Result<Self, TrussError> {
        if !stiffness.is_finite() || stiffness <= 0.0 {
            return Err(TrussError::InvalidStiffness {
                member: id,
                stiffness,
            });
        }
        let length = start.position.distance_to(end.position);
        if !length.is_finite() {
            return Err(TrussError::NonFiniteGeometry {
                member: id,
                start: start.id,
                end: end.id,
            });
        }
        if length == 0.0 || start.id == end.id {
            return Err(TrussError::DegenerateGeometry {
                member: id,
                start: start.id,
                end: end.id,
            });
        }
        let delta = end.position.to_vector() - start.position.to_vector();
        let direction = delta.y.atan2(delta.x);
        let (sin, cos) = direction.sin_cos();
        let length_vector = RowVector4::new(-cos, -sin, cos, sin);
        let local_stiffness = length_vector.transpose() * (stiffness / length) * length_vector;

        Ok(Self {
            id,
            name: name.into(),
            start: start.id,
            end: end.id,
            stiffness,
            direction,
            length,
            length_vector,
            local_stiffness,
        })
    }

    /// Identifier of the member.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Human readable label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the start node.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Id of the end node.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Axial stiffness `S`.
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Angle of the member axis from global X in radians.
    #[must_use]
    pub fn direction(&self) -> f64 {
        self.direction
    }

    /// Undeformed length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The `1x4` row `[-cos, -sin, cos, sin]`.
    #[must_use]
    pub fn length_vector(&self) -> &RowVector4<f64> {
        &self.length_vector
    }

    /// The symmetric `4x4` local stiffness matrix.
    #[must_use]
    pub fn local_stiffness(&self) -> &Matrix4<f64> {
        &self.local_stiffness
    }

    /// Global degree-of-freedom indices in local order: start-X, start-Y, end-X, end-Y.
    #[must_use]
    pub fn dofs(&self) -> [usize; 4] {
        [
            global_dof(self.start, Axis::X),
            global_dof(self.start, Axis::Y),
            global_dof(self.end, Axis::X),
            global_dof(self.end, Axis::Y),
        ]
    }

    /// Back-compute stretch, stress and axial force from the full displacement vector.
    ///
    /// The axial force is subtracted from the start node's entry of
    /// `resultants` and added to the end node's entry.
    ///
    /// # Panics
    ///
    /// Panics if `displacements` or `resultants` are too short to hold this
    /// member's nodes.
    pub fn compute_stretch_and_force(
        &self,
        displacements: &DVector<f64>,
        resultants: &mut [Force],
    ) -> MemberResponse {
        let [sx, sy, ex, ey] = self.dofs();
        let local = Vector4::new(
            displacements[sx],
            displacements[sy],
            displacements[ex],
            displacements[ey],
        );
        let stretch = (self.length_vector * local)[(0, 0)];
        let stress = stretch * self.stiffness / self.length;
        let (sin, cos) = self.direction.sin_cos();
        let force = Force::from(Vector2::new(cos, sin) * stress);

        resultants[self.start] -= force;
        resultants[self.end] += force;

        MemberResponse {
            member: self.id,
            stretch,
            stress,
            force,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn horizontal_member_geometry() {
        let a = Node::new(0, "a", 0.0, 0.0);
        let b = Node::new(1, "b", 3.0, 0.0);
        let member = Member::new(0, "ab", &a, &b, 6.0).expect("valid member");

        assert_relative_eq!(member.length(), 3.0);
        assert_relative_eq!(member.direction(), 0.0);
        assert_eq!(member.dofs(), [0, 1, 2, 3]);

        let k = member.local_stiffness();
        assert_relative_eq!(k[(0, 0)], 2.0);
        assert_relative_eq!(k[(0, 2)], -2.0);
        assert_relative_eq!(k[(2, 2)], 2.0);
        assert_relative_eq!(k[(1, 1)], 0.0);
    }

    #[test]
    fn local_stiffness_is_symmetric() {
        let a = Node::new(2, "a", 1.0, -1.0);
        let b = Node::new(5, "b", 4.0, 3.0);
        let member = Member::new(7, "ab", &a, &b, 250.0).expect("valid member");
        let k = member.local_stiffness();
        assert_relative_eq!(*k, k.transpose(), epsilon = 1.0e-12);
        assert_eq!(member.dofs(), [4, 5, 10, 11]);
        assert_relative_eq!(member.length(), 5.0);
        // 3-4-5 triangle: cos = 0.6, sin = 0.8
        assert_relative_eq!(k[(0, 1)], 250.0 / 5.0 * 0.48, epsilon = 1.0e-12);
    }

    #[test]
    fn coincident_nodes_are_rejected() {
        let a = Node::new(0, "a", 1.0, 1.0);
        let b = Node::new(1, "b", 1.0, 1.0);
        let error = Member::new(3, "ab", &a, &b, 1.0).expect_err("zero length detected");
        assert_eq!(
            error,
            TrussError::DegenerateGeometry {
                member: 3,
                start: 0,
                end: 1
            }
        );
    }

    #[test]
    fn shared_node_id_is_rejected() {
        let a = Node::new(2, "a", 0.0, 0.0);
        let b = Node::new(2, "b", 1.0, 0.0);
        let error = Member::new(0, "ab", &a, &b, 1.0).expect_err("same node twice");
        assert_eq!(
            error,
            TrussError::DegenerateGeometry {
                member: 0,
                start: 2,
                end: 2
            }
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let a = Node::new(0, "a", 0.0, 0.0);
        for b in [
            Node::new(1, "b", f64::NAN, 0.0),
            Node::new(1, "b", 0.0, f64::INFINITY),
        ] {
            let error = Member::new(4, "ab", &a, &b, 1.0).expect_err("non-finite position");
            assert_eq!(
                error,
                TrussError::NonFiniteGeometry {
                    member: 4,
                    start: 0,
                    end: 1
                }
            );
        }
    }

    #[test]
    fn non_positive_stiffness_is_rejected() {
        let a = Node::new(0, "a", 0.0, 0.0);
        let b = Node::new(1, "b", 1.0, 0.0);
        for stiffness in [0.0, -1.0, f64::NAN] {
            let error = Member::new(0, "ab", &a, &b, stiffness).expect_err("invalid stiffness");
            assert!(matches!(error, TrussError::InvalidStiffness { member: 0, .. }));
        }
    }

    #[test]
    fn stretch_pushes_opposite_forces_onto_end_nodes() {
        let a = Node::new(0, "a", 0.0, 0.0);
        let b = Node::new(1, "b", 0.0, 2.0);
        let member = Member::new(0, "ab", &a, &b, 10.0).expect("valid member");
        let displacements = DVector::from_vec(vec![0.0, 0.0, 0.0, 0.1]);
        let mut resultants = vec![Force::default(); 2];

        let response = member.compute_stretch_and_force(&displacements, &mut resultants);

        assert_relative_eq!(response.stretch, 0.1, epsilon = 1.0e-12);
        assert_relative_eq!(response.stress, 0.5, epsilon = 1.0e-12);
        assert_relative_eq!(response.force.x, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(response.force.y, 0.5, epsilon = 1.0e-12);
        assert_relative_eq!(resultants[0].y, -0.5, epsilon = 1.0e-12);
        assert_relative_eq!(resultants[1].y, 0.5, epsilon = 1.0e-12);
    }
}
