//! Joints and the boundary values attached to their degrees of freedom.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Number of degrees of freedom carried by every node.
pub const DOF_PER_NODE: usize = 2;

/// Translational direction of a nodal degree of freedom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Global X direction.
    X = 0,
    /// Global Y direction.
    Y = 1,
}

impl Axis {
    /// Offset of this axis within a node's block of degrees of freedom.
    #[must_use]
    pub const fn offset(self) -> usize {
        self as usize
    }
}

/// A pin joint in the plane.
///
/// Nodes live in a dense arena: the node with id `k` must sit at position `k`
/// of the list handed to the solver. Its degrees of freedom are `2k` (X) and
/// `2k + 1` (Y).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Arena index of the node.
    pub id: usize,
    /// Human readable label.
    pub name: String,
    /// Undeformed position.
    pub position: Point,
}

impl Node {
    /// Create a node at `(x, y)`.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::Node;
    ///
    /// let node = Node::new(3, "apex", 1.0, 2.0);
    /// assert_eq!(node.dof(planar_truss::Axis::Y), 7);
    /// ```
    pub fn new(id: usize, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id,
            name: name.into(),
            position: Point::new(x, y),
        }
    }

    /// Global degree-of-freedom index for `axis` at this node.
    #[must_use]
    pub const fn dof(&self, axis: Axis) -> usize {
        global_dof(self.id, axis)
    }
}

/// Global degree-of-freedom index of `axis` at node `node`.
#[must_use]
pub const fn global_dof(node: usize, axis: Axis) -> usize {
    node * DOF_PER_NODE + axis.offset()
}

/// One scalar boundary condition: a prescribed displacement or a prescribed
/// force at a single degree of freedom.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryValue {
    /// Identifier of the node the value applies to.
    pub node: usize,
    /// Direction of the constrained degree of freedom.
    pub axis: Axis,
    /// Prescribed value.
    pub value: f64,
}

impl BoundaryValue {
    /// Create a boundary value at `axis` of `node`.
    #[must_use]
    pub const fn new(node: usize, axis: Axis, value: f64) -> Self {
        Self { node, axis, value }
    }

    /// Global degree-of-freedom index addressed by this value.
    #[must_use]
    pub const fn dof(&self) -> usize {
        global_dof(self.node, self.axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_of_freedom_follow_node_id() {
        let node = Node::new(4, "d", 0.0, 0.0);
        assert_eq!(node.dof(Axis::X), 8);
        assert_eq!(node.dof(Axis::Y), 9);
        assert_eq!(BoundaryValue::new(4, Axis::Y, 1.5).dof(), 9);
    }

    #[test]
    fn node_keeps_name_and_position() {
        let node = Node::new(0, String::from("base"), 1.0, -2.0);
        assert_eq!(node.name, "base");
        assert_eq!(node.position, Point::new(1.0, -2.0));
    }
}
