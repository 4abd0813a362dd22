#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use nalgebra::DVector;
use planar_truss::{Axis, BoundaryValue, Member, Node, TrussSolver};

const STIFFNESS: f64 = 200.0;
const LENGTH: f64 = 3.0;
const LOAD: f64 = 12.0;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build_bar() -> TrussSolver {
    let nodes = vec![
        Node::new(0, "support", 0.0, 0.0),
        Node::new(1, "tip", LENGTH, 0.0),
    ];
    let bar = Member::new(0, "bar", &nodes[0], &nodes[1], STIFFNESS).expect("valid bar");
    TrussSolver::new(nodes, vec![bar]).expect("valid system")
}

fn fixed_support_with_roller() -> Vec<BoundaryValue> {
    vec![
        BoundaryValue::new(0, Axis::X, 0.0),
        BoundaryValue::new(0, Axis::Y, 0.0),
        BoundaryValue::new(1, Axis::Y, 0.0),
    ]
}

#[test]
fn axial_load_matches_closed_form_solution() {
    init_logging();
    let mut solver = build_bar();
    solver
        .partition(
            &fixed_support_with_roller(),
            &[BoundaryValue::new(1, Axis::X, LOAD)],
            true,
        )
        .expect("stable partition");

    let solution = solver.solve(&DVector::zeros(3)).expect("solve succeeds");

    let elongation = LOAD * LENGTH / STIFFNESS;
    assert_eq!(solution.dc().len(), 1);
    assert_relative_eq!(solution.dc()[0], elongation, epsilon = 1.0e-12);

    let response = solution.member(0).expect("member response");
    assert_relative_eq!(response.stretch, elongation, epsilon = 1.0e-12);
    assert_relative_eq!(response.stress, LOAD, epsilon = 1.0e-9);
    assert_relative_eq!(response.force.x, LOAD, epsilon = 1.0e-9);
    assert_relative_eq!(response.force.y, 0.0, epsilon = 1.0e-12);

    let reaction = solution.resultant_force(0).expect("support resultant");
    assert_relative_eq!(reaction.x, -LOAD, epsilon = 1.0e-9);
    assert_relative_eq!(reaction.y, 0.0, epsilon = 1.0e-12);
    let tip = solution.resultant_force(1).expect("tip resultant");
    assert_relative_eq!(tip.x, LOAD, epsilon = 1.0e-9);

    // f0 is ordered like id0: support X, support Y, tip Y
    assert_relative_eq!(solution.f0()[0], -LOAD, epsilon = 1.0e-9);
    assert_relative_eq!(solution.f0()[1], 0.0, epsilon = 1.0e-12);
    assert_relative_eq!(solution.f0()[2], 0.0, epsilon = 1.0e-12);

    let tip_displacement = solution.node_displacement(1).expect("tip displacement");
    assert_relative_eq!(tip_displacement.x, elongation, epsilon = 1.0e-12);
    assert_relative_eq!(tip_displacement.y, 0.0);
}

#[test]
fn residual_vanishes_for_the_true_reactions() {
    let mut solver = build_bar();
    solver
        .partition(
            &fixed_support_with_roller(),
            &[BoundaryValue::new(1, Axis::X, LOAD)],
            true,
        )
        .expect("stable partition");

    let expected = DVector::from_vec(vec![-LOAD, 0.0, 0.0]);
    let (dc, f0, fr) = solver.solve(&expected).expect("solve succeeds").into_parts();

    assert_eq!(dc.len(), 1);
    assert_eq!(f0.len(), 3);
    assert_relative_eq!(fr, DVector::zeros(3), epsilon = 1.0e-9);
}

#[test]
fn prescribed_settlement_without_free_degrees_of_freedom() {
    let mut solver = build_bar();
    let mut displacements = fixed_support_with_roller();
    displacements.push(BoundaryValue::new(1, Axis::X, 0.03));
    let partition = solver
        .partition(&displacements, &[], true)
        .expect("fully prescribed partition");
    assert_eq!(partition.kcc().shape(), (0, 0));

    let solution = solver.solve(&DVector::zeros(4)).expect("solve succeeds");
    let pull = STIFFNESS / LENGTH * 0.03;

    assert!(solution.dc().is_empty());
    assert_relative_eq!(solution.f0()[2], pull, epsilon = 1.0e-9);
    assert_relative_eq!(solution.f0()[0], -pull, epsilon = 1.0e-9);
    assert_relative_eq!(solution.members()[0].stretch, 0.03, epsilon = 1.0e-12);
    assert_relative_eq!(solution.equilibrium_residual(), 0.0, epsilon = 1.0e-9);
}
