//! Splitting the global system into known-displacement ("o") and known-force
//! ("c") blocks.
//!
//! Reordering the rows and columns of the global stiffness matrix as
//! `id0 ++ idc` yields
//!
//! ```text
//! | Koo  Koc |
//! | Kco  Kcc |
//! ```
//!
//! The boundary values are sorted by global degree of freedom before a single
//! ascending scan over `0..2N` fills the blocks. Both steps share the same
//! ascending order, so `id0[k]` is the degree of freedom of the `k`-th sorted
//! known displacement and of row/column `k` of the "o" blocks (likewise for
//! `idc` and the "c" blocks). Changing either order breaks `d0` and `fc`.

use nalgebra::{DMatrix, DVector};

use crate::errors::{PartitionMismatch, TrussError};
use crate::node::BoundaryValue;

/// Which set a degree of freedom belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DofClass {
    /// Displacement known, force (reaction) unknown.
    KnownDisplacement,
    /// Force known, displacement unknown.
    KnownForce,
}

/// Blocks and bookkeeping for one boundary-condition set.
#[derive(Clone, Debug)]
pub struct Partition {
    /// Known-displacement degrees of freedom in block order.
    id0: Vec<usize>,
    /// Known-force degrees of freedom in block order.
    idc: Vec<usize>,
    /// o rows, o columns.
    koo: DMatrix<f64>,
    /// c rows, c columns.
    kcc: DMatrix<f64>,
    /// o rows, c columns.
    koc: DMatrix<f64>,
    /// c rows, o columns.
    kco: DMatrix<f64>,
    /// Known displacements, ordered like `id0`.
    d0: DVector<f64>,
    /// Known forces, ordered like `idc`.
    fc: DVector<f64>,
    /// Cached inverse of `kcc`.
    kcc_inv: Option<DMatrix<f64>>,
}

impl Partition {
    /// Split `system` according to the supplied boundary values.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::PartitionMismatch`] unless the two sets cover every
    /// degree of freedom exactly once.
    pub fn new(
        system: &DMatrix<f64>,
        known_displacements: &[BoundaryValue],
        known_forces: &[BoundaryValue],
    ) -> Result<Self, TrussError> {
        let dof_count = system.nrows();
        let classes = classify(dof_count, known_displacements, known_forces)?;

        let mut displacements = known_displacements.to_vec();
        let mut forces = known_forces.to_vec();
        displacements.sort_by_key(BoundaryValue::dof);
        forces.sort_by_key(BoundaryValue::dof);

        let o = displacements.len();
        let c = forces.len();
        let mut koo = DMatrix::zeros(o, o);
        let mut kcc = DMatrix::zeros(c, c);
        let mut koc = DMatrix::zeros(o, c);
        let mut kco = DMatrix::zeros(c, o);
        let mut id0 = Vec::with_capacity(o);
        let mut idc = Vec::with_capacity(c);

        for (i, row_class) in classes.iter().enumerate() {
            let mut o_col = 0;
            let mut c_col = 0;
            let row = match row_class {
                DofClass::KnownDisplacement => id0.len(),
                DofClass::KnownForce => idc.len(),
            };
            for (j, col_class) in classes.iter().enumerate() {
                let value = system[(i, j)];
                match (row_class, col_class) {
                    (DofClass::KnownDisplacement, DofClass::KnownDisplacement) => {
                        koo[(row, o_col)] = value;
                    }
                    (DofClass::KnownDisplacement, DofClass::KnownForce) => {
                        koc[(row, c_col)] = value;
                    }
                    (DofClass::KnownForce, DofClass::KnownDisplacement) => {
                        kco[(row, o_col)] = value;
                    }
                    (DofClass::KnownForce, DofClass::KnownForce) => {
                        kcc[(row, c_col)] = value;
                    }
                }
                match col_class {
                    DofClass::KnownDisplacement => o_col += 1,
                    DofClass::KnownForce => c_col += 1,
                }
            }
            match row_class {
                DofClass::KnownDisplacement => id0.push(i),
                DofClass::KnownForce => idc.push(i),
            }
        }

        debug_assert!(id0.iter().zip(&displacements).all(|(i, v)| *i == v.dof()));
        debug_assert!(idc.iter().zip(&forces).all(|(i, v)| *i == v.dof()));

        let d0 = DVector::from_iterator(o, displacements.iter().map(|v| v.value));
        let fc = DVector::from_iterator(c, forces.iter().map(|v| v.value));

        log::debug!("partitioned {dof_count} degrees of freedom into {o} known displacements and {c} known forces");

        Ok(Self {
            id0,
            idc,
            koo,
            kcc,
            koc,
            kco,
            d0,
            fc,
            kcc_inv: None,
        })
    }

    /// Invert `Kcc` and cache the result.
    ///
    /// `Kcc` is first scaled symmetrically to a unit diagonal, so members of very
    /// different stiffness do not mask each other. A pivot of the LU
    /// factorisation of the scaled block whose magnitude is at most `tolerance`
    /// times its largest entry marks the block as singular, as does a zero or
    /// non-finite diagonal entry (a degree of freedom no member restrains).
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::SingularConstraintBlock`] when `Kcc` is singular.
    pub fn invert(&mut self, tolerance: f64) -> Result<&DMatrix<f64>, TrussError> {
        let size = self.kcc.nrows();
        let singular = TrussError::SingularConstraintBlock { size };
        let inverse = if size == 0 {
            DMatrix::zeros(0, 0)
        } else {
            let diagonal = self.kcc.diagonal();
            if diagonal.iter().any(|d| !(d.abs() > 0.0 && d.is_finite())) {
                log::debug!("Kcc ({size}x{size}) has an unrestrained degree of freedom");
                return Err(singular);
            }
            let scale = diagonal.map(|d| d.abs().sqrt().recip());
            let scaled = DMatrix::from_fn(size, size, |i, j| self.kcc[(i, j)] * scale[i] * scale[j]);
            let largest = scaled.amax();
            let lu = scaled.lu();
            if lu
                .u()
                .diagonal()
                .iter()
                .any(|pivot| !(pivot.abs() > tolerance * largest))
            {
                log::debug!("Kcc ({size}x{size}) has a vanishing pivot");
                return Err(singular);
            }
            let scaled_inverse = lu.try_inverse().ok_or(singular)?;
            DMatrix::from_fn(size, size, |i, j| scaled_inverse[(i, j)] * scale[i] * scale[j])
        };
        Ok(&*self.kcc_inv.insert(inverse))
    }

    /// The four blocks `(Koo, Kcc, Koc, Kco)`.
    #[must_use]
    pub fn blocks(&self) -> (&DMatrix<f64>, &DMatrix<f64>, &DMatrix<f64>, &DMatrix<f64>) {
        (&self.koo, &self.kcc, &self.koc, &self.kco)
    }

    /// Block coupling known displacements to their reactions.
    #[must_use]
    pub fn koo(&self) -> &DMatrix<f64> {
        &self.koo
    }

    /// Block coupling unknown displacements to known forces.
    #[must_use]
    pub fn kcc(&self) -> &DMatrix<f64> {
        &self.kcc
    }

    /// Block coupling unknown displacements to reactions.
    #[must_use]
    pub fn koc(&self) -> &DMatrix<f64> {
        &self.koc
    }

    /// Block coupling known displacements to known forces.
    #[must_use]
    pub fn kco(&self) -> &DMatrix<f64> {
        &self.kco
    }

    /// Known-displacement degrees of freedom in block order.
    #[must_use]
    pub fn id0(&self) -> &[usize] {
        &self.id0
    }

    /// Known-force degrees of freedom in block order.
    #[must_use]
    pub fn idc(&self) -> &[usize] {
        &self.idc
    }

    /// Known displacement values ordered like [`Partition::id0`].
    #[must_use]
    pub fn d0(&self) -> &DVector<f64> {
        &self.d0
    }

    /// Known force values ordered like [`Partition::idc`].
    #[must_use]
    pub fn fc(&self) -> &DVector<f64> {
        &self.fc
    }

    /// Cached inverse of `Kcc`, if it has been computed.
    #[must_use]
    pub fn kcc_inverse(&self) -> Option<&DMatrix<f64>> {
        self.kcc_inv.as_ref()
    }

    /// Row/column order of the blocked system: `id0` followed by `idc`.
    #[must_use]
    pub fn permutation(&self) -> Vec<usize> {
        self.id0.iter().chain(&self.idc).copied().collect()
    }
}

/// Classify every degree of freedom, rejecting gaps, duplicates and overlaps.
fn classify(
    dof_count: usize,
    known_displacements: &[BoundaryValue],
    known_forces: &[BoundaryValue],
) -> Result<Vec<DofClass>, PartitionMismatch> {
    let mut classes: Vec<Option<DofClass>> = vec![None; dof_count];
    let tagged = known_displacements
        .iter()
        .map(|v| (v.dof(), DofClass::KnownDisplacement))
        .chain(known_forces.iter().map(|v| (v.dof(), DofClass::KnownForce)));
    for (dof, class) in tagged {
        let slot = classes
            .get_mut(dof)
            .ok_or(PartitionMismatch::OutOfRange { dof, dof_count })?;
        match *slot {
            None => *slot = Some(class),
            Some(existing) if existing == class => {
                return Err(PartitionMismatch::Duplicate { dof });
            }
            Some(_) => return Err(PartitionMismatch::Overlap { dof }),
        }
    }
    classes
        .into_iter()
        .enumerate()
        .map(|(dof, class)| class.ok_or(PartitionMismatch::Unclassified { dof }))
        .collect()
}
