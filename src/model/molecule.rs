use ndarray::Array2;

use super::error::MoleculeError;
use super::graph::MolecularGraph;

/// An undirected bond, stored with `i <= j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
}

impl Bond {
    pub fn new(idx1: usize, idx2: usize) -> Self {
        if idx1 <= idx2 {
            Self { i: idx1, j: idx2 }
        } else {
            Self { i: idx2, j: idx1 }
        }
    }

    pub(crate) fn offset(&self, by: usize) -> Self {
        Self {
            i: self.i + by,
            j: self.j + by,
        }
    }
}

/// A single molecular graph with per-atom features.
///
/// The feature matrix has one row per atom and is expected to come from a
/// graph convolution; this type only carries it to the readout stages.
///
/// # Examples
///
/// ```
/// use mol_readout::{Bond, MolecularGraph, Molecule};
/// use ndarray::array;
///
/// // Hydroxide: O-H with one feature column per atom.
/// let mol = Molecule::new(array![[1.0], [0.5]], vec![Bond::new(1, 0)], vec![-1, 0])?;
///
/// assert_eq!(mol.n_atoms(), 2);
/// assert_eq!(mol.bonds()[0], Bond::new(0, 1));
/// assert_eq!(mol.total_charges(), vec![-1.0]);
/// # Ok::<(), mol_readout::MoleculeError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    features: Array2<f64>,
    bonds: Vec<Bond>,
    formal_charges: Vec<i32>,
}

impl Molecule {
    /// Creates a molecule, checking that there is one formal charge per
    /// feature row and that every bond joins two distinct existing atoms.
    ///
    /// Bonds built without [`Bond::new`] are reordered so that `i <= j`.
    pub fn new(
        features: Array2<f64>,
        bonds: Vec<Bond>,
        formal_charges: Vec<i32>,
    ) -> Result<Self, MoleculeError> {
        let n_atoms = features.nrows();
        if formal_charges.len() != n_atoms {
            return Err(MoleculeError::FormalChargeCount {
                n_atoms,
                found: formal_charges.len(),
            });
        }

        let bonds: Vec<Bond> = bonds.into_iter().map(|b| Bond::new(b.i, b.j)).collect();
        for bond in &bonds {
            if bond.i >= n_atoms || bond.j >= n_atoms {
                return Err(MoleculeError::BondOutOfRange {
                    i: bond.i,
                    j: bond.j,
                    n_atoms,
                });
            }
            if bond.i == bond.j {
                return Err(MoleculeError::SelfBond(bond.i));
            }
        }

        Ok(Self {
            features,
            bonds,
            formal_charges,
        })
    }

    /// Creates a neutral molecule (all formal charges zero).
    pub fn neutral(features: Array2<f64>, bonds: Vec<Bond>) -> Result<Self, MoleculeError> {
        let n = features.nrows();
        Self::new(features, bonds, vec![0; n])
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    #[inline]
    pub fn formal_charges(&self) -> &[i32] {
        &self.formal_charges
    }

    #[inline]
    pub fn total_charge(&self) -> i32 {
        self.formal_charges.iter().sum()
    }
}

impl MolecularGraph for Molecule {
    fn atom_features(&self) -> &Array2<f64> {
        &self.features
    }

    fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    fn n_atoms_per_molecule(&self) -> Vec<usize> {
        vec![self.features.nrows()]
    }

    fn n_bonds_per_molecule(&self) -> Vec<usize> {
        vec![self.bonds.len()]
    }

    fn total_charges(&self) -> Vec<f64> {
        vec![f64::from(self.total_charge())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn bond_new_orders_indices() {
        assert_eq!(Bond::new(3, 1), Bond { i: 1, j: 3 });
        assert_eq!(Bond::new(1, 3), Bond { i: 1, j: 3 });
    }

    #[test]
    fn new_accepts_valid_molecule() {
        let mol = Molecule::new(
            array![[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]],
            vec![Bond::new(0, 1), Bond::new(1, 2)],
            vec![0, 1, -1],
        )
        .unwrap();

        assert_eq!(mol.n_atoms(), 3);
        assert_eq!(mol.n_features(), 2);
        assert_eq!(mol.total_charge(), 0);
        assert_eq!(mol.n_molecules(), 1);
        assert_eq!(mol.n_bonds_per_molecule(), vec![2]);
    }

    #[test]
    fn new_rejects_wrong_charge_count() {
        let err = Molecule::new(array![[0.0], [1.0]], vec![], vec![0]).unwrap_err();
        assert_eq!(
            err,
            MoleculeError::FormalChargeCount {
                n_atoms: 2,
                found: 1
            }
        );
    }

    #[test]
    fn new_rejects_bad_bonds() {
        let err = Molecule::neutral(array![[0.0], [1.0]], vec![Bond::new(0, 2)]).unwrap_err();
        assert!(matches!(err, MoleculeError::BondOutOfRange { j: 2, .. }));

        let err = Molecule::neutral(array![[0.0], [1.0]], vec![Bond::new(1, 1)]).unwrap_err();
        assert_eq!(err, MoleculeError::SelfBond(1));
    }

    #[test]
    fn new_checks_and_orders_hand_built_bonds() {
        let err = Molecule::neutral(Array2::ones((2, 3)), vec![Bond { i: 5, j: 0 }]).unwrap_err();
        assert_eq!(
            err,
            MoleculeError::BondOutOfRange {
                i: 0,
                j: 5,
                n_atoms: 2
            }
        );

        let mol = Molecule::neutral(Array2::ones((2, 3)), vec![Bond { i: 1, j: 0 }]).unwrap();
        assert_eq!(mol.bonds(), &[Bond::new(0, 1)]);
    }

    #[test]
    fn neutral_has_zero_total_charge() {
        let mol = Molecule::neutral(array![[0.0], [1.0]], vec![Bond::new(0, 1)]).unwrap();
        assert_eq!(mol.formal_charges(), &[0, 0]);
        assert_eq!(mol.total_charges(), vec![0.0]);
    }
}
