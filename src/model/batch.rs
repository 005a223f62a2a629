use ndarray::{Array2, ArrayView2, Axis, concatenate};

use super::error::MoleculeError;
use super::graph::MolecularGraph;
use super::molecule::{Bond, Molecule};

/// Several molecules merged into one disconnected graph.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeBatch {
    features: Array2<f64>,
    bonds: Vec<Bond>,
    n_atoms: Vec<usize>,
    n_bonds: Vec<usize>,
    total_charges: Vec<f64>,
}

impl MoleculeBatch {
    /// Stacks `molecules` in order. All molecules must share a feature
    /// width.
    ///
    /// ```
    /// use mol_readout::{Bond, MolecularGraph, Molecule, MoleculeBatch};
    /// use ndarray::array;
    ///
    /// let a = Molecule::neutral(array![[1.0], [2.0]], vec![Bond::new(0, 1)])?;
    /// let b = Molecule::new(array![[3.0]], vec![], vec![1])?;
    /// let batch = MoleculeBatch::from_molecules(&[a, b])?;
    ///
    /// assert_eq!(batch.n_atoms_per_molecule(), vec![2, 1]);
    /// assert_eq!(batch.total_charges(), vec![0.0, 1.0]);
    /// # Ok::<(), mol_readout::MoleculeError>(())
    /// ```
    pub fn from_molecules(molecules: &[Molecule]) -> Result<Self, MoleculeError> {
        let first = molecules.first().ok_or(MoleculeError::EmptyBatch)?;
        let width = first.n_features();

        for (index, mol) in molecules.iter().enumerate() {
            if mol.n_features() != width {
                return Err(MoleculeError::FeatureWidthMismatch {
                    index,
                    expected: width,
                    found: mol.n_features(),
                });
            }
        }

        let views: Vec<ArrayView2<f64>> = molecules
            .iter()
            .map(|m| m.atom_features().view())
            .collect();
        let features = concatenate(Axis(0), &views).map_err(|_| {
            MoleculeError::FeatureWidthMismatch {
                index: 0,
                expected: width,
                found: width,
            }
        })?;

        let mut bonds = Vec::with_capacity(molecules.iter().map(|m| m.bonds().len()).sum());
        let mut offset = 0;
        for mol in molecules {
            bonds.extend(mol.bonds().iter().map(|b| b.offset(offset)));
            offset += mol.n_atoms();
        }

        log::trace!(
            "batched {} molecules ({} atoms, {} bonds)",
            molecules.len(),
            features.nrows(),
            bonds.len()
        );

        Ok(Self {
            features,
            bonds,
            n_atoms: molecules.iter().map(|m| m.n_atoms()).collect(),
            n_bonds: molecules.iter().map(|m| m.bonds().len()).collect(),
            total_charges: molecules
                .iter()
                .map(|m| f64::from(m.total_charge()))
                .collect(),
        })
    }

    /// Splits a per-atom tensor produced from this batch back into one
    /// tensor per molecule. The tensor must have one row per batched atom.
    pub fn split_atom_rows(&self, tensor: &Array2<f64>) -> Result<Vec<Array2<f64>>, MoleculeError> {
        if tensor.nrows() != self.n_atoms() {
            return Err(MoleculeError::RowCount {
                expected: self.n_atoms(),
                found: tensor.nrows(),
            });
        }

        Ok(self
            .atom_ranges()
            .into_iter()
            .map(|r| tensor.slice(ndarray::s![r, ..]).to_owned())
            .collect())
    }
}

impl MolecularGraph for MoleculeBatch {
    fn atom_features(&self) -> &Array2<f64> {
        &self.features
    }

    fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    fn n_atoms_per_molecule(&self) -> Vec<usize> {
        self.n_atoms.clone()
    }

    fn n_bonds_per_molecule(&self) -> Vec<usize> {
        self.n_bonds.clone()
    }

    fn total_charges(&self) -> Vec<f64> {
        self.total_charges.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn water() -> Molecule {
        Molecule::neutral(
            array![[8.0, 0.0], [1.0, 0.0], [1.0, 0.0]],
            vec![Bond::new(0, 1), Bond::new(0, 2)],
        )
        .unwrap()
    }

    fn hydroxide() -> Molecule {
        Molecule::new(array![[8.0, 1.0], [1.0, 1.0]], vec![Bond::new(0, 1)], vec![-1, 0]).unwrap()
    }

    #[test]
    fn batch_stacks_features_and_offsets_bonds() {
        let batch = MoleculeBatch::from_molecules(&[water(), hydroxide()]).unwrap();

        assert_eq!(batch.n_atoms(), 5);
        assert_eq!(batch.n_molecules(), 2);
        assert_eq!(batch.atom_features().row(3).to_vec(), vec![8.0, 1.0]);
        assert_eq!(
            batch.bonds(),
            &[Bond::new(0, 1), Bond::new(0, 2), Bond::new(3, 4)]
        );
        assert_eq!(batch.n_bonds_per_molecule(), vec![2, 1]);
        assert_eq!(batch.total_charges(), vec![0.0, -1.0]);
        assert_eq!(batch.atom_ranges(), vec![0..3, 3..5]);
    }

    #[test]
    fn batch_rejects_empty_list() {
        assert_eq!(
            MoleculeBatch::from_molecules(&[]).unwrap_err(),
            MoleculeError::EmptyBatch
        );
    }

    #[test]
    fn batch_rejects_mixed_feature_widths() {
        let narrow = Molecule::neutral(array![[1.0]], vec![]).unwrap();
        let err = MoleculeBatch::from_molecules(&[water(), narrow]).unwrap_err();
        assert_eq!(
            err,
            MoleculeError::FeatureWidthMismatch {
                index: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn split_atom_rows_recovers_molecules() {
        let batch = MoleculeBatch::from_molecules(&[water(), hydroxide()]).unwrap();
        let parts = batch.split_atom_rows(batch.atom_features()).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(&parts[0], water().atom_features());
        assert_eq!(&parts[1], hydroxide().atom_features());
    }

    #[test]
    fn split_atom_rows_rejects_wrong_row_count() {
        let batch = MoleculeBatch::from_molecules(&[water(), hydroxide()]).unwrap();

        let err = batch.split_atom_rows(&Array2::zeros((3, 1))).unwrap_err();
        assert_eq!(err, MoleculeError::RowCount { expected: 5, found: 3 });
    }
}
