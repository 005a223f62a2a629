use std::ops::Range;

use ndarray::Array2;

use super::molecule::Bond;

/// Read-only view of one molecule or a batch of molecules, as consumed by
/// readout stages.
///
/// A batch is a single disconnected graph: atom rows of all molecules are
/// stacked and bond indices refer to the stacked rows. The per-molecule
/// counts let stages recover molecule boundaries.
pub trait MolecularGraph {
    /// Atom feature matrix (`n_atoms × n_features`).
    fn atom_features(&self) -> &Array2<f64>;

    /// All bonds, indexing rows of [`atom_features`](Self::atom_features).
    fn bonds(&self) -> &[Bond];

    /// Number of atoms in each molecule, in order.
    fn n_atoms_per_molecule(&self) -> Vec<usize>;

    /// Number of bonds in each molecule, in order.
    fn n_bonds_per_molecule(&self) -> Vec<usize>;

    /// Sum of formal charges of each molecule, in order.
    fn total_charges(&self) -> Vec<f64>;

    fn n_atoms(&self) -> usize {
        self.atom_features().nrows()
    }

    fn n_molecules(&self) -> usize {
        self.n_atoms_per_molecule().len()
    }

    /// Row range of each molecule in the atom feature matrix.
    fn atom_ranges(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.n_atoms_per_molecule()
            .into_iter()
            .map(|n| {
                let range = start..start + n;
                start += n;
                range
            })
            .collect()
    }
}
