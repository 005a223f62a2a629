//! Pooling stages turning per-atom features into readout inputs.

use ndarray::{Axis, concatenate};

use crate::model::graph::MolecularGraph;

use super::Tensor;
use super::error::Error;
use super::layer::{Layer, Sequential};

/// Turns the atom features carried by a molecule or batch into the tensor
/// fed to a readout's dense layers.
pub trait PoolingLayer: Send + Sync {
    fn forward(&self, molecule: &dyn MolecularGraph) -> Result<Tensor, Error>;

    /// Width of the pooled tensor for `in_feats` atom features.
    fn out_feats(&self, in_feats: usize) -> usize;

    fn name(&self) -> &'static str;

    fn n_parameters(&self) -> usize {
        0
    }
}

/// Passes atom features through unchanged: one row per atom.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolAtomFeatures;

impl PoolingLayer for PoolAtomFeatures {
    fn forward(&self, molecule: &dyn MolecularGraph) -> Result<Tensor, Error> {
        Ok(molecule.atom_features().clone())
    }

    fn out_feats(&self, in_feats: usize) -> usize {
        in_feats
    }

    fn name(&self) -> &'static str {
        "atom"
    }
}

/// Builds one row per bond from the features of its two atoms.
///
/// Each bond (i, j) is encoded in both directions, `[h_i, h_j]` and
/// `[h_j, h_i]`, both encodings are passed through `layers`, and the results
/// are summed. The output therefore does not depend on how a bond's atoms
/// are ordered. With no layers the output width is twice the atom feature
/// width.
#[derive(Debug, Default)]
pub struct PoolBondFeatures {
    layers: Sequential,
    out_feats: Option<usize>,
}

impl PoolBondFeatures {
    /// Pools without any per-bond layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pools through `layers`, which map `2 × in_feats` columns to
    /// `out_feats` columns.
    pub fn with_layers(layers: Sequential, out_feats: usize) -> Self {
        Self {
            layers,
            out_feats: Some(out_feats),
        }
    }
}

impl PoolingLayer for PoolBondFeatures {
    fn forward(&self, molecule: &dyn MolecularGraph) -> Result<Tensor, Error> {
        let h = molecule.atom_features();
        let bonds = molecule.bonds();

        let first: Vec<usize> = bonds.iter().map(|b| b.i).collect();
        let second: Vec<usize> = bonds.iter().map(|b| b.j).collect();
        let h_i = h.select(Axis(0), &first);
        let h_j = h.select(Axis(0), &second);

        let forward = concatenate(Axis(1), &[h_i.view(), h_j.view()])?;
        let reverse = concatenate(Axis(1), &[h_j.view(), h_i.view()])?;

        Ok(self.layers.forward(&forward)? + self.layers.forward(&reverse)?)
    }

    fn out_feats(&self, in_feats: usize) -> usize {
        self.out_feats.unwrap_or(2 * in_feats)
    }

    fn name(&self) -> &'static str {
        "bond"
    }

    fn n_parameters(&self) -> usize {
        self.layers.n_parameters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::batch::MoleculeBatch;
    use crate::model::molecule::{Bond, Molecule};
    use crate::nn::layer::Linear;
    use ndarray::{Array2, array};

    fn propane() -> Molecule {
        Molecule::neutral(
            array![[1.0, 0.0], [0.0, 1.0], [2.0, 2.0]],
            vec![Bond::new(0, 1), Bond::new(1, 2)],
        )
        .unwrap()
    }

    #[test]
    fn atom_pooling_returns_features() {
        let mol = propane();
        let out = PoolAtomFeatures.forward(&mol).unwrap();
        assert_eq!(&out, mol.atom_features());
        assert_eq!(PoolAtomFeatures.out_feats(2), 2);
    }

    #[test]
    fn bond_pooling_without_layers_sums_both_directions() {
        let out = PoolBondFeatures::new().forward(&propane()).unwrap();

        // [h_i, h_j] + [h_j, h_i] = [h_i + h_j, h_i + h_j]
        assert_eq!(out, array![[1.0, 1.0, 1.0, 1.0], [2.0, 3.0, 2.0, 3.0]]);
        assert_eq!(PoolBondFeatures::new().out_feats(2), 4);
    }

    #[test]
    fn bond_pooling_is_independent_of_atom_order() {
        let layers = Sequential::new()
            .with(Linear::new(array![[1.0], [-3.0], [0.5], [2.0]], array![0.1]).unwrap())
            .with(crate::config::Activation::Tanh);
        let pool = PoolBondFeatures::with_layers(layers, 1);

        let forward = propane();
        // Same molecule with atoms 0 and 2 swapped.
        let swapped = Molecule::neutral(
            array![[2.0, 2.0], [0.0, 1.0], [1.0, 0.0]],
            vec![Bond::new(2, 1), Bond::new(1, 0)],
        )
        .unwrap();

        let a = pool.forward(&forward).unwrap();
        let b = pool.forward(&swapped).unwrap();
        assert_eq!(a.dim(), (2, 1));
        for (x, y) in a.iter().zip(b.iter()) {
            approx::assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }
        assert_eq!(pool.n_parameters(), 5);
    }

    #[test]
    fn bond_pooling_on_batch_uses_offset_bonds() {
        let single =
            Molecule::neutral(array![[5.0, 5.0], [1.0, 1.0]], vec![Bond::new(0, 1)]).unwrap();
        let batch = MoleculeBatch::from_molecules(&[propane(), single]).unwrap();

        let out = PoolBondFeatures::new().forward(&batch).unwrap();
        assert_eq!(out.nrows(), 3);
        assert_eq!(out.row(2).to_vec(), vec![6.0, 6.0, 6.0, 6.0]);
    }

    #[test]
    fn bond_pooling_with_no_bonds_is_empty() {
        let mol = Molecule::neutral(Array2::ones((1, 3)), vec![]).unwrap();
        let out = PoolBondFeatures::new().forward(&mol).unwrap();
        assert_eq!(out.dim(), (0, 6));
    }

    #[test]
    fn bond_pooling_propagates_layer_errors() {
        let layers =
            Sequential::new().with(Linear::new(Array2::zeros((3, 1)), array![0.0]).unwrap());
        let pool = PoolBondFeatures::with_layers(layers, 1);
        assert!(matches!(
            pool.forward(&propane()),
            Err(Error::FeatureMismatch { expected: 3, found: 4, .. })
        ));
    }
}
