//! Postprocessing stages applied to the output of a readout's dense layers.

use ndarray::{Array2, s};

use crate::model::graph::MolecularGraph;

use super::Tensor;
use super::error::Error;

/// Maps the dense-layer output of a readout to its final prediction, with
/// access to the molecule or batch being predicted on.
pub trait PostprocessLayer: Send + Sync {
    fn forward(&self, molecule: &dyn MolecularGraph, x: &Tensor) -> Result<Tensor, Error>;

    fn name(&self) -> &'static str;
}

/// Computes partial charges by equilibrating per-atom electronegativity
/// and hardness within each molecule.
///
/// Column 0 of the input is the electronegativity `e` and column 1 the
/// hardness `s`. For a molecule with total formal charge `Q`, atom `i`
/// receives
///
/// ```text
/// q_i = (μ - e_i) / s_i,   μ = (Q + Σ_j e_j / s_j) / Σ_j 1 / s_j
/// ```
///
/// so the charges of each molecule sum to `Q`. The output has one row per
/// atom and a single column. A zero hardness is rejected with
/// [`Error::ZeroHardness`].
///
/// # Examples
///
/// ```
/// use mol_readout::{Bond, Molecule};
/// use mol_readout::nn::{ComputePartialCharges, PostprocessLayer};
/// use ndarray::array;
///
/// let mol = Molecule::new(array![[0.0], [0.0]], vec![Bond::new(0, 1)], vec![-1, 0])?;
/// let charges = ComputePartialCharges
///     .forward(&mol, &array![[1.0, 1.0], [1.0, 1.0]])?;
///
/// assert_eq!(charges, array![[-0.5], [-0.5]]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputePartialCharges;

impl PostprocessLayer for ComputePartialCharges {
    fn forward(&self, molecule: &dyn MolecularGraph, x: &Tensor) -> Result<Tensor, Error> {
        if x.ncols() != 2 {
            return Err(Error::feature_mismatch(self.name(), 2, x.ncols()));
        }
        if x.nrows() != molecule.n_atoms() {
            return Err(Error::row_mismatch(self.name(), molecule.n_atoms(), x.nrows()));
        }

        if let Some(row) = x.column(1).iter().position(|&s| s == 0.0) {
            return Err(Error::ZeroHardness { row });
        }

        let mut charges = Array2::zeros((x.nrows(), 1));
        let totals = molecule.total_charges();

        for (range, total) in molecule.atom_ranges().into_iter().zip(totals) {
            let e = x.slice(s![range.clone(), 0]);
            let inv_s = x.slice(s![range.clone(), 1]).mapv(f64::recip);

            let mu = (total + (&e * &inv_s).sum()) / inv_s.sum();
            let q = (mu - &e) * &inv_s;

            charges.slice_mut(s![range, 0]).assign(&q);
        }

        Ok(charges)
    }

    fn name(&self) -> &'static str {
        "charges"
    }
}
