use thiserror::Error;

/// Errors raised when assembling a [`Molecule`](super::molecule::Molecule)
/// or [`MoleculeBatch`](super::batch::MoleculeBatch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoleculeError {
    #[error("expected one formal charge per atom ({n_atoms}), found {found}")]
    FormalChargeCount { n_atoms: usize, found: usize },

    #[error("bond ({i}, {j}) refers to an atom outside 0..{n_atoms}")]
    BondOutOfRange { i: usize, j: usize, n_atoms: usize },

    #[error("bond connects atom {0} to itself")]
    SelfBond(usize),

    #[error("molecule {index} has {found} atom features, expected {expected}")]
    FeatureWidthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("cannot batch an empty list of molecules")]
    EmptyBatch,

    #[error("expected one row per batched atom ({expected}), found {found}")]
    RowCount { expected: usize, found: usize },
}
