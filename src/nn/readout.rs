use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;

use crate::config::{ModelConfig, PoolingType, PostprocessType, ReadoutConfig};
use crate::model::graph::MolecularGraph;

use super::Tensor;
use super::error::Error;
use super::layer::{Layer, Sequential};
use super::pooling::{PoolAtomFeatures, PoolBondFeatures, PoolingLayer};
use super::postprocess::{ComputePartialCharges, PostprocessLayer};

/// A prediction head: pooling, then dense layers, then an optional
/// postprocessing step.
///
/// Stage errors are returned exactly as the stage produced them.
///
/// # Examples
///
/// ```
/// use mol_readout::{Bond, Molecule};
/// use mol_readout::nn::{Linear, PoolAtomFeatures, ReadoutModule, Sequential};
/// use ndarray::array;
///
/// let head = ReadoutModule::new(
///     Box::new(PoolAtomFeatures),
///     Sequential::new().with(Linear::new(array![[2.0], [1.0]], array![0.0])?),
///     None,
/// );
///
/// let mol = Molecule::neutral(array![[1.0, 0.0], [0.0, 3.0]], vec![Bond::new(0, 1)])?;
/// assert_eq!(head.forward(&mol)?, array![[2.0], [3.0]]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ReadoutModule {
    pooling_layer: Box<dyn PoolingLayer>,
    forward_layers: Sequential,
    postprocess_layer: Option<Box<dyn PostprocessLayer>>,
}

impl ReadoutModule {
    pub fn new(
        pooling_layer: Box<dyn PoolingLayer>,
        forward_layers: Sequential,
        postprocess_layer: Option<Box<dyn PostprocessLayer>>,
    ) -> Self {
        Self {
            pooling_layer,
            forward_layers,
            postprocess_layer,
        }
    }

    /// Builds the stages described by `config` for molecules carrying
    /// `in_feats` atom features. Dense layers are initialized from `rng`.
    pub fn from_config<R: Rng + ?Sized>(
        config: &ReadoutConfig,
        in_feats: usize,
        rng: &mut R,
    ) -> Self {
        let pooling_layer: Box<dyn PoolingLayer> = match config.pooling {
            PoolingType::Atom => Box::new(PoolAtomFeatures),
            PoolingType::Bond => Box::new(PoolBondFeatures::new()),
        };

        let pooled_feats = pooling_layer.out_feats(in_feats);
        let forward_layers = Sequential::from_config(&config.forward, pooled_feats, rng);

        let postprocess_layer = config.postprocess.map(|p| -> Box<dyn PostprocessLayer> {
            match p {
                PostprocessType::Charges => Box::new(ComputePartialCharges),
            }
        });

        Self::new(pooling_layer, forward_layers, postprocess_layer)
    }

    /// Runs the three stages in order on a molecule or batch.
    pub fn forward(&self, molecule: &dyn MolecularGraph) -> Result<Tensor, Error> {
        let x = self.pooling_layer.forward(molecule)?;
        log::trace!("{} pooling -> {:?}", self.pooling_layer.name(), x.dim());

        let x = self.forward_layers.forward(&x)?;
        log::trace!("forward layers -> {:?}", x.dim());

        if let Some(postprocess) = &self.postprocess_layer {
            let x = postprocess.forward(molecule, &x)?;
            log::trace!("{} postprocess -> {:?}", postprocess.name(), x.dim());
            return Ok(x);
        }

        Ok(x)
    }

    pub fn pooling_layer(&self) -> &dyn PoolingLayer {
        self.pooling_layer.as_ref()
    }

    pub fn forward_layers(&self) -> &Sequential {
        &self.forward_layers
    }

    pub fn postprocess_layer(&self) -> Option<&dyn PostprocessLayer> {
        self.postprocess_layer.as_deref()
    }

    pub fn n_parameters(&self) -> usize {
        self.pooling_layer.n_parameters() + self.forward_layers.n_parameters()
    }
}

impl fmt::Debug for ReadoutModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadoutModule")
            .field("pooling_layer", &self.pooling_layer.name())
            .field("forward_layers", &self.forward_layers)
            .field(
                "postprocess_layer",
                &self.postprocess_layer.as_ref().map(|p| p.name()),
            )
            .finish()
    }
}

/// A set of named readout heads sharing the same input molecules.
#[derive(Debug, Default)]
pub struct ReadoutModel {
    readouts: BTreeMap<String, ReadoutModule>,
}

impl ReadoutModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one [`ReadoutModule`] per entry of `config`, in name order.
    pub fn from_config<R: Rng + ?Sized>(
        config: &ModelConfig,
        in_feats: usize,
        rng: &mut R,
    ) -> Self {
        let readouts = config
            .readouts
            .iter()
            .map(|(name, readout)| {
                let module = ReadoutModule::from_config(readout, in_feats, rng);
                log::debug!(
                    "built readout '{}' ({} parameters)",
                    name,
                    module.n_parameters()
                );
                (name.clone(), module)
            })
            .collect();
        Self { readouts }
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        module: ReadoutModule,
    ) -> Option<ReadoutModule> {
        self.readouts.insert(name.into(), module)
    }

    pub fn get(&self, name: &str) -> Option<&ReadoutModule> {
        self.readouts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.readouts.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReadoutModule)> {
        self.readouts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.readouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readouts.is_empty()
    }

    pub fn n_parameters(&self) -> usize {
        self.readouts.values().map(ReadoutModule::n_parameters).sum()
    }

    /// Runs every readout on `molecule`. Stops at the first failing readout.
    pub fn forward(
        &self,
        molecule: &dyn MolecularGraph,
    ) -> Result<BTreeMap<String, Tensor>, Error> {
        self.readouts
            .iter()
            .map(|(name, module)| Ok((name.clone(), module.forward(molecule)?)))
            .collect()
    }
}
