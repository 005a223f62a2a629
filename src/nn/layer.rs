use std::fmt;

use ndarray::{Array1, Array2};
use rand::Rng;

use crate::config::{Activation, ForwardConfig};

use super::Tensor;
use super::error::Error;

/// A tensor-to-tensor transformation, the building block of the dense part
/// of a readout.
pub trait Layer: Send + Sync {
    fn forward(&self, x: &Tensor) -> Result<Tensor, Error>;

    /// Short label used in summaries and diagnostics.
    fn name(&self) -> &'static str;

    /// Number of learnable parameters.
    fn n_parameters(&self) -> usize {
        0
    }
}

/// Fully connected layer computing `x · W + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    weight: Array2<f64>,
    bias: Array1<f64>,
}

impl Linear {
    /// Wraps existing parameters. `weight` is `in_feats × out_feats`.
    pub fn new(weight: Array2<f64>, bias: Array1<f64>) -> Result<Self, Error> {
        if bias.len() != weight.ncols() {
            return Err(Error::feature_mismatch("linear bias", weight.ncols(), bias.len()));
        }
        Ok(Self { weight, bias })
    }

    /// Creates a layer with Xavier-uniform weights and zero bias.
    pub fn init<R: Rng + ?Sized>(in_feats: usize, out_feats: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (in_feats + out_feats).max(1) as f64).sqrt();
        let weight =
            Array2::from_shape_fn((in_feats, out_feats), |_| rng.gen_range(-limit..=limit));
        Self {
            weight,
            bias: Array1::zeros(out_feats),
        }
    }

    #[inline]
    pub fn in_feats(&self) -> usize {
        self.weight.nrows()
    }

    #[inline]
    pub fn out_feats(&self) -> usize {
        self.weight.ncols()
    }

    pub fn weight(&self) -> &Array2<f64> {
        &self.weight
    }

    pub fn bias(&self) -> &Array1<f64> {
        &self.bias
    }
}

impl Layer for Linear {
    fn forward(&self, x: &Tensor) -> Result<Tensor, Error> {
        if x.ncols() != self.in_feats() {
            return Err(Error::feature_mismatch("linear", self.in_feats(), x.ncols()));
        }
        Ok(x.dot(&self.weight) + &self.bias)
    }

    fn name(&self) -> &'static str {
        "linear"
    }

    fn n_parameters(&self) -> usize {
        self.weight.len() + self.bias.len()
    }
}

/// An ordered chain of layers. An empty chain is the identity.
#[derive(Default)]
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
}

impl Sequential {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer.
    pub fn push(&mut self, layer: impl Layer + 'static) {
        self.layers.push(Box::new(layer));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, layer: impl Layer + 'static) -> Self {
        self.push(layer);
        self
    }

    /// Builds a stack of freshly initialized [`Linear`] layers of the given
    /// widths, each followed by its activation. Layers without a matching
    /// activation entry are left linear.
    ///
    /// ```
    /// use mol_readout::config::Activation;
    /// use mol_readout::nn::{Layer, Sequential};
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let activations = [Activation::ReLU, Activation::Identity];
    /// let seq = Sequential::dense(4, &[8, 2], &activations, &mut rng);
    ///
    /// assert_eq!(seq.len(), 4);
    /// assert_eq!(seq.n_parameters(), (4 * 8 + 8) + (8 * 2 + 2));
    /// ```
    pub fn dense<R: Rng + ?Sized>(
        in_feats: usize,
        hidden_feats: &[usize],
        activations: &[Activation],
        rng: &mut R,
    ) -> Self {
        let mut seq = Self::new();
        let mut width = in_feats;
        for (i, &out) in hidden_feats.iter().enumerate() {
            seq.push(Linear::init(width, out, rng));
            seq.push(activations.get(i).copied().unwrap_or(Activation::Identity));
            width = out;
        }
        seq
    }

    /// Builds the dense layers described by `config`.
    pub fn from_config<R: Rng + ?Sized>(
        config: &ForwardConfig,
        in_feats: usize,
        rng: &mut R,
    ) -> Self {
        let widths: Vec<usize> = config.hidden_feats.iter().map(|n| n.get()).collect();
        Self::dense(in_feats, &widths, &config.activation, rng)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> impl Iterator<Item = &dyn Layer> {
        self.layers.iter().map(|l| l.as_ref())
    }
}

impl Layer for Sequential {
    fn forward(&self, x: &Tensor) -> Result<Tensor, Error> {
        let mut out = x.clone();
        for layer in &self.layers {
            out = layer.forward(&out)?;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "sequential"
    }

    fn n_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.n_parameters()).sum()
    }
}

impl fmt::Debug for Sequential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.layers.iter().map(|l| l.name()))
            .finish()
    }
}
