use crate::config::Activation;

use super::Tensor;
use super::error::Error;
use super::layer::Layer;

const LEAKY_RELU_SLOPE: f64 = 0.01;

impl Activation {
    #[inline]
    pub fn apply_scalar(&self, x: f64) -> f64 {
        match self {
            Activation::ReLU => x.max(0.0),
            Activation::LeakyReLU => {
                if x >= 0.0 {
                    x
                } else {
                    LEAKY_RELU_SLOPE * x
                }
            }
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Identity => x,
        }
    }

    /// Applies the activation element-wise.
    pub fn apply(&self, x: &Tensor) -> Tensor {
        match self {
            Activation::Identity => x.clone(),
            _ => x.mapv(|v| self.apply_scalar(v)),
        }
    }
}

impl Layer for Activation {
    fn forward(&self, x: &Tensor) -> Result<Tensor, Error> {
        Ok(self.apply(x))
    }

    fn name(&self) -> &'static str {
        self.as_str()
    }
}
