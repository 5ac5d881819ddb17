//! MLP model format.

use crate::calculus::Real;
use crate::engine::Engine;
use crate::error::Result;
use crate::mlp::{LayerSpec, Mlp};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persisted form of an [`Mlp`].
///
/// ```json
/// {"input": 2, "layers": [{"neurons": 1, "activation": "linear"}],
///  "weights": [1.0, 2.0, 3.0]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpModel {
    /// Input size.
    pub input: usize,
    /// Layers from first hidden to output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<LayerSpec>,
    /// Flat weights, layer after layer, bias last in each neuron.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<f64>,
}

impl MlpModel {
    /// Writes the model to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        super::save(self, path)
    }

    /// Reads a model from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        super::load(path)
    }
}

impl<T: Real> Mlp<T> {
    /// Snapshot of the layout and weights.
    pub fn to_model(&self) -> MlpModel {
        MlpModel {
            input: self.input_size(),
            layers: self.specs().to_vec(),
            weights: self.weights().iter().map(|w| w.as_f64()).collect(),
        }
    }

    /// Rebuilds an initialized network from `model`.
    pub fn from_model(model: &MlpModel, engine: Engine) -> Result<Self> {
        let weights = model.weights.iter().map(|&w| T::of(w)).collect();
        let mut mlp = Mlp::new(model.input, model.layers.clone(), engine).with_weights(weights);
        mlp.init()?;
        Ok(mlp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::decode;
    use crate::parallel::CancelToken;

    #[test]
    fn test_decode_and_activate() {
        let json =
            r#"{"input":2,"layers":[{"neurons":1,"activation":"linear"}],"weights":[1,2,3]}"#;
        let model: MlpModel = decode(json.as_bytes()).unwrap();
        let mut mlp: Mlp<f64> = Mlp::from_model(&model, Engine::default()).unwrap();
        assert_eq!(mlp.activate(&[1.0, 1.0], &CancelToken::new()).unwrap(), &[6.0]);
        assert_eq!(mlp.to_model(), model);
    }

    #[test]
    fn test_missing_weights() {
        let json = r#"{"input":2,"layers":[{"neurons":1,"activation":"linear"}]}"#;
        let model: MlpModel = decode(json.as_bytes()).unwrap();
        assert!(model.weights.is_empty());
        assert!(Mlp::<f64>::from_model(&model, Engine::default()).is_err());
    }
}
