//! SOM model format.

use crate::calculus::Real;
use crate::engine::Engine;
use crate::error::{NeuriteError, Result};
use crate::metrics::Metric;
use crate::som::{Som, Topology};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persisted form of a [`Som`].
///
/// ```json
/// {"features": 4, "metric": "euclidean", "shape": [2, 3],
///  "topology": "hexagonal", "weights": [0.1, ...]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SomModel {
    /// Weights per neuron.
    pub features: usize,
    /// Metric name. Older files call this field `metrics`.
    #[serde(alias = "metrics", default = "default_metric")]
    pub metric: String,
    /// Map shape.
    pub shape: Vec<usize>,
    /// Topology name.
    #[serde(default = "default_topology")]
    pub topology: String,
    /// Flat weights, neuron after neuron.
    pub weights: Vec<f64>,
}

fn default_metric() -> String {
    Metric::default().name().to_string()
}

fn default_topology() -> String {
    Topology::default().name().to_string()
}

impl SomModel {
    /// Writes the model to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        super::save(self, path)
    }

    /// Reads a model from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        super::load(path)
    }
}

impl<T: Real> Som<T> {
    /// Snapshot of the configuration and weights.
    pub fn to_model(&self) -> SomModel {
        SomModel {
            features: self.features(),
            metric: self.metric().name().to_string(),
            shape: self.shape().to_vec(),
            topology: self.topology().name().to_string(),
            weights: self.weights().iter().map(|w| w.as_f64()).collect(),
        }
    }

    /// Rebuilds an initialized map from `model`.
    pub fn from_model(model: &SomModel, engine: Engine) -> Result<Self> {
        let topology = Topology::get(&model.topology).ok_or_else(|| {
            NeuriteError::invalid(format!("unknown topology: {}", model.topology))
        })?;
        let weights = model.weights.iter().map(|&w| T::of(w)).collect();
        let mut som = Som::new(model.features, model.shape.clone(), engine)?
            .with_topology(topology)
            .with_metric_name(&model.metric)?
            .with_weights(weights)?;
        som.init()?;
        Ok(som)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::{decode, encode};

    fn model() -> SomModel {
        SomModel {
            features: 2,
            metric: "manhattan".into(),
            shape: vec![1, 2],
            topology: "rectangular".into(),
            weights: vec![0.1, 0.2, 0.3, 0.4],
        }
    }

    #[test]
    fn test_encode_decode() {
        let mut buffer = Vec::new();
        encode(&model(), &mut buffer).unwrap();
        let json = String::from_utf8(buffer.clone()).unwrap();
        assert!(json.contains("\"topology\":\"rectangular\""));
        let decoded: SomModel = decode(buffer.as_slice()).unwrap();
        assert_eq!(decoded, model());
    }

    #[test]
    fn test_legacy_metrics_key() {
        let json =
            r#"{"features":1,"metrics":"sum","shape":[2],"topology":"linear","weights":[1,2]}"#;
        let decoded: SomModel = decode(json.as_bytes()).unwrap();
        assert_eq!(decoded.metric, "sum");
    }

    #[test]
    fn test_from_model() {
        let som: Som<f32> = Som::from_model(&model(), Engine::default()).unwrap();
        assert!(som.is_initialized());
        assert_eq!(som.metric(), Metric::Manhattan);
        assert_eq!(som.topology(), Topology::Rectangular);
        assert_eq!(som.len(), 2);
        assert_eq!(som.to_model().weights.len(), 4);
    }

    #[test]
    fn test_from_model_rejects_bad_names() {
        let mut bad = model();
        bad.topology = "toroidal".into();
        assert!(Som::<f64>::from_model(&bad, Engine::default()).is_err());

        let mut bad = model();
        bad.metric = "cosine".into();
        assert!(Som::<f64>::from_model(&bad, Engine::default()).is_err());

        let mut bad = model();
        bad.weights.pop();
        assert!(Som::<f64>::from_model(&bad, Engine::default()).is_err());
    }
}
