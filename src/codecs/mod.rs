//! JSON persistence for trained networks.
//!
//! Networks convert to plain model structs (`to_model`/`from_model`) which
//! are (de)serialized with serde_json. Weights are stored as `f64`, so
//! `f32` and `f64` networks round-trip exactly.

pub mod mlp;
pub mod som;

pub use mlp::MlpModel;
pub use som::SomModel;

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Writes `model` as JSON to `writer`.
pub fn encode<M: Serialize, W: Write>(model: &M, writer: W) -> Result<()> {
    serde_json::to_writer(writer, model)?;
    Ok(())
}

/// Reads a JSON model from `reader`.
pub fn decode<M: DeserializeOwned, R: Read>(reader: R) -> Result<M> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes `model` to the file at `path`, replacing it.
pub fn save<M: Serialize, P: AsRef<Path>>(model: &M, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    encode(model, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Reads a model from the file at `path`.
pub fn load<M: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<M> {
    decode(BufReader::new(File::open(path)?))
}
