//! Sample sources, selection strategies and samplers.
//!
//! Two ways of feeding training:
//! - pull: a [`Sampler`] draws from an indexed [`Source`] through a
//!   per-epoch [`Strategy`];
//! - push: a [`StreamSampler`] forwards whatever a producer closure yields.
//!
//! Both implement [`Samples`], the interface the SOM trainer consumes.

mod sampler;
mod source;
mod strategy;

pub use sampler::{Sampler, Samples, StrategyFactory, StreamSampler};
pub use source::{split_set, LimitedSource, SliceSource, Source};
pub use strategy::{Random, Shuffled, Strategy, Systematic};
