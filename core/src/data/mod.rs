//! Config documents: YAML load/save and the quick-build synthesizer.

pub mod builder;
pub mod loader;
