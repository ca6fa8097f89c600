//! Serialization, deserialization and bookkeeping for the UCI protocol:
//! messages in both directions, time controls, and the option registry.

pub mod client;
pub mod engine;
pub mod options;
pub mod time_control;
