//! Public library API for decoding schema-encoded state buffers into live object graphs.

/// Type registry, primitive codec, object graph mutator, and decode engine.
pub mod schema;
