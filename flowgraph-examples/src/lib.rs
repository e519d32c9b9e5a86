//! Example binaries for flowgraph; see the `examples/` directory.
//!
//! Run one with `cargo run -p flowgraph-examples --example chatflow`.
