//! Aggregator tests over an in-memory source tree
