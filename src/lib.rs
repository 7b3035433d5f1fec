//! Public library API for picking and coercing leaves of loosely-typed value trees.

/// Dynamic values, path notation, traversal, and the conversion engine.
pub mod pick;
