//! Various utility functions (e.g. unit macros, test helpers)
pub mod test_helper;
pub mod uom_macros;

/// Default relative tolerance for geometric comparisons in scene units.
pub const GEOM_EPSILON: f64 = 1e-9;
