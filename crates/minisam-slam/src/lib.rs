#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Reader for the g2o pose graph text format.
pub mod g2o;
pub use g2o::{load_g2o, parse_g2o, G2oEdge, G2oError, G2oGraph};
