//! Rubik's cube CFOP solver: cross and F2L by exhaustive search over move
//! plans, last layer by pattern recognition.

pub mod algorithm;
pub mod catalog;
pub mod cfop;
pub mod config;
pub mod cube;
pub mod face;
pub mod recognition;
pub mod scramble;
pub mod search;
pub mod spin;

pub use algorithm::{Algorithm, ParseAlgorithmError, Step};
pub use cfop::{Cfop, CfopError, Stage, StageReport};
pub use config::{LastLayer, SolverConfig};
pub use cube::{CubeError, CubeState, PieceGroup};
pub use face::{Amount, Axis, Color, Face};
pub use search::{DeepSearch, Plan, Policy, SearchOutcome};
pub use spin::Spin;
