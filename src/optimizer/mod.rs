pub mod anneal;
pub mod ascent;
pub mod mutation;
pub mod runner;

pub use self::anneal::{metropolis_accept, temperature, Anneal, AnnealStep};
pub use self::ascent::{AscentStep, SteepestAscent};
pub use self::runner::{
    NoProgress, OptimizationOptions, OptimizationResult, Optimizer, ProgressCallback,
};
