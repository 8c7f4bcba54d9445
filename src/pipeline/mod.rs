//! pipeline — end-to-end fit and its configuration.
//!
//! Purpose
//! -------
//! Tie the data, features, and model layers into one fit entry point,
//! [`FittedPipeline::fit`], configured by [`PipelineOptions`]. The fitted
//! value is what the scenario simulator, the CLI, and the Python bindings
//! share.
//!
//! Control flow
//! ------------
//! cleaned observations → per-channel adstock → feature matrix → scaler →
//! OLS (once) → channel averages + sales trend. Cross-validation runs on
//! demand against the stored scaled matrix.

pub mod fitted;
pub mod options;

pub use self::fitted::FittedPipeline;
pub use self::options::PipelineOptions;
