//! Student's t process regression
//!
//! The surrogate model at the heart of a Bayesian optimization loop: a
//! kernel regression whose unknown mean offset and signal scale carry a
//! Normal-Inverse-Gamma hyperprior, so the predictive at any query is a
//! calibrated, heavy-tailed Student's t.
//!
//! The host loop drives the model through four operations:
//!
//! 1. [`StudentTProcessNig::update_posterior`] after every hyperparameter
//!    change — the closed-form NIG conjugate update against the kernel
//!    covariance.
//! 2. [`StudentTProcessNig::precompute_prediction`] — factorizations and
//!    auxiliary terms shared by every subsequent query.
//! 3. [`StudentTProcessNig::prediction`] — any number of read-only queries
//!    against the cache.
//! 4. [`StudentTProcessNig::neg_log_likelihood`] — the score an external
//!    search minimizes to tune the kernel hyperparameters.
//!
//! Skipping a step is caught by a generation counter and reported as
//! [`ProcessError::CacheNotReady`] rather than answered from stale state.

mod mean;
mod nig;
mod noise;
mod student_t;

pub use mean::{ConstantMean, LinearMean, MeanFunction};
pub use nig::{NigParams, NigParamsError};
pub use noise::NoiseModel;
pub use student_t::{
    NigPosterior, PrecomputeStatus, ProcessError, StudentTProcessNig,
    StudentTProcessParams,
};
