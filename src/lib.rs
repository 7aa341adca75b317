//! Student's t process regression for surrogate modeling.
//!
//! `stproc` fits a hierarchical kernel regression model to sparse, noisy
//! observations of an expensive function over a bounded input space and
//! returns a full posterior predictive distribution at any query location,
//! so an outer search procedure can trade off exploration against
//! exploitation.
//!
//! The model places a Normal-Inverse-Gamma hyperprior on an unknown
//! mean-offset coefficient vector and an unknown signal scale, couples it
//! with a kernel-induced covariance over the inputs, and marginalizes the
//! scale analytically. The resulting predictive is a heavy-tailed
//! [Student's t](dist::StudentsT), not a Gaussian.
//!
//! # Example
//!
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use stproc::kernel::RBFKernel;
//! use stproc::process::{
//!     ConstantMean, NigParams, StudentTProcessNig, StudentTProcessParams,
//! };
//!
//! let x_train = DMatrix::from_column_slice(3, 1, &[0.0, 0.5, 1.0]);
//! let y_train = DVector::from_column_slice(&[1.2, 0.1, -0.8]);
//!
//! let kernel = RBFKernel::new(0.3).unwrap();
//! let prior = NigParams::isotropic(1, 0.0, 1.0, 1.0, 1.0).unwrap();
//!
//! let mut stp = StudentTProcessNig::new(
//!     kernel,
//!     ConstantMean,
//!     prior,
//!     &x_train,
//!     &y_train,
//!     StudentTProcessParams::default(),
//! )
//! .unwrap();
//!
//! stp.update_posterior().unwrap();
//! stp.precompute_prediction().unwrap();
//!
//! let pred = stp.prediction(&DVector::from_column_slice(&[0.25])).unwrap();
//! assert!(pred.scale() > 0.0);
//! assert!(pred.v() > 2.0);
//!
//! // The likelihood of the current hyperparameters, for an outer search
//! let nll = stp.neg_log_likelihood().unwrap();
//! assert!(nll.is_finite());
//! ```
//!
//! # Feature flags
//!
//! - `serde1`: enables serialization/deserialization of kernels, priors,
//!   distributions, and errors via [serde](https://docs.rs/serde)

pub mod consts;
pub mod dist;
pub mod kernel;
pub mod misc;
pub mod prelude;
pub mod process;
pub mod traits;
