use nalgebra::linalg::Cholesky;
use nalgebra::{DMatrix, DVector, Dyn};
use std::fmt;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::consts::HALF_LN_2PI;
use crate::dist::StudentsT;
use crate::kernel::{Kernel, KernelError};
use crate::misc::ln_gammafn;

use super::mean::MeanFunction;
use super::nig::NigParams;
use super::noise::NoiseModel;

/// Errors from the regression engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum ProcessError {
    /// The covariance matrix could not be factorized. The current
    /// hyperparameter vector is infeasible; an outer search should score it
    /// as arbitrarily bad and move on.
    IllConditionedCovariance {
        /// Size of the offending matrix
        n: usize,
    },
    /// Too few observations for the requested quantity
    DegenerateInput {
        /// Number of observations available
        n_obs: usize,
    },
    /// The posterior or prediction cache is missing or out of date. The
    /// caller skipped `update_posterior`/`precompute_prediction` after a
    /// hyperparameter change.
    CacheNotReady,
    /// Dimensions of related inputs disagree
    ShapeMismatch {
        /// Expected dimension
        expected: usize,
        /// Dimension given
        got: usize,
    },
}

impl std::error::Error for ProcessError {}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllConditionedCovariance { n } => write!(
                f,
                "{}x{} covariance matrix is not positive-definite",
                n, n
            ),
            Self::DegenerateInput { n_obs } => {
                write!(f, "too few observations: {}", n_obs)
            }
            Self::CacheNotReady => write!(
                f,
                "posterior/prediction state is stale; call update_posterior \
                 and precompute_prediction first"
            ),
            Self::ShapeMismatch { expected, got } => {
                write!(f, "expected dimension {}, got {}", expected, got)
            }
        }
    }
}

/// Outcome of [`StudentTProcessNig::precompute_prediction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum PrecomputeStatus {
    /// The cache was built from the training data
    Ready,
    /// The training set is empty; the cache encodes the prior predictive
    PriorOnly,
}

/// Parameters for running a [`StudentTProcessNig`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct StudentTProcessParams {
    /// Observation-noise model folded into the training covariance
    noise_model: NoiseModel,
}

impl StudentTProcessParams {
    /// Use the given noise model
    #[must_use]
    pub fn with_noise_model(self, noise_model: NoiseModel) -> Self {
        Self { noise_model }
    }

    /// The noise model in effect
    pub fn noise_model(&self) -> &NoiseModel {
        &self.noise_model
    }
}

impl Default for StudentTProcessParams {
    fn default() -> Self {
        Self {
            noise_model: NoiseModel::default(),
        }
    }
}

/// Posterior over the mean-offset coefficients and the signal scale,
/// overwritten as a unit by every `update_posterior`.
#[derive(Debug, Clone, PartialEq)]
pub struct NigPosterior {
    /// MAP estimate of the mean-offset coefficients, wₙ
    w_map: DVector<f64>,
    /// MAP estimate of the signal variance, rate / (shape + 1)
    sigma_map: f64,
    /// Posterior shape αₙ = α₀ + N/2
    shape: f64,
    /// Posterior rate βₙ
    rate: f64,
    /// ln|K| from the covariance factor diagonal
    ln_det_k: f64,
    /// ln|Λₙ| of the posterior coefficient precision
    ln_det_prec: f64,
    n_obs: usize,
    generation: u64,
}

impl NigPosterior {
    /// MAP estimate of the mean-offset coefficients
    #[inline]
    pub fn coefficients(&self) -> &DVector<f64> {
        &self.w_map
    }

    /// MAP estimate of the signal variance
    #[inline]
    pub fn signal_variance(&self) -> f64 {
        self.sigma_map
    }

    /// Posterior shape αₙ
    #[inline]
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Posterior rate βₙ
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Number of observations the posterior was computed from
    #[inline]
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }
}

/// Per-query work that does not depend on the query, recomputed as a unit
/// by every `precompute_prediction`.
#[derive(Debug, Clone)]
struct PredictionCache {
    /// Cholesky factor of the noise-augmented training covariance
    chol: Cholesky<f64, Dyn>,
    /// K⁻¹Φ, folding the mean-offset design basis into variance corrections
    kinv_phi: DMatrix<f64>,
    /// Λₙ⁻¹, the posterior coefficient covariance up to σ²
    prec_inv: DMatrix<f64>,
    /// K⁻¹(y − Φwₙ), dual coefficients of the de-trended training data
    alpha: DVector<f64>,
    generation: u64,
}

/// Student's t process regression with a Normal-Inverse-Gamma hyperprior on
/// the mean offset and signal variance.
///
/// The model is
///
/// ```math
///     y = \Phi w + f, \quad
///     f \sim \mathcal{GP}(0, \sigma^2 K), \quad
///     w \sim \mathcal{N}(w_0, \sigma^2 \Lambda_0^{-1}), \quad
///     \sigma^2 \sim \text{InvGamma}(\alpha_0, \beta_0)
/// ```
///
/// where `K` is the kernel correlation matrix over the training inputs and
/// `Φ` the mean-basis design matrix. Because σ² is marginalized in closed
/// form, the predictive at any query is a Student's t with `2αₙ` degrees of
/// freedom rather than a Gaussian.
///
/// # Call protocol
///
/// After construction or [`reparameterize`](Self::reparameterize), call
/// [`update_posterior`](Self::update_posterior), then
/// [`precompute_prediction`](Self::precompute_prediction), then any number
/// of [`prediction`](Self::prediction) calls. A generation counter tracks
/// the protocol: reading out of order yields
/// [`ProcessError::CacheNotReady`] instead of stale results.
///
/// # Concurrency
///
/// `prediction` and `neg_log_likelihood` take `&self` and share no mutable
/// scratch state, so predictions against a stable cache may run in
/// parallel; the mutating recomputes take `&mut self` and are therefore
/// serialized by the borrow checker. The training data is borrowed for the
/// model's lifetime, so it cannot change out from under a valid cache.
pub struct StudentTProcessNig<'a, K, M>
where
    K: Kernel,
    M: MeanFunction,
{
    /// Covariance kernel
    kernel: K,
    /// Mean-offset feature basis
    mean: M,
    /// NIG hyperprior constants
    prior: NigParams,
    /// x values used in training, one location per row
    x_train: &'a DMatrix<f64>,
    /// y values used in training
    y_train: &'a DVector<f64>,
    /// Given parameters
    params: StudentTProcessParams,
    posterior: Option<NigPosterior>,
    cache: Option<PredictionCache>,
    /// Bumped on every hyperparameter change
    generation: u64,
}

impl<'a, K, M> StudentTProcessNig<'a, K, M>
where
    K: Kernel,
    M: MeanFunction,
{
    /// Create a new process over the given training data.
    ///
    /// # Arguments
    /// * `kernel` - Kernel to use to determine covariance
    /// * `mean` - Feature basis for the mean offset
    /// * `prior` - NIG hyperprior constants; must cover `mean.n_features()`
    ///   coefficients
    /// * `x_train` - Training inputs, one location per row
    /// * `y_train` - Observed values, one per training input
    /// * `params` - `StudentTProcessParams` to use. Can just use
    ///   `StudentTProcessParams::default()`.
    pub fn new(
        kernel: K,
        mean: M,
        prior: NigParams,
        x_train: &'a DMatrix<f64>,
        y_train: &'a DVector<f64>,
        params: StudentTProcessParams,
    ) -> Result<Self, ProcessError> {
        if x_train.nrows() != y_train.len() {
            return Err(ProcessError::ShapeMismatch {
                expected: x_train.nrows(),
                got: y_train.len(),
            });
        }
        if prior.n_features() != mean.n_features() {
            return Err(ProcessError::ShapeMismatch {
                expected: mean.n_features(),
                got: prior.n_features(),
            });
        }
        Ok(StudentTProcessNig {
            kernel,
            mean,
            prior,
            x_train,
            y_train,
            params,
            posterior: None,
            cache: None,
            generation: 0,
        })
    }

    /// Return the kernel being used in this process
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Return the mean-offset feature basis
    pub fn mean_function(&self) -> &M {
        &self.mean
    }

    /// Return the NIG hyperprior constants
    pub fn prior(&self) -> &NigParams {
        &self.prior
    }

    /// Return the posterior from the most recent `update_posterior`, if any
    pub fn posterior(&self) -> Option<&NigPosterior> {
        self.posterior.as_ref()
    }

    /// The training inputs this process was built over
    pub fn x_train(&self) -> &DMatrix<f64> {
        self.x_train
    }

    /// The training observations this process was built over
    pub fn y_train(&self) -> &DVector<f64> {
        self.y_train
    }

    /// MAP estimate of the signal variance from the most recent successful
    /// `update_posterior`, if any.
    pub fn signal_variance(&self) -> Option<f64> {
        self.posterior.as_ref().map(|p| p.sigma_map)
    }

    /// Swap in a kernel rebuilt from the given log-scale parameter vector.
    ///
    /// Invalidates the posterior and the prediction cache;
    /// `update_posterior` and `precompute_prediction` must run again before
    /// the next prediction.
    pub fn reparameterize(
        &mut self,
        params: &[f64],
    ) -> Result<(), KernelError> {
        self.kernel = self.kernel.reparameterize(params)?;
        self.generation += 1;
        Ok(())
    }

    /// Recompute the NIG posterior from the current training data and
    /// hyperparameters.
    ///
    /// Mutates only the posterior; the prediction cache is left untouched
    /// and goes stale if the hyperparameters changed.
    pub fn update_posterior(&mut self) -> Result<(), ProcessError> {
        let n = self.x_train.nrows();
        let p = self.mean.n_features();

        let cov = self.kernel.covariance(self.x_train, self.x_train);
        let k = self.params.noise_model.add_noise_to_kernel(&cov)?;
        let chol = cholesky_checked(k)?;
        let ln_det_k =
            2.0 * chol.l_dirty().diagonal().map(|x| x.ln()).sum();

        let phi = self.mean.design_matrix(self.x_train);
        let kinv_phi = chol.solve(&phi);
        let kinv_y = chol.solve(self.y_train);

        // Λₙ = Λ₀ + ΦᵀK⁻¹Φ
        let mut prec_post = phi.transpose() * &kinv_phi;
        for i in 0..p {
            prec_post[(i, i)] += self.prior.precision()[i];
        }
        let prec_chol = cholesky_checked(prec_post)?;
        let ln_det_prec =
            2.0 * prec_chol.l_dirty().diagonal().map(|x| x.ln()).sum();

        // wₙ = Λₙ⁻¹(Λ₀w₀ + ΦᵀK⁻¹y)
        let b = self.prior.precision().component_mul(self.prior.loc())
            + phi.transpose() * &kinv_y;
        let w_map = prec_chol.solve(&b);

        let shape = (n as f64).mul_add(0.5, self.prior.shape());
        // βₙ = β₀ + ½(yᵀK⁻¹y + w₀ᵀΛ₀w₀ − wₙᵀΛₙwₙ); Λₙwₙ = b by construction
        let w0_quad = self
            .prior
            .loc()
            .dot(&self.prior.precision().component_mul(self.prior.loc()));
        let quad = self.y_train.dot(&kinv_y) + w0_quad - w_map.dot(&b);
        let rate = quad.mul_add(0.5, self.prior.rate());
        let sigma_map = rate / (shape + 1.0);

        self.posterior = Some(NigPosterior {
            w_map,
            sigma_map,
            shape,
            rate,
            ln_det_k,
            ln_det_prec,
            n_obs: n,
            generation: self.generation,
        });
        Ok(())
    }

    /// Negative log marginal likelihood of the training data under the
    /// current hyperparameters, for an external search to minimize.
    ///
    /// Fail-fast: this never recomputes the posterior behind the caller's
    /// back. A missing or stale posterior yields
    /// [`ProcessError::CacheNotReady`]; call
    /// [`update_posterior`](Self::update_posterior) first.
    pub fn neg_log_likelihood(&self) -> Result<f64, ProcessError> {
        let post = self.fresh_posterior()?;
        if post.n_obs == 0 {
            return Err(ProcessError::DegenerateInput { n_obs: 0 });
        }
        let n = post.n_obs as f64;
        let a0 = self.prior.shape();
        let b0 = self.prior.rate();

        let ln_m = (ln_gammafn(post.shape) - ln_gammafn(a0))
            + a0.mul_add(b0.ln(), -(post.shape * post.rate.ln()))
            + 0.5 * (self.prior.ln_det_precision() - post.ln_det_prec)
            - 0.5 * post.ln_det_k
            - n * HALF_LN_2PI;
        Ok(-ln_m)
    }

    /// Build the per-query work that does not depend on the query: the
    /// covariance factorization, `K⁻¹Φ`, `Λₙ⁻¹`, and the dual coefficients
    /// of the de-trended data.
    ///
    /// Must run after every successful
    /// [`update_posterior`](Self::update_posterior) and before the next
    /// [`prediction`](Self::prediction). With an empty training set the
    /// cache is still valid — predictions then report the prior predictive
    /// — and the degenerate case is flagged through
    /// [`PrecomputeStatus::PriorOnly`].
    pub fn precompute_prediction(
        &mut self,
    ) -> Result<PrecomputeStatus, ProcessError> {
        let w_map = self.fresh_posterior()?.w_map.clone();

        let n = self.x_train.nrows();
        let p = self.mean.n_features();

        let cov = self.kernel.covariance(self.x_train, self.x_train);
        let k = self.params.noise_model.add_noise_to_kernel(&cov)?;
        let chol = cholesky_checked(k)?;

        let phi = self.mean.design_matrix(self.x_train);
        let kinv_phi = chol.solve(&phi);

        let mut prec_post = phi.transpose() * &kinv_phi;
        for i in 0..p {
            prec_post[(i, i)] += self.prior.precision()[i];
        }
        let prec_inv = cholesky_checked(prec_post)?.inverse();

        let resid = self.y_train - &phi * &w_map;
        let alpha = chol.solve(&resid);

        self.cache = Some(PredictionCache {
            chol,
            kinv_phi,
            prec_inv,
            alpha,
            generation: self.generation,
        });

        if n == 0 {
            Ok(PrecomputeStatus::PriorOnly)
        } else {
            Ok(PrecomputeStatus::Ready)
        }
    }

    /// Predictive distribution at a single query location.
    ///
    /// The query is expected to lie in the unit hypercube the training
    /// inputs came from; finite coordinates outside it are answered by the
    /// same formulas and never corrupt state. Read-only: concurrent
    /// predictions against the same cache are safe.
    ///
    /// # Errors
    ///
    /// [`ProcessError::CacheNotReady`] when `update_posterior` +
    /// `precompute_prediction` have not run since the last hyperparameter
    /// change. No other error is possible for finite queries.
    pub fn prediction(
        &self,
        query: &DVector<f64>,
    ) -> Result<StudentsT, ProcessError> {
        let post = self.fresh_posterior()?;
        let cache = self
            .cache
            .as_ref()
            .filter(|c| c.generation == self.generation)
            .ok_or(ProcessError::CacheNotReady)?;

        let q = query.transpose();
        let k_star: DVector<f64> = self
            .kernel
            .covariance(self.x_train, &q)
            .column(0)
            .into_owned();
        let k_self = self.kernel.diag(&q)[0]
            + self.params.noise_model.query_noise_variance();
        let phi_q = self.mean.features(query);

        let v = cache.chol.solve(&k_star);
        // r = φ(q) − ΦᵀK⁻¹k*, the query's exposure to coefficient
        // uncertainty
        let r = &phi_q - cache.kinv_phi.transpose() * &k_star;

        let loc = phi_q.dot(&post.w_map) + k_star.dot(&cache.alpha);
        let infl = r.dot(&(&cache.prec_inv * &r));
        // round-off can push the kernel term a few ulps negative at a
        // training input; the scale must stay strictly positive
        let total_var =
            (k_self - k_star.dot(&v) + infl).max(f64::EPSILON);
        let scale = (post.rate / post.shape * total_var).sqrt();

        Ok(StudentsT::new_unchecked(2.0 * post.shape, loc, scale))
    }

    fn fresh_posterior(&self) -> Result<&NigPosterior, ProcessError> {
        self.posterior
            .as_ref()
            .filter(|p| p.generation == self.generation)
            .ok_or(ProcessError::CacheNotReady)
    }
}

/// Factorize a symmetric matrix, rejecting factors with non-positive or
/// non-finite pivots. An exactly singular matrix can produce a zero pivot
/// without failing nalgebra's decomposition.
fn cholesky_checked(
    m: DMatrix<f64>,
) -> Result<Cholesky<f64, Dyn>, ProcessError> {
    let n = m.nrows();
    let chol = Cholesky::new(m)
        .ok_or(ProcessError::IllConditionedCovariance { n })?;
    if chol
        .l_dirty()
        .diagonal()
        .iter()
        .any(|&d| d <= 0.0 || !d.is_finite())
    {
        return Err(ProcessError::IllConditionedCovariance { n });
    }
    Ok(chol)
}
