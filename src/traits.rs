//! Distribution traits
//!
//! Predictive distributions expose a small, uniform surface — density,
//! sampling, moments — so that code consuming a surrogate (acquisition
//! rules, plotting, diagnostics) can be generic over the distribution
//! family instead of matching on concrete types.

use rand::Rng;

/// A distribution with a probability density
pub trait HasDensity<X> {
    /// Probability density function (PDF) at `x`
    fn f(&self, x: &X) -> f64 {
        self.ln_f(x).exp()
    }

    /// Log probability density function (PDF) at `x`
    fn ln_f(&self, x: &X) -> f64;
}

/// A distribution from which samples may be drawn
pub trait Sampleable<X> {
    /// Single draw from the distribution
    fn draw<R: Rng>(&self, rng: &mut R) -> X;

    /// Multiple draws from the distribution
    fn sample<R: Rng>(&self, n: usize, mut rng: &mut R) -> Vec<X> {
        (0..n).map(|_| self.draw(&mut rng)).collect()
    }

    /// Create a never-ending iterator of samples
    fn sample_stream<'r, R: Rng>(
        &'r self,
        mut rng: &'r mut R,
    ) -> Box<dyn Iterator<Item = X> + 'r>
    where
        X: 'r,
    {
        Box::new(std::iter::repeat_with(move || self.draw(&mut rng)))
    }
}

/// Defines the support of a distribution
pub trait Support<X> {
    /// Returns `true` if `x` is in the support of the distribution
    fn supports(&self, x: &X) -> bool;
}

/// A continuous probability distribution
pub trait ContinuousDistr<X>: HasDensity<X> + Support<X> {
    /// The value of the PDF at `x`
    fn pdf(&self, x: &X) -> f64 {
        self.ln_pdf(x).exp()
    }

    /// The value of the log PDF at `x`
    fn ln_pdf(&self, x: &X) -> f64 {
        self.ln_f(x)
    }
}

/// Interface for distributions with a mean
pub trait Mean<M> {
    /// Returns the mean, if it exists
    fn mean(&self) -> Option<M>;
}

/// Interface for distributions with a median
pub trait Median<M> {
    /// Returns the median, if it exists
    fn median(&self) -> Option<M>;
}

/// Interface for distributions with a mode
pub trait Mode<M> {
    /// Returns the mode, if it exists
    fn mode(&self) -> Option<M>;
}

/// Interface for distributions with a variance
pub trait Variance<V> {
    /// Returns the variance, if defined
    fn variance(&self) -> Option<V>;
}

/// Interface for distributions with a skewness
pub trait Skewness {
    /// Returns the skewness, if defined
    fn skewness(&self) -> Option<f64>;
}

/// Interface for distributions with a kurtosis
pub trait Kurtosis {
    /// Returns the excess kurtosis, if defined
    fn kurtosis(&self) -> Option<f64>;
}
