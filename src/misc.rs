//! Small numerical helpers

use special::Gamma as _;

/// Natural log of the gamma function
#[inline]
pub fn ln_gammafn(x: f64) -> f64 {
    x.ln_gamma().0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1E-12;

    #[test]
    fn ln_gamma_of_integers() {
        // Γ(n) = (n-1)!
        assert::close(ln_gammafn(1.0), 0.0, TOL);
        assert::close(ln_gammafn(2.0), 0.0, TOL);
        assert::close(ln_gammafn(5.0), 24.0_f64.ln(), TOL);
    }

    #[test]
    fn ln_gamma_half() {
        // Γ(1/2) = √π
        assert::close(
            ln_gammafn(0.5),
            std::f64::consts::PI.sqrt().ln(),
            TOL,
        );
    }
}
