use crate::UnaryFn;

/// A trait that represents a value a differentiable function can be evaluated on.
///
/// It is implemented by exactly three kinds: plain `f64` scalars, [`Dual`](crate::Dual)
/// numbers for forward mode and graph [`Node`](crate::Node)s for reverse mode.
/// Elementary functions in [`elem`](crate::elem) dispatch through [`Number::apply`],
/// so a function written once against `T: Number` is evaluated, differentiated
/// forward and differentiated in reverse by the same code.
///
/// Operators with a scalar on the left cannot be expressed as a bound on a
/// generic `T`, hence the `r*` methods. The `function!` macro rewrites
/// `2. * x` into `x.rmul(2.)` for you.
pub trait Number:
    Copy
    + std::ops::Neg<Output = Self>
    + std::ops::Add<Self, Output = Self>
    + std::ops::Add<f64, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::Sub<f64, Output = Self>
    + std::ops::Mul<Self, Output = Self>
    + std::ops::Mul<f64, Output = Self>
    + std::ops::Div<Self, Output = Self>
    + std::ops::Div<f64, Output = Self>
{
    /// The primal value.
    fn value(&self) -> f64;

    /// Apply an elementary function, propagating the derivative the way this kind does.
    fn apply(self, f: &dyn UnaryFn) -> Self;

    /// `self ** exp` where both sides may carry a derivative.
    fn pow(self, exp: Self) -> Self;

    /// `self ** exp` with a constant exponent.
    fn powf(self, exp: f64) -> Self;

    /// `lhs - self`
    fn rsub(self, lhs: f64) -> Self;

    /// `lhs / self`
    fn rdiv(self, lhs: f64) -> Self;

    /// `base ** self`
    fn rpow(self, base: f64) -> Self;

    /// `lhs + self`
    fn radd(self, lhs: f64) -> Self {
        self + lhs
    }

    /// `lhs * self`
    fn rmul(self, lhs: f64) -> Self {
        self * lhs
    }
}

impl Number for f64 {
    fn value(&self) -> f64 {
        *self
    }

    fn apply(self, f: &dyn UnaryFn) -> Self {
        f.f(self)
    }

    fn pow(self, exp: Self) -> Self {
        f64::powf(self, exp)
    }

    fn powf(self, exp: f64) -> Self {
        f64::powf(self, exp)
    }

    fn rsub(self, lhs: f64) -> Self {
        lhs - self
    }

    fn rdiv(self, lhs: f64) -> Self {
        lhs / self
    }

    fn rpow(self, base: f64) -> Self {
        f64::powf(base, self)
    }
}
