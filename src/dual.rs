use std::cmp::Ordering;

use crate::{Number, UnaryFn};

/// A first order dual number, a value carrying its derivative along one direction.
///
/// Every operation returns a new instance. Only `f64` and `Dual` operands are accepted;
/// anything else is rejected when the program is compiled.
///
/// ```compile_fail
/// use dualgrad::Dual;
/// let _ = Dual::new(1.) + "one";
/// ```
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Dual {
    value: f64,
    derivative: f64,
}

impl Dual {
    /// A dual number seeded as the variable being differentiated (derivative 1).
    pub fn new(value: f64) -> Self {
        Self::with_derivative(value, 1.)
    }

    pub fn with_derivative(value: f64, derivative: f64) -> Self {
        Self { value, derivative }
    }

    pub fn constant(value: f64) -> Self {
        Self::with_derivative(value, 0.)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn derivative(&self) -> f64 {
        self.derivative
    }
}

impl Number for Dual {
    fn value(&self) -> f64 {
        self.value
    }

    fn apply(self, f: &dyn UnaryFn) -> Self {
        Self::with_derivative(f.f(self.value), f.grad(self.value) * self.derivative)
    }

    fn pow(self, exp: Self) -> Self {
        let value = self.value.powf(exp.value);
        // ln(a) is only needed when the exponent varies; skipping it keeps negative bases finite.
        let log_term = if exp.derivative == 0. {
            0.
        } else {
            self.value.ln() * exp.derivative
        };
        Self::with_derivative(
            value,
            value * (log_term + exp.value * self.derivative / self.value),
        )
    }

    fn powf(self, exp: f64) -> Self {
        Self::with_derivative(
            self.value.powf(exp),
            exp * self.value.powf(exp - 1.) * self.derivative,
        )
    }

    fn rsub(self, lhs: f64) -> Self {
        lhs - self
    }

    fn rdiv(self, lhs: f64) -> Self {
        lhs / self
    }

    fn rpow(self, base: f64) -> Self {
        let value = base.powf(self.value);
        Self::with_derivative(value, base.ln() * value * self.derivative)
    }
}

impl std::fmt::Display for Dual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dual({}, {})", self.value, self.derivative)
    }
}

/// Ordered by value alone, the derivative is ignored. Unlike `==`, two duals with the same
/// value and different derivatives compare `Equal` here, so `<=` and `>=` both hold.
impl PartialOrd for Dual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

/// A plain number is a dual number with zero derivative.
impl PartialEq<f64> for Dual {
    fn eq(&self, other: &f64) -> bool {
        *self == Dual::constant(*other)
    }
}

impl PartialOrd<f64> for Dual {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.value.partial_cmp(other)
    }
}

impl std::ops::Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::with_derivative(-self.value, -self.derivative)
    }
}

impl std::ops::Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::with_derivative(self.value + rhs.value, self.derivative + rhs.derivative)
    }
}

impl std::ops::Add<f64> for Dual {
    type Output = Self;
    fn add(self, rhs: f64) -> Self::Output {
        Self::with_derivative(self.value + rhs, self.derivative)
    }
}

impl std::ops::Add<Dual> for f64 {
    type Output = Dual;
    fn add(self, rhs: Dual) -> Self::Output {
        rhs + self
    }
}

impl std::ops::Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::with_derivative(self.value - rhs.value, self.derivative - rhs.derivative)
    }
}

impl std::ops::Sub<f64> for Dual {
    type Output = Self;
    fn sub(self, rhs: f64) -> Self::Output {
        Self::with_derivative(self.value - rhs, self.derivative)
    }
}

impl std::ops::Sub<Dual> for f64 {
    type Output = Dual;
    fn sub(self, rhs: Dual) -> Self::Output {
        Dual::with_derivative(self - rhs.value, -rhs.derivative)
    }
}

impl std::ops::Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self::with_derivative(
            self.value * rhs.value,
            self.value * rhs.derivative + self.derivative * rhs.value,
        )
    }
}

impl std::ops::Mul<f64> for Dual {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::with_derivative(self.value * rhs, self.derivative * rhs)
    }
}

impl std::ops::Mul<Dual> for f64 {
    type Output = Dual;
    fn mul(self, rhs: Dual) -> Self::Output {
        rhs * self
    }
}

impl std::ops::Div for Dual {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        Self::with_derivative(
            self.value / rhs.value,
            (self.derivative * rhs.value - self.value * rhs.derivative) / (rhs.value * rhs.value),
        )
    }
}

impl std::ops::Div<f64> for Dual {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self::with_derivative(self.value / rhs, self.derivative / rhs)
    }
}

impl std::ops::Div<Dual> for f64 {
    type Output = Dual;
    fn div(self, rhs: Dual) -> Self::Output {
        Dual::with_derivative(
            self / rhs.value,
            -self / (rhs.value * rhs.value) * rhs.derivative,
        )
    }
}

#[test]
fn test_dual() {
    let d1 = Dual::with_derivative(1., 2.);
    let d2 = Dual::with_derivative(3., 4.);
    assert_eq!(d1 + d2, Dual::with_derivative(4., 6.));
    assert_eq!(d1 - d2, Dual::with_derivative(-2., -2.));
    assert_eq!(d1 * d2, Dual::with_derivative(3., 10.));
    assert_eq!(d2 / d1, Dual::with_derivative(3., -2.));
    assert_eq!(-d1, Dual::with_derivative(-1., -2.));
    assert_eq!(Dual::new(2.), Dual::with_derivative(2., 1.));
}

#[test]
fn test_dual_scalar() {
    let d = Dual::with_derivative(1., 2.);
    assert_eq!(d + 5., Dual::with_derivative(6., 2.));
    assert_eq!(5. + d, Dual::with_derivative(6., 2.));
    assert_eq!(d - 1., Dual::with_derivative(0., 2.));
    assert_eq!(1. - d, Dual::with_derivative(0., -2.));
    assert_eq!(2. * d, Dual::with_derivative(2., 4.));
    assert_eq!(d / 2., Dual::with_derivative(0.5, 1.));
    assert_eq!(4. / Dual::with_derivative(2., 4.), Dual::with_derivative(2., -4.));
    assert_eq!(d.rsub(1.), 1. - d);
    assert_eq!(d.rdiv(3.), 3. / d);
}

#[test]
fn test_dual_pow() {
    assert_eq!(
        Dual::with_derivative(2., 4.).powf(2.),
        Dual::with_derivative(4., 16.)
    );
    assert_eq!(
        Dual::with_derivative(1., 2.).pow(Dual::with_derivative(3., 4.)),
        Dual::with_derivative(1., 6.)
    );
    let res = Dual::new(2.).rpow(2.);
    assert_eq!(res.value(), 4.);
    assert!((res.derivative() - 4. * 2f64.ln()).abs() < 1e-12);

    // The exponent is constant, so the negative base does not poison the derivative.
    let res = Dual::new(-2.).pow(Dual::constant(2.));
    assert_eq!(res, Dual::with_derivative(4., -4.));
}

#[test]
fn test_dual_compare() {
    let d1 = Dual::with_derivative(1., 2.);
    let d3 = Dual::with_derivative(3., 4.);
    assert!(d1 < d3);
    assert!(!(d1 > d3));
    assert!(d1 <= Dual::with_derivative(1., 2.));
    assert!(d1 != Dual::with_derivative(1., 3.));
    let d2 = Dual::with_derivative(1., 3.);
    assert!(d1 <= d2 && d1 >= d2);
    assert!(!(d1 < d2) && !(d1 > d2));
    assert!(d1 <= 1. && d1 >= 1.);
    assert!(d1 > 0.);
    assert!(d1 < 3.);
    assert!(Dual::constant(1.) == 1.);
    assert!(d1 != 1.);
}

#[test]
fn test_dual_display() {
    assert_eq!(Dual::with_derivative(1., 2.).to_string(), "Dual(1, 2)");
}
