//! Elementary functions with known closed-form derivatives.
//!
//! Each function takes any [`Number`] and returns the same kind: the plain value for
//! `f64`, the chain rule applied to a [`Dual`](crate::Dual), or a new child in the
//! graph of a [`Node`](crate::Node).

use crate::{Number, PtrUnaryFn, UnaryFn};

pub const SIN: PtrUnaryFn = PtrUnaryFn {
    name: "sin",
    f: f64::sin,
    grad: f64::cos,
};

pub const COS: PtrUnaryFn = PtrUnaryFn {
    name: "cos",
    f: f64::cos,
    grad: |x| -x.sin(),
};

pub const TAN: PtrUnaryFn = PtrUnaryFn {
    name: "tan",
    f: f64::tan,
    grad: |x| 1. / x.cos().powi(2),
};

pub const EXP: PtrUnaryFn = PtrUnaryFn {
    name: "exp",
    f: f64::exp,
    grad: f64::exp,
};

pub const SQRT: PtrUnaryFn = PtrUnaryFn {
    name: "sqrt",
    f: f64::sqrt,
    grad: |x| 0.5 / x.sqrt(),
};

pub const LOG: PtrUnaryFn = PtrUnaryFn {
    name: "log",
    f: f64::ln,
    grad: |x| 1. / x,
};

pub const ARCSIN: PtrUnaryFn = PtrUnaryFn {
    name: "arcsin",
    f: f64::asin,
    grad: |x| 1. / (1. - x * x).sqrt(),
};

pub const ARCCOS: PtrUnaryFn = PtrUnaryFn {
    name: "arccos",
    f: f64::acos,
    grad: |x| -1. / (1. - x * x).sqrt(),
};

pub const ARCTAN: PtrUnaryFn = PtrUnaryFn {
    name: "arctan",
    f: f64::atan,
    grad: |x| 1. / (1. + x * x),
};

pub const SINH: PtrUnaryFn = PtrUnaryFn {
    name: "sinh",
    f: f64::sinh,
    grad: f64::cosh,
};

pub const COSH: PtrUnaryFn = PtrUnaryFn {
    name: "cosh",
    f: f64::cosh,
    grad: f64::sinh,
};

pub const TANH: PtrUnaryFn = PtrUnaryFn {
    name: "tanh",
    f: f64::tanh,
    grad: |x| 1. - x.tanh().powi(2),
};

pub const LOGISTIC: PtrUnaryFn = PtrUnaryFn {
    name: "logistic",
    f: sigmoid,
    grad: |x| {
        let s = sigmoid(x);
        s * (1. - s)
    },
};

fn sigmoid(x: f64) -> f64 {
    1. / (1. + (-x).exp())
}

/// Logarithm in an arbitrary base. Only the argument is differentiated, the base is a constant.
#[derive(Clone, Copy, Debug)]
pub struct LogB {
    pub base: f64,
}

impl UnaryFn for LogB {
    fn name(&self) -> &str {
        "logb"
    }
    fn f(&self, data: f64) -> f64 {
        data.ln() / self.base.ln()
    }
    fn grad(&self, data: f64) -> f64 {
        1. / (data * self.base.ln())
    }
}

pub fn sin<T: Number>(z: T) -> T {
    z.apply(&SIN)
}

pub fn cos<T: Number>(z: T) -> T {
    z.apply(&COS)
}

pub fn tan<T: Number>(z: T) -> T {
    z.apply(&TAN)
}

pub fn exp<T: Number>(z: T) -> T {
    z.apply(&EXP)
}

pub fn sqrt<T: Number>(z: T) -> T {
    z.apply(&SQRT)
}

/// Natural logarithm.
pub fn log<T: Number>(z: T) -> T {
    z.apply(&LOG)
}

pub fn logb<T: Number>(z: T, base: f64) -> T {
    z.apply(&LogB { base })
}

pub fn arcsin<T: Number>(z: T) -> T {
    z.apply(&ARCSIN)
}

pub fn arccos<T: Number>(z: T) -> T {
    z.apply(&ARCCOS)
}

pub fn arctan<T: Number>(z: T) -> T {
    z.apply(&ARCTAN)
}

pub fn sinh<T: Number>(z: T) -> T {
    z.apply(&SINH)
}

pub fn cosh<T: Number>(z: T) -> T {
    z.apply(&COSH)
}

pub fn tanh<T: Number>(z: T) -> T {
    z.apply(&TANH)
}

/// The standard logistic function `1 / (1 + e^-z)`.
pub fn logistic<T: Number>(z: T) -> T {
    z.apply(&LOGISTIC)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Dual, Graph};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    /// (function, closed-form derivative, sample point)
    fn cases() -> [(fn(Dual) -> Dual, fn(f64) -> f64, f64); 14] {
        [
            (sin, |x| x.cos(), 0.3),
            (cos, |x| -x.sin(), 0.3),
            (tan, |x| 1. / x.cos() / x.cos(), 0.3),
            (exp, |x| x.exp(), 0.3),
            (sqrt, |x| 1. / (2. * x.sqrt()), 4.),
            (log, |x| 1. / x, 2.),
            (|z| logb(z, 2.), |x| 1. / (x * 2f64.ln()), 8.),
            (arcsin, |x| 1. / (1. - x * x).sqrt(), 0.5),
            (arccos, |x| -1. / (1. - x * x).sqrt(), 0.5),
            (arctan, |x| 1. / (1. + x * x), 0.5),
            (sinh, |x| x.cosh(), 0.5),
            (cosh, |x| x.sinh(), 0.5),
            (tanh, |x| 1. - x.tanh() * x.tanh(), 0.5),
            (logistic, |x| (-x).exp() / (1. + (-x).exp()).powi(2), 0.5),
        ]
    }

    #[test]
    fn test_scalar_values() {
        assert_abs_diff_eq!(sin(PI / 2.), 1.);
        assert_abs_diff_eq!(cos(0.), 1.);
        assert_abs_diff_eq!(sqrt(9.), 3.);
        assert_abs_diff_eq!(log(std::f64::consts::E), 1.);
        assert_abs_diff_eq!(logb(8., 2.), 3., epsilon = 1e-12);
        assert_abs_diff_eq!(logistic(0.), 0.5);
        assert_abs_diff_eq!(arctan(1.), PI / 4.);
    }

    #[test]
    fn test_dual_chain_rule() {
        for (f, df, x) in cases() {
            let res = f(Dual::with_derivative(x, 2.));
            assert_abs_diff_eq!(res.derivative(), 2. * df(x), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_node_edge() {
        let graph = Graph::new();
        let z = graph.var("z", 0.5);
        let y = arcsin(z);
        assert_abs_diff_eq!(y.value(), 0.5f64.asin());
        assert_eq!(graph.edges(z), vec![(y.index(), 1. / 0.75f64.sqrt())]);
        assert!(graph.edges(y).is_empty());
    }
}
