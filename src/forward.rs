//! Forward mode differentiation with dual numbers.
//!
//! One evaluation yields the derivative of every output along one input direction,
//! so a Jacobian of a function with N inputs takes N evaluations.

use log::debug;

use crate::{
    error::AdError,
    function::{Inputs, Jacobian, Value},
    Dual, Function, Output,
};

pub struct Forward<F> {
    func: F,
    arity: usize,
}

impl<F: Function> Forward<F> {
    pub fn new(func: F) -> Self {
        let arity = func.arity();
        Self { func, arity }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn value(&self, inputs: impl Into<Inputs>) -> Result<Value, AdError> {
        let inputs = self.check(inputs.into())?;
        let duals: Vec<_> = inputs.as_slice().iter().map(|&v| Dual::constant(v)).collect();
        Ok(self.func.eval(&duals).map(|d| d.value()).into())
    }

    pub fn derivative(&self, inputs: impl Into<Inputs>) -> Result<Jacobian, AdError> {
        let inputs = self.check(inputs.into())?;
        let inputs = inputs.as_slice();

        if self.arity == 1 {
            debug!("forward: single sweep");
            let res = self.func.eval(&[Dual::new(inputs[0])]);
            return Ok(match res {
                Output::Scalar(d) => Jacobian::Scalar(d.derivative()),
                Output::Vector(v) => Jacobian::Vector(v.iter().map(Dual::derivative).collect()),
            });
        }

        debug!("forward: {} sweeps", self.arity);
        let mut duals: Vec<_> = inputs.iter().map(|&v| Dual::constant(v)).collect();
        let mut columns = Vec::with_capacity(self.arity);
        let mut scalar_output = true;
        for i in 0..self.arity {
            duals[i] = Dual::new(inputs[i]);
            let res = self.func.eval(&duals);
            scalar_output = matches!(res, Output::Scalar(_));
            columns.push(res.into_vec().iter().map(Dual::derivative).collect::<Vec<_>>());
            duals[i] = Dual::constant(inputs[i]);
        }

        Ok(Jacobian::from_rows(
            transpose(columns),
            scalar_output,
            self.arity,
        ))
    }

    fn check(&self, inputs: Inputs) -> Result<Inputs, AdError> {
        if inputs.len() != self.arity {
            return Err(AdError::DimensionMismatch {
                expected: self.arity,
                actual: inputs.len(),
            });
        }
        Ok(inputs)
    }
}

/// Turn per-input columns into per-output rows.
fn transpose(columns: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    let outputs = columns.first().map_or(0, Vec::len);
    (0..outputs)
        .map(|row| columns.iter().map(|column| column[row]).collect())
        .collect()
}

impl<F> std::fmt::Display for Forward<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "forward-mode differentiator of a {}-input function",
            self.arity
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{elem, Number};
    use approx::assert_abs_diff_eq;

    struct Double;

    impl Function for Double {
        fn arity(&self) -> usize {
            1
        }
        fn eval<T: Number>(&self, args: &[T]) -> Output<T> {
            Output::Scalar(args[0] * 2.)
        }
    }

    /// [1.5x + xy, x^y]
    struct Pair;

    impl Function for Pair {
        fn arity(&self) -> usize {
            2
        }
        fn eval<T: Number>(&self, args: &[T]) -> Output<T> {
            let (x, y) = (args[0], args[1]);
            Output::Vector(vec![x * 1.5 + x * y, x.pow(y)])
        }
    }

    struct SqrtSquare;

    impl Function for SqrtSquare {
        fn arity(&self) -> usize {
            1
        }
        fn eval<T: Number>(&self, args: &[T]) -> Output<T> {
            let x = args[0];
            Output::Vector(vec![elem::sqrt(x) + 1., x.powf(2.)])
        }
    }

    #[test]
    fn test_double() {
        let _ = env_logger::builder().is_test(true).try_init();
        let ad = Forward::new(Double);
        assert_eq!(ad.value(3.).unwrap(), Value::Scalar(6.));
        assert_eq!(ad.value([4.]).unwrap(), Value::Scalar(8.));
        assert_eq!(ad.derivative(3.).unwrap(), Jacobian::Scalar(2.));
    }

    #[test]
    fn test_jacobian() {
        let _ = env_logger::builder().is_test(true).try_init();
        let ad = Forward::new(Pair);
        assert_eq!(ad.value([1., 2.]).unwrap(), Value::Vector(vec![3.5, 1.]));
        assert_eq!(
            ad.derivative([1., 2.]).unwrap(),
            Jacobian::Matrix(vec![vec![3.5, 1.], vec![2., 0.]])
        );
    }

    #[test]
    fn test_single_input_multi_output() {
        let ad = Forward::new(SqrtSquare);
        let d = ad.derivative(4.).unwrap();
        let d = d.as_vector().unwrap();
        assert_abs_diff_eq!(d[0], 0.25);
        assert_abs_diff_eq!(d[1], 8.);
    }

    #[test]
    fn test_dimension_mismatch() {
        let ad = Forward::new(Pair);
        assert_eq!(
            ad.derivative([1., 2., 3.]),
            Err(AdError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert!(Forward::new(Double).value([3., 7.]).is_err());
        assert!(Forward::new(Double).derivative(Vec::<f64>::new()).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Forward::new(Pair).to_string(),
            "forward-mode differentiator of a 2-input function"
        );
    }
}
