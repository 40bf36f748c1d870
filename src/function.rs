use crate::Number;

/// A function that can be evaluated on any [`Number`] kind, which makes it differentiable
/// by both [`Forward`](crate::Forward) and [`Reverse`](crate::Reverse).
///
/// The function must be pure and built only from the operators of [`Number`] and the
/// functions in [`elem`](crate::elem). Branching on values is not differentiated.
///
/// A function with several outputs must also implement [`Function::eval_output`], so that
/// reverse mode can evaluate each output on a graph of its own. The
/// `dualgrad_macro::function!` macro generates both methods from a closure.
///
/// # Example
///
/// ```
/// use dualgrad::{elem, Forward, Function, Number, Output};
///
/// struct SinProduct;
///
/// impl Function for SinProduct {
///     fn arity(&self) -> usize {
///         2
///     }
///     fn eval<T: Number>(&self, args: &[T]) -> Output<T> {
///         Output::Scalar(elem::sin(args[0] * args[1]))
///     }
/// }
///
/// let d = Forward::new(SinProduct).derivative([0., 2.]).unwrap();
/// assert_eq!(d.as_vector(), Some(&[2., 0.][..]));
/// ```
pub trait Function {
    /// Number of scalar parameters.
    fn arity(&self) -> usize;

    fn eval<T: Number>(&self, args: &[T]) -> Output<T>;

    /// Evaluate only the output at `index`, or `None` if outputs cannot be separated.
    fn eval_output<T: Number>(&self, _index: usize, _args: &[T]) -> Option<T> {
        None
    }
}

impl<F: Function> Function for &F {
    fn arity(&self) -> usize {
        (**self).arity()
    }

    fn eval<T: Number>(&self, args: &[T]) -> Output<T> {
        (**self).eval(args)
    }

    fn eval_output<T: Number>(&self, index: usize, args: &[T]) -> Option<T> {
        (**self).eval_output(index, args)
    }
}

/// The result of one evaluation: a single value or a list of outputs.
#[derive(Clone, Debug, PartialEq)]
pub enum Output<T> {
    Scalar(T),
    Vector(Vec<T>),
}

impl<T> Output<T> {
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Output<U> {
        match self {
            Self::Scalar(v) => Output::Scalar(f(v)),
            Self::Vector(v) => Output::Vector(v.into_iter().map(f).collect()),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Scalar(v) => vec![v],
            Self::Vector(v) => v,
        }
    }
}

/// Point of evaluation. Converts from a single `f64` or a sequence of them.
#[derive(Clone, Debug, PartialEq)]
pub struct Inputs(Vec<f64>);

impl Inputs {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<f64> for Inputs {
    fn from(value: f64) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<f64>> for Inputs {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for Inputs {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Inputs {
    fn from(values: [f64; N]) -> Self {
        Self(values.to_vec())
    }
}

impl<const N: usize> From<&[f64; N]> for Inputs {
    fn from(values: &[f64; N]) -> Self {
        Self(values.to_vec())
    }
}

/// Value of a function: a scalar for a single output, otherwise one entry per output.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Output<f64>> for Value {
    fn from(output: Output<f64>) -> Self {
        match output {
            Output::Scalar(v) => Self::Scalar(v),
            Output::Vector(v) => Self::Vector(v),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Vector(v) => write_row(f, v),
        }
    }
}

/// Derivatives of a function, shaped by its arity N and its number of outputs M:
///
/// | outputs | arity | shape                  |
/// |---------|-------|------------------------|
/// | scalar  | 1     | `Scalar`               |
/// | scalar  | N     | `Vector` of N          |
/// | M       | 1     | `Vector` of M          |
/// | M       | N     | `Matrix` of M rows × N |
#[derive(Clone, Debug, PartialEq)]
pub enum Jacobian {
    Scalar(f64),
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

impl Jacobian {
    /// Shape a full `[output][input]` matrix.
    pub(crate) fn from_rows(rows: Vec<Vec<f64>>, scalar_output: bool, arity: usize) -> Self {
        match (scalar_output, arity) {
            (true, 1) => Self::Scalar(rows[0][0]),
            (true, _) => Self::Vector(rows.into_iter().flatten().collect()),
            (false, 1) => Self::Vector(rows.into_iter().flatten().collect()),
            (false, _) => Self::Matrix(rows),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&[Vec<f64>]> {
        match self {
            Self::Matrix(v) => Some(v),
            _ => None,
        }
    }

    /// (rows, columns) as stored: a scalar is 1×1 and a vector is 1×len.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Scalar(_) => (1, 1),
            Self::Vector(v) => (1, v.len()),
            Self::Matrix(m) => (m.len(), m.first().map_or(0, Vec::len)),
        }
    }

    /// Element at (row, col) of [`Jacobian::shape`].
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        match self {
            Self::Scalar(v) => (row == 0 && col == 0).then_some(*v),
            Self::Vector(v) if row == 0 => v.get(col).copied(),
            Self::Vector(_) => None,
            Self::Matrix(m) => m.get(row).and_then(|r| r.get(col)).copied(),
        }
    }
}

impl std::fmt::Display for Jacobian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Vector(v) => write_row(f, v),
            Self::Matrix(m) => {
                write!(f, "[")?;
                for (i, row) in m.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write_row(f, row)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn write_row(f: &mut std::fmt::Formatter<'_>, row: &[f64]) -> std::fmt::Result {
    write!(f, "[")?;
    for (i, v) in row.iter().enumerate() {
        if i != 0 {
            write!(f, ", ")?;
        }
        write!(f, "{v}")?;
    }
    write!(f, "]")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_inputs() {
        assert_eq!(Inputs::from(3.).as_slice(), &[3.]);
        assert_eq!(Inputs::from([1., 2.]).len(), 2);
        assert_eq!(Inputs::from(&[1., 2., 3.]).len(), 3);
        assert!(Inputs::from(Vec::<f64>::new()).is_empty());
        assert_eq!(Inputs::from(&[4., 5.][..]).as_slice(), &[4., 5.]);
    }

    #[test]
    fn test_jacobian_shapes() {
        let rows = vec![vec![2.]];
        assert_eq!(Jacobian::from_rows(rows, true, 1), Jacobian::Scalar(2.));

        let rows = vec![vec![1., 2., 3.]];
        let j = Jacobian::from_rows(rows, true, 3);
        assert_eq!(j.as_vector(), Some(&[1., 2., 3.][..]));
        assert_eq!(j.shape(), (1, 3));

        let rows = vec![vec![1.], vec![2.]];
        assert_eq!(Jacobian::from_rows(rows, false, 1), Jacobian::Vector(vec![1., 2.]));

        let rows = vec![vec![3.5, 1.], vec![2., 0.]];
        let j = Jacobian::from_rows(rows, false, 2);
        assert_eq!(j.shape(), (2, 2));
        assert_eq!(j.get(1, 0), Some(2.));
        assert_eq!(j.get(2, 0), None);
        assert_eq!(j.to_string(), "[[3.5, 1], [2, 0]]");
    }

    #[test]
    fn test_output() {
        let out = Output::Vector(vec![1., 2.]).map(|v| v * 2.);
        assert_eq!(out, Output::Vector(vec![2., 4.]));
        assert_eq!(Output::Scalar(1.).map(|v| v + 1.), Output::Scalar(2.));
        assert_eq!(Output::Scalar(1.).len(), 1);
        assert_eq!(Value::from(out).to_string(), "[2, 4]");
    }
}
