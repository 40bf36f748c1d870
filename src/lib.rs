//! Value and derivatives of scalar functions, in forward mode with dual numbers or in
//! reverse mode with a computation graph.
//!
//! ```
//! use dualgrad::{Forward, Function, Jacobian, Number, Output, Reverse};
//!
//! struct Double;
//!
//! impl Function for Double {
//!     fn arity(&self) -> usize {
//!         1
//!     }
//!     fn eval<T: Number>(&self, args: &[T]) -> Output<T> {
//!         Output::Scalar(args[0] * 2.)
//!     }
//! }
//!
//! assert_eq!(Forward::new(Double).derivative(3.).unwrap(), Jacobian::Scalar(2.));
//! assert_eq!(Reverse::new(Double).derivative(3.).unwrap(), Jacobian::Scalar(2.));
//! ```

mod dual;
pub mod elem;
pub mod error;
mod forward;
mod function;
pub mod graph;
mod number;
mod reverse;
mod unary_fn;

pub use dual::Dual;
#[cfg(feature = "macro")]
pub use dualgrad_macro::function;
pub use error::AdError;
pub use forward::Forward;
pub use function::{Function, Inputs, Jacobian, Output, Value};
pub use graph::{Gradient, Graph, Node};
pub use number::Number;
pub use reverse::Reverse;
pub use unary_fn::{PtrUnaryFn, UnaryFn};
