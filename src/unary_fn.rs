/// A trait that represents an unary operation on a value.
/// It needs to implement a transformation of the value and its local
/// derivative, both evaluated at the argument.
pub trait UnaryFn {
    fn name(&self) -> &str;
    fn f(&self, data: f64) -> f64;
    fn grad(&self, data: f64) -> f64;
}

/// An unary function made of plain function pointers. All the elementary
/// functions without extra parameters are defined this way.
#[derive(Clone, Copy)]
pub struct PtrUnaryFn {
    pub name: &'static str,
    pub f: fn(f64) -> f64,
    pub grad: fn(f64) -> f64,
}

impl UnaryFn for PtrUnaryFn {
    fn name(&self) -> &str {
        self.name
    }
    fn f(&self, data: f64) -> f64 {
        (self.f)(data)
    }
    fn grad(&self, data: f64) -> f64 {
        (self.grad)(data)
    }
}

impl std::fmt::Debug for PtrUnaryFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PtrUnaryFn({})", self.name)
    }
}

#[test]
fn test_ptr_unary_fn() {
    let square = PtrUnaryFn {
        name: "square",
        f: |x| x * x,
        grad: |x| 2. * x,
    };
    assert_eq!(square.name(), "square");
    assert_eq!(square.f(3.), 9.);
    assert_eq!(square.grad(3.), 6.);
    assert_eq!(format!("{square:?}"), "PtrUnaryFn(square)");
}
