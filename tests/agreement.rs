//! Forward and reverse mode must agree with each other and with the closed form.

use approx::assert_relative_eq;
use dualgrad::{elem, Forward, Function, Jacobian, Reverse};
use dualgrad_macro::function;

fn check(f: impl Function, x: f64, expected: f64) {
    let forward = Forward::new(&f).derivative(x).unwrap().as_scalar().unwrap();
    let reverse = Reverse::new(&f).derivative(x).unwrap().as_scalar().unwrap();
    assert_relative_eq!(forward, expected, epsilon = 1e-12, max_relative = 1e-12);
    assert_relative_eq!(reverse, expected, epsilon = 1e-12, max_relative = 1e-12);
}

#[test]
fn elementary_functions() {
    let _ = env_logger::builder().is_test(true).try_init();
    for x in [0.1, 0.5, 0.9] {
        check(function!(|x| sin(x)), x, x.cos());
        check(function!(|x| cos(x)), x, -x.sin());
        check(function!(|x| tan(x)), x, 1. / x.cos().powi(2));
        check(function!(|x| exp(x)), x, x.exp());
        check(function!(|x| sqrt(x)), x, 0.5 / x.sqrt());
        check(function!(|x| log(x)), x, 1. / x);
        check(function!(|x| logb(x, 10)), x, 1. / (x * 10f64.ln()));
        check(function!(|x| arcsin(x)), x, 1. / (1. - x * x).sqrt());
        check(function!(|x| arccos(x)), x, -1. / (1. - x * x).sqrt());
        check(function!(|x| arctan(x)), x, 1. / (1. + x * x));
        check(function!(|x| sinh(x)), x, x.cosh());
        check(function!(|x| cosh(x)), x, x.sinh());
        check(function!(|x| tanh(x)), x, 1. - x.tanh().powi(2));
        let s = elem::logistic(x);
        check(function!(|x| logistic(x)), x, s * (1. - s));
    }
}

#[test]
fn compositions() {
    let f = function!(|x| ef::exp(ef::sin(x) * x) / (1 + (x ^ 2)));
    for x in [-1.2f64, 0.3, 2.5] {
        let g = (x.sin() * x).exp();
        let dg = g * (x.cos() * x + x.sin());
        let h = 1. + x * x;
        check(&f, x, (dg * h - g * 2. * x) / (h * h));
    }

    let f = function!(|x| ef::logistic(ef::tanh(x) - 0.5 * x).powf(3.));
    for x in [-0.7, 0.0, 1.1] {
        let forward = Forward::new(&f).derivative(x).unwrap();
        let reverse = Reverse::new(&f).derivative(x).unwrap();
        assert_relative_eq!(
            forward.as_scalar().unwrap(),
            reverse.as_scalar().unwrap(),
            epsilon = 1e-12
        );
    }
}

#[test]
fn jacobian_shapes() {
    let scalar_1 = function!(|x| x * x);
    let scalar_n = function!(|x, y, z| x * y * z);
    let vector_1 = function!(|x| [x, x * x, x ^ 3]);
    let vector_n = function!(|x, y| [x + y, x * y, x - y]);

    for (jacobian, shape) in [
        (Forward::new(&scalar_1).derivative(2.), (1, 1)),
        (Reverse::new(&scalar_1).derivative(2.), (1, 1)),
        (Forward::new(&scalar_n).derivative([1., 2., 3.]), (1, 3)),
        (Reverse::new(&scalar_n).derivative([1., 2., 3.]), (1, 3)),
        (Forward::new(&vector_1).derivative(2.), (1, 3)),
        (Reverse::new(&vector_1).derivative(2.), (1, 3)),
        (Forward::new(&vector_n).derivative([1., 2.]), (3, 2)),
        (Reverse::new(&vector_n).derivative([1., 2.]), (3, 2)),
    ] {
        assert_eq!(jacobian.unwrap().shape(), shape);
    }

    assert!(matches!(
        Reverse::new(&scalar_1).derivative(2.),
        Ok(Jacobian::Scalar(_))
    ));
    assert!(matches!(
        Forward::new(&scalar_n).derivative([1., 2., 3.]),
        Ok(Jacobian::Vector(_))
    ));
    assert!(matches!(
        Reverse::new(&vector_1).derivative(2.),
        Ok(Jacobian::Vector(_))
    ));
    assert!(matches!(
        Forward::new(&vector_n).derivative([1., 2.]),
        Ok(Jacobian::Matrix(_))
    ));
    assert_eq!(
        Reverse::new(&vector_n).derivative([1., 2.]).unwrap(),
        Jacobian::Matrix(vec![vec![1., 1.], vec![2., 1.], vec![1., -1.]])
    );
}
