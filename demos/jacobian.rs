//! Jacobian of a two-input, two-output function in both modes.

use dualgrad::{Forward, Reverse};
use dualgrad_macro::function;

fn main() {
    let f = function!(|x, y| [1.5 * x + x * y, x ^ y]);
    let forward = Forward::new(&f);
    let reverse = Reverse::new(&f);
    println!("{forward}");
    println!("f(1, 2) = {}", forward.value([1., 2.]).unwrap());
    println!("forward: J = {}", forward.derivative([1., 2.]).unwrap());
    println!("reverse: J = {}", reverse.derivative([1., 2.]).unwrap());
}
