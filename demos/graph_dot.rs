//! Dependency graph in diamond shape. `a` is used twice, so the derivative adds up.
//! Pipe the output to `dot -Tpng` to see it.

use dualgrad::{elem, Graph};

fn main() {
    let graph = Graph::new();
    let a = graph.var("a", 1.);
    let b = graph.var("b", 3.);
    let a2 = elem::sin(a);
    let ab = a2 * b;
    let abac = ab + a2;

    let gradient = graph.gradient_of(a);
    eprintln!("d(abac)/da = {}", gradient.get(abac));
    graph.dot(&mut std::io::stdout(), Some(&gradient)).unwrap();
}
