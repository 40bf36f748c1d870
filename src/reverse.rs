//! Reverse mode differentiation on a computation graph.
//!
//! Evaluating the function on graph [`Node`]s records every operation. The derivative of
//! an output with respect to an input is read from [`Graph::gradient_of`] rooted at that
//! input. When the function has several outputs, each one is evaluated again with
//! [`Function::eval_output`] on a graph of its own, so outputs sharing upstream nodes
//! never mix their accumulated derivatives.

use log::debug;

use crate::{
    error::AdError,
    function::{Inputs, Jacobian, Value},
    Function, Graph, Node, Output,
};

pub struct Reverse<F> {
    func: F,
    arity: usize,
}

impl<F: Function> Reverse<F> {
    pub fn new(func: F) -> Self {
        let arity = func.arity();
        Self { func, arity }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn value(&self, inputs: impl Into<Inputs>) -> Result<Value, AdError> {
        let inputs = self.check(inputs.into())?;
        let graph = Graph::new();
        let nodes = seed(&graph, inputs.as_slice());
        let res = self.func.eval(&nodes);
        graph.check()?;
        Ok(res.map(|node| node.value()).into())
    }

    pub fn derivative(&self, inputs: impl Into<Inputs>) -> Result<Jacobian, AdError> {
        let inputs = self.check(inputs.into())?;
        let inputs = inputs.as_slice();

        let graph = Graph::new();
        let nodes = seed(&graph, inputs);
        let res = self.func.eval(&nodes);
        graph.check()?;

        let (rows, scalar_output) = match res {
            Output::Scalar(output) => {
                debug!(
                    "reverse: scalar output, {} inputs, {} nodes",
                    self.arity,
                    graph.len()
                );
                (vec![partials(&graph, &nodes, output)], true)
            }
            Output::Vector(outputs) => {
                debug!("reverse: isolating {} outputs", outputs.len());
                let rows = (0..outputs.len())
                    .map(|index| self.isolated_row(index, inputs))
                    .collect::<Result<_, _>>()?;
                (rows, false)
            }
        };

        Ok(Jacobian::from_rows(rows, scalar_output, self.arity))
    }

    /// Derivatives of one output, evaluated alone against a private copy of the inputs.
    fn isolated_row(&self, index: usize, inputs: &[f64]) -> Result<Vec<f64>, AdError> {
        let graph = Graph::new();
        let nodes = seed(&graph, inputs);
        let output = self.func.eval_output(index, &nodes).ok_or_else(|| {
            AdError::MultiOutputParseFailure(format!(
                "output #{index} cannot be evaluated on its own; \
                define each output as an independent expression of the parameters"
            ))
        })?;
        graph.check()?;
        debug!("reverse: output #{index} built {} nodes", graph.len());
        Ok(partials(&graph, &nodes, output))
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

fn seed<'a>(graph: &'a Graph, inputs: &[f64]) -> Vec<Node<'a>> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, &v)| graph.var(format!("x{i}"), v))
        .collect()
}

/// d output / d input for every input, one sweep rooted at each input.
fn partials(graph: &Graph, inputs: &[Node], output: Node) -> Vec<f64> {
    inputs
        .iter()
        .map(|&input| graph.gradient_of(input).get(output))
        .collect()
}

impl<F> std::fmt::Display for Reverse<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "reverse-mode differentiator of a {}-input function",
            self.arity
        )
    }
}
