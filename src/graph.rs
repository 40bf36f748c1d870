//! Computation graph for reverse mode, stored as an arena of nodes shared by `Copy` handles.
//!
//! A node owns the list of edges to the nodes computed from it, each carrying the
//! local partial derivative of the child with respect to the node. Edges always
//! point to nodes created later, so the graph is acyclic by construction.

use std::{cell::RefCell, collections::HashMap, io::Write};

use log::trace;

use crate::{error::AdError, Number, UnaryFn};

#[derive(Default, Debug)]
pub struct Graph {
    nodes: RefCell<Vec<GraphNode>>,
    fault: RefCell<Option<AdError>>,
}

#[derive(Clone, Debug)]
struct GraphNode {
    name: String,
    value: f64,
    /// (child index, local partial derivative)
    edges: Vec<(u32, f64)>,
}

/// A handle to a node in a [`Graph`]. Operations on handles append to the graph.
#[derive(Copy, Clone)]
pub struct Node<'a> {
    graph: &'a Graph,
    idx: u32,
    value: f64,
}

/// Total derivatives of the nodes reachable from a root, with respect to that root.
/// Nodes that were never reached have a derivative of 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gradient(HashMap<u32, f64>);

impl Gradient {
    pub fn get(&self, node: Node) -> f64 {
        self.get_index(node.idx)
    }

    pub fn get_index(&self, idx: u32) -> f64 {
        self.0.get(&idx).copied().unwrap_or(0.)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input node.
    pub fn var<'a>(&'a self, name: impl Into<String>, value: f64) -> Node<'a> {
        self.push("var", name.into(), value, &[])
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Outgoing edges of a node as (child index, local partial derivative).
    pub fn edges(&self, node: Node) -> Vec<(u32, f64)> {
        self.nodes
            .borrow()
            .get(node.idx as usize)
            .map(|node| node.edges.clone())
            .unwrap_or_default()
    }

    /// Returns the first error recorded while building the graph, if any.
    pub fn check(&self) -> Result<(), AdError> {
        match self.fault.borrow().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Create a child of `parents`, appending one edge to each of them. `op` names the
    /// operation in errors, `name` labels the node.
    fn push<'a>(
        &'a self,
        op: &'static str,
        name: String,
        value: f64,
        parents: &[(Node, f64)],
    ) -> Node<'a> {
        if let Some(foreign) = parents.iter().find(|(p, _)| !std::ptr::eq(p.graph, self)) {
            let mut fault = self.fault.borrow_mut();
            if fault.is_none() {
                *fault = Some(AdError::UnsupportedOperandKind {
                    op,
                    kind: format!("node #{} belongs to another graph", foreign.0.idx),
                });
            }
            return self.push(op, name, f64::NAN, &[]);
        }
        let mut nodes = self.nodes.borrow_mut();
        let idx = nodes.len() as u32;
        for (parent, partial) in parents {
            nodes[parent.idx as usize].edges.push((idx, *partial));
        }
        nodes.push(GraphNode {
            name,
            value,
            edges: vec![],
        });
        Node {
            graph: self,
            idx,
            value,
        }
    }

    /// Accumulate the derivative of every node reachable from `root` with respect to `root`,
    /// by summing the products of partial derivatives along every path from it.
    ///
    /// The cost grows with the number of paths, and one sweep only yields derivatives
    /// with respect to a single root.
    pub fn gradient_of(&self, root: Node) -> Gradient {
        let nodes = self.nodes.borrow();
        let mut grads = HashMap::new();
        grads.insert(root.idx, 1.);
        accumulate(&nodes, root.idx, 1., &mut grads);
        trace!(
            "gradient_of(#{}): {} of {} nodes reached",
            root.idx,
            grads.len(),
            nodes.len()
        );
        Gradient(grads)
    }

    /// Write graphviz dot file to the given writer, optionally annotated with a gradient.
    pub fn dot(&self, writer: &mut impl Write, gradient: Option<&Gradient>) -> std::io::Result<()> {
        let nodes = self.nodes.borrow();
        writeln!(writer, "digraph G {{\nrankdir=\"LR\";")?;
        for (id, node) in nodes.iter().enumerate() {
            write!(writer, "a{} [label=\"{} \\ndata:{}", id, node.name, node.value)?;
            if let Some(gradient) = gradient {
                write!(writer, ", grad:{}", gradient.get_index(id as u32))?;
            }
            writeln!(writer, "\"];")?;
        }
        for (id, node) in nodes.iter().enumerate() {
            for (child, partial) in &node.edges {
                writeln!(writer, "a{} -> a{} [label=\"{}\"];", id, child, partial)?;
            }
        }
        writeln!(writer, "}}")?;
        Ok(())
    }
}

fn accumulate(nodes: &[GraphNode], idx: u32, weight: f64, grads: &mut HashMap<u32, f64>) {
    for &(child, partial) in &nodes[idx as usize].edges {
        let contribution = weight * partial;
        *grads.entry(child).or_insert(0.) += contribution;
        accumulate(nodes, child, contribution, grads);
    }
}

impl<'a> Node<'a> {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn index(&self) -> u32 {
        self.idx
    }

    fn unary(self, op: &'static str, value: f64, partial: f64) -> Self {
        self.graph
            .push(op, op.to_string(), value, &[(self, partial)])
    }

    fn binary(self, op: &'static str, value: f64, rhs: Self, lhs_partial: f64, rhs_partial: f64) -> Self {
        self.graph.push(
            op,
            op.to_string(),
            value,
            &[(self, lhs_partial), (rhs, rhs_partial)],
        )
    }
}

impl<'a> std::fmt::Debug for Node<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node(#{}, {})", self.idx, self.value)
    }
}

impl<'a> Number for Node<'a> {
    fn value(&self) -> f64 {
        self.value
    }

    fn apply(self, f: &dyn UnaryFn) -> Self {
        self.graph.push(
            "apply",
            f.name().to_string(),
            f.f(self.value),
            &[(self, f.grad(self.value))],
        )
    }

    fn pow(self, exp: Self) -> Self {
        let value = self.value.powf(exp.value);
        self.binary(
            "pow",
            value,
            exp,
            exp.value * self.value.powf(exp.value - 1.),
            value * self.value.ln(),
        )
    }

    fn powf(self, exp: f64) -> Self {
        self.unary(
            "pow",
            self.value.powf(exp),
            exp * self.value.powf(exp - 1.),
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
        self.unary("pow", value, value * base.ln())
    }
}

impl<'a> std::ops::Neg for Node<'a> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        self.unary("neg", -self.value, -1.)
    }
}

impl<'a> std::ops::Add for Node<'a> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        self.binary("add", self.value + rhs.value, rhs, 1., 1.)
    }
}

impl<'a> std::ops::Add<f64> for Node<'a> {
    type Output = Self;
    fn add(self, rhs: f64) -> Self::Output {
        self.unary("add", self.value + rhs, 1.)
    }
}

impl<'a> std::ops::Add<Node<'a>> for f64 {
    type Output = Node<'a>;
    fn add(self, rhs: Node<'a>) -> Self::Output {
        rhs + self
    }
}

impl<'a> std::ops::Sub for Node<'a> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        self.binary("sub", self.value - rhs.value, rhs, 1., -1.)
    }
}

impl<'a> std::ops::Sub<f64> for Node<'a> {
    type Output = Self;
    fn sub(self, rhs: f64) -> Self::Output {
        self.unary("sub", self.value - rhs, 1.)
    }
}

impl<'a> std::ops::Sub<Node<'a>> for f64 {
    type Output = Node<'a>;
    fn sub(self, rhs: Node<'a>) -> Self::Output {
        rhs.unary("sub", self - rhs.value, -1.)
    }
}

impl<'a> std::ops::Mul for Node<'a> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.binary("mul", self.value * rhs.value, rhs, rhs.value, self.value)
    }
}

impl<'a> std::ops::Mul<f64> for Node<'a> {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        self.unary("mul", self.value * rhs, rhs)
    }
}

impl<'a> std::ops::Mul<Node<'a>> for f64 {
    type Output = Node<'a>;
    fn mul(self, rhs: Node<'a>) -> Self::Output {
        rhs * self
    }
}

impl<'a> std::ops::Div for Node<'a> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        self.binary(
            "div",
            self.value / rhs.value,
            rhs,
            1. / rhs.value,
            -self.value / (rhs.value * rhs.value),
        )
    }
}

impl<'a> std::ops::Div<f64> for Node<'a> {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        self.unary("div", self.value / rhs, 1. / rhs)
    }
}

impl<'a> std::ops::Div<Node<'a>> for f64 {
    type Output = Node<'a>;
    fn div(self, rhs: Node<'a>) -> Self::Output {
        rhs.unary(
            "div",
            self / rhs.value,
            -self / (rhs.value * rhs.value),
        )
    }
}
