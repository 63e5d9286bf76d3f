//! Variable dependency graph
//!
//! Edges point from a dependency to the variable that uses it, so a
//! topological order is an order in which every variable can be evaluated
//! after its inputs.

use super::Model;
use crate::diagnostics::ModelError;
use indexmap::IndexMap;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

/// A dependency naming something that is not a model variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Variable whose distribution or expression holds the reference
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    nodes: IndexMap<String, NodeIndex>,
    unresolved: Vec<UnresolvedReference>,
}

impl DependencyGraph {
    pub fn from_model(model: &Model) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = IndexMap::new();

        for var in model.variables() {
            let idx = graph.add_node(var.name.clone());
            nodes.insert(var.name.clone(), idx);
        }

        let mut unresolved = Vec::new();
        for var in model.variables() {
            let dependent = nodes[&var.name];
            for dep in var.dependencies() {
                match nodes.get(&dep) {
                    Some(&dependency) => {
                        graph.update_edge(dependency, dependent, ());
                    }
                    None => unresolved.push(UnresolvedReference {
                        owner: var.name.clone(),
                        name: dep,
                    }),
                }
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            unresolved = unresolved.len(),
            "built dependency graph"
        );

        Self {
            graph,
            nodes,
            unresolved,
        }
    }

    /// Variable names ordered so that dependencies come first
    pub fn evaluation_order(&self) -> Result<Vec<&str>, ModelError> {
        let order = toposort(&self.graph, None).map_err(|cycle| ModelError::DependencyCycle {
            name: self.graph[cycle.node_id()].clone(),
        })?;
        Ok(order.into_iter().map(|idx| self.graph[idx].as_str()).collect())
    }

    /// Variables that `name` reads, in declaration order
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    /// Variables that read `name`, in declaration order
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.nodes.get(name) else {
            return Vec::new();
        };
        let mut found: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        found.sort();
        found.dedup();
        found.into_iter().map(|n| self.graph[n].as_str()).collect()
    }

    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Argument, Distribution, FunctionCall, Value, Variable};

    fn chain() -> Model {
        let mut model = Model::new();
        model.add_variable(Variable::stochastic(
            "seq",
            "Alignment",
            Distribution::new(
                "PhyloCTMC",
                vec![
                    Argument::named("tree", Value::reference("psi")),
                    Argument::named("substmodel", Value::reference("Q")),
                ],
            ),
        ));
        model.add_variable(Variable::deterministic(
            "Q",
            "QMatrix",
            Value::Call(FunctionCall::new(
                "HKY",
                vec![Argument::named("kappa", Value::reference("kappa"))],
            )),
        ));
        model.add_variable(Variable::stochastic(
            "kappa",
            "Real",
            Distribution::new("LogNormal", vec![Argument::named("mean", Value::real(1.0))]),
        ));
        model.add_variable(Variable::stochastic(
            "psi",
            "Tree",
            Distribution::new("Yule", vec![Argument::named("birthrate", Value::reference("lambda"))]),
        ));
        model
    }

    #[test]
    fn test_evaluation_order_respects_dependencies() {
        let model = chain();
        let graph = model.dependency_graph();
        let order = graph.evaluation_order().unwrap();
        let pos = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(pos("kappa") < pos("Q"));
        assert!(pos("Q") < pos("seq"));
        assert!(pos("psi") < pos("seq"));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn test_unresolved_and_neighbors() {
        let graph = chain().dependency_graph();
        assert_eq!(
            graph.unresolved(),
            &[UnresolvedReference {
                owner: "psi".to_string(),
                name: "lambda".to_string(),
            }]
        );
        assert_eq!(graph.dependencies_of("seq"), vec!["Q", "psi"]);
        assert_eq!(graph.dependents_of("kappa"), vec!["Q"]);
        assert!(graph.dependencies_of("missing").is_empty());
    }

    #[test]
    fn test_cycle_reported() {
        let mut model = Model::new();
        model.add_variable(Variable::deterministic("a", "Real", Value::reference("b")));
        model.add_variable(Variable::deterministic("b", "Real", Value::reference("a")));
        let err = model.dependency_graph().evaluation_order().unwrap_err();
        assert!(matches!(err, ModelError::DependencyCycle { .. }));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut model = Model::new();
        model.add_variable(Variable::deterministic("a", "Real", Value::reference("a")));
        let err = model.dependency_graph().evaluation_order().unwrap_err();
        assert_eq!(err.to_string(), "Dependency cycle through `a`");
    }
}
