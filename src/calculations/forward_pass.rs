use crate::graph::ActivityDag;
use crate::schedule::DurationSelector;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

pub struct ForwardPass<'a> {
    dag: &'a ActivityDag,
    selector: DurationSelector,
}

impl<'a> ForwardPass<'a> {
    pub fn new(dag: &'a ActivityDag, selector: DurationSelector) -> Self {
        Self { dag, selector }
    }

    /// Earliest (start, finish) per node, anchors included.
    pub fn execute(&self, order: &[NodeIndex]) -> HashMap<NodeIndex, (f64, f64)> {
        let graph = self.dag.graph();
        let mut early: HashMap<NodeIndex, (f64, f64)> = HashMap::with_capacity(order.len());

        for &node_ix in order {
            // Early start is max of all predecessor finishes
            let early_start = graph
                .neighbors_directed(node_ix, Direction::Incoming)
                .filter_map(|pred_ix| early.get(&pred_ix).map(|&(_, ef)| ef))
                .fold(0.0_f64, f64::max);
            let duration = self.selector.duration_of(&graph[node_ix]);
            early.insert(node_ix, (early_start, early_start + duration));
        }

        early
    }
}
