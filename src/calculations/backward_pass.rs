use crate::graph::ActivityDag;
use crate::schedule::DurationSelector;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

pub struct BackwardPass<'a> {
    dag: &'a ActivityDag,
    selector: DurationSelector,
}

impl<'a> BackwardPass<'a> {
    pub fn new(dag: &'a ActivityDag, selector: DurationSelector) -> Self {
        Self { dag, selector }
    }

    /// Latest (start, finish) per node given the project duration.
    pub fn execute(
        &self,
        order: &[NodeIndex],
        project_duration: f64,
    ) -> HashMap<NodeIndex, (f64, f64)> {
        let graph = self.dag.graph();
        let mut late: HashMap<NodeIndex, (f64, f64)> = HashMap::with_capacity(order.len());

        // Reverse topological order
        for &node_ix in order.iter().rev() {
            let mut lf = f64::INFINITY;
            let mut has_succ = false;
            for succ_ix in graph.neighbors_directed(node_ix, Direction::Outgoing) {
                if let Some(&(ls_succ, _)) = late.get(&succ_ix) {
                    has_succ = true;
                    lf = lf.min(ls_succ);
                }
            }
            if !has_succ {
                lf = project_duration;
            }

            let duration = self.selector.duration_of(&graph[node_ix]);
            late.insert(node_ix, (lf - duration, lf));
        }

        late
    }
}
