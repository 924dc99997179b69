use crate::activity::{Activity, ActivityNode, DegenerateInputWarning};
use crate::activity_validation::validate_activity_collection;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

pub const START_ID: &str = "START";
pub const END_ID: &str = "END";

/// Node weight: an activity or one of the two zero-length anchors.
#[derive(Debug, Clone, PartialEq)]
pub enum DagNode {
    Start,
    End,
    Activity(ActivityNode),
}

impl DagNode {
    pub fn label(&self) -> &str {
        match self {
            DagNode::Start => START_ID,
            DagNode::End => END_ID,
            DagNode::Activity(node) => node.id.as_str(),
        }
    }

    pub fn activity(&self) -> Option<&ActivityNode> {
        match self {
            DagNode::Activity(node) => Some(node),
            _ => None,
        }
    }
}

/// Validated activity network with START feeding every root and every sink feeding END.
#[derive(Debug, Clone)]
pub struct ActivityDag {
    graph: DiGraph<DagNode, ()>,
    start: NodeIndex,
    end: NodeIndex,
    id_to_index: HashMap<String, NodeIndex>,
    activity_order: Vec<NodeIndex>,
    warnings: Vec<DegenerateInputWarning>,
    config: AnalysisConfig,
}

impl ActivityDag {
    pub fn build(activities: &[Activity]) -> AnalysisResult<Self> {
        Self::build_with_config(activities, AnalysisConfig::default())
    }

    pub fn build_with_config(
        activities: &[Activity],
        config: AnalysisConfig,
    ) -> AnalysisResult<Self> {
        validate_activity_collection(activities)?;

        let mut graph: DiGraph<DagNode, ()> = DiGraph::new();
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::new();
        let mut activity_order = Vec::with_capacity(activities.len());
        let mut warnings = Vec::new();

        // Add nodes first
        for activity in activities {
            let (mut node, node_warnings) = ActivityNode::from_activity(activity);
            let mut seen = HashSet::new();
            node.predecessors.retain(|pred| seen.insert(pred.clone()));
            warnings.extend(node_warnings);
            let node_ix = graph.add_node(DagNode::Activity(node));
            id_to_index.insert(activity.id.clone(), node_ix);
            activity_order.push(node_ix);
        }

        // Add edges: pred -> activity
        let mut successors: HashMap<NodeIndex, Vec<String>> = HashMap::new();
        for &node_ix in &activity_order {
            let (id, preds) = match &graph[node_ix] {
                DagNode::Activity(node) => (node.id.clone(), node.predecessors.clone()),
                _ => continue,
            };
            for pred_id in preds {
                if let Some(&pred_ix) = id_to_index.get(&pred_id) {
                    graph.add_edge(pred_ix, node_ix, ());
                    successors.entry(pred_ix).or_default().push(id.clone());
                }
            }
        }
        for (node_ix, succs) in successors {
            if let DagNode::Activity(node) = &mut graph[node_ix] {
                node.successors = succs;
            }
        }

        let start = graph.add_node(DagNode::Start);
        let end = graph.add_node(DagNode::End);
        for &node_ix in &activity_order {
            if graph
                .neighbors_directed(node_ix, Direction::Incoming)
                .next()
                .is_none()
            {
                graph.add_edge(start, node_ix, ());
            }
            if graph
                .neighbors_directed(node_ix, Direction::Outgoing)
                .next()
                .is_none()
            {
                graph.add_edge(node_ix, end, ());
            }
        }

        let dag = Self {
            graph,
            start,
            end,
            id_to_index,
            activity_order,
            warnings,
            config,
        };
        dag.topological_order()?;
        Ok(dag)
    }

    /// Dependency order over all nodes, anchors included.
    pub fn topological_order(&self) -> AnalysisResult<Vec<NodeIndex>> {
        toposort(&self.graph, None).map_err(|cycle| AnalysisError::Cycle {
            activity: self.graph[cycle.node_id()].label().to_string(),
        })
    }

    pub fn graph(&self) -> &DiGraph<DagNode, ()> {
        &self.graph
    }

    pub fn start(&self) -> NodeIndex {
        self.start
    }

    pub fn end(&self) -> NodeIndex {
        self.end
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn warnings(&self) -> &[DegenerateInputWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.activity_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activity_order.is_empty()
    }

    /// Activity node indices in input order.
    pub fn activity_indices(&self) -> &[NodeIndex] {
        &self.activity_order
    }

    pub fn activity(&self, id: &str) -> Option<&ActivityNode> {
        self.id_to_index
            .get(id)
            .and_then(|&node_ix| self.graph[node_ix].activity())
    }

    pub fn activity_at(&self, node_ix: NodeIndex) -> Option<&ActivityNode> {
        self.graph.node_weight(node_ix).and_then(DagNode::activity)
    }

    pub(crate) fn activity_at_mut(&mut self, node_ix: NodeIndex) -> Option<&mut ActivityNode> {
        match self.graph.node_weight_mut(node_ix) {
            Some(DagNode::Activity(node)) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn activity_mut(&mut self, id: &str) -> Option<&mut ActivityNode> {
        let node_ix = *self.id_to_index.get(id)?;
        self.activity_at_mut(node_ix)
    }

    /// Activities in input order; anchors are never yielded.
    pub fn activities(&self) -> impl Iterator<Item = &ActivityNode> + '_ {
        self.activity_order
            .iter()
            .filter_map(|&node_ix| self.graph[node_ix].activity())
    }

    pub fn to_activity_nodes(&self) -> Vec<ActivityNode> {
        self.activities().cloned().collect()
    }
}
