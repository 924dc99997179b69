pub mod activity_dag;

pub use activity_dag::{ActivityDag, DagNode, END_ID, START_ID};
