use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::error::PipelineError;

/// Common task interface for dependency-graph handling.
pub trait TaskLike: Clone + Send + Sync {
    fn id(&self) -> &str;
    fn dependencies(&self) -> &[String];
}

/// Task dependency graph (DAG)
#[derive(Debug, Clone)]
pub struct TaskGraph<T: TaskLike> {
    /// Task nodes: task_id -> Task
    pub nodes: HashMap<String, T>,

    /// Dependency edges: task_id -> list of dependencies
    pub edges: HashMap<String, Vec<String>>,

    /// Reverse edges: task_id -> list of tasks that depend on it
    pub reverse_edges: HashMap<String, Vec<String>>,

    /// Declaration order; ties in the sort are broken by it.
    insertion_order: Vec<String>,
}

impl<T: TaskLike> TaskGraph<T> {
    pub fn from_tasks(tasks: &[T]) -> Result<Self, PipelineError> {
        let mut nodes = HashMap::new();
        let mut edges = HashMap::new();
        let mut reverse_edges: HashMap<String, Vec<String>> = HashMap::new();
        let mut insertion_order = Vec::new();

        for task in tasks {
            if nodes.contains_key(task.id()) {
                return Err(PipelineError::DuplicateTaskId(task.id().to_string()));
            }

            let task_id = task.id().to_string();
            let dependencies = task.dependencies().to_vec();

            for dep in &dependencies {
                reverse_edges
                    .entry(dep.clone())
                    .or_default()
                    .push(task_id.clone());
            }

            nodes.insert(task_id.clone(), task.clone());
            edges.insert(task_id.clone(), dependencies);
            insertion_order.push(task_id);
        }

        Ok(Self {
            nodes,
            edges,
            reverse_edges,
            insertion_order,
        })
    }

    /// Checks that every dependency exists and that there is no cycle.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for task_id in &self.insertion_order {
            for dep in self.edges.get(task_id).into_iter().flatten() {
                if !self.nodes.contains_key(dep) {
                    return Err(PipelineError::DependencyNotFound {
                        task_id: task_id.clone(),
                        missing_dep: dep.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = self.detect_cycle() {
            return Err(PipelineError::CircularDependency(cycle));
        }

        Ok(())
    }

    /// Kahn's algorithm, always taking the earliest-declared ready task.
    ///
    /// A linear chain therefore comes out in declaration order.
    pub fn topological_order(&self) -> Result<Vec<String>, PipelineError> {
        let position: HashMap<&str, usize> = self
            .insertion_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut in_degree: HashMap<&str, usize> = self
            .edges
            .iter()
            .map(|(id, deps)| (id.as_str(), deps.len()))
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = self
            .insertion_order
            .iter()
            .enumerate()
            .filter(|(_, id)| in_degree.get(id.as_str()).copied() == Some(0))
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(idx)) = ready.pop() {
            let task_id = &self.insertion_order[idx];
            order.push(task_id.clone());

            for dependent in self.reverse_edges.get(task_id).into_iter().flatten() {
                let Some(degree) = in_degree.get_mut(dependent.as_str()) else {
                    continue;
                };
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    if let Some(&pos) = position.get(dependent.as_str()) {
                        ready.push(Reverse(pos));
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(PipelineError::CircularDependency(
                "unable to complete topological sort (cycle detected)".to_string(),
            ));
        }

        Ok(order)
    }

    fn detect_cycle(&self) -> Option<String> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        for task_id in &self.insertion_order {
            if !visited.contains(task_id) && self.dfs_cycle(task_id, &mut visited, &mut stack) {
                return Some(stack.join(" -> "));
            }
        }

        None
    }

    fn dfs_cycle(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        stack: &mut Vec<String>,
    ) -> bool {
        visited.insert(node.to_string());
        stack.push(node.to_string());

        for dep in self.edges.get(node).into_iter().flatten() {
            if let Some(pos) = stack.iter().position(|x| x == dep) {
                stack.push(dep.clone());
                *stack = stack[pos..].to_vec();
                return true;
            }

            if !visited.contains(dep) && self.dfs_cycle(dep, visited, stack) {
                return true;
            }
        }

        stack.pop();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone)]
    struct Node {
        id: String,
        deps: Vec<String>,
    }

    impl TaskLike for Node {
        fn id(&self) -> &str {
            &self.id
        }

        fn dependencies(&self) -> &[String] {
            &self.deps
        }
    }

    fn node(id: &str, deps: &[&str]) -> Node {
        Node {
            id: id.into(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn order(nodes: &[Node]) -> Result<Vec<String>, PipelineError> {
        let graph = TaskGraph::from_tasks(nodes)?;
        graph.validate()?;
        graph.topological_order()
    }

    #[test]
    fn test_linear_chain_keeps_declared_order() {
        let nodes = vec![
            node("identify_city", &[]),
            node("gather_city_guide", &["identify_city"]),
            node("plan_itinerary", &["identify_city", "gather_city_guide"]),
        ];
        assert_eq!(
            order(&nodes).unwrap(),
            vec!["identify_city", "gather_city_guide", "plan_itinerary"]
        );
    }

    #[test]
    fn test_dependency_declared_later_runs_first() {
        let nodes = vec![node("report", &["research"]), node("research", &[]), node("extra", &[])];
        assert_eq!(order(&nodes).unwrap(), vec!["research", "report", "extra"]);
    }

    #[test]
    fn test_duplicate_and_missing_and_cycle_rejected() {
        let dup = vec![node("a", &[]), node("a", &[])];
        assert!(matches!(order(&dup), Err(PipelineError::DuplicateTaskId(id)) if id == "a"));

        let missing = vec![node("a", &["ghost"])];
        assert!(matches!(
            order(&missing),
            Err(PipelineError::DependencyNotFound { missing_dep, .. }) if missing_dep == "ghost"
        ));

        let cycle = vec![node("a", &["b"]), node("b", &["a"])];
        match order(&cycle) {
            Err(PipelineError::CircularDependency(path)) => assert_eq!(path, "a -> b -> a"),
            other => panic!("expected cycle, got {other:?}"),
        }
    }
}
