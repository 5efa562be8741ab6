use std::collections::{HashMap, HashSet};

use crate::model::Task;

/// Dependency cycles among `tasks`, each as a path that starts and ends on
/// the same id (`a -> b -> a`).
///
/// Edges pointing outside the given set are ignored. Every back edge found
/// by the DFS yields one cycle.
///
/// # Time Complexity
///
/// O(V + E) where V = number of tasks, E = number of dependencies
pub fn find_dependency_cycles(tasks: &[Task]) -> Vec<Vec<String>> {
    let edges: HashMap<&str, &[String]> = tasks
        .iter()
        .map(|t| (t.id.as_str(), t.depends_on.as_slice()))
        .collect();

    let mut visited = HashSet::new();
    let mut stack = Vec::new();
    let mut cycles = Vec::new();

    for task in tasks {
        if !visited.contains(task.id.as_str()) {
            dfs_cycles(task.id.as_str(), &edges, &mut visited, &mut stack, &mut cycles);
        }
    }

    cycles
}

fn dfs_cycles<'a>(
    node: &'a str,
    edges: &HashMap<&'a str, &'a [String]>,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    visited.insert(node);
    stack.push(node);

    if let Some(&dependencies) = edges.get(node) {
        for dep in dependencies {
            let dep = dep.as_str();
            if !edges.contains_key(dep) {
                continue;
            }

            // Dependency on the current path closes a cycle
            if let Some(pos) = stack.iter().position(|x| *x == dep) {
                let mut cycle: Vec<String> = stack[pos..].iter().map(|s| s.to_string()).collect();
                cycle.push(dep.to_string());
                cycles.push(cycle);
                continue;
            }

            if !visited.contains(dep) {
                dfs_cycles(dep, edges, visited, stack, cycles);
            }
        }
    }

    stack.pop();
}

pub fn format_cycle_path(cycle: &[String]) -> String {
    cycle.join(" -> ")
}
