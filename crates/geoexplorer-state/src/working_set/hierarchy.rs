//! Working set forest built from `parentWorkingSetId` references

use geoexplorer_core::models::{WorkingSet, WorkingSetId};
use std::collections::HashMap;

/// A working set with its children, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingSetNode<'a> {
    pub working_set: &'a WorkingSet,
    pub children: Vec<WorkingSetNode<'a>>,
}

impl Drop for WorkingSetNode<'_> {
    // Iterative, descendants are unlinked one at a time
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// A working set with its depth in the forest, for indented rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatWorkingSet<'a> {
    pub working_set: &'a WorkingSet,
    pub level: usize,
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    New,
    OnPath,
    Done,
}

/// Build the forest of working sets.
///
/// Every input appears exactly once. A working set is a root when it has no
/// parent, when its parent id is not among the inputs, or when it is the
/// first member (in input order) of a parent cycle. When two inputs share an
/// id, children attach to the first.
pub fn build_forest(working_sets: &[WorkingSet]) -> Vec<WorkingSetNode<'_>> {
    let mut index: HashMap<&WorkingSetId, usize> = HashMap::new();
    for (position, working_set) in working_sets.iter().enumerate() {
        if let Some(id) = &working_set.id {
            index.entry(id).or_insert(position);
        }
    }

    let mut parents: Vec<Option<usize>> = working_sets
        .iter()
        .enumerate()
        .map(|(position, working_set)| {
            let parent_id = working_set.parent_working_set_id.as_ref()?;
            match index.get(parent_id) {
                Some(&parent) if parent != position => Some(parent),
                Some(_) => {
                    tracing::warn!("Working set {} is its own parent", parent_id);
                    None
                }
                None => {
                    tracing::debug!(
                        "Parent {} of working set '{}' is unknown, treating it as a root",
                        parent_id,
                        working_set.name
                    );
                    None
                }
            }
        })
        .collect();

    break_cycles(working_sets, &mut parents);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); working_sets.len()];
    let mut roots = Vec::new();
    for (position, parent) in parents.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(position),
            None => roots.push(position),
        }
    }

    // Pre-order from the roots; reversed, every node comes after its subtree
    let mut order = Vec::with_capacity(working_sets.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(position) = stack.pop() {
        order.push(position);
        stack.extend(children[position].iter().rev());
    }

    let mut built: Vec<Option<WorkingSetNode<'_>>> = working_sets.iter().map(|_| None).collect();
    for &position in order.iter().rev() {
        let node = WorkingSetNode {
            working_set: &working_sets[position],
            children: children[position].iter().filter_map(|&child| built[child].take()).collect(),
        };
        built[position] = Some(node);
    }

    roots.iter().filter_map(|&root| built[root].take()).collect()
}

fn break_cycles(working_sets: &[WorkingSet], parents: &mut [Option<usize>]) {
    let mut visits = vec![Visit::New; parents.len()];

    for start in 0..parents.len() {
        let mut path = Vec::new();
        let mut current = Some(start);

        while let Some(position) = current {
            match visits[position] {
                Visit::Done => break,
                Visit::OnPath => {
                    let cycle_start = path.iter().position(|&p| p == position).unwrap_or(0);
                    let root = path[cycle_start..].iter().copied().min().unwrap_or(position);
                    tracing::warn!(
                        "Working set '{}' is part of a parent cycle, treating it as a root",
                        working_sets[root].name
                    );
                    parents[root] = None;
                    break;
                }
                Visit::New => {
                    visits[position] = Visit::OnPath;
                    path.push(position);
                    current = parents[position];
                }
            }
        }

        for position in path {
            visits[position] = Visit::Done;
        }
    }
}

/// Depth-first, pre-order listing of a forest: each node is followed by its
/// children, each one level deeper than its parent.
pub fn flatten_forest<'a>(forest: &[WorkingSetNode<'a>]) -> Vec<FlatWorkingSet<'a>> {
    let mut flat = Vec::new();
    let mut stack: Vec<(&WorkingSetNode<'a>, usize)> =
        forest.iter().rev().map(|root| (root, 0)).collect();

    while let Some((node, level)) = stack.pop() {
        flat.push(FlatWorkingSet { working_set: node.working_set, level });
        stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));
    }

    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ws(id: &str, parent: Option<&str>) -> WorkingSet {
        let mut working_set = WorkingSet::new(format!("ws-{}", id));
        working_set.id = Some(WorkingSetId::new(id));
        working_set.parent_working_set_id = parent.map(WorkingSetId::new);
        working_set
    }

    fn ids_and_levels(flat: &[FlatWorkingSet<'_>]) -> Vec<(String, usize)> {
        flat.iter()
            .map(|entry| (entry.working_set.id.as_ref().unwrap().to_string(), entry.level))
            .collect()
    }

    #[test]
    fn test_orphan_becomes_root() {
        let working_sets = vec![ws("1", None), ws("2", Some("1")), ws("3", Some("99"))];

        let forest = build_forest(&working_sets);
        let flat = flatten_forest(&forest);

        assert_eq!(forest.len(), 2);
        assert_eq!(
            ids_and_levels(&flat),
            vec![("1".to_string(), 0), ("2".to_string(), 1), ("3".to_string(), 0)]
        );
    }

    #[test]
    fn test_children_follow_parent_in_input_order() {
        let working_sets = vec![
            ws("c1", Some("root")),
            ws("root", None),
            ws("g1", Some("c1")),
            ws("c2", Some("root")),
        ];

        let flat = flatten_forest(&build_forest(&working_sets));

        assert_eq!(
            ids_and_levels(&flat),
            vec![
                ("root".to_string(), 0),
                ("c1".to_string(), 1),
                ("g1".to_string(), 2),
                ("c2".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_cycle_is_broken() {
        let working_sets = vec![ws("a", Some("c")), ws("b", Some("a")), ws("c", Some("b"))];

        let flat = flatten_forest(&build_forest(&working_sets));

        assert_eq!(
            ids_and_levels(&flat),
            vec![("a".to_string(), 0), ("b".to_string(), 1), ("c".to_string(), 2)]
        );
    }

    #[test]
    fn test_self_parent_is_root() {
        let working_sets = vec![ws("a", Some("a"))];
        assert_eq!(ids_and_levels(&flatten_forest(&build_forest(&working_sets))), vec![("a".to_string(), 0)]);
    }

    #[test]
    fn test_unsaved_working_sets_are_roots() {
        let working_sets = vec![WorkingSet::new("draft"), ws("a", None)];
        let flat = flatten_forest(&build_forest(&working_sets));
        assert_eq!(flat.len(), 2);
        assert!(flat.iter().all(|entry| entry.level == 0));
    }

    #[test]
    fn test_deep_chain() {
        let depth = 100_000;
        let working_sets: Vec<WorkingSet> = (0..depth)
            .map(|i: usize| ws(&i.to_string(), i.checked_sub(1).map(|p| p.to_string()).as_deref()))
            .collect();

        let forest = build_forest(&working_sets);
        let flat = flatten_forest(&forest);

        assert_eq!(forest.len(), 1);
        assert_eq!(flat.len(), depth);
        assert_eq!(flat.last().map(|entry| entry.level), Some(depth - 1));
        assert_eq!(
            flat.last().and_then(|entry| entry.working_set.id.as_ref()),
            working_sets.last().and_then(|working_set| working_set.id.as_ref())
        );
    }

    proptest! {
        #[test]
        fn prop_every_working_set_listed_once(parents in prop::collection::vec(prop::option::of(0usize..12), 0..12)) {
            let working_sets: Vec<WorkingSet> = parents
                .iter()
                .enumerate()
                .map(|(i, parent)| ws(&i.to_string(), parent.map(|p| p.to_string()).as_deref()))
                .collect();

            let flat = flatten_forest(&build_forest(&working_sets));

            let mut listed: Vec<String> = ids_and_levels(&flat).into_iter().map(|(id, _)| id).collect();
            listed.sort();
            let mut expected: Vec<String> = (0..working_sets.len()).map(|i| i.to_string()).collect();
            expected.sort();
            prop_assert_eq!(listed, expected);

            for (position, entry) in flat.iter().enumerate() {
                if entry.level > 0 {
                    let parent = flat[..position].iter().rev().find(|e| e.level == entry.level - 1);
                    prop_assert_eq!(
                        parent.and_then(|p| p.working_set.id.as_ref()),
                        entry.working_set.parent_working_set_id.as_ref()
                    );
                }
            }
        }
    }
}
