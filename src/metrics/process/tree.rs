use super::ProcessId;
use std::collections::{HashMap, HashSet, VecDeque};
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Lists every live descendant process of `root`, nearest generations first.
/// Threads are skipped; their usage is already part of their process.
pub fn find_descendants(root: ProcessId) -> Vec<ProcessId> {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing(),
    );

    let parents = system
        .processes()
        .iter()
        .filter(|(_, process)| process.thread_kind().is_none())
        .map(|(pid, process)| (ProcessId::from(*pid), process.parent().map(ProcessId::from)));
    descendants_of(root, parents)
}

/// Breadth-first walk over `(pid, parent)` pairs. `root` itself is excluded.
pub fn descendants_of<I>(root: ProcessId, parents: I) -> Vec<ProcessId>
where
    I: IntoIterator<Item = (ProcessId, Option<ProcessId>)>,
{
    let mut parent_to_children: HashMap<ProcessId, Vec<ProcessId>> = HashMap::new();
    for (pid, parent) in parents {
        if let Some(parent) = parent {
            parent_to_children.entry(parent).or_default().push(pid);
        }
    }

    let mut queue = VecDeque::from([root]);
    let mut visited = HashSet::from([root]);
    let mut result = Vec::new();

    while let Some(current) = queue.pop_front() {
        if let Some(children) = parent_to_children.get(&current) {
            for &child in children {
                if visited.insert(child) {
                    result.push(child);
                    queue.push_back(child);
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn pid(n: u32) -> ProcessId {
        ProcessId::new(n)
    }

    #[test]
    fn walks_children_and_grandchildren() {
        let table = vec![
            (pid(1), None),
            (pid(10), Some(pid(1))),
            (pid(11), Some(pid(1))),
            (pid(20), Some(pid(10))),
            (pid(30), Some(pid(99))),
        ];

        let mut found = descendants_of(pid(1), table);
        found.sort();
        assert_eq!(found, vec![pid(10), pid(11), pid(20)]);
    }

    #[test]
    fn cycles_do_not_loop_forever() {
        let table = vec![(pid(1), Some(pid(2))), (pid(2), Some(pid(1)))];
        assert_eq!(descendants_of(pid(1), table), vec![pid(2)]);
    }

    #[cfg(unix)]
    #[test]
    fn finds_spawned_child() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let child_pid = ProcessId::new(child.id());

        let found = find_descendants(ProcessId::current());

        child.kill().unwrap();
        child.wait().unwrap();
        assert!(found.contains(&child_pid));
    }
}
