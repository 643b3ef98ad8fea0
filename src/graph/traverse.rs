//! Lazy traversal iterators over a graph snapshot.

use std::collections::VecDeque;

use super::{Children, GraphError};

/// Adjacency copied out of the graph under its read lock.
pub(crate) struct Snapshot<Id> {
    pub(crate) ids: Vec<Id>,
    pub(crate) children: Vec<Children>,
}

impl<Id: Copy> Snapshot<Id> {
    pub(crate) fn bfs(self, seeds: Vec<usize>) -> Bfs<Id> {
        let mut visited = vec![false; self.ids.len()];
        let mut queue = VecDeque::with_capacity(seeds.len());
        for seed in seeds {
            if !visited[seed] {
                visited[seed] = true;
                queue.push_back(seed);
            }
        }
        Bfs {
            ids: self.ids,
            children: self.children,
            visited,
            queue,
        }
    }

    /// Membership mask of `start` and every vertex reachable from it.
    pub(crate) fn reachable_from(&self, start: usize) -> Vec<bool> {
        let mut member = vec![false; self.ids.len()];
        let mut queue = VecDeque::from([start]);
        member[start] = true;
        while let Some(position) = queue.pop_front() {
            for &child in &self.children[position] {
                if !member[child] {
                    member[child] = true;
                    queue.push_back(child);
                }
            }
        }
        member
    }

    /// Membership mask of `target` and every vertex that can reach it.
    pub(crate) fn reaching(&self, target: usize) -> Vec<bool> {
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); self.ids.len()];
        for (position, children) in self.children.iter().enumerate() {
            for &child in children {
                parents[child].push(position);
            }
        }

        let mut member = vec![false; self.ids.len()];
        let mut queue = VecDeque::from([target]);
        member[target] = true;
        while let Some(position) = queue.pop_front() {
            for &parent in &parents[position] {
                if !member[parent] {
                    member[parent] = true;
                    queue.push_back(parent);
                }
            }
        }
        member
    }

    /// Kahn's algorithm, optionally restricted to a membership mask.
    ///
    /// In-degree only counts edges whose both ends are members.
    pub(crate) fn topological(self, member: Option<Vec<bool>>) -> Topological<Id> {
        let member = member.unwrap_or_else(|| vec![true; self.ids.len()]);
        let mut in_degree = vec![0usize; self.ids.len()];
        for (position, children) in self.children.iter().enumerate() {
            if !member[position] {
                continue;
            }
            for &child in children {
                if member[child] {
                    in_degree[child] += 1;
                }
            }
        }

        let queue: VecDeque<usize> = (0..self.ids.len())
            .filter(|&position| member[position] && in_degree[position] == 0)
            .collect();
        let expected = member.iter().filter(|&&m| m).count();

        Topological {
            ids: self.ids,
            children: self.children,
            member,
            in_degree,
            queue,
            expected,
            yielded: 0,
            finished: false,
        }
    }
}

/// Breadth-first iterator of vertex ids.
pub struct Bfs<Id> {
    ids: Vec<Id>,
    children: Vec<Children>,
    visited: Vec<bool>,
    queue: VecDeque<usize>,
}

impl<Id: Copy> Iterator for Bfs<Id> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        let position = self.queue.pop_front()?;
        for &child in &self.children[position] {
            if !self.visited[child] {
                self.visited[child] = true;
                self.queue.push_back(child);
            }
        }
        Some(self.ids[position])
    }
}

/// Topological iterator of vertex ids (Kahn's algorithm).
///
/// Every vertex is yielded after all of its member parents. If the traversal
/// runs dry before every member was yielded, one final
/// [`GraphError::Cycle`] is produced.
pub struct Topological<Id> {
    ids: Vec<Id>,
    children: Vec<Children>,
    member: Vec<bool>,
    in_degree: Vec<usize>,
    queue: VecDeque<usize>,
    expected: usize,
    yielded: usize,
    finished: bool,
}

impl<Id> Topological<Id> {
    /// Number of vertices the traversal is expected to yield.
    pub fn expected_len(&self) -> usize {
        self.expected
    }
}

impl<Id: Copy> Iterator for Topological<Id> {
    type Item = Result<Id, GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(position) = self.queue.pop_front() {
            self.yielded += 1;
            for &child in &self.children[position] {
                if !self.member[child] {
                    continue;
                }
                self.in_degree[child] -= 1;
                if self.in_degree[child] == 0 {
                    self.queue.push_back(child);
                }
            }
            return Some(Ok(self.ids[position]));
        }

        if self.finished {
            return None;
        }
        self.finished = true;
        if self.yielded != self.expected {
            return Some(Err(GraphError::Cycle {
                visited: self.yielded,
                total: self.expected,
            }));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    // a -> b -> d, a -> c -> d, e isolated
    fn diamond() -> Snapshot<char> {
        Snapshot {
            ids: vec!['a', 'b', 'c', 'd', 'e'],
            children: vec![smallvec![1, 2], smallvec![3], smallvec![3], smallvec![], smallvec![]],
        }
    }

    #[test]
    fn bfs_visits_each_vertex_once() {
        let order: Vec<char> = diamond().bfs(vec![0, 4]).collect();
        assert_eq!(order, vec!['a', 'e', 'b', 'c', 'd']);
    }

    #[test]
    fn topological_respects_edges() {
        let order: Vec<char> = diamond()
            .topological(None)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(order, vec!['a', 'e', 'b', 'c', 'd']);
    }

    #[test]
    fn reaching_restricts_to_ancestors() {
        let snapshot = diamond();
        let members = snapshot.reaching(1);
        let order: Vec<char> = snapshot
            .topological(Some(members))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(order, vec!['a', 'b']);
    }

    #[test]
    fn reachable_from_restricts_to_descendants() {
        let snapshot = diamond();
        let members = snapshot.reachable_from(2);
        let order: Vec<char> = snapshot
            .topological(Some(members))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(order, vec!['c', 'd']);
    }

    #[test]
    fn residual_cycle_is_reported_once() {
        let snapshot = Snapshot {
            ids: vec!['x', 'y', 'z'],
            children: vec![smallvec![1], smallvec![0], smallvec![]],
        };
        let mut traversal = snapshot.topological(None);
        assert_eq!(traversal.expected_len(), 3);
        assert_eq!(traversal.next(), Some(Ok('z')));
        assert_eq!(
            traversal.next(),
            Some(Err(GraphError::Cycle {
                visited: 1,
                total: 3
            }))
        );
        assert_eq!(traversal.next(), None);
    }
}
