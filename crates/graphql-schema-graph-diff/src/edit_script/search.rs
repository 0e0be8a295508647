//! Branch-and-bound matching of the vertices left over after anchoring.
//!
//! Every residual old vertex, in (kind, name, path) order, is either assigned to a residual new
//! vertex of the same kind or left unmatched. Owned elements are only assigned to elements owned
//! by the image of their owner, so a field moving to another type is a removal and an addition.
//! Owners always sort before what they own. Only the part of the edit cost that depends on the
//! assignment is accounted: edges towards vertices without any candidate on the other side cost
//! the same in every assignment.

use super::mapping::VertexMapping;
use crate::{
    graph::{SchemaGraph, VertexId, VertexKind},
    DiffConfig, SearchBudget,
};
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    time::Instant,
};

const UNMATCHED: usize = usize::MAX;
const KINDS: usize = VertexKind::ALL.len();
const DEADLINE_CHECK_INTERVAL: u64 = 256;
const MAX_FAN_OUT_DEPTH: usize = 2;
const SUBTREES_PER_WORKER: usize = 4;

#[derive(Debug, Clone, Copy)]
enum Role {
    /// Paired by path with this vertex of the other graph.
    Anchored(VertexId),
    /// Position in the searched vertices of its graph.
    Searched(usize),
    /// Unmatched whatever the assignment.
    Fixed,
}

pub(super) struct ResidualSearch<'a> {
    old: &'a SchemaGraph,
    new: &'a SchemaGraph,
    olds: Vec<VertexId>,
    news: Vec<VertexId>,
    old_roles: Vec<Role>,
    new_roles: Vec<Role>,
    old_slots: Vec<usize>,
    new_slots: Vec<usize>,
    /// For each searched old vertex, the searched new vertices of the same kind.
    candidates: Vec<Vec<usize>>,
}

impl<'a> ResidualSearch<'a> {
    pub(super) fn new(old: &'a SchemaGraph, new: &'a SchemaGraph, anchors: &VertexMapping) -> Self {
        let mut residual_old: [Vec<VertexId>; KINDS] = Default::default();
        let mut residual_new: [Vec<VertexId>; KINDS] = Default::default();

        for (id, vertex) in old.vertices() {
            if anchors.image(id).is_none() {
                residual_old[vertex.kind().index()].push(id);
            }
        }

        for (id, vertex) in new.vertices() {
            if anchors.preimage(id).is_none() {
                residual_new[vertex.kind().index()].push(id);
            }
        }

        let mut olds = Vec::new();
        let mut news = Vec::new();

        for (old_residuals, new_residuals) in residual_old.into_iter().zip(residual_new) {
            if !old_residuals.is_empty() && !new_residuals.is_empty() {
                olds.extend(old_residuals);
                news.extend(new_residuals);
            }
        }

        olds.sort_by(|a, b| sort_key(old, *a).cmp(&sort_key(old, *b)));
        news.sort_by(|a, b| sort_key(new, *a).cmp(&sort_key(new, *b)));

        let mut old_roles: Vec<Role> = old
            .vertices()
            .map(|(id, _)| anchors.image(id).map(Role::Anchored).unwrap_or(Role::Fixed))
            .collect();

        let mut new_roles: Vec<Role> = new
            .vertices()
            .map(|(id, _)| anchors.preimage(id).map(Role::Anchored).unwrap_or(Role::Fixed))
            .collect();

        for (position, id) in olds.iter().enumerate() {
            old_roles[id.index()] = Role::Searched(position);
        }

        for (position, id) in news.iter().enumerate() {
            new_roles[id.index()] = Role::Searched(position);
        }

        let old_slots: Vec<usize> = olds.iter().map(|id| old[*id].kind().index()).collect();
        let new_slots: Vec<usize> = news.iter().map(|id| new[*id].kind().index()).collect();

        let candidates: Vec<Vec<usize>> = old_slots
            .iter()
            .map(|slot| (0..news.len()).filter(|k| new_slots[*k] == *slot).collect())
            .collect();

        ResidualSearch {
            old,
            new,
            olds,
            news,
            old_roles,
            new_roles,
            old_slots,
            new_slots,
            candidates,
        }
    }

    pub(super) fn old_len(&self) -> usize {
        self.olds.len()
    }

    pub(super) fn new_len(&self) -> usize {
        self.news.len()
    }

    /// The matched pairs of the cheapest assignment, the lexicographically smallest one among
    /// equally cheap assignments. `None` if the budget ran out first.
    pub(super) fn solve(&self, config: &DiffConfig) -> Option<Vec<(VertexId, VertexId)>> {
        if self.olds.is_empty() {
            return Some(Vec::new());
        }

        let unmatched = vec![UNMATCHED; self.olds.len()];
        let initial = Best {
            cost: self.evaluate(&unmatched),
            assignment: unmatched,
        };

        let shared = SharedBound::new(*config.search_budget(), initial.cost);

        let best = match config.worker_threads() {
            1 => {
                let mut best = initial;
                self.explore(&[], &shared, &mut best);
                best
            }
            workers => {
                let subtrees = self.subtrees(&shared, workers);
                let workers = workers.min(subtrees.len()).max(1);

                tracing::trace!(subtrees = subtrees.len(), workers, "Fanning out residual search");

                let (subtrees, shared_ref, initial_ref) = (&subtrees, &shared, &initial);

                let results: Vec<_> = std::thread::scope(|scope| {
                    let handles: Vec<_> = (0..workers)
                        .map(|_| scope.spawn(move || self.run_worker(subtrees, shared_ref, initial_ref.clone())))
                        .collect();

                    handles.into_iter().map(|handle| handle.join()).collect()
                });

                let mut best = initial;

                for result in results {
                    match result {
                        Ok(candidate) if candidate.is_better_than(&best) => best = candidate,
                        Ok(_) => (),
                        Err(_) => {
                            tracing::warn!("A residual search worker panicked");
                            shared.exhausted.store(true, Ordering::Relaxed);
                        }
                    }
                }

                best
            }
        };

        let expansions = shared.expansions.load(Ordering::Relaxed);

        if shared.is_exhausted() {
            tracing::debug!(expansions, "Residual search exhausted its budget");
            return None;
        }

        tracing::debug!(cost = best.cost, expansions, "Residual search completed");

        Some(
            self.olds
                .iter()
                .zip(best.assignment)
                .filter(|(_, choice)| *choice != UNMATCHED)
                .map(|(source, choice)| (*source, self.news[choice]))
                .collect(),
        )
    }

    fn run_worker(&self, subtrees: &[Vec<usize>], shared: &SharedBound, mut best: Best) -> Best {
        loop {
            let index = shared.next_subtree.fetch_add(1, Ordering::Relaxed);

            let Some(prefix) = subtrees.get(index) else {
                break;
            };

            if shared.is_exhausted() {
                break;
            }

            self.explore(prefix, shared, &mut best);
        }

        best
    }

    /// Disjoint prefixes covering every assignment that may beat the current bound.
    fn subtrees(&self, shared: &SharedBound, workers: usize) -> Vec<Vec<usize>> {
        let mut frontier = vec![Vec::new()];

        for _ in 0..MAX_FAN_OUT_DEPTH.min(self.olds.len()) {
            if frontier.len() >= workers * SUBTREES_PER_WORKER {
                break;
            }

            let mut next = Vec::with_capacity(frontier.len() * 2);

            for prefix in &frontier {
                let mut state = self.state_from(prefix);

                for (delta, choice) in self.branches(&state) {
                    state.apply(choice, delta);

                    if state.cost + self.lower_bound(&state) <= shared.best_cost() {
                        let mut subtree = prefix.clone();
                        subtree.push(choice);
                        next.push(subtree);
                    }

                    state.undo();
                }
            }

            frontier = next;
        }

        frontier
    }

    /// Depth-first search of every assignment starting with `prefix`.
    fn explore(&self, prefix: &[usize], shared: &SharedBound, best: &mut Best) {
        let mut state = self.state_from(prefix);

        if state.depth() == self.olds.len() {
            self.complete(&state, shared, best);
            return;
        }

        if self.is_pruned(&state, shared, best) {
            return;
        }

        let mut stack = vec![Frame {
            branches: self.branches(&state),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&(delta, choice)) = frame.branches.get(frame.next) else {
                stack.pop();

                if !stack.is_empty() {
                    state.undo();
                }

                continue;
            };

            frame.next += 1;

            if !shared.tick() {
                return;
            }

            state.apply(choice, delta);

            if state.depth() == self.olds.len() {
                self.complete(&state, shared, best);
                state.undo();
                continue;
            }

            if self.is_pruned(&state, shared, best) {
                state.undo();
                continue;
            }

            stack.push(Frame {
                branches: self.branches(&state),
                next: 0,
            });
        }
    }

    fn is_pruned(&self, state: &State, shared: &SharedBound, best: &Best) -> bool {
        let bound = state.cost + self.lower_bound(state);

        if bound > shared.best_cost() || bound > best.cost {
            return true;
        }

        // Equally cheap completions would lose the tie against the local best.
        bound == best.cost && state.assignment.as_slice() > &best.assignment[..state.depth()]
    }

    fn complete(&self, state: &State, shared: &SharedBound, best: &mut Best) {
        let cost = state.cost + self.completion_cost(state);

        if (cost, state.assignment.as_slice()) < (best.cost, best.assignment.as_slice()) {
            best.cost = cost;
            best.assignment.clone_from(&state.assignment);
        }

        shared.offer(cost);
    }

    fn evaluate(&self, assignment: &[usize]) -> usize {
        let state = self.state_from(assignment);
        state.cost + self.completion_cost(&state)
    }

    fn state_from(&self, prefix: &[usize]) -> State {
        let mut state = State::new(self.news.len());

        for choice in prefix {
            let delta = self.decision_cost(&state, state.depth(), *choice);
            state.apply(*choice, delta);
        }

        state
    }

    /// The choices for the next undecided vertex, cheapest first.
    fn branches(&self, state: &State) -> Vec<(usize, usize)> {
        let depth = state.depth();
        let mut branches: Vec<(usize, usize)> = self
            .options(state, depth)
            .map(|choice| (self.decision_cost(state, depth, choice), choice))
            .collect();

        branches.sort_unstable();
        branches
    }

    /// The choices still open to the searched old vertex at `position`, unmatched last.
    fn options<'s>(&'s self, state: &'s State, position: usize) -> impl Iterator<Item = usize> + 's {
        self.candidates[position]
            .iter()
            .copied()
            .filter(move |candidate| {
                state.owner[*candidate].is_none() && self.same_owner(state, position, *candidate)
            })
            .chain(std::iter::once(UNMATCHED))
    }

    /// Whether the owner of the old vertex at `position` is mapped to the owner of `candidate`.
    /// An owner that is not decided yet does not rule the candidate out.
    fn same_owner(&self, state: &State, position: usize, candidate: usize) -> bool {
        let owners = (self.old.parent(self.olds[position]), self.new.parent(self.news[candidate]));

        let (old_owner, new_owner) = match owners {
            (None, None) => return true,
            (Some(old_owner), Some(new_owner)) => (old_owner, new_owner),
            _ => return false,
        };

        match self.old_roles[old_owner.index()] {
            Role::Anchored(image) => image == new_owner,
            Role::Searched(owner_position) if owner_position < state.depth() => {
                let choice = state.assignment[owner_position];
                choice != UNMATCHED && self.news[choice] == new_owner
            }
            Role::Searched(_) => true,
            Role::Fixed => false,
        }
    }

    /// Cost of assigning the old vertex at `position` to `choice`: the vertex operation, plus the
    /// edge operations towards vertices that are already decided. Deciding more vertices first
    /// never lowers it.
    fn decision_cost(&self, state: &State, position: usize, choice: usize) -> usize {
        let depth = state.depth();
        let source = self.olds[position];
        let target = (choice != UNMATCHED).then(|| self.news[choice]);

        let mut cost = match target {
            Some(target) => usize::from(self.old[source].name() != self.new[target].name()),
            None => 1,
        };

        // Keyed by edge direction and the old vertex on the other end.
        let mut groups: BTreeMap<(bool, VertexId), (Vec<&str>, Vec<&str>)> = BTreeMap::new();

        let old_edges = self
            .old
            .outgoing_edges(source)
            .map(|edge| (true, edge.two, edge.label))
            .chain(
                self.old
                    .incoming_edges(source)
                    .filter(|edge| edge.one != edge.two)
                    .map(|edge| (false, edge.one, edge.label)),
            );

        for (outgoing, other, label) in old_edges {
            let other_matched = if other == source {
                target.is_some()
            } else {
                match self.old_roles[other.index()] {
                    Role::Anchored(_) => true,
                    Role::Searched(other_position) if other_position < depth => {
                        state.assignment[other_position] != UNMATCHED
                    }
                    Role::Searched(_) | Role::Fixed => continue,
                }
            };

            // Without a pair of images, the edge can only be deleted.
            if other_matched && target.is_some() {
                groups.entry((outgoing, other)).or_default().0.push(label);
            } else {
                cost += 1;
            }
        }

        if let Some(target) = target {
            let new_edges = self
                .new
                .outgoing_edges(target)
                .map(|edge| (true, edge.two, edge.label))
                .chain(
                    self.new
                        .incoming_edges(target)
                        .filter(|edge| edge.one != edge.two)
                        .map(|edge| (false, edge.one, edge.label)),
                );

            for (outgoing, other, label) in new_edges {
                let preimage = if other == target {
                    source
                } else {
                    match self.new_roles[other.index()] {
                        Role::Anchored(preimage) => preimage,
                        Role::Searched(new_position) => match state.owner[new_position] {
                            Some(owner) => self.olds[owner],
                            None => continue,
                        },
                        Role::Fixed => continue,
                    }
                };

                groups.entry((outgoing, preimage)).or_default().1.push(label);
            }
        }

        cost + groups
            .into_values()
            .map(|(old_labels, new_labels)| label_multiset_cost(old_labels, new_labels))
            .sum::<usize>()
    }

    /// Cost of the new vertices left unused once every old vertex is decided, with their edges.
    fn completion_cost(&self, state: &State) -> usize {
        let mut cost = 0;

        for (position, target) in self.news.iter().enumerate() {
            if state.owner[position].is_some() {
                continue;
            }

            cost += 1;

            cost += self
                .new
                .outgoing_edges(*target)
                .filter(|edge| !matches!(self.new_roles[edge.two.index()], Role::Fixed))
                .count();

            // Edges coming from another unused vertex were counted as its outgoing edges.
            cost += self
                .new
                .incoming_edges(*target)
                .filter(|edge| match self.new_roles[edge.one.index()] {
                    Role::Fixed => false,
                    Role::Anchored(_) => true,
                    Role::Searched(other) => state.owner[other].is_some(),
                })
                .count();
        }

        cost
    }

    /// Every undecided old vertex costs at least its cheapest open choice against the vertices
    /// decided so far, and per kind the available new vertices beyond the undecided old ones
    /// must be inserted.
    fn lower_bound(&self, state: &State) -> usize {
        let mut undecided = [0usize; KINDS];
        let mut available = [0usize; KINDS];
        let mut cost = 0;

        for (position, slot) in self.old_slots.iter().enumerate().skip(state.depth()) {
            undecided[*slot] += 1;

            cost += self
                .options(state, position)
                .map(|choice| self.decision_cost(state, position, choice))
                .min()
                .unwrap_or_default();
        }

        for (position, slot) in self.new_slots.iter().enumerate() {
            if state.owner[position].is_none() {
                available[*slot] += 1;
            }
        }

        cost + (0..KINDS)
            .map(|slot| available[slot].saturating_sub(undecided[slot]))
            .sum::<usize>()
    }
}

fn sort_key(graph: &SchemaGraph, id: VertexId) -> (VertexKind, &str, &str) {
    let vertex = &graph[id];
    (vertex.kind(), vertex.name(), vertex.path())
}

/// Identical labels are unchanged, the others are paired as changes and the rest inserted or
/// deleted.
fn label_multiset_cost(mut old_labels: Vec<&str>, mut new_labels: Vec<&str>) -> usize {
    old_labels.sort_unstable();
    new_labels.sort_unstable();

    let (mut i, mut j, mut common) = (0, 0, 0);

    while i < old_labels.len() && j < new_labels.len() {
        match old_labels[i].cmp(new_labels[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
        }
    }

    old_labels.len().max(new_labels.len()) - common
}

struct Frame {
    branches: Vec<(usize, usize)>,
    next: usize,
}

struct State {
    /// The choice made for each decided old vertex.
    assignment: Vec<usize>,
    deltas: Vec<usize>,
    /// For each searched new vertex, the old vertex it was assigned to.
    owner: Vec<Option<usize>>,
    cost: usize,
}

impl State {
    fn new(news: usize) -> Self {
        State {
            assignment: Vec::new(),
            deltas: Vec::new(),
            owner: vec![None; news],
            cost: 0,
        }
    }

    fn depth(&self) -> usize {
        self.assignment.len()
    }

    fn apply(&mut self, choice: usize, delta: usize) {
        if choice != UNMATCHED {
            self.owner[choice] = Some(self.assignment.len());
        }

        self.assignment.push(choice);
        self.deltas.push(delta);
        self.cost += delta;
    }

    fn undo(&mut self) {
        let (Some(choice), Some(delta)) = (self.assignment.pop(), self.deltas.pop()) else {
            return;
        };

        if choice != UNMATCHED {
            self.owner[choice] = None;
        }

        self.cost -= delta;
    }
}

#[derive(Debug, Clone)]
struct Best {
    cost: usize,
    assignment: Vec<usize>,
}

impl Best {
    fn is_better_than(&self, other: &Best) -> bool {
        (self.cost, &self.assignment) < (other.cost, &other.assignment)
    }
}

/// State shared by all workers of one search.
struct SharedBound {
    best_cost: AtomicUsize,
    expansions: AtomicU64,
    exhausted: AtomicBool,
    next_subtree: AtomicUsize,
    max_expansions: u64,
    deadline: Option<Instant>,
}

impl SharedBound {
    fn new(budget: SearchBudget, initial_cost: usize) -> Self {
        SharedBound {
            best_cost: AtomicUsize::new(initial_cost),
            expansions: AtomicU64::new(0),
            exhausted: AtomicBool::new(false),
            next_subtree: AtomicUsize::new(0),
            max_expansions: budget.max_expansions,
            deadline: budget.time_limit.map(|limit| Instant::now() + limit),
        }
    }

    /// Account for one expansion. Returns `false` once the budget is spent.
    fn tick(&self) -> bool {
        if self.is_exhausted() {
            return false;
        }

        let expansions = self.expansions.fetch_add(1, Ordering::Relaxed) + 1;

        let out_of_time = expansions % DEADLINE_CHECK_INTERVAL == 0
            && self.deadline.is_some_and(|deadline| Instant::now() >= deadline);

        if expansions > self.max_expansions || out_of_time {
            self.exhausted.store(true, Ordering::Relaxed);
            return false;
        }

        true
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Relaxed)
    }

    fn best_cost(&self) -> usize {
        self.best_cost.load(Ordering::Relaxed)
    }

    fn offer(&self, cost: usize) {
        self.best_cost.fetch_min(cost, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_multiset_cost_pairs_differences_as_changes() {
        assert_eq!(label_multiset_cost(vec!["field"], vec!["field"]), 0);
        assert_eq!(label_multiset_cost(vec!["type=Int"], vec!["type=Int!"]), 1);
        assert_eq!(label_multiset_cost(vec!["a", "b"], vec!["b"]), 1);
        assert_eq!(label_multiset_cost(vec![], vec!["a", "b"]), 2);
    }
}
