//! Edge-assembly crossover (EAX) for tours with fixed endpoints.
//!
//! # Algorithm
//!
//! Both parents are read as undirected Hamiltonian cycles over the same
//! node set. The fixed first visit is always a node. A fixed last visit is
//! a second node joined to the first by a locked edge; an open tour gets a
//! zero-cost dummy end node in the same role. Both parents share the
//! locked edge, so it never takes part in an exchange.
//!
//! 1. Drop the edges common to both parents and split the rest into
//!    AB-cycles by a random walk that alternates parent-A and parent-B
//!    edges, cutting out a cycle whenever the walk returns to a node at an
//!    even distance.
//! 2. For every AB-cycle, build an intermediate from parent A by removing
//!    the cycle's A-edges and adding its B-edges. This yields one or more
//!    subtours.
//! 3. Merge subtours greedily: remove one edge from the smallest subtour
//!    and one from another subtour and reconnect with the two cheapest
//!    cross edges. Locked edges are never removed.
//! 4. Keep the best intermediate by exact (directed) tour weight. Ties go to
//!    the earliest AB-cycle found. Closed tours take whichever direction
//!    is cheaper.
//!
//! Merging uses the symmetric cost `(w(a, b) + w(b, a)) / 2`.
//!
//! # Complexity
//!
//! O(C × n²) per crossover in the worst case, where C is the number of
//! AB-cycles.
//!
//! # Reference
//!
//! Nagata, Y. & Kobayashi, S. (2013). "A Powerful Genetic Algorithm Using
//! Edge Assembly Crossover for the Traveling Salesman Problem",
//! *INFORMS Journal on Computing* 25(2), 346-363.

use rand::Rng;

use super::TourChromosome;
use crate::tsp::TspProblem;

/// Local index of the end node, when the layout has one.
const END: usize = 1;

/// An edge of an AB-cycle and the parent it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AbEdge {
    from: usize,
    to: usize,
    from_a: bool,
}

/// Node numbering shared by both parents.
struct Layout {
    /// Local node to visit; `None` is the dummy end of an open tour.
    nodes: Vec<Option<usize>>,
    /// Visit to local node; `usize::MAX` for visits outside the layout.
    local: Vec<usize>,
    has_end: bool,
}

impl Layout {
    fn new(problem: &TspProblem) -> Self {
        let mut nodes = vec![Some(problem.first())];
        let has_end = !problem.is_closed();
        if has_end {
            nodes.push(problem.last());
        }
        nodes.extend(problem.free_visits().into_iter().map(Some));
        let mut local = vec![usize::MAX; problem.size()];
        for (i, v) in nodes.iter().enumerate() {
            if let Some(v) = v {
                local[*v] = i;
            }
        }
        Self {
            nodes,
            local,
            has_end,
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn free_count(&self) -> usize {
        self.len() - 1 - usize::from(self.has_end)
    }

    fn cost(&self, problem: &TspProblem, a: usize, b: usize) -> f64 {
        match (self.nodes[a], self.nodes[b]) {
            (Some(x), Some(y)) => (problem.weight(x, y) + problem.weight(y, x)) / 2.0,
            _ => 0.0,
        }
    }

    fn is_locked(&self, a: usize, b: usize) -> bool {
        self.has_end && ((a == 0 && b == END) || (a == END && b == 0))
    }

    /// Cycle adjacency of a free-visit order.
    fn adjacency(&self, order: &[usize]) -> Option<Vec<Vec<usize>>> {
        let mut seq = Vec::with_capacity(self.len());
        seq.push(0);
        for &v in order {
            let l = *self.local.get(v)?;
            if l == usize::MAX || l == 0 || (self.has_end && l == END) {
                return None;
            }
            seq.push(l);
        }
        if self.has_end {
            seq.push(END);
        }
        let m = seq.len();
        if m != self.len() {
            return None;
        }
        let mut adj = vec![Vec::with_capacity(2); m];
        for i in 0..m {
            adj[seq[i]] = vec![seq[(i + m - 1) % m], seq[(i + 1) % m]];
        }
        Some(adj)
    }

    /// Visits met walking from `from` through `towards` until `stop`.
    fn walk(&self, adj: &[Vec<usize>], from: usize, towards: usize, stop: usize) -> Option<Vec<usize>> {
        let mut out = Vec::with_capacity(self.len());
        let mut prev = from;
        let mut current = towards;
        while current != stop {
            if out.len() >= self.len() {
                return None;
            }
            out.push(self.nodes[current]?);
            let next = other_neighbor(&adj[current], prev)?;
            prev = current;
            current = next;
        }
        Some(out)
    }

    /// Reads a single Hamiltonian cycle back into a free-visit order.
    fn to_order(&self, problem: &TspProblem, adj: &[Vec<usize>]) -> Option<Vec<usize>> {
        let order = if self.has_end {
            if !adj[0].contains(&END) {
                return None;
            }
            let start = *adj[0].iter().find(|&&n| n != END)?;
            self.walk(adj, 0, start, END)?
        } else {
            let forward = self.walk(adj, 0, adj[0][0], 0)?;
            let backward: Vec<usize> = forward.iter().rev().copied().collect();
            if problem.order_weight(&backward) < problem.order_weight(&forward) {
                backward
            } else {
                forward
            }
        };
        (order.len() == self.free_count()).then_some(order)
    }
}

fn other_neighbor(neighbors: &[usize], prev: usize) -> Option<usize> {
    match neighbors {
        [a, _] if *a != prev => Some(*a),
        [_, b] => Some(*b),
        _ => None,
    }
}

fn remove_neighbor(neighbors: &mut Vec<usize>, node: usize) {
    if let Some(p) = neighbors.iter().position(|&n| n == node) {
        neighbors.swap_remove(p);
    }
}

/// Splits the symmetric difference of two cycle graphs into AB-cycles.
fn ab_cycles<R: Rng + ?Sized>(a: &[Vec<usize>], b: &[Vec<usize>], rng: &mut R) -> Vec<Vec<AbEdge>> {
    let m = a.len();
    let only = |x: &[Vec<usize>], y: &[Vec<usize>]| -> Vec<Vec<usize>> {
        (0..m)
            .map(|v| x[v].iter().copied().filter(|u| !y[v].contains(u)).collect())
            .collect()
    };
    let mut rem_a = only(a, b);
    let mut rem_b = only(b, a);

    let mut cycles = Vec::new();
    let mut positions: Vec<Vec<usize>> = vec![Vec::new(); m];
    while let Some(start) = (0..m).find(|&v| !rem_a[v].is_empty()) {
        positions.iter_mut().for_each(Vec::clear);
        positions[start].push(0);
        let mut path = vec![start];
        let mut kinds: Vec<bool> = Vec::new();
        let mut take_a = true;

        while let Some(&current) = path.last() {
            let rem = if take_a { &mut rem_a } else { &mut rem_b };
            if rem[current].is_empty() {
                break;
            }
            let k = rng.random_range(0..rem[current].len());
            let next = rem[current].swap_remove(k);
            remove_neighbor(&mut rem[next], current);
            path.push(next);
            kinds.push(take_a);

            let j = path.len() - 1;
            match positions[next].iter().rev().find(|&&i| (j - i) % 2 == 0).copied() {
                Some(i) => {
                    cycles.push(
                        (i..j)
                            .map(|t| AbEdge {
                                from: path[t],
                                to: path[t + 1],
                                from_a: kinds[t],
                            })
                            .collect(),
                    );
                    for t in (i + 1)..j {
                        positions[path[t]].pop();
                    }
                    path.truncate(i + 1);
                    kinds.truncate(i);
                    match kinds.last() {
                        Some(&k) => take_a = !k,
                        None => break,
                    }
                }
                None => {
                    positions[next].push(j);
                    take_a = !take_a;
                }
            }
        }
    }
    cycles
}

/// Parent A with one AB-cycle applied.
fn apply_cycle(a: &[Vec<usize>], cycle: &[AbEdge]) -> Vec<Vec<usize>> {
    let mut child = a.to_vec();
    for e in cycle.iter().filter(|e| e.from_a) {
        remove_neighbor(&mut child[e.from], e.to);
        remove_neighbor(&mut child[e.to], e.from);
    }
    for e in cycle.iter().filter(|e| !e.from_a) {
        child[e.from].push(e.to);
        child[e.to].push(e.from);
    }
    child
}

/// Subtours of a degree-2 graph, each in cycle order.
fn components(adj: &[Vec<usize>]) -> Option<Vec<Vec<usize>>> {
    let m = adj.len();
    let mut seen = vec![false; m];
    let mut comps = Vec::new();
    for start in 0..m {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut comp = vec![start];
        let mut prev = start;
        let mut current = *adj[start].first()?;
        while current != start {
            if seen[current] {
                return None;
            }
            seen[current] = true;
            comp.push(current);
            let next = other_neighbor(&adj[current], prev)?;
            prev = current;
            current = next;
        }
        comps.push(comp);
    }
    Some(comps)
}

fn cycle_edges(comp: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let n = comp.len();
    (0..n).map(move |i| (comp[i], comp[(i + 1) % n]))
}

/// Greedily joins subtours into one cycle.
fn merge_subtours(layout: &Layout, problem: &TspProblem, adj: &mut [Vec<usize>]) -> Option<()> {
    loop {
        let comps = components(adj)?;
        if comps.len() <= 1 {
            return Some(());
        }
        let small = (0..comps.len()).min_by_key(|&i| comps[i].len())?;

        let mut best: Option<(f64, [usize; 4])> = None;
        for (u1, u2) in cycle_edges(&comps[small]) {
            if layout.is_locked(u1, u2) {
                continue;
            }
            let cut_u = layout.cost(problem, u1, u2);
            for (ci, comp) in comps.iter().enumerate() {
                if ci == small {
                    continue;
                }
                for (v1, v2) in cycle_edges(comp) {
                    if layout.is_locked(v1, v2) {
                        continue;
                    }
                    let cut = cut_u + layout.cost(problem, v1, v2);
                    let straight = layout.cost(problem, u1, v1) + layout.cost(problem, u2, v2) - cut;
                    let crossed = layout.cost(problem, u1, v2) + layout.cost(problem, u2, v1) - cut;
                    if best.is_none_or(|(d, _)| straight < d) {
                        best = Some((straight, [u1, u2, v1, v2]));
                    }
                    if best.is_none_or(|(d, _)| crossed < d) {
                        best = Some((crossed, [u1, u2, v2, v1]));
                    }
                }
            }
        }

        let (_, [u1, u2, v1, v2]) = best?;
        remove_neighbor(&mut adj[u1], u2);
        remove_neighbor(&mut adj[u2], u1);
        remove_neighbor(&mut adj[v1], v2);
        remove_neighbor(&mut adj[v2], v1);
        adj[u1].push(v1);
        adj[v1].push(u1);
        adj[u2].push(v2);
        adj[v2].push(u2);
    }
}

/// Crosses two chromosomes of `problem` with EAX.
///
/// Returns the best offspring, or `None` when the parents share all edges
/// or no valid offspring could be built.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::ga::{edge_assembly_crossover, TourChromosome};
/// use u_tour::random::create_rng;
/// use u_tour::tsp::TspProblem;
///
/// let points: Vec<(f64, f64)> = (0..8).map(|i| ((i * 37 % 11) as f64, (i * 5 % 7) as f64)).collect();
/// let problem = TspProblem::closed(WeightMatrix::from_coordinates(&points), 0).unwrap();
/// let mut rng = create_rng(3);
/// let a = TourChromosome::random(&problem, &mut rng);
/// let b = TourChromosome::random(&problem, &mut rng);
///
/// if let Some(child) = edge_assembly_crossover(&problem, &a, &b, &mut rng) {
///     assert_eq!(child.len(), 7);
/// }
/// ```
pub fn edge_assembly_crossover<R: Rng + ?Sized>(
    problem: &TspProblem,
    a: &TourChromosome,
    b: &TourChromosome,
    rng: &mut R,
) -> Option<TourChromosome> {
    let layout = Layout::new(problem);
    if layout.len() < 4 {
        return None;
    }
    let adj_a = layout.adjacency(a.order())?;
    let adj_b = layout.adjacency(b.order())?;

    let mut best: Option<TourChromosome> = None;
    for cycle in ab_cycles(&adj_a, &adj_b, rng) {
        let mut child = apply_cycle(&adj_a, &cycle);
        if child.iter().any(|n| n.len() != 2) {
            continue;
        }
        if merge_subtours(&layout, problem, &mut child).is_none() {
            continue;
        }
        let Some(order) = layout.to_order(problem, &child) else {
            continue;
        };
        let mut offspring = TourChromosome::new(order);
        offspring.evaluate(problem);
        if best.as_ref().is_none_or(|b| offspring.fitness() < b.fitness()) {
            best = Some(offspring);
        }
    }
    best
}
