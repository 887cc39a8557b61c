//! HDBSCAN over a precomputed distance matrix.
//!
//! ```text
//! distances ─► core distance (k-th neighbour, self included)
//!           ─► mutual reachability  max(core_i, core_j, d_ij)
//!           ─► minimum spanning tree (Prim, dense O(n²))
//!           ─► single-linkage merges (ascending edge weight)
//!           ─► condensed tree (splits smaller than min_cluster_size shed points)
//!           ─► excess-of-mass selection of stable clusters
//!           ─► labels: selected clusters in ascending tree order, -1 elsewhere
//! ```
//!
//! Density is expressed as `λ = 1 / distance`. Zero distances (identical
//! columns) are clamped to `MIN_DISTANCE` so λ stays finite.

use tracing::debug;

use crate::model::{DistanceMatrix, NOISE_LABEL};
use crate::{Error, Result};
use super::DensityClusterer;

/// Distances below this are treated as this for λ.
const MIN_DISTANCE: f64 = 1e-12;

/// Hierarchical density clustering with excess-of-mass cluster selection.
#[derive(Debug, Clone, Default)]
pub struct Hdbscan {
    /// Neighbourhood size for core distances. Defaults to `min_cluster_size`.
    pub min_samples: Option<usize>,
    /// Allow the root (all points) to be returned as the only cluster.
    pub allow_single_cluster: bool,
}

impl Hdbscan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = Some(min_samples);
        self
    }

    pub fn with_single_cluster(mut self, allow: bool) -> Self {
        self.allow_single_cluster = allow;
        self
    }
}

impl DensityClusterer for Hdbscan {
    fn cluster(&self, distances: &DistanceMatrix, min_cluster_size: usize) -> Result<Vec<i64>> {
        if !distances.is_square() {
            return Err(Error::Clustering(format!(
                "distance matrix must be square, got {}x{}",
                distances.rows(),
                distances.cols()
            )));
        }
        if min_cluster_size < 2 {
            return Err(Error::Clustering("min_cluster_size must be >= 2".into()));
        }

        let n = distances.rows();
        if n == 0 {
            return Ok(Vec::new());
        }
        if n == 1 {
            return Ok(vec![NOISE_LABEL]);
        }

        let k = self.min_samples.unwrap_or(min_cluster_size).max(1);
        let core = core_distances(distances, k);
        let mst = minimum_spanning_tree(distances, &core);
        let merges = single_linkage(n, mst);
        let tree = CondensedTree::build(n, &merges, min_cluster_size);
        let selected = tree.select_clusters(self.allow_single_cluster);
        let labels = tree.label_points(&selected);

        debug!(
            n,
            clusters = selected.len(),
            noise = labels.iter().filter(|&&l| l == NOISE_LABEL).count(),
            "hdbscan finished"
        );
        Ok(labels)
    }
}

// ============================================================================
// Mutual reachability + MST
// ============================================================================

/// Distance to the k-th nearest point, the point itself counting as first.
fn core_distances(d: &DistanceMatrix, k: usize) -> Vec<f64> {
    let n = d.rows();
    let kth = k.min(n) - 1;
    (0..n)
        .map(|i| {
            let mut row = d.row(i).to_vec();
            row.select_nth_unstable_by(kth, f64::total_cmp);
            row[kth]
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    a: usize,
    b: usize,
    weight: f64,
}

/// Dense Prim's algorithm over the mutual reachability graph.
fn minimum_spanning_tree(d: &DistanceMatrix, core: &[f64]) -> Vec<Edge> {
    let n = d.rows();
    let reach = |i: usize, j: usize| d.get(i, j).max(core[i]).max(core[j]);

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut from = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);

    let mut current = 0;
    in_tree[0] = true;
    for _ in 1..n {
        let mut next = usize::MAX;
        let mut next_w = f64::INFINITY;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            let w = reach(current, j);
            if w < best[j] {
                best[j] = w;
                from[j] = current;
            }
            if next == usize::MAX || best[j] < next_w {
                next = j;
                next_w = best[j];
            }
        }
        in_tree[next] = true;
        edges.push(Edge { a: from[next], b: next, weight: next_w });
        current = next;
    }
    edges
}

// ============================================================================
// Single linkage
// ============================================================================

/// Internal dendrogram node `n + i` merging `left` and `right`.
#[derive(Debug, Clone, Copy)]
struct Merge {
    left: usize,
    right: usize,
    distance: f64,
    size: usize,
}

fn single_linkage(n: usize, mut mst: Vec<Edge>) -> Vec<Merge> {
    mst.sort_by(|x, y| x.weight.total_cmp(&y.weight));

    // union-find over leaves and internal nodes
    let mut parent: Vec<usize> = (0..2 * n - 1).collect();
    let mut size = vec![1usize; 2 * n - 1];
    let mut merges = Vec::with_capacity(n - 1);

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for (i, edge) in mst.into_iter().enumerate() {
        let ra = find(&mut parent, edge.a);
        let rb = find(&mut parent, edge.b);
        let node = n + i;
        size[node] = size[ra] + size[rb];
        parent[ra] = node;
        parent[rb] = node;
        merges.push(Merge { left: ra, right: rb, distance: edge.weight, size: size[node] });
    }
    merges
}

// ============================================================================
// Condensed tree
// ============================================================================

/// One condensed-tree record: `child` (a point `< n` or a cluster `>= n`)
/// leaves `parent` at density `lambda`.
#[derive(Debug, Clone, Copy)]
struct Condensed {
    parent: usize,
    child: usize,
    lambda: f64,
    size: usize,
}

struct CondensedTree {
    n: usize,
    min_size: usize,
    /// Cluster ids run `n..n + n_clusters`; `n` is the root.
    n_clusters: usize,
    records: Vec<Condensed>,
}

impl CondensedTree {
    fn build(n: usize, merges: &[Merge], min_size: usize) -> Self {
        let node_size = |node: usize| if node < n { 1 } else { merges[node - n].size };
        let root = n + merges.len() - 1;

        let mut records = Vec::new();
        let mut next_cluster = n + 1;
        let mut stack = vec![(root, n)];

        while let Some((node, cluster)) = stack.pop() {
            let merge = merges[node - n];
            let lambda = 1.0 / merge.distance.max(MIN_DISTANCE);
            let (left, right) = (merge.left, merge.right);
            let (left_big, right_big) = (node_size(left) >= min_size, node_size(right) >= min_size);

            match (left_big, right_big) {
                (true, true) => {
                    for child in [left, right] {
                        let id = next_cluster;
                        next_cluster += 1;
                        records.push(Condensed { parent: cluster, child: id, lambda, size: node_size(child) });
                        stack.push((child, id));
                    }
                }
                (true, false) => {
                    shed_points(n, merges, right, cluster, lambda, &mut records);
                    stack.push((left, cluster));
                }
                (false, true) => {
                    shed_points(n, merges, left, cluster, lambda, &mut records);
                    stack.push((right, cluster));
                }
                (false, false) => {
                    shed_points(n, merges, left, cluster, lambda, &mut records);
                    shed_points(n, merges, right, cluster, lambda, &mut records);
                }
            }
        }

        Self { n, min_size, n_clusters: next_cluster - n, records }
    }

    /// Excess-of-mass selection. Returns selected cluster ids, ascending.
    ///
    /// The root is a candidate only if it holds at least `min_size` points,
    /// and then only when single clusters are allowed or nothing below it
    /// forms a cluster.
    fn select_clusters(&self, allow_single_cluster: bool) -> Vec<usize> {
        let n = self.n;
        let mut birth = vec![0.0f64; self.n_clusters];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.n_clusters];
        for r in &self.records {
            if r.child >= n {
                birth[r.child - n] = r.lambda;
                children[r.parent - n].push(r.child);
            }
        }

        let mut stability = vec![0.0f64; self.n_clusters];
        for r in &self.records {
            stability[r.parent - n] += (r.lambda - birth[r.parent - n]) * r.size as f64;
        }

        let mut selected = vec![true; self.n_clusters];
        let root_eligible = n >= self.min_size && (allow_single_cluster || children[0].is_empty());
        let lowest = if root_eligible {
            0
        } else {
            selected[0] = false;
            1
        };

        // children always carry larger ids than their parent
        for c in (lowest..self.n_clusters).rev() {
            let subtree: f64 = children[c].iter().map(|&ch| stability[ch - n]).sum();
            if !children[c].is_empty() && subtree > stability[c] {
                selected[c] = false;
                stability[c] = subtree;
            } else {
                let mut stack: Vec<usize> = children[c].clone();
                while let Some(ch) = stack.pop() {
                    selected[ch - n] = false;
                    stack.extend(children[ch - n].iter().copied());
                }
            }
        }

        (0..self.n_clusters).filter(|&c| selected[c]).map(|c| c + n).collect()
    }

    /// Every point under a selected cluster gets that cluster's rank. A
    /// selected root keeps only the points it sheds at its highest density;
    /// earlier strays stay noise.
    fn label_points(&self, selected: &[usize]) -> Vec<i64> {
        let n = self.n;
        let mut kids: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.n_clusters];
        for r in &self.records {
            kids[r.parent - n].push((r.child, r.lambda));
        }
        let root_floor = kids[0]
            .iter()
            .filter(|&&(child, _)| child < n)
            .map(|&(_, lambda)| lambda)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut labels = vec![NOISE_LABEL; n];
        for (rank, &cluster) in selected.iter().enumerate() {
            let mut stack = vec![cluster];
            while let Some(node) = stack.pop() {
                for &(child, lambda) in &kids[node - n] {
                    if child >= n {
                        stack.push(child);
                    } else if node != n || lambda >= root_floor {
                        labels[child] = rank as i64;
                    }
                }
            }
        }
        labels
    }
}

/// Record every leaf under `node` as falling out of `cluster` at `lambda`.
fn shed_points(n: usize, merges: &[Merge], node: usize, cluster: usize, lambda: f64, out: &mut Vec<Condensed>) {
    let mut stack = vec![node];
    while let Some(x) = stack.pop() {
        if x < n {
            out.push(Condensed { parent: cluster, child: x, lambda, size: 1 });
        } else {
            let m = merges[x - n];
            stack.push(m.left);
            stack.push(m.right);
        }
    }
}
