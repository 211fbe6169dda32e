//! Nearest-neighbour search over points on the unit sphere.
//!
//! Points are unit vectors, so the smallest Cartesian distance is also the
//! smallest great-circle distance. Every index answers ties the same way: of
//! all points at exactly the minimum squared distance, the lowest index wins.
//! The k-d tree and the brute-force scan therefore return identical results,
//! and results never depend on query order or threading. Points must be
//! finite; callers validate coordinates before building an index.

use std::cmp::Ordering;

use nalgebra::Vector3;

/// A nearest-neighbour index over a fixed point set.
pub trait NearestNeighbor: Send + Sync {
    /// Index of the point closest to `query`, or `None` if the set is empty.
    fn nearest(&self, query: &Vector3<f64>) -> Option<usize>;

    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Best candidate seen so far during a query.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    dist_sq: f64,
}

impl Candidate {
    fn none() -> Self {
        Self {
            index: usize::MAX,
            dist_sq: f64::INFINITY,
        }
    }

    fn offer(&mut self, index: usize, dist_sq: f64) {
        if dist_sq < self.dist_sq || (dist_sq == self.dist_sq && index < self.index) {
            self.index = index;
            self.dist_sq = dist_sq;
        }
    }

    fn found(&self) -> Option<usize> {
        (self.index != usize::MAX).then_some(self.index)
    }
}

/// Exhaustive O(N) scan per query.
pub struct BruteForce {
    points: Vec<Vector3<f64>>,
}

impl BruteForce {
    pub fn new(points: Vec<Vector3<f64>>) -> Self {
        Self { points }
    }
}

impl NearestNeighbor for BruteForce {
    fn nearest(&self, query: &Vector3<f64>) -> Option<usize> {
        let mut best = Candidate::none();
        for (index, point) in self.points.iter().enumerate() {
            best.offer(index, (point - query).norm_squared());
        }
        best.found()
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf {
        start: usize,
        end: usize,
    },
    Split {
        axis: usize,
        value: f64,
        left: usize,
        right: usize,
    },
}

/// A static k-d tree over 3-D points.
///
/// Built once by median splits on the axis of largest spread. Points in the
/// left subtree are `<=` the split value on the split axis, points in the
/// right subtree are `>=` it.
pub struct KdTree {
    points: Vec<Vector3<f64>>,
    /// Point indices, permuted so every node owns a contiguous range.
    order: Vec<usize>,
    nodes: Vec<Node>,
    root: Option<usize>,
    leaf_size: usize,
}

impl KdTree {
    /// Build a tree over `points`. `leaf_size` is clamped to at least 1.
    pub fn new(points: Vec<Vector3<f64>>, leaf_size: usize) -> Self {
        let order: Vec<usize> = (0..points.len()).collect();
        let mut tree = Self {
            points,
            order,
            nodes: Vec::new(),
            root: None,
            leaf_size: leaf_size.max(1),
        };

        if !tree.points.is_empty() {
            let root = tree.build(0, tree.points.len());
            tree.root = Some(root);
        }

        tree
    }

    /// Number of tree nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn build(&mut self, start: usize, end: usize) -> usize {
        if end - start <= self.leaf_size {
            self.nodes.push(Node::Leaf { start, end });
            return self.nodes.len() - 1;
        }

        let axis = self.widest_axis(start, end);
        let mid = start + (end - start) / 2;

        let points = &self.points;
        self.order[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
            points[a][axis]
                .total_cmp(&points[b][axis])
                .then(a.cmp(&b))
        });
        let value = self.points[self.order[mid]][axis];

        let left = self.build(start, mid);
        let right = self.build(mid, end);

        self.nodes.push(Node::Split {
            axis,
            value,
            left,
            right,
        });
        self.nodes.len() - 1
    }

    fn widest_axis(&self, start: usize, end: usize) -> usize {
        let mut min = Vector3::repeat(f64::INFINITY);
        let mut max = Vector3::repeat(f64::NEG_INFINITY);
        for &i in &self.order[start..end] {
            min = min.inf(&self.points[i]);
            max = max.sup(&self.points[i]);
        }
        let spread = max - min;

        (0..3)
            .max_by(|&a, &b| {
                spread[a]
                    .partial_cmp(&spread[b])
                    .unwrap_or(Ordering::Equal)
                    // Prefer the lower axis on equal spread.
                    .then(b.cmp(&a))
            })
            .unwrap_or(0)
    }

    fn search(&self, node: usize, query: &Vector3<f64>, best: &mut Candidate) {
        match self.nodes[node] {
            Node::Leaf { start, end } => {
                for &index in &self.order[start..end] {
                    best.offer(index, (self.points[index] - query).norm_squared());
                }
            }
            Node::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = query[axis] - value;
                let (near, far) = if diff <= 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };

                self.search(near, query, best);

                // Equal distances on the far side can still win the tie-break.
                if diff * diff <= best.dist_sq {
                    self.search(far, query, best);
                }
            }
        }
    }
}

impl NearestNeighbor for KdTree {
    fn nearest(&self, query: &Vector3<f64>) -> Option<usize> {
        let root = self.root?;
        let mut best = Candidate::none();
        self.search(root, query, &mut best);
        best.found()
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::geo_to_cartesian;

    fn sphere_points(step: f64) -> Vec<Vector3<f64>> {
        let mut points = Vec::new();
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = 0.0;
            while lon < 360.0 {
                points.push(geo_to_cartesian(lat, lon));
                lon += step;
            }
            lat += step;
        }
        points
    }

    #[test]
    fn test_empty_index() {
        let tree = KdTree::new(Vec::new(), 8);
        assert!(tree.is_empty());
        assert_eq!(tree.nearest(&Vector3::new(1.0, 0.0, 0.0)), None);

        let brute = BruteForce::new(Vec::new());
        assert_eq!(brute.nearest(&Vector3::new(1.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_exact_match() {
        let points = sphere_points(15.0);
        let tree = KdTree::new(points.clone(), 4);

        for (i, p) in points.iter().enumerate().skip(24).step_by(7) {
            // Pole rows repeat the same physical point, so skip them.
            if p.z.abs() > 0.999 {
                continue;
            }
            assert_eq!(tree.nearest(p), Some(i));
        }
    }

    #[test]
    fn test_matches_brute_force() {
        let points = sphere_points(10.0);
        let tree = KdTree::new(points.clone(), 5);
        let brute = BruteForce::new(points);

        for lat in [-87.0, -45.5, -3.0, 0.0, 12.25, 60.0, 89.0] {
            for lon in [0.0, 4.0, 91.0, 179.5, 200.0, 355.0] {
                let q = geo_to_cartesian(lat, lon);
                assert_eq!(
                    tree.nearest(&q),
                    brute.nearest(&q),
                    "query ({}, {})",
                    lat,
                    lon
                );
            }
        }
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        let points = vec![
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let query = Vector3::new(1.0, 0.0, 0.0);

        assert_eq!(BruteForce::new(points.clone()).nearest(&query), Some(1));
        for leaf_size in 1..=5 {
            let tree = KdTree::new(points.clone(), leaf_size);
            assert_eq!(tree.nearest(&query), Some(1), "leaf_size {}", leaf_size);
        }

        // Equidistant from indices 0 and 1.
        let between = Vector3::new(1.0, 1.0, 0.0).normalize();
        for leaf_size in 1..=5 {
            let tree = KdTree::new(points.clone(), leaf_size);
            assert_eq!(tree.nearest(&between), Some(0), "leaf_size {}", leaf_size);
        }
    }

    #[test]
    fn test_duplicate_points_lowest_index() {
        let points = vec![Vector3::new(0.0, 0.0, 1.0); 40];
        let tree = KdTree::new(points, 3);
        assert_eq!(tree.nearest(&Vector3::new(0.1, 0.0, 0.9)), Some(0));
    }

    #[test]
    fn test_tree_has_multiple_nodes() {
        let tree = KdTree::new(sphere_points(30.0), 4);
        assert!(tree.node_count() > 1);
        assert_eq!(tree.len(), 7 * 12);
    }
}
