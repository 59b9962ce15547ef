//! Median-split 2-d tree with a flattened node array.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use strata_geom::GeoPoint;

/// Points per leaf bucket.
const LEAF_SIZE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Index into the sample set the tree was built from.
    pub index: usize,
    pub distance: f64,
}

#[derive(Clone, Copy, Debug)]
enum Node {
    Leaf { start: u32, len: u32 },
    // Left child is always the next node.
    Split { axis: u8, value: f64, right: u32 },
}

pub(crate) struct KdTree {
    points: Vec<GeoPoint>,
    order: Vec<u32>,
    nodes: Vec<Node>,
}

impl KdTree {
    pub(crate) fn build(points: &[GeoPoint]) -> Self {
        let mut order: Vec<u32> = (0..points.len() as u32).collect();
        let mut nodes = Vec::with_capacity(2 * points.len() / LEAF_SIZE + 1);
        if !points.is_empty() {
            build_node(points, &mut order, 0, &mut nodes);
        }
        Self {
            points: points.to_vec(),
            order,
            nodes,
        }
    }

    pub(crate) fn nearest(&self, q: GeoPoint, k: usize) -> Vec<Neighbor> {
        if k == 0 || self.nodes.is_empty() {
            return Vec::new();
        }
        let k = k.min(self.points.len());
        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.search(0, q, k, &mut heap);
        let mut found = heap.into_vec();
        found.sort_unstable();
        found
            .into_iter()
            .map(|c| Neighbor {
                index: c.index as usize,
                distance: c.dist_sq.sqrt(),
            })
            .collect()
    }

    fn search(&self, node: usize, q: GeoPoint, k: usize, heap: &mut BinaryHeap<Candidate>) {
        match self.nodes[node] {
            Node::Leaf { start, len } => {
                let start = start as usize;
                for &i in &self.order[start..start + len as usize] {
                    let cand = Candidate {
                        dist_sq: q.distance_sq(self.points[i as usize]),
                        index: i,
                    };
                    if heap.len() < k {
                        heap.push(cand);
                    } else if heap.peek().is_some_and(|worst| cand < *worst) {
                        heap.pop();
                        heap.push(cand);
                    }
                }
            }
            Node::Split { axis, value, right } => {
                let diff = q.axis(axis as usize) - value;
                let (near, far) = if diff < 0.0 {
                    (node + 1, right as usize)
                } else {
                    (right as usize, node + 1)
                };
                self.search(near, q, k, heap);
                // Ties on the far side can still win on index.
                let visit_far = heap.len() < k
                    || heap.peek().is_some_and(|worst| diff * diff <= worst.dist_sq);
                if visit_far {
                    self.search(far, q, k, heap);
                }
            }
        }
    }
}

fn build_node(points: &[GeoPoint], order: &mut [u32], offset: usize, nodes: &mut Vec<Node>) {
    if order.len() <= LEAF_SIZE {
        nodes.push(Node::Leaf {
            start: offset as u32,
            len: order.len() as u32,
        });
        return;
    }

    let axis = widest_axis(points, order);
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        points[a as usize]
            .axis(axis)
            .total_cmp(&points[b as usize].axis(axis))
            .then(a.cmp(&b))
    });
    let value = points[order[mid] as usize].axis(axis);

    let slot = nodes.len();
    nodes.push(Node::Leaf { start: 0, len: 0 });
    let (left, right) = order.split_at_mut(mid);
    build_node(points, left, offset, nodes);
    let right_idx = nodes.len() as u32;
    build_node(points, right, offset + mid, nodes);
    nodes[slot] = Node::Split {
        axis: axis as u8,
        value,
        right: right_idx,
    };
}

fn widest_axis(points: &[GeoPoint], order: &[u32]) -> usize {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for &i in order {
        let p = points[i as usize];
        for a in 0..2 {
            min[a] = min[a].min(p.axis(a));
            max[a] = max[a].max(p.axis(a));
        }
    }
    if max[1] - min[1] > max[0] - min[0] { 1 } else { 0 }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    dist_sq: f64,
    index: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist_sq
            .total_cmp(&other.dist_sq)
            .then(self.index.cmp(&other.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_cover_every_point_once() {
        let pts: Vec<GeoPoint> = (0..100)
            .map(|i| GeoPoint::new((i * 37 % 101) as f64, (i * 13 % 29) as f64))
            .collect();
        let tree = KdTree::build(&pts);
        let mut seen = vec![0u32; pts.len()];
        for n in &tree.nodes {
            if let Node::Leaf { start, len } = *n {
                for &i in &tree.order[start as usize..(start + len) as usize] {
                    seen[i as usize] += 1;
                }
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn duplicate_points_break_ties_by_index() {
        let pts = vec![GeoPoint::new(1.0, 1.0); 20];
        let tree = KdTree::build(&pts);
        let near = tree.nearest(GeoPoint::new(0.0, 0.0), 3);
        let idx: Vec<usize> = near.iter().map(|n| n.index).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
