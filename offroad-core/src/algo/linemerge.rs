//! Joining of line geometries that share endpoints.
//!
//! Lines are edges between their first and last vertex. Chains are grown
//! greedily from the first unconsumed line, first at the tail and then at the
//! head, always taking the first unconsumed touching line in input order. At a
//! branch point the remaining branches are left for later chains, so the
//! result is deterministic for a given input order.
//!
//! Endpoints must be bit-for-bit equal to join. There is no snapping
//! tolerance: two unrelated roads passing within a few centimetres of each
//! other stay separate.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use geo::{Coord, LineString};
use hashbrown::HashMap;
use log::trace;

/// Exact endpoint identity. `0.0` and `-0.0` compare equal as floats, so they
/// share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeKey(u64, u64);

impl From<Coord<f64>> for NodeKey {
    fn from(coord: Coord<f64>) -> Self {
        NodeKey(canonical_bits(coord.x), canonical_bits(coord.y))
    }
}

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// One maximal chain of joined input lines.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedChain {
    pub geometry: LineString<f64>,
    /// Indices of the input lines in the order they appear along the chain
    pub members: Vec<usize>,
}

/// Result of [`merge_lines`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineMerge {
    pub chains: Vec<MergedChain>,
}

impl LineMerge {
    /// All input lines were chained into a single line string.
    pub fn is_connected(&self) -> bool {
        self.chains.len() == 1
    }

    /// The input split into more than one disjoint chain.
    pub fn is_fragmented(&self) -> bool {
        self.chains.len() > 1
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Lines touching each endpoint, in input order.
struct EndpointIndex {
    lines_at: HashMap<NodeKey, Vec<usize>>,
}

impl EndpointIndex {
    fn new(lines: &[LineString<f64>]) -> Self {
        let mut lines_at: HashMap<NodeKey, Vec<usize>> = HashMap::new();
        for (idx, line) in lines.iter().enumerate() {
            let (Some(&first), Some(&last)) = (line.0.first(), line.0.last()) else {
                continue;
            };
            let start = NodeKey::from(first);
            let end = NodeKey::from(last);
            lines_at.entry(start).or_default().push(idx);
            if end != start {
                lines_at.entry(end).or_default().push(idx);
            }
        }
        Self { lines_at }
    }

    fn first_unconsumed(&self, node: NodeKey, consumed: &FixedBitSet) -> Option<usize> {
        self.lines_at
            .get(&node)?
            .iter()
            .copied()
            .find(|&idx| !consumed.contains(idx))
    }
}

/// Merges lines into maximal chains joined at exactly equal endpoints.
///
/// Lines may be reversed to join. Each shared endpoint appears once in the
/// merged chain, so chaining `k` lines with `v` vertices in total gives
/// `v - (k - 1)` vertices. Lines without vertices are ignored.
pub fn merge_lines(lines: &[LineString<f64>]) -> LineMerge {
    let index = EndpointIndex::new(lines);
    let mut consumed = FixedBitSet::with_capacity(lines.len());
    let mut chains = Vec::new();

    for seed in 0..lines.len() {
        if consumed.contains(seed) || lines[seed].0.is_empty() {
            continue;
        }
        consumed.insert(seed);

        let mut coords: VecDeque<Coord<f64>> = lines[seed].0.iter().copied().collect();
        let mut members = VecDeque::from([seed]);

        // Grow at the tail.
        while let Some(&tail) = coords.back() {
            let tail_key = NodeKey::from(tail);
            let Some(next) = index.first_unconsumed(tail_key, &consumed) else {
                break;
            };
            consumed.insert(next);
            members.push_back(next);

            let line = &lines[next].0;
            if NodeKey::from(line[0]) == tail_key {
                coords.extend(line.iter().skip(1));
            } else {
                coords.extend(line.iter().rev().skip(1));
            }
        }

        // Grow at the head.
        while let Some(&head) = coords.front() {
            let head_key = NodeKey::from(head);
            let Some(prev) = index.first_unconsumed(head_key, &consumed) else {
                break;
            };
            consumed.insert(prev);
            members.push_front(prev);

            let line = &lines[prev].0;
            let last = line.len() - 1;
            if NodeKey::from(line[last]) == head_key {
                for &coord in line[..last].iter().rev() {
                    coords.push_front(coord);
                }
            } else {
                for &coord in &line[1..] {
                    coords.push_front(coord);
                }
            }
        }

        trace!(
            "Chain {} built from {} lines with {} vertices",
            chains.len(),
            members.len(),
            coords.len()
        );

        chains.push(MergedChain {
            geometry: LineString::new(coords.into()),
            members: members.into(),
        });
    }

    LineMerge { chains }
}
