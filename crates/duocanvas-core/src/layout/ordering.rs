//! Crossing reduction within ranks via the barycenter heuristic.

use super::graph::Component;
use std::cmp::Ordering;

/// Group nodes into layers by rank and reorder each layer to reduce crossings.
///
/// Pass `k` sweeps downward when `k` is even and upward when odd. A node is
/// keyed by the mean position of its neighbours in the adjacent layer; nodes
/// without such neighbours keep their current position as key. Equal keys
/// fall back to input order.
pub(super) fn order_layers(component: &Component, ranks: &[usize], passes: usize) -> Vec<Vec<usize>> {
    let layer_count = ranks.iter().copied().max().map_or(0, |max| max + 1);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
    for (node, &rank) in ranks.iter().enumerate() {
        layers[rank].push(node);
    }
    if layer_count <= 1 {
        return layers;
    }

    let mut position = vec![0usize; ranks.len()];
    for layer in &layers {
        for (i, &node) in layer.iter().enumerate() {
            position[node] = i;
        }
    }

    for pass in 0..passes {
        if pass % 2 == 0 {
            for r in 1..layer_count {
                let keys: Vec<f64> = layers[r]
                    .iter()
                    .map(|&node| barycenter(node, &component.pred[node], ranks, r - 1, &position))
                    .collect();
                reorder(&mut layers[r], &keys, &mut position);
            }
        } else {
            for r in (0..layer_count - 1).rev() {
                let keys: Vec<f64> = layers[r]
                    .iter()
                    .map(|&node| barycenter(node, &component.succ[node], ranks, r + 1, &position))
                    .collect();
                reorder(&mut layers[r], &keys, &mut position);
            }
        }
    }

    layers
}

fn barycenter(
    node: usize,
    neighbours: &[usize],
    ranks: &[usize],
    adjacent_rank: usize,
    position: &[usize],
) -> f64 {
    let (sum, count) = neighbours
        .iter()
        .filter(|&&n| ranks[n] == adjacent_rank)
        .fold((0usize, 0usize), |(sum, count), &n| (sum + position[n], count + 1));
    if count == 0 {
        position[node] as f64
    } else {
        sum as f64 / count as f64
    }
}

/// Sort `layer` by `keys` (parallel to the current layer order), ties by index.
fn reorder(layer: &mut Vec<usize>, keys: &[f64], position: &mut [usize]) {
    let mut keyed: Vec<(f64, usize)> = keys.iter().copied().zip(layer.iter().copied()).collect();
    keyed.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });
    *layer = keyed.into_iter().map(|(_, node)| node).collect();
    for (i, &node) in layer.iter().enumerate() {
        position[node] = i;
    }
}
