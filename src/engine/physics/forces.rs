use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;
use super::{SimLink, SimNode};

const MIN_DISTANCE_SQ: f32 = 1.0;

/// Deterministic stand-in direction for coincident points.
fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

fn repulsion_between(point: Vec2, other: Vec2, strength: f32, tiebreak: (usize, usize)) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq();
    if distance_sq <= 1e-9 {
        return jiggle(tiebreak.0, tiebreak.1) * strength;
    }
    delta * (strength / distance_sq.max(MIN_DISTANCE_SQ))
}

/// Many-body push on node `index`, `strength` already scaled by alpha.
pub(super) fn accumulate_repulsion(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    delta: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            *delta += repulsion_between(point, positions[other], strength, (index, other));
        }
        return;
    }

    let offset = point - node.center_of_mass;
    let distance_sq = offset.length_sq().max(MIN_DISTANCE_SQ);
    let can_approximate = !node.bounds.contains(point)
        && node.bounds.side_length() * node.bounds.side_length() < theta * theta * distance_sq;

    if can_approximate {
        *delta += offset * (strength * node.mass / distance_sq);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion(child, index, positions, strength, theta, delta);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_reach_sq: f32,
}

fn collide_pair(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let offset = predicted[from] - predicted[to];
    let distance_sq = offset.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    let (direction, distance) = if distance_sq > 1e-9 {
        let distance = distance_sq.sqrt();
        (offset / distance, distance)
    } else {
        (jiggle(from, to), 0.0)
    };

    let push = direction * ((reach - distance) * strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = if from_sq + to_sq > 0.0 {
        to_sq / (from_sq + to_sq)
    } else {
        0.5
    };

    deltas[from] += push * share;
    deltas[to] -= push * (1.0 - share);
}

/// Overlap resolution over every pair of padded circles, pruning cell pairs
/// that are farther apart than the largest possible reach.
pub(super) fn accumulate_collisions(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_reach_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    collide_pair(from, to, predicted, radii, params.strength, deltas);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide_pair(from, to, predicted, radii, params.strength, deltas);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_deref() else {
                continue;
            };
            accumulate_collisions(child_a, child_a, true, predicted, radii, params, deltas);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_deref() else {
                    continue;
                };
                accumulate_collisions(child_a, child_b, false, predicted, radii, params, deltas);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collisions(child, node_b, false, predicted, radii, params, deltas);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collisions(node_a, child, false, predicted, radii, params, deltas);
        }
    }
}

/// Springs toward `distance`, measured between predicted positions and split
/// between endpoints by degree bias.
pub(super) fn accumulate_links(
    links: &[SimLink],
    predicted: &[Vec2],
    distance: f32,
    strength: f32,
    deltas: &mut [Vec2],
) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target || source >= predicted.len() || target >= predicted.len() {
            continue;
        }

        let mut offset = predicted[target] - predicted[source];
        let mut length = offset.length();
        if length <= 1e-6 {
            offset = jiggle(source, target) * 1e-3;
            length = 1e-3;
        }

        let stretch = offset * ((length - distance) / length * strength);
        deltas[target] -= stretch * link.bias;
        deltas[source] += stretch * (1.0 - link.bias);
    }
}

pub(super) fn accumulate_cluster(
    nodes: &[SimNode],
    anchors: &[Vec2],
    strength: f32,
    deltas: &mut [Vec2],
) {
    for (node, delta) in nodes.iter().zip(deltas.iter_mut()) {
        if let Some(anchor) = anchors.get(node.cluster) {
            *delta += (*anchor - node.position) * strength;
        }
    }
}

/// Pushes nodes back out of the `padding` margin along each axis.
pub(super) fn accumulate_bounds(
    nodes: &[SimNode],
    viewport: Vec2,
    padding: f32,
    alpha: f32,
    deltas: &mut [Vec2],
) {
    let low = Vec2::splat(padding);
    let high = viewport - low;
    for (node, delta) in nodes.iter().zip(deltas.iter_mut()) {
        let position = node.position;
        if position.x < low.x {
            delta.x += (low.x - position.x) * alpha;
        }
        if position.x > high.x {
            delta.x += (high.x - position.x) * alpha;
        }
        if position.y < low.y {
            delta.y += (low.y - position.y) * alpha;
        }
        if position.y > high.y {
            delta.y += (high.y - position.y) * alpha;
        }
    }
}

/// Translation that moves the centroid toward `center`.
pub(super) fn centering_shift(nodes: &[SimNode], center: Vec2, strength: f32) -> Vec2 {
    if nodes.is_empty() {
        return Vec2::ZERO;
    }

    let mut sum = Vec2::ZERO;
    for node in nodes {
        sum += node.position;
    }
    let centroid = sum / nodes.len() as f32;
    (center - centroid) * strength
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(position: Vec2, cluster: usize) -> SimNode {
        SimNode {
            id: String::new(),
            position,
            velocity: Vec2::ZERO,
            radius: 10.0,
            cluster,
            fx: None,
            fy: None,
        }
    }

    #[test]
    fn repulsion_pushes_apart_symmetrically() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadNode::build(&positions).unwrap();

        let mut left = Vec2::ZERO;
        let mut right = Vec2::ZERO;
        accumulate_repulsion(&tree, 0, &positions, 300.0, 0.9, &mut left);
        accumulate_repulsion(&tree, 1, &positions, 300.0, 0.9, &mut right);

        assert!(left.x < 0.0);
        assert!(right.x > 0.0);
        assert!((left.x + right.x).abs() < 1e-4);
        assert!((right.x - 30.0).abs() < 1e-4);
    }

    #[test]
    fn approximated_repulsion_stays_close_to_exact() {
        let mut positions = (0..64)
            .map(|index| vec2((index % 8) as f32 * 5.0, (index / 8) as f32 * 5.0))
            .collect::<Vec<_>>();
        positions.push(vec2(800.0, 800.0));
        let probe = positions.len() - 1;
        let tree = QuadNode::build(&positions).unwrap();

        let mut approximate = Vec2::ZERO;
        accumulate_repulsion(&tree, probe, &positions, 300.0, 0.9, &mut approximate);

        let mut exact = Vec2::ZERO;
        for other in 0..probe {
            exact += repulsion_between(positions[probe], positions[other], 300.0, (probe, other));
        }

        assert!((approximate - exact).length() / exact.length() < 0.05);
    }

    #[test]
    fn collision_separates_overlapping_pair_by_area_share() {
        let predicted = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let radii = vec![10.0, 20.0];
        let tree = QuadNode::build(&predicted).unwrap();
        let mut deltas = vec![Vec2::ZERO; 2];

        accumulate_collisions(
            &tree,
            &tree,
            true,
            &predicted,
            &radii,
            CollisionParams {
                strength: 1.0,
                max_reach_sq: 40.0 * 40.0,
            },
            &mut deltas,
        );

        assert!(deltas[0].x < 0.0);
        assert!(deltas[1].x > 0.0);
        assert!((deltas[1].x - deltas[0].x - 20.0).abs() < 1e-4);
        assert!(deltas[0].x.abs() > deltas[1].x.abs());
    }

    #[test]
    fn separated_circles_do_not_collide() {
        let predicted = vec![vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let radii = vec![10.0, 10.0];
        let tree = QuadNode::build(&predicted).unwrap();
        let mut deltas = vec![Vec2::ZERO; 2];

        accumulate_collisions(
            &tree,
            &tree,
            true,
            &predicted,
            &radii,
            CollisionParams {
                strength: 1.0,
                max_reach_sq: 400.0,
            },
            &mut deltas,
        );
        assert_eq!(deltas, vec![Vec2::ZERO; 2]);
    }

    #[test]
    fn link_spring_pulls_toward_rest_length() {
        let links = [SimLink {
            source: 0,
            target: 1,
            bias: 0.5,
        }];
        let predicted = vec![vec2(0.0, 0.0), vec2(300.0, 0.0)];
        let mut deltas = vec![Vec2::ZERO; 2];

        accumulate_links(&links, &predicted, 150.0, 0.3, &mut deltas);
        assert!(deltas[0].x > 0.0);
        assert!(deltas[1].x < 0.0);
        assert!((deltas[0].x - 22.5).abs() < 1e-3);

        let compressed = vec![vec2(0.0, 0.0), vec2(50.0, 0.0)];
        let mut deltas = vec![Vec2::ZERO; 2];
        accumulate_links(&links, &compressed, 150.0, 0.3, &mut deltas);
        assert!(deltas[0].x < 0.0);
        assert!(deltas[1].x > 0.0);
    }

    #[test]
    fn cluster_pull_points_at_anchor() {
        let nodes = vec![node(vec2(0.0, 0.0), 0), node(vec2(0.0, 0.0), 1)];
        let anchors = [vec2(10.0, 0.0), vec2(0.0, -10.0)];
        let mut deltas = vec![Vec2::ZERO; 2];

        accumulate_cluster(&nodes, &anchors, 0.5, &mut deltas);
        assert_eq!(deltas[0], vec2(5.0, 0.0));
        assert_eq!(deltas[1], vec2(0.0, -5.0));
    }

    #[test]
    fn bounds_only_act_inside_the_margin() {
        let nodes = vec![
            node(vec2(40.0, 300.0), 0),
            node(vec2(500.0, 300.0), 0),
            node(vec2(990.0, 790.0), 0),
        ];
        let mut deltas = vec![Vec2::ZERO; 3];

        accumulate_bounds(&nodes, vec2(1000.0, 800.0), 100.0, 0.5, &mut deltas);
        assert_eq!(deltas[0], vec2(30.0, 0.0));
        assert_eq!(deltas[1], Vec2::ZERO);
        assert_eq!(deltas[2], vec2(-45.0, -45.0));
    }

    #[test]
    fn centering_moves_centroid_to_center() {
        let nodes = vec![node(vec2(0.0, 0.0), 0), node(vec2(20.0, 40.0), 0)];
        assert_eq!(
            centering_shift(&nodes, vec2(100.0, 100.0), 1.0),
            vec2(90.0, 80.0)
        );
        assert_eq!(centering_shift(&[], vec2(1.0, 1.0), 1.0), Vec2::ZERO);
    }
}
