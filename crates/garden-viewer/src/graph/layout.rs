use garden_core::{NodeId, NodeKind};
use glam::Vec2;
use std::collections::{HashMap, HashSet};

use crate::graph::model::GraphModel;

const INITIAL_RADIUS: f32 = 10.0;
const JIGGLE: f32 = 1e-6;

pub fn kind_radius(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Note => 10.0,
        NodeKind::Tag => 7.0,
        NodeKind::Path => 15.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub link_distance: f32,
    pub charge: f32,
    pub collide_padding: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub drag_alpha_target: f32,
    pub resize_alpha: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 100.0,
            charge: -300.0,
            collide_padding: 12.0,
            velocity_decay: 0.4,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            drag_alpha_target: 0.3,
            resize_alpha: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub pos: Option<Vec2>,
    pub vel: Vec2,
    pub fixed: Option<Vec2>,
    pub radius: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub retained: usize,
    pub introduced: Vec<NodeId>,
    pub dropped: Vec<NodeId>,
    pub reheated: bool,
}

#[derive(Debug, Clone, Copy)]
struct BoundLink {
    source: usize,
    target: usize,
    strength: f32,
    bias: f32,
}

/// Force-directed layout bound to snapshots of the graph model.
///
/// Per-node state is keyed by identity, so a node that survives a reload
/// keeps its position and velocity. The simulation only heats up on
/// topology change, drag, or resize; plain ticks only cool it down.
pub struct LayoutAdapter {
    params: LayoutParams,
    order: Vec<NodeId>,
    bodies: HashMap<NodeId, Body>,
    links: Vec<BoundLink>,
    link_pairs: HashSet<(NodeId, NodeId)>,
    radius_overrides: HashMap<NodeId, f32>,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    running: bool,
}

impl LayoutAdapter {
    pub fn new(params: LayoutParams, width: f32, height: f32) -> Self {
        Self {
            params,
            order: Vec::new(),
            bodies: HashMap::new(),
            links: Vec::new(),
            link_pairs: HashSet::new(),
            radius_overrides: HashMap::new(),
            center: Vec2::new(width / 2.0, height / 2.0),
            alpha: 1.0,
            alpha_target: 0.0,
            running: false,
        }
    }

    /// Rebind the simulation to the current model.
    pub fn sync(&mut self, model: &GraphModel) -> SyncReport {
        let mut report = SyncReport::default();
        let mut bodies = HashMap::with_capacity(model.len());
        let mut order = Vec::with_capacity(model.len());

        for node in model.nodes() {
            let radius = self
                .radius_overrides
                .get(&node.id)
                .copied()
                .unwrap_or_else(|| kind_radius(node.kind));
            let body = match self.bodies.remove(&node.id) {
                Some(mut existing) => {
                    report.retained += 1;
                    existing.radius = radius;
                    existing
                }
                None => {
                    report.introduced.push(node.id.clone());
                    Body {
                        pos: None,
                        vel: Vec2::ZERO,
                        fixed: None,
                        radius,
                    }
                }
            };
            bodies.insert(node.id.clone(), body);
            order.push(node.id.clone());
        }

        let mut dropped: Vec<NodeId> = self.bodies.drain().map(|(id, _)| id).collect();
        dropped.sort();
        report.dropped = dropped;
        self.radius_overrides.retain(|id, _| bodies.contains_key(id));

        let slot: HashMap<&NodeId, usize> = order.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let mut count = vec![0usize; order.len()];
        let mut raw = Vec::with_capacity(model.link_count());
        let mut pairs = HashSet::with_capacity(model.link_count());
        for link in model.links() {
            let (Some(&s), Some(&t)) = (slot.get(&link.source), slot.get(&link.target)) else {
                continue;
            };
            count[s] += 1;
            count[t] += 1;
            raw.push((s, t));
            pairs.insert(link.pair_key());
        }
        let links = raw
            .into_iter()
            .map(|(s, t)| BoundLink {
                source: s,
                target: t,
                strength: 1.0 / count[s].min(count[t]).max(1) as f32,
                bias: count[s] as f32 / (count[s] + count[t]) as f32,
            })
            .collect();

        let topology_changed =
            !report.introduced.is_empty() || !report.dropped.is_empty() || pairs != self.link_pairs;

        self.order = order;
        self.bodies = bodies;
        self.links = links;
        self.link_pairs = pairs;

        if topology_changed {
            self.alpha = 1.0;
            self.running = true;
            report.reheated = true;
        }
        report
    }

    /// Advance one integration step. Returns whether the simulation is still
    /// active afterwards.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.order.is_empty() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        self.seed_unplaced();

        let n = self.order.len();
        let mut pos = Vec::with_capacity(n);
        let mut vel = Vec::with_capacity(n);
        let mut radius = Vec::with_capacity(n);
        for id in &self.order {
            let b = &self.bodies[id];
            pos.push(b.pos.unwrap_or(self.center));
            vel.push(b.vel);
            radius.push(b.radius + self.params.collide_padding);
        }

        self.apply_links(&pos, &mut vel);
        self.apply_charge(&pos, &mut vel);
        apply_collide(&pos, &mut vel, &radius);
        apply_center(&mut pos, self.center);

        let keep = 1.0 - self.params.velocity_decay;
        for (i, id) in self.order.iter().enumerate() {
            let Some(body) = self.bodies.get_mut(id) else {
                continue;
            };
            match body.fixed {
                Some(fixed) => {
                    body.pos = Some(fixed);
                    body.vel = Vec2::ZERO;
                }
                None => {
                    let v = vel[i] * keep;
                    body.vel = v;
                    body.pos = Some(pos[i] + v);
                }
            }
        }

        if self.alpha < self.params.alpha_min {
            self.running = false;
        }
        self.running
    }

    fn seed_unplaced(&mut self) {
        let angle_step = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        for (i, id) in self.order.iter().enumerate() {
            let Some(body) = self.bodies.get_mut(id) else {
                continue;
            };
            if body.pos.is_some() {
                continue;
            }
            let r = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
            let a = i as f32 * angle_step;
            body.pos = Some(body.fixed.unwrap_or(self.center + Vec2::new(r * a.cos(), r * a.sin())));
        }
    }

    fn apply_links(&self, pos: &[Vec2], vel: &mut [Vec2]) {
        for l in &self.links {
            let (s, t) = (l.source, l.target);
            let mut d = (pos[t] + vel[t]) - (pos[s] + vel[s]);
            if d == Vec2::ZERO {
                d = Vec2::new(JIGGLE, 0.0);
            }
            let len = d.length();
            let k = (len - self.params.link_distance) / len * self.alpha * l.strength;
            let d = d * k;
            vel[t] -= d * l.bias;
            vel[s] += d * (1.0 - l.bias);
        }
    }

    fn apply_charge(&self, pos: &[Vec2], vel: &mut [Vec2]) {
        let strength = self.params.charge * self.alpha;
        for i in 0..pos.len() {
            for j in 0..pos.len() {
                if i == j {
                    continue;
                }
                let mut d = pos[j] - pos[i];
                if d == Vec2::ZERO {
                    d = Vec2::new(JIGGLE * (j as f32 + 1.0), JIGGLE);
                }
                let mut l2 = d.length_squared();
                if l2 < 1.0 {
                    l2 = l2.sqrt();
                }
                vel[i] += d * strength / l2;
            }
        }
    }

    pub fn position(&self, id: &NodeId) -> Option<Vec2> {
        self.bodies.get(id).and_then(|b| b.pos)
    }

    pub fn velocity(&self, id: &NodeId) -> Option<Vec2> {
        self.bodies.get(id).map(|b| b.vel)
    }

    pub fn radius(&self, id: &NodeId) -> Option<f32> {
        self.bodies.get(id).map(|b| b.radius)
    }

    pub fn is_pinned(&self, id: &NodeId) -> bool {
        self.bodies.get(id).is_some_and(|b| b.fixed.is_some())
    }

    pub fn positions(&self) -> impl Iterator<Item = (&NodeId, Vec2)> {
        self.order
            .iter()
            .filter_map(|id| self.bodies.get(id).and_then(|b| b.pos).map(|p| (id, p)))
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn is_active(&self) -> bool {
        self.running
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Override the collision radius of one node (e.g. centrality sizing).
    pub fn set_radius(&mut self, id: &NodeId, radius: f32) {
        if let Some(body) = self.bodies.get_mut(id) {
            body.radius = radius;
            self.radius_overrides.insert(id.clone(), radius);
        }
    }

    pub fn drag_start(&mut self, id: &NodeId) -> bool {
        let Some(body) = self.bodies.get_mut(id) else {
            return false;
        };
        let Some(pos) = body.pos else {
            return false;
        };
        body.fixed = Some(pos);
        self.alpha_target = self.params.drag_alpha_target;
        self.running = true;
        true
    }

    pub fn drag_move(&mut self, id: &NodeId, to: Vec2) -> bool {
        match self.bodies.get_mut(id) {
            Some(body) if body.fixed.is_some() => {
                body.fixed = Some(to);
                true
            }
            _ => false,
        }
    }

    pub fn drag_end(&mut self, id: &NodeId) -> bool {
        self.alpha_target = 0.0;
        match self.bodies.get_mut(id) {
            Some(body) => body.fixed.take().is_some(),
            None => false,
        }
    }

    /// Recenter on a new viewport. Positions are left alone.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.center = Vec2::new(width / 2.0, height / 2.0);
        self.alpha = self.alpha.max(self.params.resize_alpha);
        self.running = true;
    }
}

fn apply_collide(pos: &[Vec2], vel: &mut [Vec2], radius: &[f32]) {
    for i in 0..pos.len() {
        for j in (i + 1)..pos.len() {
            let r = radius[i] + radius[j];
            let mut d = (pos[i] + vel[i]) - (pos[j] + vel[j]);
            let mut l2 = d.length_squared();
            if l2 >= r * r {
                continue;
            }
            if l2 == 0.0 {
                d = Vec2::new(JIGGLE, JIGGLE * (i as f32 + 1.0));
                l2 = d.length_squared();
            }
            let l = l2.sqrt();
            let push = (r - l) / l;
            let (ri2, rj2) = (radius[i] * radius[i], radius[j] * radius[j]);
            let wj = rj2 / (ri2 + rj2);
            vel[i] += d * push * wj;
            vel[j] -= d * push * (1.0 - wj);
        }
    }
}

fn apply_center(pos: &mut [Vec2], center: Vec2) {
    if pos.is_empty() {
        return;
    }
    let mean = pos.iter().copied().sum::<Vec2>() / pos.len() as f32;
    let shift = mean - center;
    for p in pos.iter_mut() {
        *p -= shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_core::{Link, LinkKind, Node};

    fn model(ids: &[&str], links: &[(&str, &str)]) -> GraphModel {
        let mut m = GraphModel::default();
        m.replace_all(
            ids.iter().map(|id| Node::note(id)).collect(),
            links
                .iter()
                .map(|(a, b)| Link::new((*a).into(), (*b).into(), LinkKind::Related))
                .collect(),
        );
        m
    }

    fn settle(layout: &mut LayoutAdapter, ticks: usize) {
        for _ in 0..ticks {
            layout.tick();
        }
    }

    #[test]
    fn sync_keeps_state_of_surviving_nodes() {
        let mut m = model(&["A", "B"], &[("A", "B")]);
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        layout.sync(&m);
        settle(&mut layout, 20);

        let a = NodeId::from("A");
        let pos_a = layout.position(&a).unwrap();
        let vel_a = layout.velocity(&a).unwrap();

        m.replace_all(
            vec![Node::note("A"), Node::note("C")],
            vec![Link::new("A".into(), "C".into(), LinkKind::Related)],
        );
        let report = layout.sync(&m);

        assert_eq!(layout.position(&a), Some(pos_a));
        assert_eq!(layout.velocity(&a), Some(vel_a));
        assert_eq!(layout.position(&"C".into()), None);
        assert_eq!(report.retained, 1);
        assert_eq!(report.introduced, vec![NodeId::from("C")]);
        assert_eq!(report.dropped, vec![NodeId::from("B")]);
        assert!(layout.position(&"B".into()).is_none());
    }

    #[test]
    fn new_nodes_are_placed_on_first_tick() {
        let m = model(&["A", "B", "C"], &[]);
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        layout.sync(&m);
        assert!(layout.positions().next().is_none());

        layout.tick();
        let placed: Vec<_> = layout.positions().collect();
        assert_eq!(placed.len(), 3);
        for (_, p) in placed {
            assert!(p.is_finite());
            assert!(p.distance(layout.center()) < 200.0);
        }
    }

    #[test]
    fn sync_reheats_only_on_topology_change() {
        let m = model(&["A", "B"], &[("A", "B")]);
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        assert!(layout.sync(&m).reheated);
        assert_eq!(layout.alpha(), 1.0);

        settle(&mut layout, 50);
        let cooled = layout.alpha();
        assert!(cooled < 1.0);

        let report = layout.sync(&m);
        assert!(!report.reheated);
        assert_eq!(layout.alpha(), cooled);
    }

    #[test]
    fn ticks_only_cool_the_simulation() {
        let m = model(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        layout.sync(&m);
        let mut last = layout.alpha();
        for _ in 0..100 {
            layout.tick();
            assert!(layout.alpha() <= last);
            last = layout.alpha();
        }
    }

    #[test]
    fn simulation_stops_when_cold() {
        let m = model(&["A", "B"], &[("A", "B")]);
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        layout.sync(&m);
        let mut ticks = 0;
        while layout.tick() {
            ticks += 1;
            assert!(ticks < 10_000);
        }
        assert!(!layout.is_active());

        let frozen: Vec<_> = layout.positions().map(|(_, p)| p).collect();
        assert!(!layout.tick());
        let after: Vec<_> = layout.positions().map(|(_, p)| p).collect();
        assert_eq!(frozen, after);
    }

    #[test]
    fn connected_nodes_settle_near_link_distance() {
        let m = model(&["A", "B"], &[("A", "B")]);
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        layout.sync(&m);
        settle(&mut layout, 300);
        let d = layout
            .position(&"A".into())
            .unwrap()
            .distance(layout.position(&"B".into()).unwrap());
        assert!(d > 40.0 && d < 400.0, "distance {d}");
        let mid = (layout.position(&"A".into()).unwrap() + layout.position(&"B".into()).unwrap()) / 2.0;
        assert!(mid.distance(layout.center()) < 1.0);
    }

    #[test]
    fn drag_pins_then_releases() {
        let m = model(&["A", "B"], &[("A", "B")]);
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        layout.sync(&m);
        settle(&mut layout, 10);

        let a = NodeId::from("A");
        assert!(layout.drag_start(&a));
        assert!(layout.is_pinned(&a));
        assert_eq!(layout.alpha_target(), 0.3);

        let target = Vec2::new(50.0, 60.0);
        assert!(layout.drag_move(&a, target));
        layout.tick();
        assert_eq!(layout.position(&a), Some(target));
        assert_eq!(layout.velocity(&a), Some(Vec2::ZERO));

        assert!(layout.drag_end(&a));
        assert!(!layout.is_pinned(&a));
        assert_eq!(layout.alpha_target(), 0.0);
    }

    #[test]
    fn drag_of_unknown_or_unplaced_node_is_rejected() {
        let m = model(&["A"], &[]);
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        layout.sync(&m);
        assert!(!layout.drag_start(&"A".into()));
        assert!(!layout.drag_start(&"nope".into()));
        assert!(!layout.drag_move(&"A".into(), Vec2::ONE));
    }

    #[test]
    fn resize_recenters_without_moving_nodes() {
        let m = model(&["A", "B"], &[("A", "B")]);
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        layout.sync(&m);
        while layout.tick() {}

        let before: Vec<_> = layout.positions().map(|(_, p)| p).collect();
        layout.resize(1200.0, 1000.0);
        let after: Vec<_> = layout.positions().map(|(_, p)| p).collect();

        assert_eq!(before, after);
        assert_eq!(layout.center(), Vec2::new(600.0, 500.0));
        assert!(layout.is_active());
        assert!((layout.alpha() - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn radius_follows_kind_and_overrides_survive_sync() {
        let mut m = GraphModel::default();
        m.merge_node(Node::note("A"));
        m.merge_node(Node::tag("t"));
        m.merge_node(Node::path("p"));
        let mut layout = LayoutAdapter::new(LayoutParams::default(), 800.0, 600.0);
        layout.sync(&m);
        assert_eq!(layout.radius(&"A".into()), Some(10.0));
        assert_eq!(layout.radius(&NodeId::tag("t")), Some(7.0));
        assert_eq!(layout.radius(&NodeId::path("p")), Some(15.0));

        layout.set_radius(&"A".into(), 22.0);
        m.merge_node(Node::note("B"));
        layout.sync(&m);
        assert_eq!(layout.radius(&"A".into()), Some(22.0));
    }
}
