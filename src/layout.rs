//! 3D force-directed layout: pairwise repulsion, spring links, velocity damping and
//! an alpha that cools the simulation down over time.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::graph::NodeIdx;
use crate::math::Vec3;

const INITIAL_RADIUS: f64 = 10.0;
const JIGGLE: f64 = 1e-6;

#[derive(Clone, Debug)]
pub struct LayoutConfig {
	/// Charge between every pair of nodes; positive pushes apart.
	pub repulsion: f64,
	/// Rest length of every link.
	pub link_distance: f64,
	/// Spring stiffness; `None` uses `1 / min(degree)` of the endpoints.
	pub link_strength: Option<f64>,
	/// Fraction of velocity retained per tick.
	pub velocity_decay: f64,
	/// How fast alpha approaches `alpha_target` each tick.
	pub alpha_decay: f64,
	pub alpha_target: f64,
	/// Separation below which repulsion is softened.
	pub min_distance: f64,
	/// Ticks run synchronously before the first frame.
	pub warmup_ticks: u32,
	/// Ticks after which the layout is considered settled; 0 runs forever.
	pub cooldown_ticks: u32,
	/// Keep the centroid of free nodes at the origin.
	pub center: bool,
	pub seed: u64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			repulsion: 30.0,
			link_distance: 30.0,
			link_strength: None,
			velocity_decay: 0.7,
			alpha_decay: 0.01,
			alpha_target: 0.0,
			min_distance: 1.0,
			warmup_ticks: 100,
			cooldown_ticks: 200,
			center: true,
			seed: 0x5eed,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct NodeState {
	pub position: Vec3,
	pub velocity: Vec3,
	pub degree: usize,
	pub pinned: bool,
}

/// What a single tick reports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
	/// Ticks since the last (re)start, including warm-up.
	pub index: u32,
	pub alpha: f64,
}

struct Spring {
	source: NodeIdx,
	target: NodeIdx,
	strength: f64,
	bias: f64,
}

pub struct ForceLayout {
	config: LayoutConfig,
	nodes: Vec<NodeState>,
	springs: Vec<Spring>,
	alpha: f64,
	ticks: u32,
	/// Tick at which the cooldown count starts: after warm-up, or at a reheat.
	cooling_from: u32,
	rng: SmallRng,
}

impl ForceLayout {
	pub fn new(node_count: usize, links: &[(NodeIdx, NodeIdx)], config: LayoutConfig) -> Self {
		let mut nodes = vec![NodeState::default(); node_count];
		for &(s, t) in links {
			nodes[s].degree += 1;
			nodes[t].degree += 1;
		}

		let springs = links
			.iter()
			.map(|&(source, target)| {
				let (ds, dt) = (nodes[source].degree as f64, nodes[target].degree as f64);
				Spring {
					source,
					target,
					strength: config.link_strength.unwrap_or(1.0 / ds.min(dt)),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		let rng = SmallRng::seed_from_u64(config.seed);
		let mut layout = Self {
			config,
			nodes,
			springs,
			alpha: 1.0,
			ticks: 0,
			cooling_from: 0,
			rng,
		};
		layout.reseed();
		layout
	}

	/// Scatters unpinned nodes on shells of growing radius, resets alpha and runs
	/// the warm-up ticks.
	pub fn reseed(&mut self) {
		for (i, node) in self.nodes.iter_mut().enumerate() {
			node.velocity = Vec3::ZERO;
			if node.pinned {
				continue;
			}
			let radius = INITIAL_RADIUS * (0.5 + i as f64).cbrt();
			node.position = random_direction(&mut self.rng) * radius;
		}
		self.reheat();
		let warmup = self.config.warmup_ticks as usize;
		self.ticks().take(warmup).for_each(drop);
		self.cooling_from = self.ticks;
	}

	/// Restarts cooling from the current positions. Warm-up is not rerun, so the
	/// layout runs a full cooldown from here.
	pub fn reheat(&mut self) {
		self.alpha = 1.0;
		self.ticks = 0;
		self.cooling_from = 0;
	}

	/// Lazy, infinite sequence of ticks.
	pub fn ticks(&mut self) -> Ticks<'_> {
		Ticks { layout: self }
	}

	pub fn is_cooled(&self) -> bool {
		self.config.cooldown_ticks != 0
			&& self.ticks >= self.cooling_from + self.config.cooldown_ticks
	}

	/// Per-frame entry point: ticks unless the layout has cooled down.
	pub fn step(&mut self) -> Option<Tick> {
		(!self.is_cooled()).then(|| self.tick())
	}

	pub fn tick(&mut self) -> Tick {
		self.alpha += (self.config.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_springs();
		self.apply_repulsion();

		for node in &mut self.nodes {
			if node.pinned {
				node.velocity = Vec3::ZERO;
			} else {
				node.velocity *= self.config.velocity_decay;
				node.position += node.velocity;
			}
		}
		if self.config.center {
			self.recenter();
		}

		self.ticks += 1;
		Tick {
			index: self.ticks,
			alpha: self.alpha,
		}
	}

	fn apply_springs(&mut self) {
		for spring in &self.springs {
			let (s, t) = (&self.nodes[spring.source], &self.nodes[spring.target]);
			let mut delta = (t.position + t.velocity) - (s.position + s.velocity);
			if delta.length_squared() == 0.0 {
				delta = jiggle(&mut self.rng);
			}
			let len = delta.length();
			let pull = (len - self.config.link_distance) / len * self.alpha * spring.strength;
			let delta = delta * pull;
			self.nodes[spring.target].velocity -= delta * spring.bias;
			self.nodes[spring.source].velocity += delta * (1.0 - spring.bias);
		}
	}

	fn apply_repulsion(&mut self) {
		if self.config.repulsion == 0.0 {
			return;
		}
		let min2 = self.config.min_distance * self.config.min_distance;
		let n = self.nodes.len();
		for i in 0..n {
			for j in i + 1..n {
				let mut delta = self.nodes[j].position - self.nodes[i].position;
				let mut l2 = delta.length_squared();
				if l2 == 0.0 {
					delta = jiggle(&mut self.rng);
					l2 = delta.length_squared();
				}
				// below min_distance the force magnitude stays bounded by repulsion / min_distance
				if l2 < min2 {
					l2 = (min2 * l2).sqrt();
				}
				let push = delta * (self.config.repulsion * self.alpha / l2);
				self.nodes[i].velocity -= push;
				self.nodes[j].velocity += push;
			}
		}
	}

	fn recenter(&mut self) {
		let free = self.nodes.iter().filter(|n| !n.pinned).count();
		if free == 0 {
			return;
		}
		let sum = self.nodes.iter().fold(Vec3::ZERO, |acc, n| acc + n.position);
		let shift = sum / self.nodes.len() as f64;
		for node in self.nodes.iter_mut().filter(|n| !n.pinned) {
			node.position -= shift;
		}
	}

	/// Fixes a node in place; it still repels the others.
	pub fn pin(&mut self, idx: NodeIdx, position: Vec3) {
		let node = &mut self.nodes[idx];
		node.pinned = true;
		node.position = position;
		node.velocity = Vec3::ZERO;
	}

	pub fn unpin(&mut self, idx: NodeIdx) {
		self.nodes[idx].pinned = false;
	}

	pub fn position(&self, idx: NodeIdx) -> Vec3 {
		self.nodes[idx].position
	}

	pub fn nodes(&self) -> &[NodeState] {
		&self.nodes
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}
}

pub struct Ticks<'a> {
	layout: &'a mut ForceLayout,
}

impl Iterator for Ticks<'_> {
	type Item = Tick;

	fn next(&mut self) -> Option<Tick> {
		Some(self.layout.tick())
	}
}

fn random_direction(rng: &mut SmallRng) -> Vec3 {
	loop {
		let v = Vec3::new(
			rng.random_range(-1.0..1.0),
			rng.random_range(-1.0..1.0),
			rng.random_range(-1.0..1.0),
		);
		let l2 = v.length_squared();
		if l2 > 1e-6 && l2 <= 1.0 {
			return v / l2.sqrt();
		}
	}
}

fn jiggle(rng: &mut SmallRng) -> Vec3 {
	random_direction(rng) * JIGGLE
}
