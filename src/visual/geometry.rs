//! Procedural wireframe meshes. Only vertices and unique edges are kept: the canvas
//! renderer strokes edges, it never fills faces.

use std::collections::HashSet;

use crate::math::Vec3;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
	pub vertices: Vec<Vec3>,
	pub edges: Vec<[u32; 2]>,
}

const PHI: f64 = 1.618_033_988_749_895;

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
	[0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
	[1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
	[3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
	[4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

#[rustfmt::skip]
const OCTAHEDRON_FACES: [[usize; 3]; 8] = [
	[0, 2, 4], [0, 4, 3], [0, 3, 5], [0, 5, 2],
	[1, 2, 5], [1, 5, 3], [1, 3, 4], [1, 4, 2],
];

impl Mesh {
	/// Icosahedron of the given circumradius; `detail` splits every edge into
	/// `detail + 1` segments and pushes the new vertices onto the sphere.
	pub fn icosahedron(radius: f64, detail: u32) -> Self {
		let base = [
			Vec3::new(-1.0, PHI, 0.0),
			Vec3::new(1.0, PHI, 0.0),
			Vec3::new(-1.0, -PHI, 0.0),
			Vec3::new(1.0, -PHI, 0.0),
			Vec3::new(0.0, -1.0, PHI),
			Vec3::new(0.0, 1.0, PHI),
			Vec3::new(0.0, -1.0, -PHI),
			Vec3::new(0.0, 1.0, -PHI),
			Vec3::new(PHI, 0.0, -1.0),
			Vec3::new(PHI, 0.0, 1.0),
			Vec3::new(-PHI, 0.0, -1.0),
			Vec3::new(-PHI, 0.0, 1.0),
		];
		Self::spherical_polyhedron(&base, &ICOSAHEDRON_FACES, radius, detail)
	}

	pub fn octahedron(radius: f64) -> Self {
		let base = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
		Self::spherical_polyhedron(&base, &OCTAHEDRON_FACES, radius, 0)
	}

	/// The 14-faced Archimedean solid: all permutations of (0, ±1, ±2), scaled.
	/// Neighbouring vertices sit exactly √2 apart before scaling.
	pub fn truncated_octahedron(scale: f64) -> Self {
		let mut vertices = Vec::with_capacity(24);
		for axes in [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]] {
			for (a, b) in [(1.0, 2.0), (1.0, -2.0), (-1.0, 2.0), (-1.0, -2.0)] {
				let mut c = [0.0; 3];
				c[axes[1]] = a;
				c[axes[2]] = b;
				vertices.push(Vec3::new(c[0], c[1], c[2]));
			}
		}

		let mut edges = Vec::with_capacity(36);
		for i in 0..vertices.len() {
			for j in i + 1..vertices.len() {
				if (vertices[i].distance(vertices[j]) - 2f64.sqrt()).abs() < 1e-9 {
					edges.push([i as u32, j as u32]);
				}
			}
		}

		Self {
			vertices: vertices.into_iter().map(|v| v * scale).collect(),
			edges,
		}
	}

	/// Largest vertex distance from the origin.
	pub fn radius(&self) -> f64 {
		self.vertices.iter().map(|v| v.length()).fold(0.0, f64::max)
	}

	fn spherical_polyhedron(base: &[Vec3], faces: &[[usize; 3]], radius: f64, detail: u32) -> Self {
		let mut builder = MeshBuilder::default();
		let n = detail + 1;
		for face in faces {
			let (a, b, c) = (base[face[0]], base[face[1]], base[face[2]]);
			let point = |i: u32, j: u32| {
				let (u, v) = (i as f64 / n as f64, j as f64 / n as f64);
				(a + (b - a) * u + (c - a) * v).normalize_or_zero()
			};
			for i in 0..n {
				for j in 0..n - i {
					let p0 = builder.vertex(point(i, j));
					let p1 = builder.vertex(point(i + 1, j));
					let p2 = builder.vertex(point(i, j + 1));
					builder.triangle(p0, p1, p2);
					if j + 1 < n - i {
						let p3 = builder.vertex(point(i + 1, j + 1));
						builder.triangle(p1, p3, p2);
					}
				}
			}
		}
		let mut mesh = builder.finish();
		for v in &mut mesh.vertices {
			*v *= radius;
		}
		mesh
	}
}

#[derive(Default)]
struct MeshBuilder {
	vertices: Vec<Vec3>,
	edges: Vec<[u32; 2]>,
	seen: HashSet<[u32; 2]>,
}

impl MeshBuilder {
	// shared edges are computed from different faces, so match within a tolerance
	fn vertex(&mut self, v: Vec3) -> u32 {
		if let Some(i) = self.vertices.iter().position(|w| w.distance(v) < 1e-9) {
			return i as u32;
		}
		self.vertices.push(v);
		(self.vertices.len() - 1) as u32
	}

	fn triangle(&mut self, a: u32, b: u32, c: u32) {
		for (x, y) in [(a, b), (b, c), (c, a)] {
			let edge = [x.min(y), x.max(y)];
			if self.seen.insert(edge) {
				self.edges.push(edge);
			}
		}
	}

	fn finish(self) -> Mesh {
		Mesh {
			vertices: self.vertices,
			edges: self.edges,
		}
	}
}

#[cfg(test)]
mod tests {
	use approx::assert_relative_eq;

	use super::*;

	fn assert_on_sphere(mesh: &Mesh, radius: f64) {
		for v in &mesh.vertices {
			assert_relative_eq!(v.length(), radius, epsilon = 1e-9);
		}
	}

	#[test]
	fn icosahedron_counts_follow_subdivision() {
		// 10n² + 2 vertices and 30n² edges for n segments per edge
		for (detail, vertices, edges) in [(0, 12, 30), (1, 42, 120), (2, 92, 270)] {
			let mesh = Mesh::icosahedron(5.0, detail);
			assert_eq!(mesh.vertices.len(), vertices, "detail {detail}");
			assert_eq!(mesh.edges.len(), edges, "detail {detail}");
			assert_on_sphere(&mesh, 5.0);
		}
	}

	#[test]
	fn octahedron_shape() {
		let mesh = Mesh::octahedron(6.9);
		assert_eq!(mesh.vertices.len(), 6);
		assert_eq!(mesh.edges.len(), 12);
		assert_on_sphere(&mesh, 6.9);
	}

	#[test]
	fn truncated_octahedron_is_archimedean() {
		let mesh = Mesh::truncated_octahedron(2.0);
		assert_eq!(mesh.vertices.len(), 24);
		assert_eq!(mesh.edges.len(), 36);
		assert_relative_eq!(mesh.radius(), 2.0 * 5f64.sqrt(), epsilon = 1e-12);

		let mut degree = [0; 24];
		for [a, b] in &mesh.edges {
			degree[*a as usize] += 1;
			degree[*b as usize] += 1;
		}
		assert!(degree.iter().all(|&d| d == 3));
	}

	#[test]
	fn edges_are_unique_and_in_range() {
		let mesh = Mesh::icosahedron(1.0, 1);
		let unique: HashSet<_> = mesh.edges.iter().collect();
		assert_eq!(unique.len(), mesh.edges.len());
		assert!(mesh.edges.iter().flatten().all(|&i| (i as usize) < mesh.vertices.len()));
	}
}
