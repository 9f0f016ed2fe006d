//! Solver settings.

use crate::face::{Face, ALL_FACES};



/// How the last layer is solved after F2L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LastLayer {
	/// OLL, then PLL.
	#[default]
	TwoLook,
	/// One algorithm from the one-look catalog.
	OneLook,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
	/// Search threads: 0 uses every hardware thread, negative searches
	/// sequentially.
	pub cores: i32,
	/// Displayed faces the cross may be built on.
	pub cross_layers: Vec<Face>,
	pub cross_depth: usize,
	pub max_cross_depth: usize,
	/// Trigger blocks per F2L search.
	pub f2l_blocks: usize,
	pub max_f2l_blocks: usize,
	pub last_layer: LastLayer,
}

impl Default for SolverConfig {
	fn default() -> Self {
		Self {
			cores: 0,
			cross_layers: ALL_FACES.to_vec(),
			cross_depth: 6,
			max_cross_depth: 7,
			f2l_blocks: 3,
			max_f2l_blocks: 4,
			last_layer: LastLayer::TwoLook,
		}
	}
}

impl SolverConfig {
	#[must_use]
	pub fn with_cores(mut self, cores: i32) -> Self {
		self.cores = cores;
		self
	}

	/// Layers are searched in face order whatever order they are given in.
	#[must_use]
	pub fn with_cross_layers(mut self, layers: &[Face]) -> Self {
		let mut layers = layers.to_vec();
		layers.sort();
		layers.dedup();
		self.cross_layers = layers;
		self
	}

	/// Also raises the retry limit when it would fall below `depth`.
	#[must_use]
	pub fn with_cross_depth(mut self, depth: usize) -> Self {
		self.cross_depth = depth;
		self.max_cross_depth = self.max_cross_depth.max(depth);
		self
	}

	#[must_use]
	pub fn with_max_cross_depth(mut self, depth: usize) -> Self {
		self.max_cross_depth = depth;
		self
	}

	#[must_use]
	pub fn with_f2l_blocks(mut self, blocks: usize) -> Self {
		self.f2l_blocks = blocks;
		self.max_f2l_blocks = self.max_f2l_blocks.max(blocks);
		self
	}

	#[must_use]
	pub fn with_max_f2l_blocks(mut self, blocks: usize) -> Self {
		self.max_f2l_blocks = blocks;
		self
	}

	#[must_use]
	pub fn with_last_layer(mut self, last_layer: LastLayer) -> Self {
		self.last_layer = last_layer;
		self
	}
}
