//! Whole-cube orientation.
//!
//! A [`Spin`] records which physical face is displayed as Up and which as
//! Front. Face letters in an algorithm always name displayed faces and are
//! redirected through [`Spin::face`] before touching piece data, so the six
//! physical turn primitives serve all 24 orientations.

use crate::face::{Amount, Axis, Face, ALL_FACES};



/// Index into the 24 orientation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Spin(u8);

/// `(up, front)` physical faces of every spin, identity first.
const SPIN_AXES: [(Face, Face); 24] = build_spin_axes();
/// Displayed face -> physical face.
const SPIN_FACES: [[Face; 6]; 24] = build_spin_faces();
/// Spin after one clockwise quarter rotation, indexed by [`Axis`] (y, z, x).
const SPIN_TURNS: [[Spin; 3]; 24] = build_spin_turns();

const fn build_spin_axes() -> [(Face, Face); 24] {
	let mut axes = [(Face::U, Face::F); 24];
	let mut n = 0;
	let mut i = 0;
	while i < 6 {
		let up = ALL_FACES[i];
		let mut j = 0;
		while j < 6 {
			let front = ALL_FACES[j];
			if up.axis().index() != front.axis().index() {
				axes[n] = (up, front);
				n += 1;
			}
			j += 1;
		}
		i += 1;
	}
	axes
}

const fn build_spin_faces() -> [[Face; 6]; 24] {
	let mut table = [[Face::U; 6]; 24];
	let mut i = 0;
	while i < 24 {
		let (up, front) = SPIN_AXES[i];
		let right = up.right_of(front);
		table[i] = [up, up.opposite(), front, front.opposite(), right, right.opposite()];
		i += 1;
	}
	table
}

const fn find_spin(up: Face, front: Face) -> Option<Spin> {
	let mut i = 0;
	while i < 24 {
		let (u, f) = SPIN_AXES[i];
		if u.index() == up.index() && f.index() == front.index() {
			return Some(Spin(i as u8));
		}
		i += 1;
	}
	None
}

const fn build_spin_turns() -> [[Spin; 3]; 24] {
	let mut table = [[Spin(0); 3]; 24];
	let mut i = 0;
	while i < 24 {
		let (up, front) = SPIN_AXES[i];
		let right = up.right_of(front);
		let x = (front, up.opposite());
		let y = (up, right);
		let z = (right.opposite(), front);
		let turns = [y, z, x];
		let mut a = 0;
		while a < 3 {
			let (u, f) = turns[a];
			table[i][a] = match find_spin(u, f) {
				Some(spin) => spin,
				None => panic!("rotation left the spin table"),
			};
			a += 1;
		}
		i += 1;
	}
	table
}

impl Spin {
	pub const IDENTITY: Spin = Spin(0);
	pub const COUNT: usize = 24;

	pub const fn index(self) -> usize {
		self.0 as usize
	}

	pub fn all() -> impl Iterator<Item = Spin> {
		(0..Self::COUNT as u8).map(Spin)
	}

	pub const fn up(self) -> Face {
		SPIN_AXES[self.index()].0
	}

	pub const fn front(self) -> Face {
		SPIN_AXES[self.index()].1
	}

	/// Physical face shown at the displayed position `displayed`.
	pub const fn face(self, displayed: Face) -> Face {
		SPIN_FACES[self.index()][displayed.index()]
	}

	/// Displayed position of the physical face `physical`.
	pub fn displayed(self, physical: Face) -> Face {
		ALL_FACES.into_iter()
			.find(|&displayed| self.face(displayed) == physical)
			.unwrap_or(physical)
	}

	pub const fn rotated(self, axis: Axis, amount: Amount) -> Spin {
		let mut spin = self;
		let mut n = 0;
		while n < amount.quarters() {
			spin = SPIN_TURNS[spin.index()][axis.index()];
			n += 1;
		}
		spin
	}
}

impl Default for Spin {
	fn default() -> Self {
		Spin::IDENTITY
	}
}

/// Whole-cube rotation bringing the displayed `layer` down: none for D,
/// `x2` for U, `x'` for F, `x` for B, `z` for R and `z'` for L.
pub const fn inspection(layer: Face) -> Option<(Axis, Amount)> {
	match layer {
		Face::D => None,
		Face::U => Some((Axis::RL, Amount::Half)),
		Face::F => Some((Axis::RL, Amount::Ccw)),
		Face::B => Some((Axis::RL, Amount::Cw)),
		Face::R => Some((Axis::FB, Amount::Cw)),
		Face::L => Some((Axis::FB, Amount::Ccw)),
	}
}
