//! Bit-packed cube state and the move engine.
//!
//! Piece data always lives in the physical frame: slot `URF` is the corner
//! between the physical U, R and F centers no matter how the cube is held.
//! Whole-cube rotations only change the [`Spin`], and every face letter is
//! redirected through it before one of the six primitive turns runs.

use std::ops::BitOr;

use thiserror::Error;

use crate::{
	algorithm::{Algorithm, Step},
	face::{Amount, Axis, Color, Face},
	spin::Spin,
};



pub const CORNER_COUNT: usize = 8;
pub const EDGE_COUNT: usize = 12;

/// Faces of every corner slot, listed clockwise.
pub const CORNER_FACES: [[Face; 3]; CORNER_COUNT] = {
	use Face::*;
	[[U, R, F], [U, F, L], [U, L, B], [U, B, R], [D, F, R], [D, L, F], [D, B, L], [D, R, B]]
};

/// Faces of every edge slot, reference sticker first.
pub const EDGE_FACES: [[Face; 2]; EDGE_COUNT] = {
	use Face::*;
	[[U, R], [U, F], [U, L], [U, B], [D, R], [D, F], [D, L], [D, B], [F, R], [F, L], [B, L], [B, R]]
};

/// Corner and edge 4-cycles of a clockwise quarter turn, indexed by [`Face`].
/// The piece in the first slot moves to the second, and so on.
const TURN_CYCLES: [([usize; 4], [usize; 4]); 6] = [
	([0, 1, 2, 3], [1, 2, 3, 0]),
	([4, 7, 6, 5], [5, 4, 7, 6]),
	([0, 4, 5, 1], [1, 8, 5, 9]),
	([3, 2, 6, 7], [3, 10, 7, 11]),
	([0, 3, 7, 4], [0, 11, 4, 8]),
	([1, 5, 6, 2], [2, 9, 6, 10]),
];

const SLOT_BITS: u32 = 5;
const SLOT_MASK: u64 = (1 << SLOT_BITS) - 1;



/// One `u64` holding 5 bits per slot: the piece id in the low `PIECE_BITS`,
/// the orientation tag above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Packed<const PIECE_BITS: u32>(u64);

type Corners = Packed<3>;
type Edges = Packed<4>;

impl<const PIECE_BITS: u32> Packed<PIECE_BITS> {
	const PIECE_MASK: u64 = (1 << PIECE_BITS) - 1;

	/// Every slot holding its own piece with tag 0.
	const fn identity(slots: usize) -> Self {
		let mut word = 0;
		let mut i = 0;
		while i < slots {
			word |= (i as u64) << (SLOT_BITS * i as u32);
			i += 1;
		}
		Self(word)
	}

	const fn field(self, slot: usize) -> u64 {
		(self.0 >> (SLOT_BITS * slot as u32)) & SLOT_MASK
	}

	fn set_field(&mut self, slot: usize, value: u64) {
		let shift = SLOT_BITS * slot as u32;
		self.0 = (self.0 & !(SLOT_MASK << shift)) | (value << shift);
	}

	const fn piece(self, slot: usize) -> u8 {
		(self.field(slot) & Self::PIECE_MASK) as u8
	}

	const fn tag(self, slot: usize) -> u8 {
		(self.field(slot) >> PIECE_BITS) as u8
	}

	fn retag(&mut self, slot: usize, f: impl Fn(u8) -> u8) {
		let piece = self.field(slot) & Self::PIECE_MASK;
		let tag = f(self.tag(slot)) as u64;
		self.set_field(slot, piece | (tag << PIECE_BITS));
	}

	fn swap(&mut self, a: usize, b: usize) {
		let (fa, fb) = (self.field(a), self.field(b));
		self.set_field(a, fb);
		self.set_field(b, fa);
	}

	fn position(self, piece: u8, slots: usize) -> Option<usize> {
		(0..slots).find(|&slot| self.piece(slot) == piece)
	}
}

trait Rotate4 {
	fn rotate4(&mut self, i1: usize, i2: usize, i3: usize, i4: usize);
}
impl<const PIECE_BITS: u32> Rotate4 for Packed<PIECE_BITS> {
	fn rotate4(&mut self, i1: usize, i2: usize, i3: usize, i4: usize) {
		let temp = self.field(i4);
		self.set_field(i4, self.field(i3));
		self.set_field(i3, self.field(i2));
		self.set_field(i2, self.field(i1));
		self.set_field(i1, temp);
	}
}

/// Corner tag after a quarter turn about `axis`: the tag equal to the
/// turning axis stays, the other two swap.
const fn twist(tag: u8, axis: Axis) -> u8 {
	let a = axis.index() as u8;
	if tag == a { tag } else { 3 - a - tag }
}



#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeError {
	#[error("Group repeated {count} times must be developed before it is applied")]
	UndevelopedRepeat { count: u8 },
}

/// A piece id with its orientation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cubie {
	pub piece: u8,
	pub orientation: u8,
}

/// Slots that must hold their own piece with orientation 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PieceGroup {
	corners: u64,
	edges: u64,
}

impl PieceGroup {
	pub const EMPTY: PieceGroup = PieceGroup { corners: 0, edges: 0 };
	pub const ALL: PieceGroup = PieceGroup {
		corners: (1 << (SLOT_BITS * CORNER_COUNT as u32)) - 1,
		edges: (1 << (SLOT_BITS * EDGE_COUNT as u32)) - 1,
	};

	pub fn from_slots(corners: &[usize], edges: &[usize]) -> Self {
		Self {
			corners: corners.iter().fold(0, |m, &s| m | SLOT_MASK << (SLOT_BITS * s as u32)),
			edges: edges.iter().fold(0, |m, &s| m | SLOT_MASK << (SLOT_BITS * s as u32)),
		}
	}

	/// The four edges around `face`.
	pub fn cross(face: Face) -> Self {
		let edges: Vec<usize> = (0..EDGE_COUNT).filter(|&s| EDGE_FACES[s].contains(&face)).collect();
		Self::from_slots(&[], &edges)
	}

	/// Every piece with a sticker on `face`.
	pub fn layer(face: Face) -> Self {
		let corners: Vec<usize> = (0..CORNER_COUNT).filter(|&s| CORNER_FACES[s].contains(&face)).collect();
		Self::cross(face) | Self::from_slots(&corners, &[])
	}

	/// The corner in `corner` and the middle-layer edge next to it. `None`
	/// when the corner doesn't touch `cross`.
	pub fn pair(cross: Face, corner: usize) -> Option<Self> {
		let faces = CORNER_FACES.get(corner)?;
		if !faces.contains(&cross) {
			return None;
		}
		let mut sides = faces.iter().copied().filter(|&f| f != cross);
		let (a, b) = (sides.next()?, sides.next()?);
		let edge = edge_slot(a, b)?;
		Some(Self::from_slots(&[corner], &[edge]))
	}

	/// The four F2L pairs of the `cross` layer with their corner slots, in
	/// slot order.
	pub fn pairs(cross: Face) -> Vec<(usize, PieceGroup)> {
		(0..CORNER_COUNT)
			.filter_map(|slot| Self::pair(cross, slot).map(|group| (slot, group)))
			.collect()
	}

	pub const fn union(self, other: Self) -> Self {
		Self { corners: self.corners | other.corners, edges: self.edges | other.edges }
	}

	pub fn piece_count(self) -> usize {
		let count = |mask: u64, slots: usize| (0..slots).filter(|&s| mask >> (SLOT_BITS * s as u32) & SLOT_MASK != 0).count();
		count(self.corners, CORNER_COUNT) + count(self.edges, EDGE_COUNT)
	}
}

impl BitOr for PieceGroup {
	type Output = PieceGroup;
	fn bitor(self, rhs: Self) -> Self::Output {
		self.union(rhs)
	}
}

/// Corner slot with exactly these faces, in any order.
pub fn corner_slot(faces: [Face; 3]) -> Option<usize> {
	CORNER_FACES.iter().position(|slot| faces.iter().all(|f| slot.contains(f)))
}

/// Edge slot between `a` and `b`, in any order.
pub fn edge_slot(a: Face, b: Face) -> Option<usize> {
	EDGE_FACES.iter().position(|slot| slot.contains(&a) && slot.contains(&b) && a != b)
}



#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeState {
	corners: Corners,
	edges: Edges,
	spin: Spin,
}

impl CubeState {
	pub const SOLVED: CubeState = CubeState {
		corners: Packed::identity(CORNER_COUNT),
		edges: Packed::identity(EDGE_COUNT),
		spin: Spin::IDENTITY,
	};

	pub const fn new() -> Self {
		Self::SOLVED
	}

	/// A solved cube with `alg` applied. Repeated groups are developed first.
	pub fn from_algorithm(alg: &Algorithm) -> Self {
		let mut cube = Self::new();
		for &step in alg.developed().steps() {
			// developed algorithms contain no repeats
			let _ = cube.apply_step(step);
		}
		cube
	}

	pub const fn spin(&self) -> Spin {
		self.spin
	}

	pub fn apply_step(&mut self, step: Step) -> Result<(), CubeError> {
		match step {
			Step::Turn(face, amount) => self.apply_turn(face, amount),
			Step::Wide(face, amount) => {
				self.turn(self.spin.face(face.opposite()), amount);
				self.rotate_with(face, amount);
			}
			Step::Slice(slice, amount) => {
				let face = slice.follows();
				self.turn(self.spin.face(face.opposite()), amount);
				self.turn(self.spin.face(face), amount.inverse());
				self.rotate_with(face, amount);
			}
			Step::Rotation(axis, amount) => self.spin = self.spin.rotated(axis, amount),
			Step::Open => {}
			Step::Close(count) if count <= 1 => {}
			Step::Close(count) => return Err(CubeError::UndevelopedRepeat { count }),
		}
		Ok(())
	}

	/// Applies every step of `alg`, or none of them.
	pub fn apply_algorithm(&mut self, alg: &Algorithm) -> Result<(), CubeError> {
		let snapshot = *self;
		for &step in alg.steps() {
			if let Err(err) = self.apply_step(step) {
				*self = snapshot;
				return Err(err);
			}
		}
		Ok(())
	}

	/// Turns the displayed `face`.
	pub fn apply_turn(&mut self, face: Face, amount: Amount) {
		self.turn(self.spin.face(face), amount);
	}

	/// Whole-cube rotation in the turning direction of the displayed `face`.
	fn rotate_with(&mut self, face: Face, amount: Amount) {
		let axis = face.axis();
		let amount = if axis.rotation_face() == face { amount } else { amount.inverse() };
		self.spin = self.spin.rotated(axis, amount);
	}

	/// Turns the physical `face`.
	fn turn(&mut self, face: Face, amount: Amount) {
		let (c, e) = TURN_CYCLES[face.index()];
		match amount {
			Amount::Half => {
				self.corners.swap(c[0], c[2]);
				self.corners.swap(c[1], c[3]);
				self.edges.swap(e[0], e[2]);
				self.edges.swap(e[1], e[3]);
			}
			Amount::Cw | Amount::Ccw => {
				if amount == Amount::Cw {
					self.corners.rotate4(c[0], c[1], c[2], c[3]);
					self.edges.rotate4(e[0], e[1], e[2], e[3]);
				}
				else {
					self.corners.rotate4(c[3], c[2], c[1], c[0]);
					self.edges.rotate4(e[3], e[2], e[1], e[0]);
				}
				let axis = face.axis();
				for slot in c {
					self.corners.retag(slot, |tag| twist(tag, axis));
				}
				if axis == Axis::FB {
					for slot in e {
						self.edges.retag(slot, |flip| flip ^ 1);
					}
				}
			}
		}
	}

	pub const fn corner_at(&self, slot: usize) -> Cubie {
		Cubie { piece: self.corners.piece(slot), orientation: self.corners.tag(slot) }
	}

	pub const fn edge_at(&self, slot: usize) -> Cubie {
		Cubie { piece: self.edges.piece(slot), orientation: self.edges.tag(slot) }
	}

	pub fn corner_position(&self, piece: u8) -> Option<usize> {
		self.corners.position(piece, CORNER_COUNT)
	}

	pub fn edge_position(&self, piece: u8) -> Option<usize> {
		self.edges.position(piece, EDGE_COUNT)
	}

	/// Home face of the sticker on `face` of the cubie at the physical
	/// position given by its faces (one for a center, two for an edge,
	/// three for a corner).
	pub fn sticker(&self, position: &[Face], face: Face) -> Option<Face> {
		if !position.contains(&face) {
			return None;
		}
		match *position {
			[center] => Some(center),
			[a, b] => {
				let slot = edge_slot(a, b)?;
				let k = EDGE_FACES[slot].iter().position(|&f| f == face)?;
				let Cubie { piece, orientation } = self.edge_at(slot);
				Some(EDGE_FACES[piece as usize][k ^ orientation as usize])
			}
			[a, b, c] => {
				let slot = corner_slot([a, b, c])?;
				let faces = CORNER_FACES[slot];
				let k = faces.iter().position(|&f| f == face)?;
				let Cubie { piece, orientation } = self.corner_at(slot);
				let j0 = faces.iter().position(|f| f.axis().index() == orientation as usize)?;
				Some(CORNER_FACES[piece as usize][(k + 3 - j0) % 3])
			}
			_ => None,
		}
	}

	/// Like [`Self::sticker`] in the displayed frame: the displayed center
	/// whose color shows at `face` of the displayed `position`.
	pub fn view_sticker(&self, position: &[Face], face: Face) -> Option<Face> {
		let mut physical = [Face::U; 3];
		for (p, &displayed) in physical.iter_mut().zip(position) {
			*p = self.spin.face(displayed);
		}
		let home = self.sticker(&physical[..position.len().min(3)], self.spin.face(face))?;
		Some(self.spin.displayed(home))
	}

	/// Color at `row`, `col` of the displayed `face`, read the way the face
	/// appears in [`Self::to_net_string`].
	pub fn facelet(&self, face: Face, row: usize, col: usize) -> Color {
		let (down, right) = net_frame(face);
		let mut position = vec![face];
		match row {
			0 => position.push(down.opposite()),
			2 => position.push(down),
			_ => {}
		}
		match col {
			0 => position.push(right.opposite()),
			2 => position.push(right),
			_ => {}
		}
		let home = self.view_sticker(&position, face).unwrap_or(face);
		Color::of_face(self.spin.face(home))
	}

	pub fn is_solved(&self, group: &PieceGroup) -> bool {
		(self.corners.0 ^ Self::SOLVED.corners.0) & group.corners == 0
			&& (self.edges.0 ^ Self::SOLVED.edges.0) & group.edges == 0
	}

	pub fn is_solved_cube(&self) -> bool {
		self.is_solved(&PieceGroup::ALL)
	}

	/// Unfolded net: U on top, then L F R B, then D.
	pub fn to_net_string(&self) -> String {
		let row = |face: Face, r: usize| -> String {
			(0..3).map(|c| format!("{:?}", self.facelet(face, r, c))).collect::<Vec<_>>().join(" ")
		};
		let mut lines = vec![];
		for r in 0..3 {
			lines.push(format!("      {}\n", row(Face::U, r)));
		}
		for r in 0..3 {
			let band: Vec<String> = [Face::L, Face::F, Face::R, Face::B].into_iter().map(|f| row(f, r)).collect();
			lines.push(format!("{}\n", band.join(" ")));
		}
		for r in 0..3 {
			lines.push(format!("      {}\n", row(Face::D, r)));
		}
		lines.concat()
	}
}

impl Default for CubeState {
	fn default() -> Self {
		Self::SOLVED
	}
}

/// Directions of increasing row and column of a face in the net.
const fn net_frame(face: Face) -> (Face, Face) {
	match face {
		Face::U => (Face::F, Face::R),
		Face::D => (Face::B, Face::R),
		Face::F => (Face::D, Face::R),
		Face::R => (Face::D, Face::B),
		Face::B => (Face::D, Face::L),
		Face::L => (Face::D, Face::F),
	}
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::face::{ALL_AMOUNTS, ALL_FACES};

	fn alg(text: &str) -> Algorithm {
		Algorithm::parse(text).unwrap()
	}

	fn scrambled() -> CubeState {
		CubeState::from_algorithm(&alg("R U2 F' L D B2 R' U F2 L' D2 B U'"))
	}

	#[test]
	fn four_quarters_are_identity() {
		for face in ALL_FACES {
			let mut cube = scrambled();
			for _ in 0..4 {
				cube.apply_turn(face, Amount::Cw);
			}
			assert_eq!(scrambled(), cube);
		}
	}

	#[test]
	fn half_turn_is_two_quarters() {
		for face in ALL_FACES {
			let mut a = scrambled();
			a.apply_turn(face, Amount::Half);
			let mut b = scrambled();
			b.apply_turn(face, Amount::Cw);
			b.apply_turn(face, Amount::Cw);
			assert_eq!(a, b);
		}
	}

	#[test]
	fn inverse_round_trip() {
		let a = alg("R U R' U' r2 M' E S2 x y' z (F D)2 b' d l u2 f");
		let mut cube = scrambled();
		cube.apply_algorithm(&a.developed()).unwrap();
		cube.apply_algorithm(&a.inverse()).unwrap();
		assert_eq!(scrambled(), cube);
	}

	#[test]
	fn undeveloped_repeat_rolls_back() {
		let mut cube = scrambled();
		let err = cube.apply_algorithm(&alg("R U (F D)2 B")).unwrap_err();
		assert_eq!(CubeError::UndevelopedRepeat { count: 2 }, err);
		assert_eq!(scrambled(), cube);
		assert!(cube.apply_algorithm(&alg("R U (F D) B")).is_ok());
	}

	#[test]
	fn sexy_move_six_times() {
		let cube = CubeState::from_algorithm(&alg("(R U R' U')6"));
		assert!(cube.is_solved_cube());
		let cube = CubeState::from_algorithm(&alg("(R U R' U')3"));
		assert!(!cube.is_solved_cube());
	}

	#[test]
	fn rotations_touch_only_the_spin() {
		let cube = CubeState::from_algorithm(&alg("x y2 z'"));
		assert!(cube.is_solved_cube());
		assert_ne!(Spin::IDENTITY, cube.spin());
	}

	#[test]
	fn wide_and_slice_turns_match_face_turns() {
		let pairs = [
			("r", "L x"), ("l'", "R' x"), ("u2", "D y2"), ("d", "U y'"), ("f", "B z"), ("b", "F z'"),
			("M", "R L' x'"), ("E'", "U' D y"), ("S", "F' B z"),
		];
		for (wide, plain) in pairs {
			assert_eq!(CubeState::from_algorithm(&alg(wide)), CubeState::from_algorithm(&alg(plain)), "{wide}");
		}
	}

	#[test]
	fn turns_follow_the_spin() {
		// after y, the displayed F is the physical R
		let a = CubeState::from_algorithm(&alg("y F"));
		let b = CubeState::from_algorithm(&alg("R y"));
		assert_eq!(a, b);
	}

	#[test]
	fn moves_keep_a_permutation() {
		let cube = scrambled();
		for piece in 0..CORNER_COUNT as u8 {
			let slot = cube.corner_position(piece).unwrap();
			assert_eq!(piece, cube.corner_at(slot).piece);
			assert!(cube.corner_at(slot).orientation < 3);
		}
		for piece in 0..EDGE_COUNT as u8 {
			let slot = cube.edge_position(piece).unwrap();
			assert_eq!(piece, cube.edge_at(slot).piece);
			assert!(cube.edge_at(slot).orientation < 2);
		}
		let flip: u32 = (0..EDGE_COUNT).map(|s| cube.edge_at(s).orientation as u32).sum();
		assert_eq!(0, flip % 2);
	}

	#[test]
	fn piece_groups() {
		assert_eq!(4, PieceGroup::cross(Face::D).piece_count());
		assert_eq!(8, PieceGroup::layer(Face::U).piece_count());
		assert_eq!(20, PieceGroup::ALL.piece_count());
		let pairs = PieceGroup::pairs(Face::D);
		assert_eq!(vec![4, 5, 6, 7], pairs.iter().map(|(s, _)| *s).collect::<Vec<_>>());
		// DFR pairs with FR
		assert_eq!(Some(PieceGroup::from_slots(&[4], &[8])), PieceGroup::pair(Face::D, 4));
		assert_eq!(None, PieceGroup::pair(Face::D, 0));
	}

	#[test]
	fn cross_survives_upper_turns() {
		let cube = CubeState::from_algorithm(&alg("U R U' R' U2"));
		assert!(cube.is_solved(&PieceGroup::cross(Face::D)));
		assert!(!cube.is_solved(&PieceGroup::pair(Face::D, 4).unwrap()));
		assert!(cube.is_solved(&PieceGroup::pair(Face::D, 5).unwrap()));
	}

	#[test]
	fn stickers_after_a_turn() {
		let cube = CubeState::from_algorithm(&alg("R"));
		// the UFR corner now shows the front color on top
		assert_eq!(Some(Face::F), cube.sticker(&[Face::U, Face::R, Face::F], Face::U));
		assert_eq!(Some(Face::F), cube.sticker(&[Face::U, Face::R], Face::U));
		assert_eq!(Color::G, cube.facelet(Face::U, 2, 2));
		assert_eq!(Color::W, cube.facelet(Face::U, 2, 0));
		assert_eq!(Color::Y, cube.facelet(Face::F, 1, 2));
	}

	#[test]
	fn view_stickers_follow_the_spin() {
		let cube = CubeState::from_algorithm(&alg("x2"));
		assert_eq!(Color::Y, cube.facelet(Face::U, 1, 1));
		for amount in ALL_AMOUNTS {
			let mut c = CubeState::from_algorithm(&alg("x2"));
			c.apply_turn(Face::U, amount);
			assert_eq!(Some(Face::U), c.view_sticker(&[Face::U, Face::F], Face::U));
		}
	}

	#[test]
	fn to_net_string() {
		let expected = [
			"      W W W\n",
			"      W W W\n",
			"      W W W\n",
			"O O O G G G R R R B B B\n",
			"O O O G G G R R R B B B\n",
			"O O O G G G R R R B B B\n",
			"      Y Y Y\n",
			"      Y Y Y\n",
			"      Y Y Y\n",
		].concat();
		let actual = CubeState::new().to_net_string();
		println!("expected:\n{expected}");
		println!("actual:\n{actual}");
		assert_eq!(expected, actual)
	}

	#[test]
	fn rotate4() {
		let mut packed = Packed::<4>::identity(8);
		packed.rotate4(1, 4, 5, 6);
		let pieces: Vec<u8> = (0..8).map(|s| packed.piece(s)).collect();
		assert_eq!(vec![0, 6, 2, 3, 1, 4, 5, 7], pieces);
	}
}
