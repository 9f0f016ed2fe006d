//! Faces, axes, turn amounts and sticker colors.



/// One of the six faces. The declaration order is also the cross layer
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Face { U, D, F, B, R, L }
pub const ALL_FACES: [Face; 6] = {use Face::*; [U, D, F, B, R, L]};

impl Face {
	pub const fn index(self) -> usize {
		self as usize
	}

	pub const fn from_index(index: usize) -> Self {
		match index {
			0 => Face::U,
			1 => Face::D,
			2 => Face::F,
			3 => Face::B,
			4 => Face::R,
			5 => Face::L,
			_ => panic!("face index out of range"),
		}
	}

	pub const fn opposite(self) -> Self {
		Self::from_index(self.index() ^ 1)
	}

	pub const fn axis(self) -> Axis {
		Axis::from_index(self.index() / 2)
	}

	/// Unit vector pointing out of the face (x = R, y = U, z = F).
	pub const fn vector(self) -> [i8; 3] {
		match self {
			Face::U => [0, 1, 0],
			Face::D => [0, -1, 0],
			Face::F => [0, 0, 1],
			Face::B => [0, 0, -1],
			Face::R => [1, 0, 0],
			Face::L => [-1, 0, 0],
		}
	}

	pub const fn from_vector(v: [i8; 3]) -> Self {
		match v {
			[0, 1, 0] => Face::U,
			[0, -1, 0] => Face::D,
			[0, 0, 1] => Face::F,
			[0, 0, -1] => Face::B,
			[1, 0, 0] => Face::R,
			[-1, 0, 0] => Face::L,
			_ => panic!("not a face vector"),
		}
	}

	/// The face to the right when `self` is up and `front` is in front.
	pub const fn right_of(self, front: Face) -> Self {
		let [ax, ay, az] = self.vector();
		let [bx, by, bz] = front.vector();
		Self::from_vector([ay*bz - az*by, az*bx - ax*bz, ax*by - ay*bx])
	}

	pub const fn to_char(self) -> char {
		match self {
			Face::U => 'U',
			Face::D => 'D',
			Face::F => 'F',
			Face::B => 'B',
			Face::R => 'R',
			Face::L => 'L',
		}
	}

	pub const fn from_char(c: char) -> Option<Self> {
		match c {
			'U' => Some(Face::U),
			'D' => Some(Face::D),
			'F' => Some(Face::F),
			'B' => Some(Face::B),
			'R' => Some(Face::R),
			'L' => Some(Face::L),
			_ => None,
		}
	}
}



#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Axis { UD, FB, RL }
pub const ALL_AXES: [Axis; 3] = {use Axis::*; [UD, FB, RL]};

impl Axis {
	pub const fn index(self) -> usize {
		self as usize
	}

	pub const fn from_index(index: usize) -> Self {
		match index {
			0 => Axis::UD,
			1 => Axis::FB,
			2 => Axis::RL,
			_ => panic!("axis index out of range"),
		}
	}

	/// The face a whole-cube rotation about this axis follows: x follows R,
	/// y follows U, z follows F.
	pub const fn rotation_face(self) -> Face {
		match self {
			Axis::UD => Face::U,
			Axis::FB => Face::F,
			Axis::RL => Face::R,
		}
	}

	pub const fn rotation_char(self) -> char {
		match self {
			Axis::UD => 'y',
			Axis::FB => 'z',
			Axis::RL => 'x',
		}
	}
}



/// Number of clockwise quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Amount { Cw = 1, Half = 2, Ccw = 3 }
pub const ALL_AMOUNTS: [Amount; 3] = {use Amount::*; [Cw, Half, Ccw]};

impl Amount {
	pub const fn quarters(self) -> u8 {
		self as u8
	}

	/// `None` for a multiple of four quarter turns.
	pub const fn from_quarters(quarters: i32) -> Option<Self> {
		match quarters.rem_euclid(4) {
			1 => Some(Amount::Cw),
			2 => Some(Amount::Half),
			3 => Some(Amount::Ccw),
			_ => None,
		}
	}

	pub const fn inverse(self) -> Self {
		match self {
			Amount::Cw => Amount::Ccw,
			Amount::Half => Amount::Half,
			Amount::Ccw => Amount::Cw,
		}
	}

	pub const fn suffix(self) -> &'static str {
		match self {
			Amount::Cw => "",
			Amount::Half => "2",
			Amount::Ccw => "'",
		}
	}
}



/// Sticker colors of the default scheme: white up, green front, red right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Color { W, Y, G, B, R, O }
pub const ALL_COLORS: [Color; 6] = {use Color::*; [W, Y, G, B, R, O]};

impl Color {
	/// Color of the sticker whose home is `face`.
	pub const fn of_face(face: Face) -> Self {
		match face {
			Face::U => Color::W,
			Face::D => Color::Y,
			Face::F => Color::G,
			Face::B => Color::B,
			Face::R => Color::R,
			Face::L => Color::O,
		}
	}
}
