//! Move tokens and algorithms in WCA-style notation.

use std::{fmt, mem, str::FromStr};

use thiserror::Error;

use crate::face::{Amount, Axis, Face};



#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Slice { M, E, S }

impl Slice {
	/// Face whose turning direction the slice follows.
	pub const fn follows(self) -> Face {
		match self {
			Slice::M => Face::L,
			Slice::E => Face::D,
			Slice::S => Face::F,
		}
	}

	pub const fn to_char(self) -> char {
		match self {
			Slice::M => 'M',
			Slice::E => 'E',
			Slice::S => 'S',
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
	Turn(Face, Amount),
	Wide(Face, Amount),
	Slice(Slice, Amount),
	Rotation(Axis, Amount),
	Open,
	/// Close a group, repeating it `n` times (`1..=9`).
	Close(u8),
}

/// The 18 basic face turns, indexed by `3 * face + quarters - 1`.
pub const ALL_TURNS: [Step; 18] = {
	use Amount::*;
	use Face::*;
	use Step::Turn;
	[
		Turn(U, Cw), Turn(U, Half), Turn(U, Ccw),
		Turn(D, Cw), Turn(D, Half), Turn(D, Ccw),
		Turn(F, Cw), Turn(F, Half), Turn(F, Ccw),
		Turn(B, Cw), Turn(B, Half), Turn(B, Ccw),
		Turn(R, Cw), Turn(R, Half), Turn(R, Ccw),
		Turn(L, Cw), Turn(L, Half), Turn(L, Ccw),
	]
};

impl Step {
	pub const fn turn_index(face: Face, amount: Amount) -> usize {
		3 * face.index() + amount.quarters() as usize - 1
	}

	/// Inverse token. Group markers swap roles so that a reversed algorithm
	/// stays balanced.
	pub const fn inverse(self) -> Step {
		match self {
			Step::Turn(face, amount) => Step::Turn(face, amount.inverse()),
			Step::Wide(face, amount) => Step::Wide(face, amount.inverse()),
			Step::Slice(slice, amount) => Step::Slice(slice, amount.inverse()),
			Step::Rotation(axis, amount) => Step::Rotation(axis, amount.inverse()),
			Step::Open => Step::Close(1),
			Step::Close(_) => Step::Open,
		}
	}

	/// Face, wide and slice turns count as movements; rotations and group
	/// markers don't.
	pub const fn is_movement(self) -> bool {
		matches!(self, Step::Turn(..) | Step::Wide(..) | Step::Slice(..))
	}

	fn amount(self) -> Option<Amount> {
		match self {
			Step::Turn(_, a) | Step::Wide(_, a) | Step::Slice(_, a) | Step::Rotation(_, a) => Some(a),
			Step::Open | Step::Close(_) => None,
		}
	}

	fn with_amount(self, amount: Amount) -> Step {
		match self {
			Step::Turn(face, _) => Step::Turn(face, amount),
			Step::Wide(face, _) => Step::Wide(face, amount),
			Step::Slice(slice, _) => Step::Slice(slice, amount),
			Step::Rotation(axis, _) => Step::Rotation(axis, amount),
			marker => marker,
		}
	}

	/// Same token apart from its amount.
	fn same_target(self, other: Step) -> bool {
		match (self, other) {
			(Step::Turn(a, _), Step::Turn(b, _)) => a == b,
			(Step::Wide(a, _), Step::Wide(b, _)) => a == b,
			(Step::Slice(a, _), Step::Slice(b, _)) => a == b,
			(Step::Rotation(a, _), Step::Rotation(b, _)) => a == b,
			_ => false,
		}
	}

	/// Face turns on one axis commute with each other.
	fn commutes_with(self, other: Step) -> bool {
		match (self, other) {
			(Step::Turn(a, _), Step::Turn(b, _)) => a.axis() == b.axis(),
			_ => false,
		}
	}
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self {
			Step::Turn(face, amount) => write!(f, "{}{}", face.to_char(), amount.suffix()),
			Step::Wide(face, amount) => write!(f, "{}{}", face.to_char().to_ascii_lowercase(), amount.suffix()),
			Step::Slice(slice, amount) => write!(f, "{}{}", slice.to_char(), amount.suffix()),
			Step::Rotation(axis, amount) => write!(f, "{}{}", axis.rotation_char(), amount.suffix()),
			Step::Open => write!(f, "("),
			Step::Close(1) => write!(f, ")"),
			Step::Close(n) => write!(f, "){n}"),
		}
	}
}



#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAlgorithmError {
	#[error("Unknown move token {token:?} at offset {offset}")]
	UnknownToken { token: String, offset: usize },
	#[error("Repeat count {count} at offset {offset} is outside 1..=9")]
	RepeatOutOfRange { count: u32, offset: usize },
	#[error("Unbalanced parenthesis at offset {offset}")]
	UnbalancedParenthesis { offset: usize },
}

/// An ordered sequence of [`Step`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Algorithm {
	steps: Vec<Step>,
}

impl Algorithm {
	pub fn new() -> Self {
		Self { steps: vec![] }
	}

	pub fn from_steps(steps: Vec<Step>) -> Self {
		Self { steps }
	}

	pub fn parse(text: &str) -> Result<Self, ParseAlgorithmError> {
		let chars: Vec<(usize, char)> = text.char_indices().collect();
		let mut steps = vec![];
		let mut depth: usize = 0;
		let mut i = 0;
		while i < chars.len() {
			let (offset, c) = chars[i];
			i += 1;
			if c.is_whitespace() {
				continue;
			}
			match c {
				'(' => {
					depth += 1;
					steps.push(Step::Open);
				}
				')' => {
					if depth == 0 {
						return Err(ParseAlgorithmError::UnbalancedParenthesis { offset });
					}
					depth -= 1;
					let mut count: u32 = 0;
					let mut digits = 0;
					while i < chars.len() && chars[i].1.is_ascii_digit() {
						count = count.saturating_mul(10).saturating_add(chars[i].1 as u32 - '0' as u32);
						digits += 1;
						i += 1;
					}
					if digits == 0 {
						count = 1;
					}
					if !(1..=9).contains(&count) {
						return Err(ParseAlgorithmError::RepeatOutOfRange { count, offset });
					}
					steps.push(Step::Close(count as u8));
				}
				_ => {
					let mut make: fn(Amount) -> Step = match c {
						'M' => |a| Step::Slice(Slice::M, a),
						'E' => |a| Step::Slice(Slice::E, a),
						'S' => |a| Step::Slice(Slice::S, a),
						'x' => |a| Step::Rotation(Axis::RL, a),
						'y' => |a| Step::Rotation(Axis::UD, a),
						'z' => |a| Step::Rotation(Axis::FB, a),
						'U' => |a| Step::Turn(Face::U, a),
						'D' => |a| Step::Turn(Face::D, a),
						'F' => |a| Step::Turn(Face::F, a),
						'B' => |a| Step::Turn(Face::B, a),
						'R' => |a| Step::Turn(Face::R, a),
						'L' => |a| Step::Turn(Face::L, a),
						'u' => |a| Step::Wide(Face::U, a),
						'd' => |a| Step::Wide(Face::D, a),
						'f' => |a| Step::Wide(Face::F, a),
						'b' => |a| Step::Wide(Face::B, a),
						'r' => |a| Step::Wide(Face::R, a),
						'l' => |a| Step::Wide(Face::L, a),
						_ => return Err(ParseAlgorithmError::UnknownToken { token: c.to_string(), offset }),
					};
					// `Rw` is the same as `r`
					if i < chars.len() && chars[i].1 == 'w' {
						make = match Face::from_char(c) {
							Some(face) => wide_maker(face),
							None => return Err(ParseAlgorithmError::UnknownToken { token: format!("{c}w"), offset }),
						};
						i += 1;
					}
					let mut quarters: i32 = 1;
					if i < chars.len() && chars[i].1.is_ascii_digit() {
						quarters = chars[i].1 as i32 - '0' as i32;
						i += 1;
					}
					if i < chars.len() && (chars[i].1 == '\'' || chars[i].1 == '’') {
						quarters = -quarters;
						i += 1;
					}
					match Amount::from_quarters(quarters) {
						Some(amount) => steps.push(make(amount)),
						None => {
							let end = chars.get(i).map_or(text.len(), |&(o, _)| o);
							return Err(ParseAlgorithmError::UnknownToken { token: text[offset..end].to_string(), offset });
						}
					}
				}
			}
		}
		if depth != 0 {
			return Err(ParseAlgorithmError::UnbalancedParenthesis { offset: text.len() });
		}
		Ok(Self { steps })
	}

	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	pub fn len(&self) -> usize {
		self.steps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	pub fn movement_count(&self) -> usize {
		self.steps.iter().filter(|s| s.is_movement()).count()
	}

	pub fn push(&mut self, step: Step) {
		self.steps.push(step);
	}

	pub fn append(&mut self, other: &Algorithm) {
		self.steps.extend_from_slice(&other.steps);
	}

	pub fn concat(&self, other: &Algorithm) -> Algorithm {
		let mut alg = self.clone();
		alg.append(other);
		alg
	}

	/// `true` when nothing needs developing before the algorithm is applied.
	pub fn is_developed(&self) -> bool {
		!self.steps.iter().any(|s| matches!(s, Step::Close(n) if *n > 1))
	}

	/// Expands every repeated group into a flat sequence. Groups without a
	/// repeat count keep their markers. A close marker without a matching
	/// open repeats everything before it.
	pub fn developed(&self) -> Algorithm {
		let mut parents: Vec<Vec<Step>> = vec![];
		let mut current: Vec<Step> = vec![];
		for &step in &self.steps {
			match step {
				Step::Open => parents.push(mem::take(&mut current)),
				Step::Close(count) => {
					let group = mem::take(&mut current);
					current = parents.pop().unwrap_or_default();
					if count <= 1 {
						current.push(Step::Open);
						current.extend_from_slice(&group);
						current.push(Step::Close(1));
					}
					else {
						for _ in 0..count {
							current.extend_from_slice(&group);
						}
					}
				}
				_ => current.push(step),
			}
		}
		while let Some(mut parent) = parents.pop() {
			parent.push(Step::Open);
			parent.append(&mut current);
			current = parent;
		}
		Algorithm { steps: current }
	}

	pub fn inverse(&self) -> Algorithm {
		Algorithm {
			steps: self.developed().steps.iter().rev().map(|s| s.inverse()).collect(),
		}
	}

	/// Merges consecutive turns of a face (looking past commuting turns of
	/// the opposite face), consecutive rotations about one axis and
	/// consecutive identical wide or slice turns. Cancelled turns disappear.
	pub fn simplified(&self) -> Algorithm {
		let mut out: Vec<Step> = Vec::with_capacity(self.steps.len());
		for &step in &self.steps {
			let Some(amount) = step.amount() else {
				out.push(step);
				continue;
			};
			let mut merged = false;
			for i in (0..out.len()).rev() {
				let prev = out[i];
				if prev.same_target(step) {
					let quarters = prev.amount().map_or(0, |a| a.quarters() as i32) + amount.quarters() as i32;
					match Amount::from_quarters(quarters) {
						Some(sum) => out[i] = prev.with_amount(sum),
						None => { out.remove(i); }
					}
					merged = true;
					break;
				}
				if !prev.commutes_with(step) {
					break;
				}
			}
			if !merged {
				out.push(step);
			}
		}
		Algorithm { steps: out }
	}
}

fn wide_maker(face: Face) -> fn(Amount) -> Step {
	match face {
		Face::U => |a| Step::Wide(Face::U, a),
		Face::D => |a| Step::Wide(Face::D, a),
		Face::F => |a| Step::Wide(Face::F, a),
		Face::B => |a| Step::Wide(Face::B, a),
		Face::R => |a| Step::Wide(Face::R, a),
		Face::L => |a| Step::Wide(Face::L, a),
	}
}

impl FromStr for Algorithm {
	type Err = ParseAlgorithmError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl Extend<Step> for Algorithm {
	fn extend<I: IntoIterator<Item = Step>>(&mut self, iter: I) {
		self.steps.extend(iter);
	}
}

impl From<Vec<Step>> for Algorithm {
	fn from(steps: Vec<Step>) -> Self {
		Self::from_steps(steps)
	}
}

impl fmt::Display for Algorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut prev: Option<Step> = None;
		for &step in &self.steps {
			let glued = matches!(prev, None | Some(Step::Open)) || matches!(step, Step::Close(_));
			if !glued {
				write!(f, " ")?;
			}
			write!(f, "{step}")?;
			prev = Some(step);
		}
		Ok(())
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	fn alg(text: &str) -> Algorithm {
		Algorithm::parse(text).unwrap()
	}

	#[test]
	fn parse_and_display() {
		let a = alg("R U R' U' (F2 r')2 M x y' Rw2");
		assert_eq!("R U R' U' (F2 r')2 M x y' r2", a.to_string());
		assert_eq!(12, a.len());
		assert_eq!(8, a.movement_count());
		assert_eq!(a, alg(&a.to_string()));
	}

	#[test]
	fn parse_without_spaces() {
		assert_eq!(alg("R U R' U'"), alg("RUR'U'"));
		assert_eq!(alg("R2"), alg("R2'"));
		assert_eq!(alg("R'"), alg("R3"));
	}

	#[test]
	fn parse_rejects_bad_input() {
		assert!(matches!(Algorithm::parse("R Q"), Err(ParseAlgorithmError::UnknownToken { offset: 2, .. })));
		assert!(matches!(Algorithm::parse("(R U)0"), Err(ParseAlgorithmError::RepeatOutOfRange { count: 0, .. })));
		assert!(matches!(Algorithm::parse("(R U)12"), Err(ParseAlgorithmError::RepeatOutOfRange { count: 12, .. })));
		assert!(matches!(Algorithm::parse("(R U"), Err(ParseAlgorithmError::UnbalancedParenthesis { .. })));
		assert!(matches!(Algorithm::parse("R U)"), Err(ParseAlgorithmError::UnbalancedParenthesis { offset: 3 })));
		assert!(matches!(Algorithm::parse("R4"), Err(ParseAlgorithmError::UnknownToken { .. })));
		assert!(matches!(Algorithm::parse("Mw"), Err(ParseAlgorithmError::UnknownToken { .. })));
	}

	#[test]
	fn develop_repeats() {
		let a = alg("(R U)3 F");
		assert!(!a.is_developed());
		let d = a.developed();
		assert!(d.is_developed());
		assert_eq!(alg("R U R U R U F"), d);
	}

	#[test]
	fn develop_nested_and_plain_groups() {
		assert_eq!(alg("R U2 U2 R U2 U2 (F)"), alg("(R (U2)2)2 (F)").developed());
		assert_eq!(alg("(R U) D"), alg("(R U) D").developed());
	}

	#[test]
	fn inverse() {
		assert_eq!(alg("U R' U' R"), alg("R' U R U'").inverse());
		assert_eq!(alg("x' U' R' U' R'"), alg("(R U)2 x").inverse());
		assert_eq!(alg("(U' R')"), alg("(R U)").inverse());
	}

	#[test]
	fn simplify() {
		assert_eq!(alg("R2"), alg("R R").simplified());
		assert_eq!(alg(""), alg("R U U' R'").simplified());
		assert_eq!(alg("R2 L"), alg("R L R").simplified());
		assert_eq!(alg("U F"), alg("U D D' F").simplified());
		assert_eq!(alg("x2 r'"), alg("x x r r2").simplified());
		assert_eq!(alg("R (R)"), alg("R (R)").simplified());
	}

	#[test]
	fn all_turns_are_indexed() {
		for (i, step) in ALL_TURNS.into_iter().enumerate() {
			let Step::Turn(face, amount) = step else { panic!() };
			assert_eq!(i, Step::turn_index(face, amount));
		}
	}
}
