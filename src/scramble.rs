//! Random scrambles.

use rand::Rng;

use crate::{
	algorithm::{Algorithm, Step, ALL_TURNS},
	face::Face,
};



/// `len` random face turns, never turning one face twice in a row.
pub fn random(len: usize, rng: &mut impl Rng) -> Algorithm {
	let mut alg = Algorithm::new();
	let mut last: Option<Face> = None;
	while alg.len() < len {
		let step = ALL_TURNS[rng.random_range(0..ALL_TURNS.len())];
		let Step::Turn(face, _) = step else { continue };
		if last == Some(face) {
			continue;
		}
		last = Some(face);
		alg.push(step);
	}
	alg
}
