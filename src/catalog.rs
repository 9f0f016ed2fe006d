//! Canonical last-layer algorithms, written for a cube held with the last
//! layer on top and F2L solved below it.



/// Orientation cases 1 to 57. Case 0 is the skip.
pub const OLL: [(&str, &str); 57] = [
	("OLL 1", "R U2 R2 F R F' U2 R' F R F'"),
	("OLL 2", "F R U R' U' F' f R U R' U' f'"),
	("OLL 3", "f R U R' U' f' U' F R U R' U' F'"),
	("OLL 4", "f R U R' U' f' U F R U R' U' F'"),
	("OLL 5", "r' U2 R U R' U r"),
	("OLL 6", "r U2 R' U' R U' r'"),
	("OLL 7", "r U R' U R U2 r'"),
	("OLL 8", "l' U' L U' L' U2 l"),
	("OLL 9", "R U R' U' R' F R2 U R' U' F'"),
	("OLL 10", "R U R' U R' F R F' R U2 R'"),
	("OLL 11", "r U R' U R' F R F' R U2 r'"),
	("OLL 12", "M' R' U' R U' R' U2 R U' R r'"),
	("OLL 13", "F U R U' R2 F' R U R U' R'"),
	("OLL 14", "R' F R U R' F' R F U' F'"),
	("OLL 15", "r' U' r R' U' R U r' U r"),
	("OLL 16", "r U r' R U R' U' r U' r'"),
	("OLL 17", "F R' F' R2 r' U R U' R' U' M'"),
	("OLL 18", "r U R' U R U2 r2 U' R U' R' U2 r"),
	("OLL 19", "r' R U R U R' U' M' R' F R F'"),
	("OLL 20", "r U R' U' M2 U R U' R' U' M'"),
	("OCLL1", "R U2 R' U' R U R' U' R U' R'"),
	("OCLL2", "R U2 R2 U' R2 U' R2 U2 R"),
	("OCLL3", "R2 D' R U2 R' D R U2 R"),
	("OCLL4", "r U R' U' r' F R F'"),
	("OCLL5", "F' r U R' U' r' F R"),
	("OCLL6", "R U2 R' U' R U' R'"),
	("OCLL7", "R U R' U R U2 R'"),
	("OLL 28", "r U R' U' M U R U' R'"),
	("OLL 29", "R U R' U' R U' R' F' U' F R U R'"),
	("OLL 30", "F R' F R2 U' R' U' R U R' F2"),
	("OLL 31", "R' U' F U R U' R' F' R"),
	("OLL 32", "L U F' U' L' U L F L'"),
	("OLL 33", "R U R' U' R' F R F'"),
	("OLL 34", "R U R2 U' R' F R U R U' F'"),
	("OLL 35", "R U2 R2 F R F' R U2 R'"),
	("OLL 36", "L' U' L U' L' U L U L F' L' F"),
	("OLL 37", "F R' F' R U R U' R'"),
	("OLL 38", "R U R' U R U' R' U' R' F R F'"),
	("OLL 39", "L F' L' U' L U F U' L'"),
	("OLL 40", "R' F R U R' U' F' U R"),
	("OLL 41", "R U R' U R U2 R' F R U R' U' F'"),
	("OLL 42", "R' U' R U' R' U2 R F R U R' U' F'"),
	("OLL 43", "F' U' L' U L F"),
	("OLL 44", "F U R U' R' F'"),
	("OLL 45", "F R U R' U' F'"),
	("OLL 46", "R' U' R' F R F' U R"),
	("OLL 47", "R' U' R' F R F' R' F R F' U R"),
	("OLL 48", "F R U R' U' R U R' U' F'"),
	("OLL 49", "r U' r2 U r2 U r2 U' r"),
	("OLL 50", "r' U r2 U' r2 U' r2 U r'"),
	("OLL 51", "F U R U' R' U R U' R' F'"),
	("OLL 52", "R U R' U R U' B U' B' R'"),
	("OLL 53", "l' U2 L U L' U' L U L' U l"),
	("OLL 54", "r U2 R' U' R U R' U' R U' r'"),
	("OLL 55", "R' F R U R U' R2 F' R2 U' R' U R U R'"),
	("OLL 56", "r' U' r U' R' U R U' R' U R r' U r"),
	("OLL 57", "R U R' U' M' U R U' r'"),
];

/// Permutation cases 1 to 21. Case 0 is the skip.
pub const PLL: [(&str, &str); 21] = [
	("Aa", "x L2 D2 L' U' L D2 L' U L' x'"),
	("Ab", "x' L2 D2 L U L' D2 L U' L x"),
	("E", "x' L' U L D' L' U' L D L' U' L D' L' U L D x"),
	("F", "R' U' F' R U R' U' R' F R2 U' R' U' R U R' U R"),
	("Ga", "R2 U R' U R' U' R U' R2 U' D R' U R D'"),
	("Gb", "R' U' R U D' R2 U R' U R U' R U' R2 D"),
	("Gc", "R2 U' R U' R U R' U R2 U D' R U' R' D"),
	("Gd", "R U R' U' D R2 U' R U' R' U R' U R2 D'"),
	("H", "M2 U M2 U2 M2 U M2"),
	("Ja", "x R2 F R F' R U2 r' U r U2 x'"),
	("Jb", "R U R' F' R U R' U' R' F R2 U' R'"),
	("Na", "R U R' U R U R' F' R U R' U' R' F R2 U' R' U2 R U' R'"),
	("Nb", "R' U R U' R' F' U' F R U R' F R' F' R U' R"),
	("Ra", "R U' R' U' R U R D R' U' R D' R' U2 R'"),
	("Rb", "R2 F R U R U' R' F' R U2 R' U2 R"),
	("T", "R U R' U' R' F R2 U' R' U' R U R' F'"),
	("Ua", "M2 U M U2 M' U M2"),
	("Ub", "M2 U' M U2 M' U' M2"),
	("V", "R U' R U R' D R D' R U' D R2 U R2 D' R2"),
	("Y", "F R U' R' U' R U R' F' R U R' U' R' F R F'"),
	("Z", "M' U M2 U M2 U M' U2 M2"),
];

pub const SKIP: &str = "Skip";



#[cfg(test)]
mod tests {
	use super::*;
	use crate::{algorithm::Algorithm, cube::{CubeState, PieceGroup}, face::Face, spin::Spin};

	fn keeps_first_two_layers(text: &str) {
		let cube = CubeState::from_algorithm(&Algorithm::parse(text).unwrap());
		assert!(cube.is_solved(&PieceGroup::layer(Face::D)), "{text}");
		for (slot, pair) in PieceGroup::pairs(Face::D) {
			assert!(cube.is_solved(&pair), "{text} breaks the pair at {slot}");
		}
		assert_eq!(Spin::IDENTITY, cube.spin(), "{text}");
	}

	#[test]
	fn algorithms_parse_and_keep_f2l() {
		for (_, text) in OLL.iter().chain(PLL.iter()) {
			keeps_first_two_layers(text);
		}
	}

	#[test]
	fn pll_algorithms_keep_orientation() {
		for (name, text) in PLL {
			let cube = CubeState::from_algorithm(&Algorithm::parse(text).unwrap());
			for slot in 0..4 {
				assert_eq!(0, cube.corner_at(slot).orientation, "{name}");
				assert_eq!(0, cube.edge_at(slot).orientation, "{name}");
			}
			assert!(!cube.is_solved_cube(), "{name}");
		}
	}

	#[test]
	fn names() {
		assert_eq!("OLL 20", OLL[19].0);
		assert_eq!("OCLL1", OLL[20].0);
		assert_eq!("OCLL7", OLL[26].0);
		assert_eq!("OLL 28", OLL[27].0);
		assert_eq!("Z", PLL[20].0);
	}
}
