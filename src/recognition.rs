//! Last-layer case recognition.
//!
//! Every predicate reads the displayed frame through the cube's spin, so one
//! bit ordering serves every cross layer once the cube is held with the cross
//! down. The tables are derived from the catalog algorithms with that same
//! ordering the first time they are needed.

use std::{collections::HashSet, sync::LazyLock};

use log::{debug, error};

use crate::{
	algorithm::{Algorithm, Step},
	catalog::{self, SKIP},
	cube::CubeState,
	face::{Amount, Axis, Face},
};



pub const OLL_CASES: usize = 58;
pub const PLL_CASES: usize = 22;

/// Last-layer edges in OLL bit order.
const OLL_EDGES: [[Face; 2]; 4] = {
	use Face::*;
	[[U, R], [U, F], [U, L], [U, B]]
};
/// Last-layer corners in OLL bit order, faces clockwise.
const OLL_CORNERS: [[Face; 3]; 4] = {
	use Face::*;
	[[U, R, F], [U, F, L], [U, L, B], [U, B, R]]
};

const SIDES: [Face; 4] = {
	use Face::*;
	[F, R, B, L]
};
const PLL_EDGES: [[Face; 2]; 4] = {
	use Face::*;
	[[U, F], [U, R], [U, B], [U, L]]
};
const PLL_CORNERS: [[Face; 3]; 4] = {
	use Face::*;
	[[U, F, L], [U, R, F], [U, B, R], [U, L, B]]
};



/// One bit per last-layer sticker showing the Up color: the four edges,
/// then the three stickers of each corner.
pub fn oll_mask(cube: &CubeState) -> u16 {
	let shows_up = |position: &[Face], face: Face| cube.view_sticker(position, face) == Some(Face::U);
	let mut mask: u16 = 0;
	let mut bit = 0;
	for edge in OLL_EDGES {
		if shows_up(&edge, Face::U) {
			mask |= 1 << bit;
		}
		bit += 1;
	}
	for corner in OLL_CORNERS {
		for face in corner {
			if shows_up(&corner, face) {
				mask |= 1 << bit;
			}
			bit += 1;
		}
	}
	mask
}

/// Two bits per last-layer slot naming the piece there, relative to the
/// piece in the first corner slot. Only meaningful once the last layer is
/// oriented.
pub fn pll_mask(cube: &CubeState) -> u16 {
	let side = |face: Option<Face>| face.and_then(|f| SIDES.iter().position(|&s| s == f)).unwrap_or(0);
	let edges = PLL_EDGES.map(|edge| side(cube.view_sticker(&edge, edge[1])));
	let corners = PLL_CORNERS.map(|corner| {
		let a = cube.view_sticker(&corner, corner[1]);
		let b = cube.view_sticker(&corner, corner[2]);
		PLL_CORNERS
			.iter()
			.position(|home| [a, b].iter().all(|f| f.is_some_and(|f| home[1..].contains(&f))))
			.unwrap_or(0)
	});
	let reference = corners[0];
	let relative = |id: usize| ((id + 4 - reference) % 4) as u16;
	let mut mask = 0;
	for (i, &id) in edges.iter().enumerate() {
		mask |= relative(id) << (2 * i);
	}
	for (i, &id) in corners.iter().enumerate() {
		mask |= relative(id) << (8 + 2 * i);
	}
	mask
}

/// Mask of a last layer with every sticker oriented.
pub const ORIENTED: u16 = 0b0010_0100_1001_1111;

pub fn is_oriented(cube: &CubeState) -> bool {
	oll_mask(cube) == ORIENTED
}

fn y_rotation(quarters: usize) -> Option<Step> {
	Amount::from_quarters(quarters as i32).map(|amount| Step::Rotation(Axis::UD, amount))
}

fn u_turn(quarters: usize) -> Option<Step> {
	Amount::from_quarters(quarters as i32).map(|amount| Step::Turn(Face::U, amount))
}



struct CaseTable<const N: usize> {
	/// `masks[r][case]`: the mask of the case after a `y^-r` rotation.
	masks: [[u16; N]; 4],
	names: [&'static str; N],
	algorithms: Vec<Algorithm>,
}

impl<const N: usize> CaseTable<N> {
	fn build(catalog: &[(&'static str, &'static str)], mask: fn(&CubeState) -> u16) -> Self {
		let mut names = [SKIP; N];
		let mut algorithms = vec![Algorithm::new()];
		for (i, &(name, text)) in catalog.iter().take(N - 1).enumerate() {
			names[i + 1] = name;
			let alg = Algorithm::parse(text).unwrap_or_else(|err| {
				error!("Catalog algorithm {name} does not parse: {err}");
				Algorithm::new()
			});
			algorithms.push(alg);
		}
		let mut masks = [[0; N]; 4];
		for (r, row) in masks.iter_mut().enumerate() {
			for (case, alg) in algorithms.iter().enumerate() {
				let mut setup = alg.inverse();
				if let Some(y) = y_rotation(4 - r) {
					setup.push(y);
				}
				row[case] = mask(&CubeState::from_algorithm(&setup));
			}
		}
		debug!("Built a table of {} cases", algorithms.len());
		Self { masks, names, algorithms }
	}

	/// Table entries matching `mask`, rotation-major.
	fn matches(&self, mask: u16) -> impl Iterator<Item = (usize, usize)> + '_ {
		(0..4).flat_map(move |r| (0..N).filter(move |&case| self.masks[r][case] == mask).map(move |case| (r, case)))
	}
}

static OLL_TABLE: LazyLock<CaseTable<OLL_CASES>> = LazyLock::new(|| CaseTable::build(&catalog::OLL, oll_mask));
static PLL_TABLE: LazyLock<CaseTable<PLL_CASES>> = LazyLock::new(|| CaseTable::build(&catalog::PLL, pll_mask));
static ONE_LOOK: LazyLock<Vec<OneLookEntry>> = LazyLock::new(build_one_look);



/// A recognized case and the moves solving it from the recognized state,
/// rotations and AUF included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastLayerCase {
	pub id: usize,
	pub name: &'static str,
	pub algorithm: Algorithm,
}

pub fn oll_name(case: usize) -> Option<&'static str> {
	OLL_TABLE.names.get(case).copied()
}

pub fn pll_name(case: usize) -> Option<&'static str> {
	PLL_TABLE.names.get(case).copied()
}

/// Orientation case of the displayed last layer. Case 0 means it is
/// already oriented.
pub fn recognize_oll(cube: &CubeState) -> Option<LastLayerCase> {
	let table = &*OLL_TABLE;
	let (r, case) = table.matches(oll_mask(cube)).next()?;
	let mut algorithm = Algorithm::new();
	if let Some(y) = y_rotation(r) {
		algorithm.push(y);
	}
	algorithm.append(&table.algorithms[case]);
	Some(LastLayerCase { id: case, name: table.names[case], algorithm })
}

/// Permutation case of an oriented last layer. The returned algorithm ends
/// with the AUF that completes the solve.
pub fn recognize_pll(cube: &CubeState) -> Option<LastLayerCase> {
	let table = &*PLL_TABLE;
	for pre in 0..4 {
		let mut view = *cube;
		if let Some(Step::Turn(face, amount)) = u_turn(pre) {
			view.apply_turn(face, amount);
		}
		for (r, case) in table.matches(pll_mask(&view)) {
			let mut algorithm = Algorithm::new();
			algorithm.extend(u_turn(pre));
			algorithm.extend(y_rotation(r));
			algorithm.append(&table.algorithms[case]);
			if let Some(post) = finish_with_auf(cube, &algorithm) {
				algorithm.extend(post);
				return Some(LastLayerCase { id: case, name: table.names[case], algorithm });
			}
		}
	}
	None
}

/// `Some(auf)` when `alg` followed by that U-turn (or nothing) solves `cube`.
fn finish_with_auf(cube: &CubeState, alg: &Algorithm) -> Option<Option<Step>> {
	let mut after = *cube;
	after.apply_algorithm(alg).ok()?;
	(0..4).find_map(|post| {
		let step = u_turn(post);
		let mut done = after;
		if let Some(Step::Turn(face, amount)) = step {
			done.apply_turn(face, amount);
		}
		done.is_solved_cube().then_some(step)
	})
}



#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneLookEntry {
	pub name: String,
	pub algorithm: Algorithm,
}

/// Every orientation case followed by every AUF and every rotated
/// permutation case, simplified and without duplicates. Entries are joined
/// two-look algorithms, so a one-look solve is about as long as OLL plus
/// PLL; it only saves the second recognition.
fn build_one_look() -> Vec<OneLookEntry> {
	let oll = &*OLL_TABLE;
	let pll = &*PLL_TABLE;
	let mut seen = HashSet::new();
	let mut entries = vec![];
	for (o, oll_alg) in oll.algorithms.iter().enumerate() {
		for (p, pll_alg) in pll.algorithms.iter().enumerate() {
			// the final AUF covers a skipped permutation
			let turns = if p == 0 { 1 } else { 4 };
			for auf in 0..turns {
				for r in 0..turns {
					let mut alg = oll_alg.clone();
					alg.extend(u_turn(auf));
					alg.extend(y_rotation(r));
					alg.append(pll_alg);
					alg.extend(y_rotation(4 - r));
					let alg = alg.simplified();
					if seen.insert(alg.clone()) {
						entries.push(OneLookEntry { name: format!("{} + {}", oll.names[o], pll.names[p]), algorithm: alg });
					}
				}
			}
		}
	}
	debug!("Built a one-look catalog of {} algorithms", entries.len());
	entries
}

pub fn one_look_catalog() -> &'static [OneLookEntry] {
	&ONE_LOOK
}

/// First catalog entry that solves the whole cube from the displayed last
/// layer, trying each `y` rotation before it and each AUF after it.
pub fn recognize_one_look(cube: &CubeState) -> Option<LastLayerCase> {
	for (id, entry) in one_look_catalog().iter().enumerate() {
		for r in 0..4 {
			let mut algorithm = Algorithm::new();
			algorithm.extend(y_rotation(r));
			algorithm.append(&entry.algorithm);
			if let Some(post) = finish_with_auf(cube, &algorithm) {
				algorithm.extend(post);
				return Some(LastLayerCase { id, name: entry.name.as_str(), algorithm });
			}
		}
	}
	None
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::cube::PieceGroup;
	use std::collections::HashMap;

	fn alg(text: &str) -> Algorithm {
		Algorithm::parse(text).unwrap()
	}

	fn last_layer(text: &str) -> CubeState {
		CubeState::from_algorithm(&alg(text))
	}

	#[test]
	fn solved_masks() {
		assert_eq!(ORIENTED, oll_mask(&CubeState::new()));
		assert_eq!(0b11_10_01_00_0000_0000 | 0b11_10_01_00, pll_mask(&CubeState::new()));
	}

	#[test]
	fn masks_read_the_displayed_frame() {
		// a y rotation or an AUF does not change the relative permutation
		assert_eq!(pll_mask(&CubeState::new()), pll_mask(&last_layer("y")));
		assert_eq!(pll_mask(&CubeState::new()), pll_mask(&last_layer("U")));
		// the same case held with the cross on top
		let down = last_layer("R U R' U R U2 R'");
		let up = last_layer("x2 R U R' U R U2 R'");
		assert_eq!(oll_mask(&down), oll_mask(&up));
	}

	#[test]
	fn oll_table_masks_are_distinct() {
		let mut seen = HashSet::new();
		for case in 0..OLL_CASES {
			let masks: HashSet<u16> = (0..4).map(|r| OLL_TABLE.masks[r][case]).collect();
			for mask in masks {
				assert!(seen.insert(mask), "case {case} shares mask {mask:016b}");
			}
		}
	}

	#[test]
	fn every_oll_case_is_recognized() {
		for case in 0..OLL_CASES {
			for setup_r in 0..4 {
				let mut setup = OLL_TABLE.algorithms[case].inverse();
				setup.extend(u_turn(setup_r));
				let cube = CubeState::from_algorithm(&setup);
				let found = recognize_oll(&cube).unwrap();
				assert_eq!(found, recognize_oll(&cube).unwrap());
				let mut after = cube;
				after.apply_algorithm(&found.algorithm).unwrap();
				assert!(is_oriented(&after), "{} from case {case}", found.name);
				assert!(after.is_solved(&PieceGroup::layer(Face::D)));
			}
		}
	}

	#[test]
	fn every_pll_case_is_recognized() {
		for case in 0..PLL_CASES {
			for (pre, r) in [(0, 0), (1, 2), (2, 3), (3, 1)] {
				let mut setup = Algorithm::new();
				setup.extend(u_turn(pre));
				setup.append(&PLL_TABLE.algorithms[case].inverse());
				setup.extend(y_rotation(r));
				let cube = CubeState::from_algorithm(&setup);
				let found = recognize_pll(&cube).unwrap();
				assert_eq!(case, found.id, "{}", found.name);
				let mut after = cube;
				after.apply_algorithm(&found.algorithm).unwrap();
				assert!(after.is_solved_cube(), "{}", found.name);
			}
		}
	}

	/// Every last layer reachable with U turns and a few F2L-preserving
	/// algorithms, the cross on D.
	fn last_layers() -> HashSet<CubeState> {
		let moves: Vec<Algorithm> = [
			"U",
			"R U R' U' R' F R2 U' R' U' R U R' F'",
			"y R U R' U' R' F R2 U' R' U' R U R' F' y'",
			"R U R' U R U2 R'",
			"y R U R' U R U2 R' y'",
			"F R U R' U' F'",
		]
		.into_iter()
		.map(alg)
		.collect();
		let mut seen = HashSet::from([CubeState::new()]);
		let mut frontier = vec![CubeState::new()];
		while let Some(cube) = frontier.pop() {
			for m in &moves {
				let mut next = cube;
				next.apply_algorithm(m).unwrap();
				if seen.insert(next) {
					frontier.push(next);
				}
			}
		}
		seen
	}

	#[test]
	fn every_oriented_last_layer_is_permuted() {
		let states = last_layers();
		assert_eq!(62208, states.len());
		let oriented: Vec<&CubeState> = states.iter().filter(|c| is_oriented(c)).collect();
		assert_eq!(288, oriented.len());
		for cube in oriented {
			let found = recognize_pll(cube).unwrap();
			let mut after = *cube;
			after.apply_algorithm(&found.algorithm).unwrap();
			assert!(after.is_solved_cube(), "{}", found.name);
		}
	}

	#[test]
	fn pll_cases_have_disjoint_masks() {
		let mut owner: HashMap<u16, usize> = HashMap::new();
		for case in 0..PLL_CASES {
			for pre in 0..4 {
				for post in 0..4 {
					for r in 0..4 {
						let mut setup = Algorithm::new();
						setup.extend(u_turn(pre));
						setup.append(&PLL_TABLE.algorithms[case].inverse());
						setup.extend(u_turn(post));
						setup.extend(y_rotation(r));
						let mask = pll_mask(&CubeState::from_algorithm(&setup));
						let first = *owner.entry(mask).or_insert(case);
						assert_eq!(first, case, "{} and {} share {mask:016b}", PLL_TABLE.names[first], PLL_TABLE.names[case]);
					}
				}
			}
		}
	}

	#[test]
	fn names() {
		assert_eq!(Some("Skip"), oll_name(0));
		assert_eq!(Some("OCLL7"), oll_name(27));
		assert_eq!(Some("Ua"), pll_name(17));
		assert_eq!(None, pll_name(22));
	}

	#[test]
	fn one_look_catalog_is_deduplicated() {
		let catalog = one_look_catalog();
		assert_eq!("Skip + Skip", catalog[0].name);
		assert!(catalog[0].algorithm.is_empty());
		let unique: HashSet<&Algorithm> = catalog.iter().map(|e| &e.algorithm).collect();
		assert_eq!(catalog.len(), unique.len());
		assert!(catalog.len() > 10_000);
	}

	#[test]
	fn one_look_solves_a_last_layer() {
		let cube = last_layer("R U R' U R U2 R' U' R U R' F' R U R' U' R' F R2 U' R'");
		let found = recognize_one_look(&cube).unwrap();
		let mut after = cube;
		after.apply_algorithm(&found.algorithm).unwrap();
		assert!(after.is_solved_cube(), "{}", found.name);
	}
}
