//! CFOP solve: cross, four F2L pairs, then the last layer in one or two
//! looks.
//!
//! The cross is searched on every allowed layer and the best one is turned
//! to the bottom with an inspection rotation, so every later stage works
//! with the cross on the displayed D face.

use std::{
	fmt,
	time::{Duration, Instant},
};

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
	algorithm::{Algorithm, ParseAlgorithmError, Step},
	config::{LastLayer, SolverConfig},
	cube::{CubeError, CubeState, PieceGroup, CORNER_FACES},
	face::{Face, ALL_AMOUNTS},
	recognition::{self, LastLayerCase},
	search::{Choice, DeepSearch, MoveSet, Plan, Policy},
	spin::inspection,
};



#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CfopError {
	#[error(transparent)]
	Parse(#[from] ParseAlgorithmError),
	#[error(transparent)]
	Cube(#[from] CubeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
	Cross,
	/// Pair number, from 1.
	F2l(usize),
	Oll,
	Pll,
	OneLook,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Stage::Cross => write!(f, "Cross"),
			Stage::F2l(n) => write!(f, "F2L {n}"),
			Stage::Oll => write!(f, "OLL"),
			Stage::Pll => write!(f, "PLL"),
			Stage::OneLook => write!(f, "1LLL"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
	pub stage: Stage,
	pub success: bool,
	pub algorithm: Algorithm,
	pub elapsed: Duration,
	/// Cross layer, pair slot or last layer case.
	pub case: Option<String>,
}

impl StageReport {
	fn failed(stage: Stage, elapsed: Duration) -> Self {
		Self { stage, success: false, algorithm: Algorithm::new(), elapsed, case: None }
	}
}

impl fmt::Display for StageReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if !self.success {
			return write!(f, "{}: failed", self.stage);
		}
		write!(f, "{}: {}", self.stage, self.algorithm)?;
		if let Some(case) = &self.case {
			write!(f, " ({case})")?;
		}
		Ok(())
	}
}



/// Levels for a cross on the displayed `layer`: any turn first, then
/// anything except the opposite face. Every level is checked.
pub fn cross_plan(layer: Face, depth: usize) -> Plan {
	let lateral = MoveSet::ALL.without(MoveSet::face(layer.opposite()));
	(0..depth).fold(Plan::new(), |plan, level| {
		plan.moves(if level == 0 { MoveSet::ALL } else { lateral }, true)
	})
}

/// Levels for one F2L pair with the cross on D: an optional U turn, then
/// `blocks` triggers. A trigger is a side quarter turn, a U turn, the side
/// turn undone, and an optional U turn.
pub fn f2l_plan(blocks: usize) -> Plan {
	let u_turns: MoveSet = ALL_AMOUNTS.iter().map(|&a| Choice::Turn(Face::U, a)).collect();
	let sides = [Face::F, Face::B, Face::R, Face::L]
		.into_iter()
		.fold(MoveSet::EMPTY, |set, face| set | MoveSet::quarters(face));
	(0..blocks).fold(Plan::new().moves(MoveSet::PASS | u_turns, true), |plan, _| {
		plan.moves(sides, false)
			.moves(u_turns, false)
			.mirror(2, true)
			.moves(MoveSet::PASS | u_turns, true)
	})
}

/// Best cross found by [`search_cross`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossSolution {
	/// Displayed face the cross was built on.
	pub layer: Face,
	/// Without the inspection rotation.
	pub algorithm: Algorithm,
	pub score: u32,
	/// F2L pairs solved along with the cross.
	pub extra: u32,
}

/// Searches a cross on each of `layers` and keeps the highest score. Ties go
/// to the earlier layer in face order.
pub fn search_cross(cube: &CubeState, layers: &[Face], depth: usize, cores: i32) -> Option<CrossSolution> {
	let mut layers = layers.to_vec();
	layers.sort();
	layers.dedup();

	let mut best: Option<CrossSolution> = None;
	for layer in layers {
		let down = cube.spin().face(layer);
		let pairs = PieceGroup::pairs(down).into_iter().map(|(_, group)| group).collect();
		let outcome = DeepSearch::new(*cube, cross_plan(layer, depth))
			.with_targets(vec![PieceGroup::cross(down)])
			.with_extras(pairs)
			.with_policy(Policy::BestSolves)
			.with_cores(cores)
			.with_split_two_levels(true)
			.run();
		let Some(candidate) = outcome.best(0) else {
			debug!("No {layer:?} cross within {depth} moves");
			continue;
		};
		let score = outcome.score(0);
		debug!("{layer:?} cross: {} (+{} pairs, score {score})", candidate.algorithm, candidate.extra);
		if best.as_ref().is_none_or(|b| score > b.score) {
			best = Some(CrossSolution {
				layer,
				algorithm: candidate.algorithm.clone(),
				score,
				extra: candidate.extra,
			});
		}
	}
	best
}

/// Name of a down-layer pair slot as seen on the displayed cube.
fn slot_name(cube: &CubeState, corner: usize) -> &'static str {
	let spin = cube.spin();
	let mut sides: Vec<Face> = CORNER_FACES[corner]
		.iter()
		.map(|&f| spin.displayed(f))
		.filter(|&f| f != Face::D)
		.collect();
	sides.sort();
	match sides.as_slice() {
		[Face::F, Face::R] => "FR",
		[Face::F, Face::L] => "FL",
		[Face::B, Face::R] => "BR",
		[Face::B, Face::L] => "BL",
		_ => "?",
	}
}

/// Cross and pairs of the displayed D layer.
fn first_two_layers(cube: &CubeState) -> PieceGroup {
	let down = cube.spin().face(Face::D);
	PieceGroup::pairs(down).into_iter().fold(PieceGroup::cross(down), |group, (_, pair)| group | pair)
}



/// One solve, stage by stage. Each stage commits its moves only when it
/// succeeds.
#[derive(Debug, Clone)]
pub struct Cfop {
	config: SolverConfig,
	scramble: Algorithm,
	cube: CubeState,
	reports: Vec<StageReport>,
	cross_layer: Option<Face>,
	f2l_done: bool,
}

impl Cfop {
	/// Parses and develops `scramble`.
	pub fn new(scramble: &str, config: SolverConfig) -> Result<Self, CfopError> {
		let scramble = Algorithm::parse(scramble)?.developed();
		Self::from_algorithm(scramble, config)
	}

	/// Applies `scramble` as is; repeated groups must already be developed.
	pub fn from_algorithm(scramble: Algorithm, config: SolverConfig) -> Result<Self, CfopError> {
		let mut cube = CubeState::new();
		cube.apply_algorithm(&scramble)?;
		Ok(Self { config, scramble, cube, reports: vec![], cross_layer: None, f2l_done: false })
	}

	pub fn config(&self) -> &SolverConfig {
		&self.config
	}

	pub fn scramble(&self) -> &Algorithm {
		&self.scramble
	}

	/// The cube after every committed stage.
	pub fn cube(&self) -> &CubeState {
		&self.cube
	}

	pub fn reports(&self) -> &[StageReport] {
		&self.reports
	}

	pub fn cross_layer(&self) -> Option<Face> {
		self.cross_layer
	}

	/// Moves of every successful stage, in order.
	pub fn solution(&self) -> Algorithm {
		self.reports
			.iter()
			.filter(|r| r.success)
			.fold(Algorithm::new(), |alg, r| alg.concat(&r.algorithm))
	}

	pub fn movement_count(&self) -> usize {
		self.solution().movement_count()
	}

	pub fn is_solved(&self) -> bool {
		self.cube.is_solved_cube()
	}

	/// Every stage in order, stopping at the first failure.
	pub fn solve(&mut self) -> bool {
		let start = Instant::now();
		let solved = self.solve_cross()
			&& self.solve_f2l()
			&& match self.config.last_layer {
				LastLayer::TwoLook => self.solve_oll() && self.solve_pll(),
				LastLayer::OneLook => self.solve_one_look(),
			};
		if solved {
			info!("Solved in {} moves, {:.2?}", self.movement_count(), start.elapsed());
		} else {
			warn!("Solve stopped after {:.2?}", start.elapsed());
		}
		solved
	}

	pub fn solve_cross(&mut self) -> bool {
		let start = Instant::now();
		let layers = self.config.cross_layers.clone();
		let mut depth = self.config.cross_depth;
		let found = loop {
			if let Some(found) = search_cross(&self.cube, &layers, depth, self.config.cores) {
				break Some(found);
			}
			if depth >= self.config.max_cross_depth {
				break None;
			}
			depth += 1;
			info!("Retrying the cross at depth {depth}");
		};
		let Some(found) = found else {
			warn!("No cross within {depth} moves");
			self.reports.push(StageReport::failed(Stage::Cross, start.elapsed()));
			return false;
		};

		let mut algorithm = found.algorithm;
		algorithm.extend(inspection(found.layer).map(|(axis, amount)| Step::Rotation(axis, amount)));
		if let Err(err) = self.cube.apply_algorithm(&algorithm) {
			warn!("Cannot apply cross {algorithm}: {err}");
			self.reports.push(StageReport::failed(Stage::Cross, start.elapsed()));
			return false;
		}
		self.cross_layer = Some(found.layer);
		let report = StageReport {
			stage: Stage::Cross,
			success: true,
			algorithm,
			elapsed: start.elapsed(),
			case: Some(found.layer.to_char().to_string()),
		};
		info!("{report} in {:.2?}", report.elapsed);
		self.reports.push(report);
		true
	}

	/// Pairs are solved greedily, the cheapest one first. Needs the cross.
	pub fn solve_f2l(&mut self) -> bool {
		let start = Instant::now();
		if self.cross_layer.is_none() {
			warn!("F2L needs a solved cross");
			self.reports.push(StageReport::failed(Stage::F2l(1), start.elapsed()));
			return false;
		}

		let mut cube = self.cube;
		let mut reports = vec![];
		let down = cube.spin().face(Face::D);
		let cross = PieceGroup::cross(down);
		let pairs = PieceGroup::pairs(down);
		loop {
			let pair_start = Instant::now();
			let stage = Stage::F2l(reports.len() + 1);
			let solved = pairs
				.iter()
				.filter(|(_, pair)| cube.is_solved(pair))
				.fold(cross, |group, (_, pair)| group | *pair);
			let open: Vec<(usize, PieceGroup)> = pairs.iter().copied().filter(|(_, pair)| !cube.is_solved(pair)).collect();
			if open.is_empty() {
				break;
			}

			let mut blocks = self.config.f2l_blocks;
			let found = loop {
				let outcome = DeepSearch::new(cube, f2l_plan(blocks))
					.with_targets(open.iter().map(|(_, pair)| solved | *pair).collect())
					.with_policy(Policy::Short)
					.with_cores(self.config.cores)
					.run();
				let best = (0..open.len())
					.filter_map(|i| outcome.best(i).map(|c| (i, outcome.score(i), c.algorithm.clone())))
					.fold(None::<(usize, u32, Algorithm)>, |best, next| match best {
						Some(b) if b.1 >= next.1 => Some(b),
						_ => Some(next),
					});
				if best.is_some() || blocks >= self.config.max_f2l_blocks {
					break best;
				}
				blocks += 1;
				info!("Retrying {stage} with {blocks} triggers");
			};
			let Some((i, _, algorithm)) = found else {
				warn!("No {stage} within {blocks} triggers");
				self.reports.push(StageReport::failed(stage, start.elapsed()));
				return false;
			};

			let slot = slot_name(&cube, open[i].0);
			if let Err(err) = cube.apply_algorithm(&algorithm) {
				warn!("Cannot apply {stage} {algorithm}: {err}");
				self.reports.push(StageReport::failed(stage, start.elapsed()));
				return false;
			}
			let report = StageReport {
				stage,
				success: true,
				algorithm,
				elapsed: pair_start.elapsed(),
				case: Some(slot.to_string()),
			};
			info!("{report} in {:.2?}", report.elapsed);
			reports.push(report);
		}

		self.cube = cube;
		self.reports.append(&mut reports);
		self.f2l_done = true;
		debug!("F2L done in {:.2?}", start.elapsed());
		true
	}

	pub fn solve_oll(&mut self) -> bool {
		self.last_layer_stage(Stage::Oll, recognition::recognize_oll, |after| {
			recognition::is_oriented(after) && after.is_solved(&first_two_layers(after))
		})
	}

	pub fn solve_pll(&mut self) -> bool {
		self.last_layer_stage(Stage::Pll, recognition::recognize_pll, CubeState::is_solved_cube)
	}

	pub fn solve_one_look(&mut self) -> bool {
		self.last_layer_stage(Stage::OneLook, recognition::recognize_one_look, CubeState::is_solved_cube)
	}

	fn last_layer_stage(
		&mut self,
		stage: Stage,
		recognize: impl Fn(&CubeState) -> Option<LastLayerCase>,
		done: impl Fn(&CubeState) -> bool,
	) -> bool {
		let start = Instant::now();
		if !self.f2l_done {
			warn!("{stage} needs F2L");
			self.reports.push(StageReport::failed(stage, start.elapsed()));
			return false;
		}
		let Some(case) = recognize(&self.cube) else {
			warn!("Unrecognized {stage} case");
			self.reports.push(StageReport::failed(stage, start.elapsed()));
			return false;
		};

		let mut after = self.cube;
		if after.apply_algorithm(&case.algorithm).is_err() || !done(&after) {
			warn!("{stage} {} ({}) did not finish the stage", case.algorithm, case.name);
			self.reports.push(StageReport::failed(stage, start.elapsed()));
			return false;
		}
		self.cube = after;
		let report = StageReport {
			stage,
			success: true,
			algorithm: case.algorithm,
			elapsed: start.elapsed(),
			case: Some(case.name.to_string()),
		};
		info!("{report} in {:.2?}", report.elapsed);
		self.reports.push(report);
		true
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plans() {
		let cross = cross_plan(Face::D, 6);
		assert_eq!(6, cross.depth());
		assert!(cross.levels().iter().all(|l| l.check()));
		assert_eq!(18, cross.levels()[0].width());
		assert_eq!(15, cross.levels()[1].width());

		let f2l = f2l_plan(3);
		assert_eq!(13, f2l.depth());
		assert_eq!(4 * 96 * 96 * 96, f2l.levels().iter().map(|l| l.width() as u64).product::<u64>());
	}

	#[test]
	fn slot_names_follow_the_view() {
		let cube = CubeState::new();
		assert_eq!("FR", slot_name(&cube, 4));
		assert_eq!("BL", slot_name(&cube, 6));
		// after y the physical DFR slot is seen at the front left
		let turned = CubeState::from_algorithm(&"y".parse().unwrap());
		assert_eq!("FL", slot_name(&turned, 4));
	}

	#[test]
	fn stages_need_their_predecessors() {
		let mut cfop = Cfop::new("R U R' U'", SolverConfig::default()).unwrap();
		assert!(!cfop.solve_f2l());
		assert!(!cfop.solve_oll());
		assert_eq!(2, cfop.reports().len());
		assert!(cfop.solution().is_empty());
		assert_eq!(*cfop.cube(), CubeState::from_algorithm(&"R U R' U'".parse().unwrap()));
	}

	#[test]
	fn bad_scrambles() {
		assert!(matches!(Cfop::new("R Q", SolverConfig::default()), Err(CfopError::Parse(_))));
		let undeveloped = Algorithm::parse("(R U)2").unwrap();
		assert!(matches!(
			Cfop::from_algorithm(undeveloped, SolverConfig::default()),
			Err(CfopError::Cube(_))
		));
	}
}
