//! Layered bounded search.
//!
//! A [`Plan`] lists one [`SearchLevel`] per depth. [`DeepSearch`] walks every
//! sequence the plan allows, without pruning, and records each checked state
//! that solves one of its target groups. The root branches are split across
//! a rayon pool, and the chunk results are merged in branch order so the
//! outcome never depends on the thread count.

use std::{
	ops::BitOr,
	time::{Duration, Instant},
};

use log::{debug, trace, warn};
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::{
	algorithm::{Algorithm, Step},
	cube::{CubeState, PieceGroup},
	face::{Amount, Face, ALL_AMOUNTS, ALL_FACES},
};



pub const SCORE_BASE: u32 = 100;
/// Targets tracked per search, one bit each in [`Candidate::solved`].
pub const MAX_TARGETS: usize = 32;

/// One entry of a [`MoveSet`]: a face turn, or a pass that adds no token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
	Pass,
	Turn(Face, Amount),
}

impl Choice {
	pub const fn inverse(self) -> Choice {
		match self {
			Choice::Pass => Choice::Pass,
			Choice::Turn(face, amount) => Choice::Turn(face, amount.inverse()),
		}
	}

	pub const fn step(self) -> Option<Step> {
		match self {
			Choice::Pass => None,
			Choice::Turn(face, amount) => Some(Step::Turn(face, amount)),
		}
	}

	const fn bit(self) -> u32 {
		match self {
			Choice::Pass => 0,
			Choice::Turn(face, amount) => 1 + Step::turn_index(face, amount) as u32,
		}
	}

	const fn from_bit(bit: u32) -> Choice {
		if bit == 0 {
			return Choice::Pass;
		}
		let index = bit as usize - 1;
		Choice::Turn(ALL_FACES[index / 3], ALL_AMOUNTS[index % 3])
	}
}



/// Set of [`Choice`]s. Iterates the pass first, then turns in face order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveSet(u32);

impl MoveSet {
	pub const EMPTY: MoveSet = MoveSet(0);
	pub const PASS: MoveSet = MoveSet(1);
	/// The 18 face turns.
	pub const ALL: MoveSet = MoveSet(((1 << 18) - 1) << 1);

	pub const fn single(choice: Choice) -> Self {
		MoveSet(1 << choice.bit())
	}

	/// All three turns of `face`.
	pub const fn face(face: Face) -> Self {
		MoveSet(0b111 << (1 + 3 * face.index()))
	}

	/// Clockwise and counterclockwise quarter turns of `face`.
	pub const fn quarters(face: Face) -> Self {
		MoveSet(0b101 << (1 + 3 * face.index()))
	}

	pub const fn union(self, other: Self) -> Self {
		MoveSet(self.0 | other.0)
	}

	pub const fn without(self, other: Self) -> Self {
		MoveSet(self.0 & !other.0)
	}

	pub const fn contains(self, choice: Choice) -> bool {
		self.0 & (1 << choice.bit()) != 0
	}

	pub const fn len(self) -> usize {
		self.0.count_ones() as usize
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	pub fn iter(self) -> MoveSetIter {
		MoveSetIter { bits: self.0 }
	}
}

impl BitOr for MoveSet {
	type Output = MoveSet;
	fn bitor(self, rhs: Self) -> Self::Output {
		self.union(rhs)
	}
}

impl FromIterator<Choice> for MoveSet {
	fn from_iter<I: IntoIterator<Item = Choice>>(iter: I) -> Self {
		iter.into_iter().fold(MoveSet::EMPTY, |set, choice| set | MoveSet::single(choice))
	}
}

pub struct MoveSetIter {
	bits: u32,
}

impl Iterator for MoveSetIter {
	type Item = Choice;
	fn next(&mut self) -> Option<Choice> {
		if self.bits == 0 {
			return None;
		}
		let bit = self.bits.trailing_zeros();
		self.bits &= self.bits - 1;
		Some(Choice::from_bit(bit))
	}
}



#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchLevel {
	/// Try every member of `set`.
	Moves { set: MoveSet, check: bool },
	/// Undo the choice made `back` levels earlier. Acts as a pass when there
	/// is no such level.
	Mirror { back: usize, check: bool },
}

impl SearchLevel {
	pub const fn check(&self) -> bool {
		match *self {
			SearchLevel::Moves { check, .. } | SearchLevel::Mirror { check, .. } => check,
		}
	}

	/// Branching factor.
	pub const fn width(&self) -> usize {
		match *self {
			SearchLevel::Moves { set, .. } => set.len(),
			SearchLevel::Mirror { .. } => 1,
		}
	}

	/// Choices available after `path`, which has one entry per earlier level.
	fn options(&self, path: &[Choice]) -> MoveSet {
		match *self {
			SearchLevel::Moves { set, .. } => set,
			SearchLevel::Mirror { back, .. } => {
				let choice = match path.len().checked_sub(back) {
					Some(i) if back > 0 => path[i].inverse(),
					_ => Choice::Pass,
				};
				MoveSet::single(choice)
			}
		}
	}
}

/// Ordered search levels. The search depth is the number of levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
	levels: Vec<SearchLevel>,
}

impl Plan {
	pub fn new() -> Self {
		Self { levels: vec![] }
	}

	#[must_use]
	pub fn moves(mut self, set: MoveSet, check: bool) -> Self {
		self.levels.push(SearchLevel::Moves { set, check });
		self
	}

	#[must_use]
	pub fn mirror(mut self, back: usize, check: bool) -> Self {
		self.levels.push(SearchLevel::Mirror { back, check });
		self
	}

	pub fn push(&mut self, level: SearchLevel) {
		self.levels.push(level);
	}

	pub fn levels(&self) -> &[SearchLevel] {
		&self.levels
	}

	pub fn depth(&self) -> usize {
		self.levels.len()
	}

	/// Exact number of states a search over this plan visits, root included.
	pub fn node_count(&self) -> u64 {
		let mut total: u64 = 1;
		let mut width: u64 = 1;
		for level in &self.levels {
			width = width.saturating_mul(level.width() as u64);
			total = total.saturating_add(width);
		}
		total
	}
}



#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
	/// Most extra groups solved, then fewest tokens.
	BestSolves,
	/// Fewest tokens.
	#[default]
	Short,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
	pub algorithm: Algorithm,
	/// Bit `i` is set when target `i` is solved.
	pub solved: u32,
	/// Number of extra groups solved as well.
	pub extra: u32,
}

impl Candidate {
	pub fn solves(&self, target: usize) -> bool {
		self.solved & (1 << target) != 0
	}

	pub fn score(&self, policy: Policy) -> u32 {
		let tokens = self.algorithm.len() as u32;
		let base = match policy {
			Policy::Short => SCORE_BASE,
			Policy::BestSolves => (self.extra + 1) * SCORE_BASE,
		};
		base.saturating_sub(tokens).max(1)
	}
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
	pub candidates: Vec<Candidate>,
	best: Vec<Option<usize>>,
	policy: Policy,
	pub nodes: u64,
	pub elapsed: Duration,
}

impl SearchOutcome {
	fn new(candidates: Vec<Candidate>, targets: usize, policy: Policy, nodes: u64, elapsed: Duration) -> Self {
		let best = (0..targets)
			.map(|target| {
				let mut best: Option<(usize, u32)> = None;
				for (i, candidate) in candidates.iter().enumerate() {
					if !candidate.solves(target) {
						continue;
					}
					let score = candidate.score(policy);
					// first found wins ties
					if best.is_none_or(|(_, s)| score > s) {
						best = Some((i, score));
					}
				}
				best.map(|(i, _)| i)
			})
			.collect();
		Self { candidates, best, policy, nodes, elapsed }
	}

	pub fn best(&self, target: usize) -> Option<&Candidate> {
		let i = (*self.best.get(target)?)?;
		self.candidates.get(i)
	}

	pub fn best_algorithm(&self, target: usize) -> Option<&Algorithm> {
		self.best(target).map(|c| &c.algorithm)
	}

	/// 0 when nothing solved `target`.
	pub fn score(&self, target: usize) -> u32 {
		self.best(target).map_or(0, |c| c.score(self.policy))
	}
}



pub struct DeepSearch {
	start: CubeState,
	plan: Plan,
	targets: Vec<PieceGroup>,
	extras: Vec<PieceGroup>,
	policy: Policy,
	cores: i32,
	split_two_levels: bool,
}

impl DeepSearch {
	pub fn new(start: CubeState, plan: Plan) -> Self {
		Self {
			start,
			plan,
			targets: vec![],
			extras: vec![],
			policy: Policy::default(),
			cores: 0,
			split_two_levels: false,
		}
	}

	/// At most [`MAX_TARGETS`] targets are tracked; the rest are dropped.
	#[must_use]
	pub fn with_targets(mut self, targets: Vec<PieceGroup>) -> Self {
		if targets.len() > MAX_TARGETS {
			warn!("Tracking {MAX_TARGETS} of {} search targets", targets.len());
		}
		self.targets = targets;
		self.targets.truncate(MAX_TARGETS);
		self
	}

	/// Groups counted by [`Policy::BestSolves`].
	#[must_use]
	pub fn with_extras(mut self, extras: Vec<PieceGroup>) -> Self {
		self.extras = extras;
		self
	}

	#[must_use]
	pub fn with_policy(mut self, policy: Policy) -> Self {
		self.policy = policy;
		self
	}

	/// 0 uses every hardware thread, a negative count searches sequentially.
	#[must_use]
	pub fn with_cores(mut self, cores: i32) -> Self {
		self.cores = cores;
		self
	}

	/// Split the first two levels instead of only the first one.
	#[must_use]
	pub fn with_split_two_levels(mut self, split: bool) -> Self {
		self.split_two_levels = split;
		self
	}

	pub fn run(&self) -> SearchOutcome {
		let time_begin = Instant::now();
		let mut candidates = vec![];
		self.check(&self.start, &[], &mut candidates);

		let roots = self.roots();
		let parts: Vec<Vec<Candidate>> = match thread_pool(self.cores) {
			None => vec![self.explore_roots(&roots)],
			Some(pool) => {
				let chunk_size: usize = roots.len().div_ceil(pool.current_num_threads()).max(1);
				pool.install(|| {
					roots
						.into_par_iter()
						.chunks(chunk_size)
						.map(|chunk| self.explore_roots(&chunk))
						.collect()
				})
			}
		};
		candidates.extend(parts.into_iter().flatten());

		let nodes = self.plan.node_count();
		let elapsed = time_begin.elapsed();
		debug!(
			"Searched {} levels, {} nodes in {:?}: {} candidates",
			self.plan.depth(), nodes, elapsed, candidates.len()
		);
		SearchOutcome::new(candidates, self.targets.len(), self.policy, nodes, elapsed)
	}

	/// Paths through the levels that are split across threads.
	fn roots(&self) -> Vec<Vec<Choice>> {
		let split = if self.split_two_levels { 2 } else { 1 };
		let mut roots: Vec<Vec<Choice>> = vec![vec![]];
		for level in self.plan.levels.iter().take(split) {
			roots = roots
				.into_iter()
				.flat_map(|path| {
					level.options(&path).iter().map(move |choice| {
						let mut next = path.clone();
						next.push(choice);
						next
					})
				})
				.collect();
		}
		roots
	}

	fn explore_roots(&self, roots: &[Vec<Choice>]) -> Vec<Candidate> {
		let mut found = vec![];
		for root in roots {
			trace!("Exploring {root:?}");
			let mut state = self.start;
			let mut path = Vec::with_capacity(self.plan.depth());
			for &choice in root {
				let check = self.plan.levels[path.len()].check();
				state = advance(state, choice);
				path.push(choice);
				if check {
					self.check(&state, &path, &mut found);
				}
			}
			self.descend(state, &mut path, &mut found);
		}
		found
	}

	fn descend(&self, state: CubeState, path: &mut Vec<Choice>, found: &mut Vec<Candidate>) {
		let Some(level) = self.plan.levels.get(path.len()) else {
			return;
		};
		for choice in level.options(path).iter() {
			let next = advance(state, choice);
			path.push(choice);
			if level.check() {
				self.check(&next, path, found);
			}
			self.descend(next, path, found);
			path.pop();
		}
	}

	fn check(&self, state: &CubeState, path: &[Choice], found: &mut Vec<Candidate>) {
		let solved = self.targets
			.iter()
			.enumerate()
			.filter(|(_, target)| state.is_solved(target))
			.fold(0u32, |mask, (i, _)| mask | 1 << i);
		if solved == 0 {
			return;
		}
		let extra = self.extras.iter().filter(|group| state.is_solved(group)).count() as u32;
		let steps: Vec<Step> = path.iter().filter_map(|choice| choice.step()).collect();
		found.push(Candidate { algorithm: Algorithm::from_steps(steps), solved, extra });
	}
}

fn advance(mut state: CubeState, choice: Choice) -> CubeState {
	if let Choice::Turn(face, amount) = choice {
		state.apply_turn(face, amount);
	}
	state
}

fn thread_pool(cores: i32) -> Option<rayon::ThreadPool> {
	if cores < 0 || cores == 1 {
		return None;
	}
	match rayon::ThreadPoolBuilder::new().num_threads(cores as usize).build() {
		Ok(pool) => Some(pool),
		Err(err) => {
			warn!("Cannot build a thread pool, searching sequentially: {err}");
			None
		}
	}
}



/// Throughput of a reference search.
#[derive(Debug, Clone, Copy)]
pub struct SearchSpeed {
	pub nodes: u64,
	pub elapsed: Duration,
}

impl SearchSpeed {
	pub fn nodes_per_second(&self) -> f64 {
		self.nodes as f64 / self.elapsed.as_secs_f64().max(1e-9)
	}

	/// Rough wall-clock time for a search over `plan`.
	pub fn estimate(&self, plan: &Plan) -> Duration {
		Duration::from_secs_f64(plan.node_count() as f64 / self.nodes_per_second())
	}
}

/// Times a fixed five-level search on `cores` threads.
pub fn measure_speed(cores: i32) -> SearchSpeed {
	let start = CubeState::from_algorithm(&Algorithm::from_steps(vec![
		Step::Turn(Face::R, Amount::Cw),
		Step::Turn(Face::U, Amount::Half),
		Step::Turn(Face::F, Amount::Ccw),
	]));
	let lateral = MoveSet::ALL.without(MoveSet::face(Face::U));
	let plan = Plan::new()
		.moves(MoveSet::ALL, true)
		.moves(lateral, true)
		.moves(lateral, true)
		.moves(lateral, true)
		.moves(lateral, true);
	let outcome = DeepSearch::new(start, plan)
		.with_targets(vec![PieceGroup::cross(Face::D)])
		.with_cores(cores)
		.run();
	SearchSpeed { nodes: outcome.nodes, elapsed: outcome.elapsed }
}



#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::BTreeSet;

	fn alg(text: &str) -> Algorithm {
		Algorithm::parse(text).unwrap()
	}

	fn start() -> CubeState {
		CubeState::from_algorithm(&alg("R U"))
	}

	#[test]
	fn move_set_iterates_pass_first() {
		let set = MoveSet::face(Face::U) | MoveSet::PASS;
		let choices: Vec<Choice> = set.iter().collect();
		assert_eq!(
			vec![Choice::Pass, Choice::Turn(Face::U, Amount::Cw), Choice::Turn(Face::U, Amount::Half), Choice::Turn(Face::U, Amount::Ccw)],
			choices
		);
		assert_eq!(18, MoveSet::ALL.len());
		assert_eq!(2, MoveSet::quarters(Face::R).len());
		assert!(!MoveSet::quarters(Face::R).contains(Choice::Turn(Face::R, Amount::Half)));
		assert_eq!(set, set.iter().collect::<MoveSet>());
	}

	#[test]
	fn node_count() {
		let plan = Plan::new()
			.moves(MoveSet::ALL, false)
			.moves(MoveSet::face(Face::U), false)
			.mirror(2, true);
		assert_eq!(1 + 18 + 54 + 54, plan.node_count());
		assert_eq!(3, plan.depth());
	}

	#[test]
	fn mirror_undoes_an_earlier_choice() {
		let plan = Plan::new()
			.moves(MoveSet::quarters(Face::R), false)
			.moves(MoveSet::face(Face::U) | MoveSet::PASS, false)
			.mirror(2, true);
		let outcome = DeepSearch::new(CubeState::new(), plan)
			.with_targets(vec![PieceGroup::ALL])
			.with_cores(-1)
			.run();
		let found: Vec<String> = outcome.candidates.iter().map(|c| c.algorithm.to_string()).collect();
		assert_eq!(vec!["", "R R'", "R' R"], found);
	}

	#[test]
	fn mirror_without_a_level_is_a_pass() {
		let level = SearchLevel::Mirror { back: 3, check: true };
		assert_eq!(MoveSet::PASS, level.options(&[Choice::Turn(Face::U, Amount::Cw)]));
	}

	#[test]
	fn policies() {
		let plan = Plan::new().moves(MoveSet::ALL, true).moves(MoveSet::ALL, true);
		let search = DeepSearch::new(start(), plan)
			.with_targets(vec![PieceGroup::EMPTY, PieceGroup::ALL])
			.with_extras(vec![PieceGroup::ALL])
			.with_cores(-1);

		let short = search.run();
		assert_eq!(Some(&Algorithm::new()), short.best_algorithm(0));
		assert_eq!(SCORE_BASE, short.score(0));
		assert_eq!(Some(&alg("U' R'")), short.best_algorithm(1));
		assert_eq!(SCORE_BASE - 2, short.score(1));

		let best = search.with_policy(Policy::BestSolves).run();
		assert_eq!(Some(&alg("U' R'")), best.best_algorithm(0));
		assert_eq!(2 * SCORE_BASE - 2, best.score(0));
	}

	#[test]
	fn extra_targets_are_dropped() {
		let outcome = DeepSearch::new(start(), Plan::new())
			.with_targets(vec![PieceGroup::EMPTY; MAX_TARGETS + 1])
			.run();
		assert_eq!(1, outcome.candidates.len());
		assert_eq!(u32::MAX, outcome.candidates[0].solved);
		assert!(outcome.best(MAX_TARGETS - 1).is_some());
		assert!(outcome.best(MAX_TARGETS).is_none());
	}

	#[test]
	fn exhaustion_scores_zero() {
		let plan = Plan::new().moves(MoveSet::face(Face::D), true);
		let outcome = DeepSearch::new(start(), plan)
			.with_targets(vec![PieceGroup::ALL])
			.with_cores(-1)
			.run();
		assert_eq!(0, outcome.score(0));
		assert!(outcome.best(0).is_none());
		assert!(outcome.best(7).is_none());
	}

	#[test]
	fn thread_count_does_not_change_the_outcome() {
		let lateral = MoveSet::ALL.without(MoveSet::face(Face::U));
		let plan = Plan::new().moves(MoveSet::ALL, true).moves(lateral, true).moves(lateral, true);
		let scramble = CubeState::from_algorithm(&alg("F R' D2"));
		let run = |cores: i32, split: bool| {
			DeepSearch::new(scramble, plan.clone())
				.with_targets(vec![PieceGroup::cross(Face::D), PieceGroup::cross(Face::U)])
				.with_extras(PieceGroup::pairs(Face::D).into_iter().map(|(_, g)| g).collect())
				.with_policy(Policy::BestSolves)
				.with_cores(cores)
				.with_split_two_levels(split)
				.run()
		};
		let reference = run(-1, false);
		assert!(!reference.candidates.is_empty());
		for (cores, split) in [(1, false), (2, false), (3, true), (0, true)] {
			let outcome = run(cores, split);
			assert_eq!(reference.candidates, outcome.candidates);
			assert_eq!(reference.best_algorithm(0), outcome.best_algorithm(0));
		}
	}

	#[test]
	fn checking_only_the_last_level_finds_the_same_algorithms() {
		let set = MoveSet::ALL | MoveSet::PASS;
		let scramble = CubeState::from_algorithm(&alg("L' B"));
		let targets = vec![PieceGroup::cross(Face::D), PieceGroup::layer(Face::R)];
		let run = |plan: Plan| {
			DeepSearch::new(scramble, plan)
				.with_targets(targets.clone())
				.with_cores(2)
				.run()
		};
		let every = run(Plan::new().moves(set, true).moves(set, true).moves(set, true));
		let last = run(Plan::new().moves(set, false).moves(set, false).moves(set, true));
		let algorithms = |outcome: &SearchOutcome| -> BTreeSet<(String, u32)> {
			outcome.candidates.iter().map(|c| (c.algorithm.to_string(), c.solved)).collect()
		};
		assert_eq!(algorithms(&every), algorithms(&last));
		for target in 0..targets.len() {
			assert_eq!(every.best_algorithm(target), last.best_algorithm(target));
			assert_eq!(every.score(target), last.score(target));
		}
	}

	#[test]
	fn speed_estimate() {
		let speed = measure_speed(-1);
		assert!(speed.nodes > 900_000);
		assert!(speed.nodes_per_second() > 0.0);
	}
}
