use std::time::Instant;

use cfop_solver::{
	cfop::{cross_plan, f2l_plan, Cfop},
	config::{LastLayer, SolverConfig},
	face::Face,
	scramble,
	search::measure_speed,
};
use clap::Parser;
use env_logger::TimestampPrecision;
use log::LevelFilter;
use rand::rng;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
	/// Scramble to solve; a random one is generated when omitted
	#[arg(short, long)]
	scramble: Option<String>,

	/// Length of the random scramble
	#[arg(short = 'n', long, default_value_t = 25)]
	length: usize,

	/// Search threads: 0 for all of them, negative for none
	#[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
	cores: i32,

	/// Faces the cross may be built on, e.g. "DU"
	#[arg(long, default_value = "UDFBRL")]
	layers: String,

	/// Solve the last layer with one algorithm instead of OLL then PLL
	#[arg(long)]
	one_look: bool,

	/// Measure search speed and exit
	#[arg(long)]
	speed: bool,

	/// Increase log verbosity
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn main() {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(match cli.verbose {
			0 => LevelFilter::Warn,
			1 => LevelFilter::Info,
			2 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		})
		.format_timestamp(Some(TimestampPrecision::Millis))
		.init();

	if cli.speed {
		let speed = measure_speed(cli.cores);
		println!("{} nodes in {:.2?}: {:.0} nodes/s", speed.nodes, speed.elapsed, speed.nodes_per_second());
		let config = SolverConfig::default();
		println!("Cross on one layer: ~{:.2?}", speed.estimate(&cross_plan(Face::D, config.cross_depth)));
		println!("F2L pair: ~{:.2?}", speed.estimate(&f2l_plan(config.f2l_blocks)));
		return;
	}

	let Some(layers) = cli.layers.chars().map(Face::from_char).collect::<Option<Vec<Face>>>() else {
		eprintln!("Invalid cross layers: {}", cli.layers);
		std::process::exit(2);
	};
	let config = SolverConfig::default()
		.with_cores(cli.cores)
		.with_cross_layers(&layers)
		.with_last_layer(if cli.one_look { LastLayer::OneLook } else { LastLayer::TwoLook });

	let scramble = cli.scramble.unwrap_or_else(|| scramble::random(cli.length, &mut rng()).to_string());
	println!("Scramble: {scramble}");

	let mut cfop = match Cfop::new(&scramble, config) {
		Ok(cfop) => cfop,
		Err(err) => {
			eprintln!("{err}");
			std::process::exit(2);
		}
	};
	println!("{}", cfop.cube().to_net_string());

	let time_begin = Instant::now();
	let solved = cfop.solve();
	let elapsed = time_begin.elapsed();

	for report in cfop.reports() {
		println!("{report}");
	}
	println!();
	println!("{}", cfop.cube().to_net_string());
	let solution = cfop.solution();
	println!("Solution ({} moves): {solution}", cfop.movement_count());
	println!("{:.2?}", elapsed);
	if !solved {
		std::process::exit(1);
	}
}
