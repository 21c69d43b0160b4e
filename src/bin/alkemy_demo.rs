use alkemy::config::AlchemyConfig;
use alkemy::constants::ROOM_TEMPERATURE;
use alkemy::container::Container;
use alkemy::mixture::Mixture;
use alkemy::molecule::{Molecule, Phase};
use alkemy::network::PipeNetwork;
use alkemy::report::reaction_lines;
use alkemy::sim::sim_op::{HeatOp, ReportingOp, SimOpHandle};
use alkemy::sim::{SimProps, Simulation};
use alkemy::slag::Slag;
use alkemy::temp_utils::{near_zero, round_to};
use alkemy::thermal::ThermalBody;
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_CONFIG: &str = include_str!("../../configs/demo_config.txt");

#[derive(Parser, Debug)]
#[command(author, version, about = "Mixes two molecules in a flask and heats it past the first boiling point", long_about = None)]
struct Args {
    /// Configuration file (.txt or .json); the bundled demo config when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Flask capacity as a multiple of the poured liquid volume
    #[arg(long, default_value_t = 100.0)]
    capacity_factor: f64,

    /// Heating target in K; defaults to 1K above the lowest boiling point
    #[arg(long)]
    target: Option<f64>,

    /// Also run a stepped simulation: the flask fumes into a condenser canister
    #[arg(long)]
    steps: Option<i32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AlchemyConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => {
            let config = AlchemyConfig::parse(DEMO_CONFIG)?;
            check_round_trip(&config, DEMO_CONFIG);
            config
        }
    };

    println!("room temperature is {ROOM_TEMPERATURE}K");

    let water = Arc::new(build_water(&config)?);
    print_molecule_info("Water", &water);
    println!();
    let dd = Arc::new(build_dd(&config)?);
    print_molecule_info("DD", &dd);
    println!();

    // one ml of each at room temperature
    let liquid = Mixture::new(
        HashMap::from([
            (water.clone(), water.mass() / water.volume(ROOM_TEMPERATURE)),
            (dd.clone(), dd.mass() / dd.volume(ROOM_TEMPERATURE)),
        ]),
        Slag::EMPTY,
        0.0,
    )
    .at_temperature(ROOM_TEMPERATURE);
    println!(
        "Liquid temperature is {}K ({}J in {}g)",
        approx(liquid.temperature(), 2),
        approx(liquid.thermal_energy(), 2),
        approx(liquid.mass(), 6)
    );

    let mut flask = Container::flask(args.capacity_factor * liquid.volume(), None);
    println!(
        "\n{}",
        format!(
            "Adding {}ml ({}g) liquid to flask ...",
            approx(liquid.volume(), 6),
            approx(liquid.mass(), 6)
        )
        .bold()
    );
    let result = flask.add_liquid(liquid.clone());
    print_lines(&reaction_lines(&result));
    print_flask_state(&flask);

    let target = args
        .target
        .unwrap_or_else(|| 1.0 + water.boiling_temperature().min(dd.boiling_temperature()));
    println!("\n{}", format!("Heating flask to {}K ...", approx(target, 2)).bold());
    let result = flask.heat_to(target);
    print_lines(&reaction_lines(&result));
    print_flask_state(&flask);

    if let Some(steps) = args.steps {
        run_simulation(liquid, args.capacity_factor, target, steps)?;
    }
    Ok(())
}

fn build_water(config: &AlchemyConfig) -> anyhow::Result<Molecule> {
    let a = config.element("a").context("configuration has no element `a`")?;
    let c = config.element("C").context("configuration has no element `C`")?;
    let mut builder = config.molecule_builder();
    let h1 = builder.add_atom(a.clone());
    let center = builder.add_atom(c.clone());
    let h2 = builder.add_atom(a.clone());
    builder.bond(center, h1)?.bond(center, h2)?;
    Ok(builder.build())
}

fn build_dd(config: &AlchemyConfig) -> anyhow::Result<Molecule> {
    let d = config.element("D").context("configuration has no element `D`")?;
    let mut builder = config.molecule_builder();
    let first = builder.add_atom(d.clone());
    let second = builder.add_atom(d.clone());
    builder.bond(first, second)?;
    Ok(builder.build())
}

fn run_simulation(liquid: Mixture, capacity_factor: f64, target: f64, steps: i32) -> anyhow::Result<()> {
    let mut network = PipeNetwork::new();
    let capacity = capacity_factor * liquid.volume();
    network.add_container("still", Container::flask(capacity, Some(liquid)))?;
    network.add_container("condenser", Container::canister(capacity * 1000.0, None, None))?;
    network.connect("still", Phase::Gas, "condenser")?;

    let step_kelvin = ((target - ROOM_TEMPERATURE) / steps.max(1) as f64).abs().max(1.0);
    let mut sim = Simulation::new(SimProps {
        name: "still",
        network,
        ops: vec![
            SimOpHandle::new(Box::new(HeatOp::new("still", target).with_max_step(step_kelvin))),
            SimOpHandle::new(Box::new(ReportingOp::with_interval((steps / 10).max(1)))),
        ],
        sim_steps: steps,
        debug: true,
    });
    sim.run()?;

    println!("{}", "Reactions:".bold());
    for event in &sim.events {
        for line in &event.lines {
            println!("  step {:>4} {:<10} {}", event.step, event.container, line.yellow());
        }
    }
    Ok(())
}

fn print_molecule_info(name: &str, molecule: &Molecule) {
    let boiling = molecule.boiling_temperature();
    println!(
        "{} boils at {}K (bond strength {})",
        name.bold(),
        approx(boiling, 2),
        molecule.total_bond_strength()
    );
    let mut temperatures = [0.0, ROOM_TEMPERATURE, boiling - 1.0, boiling + 1.0];
    temperatures.sort_by(f64::total_cmp);
    for temperature in temperatures {
        println!(
            "{} at {}K: {}ml ({:?})",
            name,
            temperature,
            approx(molecule.volume(temperature), 6),
            molecule.phase(temperature)
        );
    }
}

fn print_flask_state(flask: &Container) {
    println!(
        "Flask is at {}K ({}J in {}g)",
        approx(flask.temperature(), 2),
        approx(flask.thermal_energy(), 2),
        approx(flask.mass(), 6)
    );
    let liquid_volume = flask.liquid().map_or(0.0, |m| m.volume());
    let slag_volume = flask.liquid().map_or(0.0, |m| m.slag().volume);
    let slag_share = if near_zero(liquid_volume) {
        f64::INFINITY
    } else {
        100.0 * slag_volume / liquid_volume
    };
    println!(
        "Flask contains {}ml liquid with {}ml slag ({}% of liquid)",
        approx(liquid_volume, 6),
        approx(slag_volume, 6),
        approx(slag_share, 4)
    );
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line.yellow());
    }
}

/// Rounded value, marked with `~` when rounding changed it.
fn approx(value: f64, places: i32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = round_to(value, places);
    if rounded != value {
        format!("~{rounded}")
    } else {
        format!("{rounded}")
    }
}

/// Prints the first line where the parsed bond forest differs from the source text.
fn check_round_trip(config: &AlchemyConfig, text: &str) {
    let Some(bonds_start) = text.lines().position(|line| line.trim_end() == "@bonds") else {
        return;
    };
    let source: Vec<&str> = text
        .lines()
        .skip(bonds_start + 1)
        .take_while(|line| !line.starts_with('@'))
        .filter(|line| !line.trim().is_empty())
        .collect();
    let rendered = config.bonds.render_tree();
    for (nr, (expected, actual)) in source.iter().zip(rendered.lines()).enumerate() {
        if expected.trim_end() != actual {
            println!("{}", rendered);
            println!(
                "{}",
                format!("Output differs from config in bond line {}: {}", nr + 1, expected).red()
            );
            return;
        }
    }
}
