use crate::container::ContainerSnapshot;
use crate::network::{NetworkError, NetworkReaction, PipeNetwork};
use crate::report::reaction_lines;
use crate::sim::sim_op::{SimOp, SimOpHandle};
use log::debug;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation `{0}` has already run")]
    AlreadyRun(String),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

#[derive(Debug, Clone)]
pub struct OpTiming {
    pub op_name: String,
    pub init_time: Duration,
    pub total_update_time: Duration,
    pub update_call_count: u32,
    pub after_time: Duration,
}

impl OpTiming {
    pub fn new(op_name: String) -> Self {
        Self {
            op_name,
            init_time: Duration::ZERO,
            total_update_time: Duration::ZERO,
            update_call_count: 0,
            after_time: Duration::ZERO,
        }
    }

    pub fn avg_update_time(&self) -> Duration {
        if self.update_call_count > 0 {
            self.total_update_time / self.update_call_count
        } else {
            Duration::ZERO
        }
    }

    pub fn total_time(&self) -> Duration {
        self.init_time + self.total_update_time + self.after_time
    }
}

/// Report lines of one reaction, tagged with where and when it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEvent {
    pub step: i32,
    pub container: String,
    pub hops: usize,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepSnapshot {
    pub step: i32,
    pub container: String,
    pub snapshot: ContainerSnapshot,
}

pub struct Simulation {
    pub network: PipeNetwork,
    pub ops: Vec<Box<dyn SimOp>>,
    pub step: i32,
    pub sim_steps: i32,
    pub name: String,
    pub debug: bool,
    pub events: Vec<StepEvent>,
    pub snapshots: Vec<StepSnapshot>,
    pub op_timings: Vec<OpTiming>,
}

pub struct SimProps {
    pub name: &'static str,
    pub network: PipeNetwork,
    pub ops: Vec<SimOpHandle>,
    pub sim_steps: i32,
    pub debug: bool,
}

impl Simulation {
    pub fn new(props: SimProps) -> Simulation {
        let ops: Vec<Box<dyn SimOp>> = props.ops.into_iter().map(|handle| handle.op).collect();
        let op_timings = ops.iter().map(|op| OpTiming::new(op.name().to_string())).collect();
        Simulation {
            network: props.network,
            ops,
            step: -1,
            sim_steps: props.sim_steps,
            name: props.name.to_string(),
            debug: props.debug,
            events: Vec::new(),
            snapshots: Vec::new(),
            op_timings,
        }
    }

    /// Get the current simulation step number
    pub fn current_step(&self) -> i32 {
        self.step
    }

    /// Keeps the report lines of every reaction an op caused this step.
    pub fn record(&mut self, reactions: Vec<NetworkReaction>) {
        for reaction in reactions {
            let lines = reaction_lines(&reaction.result);
            debug!(
                "step {} `{}` (hop {}): {}",
                self.step,
                reaction.container,
                reaction.hops,
                lines.join(" ")
            );
            self.events.push(StepEvent {
                step: self.step,
                container: reaction.container,
                hops: reaction.hops,
                lines,
            });
        }
    }

    /// Advances one step running only `ops`; init and after phases are skipped.
    pub fn step_with_ops(&mut self, ops: &mut [&mut dyn SimOp]) -> Result<(), SimError> {
        self.step += 1;
        for op in ops {
            op.update_sim(self)?;
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), SimError> {
        if self.step > -1 {
            return Err(SimError::AlreadyRun(self.name.clone()));
        }
        self.step = 0;
        self.simulate_init()?;
        while self.step < self.sim_steps {
            self.step += 1;
            self.simulate_step()?;
        }
        self.simulate_end()?;
        if self.debug {
            self.print_timing_report();
        }
        Ok(())
    }

    fn simulate_init(&mut self) -> Result<(), SimError> {
        let mut ops = std::mem::take(&mut self.ops);
        let result = ops.iter_mut().enumerate().try_for_each(|(i, op)| {
            let start = Instant::now();
            let result = op.init_sim(self);
            self.op_timings[i].init_time = start.elapsed();
            result
        });
        self.ops = ops;
        result
    }

    fn simulate_end(&mut self) -> Result<(), SimError> {
        let mut ops = std::mem::take(&mut self.ops);
        let result = ops.iter_mut().enumerate().try_for_each(|(i, op)| {
            let start = Instant::now();
            let result = op.after_sim(self);
            self.op_timings[i].after_time = start.elapsed();
            result
        });
        self.ops = ops;
        result
    }

    fn simulate_step(&mut self) -> Result<(), SimError> {
        let mut ops = std::mem::take(&mut self.ops);
        let result = ops.iter_mut().enumerate().try_for_each(|(i, op)| {
            let start = Instant::now();
            let result = op.update_sim(self);
            self.op_timings[i].total_update_time += start.elapsed();
            self.op_timings[i].update_call_count += 1;
            result
        });
        self.ops = ops;
        result
    }

    pub fn print_timing_report(&self) {
        println!("\n📊 === SIMULATION TIMING REPORT: {} ===", self.name);
        println!("🔄 Total steps: {}", self.sim_steps);
        println!("⚗️  Reactions recorded: {}", self.events.len());
        println!();

        let mut total_time = Duration::ZERO;
        for timing in &self.op_timings {
            total_time += timing.total_time();
        }

        println!("📈 PER-OPERATION BREAKDOWN:");
        for timing in &self.op_timings {
            let total_op_time = timing.total_time();
            let percentage = if total_time.as_micros() > 0 {
                (total_op_time.as_micros() as f64 / total_time.as_micros() as f64) * 100.0
            } else {
                0.0
            };

            println!(
                "  🔧 {:<20} | Total: {:>8.3}ms | Avg/step: {:>8.3}ms | Init: {:>6.3}ms | After: {:>6.3}ms | Share: {:>5.1}%",
                timing.op_name,
                total_op_time.as_secs_f64() * 1000.0,
                timing.avg_update_time().as_secs_f64() * 1000.0,
                timing.init_time.as_secs_f64() * 1000.0,
                timing.after_time.as_secs_f64() * 1000.0,
                percentage
            );
        }

        println!();
        println!(
            "⏱️  TOTAL SIMULATION TIME: {:.3}ms",
            total_time.as_secs_f64() * 1000.0
        );
        if self.sim_steps > 0 {
            println!(
                "🚀 Average time per step: {:.3}ms",
                total_time.as_secs_f64() * 1000.0 / self.sim_steps as f64
            );
        }
        println!("📊 === END TIMING REPORT ===\n");
    }
}
