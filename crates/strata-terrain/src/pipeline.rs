//! Parallel compilation of every registered planet.
//!
//! Planets share no mutable state, so each one is an independent job. Jobs
//! go through a bounded channel to a scoped worker pool and results are put
//! back in registration order.

use std::thread;
use std::time::Instant;

use crossbeam_channel::bounded;

use crate::error::TerrainError;
use crate::planet::{CompiledPlanet, compile_planet};
use crate::registry::PlanetRegistry;

/// The outcome of compiling one planet.
#[derive(Debug)]
pub struct PlanetOutcome {
    pub id: String,
    pub result: Result<CompiledPlanet, TerrainError>,
    /// Wall time spent compiling, in microseconds.
    pub compile_time_us: u64,
}

/// Worker count for a requested `threads` value; `0` means one per CPU.
pub fn worker_count(threads: usize, jobs: usize) -> usize {
    let wanted = if threads == 0 { num_cpus::get() } else { threads };
    wanted.clamp(1, jobs.max(1))
}

fn compile_timed(registry: &PlanetRegistry, index: usize) -> PlanetOutcome {
    let def = registry.get(index);
    let start = Instant::now();
    let result = compile_planet(def);
    if let Err(err) = &result {
        tracing::error!(planet = %def.id, %err, "planet compilation failed");
    }
    PlanetOutcome {
        id: def.id.clone(),
        result,
        compile_time_us: start.elapsed().as_micros() as u64,
    }
}

/// Compiles every planet in `registry` on up to `threads` workers.
///
/// Returns one outcome per planet, in registration order. A failing planet
/// does not affect the others.
pub fn compile_all(registry: &PlanetRegistry, threads: usize) -> Vec<PlanetOutcome> {
    let jobs = registry.len();
    let workers = worker_count(threads, jobs);
    tracing::info!(planets = jobs, workers, "compiling planets");

    let (task_sender, task_receiver) = bounded::<usize>(jobs.max(1));
    let (result_sender, result_receiver) = bounded::<(usize, PlanetOutcome)>(jobs.max(1));
    for index in 0..jobs {
        // Capacity equals the job count, so this never blocks.
        let _ = task_sender.send(index);
    }
    drop(task_sender);

    let mut slots: Vec<Option<PlanetOutcome>> = (0..jobs).map(|_| None).collect();
    thread::scope(|scope| {
        for worker in 0..workers {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let spawned = thread::Builder::new()
                .name(format!("planet-compile-{worker}"))
                .spawn_scoped(scope, move || {
                    while let Ok(index) = receiver.recv() {
                        let _ = sender.send((index, compile_timed(registry, index)));
                    }
                });
            if let Err(err) = spawned {
                tracing::warn!(worker, %err, "failed to spawn compile worker");
            }
        }
        drop(result_sender);
        for (index, outcome) in result_receiver.iter() {
            slots[index] = Some(outcome);
        }
    });

    // Jobs left behind when no worker could be spawned run here.
    while let Ok(index) = task_receiver.try_recv() {
        slots[index] = Some(compile_timed(registry, index));
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.unwrap_or_else(|| compile_timed(registry, index)))
        .collect()
}
