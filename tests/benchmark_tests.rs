//! Performance checks for the per-tick simulation work

use server::registry::Registry;
use server::simulation::Simulation;
use shared::{default_objectives, Position};
use std::time::Instant;

/// Benchmarks objective membership queries over a busy registry
#[test]
fn benchmark_membership_queries() {
    let objectives = default_objectives();
    let mut registry = Registry::new();
    for id in 0..100u32 {
        let spread = id as f32 / 100.0;
        registry.register(id, Position::new(spread, 1.0 - spread));
    }

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        for objective in &objectives {
            let _ = registry.inside(objective);
        }
    }

    let duration = start.elapsed();
    println!(
        "Membership queries: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Membership tests are O(participants × objectives) per tick and must
    // stay far below the tick period
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks full ticks with an active fusion round and a crowded field
#[test]
fn benchmark_fusion_ticks() {
    let mut sim = Simulation::with_seed(default_objectives(), 99);
    for id in 1..=20u32 {
        sim.connect(id);
    }
    // Park two participants inside the yellow objective to start a round
    sim.apply_position_update(1, 0.25, 0.5);
    sim.apply_position_update(2, 0.26, 0.5);
    sim.advance(0);
    sim.advance(5000);
    assert!(sim.field.is_active());

    let iterations = 500u64;
    let start = Instant::now();

    for step in 0..iterations {
        // Stay within the fusion window so the capture scan always runs
        sim.advance(5001 + step % 100);
    }

    let duration = start.elapsed();
    println!(
        "Fusion ticks: {} iterations in {:?} ({:.2} µs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // 500 ticks of drift + capture scanning should finish well under the
    // real time those ticks would occupy (50 s at 100 ms cadence)
    assert!(duration.as_millis() < 2000);
}
