#[cfg(feature = "bench")]
use citynet::{Bounds, GenConfig, Simulation};
#[cfg(feature = "bench")]
use std::time::Instant;

#[cfg(not(feature = "bench"))]
fn main() {
    panic!("resolve_bench requires --features bench");
}

#[cfg(feature = "bench")]
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut size = 1200.0f64;
    let mut hubs = 6u32;
    let mut repeats = 3usize;
    let mut seed = 1u64;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--size=") {
            if let Ok(v) = val.parse() {
                size = v;
            }
        } else if let Some(val) = a.strip_prefix("--hubs=") {
            if let Ok(v) = val.parse() {
                hubs = v;
            }
        } else if let Some(val) = a.strip_prefix("--repeats=") {
            if let Ok(v) = val.parse() {
                repeats = v;
            }
        } else if let Some(val) = a.strip_prefix("--seed=") {
            if let Ok(v) = val.parse() {
                seed = v;
            }
        }
    }

    let cfg = GenConfig { seed, hub_count: hubs, ..GenConfig::default() };
    let mut times = Vec::with_capacity(repeats);
    let mut last = (0usize, 0usize, 0usize, 0usize);
    for _ in 0..repeats.max(1) {
        let mut sim = match Simulation::new(cfg.clone(), Bounds::from_size(size, size)) {
            Ok(sim) => sim,
            Err(e) => {
                eprintln!("invalid setup: {e}");
                return;
            }
        };
        let t0 = Instant::now();
        let ticks = sim.resolve();
        times.push(t0.elapsed().as_secs_f64() * 1000.0);
        last = (ticks, sim.segments().len(), sim.blocks().len(), sim.lots().len());
    }
    let avg = times.iter().sum::<f64>() / (times.len() as f64);
    let best = times.iter().copied().fold(f64::INFINITY, f64::min);

    println!(
        "size={} hubs={} ticks={} segments={} blocks={} lots={} avg_ms={:.3} best_ms={:.3}",
        size, hubs, last.0, last.1, last.2, last.3, avg, best
    );
}
