use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use simdfold::parallel::{
    par_simd_transform, parallel_min_max_with, parallel_sum_with, ForkJoin, RayonPool,
};
use simdfold::simd::{lanes, VECTOR_BYTES};
use simdfold::traverse::{simd_map_reduce, Scale, SumMapper};
use simdfold::Grain;

const DEFAULT_LEN: usize = 1 << 24;

fn main() -> simdfold::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("simdfold=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // usage: simdfold [LEN] [THREADS]
    let mut args = std::env::args().skip(1);
    let len = parse_arg(args.next(), DEFAULT_LEN);
    let threads = parse_arg(args.next(), 0);

    let pool = RayonPool::new(threads)?;
    info!(
        len,
        threads = pool.num_threads(),
        vector_bytes = VECTOR_BYTES,
        f32_lanes = lanes::<f32>(),
        "starting"
    );

    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<f32> = (0..len).map(|_| rng.random_range(-1.0..1.0)).collect();

    let start = Instant::now();
    let scalar: f32 = data.iter().sum();
    info!(elapsed = ?start.elapsed(), sum = scalar, "scalar sum");

    let start = Instant::now();
    let simd = simd_map_reduce(&data, 0.0, SumMapper);
    info!(elapsed = ?start.elapsed(), sum = simd, "simd sum");

    let start = Instant::now();
    let parallel = parallel_sum_with(&data, Grain::Auto, &pool);
    info!(elapsed = ?start.elapsed(), sum = parallel, "parallel sum");

    if let Some((min, max)) = parallel_min_max_with(&data, Grain::Auto, &pool) {
        info!(min, max, "range");
    }

    let mut scaled = vec![0.0f32; len];
    let start = Instant::now();
    par_simd_transform(&data, &mut scaled, Scale(0.5), Grain::Auto, &pool);
    info!(elapsed = ?start.elapsed(), "parallel scale");

    Ok(())
}

fn parse_arg(arg: Option<String>, default: usize) -> usize {
    match arg.map(|a| a.parse::<usize>()) {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            warn!(%err, default, "ignoring invalid argument");
            default
        }
        None => default,
    }
}
