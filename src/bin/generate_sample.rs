//! Writes `sample_data.csv`: a small employee table with a few missing cells,
//! handy for trying every analysis in the explorer.

use anyhow::{Context, Result};

const ROWS: usize = 200;
const OUTPUT_PATH: &str = "sample_data.csv";

/// (department, base salary, salary per year of experience)
const DEPARTMENTS: [(&str, f64, f64); 4] = [
    ("Engineering", 72_000.0, 3_100.0),
    ("Sales", 48_000.0, 2_400.0),
    ("Marketing", 52_000.0, 2_000.0),
    ("Support", 39_000.0, 1_300.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Empty string stands for a missing cell.
fn maybe(rng: &mut SimpleRng, p_missing: f64, value: String) -> String {
    if rng.chance(p_missing) {
        String::new()
    } else {
        value
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(OUTPUT_PATH)
        .with_context(|| format!("failed to create {OUTPUT_PATH}"))?;

    writer.write_record(["EmployeeID", "Department", "Age", "Salary", "Experience", "Remote"])?;

    for id in 1..=ROWS {
        let (department, base, per_year) = DEPARTMENTS[rng.below(DEPARTMENTS.len())];
        let age = rng.gauss(38.0, 9.0).clamp(21.0, 65.0).round() as i64;
        let experience = (rng.next_f64() * (age - 20) as f64).round() as i64;
        let salary = (base + per_year * experience as f64 + rng.gauss(0.0, 6_000.0)).max(25_000.0);
        let remote = if rng.chance(0.35) { "True" } else { "False" };

        let record = [
            id.to_string(),
            department.to_string(),
            maybe(&mut rng, 0.03, age.to_string()),
            maybe(&mut rng, 0.05, format!("{salary:.2}")),
            experience.to_string(),
            maybe(&mut rng, 0.04, remote.to_string()),
        ];
        writer.write_record(&record)?;
    }

    writer.flush().context("failed to flush CSV writer")?;
    println!("Wrote {ROWS} employees to {OUTPUT_PATH}");
    Ok(())
}
