use std::time::Instant;

use osentropy_core::Strength;
use osentropy_tests::{all_passed, run_smoke_battery};

pub fn run(n_bytes: usize, strong: bool) {
    let strength = Strength::from(strong);
    println!("Collecting {n_bytes} {strength} bytes...");

    let t0 = Instant::now();
    let data = super::fill_or_exit(n_bytes, strength);
    let elapsed = t0.elapsed().as_secs_f64();
    let rate = if elapsed > 0.0 {
        n_bytes as f64 / elapsed / (1024.0 * 1024.0)
    } else {
        0.0
    };
    println!("  Time: {elapsed:.3}s ({rate:.1} MiB/s)");
    println!();

    let results = run_smoke_battery(&data);
    println!(
        "{:<20} {:>5} {:>12} {:>12}  Details",
        "Test", "Grade", "p-value", "Statistic"
    );
    println!("{}", "-".repeat(72));
    for r in &results {
        let p = r
            .p_value
            .map(|p| format!("{p:.6}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:>5} {:>12} {:>12.4}  {}",
            r.name, r.grade, p, r.statistic, r.details
        );
    }
    println!();

    if all_passed(&results) {
        println!("PASS");
    } else {
        println!("FAIL");
        std::process::exit(1);
    }
}
