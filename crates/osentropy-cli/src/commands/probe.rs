use osentropy_core::{OsEntropy, Strength};

pub fn run(n_bytes: usize, weak_only: bool) {
    let chain = OsEntropy::platform();
    if chain.channel_count() == 0 {
        eprintln!("No OS randomness channel on this platform.");
        std::process::exit(1);
    }

    println!("Platform chain (highest priority first):");
    for (i, channel) in chain.channels().enumerate() {
        println!("  {}. {} ({})", i + 1, channel.name(), channel.kind());
    }
    println!();

    let strengths: &[Strength] = if weak_only {
        &[Strength::Weak]
    } else {
        &[Strength::Weak, Strength::Strong]
    };
    let probes = chain.probe(n_bytes, strengths);

    println!(
        "{:<18} {:<9} {:<7} {:>4} {:>9}  Reason",
        "Channel", "Kind", "Request", "OK", "Time"
    );
    println!("{}", "-".repeat(68));
    for p in &probes {
        let ok = if p.ok { "✓" } else { "✗" };
        println!(
            "{:<18} {:<9} {:<7} {:>4} {:>8.4}s  {}",
            p.name,
            p.kind.to_string(),
            p.strength.to_string(),
            ok,
            p.time,
            p.error.as_deref().unwrap_or("")
        );
    }

    let usable = strengths
        .iter()
        .all(|s| probes.iter().any(|p| p.strength == *s && p.ok));
    println!();
    if usable {
        println!("Every requested strength is served by at least one channel.");
    } else {
        println!("Some strength has no working channel; requests will fail.");
        std::process::exit(1);
    }
}
