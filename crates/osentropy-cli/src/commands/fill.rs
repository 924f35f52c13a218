use std::io::Write;

use osentropy_core::Strength;

pub fn run(n_bytes: usize, strong: bool, format: &str) {
    let strength = Strength::from(strong);
    let data = super::fill_or_exit(n_bytes, strength);
    log::debug!("filled {n_bytes} bytes ({strength})");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let write_result = match format {
        "hex" => writeln!(out, "{}", super::to_hex(&data)),
        _ => out.write_all(&data),
    };

    if write_result.and_then(|_| out.flush()).is_err() {
        // Broken pipe
        std::process::exit(1);
    }
}
