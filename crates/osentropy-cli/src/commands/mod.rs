pub mod check;
pub mod fill;
pub mod probe;

use osentropy_core::Strength;

/// Fill `n_bytes` from the platform chain, or report why not and exit 1.
pub fn fill_or_exit(n_bytes: usize, strength: Strength) -> Vec<u8> {
    let mut buf = vec![0u8; n_bytes];
    if let Err(e) = osentropy_core::fill(&mut buf, strength) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    buf
}

/// Lowercase hex, no separators.
pub fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}
