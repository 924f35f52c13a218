//! Statistical smoke battery for OS randomness output.
//!
//! These are not a certification suite. They catch the failures that matter
//! for an OS entropy channel: a device replaced by a file of zeros, a stuck
//! byte, a grossly biased generator. Each test returns a [`TestResult`] with
//! a p-value (where applicable), a pass/fail determination, and a letter
//! grade (A through F).
//!
//! The pass threshold is deliberately loose ([`SMOKE_THRESHOLD`]) so that a
//! healthy generator essentially never trips it by chance.

use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::erf::erfc;

/// p-value below which a smoke test fails.
pub const SMOKE_THRESHOLD: f64 = 1e-6;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single smoke test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
    pub grade: char,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= [`SMOKE_THRESHOLD`]
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= SMOKE_THRESHOLD => 'D',
            _ => 'F',
        }
    }

    /// Determine pass/fail from p-value against a threshold.
    pub fn pass_from_p(p: Option<f64>, threshold: f64) -> bool {
        match p {
            Some(p) => p >= threshold,
            None => false,
        }
    }

    fn from_p(name: &str, p: f64, statistic: f64, details: String) -> Self {
        TestResult {
            name: name.to_string(),
            passed: Self::pass_from_p(Some(p), SMOKE_THRESHOLD),
            p_value: Some(p),
            statistic,
            details,
            grade: Self::grade_from_p(Some(p)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn count_ones(data: &[u8]) -> u64 {
    data.iter().map(|b| b.count_ones() as u64).sum()
}

fn byte_histogram(data: &[u8]) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &b in data {
        hist[b as usize] += 1;
    }
    hist
}

/// Return a failing `TestResult` when data is too short.
fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed: false,
        p_value: None,
        statistic: 0.0,
        details: format!("Insufficient data: need {needed}, got {got}"),
        grade: 'F',
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

/// Constant output -- fails if every byte has the same value.
///
/// Catches a channel that returned a zero-filled or untouched buffer.
pub fn constant_output(data: &[u8]) -> TestResult {
    let name = "Constant Output";
    if data.len() < 2 {
        return insufficient(name, 2, data.len());
    }
    let first = data[0];
    let same = data.iter().take_while(|&&b| b == first).count();
    let constant = same == data.len();
    TestResult {
        name: name.to_string(),
        passed: !constant,
        p_value: None,
        statistic: same as f64,
        details: if constant {
            format!("all {} bytes are 0x{first:02x}", data.len())
        } else {
            format!("first change after {same} bytes")
        },
        grade: if constant { 'F' } else { 'A' },
    }
}

/// Byte frequency -- chi-squared on byte value distribution (256 bins).
pub fn byte_frequency(data: &[u8]) -> TestResult {
    let name = "Byte Frequency";
    let n = data.len();
    if n < 256 * 5 {
        return insufficient(name, 256 * 5, n);
    }
    let hist = byte_histogram(data);
    let expected = n as f64 / 256.0;
    let chi2: f64 = hist
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();
    let p = match ChiSquared::new(255.0) {
        Ok(dist) => dist.sf(chi2),
        Err(_) => 0.0,
    };
    TestResult::from_p(
        name,
        p,
        chi2,
        format!("n={n}, expected_per_bin={expected:.1}"),
    )
}

/// Monobit frequency -- proportion of 1 bits should be ~50%.
pub fn monobit_frequency(data: &[u8]) -> TestResult {
    let name = "Monobit Frequency";
    let n = data.len() as u64 * 8;
    if n < 100 {
        return insufficient(name, 100, n as usize);
    }
    let ones = count_ones(data);
    let s = 2 * ones as i64 - n as i64;
    let s_obs = (s as f64).abs() / (n as f64).sqrt();
    let p = erfc(s_obs / 2.0_f64.sqrt());
    TestResult::from_p(name, p, s_obs, format!("S={s}, n={n}"))
}

/// Runs test -- number of uninterrupted runs of 0s or 1s.
pub fn runs_test(data: &[u8]) -> TestResult {
    let name = "Runs Test";
    let n = data.len() * 8;
    if n < 100 {
        return insufficient(name, 100, n);
    }
    let prop = count_ones(data) as f64 / n as f64;
    if (prop - 0.5).abs() >= 2.0 / (n as f64).sqrt() {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: Some(0.0),
            statistic: 0.0,
            details: format!("Pre-test failed: proportion={prop:.4}"),
            grade: 'F',
        };
    }

    let mut runs: u64 = 1;
    let mut prev = data[0] >> 7;
    for &byte in data {
        for shift in (0..8).rev() {
            let bit = (byte >> shift) & 1;
            if bit != prev {
                runs += 1;
                prev = bit;
            }
        }
    }

    let expected = 2.0 * n as f64 * prop * (1.0 - prop) + 1.0;
    let std = 2.0 * (2.0 * n as f64).sqrt() * prop * (1.0 - prop);
    let z = (runs as f64 - expected).abs() / std;
    let p = erfc(z / 2.0_f64.sqrt());
    TestResult::from_p(
        name,
        p,
        z,
        format!("runs={runs}, expected={expected:.0}"),
    )
}

/// Shannon entropy -- bits per byte (max 8.0).
pub fn shannon_entropy(data: &[u8]) -> TestResult {
    let name = "Shannon Entropy";
    let n = data.len();
    if n < 4096 {
        return insufficient(name, 4096, n);
    }
    let hist = byte_histogram(data);
    let mut h = 0.0;
    for &c in &hist {
        if c > 0 {
            let p = c as f64 / n as f64;
            h -= p * p.log2();
        }
    }
    let ratio = h / 8.0;
    let grade = if ratio > 0.99 {
        'A'
    } else if ratio > 0.95 {
        'B'
    } else if ratio > 0.85 {
        'C'
    } else if ratio > 0.5 {
        'D'
    } else {
        'F'
    };
    TestResult {
        name: name.to_string(),
        passed: ratio > 0.95,
        p_value: None,
        statistic: h,
        details: format!("{h:.4} / 8.0 bits ({:.1}%)", ratio * 100.0),
        grade,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Battery
// ═══════════════════════════════════════════════════════════════════════════════

/// Run the smoke battery on a byte slice.
pub fn run_smoke_battery(data: &[u8]) -> Vec<TestResult> {
    let tests: [fn(&[u8]) -> TestResult; 5] = [
        constant_output,
        byte_frequency,
        monobit_frequency,
        runs_test,
        shannon_entropy,
    ];
    tests.iter().map(|test_fn| test_fn(data)).collect()
}

/// Whether every result in the battery passed.
pub fn all_passed(results: &[TestResult]) -> bool {
    !results.is_empty() && results.iter().all(|r| r.passed)
}
