use rand::Rng;
use readings::Readings;

/// Plausible readings that land on both sides of every threshold.
///
/// - Temperature 0-30 °C, one decimal
/// - Weight 50-1200 g, whole grams
/// - Sealed four times out of five
pub fn simulate_readings<R: Rng + ?Sized>(rng: &mut R) -> Readings {
    let temperature = (rng.gen_range(0.0..30.0_f64) * 10.0).round() / 10.0;
    let weight = rng.gen_range(50.0..1200.0_f64).round();

    Readings {
        temperature,
        weight,
        is_sealed: rng.gen_bool(0.8),
    }
}
