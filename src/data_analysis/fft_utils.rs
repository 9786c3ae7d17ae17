// src/data_analysis/fft_utils.rs

use log::warn;
use ndarray::Array1;
use realfft::num_complex::Complex64;
use realfft::RealFftPlanner;

/// Computes the Fast Fourier Transform (FFT) of a real-valued signal.
/// Returns the complex one-sided spectrum (`n / 2 + 1` bins). Handles empty input.
pub fn fft_forward(data: &Array1<f64>) -> Array1<Complex64> {
    if data.is_empty() {
        return Array1::zeros(0);
    }
    let n = data.len();
    let mut input = data.to_vec();
    let planner = RealFftPlanner::<f64>::new().plan_fft_forward(n);
    let mut output = planner.make_output_vec();
    if planner.process(&mut input, &mut output).is_err() {
        warn!("FFT forward processing failed.");
        return Array1::zeros(n / 2 + 1);
    }
    Array1::from(output)
}

/// Calculates the frequencies for the real FFT output.
pub fn fft_rfftfreq(n: usize, sample_rate: f64) -> Array1<f64> {
    if n == 0 || sample_rate <= 0.0 {
        return Array1::zeros(0);
    }
    let num_freqs = n / 2 + 1;
    Array1::from_iter((0..num_freqs).map(|i| i as f64 * sample_rate / n as f64))
}
