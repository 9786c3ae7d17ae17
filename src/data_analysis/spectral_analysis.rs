// src/data_analysis/spectral_analysis.rs

use ndarray::Array1;

use crate::data_analysis::fft_utils;
use crate::error::AnalysisError;
use crate::types::AnalysisResult;

/// Configuration for Welch's method spectral analysis
#[derive(Debug, Clone)]
pub struct WelchConfig {
    /// Segment length in samples; clamped to the signal length
    pub segment_length: usize,
    /// Overlap fraction (default: 50%)
    pub overlap_percent: f64,
}

impl WelchConfig {
    pub fn with_segment_seconds(seconds: f64, sample_rate: f64) -> Self {
        Self {
            segment_length: (seconds * sample_rate) as usize,
            overlap_percent: 0.5,
        }
    }
}

/// Periodic Hann window, as used for spectral estimation.
fn hann_window(length: usize) -> Array1<f64> {
    Array1::from_iter(
        (0..length)
            .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / length as f64).cos()),
    )
}

/// Computes the one-sided Power Spectral Density using Welch's method
///
/// Each segment is mean-detrended and Hann-windowed; powers are density-scaled
/// (units²/Hz) and averaged across segments. Returns (frequency, psd) pairs.
pub fn welch_psd(
    signal: &[f64],
    sample_rate: f64,
    config: &WelchConfig,
) -> AnalysisResult<Vec<(f64, f64)>> {
    if signal.is_empty() {
        return Err(AnalysisError::EmptySignal("welch_psd input".to_string()));
    }

    let segment_length = config.segment_length.clamp(1, signal.len());
    let overlap = (config.overlap_percent * segment_length as f64) as usize;
    let hop_size = (segment_length - overlap.min(segment_length - 1)).max(1);

    let window = hann_window(segment_length);
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let num_freqs = segment_length / 2 + 1;

    let mut psd_sum = vec![0.0f64; num_freqs];
    let mut segment_count = 0usize;
    let mut start = 0;
    while start + segment_length <= signal.len() {
        let segment = &signal[start..start + segment_length];
        let mean = segment.iter().sum::<f64>() / segment_length as f64;
        let windowed = Array1::from_iter(segment.iter().zip(window.iter()).map(|(x, w)| (x - mean) * w));

        let spectrum = fft_utils::fft_forward(&windowed);
        for (i, bin) in spectrum.iter().enumerate().take(num_freqs) {
            let mut psd = bin.norm_sqr() / (sample_rate * window_power);
            // One-sided spectrum: double power except DC and Nyquist
            let is_nyquist = segment_length % 2 == 0 && i == num_freqs - 1;
            if i > 0 && !is_nyquist {
                psd *= 2.0;
            }
            psd_sum[i] += psd;
        }
        segment_count += 1;
        start += hop_size;
    }

    let frequencies = fft_utils::fft_rfftfreq(segment_length, sample_rate);
    Ok(frequencies
        .iter()
        .zip(psd_sum.iter())
        .map(|(&freq, &psd)| (freq, psd / segment_count.max(1) as f64))
        .collect())
}

/// Integrates the PSD over `[low_hz, high_hz)` with the trapezoidal rule.
pub fn band_power(psd: &[(f64, f64)], low_hz: f64, high_hz: f64) -> f64 {
    let band: Vec<(f64, f64)> = psd
        .iter()
        .copied()
        .filter(|&(f, _)| f >= low_hz && f < high_hz)
        .collect();
    band.windows(2)
        .map(|pair| (pair[1].0 - pair[0].0) * (pair[0].1 + pair[1].1) * 0.5)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, fs: f64, seconds: f64) -> Vec<f64> {
        (0..(fs * seconds) as usize)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_welch_total_power_matches_variance() {
        let fs = 500.0;
        let x = sine(10.0, fs, 10.0);
        let psd = welch_psd(&x, fs, &WelchConfig::with_segment_seconds(1024.0, fs)).unwrap();
        let total = band_power(&psd, 0.0, fs / 2.0);
        // Hann window spreads the line over neighbouring bins; the integral keeps the variance.
        assert!((total - 0.5).abs() < 0.05, "total power {total}");
        let in_band = band_power(&psd, 5.0, 15.0);
        assert!(in_band / total > 0.95);
    }

    #[test]
    fn test_welch_segments_average() {
        let fs = 100.0;
        let x = sine(20.0, fs, 20.0);
        let psd = welch_psd(&x, fs, &WelchConfig::with_segment_seconds(2.0, fs)).unwrap();
        assert_eq!(psd.len(), 101);
        let peak = psd
            .iter()
            .cloned()
            .fold((0.0, f64::NEG_INFINITY), |best, p| if p.1 > best.1 { p } else { best });
        assert!((peak.0 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_signal() {
        assert!(welch_psd(&[], 100.0, &WelchConfig::with_segment_seconds(1.0, 100.0)).is_err());
    }

    #[test]
    fn test_band_power_trapezoid() {
        let psd = vec![(0.0, 1.0), (1.0, 1.0), (2.0, 3.0), (3.0, 3.0)];
        assert!((band_power(&psd, 0.0, 2.5) - 3.0).abs() < 1e-12);
        assert_eq!(band_power(&psd, 10.0, 20.0), 0.0);
    }
}
