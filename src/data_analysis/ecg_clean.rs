// src/data_analysis/ecg_clean.rs

use ndarray::Array1;
use std::f64::consts::PI;

use crate::constants::{ECG_CLEAN_HIGH_HZ, ECG_CLEAN_LOW_HZ, ECG_CLEAN_ORDER_FACTOR, FILTFILT_PAD_FACTOR};

/// Normalized sinc: sin(pi x) / (pi x)
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Symmetric Hamming window
fn hamming(length: usize) -> Vec<f64> {
    if length == 1 {
        return vec![1.0];
    }
    (0..length)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (length - 1) as f64).cos())
        .collect()
}

/// Windowed-sinc band-pass FIR design (Hamming window), scaled to unit gain at
/// the centre of the pass band.
pub fn firwin_bandpass(numtaps: usize, low_hz: f64, high_hz: f64, sample_rate: f64) -> Vec<f64> {
    let nyquist = sample_rate / 2.0;
    let left = low_hz / nyquist;
    let right = high_hz / nyquist;
    let alpha = 0.5 * (numtaps as f64 - 1.0);
    let window = hamming(numtaps);

    let mut taps: Vec<f64> = (0..numtaps)
        .map(|n| {
            let m = n as f64 - alpha;
            (right * sinc(right * m) - left * sinc(left * m)) * window[n]
        })
        .collect();

    let centre = 0.5 * (left + right);
    let gain: f64 = taps
        .iter()
        .enumerate()
        .map(|(n, h)| h * (PI * (n as f64 - alpha) * centre).cos())
        .sum();
    if gain.abs() > f64::EPSILON {
        taps.iter_mut().for_each(|h| *h /= gain);
    }
    taps
}

/// Causal FIR filtering. Samples before the start are taken equal to the first
/// sample, which is the steady-state initial condition for an FIR filter.
pub fn fir_filter(taps: &[f64], signal: &[f64]) -> Vec<f64> {
    let Some(&first) = signal.first() else {
        return Vec::new();
    };
    (0..signal.len())
        .map(|n| {
            taps.iter()
                .enumerate()
                .map(|(k, b)| b * if k <= n { signal[n - k] } else { first })
                .sum()
        })
        .collect()
}

/// Zero-phase filtering: odd extension at both ends, forward pass, backward pass.
pub fn filtfilt(taps: &[f64], signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n < 2 {
        return signal.to_vec();
    }
    let padlen = (FILTFILT_PAD_FACTOR * taps.len()).min(n - 1);
    let (x0, xn) = (signal[0], signal[n - 1]);

    let mut extended = Vec::with_capacity(n + 2 * padlen);
    extended.extend((1..=padlen).rev().map(|i| 2.0 * x0 - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((1..=padlen).map(|i| 2.0 * xn - signal[n - 1 - i]));

    let mut forward = fir_filter(taps, &extended);
    forward.reverse();
    let mut backward = fir_filter(taps, &forward);
    backward.reverse();
    backward[padlen..padlen + n].to_vec()
}

/// Number of taps of the cleaning filter: `int(1.5 * fs)`, forced odd.
pub fn cleaning_numtaps(sample_rate: f64) -> usize {
    let order = (ECG_CLEAN_ORDER_FACTOR * sample_rate) as usize;
    if order % 2 == 0 {
        order + 1
    } else {
        order
    }
}

/// BioSPPy-style ECG cleaning: 0.67-45 Hz FIR band-pass applied forward and backward.
pub fn ecg_clean(signal: &Array1<f64>, sample_rate: f64) -> Array1<f64> {
    let taps = firwin_bandpass(
        cleaning_numtaps(sample_rate),
        ECG_CLEAN_LOW_HZ,
        ECG_CLEAN_HIGH_HZ,
        sample_rate,
    );
    let samples = signal.to_vec();
    Array1::from(filtfilt(&taps, &samples))
}
