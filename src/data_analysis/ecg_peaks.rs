// src/data_analysis/ecg_peaks.rs

use crate::constants::{
    PT_BLANKING_S, PT_INTEGRATION_WINDOW_S, PT_MIN_MISSED_DISTANCE_S, PT_MIN_PEAK_DISTANCE_S,
    PT_RR_HISTORY, PT_RR_MISSED_FACTOR, PT_SIGNAL_LEARNING_RATE, PT_THRESHOLD_FRACTION,
};

/// Indices of local maxima. A flat plateau counts once, at its middle sample
/// (rounded down); samples at either end of the signal are never peaks.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }
    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Causal moving average over `window` samples. The first `window - 1` outputs
/// average only the samples seen so far.
pub fn moving_window_integration(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(signal.len());
    let mut running = 0.0;
    for (i, &v) in signal.iter().enumerate() {
        running += v;
        if i >= window {
            running -= signal[i - window];
        }
        out.push(running / (i + 1).min(window) as f64);
    }
    out
}

/// Adaptive-threshold peak picking on the integrated signal.
///
/// Keeps running estimates of the signal (SPKI) and noise (NPKI) peak levels. A
/// candidate becomes a beat when it clears `NPKI + 0.25 (SPKI - NPKI)` outside
/// the refractory distance of the previous beat. When an RR interval exceeds
/// 1.66x the mean of the last eight, the skipped candidates are searched again
/// with half the threshold.
fn adaptive_peak_detect(detection: &[f64], sample_rate: f64) -> Vec<usize> {
    let min_peak_distance = (PT_MIN_PEAK_DISTANCE_S * sample_rate) as usize;
    let min_missed_distance = (PT_MIN_MISSED_DISTANCE_S * sample_rate) as usize;

    let candidates = local_maxima(detection);
    let mut signal_peaks: Vec<usize> = Vec::new();
    let mut spki = 0.0;
    let mut npki = 0.0;
    let mut last_peak = 0usize;
    let mut last_index: Option<usize> = None;

    for (index, &peak) in candidates.iter().enumerate() {
        let peak_value = detection[peak];
        let threshold_i1 = npki + PT_THRESHOLD_FRACTION * (spki - npki);

        if peak_value > threshold_i1 && peak > last_peak + min_peak_distance {
            signal_peaks.push(peak);

            if signal_peaks.len() > PT_RR_HISTORY + 1 {
                let n = signal_peaks.len();
                let rr_ave = (signal_peaks[n - 2] - signal_peaks[n - 2 - PT_RR_HISTORY]) as f64
                    / PT_RR_HISTORY as f64;
                let rr_missed = (PT_RR_MISSED_FACTOR * rr_ave) as usize;

                if peak - last_peak > rr_missed {
                    let threshold_i2 = 0.5 * threshold_i1;
                    let skipped_start = last_index.map_or(0, |i| i + 1);
                    let best_missed = candidates[skipped_start..index]
                        .iter()
                        .copied()
                        .filter(|&c| {
                            c > last_peak + min_missed_distance
                                && c + min_missed_distance < peak
                                && detection[c] > threshold_i2
                        })
                        .max_by(|a, b| {
                            detection[*a]
                                .partial_cmp(&detection[*b])
                                .unwrap_or(std::cmp::Ordering::Equal)
                        });
                    if let Some(missed) = best_missed {
                        signal_peaks[n - 1] = missed;
                        signal_peaks.push(peak);
                    }
                }
            }

            last_peak = peak;
            last_index = Some(index);
            spki = PT_SIGNAL_LEARNING_RATE * peak_value + (1.0 - PT_SIGNAL_LEARNING_RATE) * spki;
        } else {
            npki = PT_SIGNAL_LEARNING_RATE * peak_value + (1.0 - PT_SIGNAL_LEARNING_RATE) * npki;
        }
    }

    signal_peaks
}

/// Pan-Tompkins R-peak detection on a cleaned ECG.
///
/// Derivative, squaring, 120 ms moving-window integration with the first 200 ms
/// blanked, then adaptive thresholding. Returns sample indices of the detected
/// beats in the integrated signal.
pub fn pan_tompkins(cleaned: &[f64], sample_rate: f64) -> Vec<usize> {
    if cleaned.len() < 2 {
        return Vec::new();
    }
    let squared: Vec<f64> = cleaned
        .windows(2)
        .map(|w| {
            let d = w[1] - w[0];
            d * d
        })
        .collect();

    let window = (PT_INTEGRATION_WINDOW_S * sample_rate) as usize;
    let mut integrated = moving_window_integration(&squared, window);
    let blanking = ((PT_BLANKING_S * sample_rate) as usize).min(integrated.len());
    integrated[..blanking].iter_mut().for_each(|v| *v = 0.0);

    adaptive_peak_detect(&integrated, sample_rate)
}
