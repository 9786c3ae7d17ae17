// src/data_analysis/ecg_quality.rs

use ndarray::Array1;
use ndarray_stats::SummaryStatisticsExt;
use std::fmt;

use crate::constants::{
    EKG_UNIT_SCALE, ZHAO_BASSQI_DEN_BAND_HZ, ZHAO_BASSQI_NUM_BAND_HZ, ZHAO_BASSQI_OPTIMAL,
    ZHAO_BASSQI_UNQUALIFIED, ZHAO_HEART_RATE_SPLIT_BPM, ZHAO_KSQI_OPTIMAL, ZHAO_PSD_WINDOW_S,
    ZHAO_PSQI_DEN_BAND_HZ, ZHAO_PSQI_LIMITS_NORMAL, ZHAO_PSQI_LIMITS_TACHY,
    ZHAO_PSQI_NUM_BAND_HZ,
};
use crate::data_analysis::ecg_clean::ecg_clean;
use crate::data_analysis::ecg_peaks::pan_tompkins;
use crate::data_analysis::spectral_analysis::{band_power, welch_psd, WelchConfig};
use crate::error::AnalysisError;
use crate::types::AnalysisResult;

/// Three-way signal quality grade of the Zhao (2018) heuristic fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityGrade {
    Excellent,
    BarelyAcceptable,
    Unacceptable,
}

impl QualityGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::Excellent => "Excellent",
            QualityGrade::BarelyAcceptable => "Barely acceptable",
            QualityGrade::Unacceptable => "Unacceptable",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-index class of the first fusion stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexClass {
    Unqualified,
    Suspicious,
    Optimal,
}

/// Quality of one ECG recording, with the indices the grade was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct EcgQuality {
    pub grade: QualityGrade,
    pub k_sqi: f64,
    pub p_sqi: f64,
    pub bas_sqi: f64,
    pub heart_rate_bpm: f64,
    pub peak_count: usize,
}

/// Fisher (excess) kurtosis, population moments. NaN for constant input.
pub fn kurtosis_fisher(signal: &Array1<f64>) -> f64 {
    match signal.kurtosis() {
        Ok(k) => k - 3.0,
        Err(_) => f64::NAN,
    }
}

/// Welch PSD of the cleaned signal with the DC bin dropped. The segment is
/// `1024 s` of samples, capped at half the recording.
fn quality_psd(cleaned: &[f64], sample_rate: f64) -> AnalysisResult<Vec<(f64, f64)>> {
    let mut config = WelchConfig::with_segment_seconds(ZHAO_PSD_WINDOW_S, sample_rate);
    config.segment_length = config.segment_length.min(cleaned.len() / 2).max(1);
    let psd = welch_psd(cleaned, sample_rate, &config)?;
    Ok(psd.into_iter().filter(|&(f, _)| f > 0.0).collect())
}

fn band_ratio(psd: &[(f64, f64)], num: (f64, f64), den: (f64, f64)) -> f64 {
    band_power(psd, num.0, num.1) / band_power(psd, den.0, den.1)
}

/// Power in the QRS band relative to the whole ECG band.
pub fn p_sqi(psd: &[(f64, f64)]) -> f64 {
    band_ratio(psd, ZHAO_PSQI_NUM_BAND_HZ, ZHAO_PSQI_DEN_BAND_HZ)
}

/// One minus the share of baseline-wander power.
pub fn bas_sqi(psd: &[(f64, f64)]) -> f64 {
    1.0 - band_ratio(psd, ZHAO_BASSQI_NUM_BAND_HZ, ZHAO_BASSQI_DEN_BAND_HZ)
}

/// Fastest heart rate seen, from the shortest RR interval. 1 bpm with fewer than two beats.
pub fn heart_rate_from_peaks(peaks: &[usize], sample_rate: f64) -> f64 {
    let min_rr = peaks.windows(2).map(|w| w[1].saturating_sub(w[0])).min();
    match min_rr {
        Some(rr) if peaks.len() > 1 => 60.0 * sample_rate / rr as f64,
        _ => 1.0,
    }
}

/// Simple heuristic fusion of the three indices into a grade.
///
/// NaN indices fail every comparison, which puts a NaN pSQI or kSQI in the
/// unqualified class and a NaN basSQI in the suspicious class.
pub fn classify(k_sqi: f64, p_sqi: f64, bas_sqi: f64, heart_rate_bpm: f64) -> QualityGrade {
    let (l1, l2, l3) = if heart_rate_bpm < ZHAO_HEART_RATE_SPLIT_BPM {
        ZHAO_PSQI_LIMITS_NORMAL
    } else {
        ZHAO_PSQI_LIMITS_TACHY
    };

    let p_class = if p_sqi > l1 && p_sqi < l2 {
        IndexClass::Optimal
    } else if p_sqi > l3 && p_sqi < l1 {
        IndexClass::Suspicious
    } else {
        IndexClass::Unqualified
    };
    let k_class = if k_sqi > ZHAO_KSQI_OPTIMAL {
        IndexClass::Optimal
    } else {
        IndexClass::Unqualified
    };
    let bas_class = if bas_sqi >= ZHAO_BASSQI_OPTIMAL {
        IndexClass::Optimal
    } else if bas_sqi < ZHAO_BASSQI_UNQUALIFIED {
        IndexClass::Unqualified
    } else {
        IndexClass::Suspicious
    };

    let classes = [p_class, k_class, bas_class];
    let count = |c: IndexClass| classes.iter().filter(|&&x| x == c).count();
    let (optimal, suspicious, unqualified) = (
        count(IndexClass::Optimal),
        count(IndexClass::Suspicious),
        count(IndexClass::Unqualified),
    );

    if unqualified >= 2 || (unqualified == 1 && suspicious == 2) {
        QualityGrade::Unacceptable
    } else if optimal >= 2 && unqualified == 0 {
        QualityGrade::Excellent
    } else {
        QualityGrade::BarelyAcceptable
    }
}

/// Scores one raw `AUX_EKG` channel: unit scaling, band-pass cleaning,
/// Pan-Tompkins detection, then Zhao (2018) fusion.
pub fn score_ecg(raw: &[f64], sample_rate: f64) -> AnalysisResult<EcgQuality> {
    if raw.is_empty() {
        return Err(AnalysisError::EmptySignal("AUX_EKG".to_string()));
    }
    let scaled: Array1<f64> = raw.iter().map(|v| v * EKG_UNIT_SCALE).collect();
    let cleaned = ecg_clean(&scaled, sample_rate);
    let cleaned_samples = cleaned.to_vec();

    let peaks = pan_tompkins(&cleaned_samples, sample_rate);
    let heart_rate_bpm = heart_rate_from_peaks(&peaks, sample_rate);

    let psd = quality_psd(&cleaned_samples, sample_rate)?;
    let k_sqi = kurtosis_fisher(&cleaned);
    let p_sqi = p_sqi(&psd);
    let bas_sqi = bas_sqi(&psd);

    Ok(EcgQuality {
        grade: classify(k_sqi, p_sqi, bas_sqi, heart_rate_bpm),
        k_sqi,
        p_sqi,
        bas_sqi,
        heart_rate_bpm,
        peak_count: peaks.len(),
    })
}
