//! 리전별 지연/가동률 통계 계산기.
//!
//! 저장소와 요청만으로 결과가 결정되는 순수 함수 모음.
//! 백분위수는 정렬된 순서 통계량 사이의 선형 보간으로 계산한다.

use tracing::debug;

use crate::models::metrics::{MetricsReport, MetricsRequest, RegionMetrics};
use crate::models::telemetry::TelemetryRecord;
use crate::store::TelemetryStore;

/// p95 백분위 (0~1)
pub const P95: f64 = 0.95;

/// 출력 소수점 자리수
pub const OUTPUT_PRECISION: i32 = 4;

/// 요청된 모든 리전의 지표 계산
///
/// 저장소에 데이터가 없는 리전은 0 값 엔트리로 포함된다.
pub fn compute(store: &TelemetryStore, request: &MetricsRequest) -> MetricsReport {
    request
        .regions
        .iter()
        .map(|region| {
            let records = store.records_for(region);
            debug!(
                "리전 지표 계산: region={}, records={}, threshold_ms={}",
                region,
                records.len(),
                request.threshold_ms
            );
            (region.clone(), region_metrics(&records, request.threshold_ms))
        })
        .collect()
}

/// 단일 리전 레코드 집합의 지표 계산
pub fn region_metrics(records: &[&TelemetryRecord], threshold_ms: f64) -> RegionMetrics {
    if records.is_empty() {
        return RegionMetrics::empty();
    }

    let latencies: Vec<f64> = records.iter().map(|r| r.latency_ms).collect();
    let uptimes: Vec<f64> = records.iter().map(|r| r.uptime_pct).collect();
    let breaches = latencies.iter().filter(|&&l| l > threshold_ms).count() as u64;

    RegionMetrics {
        avg_latency: round_to(mean(&latencies).unwrap_or(0.0), OUTPUT_PRECISION),
        p95_latency: round_to(percentile(&latencies, P95).unwrap_or(0.0), OUTPUT_PRECISION),
        avg_uptime: round_to(mean(&uptimes).unwrap_or(0.0), OUTPUT_PRECISION),
        breaches,
    }
}

/// 산술 평균 (빈 입력이면 None)
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 선형 보간 백분위수 (빈 입력이면 None)
///
/// 오름차순 정렬 `v[0..n-1]`에 대해 `r = (n-1) * p`,
/// `lo = floor(r)`, `hi = min(lo+1, n-1)`, `v[lo] + (r-lo) * (v[hi]-v[lo])`.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n == 1 {
        return Some(sorted[0]);
    }

    let rank = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;

    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// 소수점 `places` 자리 반올림 (0.5는 0에서 먼 쪽으로)
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn records(region: &str, samples: &[(f64, f64)]) -> Vec<TelemetryRecord> {
        samples
            .iter()
            .enumerate()
            .map(|(i, &(latency, uptime))| {
                TelemetryRecord::new(region, "svc", latency, uptime, i as i64)
            })
            .collect()
    }

    #[test]
    fn percentile_single_value_is_exact() {
        assert_eq!(percentile(&[187.31], P95), Some(187.31));
    }

    #[test]
    fn percentile_two_values_interpolates() {
        // r = 0.95, lo = 0, hi = 1
        let p = percentile(&[20.0, 10.0], P95).unwrap();
        assert!((p - 19.5).abs() < EPS, "p95 = {p}");
    }

    #[test]
    fn percentile_with_duplicates() {
        assert_eq!(percentile(&[5.0, 5.0, 5.0, 5.0], P95), Some(5.0));
        // n = 3, r = 1.9 → 10 + 0.9 * (10 - 10)
        assert_eq!(percentile(&[1.0, 10.0, 10.0], P95), Some(10.0));
    }

    #[test]
    fn percentile_bounds() {
        let values = [3.0, 1.0, 2.0, 4.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 1.0), Some(4.0));
        assert_eq!(percentile(&values, 0.5), Some(2.5));
        assert_eq!(percentile(&[], P95), None);
    }

    #[test]
    fn percentile_twenty_values() {
        // r = 19 * 0.95 = 18.05 → v[18] + 0.05 * (v[19] - v[18]) = 19 + 0.05
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let p = percentile(&values, P95).unwrap();
        assert!((p - 19.05).abs() < EPS, "p95 = {p}");
    }

    #[test]
    fn round_to_four_places() {
        assert_eq!(round_to(228.48949999, 4), 228.4895);
        // 98.06975 * 10^4 는 정확히 980697.5 → 0에서 먼 쪽으로
        assert_eq!(round_to(98.06975, 4), 98.0698);
        assert_eq!(round_to(-1.23456, 4), -1.2346);
        assert_eq!(round_to(0.0, 4), 0.0);
    }

    #[test]
    fn region_metrics_basic() {
        let rows = records("apac", &[(100.0, 99.0), (200.0, 97.0), (150.0, 98.0)]);
        let refs: Vec<&TelemetryRecord> = rows.iter().collect();
        let m = region_metrics(&refs, 150.0);

        assert_eq!(m.avg_latency, 150.0);
        assert_eq!(m.avg_uptime, 98.0);
        // sorted = [100, 150, 200], r = 1.9 → 150 + 0.9 * 50
        assert_eq!(m.p95_latency, 195.0);
        // 150 은 임계값과 같으므로 breach 아님
        assert_eq!(m.breaches, 1);
    }

    #[test]
    fn region_metrics_empty_is_zero_entry() {
        assert_eq!(region_metrics(&[], 100.0), RegionMetrics::empty());
    }

    #[test]
    fn breaches_non_increasing_with_threshold() {
        let store = TelemetryStore::from_json_str(crate::SAMPLE_DATASET).unwrap();
        for region in store.regions() {
            let rows = store.records_for(region);
            let mut previous = u64::MAX;
            for threshold in (0..=300).step_by(5) {
                let breaches = region_metrics(&rows, threshold as f64).breaches;
                assert!(breaches <= previous, "{region} @ {threshold}");
                previous = breaches;
            }
        }
    }

    #[test]
    fn compute_keys_equal_deduplicated_regions() {
        let store = TelemetryStore::from_json_str(crate::SAMPLE_DATASET).unwrap();
        let a = compute(&store, &MetricsRequest::new(["emea", "apac", "emea", "mars"], 180.0));
        let b = compute(&store, &MetricsRequest::new(["mars", "apac", "emea"], 180.0));

        assert_eq!(
            a.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["apac", "emea", "mars"]
        );
        assert_eq!(a, b);
    }

    #[test]
    fn compute_unknown_region_yields_zero_entry() {
        let store = TelemetryStore::from_json_str(crate::SAMPLE_DATASET).unwrap();
        let report = compute(&store, &MetricsRequest::new(["mars"], 180.0));
        assert_eq!(report["mars"], RegionMetrics::empty());

        let report = compute(&TelemetryStore::empty(), &MetricsRequest::new(["apac"], 0.0));
        assert_eq!(report["apac"], RegionMetrics::empty());
    }

    #[test]
    fn compute_sample_dataset_values() {
        let store = TelemetryStore::from_json_str(crate::SAMPLE_DATASET).unwrap();
        let report = compute(&store, &MetricsRequest::new(["apac", "emea", "amer"], 180.0));

        let apac = report["apac"];
        assert!((apac.avg_latency - 167.0208).abs() < 1e-6);
        assert!((apac.p95_latency - 228.4895).abs() < 1e-6);
        assert!((apac.avg_uptime - 98.0698).abs() < 1e-6);
        assert_eq!(apac.breaches, 5);

        let emea = report["emea"];
        assert!((emea.avg_latency - 162.9867).abs() < 1e-6);
        assert!((emea.p95_latency - 205.119).abs() < 1e-6);
        assert_eq!(emea.breaches, 4);

        let amer = report["amer"];
        assert!((amer.avg_latency - 181.5975).abs() < 1e-6);
        assert!((amer.p95_latency - 229.9345).abs() < 1e-6);
        assert_eq!(amer.breaches, 7);
    }
}
