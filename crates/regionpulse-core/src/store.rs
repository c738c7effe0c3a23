//! 불변 인메모리 텔레메트리 저장소.
//!
//! 프로세스 시작 시 한 번 로드되고 이후 읽기 전용으로만 사용된다.
//! 리전 인덱스도 생성 시점에 한 번만 만들어지므로 항상 내용과 일치한다.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::models::telemetry::TelemetryRecord;

/// 텔레메트리 데이터 소스
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// JSON 배열 파일
    File(PathBuf),
    /// 바이너리에 포함된 JSON 문자열
    Embedded(&'static str),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Embedded(_) => write!(f, "embedded"),
        }
    }
}

/// 텔레메트리 저장소
#[derive(Debug, Clone, Default)]
pub struct TelemetryStore {
    /// 로드 순서대로 보관된 레코드
    records: Vec<TelemetryRecord>,
    /// 리전 → 레코드 인덱스 목록 (로드 순서 유지)
    by_region: HashMap<String, Vec<usize>>,
}

impl TelemetryStore {
    /// 레코드 목록으로 저장소 생성 (리전 인덱스 구축)
    pub fn new(records: Vec<TelemetryRecord>) -> Self {
        let mut by_region: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_region.entry(record.region.clone()).or_default().push(idx);
        }
        Self { records, by_region }
    }

    /// 빈 저장소
    pub fn empty() -> Self {
        Self::default()
    }

    /// JSON 배열 문자열에서 저장소 생성
    ///
    /// 레코드로 해석되지 않는 원소는 경고 후 건너뛴다.
    /// 최상위 값이 배열이 아니면 에러.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        Self::parse(json, "inline")
    }

    /// JSON 배열 파일에서 저장소 생성
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let contents = fs::read_to_string(path).map_err(|e| CoreError::DataSourceUnavailable {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    fn parse(json: &str, source_name: &str) -> Result<Self, CoreError> {
        let unavailable = |reason: String| CoreError::DataSourceUnavailable {
            source_name: source_name.to_string(),
            reason,
        };

        let value: Value = serde_json::from_str(json).map_err(|e| unavailable(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(unavailable("expected a JSON array of records".to_string()));
        };

        let total = items.len();
        let records: Vec<TelemetryRecord> = items
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("텔레메트리 레코드 #{idx} 건너뜀 ({source_name}): {e}");
                    None
                }
            })
            .collect();

        if records.len() < total {
            warn!(
                "{source_name}: {}개 중 {}개 레코드만 로드됨",
                total,
                records.len()
            );
        }

        Ok(Self::new(records))
    }

    /// 데이터 소스를 순서대로 시도하여 저장소 로드
    ///
    /// 존재하지 않는 파일은 건너뛰고, 해석 실패한 소스는 경고 후 다음 소스로 넘어간다.
    /// 사용 가능한 소스가 없으면 빈 저장소로 시작한다 (치명적 에러 아님).
    pub fn load(sources: &[DataSource]) -> Self {
        for source in sources {
            let result = match source {
                DataSource::File(path) => {
                    if !path.exists() {
                        debug!("데이터 파일 없음, 다음 소스 시도: {}", path.display());
                        continue;
                    }
                    Self::from_file(path)
                }
                DataSource::Embedded(json) => Self::parse(json, "embedded"),
            };

            match result {
                Ok(store) => {
                    info!(
                        "텔레메트리 로드 완료: source={}, records={}, regions={}",
                        source,
                        store.len(),
                        store.by_region.len()
                    );
                    return store;
                }
                Err(e) => warn!("데이터 소스 로드 실패: {e}"),
            }
        }

        warn!("사용 가능한 텔레메트리 데이터 소스 없음 — 빈 저장소로 시작 (degraded)");
        Self::empty()
    }

    /// 특정 리전의 레코드 조회 (로드 순서 유지, 대소문자 구분)
    pub fn records_for(&self, region: &str) -> Vec<&TelemetryRecord> {
        self.by_region
            .get(region)
            .map(|indices| indices.iter().map(|&idx| &self.records[idx]).collect())
            .unwrap_or_default()
    }

    /// 전체 레코드 (로드 순서)
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// 리전 이름 목록 (처음 등장한 순서)
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<(usize, &str)> = self
            .by_region
            .iter()
            .map(|(region, indices)| (indices[0], region.as_str()))
            .collect();
        regions.sort_unstable_by_key(|(first, _)| *first);
        regions.into_iter().map(|(_, region)| region).collect()
    }

    /// 레코드 수
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 비어있는지 여부
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn sample_store() -> TelemetryStore {
        TelemetryStore::new(vec![
            TelemetryRecord::new("apac", "checkout", 120.0, 99.0, 1),
            TelemetryRecord::new("emea", "checkout", 150.0, 98.0, 2),
            TelemetryRecord::new("apac", "payments", 200.0, 97.0, 3),
            TelemetryRecord::new("APAC", "payments", 999.0, 10.0, 4),
        ])
    }

    #[test]
    fn records_for_preserves_load_order() {
        let store = sample_store();
        let apac = store.records_for("apac");
        assert_eq!(apac.len(), 2);
        assert_eq!(apac[0].timestamp, 1);
        assert_eq!(apac[1].timestamp, 3);
    }

    #[test]
    fn records_for_is_case_sensitive() {
        let store = sample_store();
        assert_eq!(store.records_for("APAC").len(), 1);
        assert_eq!(store.records_for("Apac").len(), 0);
    }

    #[test]
    fn records_for_unknown_region_is_empty() {
        let store = sample_store();
        assert!(store.records_for("amer").is_empty());
        assert!(TelemetryStore::empty().records_for("apac").is_empty());
    }

    #[test]
    fn index_matches_linear_scan() {
        let store = TelemetryStore::from_json_str(crate::SAMPLE_DATASET).unwrap();
        for region in store.regions() {
            let scanned: Vec<&TelemetryRecord> =
                store.records().iter().filter(|r| r.region == region).collect();
            assert_eq!(store.records_for(region), scanned);
        }
    }

    #[test]
    fn regions_in_first_appearance_order() {
        let store = sample_store();
        assert_eq!(store.regions(), vec!["apac", "emea", "APAC"]);
    }

    #[test]
    fn from_json_str_skips_invalid_elements() {
        let json = r#"[
            {"region":"apac","service":"a","latency_ms":100,"uptime_pct":99,"timestamp":1},
            {"region":"apac","service":"b","uptime_pct":99,"timestamp":2},
            "garbage",
            {"region":"emea","service":"c","latency_ms":110,"uptime_pct":98,"timestamp":3}
        ]"#;
        let store = TelemetryStore::from_json_str(json).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records_for("apac").len(), 1);
    }

    #[test]
    fn from_json_str_rejects_non_array() {
        assert_matches!(
            TelemetryStore::from_json_str(r#"{"region":"apac"}"#),
            Err(CoreError::DataSourceUnavailable { .. })
        );
        assert_matches!(
            TelemetryStore::from_json_str("not json"),
            Err(CoreError::DataSourceUnavailable { .. })
        );
    }

    #[test]
    fn load_uses_first_existing_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let fallback = dir.path().join("fallback.json");
        let mut file = fs::File::create(&fallback).unwrap();
        write!(
            file,
            r#"[{{"region":"amer","service":"x","latency_ms":50,"uptime_pct":100,"timestamp":9}}]"#
        )
        .unwrap();

        let store = TelemetryStore::load(&[
            DataSource::File(missing),
            DataSource::File(fallback),
            DataSource::Embedded(crate::SAMPLE_DATASET),
        ]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.regions(), vec!["amer"]);
    }

    #[test]
    fn load_skips_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{ not valid").unwrap();

        let store = TelemetryStore::load(&[
            DataSource::File(corrupt),
            DataSource::Embedded(crate::SAMPLE_DATASET),
        ]);

        assert_eq!(store.len(), 36);
    }

    #[test]
    fn load_without_sources_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TelemetryStore::load(&[DataSource::File(dir.path().join("nope.json"))]);
        assert!(store.is_empty());
        assert!(TelemetryStore::load(&[]).is_empty());
    }

    #[test]
    fn data_source_display() {
        assert_eq!(
            DataSource::File(PathBuf::from("data/x.json")).to_string(),
            "data/x.json"
        );
        assert_eq!(DataSource::Embedded("[]").to_string(), "embedded");
    }
}
