use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::patients::store::PatientStore;
use crate::statistics::cache::StatisticsCache;
use crate::statistics::dto::{
    DepartmentCount, EquipmentUsage, InsuranceCostControl, InsuranceMonth, StatisticsOverview,
    TrendPoint,
};

pub const TREND_CACHE_KEY: &str = "statistics:outpatient-trend";
const TREND_CACHE_TTL: Duration = Duration::from_secs(300);

pub struct StatisticsService {
    patients: Arc<dyn PatientStore>,
    cache: Arc<dyn StatisticsCache>,
}

impl StatisticsService {
    pub fn new(patients: Arc<dyn PatientStore>, cache: Arc<dyn StatisticsCache>) -> Self {
        Self { patients, cache }
    }

    /// Read-through: cache first, store on a miss, repopulate on the way out.
    /// Cache trouble of any kind degrades to a plain store query.
    pub async fn outpatient_trend(&self) -> Result<Vec<TrendPoint>, ServiceError> {
        match self.cache.get(TREND_CACHE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<TrendPoint>>(&raw) {
                Ok(points) => {
                    debug!("outpatient trend served from cache");
                    return Ok(points);
                }
                Err(e) => warn!(error = %e, "discarding unreadable trend cache entry"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "trend cache unavailable, querying store"),
        }

        info!("querying outpatient trend from store");
        let points = self.patients.outpatient_trend().await?;

        // An empty result is not worth pinning for five minutes.
        if !points.is_empty() {
            match serde_json::to_string(&points) {
                Ok(raw) => {
                    if let Err(e) = self.cache.put(TREND_CACHE_KEY, &raw, TREND_CACHE_TTL).await {
                        warn!(error = %e, "trend cache write failed, skipping");
                    }
                }
                Err(e) => warn!(error = %e, "trend cache serialization failed"),
            }
        }

        Ok(points)
    }

    /// All four figures come from one snapshot of the visit table.
    pub async fn overview(&self) -> Result<StatisticsOverview, ServiceError> {
        let visits = self.patients.find_all().await?;
        let today = OffsetDateTime::now_utc().date();

        let total_patients = visits
            .iter()
            .map(|v| v.patient_id.as_str())
            .collect::<HashSet<_>>()
            .len() as i64;
        let today_visits = visits
            .iter()
            .filter(|v| v.visit_date.is_some_and(|at| at.date() == today))
            .count() as i64;
        let department_count = visits
            .iter()
            .filter_map(|v| v.department.as_deref())
            .filter(|d| !d.is_empty())
            .collect::<HashSet<_>>()
            .len() as i64;

        Ok(StatisticsOverview {
            total_patients,
            total_visits: visits.len() as i64,
            department_count,
            today_visits,
        })
    }

    pub async fn department_distribution(&self) -> Result<Vec<DepartmentCount>, ServiceError> {
        let visits = self.patients.find_all().await?;

        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for visit in &visits {
            if let Some(department) = visit.department.as_deref().filter(|d| !d.is_empty()) {
                *counts.entry(department.to_string()).or_insert(0) += 1;
            }
        }

        Ok(counts
            .into_iter()
            .map(|(name, value)| DepartmentCount { name, value })
            .collect())
    }

    /// Synthetic six-month settlement series; a stand-in until settlement
    /// data has a real source. Oldest month first.
    pub fn insurance_cost_control(&self) -> InsuranceCostControl {
        let today = OffsetDateTime::now_utc().date();
        let monthly_data: Vec<InsuranceMonth> = (0..=5i64)
            .rev()
            .map(|back| InsuranceMonth {
                month: month_label(today, back),
                insurance_pay: 100 + back * 10,
                personal_pay: 60 + back * 5,
            })
            .collect();

        let total_insurance_pay = monthly_data.iter().map(|m| m.insurance_pay as f64).sum();
        let total_personal_pay = monthly_data.iter().map(|m| m.personal_pay as f64).sum();

        InsuranceCostControl {
            monthly_data,
            total_insurance_pay,
            total_personal_pay,
        }
    }

    /// Synthetic utilization roster; same stand-in status as above.
    pub fn equipment_usage(&self) -> Vec<EquipmentUsage> {
        [
            ("CT scanner", 85),
            ("MRI", 75),
            ("Ultrasound", 90),
            ("X-ray", 65),
            ("ECG", 80),
        ]
        .into_iter()
        .map(|(name, usage_rate)| EquipmentUsage {
            name: name.to_string(),
            usage_rate,
        })
        .collect()
    }
}

fn month_label(today: Date, months_back: i64) -> String {
    let mut year = today.year();
    let mut month = u8::from(today.month()) as i64 - months_back;
    while month < 1 {
        month += 12;
        year -= 1;
    }
    format!("{year:04}-{month:02}")
}

#[cfg(test)]
mod statistics_tests {
    use super::*;
    use crate::test_support::{
        seed_visit, seed_visit_now, FailingCache, InMemoryPatientStore, MemoryCache,
    };
    use std::sync::atomic::Ordering;
    use time::macros::date;

    fn service(
        store: Arc<InMemoryPatientStore>,
        cache: Arc<dyn StatisticsCache>,
    ) -> StatisticsService {
        StatisticsService::new(store, cache)
    }

    #[tokio::test]
    async fn trend_is_cached_after_the_first_query() {
        let store = Arc::new(InMemoryPatientStore::new());
        seed_visit(&store, "P-001", 1, Some("Cardiology")).await;
        seed_visit(&store, "P-002", 1, Some("Neurology")).await;
        seed_visit(&store, "P-003", 2, None).await;

        let stats = service(store.clone(), Arc::new(MemoryCache::new()));

        let first = stats.outpatient_trend().await.expect("first call");
        assert_eq!(store.trend_calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.iter().map(|p| p.count).sum::<i64>(), 3);

        let second = stats.outpatient_trend().await.expect("second call");
        assert_eq!(store.trend_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn trend_survives_a_failing_cache() {
        let store = Arc::new(InMemoryPatientStore::new());
        seed_visit(&store, "P-001", 1, Some("Cardiology")).await;

        let stats = service(store.clone(), Arc::new(FailingCache));

        let first = stats.outpatient_trend().await.expect("first call");
        let second = stats.outpatient_trend().await.expect("second call");
        assert_eq!(first, second);
        // Every call falls back to the store when the cache keeps failing.
        assert_eq!(store.trend_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_trend_is_not_cached() {
        let store = Arc::new(InMemoryPatientStore::new());
        let stats = service(store.clone(), Arc::new(MemoryCache::new()));

        assert!(stats.outpatient_trend().await.expect("first call").is_empty());
        assert!(stats.outpatient_trend().await.expect("second call").is_empty());
        assert_eq!(store.trend_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_cache_entry_counts_as_a_miss() {
        let store = Arc::new(InMemoryPatientStore::new());
        seed_visit(&store, "P-001", 1, Some("Cardiology")).await;

        let cache = Arc::new(MemoryCache::new());
        cache
            .put(TREND_CACHE_KEY, "[]", Duration::ZERO)
            .await
            .expect("seed cache");

        let stats = service(store.clone(), cache);
        let points = stats.outpatient_trend().await.expect("trend");
        assert_eq!(points.len(), 1);
        assert_eq!(store.trend_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn corrupt_cache_entry_is_discarded_and_replaced() {
        let store = Arc::new(InMemoryPatientStore::new());
        seed_visit(&store, "P-001", 1, Some("Cardiology")).await;

        let cache = Arc::new(MemoryCache::new());
        cache
            .put(TREND_CACHE_KEY, "{definitely not json", TREND_CACHE_TTL)
            .await
            .expect("seed cache");

        let stats = service(store.clone(), cache);
        stats.outpatient_trend().await.expect("first call");
        assert_eq!(store.trend_calls.load(Ordering::SeqCst), 1);

        // The bad entry was replaced by real data, so this one is a hit.
        stats.outpatient_trend().await.expect("second call");
        assert_eq!(store.trend_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn trend_window_excludes_old_visits_and_orders_days() {
        let store = Arc::new(InMemoryPatientStore::new());
        seed_visit(&store, "P-001", 2, Some("Cardiology")).await;
        seed_visit(&store, "P-002", 2, Some("Neurology")).await;
        seed_visit(&store, "P-003", 5, None).await;
        seed_visit(&store, "P-004", 45, Some("Cardiology")).await;

        let stats = service(store, Arc::new(MemoryCache::new()));
        let points = stats.outpatient_trend().await.expect("trend");

        assert_eq!(points.len(), 2);
        assert!(points[0].date < points[1].date);
        assert_eq!(points.iter().map(|p| p.count).sum::<i64>(), 3);
        assert!(points.iter().all(|p| p.amount.is_none()));
    }

    #[tokio::test]
    async fn overview_counts_a_small_dataset() {
        let store = Arc::new(InMemoryPatientStore::new());
        seed_visit(&store, "P-001", 3, Some("Cardiology")).await;
        seed_visit(&store, "P-001", 10, Some("Neurology")).await;
        seed_visit(&store, "P-002", 6, Some("Cardiology")).await;

        let stats = service(store.clone(), Arc::new(MemoryCache::new()));
        let overview = stats.overview().await.expect("overview");

        assert_eq!(
            overview,
            StatisticsOverview {
                total_patients: 2,
                total_visits: 3,
                department_count: 2,
                today_visits: 0,
            }
        );
        // One snapshot feeds all four figures.
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn overview_counts_todays_visits() {
        let store = Arc::new(InMemoryPatientStore::new());
        seed_visit_now(&store, "P-001", Some("Cardiology")).await;
        seed_visit(&store, "P-002", 4, Some("Cardiology")).await;

        let stats = service(store, Arc::new(MemoryCache::new()));
        let overview = stats.overview().await.expect("overview");
        assert_eq!(overview.today_visits, 1);
        assert_eq!(overview.total_visits, 2);
    }

    #[tokio::test]
    async fn department_distribution_skips_blank_departments() {
        let store = Arc::new(InMemoryPatientStore::new());
        seed_visit(&store, "P-001", 1, Some("Cardiology")).await;
        seed_visit(&store, "P-002", 2, Some("Cardiology")).await;
        seed_visit(&store, "P-003", 3, Some("Neurology")).await;
        seed_visit(&store, "P-004", 4, Some("")).await;
        seed_visit(&store, "P-005", 5, None).await;

        let stats = service(store, Arc::new(MemoryCache::new()));
        let distribution = stats.department_distribution().await.expect("distribution");

        assert_eq!(
            distribution,
            vec![
                DepartmentCount { name: "Cardiology".into(), value: 2 },
                DepartmentCount { name: "Neurology".into(), value: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn insurance_series_spans_six_months_with_fixed_totals() {
        let store = Arc::new(InMemoryPatientStore::new());
        let stats = service(store, Arc::new(MemoryCache::new()));

        let report = stats.insurance_cost_control();
        assert_eq!(report.monthly_data.len(), 6);

        // Oldest month first, ending at the current month.
        let today = OffsetDateTime::now_utc().date();
        assert_eq!(report.monthly_data[5].month, month_label(today, 0));
        assert_eq!(report.monthly_data[0].month, month_label(today, 5));

        assert_eq!(report.monthly_data[0].insurance_pay, 150);
        assert_eq!(report.monthly_data[0].personal_pay, 85);
        assert_eq!(report.monthly_data[5].insurance_pay, 100);
        assert_eq!(report.monthly_data[5].personal_pay, 60);

        assert_eq!(report.total_insurance_pay, 750.0);
        assert_eq!(report.total_personal_pay, 435.0);
    }

    #[tokio::test]
    async fn equipment_roster_is_fixed() {
        let store = Arc::new(InMemoryPatientStore::new());
        let stats = service(store, Arc::new(MemoryCache::new()));

        let usage = stats.equipment_usage();
        assert_eq!(usage.len(), 5);
        assert_eq!(usage[0].name, "CT scanner");
        assert_eq!(usage[0].usage_rate, 85);
        assert_eq!(usage[2].name, "Ultrasound");
        assert_eq!(usage[2].usage_rate, 90);
        assert_eq!(usage[4].name, "ECG");
        assert_eq!(usage[4].usage_rate, 80);
    }

    #[test]
    fn month_label_wraps_across_a_year_boundary() {
        let anchor = date!(2026 - 02 - 10);
        assert_eq!(month_label(anchor, 0), "2026-02");
        assert_eq!(month_label(anchor, 1), "2026-01");
        assert_eq!(month_label(anchor, 2), "2025-12");
        assert_eq!(month_label(anchor, 5), "2025-09");
    }
}
