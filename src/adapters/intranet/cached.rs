use async_trait::async_trait;

use crate::adapters::IntranetApi;
use crate::cache::Cache;
use crate::cache::keys::intranet_keys::{self, ANNOUNCEMENTS_TTL, ATTENDANCE_TTL, PROFILE_TTL, SCHEDULE_TTL};
use crate::error::AppResult;
use crate::models::{Announcement, AttendanceRecord, ScheduleEntry, StudentProfile};

/// Read-through cache in front of any intranet variant
pub struct CachedIntranet<A: IntranetApi> {
    inner: A,
    cache: Cache,
}

impl<A: IntranetApi> CachedIntranet<A> {
    pub fn new(inner: A, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<A: IntranetApi> IntranetApi for CachedIntranet<A> {
    async fn student_profile(&self, student_id: &str) -> AppResult<StudentProfile> {
        let key = intranet_keys::profile_key(student_id);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let profile = self.inner.student_profile(student_id).await?;
        self.cache.set(&key, &profile, Some(PROFILE_TTL)).await;
        Ok(profile)
    }

    async fn student_schedule(
        &self,
        student_id: &str,
        semester: Option<&str>,
    ) -> AppResult<Vec<ScheduleEntry>> {
        let key = intranet_keys::schedule_key(student_id, semester);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let schedule = self.inner.student_schedule(student_id, semester).await?;
        self.cache.set(&key, &schedule, Some(SCHEDULE_TTL)).await;
        Ok(schedule)
    }

    async fn student_attendance(&self, student_id: &str) -> AppResult<Vec<AttendanceRecord>> {
        let key = intranet_keys::attendance_key(student_id);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let attendance = self.inner.student_attendance(student_id).await?;
        self.cache.set(&key, &attendance, Some(ATTENDANCE_TTL)).await;
        Ok(attendance)
    }

    async fn campus_announcements(&self, category: Option<&str>) -> AppResult<Vec<Announcement>> {
        let key = intranet_keys::announcements_key(category);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let announcements = self.inner.campus_announcements(category).await?;
        self.cache
            .set(&key, &announcements, Some(ANNOUNCEMENTS_TTL))
            .await;
        Ok(announcements)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::cache::{CacheError, CacheStore};
    use crate::error::AppError;
    use crate::mock::fixtures;

    /// Counts upstream calls and optionally fails every one of them
    #[derive(Clone, Default)]
    struct CountingIntranet {
        calls: Arc<AtomicUsize>,
        failing: bool,
    }

    impl CountingIntranet {
        fn hit(&self) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(AppError::upstream("intranet down"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl IntranetApi for CountingIntranet {
        async fn student_profile(&self, _student_id: &str) -> AppResult<StudentProfile> {
            self.hit()?;
            Ok(fixtures::STUDENTS[0].profile())
        }

        async fn student_schedule(
            &self,
            _student_id: &str,
            _semester: Option<&str>,
        ) -> AppResult<Vec<ScheduleEntry>> {
            self.hit()?;
            Ok(fixtures::schedule())
        }

        async fn student_attendance(&self, _student_id: &str) -> AppResult<Vec<AttendanceRecord>> {
            self.hit()?;
            Ok(fixtures::attendance())
        }

        async fn campus_announcements(
            &self,
            category: Option<&str>,
        ) -> AppResult<Vec<Announcement>> {
            self.hit()?;
            let mut announcements = fixtures::announcements();
            if let Some(category) = category {
                announcements.retain(|a| a.category == category);
            }
            Ok(announcements)
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl CacheStore for UnreachableStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(5)))
        }

        async fn set(
            &self,
            _key: &str,
            _value: String,
            _ttl: Option<Duration>,
        ) -> Result<(), CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(5)))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(5)))
        }

        async fn delete_by_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(5)))
        }

        async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(5)))
        }
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let inner = CountingIntranet::default();
        let calls = inner.calls.clone();
        let intranet = CachedIntranet::new(inner, Cache::in_memory());

        let first = intranet.student_profile("STU2024001").await.unwrap();
        let second = intranet.student_profile("STU2024001").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_optional_filters_cache_separately() {
        let inner = CountingIntranet::default();
        let calls = inner.calls.clone();
        let intranet = CachedIntranet::new(inner, Cache::in_memory());

        intranet.student_schedule("S1", None).await.unwrap();
        intranet.student_schedule("S1", Some("Fall 2024")).await.unwrap();
        intranet.student_schedule("S1", None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_literal_all_category_does_not_shadow_unfiltered_list() {
        let inner = CountingIntranet::default();
        let calls = inner.calls.clone();
        let intranet = CachedIntranet::new(inner, Cache::in_memory());

        let filtered = intranet.campus_announcements(Some("all")).await.unwrap();
        let unfiltered = intranet.campus_announcements(None).await.unwrap();

        assert!(filtered.is_empty());
        assert_eq!(unfiltered.len(), fixtures::announcements().len());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_refetches() {
        let inner = CountingIntranet::default();
        let calls = inner.calls.clone();
        let intranet = CachedIntranet::new(inner, Cache::in_memory());

        intranet.campus_announcements(None).await.unwrap();
        tokio::time::advance(ANNOUNCEMENTS_TTL + Duration::from_secs(1)).await;
        intranet.campus_announcements(None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreachable_cache_still_answers() {
        let inner = CountingIntranet::default();
        let calls = inner.calls.clone();
        let intranet = CachedIntranet::new(inner, Cache::new(Arc::new(UnreachableStore)));

        let attendance = intranet.student_attendance("S1").await.unwrap();
        intranet.student_attendance("S1").await.unwrap();

        assert_eq!(attendance.len(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_cached() {
        let inner = CountingIntranet {
            failing: true,
            ..Default::default()
        };
        let cache = Cache::in_memory();
        let intranet = CachedIntranet::new(inner, cache.clone());

        assert!(intranet.student_profile("S1").await.is_err());
        assert!(!cache.exists(&intranet_keys::profile_key("S1")).await);
    }
}
