use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};

use super::clock::Clock;
use super::error::AttendanceError;
use super::store::{AttendanceStore, EmployeeRoster};

/// Outcome of one backfill sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    pub target_day: NaiveDate,
    pub marked_absent: usize,
}

/// Daily job that creates absent rows for roster members with no attendance
/// row for yesterday. Today is never touched; same-day absence stays an
/// on-the-fly roster difference until the day is over.
pub struct BackfillJob {
    store: Arc<dyn AttendanceStore>,
    roster: Arc<dyn EmployeeRoster>,
    clock: Arc<dyn Clock>,
    run_at: NaiveTime,
    running: AtomicBool,
}

impl BackfillJob {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        roster: Arc<dyn EmployeeRoster>,
        clock: Arc<dyn Clock>,
        run_at: NaiveTime,
    ) -> Self {
        Self { store, roster, clock, run_at, running: AtomicBool::new(false) }
    }

    /// Sleep until the next scheduled time, sweep, repeat. Errors are logged
    /// and the loop keeps going; a missed sweep self-heals on the next run
    /// because marking is idempotent.
    pub async fn run(self: Arc<Self>) {
        tracing::info!(run_at = %self.run_at, "absence backfill scheduled");
        loop {
            let delay = self.delay_until_next_run();
            actix_web::rt::time::sleep(delay).await;

            match self.sweep_once().await {
                Ok(Some(report)) => {
                    tracing::info!(
                        day = %report.target_day,
                        marked_absent = report.marked_absent,
                        "absence backfill complete"
                    );
                }
                Ok(None) => {
                    tracing::warn!("absence backfill still running, sweep skipped");
                }
                Err(e) => {
                    tracing::error!(error = %e, "absence backfill failed");
                }
            }
        }
    }

    fn delay_until_next_run(&self) -> Duration {
        let now = self.clock.now();
        let today_run = now.date().and_time(self.run_at);
        let next = if now < today_run {
            today_run
        } else {
            today_run + chrono::Duration::days(1)
        };
        (next - now).to_std().unwrap_or(Duration::from_secs(1))
    }

    /// One sweep of yesterday. Returns `None` without sweeping if another
    /// sweep is still in flight.
    pub async fn sweep_once(&self) -> Result<Option<BackfillReport>, AttendanceError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }
        let result = self.sweep_yesterday().await;
        self.running.store(false, Ordering::SeqCst);
        result.map(Some)
    }

    async fn sweep_yesterday(&self) -> Result<BackfillReport, AttendanceError> {
        let target_day = self.clock.today().pred_opt().expect("date has a predecessor");

        let employees = self.roster.list_active().await?;
        let existing = self.store.list_day(target_day).await?;
        let recorded: HashSet<i64> = existing.iter().map(|r| r.user_id).collect();

        let mut marked_absent = 0usize;
        for employee in &employees {
            if recorded.contains(&employee.id) {
                continue;
            }
            if self.store.insert_absent_if_missing(employee.id, target_day).await? {
                marked_absent += 1;
            }
        }

        Ok(BackfillReport { target_day, marked_absent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::clock::fixed::FixedClock;
    use crate::attendance::memory::MemoryBackend;
    use crate::attendance::service::AttendanceService;
    use crate::model::attendance::Status;

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn setup() -> (Arc<MemoryBackend>, Arc<FixedClock>, AttendanceService) {
        let backend = Arc::new(MemoryBackend::new(vec![
            MemoryBackend::employee(1, "Alice Johnson", "Engineering"),
            MemoryBackend::employee(2, "Bob Smith", "Sales"),
            MemoryBackend::employee(3, "Carol White", "HR"),
        ]));
        let clock = FixedClock::at("2026-02-03T00:05:00");
        let service =
            AttendanceService::new(backend.clone(), backend.clone(), clock.clone());
        (backend, clock, service)
    }

    fn job(backend: &Arc<MemoryBackend>, clock: &Arc<FixedClock>) -> BackfillJob {
        BackfillJob::new(backend.clone(), backend.clone(), clock.clone(), time("00:05"))
    }

    #[actix_web::test]
    async fn marks_only_missing_employees_for_yesterday() {
        let (backend, clock, service) = setup();

        // Alice checked in yesterday; Bob and Carol did not.
        clock.set("2026-02-02T09:00:00");
        service.check_in(1).await.unwrap();
        clock.set("2026-02-03T00:05:00");

        let job = job(&backend, &clock);
        let report = job.sweep_once().await.unwrap().unwrap();

        assert_eq!(report.target_day, NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
        assert_eq!(report.marked_absent, 2);

        let alice = backend.find_by_day(1, report.target_day).await.unwrap().unwrap();
        assert_eq!(alice.status, Status::Present);
        let bob = backend.find_by_day(2, report.target_day).await.unwrap().unwrap();
        assert_eq!(bob.status, Status::Absent);
        assert!(bob.check_in_at.is_none());
    }

    #[actix_web::test]
    async fn second_sweep_is_a_no_op() {
        let (backend, clock, _service) = setup();
        let job = job(&backend, &clock);

        let first = job.sweep_once().await.unwrap().unwrap();
        assert_eq!(first.marked_absent, 3);

        let second = job.sweep_once().await.unwrap().unwrap();
        assert_eq!(second.marked_absent, 0);
        assert_eq!(backend.row_count(), 3);
    }

    #[actix_web::test]
    async fn never_touches_today() {
        let (backend, clock, service) = setup();

        // Bob already checked in today before the sweep runs.
        service.check_in(2).await.unwrap();

        let job = job(&backend, &clock);
        job.sweep_once().await.unwrap().unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        let bob_today = backend.find_by_day(2, today).await.unwrap().unwrap();
        assert!(bob_today.check_in_at.is_some());
        assert!(backend.find_by_day(1, today).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn overlapping_sweep_is_skipped() {
        let (backend, clock, _service) = setup();
        let job = job(&backend, &clock);

        job.running.store(true, Ordering::SeqCst);
        assert!(job.sweep_once().await.unwrap().is_none());
        assert_eq!(backend.row_count(), 0);

        job.running.store(false, Ordering::SeqCst);
        assert!(job.sweep_once().await.unwrap().is_some());
    }

    #[test]
    fn delay_targets_next_occurrence() {
        let (backend, clock, _service) = setup();

        clock.set("2026-02-03T00:00:00");
        let job = job(&backend, &clock);
        assert_eq!(job.delay_until_next_run(), Duration::from_secs(5 * 60));

        // Past today's slot: wait for tomorrow's.
        clock.set("2026-02-03T00:05:00");
        assert_eq!(job.delay_until_next_run(), Duration::from_secs(24 * 60 * 60));

        clock.set("2026-02-03T12:05:00");
        assert_eq!(job.delay_until_next_run(), Duration::from_secs(12 * 60 * 60));
    }
}
