// Campus tools
// Study-room booking with slot conflict detection, and priced print jobs

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewPrintJob, NewRoomBooking, PrintJob, RoomBooking};

pub const BOOKING_CONFIRMED: &str = "confirmed";
pub const PRINT_PENDING: &str = "pending";

/// Per printed side, in cents
pub const COLOR_PAGE_CENTS: i64 = 20;
pub const MONO_PAGE_CENTS: i64 = 5;

#[async_trait]
pub trait ToolsStore: Send + Sync {
    /// Stores the booking unless a confirmed booking of the same room overlaps it
    async fn book_room(&self, user_id: &str, request: &NewRoomBooking) -> AppResult<RoomBooking>;

    /// The user's bookings, latest date first
    async fn bookings(&self, user_id: &str) -> AppResult<Vec<RoomBooking>>;

    async fn save_print_job(&self, job: &PrintJob) -> AppResult<PrintJob>;

    /// The user's print jobs, newest first
    async fn print_jobs(&self, user_id: &str) -> AppResult<Vec<PrintJob>>;
}

pub fn validate_booking(request: &NewRoomBooking) -> AppResult<()> {
    if request.room_name.trim().is_empty() {
        return Err(AppError::Validation("Room name is required".to_string()));
    }
    if request.end_time <= request.start_time {
        return Err(AppError::Validation(
            "End time must be after start time".to_string(),
        ));
    }
    Ok(())
}

fn slot_taken() -> AppError {
    AppError::Conflict("Room is already booked for this time slot".to_string())
}

/// Copies times pages, halved (rounded up) for duplex, at the colour or mono rate
pub fn print_cost_cents(copies: i32, pages: i32, color: bool, duplex: bool) -> i64 {
    let total_pages = i64::from(copies) * i64::from(pages);
    let sides = if duplex {
        (total_pages + 1) / 2
    } else {
        total_pages
    };
    let rate = if color {
        COLOR_PAGE_CENTS
    } else {
        MONO_PAGE_CENTS
    };
    sides * rate
}

/// Validates and prices a print request for `user_id`
pub fn quote_print_job(user_id: &str, request: &NewPrintJob) -> AppResult<PrintJob> {
    if request.file_name.trim().is_empty() {
        return Err(AppError::Validation("File name is required".to_string()));
    }
    if request.location.trim().is_empty() {
        return Err(AppError::Validation("Printer location is required".to_string()));
    }
    if request.copies < 1 || request.pages < 1 {
        return Err(AppError::Validation(
            "Copies and pages must be at least 1".to_string(),
        ));
    }

    let now = Utc::now();
    Ok(PrintJob {
        id: Uuid::new_v4(),
        job_id: format!(
            "PJ{}{:03}",
            now.timestamp_millis(),
            rand::thread_rng().gen_range(0..1000)
        ),
        user_id: user_id.to_string(),
        file_name: request.file_name.clone(),
        location: request.location.clone(),
        copies: request.copies,
        pages: request.pages,
        color: request.color,
        duplex: request.duplex,
        cost_cents: print_cost_cents(request.copies, request.pages, request.color, request.duplex),
        status: PRINT_PENDING.to_string(),
        created_at: now,
    })
}

#[derive(Clone)]
pub struct ToolsService {
    store: Arc<dyn ToolsStore>,
}

impl ToolsService {
    pub fn new(store: Arc<dyn ToolsStore>) -> Self {
        Self { store }
    }

    pub async fn book_room(&self, user_id: &str, request: &NewRoomBooking) -> AppResult<RoomBooking> {
        validate_booking(request)?;
        let booking = self.store.book_room(user_id, request).await?;
        tracing::info!(
            "Room {} booked by {} on {} {}-{}",
            booking.room_name,
            user_id,
            booking.booking_date,
            booking.start_time.format("%H:%M"),
            booking.end_time.format("%H:%M")
        );
        Ok(booking)
    }

    pub async fn bookings(&self, user_id: &str) -> AppResult<Vec<RoomBooking>> {
        self.store.bookings(user_id).await
    }

    pub async fn submit_print_job(&self, user_id: &str, request: &NewPrintJob) -> AppResult<PrintJob> {
        let job = quote_print_job(user_id, request)?;
        let job = self.store.save_print_job(&job).await?;
        tracing::info!("Print job {} queued at {} for {} cents", job.job_id, job.location, job.cost_cents);
        Ok(job)
    }

    pub async fn print_jobs(&self, user_id: &str) -> AppResult<Vec<PrintJob>> {
        self.store.print_jobs(user_id).await
    }
}

pub struct PgToolsStore {
    db: Arc<PgPool>,
}

impl PgToolsStore {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ToolsStore for PgToolsStore {
    async fn book_room(&self, user_id: &str, request: &NewRoomBooking) -> AppResult<RoomBooking> {
        let mut tx = self.db.begin().await?;

        // Serializes bookings of one room and day until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1 || '/' || $2::text))")
            .bind(&request.room_name)
            .bind(request.booking_date)
            .execute(&mut *tx)
            .await?;

        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM room_bookings
                WHERE room_name = $1
                  AND booking_date = $2
                  AND status = $3
                  AND start_time < $5
                  AND $4 < end_time
            )
            "#,
        )
        .bind(&request.room_name)
        .bind(request.booking_date)
        .bind(BOOKING_CONFIRMED)
        .bind(request.start_time)
        .bind(request.end_time)
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Err(slot_taken());
        }

        let booking = sqlx::query_as::<_, RoomBooking>(
            r#"
            INSERT INTO room_bookings
                (id, user_id, room_name, booking_date, start_time, end_time, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id, user_id, room_name, booking_date, start_time, end_time, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&request.room_name)
        .bind(request.booking_date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(BOOKING_CONFIRMED)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    async fn bookings(&self, user_id: &str) -> AppResult<Vec<RoomBooking>> {
        let bookings = sqlx::query_as::<_, RoomBooking>(
            r#"
            SELECT id, user_id, room_name, booking_date, start_time, end_time, status, created_at
            FROM room_bookings
            WHERE user_id = $1
            ORDER BY booking_date DESC, start_time DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(bookings)
    }

    async fn save_print_job(&self, job: &PrintJob) -> AppResult<PrintJob> {
        let saved = sqlx::query_as::<_, PrintJob>(
            r#"
            INSERT INTO print_jobs
                (id, job_id, user_id, file_name, location, copies, pages, color, duplex,
                 cost_cents, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, job_id, user_id, file_name, location, copies, pages, color, duplex,
                      cost_cents, status, created_at
            "#,
        )
        .bind(job.id)
        .bind(&job.job_id)
        .bind(&job.user_id)
        .bind(&job.file_name)
        .bind(&job.location)
        .bind(job.copies)
        .bind(job.pages)
        .bind(job.color)
        .bind(job.duplex)
        .bind(job.cost_cents)
        .bind(&job.status)
        .bind(job.created_at)
        .fetch_one(&*self.db)
        .await?;

        Ok(saved)
    }

    async fn print_jobs(&self, user_id: &str) -> AppResult<Vec<PrintJob>> {
        let jobs = sqlx::query_as::<_, PrintJob>(
            r#"
            SELECT id, job_id, user_id, file_name, location, copies, pages, color, duplex,
                   cost_cents, status, created_at
            FROM print_jobs
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(jobs)
    }
}

#[derive(Default)]
struct ToolsLog {
    bookings: Vec<RoomBooking>,
    print_jobs: Vec<PrintJob>,
}

/// In-process store used when no database is configured
#[derive(Default)]
pub struct MemoryToolsStore {
    log: Mutex<ToolsLog>,
}

impl MemoryToolsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_log<T>(&self, f: impl FnOnce(&mut ToolsLog) -> T) -> T {
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut log)
    }
}

#[async_trait]
impl ToolsStore for MemoryToolsStore {
    async fn book_room(&self, user_id: &str, request: &NewRoomBooking) -> AppResult<RoomBooking> {
        self.with_log(|log| {
            let taken = log.bookings.iter().any(|b| {
                b.status == BOOKING_CONFIRMED
                    && b.overlaps(
                        &request.room_name,
                        request.booking_date,
                        request.start_time,
                        request.end_time,
                    )
            });
            if taken {
                return Err(slot_taken());
            }

            let booking = RoomBooking {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                room_name: request.room_name.clone(),
                booking_date: request.booking_date,
                start_time: request.start_time,
                end_time: request.end_time,
                status: BOOKING_CONFIRMED.to_string(),
                created_at: Utc::now(),
            };
            log.bookings.push(booking.clone());
            Ok(booking)
        })
    }

    async fn bookings(&self, user_id: &str) -> AppResult<Vec<RoomBooking>> {
        let mut bookings: Vec<RoomBooking> = self.with_log(|log| {
            log.bookings
                .iter()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect()
        });
        bookings.sort_by(|a, b| {
            (b.booking_date, b.start_time).cmp(&(a.booking_date, a.start_time))
        });
        Ok(bookings)
    }

    async fn save_print_job(&self, job: &PrintJob) -> AppResult<PrintJob> {
        self.with_log(|log| log.print_jobs.push(job.clone()));
        Ok(job.clone())
    }

    async fn print_jobs(&self, user_id: &str) -> AppResult<Vec<PrintJob>> {
        Ok(self.with_log(|log| {
            log.print_jobs
                .iter()
                .rev()
                .filter(|j| j.user_id == user_id)
                .cloned()
                .collect()
        }))
    }
}
