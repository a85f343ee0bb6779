// Campus events
// Upcoming events served through the shared cache, plus capacity-checked registration

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::cache::Cache;
use crate::cache::keys::event_keys::{UPCOMING_EVENTS_KEY, UPCOMING_EVENTS_TTL};
use crate::error::{AppError, AppResult};
use crate::mock::fixtures;
use crate::models::{CampusEvent, EventDetails, EventRegistration, UserEventRegistration};

pub const REGISTERED: &str = "registered";

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events dated `from` or later, soonest first
    async fn upcoming_events(&self, from: NaiveDate) -> AppResult<Vec<CampusEvent>>;

    async fn event_details(&self, event_id: &str) -> AppResult<Option<EventDetails>>;

    /// Fails with Conflict when the user is already registered or the event is full
    async fn register(&self, event_id: &str, user_id: &str) -> AppResult<EventRegistration>;

    /// The user's registrations with their events, newest first
    async fn user_registrations(&self, user_id: &str) -> AppResult<Vec<UserEventRegistration>>;
}

fn already_registered() -> AppError {
    AppError::Conflict("Already registered for this event".to_string())
}

fn ensure_capacity(event: &CampusEvent, registered: i64) -> AppResult<()> {
    match event.max_attendees {
        Some(max) if registered >= i64::from(max) => {
            Err(AppError::Conflict("Event is full".to_string()))
        }
        _ => Ok(()),
    }
}

fn event_not_found() -> AppError {
    AppError::NotFound("Event not found".to_string())
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    cache: Cache,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, cache: Cache) -> Self {
        Self { store, cache }
    }

    pub async fn upcoming(&self) -> AppResult<Vec<CampusEvent>> {
        if let Some(cached) = self.cache.get(UPCOMING_EVENTS_KEY).await {
            tracing::debug!("Cache hit: {}", UPCOMING_EVENTS_KEY);
            return Ok(cached);
        }

        let events = self.store.upcoming_events(Utc::now().date_naive()).await?;
        self.cache
            .set(UPCOMING_EVENTS_KEY, &events, Some(UPCOMING_EVENTS_TTL))
            .await;
        Ok(events)
    }

    pub async fn details(&self, event_id: &str) -> AppResult<EventDetails> {
        self.store
            .event_details(event_id)
            .await?
            .ok_or_else(event_not_found)
    }

    pub async fn register(&self, event_id: &str, user_id: &str) -> AppResult<EventRegistration> {
        let registration = self.store.register(event_id, user_id).await?;
        self.cache.delete(UPCOMING_EVENTS_KEY).await;
        tracing::info!("User {} registered for event {}", user_id, event_id);
        Ok(registration)
    }

    pub async fn registrations(&self, user_id: &str) -> AppResult<Vec<UserEventRegistration>> {
        self.store.user_registrations(user_id).await
    }
}

const EVENT_COLUMNS: &str = "id, name, description, event_type, date, start_time, end_time, \
                             location, max_attendees, ai_points";

/// A registration joined with its event
#[derive(FromRow)]
struct UserRegistrationRow {
    registration_id: Uuid,
    user_id: String,
    status: String,
    registered_at: DateTime<Utc>,
    id: String,
    name: String,
    description: String,
    event_type: String,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    location: String,
    max_attendees: Option<i32>,
    ai_points: i32,
}

impl From<UserRegistrationRow> for UserEventRegistration {
    fn from(row: UserRegistrationRow) -> Self {
        UserEventRegistration {
            registration: EventRegistration {
                id: row.registration_id,
                event_id: row.id.clone(),
                user_id: row.user_id,
                status: row.status,
                registered_at: row.registered_at,
            },
            event: CampusEvent {
                id: row.id,
                name: row.name,
                description: row.description,
                event_type: row.event_type,
                date: row.date,
                start_time: row.start_time,
                end_time: row.end_time,
                location: row.location,
                max_attendees: row.max_attendees,
                ai_points: row.ai_points,
            },
        }
    }
}

pub struct PgEventStore {
    db: Arc<PgPool>,
}

impl PgEventStore {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn upcoming_events(&self, from: NaiveDate) -> AppResult<Vec<CampusEvent>> {
        let events = sqlx::query_as::<_, CampusEvent>(&format!(
            "SELECT {} FROM events WHERE date >= $1 ORDER BY date ASC, start_time ASC",
            EVENT_COLUMNS
        ))
        .bind(from)
        .fetch_all(&*self.db)
        .await?;

        Ok(events)
    }

    async fn event_details(&self, event_id: &str) -> AppResult<Option<EventDetails>> {
        let event = sqlx::query_as::<_, CampusEvent>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .fetch_optional(&*self.db)
        .await?;
        let Some(event) = event else {
            return Ok(None);
        };

        let registrations = sqlx::query_as::<_, EventRegistration>(
            r#"
            SELECT id, event_id, user_id, status, registered_at
            FROM event_registrations
            WHERE event_id = $1
            ORDER BY registered_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(Some(EventDetails {
            event,
            registrations,
        }))
    }

    async fn register(&self, event_id: &str, user_id: &str) -> AppResult<EventRegistration> {
        let mut tx = self.db.begin().await?;

        // Row lock keeps concurrent registrations from overfilling the event
        let event = sqlx::query_as::<_, CampusEvent>(&format!(
            "SELECT {} FROM events WHERE id = $1 FOR UPDATE",
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(event_not_found)?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM event_registrations WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(already_registered());
        }

        let registered: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1 AND status = $2",
        )
        .bind(event_id)
        .bind(REGISTERED)
        .fetch_one(&mut *tx)
        .await?;
        ensure_capacity(&event, registered)?;

        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            INSERT INTO event_registrations (id, event_id, user_id, status, registered_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, event_id, user_id, status, registered_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .bind(REGISTERED)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(registration)
    }

    async fn user_registrations(&self, user_id: &str) -> AppResult<Vec<UserEventRegistration>> {
        let rows = sqlx::query_as::<_, UserRegistrationRow>(
            r#"
            SELECT r.id AS registration_id, r.user_id, r.status, r.registered_at,
                   e.id, e.name, e.description, e.event_type, e.date, e.start_time,
                   e.end_time, e.location, e.max_attendees, e.ai_points
            FROM event_registrations r
            JOIN events e ON e.id = r.event_id
            WHERE r.user_id = $1
            ORDER BY r.registered_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(rows.into_iter().map(UserEventRegistration::from).collect())
    }
}

#[derive(Default)]
struct Calendar {
    events: Vec<CampusEvent>,
    registrations: Vec<EventRegistration>,
}

/// In-process store used when no database is configured
pub struct MemoryEventStore {
    calendar: Mutex<Calendar>,
}

impl MemoryEventStore {
    pub fn new(events: Vec<CampusEvent>) -> Self {
        Self {
            calendar: Mutex::new(Calendar {
                events,
                registrations: Vec::new(),
            }),
        }
    }

    pub fn seeded() -> Self {
        Self::new(fixtures::events())
    }

    fn with_calendar<T>(&self, f: impl FnOnce(&mut Calendar) -> T) -> T {
        let mut calendar = self.calendar.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut calendar)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn upcoming_events(&self, from: NaiveDate) -> AppResult<Vec<CampusEvent>> {
        let mut events: Vec<CampusEvent> = self.with_calendar(|calendar| {
            calendar
                .events
                .iter()
                .filter(|e| e.date >= from)
                .cloned()
                .collect()
        });
        events.sort_by_key(|e| (e.date, e.start_time));
        Ok(events)
    }

    async fn event_details(&self, event_id: &str) -> AppResult<Option<EventDetails>> {
        Ok(self.with_calendar(|calendar| {
            let event = calendar.events.iter().find(|e| e.id == event_id)?.clone();
            let registrations = calendar
                .registrations
                .iter()
                .filter(|r| r.event_id == event_id)
                .cloned()
                .collect();
            Some(EventDetails {
                event,
                registrations,
            })
        }))
    }

    async fn register(&self, event_id: &str, user_id: &str) -> AppResult<EventRegistration> {
        self.with_calendar(|calendar| {
            let event = calendar
                .events
                .iter()
                .find(|e| e.id == event_id)
                .ok_or_else(event_not_found)?;

            let mut registered = 0;
            for r in calendar.registrations.iter().filter(|r| r.event_id == event_id) {
                if r.user_id == user_id {
                    return Err(already_registered());
                }
                if r.status == REGISTERED {
                    registered += 1;
                }
            }
            ensure_capacity(event, registered)?;

            let registration = EventRegistration {
                id: Uuid::new_v4(),
                event_id: event_id.to_string(),
                user_id: user_id.to_string(),
                status: REGISTERED.to_string(),
                registered_at: Utc::now(),
            };
            calendar.registrations.push(registration.clone());
            Ok(registration)
        })
    }

    async fn user_registrations(&self, user_id: &str) -> AppResult<Vec<UserEventRegistration>> {
        Ok(self.with_calendar(|calendar| {
            calendar
                .registrations
                .iter()
                .rev()
                .filter(|r| r.user_id == user_id)
                .filter_map(|r| {
                    let event = calendar.events.iter().find(|e| e.id == r.event_id)?;
                    Some(UserEventRegistration {
                        registration: r.clone(),
                        event: event.clone(),
                    })
                })
                .collect()
        }))
    }
}
