use crate::models::conversation::{ConversationState, OnboardingStep};
use crate::models::users::{DayEntry, DayPatch, User, DAILY_LOG_CAP};

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Raw users row; state tags are decoded into the closed enums on the way
/// out so an unknown tag surfaces as a storage error instead of silently
/// routing as idle.
#[derive(FromRow)]
struct UserRow {
    identity: String,
    display_name: Option<String>,
    onboarding_complete: bool,
    onboarding_step: String,
    morning_time: String,
    evening_time: String,
    last_morning_notified: Option<NaiveDate>,
    last_evening_notified: Option<NaiveDate>,
    conversation_state: Option<String>,
    last_response_date: Option<NaiveDate>,
    current_streak: i32,
    longest_streak: i32,
    total_completed_days: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl UserRow {
    fn into_user(self) -> Result<User, anyhow::Error> {
        let onboarding_step = OnboardingStep::parse(&self.onboarding_step)
            .ok_or_else(|| anyhow!("Unknown onboarding step tag: {}", self.onboarding_step))?;
        let conversation_state = match self.conversation_state {
            Some(tag) => Some(
                ConversationState::parse(&tag)
                    .ok_or_else(|| anyhow!("Unknown conversation state tag: {}", tag))?,
            ),
            None => None,
        };

        Ok(User {
            identity: self.identity,
            display_name: self.display_name,
            onboarding_complete: self.onboarding_complete,
            onboarding_step,
            morning_time: self.morning_time,
            evening_time: self.evening_time,
            last_morning_notified: self.last_morning_notified,
            last_evening_notified: self.last_evening_notified,
            conversation_state,
            last_response_date: self.last_response_date,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            total_completed_days: self.total_completed_days,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct UserRepository {
    conn: PgPool,
    default_morning_time: String,
    default_evening_time: String,
}

impl UserRepository {
    pub fn new(conn: PgPool, default_morning_time: String, default_evening_time: String) -> Self {
        Self {
            conn,
            default_morning_time,
            default_evening_time,
        }
    }

    /// Loads a user and their recent daily log, creating the record with
    /// defaults on first contact.
    pub async fn load_or_create(
        &self,
        identity: &str,
    ) -> Result<(User, Vec<DayEntry>), anyhow::Error> {
        let row = match self.fetch_user(identity).await? {
            Some(row) => row,
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO users (identity, morning_time, evening_time)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (identity) DO NOTHING
                    "#,
                )
                .bind(identity)
                .bind(&self.default_morning_time)
                .bind(&self.default_evening_time)
                .execute(&self.conn)
                .await?;

                log::info!("Users: created record for {}.", identity);
                self.fetch_user(identity)
                    .await?
                    .ok_or_else(|| anyhow!("User {} missing right after insert", identity))?
            }
        };

        let user = row.into_user()?;
        let log = self.recent_entries(identity).await?;
        Ok((user, log))
    }

    /// Persists one conversation turn atomically: the user row, the merge
    /// of the day patch, the log wipe on reset, and the cap prune all
    /// commit together or not at all.
    pub async fn save_turn(
        &self,
        user: &User,
        patch: Option<&DayPatch>,
        clear_log: bool,
    ) -> Result<(), anyhow::Error> {
        let mut tx = self.conn.begin().await?;

        sqlx::query(
            r#"
            UPDATE users SET
                display_name = $2,
                onboarding_complete = $3,
                onboarding_step = $4,
                morning_time = $5,
                evening_time = $6,
                last_morning_notified = $7,
                last_evening_notified = $8,
                conversation_state = $9,
                last_response_date = $10,
                current_streak = $11,
                longest_streak = $12,
                total_completed_days = $13,
                updated_at = NOW()
            WHERE identity = $1
            "#,
        )
        .bind(&user.identity)
        .bind(&user.display_name)
        .bind(user.onboarding_complete)
        .bind(user.onboarding_step.as_str())
        .bind(&user.morning_time)
        .bind(&user.evening_time)
        .bind(user.last_morning_notified)
        .bind(user.last_evening_notified)
        .bind(user.conversation_state.map(|state| state.as_str()))
        .bind(user.last_response_date)
        .bind(user.current_streak)
        .bind(user.longest_streak)
        .bind(user.total_completed_days)
        .execute(&mut *tx)
        .await?;

        if clear_log {
            sqlx::query("DELETE FROM day_entries WHERE user_identity = $1")
                .bind(&user.identity)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(patch) = patch {
            let entry_id = Uuid::new_v4().hyphenated().to_string();
            sqlx::query(
                r#"
                INSERT INTO day_entries
                    (id, user_identity, date, coded_today, mood, evening_mood,
                     plan, accomplishment, blocker, learning)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (user_identity, date) DO UPDATE SET
                    coded_today = COALESCE(EXCLUDED.coded_today, day_entries.coded_today),
                    mood = COALESCE(EXCLUDED.mood, day_entries.mood),
                    evening_mood = COALESCE(EXCLUDED.evening_mood, day_entries.evening_mood),
                    plan = COALESCE(EXCLUDED.plan, day_entries.plan),
                    accomplishment = COALESCE(EXCLUDED.accomplishment, day_entries.accomplishment),
                    blocker = COALESCE(EXCLUDED.blocker, day_entries.blocker),
                    learning = COALESCE(EXCLUDED.learning, day_entries.learning)
                "#,
            )
            .bind(&entry_id)
            .bind(&user.identity)
            .bind(patch.date)
            .bind(patch.coded_today)
            .bind(&patch.mood)
            .bind(&patch.evening_mood)
            .bind(&patch.plan)
            .bind(&patch.accomplishment)
            .bind(&patch.blocker)
            .bind(&patch.learning)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                DELETE FROM day_entries
                WHERE user_identity = $1 AND date NOT IN (
                    SELECT date FROM day_entries
                    WHERE user_identity = $1
                    ORDER BY date DESC
                    LIMIT $2
                )
                "#,
            )
            .bind(&user.identity)
            .bind(DAILY_LOG_CAP)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Onboarded users whose morning time matches and who have not been
    /// nudged yet today.
    pub async fn find_due_morning(
        &self,
        current_time: &str,
        today: NaiveDate,
    ) -> Result<Vec<String>, anyhow::Error> {
        let identities = sqlx::query_scalar::<_, String>(
            r#"
            SELECT identity FROM users
            WHERE onboarding_complete
              AND morning_time = $1
              AND last_morning_notified IS DISTINCT FROM $2
            "#,
        )
        .bind(current_time)
        .bind(today)
        .fetch_all(&self.conn)
        .await?;

        Ok(identities)
    }

    /// Onboarded users whose evening time matches, not yet nudged today,
    /// and without a recorded answer for today.
    pub async fn find_due_evening(
        &self,
        current_time: &str,
        today: NaiveDate,
    ) -> Result<Vec<String>, anyhow::Error> {
        let identities = sqlx::query_scalar::<_, String>(
            r#"
            SELECT identity FROM users
            WHERE onboarding_complete
              AND evening_time = $1
              AND last_evening_notified IS DISTINCT FROM $2
              AND last_response_date IS DISTINCT FROM $2
            "#,
        )
        .bind(current_time)
        .bind(today)
        .fetch_all(&self.conn)
        .await?;

        Ok(identities)
    }

    async fn fetch_user(&self, identity: &str) -> Result<Option<UserRow>, anyhow::Error> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE identity = $1")
            .bind(identity)
            .fetch_optional(&self.conn)
            .await?;

        Ok(row)
    }

    async fn recent_entries(&self, identity: &str) -> Result<Vec<DayEntry>, anyhow::Error> {
        let mut entries = sqlx::query_as::<_, DayEntry>(
            r#"
            SELECT * FROM day_entries
            WHERE user_identity = $1
            ORDER BY date DESC
            LIMIT $2
            "#,
        )
        .bind(identity)
        .bind(DAILY_LOG_CAP)
        .fetch_all(&self.conn)
        .await?;

        entries.reverse();
        Ok(entries)
    }
}
