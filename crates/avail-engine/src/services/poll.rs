//! Poll publisher service
//!
//! Posts the weekly availability grid (one message per day, slot
//! affordances attached) and retires it again. Poll index entries for a
//! whole cycle are written in a single batched append; deletion is
//! re-runnable and converges even after a partial failure.

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Utc};
use tracing::{info, instrument, warn};

use avail_core::{
    AvailabilityPoll, DomainError, League, RepoResult, Snowflake, Weekday,
};

use crate::dto::{DeletePollReport, PostPollReport};

use super::context::EngineContext;

/// Poll publisher service
pub struct PollService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> PollService<'a> {
    /// Create a new PollService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Post the weekly grid for a league into a channel.
    ///
    /// If active polls already exist for (league, channel), the invoking
    /// user is asked to confirm superseding them; declining (or a
    /// confirmation timeout) aborts with no state change.
    #[instrument(skip(self))]
    pub async fn post_poll(
        &self,
        channel_id: Snowflake,
        league: &League,
    ) -> RepoResult<PostPollReport> {
        self.ctx.require_league(league)?;

        let existing = self
            .ctx
            .polls()
            .find_by_league_channel(league, channel_id)
            .await?;
        if !existing.is_empty() {
            let prompt = format!(
                "Availability polls for {league} already exist in this channel. Replace them?"
            );
            if !self.ctx.confirm().confirm(channel_id, &prompt).await {
                return Err(DomainError::ConfirmationDeclined);
            }
            self.delete_poll(channel_id, league).await?;
        }

        self.post_week(channel_id, league, Utc::now().date_naive())
            .await
    }

    /// Post the seven day messages for the week containing `today`.
    ///
    /// Takes the date explicitly so the label computation is testable.
    pub async fn post_week(
        &self,
        channel_id: Snowflake,
        league: &League,
        today: NaiveDate,
    ) -> RepoResult<PostPollReport> {
        let mut polls = Vec::with_capacity(7);
        for (_, label) in week_labels(league, today) {
            let message_id = self
                .ctx
                .chat()
                .send_message(channel_id, &format!("**{label}**"))
                .await?;

            // A missing affordance degrades the poll but does not abort it
            for slot in self.ctx.slots().slots() {
                if let Err(e) = self.ctx.chat().add_reaction(channel_id, message_id, slot).await {
                    warn!(message = %message_id, slot = %slot, error = %e, "failed to attach slot affordance");
                }
            }

            polls.push(AvailabilityPoll::new(
                league.clone(),
                channel_id,
                message_id,
                label,
            ));
        }

        // One batched append for the whole cycle, not one per day
        self.ctx.polls().create_batch(&polls).await?;

        if let Err(e) = self.ctx.index().refresh().await {
            warn!(error = %e, "poll index refresh failed after post; TTL will catch up");
        }

        info!(league = %league, channel = %channel_id, posted = polls.len(), "availability polls posted");
        Ok(PostPollReport {
            league: league.clone(),
            posted: polls.len(),
        })
    }

    /// Delete a league's polls from a channel: best-effort message
    /// deletes, then batched record and index cleanup.
    ///
    /// Safe to re-run: already-absent messages and rows never error.
    #[instrument(skip(self))]
    pub async fn delete_poll(
        &self,
        channel_id: Snowflake,
        league: &League,
    ) -> RepoResult<DeletePollReport> {
        self.ctx.require_league(league)?;

        let polls = self
            .ctx
            .polls()
            .find_by_league_channel(league, channel_id)
            .await?;
        let message_ids: Vec<Snowflake> = polls.iter().map(|p| p.message_id).collect();

        let mut messages_deleted = 0;
        for message_id in &message_ids {
            match self.delete_message_retried(channel_id, *message_id).await {
                Ok(()) => messages_deleted += 1,
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    warn!(message = %message_id, error = %e, "could not delete poll message");
                }
            }
        }

        // Records are purged even when message deletes failed
        let records_deleted = self
            .ctx
            .records()
            .delete_by_messages(league, &message_ids)
            .await?;
        let polls_deleted = self
            .ctx
            .polls()
            .delete_by_league_channel(league, channel_id)
            .await?;

        if let Err(e) = self.ctx.index().refresh().await {
            warn!(error = %e, "poll index refresh failed after delete; TTL will catch up");
        }

        info!(
            league = %league,
            channel = %channel_id,
            messages_deleted,
            records_deleted,
            polls_deleted,
            "availability polls deleted"
        );
        Ok(DeletePollReport {
            league: league.clone(),
            messages_deleted,
            records_deleted,
            polls_deleted,
        })
    }

    /// Individual message deletes are cheap to retry once on a transient
    /// failure before giving up on that message.
    async fn delete_message_retried(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> RepoResult<()> {
        match self.ctx.chat().delete_message(channel_id, message_id).await {
            Err(e) if e.is_transient() => {
                self.ctx.chat().delete_message(channel_id, message_id).await
            }
            other => other,
        }
    }
}

/// The seven (weekday, label) pairs for the week containing `today`,
/// Sunday first. Labels look like "MONDAY 04/14 | HC".
#[must_use]
pub fn week_labels(league: &League, today: NaiveDate) -> Vec<(Weekday, String)> {
    let days_since_sunday = i64::from(today.weekday().num_days_from_sunday());
    let sunday = today - ChronoDuration::days(days_since_sunday);

    (0..7)
        .map(|offset| {
            let date = sunday + ChronoDuration::days(offset);
            let day = Weekday::from_chrono(date.weekday());
            let label = format!("{} {} | {}", day, date.format("%m/%d"), league);
            (day, label)
        })
        .collect()
}
