//! Reconciliation / query service
//!
//! On-demand aggregation over current store state. Absence of data is a
//! valid empty result, never an error. Duplicate rows for one fact
//! (an observed invariant violation) are collapsed here on read.

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{instrument, warn};

use avail_core::{AvailabilityRecord, FactKey, League, RepoResult, Weekday};

use crate::dto::{DayCounts, DayRoster, LeagueAvailability, SlotCount, UserSlots};

use super::context::EngineContext;

/// Availability query service
pub struct QueryService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> QueryService<'a> {
    /// Create a new QueryService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Per-slot counts for every day of the week, in week order and
    /// canonical slot order. Days without signals report zero counts.
    #[instrument(skip(self))]
    pub async fn check_availability(&self, league: &League) -> RepoResult<LeagueAvailability> {
        self.ctx.require_league(league)?;
        let records = self.read_deduped(league).await?;

        let mut counts: HashMap<(Weekday, &str), u32> = HashMap::new();
        for record in &records {
            let Some(day) = record.weekday() else {
                warn!(day_label = %record.day_label, "record with unparseable day; skipping");
                continue;
            };
            if let Some(position) = self.ctx.slots().position(&record.emoji) {
                let slot = self.ctx.slots().slots()[position].as_str();
                *counts.entry((day, slot)).or_insert(0) += 1;
            }
        }

        let days = Weekday::ALL
            .into_iter()
            .map(|day| DayCounts {
                day,
                slots: self
                    .ctx
                    .slots()
                    .slots()
                    .iter()
                    .map(|slot| SlotCount {
                        emoji: slot.clone(),
                        count: counts.get(&(day, slot.as_str())).copied().unwrap_or(0),
                    })
                    .collect(),
            })
            .collect();

        Ok(LeagueAvailability {
            league: league.clone(),
            days,
        })
    }

    /// Per-user slot listing for one (league, day). Each user's slots are
    /// ordered canonically regardless of insertion order.
    #[instrument(skip(self))]
    pub async fn view_availability(&self, league: &League, day: Weekday) -> RepoResult<DayRoster> {
        self.ctx.require_league(league)?;
        let records = self.read_deduped(league).await?;

        let mut users: BTreeMap<i64, UserSlots> = BTreeMap::new();
        for record in records {
            if record.weekday() != Some(day) {
                continue;
            }
            let entry = users
                .entry(record.user_id.into_inner())
                .or_insert_with(|| UserSlots {
                    user_id: record.user_id,
                    user_name: record.user_name.clone(),
                    slots: Vec::new(),
                });
            entry.slots.push(record.emoji);
        }

        let mut users: Vec<UserSlots> = users.into_values().collect();
        for user in &mut users {
            self.ctx.slots().sort(&mut user.slots);
        }

        Ok(DayRoster {
            league: league.clone(),
            day,
            users,
        })
    }

    /// Read a league's records, collapsing duplicate facts on read
    async fn read_deduped(&self, league: &League) -> RepoResult<Vec<AvailabilityRecord>> {
        let records = self.ctx.records().find_by_league(league).await?;

        let mut seen: HashSet<FactKey> = HashSet::with_capacity(records.len());
        let mut deduped = Vec::with_capacity(records.len());
        let mut duplicates = 0;
        for record in records {
            if seen.insert(record.fact_key()) {
                deduped.push(record);
            } else {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            warn!(league = %league, duplicates, "duplicate rows observed; collapsed on read");
        }
        Ok(deduped)
    }
}
