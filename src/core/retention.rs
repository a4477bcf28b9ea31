//! Snapshot retention: exponential thinning of prerelease builds.
//!
//! Policy, with the default tier widths of 30, 60, 120 and 240 days:
//! 1. Stable releases are always kept.
//! 2. Builds from the last 30 days are all kept.
//! 3. For the next 60 days, keep the last build of days whose number is 0 mod 2.
//! 4. For the next 120 days, the last build of days that are 0 mod 4.
//! 5. For the next 240 days, the last build of days that are 0 mod 8.
//! 6. Anything older than the four tiers combined is deleted.
//!
//! At one build per day this settles at about 30 builds per tier, 120 in
//! total, plus every stable release.
//!
//! Ages are whole UTC calendar days: time of day is dropped before
//! subtracting. Bucket membership depends on `now`, so a plan must be
//! recomputed from scratch whenever the date changes.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::core::data::SnapshotDescriptor;

pub const DEFAULT_TIER_WIDTHS: [u32; 4] = [30, 60, 120, 240];

const SECONDS_PER_DAY: i64 = 86_400;

/// Widths, in days, of the four consecutive retention tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    tier_widths: [u32; 4],
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TIER_WIDTHS)
    }
}

impl RetentionPolicy {
    pub fn new(tier_widths: [u32; 4]) -> Self {
        Self { tier_widths }
    }

    /// Age in days past which every prerelease is deleted.
    pub fn horizon(&self) -> i64 {
        self.tier_widths.iter().map(|w| i64::from(*w)).sum()
    }

    /// Tier of a snapshot `age_days` old, `None` beyond the horizon.
    ///
    /// Snapshots dated after `now` count as tier 0.
    pub fn tier_of(&self, age_days: i64) -> Option<u32> {
        if age_days > self.horizon() {
            return None;
        }
        let mut upper = 0i64;
        for (tier, width) in (0u32..).zip(self.tier_widths) {
            upper += i64::from(width);
            if age_days < upper {
                return Some(tier);
            }
        }
        // age == horizon belongs to the last tier
        Some(3)
    }
}

/// Outcome for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Stable release, never deleted.
    Stable,
    /// Inside tier 0, where nothing is thinned.
    Recent,
    /// Latest build of a retained day in `tier`.
    Thinned { tier: u32 },
    /// Day number is not a multiple of `2^tier`.
    OffCadence { tier: u32 },
    /// A more recent build of the same day was already kept.
    Superseded { tier: u32 },
    /// Older than the horizon.
    Expired,
}

impl Decision {
    pub fn is_kept(&self) -> bool {
        matches!(
            self,
            Decision::Stable | Decision::Recent | Decision::Thinned { .. }
        )
    }
}

/// The decision for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub build_number: String,
    /// Age in calendar days; `None` for stable releases.
    pub age_days: Option<i64>,
    pub decision: Decision,
}

/// Decisions for a set of snapshots, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    pub verdicts: Vec<Verdict>,
}

impl RetentionPlan {
    /// Ids of the snapshots to delete.
    pub fn deleted_ids(&self) -> BTreeSet<String> {
        self.verdicts
            .iter()
            .filter(|v| !v.decision.is_kept())
            .map(|v| v.build_number.clone())
            .collect()
    }

    pub fn deleted(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.decision.is_kept())
    }

    /// The surviving snapshots, most recent first.
    pub fn survivors(&self, snapshots: &[SnapshotDescriptor]) -> Vec<SnapshotDescriptor> {
        let deleted = self.deleted_ids();
        let mut kept: Vec<SnapshotDescriptor> = snapshots
            .iter()
            .filter(|s| !deleted.contains(&s.build_number))
            .cloned()
            .collect();
        sort_newest_first(&mut kept);
        kept
    }
}

/// Days since the Unix epoch of the UTC calendar day containing `at`.
pub fn day_number(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(SECONDS_PER_DAY)
}

/// Newest first; the sort is stable, so equal timestamps keep input order.
pub fn sort_newest_first(snapshots: &mut [SnapshotDescriptor]) {
    snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Decide which snapshots to keep.
///
/// Pure in its inputs: the same snapshots, `now` and policy always produce
/// the same plan.
pub fn plan(
    snapshots: &[SnapshotDescriptor],
    now: DateTime<Utc>,
    policy: &RetentionPolicy,
) -> RetentionPlan {
    let mut ordered: Vec<&SnapshotDescriptor> = snapshots.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let today = day_number(now);
    let mut kept_days: HashSet<i64> = HashSet::new();
    let mut verdicts = Vec::with_capacity(ordered.len());

    for snapshot in ordered {
        if snapshot.is_stable() {
            verdicts.push(Verdict {
                build_number: snapshot.build_number.clone(),
                age_days: None,
                decision: Decision::Stable,
            });
            continue;
        }

        let day = day_number(snapshot.created_at);
        let age_days = today - day;
        let decision = match policy.tier_of(age_days) {
            None => Decision::Expired,
            Some(0) => {
                kept_days.insert(day);
                Decision::Recent
            }
            Some(tier) => {
                if day.rem_euclid(1i64 << tier) != 0 {
                    Decision::OffCadence { tier }
                } else if !kept_days.insert(day) {
                    Decision::Superseded { tier }
                } else {
                    Decision::Thinned { tier }
                }
            }
        };

        verdicts.push(Verdict {
            build_number: snapshot.build_number.clone(),
            age_days: Some(age_days),
            decision,
        });
    }

    RetentionPlan { verdicts }
}
