//! Configuration values the engine consumes.
//!
//! The engine never parses configuration itself; the composition root builds
//! these values (from flags, environment, or test fixtures) and hands them in.

use std::collections::HashSet;

use chrono::Duration;

use crate::{AgeThreshold, ApprovalThreshold, EngineError, Handle, TeamName};

/// The people and teams whose pull requests a run cares about.
///
/// Either set may be empty. An empty roster makes every pull request irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRoster {
    members: HashSet<Handle>,
    teams: HashSet<TeamName>,
}

impl TeamRoster {
    /// Creates a roster from member logins and team slugs.
    pub fn new(
        members: impl IntoIterator<Item = Handle>,
        teams: impl IntoIterator<Item = TeamName>,
    ) -> Self {
        Self {
            members: members.into_iter().collect(),
            teams: teams.into_iter().collect(),
        }
    }

    /// Returns `true` if `handle` is a tracked member.
    pub fn tracks_member(&self, handle: &Handle) -> bool {
        self.members.contains(handle)
    }

    /// Returns `true` if `team` is a tracked team.
    pub fn tracks_team(&self, team: &TeamName) -> bool {
        self.teams.contains(team)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }
}

/// Thresholds that drive classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationPolicy {
    /// Approvals needed for [`crate::Category::Approved`].
    pub approvals: ApprovalThreshold,
    /// Age at which a pull request becomes [`crate::Category::Old`].
    pub old_after: AgeThreshold,
}

impl ClassificationPolicy {
    /// Creates a policy.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if `old_after` is negative.
    pub fn new(approvals: u32, old_after: Duration) -> Result<Self, EngineError> {
        let old_after = AgeThreshold::new(old_after).ok_or_else(|| {
            EngineError::invalid_input(format!(
                "age threshold must not be negative (got {} seconds)",
                old_after.num_seconds()
            ))
        })?;
        Ok(Self {
            approvals: ApprovalThreshold::new(approvals),
            old_after,
        })
    }

    /// Creates a policy with an age threshold in whole days.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if `days` does not fit a duration.
    pub fn with_days(approvals: u32, days: u32) -> Result<Self, EngineError> {
        let old_after = AgeThreshold::from_days(days).ok_or_else(|| {
            EngineError::invalid_input(format!("age threshold of {days} days is out of range"))
        })?;
        Ok(Self {
            approvals: ApprovalThreshold::new(approvals),
            old_after,
        })
    }
}
