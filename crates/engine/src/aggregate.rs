//! End-to-end aggregation: snapshot in, [`DigestReport`] out.
//!
//! Runs the three pure stages in order:
//!
//! 1. [`relevance::filter_relevant`] keeps pull requests that matter to the roster.
//! 2. The survivors are stable-sorted by creation time, so ties keep discovery
//!    order (repository order, then source order within a repository).
//! 3. [`classify::classify`] assigns each one a category, then
//!    [`digest::build`] groups them.
//!
//! The snapshot is validated first. A broken snapshot is a caller bug and
//! fails the whole run instead of producing a partial report.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::{
    classify, digest, relevance, ClassificationPolicy, ClassifiedPullRequest, DigestReport,
    EngineError, FetchedPullRequest, IdentityResolver, TeamRoster, Timestamp,
};

/// Checks that every pull request is unique and owns all reviews supplied with it.
///
/// # Errors
///
/// - [`EngineError::DuplicatePullRequest`] on a repeated repository/number pair.
/// - [`EngineError::MisattributedReview`] when a review names another pull request.
pub fn validate(snapshot: &[FetchedPullRequest]) -> Result<(), EngineError> {
    let mut seen = HashSet::with_capacity(snapshot.len());
    for fetched in snapshot {
        let key = &fetched.pull_request.key;
        if !seen.insert(key) {
            return Err(EngineError::DuplicatePullRequest { key: key.clone() });
        }
        if let Some(review) = fetched.reviews.iter().find(|r| &r.pull_request != key) {
            return Err(EngineError::MisattributedReview {
                reviewer: review.reviewer.to_string(),
                review_of: review.pull_request.clone(),
                supplied_with: key.clone(),
            });
        }
    }
    Ok(())
}

/// Produces the summary and recipient digests for `snapshot` as of `now`.
///
/// # Errors
///
/// Returns an [`EngineError`] if the snapshot fails [`validate`].
#[tracing::instrument(skip_all, fields(pull_requests = snapshot.len()))]
pub fn aggregate<R>(
    snapshot: &[FetchedPullRequest],
    roster: &TeamRoster,
    policy: &ClassificationPolicy,
    resolver: &R,
    now: Timestamp,
) -> Result<DigestReport, EngineError>
where
    R: IdentityResolver + ?Sized,
{
    validate(snapshot)?;

    let mut relevant = relevance::filter_relevant(snapshot, roster);
    relevant.sort_by_key(|fetched| fetched.pull_request.created_at);

    let classified: Vec<ClassifiedPullRequest> = relevant
        .into_iter()
        .map(|fetched| {
            let category = classify::classify(&fetched.pull_request, &fetched.reviews, policy, now);
            debug!(
                pull_request = %fetched.pull_request.key,
                reviews = fetched.reviews.len(),
                %category,
                "Classified pull request"
            );
            ClassifiedPullRequest {
                pull_request: fetched.pull_request.clone(),
                category,
            }
        })
        .collect();

    let report = digest::build(&classified, resolver);

    info!(
        relevant = classified.len(),
        ignored = snapshot.len() - classified.len(),
        recipients = report.digests.len(),
        "Aggregated pull request digests"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::testing::{at, days, fetched, handle, pr, recipient, review};
    use crate::{
        Category, Handle, PullRequestKey, PullRequestNumber, RecipientId, RepositoryId, ReviewState,
    };

    fn roster() -> TeamRoster {
        TeamRoster::new([handle("alice"), handle("bob")], [])
    }

    fn policy() -> ClassificationPolicy {
        ClassificationPolicy::with_days(1, 7).unwrap()
    }

    fn nobody() -> HashMap<Handle, RecipientId> {
        HashMap::new()
    }

    #[test]
    fn test_duplicate_pull_request_is_rejected() {
        let snapshot = vec![fetched(pr(1, "alice"), vec![]), fetched(pr(1, "bob"), vec![])];
        let err = validate(&snapshot).unwrap_err();
        assert!(matches!(err, EngineError::DuplicatePullRequest { .. }));
    }

    #[test]
    fn test_same_number_in_other_repository_is_fine() {
        let mut other = pr(1, "bob");
        other.key = PullRequestKey::new(
            RepositoryId::parse("acme/gadgets").unwrap(),
            PullRequestNumber::new(1),
        );
        let snapshot = vec![fetched(pr(1, "alice"), vec![]), fetched(other, vec![])];
        assert!(validate(&snapshot).is_ok());
    }

    #[test]
    fn test_misattributed_review_is_rejected() {
        let snapshot = vec![fetched(
            pr(1, "alice"),
            vec![review(2, "bob", ReviewState::Approved, 1)],
        )];
        let err = aggregate(&snapshot, &roster(), &policy(), &nobody(), at(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Review by 'bob' names acme/widgets#2 but was supplied with acme/widgets#1"
        );
    }

    #[test]
    fn test_orders_by_creation_then_discovery() {
        let mut late = pr(1, "alice");
        late.created_at = at(10);
        let mut tie_a = pr(2, "alice");
        tie_a.created_at = at(5);
        let mut tie_b = pr(3, "bob");
        tie_b.created_at = at(5);
        let snapshot = vec![
            fetched(late, vec![]),
            fetched(tie_a, vec![]),
            fetched(tie_b, vec![]),
        ];

        let report = aggregate(&snapshot, &roster(), &policy(), &nobody(), at(11)).unwrap();
        let order: Vec<u64> = report.summary.groups()[0]
            .pull_requests
            .iter()
            .map(|r| r.key.number.as_u64())
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let mut requested = pr(2, "mallory");
        requested.requested_reviewers.insert(handle("bob"));
        let snapshot = vec![
            fetched(pr(1, "alice"), vec![review(1, "bob", ReviewState::Approved, 1)]),
            fetched(requested, vec![]),
            fetched(pr(3, "mallory"), vec![]),
        ];
        let resolver = HashMap::from([
            (handle("alice"), recipient("U_ALICE")),
            (handle("bob"), recipient("U_BOB")),
        ]);

        let report = aggregate(&snapshot, &roster(), &policy(), &resolver, at(days(8))).unwrap();

        assert_eq!(report.summary.total(), 2);
        assert_eq!(report.summary.groups()[0].category, Category::Approved);
        assert_eq!(report.summary.groups()[1].category, Category::Old);
        assert_eq!(report.digests[&recipient("U_ALICE")].approved.len(), 1);
        assert_eq!(report.digests[&recipient("U_BOB")].review_requested.len(), 1);
    }
}
