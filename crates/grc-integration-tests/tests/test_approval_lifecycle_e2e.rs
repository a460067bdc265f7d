//! # Approval Lifecycle End-to-End
//!
//! Drives the full dual-track approval flow against one store:
//! Draft → UnderReview (A1) → RevisionRequired (R1) → UnderReview (A2)
//! → Approved (R2) → Active. Along the way verifies tag allocation,
//! append-only history, review-mark clearing, and the rejected-versions
//! inbox.

use grc_core::{
    ActivationState, Decision, EntityIdentifier, EntityKind, LifecycleStatus, Track, UserId,
    VersionTag,
};
use grc_snapshot::{PolicySnapshot, ReviewMark, Snapshot, SubPolicySnapshot};
use grc_store::MemoryStore;
use grc_workflow::{ApprovalWorkflow, CreateVersionRequest, Verdict};

const AUTHOR: UserId = UserId(7);
const REVIEWER: UserId = UserId(2);

fn ident(s: &str) -> EntityIdentifier {
    EntityIdentifier::new(s).unwrap()
}

fn policy_snapshot(identifier: &str) -> Snapshot {
    Snapshot::Policy(PolicySnapshot {
        name: "Access Control".to_string(),
        identifier: ident(identifier),
        description: "who may access what".to_string(),
        department: "Security".to_string(),
        scope: "org-wide".to_string(),
        objective: "least privilege".to_string(),
        subpolicies: vec![SubPolicySnapshot {
            name: "Password rotation".to_string(),
            identifier: ident("SUB-PW"),
            description: "rotation cadence".to_string(),
            control: "rotate every 90 days".to_string(),
            review: ReviewMark::pending(),
        }],
        review: ReviewMark::pending(),
    })
}

/// The snapshot as the reviewer hands it back: policy node rejected.
fn marked_snapshot(identifier: &str) -> Snapshot {
    let mut snapshot = policy_snapshot(identifier);
    if let Snapshot::Policy(p) = &mut snapshot {
        p.review = ReviewMark::rejected("fix scope");
    }
    snapshot
}

// ---------------------------------------------------------------------------
// Full flow: submit → reject → resubmit → approve
// ---------------------------------------------------------------------------

#[test]
fn full_reject_resubmit_approve_flow() {
    let wf = ApprovalWorkflow::permissive(MemoryStore::new());

    // 1. Draft policy.
    let created = wf
        .create_version(
            AUTHOR,
            CreateVersionRequest::Root {
                kind: EntityKind::Policy,
                identifier: ident("POL-AC"),
                name: "Access Control".to_string(),
                reviewer: Some(REVIEWER),
                owner: None,
                start_date: None,
                end_date: None,
            },
        )
        .unwrap();
    let entity = wf.store().get_entity(created.entity_id).unwrap();
    assert_eq!(entity.status, LifecycleStatus::Draft);
    assert_eq!(entity.activation, ActivationState::Inactive);
    assert_eq!(entity.current_label.to_string(), "1.0");

    // 2. Submit → A1, UnderReview, pending verdict.
    let a1 = wf
        .submit_for_review(AUTHOR, created.entity_id, policy_snapshot("POL-AC"))
        .unwrap();
    let submission = wf.store().get_approval(a1).unwrap();
    assert_eq!(submission.tag, VersionTag::Author(1));
    assert_eq!(submission.decision, Decision::Pending);
    assert_eq!(submission.submitted_by, AUTHOR);
    assert_eq!(submission.reviewer, Some(REVIEWER));
    assert!(submission.decided_at.is_none());
    assert_eq!(
        wf.store().get_entity(created.entity_id).unwrap().status,
        LifecycleStatus::UnderReview
    );

    // 3. Reject with remarks → R1, RevisionRequired, one review cycle.
    let r1 = wf
        .reviewer_decide(
            REVIEWER,
            a1,
            Verdict::Reject,
            Some("fix scope".to_string()),
            Some(marked_snapshot("POL-AC")),
        )
        .unwrap();
    let verdict = wf.store().get_approval(r1).unwrap();
    assert_eq!(verdict.tag, VersionTag::Reviewer(1));
    assert_eq!(verdict.decision, Decision::Rejected);
    assert_eq!(verdict.remarks.as_deref(), Some("fix scope"));
    assert!(verdict.decided_at.is_some());
    assert!(verdict.snapshot.has_rejected_node());

    let entity = wf.store().get_entity(created.entity_id).unwrap();
    assert_eq!(entity.status, LifecycleStatus::RevisionRequired);
    assert_eq!(entity.review_cycles, 1);

    // The author's A1 record is untouched by the verdict.
    let submission = wf.store().get_approval(a1).unwrap();
    assert_eq!(submission.decision, Decision::Pending);

    // 4. Resubmit the marked document → A2, marks cleared.
    let a2 = wf
        .resubmit(AUTHOR, created.entity_id, marked_snapshot("POL-AC"))
        .unwrap();
    let resubmission = wf.store().get_approval(a2).unwrap();
    assert_eq!(resubmission.tag, VersionTag::Author(2));
    assert!(!resubmission.snapshot.has_rejected_node());
    assert_eq!(
        wf.store().get_entity(created.entity_id).unwrap().status,
        LifecycleStatus::UnderReview
    );

    // 5. Approve → R2, Approved, Active.
    let r2 = wf
        .reviewer_decide(REVIEWER, a2, Verdict::Approve, None, None)
        .unwrap();
    let verdict = wf.store().get_approval(r2).unwrap();
    assert_eq!(verdict.tag, VersionTag::Reviewer(2));
    assert_eq!(verdict.decision, Decision::Approved);

    let entity = wf.store().get_entity(created.entity_id).unwrap();
    assert_eq!(entity.status, LifecycleStatus::Approved);
    assert_eq!(entity.activation, ActivationState::Active);
    assert_eq!(entity.review_cycles, 1);
}

// ---------------------------------------------------------------------------
// History and inbox views over the same flow
// ---------------------------------------------------------------------------

#[test]
fn history_interleaves_tracks_in_log_order() {
    let wf = ApprovalWorkflow::permissive(MemoryStore::new());
    let created = wf
        .create_version(
            AUTHOR,
            CreateVersionRequest::Root {
                kind: EntityKind::Policy,
                identifier: ident("POL-HIST"),
                name: "History".to_string(),
                reviewer: Some(REVIEWER),
                owner: None,
                start_date: None,
                end_date: None,
            },
        )
        .unwrap();

    let a1 = wf
        .submit_for_review(AUTHOR, created.entity_id, policy_snapshot("POL-HIST"))
        .unwrap();
    wf.reviewer_decide(REVIEWER, a1, Verdict::Reject, Some("fix scope".to_string()), None)
        .unwrap();
    let a2 = wf
        .resubmit(AUTHOR, created.entity_id, policy_snapshot("POL-HIST"))
        .unwrap();
    wf.reviewer_decide(REVIEWER, a2, Verdict::Approve, None, None)
        .unwrap();

    let history = wf.approval_history(&ident("POL-HIST"));
    let tags: Vec<VersionTag> = history.iter().map(|r| r.tag).collect();
    assert_eq!(
        tags,
        vec![
            VersionTag::Author(1),
            VersionTag::Reviewer(1),
            VersionTag::Author(2),
            VersionTag::Reviewer(2),
        ]
    );

    // Author records never acquire a verdict; reviewer records are born
    // with one.
    for record in &history {
        match record.tag.track() {
            Track::Author => {
                assert_eq!(record.decision, Decision::Pending);
                assert!(record.decided_at.is_none());
            }
            Track::Reviewer => {
                assert!(record.decision.is_decided());
                assert!(record.decided_at.is_some());
            }
        }
    }
}

#[test]
fn rejected_inbox_tracks_the_author() {
    let wf = ApprovalWorkflow::permissive(MemoryStore::new());
    let created = wf
        .create_version(
            AUTHOR,
            CreateVersionRequest::Root {
                kind: EntityKind::Policy,
                identifier: ident("POL-INBOX"),
                name: "Inbox".to_string(),
                reviewer: Some(REVIEWER),
                owner: None,
                start_date: None,
                end_date: None,
            },
        )
        .unwrap();
    let a1 = wf
        .submit_for_review(AUTHOR, created.entity_id, policy_snapshot("POL-INBOX"))
        .unwrap();
    wf.reviewer_decide(REVIEWER, a1, Verdict::Reject, Some("fix scope".to_string()), None)
        .unwrap();

    // The author sees the rejection; the reviewer's inbox is empty.
    let inbox = wf.rejected_versions(AUTHOR);
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].identifier, ident("POL-INBOX"));
    assert_eq!(inbox[0].tag, VersionTag::Author(1));
    assert_eq!(inbox[0].rejected_by, REVIEWER);
    assert_eq!(inbox[0].remarks.as_deref(), Some("fix scope"));
    assert!(wf.rejected_versions(REVIEWER).is_empty());

    // Resubmitting clears the inbox.
    wf.resubmit(AUTHOR, created.entity_id, policy_snapshot("POL-INBOX"))
        .unwrap();
    assert!(wf.rejected_versions(AUTHOR).is_empty());
}

// ---------------------------------------------------------------------------
// Guard rails observed end to end
// ---------------------------------------------------------------------------

#[test]
fn stale_approval_cannot_be_decided_twice() {
    let wf = ApprovalWorkflow::permissive(MemoryStore::new());
    let created = wf
        .create_version(
            AUTHOR,
            CreateVersionRequest::Root {
                kind: EntityKind::Policy,
                identifier: ident("POL-STALE"),
                name: "Stale".to_string(),
                reviewer: Some(REVIEWER),
                owner: None,
                start_date: None,
                end_date: None,
            },
        )
        .unwrap();
    let a1 = wf
        .submit_for_review(AUTHOR, created.entity_id, policy_snapshot("POL-STALE"))
        .unwrap();
    wf.reviewer_decide(REVIEWER, a1, Verdict::Reject, Some("fix scope".to_string()), None)
        .unwrap();

    // The A1 record now lies behind R1; a second verdict on it must fail
    // without touching the entity.
    let err = wf
        .reviewer_decide(REVIEWER, a1, Verdict::Approve, None, None)
        .unwrap_err();
    assert!(matches!(err, grc_core::GrcError::InvalidTransition { .. }));
    assert_eq!(
        wf.store().get_entity(created.entity_id).unwrap().status,
        LifecycleStatus::RevisionRequired
    );
    assert_eq!(wf.approval_history(&ident("POL-STALE")).len(), 2);
}

#[test]
fn approved_entity_is_revised_via_new_version_not_resubmit() {
    let wf = ApprovalWorkflow::permissive(MemoryStore::new());
    let created = wf
        .create_version(
            AUTHOR,
            CreateVersionRequest::Root {
                kind: EntityKind::Policy,
                identifier: ident("POL-FINAL"),
                name: "Final".to_string(),
                reviewer: Some(REVIEWER),
                owner: None,
                start_date: None,
                end_date: None,
            },
        )
        .unwrap();
    let a1 = wf
        .submit_for_review(AUTHOR, created.entity_id, policy_snapshot("POL-FINAL"))
        .unwrap();
    wf.reviewer_decide(REVIEWER, a1, Verdict::Approve, None, None)
        .unwrap();

    // Approved is terminal for this row.
    assert!(wf
        .submit_for_review(AUTHOR, created.entity_id, policy_snapshot("POL-FINAL"))
        .is_err());
    assert!(wf
        .resubmit(AUTHOR, created.entity_id, policy_snapshot("POL-FINAL"))
        .is_err());

    // The successor continues the identifier's author sequence at A2.
    let successor = wf
        .create_version(
            AUTHOR,
            CreateVersionRequest::successor(created.version_id, "Final v2"),
        )
        .unwrap();
    let a2 = wf
        .submit_for_review(AUTHOR, successor.entity_id, policy_snapshot("POL-FINAL"))
        .unwrap();
    assert_eq!(
        wf.store().get_approval(a2).unwrap().tag,
        VersionTag::Author(2)
    );
}
