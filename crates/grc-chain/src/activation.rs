//! # Activation Coordinator
//!
//! Enforces the single-active-per-chain invariant. All functions take
//! `&mut Tables` so the workflow can compose them inside one store
//! transaction with the status flips and approval inserts they
//! accompany; failures roll the whole transaction back.
//!
//! Two cascades exist and must not be conflated:
//!
//! - **chain deactivation** (here, via the resolver): activating one
//!   member of a version chain deactivates the others.
//! - **ownership cascade** ([`deactivate_in`] with `cascade_children`):
//!   deactivating a framework flows down to its policies and their
//!   subpolicies. This follows `owner` links, never version links.

use chrono::NaiveDate;

use grc_core::{ActivationState, EntityId, GrcError};
use grc_store::Tables;

use crate::resolver::ChainGraph;

/// Result of [`activate_in`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationOutcome {
    /// The target entity.
    pub activated: EntityId,
    /// True when the entity's start date lies in the future: the entity
    /// was marked `Scheduled` and the rest of the chain was left alone.
    pub scheduled: bool,
    /// Chain members that were active and are now inactive.
    pub deactivated: Vec<EntityId>,
}

/// Result of [`deactivate_in`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivationOutcome {
    /// The target entity.
    pub deactivated: EntityId,
    /// Descendants whose activation state changed in the ownership
    /// cascade. Zero when cascading was not requested.
    pub children_affected: usize,
}

/// Activate an entity, deactivating every other member of its version
/// chain.
///
/// If the entity carries a start date after `today`, it is marked
/// [`ActivationState::Scheduled`] instead and the chain is left
/// untouched; [`apply_due_schedules`] completes the switch when the date
/// arrives.
///
/// # Errors
///
/// - [`GrcError::NotFound`] for an unknown entity.
/// - [`GrcError::DataIntegrity`] when the chain has a dangling or cyclic
///   previous-version link. Nothing is activated in that case — failing
///   loudly beats activating only the target and violating the
///   single-active invariant later.
pub fn activate_in(
    tables: &mut Tables,
    entity_id: EntityId,
    today: NaiveDate,
) -> Result<ActivationOutcome, GrcError> {
    let entity = tables.entity(entity_id)?;

    if let Some(start) = entity.start_date {
        if start > today {
            tables.entity_mut(entity_id)?.activation = ActivationState::Scheduled;
            tracing::info!(entity = %entity_id, start = %start, "activation scheduled");
            return Ok(ActivationOutcome {
                activated: entity_id,
                scheduled: true,
                deactivated: Vec::new(),
            });
        }
    }

    let graph = ChainGraph::build(tables);
    let resolution = graph.resolve_entity(entity_id);
    resolution.require_intact()?;
    if let Some(on_cycle) = graph.find_backward_cycle(&resolution.versions) {
        return Err(GrcError::DataIntegrity(format!(
            "version chain contains a cycle through {on_cycle}"
        )));
    }

    // An entity with no version records forms a chain of itself.
    let mut members = resolution.entities;
    members.insert(entity_id);

    let mut deactivated = Vec::new();
    for member in members {
        if member == entity_id {
            continue;
        }
        let row = tables.entity_mut(member)?;
        if row.activation.is_active() {
            row.activation = ActivationState::Inactive;
            deactivated.push(member);
        }
    }
    tables.entity_mut(entity_id)?.activation = ActivationState::Active;

    tracing::info!(
        entity = %entity_id,
        deactivated = deactivated.len(),
        "chain member activated"
    );
    Ok(ActivationOutcome {
        activated: entity_id,
        scheduled: false,
        deactivated,
    })
}

/// Deactivate an entity, optionally cascading down the ownership
/// hierarchy.
///
/// The cascade follows `owner` links breadth-first and flips every
/// descendant that is not already inactive. It never follows version
/// links.
///
/// # Errors
///
/// - [`GrcError::NotFound`] for an unknown entity.
/// - [`GrcError::CascadeFailure`] when a descendant row cannot be
///   updated or the ownership links loop. The transaction wrapping this
///   call rolls back, so a half-applied cascade is never visible.
pub fn deactivate_in(
    tables: &mut Tables,
    entity_id: EntityId,
    cascade_children: bool,
) -> Result<DeactivationOutcome, GrcError> {
    tables.entity_mut(entity_id)?.activation = ActivationState::Inactive;

    let mut children_affected = 0;
    if cascade_children {
        let mut visited = std::collections::HashSet::from([entity_id]);
        let mut frontier: Vec<(EntityId, EntityId)> = tables
            .children_of(entity_id)
            .iter()
            .map(|child| (entity_id, child.id))
            .collect();

        while let Some((parent, child_id)) = frontier.pop() {
            if !visited.insert(child_id) {
                return Err(GrcError::CascadeFailure {
                    parent: parent.to_string(),
                    child: child_id.to_string(),
                });
            }
            let child = tables
                .entity_mut(child_id)
                .map_err(|_| GrcError::CascadeFailure {
                    parent: parent.to_string(),
                    child: child_id.to_string(),
                })?;
            if child.activation != ActivationState::Inactive {
                child.activation = ActivationState::Inactive;
                children_affected += 1;
            }
            frontier.extend(
                tables
                    .children_of(child_id)
                    .iter()
                    .map(|grandchild| (child_id, grandchild.id)),
            );
        }
    }

    tracing::info!(
        entity = %entity_id,
        children_affected,
        cascade = cascade_children,
        "entity deactivated"
    );
    Ok(DeactivationOutcome {
        deactivated: entity_id,
        children_affected,
    })
}

/// The `Scheduled` entities whose start date has arrived, in id order.
pub fn due_schedules(tables: &Tables, today: NaiveDate) -> Vec<EntityId> {
    let mut due: Vec<EntityId> = tables
        .entities()
        .filter(|e| {
            e.activation == ActivationState::Scheduled
                && e.start_date.map_or(true, |start| start <= today)
        })
        .map(|e| e.id)
        .collect();
    due.sort();
    due
}

/// Promote every `Scheduled` entity whose start date has arrived.
///
/// Each promotion runs the full activation path, so the rest of the
/// chain is deactivated as the scheduled entity lands. Entities are
/// processed in id order for determinism.
pub fn apply_due_schedules(
    tables: &mut Tables,
    today: NaiveDate,
) -> Result<Vec<EntityId>, GrcError> {
    let due = due_schedules(tables, today);
    for &entity_id in &due {
        activate_in(tables, entity_id, today)?;
    }
    if !due.is_empty() {
        tracing::info!(count = due.len(), "scheduled activations applied");
    }
    Ok(due)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use grc_core::{
        EntityIdentifier, EntityKind, LifecycleStatus, Timestamp, UserId, VersionId, VersionLabel,
    };
    use grc_store::{EntityRecord, VersionRecord};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn entity(tables: &mut Tables, ident: &str, activation: ActivationState) -> EntityId {
        let record = EntityRecord {
            id: EntityId::new(),
            kind: EntityKind::Framework,
            identifier: EntityIdentifier::new(ident).unwrap(),
            name: format!("framework {ident}"),
            status: LifecycleStatus::Approved,
            activation,
            current_label: VersionLabel::initial(),
            review_cycles: 0,
            reviewer: None,
            owner: None,
            start_date: None,
            end_date: None,
            created_by: UserId(1),
            created_at: Timestamp::now(),
        };
        let id = record.id;
        tables.insert_entity(record);
        id
    }

    fn version(tables: &mut Tables, entity_id: EntityId, previous: Option<VersionId>) -> VersionId {
        let record = VersionRecord {
            id: VersionId::new(),
            entity_id,
            label: VersionLabel::initial(),
            created_by: UserId(1),
            created_at: Timestamp::now(),
            previous,
        };
        let id = record.id;
        tables.insert_version(record);
        id
    }

    /// Two-member chain: (e1 active, e2 inactive).
    fn two_member_chain(tables: &mut Tables) -> (EntityId, EntityId) {
        let e1 = entity(tables, "FW-1", ActivationState::Active);
        let e2 = entity(tables, "FW-1", ActivationState::Inactive);
        let v1 = version(tables, e1, None);
        let _v2 = version(tables, e2, Some(v1));
        (e1, e2)
    }

    // ── activate_in ──────────────────────────────────────────────────

    #[test]
    fn test_activate_deactivates_chain_peers() {
        let mut tables = Tables::new();
        let (e1, e2) = two_member_chain(&mut tables);

        let outcome = activate_in(&mut tables, e2, today()).unwrap();

        assert_eq!(outcome.activated, e2);
        assert!(!outcome.scheduled);
        assert_eq!(outcome.deactivated, vec![e1]);
        assert_eq!(tables.entity(e1).unwrap().activation, ActivationState::Inactive);
        assert_eq!(tables.entity(e2).unwrap().activation, ActivationState::Active);
    }

    #[test]
    fn test_activate_leaves_other_chains_alone() {
        let mut tables = Tables::new();
        let (_, e2) = two_member_chain(&mut tables);
        let other = entity(&mut tables, "FW-OTHER", ActivationState::Active);
        let _vo = version(&mut tables, other, None);

        activate_in(&mut tables, e2, today()).unwrap();

        assert_eq!(
            tables.entity(other).unwrap().activation,
            ActivationState::Active,
            "entities outside the chain are untouched"
        );
    }

    #[test]
    fn test_activate_is_idempotent_on_active_target() {
        let mut tables = Tables::new();
        let (e1, _) = two_member_chain(&mut tables);

        let outcome = activate_in(&mut tables, e1, today()).unwrap();
        assert!(outcome.deactivated.is_empty());
        assert_eq!(tables.entity(e1).unwrap().activation, ActivationState::Active);
    }

    #[test]
    fn test_activate_entity_without_versions_is_singleton() {
        let mut tables = Tables::new();
        let e1 = entity(&mut tables, "FW-1", ActivationState::Inactive);

        let outcome = activate_in(&mut tables, e1, today()).unwrap();
        assert!(outcome.deactivated.is_empty());
        assert!(tables.entity(e1).unwrap().is_active());
    }

    #[test]
    fn test_activate_unknown_entity_is_not_found() {
        let mut tables = Tables::new();
        let err = activate_in(&mut tables, EntityId::new(), today()).unwrap_err();
        assert!(matches!(err, GrcError::NotFound { .. }));
    }

    #[test]
    fn test_activate_future_start_date_schedules() {
        let mut tables = Tables::new();
        let (e1, e2) = two_member_chain(&mut tables);
        tables.entity_mut(e2).unwrap().start_date =
            Some(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());

        let outcome = activate_in(&mut tables, e2, today()).unwrap();

        assert!(outcome.scheduled);
        assert!(outcome.deactivated.is_empty());
        assert_eq!(tables.entity(e2).unwrap().activation, ActivationState::Scheduled);
        assert_eq!(
            tables.entity(e1).unwrap().activation,
            ActivationState::Active,
            "the current active member keeps serving until the date arrives"
        );
    }

    #[test]
    fn test_activate_past_start_date_activates() {
        let mut tables = Tables::new();
        let (e1, e2) = two_member_chain(&mut tables);
        tables.entity_mut(e2).unwrap().start_date =
            Some(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());

        let outcome = activate_in(&mut tables, e2, today()).unwrap();
        assert!(!outcome.scheduled);
        assert_eq!(outcome.deactivated, vec![e1]);
    }

    #[test]
    fn test_activate_dangling_chain_fails_without_changes() {
        let mut tables = Tables::new();
        let e1 = entity(&mut tables, "FW-1", ActivationState::Inactive);
        tables.insert_version(VersionRecord {
            id: VersionId::new(),
            entity_id: e1,
            label: VersionLabel::initial(),
            created_by: UserId(1),
            created_at: Timestamp::now(),
            previous: Some(VersionId::new()),
        });

        let err = activate_in(&mut tables, e1, today()).unwrap_err();
        assert!(matches!(err, GrcError::DataIntegrity(_)));
        assert_eq!(
            tables.entity(e1).unwrap().activation,
            ActivationState::Inactive,
            "the target must not be activated on a broken chain"
        );
    }

    #[test]
    fn test_activate_cyclic_chain_fails() {
        let mut tables = Tables::new();
        let e1 = entity(&mut tables, "FW-1", ActivationState::Inactive);
        let e2 = entity(&mut tables, "FW-1", ActivationState::Inactive);
        let v1_id = VersionId::new();
        let v2_id = VersionId::new();
        tables.insert_version(VersionRecord {
            id: v1_id,
            entity_id: e1,
            label: VersionLabel::initial(),
            created_by: UserId(1),
            created_at: Timestamp::now(),
            previous: Some(v2_id),
        });
        tables.insert_version(VersionRecord {
            id: v2_id,
            entity_id: e2,
            label: VersionLabel::new(2, 0),
            created_by: UserId(1),
            created_at: Timestamp::now(),
            previous: Some(v1_id),
        });

        let err = activate_in(&mut tables, e1, today()).unwrap_err();
        assert!(matches!(err, GrcError::DataIntegrity(_)));
    }

    // ── deactivate_in ────────────────────────────────────────────────

    #[test]
    fn test_deactivate_without_cascade() {
        let mut tables = Tables::new();
        let fw = entity(&mut tables, "FW-1", ActivationState::Active);
        let pol = EntityRecord {
            id: EntityId::new(),
            kind: EntityKind::Policy,
            identifier: EntityIdentifier::new("POL-1").unwrap(),
            name: "policy".to_string(),
            status: LifecycleStatus::Approved,
            activation: ActivationState::Active,
            current_label: VersionLabel::initial(),
            review_cycles: 0,
            reviewer: None,
            owner: Some(fw),
            start_date: None,
            end_date: None,
            created_by: UserId(1),
            created_at: Timestamp::now(),
        };
        let pol_id = pol.id;
        tables.insert_entity(pol);

        let outcome = deactivate_in(&mut tables, fw, false).unwrap();
        assert_eq!(outcome.children_affected, 0);
        assert!(tables.entity(pol_id).unwrap().is_active(), "no cascade requested");
    }

    #[test]
    fn test_deactivate_cascades_two_levels() {
        let mut tables = Tables::new();
        let fw = entity(&mut tables, "FW-1", ActivationState::Active);

        let mut make_child = |ident: &str, kind: EntityKind, owner: EntityId, active: bool| {
            let record = EntityRecord {
                id: EntityId::new(),
                kind,
                identifier: EntityIdentifier::new(ident).unwrap(),
                name: ident.to_string(),
                status: LifecycleStatus::Approved,
                activation: if active {
                    ActivationState::Active
                } else {
                    ActivationState::Inactive
                },
                current_label: VersionLabel::initial(),
                review_cycles: 0,
                reviewer: None,
                owner: Some(owner),
                start_date: None,
                end_date: None,
                created_by: UserId(1),
                created_at: Timestamp::now(),
            };
            let id = record.id;
            tables.insert_entity(record);
            id
        };

        let pol1 = make_child("POL-1", EntityKind::Policy, fw, true);
        let pol2 = make_child("POL-2", EntityKind::Policy, fw, false);
        let sub1 = make_child("SUB-1", EntityKind::SubPolicy, pol1, true);

        let outcome = deactivate_in(&mut tables, fw, true).unwrap();

        // pol1 and sub1 changed; pol2 was already inactive.
        assert_eq!(outcome.children_affected, 2);
        for id in [fw, pol1, pol2, sub1] {
            assert_eq!(tables.entity(id).unwrap().activation, ActivationState::Inactive);
        }
    }

    #[test]
    fn test_deactivate_unknown_entity_is_not_found() {
        let mut tables = Tables::new();
        let err = deactivate_in(&mut tables, EntityId::new(), true).unwrap_err();
        assert!(matches!(err, GrcError::NotFound { .. }));
    }

    #[test]
    fn test_ownership_cycle_is_cascade_failure() {
        let mut tables = Tables::new();
        let a = entity(&mut tables, "FW-A", ActivationState::Active);
        let b = entity(&mut tables, "FW-B", ActivationState::Active);
        tables.entity_mut(a).unwrap().owner = Some(b);
        tables.entity_mut(b).unwrap().owner = Some(a);

        let err = deactivate_in(&mut tables, a, true).unwrap_err();
        assert!(matches!(err, GrcError::CascadeFailure { .. }));
    }

    // ── apply_due_schedules ──────────────────────────────────────────

    #[test]
    fn test_due_schedule_promotes_and_deactivates_peers() {
        let mut tables = Tables::new();
        let (e1, e2) = two_member_chain(&mut tables);
        tables.entity_mut(e2).unwrap().activation = ActivationState::Scheduled;
        tables.entity_mut(e2).unwrap().start_date =
            Some(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());

        let promoted = apply_due_schedules(&mut tables, today()).unwrap();

        assert_eq!(promoted, vec![e2]);
        assert_eq!(tables.entity(e2).unwrap().activation, ActivationState::Active);
        assert_eq!(tables.entity(e1).unwrap().activation, ActivationState::Inactive);
    }

    #[test]
    fn test_not_yet_due_schedule_left_alone() {
        let mut tables = Tables::new();
        let (e1, e2) = two_member_chain(&mut tables);
        tables.entity_mut(e2).unwrap().activation = ActivationState::Scheduled;
        tables.entity_mut(e2).unwrap().start_date =
            Some(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());

        let promoted = apply_due_schedules(&mut tables, today()).unwrap();

        assert!(promoted.is_empty());
        assert_eq!(tables.entity(e2).unwrap().activation, ActivationState::Scheduled);
        assert!(tables.entity(e1).unwrap().is_active());
    }
}
