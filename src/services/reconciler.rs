// src/services/reconciler.rs
//
// One timeline of appointments over two stores that share no identifier
// space. Reads merge both stores; writes route to the owning store, either
// by the origin tag the caller already holds or by an ordered probe.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AppointmentOrigin, UnifiedAppointment};
use crate::services::normalizer::{normalize_regular, normalize_visitor};
use crate::services::ServiceError;
use crate::store::{
    RegularAppointmentPatch, RegularAppointmentRepo, StoreError, VisitorAppointmentPatch,
    VisitorAppointmentRepo,
};

/// Partial update accepted for any appointment id. Fields foreign to the
/// record's origin are simply not forwarded to the owning store.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UnifiedAppointmentPatch {
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub notes: Option<Option<String>>,
    pub lawyer_id: Option<Uuid>,
    pub status: Option<String>,
    pub preferred_date: Option<DateTime<Utc>>,
    pub confirmed_date: Option<Option<DateTime<Utc>>>,
    pub alternative_date: Option<Option<DateTime<Utc>>>,
    pub assigned_lawyer_id: Option<Option<Uuid>>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<Option<i32>>,
    pub consultation_reason: Option<String>,
    pub consultation_type: Option<String>,
}

impl UnifiedAppointmentPatch {
    fn regular(&self) -> RegularAppointmentPatch {
        RegularAppointmentPatch {
            date: self.date,
            location: self.location.clone(),
            notes: self.notes.clone(),
            lawyer_id: self.lawyer_id,
        }
    }

    fn visitor(&self) -> VisitorAppointmentPatch {
        VisitorAppointmentPatch {
            status: self.status.clone(),
            preferred_date: self.preferred_date,
            confirmed_date: self.confirmed_date,
            alternative_date: self.alternative_date,
            assigned_lawyer_id: self.assigned_lawyer_id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            age: self.age,
            consultation_reason: self.consultation_reason.clone(),
            consultation_type: self.consultation_type.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppointmentReconciler {
    regular: Arc<dyn RegularAppointmentRepo>,
    visitor: Arc<dyn VisitorAppointmentRepo>,
}

impl AppointmentReconciler {
    pub fn new(
        regular: Arc<dyn RegularAppointmentRepo>,
        visitor: Arc<dyn VisitorAppointmentRepo>,
    ) -> Self {
        Self { regular, visitor }
    }

    /// Both stores in full, normalized and merged into one timeline,
    /// newest first. Equal sort keys keep client bookings ahead of visitor
    /// intakes (stable sort over the fetch order).
    pub async fn list_unified(&self) -> Result<Vec<UnifiedAppointment>, StoreError> {
        let (regular, visitor) =
            tokio::try_join!(self.regular.find_all(), self.visitor.find_all())?;

        let mut merged: Vec<UnifiedAppointment> = regular
            .iter()
            .map(normalize_regular)
            .chain(visitor.iter().map(normalize_visitor))
            .collect();
        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(merged)
    }

    /// Windowed variant of the merged timeline. Each store is asked for the
    /// top `offset + limit` records it holds, so the window is exact without
    /// scanning either table in full.
    pub async fn list_unified_window(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<UnifiedAppointment>, StoreError> {
        let want = (offset + limit) as i64;
        let (regular, visitor) = tokio::try_join!(
            self.regular.find_recent(want),
            self.visitor.find_recent(want)
        )?;

        let regular: Vec<UnifiedAppointment> = regular.iter().map(normalize_regular).collect();
        let visitor: Vec<UnifiedAppointment> = visitor.iter().map(normalize_visitor).collect();

        Ok(merge_descending(regular, visitor)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    /// The `limit` most recent appointments across both stores. Each store
    /// contributes its own top `limit`, so the result is the true global
    /// top-K even when one store has a long recent streak.
    pub async fn recent_unified(
        &self,
        limit: usize,
    ) -> Result<Vec<UnifiedAppointment>, StoreError> {
        self.list_unified_window(0, limit).await
    }

    /// Resolve an id of unknown origin: client bookings first, visitor
    /// intakes second.
    pub async fn get_unified(&self, id: Uuid) -> Result<UnifiedAppointment, ServiceError> {
        if let Some(a) = self.regular.find_by_id(id).await? {
            return Ok(normalize_regular(&a));
        }
        if let Some(a) = self.visitor.find_by_id(id).await? {
            return Ok(normalize_visitor(&a));
        }
        Err(ServiceError::NotFound)
    }

    /// Apply a partial update to whichever store owns the id. A caller that
    /// knows the origin gets a pure dispatch; otherwise the stores are
    /// probed in order. Only absence falls through to the second store — a
    /// store failure propagates immediately and is never read as "the id
    /// lives elsewhere".
    pub async fn update_unified(
        &self,
        id: Uuid,
        origin: Option<AppointmentOrigin>,
        patch: UnifiedAppointmentPatch,
    ) -> Result<UnifiedAppointment, ServiceError> {
        match origin {
            Some(AppointmentOrigin::Regular) => self
                .regular
                .update(id, patch.regular())
                .await?
                .map(|a| normalize_regular(&a))
                .ok_or(ServiceError::NotFound),
            Some(AppointmentOrigin::Visitor) => self
                .visitor
                .update(id, patch.visitor())
                .await?
                .map(|a| normalize_visitor(&a))
                .ok_or(ServiceError::NotFound),
            None => {
                if let Some(a) = self.regular.update(id, patch.regular()).await? {
                    return Ok(normalize_regular(&a));
                }
                debug!("appointment {id} not in the client store, trying visitor intake");
                self.visitor
                    .update(id, patch.visitor())
                    .await?
                    .map(|a| normalize_visitor(&a))
                    .ok_or(ServiceError::NotFound)
            }
        }
    }

    /// Delete by id, with the same routing strategy as `update_unified`.
    /// Returns the origin the record was removed from.
    pub async fn delete_unified(
        &self,
        id: Uuid,
        origin: Option<AppointmentOrigin>,
    ) -> Result<AppointmentOrigin, ServiceError> {
        match origin {
            Some(AppointmentOrigin::Regular) => {
                if self.regular.delete(id).await? {
                    Ok(AppointmentOrigin::Regular)
                } else {
                    Err(ServiceError::NotFound)
                }
            }
            Some(AppointmentOrigin::Visitor) => {
                if self.visitor.delete(id).await? {
                    Ok(AppointmentOrigin::Visitor)
                } else {
                    Err(ServiceError::NotFound)
                }
            }
            None => {
                if self.regular.delete(id).await? {
                    return Ok(AppointmentOrigin::Regular);
                }
                debug!("appointment {id} not in the client store, trying visitor intake");
                if self.visitor.delete(id).await? {
                    return Ok(AppointmentOrigin::Visitor);
                }
                Err(ServiceError::NotFound)
            }
        }
    }
}

/// Two-pointer merge of two lists already sorted descending by the unified
/// sort key. Equal keys take from the regular side first, matching the
/// stable tie-break of the full merge.
fn merge_descending(
    regular: Vec<UnifiedAppointment>,
    visitor: Vec<UnifiedAppointment>,
) -> Vec<UnifiedAppointment> {
    let mut out = Vec::with_capacity(regular.len() + visitor.len());
    let mut r = regular.into_iter().peekable();
    let mut v = visitor.into_iter().peekable();

    loop {
        let take_regular = match (r.peek(), v.peek()) {
            (Some(a), Some(b)) => a.created_at >= b.created_at,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        if take_regular {
            out.push(r.next().unwrap());
        } else {
            out.push(v.next().unwrap());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PersonBrief, RegularAppointment, VisitorAppointment};
    use crate::store::memory::{MemRegularAppointments, MemVisitorAppointments};
    use chrono::TimeZone;
    use std::sync::atomic::Ordering;

    fn brief(name: &str) -> PersonBrief {
        PersonBrief {
            id: Uuid::new_v4(),
            display: name.to_string(),
            email: None,
        }
    }

    fn regular_on(day: u32) -> RegularAppointment {
        RegularAppointment {
            appointment_id: Uuid::new_v4(),
            client: brief("Carla"),
            lawyer: brief("Luis"),
            date: Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
            location: "Oficina central".to_string(),
            notes: None,
        }
    }

    fn visitor_on(day: u32) -> VisitorAppointment {
        VisitorAppointment {
            appointment_id: Uuid::new_v4(),
            full_name: "Marta Ruiz".to_string(),
            email: "marta@example.com".to_string(),
            phone: "+34 600 000 000".to_string(),
            age: None,
            consultation_reason: "Herencia".to_string(),
            consultation_type: "Civil".to_string(),
            preferred_date: Utc.with_ymd_and_hms(2024, 2, day, 9, 0, 0).unwrap(),
            confirmed_date: None,
            alternative_date: None,
            assigned_lawyer: None,
            status: "PENDIENTE".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
        }
    }

    fn reconciler_with(
        regular: Vec<RegularAppointment>,
        visitor: Vec<VisitorAppointment>,
    ) -> (
        AppointmentReconciler,
        Arc<MemRegularAppointments>,
        Arc<MemVisitorAppointments>,
    ) {
        let reg = Arc::new(MemRegularAppointments::new(regular));
        let vis = Arc::new(MemVisitorAppointments::new(visitor));
        (
            AppointmentReconciler::new(reg.clone(), vis.clone()),
            reg,
            vis,
        )
    }

    #[tokio::test]
    async fn list_merges_without_loss_or_duplication() {
        let (rec, _, _) = reconciler_with(
            vec![regular_on(1), regular_on(2), regular_on(3)],
            vec![visitor_on(2), visitor_on(4)],
        );

        let list = rec.list_unified().await.unwrap();
        assert_eq!(list.len(), 5);

        let mut ids: Vec<Uuid> = list.iter().map(|a| a.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn list_is_sorted_descending_with_stable_tie_break() {
        let (rec, _, _) = reconciler_with(
            vec![regular_on(1), regular_on(2), regular_on(3)],
            vec![visitor_on(2), visitor_on(4)],
        );

        let list = rec.list_unified().await.unwrap();
        for pair in list.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }

        let origins: Vec<AppointmentOrigin> = list.iter().map(|a| a.origin).collect();
        assert_eq!(
            origins,
            vec![
                AppointmentOrigin::Visitor, // Jan 4
                AppointmentOrigin::Regular, // Jan 3
                AppointmentOrigin::Regular, // Jan 2 (tie, client store fetched first)
                AppointmentOrigin::Visitor, // Jan 2
                AppointmentOrigin::Regular, // Jan 1
            ]
        );
    }

    #[tokio::test]
    async fn recent_is_a_prefix_of_the_full_list() {
        let (rec, _, _) = reconciler_with(
            vec![regular_on(1), regular_on(5), regular_on(9), regular_on(12)],
            vec![visitor_on(3), visitor_on(7), visitor_on(11)],
        );

        let full = rec.list_unified().await.unwrap();
        let recent = rec.recent_unified(5).await.unwrap();
        assert_eq!(recent.len(), 5);
        let full_ids: Vec<Uuid> = full.iter().take(5).map(|a| a.id).collect();
        let recent_ids: Vec<Uuid> = recent.iter().map(|a| a.id).collect();
        assert_eq!(recent_ids, full_ids);
    }

    #[tokio::test]
    async fn window_matches_the_full_merge() {
        let (rec, _, _) = reconciler_with(
            vec![regular_on(1), regular_on(4), regular_on(6), regular_on(10)],
            vec![visitor_on(2), visitor_on(5), visitor_on(8)],
        );

        let full = rec.list_unified().await.unwrap();
        let window = rec.list_unified_window(2, 3).await.unwrap();
        let expected: Vec<Uuid> = full.iter().skip(2).take(3).map(|a| a.id).collect();
        let got: Vec<Uuid> = window.iter().map(|a| a.id).collect();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn get_resolves_visitor_id_without_touching_client_store_writes() {
        let target = visitor_on(6);
        let target_id = target.appointment_id;
        let (rec, reg, _) = reconciler_with(vec![regular_on(1)], vec![target]);

        let found = rec.get_unified(target_id).await.unwrap();
        assert_eq!(found.origin, AppointmentOrigin::Visitor);
        assert_eq!(reg.update_calls.load(Ordering::SeqCst), 0);
        assert_eq!(reg.delete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let (rec, _, _) = reconciler_with(vec![regular_on(1)], vec![visitor_on(2)]);
        let err = rec.get_unified(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[tokio::test]
    async fn update_of_regular_id_leaves_visitor_store_untouched() {
        let target = regular_on(3);
        let target_id = target.appointment_id;
        let (rec, reg, vis) = reconciler_with(vec![target], vec![visitor_on(2)]);

        let patch = UnifiedAppointmentPatch {
            location: Some("Sala 2".to_string()),
            ..Default::default()
        };
        let updated = rec.update_unified(target_id, None, patch).await.unwrap();
        assert_eq!(updated.origin, AppointmentOrigin::Regular);
        assert_eq!(updated.location.as_deref(), Some("Sala 2"));
        assert_eq!(reg.update_calls.load(Ordering::SeqCst), 1);
        assert_eq!(vis.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn probe_update_falls_back_to_visitor_store_on_absence() {
        let target = visitor_on(4);
        let target_id = target.appointment_id;
        let (rec, reg, vis) = reconciler_with(vec![regular_on(1)], vec![target]);

        let patch = UnifiedAppointmentPatch {
            status: Some("CONFIRMADA".to_string()),
            ..Default::default()
        };
        let updated = rec.update_unified(target_id, None, patch).await.unwrap();
        assert_eq!(updated.origin, AppointmentOrigin::Visitor);
        assert_eq!(updated.status, "CONFIRMADA");
        assert_eq!(reg.update_calls.load(Ordering::SeqCst), 1);
        assert_eq!(vis.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn probe_update_propagates_client_store_failure_without_fallback() {
        let target = visitor_on(4);
        let target_id = target.appointment_id;
        let (rec, reg, vis) = reconciler_with(vec![regular_on(1)], vec![target]);
        reg.fail_writes.store(true, Ordering::SeqCst);

        let err = rec
            .update_unified(target_id, None, UnifiedAppointmentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
        assert_eq!(vis.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dispatch_with_known_origin_never_probes_the_other_store() {
        let (rec, reg, vis) = reconciler_with(vec![regular_on(1)], vec![visitor_on(2)]);

        // Absent id with a declared origin resolves inside that store only.
        let err = rec
            .update_unified(
                Uuid::new_v4(),
                Some(AppointmentOrigin::Visitor),
                UnifiedAppointmentPatch::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        assert_eq!(reg.update_calls.load(Ordering::SeqCst), 0);
        assert_eq!(vis.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn probe_delete_reports_the_origin_it_removed_from() {
        let target = visitor_on(8);
        let target_id = target.appointment_id;
        let (rec, reg, _) = reconciler_with(vec![regular_on(1)], vec![target]);

        let origin = rec.delete_unified(target_id, None).await.unwrap();
        assert_eq!(origin, AppointmentOrigin::Visitor);
        assert_eq!(reg.delete_calls.load(Ordering::SeqCst), 1);

        let err = rec.delete_unified(target_id, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }
}
