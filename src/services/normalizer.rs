// src/services/normalizer.rs
//
// Pure projections of the two persisted appointment shapes into the one
// shape every caller sees. No I/O, no error path.

use crate::models::{
    AppointmentOrigin, RegularAppointment, UnifiedAppointment, VisitorAppointment,
};

/// Client bookings carry no lifecycle column; they are confirmed by construction.
pub const CONFIRMED_STATUS: &str = "CONFIRMADA";

/// Shown for client bookings, which never carry a consultation type.
pub const UNSPECIFIED_CONSULTATION_TYPE: &str = "No especificado";

pub fn normalize_regular(a: &RegularAppointment) -> UnifiedAppointment {
    UnifiedAppointment {
        id: a.appointment_id,
        origin: AppointmentOrigin::Regular,
        date: a.date,
        location: Some(a.location.clone()),
        notes: a.notes.clone(),
        status: CONFIRMED_STATUS.to_string(),
        client: Some(a.client.clone()),
        lawyer: Some(a.lawyer.clone()),
        // No creation timestamp is stored for client bookings; the meeting
        // date stands in as the sort key.
        created_at: a.date,
        full_name: None,
        email: None,
        phone: None,
        consultation_reason: None,
        consultation_type: Some(UNSPECIFIED_CONSULTATION_TYPE.to_string()),
        age: None,
        assigned_lawyer_id: None,
        confirmed_date: None,
        alternative_date: None,
    }
}

pub fn normalize_visitor(a: &VisitorAppointment) -> UnifiedAppointment {
    UnifiedAppointment {
        id: a.appointment_id,
        origin: AppointmentOrigin::Visitor,
        date: a.preferred_date,
        location: None,
        notes: None,
        status: a.status.clone(),
        client: None,
        lawyer: a.assigned_lawyer.clone(),
        created_at: a.created_at,
        full_name: Some(a.full_name.clone()),
        email: Some(a.email.clone()),
        phone: Some(a.phone.clone()),
        consultation_reason: Some(a.consultation_reason.clone()),
        consultation_type: Some(a.consultation_type.clone()),
        age: a.age,
        assigned_lawyer_id: a.assigned_lawyer.as_ref().map(|l| l.id),
        confirmed_date: a.confirmed_date,
        alternative_date: a.alternative_date,
    }
}
