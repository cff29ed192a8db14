use chrono::{NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries::{self, HoursOwner};
use crate::errors::AppError;
use crate::models::{
    parse_week, serialize_week, Business, DayRecord, ScheduleOverlay, StaffMember, WeekSchedule,
};

pub fn create_business(conn: &Connection, name: &str) -> Result<Business, AppError> {
    let name = required_name(name)?;
    let business = Business {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        created_at: Utc::now().naive_utc(),
    };
    queries::create_business(conn, &business)?;
    tracing::info!(business_id = %business.id, "created business");
    Ok(business)
}

pub fn create_staff(
    conn: &Connection,
    business_id: &str,
    name: &str,
) -> Result<StaffMember, AppError> {
    let name = required_name(name)?;
    find_business(conn, business_id)?;
    let staff = StaffMember {
        id: uuid::Uuid::new_v4().to_string(),
        business_id: business_id.to_string(),
        name,
        created_at: Utc::now().naive_utc(),
    };
    queries::create_staff(conn, &staff)?;
    tracing::info!(business_id, staff_id = %staff.id, "created staff member");
    Ok(staff)
}

fn required_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn find_business(conn: &Connection, id: &str) -> Result<Business, AppError> {
    queries::get_business(conn, id)?.ok_or_else(|| AppError::NotFound(format!("business {id}")))
}

fn find_staff(conn: &Connection, id: &str) -> Result<StaffMember, AppError> {
    queries::get_staff(conn, id)?.ok_or_else(|| AppError::NotFound(format!("staff member {id}")))
}

fn load_week(conn: &Connection, owner: HoursOwner<'_>) -> Result<WeekSchedule, AppError> {
    Ok(parse_week(&queries::get_hours(conn, owner)?))
}

/// The business's hours as a full week; days never saved come back closed.
pub fn business_hours(conn: &Connection, business_id: &str) -> Result<WeekSchedule, AppError> {
    find_business(conn, business_id)?;
    load_week(conn, HoursOwner::Business(business_id))
}

pub struct StaffAvailability {
    pub staff_hours: WeekSchedule,
    pub business_hours: WeekSchedule,
}

/// A staff member's own hours alongside their business's hours, so a caller
/// can offer "same as business hours".
pub fn staff_availability(conn: &Connection, staff_id: &str) -> Result<StaffAvailability, AppError> {
    let staff = find_staff(conn, staff_id)?;
    Ok(StaffAvailability {
        staff_hours: load_week(conn, HoursOwner::Staff(&staff.id))?,
        business_hours: load_week(conn, HoursOwner::Business(&staff.business_id))?,
    })
}

/// Replace the business's hours with `records`. `None` leaves the stored
/// hours untouched and returns them.
pub fn save_business_hours(
    conn: &Connection,
    business_id: &str,
    records: Option<&[DayRecord]>,
) -> Result<WeekSchedule, AppError> {
    find_business(conn, business_id)?;
    let Some(records) = records else {
        tracing::debug!(business_id, "no business hours in profile update");
        return load_week(conn, HoursOwner::Business(business_id));
    };
    let week = parse_week(records);
    week.validate()?;
    queries::replace_hours(conn, HoursOwner::Business(business_id), &serialize_week(&week))?;
    tracing::info!(business_id, hours = %week.summary(), "saved business hours");
    Ok(week)
}

/// Save a staff member's hours. `records` replaces their own hours when given;
/// with `use_business_hours` the business's current hours are copied over them
/// instead. The flag itself is not stored.
pub fn save_staff_hours(
    conn: &Connection,
    staff_id: &str,
    records: Option<&[DayRecord]>,
    use_business_hours: bool,
) -> Result<WeekSchedule, AppError> {
    let staff = find_staff(conn, staff_id)?;

    let own = match records {
        Some(records) => parse_week(records),
        None => load_week(conn, HoursOwner::Staff(&staff.id))?,
    };
    let mut overlay = ScheduleOverlay::new(own);
    if use_business_hours {
        overlay.enable(&load_week(conn, HoursOwner::Business(&staff.business_id))?);
    }
    let week = overlay.into_current();

    week.validate()?;
    queries::replace_hours(conn, HoursOwner::Staff(&staff.id), &serialize_week(&week))?;
    tracing::info!(
        staff_id,
        use_business_hours,
        hours = %week.summary(),
        "saved staff hours"
    );
    Ok(week)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenStatus {
    pub open: bool,
    pub staff_open: bool,
    pub business_open: bool,
}

/// Whether a staff member can take a booking at `at`: both their own hours and
/// the business's hours must be open then.
pub fn staff_open_at(
    conn: &Connection,
    staff_id: &str,
    at: &NaiveDateTime,
) -> Result<OpenStatus, AppError> {
    let availability = staff_availability(conn, staff_id)?;
    let staff_open = availability.staff_hours.is_open_at(at);
    let business_open = availability.business_hours.is_open_at(at);
    Ok(OpenStatus {
        open: staff_open && business_open,
        staff_open,
        business_open,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::db;
    use crate::models::{DaySchedule, TimeOfDay};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn records(json: &str) -> Vec<DayRecord> {
        serde_json::from_str(json).unwrap()
    }

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    const BUSINESS_WEEKDAYS: &str = r#"[
        {"day":"Monday","opening_time":"09:00","closing_time":"18:00"},
        {"day":"Tuesday","opening_time":"09:00","closing_time":"18:00"}
    ]"#;

    #[test]
    fn test_unknown_business_not_found() {
        let conn = setup_db();
        assert!(matches!(
            business_hours(&conn, "nope"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            create_staff(&conn, "nope", "Robin"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        let conn = setup_db();
        assert!(matches!(
            create_business(&conn, "   "),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_new_business_has_closed_week() {
        let conn = setup_db();
        let business = create_business(&conn, "Shear Joy").unwrap();
        let week = business_hours(&conn, &business.id).unwrap();
        assert_eq!(week, WeekSchedule::default());
    }

    #[test]
    fn test_save_and_load_business_hours() {
        let conn = setup_db();
        let business = create_business(&conn, "Shear Joy").unwrap();

        let weekdays = records(BUSINESS_WEEKDAYS);
        let saved = save_business_hours(&conn, &business.id, Some(weekdays.as_slice())).unwrap();
        assert!(saved.day(Weekday::Mon).is_open);

        let loaded = business_hours(&conn, &business.id).unwrap();
        assert_eq!(loaded, saved);
        assert!(!loaded.day(Weekday::Wed).is_open);
    }

    #[test]
    fn test_missing_business_hours_keeps_stored() {
        let conn = setup_db();
        let business = create_business(&conn, "Shear Joy").unwrap();
        let weekdays = records(BUSINESS_WEEKDAYS);
        let saved = save_business_hours(&conn, &business.id, Some(weekdays.as_slice())).unwrap();

        let kept = save_business_hours(&conn, &business.id, None).unwrap();
        assert_eq!(kept, saved);
        assert_eq!(business_hours(&conn, &business.id).unwrap(), saved);
    }

    #[test]
    fn test_invalid_hours_not_saved() {
        let conn = setup_db();
        let business = create_business(&conn, "Shear Joy").unwrap();
        let bad = records(r#"[{"day":"Monday","opening_time":"18:00","closing_time":"09:00"}]"#);

        let result = save_business_hours(&conn, &business.id, Some(bad.as_slice()));
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(
            business_hours(&conn, &business.id).unwrap(),
            WeekSchedule::default()
        );
    }

    #[test]
    fn test_staff_copies_business_hours() {
        let conn = setup_db();
        let business = create_business(&conn, "Shear Joy").unwrap();
        let staff = create_staff(&conn, &business.id, "Robin").unwrap();
        save_business_hours(&conn, &business.id, Some(records(BUSINESS_WEEKDAYS).as_slice())).unwrap();

        let own = records(r#"[{"day":"Saturday","opening_time":"10:00","closing_time":"14:00"}]"#);
        let saved = save_staff_hours(&conn, &staff.id, Some(own.as_slice()), true).unwrap();

        let availability = staff_availability(&conn, &staff.id).unwrap();
        assert_eq!(availability.staff_hours, saved);
        assert_eq!(availability.staff_hours, availability.business_hours);
        assert!(!saved.day(Weekday::Sat).is_open);
    }

    #[test]
    fn test_staff_own_hours() {
        let conn = setup_db();
        let business = create_business(&conn, "Shear Joy").unwrap();
        let staff = create_staff(&conn, &business.id, "Robin").unwrap();

        let own = records(r#"[{"day":"Saturday","opening_time":"10:00","closing_time":"14:00"}]"#);
        save_staff_hours(&conn, &staff.id, Some(own.as_slice()), false).unwrap();

        // No records and no overlay keeps what is stored
        let kept = save_staff_hours(&conn, &staff.id, None, false).unwrap();
        assert_eq!(*kept.day(Weekday::Sat), DaySchedule::open(t("10:00"), t("14:00")));
    }

    #[test]
    fn test_staff_open_at_requires_both() {
        let conn = setup_db();
        let business = create_business(&conn, "Shear Joy").unwrap();
        let staff = create_staff(&conn, &business.id, "Robin").unwrap();
        save_business_hours(&conn, &business.id, Some(records(BUSINESS_WEEKDAYS).as_slice())).unwrap();
        let own = records(
            r#"[{"day":"Monday","opening_time":"12:00","closing_time":"20:00",
                 "break_times":[{"start_time":"15:00","end_time":"15:30"}]}]"#,
        );
        save_staff_hours(&conn, &staff.id, Some(own.as_slice()), false).unwrap();

        // 2025-06-16 is a Monday
        let status = staff_open_at(&conn, &staff.id, &dt("2025-06-16 13:00")).unwrap();
        assert!(status.open);

        let status = staff_open_at(&conn, &staff.id, &dt("2025-06-16 10:00")).unwrap();
        assert!(!status.open);
        assert!(status.business_open);
        assert!(!status.staff_open);

        let status = staff_open_at(&conn, &staff.id, &dt("2025-06-16 19:00")).unwrap();
        assert!(!status.open);
        assert!(status.staff_open);

        let status = staff_open_at(&conn, &staff.id, &dt("2025-06-16 15:10")).unwrap();
        assert!(!status.staff_open);
    }
}
