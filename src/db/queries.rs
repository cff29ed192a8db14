use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{BreakRecord, Business, DayRecord, StaffMember};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).unwrap_or_else(|e| {
        tracing::warn!(value = s, error = %e, "unreadable stored timestamp, using epoch");
        NaiveDateTime::default()
    })
}

// ── Businesses ──

pub fn create_business(conn: &Connection, business: &Business) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO businesses (id, name, created_at) VALUES (?1, ?2, ?3)",
        params![
            business.id,
            business.name,
            business.created_at.format(TS_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_business(conn: &Connection, id: &str) -> anyhow::Result<Option<Business>> {
    let business = conn
        .query_row(
            "SELECT id, name, created_at FROM businesses WHERE id = ?1",
            params![id],
            |row| {
                Ok(Business {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_ts(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()?;
    Ok(business)
}

// ── Staff ──

pub fn create_staff(conn: &Connection, staff: &StaffMember) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO staff (id, business_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            staff.id,
            staff.business_id,
            staff.name,
            staff.created_at.format(TS_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_staff(conn: &Connection, id: &str) -> anyhow::Result<Option<StaffMember>> {
    let staff = conn
        .query_row(
            "SELECT id, business_id, name, created_at FROM staff WHERE id = ?1",
            params![id],
            |row| {
                Ok(StaffMember {
                    id: row.get(0)?,
                    business_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: parse_ts(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()?;
    Ok(staff)
}

// ── Hours ──

/// Which table a set of day records belongs to.
#[derive(Debug, Clone, Copy)]
pub enum HoursOwner<'a> {
    Business(&'a str),
    Staff(&'a str),
}

impl<'a> HoursOwner<'a> {
    fn table(&self) -> &'static str {
        match self {
            HoursOwner::Business(_) => "business_hours",
            HoursOwner::Staff(_) => "staff_hours",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            HoursOwner::Business(_) => "business_id",
            HoursOwner::Staff(_) => "staff_id",
        }
    }

    fn id(&self) -> &'a str {
        match self {
            HoursOwner::Business(id) | HoursOwner::Staff(id) => *id,
        }
    }
}

/// Stored records ordered by id. The list may be sparse; callers run it
/// through `parse_week` to get a full week.
pub fn get_hours(conn: &Connection, owner: HoursOwner<'_>) -> anyhow::Result<Vec<DayRecord>> {
    let sql = format!(
        "SELECT id, day, is_closed, opening_time, closing_time, break_times
         FROM {} WHERE {} = ?1 ORDER BY id ASC",
        owner.table(),
        owner.column()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner.id()], |row| Ok(parse_hours_row(row)))?;

    let mut records = vec![];
    for row in rows {
        records.push(row??);
    }
    Ok(records)
}

fn parse_hours_row(row: &Row<'_>) -> anyhow::Result<DayRecord> {
    let breaks_json: String = row.get(5)?;
    let break_times: Vec<BreakRecord> = serde_json::from_str(&breaks_json).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "discarding unreadable stored break times");
        vec![]
    });

    Ok(DayRecord {
        id: Some(row.get(0)?),
        day: row.get(1)?,
        is_closed: row.get(2)?,
        opening_time: row.get(3)?,
        closing_time: row.get(4)?,
        break_times,
    })
}

/// Replace every stored record for `owner` in one transaction.
pub fn replace_hours(
    conn: &Connection,
    owner: HoursOwner<'_>,
    records: &[DayRecord],
) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        &format!("DELETE FROM {} WHERE {} = ?1", owner.table(), owner.column()),
        params![owner.id()],
    )?;

    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} ({}, day, is_closed, opening_time, closing_time, break_times)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            owner.table(),
            owner.column()
        ))?;
        for record in records {
            stmt.execute(params![
                owner.id(),
                record.day,
                record.is_closed,
                record.opening_time,
                record.closing_time,
                serde_json::to_string(&record.break_times)?,
            ])?;
        }
    }

    tx.commit()?;
    Ok(())
}
