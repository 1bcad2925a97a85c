//! Ticket seeding.

use std::time::Instant;

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use rayon::prelude::*;
use sqlx::PgPool;

use super::SeedResult;
use super::models::TicketSeed;

const ISSUES: &[&str] = &[
    "Cannot log in to the student portal",
    "Timetable shows the wrong room",
    "Library fine applied in error",
    "Coursework upload keeps failing",
    "Wi-Fi drops in the learning centre",
    "Module registration not showing",
    "Printer credit not applied",
];

/// Roughly one in three seeded tickets is already closed.
pub fn generate_tickets(student_ids: &[i32], per_student: usize) -> Vec<TicketSeed> {
    student_ids
        .par_iter()
        .flat_map_iter(|&student_id| {
            (0..per_student).map(move |_| {
                let issue_idx: usize = (0..ISSUES.len()).fake();
                let days_ago: i64 = (0..120).fake();
                let active = (0..3).fake::<u8>() != 0;

                TicketSeed {
                    student_id,
                    issue: ISSUES[issue_idx].to_string(),
                    created_on: Utc::now() - Duration::days(days_ago),
                    active,
                    resolution: (!active).then(|| Sentence(3..8).fake()),
                }
            })
        })
        .collect()
}

pub async fn seed_tickets(db: &PgPool, student_ids: &[i32], per_student: usize) -> SeedResult<u64> {
    let start_time = Instant::now();
    let tickets = generate_tickets(student_ids, per_student);
    println!("🎫 Seeding {} tickets...", tickets.len());

    let students: Vec<i32> = tickets.iter().map(|t| t.student_id).collect();
    let issues: Vec<&str> = tickets.iter().map(|t| t.issue.as_str()).collect();
    let created: Vec<chrono::DateTime<Utc>> = tickets.iter().map(|t| t.created_on).collect();
    let active: Vec<bool> = tickets.iter().map(|t| t.active).collect();
    let resolutions: Vec<Option<String>> = tickets.iter().map(|t| t.resolution.clone()).collect();

    let inserted = sqlx::query(
        r#"
        INSERT INTO tickets (student_id, issue, created_on, active, resolution)
        SELECT * FROM UNNEST($1::INT[], $2::TEXT[], $3::TIMESTAMPTZ[], $4::BOOL[], $5::TEXT[])
        "#,
    )
    .bind(&students)
    .bind(&issues)
    .bind(&created)
    .bind(&active)
    .bind(&resolutions)
    .execute(db)
    .await?
    .rows_affected();

    println!(
        "   ✓ Inserted {} tickets in {:?}",
        inserted,
        start_time.elapsed()
    );
    Ok(inserted)
}
