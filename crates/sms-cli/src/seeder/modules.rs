//! Module catalogue and enrollment seeding.

use std::time::Instant;

use fake::Fake;
use rayon::prelude::*;
use sqlx::PgPool;

use super::SeedResult;
use super::models::{EnrollmentSeed, ModuleSeed};

pub const CATALOGUE: &[ModuleSeed] = &[
    ModuleSeed { code: "CS101", title: "Programming Fundamentals" },
    ModuleSeed { code: "CS102", title: "Databases" },
    ModuleSeed { code: "CS201", title: "Web Development" },
    ModuleSeed { code: "CS202", title: "Software Engineering" },
    ModuleSeed { code: "MA101", title: "Discrete Mathematics" },
    ModuleSeed { code: "MA201", title: "Statistics" },
    ModuleSeed { code: "BU101", title: "Professional Practice" },
    ModuleSeed { code: "PH101", title: "Physics for Engineers" },
];

/// Inserts the catalogue, keeping modules that already exist, and returns
/// every catalogue module id.
pub async fn seed_modules(db: &PgPool) -> SeedResult<Vec<i32>> {
    let start_time = Instant::now();
    println!("📘 Seeding {} modules...", CATALOGUE.len());

    let mut tx = db.begin().await?;
    for module in CATALOGUE {
        sqlx::query("INSERT INTO modules (code, title) VALUES ($1, $2) ON CONFLICT (code) DO NOTHING")
            .bind(module.code)
            .bind(module.title)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    let codes: Vec<&str> = CATALOGUE.iter().map(|m| m.code).collect();
    let ids: Vec<i32> = sqlx::query_scalar("SELECT id FROM modules WHERE code = ANY($1) ORDER BY id")
        .bind(&codes)
        .fetch_all(db)
        .await?;

    println!("   ✓ {} modules ready in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

/// Picks `per_student` distinct modules for every student, with random
/// marks.
pub fn generate_enrollments(
    student_ids: &[i32],
    module_ids: &[i32],
    per_student: usize,
) -> Vec<EnrollmentSeed> {
    if module_ids.is_empty() {
        return Vec::new();
    }
    let per_student = per_student.min(module_ids.len());

    student_ids
        .par_iter()
        .flat_map_iter(|&student_id| {
            let offset: usize = (0..module_ids.len()).fake();
            (0..per_student).map(move |i| EnrollmentSeed {
                student_id,
                module_id: module_ids[(offset + i) % module_ids.len()],
                mark: (0..=100).fake(),
            })
        })
        .collect()
}

pub async fn seed_enrollments(
    db: &PgPool,
    student_ids: &[i32],
    module_ids: &[i32],
    per_student: usize,
) -> SeedResult<u64> {
    let start_time = Instant::now();
    let enrollments = generate_enrollments(student_ids, module_ids, per_student);
    println!("📝 Seeding {} enrollments...", enrollments.len());

    let student_col: Vec<i32> = enrollments.iter().map(|e| e.student_id).collect();
    let module_col: Vec<i32> = enrollments.iter().map(|e| e.module_id).collect();
    let mark_col: Vec<i32> = enrollments.iter().map(|e| e.mark).collect();

    let inserted = sqlx::query(
        r#"
        INSERT INTO student_modules (student_id, module_id, mark)
        SELECT * FROM UNNEST($1::INT[], $2::INT[], $3::INT[])
        ON CONFLICT (student_id, module_id) DO NOTHING
        "#,
    )
    .bind(&student_col)
    .bind(&module_col)
    .bind(&mark_col)
    .execute(db)
    .await?
    .rows_affected();

    println!(
        "   ✓ Inserted {} enrollments in {:?}",
        inserted,
        start_time.elapsed()
    );
    Ok(inserted)
}
