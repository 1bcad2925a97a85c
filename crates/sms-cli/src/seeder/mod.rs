//! Database seeding for local development.
//!
//! Generation runs in parallel with Rayon; inserts are batched inside a
//! transaction per table.

pub mod models;
pub mod modules;
pub mod students;
pub mod tickets;

use std::time::Instant;

use sqlx::PgPool;

pub use models::SeedConfig;

pub type SeedResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Seeds modules, students, their tickets and their enrollments.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> SeedResult<()> {
    let start_time = Instant::now();
    println!("\n🌱 Seeding database with {:?}\n", config);

    let module_ids = modules::seed_modules(db).await?;
    let student_ids = students::seed_students(db, config.students).await?;
    tickets::seed_tickets(db, &student_ids, config.tickets_per_student).await?;
    modules::seed_enrollments(db, &student_ids, &module_ids, config.modules_per_student).await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    Ok(())
}

/// Removes every student, ticket, enrollment and module.
pub async fn clear_all(db: &PgPool) -> SeedResult<()> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let mut tx = db.begin().await?;
    for table in ["student_modules", "tickets", "students", "modules"] {
        let deleted = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        println!("   ✓ Deleted {} rows from {}", deleted, table);
    }
    tx.commit().await?;

    println!("✅ Cleared in {:?}", start_time.elapsed());
    Ok(())
}
