//! Student seeding.

use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};

use super::SeedResult;
use super::models::StudentSeed;

const COURSES: &[&str] = &[
    "Computing",
    "Engineering",
    "Physics",
    "Mathematics",
    "Business",
    "Nursing",
    "Law",
    "Art and Design",
];

const BATCH_SIZE: usize = 500;

/// Generates students in parallel using Rayon.
///
/// Emails embed the row index so that a single run never collides with
/// itself.
pub fn generate_students(count: usize) -> Vec<StudentSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first: String = FirstName().fake();
            let last: String = LastName().fake();
            let course_idx: usize = (0..COURSES.len()).fake();
            let has_photo = (0..4).fake::<u8>() != 0;

            StudentSeed {
                email: format!(
                    "{}.{}{}@sms.test",
                    first.to_lowercase(),
                    last.to_lowercase().replace(' ', ""),
                    idx
                ),
                photo_url: has_photo
                    .then(|| format!("https://i.pravatar.cc/150?u={}", idx)),
                name: format!("{} {}", first, last),
                course: COURSES[course_idx].to_string(),
                age: (16..=60).fake(),
                grade: (0..=100).fake(),
            }
        })
        .collect()
}

pub async fn seed_students(db: &PgPool, count: usize) -> SeedResult<Vec<i32>> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} students...", count);

    let students = generate_students(count);
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(students.len());
    for chunk in students.chunks(BATCH_SIZE) {
        ids.extend(insert_students_chunk(&mut tx, chunk).await?);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> SeedResult<Vec<i32>> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        String::from("INSERT INTO students (name, email, course, age, grade, photo_url) VALUES ");
    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 6;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5,
            p + 6
        ));
    }
    // Re-running the seeder must not abort on an existing address
    query.push_str(" ON CONFLICT DO NOTHING RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for student in students {
        q = q
            .bind(&student.name)
            .bind(&student.email)
            .bind(&student.course)
            .bind(student.age)
            .bind(student.grade)
            .bind(&student.photo_url);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_students_are_valid() {
        let students = generate_students(40);
        assert_eq!(students.len(), 40);
        for s in &students {
            assert!((16..=60).contains(&s.age));
            assert!((0..=100).contains(&s.grade));
            assert!(COURSES.contains(&s.course.as_str()));
            assert!(s.email.ends_with("@sms.test"));
        }
    }

    #[test]
    fn test_generated_emails_are_unique() {
        let students = generate_students(200);
        let mut emails: Vec<&str> = students.iter().map(|s| s.email.as_str()).collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), 200);
    }
}
