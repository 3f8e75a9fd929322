//! Student seeding functionality.
//!
//! Rosters are generated in parallel with Rayon and inserted in batches.

use fake::Fake;
use fake::faker::name::en::*;
use lessonbook_models::ids::ClassId;
use rayon::prelude::*;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use std::time::Instant;

use super::models::StudentSeed;

/// Generates a numbered roster for every class.
pub fn generate_students(class_ids: &[ClassId], students_per_class: usize) -> Vec<StudentSeed> {
    class_ids
        .par_iter()
        .flat_map(|&class_id| {
            (0..students_per_class)
                .map(|idx| generate_student(class_id, idx as i64 + 1))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn generate_student(class_id: ClassId, number: i64) -> StudentSeed {
    let first_name: String = FirstName().fake();
    let middle_name: String = LastName().fake();
    let last_name: String = LastName().fake();
    let process: u32 = (10_000..99_999).fake();

    StudentSeed {
        class_id,
        process_number: process.to_string(),
        number,
        name: format!("{} {} {}", first_name, middle_name, last_name),
        short_name: format!("{} {}", first_name, last_name),
    }
}

/// Seeds students into the given classes.
pub async fn seed_students(
    db: &SqlitePool,
    class_ids: &[ClassId],
    students_per_class: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let students = generate_students(class_ids, students_per_class);
    println!("🧑‍🎓 Seeding {} students...", students.len());

    insert_students_batch(db, &students).await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        students.len(),
        start_time.elapsed()
    );

    Ok(students.len())
}

/// Inserts students in batches using multi-value INSERT statements.
pub async fn insert_students_batch(
    db: &SqlitePool,
    students: &[StudentSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    const BATCH_SIZE: usize = 500;
    for chunk in students.chunks(BATCH_SIZE) {
        insert_students_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Sqlite>,
    students: &[StudentSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    if students.is_empty() {
        return Ok(());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO students (class_id, process_number, number, name, short_name) ");
    query.push_values(students, |mut row, student| {
        row.push_bind(student.class_id)
            .push_bind(&student.process_number)
            .push_bind(student.number)
            .push_bind(&student.name)
            .push_bind(&student.short_name);
    });

    query.build().execute(&mut **tx).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_students_numbers_each_roster() {
        let classes = [ClassId::from(1), ClassId::from(2)];
        let students = generate_students(&classes, 3);

        assert_eq!(students.len(), 6);
        for class_id in classes {
            let mut numbers: Vec<i64> = students
                .iter()
                .filter(|s| s.class_id == class_id)
                .map(|s| s.number)
                .collect();
            numbers.sort();
            assert_eq!(numbers, vec![1, 2, 3]);
        }
        assert!(students.iter().all(|s| s.process_number.len() == 5));
    }
}
