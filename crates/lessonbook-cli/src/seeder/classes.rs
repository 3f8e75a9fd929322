//! Class and module seeding.

use lessonbook_models::classes::{ClassKind, PeriodType};
use lessonbook_models::ids::{ClassId, SchoolYearId};
use sqlx::SqlitePool;
use std::time::Instant;

use super::models::{ClassSeed, ModuleSeed};

/// One regular annual class and one professional class with modules.
pub fn default_classes() -> Vec<ClassSeed> {
    vec![
        ClassSeed {
            name: "10.º A",
            kind: ClassKind::Regular,
            period_type: PeriodType::Annual,
            weekly_load: [2, 0, 2, 0, 1],
            modules: Vec::new(),
        },
        ClassSeed {
            name: "11.º TIS",
            kind: ClassKind::Professional,
            period_type: PeriodType::Annual,
            weekly_load: [0, 3, 0, 3, 0],
            modules: vec![
                ModuleSeed {
                    name: "Módulo 4 - Programação orientada a objetos",
                    total_lessons: 48,
                },
                ModuleSeed {
                    name: "Módulo 5 - Bases de dados",
                    total_lessons: 36,
                },
                ModuleSeed {
                    name: "Módulo 6 - Programação web",
                    total_lessons: 54,
                },
            ],
        },
    ]
}

/// Inserts the classes and their modules, returning the class ids in order.
pub async fn seed_classes(
    db: &SqlitePool,
    school_year_id: SchoolYearId,
    classes: &[ClassSeed],
) -> Result<Vec<ClassId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏫 Seeding {} classes...", classes.len());

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(classes.len());
    let mut module_count = 0;

    for class in classes {
        let [monday, tuesday, wednesday, thursday, friday] = class.weekly_load;
        let class_id = sqlx::query_scalar::<_, ClassId>(
            r#"INSERT INTO classes
                   (school_year_id, name, kind, period_type,
                    load_monday, load_tuesday, load_wednesday, load_thursday, load_friday)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING id"#,
        )
        .bind(school_year_id)
        .bind(class.name)
        .bind(class.kind)
        .bind(class.period_type)
        .bind(monday)
        .bind(tuesday)
        .bind(wednesday)
        .bind(thursday)
        .bind(friday)
        .fetch_one(&mut *tx)
        .await?;

        for (position, module) in class.modules.iter().enumerate() {
            sqlx::query(
                "INSERT INTO modules (class_id, name, total_lessons, position) VALUES (?, ?, ?, ?)",
            )
            .bind(class_id)
            .bind(module.name)
            .bind(module.total_lessons)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
            module_count += 1;
        }

        ids.push(class_id);
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} classes and {} modules in {:?}",
        ids.len(),
        module_count,
        start_time.elapsed()
    );

    Ok(ids)
}
