use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use dotenvy::dotenv;
use lessonbook_cli::seeder::{self, SeedConfig};
use lessonbook_config::{BackupConfig, DatabaseConfig};
use lessonbook_core::backup::BackupRotation;
use lessonbook_db::{SqlitePool, checkpoint_wal, init_db_pool};
use lessonbook_models::ids::ClassId;

#[derive(Parser)]
#[command(name = "lessonbook-cli")]
#[command(about = "lessonbook CLI - Administrative tools for lessonbook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database with a 2025/2026 school year, two classes and fake students
    Seed {
        /// Number of students per class
        #[arg(short = 's', long, default_value = "24")]
        students: usize,

        /// Leave the seeded year inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Remove the seeded school year (cascades to classes, calendars and rosters)
    ClearSeed,
    /// Delete every calendar entry of a class
    ResetCalendar {
        /// Class id
        #[arg(short = 'c', long)]
        class_id: i64,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Copy the database file into the backup directory and prune old backups
    Backup,
    /// Print school years, classes and a sample of calendar entries
    Inspect,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let database = DatabaseConfig::from_env();

    // The backup copies the file as it is on disk, before the pool touches it.
    if let Commands::Backup = cli.command {
        handle_backup(&BackupConfig::from_env(&database)).await;
        return;
    }

    let pool = match init_db_pool(&database).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to open database {}: {}", database.url, e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Seed { students, inactive } => handle_seed(&pool, students, inactive).await,
        Commands::ClearSeed => handle_clear_seed(&pool).await,
        Commands::ResetCalendar { class_id, yes } => {
            handle_reset_calendar(&pool, ClassId::from(class_id), yes).await
        }
        Commands::Inspect => handle_inspect(&pool).await,
        Commands::Backup => {}
    }
}

async fn handle_seed(pool: &SqlitePool, students: usize, inactive: bool) {
    let mut config = SeedConfig::new(students);
    if inactive {
        config = config.inactive();
    }

    match seeder::seed_all(pool, config).await {
        Ok(summary) => {
            println!(
                "   School year {}: {} classes, {} students",
                summary.school_year_id, summary.classes, summary.students
            );
        }
        Err(e) => {
            eprintln!("\n❌ Error seeding database: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_clear_seed(pool: &SqlitePool) {
    match seeder::clear_all(pool).await {
        Ok(0) => println!("Nothing to clear"),
        Ok(_) => println!("✅ Cleared seeded data"),
        Err(e) => {
            eprintln!("\n❌ Error clearing seeded data: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_reset_calendar(pool: &SqlitePool, class_id: ClassId, yes: bool) {
    match reset_calendar(pool, class_id, yes).await {
        Ok(Some(deleted)) => println!("✅ Deleted {} calendar entries", deleted),
        Ok(None) => println!("Cancelled"),
        Err(e) => {
            eprintln!("\n❌ Error resetting calendar: {}", e);
            std::process::exit(1);
        }
    }
}

/// Deletes the class calendar after confirmation. `None` when cancelled.
async fn reset_calendar(
    pool: &SqlitePool,
    class_id: ClassId,
    yes: bool,
) -> Result<Option<u64>, Box<dyn std::error::Error>> {
    let row = sqlx::query_as::<_, (String, String, bool)>(
        r#"SELECT c.name, y.name, y.is_closed
           FROM classes c
           JOIN school_years y ON y.id = c.school_year_id
           WHERE c.id = ?"#,
    )
    .bind(class_id)
    .fetch_optional(pool)
    .await?;

    let Some((class_name, year_name, is_closed)) = row else {
        return Err(format!("Class {} not found", class_id).into());
    };
    if is_closed {
        return Err(format!("School year {} is closed", year_name).into());
    }

    let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lesson_entries WHERE class_id = ?")
        .bind(class_id)
        .fetch_one(pool)
        .await?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} calendar entries of {} ({})?",
                entries, class_name, year_name
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(None);
        }
    }

    let deleted = sqlx::query("DELETE FROM lesson_entries WHERE class_id = ?")
        .bind(class_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(Some(deleted))
}

async fn handle_backup(config: &BackupConfig) {
    let Some(database_path) = config.database_path.clone() else {
        println!("In-memory database, nothing to back up");
        return;
    };

    if let Err(e) = checkpoint_wal(&database_path).await {
        eprintln!("\n❌ Could not checkpoint the database: {}", e);
        std::process::exit(1);
    }

    let rotation = BackupRotation::new(
        database_path,
        &config.backup_dir,
        config.retention,
        &config.host,
    );

    match rotation.run().await {
        Ok(outcome) => {
            match outcome.created {
                Some(file) => println!("✅ Backup written: {} ({} bytes)", file.name, file.size_bytes),
                None => println!("Database file does not exist yet, nothing copied"),
            }
            println!(
                "   Pruned {} old backups (keeping {})",
                outcome.pruned.len(),
                rotation.retention()
            );
        }
        Err(e) => {
            eprintln!("\n❌ Backup failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_inspect(pool: &SqlitePool) {
    if let Err(e) = inspect(pool).await {
        eprintln!("\n❌ Error reading database: {}", e);
        std::process::exit(1);
    }
}

async fn inspect(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let years = sqlx::query_as::<_, (i64, String, NaiveDate, NaiveDate, bool, bool)>(
        "SELECT id, name, start_date, end_date, is_active, is_closed FROM school_years ORDER BY start_date",
    )
    .fetch_all(pool)
    .await?;

    println!("📅 School years ({})", years.len());
    for (id, name, start, end, is_active, is_closed) in &years {
        let mut flags = Vec::new();
        if *is_active {
            flags.push("active");
        }
        if *is_closed {
            flags.push("closed");
        }
        println!("   [{}] {} {} → {} {}", id, name, start, end, flags.join(", "));
    }

    let classes = sqlx::query_as::<_, (i64, String, String, i64, i64)>(
        r#"SELECT c.id, c.name, y.name,
                  (SELECT COUNT(*) FROM lesson_entries e WHERE e.class_id = c.id AND e.is_deleted = 0),
                  (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id)
           FROM classes c
           JOIN school_years y ON y.id = c.school_year_id
           ORDER BY y.start_date, c.name"#,
    )
    .fetch_all(pool)
    .await?;

    println!("\n🏫 Classes ({})", classes.len());
    for (id, name, year, entries, students) in &classes {
        println!(
            "   [{}] {} ({}): {} calendar entries, {} students",
            id, name, year, entries, students
        );
    }

    let sample = sqlx::query_as::<_, (NaiveDate, String, String, Option<i64>, Option<String>)>(
        r#"SELECT e.date, c.name, e.kind, e.total_number, e.summary
           FROM lesson_entries e
           JOIN classes c ON c.id = e.class_id
           WHERE e.is_deleted = 0
           ORDER BY e.date, e.id
           LIMIT 10"#,
    )
    .fetch_all(pool)
    .await?;

    println!("\n📝 First {} calendar entries", sample.len());
    for (date, class, kind, total, summary) in &sample {
        println!(
            "   {} {} [{}] n.º {} {}",
            date.format("%d/%m/%Y"),
            class,
            kind,
            total.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            summary.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
