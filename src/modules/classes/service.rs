use anyhow::anyhow;
use lessonbook_core::AppError;
use lessonbook_models::ids::{ClassId, ModuleId, SchoolYearId};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::modules::calendar::service::CalendarService;
use crate::modules::classes::model::{
    Class, ClassFilterParams, CreateClassDto, Module, ModuleDto, UpdateClassDto,
};
use crate::modules::school_years::service::SchoolYearService;
use crate::utils::guards::{class_context, open_class_context, open_school_year};

fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::bad_request(anyhow!(
            "A class with this name already exists in the school year"
        ));
    }
    AppError::from(e)
}

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db))]
    pub async fn create_class(db: &SqlitePool, dto: CreateClassDto) -> Result<Class, AppError> {
        open_school_year(db, dto.school_year_id).await?;

        let class = sqlx::query_as::<_, Class>(
            r#"INSERT INTO classes
                   (school_year_id, name, kind, period_type, load_monday, load_tuesday,
                    load_wednesday, load_thursday, load_friday)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(dto.school_year_id)
        .bind(dto.name.trim())
        .bind(dto.kind)
        .bind(dto.period_type)
        .bind(dto.load_monday)
        .bind(dto.load_tuesday)
        .bind(dto.load_wednesday)
        .bind(dto.load_thursday)
        .bind(dto.load_friday)
        .fetch_one(db)
        .await
        .map_err(map_unique_violation)?;

        info!(class_id = %class.id, name = %class.name, "Class created");
        Ok(class)
    }

    /// Classes of the requested year, of the current year when none is
    /// given, or of every year with `all_years`.
    #[instrument(skip(db))]
    pub async fn get_classes(
        db: &SqlitePool,
        filters: ClassFilterParams,
    ) -> Result<Vec<Class>, AppError> {
        if filters.all_years.unwrap_or(false) && filters.school_year_id.is_none() {
            let classes = sqlx::query_as::<_, Class>(
                "SELECT * FROM classes ORDER BY school_year_id DESC, name",
            )
            .fetch_all(db)
            .await?;
            return Ok(classes);
        }

        let school_year =
            SchoolYearService::resolve_current(db, filters.school_year_id.map(SchoolYearId::from))
                .await?;
        let Some(school_year) = school_year else {
            return Ok(Vec::new());
        };

        let classes = sqlx::query_as::<_, Class>(
            "SELECT * FROM classes WHERE school_year_id = ? ORDER BY name",
        )
        .bind(school_year.id)
        .fetch_all(db)
        .await?;

        Ok(classes)
    }

    #[instrument(skip(db))]
    pub async fn get_class(db: &SqlitePool, id: ClassId) -> Result<Class, AppError> {
        Ok(class_context(db, id).await?.class)
    }

    /// Classes can move between years, but only between open ones.
    #[instrument(skip(db))]
    pub async fn update_class(
        db: &SqlitePool,
        id: ClassId,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        let existing = open_class_context(db, id).await?.class;

        if let Some(target) = dto.school_year_id
            && target != existing.school_year_id
        {
            open_school_year(db, target).await?;
        }

        let class = sqlx::query_as::<_, Class>(
            r#"UPDATE classes
               SET school_year_id = ?, name = ?, kind = ?, period_type = ?,
                   load_monday = ?, load_tuesday = ?, load_wednesday = ?,
                   load_thursday = ?, load_friday = ?, updated_at = CURRENT_TIMESTAMP
               WHERE id = ?
               RETURNING *"#,
        )
        .bind(dto.school_year_id.unwrap_or(existing.school_year_id))
        .bind(
            dto.name
                .map(|n| n.trim().to_string())
                .unwrap_or(existing.name),
        )
        .bind(dto.kind.unwrap_or(existing.kind))
        .bind(dto.period_type.unwrap_or(existing.period_type))
        .bind(dto.load_monday.unwrap_or(existing.load_monday))
        .bind(dto.load_tuesday.unwrap_or(existing.load_tuesday))
        .bind(dto.load_wednesday.unwrap_or(existing.load_wednesday))
        .bind(dto.load_thursday.unwrap_or(existing.load_thursday))
        .bind(dto.load_friday.unwrap_or(existing.load_friday))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(map_unique_violation)?;

        Ok(class)
    }

    #[instrument(skip(db))]
    pub async fn delete_class(db: &SqlitePool, id: ClassId) -> Result<(), AppError> {
        open_class_context(db, id).await?;

        sqlx::query("DELETE FROM classes WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        info!(class_id = %id, "Class deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_modules(db: &SqlitePool, class_id: ClassId) -> Result<Vec<Module>, AppError> {
        class_context(db, class_id).await?;

        let modules = sqlx::query_as::<_, Module>(
            "SELECT * FROM modules WHERE class_id = ? ORDER BY position, id",
        )
        .bind(class_id)
        .fetch_all(db)
        .await?;

        Ok(modules)
    }

    /// Adds a module (last when no position is given) and renumbers the
    /// class calendar against the new plan.
    #[instrument(skip(db))]
    pub async fn create_module(
        db: &SqlitePool,
        class_id: ClassId,
        dto: ModuleDto,
    ) -> Result<Module, AppError> {
        open_class_context(db, class_id).await?;

        let mut tx = db.begin().await?;
        let position = match dto.position {
            Some(position) => position,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COALESCE(MAX(position), 0) + 1 FROM modules WHERE class_id = ?",
                )
                .bind(class_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let module = sqlx::query_as::<_, Module>(
            r#"INSERT INTO modules (class_id, name, total_lessons, tolerance, position)
               VALUES (?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(class_id)
        .bind(dto.name.trim())
        .bind(dto.total_lessons)
        .bind(dto.tolerance)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;

        CalendarService::renumber(&mut *tx, class_id).await?;
        tx.commit().await?;

        Ok(module)
    }

    #[instrument(skip(db))]
    pub async fn update_module(
        db: &SqlitePool,
        id: ModuleId,
        dto: ModuleDto,
    ) -> Result<Module, AppError> {
        let existing = Self::find_module(db, id).await?;
        open_class_context(db, existing.class_id).await?;

        let mut tx = db.begin().await?;
        let module = sqlx::query_as::<_, Module>(
            r#"UPDATE modules
               SET name = ?, total_lessons = ?, tolerance = ?, position = ?
               WHERE id = ?
               RETURNING *"#,
        )
        .bind(dto.name.trim())
        .bind(dto.total_lessons)
        .bind(dto.tolerance)
        .bind(dto.position.unwrap_or(existing.position))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        CalendarService::renumber(&mut *tx, existing.class_id).await?;
        tx.commit().await?;

        Ok(module)
    }

    #[instrument(skip(db))]
    pub async fn delete_module(db: &SqlitePool, id: ModuleId) -> Result<(), AppError> {
        let existing = Self::find_module(db, id).await?;
        open_class_context(db, existing.class_id).await?;

        let mut tx = db.begin().await?;
        sqlx::query("DELETE FROM modules WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        CalendarService::renumber(&mut *tx, existing.class_id).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn find_module(db: &SqlitePool, id: ModuleId) -> Result<Module, AppError> {
        sqlx::query_as::<_, Module>("SELECT * FROM modules WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Module not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::classes::model::{ClassKind, PeriodType};
    use axum::http::StatusCode;

    async fn create_year(pool: &SqlitePool, name: &str, is_active: bool) -> SchoolYearId {
        sqlx::query_scalar::<_, SchoolYearId>(
            "INSERT INTO school_years (name, start_date, end_date, is_active) VALUES (?, '2025-09-12', '2026-06-30', ?) RETURNING id",
        )
        .bind(name)
        .bind(is_active)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn class_dto(school_year_id: SchoolYearId, name: &str) -> CreateClassDto {
        CreateClassDto {
            school_year_id,
            name: name.to_string(),
            kind: ClassKind::Professional,
            period_type: PeriodType::Annual,
            load_monday: 2,
            load_tuesday: 0,
            load_wednesday: 1,
            load_thursday: 0,
            load_friday: 0,
        }
    }

    fn empty_update() -> UpdateClassDto {
        UpdateClassDto {
            school_year_id: None,
            name: None,
            kind: None,
            period_type: None,
            load_monday: None,
            load_tuesday: None,
            load_wednesday: None,
            load_thursday: None,
            load_friday: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_and_list_current_year(pool: SqlitePool) {
        let old = create_year(&pool, "2024/2025", false).await;
        let current = create_year(&pool, "2025/2026", true).await;
        ClassService::create_class(&pool, class_dto(old, "10.º A"))
            .await
            .unwrap();
        let class = ClassService::create_class(&pool, class_dto(current, "11.º B"))
            .await
            .unwrap();

        let classes = ClassService::get_classes(&pool, ClassFilterParams::default())
            .await
            .unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].id, class.id);
        assert_eq!(classes[0].weekly_load(), [2, 0, 1, 0, 0]);

        let all = ClassService::get_classes(
            &pool,
            ClassFilterParams {
                school_year_id: None,
                all_years: Some(true),
            },
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_without_years_is_empty(pool: SqlitePool) {
        let classes = ClassService::get_classes(&pool, ClassFilterParams::default())
            .await
            .unwrap();
        assert!(classes.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_name_in_year(pool: SqlitePool) {
        let year = create_year(&pool, "2025/2026", true).await;
        ClassService::create_class(&pool, class_dto(year, "10.º A"))
            .await
            .unwrap();
        let err = ClassService::create_class(&pool, class_dto(year, "10.º A"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_closed_year_rejects_class_changes(pool: SqlitePool) {
        let open = create_year(&pool, "2025/2026", true).await;
        let closed = create_year(&pool, "2024/2025", false).await;
        let class = ClassService::create_class(&pool, class_dto(open, "10.º A"))
            .await
            .unwrap();
        SchoolYearService::set_closed(&pool, closed, true)
            .await
            .unwrap();

        let err = ClassService::create_class(&pool, class_dto(closed, "9.º C"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let mut dto = empty_update();
        dto.school_year_id = Some(closed);
        let err = ClassService::update_class(&pool, class.id, dto)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        SchoolYearService::set_closed(&pool, open, true)
            .await
            .unwrap();
        let err = ClassService::delete_class(&pool, class.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_merges_fields(pool: SqlitePool) {
        let year = create_year(&pool, "2025/2026", true).await;
        let class = ClassService::create_class(&pool, class_dto(year, "10.º A"))
            .await
            .unwrap();

        let mut dto = empty_update();
        dto.load_friday = Some(3);
        let updated = ClassService::update_class(&pool, class.id, dto)
            .await
            .unwrap();

        assert_eq!(updated.name, "10.º A");
        assert_eq!(updated.weekly_load(), [2, 0, 1, 0, 3]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_modules_ordered_by_position(pool: SqlitePool) {
        let year = create_year(&pool, "2025/2026", true).await;
        let class = ClassService::create_class(&pool, class_dto(year, "1.º TIS"))
            .await
            .unwrap();

        let first = ClassService::create_module(
            &pool,
            class.id,
            ModuleDto {
                name: "UFCD 0778".to_string(),
                total_lessons: 25,
                tolerance: 2,
                position: None,
            },
        )
        .await
        .unwrap();
        let second = ClassService::create_module(
            &pool,
            class.id,
            ModuleDto {
                name: "UFCD 0779".to_string(),
                total_lessons: 50,
                tolerance: 2,
                position: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(first.position, 1);
        assert_eq!(second.position, 2);

        ClassService::update_module(
            &pool,
            second.id,
            ModuleDto {
                name: "UFCD 0779".to_string(),
                total_lessons: 50,
                tolerance: 2,
                position: Some(0),
            },
        )
        .await
        .unwrap();

        let modules = ClassService::get_modules(&pool, class.id).await.unwrap();
        let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["UFCD 0779", "UFCD 0778"]);
    }
}
