use crate::{
    data::DataType,
    error::{MakeQuerySnafu, TasselError, TasselResult},
};
use bitflags::bitflags;
use chrono::{DateTime, NaiveDate, Utc};
use maud::{Markup, Render, html};
use serde::Deserialize;
use snafu::ResultExt;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::{fmt, str::FromStr};
use uuid::Uuid;

pub const PAGE_SIZE: i64 = 20;

pub const MAX_STUDENT_ID_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_MAJOR_LEN: usize = 255;

#[derive(Debug, Copy, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "graduation_status", rename_all = "lowercase")]
pub enum GraduationStatus {
    Pending,
    Graduated,
    Incomplete,
}

impl GraduationStatus {
    pub const ALL: [Self; 3] = [Self::Graduated, Self::Pending, Self::Incomplete];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Graduated => "Graduated",
            Self::Incomplete => "Incomplete",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Graduated => "graduated",
            Self::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for GraduationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraduationStatus {
    type Err = TasselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "graduated" => Ok(Self::Graduated),
            "incomplete" => Ok(Self::Incomplete),
            _ => Err(TasselError::ParseStatus {
                original: s.to_string(),
            }),
        }
    }
}

///Wrapper so a status can render as the coloured badge the listing pages use.
pub struct StatusBadge(pub GraduationStatus);

impl Render for StatusBadge {
    fn render(&self) -> Markup {
        let (classes, icon) = match self.0 {
            GraduationStatus::Graduated => ("bg-green-100 text-green-800 border-green-200", "🎓"),
            GraduationStatus::Pending => ("bg-yellow-100 text-yellow-800 border-yellow-200", "⏳"),
            GraduationStatus::Incomplete => ("bg-red-100 text-red-800 border-red-200", "⚠️"),
        };

        html! {
            span class={"inline-flex items-center gap-1 px-2 py-0.5 rounded border text-xs font-semibold " (classes)} {
                (icon)
                " "
                (self.0.label())
            }
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Student {
    pub id: Uuid,
    pub student_id: String,
    pub name: String,
    pub major: String,
    pub graduation_status: GraduationStatus,
    pub graduation_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

///Raw form input: everything arrives as strings, blanks meaning "not given".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentDetails {
    pub student_id: String,
    pub name: String,
    pub major: String,
    pub graduation_status: String,
    pub graduation_date: String,
    pub notes: String,
}

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct StudentDetailsError: u16 {
        const MISSING_STUDENT_ID =  0b0000_0000_0000_0001;
        const STUDENT_ID_TOO_LONG = 0b0000_0000_0000_0010;
        const DUPLICATE_STUDENT_ID =0b0000_0000_0000_0100;

        const MISSING_NAME =        0b0000_0000_0000_1000;
        const NAME_TOO_LONG =       0b0000_0000_0001_0000;
        const MISSING_MAJOR =       0b0000_0000_0010_0000;
        const MAJOR_TOO_LONG =      0b0000_0000_0100_0000;

        const MISSING_STATUS =      0b0000_0000_1000_0000;
        const INVALID_STATUS =      0b0000_0001_0000_0000;
        const INVALID_DATE =        0b0000_0010_0000_0000;
    }
}

impl StudentDetailsError {
    pub fn as_nice_list(&self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(|e| match e {
            Self::MISSING_STUDENT_ID => Some("Student ID is required."),
            Self::STUDENT_ID_TOO_LONG => Some("Student ID must be at most 20 characters."),
            Self::DUPLICATE_STUDENT_ID => {
                Some("This student ID is already registered to another student.")
            }
            Self::MISSING_NAME => Some("Student name is required."),
            Self::NAME_TOO_LONG => Some("Student name must be at most 255 characters."),
            Self::MISSING_MAJOR => Some("Major is required."),
            Self::MAJOR_TOO_LONG => Some("Major must be at most 255 characters."),
            Self::MISSING_STATUS => Some("Graduation status is required."),
            Self::INVALID_STATUS => {
                Some("Graduation status must be pending, graduated, or incomplete.")
            }
            Self::INVALID_DATE => Some("Graduation date must be a valid date."),
            _ => None,
        })
    }
}

///Validated details, ready to be written to the database.
#[derive(Debug, Clone)]
pub struct ValidStudent {
    pub student_id: String,
    pub name: String,
    pub major: String,
    pub graduation_status: GraduationStatus,
    pub graduation_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl StudentDetails {
    ///Checks every rule and reports all failures at once, rather than stopping
    ///at the first one.
    pub fn parse(self) -> Result<ValidStudent, StudentDetailsError> {
        let mut errors = StudentDetailsError::empty();

        let student_id = self.student_id.trim().to_string();
        if student_id.is_empty() {
            errors |= StudentDetailsError::MISSING_STUDENT_ID;
        } else if student_id.chars().count() > MAX_STUDENT_ID_LEN {
            errors |= StudentDetailsError::STUDENT_ID_TOO_LONG;
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors |= StudentDetailsError::MISSING_NAME;
        } else if name.chars().count() > MAX_NAME_LEN {
            errors |= StudentDetailsError::NAME_TOO_LONG;
        }

        let major = self.major.trim().to_string();
        if major.is_empty() {
            errors |= StudentDetailsError::MISSING_MAJOR;
        } else if major.chars().count() > MAX_MAJOR_LEN {
            errors |= StudentDetailsError::MAJOR_TOO_LONG;
        }

        let trimmed_status = self.graduation_status.trim();
        let graduation_status = if trimmed_status.is_empty() {
            errors |= StudentDetailsError::MISSING_STATUS;
            GraduationStatus::Pending
        } else {
            trimmed_status.parse().unwrap_or_else(|_| {
                errors |= StudentDetailsError::INVALID_STATUS;
                GraduationStatus::Pending
            })
        };

        let trimmed_date = self.graduation_date.trim();
        let graduation_date = if trimmed_date.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(trimmed_date, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors |= StudentDetailsError::INVALID_DATE;
                    None
                }
            }
        };

        let notes = self.notes.trim();
        let notes = if notes.is_empty() {
            None
        } else {
            Some(notes.to_string())
        };

        if errors.is_empty() {
            Ok(ValidStudent {
                student_id,
                name,
                major,
                graduation_status,
                graduation_date,
                notes,
            })
        } else {
            Err(errors)
        }
    }
}

impl From<&Student> for StudentDetails {
    //back into the raw shape the edit form works with
    fn from(student: &Student) -> Self {
        Self {
            student_id: student.student_id.clone(),
            name: student.name.clone(),
            major: student.major.clone(),
            graduation_status: student.graduation_status.to_string(),
            graduation_date: student
                .graduation_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            notes: student.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub status: Option<GraduationStatus>,
    pub search: Option<String>,
}

impl StudentFilter {
    pub fn new(status: Option<GraduationStatus>, search: Option<String>) -> Self {
        //blank search boxes arrive as empty strings and mean "no search"
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { status, search }
    }

    fn push_where(&self, query: &mut QueryBuilder<'_, Postgres>) {
        let mut keyword = " WHERE ";

        if let Some(status) = self.status {
            query
                .push(keyword)
                .push("graduation_status = ")
                .push_bind(status);
            keyword = " AND ";
        }

        if let Some(search) = &self.search {
            let pattern = format!("%{search}%");
            query
                .push(keyword)
                .push("(name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR student_id ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR major ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[derive(Debug)]
pub struct StudentPage {
    pub students: Vec<Student>,
    ///1-based
    pub page: i64,
    pub total_pages: i64,
    pub total_records: i64,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct StatusCounts {
    pub graduated: i64,
    pub pending: i64,
    pub incomplete: i64,
}

fn page_count(total_records: i64) -> i64 {
    (total_records + PAGE_SIZE - 1) / PAGE_SIZE
}

impl DataType for Student {
    type Id = Uuid;
    type FormForAdding = ValidStudent;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut PgConnection) -> TasselResult<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> TasselResult<Self::Id> {
        let ValidStudent {
            student_id,
            name,
            major,
            graduation_status,
            graduation_date,
            notes,
        } = to_be_added;

        sqlx::query_scalar::<_, Uuid>("INSERT INTO students (student_id, name, major, graduation_status, graduation_date, notes) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id")
            .bind(student_id)
            .bind(name)
            .bind(major)
            .bind(graduation_status)
            .bind(graduation_date)
            .bind(notes)
            .fetch_one(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn remove_from_database(id: Self::Id, conn: &mut PgConnection) -> TasselResult<()> {
        let done = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?;

        //deleting an already-deleted record is still a miss
        if done.rows_affected() == 0 {
            return Err(TasselError::MissingStudent { id });
        }
        Ok(())
    }
}

impl Student {
    ///Validates and inserts. The unique index backs up the pre-check, so a
    ///concurrent insert of the same identifier still comes back as the
    ///duplicate field error rather than a server error.
    pub async fn create(
        details: StudentDetails,
        conn: &mut PgConnection,
    ) -> TasselResult<Result<Uuid, StudentDetailsError>> {
        let valid = match details.parse() {
            Ok(valid) => valid,
            Err(errors) => return Ok(Err(errors)),
        };

        if Self::student_id_taken(&valid.student_id, None, conn).await? {
            return Ok(Err(StudentDetailsError::DUPLICATE_STUDENT_ID));
        }

        match Self::insert_into_database(valid, conn).await {
            Ok(id) => Ok(Ok(id)),
            Err(e) if is_unique_violation(&e) => Ok(Err(StudentDetailsError::DUPLICATE_STUDENT_ID)),
            Err(e) => Err(e),
        }
    }

    ///Same rules as `create`, except the uniqueness check skips the record
    ///being updated - a student keeps their own identifier without complaint.
    pub async fn update(
        id: Uuid,
        details: StudentDetails,
        conn: &mut PgConnection,
    ) -> TasselResult<Result<(), StudentDetailsError>> {
        let valid = match details.parse() {
            Ok(valid) => valid,
            Err(errors) => return Ok(Err(errors)),
        };

        if Self::student_id_taken(&valid.student_id, Some(id), conn).await? {
            return Ok(Err(StudentDetailsError::DUPLICATE_STUDENT_ID));
        }

        let result = sqlx::query("UPDATE students SET student_id = $2, name = $3, major = $4, graduation_status = $5, graduation_date = $6, notes = $7, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(valid.student_id)
            .bind(valid.name)
            .bind(valid.major)
            .bind(valid.graduation_status)
            .bind(valid.graduation_date)
            .bind(valid.notes)
            .execute(conn)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(TasselError::MissingStudent { id }),
            Ok(_) => Ok(Ok(())),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(Err(StudentDetailsError::DUPLICATE_STUDENT_ID))
            }
            Err(source) => Err(TasselError::MakeQuery { source }),
        }
    }

    pub async fn get_by_student_id(
        student_id: &str,
        conn: &mut PgConnection,
    ) -> TasselResult<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM students WHERE student_id = $1")
            .bind(student_id)
            .fetch_optional(conn)
            .await
            .context(MakeQuerySnafu)
    }

    ///Filtered, paginated listing. Ordering is fixed: most recent graduation
    ///first (records without a date at the end), then name.
    pub async fn search(
        filter: &StudentFilter,
        page: i64,
        conn: &mut PgConnection,
    ) -> TasselResult<StudentPage> {
        let page = page.max(1);

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM students");
        filter.push_where(&mut count_query);
        let total_records: i64 = count_query
            .build_query_scalar()
            .fetch_one(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;

        let mut select = QueryBuilder::new("SELECT * FROM students");
        filter.push_where(&mut select);
        select.push(" ORDER BY graduation_date DESC NULLS LAST, name ASC LIMIT ");
        select.push_bind(PAGE_SIZE);
        select.push(" OFFSET ");
        select.push_bind((page - 1) * PAGE_SIZE);

        let students = select
            .build_query_as::<Self>()
            .fetch_all(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;

        Ok(StudentPage {
            students,
            page,
            total_pages: page_count(total_records),
            total_records,
        })
    }

    ///Whole-table counts per status, regardless of any active filter.
    pub async fn status_counts(conn: &mut PgConnection) -> TasselResult<StatusCounts> {
        let rows: Vec<(GraduationStatus, i64)> = sqlx::query_as(
            "SELECT graduation_status, COUNT(*) FROM students GROUP BY graduation_status",
        )
        .fetch_all(conn)
        .await
        .context(MakeQuerySnafu)?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status {
                GraduationStatus::Graduated => counts.graduated = count,
                GraduationStatus::Pending => counts.pending = count,
                GraduationStatus::Incomplete => counts.incomplete = count,
            }
        }
        Ok(counts)
    }

    async fn student_id_taken(
        student_id: &str,
        excluding: Option<Uuid>,
        conn: &mut PgConnection,
    ) -> TasselResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT exists(SELECT 1 FROM students WHERE student_id = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(student_id)
        .bind(excluding)
        .fetch_one(conn)
        .await
        .context(MakeQuerySnafu)
    }
}

fn is_unique_violation(error: &TasselError) -> bool {
    matches!(error, TasselError::MakeQuery { source: sqlx::Error::Database(db) } if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::{Pool, postgres::PgPoolOptions};

    fn details(student_id: &str, name: &str, major: &str, status: &str) -> StudentDetails {
        StudentDetails {
            student_id: student_id.to_string(),
            name: name.to_string(),
            major: major.to_string(),
            graduation_status: status.to_string(),
            graduation_date: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn parse_accepts_complete_details() {
        let mut raw = details("STU12345", "John Doe", "Computer Science", "pending");
        raw.graduation_date = "2024-05-15".to_string();
        raw.notes = "Excellent student".to_string();

        let valid = raw.parse().expect("details should validate");
        assert_eq!(valid.student_id, "STU12345");
        assert_eq!(valid.graduation_status, GraduationStatus::Pending);
        assert_eq!(valid.graduation_date, NaiveDate::from_ymd_opt(2024, 5, 15));
        assert_eq!(valid.notes.as_deref(), Some("Excellent student"));
    }

    #[test]
    fn parse_reports_every_missing_field_at_once() {
        let errors = StudentDetails::default()
            .parse()
            .expect_err("empty details should not validate");

        assert!(errors.contains(StudentDetailsError::MISSING_STUDENT_ID));
        assert!(errors.contains(StudentDetailsError::MISSING_NAME));
        assert!(errors.contains(StudentDetailsError::MISSING_MAJOR));
        assert!(errors.contains(StudentDetailsError::MISSING_STATUS));
    }

    #[test]
    fn parse_rejects_unknown_statuses() {
        let errors = details("STU1", "Jane Doe", "Business", "enrolled")
            .parse()
            .expect_err("made-up status should not validate");

        assert!(errors.contains(StudentDetailsError::INVALID_STATUS));
        assert!(!errors.contains(StudentDetailsError::MISSING_STATUS));
    }

    #[test]
    fn parse_rejects_overlong_fields() {
        let errors = details(
            &"X".repeat(MAX_STUDENT_ID_LEN + 1),
            &"N".repeat(MAX_NAME_LEN + 1),
            "Biology",
            "graduated",
        )
        .parse()
        .expect_err("overlong fields should not validate");

        assert!(errors.contains(StudentDetailsError::STUDENT_ID_TOO_LONG));
        assert!(errors.contains(StudentDetailsError::NAME_TOO_LONG));
        assert!(!errors.contains(StudentDetailsError::MAJOR_TOO_LONG));
    }

    #[test]
    fn parse_rejects_malformed_dates() {
        let mut raw = details("STU2", "Jane Doe", "Business", "graduated");
        raw.graduation_date = "15/05/2024".to_string();

        let errors = raw.parse().expect_err("dd/mm/yyyy should not validate");
        assert!(errors.contains(StudentDetailsError::INVALID_DATE));
    }

    #[test]
    fn parse_trims_and_blanks_optionals_to_none() {
        let mut raw = details("  STU3  ", " Jane Doe ", "Business", "incomplete");
        raw.graduation_date = "   ".to_string();
        raw.notes = "   ".to_string();

        let valid = raw.parse().expect("details should validate");
        assert_eq!(valid.student_id, "STU3");
        assert_eq!(valid.name, "Jane Doe");
        assert_eq!(valid.graduation_date, None);
        assert_eq!(valid.notes, None);
    }

    #[test]
    fn status_strings_round_trip() {
        for status in GraduationStatus::ALL {
            assert_eq!(status.as_str().parse::<GraduationStatus>().ok(), Some(status));
        }
        assert!("alumni".parse::<GraduationStatus>().is_err());
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(20), 1);
        assert_eq!(page_count(21), 2);
        assert_eq!(page_count(45), 3);
    }

    #[test]
    fn blank_searches_are_dropped_from_the_filter() {
        let filter = StudentFilter::new(None, Some("   ".to_string()));
        assert!(filter.search.is_none());

        let filter = StudentFilter::new(None, Some("  Alice  ".to_string()));
        assert_eq!(filter.search.as_deref(), Some("Alice"));
    }

    //The rest need a real database: they connect via DATABASE_URL and quietly
    //skip when it is not set. Each test stays inside an uncommitted
    //transaction, so nothing leaks between tests or into the database.

    async fn test_pool() -> Option<Pool<Postgres>> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .ok()?;
        sqlx::migrate!().run(&pool).await.ok()?;
        Some(pool)
    }

    fn unique_student_id(prefix: &str) -> String {
        format!("{prefix}{}", &Uuid::new_v4().simple().to_string()[..12])
    }

    async fn seed(
        conn: &mut PgConnection,
        name: &str,
        major: &str,
        status: &str,
        date: Option<&str>,
    ) -> Uuid {
        let mut raw = details(&unique_student_id("S"), name, major, status);
        if let Some(date) = date {
            raw.graduation_date = date.to_string();
        }
        Student::create(raw, conn)
            .await
            .expect("unable to run create")
            .expect("seed details should validate")
    }

    #[tokio::test]
    async fn created_students_can_be_found_by_identifier() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let student_id = unique_student_id("T");
        let id = Student::create(
            details(&student_id, "John Doe", "Computer Science", "pending"),
            &mut tx,
        )
        .await
        .expect("unable to run create")
        .expect("details should validate");

        let found = Student::get_by_student_id(&student_id, &mut tx)
            .await
            .expect("unable to run lookup")
            .expect("student should exist");
        assert_eq!(found.id, id);
        assert_eq!(found.name, "John Doe");
        assert_eq!(found.graduation_status, GraduationStatus::Pending);
    }

    #[tokio::test]
    async fn duplicate_student_ids_are_rejected() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let student_id = unique_student_id("T");
        Student::create(
            details(&student_id, "John Doe", "Computer Science", "pending"),
            &mut tx,
        )
        .await
        .expect("unable to run create")
        .expect("first create should validate");

        let errors = Student::create(
            details(&student_id, "Jane Doe", "Business", "pending"),
            &mut tx,
        )
        .await
        .expect("unable to run create")
        .expect_err("second create should be a duplicate");
        assert_eq!(errors, StudentDetailsError::DUPLICATE_STUDENT_ID);
    }

    #[tokio::test]
    async fn updates_keep_their_own_identifier_but_not_others() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let first_sid = unique_student_id("A");
        let second_sid = unique_student_id("B");
        let first = Student::create(details(&first_sid, "Alice Johnson", "Physics", "pending"), &mut tx)
            .await
            .expect("unable to run create")
            .expect("details should validate");
        Student::create(details(&second_sid, "Bob Smith", "History", "pending"), &mut tx)
            .await
            .expect("unable to run create")
            .expect("details should validate");

        //re-submitting your own identifier is not a conflict
        Student::update(
            first,
            details(&first_sid, "Alice Johnson", "Physics", "graduated"),
            &mut tx,
        )
        .await
        .expect("unable to run update")
        .expect("update to own identifier should validate");

        let errors = Student::update(
            first,
            details(&second_sid, "Alice Johnson", "Physics", "graduated"),
            &mut tx,
        )
        .await
        .expect("unable to run update")
        .expect_err("stealing another identifier should be a duplicate");
        assert_eq!(errors, StudentDetailsError::DUPLICATE_STUDENT_ID);
    }

    #[tokio::test]
    async fn deleted_students_stay_gone() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let id = seed(&mut tx, "John Doe", "Computer Science", "graduated", Some("2024-05-15")).await;

        Student::remove_from_database(id, &mut tx)
            .await
            .expect("delete should succeed");
        assert!(
            Student::get_from_db_by_id(id, &mut tx)
                .await
                .expect("unable to run fetch")
                .is_none()
        );

        let err = Student::remove_from_database(id, &mut tx)
            .await
            .expect_err("second delete should miss");
        assert!(matches!(err, TasselError::MissingStudent { id: missing } if missing == id));
    }

    #[tokio::test]
    async fn updating_a_missing_student_is_not_found() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let id = Uuid::new_v4();
        let err = Student::update(
            id,
            details(&unique_student_id("M"), "John Doe", "Economics", "pending"),
            &mut tx,
        )
        .await
        .expect_err("update of unknown id should miss");
        assert!(matches!(err, TasselError::MissingStudent { id: missing } if missing == id));
    }

    #[tokio::test]
    async fn lookup_of_unknown_identifier_finds_nothing() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        assert!(
            Student::get_by_student_id(&unique_student_id("Z"), &mut tx)
                .await
                .expect("unable to run lookup")
                .is_none()
        );
    }

    #[tokio::test]
    async fn listing_filters_by_status() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let marker = format!("Status Major {}", Uuid::new_v4().simple());
        for i in 0..3 {
            seed(&mut tx, &format!("Grad {i}"), &marker, "graduated", Some("2024-06-01")).await;
        }
        for i in 0..2 {
            seed(&mut tx, &format!("Pend {i}"), &marker, "pending", None).await;
        }

        let filter = StudentFilter::new(Some(GraduationStatus::Graduated), Some(marker));
        let page = Student::search(&filter, 1, &mut tx)
            .await
            .expect("unable to run search");

        assert_eq!(page.total_records, 3);
        assert!(
            page.students
                .iter()
                .all(|s| s.graduation_status == GraduationStatus::Graduated)
        );
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_fields() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let marker = Uuid::new_v4().simple().to_string();
        seed(&mut tx, &format!("Alice {marker}"), "Computer Science", "graduated", None).await;
        seed(&mut tx, "Bob Smith", &format!("History {marker}"), "graduated", None).await;

        //hits both the name of one record and the major of the other
        let filter = StudentFilter::new(None, Some(marker.to_uppercase()));
        let page = Student::search(&filter, 1, &mut tx)
            .await
            .expect("unable to run search");
        assert_eq!(page.total_records, 2);

        let filter = StudentFilter::new(None, Some(format!("alice {marker}")));
        let page = Student::search(&filter, 1, &mut tx)
            .await
            .expect("unable to run search");
        assert_eq!(page.total_records, 1);
        assert_eq!(page.students[0].name, format!("Alice {marker}"));
    }

    #[tokio::test]
    async fn listing_orders_by_date_desc_with_nulls_last() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let marker = format!("Ordering Major {}", Uuid::new_v4().simple());
        seed(&mut tx, "Aaron", &marker, "graduated", Some("2023-01-01")).await;
        seed(&mut tx, "Beth", &marker, "graduated", Some("2024-06-01")).await;
        seed(&mut tx, "Cara", &marker, "pending", None).await;
        seed(&mut tx, "Abel", &marker, "pending", None).await;

        let filter = StudentFilter::new(None, Some(marker));
        let page = Student::search(&filter, 1, &mut tx)
            .await
            .expect("unable to run search");

        let names: Vec<_> = page.students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Beth", "Aaron", "Abel", "Cara"]);
    }

    #[tokio::test]
    async fn pagination_returns_fixed_size_pages() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let marker = format!("Pagination Major {}", Uuid::new_v4().simple());
        for i in 0..45 {
            seed(&mut tx, &format!("Student {i:02}"), &marker, "graduated", None).await;
        }

        let filter = StudentFilter::new(None, Some(marker));

        let first = Student::search(&filter, 1, &mut tx)
            .await
            .expect("unable to run search");
        assert_eq!(first.students.len(), usize::try_from(PAGE_SIZE).unwrap());
        assert_eq!(first.total_records, 45);
        assert_eq!(first.total_pages, 3);

        let last = Student::search(&filter, 3, &mut tx)
            .await
            .expect("unable to run search");
        assert_eq!(last.students.len(), 5);

        let past_the_end = Student::search(&filter, 4, &mut tx)
            .await
            .expect("unable to run search");
        assert!(past_the_end.students.is_empty());
    }

    #[tokio::test]
    async fn status_counts_cover_the_whole_table() {
        let Some(pool) = test_pool().await else { return };
        let mut tx = pool.begin().await.expect("unable to begin transaction");

        let baseline = Student::status_counts(&mut tx)
            .await
            .expect("unable to run counts");

        let marker = format!("Counting Major {}", Uuid::new_v4().simple());
        for i in 0..5 {
            seed(&mut tx, &format!("Grad {i}"), &marker, "graduated", Some("2024-05-15")).await;
        }
        for i in 0..3 {
            seed(&mut tx, &format!("Pend {i}"), &marker, "pending", None).await;
        }
        for i in 0..2 {
            seed(&mut tx, &format!("Inc {i}"), &marker, "incomplete", None).await;
        }

        let counts = Student::status_counts(&mut tx)
            .await
            .expect("unable to run counts");
        assert_eq!(counts.graduated - baseline.graduated, 5);
        assert_eq!(counts.pending - baseline.pending, 3);
        assert_eq!(counts.incomplete - baseline.incomplete, 2);
    }
}
