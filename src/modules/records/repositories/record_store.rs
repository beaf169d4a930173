use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder};

use crate::core::traits::{collect_pages, Page};
use crate::core::traits::repository::DEFAULT_PAGE_SIZE;
use crate::core::{AppError, Result};
use crate::modules::fees::models::PaymentTransaction;
use crate::modules::records::models::{
    Course, CourseStatus, Division, FeeType, Labelled, PaymentMode, Student, StudentStatus,
};

/// Filter for the `fee_transactions` collection (range on payment date, equality on division)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub division: Option<Division>,
}

/// Filter for the `students` collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentQuery {
    pub division: Option<Division>,
    pub status: Option<StudentStatus>,
}

/// Filter for the `courses` collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseQuery {
    pub division: Option<Division>,
    pub status: Option<CourseStatus>,
}

/// Read access to the dashboard's record collections.
///
/// Every listing is ordered by a stable key (`payment_date, id` for transactions, `id`
/// otherwise) so paging is deterministic.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn transactions(&self, query: &TransactionQuery, page: Page)
        -> Result<Vec<PaymentTransaction>>;

    async fn students(&self, query: &StudentQuery, page: Page) -> Result<Vec<Student>>;

    async fn courses(&self, query: &CourseQuery, page: Page) -> Result<Vec<Course>>;

    async fn transaction_by_id(&self, id: &str) -> Result<Option<PaymentTransaction>>;
}

/// Every transaction matching `query`, across all pages
pub async fn fetch_all_transactions(
    store: &dyn RecordStore,
    query: &TransactionQuery,
) -> Result<Vec<PaymentTransaction>> {
    collect_pages(DEFAULT_PAGE_SIZE, move |page| store.transactions(query, page)).await
}

/// Every student matching `query`, across all pages
pub async fn fetch_all_students(
    store: &dyn RecordStore,
    query: &StudentQuery,
) -> Result<Vec<Student>> {
    collect_pages(DEFAULT_PAGE_SIZE, move |page| store.students(query, page)).await
}

/// Every course matching `query`, across all pages
pub async fn fetch_all_courses(
    store: &dyn RecordStore,
    query: &CourseQuery,
) -> Result<Vec<Course>> {
    collect_pages(DEFAULT_PAGE_SIZE, move |page| store.courses(query, page)).await
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: String,
    receipt_number: String,
    student_id: Option<String>,
    student_name: Option<String>,
    division: Option<String>,
    course_id: Option<String>,
    course_name: Option<String>,
    total_fee: Option<Decimal>,
    amount_paid: Option<Decimal>,
    balance: Option<Decimal>,
    payment_mode: Option<String>,
    fee_type: Option<String>,
    payment_date: Option<String>,
    processed_by: Option<String>,
    notes: Option<String>,
    transaction_ref: Option<String>,
}

impl From<TransactionRow> for PaymentTransaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            receipt_number: row.receipt_number,
            student_id: row.student_id,
            student_name: row.student_name,
            division: row.division.map(Division::from),
            course_id: row.course_id,
            course_name: row.course_name,
            total_fee: row.total_fee,
            amount_paid: row.amount_paid,
            balance: row.balance,
            payment_mode: row.payment_mode.map(PaymentMode::from),
            fee_type: row.fee_type.map(FeeType::from),
            payment_date: row.payment_date,
            processed_by: row.processed_by,
            notes: row.notes,
            transaction_ref: row.transaction_ref,
        }
    }
}

#[derive(Debug, FromRow)]
struct StudentRow {
    id: String,
    name: String,
    division: Option<String>,
    course_id: Option<String>,
    status: String,
    enrolled_on: Option<String>,
    exited_on: Option<String>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            division: row.division.map(Division::from),
            course_id: row.course_id,
            status: row.status.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Unknown student status, treating as active");
                StudentStatus::Active
            }),
            enrolled_on: row.enrolled_on,
            exited_on: row.exited_on,
        }
    }
}

#[derive(Debug, FromRow)]
struct CourseRow {
    id: String,
    name: String,
    division: Option<String>,
    duration_months: Option<u32>,
    total_fee: Option<Decimal>,
    admission_fee: Option<Decimal>,
    status: String,
    description: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    instructors: Option<Json<Vec<String>>>,
    students_enrolled: Option<Json<Vec<String>>>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            division: row.division.map(Division::from),
            duration_months: row.duration_months,
            total_fee: row.total_fee,
            admission_fee: row.admission_fee,
            status: row.status.parse().unwrap_or(CourseStatus::Inactive),
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            instructors: row.instructors.map(|j| j.0).unwrap_or_default(),
            students_enrolled: row.students_enrolled.map(|j| j.0).unwrap_or_default(),
        }
    }
}

const TRANSACTION_COLUMNS: &str = r#"
    SELECT
        id, receipt_number, student_id, student_name, division,
        course_id, course_name, total_fee, amount_paid, balance,
        payment_mode, fee_type, payment_date, processed_by, notes, transaction_ref
    FROM fee_transactions
"#;

/// MySQL-backed record store
pub struct MySqlRecordStore {
    pool: MySqlPool,
}

impl MySqlRecordStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn push_page(builder: &mut QueryBuilder<'_, MySql>, page: Page) {
        builder.push(" LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset);
    }

    /// Status matches any stored spelling the row mapping reads as that status
    fn student_query(query: &StudentQuery, page: Page) -> QueryBuilder<'static, MySql> {
        let mut builder = QueryBuilder::<MySql>::new(
            "SELECT id, name, division, course_id, status, enrolled_on, exited_on \
             FROM students WHERE 1 = 1",
        );
        if let Some(division) = &query.division {
            builder.push(" AND division = ");
            builder.push_bind(division.code().to_string());
        }
        if let Some(status) = query.status {
            builder.push(" AND LOWER(TRIM(status)) IN (");
            let mut codes = builder.separated(", ");
            for code in status.stored_codes() {
                codes.push_bind(*code);
            }
            codes.push_unseparated(")");
        }
        builder.push(" ORDER BY id");
        Self::push_page(&mut builder, page);
        builder
    }
}

#[async_trait]
impl RecordStore for MySqlRecordStore {
    async fn transactions(
        &self,
        query: &TransactionQuery,
        page: Page,
    ) -> Result<Vec<PaymentTransaction>> {
        let mut builder = QueryBuilder::<MySql>::new(TRANSACTION_COLUMNS);
        builder.push(" WHERE 1 = 1");

        // payment_date holds ISO text; lexical comparison against ISO day bounds is exact
        if let Some(from) = query.from {
            builder.push(" AND payment_date >= ");
            builder.push_bind(from.format("%Y-%m-%d").to_string());
        }
        if let Some(to) = query.to {
            let day_after = to.checked_add_days(Days::new(1)).unwrap_or(to);
            builder.push(" AND payment_date < ");
            builder.push_bind(day_after.format("%Y-%m-%d").to_string());
        }
        if let Some(division) = &query.division {
            builder.push(" AND division = ");
            builder.push_bind(division.code().to_string());
        }

        builder.push(" ORDER BY payment_date, id");
        Self::push_page(&mut builder, page);

        let rows = builder
            .build_query_as::<TransactionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::record_store(format!("Failed to fetch transactions: {}", e)))?;

        Ok(rows.into_iter().map(PaymentTransaction::from).collect())
    }

    async fn students(&self, query: &StudentQuery, page: Page) -> Result<Vec<Student>> {
        let mut builder = Self::student_query(query, page);
        let rows = builder
            .build_query_as::<StudentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::record_store(format!("Failed to fetch students: {}", e)))?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn courses(&self, query: &CourseQuery, page: Page) -> Result<Vec<Course>> {
        let mut builder = QueryBuilder::<MySql>::new(
            r#"SELECT id, name, division, duration_months, total_fee, admission_fee, status,
                      description, start_date, end_date, instructors, students_enrolled
               FROM courses WHERE 1 = 1"#,
        );
        if let Some(division) = &query.division {
            builder.push(" AND division = ");
            builder.push_bind(division.code().to_string());
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ");
            builder.push_bind(status.to_string());
        }
        builder.push(" ORDER BY id");
        Self::push_page(&mut builder, page);

        let rows = builder
            .build_query_as::<CourseRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::record_store(format!("Failed to fetch courses: {}", e)))?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn transaction_by_id(&self, id: &str) -> Result<Option<PaymentTransaction>> {
        let sql = format!("{} WHERE id = ?", TRANSACTION_COLUMNS);
        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::record_store(format!("Failed to fetch transaction: {}", e)))?;

        Ok(row.map(PaymentTransaction::from))
    }
}
