use libsql::{params, Connection, Row};

use crate::error::{PillboxError, Result};
use crate::models::{NameField, Page, PillRecord, PillSortField, PillSummary, SortOrder};

const PILL_COLUMNS: &str = r#"
    pills.id, pills.name, pills.engname, pills.companyname, pills.companyengname,
    pills.ingredientname, pills.ingredientengname, pills.type, pills.shape,
    pills.efficacy, pills.dosage, pills.caution, pills.cautionwarning,
    pills.interaction, pills.sideeffect, pills.storagemethod, pills.imagepath
"#;

const PILL_COLUMN_COUNT: i32 = 17;

/// Escapes LIKE wildcards so user text only ever matches literally.
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn page_values(page: Page) -> (i64, i64) {
    (i64::from(page.limit), i64::from(page.offset))
}

fn count_to_u64(count: i64) -> Result<u64> {
    u64::try_from(count).map_err(|_| PillboxError::Unknown(format!("negative row count {count}")))
}

pub struct PillRepository;

impl PillRepository {
    pub async fn get_by_id(conn: &Connection, id: i64) -> Result<Option<PillRecord>> {
        let sql = format!("SELECT {PILL_COLUMNS} FROM pills WHERE pills.id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_pill(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn count(conn: &Connection) -> Result<u64> {
        let mut rows = conn.query("SELECT COUNT(*) FROM pills", ()).await?;
        match rows.next().await? {
            Some(row) => count_to_u64(row.get::<i64>(0)?),
            None => Ok(0),
        }
    }

    pub async fn list(
        conn: &Connection,
        page: Page,
        sort_by: PillSortField,
        order: SortOrder,
    ) -> Result<(Vec<PillSummary>, u64)> {
        let total = Self::count(conn).await?;

        // sort_by and order only ever expand to fixed SQL literals.
        let sql = format!(
            r#"
            SELECT {PILL_COLUMNS}, COALESCE(favorite_counts.count, 0) AS favorite_count
            FROM pills
            LEFT JOIN (
                SELECT pillid, COUNT(*) AS count
                FROM favorites
                GROUP BY pillid
            ) AS favorite_counts ON pills.id = favorite_counts.pillid
            ORDER BY {} {}, pills.id ASC
            LIMIT ?1 OFFSET ?2
            "#,
            sort_by.sql(),
            order.sql()
        );

        let (limit, offset) = page_values(page);
        let mut rows = conn.query(&sql, params![limit, offset]).await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let pill = Self::row_to_pill(&row)?;
            let favorite_count: i64 = row.get(PILL_COLUMN_COUNT)?;
            results.push(PillSummary {
                pill,
                favorite_count,
            });
        }

        Ok((results, total))
    }

    pub async fn search_by_name_prefix(
        conn: &Connection,
        text: &str,
        field: NameField,
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        let sql = format!(
            r"SELECT {PILL_COLUMNS} FROM pills WHERE pills.{} LIKE ?1 ESCAPE '\' LIMIT ?2 OFFSET ?3",
            field.column()
        );
        let pattern = format!("{}%", escape_like(text));
        let (limit, offset) = page_values(page);

        let rows = conn.query(&sql, params![pattern, limit, offset]).await?;
        Self::collect_pills(rows).await
    }

    pub async fn search_by_efficacy(
        conn: &Connection,
        terms: &[String],
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut where_clauses = Vec::with_capacity(terms.len());
        let mut values: Vec<libsql::Value> = Vec::with_capacity(terms.len() + 2);
        for (i, term) in terms.iter().enumerate() {
            where_clauses.push(format!(r"pills.efficacy LIKE ?{} ESCAPE '\'", i + 1));
            values.push(libsql::Value::from(format!("%{}%", escape_like(term))));
        }

        let (limit, offset) = page_values(page);
        let sql = format!(
            "SELECT {PILL_COLUMNS} FROM pills WHERE {} LIMIT ?{} OFFSET ?{}",
            where_clauses.join(" AND "),
            terms.len() + 1,
            terms.len() + 2
        );
        values.push(libsql::Value::Integer(limit));
        values.push(libsql::Value::Integer(offset));

        let rows = conn.query(&sql, libsql::params_from_iter(values)).await?;
        Self::collect_pills(rows).await
    }

    pub async fn search_by_imprint(
        conn: &Connection,
        front: &str,
        back: Option<&str>,
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        let (limit, offset) = page_values(page);

        let rows = match back {
            Some(back) => {
                let sql = format!(
                    r#"
                    SELECT {PILL_COLUMNS}
                    FROM pillocr
                    JOIN pills ON pills.id = pillocr.id
                    WHERE pillocr.front = ?1 AND pillocr.back = ?2
                    LIMIT ?3 OFFSET ?4
                    "#
                );
                conn.query(&sql, params![front, back, limit, offset])
                    .await?
            }
            None => {
                let sql = format!(
                    r#"
                    SELECT {PILL_COLUMNS}
                    FROM pillocr
                    JOIN pills ON pills.id = pillocr.id
                    WHERE pillocr.front = ?1 AND (pillocr.back IS NULL OR pillocr.back = '')
                    LIMIT ?2 OFFSET ?3
                    "#
                );
                conn.query(&sql, params![front, limit, offset]).await?
            }
        };

        Self::collect_pills(rows).await
    }

    pub async fn search_by_engname_contains(
        conn: &Connection,
        text: &str,
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        let sql = format!(
            r"SELECT {PILL_COLUMNS} FROM pills WHERE pills.engname LIKE ?1 ESCAPE '\' LIMIT ?2 OFFSET ?3"
        );
        let pattern = format!("%{}%", escape_like(text));
        let (limit, offset) = page_values(page);

        let rows = conn.query(&sql, params![pattern, limit, offset]).await?;
        Self::collect_pills(rows).await
    }

    pub async fn favorite_count(conn: &Connection, pill_id: i64) -> Result<u64> {
        Self::count_by_pill(conn, "SELECT COUNT(*) FROM favorites WHERE pillid = ?1", pill_id)
            .await
    }

    pub async fn review_count(conn: &Connection, pill_id: i64) -> Result<u64> {
        Self::count_by_pill(conn, "SELECT COUNT(*) FROM reviews WHERE pillid = ?1", pill_id).await
    }

    async fn count_by_pill(conn: &Connection, sql: &str, pill_id: i64) -> Result<u64> {
        let mut rows = conn.query(sql, params![pill_id]).await?;
        match rows.next().await? {
            Some(row) => count_to_u64(row.get::<i64>(0)?),
            None => Ok(0),
        }
    }

    async fn collect_pills(mut rows: libsql::Rows) -> Result<Vec<PillRecord>> {
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_pill(&row)?);
        }
        Ok(results)
    }

    fn row_to_pill(row: &Row) -> Result<PillRecord> {
        Ok(PillRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            engname: row.get(2)?,
            companyname: row.get(3)?,
            companyengname: row.get(4)?,
            ingredientname: row.get(5)?,
            ingredientengname: row.get(6)?,
            pill_type: row.get(7)?,
            shape: row.get(8)?,
            efficacy: row.get(9)?,
            dosage: row.get(10)?,
            caution: row.get(11)?,
            cautionwarning: row.get(12)?,
            interaction: row.get(13)?,
            sideeffect: row.get(14)?,
            storagemethod: row.get(15)?,
            imagepath: row.get(16)?,
        })
    }
}
