use crate::db::connection::Database;
use crate::db::repository::PillRepository;
use crate::db::traits::PillCatalog;
use crate::error::Result;
use crate::models::{NameField, Page, PillRecord, PillSortField, PillSummary, SortOrder};
use async_trait::async_trait;

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PillCatalog for LibSqlBackend {
    async fn get_pill_by_id(&self, id: i64) -> Result<Option<PillRecord>> {
        let conn = self.db.connect()?;
        PillRepository::get_by_id(&conn, id).await
    }
    async fn list_pills(
        &self,
        page: Page,
        sort_by: PillSortField,
        order: SortOrder,
    ) -> Result<(Vec<PillSummary>, u64)> {
        let conn = self.db.connect()?;
        PillRepository::list(&conn, page, sort_by, order).await
    }
    async fn search_by_name_prefix(
        &self,
        text: &str,
        field: NameField,
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        let conn = self.db.connect()?;
        PillRepository::search_by_name_prefix(&conn, text, field, page).await
    }
    async fn search_by_efficacy(&self, terms: &[String], page: Page) -> Result<Vec<PillRecord>> {
        let conn = self.db.connect()?;
        PillRepository::search_by_efficacy(&conn, terms, page).await
    }
    async fn search_by_imprint(
        &self,
        front: &str,
        back: Option<&str>,
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        let conn = self.db.connect()?;
        PillRepository::search_by_imprint(&conn, front, back, page).await
    }
    async fn search_by_engname_contains(
        &self,
        text: &str,
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        let conn = self.db.connect()?;
        PillRepository::search_by_engname_contains(&conn, text, page).await
    }
    async fn favorite_count(&self, pill_id: i64) -> Result<u64> {
        let conn = self.db.connect()?;
        PillRepository::favorite_count(&conn, pill_id).await
    }
    async fn review_count(&self, pill_id: i64) -> Result<u64> {
        let conn = self.db.connect()?;
        PillRepository::review_count(&conn, pill_id).await
    }
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use libsql::params;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    async fn setup_test_db() -> (LibSqlBackend, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("pillbox_test.db");
        let config = DatabaseConfig {
            url: format!("file:{}", db_path.display()),
            auth_token: None,
            local_path: None,
            sync_interval_secs: 60,
        };
        let db = Database::new(&config)
            .await
            .expect("Failed to create database");

        (LibSqlBackend::new(db), temp_dir)
    }

    async fn insert_pill(backend: &LibSqlBackend, id: i64, name: &str, engname: &str, efficacy: &str) {
        let conn = backend.db.connect().unwrap();
        conn.execute(
            "INSERT INTO pills (id, name, engname, efficacy, shape) VALUES (?1, ?2, ?3, ?4, 'round')",
            params![id, name, engname, efficacy],
        )
        .await
        .unwrap();
    }

    async fn insert_imprint(backend: &LibSqlBackend, id: i64, front: &str, back: Option<&str>) {
        let conn = backend.db.connect().unwrap();
        conn.execute(
            "INSERT INTO pillocr (id, front, back) VALUES (?1, ?2, ?3)",
            params![id, front, back],
        )
        .await
        .unwrap();
    }

    async fn insert_favorite(backend: &LibSqlBackend, user: &str, pill_id: i64) {
        let conn = backend.db.connect().unwrap();
        conn.execute(
            "INSERT INTO favorites (userid, pillid) VALUES (?1, ?2)",
            params![user, pill_id],
        )
        .await
        .unwrap();
    }

    fn ids(pills: &[PillRecord]) -> Vec<i64> {
        pills.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_get_pill_by_id() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 42, "타이레놀", "Tylenol", "headache, fever").await;

        let pill = backend.get_pill_by_id(42).await.unwrap().unwrap();
        assert_eq!(pill.engname.as_deref(), Some("Tylenol"));
        assert_eq!(pill.shape.as_deref(), Some("round"));
        assert!(pill.companyname.is_none());

        assert!(backend.get_pill_by_id(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_imprint_pair_exact_match() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 42, "A", "Alpha", "pain").await;
        insert_pill(&backend, 43, "B", "Beta", "pain").await;
        insert_imprint(&backend, 42, "P10", Some("G")).await;
        insert_imprint(&backend, 43, "P10", Some("H")).await;

        let found = backend
            .search_by_imprint("P10", Some("G"), Page::new(10, 0))
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![42]);

        let none = backend
            .search_by_imprint("p10", Some("G"), Page::new(10, 0))
            .await
            .unwrap();
        assert!(none.is_empty(), "imprint match is exact");
    }

    #[tokio::test]
    async fn test_imprint_without_back_matches_blank_back() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 1, "A", "Alpha", "pain").await;
        insert_pill(&backend, 2, "B", "Beta", "pain").await;
        insert_pill(&backend, 3, "C", "Gamma", "pain").await;
        insert_imprint(&backend, 1, "ABC", None).await;
        insert_imprint(&backend, 2, "ABC", Some("")).await;
        insert_imprint(&backend, 3, "ABC", Some("Z")).await;

        let mut found = ids(
            &backend
                .search_by_imprint("ABC", None, Page::new(10, 0))
                .await
                .unwrap(),
        );
        found.sort();
        assert_eq!(found, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_engname_contains_is_case_insensitive() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 1, "A", "Tylenol ER", "pain").await;
        insert_pill(&backend, 2, "B", "Advil", "pain").await;

        let found = backend
            .search_by_engname_contains("lenol", Page::new(10, 0))
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![1]);

        let found = backend
            .search_by_engname_contains("TYLENOL", Page::new(10, 0))
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![1]);
    }

    #[tokio::test]
    async fn test_name_prefix_search() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 1, "게보린", "Geworin", "pain").await;
        insert_pill(&backend, 2, "타이레놀", "Tylenol", "pain").await;
        insert_pill(&backend, 3, "Tyrex", "Tyrex", "pain").await;

        let found = backend
            .search_by_name_prefix("ty", NameField::Engname, Page::new(10, 0))
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![2, 3]);

        let found = backend
            .search_by_name_prefix("타이", NameField::Name, Page::new(10, 0))
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![2]);

        // prefix, not substring
        let found = backend
            .search_by_name_prefix("lenol", NameField::Engname, Page::new(10, 0))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_efficacy_terms_are_anded() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 1, "A", "Alpha", "Relieves Headache and fever").await;
        insert_pill(&backend, 2, "B", "Beta", "headache only").await;
        insert_pill(&backend, 3, "C", "Gamma", "fever only").await;

        let terms = vec!["headache".to_string(), "fever".to_string()];
        let found = backend
            .search_by_efficacy(&terms, Page::new(10, 0))
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![1]);
    }

    #[tokio::test]
    async fn test_like_wildcards_are_literal() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 1, "A", "Alpha", "pain").await;

        let found = backend
            .search_by_engname_contains("%", Page::new(10, 0))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_list_sorted_by_favorite_count() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 1, "A", "Alpha", "pain").await;
        insert_pill(&backend, 2, "B", "Beta", "pain").await;
        insert_pill(&backend, 3, "C", "Gamma", "pain").await;
        insert_favorite(&backend, "u1", 2).await;
        insert_favorite(&backend, "u2", 2).await;
        insert_favorite(&backend, "u1", 3).await;

        let (pills, total) = backend
            .list_pills(Page::new(2, 0), PillSortField::FavoriteCount, SortOrder::Desc)
            .await
            .unwrap();

        assert_eq!(total, 3);
        let summary: Vec<(i64, i64)> = pills.iter().map(|s| (s.pill.id, s.favorite_count)).collect();
        assert_eq!(summary, vec![(2, 2), (3, 1)]);

        let (pills, _) = backend
            .list_pills(Page::new(2, 2), PillSortField::FavoriteCount, SortOrder::Desc)
            .await
            .unwrap();
        assert_eq!(pills.len(), 1);
        assert_eq!(pills[0].pill.id, 1);
        assert_eq!(pills[0].favorite_count, 0);
    }

    #[tokio::test]
    async fn test_favorite_and_review_counts() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 1, "A", "Alpha", "pain").await;
        insert_favorite(&backend, "u1", 1).await;
        insert_favorite(&backend, "u2", 1).await;

        let conn = backend.db.connect().unwrap();
        conn.execute(
            "INSERT INTO reviews (userid, pillid, content) VALUES ('u1', 1, 'works')",
            (),
        )
        .await
        .unwrap();

        assert_eq!(backend.favorite_count(1).await.unwrap(), 2);
        assert_eq!(backend.review_count(1).await.unwrap(), 1);
        assert_eq!(backend.review_count(99).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_catalog_answers_queries() {
        let config = DatabaseConfig {
            url: ":memory:".to_string(),
            auth_token: None,
            local_path: None,
            sync_interval_secs: 60,
        };
        let backend = LibSqlBackend::new(Database::new(&config).await.unwrap());
        insert_pill(&backend, 1, "A", "Alpha", "pain").await;

        assert_eq!(backend.get_pill_by_id(1).await.unwrap().unwrap().name, "A");
        assert!(backend.get_pill_by_id(2).await.unwrap().is_none());
        assert_eq!(backend.favorite_count(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_case_folding_is_ascii_only() {
        let (backend, _dir) = setup_test_db().await;
        insert_pill(&backend, 1, "에피돌", "ÉPIDOL Tab.", "Ödem").await;
        let page = Page::new(10, 0);

        let hits = backend.search_by_engname_contains("pidol", page).await.unwrap();
        assert_eq!(ids(&hits), vec![1]);

        let hits = backend.search_by_engname_contains("épidol", page).await.unwrap();
        assert!(hits.is_empty());

        let terms = vec!["ödem".to_string()];
        assert!(backend.search_by_efficacy(&terms, page).await.unwrap().is_empty());
    }
}
