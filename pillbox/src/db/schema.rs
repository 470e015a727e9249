use libsql::Connection;

use crate::error::Result;

/// Creates the catalog tables when they are missing. Existing catalogs are
/// left untouched; loading and migrating catalog data happens elsewhere.
pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Pill catalog
        CREATE TABLE IF NOT EXISTS pills (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            engname TEXT,
            companyname TEXT,
            companyengname TEXT,
            ingredientname TEXT,
            ingredientengname TEXT,
            type TEXT,
            shape TEXT,
            efficacy TEXT,
            dosage TEXT,
            caution TEXT,
            cautionwarning TEXT,
            interaction TEXT,
            sideeffect TEXT,
            storagemethod TEXT,
            imagepath TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_pills_name ON pills(name);
        CREATE INDEX IF NOT EXISTS idx_pills_engname ON pills(engname);

        -- Printed imprints per pill face
        CREATE TABLE IF NOT EXISTS pillocr (
            id INTEGER NOT NULL,
            front TEXT,
            back TEXT,
            FOREIGN KEY (id) REFERENCES pills(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_pillocr_front_back ON pillocr(front, back);

        CREATE TABLE IF NOT EXISTS favorites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            userid TEXT NOT NULL,
            pillid INTEGER NOT NULL,
            FOREIGN KEY (pillid) REFERENCES pills(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_favorites_pillid ON favorites(pillid);

        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            userid TEXT NOT NULL,
            pillid INTEGER NOT NULL,
            content TEXT,
            created_at TEXT,
            FOREIGN KEY (pillid) REFERENCES pills(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_reviews_pillid ON reviews(pillid);
        "#,
    )
    .await?;

    Ok(())
}
