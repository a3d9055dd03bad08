//! 監視対象データベース操作

use super::{format_timestamp, parse_timestamp};
use crate::types::Target;
use sqlx::SqlitePool;
use std::collections::HashSet;

/// 監視対象を登録または更新
///
/// 既存IDの場合は可変フィールドと`last_seen`を更新し`active = 1`に戻す。
/// `first_seen`は初回登録時の値を保持する。
pub async fn upsert_target(pool: &SqlitePool, target: &Target) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO targets (
            id, name, context_length, accepts_images, first_seen, last_seen, active
        ) VALUES (?, ?, ?, ?, ?, ?, 1)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            context_length = excluded.context_length,
            accepts_images = excluded.accepts_images,
            last_seen = excluded.last_seen,
            active = 1
        "#,
    )
    .bind(&target.id)
    .bind(&target.name)
    .bind(target.context_length)
    .bind(target.accepts_images)
    .bind(format_timestamp(&target.first_seen))
    .bind(format_timestamp(&target.last_seen))
    .execute(pool)
    .await?;

    Ok(())
}

/// 今回のサイクルで検出されなかった有効な監視対象を無効化
///
/// 無効化したIDの一覧を返す。プローブ履歴は保持される。
pub async fn deactivate_missing(
    pool: &SqlitePool,
    seen_ids: &HashSet<String>,
) -> Result<Vec<String>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let active: Vec<String> =
        sqlx::query_scalar("SELECT id FROM targets WHERE active = 1 ORDER BY id")
            .fetch_all(&mut *tx)
            .await?;

    let missing: Vec<String> = active
        .into_iter()
        .filter(|id| !seen_ids.contains(id))
        .collect();

    for id in &missing {
        sqlx::query("UPDATE targets SET active = 0 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(missing)
}

/// 有効な監視対象のID一覧
pub async fn list_active_target_ids(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM targets WHERE active = 1 ORDER BY id")
        .fetch_all(pool)
        .await
}

/// IDで監視対象を取得
pub async fn get_target(pool: &SqlitePool, id: &str) -> Result<Option<Target>, sqlx::Error> {
    let row = sqlx::query_as::<_, TargetRow>(
        r#"
        SELECT id, name, context_length, accepts_images, first_seen, last_seen, active
        FROM targets
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Into::into))
}

/// 監視対象一覧（無効なものを含む）
pub async fn list_targets(pool: &SqlitePool) -> Result<Vec<Target>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TargetRow>(
        r#"
        SELECT id, name, context_length, accepts_images, first_seen, last_seen, active
        FROM targets
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(sqlx::FromRow)]
struct TargetRow {
    id: String,
    name: String,
    context_length: i64,
    accepts_images: bool,
    first_seen: String,
    last_seen: String,
    active: bool,
}

impl From<TargetRow> for Target {
    fn from(row: TargetRow) -> Self {
        Target {
            id: row.id,
            name: row.name,
            context_length: row.context_length,
            accepts_images: row.accepts_images,
            first_seen: parse_timestamp(&row.first_seen),
            last_seen: parse_timestamp(&row.last_seen),
            active: row.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db_pool;

    #[tokio::test]
    async fn test_upsert_creates_active_target() {
        let pool = test_db_pool().await;

        let target = Target::new("free/model-a", "Model A").with_context_length(8000);
        upsert_target(&pool, &target).await.unwrap();

        let fetched = get_target(&pool, "free/model-a").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Model A");
        assert_eq!(fetched.context_length, 8000);
        assert!(fetched.active);
        assert!(!fetched.accepts_images);
    }

    #[tokio::test]
    async fn test_upsert_refreshes_fields_and_keeps_first_seen() {
        let pool = test_db_pool().await;

        let first = Target::new("m1", "Old Name");
        upsert_target(&pool, &first).await.unwrap();
        deactivate_missing(&pool, &HashSet::new()).await.unwrap();

        let mut second = Target::new("m1", "New Name")
            .with_context_length(32000)
            .with_accepts_images(true);
        second.first_seen = first.first_seen + chrono::Duration::hours(1);
        second.last_seen = second.first_seen;
        upsert_target(&pool, &second).await.unwrap();

        let fetched = get_target(&pool, "m1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "New Name");
        assert_eq!(fetched.context_length, 32000);
        assert!(fetched.accepts_images);
        assert!(fetched.active, "re-discovery should reactivate");
        assert_eq!(
            format_timestamp(&fetched.first_seen),
            format_timestamp(&first.first_seen)
        );
        assert_eq!(
            format_timestamp(&fetched.last_seen),
            format_timestamp(&second.last_seen)
        );

        assert_eq!(list_targets(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_missing_only_touches_unseen() {
        let pool = test_db_pool().await;
        for id in ["a", "b", "c"] {
            upsert_target(&pool, &Target::new(id, id)).await.unwrap();
        }

        let seen: HashSet<String> = ["a".to_string(), "c".to_string()].into_iter().collect();
        let deactivated = deactivate_missing(&pool, &seen).await.unwrap();
        assert_eq!(deactivated, vec!["b".to_string()]);

        let active = list_active_target_ids(&pool).await.unwrap();
        assert_eq!(active, vec!["a".to_string(), "c".to_string()]);

        let b = get_target(&pool, "b").await.unwrap().unwrap();
        assert!(!b.active);
    }

    #[tokio::test]
    async fn test_get_target_not_found() {
        let pool = test_db_pool().await;
        assert!(get_target(&pool, "missing").await.unwrap().is_none());
    }
}
