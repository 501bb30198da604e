//! TableAccessor
//!
//! 호출 파라미터(테이블/컬럼/조건)를 SQL 텍스트로 조립하고, 값만
//! 바인딩해서 실행합니다. 결과는 `Row` 시퀀스로 정규화됩니다.
//!
//! `where_expr`와 LEFT JOIN 조건은 호출자가 만든 raw SQL 조각을
//! 그대로 사용합니다. 신뢰할 수 있는 호출자 전용입니다.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row as _, SqlitePool};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ident;
use crate::row::{bind_value, map_column_type, row_from_sqlite, rows_from_sqlite, ColumnType, Row};

/// 단일 커넥션 위의 테이블 접근 헬퍼
///
/// 커넥션 풀은 1개로 제한되어 모든 호출이 순차 실행됩니다.
/// 호출 간 상태는 커넥션뿐이고 캐시는 없습니다.
pub struct TableAccessor {
    pool: SqlitePool,
}

impl TableAccessor {
    /// 외부에서 만든 풀을 주입해서 생성
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 설정으로 접속해서 생성
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// SELECT 실행, 모든 매칭 row 반환
    ///
    /// # Arguments
    /// * `columns` - 빈 슬라이스면 `*`
    /// * `where_expr` - raw SQL 조건 조각 (빈 문자열이면 조건 없음)
    /// * `left_joins` - `(테이블, ON 조건)` 목록, 순서대로 LEFT JOIN
    pub async fn select(
        &self,
        table: &str,
        columns: &[&str],
        where_expr: &str,
        left_joins: &[(&str, &str)],
    ) -> Result<Vec<Row>> {
        let sql = build_select(table, columns, where_expr, left_joins)?;
        tracing::debug!("select: {}", sql);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows_from_sqlite(rows))
    }

    /// SELECT ... LIMIT 1 실행, 단일 row 또는 없음
    pub async fn select_one(
        &self,
        table: &str,
        columns: &[&str],
        where_expr: &str,
        left_joins: &[(&str, &str)],
    ) -> Result<Option<Row>> {
        let mut sql = build_select(table, columns, where_expr, left_joins)?;
        sql.push_str(" LIMIT 1");
        tracing::debug!("select_one: {}", sql);
        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
        Ok(row.map(row_from_sqlite))
    }

    /// `id` 컬럼이 주어진 집합에 포함되는 row 조회
    ///
    /// `ids`가 비어 있으면 필터 없이 전체를 반환합니다. id 값은
    /// 정수형이라 IN 목록에 그대로 삽입합니다.
    pub async fn select_within_ids(
        &self,
        table: &str,
        columns: &[&str],
        ids: &[i64],
    ) -> Result<Vec<Row>> {
        if ids.is_empty() {
            return self.select(table, columns, "", &[]).await;
        }

        let list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let where_expr = format!("id IN ({})", list);
        self.select(table, columns, &where_expr, &[]).await
    }

    /// 피벗 테이블을 거쳐 대상 테이블 조회
    ///
    /// `target.id = pivot.<pivot_column>`으로 INNER JOIN 하고,
    /// `pivot.<pivot_column> = ?` (바인딩)으로 필터링합니다.
    pub async fn select_through_pivot(
        &self,
        pivot_table: &str,
        target_table: &str,
        pivot_column: &str,
        pivot_value: &Value,
        target_columns: &[&str],
    ) -> Result<Vec<Row>> {
        ident::validate(pivot_table)?;
        ident::validate(target_table)?;
        ident::validate(pivot_column)?;
        ident::validate_all(target_columns.iter().copied())?;

        let column_list = if target_columns.is_empty() {
            format!("{}.*", target_table)
        } else {
            target_columns
                .iter()
                .map(|c| format!("{}.{}", target_table, c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let sql = format!(
            "SELECT {} FROM {} INNER JOIN {} ON {}.id = {}.{} WHERE {}.{} = ?",
            column_list,
            target_table,
            pivot_table,
            target_table,
            pivot_table,
            pivot_column,
            pivot_table,
            pivot_column
        );
        tracing::debug!("select_through_pivot: {}", sql);

        let query = bind_value(sqlx::query(&sql), pivot_value);
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows_from_sqlite(rows))
    }

    /// 단일 row INSERT. 모든 값은 바인딩됩니다.
    pub async fn insert(&self, table: &str, row: &Row) -> Result<()> {
        if row.is_empty() {
            return Err(Error::MissingData {
                operation: "insert",
            });
        }
        ident::validate(table)?;
        ident::validate_all(row.keys().map(|k| k.as_str()))?;

        let columns = row.keys().map(|k| k.as_str()).collect::<Vec<_>>();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );
        tracing::debug!("insert: {}", sql);

        let mut query = sqlx::query(&sql);
        for value in row.values() {
            query = bind_value(query, value);
        }
        query.execute(&self.pool).await?;
        Ok(())
    }

    /// 멀티 row INSERT를 단일 statement로 실행
    ///
    /// 컬럼 집합은 `rows[0]` 기준입니다. 모든 row가 같은 컬럼을 갖는
    /// 것은 호출자 책임이고, 빠진 컬럼은 NULL로 바인딩됩니다.
    pub async fn insert_multiple(&self, table: &str, rows: &[Row]) -> Result<()> {
        let Some(first) = rows.first() else {
            return Err(Error::MissingData {
                operation: "insert_multiple",
            });
        };
        if first.is_empty() {
            return Err(Error::MissingData {
                operation: "insert_multiple",
            });
        }
        ident::validate(table)?;

        let columns = first.keys().map(|k| k.as_str()).collect::<Vec<_>>();
        ident::validate_all(columns.iter().copied())?;

        let tuple = format!("({})", vec!["?"; columns.len()].join(", "));
        let tuples = vec![tuple.as_str(); rows.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            columns.join(", "),
            tuples
        );
        tracing::debug!("insert_multiple: {} rows into {}", rows.len(), table);

        let mut query = sqlx::query(&sql);
        for row in rows {
            for column in &columns {
                query = bind_value(query, row.get(*column).unwrap_or(&Value::Null));
            }
        }
        query.execute(&self.pool).await?;
        Ok(())
    }

    /// 동등 조건(AND 결합)으로 UPDATE
    ///
    /// 빈 `conditions`는 전체 UPDATE가 되므로 즉시 에러입니다.
    pub async fn update(&self, table: &str, data: &Row, conditions: &Row) -> Result<()> {
        if data.is_empty() {
            return Err(Error::MissingData {
                operation: "update",
            });
        }
        if conditions.is_empty() {
            return Err(Error::EmptyConditions {
                operation: "update",
            });
        }
        ident::validate(table)?;
        ident::validate_all(data.keys().chain(conditions.keys()).map(|k| k.as_str()))?;

        let set_clause = data
            .keys()
            .map(|k| format!("{} = ?", k))
            .collect::<Vec<_>>()
            .join(", ");
        let where_clause = conditions
            .keys()
            .map(|k| format!("{} = ?", k))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!("UPDATE {} SET {} WHERE {}", table, set_clause, where_clause);
        tracing::debug!("update: {}", sql);

        // SET과 WHERE에 같은 컬럼이 와도 positional 바인딩이라 충돌 없음
        let mut query = sqlx::query(&sql);
        for value in data.values().chain(conditions.values()) {
            query = bind_value(query, value);
        }
        query.execute(&self.pool).await?;
        Ok(())
    }

    /// 동등 조건(AND 결합)으로 DELETE
    ///
    /// 빈 `conditions`는 전체 DELETE가 되므로 즉시 에러입니다.
    pub async fn delete(&self, table: &str, conditions: &Row) -> Result<()> {
        if conditions.is_empty() {
            return Err(Error::EmptyConditions {
                operation: "delete",
            });
        }
        ident::validate(table)?;
        ident::validate_all(conditions.keys().map(|k| k.as_str()))?;

        let where_clause = conditions
            .keys()
            .map(|k| format!("{} = ?", k))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!("DELETE FROM {} WHERE {}", table, where_clause);
        tracing::debug!("delete: {}", sql);

        let mut query = sqlx::query(&sql);
        for value in conditions.values() {
            query = bind_value(query, value);
        }
        query.execute(&self.pool).await?;
        Ok(())
    }

    /// 테이블 전체 비우기 (SQLite에는 TRUNCATE가 없어 DELETE로 수행)
    pub async fn truncate_table(&self, table: &str) -> Result<()> {
        ident::validate(table)?;
        let sql = format!("DELETE FROM {}", table);
        tracing::debug!("truncate_table: {}", sql);
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// 테이블 삭제 (IF EXISTS, 멱등)
    pub async fn drop_table(&self, table: &str) -> Result<()> {
        ident::validate(table)?;
        let sql = format!("DROP TABLE IF EXISTS {}", table);
        tracing::debug!("drop_table: {}", sql);
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// 테이블 생성 (IF NOT EXISTS, 멱등)
    ///
    /// 호출자 컬럼 앞에 항상 auto-increment 정수 PK `id`를 넣습니다.
    /// 컬럼 이름은 검증하지만 타입 선언 조각은 그대로 사용합니다.
    pub async fn create_table(&self, table: &str, column_defs: &[(&str, &str)]) -> Result<()> {
        ident::validate(table)?;

        let mut defs = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
        for (name, decl) in column_defs {
            ident::validate(name)?;
            defs.push(format!("{} {}", name, decl));
        }

        let sql = format!("CREATE TABLE IF NOT EXISTS {} ({})", table, defs.join(", "));
        tracing::debug!("create_table: {}", sql);
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// `<backup_name>_backup` 테이블을 만들고 모든 row를 복사
    ///
    /// 스키마 복사는 `AS SELECT ... WHERE 0`으로 수행합니다. SQLite
    /// 특성상 PK/autoincrement 속성은 복사되지 않습니다.
    pub async fn backup_table(&self, table: &str, backup_name: &str) -> Result<()> {
        ident::validate(table)?;
        ident::validate(backup_name)?;

        let backup = format!("{}_backup", backup_name);
        let create = format!("CREATE TABLE {} AS SELECT * FROM {} WHERE 0", backup, table);
        tracing::debug!("backup_table: {}", create);
        sqlx::query(&create).execute(&self.pool).await?;

        let copy = format!("INSERT INTO {} SELECT * FROM {}", backup, table);
        sqlx::query(&copy).execute(&self.pool).await?;
        Ok(())
    }

    /// 컬럼 이름 → 축약 타입 매핑 조회
    pub async fn column_types(&self, table: &str) -> Result<HashMap<String, ColumnType>> {
        ident::validate(table)?;

        let sql = format!("SELECT name, type FROM pragma_table_info('{}')", table);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut map = HashMap::new();
        for row in rows {
            let name: String = row.try_get("name")?;
            let declared: String = row.try_get("type")?;
            map.insert(name, map_column_type(&declared));
        }
        Ok(map)
    }

    /// source의 row를 target에 append-only로 병합
    ///
    /// `merge_column`이 있으면 target을 그 컬럼 값으로 한 번 인덱싱한 뒤
    /// source를 한 번 스캔합니다. 이미 존재하는 키는 조용히 건너뛰고,
    /// 나머지는 source row 전체를 target에 INSERT 합니다. target의
    /// 기존 row는 절대 덮어쓰거나 지우지 않습니다.
    ///
    /// `merge_column`이 없으면 전부 무조건 INSERT 합니다.
    pub async fn merge_tables(
        &self,
        source: &str,
        target: &str,
        merge_column: Option<&str>,
    ) -> Result<()> {
        if let Some(column) = merge_column {
            ident::validate(column)?;
        }

        let source_rows = self.select(source, &[], "", &[]).await?;

        let existing: Option<HashSet<String>> = match merge_column {
            Some(column) => {
                let target_rows = self.select(target, &[], "", &[]).await?;
                Some(
                    target_rows
                        .iter()
                        .filter_map(|row| row.get(column))
                        .map(|value| value.to_string())
                        .collect(),
                )
            }
            None => None,
        };

        let mut inserted = 0usize;
        let mut skipped = 0usize;
        for row in &source_rows {
            if let (Some(column), Some(index)) = (merge_column, existing.as_ref()) {
                match row.get(column) {
                    Some(value) if index.contains(&value.to_string()) => {
                        skipped += 1;
                        continue;
                    }
                    None => {
                        tracing::warn!(
                            "merge_tables: row in {} has no {} column, inserting anyway",
                            source,
                            column
                        );
                    }
                    _ => {}
                }
            }
            self.insert(target, row).await?;
            inserted += 1;
        }

        tracing::debug!(
            "merge_tables: {} -> {}, {} inserted, {} skipped",
            source,
            target,
            inserted,
            skipped
        );
        Ok(())
    }
}

/// SELECT 문 조립 (LIMIT 제외 공통 부분)
fn build_select(
    table: &str,
    columns: &[&str],
    where_expr: &str,
    left_joins: &[(&str, &str)],
) -> Result<String> {
    ident::validate(table)?;
    ident::validate_all(columns.iter().copied())?;

    let column_list = if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(", ")
    };

    let mut sql = format!("SELECT {} FROM {}", column_list, table);
    for (join_table, condition) in left_joins {
        ident::validate(join_table)?;
        sql.push_str(" LEFT JOIN ");
        sql.push_str(join_table);
        sql.push_str(" ON ");
        sql.push_str(condition);
    }
    if !where_expr.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(where_expr);
    }
    Ok(sql)
}
