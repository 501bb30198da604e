//! Row 타입과 값 변환
//!
//! 읽기 결과는 컬럼 이름 → JSON 스칼라의 순서 보존 매핑(`Row`)으로,
//! 쓰기 입력은 같은 `Row`의 값들을 positional 바인딩으로 변환합니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, TypeInfo};

/// 컬럼 이름 → 값 매핑 (삽입 순서 보존)
pub type Row = serde_json::Map<String, Value>;

/// 축약된 컬럼 타입
///
/// 백엔드의 선언 타입 이름을 네 가지로 접어서 표현합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Tinyint,
    Integer,
    Float,
    String,
}

/// 선언 타입 이름을 `ColumnType`으로 축약
///
/// 크기 표기(`DECIMAL(10,2)`, `VARCHAR(50)`)는 무시합니다.
pub fn map_column_type(declared: &str) -> ColumnType {
    let base = declared
        .split('(')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match base.as_str() {
        "tinyint" => ColumnType::Tinyint,
        "smallint" | "mediumint" | "int" | "integer" | "bigint" => ColumnType::Integer,
        "float" | "double" | "decimal" | "real" => ColumnType::Float,
        _ => ColumnType::String,
    }
}

pub fn rows_from_sqlite(rows: Vec<SqliteRow>) -> Vec<Row> {
    rows.into_iter().map(row_from_sqlite).collect()
}

/// SQLite row를 `Row`로 변환
pub fn row_from_sqlite(row: SqliteRow) -> Row {
    let mut obj = Row::new();
    for column in row.columns() {
        let name = column.name();
        let type_name = column.type_info().name().to_ascii_uppercase();
        let value = match type_name.as_str() {
            "INTEGER" | "INT" | "INT4" | "INT8" | "BIGINT" => row
                .try_get::<Option<i64>, _>(name)
                .ok()
                .flatten()
                .map(|v| Value::Number(v.into())),
            "REAL" | "NUMERIC" => row
                .try_get::<Option<f64>, _>(name)
                .ok()
                .flatten()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(name)
                .ok()
                .flatten()
                .map(Value::Bool),
            _ => row
                .try_get::<Option<String>, _>(name)
                .ok()
                .flatten()
                .map(Value::String),
        }
        .unwrap_or(Value::Null);

        obj.insert(name.to_string(), value);
    }
    obj
}

/// JSON 값 하나를 쿼리에 바인딩
pub fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else if let Some(f) = n.as_f64() {
                query.bind(f)
            } else {
                query.bind(n.to_string())
            }
        }
        Value::String(s) => query.bind(s.clone()),
        // 중첩 구조는 직렬화해서 텍스트로 저장
        Value::Array(_) | Value::Object(_) => query.bind(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_column_type_tinyint() {
        assert_eq!(map_column_type("TINYINT"), ColumnType::Tinyint);
        assert_eq!(map_column_type("tinyint(1)"), ColumnType::Tinyint);
    }

    #[test]
    fn test_map_column_type_integers() {
        assert_eq!(map_column_type("SMALLINT"), ColumnType::Integer);
        assert_eq!(map_column_type("MEDIUMINT"), ColumnType::Integer);
        assert_eq!(map_column_type("INT"), ColumnType::Integer);
        assert_eq!(map_column_type("INTEGER"), ColumnType::Integer);
        assert_eq!(map_column_type("BIGINT"), ColumnType::Integer);
    }

    #[test]
    fn test_map_column_type_floats() {
        assert_eq!(map_column_type("FLOAT"), ColumnType::Float);
        assert_eq!(map_column_type("DOUBLE"), ColumnType::Float);
        assert_eq!(map_column_type("DECIMAL(10,2)"), ColumnType::Float);
        assert_eq!(map_column_type("REAL"), ColumnType::Float);
    }

    #[test]
    fn test_map_column_type_fallback_is_string() {
        assert_eq!(map_column_type("VARCHAR(50)"), ColumnType::String);
        assert_eq!(map_column_type("TEXT"), ColumnType::String);
        assert_eq!(map_column_type("DATETIME"), ColumnType::String);
        assert_eq!(map_column_type(""), ColumnType::String);
    }
}
