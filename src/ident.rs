//! 식별자 검증
//!
//! 테이블/컬럼 이름은 바인딩할 수 없으므로 SQL 텍스트에 직접 삽입됩니다.
//! 삽입 전에 영숫자와 밑줄만 허용하는 allow-list로 검증합니다.

use crate::error::{Error, Result};

/// 식별자 검증
///
/// 첫 글자는 영문자 또는 `_`, 나머지는 영숫자 또는 `_`만 허용합니다.
pub fn validate(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// 여러 식별자 검증
pub fn validate_all<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for name in names {
        validate(name)?;
    }
    Ok(())
}
