//! tablekit: 동적 테이블 접근 라이브러리
//!
//! 호출 시점에 주어진 테이블/컬럼 이름으로 SQL을 생성하고 실행합니다.
//! 식별자는 allow-list 검증 후 SQL 텍스트에 삽입되고, 값은 항상
//! positional 파라미터로 바인딩됩니다.
//!
//! # 모듈 구조
//!
//! - `accessor`: `TableAccessor` — CRUD, 머지, 컬럼 타입 조회
//! - `row`: `Row` 타입과 값 변환
//! - `ident`: 식별자 검증
//! - `config`: 환경변수 설정
//! - `error`: 공통 에러 타입

pub mod accessor;
pub mod config;
pub mod error;
pub mod ident;
pub mod row;

pub use accessor::TableAccessor;
pub use config::Config;
pub use error::{Error, Result};
pub use row::{ColumnType, Row};
