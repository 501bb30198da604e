//! tablekit 설정

use std::env;

/// 접속 설정
///
/// 프로세스 시작 시 한 번 읽습니다. hot-reload는 없습니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// 데이터베이스 URL (예: `sqlite::memory:`, `sqlite://data.db`)
    pub database_url: String,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("TABLEKIT_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite::memory:".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults_to_memory() {
        env::remove_var("TABLEKIT_DATABASE_URL");
        let config = Config::from_env();
        assert_eq!(config.database_url, "sqlite::memory:");
    }
}
