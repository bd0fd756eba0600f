// errors.rs
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Ошибка HTTP запроса: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Ошибка парсинга JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Ошибка конфигурации: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Ошибка regex: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Ошибка выполнения задачи: {0}")]
    TaskError(#[from] JoinError),

    #[error("Ошибка записи вывода: {0}")]
    OutputError(#[from] std::io::Error),

    #[error("Недостаточно истории для {ticker}: {bars} баров")]
    InsufficientHistory { ticker: String, bars: usize },

    #[error("Некорректный формат данных: {0}")]
    InvalidDataFormat(String),

    #[error("API вернул ошибку: {0}")]
    ApiError(String),

    #[error("Сервис сентимента недоступен: {0}")]
    SentimentService(String),

    #[error("Некорректный ответ сервиса сентимента: {0}")]
    SentimentParse(String),

    #[error("Нет доступных источников данных: {0}")]
    NoDataSourcesAvailable(String),
}

// Определяем псевдоним Result с фиксированным типом ошибки
pub type Result<T> = std::result::Result<T, AnalysisError>;
