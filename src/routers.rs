use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::AppState;

#[derive(Deserialize)]
pub struct AnalysisRequest {
    pub tickers: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub universe_size: usize,
    pub available_endpoints: Vec<String>,
}

// Основной обработчик анализа рынка
pub async fn market_analysis(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<Value>, StatusCode> {
    // Валидация входных данных
    let tickers = match req.tickers {
        Some(list) => {
            if list.is_empty() {
                tracing::warn!("Передан пустой список тикеров");
                return Err(StatusCode::BAD_REQUEST);
            }
            for ticker in &list {
                if !state.config.tickers.contains(ticker) {
                    tracing::warn!("Неизвестный тикер: {}", ticker);
                    return Err(StatusCode::BAD_REQUEST);
                }
            }
            list
        }
        None => state.config.tickers.clone(),
    };

    tracing::info!("Начинаем анализ рынка по {} тикерам", tickers.len());

    // Собираем данные
    if let Err(e) = state.collector.collect_data(&tickers).await {
        tracing::error!("Ошибка сбора данных: {}", e);
        return Ok(Json(json!({
            "status": "error",
            "message": format!("Ошибка сбора данных: {}", e),
            "error_type": "data_collection_error"
        })));
    }

    // Анализируем
    let report = match state.analyzer.analyze(&tickers).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Ошибка анализа: {}", e);
            return Ok(Json(json!({
                "status": "error",
                "message": format!("Ошибка анализа: {}", e),
                "error_type": "analysis_error"
            })));
        }
    };

    // Генерируем сайт и снапшот
    if let Err(e) = state.renderer.render(&report) {
        tracing::error!("Ошибка генерации сайта: {}", e);
        return Ok(Json(json!({
            "status": "error",
            "message": format!("Ошибка генерации сайта: {}", e),
            "error_type": "render_error"
        })));
    }

    tracing::info!("Анализ успешно завершен: {} записей", report.records.len());
    serde_json::to_value(&report)
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// Проверка здоровья сервиса
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Beurs Cowboy API is running".to_string(),
        version: "1.0.0".to_string(),
    })
}

// Получение статуса сервиса
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ready".to_string(),
        universe_size: state.config.tickers.len(),
        available_endpoints: vec![
            "/".to_string(),
            "/status".to_string(),
            "/analyze".to_string(),
            "/api/market-analysis".to_string(),
        ],
    })
}

// Полный прогон по всей вселенной тикеров
pub async fn simple_analysis(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let req = AnalysisRequest { tickers: None };
    market_analysis(State(state), Json(req)).await
}

// Создание маршрутов
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/status", get(get_status))
        .route("/analyze", get(simple_analysis))
        .route("/api/market-analysis", post(market_analysis))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
