use crate::{error::AppError, AppState};
use analytics::{
    AnomalyReport, BudgetExecution, BudgetOverview, ForecastPoint, HealthAssessment,
    MonthlyNetFlow, RatioSet,
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::NaiveDate;
use core_types::{
    BalanceSheetSnapshot, BudgetDefinition, IncomeStatementSnapshot, Transaction, TransactionType,
};
use serde::Deserialize;
use std::sync::Arc;

/// Extracted JSON body, or the rejection axum produced for it.
type Payload<T> = Result<Json<T>, JsonRejection>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementsRequest {
    pub balance_sheet: BalanceSheetSnapshot,
    pub income_statement: IncomeStatementSnapshot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetExecutionRequest {
    pub budget: BudgetDefinition,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverviewRequest {
    pub period: String,
    pub budgets: Vec<BudgetDefinition>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub history: Vec<MonthlyNetFlow>,
    pub horizon: i32,
}

/// With `asOf` set, only `type` transactions in the trailing window are assessed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomaliesRequest {
    pub transactions: Vec<Transaction>,
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionType>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// # POST /api/ratios
pub async fn calculate_ratios(
    State(state): State<Arc<AppState>>,
    payload: Payload<StatementsRequest>,
) -> Result<Json<RatioSet>, AppError> {
    let Json(request) = payload?;
    let ratios = state
        .engine
        .ratios(&request.balance_sheet, &request.income_statement)?;
    Ok(Json(ratios))
}

/// # POST /api/health-score
/// Ratios, the health score and the recommendations in a single response.
pub async fn assess_health(
    State(state): State<Arc<AppState>>,
    payload: Payload<StatementsRequest>,
) -> Result<Json<HealthAssessment>, AppError> {
    let Json(request) = payload?;
    let assessment = state
        .engine
        .assess_health(&request.balance_sheet, &request.income_statement)?;
    Ok(Json(assessment))
}

/// # POST /api/budgets/execution
pub async fn budget_execution(
    State(state): State<Arc<AppState>>,
    payload: Payload<BudgetExecutionRequest>,
) -> Result<Json<BudgetExecution>, AppError> {
    let Json(request) = payload?;
    let execution = state
        .engine
        .budget_execution(&request.budget, &request.transactions)?;
    Ok(Json(execution))
}

/// # POST /api/budgets/overview
pub async fn budget_overview(
    State(state): State<Arc<AppState>>,
    payload: Payload<BudgetOverviewRequest>,
) -> Result<Json<BudgetOverview>, AppError> {
    let Json(request) = payload?;
    let overview =
        state
            .engine
            .budget_overview(&request.period, &request.budgets, &request.transactions)?;
    Ok(Json(overview))
}

/// # POST /api/forecast
pub async fn forecast(
    State(state): State<Arc<AppState>>,
    payload: Payload<ForecastRequest>,
) -> Result<Json<Vec<ForecastPoint>>, AppError> {
    let Json(request) = payload?;
    let points = state.engine.forecast(&request.history, request.horizon)?;
    Ok(Json(points))
}

/// # POST /api/anomalies
pub async fn detect_anomalies(
    State(state): State<Arc<AppState>>,
    payload: Payload<AnomaliesRequest>,
) -> Result<Json<AnomalyReport>, AppError> {
    let Json(request) = payload?;
    let report = match request.as_of {
        Some(as_of) => state.engine.detect_recent_anomalies(
            &request.transactions,
            request.kind.unwrap_or(TransactionType::Expense),
            as_of,
        )?,
        None => state.engine.detect_anomalies(&request.transactions)?,
    };
    Ok(Json(report))
}
