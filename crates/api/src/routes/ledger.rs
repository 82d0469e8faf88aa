//! Student fee ledger endpoints.
//!
//! Write endpoints build a draft through [`EntryFactory`], append it through
//! the store, and return the sealed entry with any non-fatal warnings. Read
//! endpoints go through [`LedgerService`], so a broken hash chain blocks
//! every derived result with a 409.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use tally_core::ledger::balance::balance_from_entries;
use tally_core::ledger::validation::{validate_entry, ValidationWarning};
use tally_core::ledger::{
    EntryDirection, EntryFactory, EntryMeta, EntryType, LedgerError, LedgerService,
    NewLedgerEntry, Term,
};
use tally_shared::types::{
    FeeCategoryId, FeeStructureId, LedgerEntryId, PaymentId, SchoolId, StudentId, UserId,
};
use tally_store::EntryFilter;

use crate::AppState;

/// Builds the ledger router.
pub fn router() -> Router<AppState> {
    let base = "/schools/{school_id}/students/{student_id}/ledger";
    Router::new()
        .route(&format!("{base}/charges"), post(record_charge))
        .route(&format!("{base}/payments"), post(record_payment))
        .route(&format!("{base}/credits"), post(record_credit))
        .route(&format!("{base}/adjustments"), post(record_adjustment))
        .route(&format!("{base}/waivers"), post(record_waiver))
        .route(&format!("{base}/reversals"), post(record_reversal))
        .route(&format!("{base}/transfers"), post(record_transfer))
        .route(&format!("{base}/entries"), get(list_entries))
        .route(&format!("{base}/balance"), get(get_balance))
        .route(&format!("{base}/categories"), get(get_category_balances))
        .route(&format!("{base}/aging"), get(get_aging))
        .route(&format!("{base}/summary"), get(get_summary))
        .route(&format!("{base}/verify"), post(verify_ledger))
}

/// Common audit and period fields carried by every write request.
#[derive(Debug, Deserialize)]
struct EntryMetaBody {
    entry_date: NaiveDate,
    /// Defaults to `entry_date` when omitted.
    effective_date: Option<NaiveDate>,
    academic_year: String,
    term: Option<Term>,
    recorded_by: UserId,
    recorded_by_role: String,
}

impl EntryMetaBody {
    fn into_meta(self, school_id: SchoolId, student_id: StudentId) -> EntryMeta {
        EntryMeta {
            school_id,
            student_id,
            entry_date: self.entry_date,
            effective_date: self.effective_date.unwrap_or(self.entry_date),
            academic_year: self.academic_year,
            term: self.term,
            recorded_by: self.recorded_by,
            recorded_by_role: self.recorded_by_role,
        }
    }
}

fn term_requires_year() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "VALIDATION_ERROR",
            "message": "term requires academic_year",
            "retryable": false,
        })),
    )
        .into_response()
}

fn error_response(err: &LedgerError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, "Ledger operation failed");
    }
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string(),
            "retryable": err.is_retryable(),
        })),
    )
        .into_response()
}

/// Appends a draft, returning 201 with the sealed entry and any warnings
/// collected against the pre-append balance.
fn append_draft(
    state: &AppState,
    draft: NewLedgerEntry,
    expected_previous_hash: Option<String>,
) -> Response {
    let snapshot = state.store.entries(draft.school_id, draft.student_id);
    let current_balance = balance_from_entries(&snapshot).current_balance;
    let warnings: Vec<ValidationWarning> = validate_entry(&draft, current_balance)
        .map(|report| report.warnings)
        .unwrap_or_default();

    match state.store.append(draft, expected_previous_hash) {
        Ok(entry) => (
            StatusCode::CREATED,
            Json(json!({ "entry": entry, "warnings": warnings })),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

#[derive(Debug, Deserialize)]
struct ChargeRequest {
    amount: Decimal,
    fee_category_id: FeeCategoryId,
    fee_structure_id: FeeStructureId,
    description: String,
    #[serde(flatten)]
    meta: EntryMetaBody,
    expected_previous_hash: Option<String>,
}

async fn record_charge(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Json(req): Json<ChargeRequest>,
) -> Response {
    let draft = EntryFactory::charge(
        req.meta.into_meta(school_id, student_id),
        req.amount,
        req.fee_category_id,
        req.fee_structure_id,
        req.description,
    );
    append_draft(&state, draft, req.expected_previous_hash)
}

#[derive(Debug, Deserialize)]
struct PaymentRequest {
    amount: Decimal,
    description: String,
    payment_id: Option<PaymentId>,
    reference_number: Option<String>,
    /// Attributes the payment to a fee category for the per-category
    /// breakdown.
    fee_category_id: Option<FeeCategoryId>,
    #[serde(flatten)]
    meta: EntryMetaBody,
    expected_previous_hash: Option<String>,
}

async fn record_payment(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Json(req): Json<PaymentRequest>,
) -> Response {
    let mut draft = EntryFactory::payment(
        req.meta.into_meta(school_id, student_id),
        req.amount,
        req.description,
        req.payment_id,
        req.reference_number,
    );
    draft.fee_category_id = req.fee_category_id;
    append_draft(&state, draft, req.expected_previous_hash)
}

#[derive(Debug, Deserialize)]
struct CreditRequest {
    amount: Decimal,
    description: String,
    fee_category_id: Option<FeeCategoryId>,
    #[serde(flatten)]
    meta: EntryMetaBody,
    expected_previous_hash: Option<String>,
}

async fn record_credit(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Json(req): Json<CreditRequest>,
) -> Response {
    let mut draft = EntryFactory::credit(
        req.meta.into_meta(school_id, student_id),
        req.amount,
        req.description,
    );
    draft.fee_category_id = req.fee_category_id;
    append_draft(&state, draft, req.expected_previous_hash)
}

#[derive(Debug, Deserialize)]
struct AdjustmentRequest {
    direction: EntryDirection,
    amount: Decimal,
    description: String,
    related_entry_id: Option<LedgerEntryId>,
    #[serde(flatten)]
    meta: EntryMetaBody,
    expected_previous_hash: Option<String>,
}

async fn record_adjustment(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Json(req): Json<AdjustmentRequest>,
) -> Response {
    let draft = EntryFactory::adjustment(
        req.meta.into_meta(school_id, student_id),
        req.direction,
        req.amount,
        req.description,
        req.related_entry_id,
    );
    append_draft(&state, draft, req.expected_previous_hash)
}

#[derive(Debug, Deserialize)]
struct WaiverRequest {
    related_entry_id: LedgerEntryId,
    amount: Decimal,
    approved_by: String,
    reason: String,
    #[serde(flatten)]
    meta: EntryMetaBody,
    expected_previous_hash: Option<String>,
}

async fn record_waiver(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Json(req): Json<WaiverRequest>,
) -> Response {
    let snapshot = state.store.entries(school_id, student_id);
    let charge = match LedgerService::find_entry(&snapshot, req.related_entry_id) {
        Ok(entry) => entry.clone(),
        Err(err) => return error_response(&err),
    };
    let outstanding = LedgerService::outstanding_amount(&snapshot, &charge);

    let draft = match EntryFactory::waiver(
        req.meta.into_meta(school_id, student_id),
        &charge,
        outstanding,
        req.amount,
        &req.approved_by,
        &req.reason,
    ) {
        Ok(draft) => draft,
        Err(err) => return error_response(&err),
    };
    append_draft(&state, draft, req.expected_previous_hash)
}

#[derive(Debug, Deserialize)]
struct ReversalRequest {
    related_entry_id: LedgerEntryId,
    #[serde(flatten)]
    meta: EntryMetaBody,
    expected_previous_hash: Option<String>,
}

async fn record_reversal(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Json(req): Json<ReversalRequest>,
) -> Response {
    let snapshot = state.store.entries(school_id, student_id);
    let original = match LedgerService::find_entry(&snapshot, req.related_entry_id) {
        Ok(entry) => entry.clone(),
        Err(err) => return error_response(&err),
    };

    let draft = match EntryFactory::reversal(req.meta.into_meta(school_id, student_id), &original)
    {
        Ok(draft) => draft,
        Err(err) => return error_response(&err),
    };
    append_draft(&state, draft, req.expected_previous_hash)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TransferDirection {
    In,
    Out,
}

#[derive(Debug, Deserialize)]
struct TransferRequest {
    direction: TransferDirection,
    amount: Decimal,
    description: String,
    reference_number: Option<String>,
    #[serde(flatten)]
    meta: EntryMetaBody,
    expected_previous_hash: Option<String>,
}

async fn record_transfer(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Json(req): Json<TransferRequest>,
) -> Response {
    let meta = req.meta.into_meta(school_id, student_id);
    let draft = match req.direction {
        TransferDirection::In => {
            EntryFactory::transfer_in(meta, req.amount, req.description, req.reference_number)
        }
        TransferDirection::Out => {
            EntryFactory::transfer_out(meta, req.amount, req.description, req.reference_number)
        }
    };
    append_draft(&state, draft, req.expected_previous_hash)
}

#[derive(Debug, Deserialize, Default)]
struct EntryQuery {
    academic_year: Option<String>,
    term: Option<Term>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    entry_type: Option<EntryType>,
}

async fn list_entries(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Query(query): Query<EntryQuery>,
) -> Response {
    if query.term.is_some() && query.academic_year.is_none() {
        return term_requires_year();
    }
    let filter = EntryFilter {
        academic_year: query.academic_year,
        term: query.term,
        from: query.from,
        to: query.to,
        entry_type: query.entry_type,
    };
    let entries = state.store.query(school_id, student_id, &filter);
    Json(json!({ "count": entries.len(), "entries": entries })).into_response()
}

#[derive(Debug, Deserialize, Default)]
struct BalanceQuery {
    as_of: Option<NaiveDate>,
    academic_year: Option<String>,
    term: Option<Term>,
}

async fn get_balance(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Query(query): Query<BalanceQuery>,
) -> Response {
    let snapshot = state.store.entries(school_id, student_id);

    let result = match (query.academic_year, query.term, query.as_of) {
        (Some(year), Some(term), _) => {
            LedgerService::trusted_balance_for_term(&snapshot, &year, term)
        }
        (None, Some(_), _) => return term_requires_year(),
        (_, None, Some(as_of)) => LedgerService::trusted_balance_at(&snapshot, as_of),
        _ => LedgerService::trusted_balance(&snapshot),
    };

    match result {
        Ok(balance) => Json(balance).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn get_category_balances(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
) -> Response {
    let snapshot = state.store.entries(school_id, student_id);
    match LedgerService::trusted_category_balances(&snapshot) {
        Ok(categories) => Json(json!({ "categories": categories })).into_response(),
        Err(err) => error_response(&err),
    }
}

#[derive(Debug, Deserialize, Default)]
struct AgingQuery {
    as_of: Option<NaiveDate>,
}

async fn get_aging(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Query(query): Query<AgingQuery>,
) -> Response {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let snapshot = state.store.entries(school_id, student_id);
    match LedgerService::trusted_aging(&snapshot, as_of) {
        Ok(buckets) => Json(json!({ "as_of": as_of, "buckets": buckets })).into_response(),
        Err(err) => error_response(&err),
    }
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    academic_year: String,
    term: Option<Term>,
}

async fn get_summary(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
    Query(query): Query<SummaryQuery>,
) -> Response {
    let snapshot = state.store.entries(school_id, student_id);
    match LedgerService::trusted_summary(&snapshot, &query.academic_year, query.term) {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn verify_ledger(
    State(state): State<AppState>,
    Path((school_id, student_id)): Path<(SchoolId, StudentId)>,
) -> Response {
    let snapshot = state.store.entries(school_id, student_id);
    let verification = LedgerService::verify(&snapshot);
    Json(verification).into_response()
}
