//! Role-scoped payment history with an analytics rollup

use serde::Serialize;
use shared::models::{PaymentMethod, PaymentStatus};

use crate::auth::Actor;
use crate::db::{PaymentQuery, PaymentSummary, PaymentView, Store, StoreResult};

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistory {
    pub payments: Vec<PaymentView>,
    pub summary: PaymentSummary,
    pub pagination: Pagination,
}

/// Payments visible to `actor`, filtered, summarized and paged
pub async fn payment_history(
    store: &dyn Store,
    actor: &Actor,
    filter: HistoryFilter,
) -> StoreResult<PaymentHistory> {
    let query = PaymentQuery {
        scope: actor.history_scope(),
        search: filter
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        status: filter.status,
        method: filter.method,
        from: filter.from,
        to: filter.to,
    };
    let per_page = filter
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let page = filter.page.unwrap_or(1).max(1);
    let offset = i64::from(page - 1) * i64::from(per_page);

    let summary = store.summarize_payments(&query).await?;
    let total = summary.count;
    let total_pages = total.div_ceil(u64::from(per_page));
    let payments = if offset as u64 >= total {
        Vec::new()
    } else {
        store
            .query_payments(&query, i64::from(per_page), offset)
            .await?
    };

    Ok(PaymentHistory {
        payments,
        summary,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    })
}
