// region:    --- Imports
use crate::auction::engine::AuctionEngine;
use crate::auction::model::{BidOutcome, ItemDetail, ItemDraft};
use crate::error::AuctionError;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Router

/// 라우터 구성. 레이어(cors 등)는 main 에서 올린다.
pub fn routes(engine: Arc<AuctionEngine>) -> Router {
    Router::new()
        .route("/api/item", post(handle_create_item).get(handle_list_items))
        .route("/api/item/:id", get(handle_item_details))
        .route("/api/bid/:item_id", post(handle_place_bid))
        .route("/api/purchase/:id", delete(handle_delete_purchase))
        .route("/api/balance/:username", get(handle_get_balance))
        .route("/api/balance", patch(handle_set_balance))
        .with_state(engine)
}

// endregion: --- Router

// region:    --- Request Models

/// 입찰 요청
#[derive(Debug, Deserialize)]
pub struct PlaceBidRequest {
    pub bidder: String,
    pub bid_amount: i64,
}

/// 상품 등록 요청. seller 는 인증 계층이 넘겨준 사용자명
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub seller: String,
    #[serde(flatten)]
    pub item: ItemDraft,
}

/// 판매중 목록 페이지 파라미터
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// 잔액 설정 요청(관리용)
#[derive(Debug, Deserialize)]
pub struct SetBalanceRequest {
    pub username: String,
    pub balance: i64,
}

// endregion: --- Request Models

// region:    --- Error Mapping

/// 오류 -> 응답 변환. 검증 실패는 400, 미존재는 404, 저장소 오류는 500
fn error_response(e: AuctionError) -> Response {
    let status = match &e {
        AuctionError::NotFound(_) => StatusCode::NOT_FOUND,
        AuctionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(json!({ "error": e.to_string(), "code": e.code() })),
    )
        .into_response()
}

/// 필드 검증 실패 -> 필드별 메시지 맵
fn field_errors(errors: Vec<(&'static str, &'static str)>) -> Response {
    let mut map = serde_json::Map::new();
    for (field, message) in errors {
        map.insert(field.to_string(), json!(message));
    }
    (StatusCode::BAD_REQUEST, Json(Value::Object(map))).into_response()
}

// endregion: --- Error Mapping

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_place_bid(
    State(engine): State<Arc<AuctionEngine>>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<PlaceBidRequest>,
) -> Response {
    info!("{:<12} --> 입찰 요청: item={}, req={:?}", "Handler", item_id, req);

    let mut errors = Vec::new();
    if req.bidder.trim().is_empty() {
        errors.push(("bidder", "Bidder is empty or missing."));
    }
    if req.bid_amount < 1 {
        errors.push(("bid_amount", "Bid amount must be greater than or equal to 1"));
    }
    if !errors.is_empty() {
        return field_errors(errors);
    }

    match engine.place_bid(item_id, &req.bidder, req.bid_amount).await {
        Ok(BidOutcome::Placed { item, bid_amount }) => (
            StatusCode::OK,
            Json(json!({
                "name": item.name,
                "description": item.description,
                "photo_url": item.photo_url,
                "seller": item.seller,
                "bid_amount": bid_amount,
            })),
        )
            .into_response(),
        Ok(BidOutcome::Purchased { item, buyer, price }) => (
            StatusCode::OK,
            Json(json!({
                "name": item.name,
                "description": item.description,
                "photo_url": item.photo_url,
                "seller": item.seller,
                "buyer": buyer,
                "buying_price": price,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// 상품 등록 요청 처리
pub async fn handle_create_item(
    State(engine): State<Arc<AuctionEngine>>,
    Json(req): Json<CreateItemRequest>,
) -> Response {
    info!("{:<12} --> 상품 등록 요청: {:?}", "Handler", req);

    let mut errors = req.item.validate();
    if req.seller.trim().is_empty() {
        errors.push(("seller", "Seller is empty or missing."));
    }
    if !errors.is_empty() {
        return field_errors(errors);
    }

    match engine.create_item(&req.item, &req.seller).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 구매 기록 삭제 요청 처리(관리용)
pub async fn handle_delete_purchase(
    State(engine): State<Arc<AuctionEngine>>,
    Path(purchase_id): Path<i64>,
) -> Response {
    info!("{:<12} --> 구매 기록 삭제 요청 id: {}", "Handler", purchase_id);
    match engine.delete_purchase(purchase_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// 잔액 설정 요청 처리(관리용)
pub async fn handle_set_balance(
    State(engine): State<Arc<AuctionEngine>>,
    Json(req): Json<SetBalanceRequest>,
) -> Response {
    info!("{:<12} --> 잔액 설정 요청: {:?}", "Handler", req);

    let mut errors = Vec::new();
    if req.username.trim().is_empty() {
        errors.push(("username", "Username is empty or missing."));
    }
    if req.balance < 0 {
        errors.push(("balance", "Balance must be greater than or equal to 0"));
    }
    if !errors.is_empty() {
        return field_errors(errors);
    }

    match engine.set_balance(&req.username, req.balance).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("Balance successfully updated to {}", req.balance)
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 상품 상세 조회
pub async fn handle_item_details(
    State(engine): State<Arc<AuctionEngine>>,
    Path(item_id): Path<Uuid>,
) -> Response {
    info!("{:<12} --> 상품 상세 조회 id: {}", "Handler", item_id);
    match engine.item_details(item_id).await {
        Ok(ItemDetail::Sellable { item, bids }) => (
            StatusCode::OK,
            Json(json!({
                "name": item.name,
                "description": item.description,
                "photo_url": item.photo_url,
                "seller": item.seller,
                "bids": bids
                    .iter()
                    .map(|bid| {
                        json!({
                            "id": bid.id,
                            "bidder": bid.bidder,
                            "bid_amount": bid.bid_amount,
                        })
                    })
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Ok(ItemDetail::Sold { item, buyer, price }) => (
            StatusCode::OK,
            Json(json!({
                "name": item.name,
                "description": item.description,
                "photo_url": item.photo_url,
                "seller": item.seller,
                "buyer": buyer,
                "buying_price": price,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// 판매중 상품 목록 조회(페이지당 3개)
pub async fn handle_list_items(
    State(engine): State<Arc<AuctionEngine>>,
    Query(params): Query<PageParams>,
) -> Response {
    info!("{:<12} --> 판매중 목록 요청 page: {}", "Handler", params.page);
    if params.page < 1 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid parameters" })),
        )
            .into_response();
    }

    match engine.sellable_page(params.page).await {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({
                "page": page.page,
                "total_pages": page.total_pages,
                "items": page
                    .items
                    .iter()
                    .map(|item| {
                        json!({
                            "id": item.id,
                            "name": item.name,
                            "photo_url": item.photo_url,
                            "last_bid": item.last_bid,
                            "seller": item.seller,
                        })
                    })
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// 잔액 조회
pub async fn handle_get_balance(
    State(engine): State<Arc<AuctionEngine>>,
    Path(username): Path<String>,
) -> Response {
    info!("{:<12} --> 잔액 조회 username: {}", "Handler", username);
    match engine.balance_of(&username).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({ "username": username, "balance": balance })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// endregion: --- Query Handlers
