/// 경매 트랜잭션 엔진
/// 1. 입찰(일반 입찰 / 즉시 구매 분류)
/// 2. 상품 등록, 상세 조회, 판매중 목록 페이징
/// 3. 구매 기록 삭제(관리용), 잔액 조회/설정
// region:    --- Imports
use crate::auction::model::{BidOutcome, Item, ItemDetail, ItemDraft, ItemPage};
use crate::error::AuctionError;
use crate::store::AuctionStore;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Auction Engine

/// 판매중 목록 페이지 크기
pub const PAGE_SIZE: u32 = 3;

pub struct AuctionEngine {
    store: Arc<dyn AuctionStore>,
}

impl AuctionEngine {
    pub fn new(store: Arc<dyn AuctionStore>) -> Self {
        Self { store }
    }

    /// 입찰 처리. 검증과 반영은 저장소의 아이템 단위 임계 구역에서
    /// 한 단위로 실행되고, 결과만 여기서 분류해 기록한다.
    pub async fn place_bid(
        &self,
        item_id: Uuid,
        bidder: &str,
        amount: i64,
    ) -> Result<BidOutcome, AuctionError> {
        info!(
            "{:<12} --> 입찰 요청 처리 시작: item={}, bidder={}, amount={}",
            "Engine", item_id, bidder, amount
        );
        let outcome = self.store.execute_bid(item_id, bidder, amount).await;
        match &outcome {
            Ok(BidOutcome::Placed { bid_amount, .. }) => {
                info!(
                    "{:<12} --> 입찰 성공: item={}, amount={}",
                    "Engine", item_id, bid_amount
                );
            }
            Ok(BidOutcome::Purchased { price, .. }) => {
                info!(
                    "{:<12} --> 낙찰: item={}, buyer={}, price={}",
                    "Engine", item_id, bidder, price
                );
            }
            Err(e) if e.is_storage() => {
                error!("{:<12} --> 입찰 저장소 오류: {:?}", "Engine", e);
            }
            Err(e) => {
                warn!("{:<12} --> 입찰 거절: item={}, 사유: {}", "Engine", item_id, e);
            }
        }
        outcome
    }

    /// 상품 등록. 신규 상품은 last_bid = 0, sellable = true 로 생성된다.
    pub async fn create_item(&self, draft: &ItemDraft, seller: &str) -> Result<Item, AuctionError> {
        info!(
            "{:<12} --> 상품 등록: name={}, seller={}",
            "Engine", draft.name, seller
        );
        // 판매자 계정 확인
        self.store.balance_of(seller).await?;
        self.store.insert_item(Item::new(draft, seller)).await
    }

    /// 상품 상세 조회. 판매중이면 입찰 이력, 판매 완료면 구매자와 낙찰가를 돌려준다.
    pub async fn item_details(&self, item_id: Uuid) -> Result<ItemDetail, AuctionError> {
        info!("{:<12} --> 상품 상세 조회 id: {}", "Engine", item_id);
        let item = self.store.item_by_id(item_id).await?;
        if !item.sellable {
            // 관리자가 구매 기록을 지운 아이템은 기록 없음으로 조회된다
            let purchase = self
                .store
                .purchase_for_item(item_id)
                .await?
                .ok_or(AuctionError::NotFound("Purchase record"))?;
            return Ok(ItemDetail::Sold {
                item,
                buyer: purchase.buyer,
                price: purchase.purchase_amount,
            });
        }
        let bids = self.store.bids_for_item(item_id).await?;
        Ok(ItemDetail::Sellable { item, bids })
    }

    /// 판매중 상품 페이지 조회. 1부터 시작하며 범위를 벗어나면 NoSuchPage
    pub async fn sellable_page(&self, page: u32) -> Result<ItemPage, AuctionError> {
        info!("{:<12} --> 판매중 목록 조회 page: {}", "Engine", page);
        let (items, total) = self.store.sellable_page(page, PAGE_SIZE).await?;
        let total_pages = total.div_ceil(u64::from(PAGE_SIZE)) as u32;
        if items.is_empty() || page > total_pages {
            return Err(AuctionError::NoSuchPage(page));
        }
        Ok(ItemPage {
            page,
            total_pages,
            items,
        })
    }

    /// 구매 기록 삭제(관리용 보상 조치). 아이템은 판매 완료 상태로 남는다.
    pub async fn delete_purchase(&self, purchase_id: i64) -> Result<(), AuctionError> {
        info!("{:<12} --> 구매 기록 삭제 id: {}", "Engine", purchase_id);
        self.store.delete_purchase(purchase_id).await
    }

    /// 잔액 조회
    pub async fn balance_of(&self, username: &str) -> Result<i64, AuctionError> {
        self.store.balance_of(username).await
    }

    /// 잔액 설정(관리용). 계정이 없으면 생성한다.
    pub async fn set_balance(&self, username: &str, balance: i64) -> Result<(), AuctionError> {
        info!(
            "{:<12} --> 잔액 설정: username={}, balance={}",
            "Engine", username, balance
        );
        self.store.set_balance(username, balance).await
    }
}

// endregion: --- Auction Engine
