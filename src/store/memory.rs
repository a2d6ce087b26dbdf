/// 인메모리 저장소
/// 개발 모드와 테스트에서 사용한다. 외부 의존 없이 전체 경매 흐름을 지원한다.
// region:    --- Imports
use crate::auction::model::{Account, Bid, BidOutcome, Item, Purchase};
use crate::auction::rules::{self, BidDecision};
use crate::error::AuctionError;
use crate::store::AuctionStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Memory State

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    items: HashMap<Uuid, Item>,
    /// 상품 등록 순서. 판매중 목록 페이징의 정렬 기준
    item_seq: Vec<Uuid>,
    bids: Vec<Bid>,
    purchases: Vec<Purchase>,
    next_bid_id: i64,
    next_purchase_id: i64,
}

// endregion: --- Memory State

// region:    --- Memory Store

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    /// 아이템 단위 잠금. 같은 아이템의 입찰 트랜잭션을 직렬화한다.
    item_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 아이템 잠금 확보. 처음 보는 아이템이면 새로 만든다.
    async fn item_lock(&self, item_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.item_locks.lock().await;
        Arc::clone(locks.entry(item_id).or_default())
    }
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn execute_bid(
        &self,
        item_id: Uuid,
        bidder: &str,
        amount: i64,
    ) -> Result<BidOutcome, AuctionError> {
        // 같은 아이템의 입찰은 검증부터 반영까지 이 잠금 아래에서 직렬화된다.
        let lock = self.item_lock(item_id).await;
        let _guard = lock.lock().await;

        let decision = {
            let state = self.state.read().await;
            let account = state
                .accounts
                .get(bidder)
                .cloned()
                .ok_or(AuctionError::NotFound("User"))?;
            rules::evaluate_bid(&account, state.items.get(&item_id), amount)?
        };

        let mut state = self.state.write().await;
        let now = Utc::now();
        match decision {
            BidDecision::Raise => {
                let summary = {
                    let item = state
                        .items
                        .get_mut(&item_id)
                        .ok_or(AuctionError::NotFound("Item"))?;
                    item.last_bid = amount;
                    item.summary()
                };
                state.next_bid_id += 1;
                let bid_id = state.next_bid_id;
                state.bids.push(Bid {
                    id: bid_id,
                    item_id,
                    bidder: bidder.to_string(),
                    bid_amount: amount,
                    bid_time: now,
                });
                info!(
                    "{:<12} --> 입찰 반영: item={}, amount={}",
                    "MemoryStore", item_id, amount
                );
                Ok(BidOutcome::Placed {
                    item: summary,
                    bid_amount: amount,
                })
            }
            BidDecision::Purchase => {
                // 실패할 수 있는 확인을 모두 마친 뒤에야 쓰기를 시작한다.
                // 다른 아이템의 낙찰이 먼저 잔액을 줄였을 수 있으므로 같은 쓰기 잠금
                // 아래에서 잔액을 다시 확인한다.
                let summary = state
                    .items
                    .get(&item_id)
                    .map(Item::summary)
                    .ok_or(AuctionError::NotFound("Item"))?;
                {
                    let account = state
                        .accounts
                        .get_mut(bidder)
                        .ok_or(AuctionError::NotFound("User"))?;
                    if account.balance < amount {
                        return Err(AuctionError::InsufficientFunds);
                    }
                    account.balance -= amount;
                }
                if let Some(item) = state.items.get_mut(&item_id) {
                    item.last_bid = amount;
                    item.sellable = false;
                }
                state.next_bid_id += 1;
                let bid_id = state.next_bid_id;
                state.bids.push(Bid {
                    id: bid_id,
                    item_id,
                    bidder: bidder.to_string(),
                    bid_amount: amount,
                    bid_time: now,
                });
                state.next_purchase_id += 1;
                let purchase_id = state.next_purchase_id;
                state.purchases.push(Purchase {
                    id: purchase_id,
                    item_id,
                    buyer: bidder.to_string(),
                    purchase_amount: amount,
                    purchased_at: now,
                });
                info!(
                    "{:<12} --> 낙찰 반영: item={}, buyer={}, price={}",
                    "MemoryStore", item_id, bidder, amount
                );
                Ok(BidOutcome::Purchased {
                    item: summary,
                    buyer: bidder.to_string(),
                    price: amount,
                })
            }
        }
    }

    async fn insert_item(&self, item: Item) -> Result<Item, AuctionError> {
        let mut state = self.state.write().await;
        state.item_seq.push(item.id);
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn item_by_id(&self, item_id: Uuid) -> Result<Item, AuctionError> {
        let state = self.state.read().await;
        state
            .items
            .get(&item_id)
            .cloned()
            .ok_or(AuctionError::NotFound("Item"))
    }

    async fn sellable_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Item>, u64), AuctionError> {
        let state = self.state.read().await;
        let sellable: Vec<Item> = state
            .item_seq
            .iter()
            .filter_map(|id| state.items.get(id))
            .filter(|item| item.sellable)
            .cloned()
            .collect();
        let total = sellable.len() as u64;
        let offset = page.saturating_sub(1) as usize * per_page as usize;
        let items = sellable
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect();
        Ok((items, total))
    }

    async fn bids_for_item(&self, item_id: Uuid) -> Result<Vec<Bid>, AuctionError> {
        let state = self.state.read().await;
        Ok(state
            .bids
            .iter()
            .filter(|bid| bid.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn purchase_for_item(&self, item_id: Uuid) -> Result<Option<Purchase>, AuctionError> {
        let state = self.state.read().await;
        Ok(state
            .purchases
            .iter()
            .find(|purchase| purchase.item_id == item_id)
            .cloned())
    }

    async fn delete_purchase(&self, purchase_id: i64) -> Result<(), AuctionError> {
        let mut state = self.state.write().await;
        let index = state
            .purchases
            .iter()
            .position(|purchase| purchase.id == purchase_id)
            .ok_or(AuctionError::NotFound("Purchase"))?;
        state.purchases.remove(index);
        Ok(())
    }

    async fn balance_of(&self, username: &str) -> Result<i64, AuctionError> {
        let state = self.state.read().await;
        state
            .accounts
            .get(username)
            .map(|account| account.balance)
            .ok_or(AuctionError::NotFound("User"))
    }

    async fn set_balance(&self, username: &str, balance: i64) -> Result<(), AuctionError> {
        let mut state = self.state.write().await;
        state
            .accounts
            .entry(username.to_string())
            .and_modify(|account| account.balance = balance)
            .or_insert_with(|| Account {
                id: Uuid::new_v4(),
                username: username.to_string(),
                balance,
            });
        Ok(())
    }
}

// endregion: --- Memory Store
