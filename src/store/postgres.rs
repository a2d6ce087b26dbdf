/// PostgreSQL 저장소
/// 입찰 트랜잭션은 계정 행과 아이템 행을 FOR UPDATE 로 잠근 단일 트랜잭션으로 처리한다.
// region:    --- Imports
use crate::auction::model::{Account, Bid, BidOutcome, Item, Purchase};
use crate::auction::rules::{self, BidDecision};
use crate::database::DatabaseManager;
use crate::error::AuctionError;
use crate::store::queries;
use crate::store::AuctionStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Postgres Store

pub struct PostgresStore {
    db: Arc<DatabaseManager>,
}

impl PostgresStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuctionStore for PostgresStore {
    async fn execute_bid(
        &self,
        item_id: Uuid,
        bidder: &str,
        amount: i64,
    ) -> Result<BidOutcome, AuctionError> {
        let bidder = bidder.to_string();
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    // 항상 계정 행, 아이템 행 순서로 잠근다. 잠금 순서가 고정되어
                    // 동시 입찰 간 교착이 생기지 않는다.
                    let account = sqlx::query_as::<_, Account>(queries::LOCK_ACCOUNT)
                        .bind(&bidder)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or(AuctionError::NotFound("User"))?;

                    let item = sqlx::query_as::<_, Item>(queries::LOCK_ITEM)
                        .bind(item_id)
                        .fetch_optional(&mut **tx)
                        .await?;

                    let decision = rules::evaluate_bid(&account, item.as_ref(), amount)?;
                    // evaluate_bid 통과가 아이템 존재를 보장한다
                    let item = item.ok_or(AuctionError::NotFound("Item"))?;
                    let now = Utc::now();

                    match decision {
                        BidDecision::Raise => {
                            sqlx::query(queries::APPLY_LAST_BID)
                                .bind(amount)
                                .bind(item_id)
                                .execute(&mut **tx)
                                .await?;
                            sqlx::query(queries::INSERT_BID)
                                .bind(item_id)
                                .bind(&bidder)
                                .bind(amount)
                                .bind(now)
                                .execute(&mut **tx)
                                .await?;
                            info!(
                                "{:<12} --> 입찰 반영: item={}, amount={}",
                                "PgStore", item_id, amount
                            );
                            Ok(BidOutcome::Placed {
                                item: item.summary(),
                                bid_amount: amount,
                            })
                        }
                        BidDecision::Purchase => {
                            sqlx::query(queries::APPLY_LAST_BID)
                                .bind(amount)
                                .bind(item_id)
                                .execute(&mut **tx)
                                .await?;
                            sqlx::query(queries::MARK_NOT_SELLABLE)
                                .bind(item_id)
                                .execute(&mut **tx)
                                .await?;
                            sqlx::query(queries::INSERT_BID)
                                .bind(item_id)
                                .bind(&bidder)
                                .bind(amount)
                                .bind(now)
                                .execute(&mut **tx)
                                .await?;
                            sqlx::query(queries::INSERT_PURCHASE)
                                .bind(item_id)
                                .bind(&bidder)
                                .bind(amount)
                                .bind(now)
                                .execute(&mut **tx)
                                .await?;
                            let debited = sqlx::query(queries::DEBIT_ACCOUNT)
                                .bind(amount)
                                .bind(&bidder)
                                .execute(&mut **tx)
                                .await?
                                .rows_affected();
                            if debited == 0 {
                                // 계정 행이 잠겨 있어 도달하지 않는 경로지만,
                                // 차감이 안 되면 트랜잭션 전체를 되돌린다
                                return Err(AuctionError::InsufficientFunds);
                            }
                            info!(
                                "{:<12} --> 낙찰 반영: item={}, buyer={}, price={}",
                                "PgStore", item_id, bidder, amount
                            );
                            Ok(BidOutcome::Purchased {
                                item: item.summary(),
                                buyer: bidder.clone(),
                                price: amount,
                            })
                        }
                    }
                })
            })
            .await
    }

    async fn insert_item(&self, item: Item) -> Result<Item, AuctionError> {
        sqlx::query(queries::INSERT_ITEM)
            .bind(item.id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(&item.photo_url)
            .bind(item.starting_price)
            .bind(item.purchase_price)
            .bind(item.last_bid)
            .bind(item.sellable)
            .bind(&item.seller)
            .bind(item.created_at)
            .execute(self.db.pool())
            .await?;
        Ok(item)
    }

    async fn item_by_id(&self, item_id: Uuid) -> Result<Item, AuctionError> {
        sqlx::query_as::<_, Item>(queries::GET_ITEM)
            .bind(item_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(AuctionError::NotFound("Item"))
    }

    async fn sellable_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Item>, u64), AuctionError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let total = sqlx::query_scalar::<_, i64>(queries::COUNT_SELLABLE)
                        .fetch_one(&mut **tx)
                        .await?;
                    let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);
                    let items = sqlx::query_as::<_, Item>(queries::SELLABLE_PAGE)
                        .bind(i64::from(per_page))
                        .bind(offset)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok((items, total as u64))
                })
            })
            .await
    }

    async fn bids_for_item(&self, item_id: Uuid) -> Result<Vec<Bid>, AuctionError> {
        Ok(sqlx::query_as::<_, Bid>(queries::GET_ITEM_BIDS)
            .bind(item_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn purchase_for_item(&self, item_id: Uuid) -> Result<Option<Purchase>, AuctionError> {
        Ok(sqlx::query_as::<_, Purchase>(queries::GET_PURCHASE_BY_ITEM)
            .bind(item_id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn delete_purchase(&self, purchase_id: i64) -> Result<(), AuctionError> {
        let deleted = sqlx::query(queries::DELETE_PURCHASE)
            .bind(purchase_id)
            .execute(self.db.pool())
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(AuctionError::NotFound("Purchase"));
        }
        Ok(())
    }

    async fn balance_of(&self, username: &str) -> Result<i64, AuctionError> {
        sqlx::query_scalar::<_, i64>(queries::GET_BALANCE)
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(AuctionError::NotFound("User"))
    }

    async fn set_balance(&self, username: &str, balance: i64) -> Result<(), AuctionError> {
        sqlx::query(queries::UPSERT_BALANCE)
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(balance)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

// endregion: --- Postgres Store
