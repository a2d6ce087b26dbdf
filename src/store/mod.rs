/// 저장소 추상화
/// 엔진은 구체 백엔드 대신 이 트레이트에 의존한다.
/// 운영은 PostgresStore, 개발과 테스트는 MemoryStore 를 사용한다.
// region:    --- Imports
use crate::auction::model::{Bid, BidOutcome, Item, Purchase};
use crate::error::AuctionError;
use async_trait::async_trait;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Modules
pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
// endregion: --- Modules

// region:    --- Auction Store Trait

#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// 입찰 트랜잭션 실행
    /// 같은 아이템에 대한 다른 입찰과 상호 배제된 임계 구역 안에서
    /// 검증(rules::evaluate_bid)과 쓰기 전체를 한 단위로 수행한다.
    /// 실패 시 어떤 쓰기도 남지 않는다.
    async fn execute_bid(
        &self,
        item_id: Uuid,
        bidder: &str,
        amount: i64,
    ) -> Result<BidOutcome, AuctionError>;

    /// 상품 저장
    async fn insert_item(&self, item: Item) -> Result<Item, AuctionError>;

    /// 상품 조회
    async fn item_by_id(&self, item_id: Uuid) -> Result<Item, AuctionError>;

    /// 판매중 상품 페이지 조회(등록 순). 해당 페이지 상품 목록과 판매중 전체 건수를 돌려준다.
    async fn sellable_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Item>, u64), AuctionError>;

    /// 아이템의 입찰 이력(생성 순)
    async fn bids_for_item(&self, item_id: Uuid) -> Result<Vec<Bid>, AuctionError>;

    /// 아이템의 구매 기록(0건 또는 1건)
    async fn purchase_for_item(&self, item_id: Uuid) -> Result<Option<Purchase>, AuctionError>;

    /// 구매 기록 삭제(관리용 보상 조치). 아이템은 판매 완료 상태로 남는다.
    async fn delete_purchase(&self, purchase_id: i64) -> Result<(), AuctionError>;

    /// 잔액 조회
    async fn balance_of(&self, username: &str) -> Result<i64, AuctionError>;

    /// 잔액 설정(관리용). 계정이 없으면 생성한다.
    async fn set_balance(&self, username: &str, balance: i64) -> Result<(), AuctionError>;
}

// endregion: --- Auction Store Trait
