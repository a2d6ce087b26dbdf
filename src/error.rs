/// 경매 도메인 오류 타입
/// 검증 실패(입찰 거절 사유)와 저장소 오류를 구분한다.
// region:    --- Imports
use thiserror::Error;

// endregion: --- Imports

// region:    --- AuctionError

#[derive(Debug, Error)]
pub enum AuctionError {
    /// 아이템, 사용자, 구매 기록 등이 존재하지 않음
    #[error("{0} not found.")]
    NotFound(&'static str),

    /// 잔액이 0 이하인 사용자의 입찰
    #[error("You have no credits, you can't bid.")]
    NoFunds,

    /// 입찰 금액이 잔액을 초과
    #[error("You have not enough credits on your account.")]
    InsufficientFunds,

    /// 판매자 본인의 아이템에 대한 입찰
    #[error("You cannot bid on your own item.")]
    SelfBid,

    /// 이미 판매 완료된 아이템
    #[error("Item is not sellable.")]
    NotSellable,

    /// 시작가 미만 또는 현재 최고 입찰가 이하의 입찰
    #[error("Your bid is too low.")]
    BidTooLow,

    /// 판매중 목록에 존재하지 않는 페이지
    #[error("There is no page: {0}")]
    NoSuchPage(u32),

    /// 저장소 오류. 검증 실패와 달리 호출자가 재시도할 수 있다.
    #[error("Database error occurred. The operation has failed.")]
    Storage(#[from] sqlx::Error),
}

impl AuctionError {
    /// 응답 본문에 내려가는 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::NotFound(_) => "NOT_FOUND",
            AuctionError::NoFunds => "NO_FUNDS",
            AuctionError::InsufficientFunds => "NOT_ENOUGH_FUNDS",
            AuctionError::SelfBid => "OWN_ITEM",
            AuctionError::NotSellable => "NOT_SELLABLE",
            AuctionError::BidTooLow => "LOW_BID",
            AuctionError::NoSuchPage(_) => "NO_PAGE",
            AuctionError::Storage(_) => "STORAGE",
        }
    }

    /// 저장소 오류 여부(서버 오류로 분류)
    pub fn is_storage(&self) -> bool {
        matches!(self, AuctionError::Storage(_))
    }
}

// endregion: --- AuctionError
