use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// 상품 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub photo_url: String,
    pub starting_price: i64,
    pub purchase_price: i64,
    pub last_bid: i64,
    pub sellable: bool,
    pub seller: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// 상품 생성. 신규 상품은 항상 last_bid = 0, sellable = true 로 시작한다.
    pub fn new(draft: &ItemDraft, seller: &str) -> Self {
        Item {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            photo_url: draft.photo_url.clone(),
            starting_price: draft.starting_price,
            purchase_price: draft.purchase_price,
            last_bid: 0,
            sellable: true,
            seller: seller.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            photo_url: self.photo_url.clone(),
            seller: self.seller.clone(),
        }
    }
}

// 입찰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub item_id: Uuid,
    pub bidder: String,
    pub bid_amount: i64,
    pub bid_time: DateTime<Utc>,
}

// 구매 모델. 아이템당 최대 1건
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Purchase {
    pub id: i64,
    pub item_id: Uuid,
    pub buyer: String,
    pub purchase_amount: i64,
    pub purchased_at: DateTime<Utc>,
}

// 계정 모델. 잔액은 음수가 될 수 없다
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub balance: i64,
}

// region:    --- Item Draft

/// 상품 등록 요청 내용
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub photo_url: String,
    pub starting_price: i64,
    pub purchase_price: i64,
}

impl ItemDraft {
    /// 필드 검증. 위반한 (필드, 메시지) 목록을 돌려준다.
    pub fn validate(&self) -> Vec<(&'static str, &'static str)> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(("name", "Item name is empty or missing."));
        }
        if self.description.trim().is_empty() {
            errors.push(("description", "Item description is empty or missing."));
        }
        if self.photo_url.trim().is_empty() {
            errors.push(("photo_url", "URL is empty or missing."));
        } else if !valid_photo_path(&self.photo_url) {
            errors.push(("photo_url", "Invalid path"));
        }
        if self.starting_price < 1 {
            errors.push((
                "starting_price",
                "Starting price must be greater than or equal to 1",
            ));
        }
        if self.purchase_price < 1 {
            errors.push((
                "purchase_price",
                "Purchase price must be greater than or equal to 1",
            ));
        }
        errors
    }
}

/// 사진 경로 형식: /img/<이름>.jpg|gif|png
fn valid_photo_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix("/img/") else {
        return false;
    };
    let Some((stem, ext)) = rest.rsplit_once('.') else {
        return false;
    };
    if stem.is_empty() || !stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return false;
    }
    matches!(ext, "jpg" | "gif" | "png")
}

// endregion: --- Item Draft

// region:    --- Views

/// 입찰 응답에 실리는 상품 요약
#[derive(Debug, Clone, Serialize)]
pub struct ItemSummary {
    pub name: String,
    pub description: String,
    pub photo_url: String,
    pub seller: String,
}

/// 입찰 처리 결과
#[derive(Debug, Clone, Serialize)]
pub enum BidOutcome {
    /// 일반 입찰 성공. 잔액 변동 없음
    Placed { item: ItemSummary, bid_amount: i64 },
    /// 즉시 구매가 이상의 입찰로 낙찰. 잔액 차감 완료
    Purchased {
        item: ItemSummary,
        buyer: String,
        price: i64,
    },
}

/// 상품 상세 조회 결과
#[derive(Debug, Clone, Serialize)]
pub enum ItemDetail {
    /// 판매중: 입찰 이력 포함
    Sellable { item: Item, bids: Vec<Bid> },
    /// 판매 완료: 구매자와 낙찰가 포함
    Sold {
        item: Item,
        buyer: String,
        price: i64,
    },
}

/// 판매중 상품 페이지
#[derive(Debug, Clone, Serialize)]
pub struct ItemPage {
    pub page: u32,
    pub total_pages: u32,
    pub items: Vec<Item>,
}

// endregion: --- Views
