/// 계정 행 잠금 조회. 입찰 트랜잭션의 첫 잠금
pub const LOCK_ACCOUNT: &str =
    "SELECT id, username, balance FROM accounts WHERE username = $1 FOR UPDATE";

/// 아이템 행 잠금 조회. 같은 아이템의 입찰 트랜잭션을 직렬화한다
pub const LOCK_ITEM: &str = r#"
    SELECT id, name, description, photo_url, starting_price, purchase_price, last_bid, sellable, seller, created_at
    FROM items
    WHERE id = $1
    FOR UPDATE
"#;

/// 최고 입찰가 반영
pub const APPLY_LAST_BID: &str = "UPDATE items SET last_bid = $1 WHERE id = $2";

/// 판매 완료 처리(단방향)
pub const MARK_NOT_SELLABLE: &str = "UPDATE items SET sellable = FALSE WHERE id = $1";

/// 입찰 기록 추가
pub const INSERT_BID: &str =
    "INSERT INTO bids (item_id, bidder, bid_amount, bid_time) VALUES ($1, $2, $3, $4)";

/// 구매 기록 추가
pub const INSERT_PURCHASE: &str =
    "INSERT INTO purchases (item_id, buyer, purchase_amount, purchased_at) VALUES ($1, $2, $3, $4)";

/// 잔액 차감. 잔액이 부족하면 어떤 행도 갱신하지 않는다
pub const DEBIT_ACCOUNT: &str =
    "UPDATE accounts SET balance = balance - $1 WHERE username = $2 AND balance >= $1";

/// 상품 저장
pub const INSERT_ITEM: &str = r#"
    INSERT INTO items (id, name, description, photo_url, starting_price, purchase_price, last_bid, sellable, seller, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

/// 상품 조회
pub const GET_ITEM: &str =
    "SELECT id, name, description, photo_url, starting_price, purchase_price, last_bid, sellable, seller, created_at FROM items WHERE id = $1";

/// 판매중 상품 페이지 조회(등록 순)
pub const SELLABLE_PAGE: &str = r#"
    SELECT id, name, description, photo_url, starting_price, purchase_price, last_bid, sellable, seller, created_at
    FROM items
    WHERE sellable
    ORDER BY created_at, id
    LIMIT $1 OFFSET $2
"#;

/// 판매중 상품 수 조회
pub const COUNT_SELLABLE: &str = "SELECT COUNT(*) FROM items WHERE sellable";

/// 아이템 입찰 이력 조회(생성 순)
pub const GET_ITEM_BIDS: &str = r#"
    SELECT id, item_id, bidder, bid_amount, bid_time
    FROM bids
    WHERE item_id = $1
    ORDER BY id
"#;

/// 아이템 구매 기록 조회
pub const GET_PURCHASE_BY_ITEM: &str =
    "SELECT id, item_id, buyer, purchase_amount, purchased_at FROM purchases WHERE item_id = $1";

/// 구매 기록 삭제
pub const DELETE_PURCHASE: &str = "DELETE FROM purchases WHERE id = $1";

/// 잔액 조회
pub const GET_BALANCE: &str = "SELECT balance FROM accounts WHERE username = $1";

/// 잔액 설정. 계정이 없으면 생성한다
pub const UPSERT_BALANCE: &str = r#"
    INSERT INTO accounts (id, username, balance)
    VALUES ($1, $2, $3)
    ON CONFLICT (username) DO UPDATE SET balance = EXCLUDED.balance
"#;
