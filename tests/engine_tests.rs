use marketplace_service::auction::engine::AuctionEngine;
use marketplace_service::auction::model::{BidOutcome, ItemDetail, ItemDraft};
use marketplace_service::error::AuctionError;
use marketplace_service::store::{AuctionStore, MemoryStore};
use std::sync::Arc;
use uuid::Uuid;

/// 인메모리 저장소 기반 엔진 생성. 저장소 핸들도 함께 돌려준다.
fn setup() -> (Arc<AuctionEngine>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn AuctionStore> = store.clone();
    (Arc::new(AuctionEngine::new(dyn_store)), store)
}

/// 테스트용 상품 등록 내용
fn draft(name: &str, starting_price: i64, purchase_price: i64) -> ItemDraft {
    ItemDraft {
        name: name.to_string(),
        description: format!("{} 설명입니다.", name),
        photo_url: "/img/test-item.png".to_string(),
        starting_price,
        purchase_price,
    }
}

/// 입찰 시나리오 테스트: 시작가 10, 즉시 구매가 50
#[tokio::test]
async fn test_bid_scenario() {
    let (engine, store) = setup();
    engine.set_balance("seller", 0).await.unwrap();
    engine.set_balance("bidder", 1000).await.unwrap();
    let item = engine
        .create_item(&draft("시나리오 상품", 10, 50), "seller")
        .await
        .unwrap();

    // 시작가 미만 입찰 거절
    let err = engine.place_bid(item.id, "bidder", 5).await.unwrap_err();
    assert!(matches!(err, AuctionError::BidTooLow));

    // 일반 입찰 성공
    let outcome = engine.place_bid(item.id, "bidder", 20).await.unwrap();
    assert!(matches!(outcome, BidOutcome::Placed { bid_amount: 20, .. }));

    // 현재 최고가 이하 입찰 거절
    let err = engine.place_bid(item.id, "bidder", 15).await.unwrap_err();
    assert!(matches!(err, AuctionError::BidTooLow));

    // 즉시 구매가 이상 입찰로 낙찰
    let outcome = engine.place_bid(item.id, "bidder", 51).await.unwrap();
    match outcome {
        BidOutcome::Purchased { buyer, price, .. } => {
            assert_eq!(buyer, "bidder");
            assert_eq!(price, 51);
        }
        other => panic!("낙찰을 기대했으나: {:?}", other),
    }

    let sold = store.item_by_id(item.id).await.unwrap();
    assert!(!sold.sellable);
    assert_eq!(sold.last_bid, 51);

    // 판매 완료 후 입찰 거절
    let err = engine.place_bid(item.id, "bidder", 60).await.unwrap_err();
    assert!(matches!(err, AuctionError::NotSellable));
}

/// 검증 순서 테스트: 먼저 실패한 검사가 결과를 결정한다
#[tokio::test]
async fn test_validation_order() {
    let (engine, _store) = setup();
    engine.set_balance("seller", 0).await.unwrap();
    engine.set_balance("broke", 0).await.unwrap();
    engine.set_balance("poor", 5).await.unwrap();
    engine.set_balance("rich", 1000).await.unwrap();
    let item = engine
        .create_item(&draft("검증 상품", 10, 50), "seller")
        .await
        .unwrap();
    let unknown_item = Uuid::new_v4();

    // 미등록 사용자
    let err = engine.place_bid(item.id, "nobody", 20).await.unwrap_err();
    assert!(matches!(err, AuctionError::NotFound("User")));

    // 잔액 0: 아이템이 없어도 NoFunds 가 먼저
    let err = engine.place_bid(unknown_item, "broke", 20).await.unwrap_err();
    assert!(matches!(err, AuctionError::NoFunds));

    // 잔액 부족: 아이템이 없어도 InsufficientFunds 가 먼저
    let err = engine.place_bid(unknown_item, "poor", 20).await.unwrap_err();
    assert!(matches!(err, AuctionError::InsufficientFunds));

    // 잔액이 충분할 때 비로소 아이템 미존재
    let err = engine.place_bid(unknown_item, "rich", 20).await.unwrap_err();
    assert!(matches!(err, AuctionError::NotFound("Item")));

    // 본인 아이템 입찰은 금액과 무관하게 거절
    engine.set_balance("seller", 1000).await.unwrap();
    let err = engine.place_bid(item.id, "seller", 5).await.unwrap_err();
    assert!(matches!(err, AuctionError::SelfBid));
}

/// 일반 입찰은 잔액을 움직이지 않는다(낙찰 전까지 예치 없음)
#[tokio::test]
async fn test_raise_keeps_balance() {
    let (engine, _store) = setup();
    engine.set_balance("seller", 0).await.unwrap();
    engine.set_balance("bidder", 500).await.unwrap();
    let item = engine
        .create_item(&draft("입찰 상품", 10, 100), "seller")
        .await
        .unwrap();

    engine.place_bid(item.id, "bidder", 20).await.unwrap();
    engine.place_bid(item.id, "bidder", 30).await.unwrap();

    assert_eq!(engine.balance_of("bidder").await.unwrap(), 500);
}

/// 낙찰 시 잔액 차감, 입찰/구매 기록, 상세 조회 결과 확인
#[tokio::test]
async fn test_purchase_effects() {
    let (engine, store) = setup();
    engine.set_balance("seller", 0).await.unwrap();
    engine.set_balance("buyer", 200).await.unwrap();
    let item = engine
        .create_item(&draft("낙찰 상품", 10, 50), "seller")
        .await
        .unwrap();

    engine.place_bid(item.id, "buyer", 20).await.unwrap();
    engine.place_bid(item.id, "buyer", 55).await.unwrap();

    // 잔액은 낙찰가만큼만 차감
    assert_eq!(engine.balance_of("buyer").await.unwrap(), 145);

    // 입찰 기록 2건, 구매 기록 1건
    let bids = store.bids_for_item(item.id).await.unwrap();
    assert_eq!(bids.len(), 2);
    assert_eq!(bids[1].bid_amount, 55);
    let purchase = store.purchase_for_item(item.id).await.unwrap().unwrap();
    assert_eq!(purchase.buyer, "buyer");
    assert_eq!(purchase.purchase_amount, 55);

    // 상세 조회는 판매 완료 형태
    match engine.item_details(item.id).await.unwrap() {
        ItemDetail::Sold { buyer, price, .. } => {
            assert_eq!(buyer, "buyer");
            assert_eq!(price, 55);
        }
        other => panic!("판매 완료 상세를 기대했으나: {:?}", other),
    }
}

/// 동시 낙찰 경합 테스트: 승자는 정확히 한 명
#[tokio::test]
async fn test_concurrent_purchase_single_winner() {
    let (engine, store) = setup();
    engine.set_balance("seller", 0).await.unwrap();
    for i in 1..=10 {
        engine
            .set_balance(&format!("bidder{}", i), 10_000)
            .await
            .unwrap();
    }
    let item = engine
        .create_item(&draft("경합 상품", 10, 50), "seller")
        .await
        .unwrap();

    let mut handles = vec![];
    for i in 1..=10 {
        let engine = Arc::clone(&engine);
        let item_id = item.id;
        handles.push(tokio::spawn(async move {
            engine.place_bid(item_id, &format!("bidder{}", i), 60).await
        }));
    }

    let mut purchased = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(BidOutcome::Purchased { .. }) => purchased += 1,
            Ok(other) => panic!("낙찰 외 성공은 나올 수 없음: {:?}", other),
            Err(AuctionError::NotSellable) | Err(AuctionError::BidTooLow) => rejected += 1,
            Err(e) => panic!("예상 밖 오류: {:?}", e),
        }
    }
    assert_eq!(purchased, 1);
    assert_eq!(rejected, 9);

    // 구매 기록은 정확히 1건, 차감된 계정도 정확히 하나
    let purchase = store.purchase_for_item(item.id).await.unwrap().unwrap();
    assert_eq!(purchase.purchase_amount, 60);
    let mut debited = 0;
    for i in 1..=10 {
        let balance = engine
            .balance_of(&format!("bidder{}", i))
            .await
            .unwrap();
        if balance == 10_000 - 60 {
            debited += 1;
        } else {
            assert_eq!(balance, 10_000);
        }
    }
    assert_eq!(debited, 1);
}

/// 동시 일반 입찰 테스트: 수락된 입찰 이력은 순증가
#[tokio::test]
async fn test_concurrent_raises_monotonic() {
    let (engine, store) = setup();
    engine.set_balance("seller", 0).await.unwrap();
    for i in 1..=50 {
        engine
            .set_balance(&format!("bidder{}", i), 10_000)
            .await
            .unwrap();
    }
    let item = engine
        .create_item(&draft("동시 입찰 상품", 10, 1000), "seller")
        .await
        .unwrap();

    let mut handles = vec![];
    for i in 1..=50i64 {
        let engine = Arc::clone(&engine);
        let item_id = item.id;
        handles.push(tokio::spawn(async move {
            engine
                .place_bid(item_id, &format!("bidder{}", i), 10 + i)
                .await
        }));
    }
    for handle in handles {
        // 거절은 BidTooLow 뿐이어야 한다
        if let Err(e) = handle.await.unwrap() {
            assert!(matches!(e, AuctionError::BidTooLow), "예상 밖 오류: {:?}", e);
        }
    }

    // 수락된 입찰 이력은 생성 순으로 순증가하고, 최고가 입찰은 반드시 수락된다
    let bids = store.bids_for_item(item.id).await.unwrap();
    assert!(!bids.is_empty());
    let mut prev = 0;
    for bid in &bids {
        assert!(bid.bid_amount > prev, "입찰 이력이 순증가하지 않음");
        prev = bid.bid_amount;
    }
    let final_item = store.item_by_id(item.id).await.unwrap();
    assert_eq!(final_item.last_bid, 60);
    assert!(final_item.sellable);
}

/// 서로 다른 아이템 동시 낙찰로 잔액이 음수가 되지 않는다
#[tokio::test]
async fn test_balance_race_across_items() {
    let (engine, store) = setup();
    engine.set_balance("seller", 0).await.unwrap();
    engine.set_balance("buyer", 100).await.unwrap();
    let first = engine
        .create_item(&draft("첫번째 상품", 10, 100), "seller")
        .await
        .unwrap();
    let second = engine
        .create_item(&draft("두번째 상품", 10, 100), "seller")
        .await
        .unwrap();

    let engine_a = Arc::clone(&engine);
    let engine_b = Arc::clone(&engine);
    let (first_id, second_id) = (first.id, second.id);
    let (result_a, result_b) = tokio::join!(
        tokio::spawn(async move { engine_a.place_bid(first_id, "buyer", 100).await }),
        tokio::spawn(async move { engine_b.place_bid(second_id, "buyer", 100).await }),
    );

    let results = [result_a.unwrap(), result_b.unwrap()];
    let purchased = results
        .iter()
        .filter(|r| matches!(r, Ok(BidOutcome::Purchased { .. })))
        .count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(AuctionError::InsufficientFunds)))
        .count();
    assert_eq!(purchased, 1, "낙찰은 정확히 한 건이어야 함");
    assert_eq!(refused, 1, "나머지 한 건은 잔액 부족이어야 함");

    assert_eq!(engine.balance_of("buyer").await.unwrap(), 0);
    let mut total_purchases = 0;
    for id in [first.id, second.id] {
        if store.purchase_for_item(id).await.unwrap().is_some() {
            total_purchases += 1;
        }
    }
    assert_eq!(total_purchases, 1);
}

/// 구매 기록 삭제는 보상 조치: 아이템은 판매 완료로 남는다
#[tokio::test]
async fn test_delete_purchase() {
    let (engine, store) = setup();
    engine.set_balance("seller", 0).await.unwrap();
    engine.set_balance("buyer", 100).await.unwrap();
    let item = engine
        .create_item(&draft("삭제 상품", 10, 50), "seller")
        .await
        .unwrap();
    engine.place_bid(item.id, "buyer", 50).await.unwrap();

    let purchase = store.purchase_for_item(item.id).await.unwrap().unwrap();
    engine.delete_purchase(purchase.id).await.unwrap();

    // 아이템은 여전히 판매 완료 상태
    let sold = store.item_by_id(item.id).await.unwrap();
    assert!(!sold.sellable);

    // 상세 조회는 구매 기록 없음
    let err = engine.item_details(item.id).await.unwrap_err();
    assert!(matches!(err, AuctionError::NotFound("Purchase record")));

    // 반복 삭제는 미존재
    let err = engine.delete_purchase(purchase.id).await.unwrap_err();
    assert!(matches!(err, AuctionError::NotFound("Purchase")));
}

/// 판매중 목록 페이징 테스트: 페이지당 3개, 등록 순, 판매 완료 제외
#[tokio::test]
async fn test_pagination() {
    let (engine, _store) = setup();

    // 빈 목록은 1페이지부터 없음
    let err = engine.sellable_page(1).await.unwrap_err();
    assert!(matches!(err, AuctionError::NoSuchPage(1)));

    engine.set_balance("seller", 0).await.unwrap();
    engine.set_balance("buyer", 1000).await.unwrap();
    let mut ids = vec![];
    for i in 1..=7 {
        let item = engine
            .create_item(&draft(&format!("페이징 상품 {}", i), 10, 50), "seller")
            .await
            .unwrap();
        ids.push(item.id);
    }

    let page1 = engine.sellable_page(1).await.unwrap();
    assert_eq!(page1.total_pages, 3);
    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.items[0].name, "페이징 상품 1");

    let page3 = engine.sellable_page(3).await.unwrap();
    assert_eq!(page3.items.len(), 1);
    assert_eq!(page3.items[0].name, "페이징 상품 7");

    let err = engine.sellable_page(4).await.unwrap_err();
    assert!(matches!(err, AuctionError::NoSuchPage(4)));

    // 판매 완료된 상품은 목록에서 빠진다
    engine.place_bid(ids[1], "buyer", 50).await.unwrap();
    let page1 = engine.sellable_page(1).await.unwrap();
    assert_eq!(page1.total_pages, 2);
    assert!(page1.items.iter().all(|item| item.id != ids[1]));
    assert_eq!(page1.items[0].name, "페이징 상품 1");
    assert_eq!(page1.items[1].name, "페이징 상품 3");
}

/// 상품 등록 초기 상태와 판매자 확인
#[tokio::test]
async fn test_create_item_initial_state() {
    let (engine, _store) = setup();
    engine.set_balance("seller", 0).await.unwrap();

    let item = engine
        .create_item(&draft("신규 상품", 10, 50), "seller")
        .await
        .unwrap();
    assert_eq!(item.last_bid, 0);
    assert!(item.sellable);
    assert_eq!(item.seller, "seller");

    // 미등록 판매자는 등록 불가
    let err = engine
        .create_item(&draft("주인 없는 상품", 10, 50), "nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, AuctionError::NotFound("User")));
}

/// 상품 등록 내용 필드 검증
#[test]
fn test_item_draft_validation() {
    let valid = draft("검증 상품", 10, 50);
    assert!(valid.validate().is_empty());

    let invalid = ItemDraft {
        name: " ".to_string(),
        description: String::new(),
        photo_url: "http://example.com/a.jpg".to_string(),
        starting_price: 0,
        purchase_price: -5,
    };
    let errors = invalid.validate();
    let fields: Vec<&str> = errors.iter().map(|(field, _)| *field).collect();
    assert_eq!(
        fields,
        vec![
            "name",
            "description",
            "photo_url",
            "starting_price",
            "purchase_price"
        ]
    );
}
