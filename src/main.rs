// region:    --- Imports
use crate::auction::engine::AuctionEngine;
use crate::database::DatabaseManager;
use crate::store::{AuctionStore, MemoryStore, PostgresStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod auction;
mod database;
mod error;
mod handlers;
mod store;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 저장소 선택: DATABASE_URL 이 있으면 PostgreSQL, 없으면 인메모리
    let store: Arc<dyn AuctionStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let db_manager = Arc::new(DatabaseManager::new(&database_url).await?);

            // 데이터베이스 초기화
            if let Err(e) = db_manager.initialize_database().await {
                error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            Arc::new(PostgresStore::new(db_manager))
        }
        Err(_) => {
            info!("{:<12} --> DATABASE_URL 없음: 인메모리 저장소 사용", "Main");
            Arc::new(MemoryStore::new())
        }
    };

    // 경매 엔진 생성
    let engine = Arc::new(AuctionEngine::new(store));

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = handlers::routes(engine).layer(cors);

    // 리스너 생성(로컬 호스트의 3000번 포트를 사용)
    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
