use history_cache::HistoryCache;
use history_model::PricePoint;
use iex_api::api::IexAPI;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::process::exit;
use std::sync::Arc;

use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};

use config::Config;

mod config;
mod query;
mod utils;

#[derive(Serialize)]
struct HealthcheckResponse {
    status: String,
}

#[derive(Serialize)]
struct HelloResponse {
    hello: String,
}

#[derive(Deserialize)]
struct RangeParams {
    from: Option<String>,
    to: Option<String>,
}

#[get("/api/beta/stock/{symbol}")]
async fn get_stock(
    symbol: web::Path<String>,
    range: Result<web::Query<RangeParams>, actix_web::Error>,
    cache: web::Data<HistoryCache>,
) -> impl Responder {
    let range = match range {
        Ok(range) => range,
        Err(e) => {
            warn!("get_stock | symbol: {} | bad query string: {}", symbol, e);
            return web::Json(vec![]);
        }
    };
    let today = chrono::Local::now().date_naive();
    let window = match utils::parse_range(range.from.as_deref(), range.to.as_deref(), today) {
        Ok(window) => window,
        Err(e) => {
            warn!("get_stock | symbol: {} | {}", symbol, e);
            return web::Json(vec![]);
        }
    };
    web::Json(query::query(&cache, &symbol, window, today).await)
}

// an empty symbol segment never reaches the route above
async fn get_stock_without_symbol() -> impl Responder {
    warn!("get_stock | empty symbol");
    web::Json(vec![] as Vec<PricePoint>)
}

#[get("/")]
async fn hello() -> impl Responder {
    web::Json(HelloResponse {
        hello: "world".to_string(),
    })
}

#[get("/healthcheck")]
async fn healthcheck() -> impl Responder {
    web::Json(HealthcheckResponse {
        status: "ok".to_string(),
    })
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(HealthcheckResponse {
        status: "not found".to_string(),
    })
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .service(healthcheck)
        .service(get_stock)
        .service(
            web::resource(vec!["/api/beta/stock", "/api/beta/stock/"])
                .route(web::get().to(get_stock_without_symbol)),
        );
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not create config: {}", e);
            exit(1);
        }
    };

    let iex_api = match IexAPI::new(&config.upstream_url, &config.token) {
        Ok(api) => api,
        Err(e) => {
            error!("Could not create upstream client: {}", e);
            exit(1);
        }
    };
    info!(
        "Upstream: {} | cache ttl: {:?} | fetch timeout: {:?}",
        config.upstream_url, config.cache.ttl, config.cache.fetch_timeout
    );

    let cache = web::Data::new(HistoryCache::new(Arc::new(iex_api), config.cache));

    info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(cache.clone())
            .configure(configure)
            .default_service(web::to(not_found))
            .wrap(Logger::default())
    })
    .bind((config.host.as_str(), config.port))?
    .workers(config.workers)
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use history_cache::{CacheConfig, HistorySource, SourceError};
    use history_model::Symbol;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeUpstream {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeUpstream {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(FakeUpstream {
                calls: AtomicUsize::new(0),
                fail,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HistorySource for FakeUpstream {
        async fn fetch_history(&self, _symbol: &Symbol) -> Result<Vec<PricePoint>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("connection refused".into());
            }
            Ok(upstream_points())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn upstream_points() -> Vec<PricePoint> {
        vec![
            PricePoint::new(day(2019, 12, 30), 100.0),
            PricePoint::new(day(2020, 1, 28), 110.0),
            PricePoint::new(day(2020, 2, 1), 120.0),
        ]
    }

    fn cache_over(upstream: &Arc<FakeUpstream>) -> HistoryCache {
        HistoryCache::new(upstream.clone(), CacheConfig::default())
    }

    async fn get_json(cache: &HistoryCache, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cache.clone()))
                .configure(configure)
                .default_service(web::to(not_found)),
        )
        .await;
        let req = test::TestRequest::get().uri(uri).to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        let body: serde_json::Value = test::read_body_json(res).await;
        (status, body)
    }

    async fn get_points(cache: &HistoryCache, uri: &str) -> Vec<PricePoint> {
        let (status, body) = get_json(cache, uri).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_value(body).unwrap()
    }

    #[actix_web::test]
    async fn get_stock_pass_full_history() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        let points = get_points(&cache, "/api/beta/stock/aapl").await;
        assert_eq!(points, upstream_points());
    }

    #[actix_web::test]
    async fn get_stock_pass_wire_shape() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        let (_, body) = get_json(&cache, "/api/beta/stock/AAPL?from=2020-02-01").await;
        assert_eq!(body, serde_json::json!([{"date": "2020-02-01", "close": 120.0}]));
    }

    #[actix_web::test]
    async fn get_stock_pass_single_day_window() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        let points =
            get_points(&cache, "/api/beta/stock/AAPL?from=1/28/2020&to=2020-01-28").await;
        assert_eq!(points, vec![PricePoint::new(day(2020, 1, 28), 110.0)]);
    }

    #[actix_web::test]
    async fn get_stock_pass_reversed_window_clamped() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        let points =
            get_points(&cache, "/api/beta/stock/AAPL?from=1/28/2020&to=1/1/2019").await;
        assert_eq!(points, vec![PricePoint::new(day(2020, 1, 28), 110.0)]);
    }

    #[actix_web::test]
    async fn get_stock_pass_ranges_share_cached_history() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        let january = get_points(&cache, "/api/beta/stock/AAPL?from=1/1/2020&to=1/31/2020").await;
        let december = get_points(&cache, "/api/beta/stock/AAPL?from=12/1/2019&to=12/31/2019").await;

        assert_eq!(january.len(), 1);
        assert_eq!(december.len(), 1);
        assert_eq!(upstream.calls(), 1);
    }

    #[actix_web::test]
    async fn get_stock_fail_symbol_too_long() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        let points = get_points(&cache, "/api/beta/stock/ABCDEF").await;
        assert!(points.is_empty());
        assert_eq!(upstream.calls(), 0);
    }

    #[actix_web::test]
    async fn get_stock_fail_padded_symbol() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        let points = get_points(&cache, "/api/beta/stock/%20AAPL%20").await;
        assert!(points.is_empty());
        assert_eq!(upstream.calls(), 0);
    }

    #[actix_web::test]
    async fn get_stock_fail_empty_symbol() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        assert!(get_points(&cache, "/api/beta/stock/").await.is_empty());
        assert!(get_points(&cache, "/api/beta/stock").await.is_empty());
        assert_eq!(upstream.calls(), 0);
    }

    #[actix_web::test]
    async fn get_stock_fail_bad_date() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        let points = get_points(&cache, "/api/beta/stock/AAPL?from=soon").await;
        assert!(points.is_empty());
        assert_eq!(upstream.calls(), 0);
    }

    #[actix_web::test]
    async fn get_stock_fail_duplicate_query_param() {
        let upstream = FakeUpstream::new(false);
        let cache = cache_over(&upstream);

        let points = get_points(&cache, "/api/beta/stock/AAPL?from=2020-01-01&from=2020-02-01").await;
        assert!(points.is_empty());
        assert_eq!(upstream.calls(), 0);
    }

    #[actix_web::test]
    async fn get_stock_fail_upstream_down() {
        let upstream = FakeUpstream::new(true);
        let cache = cache_over(&upstream);

        assert!(get_points(&cache, "/api/beta/stock/AAPL").await.is_empty());
        assert!(get_points(&cache, "/api/beta/stock/AAPL").await.is_empty());
        assert_eq!(upstream.calls(), 2);
    }

    #[actix_web::test]
    async fn healthcheck_pass() {
        let cache = cache_over(&FakeUpstream::new(false));
        let (status, body) = get_json(&cache, "/healthcheck").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }

    #[actix_web::test]
    async fn hello_pass() {
        let cache = cache_over(&FakeUpstream::new(false));
        let (_, body) = get_json(&cache, "/").await;
        assert_eq!(body, serde_json::json!({"hello": "world"}));
    }

    #[actix_web::test]
    async fn not_found_pass() {
        let cache = cache_over(&FakeUpstream::new(false));
        let (status, body) = get_json(&cache, "/moex/sber").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"status": "not found"}));
    }
}
