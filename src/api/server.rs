use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue, LOCATION};
use hyper::http::Uri;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::debug;

use crate::api::currency;
use crate::metrics::prometheus as telemetry;
use crate::state::market_cache::MarketCache;

const ALL_PATH: &str = "/currency/all";

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Redirect,
    All,
    One(String),
    NotFound,
}

impl Route {
    fn resolve(uri: &Uri) -> Self {
        match uri.path() {
            "/currency" => Route::Redirect,
            ALL_PATH => Route::All,
            path => match path.strip_prefix("/currency/") {
                // `/currency/?symbol=BTCUSD` form
                Some("") => Route::One(query_symbol(uri.query()).unwrap_or_default()),
                Some(symbol) => Route::One(symbol.to_string()),
                None => Route::NotFound,
            },
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Route::Redirect => "redirect",
            Route::All => "all",
            Route::One(_) => "one",
            Route::NotFound => "not_found",
        }
    }
}

fn query_symbol(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "symbol")
        .map(|(_, value)| value.into_owned())
}

/// Binds the listener and returns the bound address plus the server future.
/// The server drains and exits once `stop` fires.
pub fn bind(
    addr: SocketAddr,
    cache: MarketCache,
    mut stop: watch::Receiver<bool>,
) -> anyhow::Result<(SocketAddr, impl Future<Output = Result<(), hyper::Error>> + Send)> {
    let make_svc = make_service_fn(move |_conn| {
        let cache = cache.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let cache = cache.clone();
                async move { Ok::<_, Infallible>(handle_request(req, &cache).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)?.serve(make_svc);
    let local_addr = server.local_addr();

    let server = server.with_graceful_shutdown(async move {
        let _ = stop.changed().await;
    });

    Ok((local_addr, server))
}

pub async fn handle_request(req: Request<Body>, cache: &MarketCache) -> Response<Body> {
    let route = Route::resolve(req.uri());

    let response = if route == Route::NotFound {
        text_response(StatusCode::NOT_FOUND, "404 page not found")
    } else if req.method() != Method::GET {
        let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET"));
        response
    } else {
        match &route {
            Route::Redirect => redirect(ALL_PATH),
            Route::All => json_response(&currency::get_all(&*cache.snapshot().await)),
            Route::One(symbol) => match currency::get_one(&*cache.snapshot().await, symbol) {
                Ok(record) => json_response(&record),
                Err(err) => text_response(StatusCode::BAD_REQUEST, &err.to_string()),
            },
            Route::NotFound => text_response(StatusCode::NOT_FOUND, "404 page not found"),
        }
    };

    telemetry::record_request(route.label(), response.status().as_u16());
    debug!(
        method = %req.method(),
        path = req.uri().path(),
        status = response.status().as_u16(),
        "request handled"
    );

    response
}

fn json_response<T: Serialize>(value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut response = Response::new(Body::from(body));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(err) => text_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

fn text_response(status: StatusCode, message: &str) -> Response<Body> {
    let mut response = Response::new(Body::from(format!("{message}\n")));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

fn redirect(location: &'static str) -> Response<Body> {
    let body = format!("<a href=\"{location}\">Moved Permanently</a>.\n\n");
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::MOVED_PERMANENTLY;
    let headers = response.headers_mut();
    headers.insert(LOCATION, HeaderValue::from_static(location));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    response
}
