mod config;
mod core;
mod feed;
mod util;

use crate::core::{Screen, Scroller};
use actix_cors::Cors;
use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpResponse, HttpResponseBuilder, HttpServer, Responder, get, post, web};
use anyhow::Result;
use flickr::Size;
use serde::Deserialize;
use std::io;
use tokio::sync::oneshot;

#[macro_use]
extern crate log;

#[derive(Deserialize, Debug)]
struct OffsetQuery {
    #[serde(default)]
    offset: usize,
}

#[derive(Deserialize, Debug)]
struct SearchPayload {
    username: String,
}

fn mapper<T: Into<anyhow::Error>>(e: T) -> io::Error {
    let e = e.into();
    error!("mapper: {:?}", e);
    io::Error::other(e.to_string())
}

fn not_found() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "Not found")
}

#[get("/{screen}")]
async fn view(
    app: web::Data<Scroller>,
    screen: web::Path<Screen>,
    q: web::Query<OffsetQuery>,
) -> impl Responder {
    web::Json(app.view(screen.into_inner(), q.offset))
}

#[post("/{screen}/appear")]
async fn appear(app: web::Data<Scroller>, screen: web::Path<Screen>) -> impl Responder {
    web::Json(app.appear(screen.into_inner()).await)
}

#[post("/{screen}/scroll")]
async fn scroll(
    app: web::Data<Scroller>,
    screen: web::Path<Screen>,
    q: web::Query<OffsetQuery>,
) -> impl Responder {
    web::Json(app.scroll(screen.into_inner(), q.offset).await)
}

#[post("/{screen}/refresh")]
async fn refresh(app: web::Data<Scroller>, screen: web::Path<Screen>) -> impl Responder {
    web::Json(app.refresh(screen.into_inner()).await)
}

#[post("/user/search")]
async fn search(app: web::Data<Scroller>, payload: web::Json<SearchPayload>) -> impl Responder {
    web::Json(app.search(&payload.username).await)
}

#[get("/{screen}/photo/{index}")]
async fn closeup(
    app: web::Data<Scroller>,
    path: web::Path<(Screen, usize)>,
) -> io::Result<HttpResponse> {
    let (screen, index) = path.into_inner();
    match app.closeup(screen, index).await {
        Some(c) => Ok(HttpResponse::Ok().json(c)),
        None => Err(not_found()),
    }
}

#[get("/{screen}/photo/{index}/{size}")]
async fn image(
    app: web::Data<Scroller>,
    path: web::Path<(Screen, usize, Size)>,
) -> io::Result<HttpResponse> {
    let (screen, index, size) = path.into_inner();
    let resp = app
        .image(screen, index, size)
        .await
        .ok_or_else(not_found)?
        .map_err(mapper)?;
    let mut builder = HttpResponseBuilder::new(StatusCode::OK);
    if let Some(ct) = resp
        .headers()
        .get(flickr::reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        builder.insert_header((header::CONTENT_TYPE, ct.to_owned()));
    }
    Ok(builder.streaming(resp.bytes_stream()))
}

#[actix_web::main]
async fn main() -> Result<()> {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned());
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&filters)
        .init();

    let data = web::Data::new(Scroller::new()?);
    let scroller = data.clone();
    let addr = data.conf.addr;
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(data.clone())
            .service(search)
            .service(view)
            .service(appear)
            .service(scroll)
            .service(refresh)
            .service(closeup)
            .service(image)
    })
    .bind(addr)?
    .disable_signals()
    .run();
    let handle = server.handle();
    info!("listening on {}", addr);

    let (tx, mut rx) = oneshot::channel();
    let mut tx = Some(tx);
    ctrlc::set_handler(move || match tx.take() {
        Some(tx) => {
            if tx.send(()).is_err() {
                error!("failed to invoke shutdown");
            } else {
                warn!("shutting down");
            }
        }
        None => {
            warn!("is shutting down");
        }
    })?;

    tokio::select! {
        _ = server => {
            error!("server terminated unexpectedly");
        },
        _ = &mut rx => {}
    }
    scroller.shutdown();
    info!("shutting down server");
    handle.stop(true).await;
    Ok(())
}
