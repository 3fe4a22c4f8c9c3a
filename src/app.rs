use std::net::SocketAddr;

use axum::{response::Html, routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::{extractors::MaybeUser, session::session_layer};
use crate::state::AppState;
use crate::{auth, images, listings, views};

pub fn build_app(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    let public_dir = state.config.public_dir.clone();
    let sessions = session_layer(&state.config.session);

    Router::new()
        .route("/", get(home))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(listings::router())
        .merge(images::handlers::upload_routes(max_upload_bytes))
        .nest_service("/public", ServeDir::new(public_dir))
        .with_state(state)
        .layer(sessions)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn home(MaybeUser(user): MaybeUser) -> Html<String> {
    views::index(user.as_ref())
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, Response, StatusCode},
    };
    use tower::ServiceExt;

    async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
        app.clone().oneshot(req).await.unwrap()
    }

    fn form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::from(body.to_owned())).unwrap()
    }

    fn get_req(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::get(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::empty()).unwrap()
    }

    fn location(res: &Response<Body>) -> &str {
        res.headers()[header::LOCATION].to_str().unwrap()
    }

    async fn text(res: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// `name=value` part of the session `Set-Cookie` header.
    fn session_cookie(res: &Response<Body>) -> String {
        let raw = res.headers()[header::SET_COOKIE].to_str().unwrap();
        raw.split(';').next().unwrap().to_owned()
    }

    async fn logged_in(app: &Router) -> String {
        let res = send(app, form("/join", "id=alice&pw=secret1", None)).await;
        assert_eq!(location(&res), "/");
        let res = send(app, form("/login", "id=alice&pw=secret1", None)).await;
        assert_eq!(location(&res), "/");
        session_cookie(&res)
    }

    fn multipart(file_name: &str, data: &[u8]) -> (String, Vec<u8>) {
        let boundary = "XBOUNDARYX";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"img\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    #[tokio::test]
    async fn marketplace_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::fake(dir.path()).await;
        let app = build_app(state.clone());

        let cookie = logged_in(&app).await;
        let original = state.credentials.find_by_id("alice").await.unwrap().unwrap();

        let res = send(&app, form("/join", "id=alice&pw=another", None)).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let after = state.credentials.find_by_id("alice").await.unwrap().unwrap();
        assert_eq!(after.password_hash, original.password_hash);

        let res = send(&app, form("/login", "id=alice&pw=wrong", None)).await;
        assert_eq!(location(&res), "/fail");
        assert!(res.headers().get(header::SET_COOKIE).is_none());

        let res = send(&app, get_req("/", Some(&cookie))).await;
        assert!(text(res).await.contains("Welcome back, alice"));

        let res = send(
            &app,
            form(
                "/write",
                "title=Bike&money=100&description=used&kakao=alice123",
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(location(&res), "/imgUpload?id=1");
        assert_eq!(state.listings.next_id().await.unwrap(), 2);

        let res = send(&app, get_req("/detail/1", None)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let page = text(res).await;
        assert!(page.contains("Bike") && page.contains("alice123"));
    }

    #[tokio::test]
    async fn write_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(AppState::fake(dir.path()).await);

        let res = send(&app, get_req("/write", None)).await;
        assert_eq!(location(&res), "/login");

        let res = send(&app, form("/write", "title=a&money=1&description=b&kakao=c", None)).await;
        assert_eq!(location(&res), "/login");
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(AppState::fake(dir.path()).await);
        let cookie = logged_in(&app).await;

        let res = send(&app, get_req("/logout", Some(&cookie))).await;
        assert_eq!(location(&res), "/");

        let res = send(&app, get_req("/write", Some(&cookie))).await;
        assert_eq!(location(&res), "/login");
    }

    #[tokio::test]
    async fn image_upload_is_tied_to_listing() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::fake(dir.path()).await;
        let app = build_app(state.clone());
        let cookie = logged_in(&app).await;

        send(
            &app,
            form("/write", "title=Lamp&money=5&description=bright&kakao=al", Some(&cookie)),
        )
        .await;

        let (ct, body) = multipart("lamp.gif", b"GIF89a");
        let req = Request::post("/imgUpload?id=1")
            .header(header::CONTENT_TYPE, ct)
            .header(header::COOKIE, &cookie)
            .body(Body::from(body))
            .unwrap();
        assert_eq!(send(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let (ct, body) = multipart("lamp.png", b"\x89PNG");
        let req = Request::post("/imgUpload?id=1")
            .header(header::CONTENT_TYPE, ct)
            .header(header::COOKIE, &cookie)
            .body(Body::from(body))
            .unwrap();
        let res = send(&app, req).await;
        assert_eq!(location(&res), "/detail/1");

        let listing = state.listings.find_by_id(1).await.unwrap().unwrap();
        let image = listing.image.unwrap();
        assert!(image.ends_with("-lamp.png"));
        assert_eq!(std::fs::read(dir.path().join("image").join(&image)).unwrap(), b"\x89PNG");

        let (ct, body) = multipart("lamp.png", b"\x89PNG");
        let req = Request::post("/imgUpload?id=99")
            .header(header::CONTENT_TYPE, ct)
            .header(header::COOKIE, &cookie)
            .body(Body::from(body))
            .unwrap();
        assert_eq!(send(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn detail_image_links_resolve_for_awkward_names() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(AppState::fake(dir.path()).await);
        let cookie = logged_in(&app).await;

        for (id, file_name) in [(1, "a%41.png"), (2, "cat#1.png"), (3, "my photo.jpg")] {
            send(
                &app,
                form("/write", "title=Lamp&money=5&description=d&kakao=al", Some(&cookie)),
            )
            .await;
            let (ct, body) = multipart(file_name, b"img-bytes");
            let req = Request::post(format!("/imgUpload?id={id}"))
                .header(header::CONTENT_TYPE, ct)
                .header(header::COOKIE, &cookie)
                .body(Body::from(body))
                .unwrap();
            assert_eq!(location(&send(&app, req).await), format!("/detail/{id}"));

            let page = text(send(&app, get_req(&format!("/detail/{id}"), None)).await).await;
            let src = page
                .split(r#"<img src=""#)
                .nth(1)
                .and_then(|rest| rest.split('"').next())
                .unwrap()
                .to_owned();
            assert!(src.starts_with("/public/image/"), "{src}");

            let res = send(&app, get_req(&src, None)).await;
            assert_eq!(res.status(), StatusCode::OK, "{file_name} -> {src}");
            assert_eq!(text(res).await, "img-bytes");
        }
    }

    #[tokio::test]
    async fn write_form_fields_are_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::fake(dir.path()).await;
        let app = build_app(state.clone());
        let cookie = logged_in(&app).await;

        let res = send(
            &app,
            form("/write", "title=+Bike+&money=+100+&description=&kakao=+al+", Some(&cookie)),
        )
        .await;
        assert_eq!(location(&res), "/imgUpload?id=1");

        let listing = state.listings.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(listing.title, " Bike ");
        assert_eq!(listing.money, " 100 ");
        assert_eq!(listing.kakao, " al ");

        let res = send(
            &app,
            form("/write", "title=&money=&description=&kakao=", Some(&cookie)),
        )
        .await;
        assert_eq!(location(&res), "/imgUpload?id=2");
    }

    #[tokio::test]
    async fn detail_of_unknown_or_bad_id_renders_empty() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(AppState::fake(dir.path()).await);

        for uri in ["/detail/42", "/detail/abc"] {
            let res = send(&app, get_req(uri, None)).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
            assert!(text(res).await.contains("Listing not found"));
        }
    }

    #[tokio::test]
    async fn search_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(AppState::fake(dir.path()).await);
        let cookie = logged_in(&app).await;
        for body in [
            "title=Red+Bike&money=100&description=x&kakao=a",
            "title=Desk&money=30&description=y&kakao=b",
        ] {
            send(&app, form("/write", body, Some(&cookie))).await;
        }

        let page = text(send(&app, get_req("/search?value=bike", None)).await).await;
        assert!(page.contains("Red Bike"));
        assert!(!page.contains("Desk"));

        let page = text(send(&app, get_req("/search", None)).await).await;
        assert!(page.contains("No listings."));

        let page = text(send(&app, get_req("/list", None)).await).await;
        assert!(page.contains("Red Bike") && page.contains("Desk"));
    }

    #[tokio::test]
    async fn uploaded_images_are_served_under_public() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hi").unwrap();
        let app = build_app(AppState::fake(dir.path()).await);

        let res = send(&app, get_req("/public/hello.txt", None)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(text(res).await, "hi");
    }
}
