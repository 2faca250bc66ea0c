use crate::config::jwt_auth::ADMIN_ROLE;
use crate::controller::dispatch::{dispatch, Route, Step};
use crate::models::{
    blog::Blog, country::Country, destination::Destination, feedback::Feedback,
    subscription::Subscription, Resource,
};
use crate::service::{auth, content, subscription};
use crate::validation::schemas;
use crate::AppState;
use actix_web::web::{self, Bytes, Data};
use actix_web::HttpRequest;
use std::sync::Arc;

/// The complete, fixed route table.
pub fn route_table() -> Vec<Route> {
    let mut routes = vec![
        Route::post("/auth/tokens", auth::issue_tokens)
            .with(Step::Validate(&schemas::AUTH_TOKENS)),
        Route::post("/auth/refresh", auth::refresh_tokens)
            .with(Step::Validate(&schemas::REFRESH_TOKENS)),
        Route::get("/auth/session", auth::current_session).with(Step::Authenticate),
        Route::post("/feedback", content::create::<Feedback>)
            .with(Step::Validate(Feedback::schema())),
        Route::get("/feedback", content::list::<Feedback>)
            .with(Step::Authenticate)
            .with(Step::RequireRole(ADMIN_ROLE)),
        Route::post("/subscriptions", subscription::subscribe)
            .with(Step::Validate(Subscription::schema())),
        Route::get("/subscriptions", content::list::<Subscription>)
            .with(Step::Authenticate)
            .with(Step::RequireRole(ADMIN_ROLE)),
        Route::delete("/subscriptions/{id}", content::delete::<Subscription>)
            .with(Step::Authenticate)
            .with(Step::RequireRole(ADMIN_ROLE)),
    ];
    routes.extend(content_routes::<Blog>("/blogs", "/blogs/{id}"));
    routes.extend(content_routes::<Country>("/countries", "/countries/{id}"));
    routes.extend(content_routes::<Destination>(
        "/destinations",
        "/destinations/{id}",
    ));
    routes
}

fn content_routes<R: Resource>(collection: &'static str, item: &'static str) -> Vec<Route> {
    vec![
        Route::get(collection, content::list::<R>),
        Route::get(item, content::get::<R>),
        Route::post(collection, content::create::<R>)
            .with(Step::Authenticate)
            .with(Step::Validate(R::schema())),
        Route::put(item, content::replace::<R>)
            .with(Step::Authenticate)
            .with(Step::Validate(R::schema())),
        Route::delete(item, content::delete::<R>)
            .with(Step::Authenticate)
            .with(Step::RequireRole(ADMIN_ROLE)),
    ]
}

/// Registers the table with actix, one resource per path so that a known path
/// with an unregistered method answers 405.
pub fn config(conf: &mut web::ServiceConfig, routes: &[Arc<Route>]) {
    let mut paths: Vec<&'static str> = Vec::new();
    for route in routes {
        if !paths.contains(&route.path) {
            paths.push(route.path);
        }
    }

    for path in paths {
        let mut resource = web::resource(path);
        for route in routes.iter().filter(|route| route.path == path) {
            let route = Arc::clone(route);
            resource = resource.route(web::method(route.method.clone()).to(
                move |req: HttpRequest, body: Bytes, state: Data<AppState>| {
                    dispatch(Arc::clone(&route), req, body, state)
                },
            ));
        }
        conf.service(resource);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::TokenConfig;
    use crate::models::token_claims::{TokenPair, TokenPayload};
    use crate::repository::memory::MemoryRepository;
    use crate::repository::Collection;
    use crate::util::token::TokenIssuer;
    use actix_web::cookie::Cookie;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn test_state() -> (Data<AppState>, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::default());
        let issuer = TokenIssuer::new(&TokenConfig {
            access_token_secret: "route-test-access".to_string(),
            access_token_max_age: 900,
            refresh_token_secret: "route-test-refresh".to_string(),
            refresh_token_max_age: 86_400,
            session_max_age: None,
        })
        .unwrap();
        let state = Data::new(AppState {
            repo: repo.clone(),
            issuer,
            trusted_reverse_proxy_ip: "127.0.0.1".parse().unwrap(),
        });
        (state, repo)
    }

    macro_rules! test_app {
        ($state:expr) => {{
            let routes: Vec<Arc<Route>> = route_table().into_iter().map(Arc::new).collect();
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .configure(move |conf| config(conf, &routes)),
            )
            .await
        }};
    }

    fn payload(role: Option<&str>) -> TokenPayload {
        TokenPayload {
            user_id: "123".to_string(),
            email: "a@b.com".to_string(),
            role: role.map(str::to_string),
        }
    }

    fn bearer(state: &AppState, role: Option<&str>) -> (header::HeaderName, String) {
        let pair = state.issuer.issue(&payload(role)).unwrap();
        (
            header::AUTHORIZATION,
            format!("Bearer {}", pair.access_token),
        )
    }

    fn blog(title: &str, category: &str) -> Value {
        json!({
            "title": title,
            "author": "Mia",
            "category": category,
            "content": "Notes from the road.",
            "tags": ["slow travel"]
        })
    }

    fn violation_fields(body: &Value) -> Vec<String> {
        body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["field"].as_str().unwrap().to_string())
            .collect()
    }

    #[actix_web::test]
    async fn issuing_tokens_returns_a_verifiable_pair() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/auth/tokens")
            .set_json(json!({ "userId": "123", "email": "a@b.com", "role": "user" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let pair: TokenPair = test::read_body_json(resp).await;
        assert_eq!(
            state.issuer.verify_access(&pair.access_token).unwrap(),
            payload(Some("user"))
        );
        assert_eq!(
            state.issuer.verify_refresh(&pair.refresh_token).unwrap(),
            payload(Some("user"))
        );
    }

    #[actix_web::test]
    async fn issuing_tokens_reports_every_violation() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/auth/tokens")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "failed");
        assert_eq!(violation_fields(&body), vec!["userId", "email"]);
    }

    #[actix_web::test]
    async fn malformed_json_is_a_validation_failure() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/auth/tokens")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(violation_fields(&body), vec!["body"]);
    }

    #[actix_web::test]
    async fn refresh_returns_a_new_pair() {
        let (state, _) = test_state();
        let app = test_app!(state);
        let original = state.issuer.issue(&payload(None)).unwrap();

        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .set_json(json!({ "refreshToken": original.refresh_token }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let renewed: TokenPair = test::read_body_json(resp).await;
        assert_ne!(renewed.access_token, original.access_token);
        assert_eq!(
            state.issuer.verify_access(&renewed.access_token).unwrap(),
            payload(None)
        );
    }

    #[actix_web::test]
    async fn refresh_rejects_invalid_tokens() {
        let (state, _) = test_state();
        let app = test_app!(state);
        let pair = state.issuer.issue(&payload(None)).unwrap();

        for token in ["not-a-token".to_string(), pair.access_token] {
            let req = test::TestRequest::post()
                .uri("/auth/refresh")
                .set_json(json!({ "refreshToken": token }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }

        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn session_reflects_the_access_token() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/auth/session").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/auth/session")
            .insert_header(bearer(&state, Some("editor")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["userId"], "123");
        assert_eq!(body["data"]["role"], "editor");
    }

    #[actix_web::test]
    async fn failed_steps_keep_the_handler_from_running() {
        let (state, repo) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/blogs")
            .set_json(blog("Lisbon by tram", "Culture"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/blogs")
            .insert_header(bearer(&state, Some("user")))
            .set_json(json!({ "title": "Untitled" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(violation_fields(&body), vec!["author", "category", "content"]);

        assert_eq!(repo.count(Collection::Blogs), 0);
    }

    #[actix_web::test]
    async fn blog_lifecycle() {
        let (state, repo) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/blogs")
            .insert_header(bearer(&state, Some("user")))
            .set_json(blog("Lisbon by tram", "Culture"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();
        let created_at = created["data"]["createdAt"].clone();
        assert_eq!(created["data"]["title"], "Lisbon by tram");

        let req = test::TestRequest::get()
            .uri(&format!("/blogs/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::put()
            .uri(&format!("/blogs/{id}"))
            .insert_header(bearer(&state, Some("user")))
            .set_json(blog("Porto by tram", "Culture"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: Value = test::read_body_json(resp).await;
        assert_eq!(updated["data"]["title"], "Porto by tram");
        assert_eq!(updated["data"]["createdAt"], created_at);

        let req = test::TestRequest::delete()
            .uri(&format!("/blogs/{id}"))
            .insert_header(bearer(&state, Some("user")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(repo.count(Collection::Blogs), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/blogs/{id}"))
            .insert_header(bearer(&state, Some("admin")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/blogs/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn listing_filters_on_whitelisted_query_parameters() {
        let (state, _) = test_state();
        let app = test_app!(state);

        for (title, category) in [("Ramen crawl", "Food"), ("Fjord hike", "Nature")] {
            let req = test::TestRequest::post()
                .uri("/blogs")
                .insert_header(bearer(&state, None))
                .set_json(blog(title, category))
                .to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::CREATED
            );
        }

        let req = test::TestRequest::get()
            .uri("/blogs?category=Food&title=ignored")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["results"], 1);
        assert_eq!(body["data"][0]["title"], "Ramen crawl");

        let req = test::TestRequest::get().uri("/blogs").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["results"], 2);
    }

    #[actix_web::test]
    async fn feedback_is_public_to_post_and_admin_only_to_read() {
        let (state, repo) = test_state();
        let app = test_app!(state);

        let feedback = json!({
            "firstName": "A",
            "lastName": "B",
            "email": "a@b.com",
            "age": 30,
            "country": "X",
            "message": "hi"
        });
        let req = test::TestRequest::post()
            .uri("/feedback")
            .set_json(&feedback)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        for (key, value) in feedback.as_object().unwrap() {
            assert_eq!(&body["data"][key], value);
        }
        assert_eq!(repo.count(Collection::Feedbacks), 1);

        let req = test::TestRequest::get()
            .uri("/feedback")
            .insert_header(bearer(&state, Some("user")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/feedback")
            .insert_header(bearer(&state, Some("admin")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["results"], 1);
    }

    #[actix_web::test]
    async fn duplicate_subscription_conflicts() {
        let (state, repo) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .set_json(json!({ "email": "traveller@example.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .set_json(json!({ "email": " Traveller@Example.com " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(repo.count(Collection::Subscriptions), 1);
    }

    #[actix_web::test]
    async fn elevated_roles_are_granted_by_admins_only() {
        let (state, _) = test_state();
        let app = test_app!(state);
        let grant = |role: &str| json!({ "userId": "42", "email": "x@example.com", "role": role });

        let req = test::TestRequest::post()
            .uri("/auth/tokens")
            .set_json(grant("admin"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/auth/tokens")
            .insert_header(bearer(&state, Some("user")))
            .set_json(grant("editor"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/auth/tokens")
            .insert_header(bearer(&state, Some("admin")))
            .set_json(grant("editor"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let pair: TokenPair = test::read_body_json(resp).await;
        let granted = state.issuer.verify_access(&pair.access_token).unwrap();
        assert_eq!(granted.role.as_deref(), Some("editor"));
    }

    #[actix_web::test]
    async fn self_issued_tokens_cannot_delete_content() {
        let (state, repo) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/blogs")
            .insert_header(bearer(&state, Some("user")))
            .set_json(blog("Lisbon by tram", "Culture"))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/auth/tokens")
            .set_json(json!({ "userId": "x", "email": "x@example.com" }))
            .to_request();
        let pair: TokenPair = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/blogs/{id}"))
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", pair.access_token),
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(repo.count(Collection::Blogs), 1);
    }

    #[actix_web::test]
    async fn cleared_cookie_does_not_hide_the_bearer_header() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::get()
            .uri("/auth/session")
            .cookie(Cookie::new("access_token", ""))
            .insert_header(bearer(&state, Some("user")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unknown_ids_and_methods() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::get()
            .uri("/destinations/does-not-exist")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::patch().uri("/countries").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
