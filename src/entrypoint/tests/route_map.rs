//! Tests for route-map selection, residual routes, params and filters

use super::*;
use crate::{Live, RenderMethod, RouteFilter, RouteMap, render_static};
use url::Url;

fn map<const N: usize>(entries: [(&str, Entrypoint); N]) -> Entrypoint {
    RouteMap::try_from_iter(entries).unwrap().into()
}

#[tokio::test]
async fn test_longest_literal_wins() {
    let site = map([("/a", "E1".into()), ("/a/b", "E2".into())]);
    assert_eq!(text_of(&resolve(&site, "/a/b").await.unwrap()), "E2");

    let site = map([("/a/*", "E1".into()), ("/a/b", "E2".into())]);
    assert_eq!(text_of(&resolve(&site, "/a/b").await.unwrap()), "E2");
}

#[tokio::test]
async fn test_equal_length_keys_use_first_declared() {
    let site = map([("/a", "E1".into()), ("/a", "E2".into())]);
    assert_eq!(text_of(&resolve(&site, "/a").await.unwrap()), "E1");

    let site = map([("/:first", "E1".into()), ("/:other", "E2".into())]);
    assert_eq!(text_of(&resolve(&site, "/x").await.unwrap()), "E1");
}

#[tokio::test]
async fn test_wildcard_hands_residual_route_down() {
    let (handler, seen) = recording_handler();
    let site = map([("/a/*", handler)]);
    let resolved = resolve(&site, "/a/b/c").await.unwrap();

    assert_eq!(text_of(&resolved), "/b/c");
    assert_eq!(seen.lock().unwrap().as_slice(), &[route("/b/c")]);
}

#[tokio::test]
async fn test_exact_key_resets_residual_route() {
    let (handler, seen) = recording_handler();
    let site = map([("/a", handler)]);
    let resolved = resolve(&site, "/a").await.unwrap();

    assert!(resolved.remaining_route.is_root());
    assert!(seen.lock().unwrap()[0].is_root());
}

#[tokio::test]
async fn test_nested_route_maps() {
    let docs = map([("/", "Docs index".into()), ("/intro", "Intro".into())]);
    let site = map([("/", "Home".into()), ("/docs/*", docs)]);

    assert_eq!(text_of(&resolve(&site, "/docs/intro").await.unwrap()), "Intro");
    assert_eq!(text_of(&resolve(&site, "/docs/").await.unwrap()), "Docs index");
    assert_eq!(text_of(&resolve(&site, "/").await.unwrap()), "Home");
}

#[tokio::test]
async fn test_redirect_entry_resolves_to_found_payload() {
    let target = Url::parse("https://example.com/new-home").unwrap();
    let site = map([
        ("/", "Home".into()),
        ("/old-home", Entrypoint::redirect(&target).unwrap()),
    ]);
    let resolved = resolve(&site, "/old-home").await.unwrap();

    assert_eq!(resolved.render_method, RenderMethod::Raw);
    let Some(Content::Raw(payload)) = &resolved.content else {
        panic!("expected a raw payload, got {:?}", resolved.content);
    };
    assert_eq!(payload.status, axum::http::StatusCode::FOUND);
    assert_eq!(
        payload.headers[axum::http::header::LOCATION],
        "https://example.com/new-home"
    );
    assert!(payload.body.is_empty());
}

#[tokio::test]
async fn test_no_match_is_absent_dynamic_content() {
    let site = map([("/a", "A".into())]);
    let resolved = resolve(&site, "/missing").await.unwrap();
    assert!(resolved.is_not_found());
    assert!(resolved.resolved);
    assert_eq!(resolved.render_method, RenderMethod::Dynamic);
}

#[tokio::test]
async fn test_outer_preset_overrides_no_match_method() {
    let site = render_static(map([("/a", "A".into())]));
    let resolved = resolve(&site, "/b").await.unwrap();
    assert!(resolved.is_not_found());
    assert_eq!(resolved.render_method, RenderMethod::Static);
}

#[tokio::test]
async fn test_params_reach_generator() {
    let user = Entrypoint::generator(|cx: Context, params| async move {
        assert_eq!(cx.param("id"), params.get("id").map(String::as_str));
        let key = cx.url_match.as_ref().map(|m| m.key().to_string());
        Ok::<_, Error>(Entrypoint::from(format!(
            "user {} via {}",
            params["id"],
            key.unwrap_or_default()
        )))
    });
    let site = map([("/users/:id", user)]);
    let resolved = resolve(&site, "/users/42").await.unwrap();
    assert_eq!(text_of(&resolved), "user 42 via /users/:id");
}

#[tokio::test]
async fn test_params_accumulate_across_levels() {
    let leaf = Entrypoint::generator(|cx: Context, _params| async move {
        Ok::<_, Error>(Entrypoint::from(format!(
            "{}/{}",
            cx.param("org").unwrap_or("?"),
            cx.param("repo").unwrap_or("?")
        )))
    });
    let inner = map([("/:repo", leaf)]);
    let site = map([("/:org/*", inner)]);
    let resolved = resolve(&site, "/rust-lang/cargo").await.unwrap();
    assert_eq!(text_of(&resolved), "rust-lang/cargo");
}

#[tokio::test]
async fn test_live_entry_is_read_at_match_time() {
    let page = Live::new(Entrypoint::from("v1"));
    let site = map([("/page", page.clone().into())]);

    assert_eq!(text_of(&resolve(&site, "/page").await.unwrap()), "v1");
    page.set("v2".into());
    assert_eq!(text_of(&resolve(&site, "/page").await.unwrap()), "v2");
}

#[tokio::test]
async fn test_filter_used_when_no_key_matches() {
    let german = RouteFilter::new("german", |cx: Context| async move { cx.language == "de" });
    let site: Entrypoint = RouteMap::new()
        .route("/about", "About")
        .unwrap()
        .filter(german, "Willkommen")
        .into();

    let context = Context::for_route(route("/anything")).with_language("de");
    let resolved = resolver()
        .resolve_entrypoint_route(&site, route("/anything"), context, false)
        .await
        .unwrap();
    assert_eq!(text_of(&resolved), "Willkommen");

    // a matching key takes precedence over filters
    let context = Context::for_route(route("/about")).with_language("de");
    let resolved = resolver()
        .resolve_entrypoint_route(&site, route("/about"), context, false)
        .await
        .unwrap();
    assert_eq!(text_of(&resolved), "About");
}

#[tokio::test]
async fn test_filter_overrides_bare_wildcard() {
    let always = RouteFilter::new("always", |_cx: Context| async { true });
    let site: Entrypoint = RouteMap::new()
        .route("*", "Fallback")
        .unwrap()
        .filter(always, "Filtered")
        .into();
    let resolved = resolve(&site, "/x").await.unwrap();
    assert_eq!(text_of(&resolved), "Filtered");
}

#[tokio::test]
async fn test_failing_filter_falls_back_to_wildcard() {
    let never = RouteFilter::new("never", |_cx: Context| async { false });
    let site: Entrypoint = RouteMap::new()
        .filter(never, "Filtered")
        .route("*", "Fallback")
        .unwrap()
        .into();
    let resolved = resolve(&site, "/x").await.unwrap();
    assert_eq!(text_of(&resolved), "Fallback");
}

#[tokio::test]
async fn test_absolute_key_uses_base_origin() {
    let site = map([
        ("https://localhost/admin/*", "Admin".into()),
        ("/*", "Public".into()),
    ]);
    // base origin defaults to http://localhost; the scheme matches either way
    assert_eq!(text_of(&resolve(&site, "/admin/users").await.unwrap()), "Admin");
    assert_eq!(text_of(&resolve(&site, "/blog").await.unwrap()), "Public");
}

#[tokio::test]
async fn test_absolute_key_uses_request_url() {
    let site = map([
        ("https://:tenant.example.com/*", "Tenant".into()),
        ("/*", "Default".into()),
    ]);
    let context = Context::for_route(route("/home"))
        .with_url(Url::parse("https://acme.example.com/home").unwrap());
    let resolved = resolver()
        .resolve_entrypoint_route(&site, route("/home"), context, false)
        .await
        .unwrap();
    assert_eq!(text_of(&resolved), "Tenant");
}

#[tokio::test]
async fn test_context_factory_runs_once_for_nested_maps() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let source = ContextSource::factory(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Context::for_route(route("/a/b/c"))
    });

    let leaf = map([("/c", "C".into())]);
    let middle = map([("/b/*", leaf)]);
    let site = map([("/a/*", middle)]);

    let resolved = resolver()
        .resolve_entrypoint_route(&site, route("/a/b/c"), source, false)
        .await
        .unwrap();
    assert_eq!(text_of(&resolved), "C");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
