//! Integration tests for wayfinder
//!
//! These tests drive the public router API end to end over an in-memory
//! history: matching, the hook lifecycle, navigation queueing, URL
//! generation, history integration and link handling.

use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use wayfinder::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn push(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// ============================================================================
// Matching Tests
// ============================================================================

#[test]
fn test_match_is_deterministic() {
    init_logging();
    let router = Router::new("/");
    router.on("/users/:id", |_| {}).on("/users/*", |_| {});

    let first = router.match_path("/users/12").unwrap();
    let second = router.match_path("/users/12").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].route.name(), "users/:id");
}

#[test]
fn test_parameter_capture() {
    let router = Router::new("/");
    router.on("/users/:id/posts/:post", |_| {});

    let m = &router.match_path("/users/ada%20l/posts/3").unwrap()[0];
    let data = m.data.as_ref().unwrap();
    assert_eq!(data.get("id"), Some("ada l"));
    assert_eq!(data.get_as::<u32>("post"), Some(3));
}

#[test]
fn test_query_parsing() {
    let router = Router::new("/");
    router.on("/search", |_| {});

    let m = &router.match_path("search?q=test&x=1").unwrap()[0];
    assert_eq!(m.url, "search");
    assert_eq!(m.query_string, "q=test&x=1");
    let params = m.params.as_ref().unwrap();
    assert_eq!(params.get("q"), Some("test"));
    assert_eq!(params.get("x"), Some("1"));
    assert!(m.data.is_none());
}

#[test]
fn test_custom_route_is_matched_fresh() {
    let router = Router::new("/");
    let open = Rc::new(Cell::new(false));

    let gate = open.clone();
    router.on_pattern(
        RoutePath::custom("gate", move |path| (gate.get() && path == "gate").then(RouteParams::new)),
        |_: &Match| {},
        RouteHooks::new(),
        None,
    );

    assert!(router.match_path("gate").is_none());
    open.set(true);
    assert_eq!(router.match_path("gate").unwrap()[0].route.name(), "gate");
}

#[test]
fn test_regex_and_custom_routes() {
    let router = Router::new("/");
    router.on_pattern(
        RoutePath::regex(r"^orders/(?P<order>\d+)$").unwrap(),
        |_: &Match| {},
        RouteHooks::new(),
        Some("order".to_string()),
    );
    router.on_pattern(
        RoutePath::custom("even", |path| {
            let n: u32 = path.parse().ok()?;
            (n % 2 == 0).then(|| RouteParams::new().with("n", n))
        }),
        |_: &Match| {},
        RouteHooks::new(),
        None,
    );

    let m = &router.match_path("/orders/15").unwrap()[0];
    assert_eq!(m.data.as_ref().unwrap().get("order"), Some("15"));

    let m = &router.match_path("/4").unwrap()[0];
    assert_eq!(m.route.name(), "even");
    assert!(router.match_path("/5").is_none());
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[test]
fn test_hook_order() {
    init_logging();
    let router = Router::new("/");
    let events = log();

    let (e1, e2, e3, e4) = (events.clone(), events.clone(), events.clone(), events.clone());
    router.on_with(
        "/a",
        move |_| push(&e1, "handler a"),
        RouteHooks::new()
            .before(move |done, _| {
                push(&e2, "before a");
                done.proceed();
            })
            .after(move |_| push(&e3, "after a"))
            .leave(move |done, matches| {
                push(&e4, format!("leave a -> {}", matches[0].url));
                done.proceed();
            }),
    );
    let e5 = events.clone();
    router.on("/b", move |_| push(&e5, "handler b"));

    router.navigate("/a", None);
    router.navigate("/b", None);

    assert_eq!(
        entries(&events),
        vec!["before a", "handler a", "after a", "handler b", "leave a -> b"]
    );
}

#[test]
fn test_before_hook_veto() {
    let router = Router::new("/");
    let handled = Rc::new(Cell::new(false));

    let flag = handled.clone();
    router.on_with(
        "/admin",
        move |_| flag.set(true),
        RouteHooks::new().before(|done, _| done.veto()),
    );

    router.navigate("/admin", None);
    assert!(!handled.get());
    assert!(router.last_resolved().is_none());
    assert!(router.last_outcome().unwrap().is_vetoed());
    assert!(!router.is_busy());

    let resolved = router.resolve(Some("/admin"), None).unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].url, "admin");
    assert!(!handled.get());
    assert!(router.last_resolved().is_none());
}

#[test]
fn test_leave_hook_veto_keeps_current() {
    let router = Router::new("/");
    router.on_with(
        "/form",
        |_| {},
        RouteHooks::new().leave(|done, _| done.resolve(false)),
    );
    router.on("/home", |_| {});

    router.navigate("/form", None);
    router.navigate("/home", None);

    assert_eq!(router.last_resolved().unwrap()[0].url, "form");
    assert!(router.last_outcome().unwrap().is_vetoed());
}

#[test]
fn test_navigation_is_serialized() {
    init_logging();
    let router = Router::new("/");
    let events = log();
    let pending: Rc<RefCell<Option<Done>>> = Rc::new(RefCell::new(None));

    let (e1, e2) = (events.clone(), events.clone());
    let slot = pending.clone();
    router.on_with(
        "/slow",
        move |_| push(&e1, "slow"),
        RouteHooks::new().before(move |done, _| *slot.borrow_mut() = Some(done)),
    );
    router.on("/fast", move |_| push(&e2, "fast"));

    router.navigate("/slow", None);
    assert!(router.is_busy());

    router.navigate("/fast", None);
    assert_eq!(router.pending(), 1);
    assert!(router.last_outcome().unwrap().path().contains("fast"));
    assert!(entries(&events).is_empty());

    let done = pending.borrow_mut().take().unwrap();
    done.proceed();

    assert_eq!(entries(&events), vec!["slow", "fast"]);
    assert_eq!(router.last_resolved().unwrap()[0].url, "fast");
    assert_eq!(router.pending(), 0);
    assert!(!router.is_busy());
}

#[test]
fn test_long_queue_drains_without_recursion() {
    let router = Router::new("/");
    let handled = Rc::new(Cell::new(0));

    let inner = router.clone();
    router.on("/start", move |_| {
        for i in 0..10_000 {
            inner.navigate(&format!("/n/{}", i), None);
        }
    });
    let h = handled.clone();
    router.on("/n/:i", move |_| h.set(h.get() + 1));

    router.navigate("/start", None);

    assert_eq!(handled.get(), 10_000);
    assert_eq!(router.pending(), 0);
    assert!(!router.is_busy());
    assert_eq!(router.last_resolved().unwrap()[0].url, "n/9999");
}

#[test]
fn test_repeated_navigation_is_noop() {
    let router = Router::new("/");
    let handled = Rc::new(Cell::new(0));
    let already = Rc::new(Cell::new(0));

    let (h, a) = (handled.clone(), already.clone());
    router.on_with(
        "/page",
        move |_| h.set(h.get() + 1),
        RouteHooks::new().already(move |_| a.set(a.get() + 1)),
    );

    router.navigate("/page", None);
    let before = router.last_resolved();
    router.navigate("/page", None);
    assert_eq!(router.last_resolved(), before);
    assert_eq!(handled.get(), 1);
    assert_eq!(already.get(), 1);
    assert!(router.last_outcome().unwrap().is_noop());

    router.navigate("/page", Some(NavigateOptions::default().force(true)));
    assert_eq!(handled.get(), 2);
}

#[test]
fn test_not_found_fallback() {
    let router = Router::new("/");
    let missing = log();

    let m = missing.clone();
    router.on("/home", |_| {});
    router.not_found(move |matched| push(&m, matched.url.clone()));

    router.navigate("/nowhere?x=1", None);
    assert_eq!(entries(&missing), vec!["nowhere"]);
    let current = router.last_resolved().unwrap();
    assert_eq!(current[0].route.name(), NOT_FOUND_ROUTE_NAME);
    assert_eq!(current[0].params.as_ref().unwrap().get("x"), Some("1"));
}

#[test]
fn test_unmatched_without_not_found() {
    let router = Router::new("/");
    router.on("/home", |_| {});
    router.navigate("/home", None);

    let options = NavigateOptions::default()
        .resolve_options(ResolveOptions::default().no_match_warning(true));
    router.navigate("/nowhere", Some(options));
    assert!(router.last_resolved().is_none());
    assert!(router.last_outcome().unwrap().is_not_found());
}

#[test]
fn test_panicking_handler_releases_router() {
    init_logging();
    let router = Router::new("/");
    router.on("/boom", |_| panic!("handler failed"));
    router.on("/ok", |_| {});

    let result = catch_unwind(AssertUnwindSafe(|| router.navigate("/boom", None)));
    assert!(result.is_err());
    assert!(!router.is_busy());
    assert_eq!(
        router.last_outcome(),
        Some(NavigationOutcome::Panicked {
            path: "/boom".to_string()
        })
    );

    router.navigate("/ok", None);
    assert_eq!(router.last_resolved().unwrap()[0].url, "ok");
}

#[test]
fn test_hook_deregistration() {
    let router = Router::new("/");
    let calls = Rc::new(Cell::new(0));
    router.on("/a", |_| {});

    let c = calls.clone();
    let handle = router.add_before_hook("a", move |done, _| {
        c.set(c.get() + 1);
        done.proceed();
    });
    assert!(handle.is_active());

    let force = || Some(NavigateOptions::default().force(true));
    router.navigate("/a", force());
    assert!(handle.clone().remove());
    router.navigate("/a", force());
    assert_eq!(calls.get(), 1);
    assert!(!handle.remove());
}

// ============================================================================
// Registration and Generation Tests
// ============================================================================

#[test]
fn test_route_map_registration() {
    let router = Router::new("/");
    let events = log();

    let (e1, e2) = (events.clone(), events.clone());
    router.on_map(vec![
        ("/about", RouteSpec::new(move |_| push(&e1, "about"))),
        (
            "/users/:id",
            RouteSpec::new(move |m| {
                let id = m.data.as_ref().and_then(|d| d.get("id")).unwrap_or_default();
                push(&e2, format!("user {}", id));
            })
            .name("user"),
        ),
    ]);

    assert!(router.navigate_by_name("user", Some(&RouteParams::new().with("id", 9)), None));
    router.navigate("/about", None);
    assert_eq!(entries(&events), vec!["user 9", "about"]);
}

#[test]
fn test_name_generation() {
    let router = Router::new("/");
    router.on_named("users/:id", |_| {}, RouteHooks::new(), "user");
    let data = RouteParams::new().with("id", 7);

    assert_eq!(
        router.generate("user", Some(&data), GenerateOptions::default()),
        Some("/users/7".to_string())
    );
    assert_eq!(
        router.generate("user", Some(&data), GenerateOptions::without_root()),
        Some("users/7".to_string())
    );
    assert_eq!(router.generate("nobody", Some(&data), GenerateOptions::default()), None);
}

// ============================================================================
// History Tests
// ============================================================================

#[test]
fn test_pop_state_resolves_location() {
    init_logging();
    let history = Rc::new(MemoryHistory::new("/"));
    let router = Router::with_platform("/", history.clone());
    let events = log();

    let (e1, e2) = (events.clone(), events.clone());
    router.on("/one", move |_| push(&e1, "one")).on("/two", move |_| push(&e2, "two"));
    router.listen();

    router.navigate("/one", None);
    router.navigate("/two", None);
    assert_eq!(history.len(), 3);

    assert!(history.back());
    assert_eq!(router.last_resolved().unwrap()[0].url, "one");
    assert_eq!(history.len(), 3);
    assert_eq!(entries(&events), vec!["one", "two", "one"]);
}

#[test]
fn test_hash_mode() {
    let history = Rc::new(MemoryHistory::new("/"));
    let router = Router::with_options("/", RouterOptions::default().hash(true), history.clone());
    router.on("/users/:id", |_| {});

    router.navigate("/users/1", None);
    assert_eq!(history.current_entry().url, "/#/users/1");

    let matches = router.resolve(None, None).unwrap();
    assert_eq!(matches[0].data.as_ref().unwrap().get("id"), Some("1"));
}

#[test]
fn test_without_push_state_sets_location() {
    let history = Rc::new(MemoryHistory::without_push_state("/"));
    let router = Router::with_platform("/", history.clone());
    router.on("/a", |_| {});

    router.navigate("/a", None);
    assert_eq!(history.current_entry().url, "/a");

    router.listen();
    assert_eq!(history.listener_count(), 0);
}

// ============================================================================
// Link Tests
// ============================================================================

#[test]
fn test_link_handling() {
    let history = Rc::new(MemoryHistory::new("/"));
    let router = Router::with_platform("/", history.clone());
    let events = log();

    let e = events.clone();
    router.on("/about", move |m| push(&e, format!("about {}", m.query_string)));

    history.set_links(vec![
        LinkElement::anchor("/about").navigo(""),
        LinkElement::anchor("/external").navigo("false"),
        LinkElement::anchor("/popup").target("_blank"),
    ]);
    assert_eq!(router.find_links().len(), 3);
    assert_eq!(router.update_page_links().len(), 1);

    let absolute = LinkElement::anchor("https://example.com/about?ref=nav");
    assert!(router.handle_link_click(&absolute, ClickModifiers::default()));
    assert_eq!(history.current_entry().url, "/about?ref=nav");

    let ctrl = ClickModifiers { ctrl: true, meta: false };
    assert!(!router.handle_link_click(&LinkElement::anchor("/about"), ctrl));

    let quiet = LinkElement::anchor("/about").options("updateBrowserURL:false,force:true");
    assert!(router.handle_link_click(&quiet, ClickModifiers::default()));
    assert_eq!(history.len(), 2);
    assert_eq!(entries(&events), vec!["about ref=nav", "about "]);
}

#[derive(Default)]
struct CountingPlatform {
    link_queries: Cell<usize>,
}

impl Platform for CountingPlatform {
    fn query_links(&self, _selector: &str) -> Vec<LinkElement> {
        self.link_queries.set(self.link_queries.get() + 1);
        Vec::new()
    }
}

#[test]
fn test_navigation_does_not_query_links() {
    let platform = Rc::new(CountingPlatform::default());
    let router = Router::with_platform("/", platform.clone());
    router.on("/a", |_| {}).on("/b", |_| {});

    router.navigate("/a", None);
    router.resolve(Some("/b"), None);
    assert_eq!(platform.link_queries.get(), 0);

    assert!(router.update_page_links().is_empty());
    assert_eq!(platform.link_queries.get(), 1);
}
