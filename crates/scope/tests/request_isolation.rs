use async_trait::async_trait;
use bitrise_mcp_scope::{
    ENABLED_API_GROUPS_HEADER, GroupMap, InboundRequest, ListTools, RequestContext,
    RequestScopeLayer, ToolProvider,
};
use http::{HeaderMap, HeaderValue, Request};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower::{Layer as _, ServiceExt as _, service_fn};

/// Provider whose first call parks until released, so another request can run in between.
struct GatedProvider {
    tools: Vec<String>,
    entered: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedProvider {
    fn new(tools: &[&str]) -> (Self, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let provider = Self {
            tools: tools.iter().map(|s| (*s).to_string()).collect(),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
        };
        (provider, entered_rx, release_tx)
    }
}

#[async_trait]
impl ToolProvider for GatedProvider {
    type Tool = String;
    type Error = Infallible;

    async fn list_tools(&self) -> Result<Vec<String>, Infallible> {
        let entered = self.entered.lock().take();
        if let Some(tx) = entered {
            let _ = tx.send(());
        }
        let release = self.release.lock().take();
        if let Some(rx) = release {
            let _ = rx.await;
        }
        Ok(self.tools.clone())
    }
}

fn groups() -> GroupMap {
    GroupMap::from_memberships([
        ("list_apps", vec!["g1"]),
        ("get_app", vec!["g1"]),
        ("list_builds", vec!["g2"]),
    ])
}

fn request_for(groups_header: &'static str) -> Option<Arc<InboundRequest>> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ENABLED_API_GROUPS_HEADER,
        HeaderValue::from_static(groups_header),
    );
    Some(Arc::new(InboundRequest::from_headers(headers)))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn interleaved_requests_on_separate_tasks_do_not_cross_contaminate() {
    let (provider, entered, release) =
        GatedProvider::new(&["list_apps", "list_builds", "get_app"]);
    let listing = Arc::new(ListTools::new(provider, groups()));

    // R1 starts and parks inside the provider.
    let r1 = tokio::spawn({
        let listing = Arc::clone(&listing);
        RequestContext::scope(request_for("g1"), async move { listing.call().await })
    });
    entered.await.expect("R1 reached the provider");

    // R2 runs to completion while R1 is suspended.
    let r2 = RequestContext::scope(request_for("g2"), listing.call())
        .await
        .expect("infallible");
    assert_eq!(r2, vec!["list_builds".to_string()]);

    // R1 resumes and still sees its own header.
    release.send(()).expect("R1 still waiting");
    let r1 = r1.await.expect("join").expect("infallible");
    assert_eq!(r1, vec!["list_apps".to_string(), "get_app".to_string()]);

    assert!(RequestContext::get().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn interleaved_requests_on_one_task_do_not_cross_contaminate() {
    let (provider, entered, release) =
        GatedProvider::new(&["list_apps", "list_builds", "get_app"]);
    let listing = ListTools::new(provider, groups());

    let r1 = RequestContext::scope(request_for("g1"), listing.call());
    let r2_then_release = async {
        entered.await.expect("R1 reached the provider");
        let r2 = RequestContext::scope(request_for("g2"), listing.call()).await;
        release.send(()).expect("R1 still waiting");
        r2
    };

    let (r1, r2) = tokio::join!(r1, r2_then_release);
    assert_eq!(
        r1.expect("infallible"),
        vec!["list_apps".to_string(), "get_app".to_string()]
    );
    assert_eq!(r2.expect("infallible"), vec!["list_builds".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn middleware_isolates_many_concurrent_requests() {
    let listing = Arc::new(ListTools::new(
        bitrise_mcp_scope::ToolCatalog::new(
            vec![
                "list_apps".to_string(),
                "list_builds".to_string(),
                "get_app".to_string(),
            ],
            GroupMap::default(),
        )
        .expect("unique names"),
        groups(),
    ));

    let svc = RequestScopeLayer::new().layer(service_fn(move |_req: Request<()>| {
        let listing = Arc::clone(&listing);
        async move {
            tokio::task::yield_now().await;
            listing.call().await
        }
    }));

    let mut handles = Vec::new();
    for i in 0..64 {
        let svc = svc.clone();
        let header = if i % 2 == 0 { "g1" } else { "g2" };
        handles.push(tokio::spawn(async move {
            let req = Request::builder()
                .header(ENABLED_API_GROUPS_HEADER, header)
                .body(())
                .expect("request");
            (header, svc.oneshot(req).await.expect("infallible"))
        }));
    }

    for handle in handles {
        let (header, visible) = handle.await.expect("join");
        let expected: Vec<String> = match header {
            "g1" => vec!["list_apps".to_string(), "get_app".to_string()],
            _ => vec!["list_builds".to_string()],
        };
        assert_eq!(visible, expected, "request with header {header}");
    }
}

#[tokio::test]
async fn listing_outside_any_request_is_unfiltered() {
    let (provider, _entered, release) = GatedProvider::new(&["list_apps", "list_builds"]);
    release.send(()).expect("receiver alive");
    let listing = ListTools::new(provider, groups());

    let visible = listing.call().await.expect("infallible");
    assert_eq!(visible, vec!["list_apps".to_string(), "list_builds".to_string()]);
}
