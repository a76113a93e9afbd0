use std::time::Duration;
use watch_hooks::hooks::loading::{Loading, LoadingOptions, Message};
use watch_hooks::hooks::route_query::{QueryWatchOptions, on_route_query_change};
use watch_hooks::notify::{Notifier, Notify};
use watch_hooks::router::{Route, Router, query};
use watch_hooks::scope::Scope;

struct ConsoleNotify;

impl Notify for ConsoleNotify {
    fn success(&self, text: &str) {
        println!("[ok]  {text}");
    }

    fn error(&self, text: &str) {
        println!("[err] {text}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let notifier = Notifier::new(ConsoleNotify);

    let loading = Loading::with_notifier(
        LoadingOptions {
            with_success_msg: Some(true),
            with_error_msg: Some(true),
            success_msg: Some(Message::derived(|n: &usize| format!("fetched {n} records"))),
            ..Default::default()
        },
        notifier,
    );

    println!("loading: {}", loading.is_loading());
    let pending = loading.run(async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(42usize)
    });
    println!("loading: {}", loading.is_loading());
    pending.await?;
    println!("loading: {}", loading.is_loading());

    let router = Router::new(Route::new("/search"));
    let scope = Scope::new();
    on_route_query_change(
        &router,
        &scope,
        |q| println!("query is now {q:?}"),
        QueryWatchOptions {
            dependencies: Some(vec!["page".into()]),
            ..Default::default()
        },
    );

    router.update_query(|q| {
        q.insert("page".into(), "2".into());
    });
    router.set_query(query([("page", "2"), ("order", "desc")]));
    tokio::task::yield_now().await;

    Ok(())
}
