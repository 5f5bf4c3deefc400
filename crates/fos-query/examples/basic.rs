//! Example: Basic usage of fOS Query
//!
//! Run with `RUST_LOG=debug` to see requests and dispatches.

use fos_query::dom::Event;
use fos_query::net::{EventLoop, ScriptedOutcome, ScriptedProvider};
use fos_query::{ajax, query, ready, AjaxConfig, Page};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("fOS Query v{}", fos_query::VERSION);

    let page = Page::parse(
        "<ul id='list'><li class='item'>One</li><li class='item done'>Two</li></ul>\
         <button id='more'>More</button>",
    )?;

    ready(&page, || println!("document ready"));
    page.finish_loading();

    let items = query(&page, "#list .item");
    items.add_class("seen").css([("color", "navy")]);
    query(&page, ".done").hide();
    println!("{} items, first: {:?}", items.len(), items.text());

    query(&page, "#more").on("click", |e: &mut Event| {
        println!("clicked {:?}", e.target);
        false
    });
    query(&page, "#more").trigger("click");

    // Requests go to a scripted backend so the example runs offline
    let event_loop = EventLoop::new();
    let provider = ScriptedProvider::new(event_loop.clone());
    provider.enqueue(ScriptedOutcome::json(r#"{"items": ["Three", "Four"]}"#));

    ajax(
        &provider,
        AjaxConfig::new("https://example.com/items")
            .fields(json!({"page": 2, "filter": ""}))
            .asynchronous(true)
            .success(|payload, status, _| println!("success ({}): {:?}", status, payload))
            .error(|_, status, fault| println!("error ({}): {:?}", status, fault))
            .complete(|t, _| println!("complete, status {}", t.status())),
    );
    event_loop.run_until_idle();

    for request in provider.requests() {
        println!("sent {} {}", request.method, request.url);
    }
    println!("{}", query(&page, "#list").html().unwrap_or_default());
    Ok(())
}
