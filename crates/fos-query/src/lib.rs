//! fOS Query
//!
//! A small DOM helper library: element selection, event binding and
//! dispatch, class/style/content manipulation, a query-string codec and
//! an AJAX helper. It runs against injected capabilities instead of a live
//! browser: a [`DomHost`] for the document and a
//! [`TransportProvider`](fos_net::TransportProvider) for HTTP.
//!
//! # Example
//! ```rust,ignore
//! use fos_query::{query, Page};
//!
//! let page = Page::parse("<ul><li class='a'>one</li><li>two</li></ul>")?;
//! query(&page, "li").add_class("item").hide();
//! assert!(query(&page, "li.a").has_class("item"));
//! ```

mod ajax;
mod events;
mod extend;
mod host;
mod manipulation;
mod querystring;
mod wrapper;

pub use ajax::{ajax, AjaxConfig, AjaxError, CompleteCallback, ErrorCallback, Payload, RequestData, SuccessCallback};
pub use events::{attach, dispatch, HandlerResult};
pub use extend::extend;
pub use host::{DomHost, HostError, Page};
pub use querystring::{kvjoin, kvjoin_default, urlcat};
pub use wrapper::{query, query_all, ready, select, Target, Wrapper};

// Re-export sub-crates for advanced usage
pub use fos_dom as dom;
pub use fos_html as html;
pub use fos_net as net;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
