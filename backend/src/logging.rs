use std::time::Instant;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, honouring `RUST_LOG` and defaulting to
/// `info`. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[derive(Clone, Copy)]
struct RequestStart(Option<Instant>);

/// Logs one line per HTTP request with its status and latency.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _: &mut Data<'_>) {
        req.local_cache(|| RequestStart(Some(Instant::now())));
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let start = req.local_cache(|| RequestStart(None));
        let duration_ms = start.0.map(|s| s.elapsed().as_millis() as u64).unwrap_or_default();

        info!(
            method = %req.method(),
            path = %req.uri().path(),
            query = req.uri().query().map(|q| q.as_str()).unwrap_or(""),
            status = res.status().code,
            duration_ms,
            client_ip = ?req.client_ip(),
            user_agent = req.headers().get_one("User-Agent").unwrap_or(""),
            "http request"
        );
    }
}
