use std::env;

use http::Request;
use http::header::ACCEPT_ENCODING;
use http_body_util::BodyExt;
use micro_decompress::{Decompress, DecompressError, ResponseExt};
use micro_transport::protocol::body::RequestBody;
use micro_transport::transport::Transport;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let uri = env::args().nth(1).unwrap_or_else(|| "http://127.0.0.1:8080/".to_owned());
    let request = match Request::get(&uri).header(ACCEPT_ENCODING, "gzip, deflate, br").body(RequestBody::empty()) {
        Ok(request) => request,
        Err(e) => {
            error!(cause = %e, uri, "invalid request");
            return;
        }
    };

    let transport = Decompress::new();
    let response = match transport.round_trip(request).await {
        Ok(response) => response,
        Err(DecompressError::UnsupportedEncoding(e)) => {
            warn!(encoding = e.encoding(), "server replied with an unsupported encoding, printing it raw");
            e.into_original()
        }
        Err(e) => {
            error!(cause = %e, "request failed");
            return;
        }
    };

    info!(status = %response.status(), decompressed = response.is_decompressed(), "received response");
    match response.into_body().collect().await {
        Ok(collected) => println!("{}", String::from_utf8_lossy(&collected.to_bytes())),
        Err(e) => error!(cause = %e, "failed to read body"),
    }
}
