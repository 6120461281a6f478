//! Websocket endpoint handling
//!
//! Builds the connect URL from the looked-up gateway URL and opens the
//! socket with a bounded wait.

use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::{GatewayError, GatewayResult};

/// Client websocket over plain TCP or TLS
pub type GatewaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Resume parameters for a reconnect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeParams<'a> {
    pub session_id: &'a str,
    pub sequence: u64,
}

/// Build the URL to open
///
/// Keeps every parameter of the looked-up URL (it carries the token), forces
/// `compress=0`, and adds `resume`, `sn` and `session_id` when resuming.
pub fn connect_url(gateway_url: &str, resume: Option<&ResumeParams<'_>>) -> GatewayResult<Url> {
    let mut url = Url::parse(gateway_url)?;
    let overridden = ["compress", "resume", "sn", "session_id"];
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !overridden.contains(&&**key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        query.append_pair("compress", "0");
        if let Some(resume) = resume {
            query.append_pair("resume", "1");
            query.append_pair("sn", &resume.sequence.to_string());
            query.append_pair("session_id", resume.session_id);
        }
    }
    Ok(url)
}

/// Open the socket, failing after `timeout`
pub async fn open(url: &Url, timeout: Duration) -> GatewayResult<GatewaySocket> {
    let (socket, _response) = tokio::time::timeout(timeout, connect_async(url.as_str()))
        .await
        .map_err(|_| GatewayError::ConnectTimeout(timeout))??;
    Ok(socket)
}
