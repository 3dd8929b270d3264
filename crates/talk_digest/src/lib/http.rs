use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::{types::ProxyCredential, Error};

/// Rotating-proxy endpoint used when a proxy credential is supplied.
const WEBSHARE_PROXY_URL: &str = "http://p.webshare.io:80";

const MAX_TRANSIENT_RETRIES: u32 = 3;

/// HTTP client with bounded exponential-backoff retry for transient
/// failures (transport errors, 5xx, 429).
pub(crate) fn retrying_client() -> ClientWithMiddleware {
    wrap_with_retry(reqwest::Client::new())
}

/// Same retry behavior, with all requests routed through the proxy.
pub(crate) fn retrying_client_with_proxy(
    credential: &ProxyCredential,
) -> Result<ClientWithMiddleware, Error> {
    let proxy = reqwest::Proxy::all(WEBSHARE_PROXY_URL)?
        .basic_auth(&credential.username, &credential.password);
    let client = reqwest::Client::builder().proxy(proxy).build()?;
    Ok(wrap_with_retry(client))
}

fn wrap_with_retry(client: reqwest::Client) -> ClientWithMiddleware {
    let policy = ExponentialBackoff::builder().build_with_max_retries(MAX_TRANSIENT_RETRIES);
    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(policy))
        .build()
}
