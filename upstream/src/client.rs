use crate::error::UpstreamResult;
use common::types::config::UpstreamConfig;
use url::Url;

/// Client settings both upstreams share: the configured user agent and a timeout per request
pub(crate) fn client_builder(config: &UpstreamConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
}

/// `path` below the base URL, whether or not the base ends with a slash
pub(crate) fn join_endpoint(base_url: &Url, path: &str) -> UpstreamResult<Url> {
    let base = base_url.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{}/{}", base, path))?)
}
