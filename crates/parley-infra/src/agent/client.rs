//! HTTP client for the refund agent service.

use parley_core::agent::{AgentClient, ReplyStream};

use super::stream::create_reply_stream;

/// `AgentClient` implementation over HTTP.
///
/// Connects eagerly but never bounds the body: replies stream for as
/// long as the service keeps the connection open.
pub struct HttpAgentClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAgentClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AgentClient for HttpAgentClient {
    fn stream_reply(&self, message: &str) -> ReplyStream {
        create_reply_stream(&self.client, &self.endpoint, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_preserved() {
        let client = HttpAgentClient::new("http://localhost:8080/refund");
        assert_eq!(client.endpoint(), "http://localhost:8080/refund");
    }
}
