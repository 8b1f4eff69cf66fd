use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Root of the manager's HTTP API, e.g. `http://127.0.0.1:8964`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// A speed test downloads through the node, so it gets its own budget.
    pub test_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8964".to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(15),
            test_timeout: Duration::from_secs(30),
        }
    }
}
