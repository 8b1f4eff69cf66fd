use std::sync::Arc;
use std::time::Duration;

use creeper_core::{SpeedRecord, TestRequest};
use serde_json::Value;

use crate::{parse_speed_report, ApiClient, ApiError};

/// Measures one node.
#[async_trait::async_trait]
pub trait TestExecutor: Send + Sync {
    async fn run_test(&self, request: &TestRequest) -> Result<SpeedRecord, ApiError>;
}

/// Asks the manager to start the node's backend and download through it.
#[derive(Debug, Clone)]
pub struct HttpTestExecutor {
    client: Arc<ApiClient>,
    timeout: Duration,
}

impl HttpTestExecutor {
    pub fn new(client: Arc<ApiClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait::async_trait]
impl TestExecutor for HttpTestExecutor {
    async fn run_test(&self, request: &TestRequest) -> Result<SpeedRecord, ApiError> {
        let mut body = request.params.to_json();
        body.insert("uid".to_string(), Value::String(request.node_id.clone()));

        let response = self
            .client
            .post_json("api/test_speed", &body, Some(self.timeout))
            .await?;
        parse_speed_report(response)
    }
}
