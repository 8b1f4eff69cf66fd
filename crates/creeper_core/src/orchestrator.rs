use creeper_logging::creeper_debug;

use crate::{ConnParams, FeedId, NodeId, ProxyNode, RunId, SpeedRecord, SpeedRecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Ask the executor to test one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRequest {
    pub feed_id: FeedId,
    pub node_id: NodeId,
    /// `None` for a single-node test outside of a run.
    pub run: Option<RunId>,
    pub generation: u64,
    pub params: ConnParams,
}

/// Executor answer for a [`TestRequest`]. `record` is `None` on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCompletion {
    pub feed_id: FeedId,
    pub node_id: NodeId,
    pub run: Option<RunId>,
    pub generation: u64,
    pub record: Option<SpeedRecord>,
}

impl TestCompletion {
    pub fn for_request(request: &TestRequest, record: Option<SpeedRecord>) -> Self {
        Self {
            feed_id: request.feed_id.clone(),
            node_id: request.node_id.clone(),
            run: request.run,
            generation: request.generation,
            record,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunToken {
    id: RunId,
    cancelled: bool,
    /// Index of the next node to consider.
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    node_id: NodeId,
    run: Option<RunId>,
    generation: u64,
}

/// Sequential test pass over one feed.
///
/// At most one test is in flight per feed. The run token is checked each
/// time a test settles; stopping only cancels the token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Orchestrator {
    run: Option<RunToken>,
    in_flight: Option<InFlight>,
    next_run_id: RunId,
}

impl Orchestrator {
    pub fn state(&self) -> RunState {
        match &self.run {
            Some(token) if !token.cancelled => RunState::Running,
            _ => RunState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn has_test_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.run
            .as_ref()
            .filter(|token| !token.cancelled)
            .map(|token| token.id)
    }

    pub(crate) fn start(
        &mut self,
        feed_id: &str,
        generation: u64,
        nodes: &mut [ProxyNode],
    ) -> Option<TestRequest> {
        if self.is_running() {
            return None;
        }
        self.next_run_id += 1;
        self.run = Some(RunToken {
            id: self.next_run_id,
            cancelled: false,
            cursor: 0,
        });
        creeper_debug!("feed {} run {} started", feed_id, self.next_run_id);
        if self.in_flight.is_some() {
            // The earlier test settles first; the new run begins from there.
            return None;
        }
        self.advance(feed_id, generation, nodes)
    }

    /// Returns true when a running pass was cancelled.
    pub(crate) fn stop(&mut self, feed_id: &str) -> bool {
        let Some(token) = self.run.as_mut().filter(|token| !token.cancelled) else {
            return false;
        };
        creeper_debug!("feed {} run {} stopping", feed_id, token.id);
        token.cancelled = true;
        if self.in_flight.is_none() {
            self.run = None;
        }
        true
    }

    pub(crate) fn test_single(
        &mut self,
        feed_id: &str,
        generation: u64,
        nodes: &mut [ProxyNode],
        node_id: &str,
    ) -> Option<TestRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let node = nodes.iter_mut().find(|node| node.id == node_id)?;
        if !is_testable(node) {
            return None;
        }
        Some(self.launch(feed_id, generation, node, None))
    }

    pub(crate) fn finish(
        &mut self,
        generation: u64,
        nodes: &mut [ProxyNode],
        speeds: &mut SpeedRecordStore,
        completion: TestCompletion,
    ) -> Option<TestRequest> {
        let matches_in_flight = self.in_flight.as_ref().is_some_and(|flight| {
            flight.node_id == completion.node_id
                && flight.run == completion.run
                && flight.generation == completion.generation
        });
        if completion.generation != generation || !matches_in_flight {
            creeper_debug!(
                "feed {} discarding stale result for node {}",
                completion.feed_id,
                completion.node_id
            );
            return None;
        }
        self.in_flight = None;

        if let Some(node) = nodes.iter_mut().find(|node| node.id == completion.node_id) {
            node.testing = false;
        }
        match completion.record {
            Some(record) => speeds.insert(completion.node_id.clone(), record),
            None => creeper_debug!(
                "feed {} node {} test failed",
                completion.feed_id,
                completion.node_id
            ),
        }

        let (run_id, cancelled) = match &self.run {
            Some(token) => (token.id, token.cancelled),
            None => return None,
        };
        if cancelled {
            creeper_debug!("feed {} run {} stopped", completion.feed_id, run_id);
            self.run = None;
            return None;
        }
        self.advance(&completion.feed_id, generation, nodes)
    }

    /// The node list was replaced; whatever is in flight now targets a list
    /// that no longer exists.
    pub(crate) fn invalidate(&mut self, feed_id: &str) {
        if self.run.is_some() || self.in_flight.is_some() {
            creeper_debug!("feed {} node list replaced, run invalidated", feed_id);
        }
        self.run = None;
        self.in_flight = None;
    }

    fn advance(
        &mut self,
        feed_id: &str,
        generation: u64,
        nodes: &mut [ProxyNode],
    ) -> Option<TestRequest> {
        let token = self.run.as_mut()?;
        let next = nodes
            .iter()
            .enumerate()
            .skip(token.cursor)
            .find(|(_, node)| is_testable(node))
            .map(|(index, _)| index);

        match next {
            Some(index) => {
                token.cursor = index + 1;
                let run = Some(token.id);
                Some(self.launch(feed_id, generation, &mut nodes[index], run))
            }
            None => {
                creeper_debug!("feed {} run {} finished", feed_id, token.id);
                self.run = None;
                None
            }
        }
    }

    fn launch(
        &mut self,
        feed_id: &str,
        generation: u64,
        node: &mut ProxyNode,
        run: Option<RunId>,
    ) -> TestRequest {
        node.testing = true;
        self.in_flight = Some(InFlight {
            node_id: node.id.clone(),
            run,
            generation,
        });
        TestRequest {
            feed_id: feed_id.to_string(),
            node_id: node.id.clone(),
            run,
            generation,
            params: node.params.clone(),
        }
    }
}

fn is_testable(node: &ProxyNode) -> bool {
    !node.duplicate && node.eligible_for_test && !node.testing
}
