//! Recording connection factory for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{ConnectionFactory, Row, SpatialConnection, SpatialQuery};
use crate::error::UpstreamError;

#[derive(Default)]
struct Shared {
    responses: Mutex<VecDeque<Result<Vec<Row>, UpstreamError>>>,
    queries: Mutex<Vec<SpatialQuery>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Hands out connections that replay queued responses in order and record
/// every query they see. With nothing queued a query returns no rows.
#[derive(Clone, Default)]
pub(crate) struct FakeConnections {
    shared: Arc<Shared>,
}

impl FakeConnections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response. Each value must be a JSON object.
    pub fn respond(&self, rows: Vec<Value>) -> &Self {
        let rows = rows
            .into_iter()
            .map(|v| v.as_object().cloned().expect("fake rows must be objects"))
            .collect();
        self.shared.responses.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn fail(&self, err: UpstreamError) -> &Self {
        self.shared.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn queries(&self) -> Vec<SpatialQuery> {
        self.shared.queries.lock().unwrap().clone()
    }

    pub fn acquired(&self) -> usize {
        self.shared.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.shared.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for FakeConnections {
    async fn acquire(&self) -> Result<Box<dyn SpatialConnection>, UpstreamError> {
        self.shared.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct FakeConnection {
    shared: Arc<Shared>,
}

#[async_trait]
impl SpatialConnection for FakeConnection {
    async fn fetch_rows(&mut self, query: &SpatialQuery) -> Result<Vec<Row>, UpstreamError> {
        self.shared.queries.lock().unwrap().push(query.clone());
        self.shared
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.shared.released.fetch_add(1, Ordering::SeqCst);
    }
}
