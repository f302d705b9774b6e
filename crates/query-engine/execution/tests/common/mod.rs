//! An in-memory pool that records what the execution layer does with it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use query_engine_execution::metrics::Metrics;
use query_engine_execution::{
    BatchResult, BoxError, Connection, ConnectionPool, QueryExecutor, ResultSet, UpdateResult,
    Value,
};
use query_util_configuration::{DatabaseConfig, PoolSettings};

#[derive(Debug, Default)]
pub struct Stats {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub release_calls: AtomicUsize,
    pub statements: Mutex<Vec<String>>,
    pub batch_completion_order: Mutex<Vec<usize>>,
}

impl Stats {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockPool {
    pub stats: Arc<Stats>,
    fail_acquire: bool,
    fail_execution: bool,
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_acquire() -> Self {
        Self {
            fail_acquire: true,
            ..Self::default()
        }
    }

    pub fn failing_execution() -> Self {
        Self {
            fail_execution: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ConnectionPool for MockPool {
    type Connection = MockConnection;

    async fn acquire(&self) -> Result<MockConnection, BoxError> {
        tokio::task::yield_now().await;
        if self.fail_acquire {
            return Err("pool timed out while waiting for an open connection".into());
        }
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            stats: self.stats.clone(),
            fail_execution: self.fail_execution,
            released: false,
        })
    }
}

#[derive(Debug)]
pub struct MockConnection {
    stats: Arc<Stats>,
    fail_execution: bool,
    released: bool,
}

impl MockConnection {
    fn run(&self, sql: &str) -> Result<(), BoxError> {
        assert!(!self.released, "statement issued on a released connection");
        self.stats.statements.lock().unwrap().push(sql.to_string());
        if self.fail_execution {
            return Err(format!("syntax error in \"{sql}\"").into());
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for MockConnection {
    /// Echoes the parameters back as a single row with columns `$1`, `$2`, ...
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, BoxError> {
        tokio::task::yield_now().await;
        self.run(sql)?;
        let columns = (1..=params.len()).map(|i| format!("${i}")).collect();
        Ok(ResultSet::new(columns, vec![params.to_vec()]))
    }

    async fn update(&mut self, sql: &str, params: &[Value]) -> Result<UpdateResult, BoxError> {
        tokio::task::yield_now().await;
        self.run(sql)?;
        Ok(UpdateResult {
            updated: params.len() as u64,
            keys: vec![Value::Int(1)],
        })
    }

    /// Runs the items concurrently, later items finishing first. Each item's
    /// count is its first parameter.
    async fn batch(&mut self, sql: &str, batch: &[Vec<Value>]) -> Result<BatchResult, BoxError> {
        self.run(sql)?;
        let stats = &self.stats;
        let items = batch.iter().enumerate().map(|(index, params)| async move {
            let delay = (batch.len() - index) as u64 * 5;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            stats.batch_completion_order.lock().unwrap().push(index);
            params
                .first()
                .and_then(Value::as_i64)
                .map(|count| count as u64)
                .ok_or_else(|| BoxError::from("wrong number of parameters"))
        });
        futures::future::join_all(items).await.into_iter().collect()
    }

    fn release(&mut self) {
        self.stats.release_calls.fetch_add(1, Ordering::SeqCst);
        if !self.released {
            self.released = true;
            self.stats.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub fn config() -> DatabaseConfig {
    DatabaseConfig {
        host: "db.internal".to_string(),
        port: 5432,
        username: "svc".to_string(),
        password: "secret".to_string(),
        database: "orders".to_string(),
        schema: "public".to_string(),
        pool_settings: PoolSettings::default(),
    }
}

pub fn executor(pool: MockPool) -> QueryExecutor<MockPool> {
    let metrics = Metrics::initialize(&mut prometheus::Registry::new()).unwrap();
    QueryExecutor::new(config(), pool, metrics)
}

/// Counts failure handler invocations and remembers the kinds.
#[derive(Debug, Clone, Default)]
pub struct FailureLog(Arc<Mutex<Vec<&'static str>>>);

impl FailureLog {
    pub fn handler(&self) -> impl Fn(&query_engine_execution::Error) + Send + Sync + 'static {
        let log = self.0.clone();
        move |error: &query_engine_execution::Error| log.lock().unwrap().push(error.kind())
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}
