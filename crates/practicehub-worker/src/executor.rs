//! Processor registry: maps each job type to the handler that runs it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use practicehub_entity::job::{Job, JobType};

/// Trait for job processor implementations.
///
/// Processors receive a read-only copy of the job record. The returned
/// value becomes the job's `result`; an error becomes its `error` string.
#[async_trait]
pub trait JobProcessor: Send + Sync + std::fmt::Debug {
    /// Run the job.
    async fn process(&self, job: &Job) -> Result<Value, ProcessorError>;
}

/// Error returned by a processor.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// The work itself failed.
    #[error("{0}")]
    Failed(String),
}

impl ProcessorError {
    /// Shorthand for [`ProcessorError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Processor backed by an async closure.
pub struct FnProcessor<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnProcessor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProcessor").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> JobProcessor for FnProcessor<F>
where
    F: Fn(Job) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ProcessorError>> + Send + 'static,
{
    async fn process(&self, job: &Job) -> Result<Value, ProcessorError> {
        (self.f)(job.clone()).await
    }
}

/// Wrap an async closure as a processor.
pub fn processor_fn<F, Fut>(f: F) -> Arc<dyn JobProcessor>
where
    F: Fn(Job) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ProcessorError>> + Send + 'static,
{
    Arc::new(FnProcessor { f })
}

/// Registered processors by job type. One processor per type.
#[derive(Debug, Default)]
pub struct ProcessorRegistry {
    processors: RwLock<HashMap<JobType, Arc<dyn JobProcessor>>>,
}

impl ProcessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor for a job type, replacing any previous one.
    ///
    /// Returns `true` if a processor was replaced.
    pub fn register(&self, job_type: JobType, processor: Arc<dyn JobProcessor>) -> bool {
        let mut processors = self.processors.write().unwrap_or_else(|e| e.into_inner());
        let replaced = processors.insert(job_type.clone(), processor).is_some();
        if replaced {
            tracing::info!("Replaced processor for job type '{}'", job_type);
        } else {
            tracing::info!("Registered processor for job type '{}'", job_type);
        }
        replaced
    }

    /// Look up the processor for a job type
    pub fn get(&self, job_type: &JobType) -> Option<Arc<dyn JobProcessor>> {
        let processors = self.processors.read().unwrap_or_else(|e| e.into_inner());
        processors.get(job_type).cloned()
    }

    /// Check if a processor is registered for a job type
    pub fn contains(&self, job_type: &JobType) -> bool {
        let processors = self.processors.read().unwrap_or_else(|e| e.into_inner());
        processors.contains_key(job_type)
    }

    /// Registered job types, sorted by name
    pub fn registered_types(&self) -> Vec<JobType> {
        let processors = self.processors.read().unwrap_or_else(|e| e.into_inner());
        let mut types: Vec<JobType> = processors.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practicehub_core::types::UserId;
    use serde_json::json;

    fn job_with(payload: Value) -> Job {
        let payload = payload.as_object().cloned().unwrap_or_default();
        Job::new(UserId::from("u1"), JobType::EXECUTE, payload)
    }

    #[tokio::test]
    async fn test_register_overwrites_previous_processor() {
        let registry = ProcessorRegistry::new();
        let first = registry.register(
            JobType::EXECUTE,
            processor_fn(|_job| async { Ok(json!("first")) }),
        );
        let second = registry.register(
            JobType::EXECUTE,
            processor_fn(|_job| async { Ok(json!("second")) }),
        );
        assert!(!first);
        assert!(second);
        assert_eq!(registry.registered_types(), vec![JobType::EXECUTE]);

        let processor = registry.get(&JobType::EXECUTE).unwrap();
        let out = processor.process(&job_with(json!({}))).await.unwrap();
        assert_eq!(out, json!("second"));
    }

    #[test]
    fn test_unknown_type_has_no_processor() {
        let registry = ProcessorRegistry::new();
        assert!(registry.get(&JobType::from("unknown_type")).is_none());
        assert!(!registry.contains(&JobType::AI_HINT));
    }

    #[test]
    fn test_registered_types_sorted() {
        let registry = ProcessorRegistry::new();
        for kind in [JobType::GENERATE, JobType::AI_HINT, JobType::EXECUTE] {
            registry.register(kind, processor_fn(|_job| async { Ok(Value::Null) }));
        }
        let names: Vec<String> = registry
            .registered_types()
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(names, vec!["ai_hint", "execute", "generate"]);
    }

    #[test]
    fn test_failed_message_is_verbatim() {
        assert_eq!(ProcessorError::failed("model overloaded").to_string(), "model overloaded");
    }
}
