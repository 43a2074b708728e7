//! Concurrent fan-out over every configured instance.
//!
//! # Responsibilities
//! - Hold the immutable list of instance clients
//! - Launch one task per instance for every federated request
//! - Return one positionally aligned result per instance
//!
//! # Data Flow
//! ```text
//! handler ──▶ FederatedQuerier::query(ctx, q)
//!                 │
//!                 ├── spawn ──▶ instance[0].call ──▶ slot 0
//!                 ├── spawn ──▶ instance[1].call ──▶ slot 1
//!                 └── spawn ──▶ instance[n].call ──▶ slot n
//!                 │
//!             join_all (barrier) ──▶ Vec<InstanceResult<T>> ──▶ combiner
//! ```
//!
//! # Design Decisions
//! - No quorum and no early return: the barrier waits for every task
//! - Each task races its call against the context deadline and cancellation,
//!   so a slow instance never holds the request past the query timeout
//! - Dropping the fan-out future cancels every outstanding task

mod outcome;

pub use outcome::{InstanceResult, Outcome};

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use tokio::task::JoinHandle;

use crate::client::{
    InstanceClient, InstanceError, InstanceQuery, QueryKind, SearchQuery, TagValuesQuery,
    TagValuesV2Query, TagsQuery, TagsV2Query, TraceByIdQuery, TraceByIdV2Query,
};
use crate::config::InstanceConfig;
use crate::context::QueryContext;
use crate::model::{
    SearchResponse, SearchTagValuesResponse, SearchTagValuesV2Response, SearchTagsResponse,
    SearchTagsV2Response, Trace, TraceByIdResponse,
};
use crate::observability::metrics;

/// Fans queries out to a fixed set of instances.
#[derive(Debug, Clone)]
pub struct FederatedQuerier {
    instances: Vec<Arc<InstanceClient>>,
}

impl FederatedQuerier {
    pub fn new(instances: Vec<Arc<InstanceClient>>) -> Self {
        Self { instances }
    }

    /// Build one client per configured instance, in configuration order.
    pub fn from_config(configs: &[InstanceConfig]) -> Result<Self, InstanceError> {
        let instances = configs
            .iter()
            .map(|config| InstanceClient::new(config).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(instances))
    }

    /// Run `call` once per instance and collect every outcome.
    ///
    /// The returned vector has exactly one entry per instance, at the
    /// instance's index, whatever order the tasks finish in.
    pub async fn fan_out<T, F, Fut>(
        &self,
        ctx: &QueryContext,
        kind: QueryKind,
        call: F,
    ) -> Vec<InstanceResult<T>>
    where
        T: Send + 'static,
        F: Fn(Arc<InstanceClient>) -> Fut,
        Fut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let scope = ctx.child();
        let _cancel_on_drop = scope.cancellation_token().clone().drop_guard();

        let handles: Vec<JoinHandle<Outcome<T>>> = self
            .instances
            .iter()
            .map(|instance| {
                let name = instance.name().to_string();
                let request = call(Arc::clone(instance));
                let cancel = scope.cancellation_token().clone();
                let deadline = scope.deadline();

                tokio::spawn(async move {
                    let started = Instant::now();
                    let outcome = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Outcome::Failed(InstanceError::Canceled),
                        result = tokio::time::timeout_at(deadline, request) => match result {
                            Ok(outcome) => outcome,
                            Err(_) => Outcome::Failed(InstanceError::DeadlineExceeded),
                        },
                    };
                    metrics::record_instance_query(
                        &name,
                        kind,
                        outcome.label(),
                        outcome.error().map_or("none", InstanceError::label),
                        started.elapsed(),
                    );
                    outcome
                })
            })
            .collect();

        let joined = join_all(handles).await;

        self.instances
            .iter()
            .zip(joined)
            .map(|(instance, joined)| {
                let outcome = joined
                    .unwrap_or_else(|e| Outcome::Failed(InstanceError::Task(e.to_string())));
                if let Outcome::Failed(err) = &outcome {
                    tracing::warn!(
                        instance = %instance.name(),
                        kind = %kind,
                        error = %err,
                        "Instance query failed"
                    );
                }
                InstanceResult::new(instance.name(), outcome)
            })
            .collect()
    }

    /// Issue `query` against every instance.
    ///
    /// A 404 becomes [`Outcome::NotFound`] only for queries that accept it
    /// as an answer; otherwise it is a failure like any other status.
    pub async fn query<Q>(&self, ctx: &QueryContext, query: Q) -> Vec<InstanceResult<Q::Response>>
    where
        Q: InstanceQuery,
    {
        let kind = query.kind();
        let query = Arc::new(query);

        self.fan_out(ctx, kind, |instance| {
            let query = Arc::clone(&query);
            let ctx = ctx.clone();
            async move {
                match instance.call(&ctx, query.as_ref()).await {
                    Ok(response) => Outcome::Found(response),
                    Err(InstanceError::NotFound) if query.not_found_is_answer() => {
                        Outcome::NotFound
                    }
                    Err(err) => Outcome::Failed(err),
                }
            }
        })
        .await
    }

    pub async fn trace_by_id(
        &self,
        ctx: &QueryContext,
        query: TraceByIdQuery,
    ) -> Vec<InstanceResult<Trace>> {
        self.query(ctx, query).await
    }

    pub async fn trace_by_id_v2(
        &self,
        ctx: &QueryContext,
        query: TraceByIdV2Query,
    ) -> Vec<InstanceResult<TraceByIdResponse>> {
        self.query(ctx, query).await
    }

    pub async fn search(
        &self,
        ctx: &QueryContext,
        query: SearchQuery,
    ) -> Vec<InstanceResult<SearchResponse>> {
        self.query(ctx, query).await
    }

    pub async fn search_tags(
        &self,
        ctx: &QueryContext,
        query: TagsQuery,
    ) -> Vec<InstanceResult<SearchTagsResponse>> {
        self.query(ctx, query).await
    }

    pub async fn search_tags_v2(
        &self,
        ctx: &QueryContext,
        query: TagsV2Query,
    ) -> Vec<InstanceResult<SearchTagsV2Response>> {
        self.query(ctx, query).await
    }

    pub async fn search_tag_values(
        &self,
        ctx: &QueryContext,
        query: TagValuesQuery,
    ) -> Vec<InstanceResult<SearchTagValuesResponse>> {
        self.query(ctx, query).await
    }

    pub async fn search_tag_values_v2(
        &self,
        ctx: &QueryContext,
        query: TagValuesV2Query,
    ) -> Vec<InstanceResult<SearchTagValuesV2Response>> {
        self.query(ctx, query).await
    }
}
