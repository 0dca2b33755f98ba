// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::channel_worker_synchronization::ChannelWorkerSynchronization;
use crate::types::{
    StageMapper, StageMapperFactory, StageReducer, StageReducerFactory, StageStore,
};
use map_reduce_core::config::Config;
use map_reduce_core::error::PhaseError;
use map_reduce_core::map_reduce_job::{MapReduceJob, Record, ReduceAssignment};
use map_reduce_core::shuffle_store::ShuffleStore;
use map_reduce_core::shutdown_signal::ShutdownSignal;
use map_reduce_core::utils::{initialize_phase, shutdown_workers};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Run one map-reduce stage: every map assignment, then every partition.
///
/// The reduce phase starts only after the map phase has committed output for
/// all assignments. The result holds the reduce output of each partition in
/// ascending partition order.
pub async fn run_stage<J, SD>(
    name: &str,
    job: Arc<J>,
    assignments: Vec<J::MapAssignment>,
    config: &Config,
    shutdown_signal: &SD,
) -> Result<Vec<Vec<Record<J>>>, PhaseError>
where
    J: MapReduceJob,
    SD: ShutdownSignal,
{
    let store = StageStore::<J>::new();

    let start = Instant::now();
    info!(
        stage = name,
        assignments = assignments.len(),
        mappers = config.num_mappers,
        "map phase started"
    );
    let factory = StageMapperFactory::<J, SD>::new(
        Arc::clone(&job),
        store.clone(),
        shutdown_signal.clone(),
        config.mapper_faults(),
    );
    let (mappers, mut executor) = initialize_phase::<StageMapper<J, SD>, ChannelWorkerSynchronization, _>(
        config.num_mappers,
        factory,
        config.mapper_timeout_ms,
        config.max_task_attempts,
    );
    let mappers = executor.execute(mappers, assignments, shutdown_signal).await?;
    shutdown_workers("mapper", mappers).await;
    info!(
        stage = name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "map phase complete"
    );

    let start = Instant::now();
    let partitions = ReduceAssignment::for_partitions(job.num_partitions());
    info!(
        stage = name,
        partitions = partitions.len(),
        reducers = config.num_reducers,
        "reduce phase started"
    );
    let factory = StageReducerFactory::<J, SD>::new(
        job,
        store.clone(),
        shutdown_signal.clone(),
        config.reducer_faults(),
    );
    let (reducers, mut executor) = initialize_phase::<StageReducer<J, SD>, ChannelWorkerSynchronization, _>(
        config.num_reducers,
        factory,
        config.reducer_timeout_ms,
        config.max_task_attempts,
    );
    let reducers = executor.execute(reducers, partitions, shutdown_signal).await?;
    shutdown_workers("reducer", reducers).await;
    info!(
        stage = name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "reduce phase complete"
    );

    Ok(store.reduce_output().await)
}
