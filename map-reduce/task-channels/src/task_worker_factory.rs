// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::mapper::{Mapper, MapperTask};
use crate::reducer::{Reducer, ReducerTask};
use map_reduce_core::config::FaultConfig;
use map_reduce_core::map_reduce_job::MapReduceJob;
use map_reduce_core::shuffle_store::ShuffleStore;
use map_reduce_core::shutdown_signal::ShutdownSignal;
use map_reduce_core::worker_factory::WorkerFactory;
use map_reduce_core::worker_runtime::WorkerRuntime;
use std::marker::PhantomData;
use std::sync::Arc;

/// State every worker of a stage shares
struct StageHandles<J, S, SD> {
    job: Arc<J>,
    store: S,
    shutdown_signal: SD,
    faults: FaultConfig,
}

/// Spawns mappers for the initial pool and as replacements
pub struct MapperFactory<J, S, R, SD> {
    handles: StageHandles<J, S, SD>,
    _runtime: PhantomData<R>,
}

impl<J, S, R, SD> MapperFactory<J, S, R, SD> {
    pub fn new(job: Arc<J>, store: S, shutdown_signal: SD, faults: FaultConfig) -> Self {
        Self {
            handles: StageHandles {
                job,
                store,
                shutdown_signal,
                faults,
            },
            _runtime: PhantomData,
        }
    }
}

impl<J, S, R, SD> WorkerFactory<Mapper<J, S, R, SD>> for MapperFactory<J, S, R, SD>
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
    R: WorkerRuntime<MapperTask<J, S, SD>>,
    SD: ShutdownSignal,
{
    fn create_worker(&mut self, worker_id: usize) -> Mapper<J, S, R, SD> {
        let handles = &self.handles;
        Mapper::new(
            worker_id,
            Arc::clone(&handles.job),
            handles.store.clone(),
            handles.shutdown_signal.clone(),
            handles.faults,
        )
    }
}

pub struct ReducerFactory<J, S, R, SD> {
    handles: StageHandles<J, S, SD>,
    _runtime: PhantomData<R>,
}

impl<J, S, R, SD> ReducerFactory<J, S, R, SD> {
    pub fn new(job: Arc<J>, store: S, shutdown_signal: SD, faults: FaultConfig) -> Self {
        Self {
            handles: StageHandles {
                job,
                store,
                shutdown_signal,
                faults,
            },
            _runtime: PhantomData,
        }
    }
}

impl<J, S, R, SD> WorkerFactory<Reducer<J, S, R, SD>> for ReducerFactory<J, S, R, SD>
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
    R: WorkerRuntime<ReducerTask<J, S, SD>>,
    SD: ShutdownSignal,
{
    fn create_worker(&mut self, worker_id: usize) -> Reducer<J, S, R, SD> {
        let handles = &self.handles;
        Reducer::new(
            worker_id,
            Arc::clone(&handles.job),
            handles.store.clone(),
            handles.shutdown_signal.clone(),
            handles.faults,
        )
    }
}
