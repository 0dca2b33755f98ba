// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::mapper::Mapper;
use crate::reducer::Reducer;
use crate::task_worker_factory::{MapperFactory, ReducerFactory};
use crate::tokio_runtime::TokioRuntime;
use map_reduce_core::in_memory_shuffle_store::InMemoryShuffleStore;
use map_reduce_core::map_reduce_job::MapReduceJob;

pub type StageStore<J> =
    InMemoryShuffleStore<<J as MapReduceJob>::Key, <J as MapReduceJob>::Value>;
pub type StageMapper<J, SD> = Mapper<J, StageStore<J>, TokioRuntime, SD>;
pub type StageReducer<J, SD> = Reducer<J, StageStore<J>, TokioRuntime, SD>;
pub type StageMapperFactory<J, SD> = MapperFactory<J, StageStore<J>, TokioRuntime, SD>;
pub type StageReducerFactory<J, SD> = ReducerFactory<J, StageStore<J>, TokioRuntime, SD>;
