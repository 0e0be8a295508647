use std::{num::NonZeroUsize, time::Duration};

/// Options for configuring the behavior of [crate::diff_with_config()].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffConfig {
    pub(crate) additions_inside_type_definitions: bool,
    pub(crate) removals_inside_type_definitions: bool,
    pub(crate) search_budget: SearchBudget,
    pub(crate) worker_threads: NonZeroUsize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        DiffConfig {
            additions_inside_type_definitions: false,
            removals_inside_type_definitions: false,
            search_budget: SearchBudget::default(),
            worker_threads: std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl DiffConfig {
    /// Emit [crate::SchemaChange]s for fields, arguments, enum values, applied directives and
    /// interface implementations inside of added definitions.
    pub fn with_additions_inside_type_definitions(mut self, verbose_additions: bool) -> Self {
        self.additions_inside_type_definitions = verbose_additions;
        self
    }

    /// Same as [DiffConfig::with_additions_inside_type_definitions()], for removed definitions.
    pub fn with_removals_inside_type_definitions(mut self, verbose_removals: bool) -> Self {
        self.removals_inside_type_definitions = verbose_removals;
        self
    }

    /// Bound the residual matching search. Once exhausted, the edit script falls back to the
    /// anchored mapping and is flagged as approximate.
    pub fn with_search_budget(mut self, search_budget: SearchBudget) -> Self {
        self.search_budget = search_budget;
        self
    }

    /// Number of threads exploring the residual matching search. With a single worker, the
    /// search runs on the calling thread.
    pub fn with_worker_threads(mut self, worker_threads: NonZeroUsize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    pub fn additions_inside_type_definitions(&self) -> bool {
        self.additions_inside_type_definitions
    }

    pub fn removals_inside_type_definitions(&self) -> bool {
        self.removals_inside_type_definitions
    }

    pub fn search_budget(&self) -> &SearchBudget {
        &self.search_budget
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads.get()
    }
}

/// Limits of the residual matching search, shared by all workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    /// Search tree nodes expanded before giving up.
    pub max_expansions: u64,
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    pub const DEFAULT_MAX_EXPANSIONS: u64 = 200_000;

    pub fn new(max_expansions: u64) -> Self {
        SearchBudget {
            max_expansions,
            time_limit: None,
        }
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        SearchBudget::new(Self::DEFAULT_MAX_EXPANSIONS)
    }
}
