//! Read/write classification of orchestration server APIs.
//!
//! APIs are classified by short method name. Anything not listed here is a
//! write API.

use warden_core::Role;

/// How an API touches server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAccess {
    /// Reads cluster-wide information, not tied to a namespace.
    GlobalReadOnly,
    /// Reads data within a namespace.
    NamespaceReadOnly,
    /// Anything else.
    Write,
}

impl ApiAccess {
    /// Returns the role a caller needs to invoke an API of this class.
    #[must_use]
    pub fn required_role(&self) -> Role {
        match self {
            Self::GlobalReadOnly | Self::NamespaceReadOnly => Role::Reader,
            Self::Write => Role::Writer,
        }
    }
}

const READ_ONLY_GLOBAL_APIS: &[&str] = &[
    "GetClusterInfo",
    "GetSearchAttributes",
    "GetSystemInfo",
    "ListNamespaces",
];

const READ_ONLY_NAMESPACE_APIS: &[&str] = &[
    "CountWorkflowExecutions",
    "DescribeBatchOperation",
    "DescribeNamespace",
    "DescribeSchedule",
    "DescribeTaskQueue",
    "DescribeWorkflowExecution",
    "GetWorkerBuildIdCompatibility",
    "GetWorkerTaskReachability",
    "GetWorkflowExecutionHistory",
    "GetWorkflowExecutionHistoryReverse",
    "ListArchivedWorkflowExecutions",
    "ListBatchOperations",
    "ListClosedWorkflowExecutions",
    "ListOpenWorkflowExecutions",
    "ListScheduleMatchingTimes",
    "ListSchedules",
    "ListSearchAttributes",
    "ListTaskQueuePartitions",
    "ListWorkflowExecutions",
    "QueryWorkflow",
    "ScanWorkflowExecutions",
];

/// Classifies an API by its short name (see [`short_api_name`](crate::short_api_name)).
#[must_use]
pub fn classify(short_api_name: &str) -> ApiAccess {
    if READ_ONLY_GLOBAL_APIS.contains(&short_api_name) {
        ApiAccess::GlobalReadOnly
    } else if READ_ONLY_NAMESPACE_APIS.contains(&short_api_name) {
        ApiAccess::NamespaceReadOnly
    } else {
        ApiAccess::Write
    }
}
