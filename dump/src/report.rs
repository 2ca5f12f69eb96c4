//! Structured outcome of a dump run
//!
//! Recoverable failures never stop the pipeline. They are collected here so the
//! operator can review them and so the exit status can reflect what went wrong.

use std::process::ExitCode;

use error_stack::Report;
use itertools::Itertools;
use serde::Serialize;

use crate::constants::EXIT_MARSHAL_ERROR;
use crate::discovery::SubstitutionMapping;
use crate::error::Error;
use crate::model::TypeName;

/// A row source query that failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedQuery {
    pub owner:    TypeName,
    /// Accessor being sampled, `None` for select-all queries
    pub accessor: Option<String>,
    pub query:    String,
    pub message:  String,
}

/// A classified accessor the discoverer could not sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAccessor {
    pub owner:    TypeName,
    pub accessor: String,
    pub reason:   String,
}

/// A discovered mapping that lost to an earlier one for the same declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionConflict {
    pub rejected: SubstitutionMapping,
    pub existing: TypeName,
}

/// Failures recorded while sampling or collecting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Failures {
    pub failed_queries:    Vec<FailedQuery>,
    pub skipped_accessors: Vec<SkippedAccessor>,
}

impl Failures {
    /// Record a failed operation, sorting it by error kind
    pub fn record(
        &mut self,
        owner: &TypeName,
        accessor: Option<&str>,
        query: &str,
        report: &Report<Error>,
    ) {
        let message = report.current_context().to_string();
        tracing::debug!("{report:?}");
        match (report.current_context(), accessor) {
            (Error::Query(_), _) | (_, None) => {
                tracing::warn!("Query '{query}' failed: {message}");
                self.failed_queries.push(FailedQuery {
                    owner: owner.clone(),
                    accessor: accessor.map(ToString::to_string),
                    query: query.to_string(),
                    message,
                });
            }
            (_, Some(accessor)) => self.skip(owner, accessor, message),
        }
    }

    pub fn skip(&mut self, owner: &TypeName, accessor: &str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!("Skipping {owner}.{accessor}(): {reason}");
        self.skipped_accessors.push(SkippedAccessor {
            owner: owner.clone(),
            accessor: accessor.to_string(),
            reason,
        });
    }

    pub fn extend(&mut self, other: Self) {
        self.failed_queries.extend(other.failed_queries);
        self.skipped_accessors.extend(other.skipped_accessors);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub entity_types:            usize,
    pub substitutions:           Vec<SubstitutionMapping>,
    /// Subtypes entity types were stored as, not used as aliases
    pub default_implementations: Vec<SubstitutionMapping>,
    pub conflicts:               Vec<SubstitutionConflict>,
    #[serde(flatten)]
    pub failures:                Failures,
    pub root_instances:          usize,
    pub marshal_failure:         Option<String>,
}

impl RunReport {
    /// Exit status of the run; recovered query and invocation failures still exit 0
    pub const fn status(&self) -> u8 {
        if self.marshal_failure.is_some() {
            EXIT_MARSHAL_ERROR
        } else {
            0
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "Dump finished: {} entity types, {} substitutions, {} root instances",
            self.entity_types,
            self.substitutions.len(),
            self.root_instances
        );
        if !self.substitutions.is_empty() {
            tracing::info!("Substitutions: {}", self.substitutions.iter().join(", "));
        }
        if !self.default_implementations.is_empty() {
            tracing::info!(
                "Default implementations: {}",
                self.default_implementations.iter().join(", ")
            );
        }
        if !self.conflicts.is_empty() {
            tracing::warn!(
                "{} conflicting substitutions were ignored",
                self.conflicts.len()
            );
        }
        if !self.failures.failed_queries.is_empty() || !self.failures.skipped_accessors.is_empty()
        {
            tracing::warn!(
                "{} failed queries, {} skipped accessors",
                self.failures.failed_queries.len(),
                self.failures.skipped_accessors.len()
            );
        }
        if let Some(failure) = &self.marshal_failure {
            tracing::error!("Marshalling failed: {failure}");
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => tracing::debug!("Run report: {json}"),
            Err(error) => tracing::debug!("Run report could not be rendered: {error}"),
        }
    }
}
