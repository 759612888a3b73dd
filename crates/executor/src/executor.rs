//! The Executor, the single entry point to the engine.
//!
//! The executor owns the [`Coordinator`], validates command arguments
//! against the cluster configuration, dispatches, and packages what
//! happened as an [`Output`]. It also owns the clock discipline: one
//! tick per input line, shared by every command on the line.

use avail_core::{ClusterConfig, SiteId, Timestamp, TransactionId, VariableId};
use avail_engine::Coordinator;
use tracing::debug;

use crate::{Command, Error, Output, Result};

/// Validating command dispatcher around one cluster.
///
/// The engine trusts its arguments, so everything coming from scripts
/// or JSON passes through [`execute`](Executor::execute) which range
/// checks first. Replay is deterministic: the same command sequence on
/// a fresh executor produces the same outputs.
#[derive(Debug)]
pub struct Executor {
    coordinator: Coordinator,
}

impl Executor {
    /// Build an executor around a fresh cluster.
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            coordinator: Coordinator::new(config),
        }
    }

    /// Read-only view of the cluster, for rendering and tests.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Current logical time.
    pub fn clock(&self) -> Timestamp {
        self.coordinator.clock()
    }

    /// Execute one command without moving the clock.
    pub fn execute(&mut self, command: Command) -> Result<Output> {
        debug!(target: "avail::exec", ?command, clock = self.coordinator.clock(), "Executing");
        match command {
            Command::Begin { transaction } => {
                self.check_transaction(transaction)?;
                self.coordinator.begin(transaction);
                Ok(self.drain())
            }
            Command::BeginReadOnly { transaction } => {
                self.check_transaction(transaction)?;
                self.coordinator.begin_readonly(transaction);
                Ok(self.drain())
            }
            Command::End { transaction } => {
                self.check_transaction(transaction)?;
                self.coordinator.end(transaction);
                Ok(self.drain())
            }
            Command::Read {
                transaction,
                variable,
            } => {
                self.check_transaction(transaction)?;
                self.check_variable(variable)?;
                self.coordinator.read(transaction, variable);
                Ok(self.drain())
            }
            Command::Write {
                transaction,
                variable,
                value,
            } => {
                self.check_transaction(transaction)?;
                self.check_variable(variable)?;
                self.coordinator.write(transaction, variable, value);
                Ok(self.drain())
            }
            Command::Fail { site } => {
                self.check_site(site)?;
                self.coordinator.fail(site);
                Ok(self.drain())
            }
            Command::Recover { site } => {
                self.check_site(site)?;
                self.coordinator.recover(site);
                Ok(self.drain())
            }
            Command::Dump => Ok(Output::Dump(self.coordinator.dump())),
            Command::DumpSite { site } => {
                self.check_site(site)?;
                let report = self
                    .coordinator
                    .dump_site(site)
                    .ok_or(Error::SiteOutOfRange {
                        site: site.index(),
                        max: self.coordinator.config().sites,
                    })?;
                Ok(Output::Site(report))
            }
            Command::DumpVariable { variable } => {
                self.check_variable(variable)?;
                let report =
                    self.coordinator
                        .dump_variable(variable)
                        .ok_or(Error::VariableOutOfRange {
                            variable: variable.index(),
                            max: self.coordinator.config().variables,
                        })?;
                Ok(Output::Variable(report))
            }
            Command::QueryState => Ok(Output::State(self.coordinator.query_state())),
            Command::Restart => {
                self.coordinator.restart();
                Ok(self.drain())
            }
        }
    }

    /// Execute one input line's commands, then advance the clock once.
    ///
    /// Every command on the line shares the pre-advance clock value, so
    /// `begin(T1); begin(T2)` on one line gives both the same start
    /// timestamp.
    pub fn execute_batch(&mut self, commands: &[Command]) -> Vec<Result<Output>> {
        let results = commands
            .iter()
            .map(|command| self.execute(*command))
            .collect();
        self.coordinator.advance_clock();
        results
    }

    fn drain(&mut self) -> Output {
        Output::Events(self.coordinator.take_events())
    }

    fn check_transaction(&self, transaction: TransactionId) -> Result<()> {
        if transaction.get() == 0 {
            return Err(Error::InvalidTransactionId);
        }
        Ok(())
    }

    fn check_site(&self, site: SiteId) -> Result<()> {
        let config = self.coordinator.config();
        if !config.has_site(site) {
            return Err(Error::SiteOutOfRange {
                site: site.index(),
                max: config.sites,
            });
        }
        Ok(())
    }

    fn check_variable(&self, variable: VariableId) -> Result<()> {
        let config = self.coordinator.config();
        if !config.has_variable(variable) {
            return Err(Error::VariableOutOfRange {
                variable: variable.index(),
                max: config.variables,
            });
        }
        Ok(())
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ClusterConfig::default())
    }
}
