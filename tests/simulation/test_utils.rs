//! Shared helpers for the simulation suite.
//!
//! Scripts are expressed as one `line` call per input line; every
//! command on a line shares the pre-advance clock value, exactly as
//! the CLI feeds the executor. Helpers panic on malformed usage so
//! scenario tests stay short.

use availdb::{
    ClusterConfig, Command, Event, Executor, Output, SiteId, StateReport, TransactionId, Value,
    VariableId,
};

/// Fresh executor over the stock 10-site, 20-variable cluster.
pub fn sim() -> Executor {
    Executor::new(ClusterConfig::default())
}

pub fn t(n: u32) -> TransactionId {
    TransactionId::new(n)
}

pub fn x(n: u32) -> VariableId {
    VariableId::new(n)
}

pub fn s(n: u32) -> SiteId {
    SiteId::new(n)
}

pub fn begin(n: u32) -> Command {
    Command::Begin { transaction: t(n) }
}

pub fn begin_ro(n: u32) -> Command {
    Command::BeginReadOnly { transaction: t(n) }
}

pub fn end(n: u32) -> Command {
    Command::End { transaction: t(n) }
}

pub fn r(transaction: u32, variable: u32) -> Command {
    Command::Read {
        transaction: t(transaction),
        variable: x(variable),
    }
}

pub fn w(transaction: u32, variable: u32, value: Value) -> Command {
    Command::Write {
        transaction: t(transaction),
        variable: x(variable),
        value,
    }
}

pub fn fail(site: u32) -> Command {
    Command::Fail { site: s(site) }
}

pub fn recover(site: u32) -> Command {
    Command::Recover { site: s(site) }
}

/// Run one input line and collect every event it surfaced, including
/// completions of previously parked operations.
pub fn line(executor: &mut Executor, commands: &[Command]) -> Vec<Event> {
    let mut events = Vec::new();
    for result in executor.execute_batch(commands) {
        match result.expect("script command was rejected") {
            Output::Events(batch) => events.extend(batch),
            other => panic!("expected events, got {other:?}"),
        }
    }
    events
}

/// The value a read by `transaction` returned on this line, if any.
pub fn read_value(events: &[Event], transaction: TransactionId) -> Option<Value> {
    events.iter().find_map(|event| match event {
        Event::ReadCompleted {
            transaction: tid,
            value,
            ..
        } if *tid == transaction => Some(*value),
        _ => None,
    })
}

/// True if this line aborted `transaction`.
pub fn was_aborted(events: &[Event], transaction: TransactionId) -> bool {
    events.iter().any(|event| {
        matches!(event, Event::TransactionAborted { transaction: tid, .. } if *tid == transaction)
    })
}

/// True if this line parked an operation of `transaction`.
pub fn was_parked(events: &[Event], transaction: TransactionId) -> bool {
    events.iter().any(|event| {
        matches!(event, Event::Parked { operation } if operation.transaction() == transaction)
    })
}

/// Committed copies of `variable` across every hosting site, up or
/// down, ascending by site id.
pub fn copies(executor: &mut Executor, variable: VariableId) -> Vec<(SiteId, Value)> {
    match executor
        .execute(Command::DumpVariable { variable })
        .expect("dump rejected")
    {
        Output::Variable(dump) => dump.values,
        other => panic!("expected variable dump, got {other:?}"),
    }
}

/// The committed value every copy of `variable` agrees on. Panics if
/// the copies diverge, which is itself a finding.
pub fn settled_value(executor: &mut Executor, variable: VariableId) -> Value {
    let copies = copies(executor, variable);
    let (_, first) = copies.first().expect("variable hosted nowhere");
    for (site, value) in &copies {
        assert_eq!(value, first, "copy at {site} diverged");
    }
    *first
}

/// Full controller state snapshot.
pub fn state(executor: &mut Executor) -> StateReport {
    match executor
        .execute(Command::QueryState)
        .expect("querystate rejected")
    {
        Output::State(report) => report,
        other => panic!("expected state report, got {other:?}"),
    }
}
