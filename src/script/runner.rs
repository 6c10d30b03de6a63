use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::{
    runtime::{GcConfig, GcHandle, VM, VmError},
    script::{
        ScriptError,
        command::{Command, Statement},
        parser::parse_script,
    },
};

/// Final state of a script run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Lines emitted by `gc`, `print` and `expect`.
    pub transcript: Vec<String>,
    pub live_count: usize,
    pub stack_depth: usize,
    pub collections: usize,
    pub allocations: usize,
    pub threshold: usize,
}

impl RunReport {
    pub fn from_vm(vm: &VM, transcript: Vec<String>) -> Self {
        let heap = vm.heap();
        Self {
            transcript,
            live_count: heap.live_count(),
            stack_depth: vm.stack_len(),
            collections: heap.total_collections(),
            allocations: heap.total_allocations(),
            threshold: heap.threshold(),
        }
    }

    /// Transcript followed by a summary block.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for line in &self.transcript {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("live objects: {}\n", self.live_count));
        out.push_str(&format!("stack depth:  {}\n", self.stack_depth));
        out.push_str(&format!("collections:  {}\n", self.collections));
        out.push_str(&format!("allocations:  {}\n", self.allocations));
        out.push_str(&format!("threshold:    {}\n", self.threshold));
        out
    }
}

/// Executes statements against a borrowed VM, tracking `let` bindings.
pub struct Runner<'vm> {
    vm: &'vm mut VM,
    bindings: HashMap<String, GcHandle>,
    transcript: Vec<String>,
}

impl<'vm> Runner<'vm> {
    pub fn new(vm: &'vm mut VM) -> Self {
        Self {
            vm,
            bindings: HashMap::new(),
            transcript: Vec::new(),
        }
    }

    pub fn run(&mut self, statements: &[Statement]) -> Result<(), ScriptError> {
        for statement in statements {
            self.exec(statement)?;
        }
        Ok(())
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn into_report(self) -> RunReport {
        RunReport::from_vm(self.vm, self.transcript)
    }

    fn exec(&mut self, statement: &Statement) -> Result<(), ScriptError> {
        let line = statement.line;
        let vm_err = |source: VmError| ScriptError::Runtime { line, source };

        match &statement.command {
            Command::PushInt(value) => {
                self.vm.push_int(*value).map_err(vm_err)?;
            }
            Command::PushPair => {
                self.vm.push_pair().map_err(vm_err)?;
            }
            Command::Pop => {
                self.vm.pop().map_err(vm_err)?;
            }
            Command::Collect => {
                let stats = self.vm.collect();
                self.transcript.push(format!(
                    "gc: collected {}, remaining {}, threshold {}",
                    stats.collected, stats.live_after, stats.threshold
                ));
            }
            Command::Let(name) => {
                let handle = self.vm.peek().map_err(vm_err)?;
                debug!(name = name.as_str(), %handle, "bind");
                self.bindings.insert(name.clone(), handle);
            }
            Command::SetHead { pair, value } => {
                let (pair, value) = (self.lookup(line, pair)?, self.lookup(line, value)?);
                self.vm.set_head(pair, value).map_err(vm_err)?;
            }
            Command::SetTail { pair, value } => {
                let (pair, value) = (self.lookup(line, pair)?, self.lookup(line, value)?);
                self.vm.set_tail(pair, value).map_err(vm_err)?;
            }
            Command::Print(name) => {
                let handle = match name {
                    Some(name) => self.lookup(line, name)?,
                    None => self.vm.peek().map_err(vm_err)?,
                };
                let rendered = self.vm.render(handle).map_err(vm_err)?;
                self.transcript.push(format!("print: {rendered}"));
            }
            Command::ExpectLive(expected) => {
                self.check(line, "live count", *expected, self.vm.live_count())?;
            }
            Command::ExpectStack(expected) => {
                self.check(line, "stack depth", *expected, self.vm.stack_len())?;
            }
            Command::Repeat { count, body } => {
                for _ in 0..*count {
                    self.run(body)?;
                }
            }
        }
        Ok(())
    }

    fn lookup(&self, line: usize, name: &str) -> Result<GcHandle, ScriptError> {
        self.bindings
            .get(name)
            .copied()
            .ok_or_else(|| ScriptError::UnboundName {
                line,
                name: name.to_string(),
            })
    }

    fn check(
        &mut self,
        line: usize,
        what: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), ScriptError> {
        if expected != actual {
            return Err(ScriptError::Expectation {
                line,
                what,
                expected,
                actual,
            });
        }
        self.transcript.push(format!("ok: {what} == {expected}"));
        Ok(())
    }
}

/// Parses and runs `source` on a fresh VM built from `config`.
pub fn run_source(source: &str, config: GcConfig) -> Result<RunReport, ScriptError> {
    let statements = parse_script(source)?;
    let mut vm = VM::with_config(config);
    let mut runner = Runner::new(&mut vm);
    runner.run(&statements)?;
    Ok(runner.into_report())
}
