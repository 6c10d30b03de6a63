/// One script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `int <n>` / `push <n>`
    PushInt(i64),
    /// `pair`
    PushPair,
    /// `pop`
    Pop,
    /// `gc`
    Collect,
    /// `let <name>`: bind the top of the root stack.
    Let(String),
    /// `set-head <pair> <value>`
    SetHead { pair: String, value: String },
    /// `set-tail <pair> <value>`
    SetTail { pair: String, value: String },
    /// `print [<name>]`; top of stack when no name is given.
    Print(Option<String>),
    /// `expect live <n>`
    ExpectLive(usize),
    /// `expect stack <n>`
    ExpectStack(usize),
    /// `repeat <n>` ... `end`
    Repeat { count: usize, body: Vec<Statement> },
}

/// A command with the 1-based source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub line: usize,
    pub command: Command,
}

impl Statement {
    pub fn new(line: usize, command: Command) -> Self {
        Self { line, command }
    }
}
