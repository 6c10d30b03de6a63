use gcvm::script::{Command, ScriptError, Statement, parse_script};

fn parse_err(source: &str) -> ScriptError {
    parse_script(source).unwrap_err()
}

#[test]
fn test_parses_every_command() {
    let source = "\
int 5
push -1
pair
let head
set-head head head
set-tail head head
print
print head
expect live 3
expect stack 1
gc
pop
";
    let commands: Vec<Command> = parse_script(source)
        .unwrap()
        .into_iter()
        .map(|statement| statement.command)
        .collect();
    assert_eq!(
        commands,
        vec![
            Command::PushInt(5),
            Command::PushInt(-1),
            Command::PushPair,
            Command::Let("head".to_string()),
            Command::SetHead {
                pair: "head".to_string(),
                value: "head".to_string(),
            },
            Command::SetTail {
                pair: "head".to_string(),
                value: "head".to_string(),
            },
            Command::Print(None),
            Command::Print(Some("head".to_string())),
            Command::ExpectLive(3),
            Command::ExpectStack(1),
            Command::Collect,
            Command::Pop,
        ]
    );
}

#[test]
fn test_repeat_keeps_opening_line() {
    let statements = parse_script("gc\nrepeat 3\n  int 1\n  pop\nend\n").unwrap();
    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[1],
        Statement::new(
            2,
            Command::Repeat {
                count: 3,
                body: vec![
                    Statement::new(3, Command::PushInt(1)),
                    Statement::new(4, Command::Pop),
                ],
            }
        )
    );
}

#[test]
fn test_empty_source_parses_to_nothing() {
    assert_eq!(parse_script("").unwrap(), vec![]);
    assert_eq!(parse_script("   \n# only a comment\n").unwrap(), vec![]);
}

#[test]
fn test_error_messages() {
    let cases = [
        ("frob", "line 1: unknown command `frob`"),
        ("int", "line 1: `int` takes exactly one argument"),
        ("int x", "line 1: `int` expects an integer, found `x`"),
        ("pair 1", "line 1: `pair` takes no arguments"),
        ("\n\nend", "line 3: `end` without a matching `repeat`"),
        ("repeat -1\nend", "line 1: `repeat` expects a non-negative integer, found `-1`"),
        ("set-tail a", "line 1: `set-tail` takes exactly 2 arguments"),
        ("print a b", "line 1: `print` takes at most one name"),
        (
            "expect heap 1",
            "line 1: `expect` must be followed by `live <n>` or `stack <n>`",
        ),
        ("let a-b", "line 1: `a-b` is not a valid name"),
    ];
    for (source, expected) in cases {
        assert_eq!(parse_err(source).to_string(), expected, "source: {source:?}");
    }
}

#[test]
fn test_parse_errors_carry_line() {
    let err = parse_err("int 1\nint 2\nbogus\n");
    assert!(matches!(err, ScriptError::Parse { line: 3, .. }));
    assert_eq!(err.line(), 3);
}
