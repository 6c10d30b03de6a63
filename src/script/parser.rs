use crate::script::{
    ScriptError,
    command::{Command, Statement},
};

struct OpenBlock {
    line: usize,
    count: usize,
    body: Vec<Statement>,
}

/// Parses a script into statements. `repeat` blocks are nested in place.
pub fn parse_script(source: &str) -> Result<Vec<Statement>, ScriptError> {
    let mut top = Vec::new();
    let mut blocks: Vec<OpenBlock> = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let words: Vec<&str> = text.split_whitespace().collect();
        let Some((&keyword, args)) = words.split_first() else {
            continue;
        };

        let command = match keyword {
            "repeat" => {
                let count = expect_count(line, keyword, args)?;
                blocks.push(OpenBlock {
                    line,
                    count,
                    body: Vec::new(),
                });
                continue;
            }
            "end" => {
                expect_arity(line, keyword, args, 0)?;
                let block = blocks
                    .pop()
                    .ok_or_else(|| parse_error(line, "`end` without a matching `repeat`"))?;
                Statement::new(
                    block.line,
                    Command::Repeat {
                        count: block.count,
                        body: block.body,
                    },
                )
            }
            _ => Statement::new(line, parse_command(line, keyword, args)?),
        };

        match blocks.last_mut() {
            Some(block) => block.body.push(command),
            None => top.push(command),
        }
    }

    if let Some(block) = blocks.last() {
        return Err(parse_error(block.line, "`repeat` block is never closed"));
    }
    Ok(top)
}

fn parse_command(line: usize, keyword: &str, args: &[&str]) -> Result<Command, ScriptError> {
    let command = match keyword {
        "int" | "push" => {
            expect_arity(line, keyword, args, 1)?;
            let value = args[0].parse::<i64>().map_err(|_| {
                parse_error(
                    line,
                    format!("`{keyword}` expects an integer, found `{}`", args[0]),
                )
            })?;
            Command::PushInt(value)
        }
        "pair" => {
            expect_arity(line, keyword, args, 0)?;
            Command::PushPair
        }
        "pop" => {
            expect_arity(line, keyword, args, 0)?;
            Command::Pop
        }
        "gc" => {
            expect_arity(line, keyword, args, 0)?;
            Command::Collect
        }
        "let" => {
            expect_arity(line, keyword, args, 1)?;
            Command::Let(expect_name(line, args[0])?)
        }
        "set-head" | "set-tail" => {
            expect_arity(line, keyword, args, 2)?;
            let pair = expect_name(line, args[0])?;
            let value = expect_name(line, args[1])?;
            if keyword == "set-head" {
                Command::SetHead { pair, value }
            } else {
                Command::SetTail { pair, value }
            }
        }
        "print" => match args {
            [] => Command::Print(None),
            [name] => Command::Print(Some(expect_name(line, name)?)),
            _ => return Err(parse_error(line, "`print` takes at most one name")),
        },
        "expect" => match args {
            ["live", rest @ ..] => Command::ExpectLive(expect_count(line, "expect live", rest)?),
            ["stack", rest @ ..] => {
                Command::ExpectStack(expect_count(line, "expect stack", rest)?)
            }
            _ => {
                return Err(parse_error(
                    line,
                    "`expect` must be followed by `live <n>` or `stack <n>`",
                ));
            }
        },
        other => return Err(parse_error(line, format!("unknown command `{other}`"))),
    };
    Ok(command)
}

fn expect_arity(
    line: usize,
    keyword: &str,
    args: &[&str],
    arity: usize,
) -> Result<(), ScriptError> {
    if args.len() == arity {
        return Ok(());
    }
    let message = match arity {
        0 => format!("`{keyword}` takes no arguments"),
        1 => format!("`{keyword}` takes exactly one argument"),
        n => format!("`{keyword}` takes exactly {n} arguments"),
    };
    Err(parse_error(line, message))
}

fn expect_count(line: usize, keyword: &str, args: &[&str]) -> Result<usize, ScriptError> {
    expect_arity(line, keyword, args, 1)?;
    args[0].parse::<usize>().map_err(|_| {
        parse_error(
            line,
            format!("`{keyword}` expects a non-negative integer, found `{}`", args[0]),
        )
    })
}

fn expect_name(line: usize, word: &str) -> Result<String, ScriptError> {
    let mut chars = word.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(word.to_string())
    } else {
        Err(parse_error(line, format!("`{word}` is not a valid name")))
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ScriptError {
    ScriptError::Parse {
        line,
        message: message.into(),
    }
}
