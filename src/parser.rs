use thiserror::Error;

use crate::types::Command;

/// Reasons an input line is rejected before anything is launched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing file name after `{operator}`")]
    MissingRedirectTarget { operator: char },
    #[error("a pipeline needs a command on both sides of `|`")]
    InvalidPipeline,
    #[error("redirection without a command")]
    EmptyCommand,
}

/// Tokenizes one input line, already stripped of its line terminator.
///
/// The line is split on runs of whitespace and classified in a single
/// left-to-right scan: `<` and `>` consume the following token as a
/// filename, `|` records where the second pipeline stage begins, everything
/// else is an argument. Operators are recognized only as standalone tokens,
/// so `cmd>file` stays one ordinary argument. An empty line parses to a
/// command with no arguments, which the launcher treats as a no-op.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut arguments: Vec<String> = Vec::new();
    let mut input_path = None;
    let mut output_path = None;
    let mut pipe_split = None;

    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "<" => input_path = Some(redirect_target(&mut tokens, '<')?),
            ">" => output_path = Some(redirect_target(&mut tokens, '>')?),
            "|" => {
                if pipe_split.is_some() || arguments.is_empty() {
                    return Err(ParseError::InvalidPipeline);
                }
                pipe_split = Some(arguments.len());
            }
            word => arguments.push(word.to_string()),
        }
    }

    // A split recorded at the current end means nothing followed the `|`.
    if pipe_split == Some(arguments.len()) {
        return Err(ParseError::InvalidPipeline);
    }
    if arguments.is_empty() && (input_path.is_some() || output_path.is_some()) {
        return Err(ParseError::EmptyCommand);
    }

    Ok(Command {
        arguments,
        input_path,
        output_path,
        pipe_split,
    })
}

fn redirect_target(
    tokens: &mut std::str::SplitWhitespace<'_>,
    operator: char,
) -> Result<String, ParseError> {
    tokens
        .next()
        .map(str::to_string)
        .ok_or(ParseError::MissingRedirectTarget { operator })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_a_plain_command_into_arguments() {
        let command = parse("echo hello world").unwrap();
        assert_eq!(command.arguments, ["echo", "hello", "world"]);
        assert_eq!(command.input_path, None);
        assert_eq!(command.output_path, None);
        assert_eq!(command.pipe_split, None);
    }

    #[test]
    fn extracts_both_redirection_targets() {
        let command = parse("sort < in.txt > out.txt").unwrap();
        assert_eq!(command.arguments, ["sort"]);
        assert_eq!(command.input_path.as_deref(), Some("in.txt"));
        assert_eq!(command.output_path.as_deref(), Some("out.txt"));
    }

    #[test]
    fn records_the_pipe_split_index() {
        let command = parse("ls -l | wc -l").unwrap();
        assert_eq!(command.arguments, ["ls", "-l", "wc", "-l"]);
        assert_eq!(command.pipe_split, Some(2));
    }

    #[test]
    fn rejects_redirection_without_an_operand() {
        assert_eq!(
            parse("cat <"),
            Err(ParseError::MissingRedirectTarget { operator: '<' })
        );
        assert_eq!(
            parse("cat hello >"),
            Err(ParseError::MissingRedirectTarget { operator: '>' })
        );
    }

    #[test]
    fn rejects_a_pipe_with_an_empty_side() {
        assert_eq!(parse("| wc"), Err(ParseError::InvalidPipeline));
        assert_eq!(parse("ls |"), Err(ParseError::InvalidPipeline));
        assert_eq!(parse("< in.txt | wc"), Err(ParseError::InvalidPipeline));
    }

    #[test]
    fn rejects_a_second_pipe() {
        assert_eq!(parse("a | b | c"), Err(ParseError::InvalidPipeline));
    }

    #[test]
    fn operators_are_standalone_tokens_only() {
        let command = parse("cmd>file").unwrap();
        assert_eq!(command.arguments, ["cmd>file"]);
        assert_eq!(command.output_path, None);

        let command = parse("a|b").unwrap();
        assert_eq!(command.arguments, ["a|b"]);
        assert_eq!(command.pipe_split, None);
    }

    #[test]
    fn empty_and_blank_lines_parse_to_an_empty_command() {
        for line in ["", "   ", "\t"] {
            let command = parse(line).unwrap();
            assert!(command.arguments.is_empty());
            assert_eq!(command.pipe_split, None);
        }
    }

    #[test]
    fn rejects_redirections_with_no_command_word() {
        assert_eq!(parse("< in.txt"), Err(ParseError::EmptyCommand));
        assert_eq!(parse("> out.txt"), Err(ParseError::EmptyCommand));
    }

    #[test]
    fn later_redirection_operand_wins() {
        let command = parse("echo hi > a.txt > b.txt").unwrap();
        assert_eq!(command.output_path.as_deref(), Some("b.txt"));
    }
}
