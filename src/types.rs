/// One parsed input line: the argument tokens, with redirection operators,
/// their filename operands, and the pipe operator stripped out.
///
/// Constructed once per line by the parser and immutable afterwards; nothing
/// is carried over between lines.
#[derive(Debug, PartialEq, Eq)]
pub struct Command {
    pub arguments: Vec<String>,
    /// Present iff `<` appeared; the filename that followed it.
    pub input_path: Option<String>,
    /// Present iff `>` appeared; the filename that followed it.
    pub output_path: Option<String>,
    /// Index into `arguments` where the second pipeline stage begins.
    /// The parser guarantees `0 < pipe_split < arguments.len()`.
    pub pipe_split: Option<usize>,
}

/// One side of the pipeline, or the whole command when no pipe is present:
/// the argument slice to exec plus the file redirections that bind to it.
#[derive(Debug, Clone, Copy)]
pub struct Stage<'a> {
    pub argv: &'a [String],
    pub input: Option<&'a str>,
    pub output: Option<&'a str>,
}

impl Command {
    /// Splits the command into its pipeline stages. Input redirection binds
    /// to the first stage and output redirection to the last, so with a pipe
    /// present each file redirection lands on exactly one side.
    pub fn stages(&self) -> (Stage<'_>, Option<Stage<'_>>) {
        match self.pipe_split {
            None => (
                Stage {
                    argv: &self.arguments,
                    input: self.input_path.as_deref(),
                    output: self.output_path.as_deref(),
                },
                None,
            ),
            Some(split) => {
                debug_assert!(0 < split && split < self.arguments.len());
                let (left, right) = self.arguments.split_at(split);
                (
                    Stage {
                        argv: left,
                        input: self.input_path.as_deref(),
                        output: None,
                    },
                    Some(Stage {
                        argv: right,
                        input: None,
                        output: self.output_path.as_deref(),
                    }),
                )
            }
        }
    }
}
