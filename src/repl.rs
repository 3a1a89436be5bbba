use std::io::{self, BufRead, Write};

use crate::object::Value;
use crate::root_environment;

const PROMPT: &str = ">> ";

// Each line evaluates against the same environment, so earlier bindings
// stay visible to later lines.
pub fn start<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<()> {
    let env = root_environment();

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        match crate::run_source(&line, &env) {
            Ok(Value::Null) => {}
            Ok(value) => writeln!(output, "{value}")?,
            Err(errors) => {
                for error in errors {
                    writeln!(output, "\t{error}")?;
                }
            }
        }
    }
}
