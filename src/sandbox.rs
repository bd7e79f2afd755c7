use std::thread;

use boa_engine::{Context, JsError, JsNativeError, JsString, JsValue, Source};
use log::debug;

use crate::error::{HashError, Result};

/// Name of the function the fetched script has to define.
pub const HASH_FUNCTION: &str = "md5";

const MAX_LOOP_ITERATIONS: u64 = 1 << 24;
const MAX_RECURSION_DEPTH: usize = 256;
/// Deepest `(`/`[`/`{` nesting accepted before the script reaches the parser,
/// which recurses on the native stack.
pub const MAX_NESTING: usize = 1000;
const SANDBOX_STACK_SIZE: usize = 64 * 1024 * 1024;

/// An interpreter context with no host objects (no filesystem, network,
/// process or timers) and bounded loops and recursion. The fetched script can
/// only compute. Heap use is not bounded.
pub struct Sandbox {
    context: Context,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::with_limits(MAX_LOOP_ITERATIONS, MAX_RECURSION_DEPTH)
    }

    pub fn with_limits(loop_iterations: u64, recursion_depth: usize) -> Self {
        let mut context = Context::default();
        let limits = context.runtime_limits_mut();
        limits.set_loop_iteration_limit(loop_iterations);
        limits.set_recursion_limit(recursion_depth);
        Sandbox { context }
    }

    /// Run `script`, then call its `md5` with `input` and return the result as
    /// a string.
    pub fn digest(&mut self, script: &str, input: &str) -> Result<String> {
        self.try_digest(script, input)
            .map_err(|err| HashError::Execution(self.describe(err)))
    }

    fn try_digest(&mut self, script: &str, input: &str) -> std::result::Result<String, JsError> {
        let depth = nesting_depth(script);
        if depth > MAX_NESTING {
            return Err(JsNativeError::range()
                .with_message(format!(
                    "script nesting depth {} exceeds {}",
                    depth, MAX_NESTING
                ))
                .into());
        }

        self.context.eval(Source::from_bytes(script))?;
        debug!("Script evaluated, calling {}", HASH_FUNCTION);

        // Looked up through the script scope so `let`/`const` bindings resolve
        // too, not just properties of the global object.
        let function = self.context.eval(Source::from_bytes(HASH_FUNCTION))?;
        let function = function.as_callable().ok_or_else(|| {
            JsNativeError::typ().with_message(format!("{} is not a function", HASH_FUNCTION))
        })?;

        let argument = JsValue::from(JsString::from(input));
        let digest = function.call(&JsValue::undefined(), &[argument], &mut self.context)?;
        let digest = digest.to_string(&mut self.context)?;
        Ok(digest.to_std_string_escaped())
    }

    fn describe(&mut self, err: JsError) -> String {
        match err.try_native(&mut self.context) {
            Ok(native) => native.to_string(),
            Err(_) => err.to_string(),
        }
    }
}

/// Run `Sandbox::digest` on a thread with a large stack. Parsing and
/// compiling recurse natively, so this raises the ceiling for constructs the
/// nesting check does not count (long unary or assignment chains).
pub fn digest_isolated(script: String, input: String) -> Result<String> {
    let worker = thread::Builder::new()
        .name("sandbox".into())
        .stack_size(SANDBOX_STACK_SIZE)
        .spawn(move || Sandbox::new().digest(&script, &input))
        .map_err(|e| HashError::Execution(format!("could not start script thread: {}", e)))?;
    worker
        .join()
        .unwrap_or_else(|_| Err(HashError::Execution("script engine panicked".to_owned())))
}

/// Maximum bracket nesting outside string literals and comments.
fn nesting_depth(script: &str) -> usize {
    #[derive(Clone, Copy)]
    enum Mode {
        Code,
        Quoted(char),
        LineComment,
        BlockComment,
    }

    let mut mode = Mode::Code;
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut chars = script.chars().peekable();
    while let Some(c) = chars.next() {
        match mode {
            Mode::Code => match c {
                '(' | '[' | '{' => {
                    depth += 1;
                    max = max.max(depth);
                }
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                '"' | '\'' | '`' => mode = Mode::Quoted(c),
                '/' if chars.peek() == Some(&'/') => mode = Mode::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    mode = Mode::BlockComment;
                }
                _ => {}
            },
            Mode::Quoted(quote) => {
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    mode = Mode::Code;
                }
            }
            Mode::LineComment => {
                if c == '\n' {
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                }
            }
        }
    }
    max
}
