//! What gets graded: an external executable, an in-process program, or a factory producing one.

use crate::error::{ProgramError, SessionError};
use crate::session::script::Program;
use std::fmt;
use std::path::PathBuf;

type TargetFactory = Box<dyn FnOnce() -> Result<Target, ProgramError> + Send>;

pub enum Target {
    Executable(PathBuf),
    Program(Box<dyn Program>),
    /// Built on demand, once per grading run. Useful when preparing the target is expensive,
    /// e.g. compiling it.
    Deferred(TargetFactory),
}

impl Target {
    pub fn executable(path: impl Into<PathBuf>) -> Self {
        Target::Executable(path.into())
    }

    pub fn program(program: impl Program + 'static) -> Self {
        Target::Program(Box::new(program))
    }

    pub fn deferred<F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<Target, ProgramError> + Send + 'static,
    {
        Target::Deferred(Box::new(factory))
    }

    /// Runs factories until a concrete target is left.
    pub fn resolve(self) -> Result<Target, SessionError> {
        let mut target = self;
        loop {
            match target {
                Target::Deferred(factory) => {
                    target = factory().map_err(|e| SessionError::Target(e.to_string()))?;
                }
                concrete => return Ok(concrete),
            }
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Executable(path) => f.debug_tuple("Executable").field(path).finish(),
            Target::Program(program) => f.debug_tuple("Program").field(&program.name()).finish(),
            Target::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::script::{ExecutionContext, FnProgram};

    #[test]
    fn test_resolve_runs_nested_factories() {
        let target =
            Target::deferred(|| Ok(Target::deferred(|| Ok(Target::executable("/bin/sh")))));
        match target.resolve().unwrap() {
            Target::Executable(path) => assert_eq!(path, PathBuf::from("/bin/sh")),
            other => panic!("expected executable, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_reports_factory_failure() {
        let target = Target::deferred(|| Err("compilation failed".into()));
        match target.resolve().unwrap_err() {
            SessionError::Target(message) => assert_eq!(message, "compilation failed"),
            other => panic!("expected Target error, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_names_program() {
        let target = Target::program(FnProgram::new("hello", |_ctx: &mut ExecutionContext<'_>| {
            Ok(())
        }));
        assert_eq!(format!("{target:?}"), "Program(\"hello\")");
    }
}
