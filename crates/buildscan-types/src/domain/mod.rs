mod invocation;
mod language;

pub use invocation::{
    CompilerInvocation, DETACHED_MARKER, Invocation, InvocationKey, TYPESCRIPT_ASSEMBLY_NAME,
};
pub use language::Language;
