pub mod compiler;
pub mod probe;
pub mod writer;

pub use compiler::{Compilation, CompileError, RouteCompiler, SkipReason, SkippedService};
pub use probe::{detect_bridge_host, ProbeError, ProbeResult, ReachabilityProber, TcpProber};
pub use writer::WriteError;
