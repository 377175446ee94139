//! Trace Rewriter
//!
//! Renders a throwable the way the JVM does, with every frame mapped back
//! to its source `file:line` through the origin table:
//!
//! ```text
//! Exception in thread "main" java.lang.IllegalStateException: empty
//! 	at Stack.pop(Stack.java:12)
//! 	at Main.main(Main.java:5)
//! Caused by: java.io.IOException: disk
//! 	at Store.load(Store.java:3)
//! 	... 1 more
//! ```

use crate::vm::object::FrameInfo;
use std::fmt::Write;
use std::path::Path;

/// A throwable ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceData {
    /// `toString()` of the throwable (`java.lang.X: message`)
    pub header: String,
    /// Captured frames, innermost first
    pub frames: Vec<FrameInfo>,
    /// Rendered cause chain
    pub cause: Option<Box<TraceData>>,
}

/// Render a frame line body: `Class.method(File.java:12)`.
pub fn frame_line(frame: &FrameInfo) -> String {
    match &frame.location {
        Some((file, line)) => {
            let file_name = Path::new(file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.clone());
            format!("{}.{}({}:{})", frame.class, frame.method, file_name, line)
        }
        None => format!("{}.{}(Unknown Source)", frame.class, frame.method),
    }
}

/// `printStackTrace()` output.
pub fn render(trace: &TraceData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", trace.header);
    for frame in &trace.frames {
        let _ = writeln!(out, "\tat {}", frame_line(frame));
    }
    let mut enclosing = &trace.frames;
    let mut cause = trace.cause.as_deref();
    // guard against cause cycles
    let mut depth = 0;
    while let Some(current) = cause {
        depth += 1;
        if depth > 64 {
            break;
        }
        let shared = common_suffix(&current.frames, enclosing);
        let _ = writeln!(out, "Caused by: {}", current.header);
        for frame in &current.frames[..current.frames.len() - shared] {
            let _ = writeln!(out, "\tat {}", frame_line(frame));
        }
        if shared > 0 {
            let _ = writeln!(out, "\t... {} more", shared);
        }
        enclosing = &current.frames;
        cause = current.cause.as_deref();
    }
    out
}

/// Report for an exception that escaped `main`.
pub fn render_uncaught(trace: &TraceData) -> String {
    format!("Exception in thread \"main\" {}", render(trace))
}

fn common_suffix(a: &[FrameInfo], b: &[FrameInfo]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}
