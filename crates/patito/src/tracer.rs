//! VM execution tracing.
//!
//! A trait-based hook system for the quadruple VM. The VM carries the tracer
//! as a type parameter, so with [`NoopTracer`] every hook monomorphizes to
//! nothing and tracing costs zero in production.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | No-op default |
//! | [`StderrTracer`] | Human-readable execution log on stderr |
//! | [`RecordingTracer`] | Full event recording for post-mortem inspection |

use crate::quad::QuadOp;

/// Trace event emitted during execution.
///
/// Captured by [`RecordingTracer`] for replay or post-mortem analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A quadruple was dispatched at the given instruction pointer.
    Instruction {
        ip: usize,
        op: QuadOp,
        /// Call-stack depth at dispatch time (main frame included).
        frame_depth: usize,
    },
    /// A GOSUB activated a frame.
    Call { function: String, depth: usize },
    /// An ENDFUNC popped a frame.
    Return { depth: usize },
    /// A PRINT emitted a line.
    Print { text: String },
}

/// Hook points for VM execution tracing.
///
/// Every method has a default no-op body, so implementations only override
/// what they care about and [`NoopTracer`] needs no code at all.
pub trait VmTracer {
    /// Called before each quadruple dispatch. The hottest hook; keep it
    /// light.
    #[inline(always)]
    fn on_instruction(&mut self, _ip: usize, _op: QuadOp, _frame_depth: usize) {}

    /// Called when GOSUB pushes an activation record.
    #[inline(always)]
    fn on_call(&mut self, _function: &str, _depth: usize) {}

    /// Called when ENDFUNC pops an activation record.
    #[inline(always)]
    fn on_return(&mut self, _depth: usize) {}

    /// Called with each PRINT's formatted text.
    #[inline(always)]
    fn on_print(&mut self, _text: &str) {}
}

/// A tracer that does nothing. Compiles away entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl VmTracer for NoopTracer {}

/// Tracer that prints a human-readable execution log to stderr.
///
/// ```text
/// [   0] ERA        frames=1
/// [   1] PARAM      frames=1
/// [   2] GOSUB      frames=1
///   >>> CALL sq     depth=2
/// ```
#[derive(Debug, Default)]
pub struct StderrTracer {
    /// Stop after this many instructions; `None` means unlimited.
    limit: Option<usize>,
    count: usize,
}

impl StderrTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops logging after `limit` instructions, so loops do not flood
    /// stderr.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            count: 0,
        }
    }

    fn exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.count >= limit)
    }
}

impl VmTracer for StderrTracer {
    fn on_instruction(&mut self, ip: usize, op: QuadOp, frame_depth: usize) {
        if self.exhausted() {
            return;
        }
        self.count += 1;
        eprintln!("[{ip:4}] {op:<10} frames={frame_depth}");
    }

    fn on_call(&mut self, function: &str, depth: usize) {
        if !self.exhausted() {
            eprintln!("  >>> CALL {function}     depth={depth}");
        }
    }

    fn on_return(&mut self, depth: usize) {
        if !self.exhausted() {
            eprintln!("  <<< RETURN          depth={depth}");
        }
    }
}

/// Tracer that records every event in order.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl VmTracer for RecordingTracer {
    fn on_instruction(&mut self, ip: usize, op: QuadOp, frame_depth: usize) {
        self.events.push(TraceEvent::Instruction { ip, op, frame_depth });
    }

    fn on_call(&mut self, function: &str, depth: usize) {
        self.events.push(TraceEvent::Call {
            function: function.to_owned(),
            depth,
        });
    }

    fn on_return(&mut self, depth: usize) {
        self.events.push(TraceEvent::Return { depth });
    }

    fn on_print(&mut self, text: &str) {
        self.events.push(TraceEvent::Print { text: text.to_owned() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_tracer_keeps_event_order() {
        let mut tracer = RecordingTracer::new();
        tracer.on_instruction(0, QuadOp::Era, 1);
        tracer.on_call("sq", 2);
        tracer.on_return(1);
        assert_eq!(
            tracer.into_events(),
            vec![
                TraceEvent::Instruction {
                    ip: 0,
                    op: QuadOp::Era,
                    frame_depth: 1
                },
                TraceEvent::Call {
                    function: "sq".to_owned(),
                    depth: 2
                },
                TraceEvent::Return { depth: 1 },
            ]
        );
    }

    #[test]
    fn stderr_tracer_respects_limit() {
        let mut tracer = StderrTracer::with_limit(1);
        tracer.on_instruction(0, QuadOp::Print, 1);
        assert!(tracer.exhausted());
    }
}
