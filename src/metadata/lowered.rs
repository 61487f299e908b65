//! The lowered-method input model.
//!
//! Everything the debug-info builders consume is handed over by the lowering and layout passes
//! once final code offsets are known. [`LoweredMethod`] is that hand-over for one method: its
//! identity and synthesized role, the sequence point trace recorded during emission, the lexical
//! block tree, the reachable code left after dead-code elimination, the flow graph used for the
//! hoisting decision, the declared locals, the await sites of a state machine and the namespace
//! import counts of its scopes.
//!
//! The model is plain data. Its consistency (resolvable block and local references, contained
//! ranges, resolved await offsets) is checked by the builders, which report violations as
//! [`crate::Error::InternalCompilerError`].
//!
//! # Usage Examples
//!
//! ```rust
//! use debugscope::analysis::FlowNode;
//! use debugscope::metadata::{
//!     lowered::{AwaitSite, DeclaredLocal, LexicalBlock, LoweredMethod, StateMachineInfo},
//!     method::{MethodRef, SynthesizedKind},
//!     range::OffsetRange,
//! };
//!
//! let step = MethodRef::new("C+<M>d__0", "MoveNext", "()");
//! let method = LoweredMethod::builder(step, "C", SynthesizedKind::StateMachineStep)
//!     .body_length(0x40)
//!     .hidden(0)
//!     .block(LexicalBlock::new(None, OffsetRange::new(0x04, 0x30)))
//!     .local(DeclaredLocal::user("x", Some(0)))
//!     .flow_node(FlowNode::new(OffsetRange::new(0, 0x10)).defines(&[0]).to(&[1]).suspending())
//!     .flow_node(FlowNode::new(OffsetRange::new(0x10, 0x40)).reads(&[0]))
//!     .state_machine(StateMachineInfo::new(MethodRef::new("C", "M", "()")).with_handler(0x38))
//!     .await_site(AwaitSite::resolved(0x0C, 0x10))
//!     .build();
//!
//! assert_eq!(&*method.reachable(), &[OffsetRange::new(0, 0x40)]);
//! assert_eq!(method.locals.len(), 1);
//! ```

use std::borrow::Cow;

use crate::{
    analysis::flow::{FlowGraph, FlowNode},
    metadata::{
        method::{MethodRef, ProtectedRegion, SynthesizedKind},
        range::OffsetRange,
        scope::{LocalKind, LocalVisibility},
        sequencepoints::{SequencePointKind, SourceSpan},
    },
};

/// Index of a [`LexicalBlock`] in [`LoweredMethod::blocks`].
pub type BlockId = usize;

/// One sequence point event recorded while emitting the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// Final code offset
    pub offset: u32,
    /// Span or hidden
    pub kind: SequencePointKind,
}

/// A lexical block (a source scope) of the method.
///
/// Blocks reference their parent by index; a parent must be declared before its children.
/// Blocks without a parent are children of the method's root scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalBlock {
    /// Enclosing block, `None` for the top level
    pub parent: Option<BlockId>,
    /// Code range of the block before dead-code elimination
    pub range: OffsetRange,
    /// The block is the body of a loop
    pub is_loop_body: bool,
    /// Further copies of the loop body the code generator emitted elsewhere
    pub duplicates: Vec<OffsetRange>,
}

impl LexicalBlock {
    /// Creates a plain block.
    #[must_use]
    pub fn new(parent: Option<BlockId>, range: OffsetRange) -> Self {
        LexicalBlock {
            parent,
            range,
            is_loop_body: false,
            duplicates: Vec::new(),
        }
    }

    /// Creates a loop body block.
    #[must_use]
    pub fn loop_body(parent: Option<BlockId>, range: OffsetRange) -> Self {
        LexicalBlock {
            is_loop_body: true,
            ..LexicalBlock::new(parent, range)
        }
    }

    /// Adds a duplicated copy of this loop body.
    #[must_use]
    pub fn with_duplicate(mut self, range: OffsetRange) -> Self {
        self.duplicates.push(range);
        self
    }
}

/// A local variable as declared by the source and the lowering pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredLocal {
    /// Source or synthesized name
    pub name: String,
    /// Declaring block, `None` for the method's root scope
    pub block: Option<BlockId>,
    /// Ordinary local or captured-variables container
    pub kind: LocalKind,
    /// Whether a debugger shows the local to the user
    pub visibility: LocalVisibility,
    /// Explicit live range; defaults to the range of the declaring scope
    pub live_range: Option<OffsetRange>,
    /// Per-type-node flags of a dynamically typed local
    pub dynamic_flags: Option<Vec<bool>>,
    /// The lowering pass already turned the local into a state-machine field
    pub force_hoisted: bool,
}

impl DeclaredLocal {
    /// A user-visible ordinary local.
    pub fn user(name: impl Into<String>, block: Option<BlockId>) -> Self {
        DeclaredLocal {
            name: name.into(),
            block,
            kind: LocalKind::Ordinary,
            visibility: LocalVisibility::UserVisible,
            live_range: None,
            dynamic_flags: None,
            force_hoisted: false,
        }
    }

    /// A compiler-generated ordinary local.
    pub fn synthesized(name: impl Into<String>, block: Option<BlockId>) -> Self {
        DeclaredLocal {
            visibility: LocalVisibility::CompilerGenerated,
            ..DeclaredLocal::user(name, block)
        }
    }

    /// The compiler-generated container of lambda-captured variables.
    pub fn closure_container(name: impl Into<String>, block: Option<BlockId>) -> Self {
        DeclaredLocal {
            kind: LocalKind::ClosureContainer,
            ..DeclaredLocal::synthesized(name, block)
        }
    }

    /// Sets an explicit live range.
    #[must_use]
    pub fn live(mut self, range: OffsetRange) -> Self {
        self.live_range = Some(range);
        self
    }

    /// Marks the local as dynamically typed with the given flags.
    #[must_use]
    pub fn dynamic(mut self, flags: Vec<bool>) -> Self {
        self.dynamic_flags = Some(flags);
        self
    }

    /// Marks the local as already hoisted by the lowering pass.
    #[must_use]
    pub fn hoisted(mut self) -> Self {
        self.force_hoisted = true;
        self
    }
}

/// A static await site. Offsets are `None` until final layout resolved them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AwaitSite {
    /// Offset of the instruction that suspends
    pub yield_offset: Option<u32>,
    /// Offset where execution continues after resumption
    pub resume_offset: Option<u32>,
}

impl AwaitSite {
    /// An await site with both offsets known.
    #[must_use]
    pub const fn resolved(yield_offset: u32, resume_offset: u32) -> Self {
        AwaitSite {
            yield_offset: Some(yield_offset),
            resume_offset: Some(resume_offset),
        }
    }
}

/// Facts about a state-machine step method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachineInfo {
    /// The user-facing method that creates and starts the state machine
    pub kickoff: MethodRef,
    /// Offset of the state machine's top-level exception dispatch, if it has one
    pub top_level_handler: Option<u32>,
}

impl StateMachineInfo {
    /// State-machine facts with no top-level handler.
    #[must_use]
    pub fn new(kickoff: MethodRef) -> Self {
        StateMachineInfo {
            kickoff,
            top_level_handler: None,
        }
    }

    /// Sets the top-level handler offset.
    #[must_use]
    pub fn with_handler(mut self, offset: u32) -> Self {
        self.top_level_handler = Some(offset);
        self
    }
}

/// One method as handed over by the lowering and layout passes.
#[derive(Debug, Clone)]
pub struct LoweredMethod {
    /// Identity of the method
    pub method: MethodRef,
    /// Fully qualified name of the user type the method was synthesized for
    pub owning_type: String,
    /// Role of the method after lowering
    pub kind: SynthesizedKind,
    /// Position of the method in the source declaration order of its type
    pub declaration_order: u32,
    /// Size of the final body in bytes
    pub body_length: u32,
    /// Sequence point events in emission order
    pub trace: Vec<TraceEvent>,
    /// Lexical blocks, parents before children
    pub blocks: Vec<LexicalBlock>,
    /// Code left after dead-code elimination; empty means the whole body
    pub reachable: Vec<OffsetRange>,
    /// Flow graph of the body
    pub flow: FlowGraph,
    /// Locals in declaration order
    pub locals: Vec<DeclaredLocal>,
    /// State-machine facts, for step methods
    pub state_machine: Option<StateMachineInfo>,
    /// Await sites in emission order
    pub awaits: Vec<AwaitSite>,
    /// User try blocks
    pub protected_regions: Vec<ProtectedRegion>,
    /// Namespace import counts per scope, outermost first
    pub import_counts: Vec<u16>,
}

impl LoweredMethod {
    /// Starts building a method.
    pub fn builder(
        method: MethodRef,
        owning_type: impl Into<String>,
        kind: SynthesizedKind,
    ) -> LoweredMethodBuilder {
        LoweredMethodBuilder {
            method: LoweredMethod {
                method,
                owning_type: owning_type.into(),
                kind,
                declaration_order: 0,
                body_length: 0,
                trace: Vec::new(),
                blocks: Vec::new(),
                reachable: Vec::new(),
                flow: FlowGraph::default(),
                locals: Vec::new(),
                state_machine: None,
                awaits: Vec::new(),
                protected_regions: Vec::new(),
                import_counts: Vec::new(),
            },
            flow_nodes: Vec::new(),
        }
    }

    /// Display name used in diagnostics.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.method.to_string()
    }

    /// Reachable code ranges; the whole body when none were given.
    #[must_use]
    pub fn reachable(&self) -> Cow<'_, [OffsetRange]> {
        if !self.reachable.is_empty() {
            return Cow::Borrowed(&self.reachable);
        }
        if self.body_length == 0 {
            return Cow::Owned(Vec::new());
        }
        Cow::Owned(vec![OffsetRange::new(0, self.body_length)])
    }
}

/// Fluent construction of a [`LoweredMethod`].
#[derive(Debug)]
pub struct LoweredMethodBuilder {
    method: LoweredMethod,
    flow_nodes: Vec<FlowNode>,
}

impl LoweredMethodBuilder {
    /// Sets the position in the declaration order of the owning type.
    #[must_use]
    pub fn declaration_order(mut self, order: u32) -> Self {
        self.method.declaration_order = order;
        self
    }

    /// Sets the final body size.
    #[must_use]
    pub fn body_length(mut self, length: u32) -> Self {
        self.method.body_length = length;
        self
    }

    /// Adds a visible sequence point event.
    #[must_use]
    pub fn visible(mut self, offset: u32, span: SourceSpan) -> Self {
        self.method.trace.push(TraceEvent {
            offset,
            kind: SequencePointKind::Visible(span),
        });
        self
    }

    /// Adds a hidden sequence point event.
    #[must_use]
    pub fn hidden(mut self, offset: u32) -> Self {
        self.method.trace.push(TraceEvent {
            offset,
            kind: SequencePointKind::Hidden,
        });
        self
    }

    /// Adds a lexical block; its id is the number of blocks added before it.
    #[must_use]
    pub fn block(mut self, block: LexicalBlock) -> Self {
        self.method.blocks.push(block);
        self
    }

    /// Adds a reachable code range.
    #[must_use]
    pub fn reachable(mut self, range: OffsetRange) -> Self {
        self.method.reachable.push(range);
        self
    }

    /// Adds a declared local; its declaration index is the number of locals added before it.
    #[must_use]
    pub fn local(mut self, local: DeclaredLocal) -> Self {
        self.method.locals.push(local);
        self
    }

    /// Adds a flow graph node; node ids count from `0` in insertion order.
    #[must_use]
    pub fn flow_node(mut self, node: FlowNode) -> Self {
        self.flow_nodes.push(node);
        self
    }

    /// Marks the method as a state-machine step method.
    #[must_use]
    pub fn state_machine(mut self, info: StateMachineInfo) -> Self {
        self.method.state_machine = Some(info);
        self
    }

    /// Adds an await site.
    #[must_use]
    pub fn await_site(mut self, site: AwaitSite) -> Self {
        self.method.awaits.push(site);
        self
    }

    /// Adds a user try block.
    #[must_use]
    pub fn protected_region(mut self, region: ProtectedRegion) -> Self {
        self.method.protected_regions.push(region);
        self
    }

    /// Sets the per-scope namespace import counts.
    #[must_use]
    pub fn imports(mut self, counts: &[u16]) -> Self {
        self.method.import_counts = counts.to_vec();
        self
    }

    /// Finishes the method. Without explicit reachable ranges the whole body is reachable.
    #[must_use]
    pub fn build(mut self) -> LoweredMethod {
        self.method.flow = FlowGraph::new(self.flow_nodes);
        self.method
    }
}
