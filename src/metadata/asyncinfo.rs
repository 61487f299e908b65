//! Async metadata of state-machine step methods.
//!
//! A debugger stepping over an `await` must know where the step method hands control back to
//! its caller (the *yield* offset) and where it picks up again on the next `MoveNext` call (the
//! *resume* offset). It also needs to know which user method started the state machine, so it
//! can show that method in call stacks, and where the state machine dispatches an exception
//! that was thrown while it was suspended inside a user `try`.
//!
//! # Usage Examples
//!
//! ```rust
//! use debugscope::metadata::{
//!     asyncinfo::AsyncInfoBuilder,
//!     lowered::AwaitSite,
//!     method::MethodRef,
//! };
//!
//! let mut builder = AsyncInfoBuilder::new("C+<M>d__0.MoveNext()", MethodRef::new("C", "M", "()"));
//! builder.push_await(AwaitSite::resolved(0x30, 0x48));
//! builder.push_await(AwaitSite::resolved(0x10, 0x22));
//!
//! let info = builder.finish(0x60, &[])?;
//! assert_eq!(info.await_points[0].yield_offset, 0x10);
//! assert!(info.catch_dispatch_offset.is_none());
//! # Ok::<(), debugscope::Error>(())
//! ```

use crate::{
    metadata::{
        lowered::{AwaitSite, LoweredMethod},
        method::{MethodRef, ProtectedRegion},
        range::OffsetRange,
    },
    Invariant, Result,
};

/// One await: where the step method suspends and where it resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AwaitPoint {
    /// Offset of the instruction that suspends
    pub yield_offset: u32,
    /// Offset where execution continues after resumption
    pub resume_offset: u32,
}

/// The async metadata of one step method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncInfo {
    /// The user-facing method that starts the state machine
    pub kickoff: MethodRef,
    /// One entry per static await site, ascending by yield offset
    pub await_points: Vec<AwaitPoint>,
    /// The state machine's top-level handler, present when a user try block spans an await
    pub catch_dispatch_offset: Option<u32>,
}

impl AsyncInfo {
    /// Builds the async metadata of `method`, or `None` if it is not a state-machine step.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] for await sites on a method without
    /// state-machine facts and for every failure of [`AsyncInfoBuilder::finish`].
    pub fn from_lowered(method: &LoweredMethod) -> Result<Option<AsyncInfo>> {
        let Some(state_machine) = &method.state_machine else {
            if method.awaits.is_empty() {
                return Ok(None);
            }
            return Err(ice!(
                method.display_name(),
                Invariant::AwaitResolution,
                "{} await sites on a method without state-machine facts",
                method.awaits.len()
            ));
        };

        let mut builder = AsyncInfoBuilder::new(method.display_name(), state_machine.kickoff.clone());
        for site in &method.awaits {
            builder.push_await(*site);
        }
        if let Some(handler) = state_machine.top_level_handler {
            builder.set_catch_dispatch(handler);
        }
        builder.set_reachable(&method.reachable());
        builder
            .finish(method.body_length, &method.protected_regions)
            .map(Some)
    }
}

/// Collects the await sites of one step method.
///
/// The kickoff reference is fixed at construction. Sites may be pushed in any order; they are
/// sorted and validated by [`AsyncInfoBuilder::finish`].
#[derive(Debug)]
pub struct AsyncInfoBuilder {
    method: String,
    kickoff: MethodRef,
    sites: Vec<AwaitSite>,
    top_level_handler: Option<u32>,
    reachable: Option<Vec<OffsetRange>>,
}

impl AsyncInfoBuilder {
    /// Starts the metadata of the step method `method`, started by `kickoff`.
    pub fn new(method: impl Into<String>, kickoff: MethodRef) -> Self {
        AsyncInfoBuilder {
            method: method.into(),
            kickoff,
            sites: Vec::new(),
            top_level_handler: None,
            reachable: None,
        }
    }

    /// Adds one static await site.
    pub fn push_await(&mut self, site: AwaitSite) {
        self.sites.push(site);
    }

    /// Records the offset of the state machine's top-level exception dispatch.
    pub fn set_catch_dispatch(&mut self, offset: u32) {
        self.top_level_handler = Some(offset);
    }

    /// Restricts resolvable await offsets to the code left after dead-code elimination.
    ///
    /// Without a call the whole body is reachable.
    pub fn set_reachable(&mut self, ranges: &[OffsetRange]) {
        self.reachable = Some(ranges.to_vec());
    }

    fn resolves(&self, offset: u32, body_length: u32) -> bool {
        match &self.reachable {
            Some(ranges) => offset < body_length && ranges.iter().any(|r| r.contains(offset)),
            None => offset < body_length,
        }
    }

    /// Sorts and validates the await points and decides the catch dispatch offset.
    ///
    /// The dispatch offset is kept only when one of `regions` covers the yield offset of an
    /// await; otherwise the metadata carries none.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] when
    /// - a site has an unresolved offset, or one outside `[0, body_length)` or outside the
    ///   reachable code ([`Invariant::AwaitResolution`]),
    /// - a site does not yield strictly before it resumes, or two sites share a yield offset
    ///   ([`Invariant::AwaitOrdering`]),
    /// - a region covers an await but no dispatch offset inside the body is known
    ///   ([`Invariant::CatchDispatch`]).
    pub fn finish(self, body_length: u32, regions: &[ProtectedRegion]) -> Result<AsyncInfo> {
        let mut points = Vec::with_capacity(self.sites.len());
        for (index, site) in self.sites.iter().enumerate() {
            let (Some(yield_offset), Some(resume_offset)) = (site.yield_offset, site.resume_offset)
            else {
                return Err(ice!(
                    self.method,
                    Invariant::AwaitResolution,
                    "await site {} has an unresolved offset ({:?}, {:?})",
                    index,
                    site.yield_offset,
                    site.resume_offset
                ));
            };
            if !self.resolves(yield_offset, body_length) || !self.resolves(resume_offset, body_length)
            {
                return Err(ice!(
                    self.method,
                    Invariant::AwaitResolution,
                    "await site {} ({:#x}, {:#x}) lies outside the reachable body of {:#x} bytes",
                    index,
                    yield_offset,
                    resume_offset,
                    body_length
                ));
            }
            if yield_offset >= resume_offset {
                return Err(ice!(
                    self.method,
                    Invariant::AwaitOrdering,
                    "await site {} yields at {:#x} but resumes at {:#x}",
                    index,
                    yield_offset,
                    resume_offset
                ));
            }
            points.push(AwaitPoint {
                yield_offset,
                resume_offset,
            });
        }

        points.sort();
        if let Some(pair) = points
            .windows(2)
            .find(|w| w[0].yield_offset == w[1].yield_offset)
        {
            return Err(ice!(
                self.method,
                Invariant::AwaitOrdering,
                "two await sites yield at {:#x}",
                pair[0].yield_offset
            ));
        }

        let guarded = points
            .iter()
            .find(|p| regions.iter().any(|r| r.covers(p.yield_offset)));
        let catch_dispatch_offset = match (guarded, self.top_level_handler) {
            (None, _) => None,
            (Some(_), Some(handler)) if handler < body_length => Some(handler),
            (Some(point), handler) => {
                return Err(ice!(
                    self.method,
                    Invariant::CatchDispatch,
                    "await at {:#x} is inside a protected region but the dispatch offset is {:?}",
                    point.yield_offset,
                    handler
                ));
            }
        };

        tracing::debug!(
            method = %self.method,
            awaits = points.len(),
            catch_dispatch = ?catch_dispatch_offset,
            "recorded async info"
        );

        Ok(AsyncInfo {
            kickoff: self.kickoff,
            await_points: points,
            catch_dispatch_offset,
        })
    }
}
