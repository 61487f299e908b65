//! Construction of a method's [`ScopeTree`] from its lexical blocks.

use std::collections::BTreeMap;

use crate::{
    metadata::{
        lowered::{BlockId, LoweredMethod},
        range::OffsetRange,
        scope::{LocalEntry, LocalKind, LocalStorage, Scope, ScopeId, ScopeTree},
    },
    Invariant, Result,
};

/// Builds the scope tree of one method.
///
/// - The root scope covers the reachable part of `[0, body_length)`.
/// - Every other scope covers the hull of its block's reachable code. A block with no
///   reachable code is dropped together with its locals and nested blocks.
/// - Emitted locals get dense slot ids in declaration order; dropped locals take no slot.
/// - A local's live range defaults to its scope's range. An explicit range must lie inside the
///   declaring block and is clipped to reachable code like the block itself.
/// - A hoisted closure container is renamed `<>8__{slot}`, the name debuggers look for.
pub struct ScopeBuilder<'a> {
    name: String,
    method: &'a LoweredMethod,
    body: OffsetRange,
}

impl<'a> ScopeBuilder<'a> {
    /// Prepares a builder for `method`.
    #[must_use]
    pub fn new(method: &'a LoweredMethod) -> Self {
        ScopeBuilder {
            name: method.display_name(),
            method,
            body: OffsetRange::new(0, method.body_length),
        }
    }

    /// Builds the tree. `storage` holds the hoisting decision per declared local.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] when a block references an unknown or
    /// later parent, a block escapes its parent, siblings overlap, a local references an unknown
    /// block, or an explicit live range escapes its block.
    pub fn build(self, storage: &[LocalStorage]) -> Result<ScopeTree> {
        self.check_blocks()?;

        let reachable = self.method.reachable();
        let mut scopes = vec![Scope {
            range: self.body.clip_to(&reachable).unwrap_or_default(),
            parent: None,
            children: Vec::new(),
            locals: Vec::new(),
            block: None,
            loop_extent: None,
        }];

        let mut scope_of_block: Vec<Option<ScopeId>> = vec![None; self.method.blocks.len()];
        for (id, block) in self.method.blocks.iter().enumerate() {
            let parent = match block.parent {
                None => Some(0),
                Some(p) => scope_of_block[p],
            };
            let (Some(parent), Some(range)) = (parent, block.range.clip_to(&reachable)) else {
                tracing::trace!(method = %self.name, block = id, "dropped unreachable scope");
                continue;
            };

            let loop_extent = block.is_loop_body.then(|| {
                block
                    .duplicates
                    .iter()
                    .filter_map(|d| d.clip_to(&reachable))
                    .fold(range, |acc, r| acc.hull(&r))
            });

            let scope_id = scopes.len();
            scopes.push(Scope {
                range,
                parent: Some(parent),
                children: Vec::new(),
                locals: Vec::new(),
                block: Some(id),
                loop_extent,
            });
            scopes[parent].children.push(scope_id);
            scope_of_block[id] = Some(scope_id);
        }

        let mut ordered = Vec::with_capacity(scopes.len());
        for scope in &scopes {
            let mut children = scope.children.clone();
            children.sort_by_key(|&c| scopes[c].range.start);
            ordered.push(children);
        }
        for (scope, children) in scopes.iter_mut().zip(ordered) {
            scope.children = children;
        }

        let mut slot = 0u32;
        for (index, local) in self.method.locals.iter().enumerate() {
            let scope_id = match local.block {
                None => Some(0),
                Some(b) => *scope_of_block.get(b).ok_or_else(|| {
                    ice!(
                        self.name,
                        Invariant::BlockReference,
                        "local '{}' is declared in unknown block {}",
                        local.name,
                        b
                    )
                })?,
            };
            let Some(scope_id) = scope_id else {
                continue;
            };

            let live_range = match local.live_range {
                None => scopes[scope_id].range,
                Some(explicit) => {
                    let nominal = self.block_range(local.block);
                    if !nominal.contains_range(&explicit) {
                        return Err(ice!(
                            self.name,
                            Invariant::LocalContainment,
                            "live range {} of local '{}' escapes its scope {}",
                            explicit,
                            local.name,
                            nominal
                        ));
                    }
                    match explicit.clip_to(&reachable) {
                        Some(range) => range,
                        None => continue,
                    }
                }
            };

            let storage = storage.get(index).copied().unwrap_or(LocalStorage::Frame);
            let name = if local.kind == LocalKind::ClosureContainer
                && storage == LocalStorage::Hoisted
            {
                format!("<>8__{slot}")
            } else {
                local.name.clone()
            };

            scopes[scope_id].locals.push(LocalEntry {
                name,
                slot,
                live_range,
                storage,
                visibility: local.visibility,
                dynamic_flags: local.dynamic_flags.clone(),
            });
            slot += 1;
        }

        tracing::debug!(
            method = %self.name,
            scopes = scopes.len(),
            locals = slot,
            "built scope tree"
        );
        Ok(ScopeTree::from_scopes(scopes))
    }

    fn block_range(&self, block: Option<BlockId>) -> OffsetRange {
        block
            .and_then(|b| self.method.blocks.get(b))
            .map_or(self.body, |b| b.range)
    }

    fn check_blocks(&self) -> Result<()> {
        let blocks = &self.method.blocks;
        let mut siblings: BTreeMap<Option<BlockId>, Vec<OffsetRange>> = BTreeMap::new();

        for (id, block) in blocks.iter().enumerate() {
            if let Some(parent) = block.parent {
                if parent >= id {
                    return Err(ice!(
                        self.name,
                        Invariant::BlockReference,
                        "block {} references parent {} which is not declared before it",
                        id,
                        parent
                    ));
                }
            }

            let parent_range = self.block_range(block.parent);
            if !parent_range.contains_range(&block.range) {
                return Err(ice!(
                    self.name,
                    Invariant::ScopeNesting,
                    "block {} {} escapes its parent {}",
                    id,
                    block.range,
                    parent_range
                ));
            }
            if !block.range.is_empty() {
                siblings.entry(block.parent).or_default().push(block.range);
            }
        }

        for ranges in siblings.values_mut() {
            ranges.sort();
            if let Some(pair) = ranges.windows(2).find(|w| w[0].overlaps(&w[1])) {
                return Err(ice!(
                    self.name,
                    Invariant::ScopeNesting,
                    "sibling blocks {} and {} overlap",
                    pair[0],
                    pair[1]
                ));
            }
        }
        Ok(())
    }
}
