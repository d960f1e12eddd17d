//! Structured edit operations on a [`Document`].
//!
//! Collaborators never splice raw text into a loaded tree; every change goes
//! through one of these operations so the tree stays the single source of
//! truth between a parse and the next serialize.

use crate::error::EditError;
use crate::ir::nodes::{Block, Document, Inline, Link};

impl Document {
    /// Insert `block` before position `index` (`index == len` appends).
    pub fn insert_block(&mut self, index: usize, block: Block) -> Result<(), EditError> {
        let len = self.blocks().len();
        if index > len {
            return Err(EditError::OutOfRange { index, len });
        }
        self.blocks_mut().insert(index, block);
        Ok(())
    }

    pub fn push_block(&mut self, block: Block) {
        self.blocks_mut().push(block);
    }

    /// Remove and return the block at `index`.
    pub fn remove_block(&mut self, index: usize) -> Result<Block, EditError> {
        let len = self.blocks().len();
        if index >= len {
            return Err(EditError::OutOfRange { index, len });
        }
        Ok(self.blocks_mut().remove(index))
    }

    /// Replace the block at `index`, returning the previous one.
    pub fn replace_block(&mut self, index: usize, block: Block) -> Result<Block, EditError> {
        let len = self.blocks().len();
        match self.blocks_mut().get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, block)),
            None => Err(EditError::OutOfRange { index, len }),
        }
    }

    /// Set a metadata entry, replacing an existing value for the same key.
    pub fn set_meta(&mut self, key: &str, value: &str) {
        let meta = self.meta_mut();
        match meta.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => meta.push((key.to_string(), value.to_string())),
        }
    }

    /// Rewrite link targets in place. `f` returns the new target, or `None`
    /// to keep the link unchanged. Returns the number of rewritten links.
    pub fn rewrite_link_targets<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&Link) -> Option<String>,
    {
        let mut count = 0;
        for block in self.blocks_mut().iter_mut() {
            for run in block.inline_runs_mut() {
                count += rewrite_run(run, &mut f);
            }
        }
        count
    }
}

fn rewrite_run<F>(run: &mut [Inline], f: &mut F) -> usize
where
    F: FnMut(&Link) -> Option<String>,
{
    let mut count = 0;
    for inline in run.iter_mut() {
        if let Inline::Link(link) = inline {
            if let Some(target) = f(&*link) {
                link.target = target;
                count += 1;
            }
        } else if let Some(children) = inline.children_mut() {
            count += rewrite_run(children, f);
        }
    }
    count
}
