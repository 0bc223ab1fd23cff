//! Context types for tracking state across a hub block.

use rollhub_identifiers::HubHeight;

use crate::events::{EventBuffer, HubEvent};

/// Block info context.
///
/// This is what we know about the hub block being processed before touching
/// any state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BlockContext {
    height: HubHeight,
    timestamp: u64,
}

impl BlockContext {
    pub fn new(height: HubHeight, timestamp: u64) -> Self {
        Self { height, timestamp }
    }

    pub fn height(&self) -> HubHeight {
        self.height
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Execution context for a hub block, collecting the events emitted by the
/// operations run in it.
#[derive(Clone, Debug)]
pub struct ExecContext {
    block_context: BlockContext,
    output: EventBuffer,
}

impl ExecContext {
    pub fn new(block_context: BlockContext) -> Self {
        Self {
            block_context,
            output: EventBuffer::new_empty(),
        }
    }

    /// Returns a ref to the block context structure.
    pub fn block_context(&self) -> &BlockContext {
        &self.block_context
    }

    pub fn height(&self) -> HubHeight {
        self.block_context.height()
    }

    pub fn emit(&mut self, ev: HubEvent) {
        self.output.emit(ev);
    }

    pub fn events(&self) -> &[HubEvent] {
        self.output.events()
    }

    pub(crate) fn output_mut(&mut self) -> &mut EventBuffer {
        &mut self.output
    }

    /// Unwraps the context for just the output buffer.
    pub fn into_output(self) -> EventBuffer {
        self.output
    }
}
