//! Block change notifications for systems outside the world store.
//!
//! Breaking a cell only reports which block was there; turning it into a
//! collectible item is the host's job.

use glam::IVec3;
use quarry_voxel::BlockId;

/// A player-driven change to one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockEvent {
    /// `cell` held `block` and is now empty.
    Broken { cell: IVec3, block: BlockId },
    /// `block` was placed into the empty `cell`.
    Placed { cell: IVec3, block: BlockId },
}

impl BlockEvent {
    pub fn cell(&self) -> IVec3 {
        match *self {
            BlockEvent::Broken { cell, .. } | BlockEvent::Placed { cell, .. } => cell,
        }
    }
}

/// Double-buffered event storage.
///
/// Events sent during an update are readable during that update and the
/// next one. Call [`swap`](Self::swap) once per update before sending.
#[derive(Debug, Default)]
pub struct BlockEventBuffer {
    prev: Vec<BlockEvent>,
    current: Vec<BlockEvent>,
}

impl BlockEventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, event: BlockEvent) {
        self.current.push(event);
    }

    /// Previous-update events followed by current-update events.
    pub fn read(&self) -> impl Iterator<Item = &BlockEvent> {
        self.prev.iter().chain(self.current.iter())
    }

    pub fn len(&self) -> usize {
        self.prev.len() + self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops the previous update's events; current ones become previous.
    pub fn swap(&mut self) {
        self.prev.clear();
        std::mem::swap(&mut self.prev, &mut self.current);
    }

    pub fn clear(&mut self) {
        self.prev.clear();
        self.current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broken(x: i32) -> BlockEvent {
        BlockEvent::Broken {
            cell: IVec3::new(x, 0, 0),
            block: BlockId(1),
        }
    }

    #[test]
    fn test_events_survive_one_swap() {
        let mut buffer = BlockEventBuffer::new();
        buffer.send(broken(1));
        assert_eq!(buffer.len(), 1);

        buffer.swap();
        buffer.send(broken(2));
        let cells: Vec<i32> = buffer.read().map(|e| e.cell().x).collect();
        assert_eq!(cells, vec![1, 2]);

        buffer.swap();
        let cells: Vec<i32> = buffer.read().map(|e| e.cell().x).collect();
        assert_eq!(cells, vec![2]);

        buffer.swap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer = BlockEventBuffer::new();
        buffer.send(broken(1));
        buffer.swap();
        buffer.send(broken(2));
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
