use crate::block::Block;

/// Receives the converted block list after the store settles.
pub trait BlockListObserver {
    fn blocks_changed(&mut self, blocks: &[Block]);
}

impl<F> BlockListObserver for F
where
    F: FnMut(&[Block]),
{
    fn blocks_changed(&mut self, blocks: &[Block]) {
        self(blocks)
    }
}

/// Coalesces change notifications until the host reaches a quiescent point.
///
/// Mutations only raise a flag; nothing is delivered until [`ChangeNotifier::take_pending`]
/// is observed by the store's flush, so any number of mutations in one gesture yield a
/// single delivery.
#[derive(Default)]
pub(crate) struct ChangeNotifier {
    pending: bool,
    observers: Vec<Box<dyn BlockListObserver>>,
}

impl ChangeNotifier {
    pub(crate) fn schedule(&mut self) {
        self.pending = true;
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending
    }

    /// Clears the pending flag, returning whether a delivery was due.
    pub(crate) fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn subscribe(&mut self, observer: Box<dyn BlockListObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn deliver(&mut self, blocks: &[Block]) -> usize {
        for observer in &mut self.observers {
            observer.blocks_changed(blocks);
        }
        self.observers.len()
    }
}
