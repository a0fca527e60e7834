//! Single-writer cell holding the last known chain height.
//!
//! Built on a watch channel: setting the height replaces the stored value and
//! wakes every reader, which is exactly the relay's broadcast trigger. There
//! is no queue; a reader that falls behind observes only the newest value.

use tokio::sync::watch;

use crate::Height;

/// Creates the store and its reader endpoint.
///
/// The store starts empty; it holds `None` until the first [`HeightStore::set`].
pub fn channel() -> (HeightStore, HeightReader) {
    let (sender, receiver) = watch::channel(None);
    (HeightStore { sender }, HeightReader { receiver })
}

/// Writer endpoint. Held by the relay pump, the single writer.
#[derive(Debug)]
pub struct HeightStore {
    sender: watch::Sender<Option<Height>>,
}

impl HeightStore {
    /// Replaces the stored height and wakes all readers.
    pub fn set(&self, height: Height) {
        self.sender.send_replace(Some(height));
    }

    /// Returns the most recently set height, if any.
    pub fn get(&self) -> Option<Height> {
        *self.sender.borrow()
    }
}

/// Reader endpoint. Cheap to clone; each subscription task holds its own.
#[derive(Clone, Debug)]
pub struct HeightReader {
    receiver: watch::Receiver<Option<Height>>,
}

impl HeightReader {
    /// Returns the current height and marks it as seen by this reader, so a
    /// following [`HeightReader::updated`] waits for a genuinely newer value.
    pub fn latest(&mut self) -> Option<Height> {
        *self.receiver.borrow_and_update()
    }

    /// Returns the current height without consuming the change notification.
    pub fn get(&self) -> Option<Height> {
        *self.receiver.borrow()
    }

    /// Waits for the next height change and returns the new value.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn updated(&mut self) -> Option<Height> {
        loop {
            self.receiver.changed().await.ok()?;
            // The writer only ever stores `Some`, but re-check rather than
            // assume.
            if let Some(height) = *self.receiver.borrow_and_update() {
                return Some(height);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let (store, reader) = channel();
        assert_eq!(store.get(), None);
        assert_eq!(reader.get(), None);
    }

    #[test]
    fn get_reflects_last_set() {
        let (store, reader) = channel();
        for height in [100, 105, 103, 210_240] {
            store.set(height);
        }
        assert_eq!(store.get(), Some(210_240));
        assert_eq!(reader.get(), Some(210_240));
    }

    #[tokio::test]
    async fn updated_returns_new_value() {
        let (store, mut reader) = channel();
        store.set(7);
        assert_eq!(reader.latest(), Some(7));

        let waiter = tokio::spawn(async move { reader.updated().await });
        store.set(8);
        assert_eq!(waiter.await.unwrap(), Some(8));
    }

    #[tokio::test]
    async fn updated_coalesces_to_latest() {
        let (store, mut reader) = channel();
        store.set(1);
        reader.latest();

        store.set(2);
        store.set(3);
        // Both writes landed before the reader woke; it sees only the newest.
        assert_eq!(reader.updated().await, Some(3));
    }

    #[tokio::test]
    async fn updated_ends_when_store_dropped() {
        let (store, mut reader) = channel();
        drop(store);
        assert_eq!(reader.updated().await, None);
    }
}
