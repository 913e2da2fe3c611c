//! Fan-in of producer threads into a single folding consumer.

use crossbeam_channel::{Sender, bounded};

/// Run each producer on its own scoped thread and fold everything they send
/// on the calling thread.
///
/// The channel has no buffer: a producer blocks until the consumer takes its
/// item. Only the calling thread touches the fold state, so it needs no lock.
/// Producers should stop when `send` fails.
pub(crate) fn fan_in<T, P, F>(producers: impl IntoIterator<Item = P>, mut fold: F)
where
    T: Send,
    P: FnOnce(&Sender<T>) + Send,
    F: FnMut(T),
{
    let (tx, rx) = bounded(0);
    std::thread::scope(|scope| {
        for producer in producers {
            let tx = tx.clone();
            scope.spawn(move || producer(&tx));
        }
        drop(tx);

        for item in rx {
            fold(item);
        }
    });
}
