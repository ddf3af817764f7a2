//! Single-shot dialog outcomes.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::dialog::DialogValue;

/// Resolving half of an [`Outcome`]. Consumed on resolution, so a dialog
/// outcome can be resolved at most once.
#[derive(Debug)]
pub struct Resolver {
    tx: oneshot::Sender<DialogValue>,
}

impl Resolver {
    pub fn resolve(self, value: DialogValue) {
        // The caller may have dropped its outcome; nobody is waiting then.
        let _ = self.tx.send(value);
    }
}

/// Pending result of a dialog, resolved when the dialog closes.
///
/// Awaiting it yields the dialog's final value converted to `T`. If the
/// manager went away without resolving it, `T::default()` is returned.
#[derive(Debug)]
pub struct Outcome<T> {
    rx: oneshot::Receiver<DialogValue>,
    extract: fn(DialogValue) -> T,
}

impl Outcome<DialogValue> {
    pub fn channel() -> (Resolver, Self) {
        let (tx, rx) = oneshot::channel();
        (Resolver { tx }, Self { rx, extract: identity })
    }
}

const fn identity(value: DialogValue) -> DialogValue {
    value
}

impl<T> Outcome<T> {
    /// Converts the resolved value with `extract`.
    pub fn map<U>(self, extract: fn(DialogValue) -> U) -> Outcome<U> {
        Outcome {
            rx: self.rx,
            extract,
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Returns the value if the dialog has already closed.
    ///
    /// A value can be taken only once; later calls return `None`.
    pub fn try_result(&mut self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some((self.extract)(value)),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(T::default()),
        }
    }
}

impl<T: Default> Future for Outcome<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let extract = self.extract;
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.map_or_else(|_| T::default(), extract))
    }
}
