//! Notifications emitted by the layout manager.
//!
//! Events travel over an unbounded channel. Sending never blocks and needs no
//! runtime, so hosts can drain the receiver with `try_recv` after each call.

use tokio::sync::mpsc::error::SendError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::Span;

use crate::layout_engine::Rect;
use crate::model::tree::NodeId;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// A drag ended. Emitted whichever way the item ended up, including
    /// when an external item was discarded.
    ItemDropped(NodeId),
    ActiveTabChanged {
        stack: NodeId,
        active: Option<NodeId>,
    },
    TreeChanged,
    DragStarted(NodeId),
    DragAborted(NodeId),
    ItemShown(NodeId),
    ItemHidden(NodeId),
    ItemResized {
        item: NodeId,
        frame: Rect,
    },
    ItemDestroyed(NodeId),
    TitleChanged {
        item: NodeId,
        title: String,
    },
}

pub struct Sender<Event>(UnboundedSender<(Span, Event)>);
pub type Receiver<Event> = UnboundedReceiver<(Span, Event)>;

pub type EventSender = Sender<LayoutEvent>;
pub type EventReceiver = Receiver<LayoutEvent>;

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = unbounded_channel();
    (Sender(tx), rx)
}

impl<Event> Sender<Event> {
    pub fn send(&self, event: Event) {
        // A closed receiver only means the host stopped listening.
        _ = self.try_send(event)
    }

    pub fn try_send(&self, event: Event) -> Result<(), SendError<(Span, Event)>> {
        self.0.send((Span::current(), event))
    }
}

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Event> std::fmt::Debug for Sender<Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("event::Sender(...)")
    }
}

/// Collects every event currently queued on `rx`.
pub fn drain<Event>(rx: &mut Receiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| rx.try_recv().ok().map(|(_, event)| event)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order_without_a_runtime() {
        let (tx, mut rx) = channel();
        tx.send(LayoutEvent::TreeChanged);
        tx.clone().send(LayoutEvent::DragAborted(NodeId::default()));
        assert_eq!(
            drain(&mut rx),
            vec![LayoutEvent::TreeChanged, LayoutEvent::DragAborted(NodeId::default())]
        );
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn sending_after_the_receiver_is_gone_is_ignored() {
        let (tx, rx) = channel::<LayoutEvent>();
        drop(rx);
        tx.send(LayoutEvent::TreeChanged);
        assert!(tx.try_send(LayoutEvent::TreeChanged).is_err());
    }
}
