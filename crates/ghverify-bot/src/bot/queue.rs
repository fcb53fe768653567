use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::warn;

use crate::bot::context::BotContext;
use crate::handlers::message::handle_message;
use crate::telegram::Message;

pub(crate) type ChatQueueMap = Arc<Mutex<HashMap<i64, mpsc::UnboundedSender<Message>>>>;

pub(crate) fn new_chat_queues() -> ChatQueueMap {
    Arc::new(Mutex::new(HashMap::new()))
}

/// Enqueues a message on its chat's queue. Messages of one chat are handled
/// in order; different chats run concurrently. Never waits on a handler.
pub(crate) async fn dispatch_message(
    queues: &ChatQueueMap,
    context: &Arc<BotContext>,
    message: Message,
) {
    let chat_id = message.chat.id;
    let sender = {
        let mut queues = queues.lock().await;
        if let Some(sender) = queues.get(&chat_id) {
            sender.clone()
        } else {
            let (sender, receiver) = mpsc::unbounded_channel();
            spawn_queue_worker(chat_id, receiver, Arc::clone(context));
            queues.insert(chat_id, sender.clone());
            sender
        }
    };

    // The worker is gone (it panicked); replace it and retry once.
    if let Err(err) = sender.send(message) {
        let message = err.0;
        let (sender, receiver) = mpsc::unbounded_channel();
        spawn_queue_worker(chat_id, receiver, Arc::clone(context));
        {
            let mut queues = queues.lock().await;
            queues.insert(chat_id, sender.clone());
        }
        if sender.send(message).is_err() {
            warn!(chat_id, "Dropped message: chat queue closed");
        }
    }
}

fn spawn_queue_worker(
    chat_id: i64,
    mut receiver: mpsc::UnboundedReceiver<Message>,
    context: Arc<BotContext>,
) {
    tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            if let Err(err) = handle_message(context.as_ref(), message).await {
                warn!(chat_id, "Message handling error: {err:#}");
            }
        }
    });
}
